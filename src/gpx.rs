//! GPX track parser.
//!
//! Extracts an ordered point sequence from raw GPX bytes. Producers disagree on
//! namespaces (some omit the default `xmlns`, some bind a prefix they never
//! declare, some emit a GPX 1.0 URI) and on whether a file carries recorded
//! track points (`<trkpt>`) or planned route points (`<rtept>`). The document is
//! scanned once with `quick-xml`, then an ordered chain of [`PointLookup`]
//! strategies picks the first non-empty point source.
//!
//! Adding a new schema variant means appending an entry to [`LOOKUP_CHAIN`].

use encoding_rs::{Encoding, UTF_8};
use log::{debug, warn};
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::{NsReader, Reader};
use std::borrow::Cow;

use crate::{GeometryError, Result, TrackPoint};

/// Namespace URIs accepted as "the GPX namespace".
pub const GPX_NAMESPACES: &[&str] = &[
    "http://www.topografix.com/GPX/1/1",
    "http://www.topografix.com/GPX/1/0",
];

/// Which kind of GPX point element produced a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PointSource {
    /// `<trkpt>` elements: recorded breadcrumbs inside `<trkseg>`.
    TrackSegment,
    /// `<rtept>` elements: planned route points.
    Route,
}

impl PointSource {
    fn element_name(self) -> &'static [u8] {
        match self {
            PointSource::TrackSegment => b"trkpt",
            PointSource::Route => b"rtept",
        }
    }

    fn from_element_name(local_name: &[u8]) -> Option<Self> {
        match local_name {
            b"trkpt" => Some(PointSource::TrackSegment),
            b"rtept" => Some(PointSource::Route),
            _ => None,
        }
    }
}

/// A non-empty, ordered point sequence extracted from a GPX document.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedTrack {
    /// First `<name>` found under `<metadata>`, `<trk>` or `<rte>`.
    pub name: Option<String>,
    /// Points in document order. Never empty.
    pub points: Vec<TrackPoint>,
    /// Element kind the points came from.
    pub source: PointSource,
    /// Whether the points were bound to a recognised GPX namespace.
    pub namespaced: bool,
}

/// One step of the fallback chain.
#[derive(Debug, Clone, Copy)]
pub struct PointLookup {
    pub source: PointSource,
    /// Only accept elements bound to one of [`GPX_NAMESPACES`].
    pub require_gpx_namespace: bool,
}

/// Point sources in order of preference.
pub const LOOKUP_CHAIN: &[PointLookup] = &[
    PointLookup { source: PointSource::TrackSegment, require_gpx_namespace: true },
    PointLookup { source: PointSource::TrackSegment, require_gpx_namespace: false },
    PointLookup { source: PointSource::Route, require_gpx_namespace: true },
    PointLookup { source: PointSource::Route, require_gpx_namespace: false },
];

impl PointLookup {
    fn select(&self, candidates: &[Candidate]) -> Vec<TrackPoint> {
        candidates
            .iter()
            .filter(|c| c.source == self.source)
            .filter(|c| !self.require_gpx_namespace || c.namespaced)
            .map(|c| c.point)
            .collect()
    }
}

/// Parse raw GPX bytes into a [`ParsedTrack`].
///
/// The character encoding comes from a byte order mark, then from the XML
/// declaration, and defaults to UTF-8. Fails with [`GeometryError::Parse`]
/// when the bytes are invalid in that encoding or not well-formed XML, and with [`GeometryError::NoData`] when no strategy in
/// [`LOOKUP_CHAIN`] finds a single point.
///
/// Missing `<ele>` is kept as `None`, never defaulted to zero.
///
/// # Example
///
/// ```rust
/// use route_geometry::gpx::{parse_gpx, PointSource};
///
/// let doc = br#"<gpx xmlns="http://www.topografix.com/GPX/1/1">
///   <trk><trkseg>
///     <trkpt lat="46.0" lon="7.0"><ele>1200</ele></trkpt>
///     <trkpt lat="46.1" lon="7.1"/>
///   </trkseg></trk>
/// </gpx>"#;
///
/// let track = parse_gpx(doc).unwrap();
/// assert_eq!(track.points.len(), 2);
/// assert_eq!(track.source, PointSource::TrackSegment);
/// assert_eq!(track.points[0].elevation, Some(1200.0));
/// assert_eq!(track.points[1].elevation, None);
/// ```
pub fn parse_gpx(bytes: &[u8]) -> Result<ParsedTrack> {
    let content = decode_document(bytes)?;
    let scan = scan_document(content.trim_start_matches('\u{feff}'))?;

    LOOKUP_CHAIN
        .iter()
        .find_map(|lookup| {
            let points = lookup.select(&scan.candidates);
            if points.is_empty() {
                return None;
            }
            debug!(
                "[Parser] {} points via {:?} (namespaced: {})",
                points.len(),
                lookup.source,
                lookup.require_gpx_namespace
            );
            Some(ParsedTrack {
                name: scan.name.clone(),
                points,
                source: lookup.source,
                namespaced: lookup.require_gpx_namespace,
            })
        })
        .ok_or(GeometryError::NoData)
}

// ============================================================================
// Character encoding
// ============================================================================

/// Transcode the raw document to UTF-8.
fn decode_document(bytes: &[u8]) -> Result<Cow<'_, str>> {
    let (encoding, body) = match Encoding::for_bom(bytes) {
        Some((encoding, bom_len)) => (encoding, &bytes[bom_len..]),
        None => (declared_encoding(bytes).unwrap_or(UTF_8), bytes),
    };
    if encoding != UTF_8 {
        debug!("[Parser] Decoding document as {}", encoding.name());
    }

    encoding
        .decode_without_bom_handling_and_without_replacement(body)
        .ok_or_else(|| GeometryError::Parse(format!("invalid {} byte sequence", encoding.name())))
}

/// Encoding named by the `<?xml ... encoding="..."?>` declaration, if any.
///
/// A declaration readable as ASCII cannot be UTF-16, so UTF-16 labels map to
/// UTF-8 here; BOM-marked UTF-16 is handled before this is consulted.
fn declared_encoding(bytes: &[u8]) -> Option<&'static Encoding> {
    let mut reader = Reader::from_reader(bytes);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        match reader.read_event_into(&mut buf).ok()? {
            Event::Decl(decl) => {
                let label = decl.encoding()?.ok()?;
                return Encoding::for_label(label.as_ref()).map(Encoding::output_encoding);
            }
            Event::Text(text) if text.iter().all(u8::is_ascii_whitespace) => {}
            _ => return None,
        }
    }
}

// ============================================================================
// Document scan
// ============================================================================

/// A point element seen during the scan, before strategy selection.
struct Candidate {
    source: PointSource,
    namespaced: bool,
    point: TrackPoint,
}

struct PendingPoint {
    source: PointSource,
    namespaced: bool,
    coords: Option<(f64, f64)>,
    elevation: Option<f64>,
}

#[derive(Default)]
struct DocumentScan {
    candidates: Vec<Candidate>,
    name: Option<String>,
    /// Local names of currently open elements.
    open: Vec<Vec<u8>>,
    pending: Option<PendingPoint>,
    seen_root: bool,
    skipped: usize,
}

fn scan_document(content: &str) -> Result<DocumentScan> {
    let mut reader = NsReader::from_str(content);
    let mut scan = DocumentScan::default();

    loop {
        let (namespaced, event) = match reader.read_resolved_event() {
            Ok((ns, event)) => (is_gpx_namespace(&ns), event),
            Err(e) => return Err(parse_error(e, reader.error_position())),
        };

        match event {
            Event::Start(e) => {
                scan.open_element(&e, namespaced);
                scan.open.push(e.local_name().as_ref().to_vec());
            }
            Event::Empty(e) => {
                scan.open_element(&e, namespaced);
                scan.close_element(e.local_name().as_ref());
            }
            Event::End(e) => {
                scan.open.pop();
                scan.close_element(e.local_name().as_ref());
            }
            Event::Text(t) => {
                let text = t
                    .unescape()
                    .map_err(|e| parse_error(e, reader.buffer_position()))?;
                scan.text(&text);
            }
            Event::CData(c) => {
                let text = String::from_utf8_lossy(&c);
                scan.text(&text);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !scan.seen_root {
        return Err(GeometryError::Parse("document has no root element".to_string()));
    }
    if let Some(unclosed) = scan.open.last() {
        return Err(GeometryError::Parse(format!(
            "unexpected end of document: <{}> is not closed",
            String::from_utf8_lossy(unclosed)
        )));
    }
    if scan.skipped > 0 {
        warn!("[Parser] Skipped {} point(s) with missing or invalid lat/lon", scan.skipped);
    }

    Ok(scan)
}

fn parse_error(err: impl std::fmt::Display, position: u64) -> GeometryError {
    GeometryError::Parse(format!("{} at byte {}", err, position))
}

fn is_gpx_namespace(ns: &ResolveResult) -> bool {
    match ns {
        ResolveResult::Bound(namespace) => GPX_NAMESPACES
            .iter()
            .any(|uri| uri.as_bytes() == namespace.as_ref()),
        _ => false,
    }
}

impl DocumentScan {
    fn open_element(&mut self, e: &BytesStart, namespaced: bool) {
        self.seen_root = true;
        let Some(source) = PointSource::from_element_name(e.local_name().as_ref()) else {
            return;
        };

        let mut lat = None;
        let mut lon = None;
        for attr in e.attributes().flatten() {
            let value = attr.unescape_value().ok();
            let parsed = value.and_then(|v| v.trim().parse::<f64>().ok());
            match attr.key.local_name().as_ref() {
                b"lat" => lat = parsed,
                b"lon" => lon = parsed,
                _ => {}
            }
        }

        let coords = match (lat, lon) {
            (Some(lat), Some(lon)) if TrackPoint::new(lat, lon).is_valid() => Some((lat, lon)),
            _ => None,
        };

        self.pending = Some(PendingPoint {
            source,
            namespaced,
            coords,
            elevation: None,
        });
    }

    fn close_element(&mut self, local_name: &[u8]) {
        let Some(pending) = self.pending.as_ref() else {
            return;
        };
        if pending.source.element_name() != local_name {
            return;
        }
        let Some(pending) = self.pending.take() else {
            return;
        };

        match pending.coords {
            Some((lat, lon)) => self.candidates.push(Candidate {
                source: pending.source,
                namespaced: pending.namespaced,
                point: TrackPoint::with_elevation(lat, lon, pending.elevation),
            }),
            None => self.skipped += 1,
        }
    }

    fn text(&mut self, text: &str) {
        let Some((current, parents)) = self.open.split_last() else {
            return;
        };
        let parent = parents.last().map(Vec::as_slice);

        match current.as_slice() {
            b"ele" => {
                if let Some(pending) = self.pending.as_mut() {
                    if parent == Some(pending.source.element_name()) {
                        pending.elevation = text.trim().parse::<f64>().ok().filter(|e| e.is_finite());
                    }
                }
            }
            b"name" if self.name.is_none() => {
                if matches!(parent, Some(b"metadata" | b"trk" | b"rte")) {
                    let trimmed = text.trim();
                    if !trimmed.is_empty() {
                        self.name = Some(trimmed.to_string());
                    }
                }
            }
            _ => {}
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
