//! Encoded polyline codec.
//!
//! Compact string form of a coordinate sequence, used to request static map
//! images and to store routes cheaply. Coordinates are scaled by `1e5` and
//! rounded, so a round trip is accurate to within `1e-5` degrees (~1.1 cm of
//! latitude), never exact.
//!
//! Pairs are `(latitude, longitude)`, the reverse of the `[lng, lat]` order
//! used by [`crate::BoundingBox`]. Convert explicitly at the boundary.
//!
//! ## Encoding
//!
//! Each point contributes two deltas against the previous scaled point. A delta
//! is zig-zag mapped (shift left one, invert if negative), then emitted as
//! 5-bit groups, least significant first. Every group but the last carries the
//! `0x20` continuation bit, and every byte is offset by 63 into printable ASCII.
//!
//! ```rust
//! use route_geometry::polyline::{decode, encode};
//!
//! let encoded = encode(&[(38.5, -120.2), (40.7, -120.95), (43.252, -126.453)]);
//! assert_eq!(encoded, "_p~iF~ps|U_ulLnnqC_mqNvxq`@");
//!
//! let decoded = decode(&encoded).unwrap();
//! assert!((decoded[2].0 - 43.252).abs() < 1e-5);
//! ```

use log::debug;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::{GeometryError, Result, TrackPoint};

/// Fixed-point scale applied to each ordinate.
pub const PRECISION: f64 = 1e5;

const OFFSET: u8 = 63;
const CONTINUATION: u64 = 0x20;
const CHUNK_MASK: u64 = 0x1f;
/// Largest shift that still fits a 5-bit group into 64 bits.
const MAX_SHIFT: u32 = 60;
/// Largest scaled magnitude whose deltas still decode within [`MAX_SHIFT`].
const MAX_SCALED: f64 = (1u64 << 53) as f64;

/// Characters left unescaped when embedding a polyline in a URL.
const POLYLINE_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

// ============================================================================
// Encode
// ============================================================================

/// Encode `(latitude, longitude)` pairs.
///
/// Pairs with a missing ordinate (NaN or infinite) are malformed and are
/// skipped; the rest of the sequence is still encoded. Finite ordinates are
/// encoded as given, even outside the usual latitude/longitude range, so a
/// track with unwrapped longitudes past the antimeridian survives a
/// round-trip. An empty input encodes to the empty string.
pub fn encode(coords: &[(f64, f64)]) -> String {
    encode_iter(coords.iter().copied())
}

/// Encode track points, ignoring elevation.
pub fn encode_points(points: &[TrackPoint]) -> String {
    encode_iter(points.iter().map(|p| (p.latitude, p.longitude)))
}

/// Encode a flat `[lat1, lng1, lat2, lng2, ...]` buffer.
///
/// A trailing lone latitude has no longitude and is skipped.
pub fn encode_flat(coords: &[f64]) -> String {
    if coords.len() % 2 != 0 {
        debug!("[Polyline] Skipping trailing ordinate of odd-length flat buffer");
    }
    encode_iter(coords.chunks_exact(2).map(|pair| (pair[0], pair[1])))
}

/// Encode a JSON array of points.
///
/// Each entry may be a `[lat, lng]` array or an object with `lat` and `lng`
/// (or `lon`) members. Fails with [`GeometryError::InvalidInput`] when `value`
/// is not an array; entries that are not usable points are skipped.
#[cfg(feature = "serde")]
pub fn encode_json(value: &serde_json::Value) -> Result<String> {
    use serde_json::Value;

    let Value::Array(entries) = value else {
        return Err(GeometryError::InvalidInput(format!(
            "expected an array of points, got {}",
            json_type_name(value)
        )));
    };

    let pairs = entries.iter().filter_map(|entry| match entry {
        Value::Array(pair) => Some((pair.first()?.as_f64()?, pair.get(1)?.as_f64()?)),
        Value::Object(fields) => {
            let lat = fields.get("lat")?.as_f64()?;
            let lng = fields.get("lng").or_else(|| fields.get("lon"))?.as_f64()?;
            Some((lat, lng))
        }
        _ => None,
    });

    Ok(encode_iter(pairs))
}

#[cfg(feature = "serde")]
fn json_type_name(value: &serde_json::Value) -> &'static str {
    use serde_json::Value;
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn encode_iter(coords: impl Iterator<Item = (f64, f64)>) -> String {
    let mut buf: Vec<u8> = Vec::new();
    let mut prev_lat: i64 = 0;
    let mut prev_lng: i64 = 0;
    let mut skipped = 0usize;

    for (lat, lng) in coords {
        let (Some(lat), Some(lng)) = (scale(lat), scale(lng)) else {
            skipped += 1;
            continue;
        };

        encode_value(lat - prev_lat, &mut buf);
        encode_value(lng - prev_lng, &mut buf);
        prev_lat = lat;
        prev_lng = lng;
    }

    if skipped > 0 {
        debug!("[Polyline] Skipped {} malformed point(s) while encoding", skipped);
    }

    buf.into_iter().map(char::from).collect()
}

/// Fixed-point ordinate, or `None` for a missing or unrepresentable one.
#[inline]
fn scale(ordinate: f64) -> Option<i64> {
    let scaled = (ordinate * PRECISION).round();
    (scaled.is_finite() && scaled.abs() <= MAX_SCALED).then_some(scaled as i64)
}

fn encode_value(value: i64, buf: &mut Vec<u8>) {
    let mut v = (if value < 0 { !(value << 1) } else { value << 1 }) as u64;

    while v >= CONTINUATION {
        buf.push(((v & CHUNK_MASK) | CONTINUATION) as u8 + OFFSET);
        v >>= 5;
    }
    buf.push(v as u8 + OFFSET);
}

// ============================================================================
// Decode
// ============================================================================

/// Decode a polyline into `(latitude, longitude)` pairs, in encoding order.
///
/// Fails with [`GeometryError::InvalidInput`] if the string ends in the middle
/// of a value or pair, or contains a byte outside the polyline alphabet
/// (`'?'..='~'`). The empty string decodes to an empty sequence.
pub fn decode(encoded: &str) -> Result<Vec<(f64, f64)>> {
    let bytes = encoded.as_bytes();
    let mut coords = Vec::new();
    let mut pos = 0;
    let mut lat: i64 = 0;
    let mut lng: i64 = 0;

    while pos < bytes.len() {
        let d_lat = decode_value(bytes, &mut pos)?;
        if pos >= bytes.len() {
            return Err(GeometryError::InvalidInput(format!(
                "truncated polyline: latitude without longitude at byte {}",
                pos
            )));
        }
        let d_lng = decode_value(bytes, &mut pos)?;

        lat = lat.checked_add(d_lat).ok_or_else(|| overflow(pos))?;
        lng = lng.checked_add(d_lng).ok_or_else(|| overflow(pos))?;
        coords.push((lat as f64 / PRECISION, lng as f64 / PRECISION));
    }

    Ok(coords)
}

/// Decode a polyline into track points without elevation.
pub fn decode_points(encoded: &str) -> Result<Vec<TrackPoint>> {
    Ok(decode(encoded)?
        .into_iter()
        .map(|(lat, lng)| TrackPoint::new(lat, lng))
        .collect())
}

fn decode_value(bytes: &[u8], pos: &mut usize) -> Result<i64> {
    let mut result: u64 = 0;
    let mut shift: u32 = 0;

    loop {
        let Some(&byte) = bytes.get(*pos) else {
            return Err(GeometryError::InvalidInput(format!(
                "truncated polyline: value continues past end at byte {}",
                *pos
            )));
        };
        if !(OFFSET..=b'~').contains(&byte) {
            return Err(GeometryError::InvalidInput(format!(
                "invalid polyline byte 0x{:02x} at {}",
                byte, *pos
            )));
        }
        if shift > MAX_SHIFT {
            return Err(overflow(*pos));
        }
        *pos += 1;

        let chunk = u64::from(byte - OFFSET);
        result |= (chunk & CHUNK_MASK) << shift;
        shift += 5;

        if chunk < CONTINUATION {
            break;
        }
    }

    let value = if result & 1 == 1 { !(result >> 1) } else { result >> 1 };
    Ok(value as i64)
}

fn overflow(pos: usize) -> GeometryError {
    GeometryError::InvalidInput(format!("polyline value overflows at byte {}", pos))
}

// ============================================================================
// Static map overlay
// ============================================================================

/// Stroke styling for a static-map path overlay.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct OverlayStyle {
    /// Stroke width in pixels. Default: 5
    pub stroke_width: u32,
    /// Hex color without `#`, 3 or 6 digits. Default: "f44"
    pub color: String,
    /// Stroke opacity between 0 and 1. Default: 0.5
    pub opacity: f64,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            stroke_width: 5,
            color: "f44".to_string(),
            opacity: 0.5,
        }
    }
}

/// Wrap an encoded polyline in the static-map path overlay syntax,
/// `path-{width}+{color}-{opacity}({polyline})`.
///
/// The polyline is percent-escaped here, exactly once. Pass the raw output of
/// [`encode`]; escaping it beforehand corrupts the overlay.
///
/// ```rust
/// use route_geometry::polyline::{static_map_overlay, OverlayStyle};
///
/// let overlay = static_map_overlay("_p~iF~ps|U", &OverlayStyle::default());
/// assert_eq!(overlay, "path-5+f44-0.5(_p~iF~ps%7CU)");
/// ```
pub fn static_map_overlay(polyline: &str, style: &OverlayStyle) -> String {
    format!(
        "path-{}+{}-{}({})",
        style.stroke_width,
        style.color.trim_start_matches('#'),
        style.opacity.clamp(0.0, 1.0),
        utf8_percent_encode(polyline, POLYLINE_ESCAPE)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const REFERENCE: &[(f64, f64)] = &[(38.5, -120.2), (40.7, -120.95), (43.252, -126.453)];
    const REFERENCE_ENCODED: &str = "_p~iF~ps|U_ulLnnqC_mqNvxq`@";

    fn assert_close(actual: &[(f64, f64)], expected: &[(f64, f64)]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a.0 - e.0).abs() <= 1e-5, "lat {} vs {}", a.0, e.0);
            assert!((a.1 - e.1).abs() <= 1e-5, "lng {} vs {}", a.1, e.1);
        }
    }

    #[test]
    fn test_encode_reference_vector() {
        assert_eq!(encode(REFERENCE), REFERENCE_ENCODED);
    }

    #[test]
    fn test_decode_reference_vector() {
        assert_close(&decode(REFERENCE_ENCODED).unwrap(), REFERENCE);
    }

    #[test]
    fn test_round_trip_oslo() {
        let coords = [(59.9139, 10.7522), (59.95, 10.8)];
        assert_close(&decode(&encode(&coords)).unwrap(), &coords);
    }

    #[test]
    fn test_empty() {
        assert_eq!(encode(&[]), "");
        assert_eq!(decode("").unwrap(), vec![]);
    }

    #[test]
    fn test_encode_is_deterministic() {
        let coords = [(59.9139, 10.7522), (59.95, 10.8), (60.0, 10.9)];
        assert_eq!(encode(&coords), encode(&coords));
    }

    #[test]
    fn test_repeated_point_encodes_zero_delta() {
        let encoded = encode(&[(1.0, 1.0), (1.0, 1.0)]);
        assert!(encoded.ends_with("??"));
        assert_close(&decode(&encoded).unwrap(), &[(1.0, 1.0), (1.0, 1.0)]);
    }

    #[test]
    fn test_malformed_points_are_skipped() {
        let with_bad = [
            (38.5, -120.2),
            (f64::NAN, 1.0),
            (40.7, -120.95),
            (0.0, f64::NEG_INFINITY),
            (43.252, -126.453),
        ];
        assert_eq!(encode(&with_bad), REFERENCE_ENCODED);
    }

    #[test]
    fn test_unwrapped_antimeridian_longitude_is_kept() {
        let coords = [(10.0, 179.5), (10.0, 180.5)];
        let decoded = decode(&encode(&coords)).unwrap();
        assert_close(&decoded, &coords);
        assert_eq!(encode(&decoded), encode(&coords));
    }

    #[test]
    fn test_out_of_range_latitude_is_encoded() {
        let coords = [(95.0, 0.0), (-91.5, 200.0)];
        assert_close(&decode(&encode(&coords)).unwrap(), &coords);
    }

    #[test]
    fn test_encode_points_matches_pairs() {
        let points: Vec<TrackPoint> = REFERENCE
            .iter()
            .map(|&(lat, lng)| TrackPoint::with_elevation(lat, lng, Some(10.0)))
            .collect();
        assert_eq!(encode_points(&points), REFERENCE_ENCODED);
    }

    #[test]
    fn test_encode_flat_skips_trailing_ordinate() {
        let flat = [38.5, -120.2, 40.7, -120.95, 43.252, -126.453, 44.0];
        assert_eq!(encode_flat(&flat), REFERENCE_ENCODED);
    }

    #[test]
    fn test_decode_points() {
        let points = decode_points(REFERENCE_ENCODED).unwrap();
        assert_eq!(points.len(), 3);
        assert!(points.iter().all(|p| p.elevation.is_none()));
    }

    #[test]
    fn test_decode_truncated_value_fails() {
        // '_' (0x5f) carries the continuation bit, so the value never ends
        let err = decode("_p~iF~ps|U_").unwrap_err();
        assert!(matches!(err, GeometryError::InvalidInput(_)));
    }

    #[test]
    fn test_decode_missing_longitude_fails() {
        // "_p~iF" is a complete latitude with no longitude after it
        let err = decode("_p~iF").unwrap_err();
        assert!(matches!(err, GeometryError::InvalidInput(ref m) if m.contains("longitude")));
    }

    #[test]
    fn test_decode_rejects_bytes_outside_alphabet() {
        assert!(matches!(decode("_p~iF ps|U"), Err(GeometryError::InvalidInput(_))));
        assert!(matches!(decode("é"), Err(GeometryError::InvalidInput(_))));
    }

    #[test]
    fn test_decode_rejects_overlong_value() {
        let overlong = "~".repeat(20);
        assert!(matches!(decode(&overlong), Err(GeometryError::InvalidInput(_))));
    }

    #[test]
    fn test_extreme_coordinates_round_trip() {
        let coords = [(-90.0, -180.0), (90.0, 180.0), (0.0, 0.0)];
        assert_close(&decode(&encode(&coords)).unwrap(), &coords);
    }

    #[test]
    fn test_static_map_overlay_escapes_once() {
        let overlay = static_map_overlay(REFERENCE_ENCODED, &OverlayStyle::default());
        assert_eq!(overlay, "path-5+f44-0.5(_p~iF~ps%7CU_ulLnnqC_mqNvxq%60%40)");
        assert!(!overlay.contains("%25"));
    }

    #[test]
    fn test_static_map_overlay_custom_style() {
        let style = OverlayStyle {
            stroke_width: 3,
            color: "#00ff00".to_string(),
            opacity: 0.8,
        };
        assert_eq!(static_map_overlay("??", &style), "path-3+00ff00-0.8(%3F%3F)");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_encode_json() {
        let value = serde_json::json!([
            [38.5, -120.2],
            {"lat": 40.7, "lng": -120.95},
            [1.0],
            "nonsense",
            {"lat": 43.252, "lon": -126.453}
        ]);
        assert_eq!(encode_json(&value).unwrap(), REFERENCE_ENCODED);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_encode_json_rejects_non_array() {
        let err = encode_json(&serde_json::json!({"lat": 1.0})).unwrap_err();
        assert!(matches!(err, GeometryError::InvalidInput(ref m) if m.contains("an object")));
    }
}
