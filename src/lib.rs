//! # Route Geometry
//!
//! GPX route geometry for map rendering and route metadata.
//!
//! This library provides:
//! - Namespace-tolerant GPX parsing (track or route points)
//! - Haversine distance, elevation gain/loss and bounding boxes
//! - Point-budget simplification for rendering
//! - Encoded polyline codec for static map images
//!
//! ## Features
//!
//! - **`serde`** - Serialize results; encode polylines from JSON
//! - **`parallel`** - Enable parallel batch processing with rayon
//! - **`http`** - Enable HTTP client for GPX fetching
//! - **`ffi`** - Enable FFI bindings for mobile platforms (iOS/Android)
//! - **`full`** - Enable all features
//!
//! ## Quick Start
//!
//! ```rust
//! use route_geometry::{process_gpx, polyline};
//!
//! let gpx = br#"<?xml version="1.0"?>
//! <gpx version="1.1" xmlns="http://www.topografix.com/GPX/1/1">
//!   <trk><trkseg>
//!     <trkpt lat="59.9139" lon="10.7522"><ele>12</ele></trkpt>
//!     <trkpt lat="59.9300" lon="10.7700"><ele>48</ele></trkpt>
//!     <trkpt lat="59.9500" lon="10.8000"><ele>31</ele></trkpt>
//!   </trkseg></trk>
//! </gpx>"#;
//!
//! let route = process_gpx(gpx).unwrap();
//! println!("{:.2} km, +{} m / -{} m", route.distance_km,
//!     route.elevation.total_gain, route.elevation.total_loss);
//!
//! // Compact form for a static map request
//! let encoded = polyline::encode_points(&route.points);
//! assert!(!encoded.is_empty());
//! ```

pub mod elevation;
pub mod error;
pub mod geo_utils;
pub mod gpx;
pub mod polyline;
pub mod route;
pub mod simplify;

// HTTP module for GPX fetching
#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "http")]
pub use http::GpxFetcher;

pub use elevation::{ElevationStats, ProfilePoint};
pub use error::{ErrorKind, GeometryError, Result};
pub use gpx::{parse_gpx, ParsedTrack, PointSource};
pub use polyline::OverlayStyle;
pub use route::{analyze_track, process_gpx, process_gpx_batch, process_gpx_with_config};
pub use simplify::{SimplifyMethod, DEFAULT_MAX_POINTS};

#[cfg(feature = "ffi")]
uniffi::setup_scaffolding!();

/// Initialize logging for Android (only used in FFI)
#[cfg(all(feature = "ffi", target_os = "android"))]
fn init_logging() {
    use android_logger::Config;
    use log::LevelFilter;

    android_logger::init_once(
        Config::default()
            .with_max_level(LevelFilter::Debug)
            .with_tag("RouteGeometryRust")
    );
}

#[cfg(all(feature = "ffi", not(target_os = "android")))]
fn init_logging() {
    // No-op on non-Android platforms
}

// ============================================================================
// Core Types
// ============================================================================

/// A GPS coordinate with optional elevation.
///
/// A missing elevation is `None`, never 0: a zero would register as a real
/// descent to sea level and corrupt gain/loss.
///
/// # Example
/// ```
/// use route_geometry::TrackPoint;
/// let point = TrackPoint::new(51.5074, -0.1278); // London
/// assert_eq!(point.elevation, None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrackPoint {
    #[cfg_attr(feature = "serde", serde(rename = "lat"))]
    pub latitude: f64,
    #[cfg_attr(feature = "serde", serde(rename = "lng"))]
    pub longitude: f64,
    /// Elevation in meters, if the source recorded one.
    pub elevation: Option<f64>,
}

impl TrackPoint {
    /// Create a new point without elevation.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude, elevation: None }
    }

    /// Create a new point with an optional elevation.
    pub fn with_elevation(latitude: f64, longitude: f64, elevation: Option<f64>) -> Self {
        Self { latitude, longitude, elevation }
    }

    /// Check if the point has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }
}

/// A `[lng, lat]` position, the axis order mapping libraries expect.
///
/// Serializes as a two-element array.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(from = "[f64; 2]", into = "[f64; 2]")
)]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

impl LngLat {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }
}

impl From<[f64; 2]> for LngLat {
    fn from([lng, lat]: [f64; 2]) -> Self {
        Self { lng, lat }
    }
}

impl From<LngLat> for [f64; 2] {
    fn from(p: LngLat) -> Self {
        [p.lng, p.lat]
    }
}

/// Bounding box of a route, for framing a map viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundingBox {
    pub southwest: LngLat,
    pub northeast: LngLat,
    /// Midpoint of the corners, not a path-weighted centroid.
    pub center: LngLat,
}

impl BoundingBox {
    /// Whether `point` lies inside the box, edges included.
    pub fn contains(&self, point: &TrackPoint) -> bool {
        self.southwest.lat <= point.latitude
            && point.latitude <= self.northeast.lat
            && self.southwest.lng <= point.longitude
            && point.longitude <= self.northeast.lng
    }
}

/// Everything derived from one GPX document.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct RouteGeometryResult {
    /// Track, route or metadata name, if the document has one
    pub name: Option<String>,
    /// Which GPX element kind the points came from
    pub source: PointSource,
    /// Simplified points, in track order
    pub points: Vec<TrackPoint>,
    /// Total distance along the full-resolution track
    pub distance_meters: f64,
    /// Total distance in kilometers, rounded to 2 decimals
    pub distance_km: f64,
    pub elevation: ElevationStats,
    pub bounds: BoundingBox,
    /// Distance/elevation chart sampled at the simplified points
    pub profile: Vec<ProfilePoint>,
    /// Number of points in the original track
    pub point_count: u32,
    /// Number of points after simplification
    pub simplified_count: u32,
}

/// Configuration for route geometry processing.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeometryConfig {
    /// Point budget for the simplified output. Values below 1 act as 1.
    /// Default: 500
    pub max_points: u32,

    /// How to reduce tracks that exceed the budget.
    /// Default: uniform-stride sampling
    pub simplification: SimplifyMethod,

    /// Timeout for fetching a GPX document, covering connect and body.
    /// Default: 30 seconds
    pub fetch_timeout_secs: u64,

    /// Maximum in-flight requests when fetching many documents.
    /// Default: 8
    pub max_concurrent_fetches: u32,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            max_points: DEFAULT_MAX_POINTS,
            simplification: SimplifyMethod::Uniform,
            fetch_timeout_secs: 30,
            max_concurrent_fetches: 8,
        }
    }
}

// ============================================================================
// FFI Exports (only when feature enabled)
// ============================================================================

#[cfg(feature = "ffi")]
mod ffi {
    use super::*;
    use log::info;

    /// Process a GPX document with the default configuration.
    #[uniffi::export]
    pub fn ffi_process_gpx(gpx: Vec<u8>) -> std::result::Result<RouteGeometryResult, GeometryError> {
        init_logging();
        info!("[RouteGeometryRust] process_gpx called with {} bytes", gpx.len());
        process_gpx(&gpx)
    }

    /// Process a GPX document with a custom configuration.
    #[uniffi::export]
    pub fn ffi_process_gpx_with_config(gpx: Vec<u8>, config: GeometryConfig) -> std::result::Result<RouteGeometryResult, GeometryError> {
        init_logging();
        process_gpx_with_config(&gpx, &config)
    }

    /// Process many GPX documents in parallel. Failed documents yield `None`.
    #[uniffi::export]
    pub fn ffi_process_gpx_batch(documents: Vec<Vec<u8>>, config: GeometryConfig) -> Vec<Option<RouteGeometryResult>> {
        init_logging();
        info!("[RouteGeometryRust] batch called with {} documents", documents.len());
        let slices: Vec<&[u8]> = documents.iter().map(Vec::as_slice).collect();
        process_gpx_batch(&slices, &config)
            .into_iter()
            .map(|r| r.ok())
            .collect()
    }

    /// Encode a flat `[lat1, lng1, lat2, lng2, ...]` buffer as a polyline.
    #[uniffi::export]
    pub fn ffi_encode_polyline(coords: Vec<f64>) -> String {
        polyline::encode_flat(&coords)
    }

    /// Decode a polyline into a flat `[lat1, lng1, lat2, lng2, ...]` buffer.
    #[uniffi::export]
    pub fn ffi_decode_polyline(encoded: String) -> std::result::Result<Vec<f64>, GeometryError> {
        Ok(polyline::decode(&encoded)?
            .into_iter()
            .flat_map(|(lat, lng)| [lat, lng])
            .collect())
    }

    /// Build the static-map path overlay for an encoded polyline.
    #[uniffi::export]
    pub fn ffi_static_map_overlay(encoded: String, style: OverlayStyle) -> String {
        polyline::static_map_overlay(&encoded, &style)
    }

    /// Get default configuration.
    #[uniffi::export]
    pub fn default_geometry_config() -> GeometryConfig {
        init_logging();
        GeometryConfig::default()
    }

    /// Fetch a GPX document and process it (blocking).
    #[cfg(feature = "http")]
    #[uniffi::export]
    pub fn ffi_fetch_and_process(url: String, config: GeometryConfig) -> std::result::Result<RouteGeometryResult, GeometryError> {
        init_logging();
        info!("[RouteGeometryRust] fetch_and_process called for {}", url);
        crate::http::process_gpx_url_sync(&url, &config)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_point_validation() {
        assert!(TrackPoint::new(51.5074, -0.1278).is_valid());
        assert!(TrackPoint::new(-90.0, 180.0).is_valid());
        assert!(!TrackPoint::new(91.0, 0.0).is_valid());
        assert!(!TrackPoint::new(0.0, 181.0).is_valid());
        assert!(!TrackPoint::new(f64::NAN, 0.0).is_valid());
        assert!(!TrackPoint::new(0.0, f64::INFINITY).is_valid());
    }

    #[test]
    fn test_lng_lat_array_order() {
        let p = LngLat::new(10.75, 59.91);
        let arr: [f64; 2] = p.into();
        assert_eq!(arr, [10.75, 59.91]);
        assert_eq!(LngLat::from([10.75, 59.91]), p);
    }

    #[test]
    fn test_bounding_box_contains() {
        let bounds = BoundingBox {
            southwest: LngLat::new(7.0, 45.0),
            northeast: LngLat::new(8.0, 46.0),
            center: LngLat::new(7.5, 45.5),
        };
        assert!(bounds.contains(&TrackPoint::new(45.5, 7.5)));
        assert!(bounds.contains(&TrackPoint::new(45.0, 8.0)));
        assert!(!bounds.contains(&TrackPoint::new(44.9, 7.5)));
        assert!(!bounds.contains(&TrackPoint::new(45.5, 8.1)));
    }

    #[test]
    fn test_default_config() {
        let config = GeometryConfig::default();
        assert_eq!(config.max_points, 500);
        assert_eq!(config.simplification, SimplifyMethod::Uniform);
        assert_eq!(config.fetch_timeout_secs, 30);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_result_serializes_with_mapping_conventions() {
        let gpx = br#"<gpx><trk><trkseg>
            <trkpt lat="45.0" lon="7.0"/>
            <trkpt lat="45.5" lon="7.5"><ele>100</ele></trkpt>
        </trkseg></trk></gpx>"#;
        let result = process_gpx(gpx).unwrap();
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["pointCount"], 2);
        assert_eq!(json["bounds"]["southwest"], serde_json::json!([7.0, 45.0]));
        assert_eq!(json["bounds"]["northeast"], serde_json::json!([7.5, 45.5]));
        assert_eq!(json["points"][0]["lat"], 45.0);
        assert_eq!(json["points"][0]["elevation"], serde_json::Value::Null);
        assert_eq!(json["elevation"]["totalGain"], 0.0);

        let back: RouteGeometryResult = serde_json::from_value(json).unwrap();
        assert_eq!(back, result);
    }
}
