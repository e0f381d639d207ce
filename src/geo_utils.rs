//! # Geographic Utilities
//!
//! Core geographic computation utilities for GPS track analysis.
//!
//! ## Overview
//!
//! | Function | Description |
//! |----------|-------------|
//! | [`haversine_distance`] | Great-circle distance between two GPS points |
//! | [`polyline_length`] | Total length of a GPS track in meters |
//! | [`cumulative_distances`] | Running distance along a track at every point |
//! | [`compute_bounds`] | Bounding box of a GPS track, in `[lng, lat]` order |
//!
//! ## Example
//!
//! ```rust
//! use route_geometry::{TrackPoint, geo_utils};
//!
//! let track = vec![
//!     TrackPoint::new(51.5074, -0.1278),  // London
//!     TrackPoint::new(51.5080, -0.1290),
//!     TrackPoint::new(51.5090, -0.1300),
//! ];
//!
//! let length = geo_utils::polyline_length(&track);
//! assert!(length > 0.0);
//!
//! let bounds = geo_utils::compute_bounds(&track).unwrap();
//! assert_eq!(bounds.southwest.lat, 51.5074);
//! ```
//!
//! ## Algorithm Notes
//!
//! ### Haversine Formula
//!
//! The haversine formula calculates the great-circle distance between two points on a
//! sphere. It is accurate to within 0.3% for most practical applications.
//!
//! Reference: [Haversine formula (Wikipedia)](https://en.wikipedia.org/wiki/Haversine_formula)
//!
//! ### Coordinate System
//!
//! All functions expect WGS84 coordinates (latitude/longitude in degrees).

use crate::{BoundingBox, LngLat, TrackPoint};

/// Mean Earth radius used by the haversine formula, in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

// =============================================================================
// Distance Functions
// =============================================================================

/// Calculate the great-circle distance between two GPS points using the Haversine formula.
///
/// Returns the distance in meters along the Earth's surface, assuming a spherical Earth
/// of radius [`EARTH_RADIUS_METERS`]. Elevation is ignored.
///
/// The result is symmetric and zero for coincident points.
///
/// # Example
///
/// ```rust
/// use route_geometry::{TrackPoint, geo_utils};
///
/// let london = TrackPoint::new(51.5074, -0.1278);
/// let paris = TrackPoint::new(48.8566, 2.3522);
///
/// let distance = geo_utils::haversine_distance(&london, &paris);
/// assert!((distance - 343_560.0).abs() < 1000.0); // ~344 km
/// ```
#[inline]
pub fn haversine_distance(p1: &TrackPoint, p2: &TrackPoint) -> f64 {
    let lat1 = p1.latitude.to_radians();
    let lat2 = p2.latitude.to_radians();
    let d_lat = (p2.latitude - p1.latitude).to_radians();
    let d_lng = (p2.longitude - p1.longitude).to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    // Rounding can push `a` a hair outside [0, 1] for antipodal points
    let c = 2.0 * a.clamp(0.0, 1.0).sqrt().asin();

    EARTH_RADIUS_METERS * c
}

/// Calculate the total length of a polyline (GPS track) in meters.
///
/// Sums the haversine distance between consecutive points. Empty or single-point
/// tracks return 0.0.
pub fn polyline_length(points: &[TrackPoint]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }

    points
        .windows(2)
        .map(|w| haversine_distance(&w[0], &w[1]))
        .sum()
}

/// Running distance along the track, one entry per input point.
///
/// The first entry is always 0.0 and the last equals [`polyline_length`].
pub fn cumulative_distances(points: &[TrackPoint]) -> Vec<f64> {
    let mut distances = Vec::with_capacity(points.len());
    let mut total = 0.0;
    let mut prev: Option<&TrackPoint> = None;

    for p in points {
        if let Some(prev) = prev {
            total += haversine_distance(prev, p);
        }
        distances.push(total);
        prev = Some(p);
    }

    distances
}

// =============================================================================
// Bounding Box Functions
// =============================================================================

/// Compute the bounding box of a GPS track.
///
/// The center is the midpoint of the box corners, not a path-weighted centroid.
/// It frames a viewport and nothing more. Returns `None` for empty input.
///
/// # Example
///
/// ```rust
/// use route_geometry::{TrackPoint, geo_utils};
///
/// let track = vec![
///     TrackPoint::new(51.5000, -0.1300),
///     TrackPoint::new(51.5100, -0.1200),
///     TrackPoint::new(51.5050, -0.1250),
/// ];
///
/// let bounds = geo_utils::compute_bounds(&track).unwrap();
/// assert_eq!(bounds.southwest.lat, 51.5000);
/// assert_eq!(bounds.northeast.lat, 51.5100);
/// assert_eq!(bounds.southwest.lng, -0.1300);
/// assert_eq!(bounds.northeast.lng, -0.1200);
/// ```
pub fn compute_bounds(points: &[TrackPoint]) -> Option<BoundingBox> {
    if points.is_empty() {
        return None;
    }

    let mut min_lat = f64::MAX;
    let mut max_lat = f64::MIN;
    let mut min_lng = f64::MAX;
    let mut max_lng = f64::MIN;

    for p in points {
        min_lat = min_lat.min(p.latitude);
        max_lat = max_lat.max(p.latitude);
        min_lng = min_lng.min(p.longitude);
        max_lng = max_lng.max(p.longitude);
    }

    Some(BoundingBox {
        southwest: LngLat::new(min_lng, min_lat),
        northeast: LngLat::new(max_lng, max_lat),
        center: LngLat::new((min_lng + max_lng) / 2.0, (min_lat + max_lat) / 2.0),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    #[test]
    fn test_haversine_distance_same_point() {
        let p = TrackPoint::new(51.5074, -0.1278);
        assert_eq!(haversine_distance(&p, &p), 0.0);
    }

    #[test]
    fn test_haversine_one_degree_of_longitude_at_equator() {
        let a = TrackPoint::new(0.0, 0.0);
        let b = TrackPoint::new(0.0, 1.0);
        assert!(approx_eq(haversine_distance(&a, &b), 111_195.0, 50.0));
    }

    #[test]
    fn test_haversine_distance_is_symmetric() {
        let london = TrackPoint::new(51.5074, -0.1278);
        let paris = TrackPoint::new(48.8566, 2.3522);
        assert_eq!(
            haversine_distance(&london, &paris),
            haversine_distance(&paris, &london)
        );
    }

    #[test]
    fn test_haversine_ignores_elevation() {
        let low = TrackPoint::with_elevation(46.0, 7.0, Some(400.0));
        let high = TrackPoint::with_elevation(46.0, 7.0, Some(4000.0));
        assert_eq!(haversine_distance(&low, &high), 0.0);
    }

    #[test]
    fn test_haversine_antipodal_points() {
        let a = TrackPoint::new(0.0, 0.0);
        let b = TrackPoint::new(0.0, 180.0);
        let half_circumference = std::f64::consts::PI * EARTH_RADIUS_METERS;
        assert!(approx_eq(haversine_distance(&a, &b), half_circumference, 1.0));
    }

    #[test]
    fn test_polyline_length_empty() {
        let empty: Vec<TrackPoint> = vec![];
        assert_eq!(polyline_length(&empty), 0.0);
    }

    #[test]
    fn test_polyline_length_single_point() {
        let single = vec![TrackPoint::new(51.5074, -0.1278)];
        assert_eq!(polyline_length(&single), 0.0);
    }

    #[test]
    fn test_polyline_length_is_sum_of_segments() {
        let track = vec![
            TrackPoint::new(51.5074, -0.1278),
            TrackPoint::new(51.5080, -0.1290),
            TrackPoint::new(51.5090, -0.1300),
        ];
        let expected = haversine_distance(&track[0], &track[1])
            + haversine_distance(&track[1], &track[2]);
        assert!(approx_eq(polyline_length(&track), expected, 1e-9));
    }

    #[test]
    fn test_cumulative_distances() {
        let track = vec![
            TrackPoint::new(0.0, 0.0),
            TrackPoint::new(0.0, 0.01),
            TrackPoint::new(0.0, 0.02),
        ];
        let distances = cumulative_distances(&track);
        assert_eq!(distances.len(), 3);
        assert_eq!(distances[0], 0.0);
        assert!(distances[1] > 0.0);
        assert!(approx_eq(distances[2], polyline_length(&track), 1e-9));
    }

    #[test]
    fn test_cumulative_distances_empty() {
        assert!(cumulative_distances(&[]).is_empty());
    }

    #[test]
    fn test_compute_bounds() {
        let track = vec![
            TrackPoint::new(51.50, -0.13),
            TrackPoint::new(51.51, -0.12),
            TrackPoint::new(51.505, -0.125),
        ];
        let bounds = compute_bounds(&track).unwrap();
        assert_eq!(bounds.southwest, LngLat::new(-0.13, 51.50));
        assert_eq!(bounds.northeast, LngLat::new(-0.12, 51.51));
        assert!(approx_eq(bounds.center.lng, -0.125, 1e-12));
        assert!(approx_eq(bounds.center.lat, 51.505, 1e-12));
    }

    #[test]
    fn test_compute_bounds_center_is_box_midpoint_not_centroid() {
        // Three points bunched in the south, one in the north
        let track = vec![
            TrackPoint::new(10.0, 20.0),
            TrackPoint::new(10.0, 20.0),
            TrackPoint::new(10.0, 20.0),
            TrackPoint::new(12.0, 22.0),
        ];
        let bounds = compute_bounds(&track).unwrap();
        assert_eq!(bounds.center, LngLat::new(21.0, 11.0));
    }

    #[test]
    fn test_compute_bounds_empty() {
        assert!(compute_bounds(&[]).is_none());
    }
}
