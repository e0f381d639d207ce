//! Elevation statistics and distance/elevation profiles.
//!
//! Points without an `<ele>` reading are skipped, never treated as sea level.
//! Gain and loss are accumulated between successive *elevation-bearing*
//! points, so a gap in the data bridges straight to the next reading.

use crate::TrackPoint;

/// Elevation summary for a track, in meters.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct ElevationStats {
    /// Lowest elevation, `None` if no point carries elevation. Rounded to 0.1 m.
    pub min: Option<f64>,
    /// Highest elevation, `None` if no point carries elevation. Rounded to 0.1 m.
    pub max: Option<f64>,
    /// Sum of positive deltas. Rounded to 0.1 m.
    pub total_gain: f64,
    /// Sum of absolute negative deltas. Rounded to 0.1 m.
    pub total_loss: f64,
    /// Elevation readings in track order, absent readings skipped.
    pub samples: Vec<f64>,
}

/// One sample of a distance/elevation chart.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct ProfilePoint {
    /// Distance from the start of the track, measured along the full-resolution track.
    pub distance_meters: f64,
    pub elevation: f64,
}

/// Compute elevation statistics in a single pass.
///
/// # Example
///
/// ```rust
/// use route_geometry::{TrackPoint, elevation::compute_elevation_stats};
///
/// let points = vec![
///     TrackPoint::with_elevation(46.0, 7.0, Some(100.0)),
///     TrackPoint::with_elevation(46.1, 7.0, None),
///     TrackPoint::with_elevation(46.2, 7.0, Some(150.0)),
///     TrackPoint::with_elevation(46.3, 7.0, Some(120.0)),
/// ];
///
/// let stats = compute_elevation_stats(&points);
/// assert_eq!(stats.total_gain, 50.0);
/// assert_eq!(stats.total_loss, 30.0);
/// assert_eq!(stats.samples, vec![100.0, 150.0, 120.0]);
/// ```
pub fn compute_elevation_stats(points: &[TrackPoint]) -> ElevationStats {
    let mut min: Option<f64> = None;
    let mut max: Option<f64> = None;
    let mut gain = 0.0;
    let mut loss = 0.0;
    let mut prev: Option<f64> = None;
    let mut samples = Vec::new();

    for elevation in points.iter().filter_map(|p| p.elevation) {
        min = Some(min.map_or(elevation, |m| m.min(elevation)));
        max = Some(max.map_or(elevation, |m| m.max(elevation)));

        if let Some(prev) = prev {
            let delta = elevation - prev;
            if delta > 0.0 {
                gain += delta;
            } else {
                loss -= delta;
            }
        }

        prev = Some(elevation);
        samples.push(elevation);
    }

    ElevationStats {
        min: min.map(round_tenth),
        max: max.map(round_tenth),
        total_gain: round_tenth(gain),
        total_loss: round_tenth(loss),
        samples,
    }
}

/// Build a distance/elevation profile at the given point indices.
///
/// `cumulative` must hold one running distance per point (see
/// [`crate::geo_utils::cumulative_distances`]). Indices pointing at points
/// without elevation, or out of range, are skipped.
pub fn elevation_profile(
    points: &[TrackPoint],
    cumulative: &[f64],
    indices: &[usize],
) -> Vec<ProfilePoint> {
    indices
        .iter()
        .filter_map(|&i| {
            let elevation = points.get(i)?.elevation?;
            let distance_meters = *cumulative.get(i)?;
            Some(ProfilePoint { distance_meters, elevation })
        })
        .collect()
}

pub(crate) fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
