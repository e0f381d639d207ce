//! Orchestration: GPX bytes in, [`RouteGeometryResult`] out.
//!
//! Parse, fail fast on [`GeometryError::Parse`] / [`GeometryError::NoData`],
//! then run the four independent derivations (distance, elevation, bounds,
//! simplification) and assemble the result. Either a complete result or a
//! typed error comes back; never a partial one.

use log::{debug, info};
use std::time::Instant;

use crate::elevation::{compute_elevation_stats, elevation_profile};
use crate::geo_utils::{compute_bounds, cumulative_distances};
use crate::gpx::{parse_gpx, ParsedTrack};
use crate::simplify::simplify_indices;
use crate::{GeometryConfig, GeometryError, Result, RouteGeometryResult};

/// Process a GPX document with the default configuration.
///
/// # Example
///
/// ```rust
/// use route_geometry::process_gpx;
///
/// let doc = br#"<gpx><trk><trkseg>
///   <trkpt lat="0.0" lon="0.0"/>
///   <trkpt lat="0.0" lon="0.01"/>
///   <trkpt lat="0.0" lon="0.02"/>
/// </trkseg></trk></gpx>"#;
///
/// let result = process_gpx(doc).unwrap();
/// assert_eq!(result.point_count, 3);
/// assert_eq!(result.distance_km, 2.22);
/// assert_eq!(result.elevation.min, None);
/// ```
pub fn process_gpx(bytes: &[u8]) -> Result<RouteGeometryResult> {
    process_gpx_with_config(bytes, &GeometryConfig::default())
}

/// Process a GPX document with an explicit configuration.
pub fn process_gpx_with_config(bytes: &[u8], config: &GeometryConfig) -> Result<RouteGeometryResult> {
    let start = Instant::now();
    let track = parse_gpx(bytes)?;
    let parsed = start.elapsed();

    let result = analyze_track(&track, config)?;

    info!(
        "[RouteGeometry] {} bytes -> {} points ({} kept), {:.2} km in {:?} (parse {:?})",
        bytes.len(),
        result.point_count,
        result.simplified_count,
        result.distance_km,
        start.elapsed(),
        parsed
    );

    Ok(result)
}

/// Run the analysis stages over an already parsed track.
///
/// Fails with [`GeometryError::NoData`] if the track has no points, which
/// [`parse_gpx`] never produces but a hand-built [`ParsedTrack`] might.
pub fn analyze_track(track: &ParsedTrack, config: &GeometryConfig) -> Result<RouteGeometryResult> {
    let points = &track.points;
    let bounds = compute_bounds(points).ok_or(GeometryError::NoData)?;

    let cumulative = cumulative_distances(points);
    let distance_meters = cumulative.last().copied().unwrap_or(0.0);

    let elevation = compute_elevation_stats(points);

    let kept = simplify_indices(points, config.max_points as usize, config.simplification);
    let simplified: Vec<_> = kept.iter().map(|&i| points[i]).collect();
    let profile = elevation_profile(points, &cumulative, &kept);

    debug!(
        "[RouteGeometry] Simplified {} -> {} points ({:?})",
        points.len(),
        simplified.len(),
        config.simplification
    );

    Ok(RouteGeometryResult {
        name: track.name.clone(),
        source: track.source,
        point_count: count_u32(points.len()),
        simplified_count: count_u32(simplified.len()),
        points: simplified,
        distance_meters,
        distance_km: round_hundredth(distance_meters / 1000.0),
        elevation,
        bounds,
        profile,
    })
}

/// Process independent GPX documents, one result per document, in input order.
///
/// With the `parallel` feature the documents are processed on the rayon pool.
pub fn process_gpx_batch(documents: &[&[u8]], config: &GeometryConfig) -> Vec<Result<RouteGeometryResult>> {
    let start = Instant::now();

    #[cfg(feature = "parallel")]
    let results: Vec<Result<RouteGeometryResult>> = {
        use rayon::prelude::*;
        documents
            .par_iter()
            .map(|doc| process_gpx_with_config(doc, config))
            .collect()
    };

    #[cfg(not(feature = "parallel"))]
    let results: Vec<Result<RouteGeometryResult>> = documents
        .iter()
        .map(|doc| process_gpx_with_config(doc, config))
        .collect();

    let failed = results.iter().filter(|r| r.is_err()).count();
    info!(
        "[RouteGeometry] Batch of {} documents processed in {:?} ({} failed)",
        documents.len(),
        start.elapsed(),
        failed
    );

    results
}

fn round_hundredth(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn count_u32(count: usize) -> u32 {
    u32::try_from(count).unwrap_or(u32::MAX)
}
