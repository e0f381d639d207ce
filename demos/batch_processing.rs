//! Example of processing many GPX documents in parallel.
//!
//! Run with: cargo run --example batch_processing --features parallel

use route_geometry::{process_gpx_batch, GeometryConfig};
use std::time::Instant;

fn main() {
    println!("Batch Processing Example\n");

    let starts = [
        ("london", 51.5074, -0.1278),
        ("paris", 48.8566, 2.3522),
        ("nyc", 40.7128, -74.0060),
    ];

    let mut documents = Vec::new();
    for (name, lat, lng) in starts {
        for variant in 0..20 {
            documents.push(synthetic_gpx(name, lat, lng, 2_000 + variant * 100));
        }
    }
    // One broken document does not affect the rest
    documents.push(b"<gpx><trk>".to_vec());

    let slices: Vec<&[u8]> = documents.iter().map(Vec::as_slice).collect();
    let config = GeometryConfig::default();

    let start = Instant::now();
    let results = process_gpx_batch(&slices, &config);
    let elapsed = start.elapsed();

    let ok = results.iter().filter(|r| r.is_ok()).count();
    println!("Processed {} documents in {:?} ({} ok, {} failed)\n", results.len(), elapsed, ok, results.len() - ok);

    for result in results.iter().step_by(20) {
        match result {
            Ok(route) => println!(
                "  {:<12} {:>7.2} km  +{:>6.1} m  {} -> {} points",
                route.name.as_deref().unwrap_or("?"),
                route.distance_km,
                route.elevation.total_gain,
                route.point_count,
                route.simplified_count
            ),
            Err(e) => println!("  error: {}", e),
        }
    }
}

/// Build a wiggly out-and-back track with a rolling elevation profile.
fn synthetic_gpx(name: &str, lat: f64, lng: f64, count: usize) -> Vec<u8> {
    let mut gpx = format!(
        "<gpx version=\"1.1\" xmlns=\"http://www.topografix.com/GPX/1/1\"><trk><name>{}</name><trkseg>",
        name
    );
    for i in 0..count {
        let t = i as f64 / count as f64;
        let p_lat = lat + t * 0.05 + (t * 40.0).sin() * 0.001;
        let p_lng = lng + (t * 20.0).cos() * 0.002;
        let ele = 50.0 + (t * 12.0).sin() * 30.0;
        gpx.push_str(&format!(
            "<trkpt lat=\"{:.6}\" lon=\"{:.6}\"><ele>{:.1}</ele></trkpt>",
            p_lat, p_lng, ele
        ));
    }
    gpx.push_str("</trkseg></trk></gpx>");
    gpx.into_bytes()
}
