//! Basic example of turning a GPX document into map-ready geometry.
//!
//! Run with: cargo run --example process_route

use route_geometry::{polyline, process_gpx, process_gpx_with_config, GeometryConfig, OverlayStyle};

fn main() {
    // A short loop above Oslo, with one point missing its elevation
    let gpx = br#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="demo" xmlns="http://www.topografix.com/GPX/1/1">
  <metadata><name>Holmenkollen loop</name></metadata>
  <trk><trkseg>
    <trkpt lat="59.9636" lon="10.6677"><ele>371.2</ele></trkpt>
    <trkpt lat="59.9660" lon="10.6640"><ele>389.0</ele></trkpt>
    <trkpt lat="59.9701" lon="10.6608"><ele>402.4</ele></trkpt>
    <trkpt lat="59.9722" lon="10.6665"></trkpt>
    <trkpt lat="59.9695" lon="10.6731"><ele>380.6</ele></trkpt>
    <trkpt lat="59.9641" lon="10.6702"><ele>368.9</ele></trkpt>
  </trkseg></trk>
</gpx>"#;

    println!("Route Geometry Example\n");

    let route = match process_gpx(gpx) {
        Ok(route) => route,
        Err(e) => {
            eprintln!("Failed to process GPX: {}", e);
            return;
        }
    };

    println!("1. Summary:");
    println!("   Name: {}", route.name.as_deref().unwrap_or("(unnamed)"));
    println!("   Source: {:?}", route.source);
    println!("   Distance: {:.2} km ({:.1} m)", route.distance_km, route.distance_meters);
    println!("   Points: {} -> {}\n", route.point_count, route.simplified_count);

    println!("2. Elevation:");
    println!("   Gain: +{} m, Loss: -{} m", route.elevation.total_gain, route.elevation.total_loss);
    if let (Some(min), Some(max)) = (route.elevation.min, route.elevation.max) {
        println!("   Range: {} m .. {} m", min, max);
    }
    println!("   Samples: {}\n", route.elevation.samples.len());

    println!("3. Bounds:");
    println!("   SW: {:?}", <[f64; 2]>::from(route.bounds.southwest));
    println!("   NE: {:?}", <[f64; 2]>::from(route.bounds.northeast));
    println!("   Center: {:?}\n", <[f64; 2]>::from(route.bounds.center));

    println!("4. Static map overlay:");
    let encoded = polyline::encode_points(&route.points);
    println!("   Polyline: {}", encoded);
    println!("   Overlay: {}\n", polyline::static_map_overlay(&encoded, &OverlayStyle::default()));

    // Tighter budget
    let config = GeometryConfig {
        max_points: 2,
        ..GeometryConfig::default()
    };
    if let Ok(small) = process_gpx_with_config(gpx, &config) {
        println!("5. With max_points=2: {} points kept", small.simplified_count);
    }

    // Failure modes
    println!("\n6. Errors:");
    for (label, doc) in [("empty gpx", &b"<gpx/>"[..]), ("not xml", &b"<gpx><trk>"[..])] {
        match process_gpx(doc) {
            Ok(_) => println!("   {}: unexpectedly succeeded", label),
            Err(e) => println!("   {}: {:?} - {}", label, e.kind(), e),
        }
    }
}
