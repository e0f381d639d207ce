//! Fetch GPX documents over HTTP and process them.
//!
//! Run with: cargo run --example fetch_gpx --features http -- <url> [<url>...]

use route_geometry::http::ProgressCallback;
use route_geometry::{GeometryConfig, GpxFetcher};
use std::sync::Arc;
use std::time::Instant;

#[tokio::main]
async fn main() {
    let urls: Vec<String> = std::env::args().skip(1).collect();
    if urls.is_empty() {
        eprintln!("usage: fetch_gpx <url> [<url>...]");
        return;
    }

    let config = GeometryConfig {
        fetch_timeout_secs: 15,
        ..GeometryConfig::default()
    };

    let fetcher = match GpxFetcher::new(&config) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Failed to create fetcher: {}", e);
            return;
        }
    };

    let progress: ProgressCallback = Arc::new(|done, total| {
        println!("  [{}/{}]", done, total);
    });

    let start = Instant::now();
    let results = fetcher.fetch_and_process_many(urls, &config, Some(progress)).await;

    println!("\nFetched {} documents in {:?}\n", results.len(), start.elapsed());
    for fetched in results {
        match fetched.result {
            Ok(route) => println!(
                "OK    {}  {:.2} km  +{} m / -{} m  ({} points)",
                fetched.url,
                route.distance_km,
                route.elevation.total_gain,
                route.elevation.total_loss,
                route.simplified_count
            ),
            Err(e) => println!("FAIL  {}  {:?}: {}", fetched.url, e.kind(), e),
        }
    }
}
