//! REST API server for the SF bar map
//!
//! Loads the ZIP and bar layers in the background and serves the map session
//! to a browser page. Requests are accepted while the layers are loading.
//!
//! Usage:
//!   ./target/release/map_server [options]
//!
//! Options:
//!   --port PORT            Port to listen on (default: 8080)
//!   --zip-source SRC       ZIP polygon GeoJSON (path or URL)
//!   --venue-source SRC     Bar point GeoJSON (path or URL)
//!   --sheet-url SRC        Bar attribute CSV (path or URL)
//!   --no-sheet             Skip the sheet join
//!   --count-field NAME     Attribute holding the visit count
//!
//! Environment variables:
//!   RUST_LOG, SFMAP_ZIP_SOURCE, SFMAP_VENUE_SOURCE, SFMAP_SHEET_URL,
//!   SFMAP_COUNT_FIELD

use anyhow::Result;
use clap::Parser;
use sf_bar_map::api::{self, MapService};
use sf_bar_map::config::{log_filter, MapConfig, SourceArgs};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "map_server")]
#[command(about = "Serve the SF ZIP and bar map over HTTP")]
struct Args {
    /// Port to listen on
    #[arg(long, default_value = "8080")]
    port: u16,

    #[command(flatten)]
    sources: SourceArgs,
}

fn print_banner(port: u16, config: &MapConfig) {
    println!("============================================================");
    println!("                 SF BAR MAP API SERVER");
    println!("============================================================");
    println!();
    println!("  Port:     {}", port);
    println!("  REST:     http://localhost:{}/api/v1/", port);
    println!("  ZIPs:     {}", config.zip_source);
    println!("  Bars:     {}", config.venue_source);
    println!("  Sheet:    {}", config.sheet_source.as_deref().unwrap_or("(none)"));
    println!();
    println!("REST Endpoints:");
    println!("  GET  /api/v1/health              Health check");
    println!("  GET  /api/v1/status              Layer load report");
    println!("  GET  /api/v1/view                Viewport and filters");
    println!("  GET  /api/v1/zips                Sorted ZIP list");
    println!("  GET  /api/v1/zips/search?q=      ZIP list search");
    println!("  GET  /api/v1/zips/geojson        ZIP layer");
    println!("  POST /api/v1/zips/:zip/select    Zoom to ZIP");
    println!("  POST /api/v1/zips/:zip/hover     Highlight ZIP");
    println!("  POST /api/v1/zips/:zip/unhover   Clear highlight");
    println!("  POST /api/v1/zips/:zip/click     Fit ZIP");
    println!("  GET  /api/v1/styles              Style options");
    println!("  GET  /api/v1/venues              Filtered bar layer");
    println!("  POST /api/v1/filters             Update filters");
    println!("  POST /api/v1/filters/clear       Reset filters");
    println!("  POST /api/v1/sidebar/toggle      Toggle sidebar");
    println!();
    println!("============================================================");
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(log_filter())
        .init();

    let args = Args::parse();
    let config = args.sources.apply(MapConfig::from_env());

    print_banner(args.port, &config);

    let service = Arc::new(MapService::new(config));

    let loader = service.clone();
    tokio::spawn(async move {
        loader.load().await;
    });

    let addr: SocketAddr = format!("0.0.0.0:{}", args.port).parse()?;
    let app = api::router(service);
    tracing::info!("Starting REST server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
