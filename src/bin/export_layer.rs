//! Load, join and filter the bar layer once, then print it as GeoJSON
//!
//! Run: ./target/release/export_layer --min-count 2 --style Dive > bars.geojson

use anyhow::{bail, Result};
use clap::Parser;
use sf_bar_map::config::{log_filter, MapConfig, SourceArgs};
use sf_bar_map::controller::{MapController, UiEvent};
use sf_bar_map::loader::load_into;
use sf_bar_map::view::SessionView;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "export_layer")]
#[command(about = "Print the filtered bar layer as GeoJSON")]
struct Args {
    /// Minimum visit count
    #[arg(long, default_value = "0")]
    min_count: u32,

    /// Only bars of this style (case-insensitive)
    #[arg(long)]
    style: Option<String>,

    /// Only bars whose name contains this text (case-insensitive)
    #[arg(long)]
    search: Option<String>,

    /// Export the ZIP polygon layer instead of the bars
    #[arg(long)]
    zips: bool,

    #[command(flatten)]
    sources: SourceArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays valid GeoJSON
    tracing_subscriber::fmt()
        .with_env_filter(log_filter())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = args.sources.apply(MapConfig::from_env());
    let view = SessionView::new(&config);
    let mut controller = MapController::new(config, view);

    let report = load_into(&mut controller, &reqwest::Client::new()).await;

    let geojson = if args.zips {
        if let Some(e) = report.zip_error {
            bail!("ZIP layer failed to load: {}", e);
        }
        controller.view().polygons_geojson()
    } else {
        if let Some(e) = report.venue_error {
            bail!("Bar layer failed to load: {}", e);
        }
        controller.handle(UiEvent::MinCountChanged(args.min_count));
        if let Some(style) = args.style {
            controller.handle(UiEvent::StyleChanged(style));
        }
        if let Some(search) = args.search {
            controller.handle(UiEvent::SearchChanged(search));
        }
        info!("{} bars pass the filters", controller.visible_count());
        controller.view().points_geojson()
    };

    println!("{}", serde_json::to_string_pretty(&geojson)?);
    Ok(())
}
