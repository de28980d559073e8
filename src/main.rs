use anyhow::Result;
use clap::Parser;
use sf_bar_map::config::{log_filter, MapConfig, SourceArgs};
use sf_bar_map::controller::MapController;
use sf_bar_map::filter::{fill_color, COLOR_STEPS, ZERO_COLOR};
use sf_bar_map::loader::load_into;
use sf_bar_map::view::SessionView;
use std::collections::BTreeMap;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "sf_bar_map")]
#[command(about = "Load the SF ZIP and bar layers and print a summary")]
struct Args {
    #[command(flatten)]
    sources: SourceArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter())
        .init();

    let args = Args::parse();
    let config = args.sources.apply(MapConfig::from_env());
    let view = SessionView::new(&config);
    let mut controller = MapController::new(config, view);

    let report = load_into(&mut controller, &reqwest::Client::new()).await;

    info!("=== Layer Summary ===");
    match (&report.zip_count, &report.zip_error) {
        (Some(n), _) => info!("ZIP polygons: {} features, {} codes", n, controller.nav().len()),
        (None, Some(e)) => warn!("ZIP layer absent: {}", e),
        _ => {}
    }
    if let Some(e) = &report.sheet_error {
        warn!("Sheet join skipped: {}", e);
    }
    if let Some(join) = &report.join {
        info!(
            "Join: {} matched, {} bars without a sheet row, {} unused rows",
            join.matched, join.unmatched_points, join.unused_rows
        );
    }

    let Some(venues) = controller.venues() else {
        if let Some(e) = &report.venue_error {
            warn!("Bar layer absent: {}", e);
        }
        return Ok(());
    };
    info!("Bars: {}", venues.len());

    // Bars per style
    let fields = &controller.config().fields;
    let mut by_style: BTreeMap<String, usize> = BTreeMap::new();
    for v in venues {
        let style = v.text(&fields.style);
        let key = if style.is_empty() { "(none)".to_string() } else { style };
        *by_style.entry(key).or_insert(0) += 1;
    }
    info!("Style Distribution: {:?}", by_style);

    // Bars per colour bucket, darkest first
    let mut by_color: BTreeMap<&str, usize> = BTreeMap::new();
    for v in venues {
        *by_color.entry(fill_color(v.number(&fields.count))).or_insert(0) += 1;
    }
    for color in COLOR_STEPS.iter().map(|(_, c)| *c).chain([ZERO_COLOR]) {
        info!("  {}: {}", color, by_color.get(color).copied().unwrap_or(0));
    }

    Ok(())
}
