mod audit;
mod cli;
mod export;
mod script;
mod software_viewer;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use clap::Parser;
use pano_hotspot::{FsFetcher, InteractionController, RasterOverlay, TourConfig};

use crate::cli::Args;
use crate::software_viewer::SoftwareViewer;

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::init();

    let config = match args.config.as_ref() {
        Some(path) => TourConfig::load(path)
            .with_context(|| format!("loading tour config {}", path.display()))?,
        None => TourConfig::builtin(),
    };

    if args.audit {
        let report = audit::audit_assets(&args.assets, &config.catalog)
            .context("auditing asset tree")?;
        report.print();
        ensure!(
            report.is_complete(),
            "{} asset(s) missing under {}",
            report.missing.len(),
            args.assets.display()
        );
        return Ok(());
    }

    if let Some(room) = args.start_room.as_deref() {
        ensure!(
            config.catalog.room(room).is_some(),
            "unknown start room '{room}'"
        );
    }

    let bounds = args.viewer_bounds();
    let viewer = SoftwareViewer::new(&args.assets, args.surface, bounds, config.fov);
    let overlay = RasterOverlay::new(
        (bounds.x + bounds.width).ceil() as u32,
        (bounds.y + bounds.height).ceil() as u32,
    )
    .context("allocating highlight overlay")?;
    let fetcher = Arc::new(FsFetcher::new(&args.assets));
    let mut controller = InteractionController::new(
        Arc::new(config.catalog.clone()),
        &config.interaction,
        fetcher,
        viewer,
        overlay,
    )
    .context("validating tour catalog")?;

    let settle_timeout = Duration::from_millis(args.settle_timeout_ms);
    controller.start(args.start_room.as_deref());
    let settled = controller.settle(settle_timeout);
    println!(
        "[pano_viewer] tour loaded from {} ({} rooms, settled={settled})",
        args.assets.display(),
        config.catalog.rooms().len()
    );
    script::report_state(&controller);

    if let Some(path) = args.script.as_ref() {
        let script = script::load_script(path)?;
        let summary = script::run_script(&mut controller, &script, settle_timeout);
        println!(
            "[pano_viewer] replayed {} steps: {} hovers, {} activations, {} ignored, {} throttled",
            summary.steps,
            summary.hovers,
            summary.activations,
            summary.ignored,
            summary.throttled
        );
    }

    if let Some(path) = args.dump_overlay.as_ref() {
        let stats = export::dump_overlay_to_png(controller.overlay(), path)
            .with_context(|| format!("writing overlay PNG to {}", path.display()))?;
        println!(
            "[pano_viewer] overlay exported to {} ({}x{}, {} painted pixels)",
            path.display(),
            stats.width,
            stats.height,
            stats.painted_pixels
        );
        if let Some((min_x, min_y, max_x, max_y)) = stats.painted_bounds {
            println!("  painted bounds ({min_x}, {min_y}) - ({max_x}, {max_y})");
        }
    }

    Ok(())
}
