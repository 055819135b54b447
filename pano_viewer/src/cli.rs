use std::path::PathBuf;

use clap::Parser;
use pano_hotspot::ScreenRect;

#[derive(Parser, Debug)]
#[command(
    about = "Headless panorama tour viewer that replays pointer scripts against color-coded hotspots",
    version
)]
pub struct Args {
    /// Tour config JSON (catalog, hotspot colors, interaction tuning). Defaults to the
    /// built-in tour
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory asset paths are resolved against
    #[arg(long, default_value = ".")]
    pub assets: PathBuf,

    /// Backing pixel size of the rendered viewer surface, as WIDTHxHEIGHT
    #[arg(long, default_value = "1280x720", value_parser = parse_surface)]
    pub surface: (u32, u32),

    /// Where the surface sits in the viewport, as X,Y,WIDTH,HEIGHT. Defaults to the surface
    /// size at the origin
    #[arg(long, value_parser = parse_bounds)]
    pub bounds: Option<ScreenRect>,

    /// Room to open instead of the first catalog room
    #[arg(long)]
    pub start_room: Option<String>,

    /// JSON script of pointer, camera and selector steps to replay
    #[arg(long)]
    pub script: Option<PathBuf>,

    /// When set, write the highlight overlay to disk (PNG) after the script
    #[arg(long)]
    pub dump_overlay: Option<PathBuf>,

    /// Check that every room and furniture combination has its visible and ID image, then exit
    #[arg(long)]
    pub audit: bool,

    /// How long to wait for a room or furniture reload to settle
    #[arg(long, default_value_t = 5000)]
    pub settle_timeout_ms: u64,
}

impl Args {
    pub fn viewer_bounds(&self) -> ScreenRect {
        self.bounds.unwrap_or(ScreenRect::new(
            0.0,
            0.0,
            self.surface.0 as f32,
            self.surface.1 as f32,
        ))
    }
}

fn parse_surface(value: &str) -> Result<(u32, u32), String> {
    let (width, height) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{value}'"))?;
    let width: u32 = width
        .trim()
        .parse()
        .map_err(|err| format!("invalid width '{width}': {err}"))?;
    let height: u32 = height
        .trim()
        .parse()
        .map_err(|err| format!("invalid height '{height}': {err}"))?;
    if width == 0 || height == 0 {
        return Err(format!("surface must be non-empty, got {width}x{height}"));
    }
    Ok((width, height))
}

fn parse_bounds(value: &str) -> Result<ScreenRect, String> {
    let parts = value
        .split(',')
        .map(|part| {
            part.trim()
                .parse::<f32>()
                .map_err(|err| format!("invalid bounds component '{part}': {err}"))
        })
        .collect::<Result<Vec<_>, _>>()?;
    let [x, y, width, height] = parts[..] else {
        return Err(format!("expected X,Y,WIDTH,HEIGHT, got '{value}'"));
    };
    if width <= 0.0 || height <= 0.0 {
        return Err(format!("bounds must have a positive size, got {width}x{height}"));
    }
    Ok(ScreenRect::new(x, y, width, height))
}
