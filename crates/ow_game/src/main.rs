//! Overworld walker -- headless reference host and entry point.
//!
//! Loads the host config, tile map, sprite sheet catalog, and a replay script,
//! then runs the replay through the fixed-step host loop (see `host`). There is
//! no window: each frame's animation selection is what a renderer would draw.
//!
//! Usage: `ow_game [replay.json]`. `RUST_LOG=trace` prints every frame.

mod config;
mod host;
mod replay;
mod tilemap;

use std::path::{Path, PathBuf};

use ow_core::sheet::load_sheet_from_path;

use config::load_config_or_default;
use host::HostWorld;
use replay::load_replay_from_path;
use tilemap::load_tilemap_from_path;

const CONFIG_PATH: &str = "assets/config/host.json";

fn run(replay_override: Option<PathBuf>) -> Result<(), String> {
    let config = load_config_or_default(Path::new(CONFIG_PATH))?;

    let grid = load_tilemap_from_path(&config.map_path)?;
    log::info!(
        "Map '{}' loaded: {}x{} cells of {}px",
        grid.map_id,
        grid.width,
        grid.height,
        grid.cell_size
    );
    let sheet = load_sheet_from_path(&config.sheet_path)?;
    log::info!(
        "Sheet '{}' loaded: {} frames of {}x{}",
        sheet.sheet_id,
        sheet.frame_count,
        sheet.frame_width,
        sheet.frame_height
    );
    let replay_path = replay_override.unwrap_or_else(|| config.replay_path.clone());
    let replay = load_replay_from_path(&replay_path)?;
    let inputs = replay.expanded_inputs();
    log::info!(
        "Replay '{}' loaded: {} frames at {:.4}s",
        replay_path.display(),
        inputs.len(),
        replay.fixed_dt
    );

    let mut world = HostWorld::new(grid, sheet, &config)?;
    let dt_us = replay.fixed_dt_us();
    let mut last_selection = None;
    let mut collided_frames = 0u64;
    for held in &inputs {
        let report = world.run_frame(held, replay.fixed_dt, dt_us);
        if report.collided {
            collided_frames += 1;
        }
        if last_selection != Some(report.selection) {
            log::info!(
                "frame {:>4}: {:<16} pos=({:.1}, {:.1}) v=({:.1}, {:.1}) sheet_frame={}{}",
                report.frame,
                report.selection.to_string(),
                report.position.x,
                report.position.y,
                report.velocity.x,
                report.velocity.y,
                report.sheet_frame,
                if report.on_special_terrain { " [grass]" } else { "" }
            );
            last_selection = Some(report.selection);
        }
        log::trace!("{report:?}");
    }

    let end = world.position();
    log::info!(
        "Replay finished: {} frames, {} colliding, final position ({:.1}, {:.1}) facing {}",
        inputs.len(),
        collided_frames,
        end.x,
        end.y,
        world.facing()
    );
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Overworld walker starting...");

    if let Err(err) = run(std::env::args().nth(1).map(PathBuf::from)) {
        log::error!("{err}");
        std::process::exit(1);
    }
}
