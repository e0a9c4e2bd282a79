use std::path::PathBuf;

use anyhow::bail;
use clap::{Parser, Subcommand};
use cleave_wm::common::config::{config_file, Config};
use cleave_wm::common::log;
use cleave_wm::layout_engine::{LayoutEngine, SpaceMode};
use cleave_wm::sys::geometry::Rect;
use cleave_wm::sys::screen::{ScreenDescriptor, ScreenId, SpaceId};
use cleave_wm::sys::surface::{SimulatedSurface, WindowId};

#[derive(Parser)]
struct Cli {
    /// Path to configuration file to use (overrides default).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Check that the configuration parses, then exit.
    #[arg(long)]
    validate: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Tile a synthetic set of windows and print the resulting layout.
    Simulate {
        /// Number of windows to open.
        #[arg(long, default_value_t = 4)]
        windows: u32,

        /// Space mode: bsp, monocle or floating.
        #[arg(long, default_value = "bsp")]
        mode: String,

        #[arg(long, default_value_t = 1920.0)]
        width: f64,

        #[arg(long, default_value_t = 1080.0)]
        height: f64,

        /// Emit frames as JSON instead of text.
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    log::init();
    let cli = Cli::parse();

    let path = cli.config.clone().unwrap_or_else(config_file);
    let config = if path.exists() {
        Config::read(&path)?
    } else {
        Config::default()
    };

    if cli.validate {
        println!("config ok: {}", path.display());
        return Ok(());
    }

    match cli.command {
        Some(Commands::Simulate { windows, mode, width, height, json }) => {
            simulate(&config, windows, &mode, width, height, json)
        }
        None => {
            bail!("no window-server backend is wired into this build; try `cleave simulate`")
        }
    }
}

fn simulate(
    config: &Config,
    windows: u32,
    mode: &str,
    width: f64,
    height: f64,
    json: bool,
) -> anyhow::Result<()> {
    let mode = match mode {
        "bsp" => SpaceMode::Bsp,
        "monocle" => SpaceMode::Monocle,
        "floating" => SpaceMode::Floating,
        other => bail!("unknown mode {other:?}"),
    };
    let mut config = config.clone();
    config.settings.default_mode = mode;

    let mut engine = LayoutEngine::new(&config);
    let screen = ScreenId::new(1);
    engine.ensure_screen(
        ScreenDescriptor {
            id: screen,
            frame: Rect::new(0.0, 0.0, width, height),
        },
        SpaceId::new(1),
    );

    let mut surface = SimulatedSurface::new();
    for i in 1..=windows {
        surface.open_window(screen, WindowId::new(i), 1000, Rect::new(0.0, 0.0, 640.0, 480.0));
    }
    let _ = engine.update_windows(screen, &mut surface);

    if json {
        println!("{}", serde_json::to_string_pretty(&engine.layout_frames(screen))?);
    } else {
        print!("{}", engine.draw_tree(screen));
        for (wid, frame) in engine.layout_frames(screen) {
            println!(
                "window {:>3}  x={:>6.1} y={:>6.1} w={:>6.1} h={:>6.1}",
                wid.get(),
                frame.origin.x,
                frame.origin.y,
                frame.size.width,
                frame.size.height
            );
        }
    }
    Ok(())
}
