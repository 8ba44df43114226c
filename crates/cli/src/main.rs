#![deny(unsafe_code)]
//! Headless renderer for the fog spotlight engine.
//!
//! Subcommands:
//! - `render [backend]`: run N frames on a synthetic 60 Hz clock, write a PNG
//! - `list`: print backends, noise kinds, edge policies and inactive-fog modes
//! - `params`: print the parameter schema

mod error;

use clap::{Parser, Subcommand};
use error::CliError;
use fog_core::config::{Backend, EdgePolicy, EngineConfig, InactiveFog};
use fog_core::noise_field::NoiseKind;
use fog_core::spotlight::SpotlightState;
use fog_core::viewport::Viewport;
use fog_core::Srgb;
use fog_engine::{AnimationDriver, FrameLoop, ManualScheduler, RendererKind, SpotlightInput};
use glam::DVec2;
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "fog", about = "Fog spotlight engine CLI")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Raise log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG wins.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render N frames and write the last one as a PNG.
    Render {
        /// Backend name ("particle" or "shader"). Defaults to the params value.
        backend: Option<String>,

        #[arg(short = 'W', long, default_value_t = 800)]
        width: u32,

        #[arg(short = 'H', long, default_value_t = 600)]
        height: u32,

        /// Number of 60 Hz frames to simulate.
        #[arg(short, long, default_value_t = 120)]
        frames: u32,

        /// Seed for puff placement.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Spotlight center x; defaults to the horizontal center.
        #[arg(long)]
        spot_x: Option<f64>,

        /// Spotlight center y; defaults to the vertical center.
        #[arg(long)]
        spot_y: Option<f64>,

        /// Render with the spotlight switched off.
        #[arg(long)]
        inactive: bool,

        /// Background color behind the fog.
        #[arg(long, default_value = "#0b0f17")]
        background: String,

        /// Keep the fog's alpha instead of compositing over the background.
        #[arg(long)]
        transparent: bool,

        #[arg(short, long, default_value = "fog.png")]
        output: PathBuf,

        /// Engine parameters as a JSON object.
        #[arg(long, default_value = "{}")]
        params: String,
    },
    /// List backends and enumerated options.
    List,
    /// Print the parameter schema with defaults and ranges.
    Params,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::List => {
            let backends = RendererKind::list_backends();
            let noise: Vec<&str> = NoiseKind::ALL.iter().map(|k| k.name()).collect();
            let edges: Vec<&str> = EdgePolicy::ALL.iter().map(|e| e.name()).collect();
            let inactive: Vec<&str> = InactiveFog::ALL.iter().map(|m| m.name()).collect();
            if cli.json {
                let info = serde_json::json!({
                    "backends": backends,
                    "noise": noise,
                    "edge": edges,
                    "inactive_fog": inactive,
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("Backends:");
                for name in backends {
                    println!("  {name}");
                }
                println!("Noise kinds: {}", noise.join(", "));
                println!("Edge policies: {}", edges.join(", "));
                println!("Inactive fog: {}", inactive.join(", "));
            }
        }
        Command::Params => {
            let schema = EngineConfig::param_schema();
            println!("{}", serde_json::to_string_pretty(&schema)?);
        }
        Command::Render {
            backend,
            width,
            height,
            frames,
            seed,
            spot_x,
            spot_y,
            inactive,
            background,
            transparent,
            output,
            params,
        } => {
            let params: serde_json::Value = serde_json::from_str(&params)
                .map_err(|e| CliError::Input(format!("invalid --params JSON: {e}")))?;
            let mut config = EngineConfig::from_json(&params)?;
            if let Some(name) = &backend {
                config.backend = Backend::from_name(name)?;
            }
            let background = if transparent {
                None
            } else {
                Some(Srgb::from_hex(&background)?)
            };

            let viewport = Viewport::new(width, height);
            let center = DVec2::new(
                spot_x.unwrap_or(f64::from(width) / 2.0),
                spot_y.unwrap_or(f64::from(height) / 2.0),
            );
            let input = SpotlightInput::new(SpotlightState {
                active: !inactive,
                ..SpotlightState::from_config(&config, center)
            });

            let renderer = RendererKind::from_config(&config, viewport);
            let mut driver = AnimationDriver::new(config.clone(), renderer, viewport, seed)?;
            let mut frame_loop = FrameLoop::new(ManualScheduler::new());

            frame_loop.start()?;
            for i in 0..frames {
                let now = f64::from(i) / fog_engine::NOMINAL_FPS;
                for handle in frame_loop.scheduler_mut().take_pending() {
                    frame_loop.on_frame(handle, || {
                        driver.tick(now, input.snapshot());
                    })?;
                }
            }
            frame_loop.stop();

            fog_engine::snapshot::write_png(driver.renderer().surface(), background, &output)?;

            if cli.json {
                let info = serde_json::json!({
                    "backend": config.backend.name(),
                    "width": width,
                    "height": height,
                    "frames": driver.frames(),
                    "seed": seed,
                    "spotlight": { "x": center.x, "y": center.y, "active": !inactive },
                    "output": output.display().to_string(),
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                eprintln!(
                    "rendered {} ({width}x{height}, {} frames, seed {seed}) -> {}",
                    config.backend.name(),
                    driver.frames(),
                    output.display()
                );
            }
        }
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        if json_mode {
            let j = serde_json::json!({
                "error": e.to_string(),
                "kind": e.kind(),
                "exit_code": e.exit_code(),
            });
            eprintln!("{}", serde_json::to_string_pretty(&j).unwrap_or_default());
        } else {
            eprintln!("error: {e}");
        }
        process::exit(e.exit_code());
    }
}
