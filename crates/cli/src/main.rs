#![deny(unsafe_code)]
//! CLI binary for flow-field particle advection.
//!
//! Subcommands:
//! - `render`: run the simulation for N frames, draw trails, write PNG
//! - `field`: write the velocity field (glyphs or speed map) as PNG
//! - `seeds`: print the generated seeds
//! - `config`: print the effective configuration and its schema

mod error;

use clap::{Args, Parser, Subcommand};
use error::CliError;
use flow_field_core::{FieldGrid, FlowConfig, FlowSimulation, SeedSet, Xorshift64};
use flow_field_render::snapshot::write_png;
use flow_field_render::{
    mark_seeds, render_field, FieldStyle, Theme, TrailRenderer, DEFAULT_GLYPH_SCALE,
    DEFAULT_GLYPH_SPACING,
};
use serde_json::{json, Map, Value};
use std::path::{Path, PathBuf};
use std::process;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "flow-field", about = "Seed-driven flow-field particle renderer")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

/// Options shared by every subcommand that builds a simulation.
#[derive(Args)]
struct SimArgs {
    /// Canvas width in pixels (overrides params).
    #[arg(short = 'W', long)]
    width: Option<usize>,

    /// Canvas height in pixels (overrides params).
    #[arg(short = 'H', long)]
    height: Option<usize>,

    /// PRNG seed for deterministic output.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Simulation parameters as a JSON object.
    #[arg(long, default_value = "{}")]
    params: String,

    /// JSON file of parameters; `--params` keys take precedence.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Animate particles for N frames and write the trail image.
    Render {
        #[command(flatten)]
        sim: SimArgs,

        /// Number of frames to simulate.
        #[arg(short, long, default_value_t = 300)]
        frames: usize,

        /// Frame rate used to derive timestamps.
        #[arg(long, default_value_t = 60.0)]
        fps: f64,

        /// Color theme (light, dark).
        #[arg(short, long, default_value = "light")]
        theme: String,

        /// Draw seed markers over the trails.
        #[arg(long)]
        show_seeds: bool,

        /// Output file path.
        #[arg(short, long, default_value = "flow.png")]
        output: PathBuf,
    },
    /// Write the velocity field as glyphs or a speed map.
    Field {
        #[command(flatten)]
        sim: SimArgs,

        /// Field view (glyphs, speed).
        #[arg(long, default_value = "glyphs")]
        style: String,

        /// Pixels between glyph samples.
        #[arg(long, default_value_t = DEFAULT_GLYPH_SPACING)]
        spacing: usize,

        /// Glyph line length per unit of velocity.
        #[arg(long, default_value_t = DEFAULT_GLYPH_SCALE)]
        scale: f64,

        /// Color theme (light, dark).
        #[arg(short, long, default_value = "light")]
        theme: String,

        /// Draw seed markers over the field.
        #[arg(long)]
        show_seeds: bool,

        /// Output file path.
        #[arg(short, long, default_value = "field.png")]
        output: PathBuf,
    },
    /// Print the seeds a simulation would use.
    Seeds {
        #[command(flatten)]
        sim: SimArgs,
    },
    /// Print the effective configuration and its schema.
    Config {
        #[command(flatten)]
        sim: SimArgs,
    },
}

/// Parses `text` as a JSON object, naming `source` in the error.
fn parse_object(text: &str, source: &str) -> Result<Map<String, Value>, CliError> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| CliError::Input(format!("invalid {source} JSON: {e}")))?;
    match value {
        Value::Object(map) => Ok(map),
        other => Err(CliError::Input(format!(
            "{source} must be a JSON object, got {other}"
        ))),
    }
}

/// Layers config file, then `--params`, then explicit dimensions.
fn merge_params(
    file: Option<&str>,
    params: &str,
    width: Option<usize>,
    height: Option<usize>,
) -> Result<Value, CliError> {
    let mut merged = match file {
        Some(text) => parse_object(text, "config file")?,
        None => Map::new(),
    };
    merged.extend(parse_object(params, "--params")?);
    if let Some(w) = width {
        merged.insert("width".into(), json!(w));
    }
    if let Some(h) = height {
        merged.insert("height".into(), json!(h));
    }
    Ok(Value::Object(merged))
}

fn read_config_file(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|e| CliError::Io(format!("{}: {e}", path.display())))
}

fn load_config(sim: &SimArgs) -> Result<FlowConfig, CliError> {
    let file = sim.config.as_deref().map(read_config_file).transpose()?;
    let params = merge_params(file.as_deref(), &sim.params, sim.width, sim.height)?;
    debug!(%params, "merged parameters");
    Ok(FlowConfig::from_json(&params)?)
}

fn parse_theme(name: &str) -> Result<Theme, CliError> {
    Theme::from_name(name).map_err(|e| CliError::Input(e.to_string()))
}

/// Seeds exactly as `FlowSimulation::new(config, seed)` would lay them out,
/// without building the grid or the particle population.
fn build_seeds(config: &FlowConfig, seed: u64) -> Result<SeedSet, CliError> {
    config.validate()?;
    Ok(config.seed_set(&mut Xorshift64::new(seed))?)
}

/// Text listing of every parameter with its value and schema entry.
fn describe_config(config: &FlowConfig) -> String {
    let params = config.params();
    let schema = FlowConfig::param_schema();
    let mut out = String::new();
    for (key, value) in params.as_object().into_iter().flatten() {
        let about = &schema[key.as_str()];
        out.push_str(&format!(
            "{key} = {value}\n    {} ({}, default {})\n",
            about["description"].as_str().unwrap_or_default(),
            about["type"].as_str().unwrap_or_default(),
            about["default"]
        ));
    }
    out
}

fn print_json(value: &Value) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Render {
            sim,
            frames,
            fps,
            theme,
            show_seeds,
            output,
        } => {
            if !(fps.is_finite() && fps > 0.0) {
                return Err(CliError::Input(format!("--fps must be positive, got {fps}")));
            }
            let theme = parse_theme(&theme)?;
            let config = load_config(&sim)?;
            let mut simulation = FlowSimulation::new(config, sim.seed)?;
            let cfg = simulation.config();
            let mut renderer = TrailRenderer::new(cfg.width, cfg.height)?;

            info!(frames, fps, seed = sim.seed, "rendering");
            let frame_ms = 1000.0 / fps;
            let mut respawned = 0;
            for i in 0..frames {
                respawned += simulation.frame(i as f64 * frame_ms);
                renderer.draw(simulation.particles());
            }
            if show_seeds {
                renderer.mark_seeds(simulation.seeds());
            }
            write_png(renderer.buffer(), theme, &output)?;
            info!(respawned, output = %output.display(), "wrote trail image");

            let cfg = simulation.config();
            if cli.json {
                print_json(&json!({
                    "width": cfg.width,
                    "height": cfg.height,
                    "frames": frames,
                    "fps": fps,
                    "seed": sim.seed,
                    "seeds": simulation.seeds().len(),
                    "particles": simulation.particles().len(),
                    "respawned": respawned,
                    "output": output.display().to_string(),
                }))?;
            } else {
                eprintln!(
                    "rendered {} particles ({}x{}, {frames} frames, seed {}) -> {}",
                    simulation.particles().len(),
                    cfg.width,
                    cfg.height,
                    sim.seed,
                    output.display()
                );
            }
        }
        Command::Field {
            sim,
            style,
            spacing,
            scale,
            theme,
            show_seeds,
            output,
        } => {
            let theme = parse_theme(&theme)?;
            let style =
                FieldStyle::from_name(&style).map_err(|e| CliError::Input(e.to_string()))?;
            if !scale.is_finite() {
                return Err(CliError::Input(format!("--scale must be finite, got {scale}")));
            }
            let config = load_config(&sim)?;
            let seeds = build_seeds(&config, sim.seed)?;
            let grid = FieldGrid::build_with(&seeds, config.width, config.height, config.falloff)?;
            let mut buffer = render_field(&grid, style, spacing, scale)?;
            if show_seeds {
                mark_seeds(&mut buffer, &seeds);
            }
            write_png(&buffer, theme, &output)?;

            let max_speed = grid.max_speed();
            if cli.json {
                print_json(&json!({
                    "width": buffer.width(),
                    "height": buffer.height(),
                    "seed": sim.seed,
                    "style": style.name(),
                    "seeds": seeds.len(),
                    "max_speed": max_speed,
                    "output": output.display().to_string(),
                }))?;
            } else {
                eprintln!(
                    "rendered field ({}x{}, max speed {max_speed:.2} px/s) -> {}",
                    buffer.width(),
                    buffer.height(),
                    output.display()
                );
            }
        }
        Command::Seeds { sim } => {
            let config = load_config(&sim)?;
            let seeds = build_seeds(&config, sim.seed)?;
            if cli.json {
                print_json(&serde_json::to_value(&seeds)?)?;
            } else {
                for (i, s) in seeds.iter().enumerate() {
                    println!(
                        "{i:>3}  pos ({:.1}, {:.1})  vel ({:.1}, {:.1})  radius {:.1}",
                        s.position.0, s.position.1, s.velocity.0, s.velocity.1, s.radius
                    );
                }
            }
        }
        Command::Config { sim } => {
            let config = load_config(&sim)?;
            config.validate()?;
            if cli.json {
                print_json(&json!({
                    "params": config.params(),
                    "schema": FlowConfig::param_schema(),
                }))?;
            } else {
                print!("{}", describe_config(&config));
            }
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        if json_mode {
            let j = json!({"error": e.to_string(), "exit_code": e.exit_code()});
            eprintln!("{}", serde_json::to_string_pretty(&j).unwrap_or_default());
        } else {
            eprintln!("error: {e}");
        }
        process::exit(e.exit_code());
    }
}
