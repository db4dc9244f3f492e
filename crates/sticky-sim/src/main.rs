//! sticky-sim - Replay scroll scripts against sticky headers
//!
//! Builds a headless page from a scene file, feeds the scene's scroll offsets
//! through an event loop, and prints what every sticky element did.
//!
//! # Usage
//!
//! ```sh
//! # Human-readable output
//! sticky-sim crates/sticky-sim/scenes/headers.toml
//!
//! # One JSON object per scroll step
//! sticky-sim --json crates/sticky-sim/scenes/headers.toml
//!
//! # Page defaults from a config file instead of the scene's [sticky] table
//! sticky-sim --config sticky.toml crates/sticky-sim/scenes/headers.toml
//! ```
//!
//! Logging goes to stderr and is controlled with `RUST_LOG`
//! (e.g. `RUST_LOG=sticky=debug`).

use std::env;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};

mod runner;
mod scene;

#[cfg(test)]
mod scene_test;

use scene::Scene;
use sticky::StickyConfig;

/// Parsed command line
#[derive(Debug, PartialEq)]
pub(crate) struct Options {
    scene: PathBuf,
    json: bool,

    /// Sticky defaults file replacing the scene's `[sticky]` table
    config: Option<PathBuf>,
}

const USAGE: &str = "usage: sticky-sim [--json] [--config <sticky.toml>] <scene.toml>";

pub(crate) fn parse_args(args: &[String]) -> Result<Option<Options>> {
    let mut scene = None;
    let mut json = false;
    let mut config = None;

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(None),
            "--json" => json = true,
            "--config" => match iter.next() {
                Some(path) => config = Some(PathBuf::from(path)),
                None => bail!("--config requires a path\n{}", USAGE),
            },
            flag if flag.starts_with('-') => bail!("unknown option: {}\n{}", flag, USAGE),
            path => {
                if scene.is_some() {
                    bail!("more than one scene given\n{}", USAGE);
                }
                scene = Some(PathBuf::from(path));
            }
        }
    }

    match scene {
        Some(scene) => Ok(Some(Options { scene, json, config })),
        None => bail!("missing scene file\n{}", USAGE),
    }
}

fn setup_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // Respect NO_COLOR environment variable for testing
    let use_ansi = env::var("NO_COLOR").is_err();

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_line_number(true)
                .with_ansi(use_ansi),
        )
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let Some(options) = parse_args(&args)? else {
        println!("{}", USAGE);
        return Ok(());
    };

    setup_logging();

    let mut scene = Scene::load(&options.scene)?;
    if let Some(path) = &options.config {
        scene.sticky = StickyConfig::load(path);
    }
    let reports = runner::run(&scene)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for report in &reports {
        if options.json {
            let line = serde_json::to_string(report).context("failed to encode step report")?;
            writeln!(out, "{}", line)?;
        } else {
            writeln!(out, "{}", runner::format_step(report))?;
        }
    }
    out.flush()?;

    Ok(())
}
