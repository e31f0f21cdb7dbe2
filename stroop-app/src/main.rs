mod app;
mod icon;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use stroop_experiment::SessionConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

pub use app::App;

/// Directional Stroop task: answer with the WORD, ignore the arrow.
#[derive(Debug, Parser)]
#[command(name = "stroop", version)]
struct Args {
    /// Session config (TOML). Defaults to <config dir>/stroop/config.toml.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of trials in a session.
    #[arg(long)]
    trials: Option<usize>,

    /// Seed for a reproducible trial sequence.
    #[arg(long)]
    seed: Option<u64>,

    /// Hide the distractor arrow.
    #[arg(long)]
    no_distractor: bool,

    /// Borderless fullscreen on the primary monitor.
    #[arg(long)]
    fullscreen: bool,

    /// TrueType/OpenType font for all text.
    #[arg(long)]
    font: Option<PathBuf>,
}

impl Args {
    fn session_config(&self) -> Result<SessionConfig> {
        let mut config = SessionConfig::load(self.config.as_deref())?;
        if let Some(n) = self.trials {
            config.trial_count = n;
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if self.no_distractor {
            config.show_distractor = false;
        }
        config.validate().context("invalid session config")?;
        Ok(config)
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let config = args.session_config()?;
    let font = stroop_render::load_font(args.font.as_deref())?;
    info!(
        os = std::env::consts::OS,
        arch = std::env::consts::ARCH,
        trials = config.trial_count,
        seed = ?config.seed,
        "starting directional stroop"
    );

    let app = App::new(config, font, args.fullscreen)?;
    app.run()?;

    Ok(())
}
