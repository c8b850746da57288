//! # Fiber Preview
//!
//! Native preview tool for the fiber network background.

use anyhow::Context;
use clap::Parser;
use fiber_cli::{load_config, run_paths, run_render, CliArgs, Command};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays machine-readable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fiber_preview=info,fiber_cli=info,fiber_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = CliArgs::parse();
    let config = load_config(args.config.as_deref()).context("Failed to load engine config")?;

    match &args.command {
        Command::Paths(paths) => {
            let json = run_paths(&config, paths)?;
            println!("{json}");
        }
        Command::Render(render) => {
            tracing::info!(
                "Rendering {} frames at {}x{} into {}",
                render.frames,
                render.view.width,
                render.view.height,
                render.out.display()
            );
            let summary = run_render(config, render)
                .with_context(|| format!("Failed to render into {}", render.out.display()))?;
            println!("{}", summary.tier);
        }
    }

    Ok(())
}
