mod app;
mod cli;
mod config;
mod input;
mod presenter;
mod renderer;
mod text;

use app::App;
use cli::Cli;
use clap::Parser;
use config::Settings;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let mut settings = Settings::load_or_default(cli.config.as_deref())?;
    if let Some(dir) = cli.output_dir {
        settings.export.output_dir = dir;
    }

    App::new(&settings, cli.seed)?.run()
}
