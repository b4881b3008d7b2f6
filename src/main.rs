use std::path::PathBuf;

use clap::{
    Parser,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};

use trackcorr::{cli, config, error, warning};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    /// Path to the analysis configuration file (or a directory holding
    /// user_config.yml, job_file.yml and system_config.yml)
    analysis_config: PathBuf,

    /// Write the scatter plot to this path (.svg or .png, .svg is appended
    /// when no extension is given)
    #[clap(long)]
    plot: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        warning!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();

    tokio::select! {
        _ = cli::analyze(&cli.analysis_config, cli.plot) => {}
        _ = tokio::signal::ctrl_c() => {
            error!("Interrupted, analysis aborted.");
        }
    }
}
