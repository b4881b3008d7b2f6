//! Top-track audio feature analysis
//!
//! This library resolves a list of artists on Spotify, collects the audio
//! features (valence, danceability, energy) of their top tracks, computes
//! summary statistics and renders a scatter plot of the result.
//!
//! # Modules
//!
//! - `cli` - Command-line driver with progress output
//! - `config` - Merged YAML configuration and environment overrides
//! - `error` - Error type shared by the whole pipeline
//! - `management` - Track collection and the collecting pipeline
//! - `report` - Statistics, plotting and completion notice
//! - `spotify` - Spotify Web API client
//! - `types` - Data structures and type definitions
//! - `utils` - Small helpers
//!
//! # Example
//!
//! ```
//! use trackcorr::{config::AnalysisConfig, management, report, spotify};
//!
//! #[tokio::main]
//! async fn main() -> trackcorr::error::Result<()> {
//!     let config = AnalysisConfig::load("Configs/job_file.yml".as_ref()).await?;
//!     let ctx = spotify::connect(&config.settings, &config.credentials()).await?;
//!     let options = management::CollectOptions::from(&config.settings);
//!     let outcome = management::collect(&ctx, &config.artists, &options, |_| {}).await?;
//!     let report = report::compute_analysis(&outcome.tracks)?;
//!     println!("{:?}", report.metrics());
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod management;
pub mod report;
pub mod spotify;
pub mod types;
pub mod utils;

/// Prints an informational message with a blue bullet point.
///
/// # Example
///
/// ```
/// info!("Resolving {} artists", count);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program
/// with status 1.
///
/// Only for fatal errors: code after this macro does not run.
///
/// # Example
///
/// ```
/// error!("Error loading configuration: {}", e);
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// For recoverable issues such as an artist that could not be found.
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
