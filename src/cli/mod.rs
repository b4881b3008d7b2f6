//! # CLI Module
//!
//! The command-line layer of trackcorr. It drives the analysis pipeline and
//! owns everything the user sees: spinners while requests are in flight,
//! tables of tracks and metrics, warnings for skipped lookups and the final
//! notification.
//!
//! ```text
//! CLI Layer (progress, tables, exit codes)
//!     ↓
//! Management Layer (collecting tracks)      Report Layer (statistics, plot)
//!     ↓
//! API Layer (Spotify Web API)
//! ```
//!
//! Fatal errors (configuration, authentication, network, output) end the
//! process with exit status 1 through the [`error!`](crate::error!) macro.

mod analyze;

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

pub use analyze::analyze;

fn spinner(message: &str) -> ProgressBar {
    let style = ProgressStyle::with_template("{spinner:.blue} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");

    let pb = ProgressBar::new_spinner();
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
