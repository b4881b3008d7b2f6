//! Statistics, plotting and completion signalling over a collected track set.

mod analysis;
mod plot;
mod table;

pub use analysis::{AnalysisReport, MAX_DANCEABILITY, MEAN_ENERGY, MEAN_VALENCE, compute_analysis};
pub use plot::{PLOT_SIZE, PLOT_TITLE, X_LABEL, Y_LABEL, plot_data};
pub use table::{metric_rows, track_rows};

use crate::success;

/// Signals the end of a run on the console. There is no other channel.
pub fn notify_done(message: &str) {
    success!("Notification: {}", message);
}
