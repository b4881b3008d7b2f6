use std::collections::BTreeMap;

use serde::Serialize;

use crate::{
    error::{Error, Result},
    management::TrackCollection,
    utils,
};

pub const MEAN_VALENCE: &str = "mean_valence";
pub const MAX_DANCEABILITY: &str = "max_danceability";
pub const MEAN_ENERGY: &str = "mean_energy";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub mean_valence: f64,
    pub max_danceability: f64,
    pub mean_energy: Option<f64>,
    pub tracks_analyzed: usize,
}

impl AnalysisReport {
    /// Metric name to value, the shape printed by the CLI.
    pub fn metrics(&self) -> BTreeMap<&'static str, f64> {
        let mut metrics = BTreeMap::new();
        metrics.insert(MEAN_VALENCE, self.mean_valence);
        metrics.insert(MAX_DANCEABILITY, self.max_danceability);
        if let Some(energy) = self.mean_energy {
            metrics.insert(MEAN_ENERGY, energy);
        }
        metrics
    }
}

/// Computes the summary statistics over every collected track.
///
/// Tracks without a given feature are left out of that feature's statistic.
///
/// # Arguments
///
/// * `tracks` - The collected tracks, features may be partially absent
///
/// # Returns
///
/// An [`AnalysisReport`] with the mean valence, the max danceability, the
/// mean energy when any track has one, and the number of tracks looked at.
///
/// # Errors
///
/// [`Error::InsufficientData`] when no valence or no danceability value is
/// present at all, including for an empty collection.
///
/// # Example
///
/// ```
/// let report = compute_analysis(&outcome.tracks)?;
/// println!("mean valence {:.3}", report.mean_valence);
/// ```
pub fn compute_analysis(tracks: &TrackCollection) -> Result<AnalysisReport> {
    let valence: Vec<f64> = tracks.valence().into_iter().flatten().collect();
    let danceability: Vec<f64> = tracks.danceability().into_iter().flatten().collect();
    let energy: Vec<f64> = tracks.energy().into_iter().flatten().collect();

    let mean_valence = utils::mean(&valence).ok_or_else(|| {
        Error::InsufficientData(format!(
            "no valence values among {} collected track(s)",
            tracks.len()
        ))
    })?;
    let max_danceability = utils::max(&danceability).ok_or_else(|| {
        Error::InsufficientData(format!(
            "no danceability values among {} collected track(s)",
            tracks.len()
        ))
    })?;

    Ok(AnalysisReport {
        mean_valence,
        max_danceability,
        mean_energy: utils::mean(&energy),
        tracks_analyzed: tracks.len(),
    })
}
