use std::path::{Path, PathBuf};

use tabled::Table;

use crate::{
    cli::spinner,
    config::{AnalysisConfig, KEY_ARTISTS},
    error,
    error::Error,
    info,
    management::{self, CollectEvent, CollectOptions},
    report, spotify, success, warning,
};

pub async fn analyze(analysis_config: &Path, plot: Option<PathBuf>) {
    let config = match AnalysisConfig::load(analysis_config).await {
        Ok(config) => config,
        Err(e) => error!("Error loading configuration: {}", e),
    };

    if config.artists.is_empty() {
        warning!("No artists listed under '{}'.", KEY_ARTISTS);
    }

    let pb = spinner("Requesting access token...");
    let ctx = match spotify::connect(&config.settings, &config.credentials()).await {
        Ok(ctx) => ctx,
        Err(e) => {
            pb.finish_and_clear();
            error!("{}", e);
        }
    };

    let options = CollectOptions::from(&config.settings);
    let collected = management::collect(&ctx, &config.artists, &options, |event| match event {
        CollectEvent::ArtistStarted {
            position,
            total,
            query,
        } => pb.set_message(format!("[{}/{}] Searching for {}...", position, total, query)),
        CollectEvent::ArtistResolved(artist) => {
            pb.set_message(format!("Fetching top tracks of {}...", artist.name))
        }
        CollectEvent::TracksFetched { artist, count } => {
            pb.println(format!("Found {} top tracks for {}", count, artist.name))
        }
        CollectEvent::FeaturesFetched {
            track,
            position,
            total,
        } => pb.set_message(format!(
            "Audio features {}/{}: {}",
            position, total, track.name
        )),
        CollectEvent::LookupFailed(failure) => {
            pb.println(format!("Skipped {}: {}", failure.subject, failure.error))
        }
    })
    .await;
    pb.finish_and_clear();

    let outcome = match collected {
        Ok(outcome) => outcome,
        Err(e) => error!("Cannot collect tracks. Err: {}", e),
    };

    for failure in &outcome.failures {
        warning!("{}: {}", failure.subject, failure.error);
    }

    success!(
        "Collected {} tracks from {} of {} artists",
        outcome.tracks.len(),
        outcome.resolved_artists().len(),
        outcome.lookups.len()
    );

    if !outcome.tracks.is_empty() {
        let rows = report::track_rows(&outcome.tracks, &outcome.resolved_artists());
        println!("{}", Table::new(rows));
    }

    let analysis = match report::compute_analysis(&outcome.tracks) {
        Ok(analysis) => analysis,
        Err(e) => {
            warning!("{}", e);
            return;
        }
    };
    println!("{}", Table::new(report::metric_rows(&analysis)));

    let save_path = plot.or_else(|| config.settings.plot_path.clone());
    match report::plot_data(&outcome.tracks, save_path.as_deref()) {
        Ok(Some(path)) => success!("Plot written to {}", path.display()),
        Ok(None) => info!("No plot path configured, skipping plot output."),
        Err(e @ Error::InsufficientData(_)) => warning!("{}, no plot written.", e),
        Err(e) => error!("{}", e),
    }

    report::notify_done("Analysis complete");
}
