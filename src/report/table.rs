use std::collections::HashMap;

use crate::{
    management::TrackCollection,
    report::AnalysisReport,
    types::{Artist, MetricTableRow, TrackTableRow},
    utils::format_feature,
};

/// One row per track in collection order. The artist column shows the
/// resolved name and falls back to the artist id.
pub fn track_rows(tracks: &TrackCollection, artists: &[&Artist]) -> Vec<TrackTableRow> {
    let names: HashMap<&str, &str> = artists
        .iter()
        .map(|a| (a.id.as_str(), a.name.as_str()))
        .collect();

    tracks
        .iter()
        .map(|t| TrackTableRow {
            artist: names
                .get(t.artist_id.as_str())
                .map(|n| n.to_string())
                .unwrap_or_else(|| t.artist_id.clone()),
            track: t.name.clone(),
            album: t.album_name.clone(),
            released: t.release_date.clone(),
            popularity: t.popularity,
            valence: format_feature(t.features.valence),
            danceability: format_feature(t.features.danceability),
            energy: format_feature(t.features.energy),
        })
        .collect()
}

pub fn metric_rows(report: &AnalysisReport) -> Vec<MetricTableRow> {
    let mut rows: Vec<MetricTableRow> = report
        .metrics()
        .into_iter()
        .map(|(metric, value)| MetricTableRow {
            metric: metric.to_string(),
            value: format!("{:.3}", value),
        })
        .collect();

    rows.push(MetricTableRow {
        metric: "tracks_analyzed".to_string(),
        value: report.tracks_analyzed.to_string(),
    });
    rows
}
