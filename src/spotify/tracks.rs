use reqwest::StatusCode;

use crate::{
    error::{Error, LookupKind, Result},
    spotify::request::{RequestContext, decode, ensure_success},
    types::{AudioFeatures, TopTracksResponse, TrackObject, TrackSummary},
};

fn summarize(track: TrackObject, artist_id: &str) -> TrackSummary {
    let track_artist = track
        .artists
        .into_iter()
        .next()
        .map(|a| a.id)
        .unwrap_or_else(|| artist_id.to_string());

    TrackSummary {
        id: track.id,
        name: track.name,
        album_name: track.album.name,
        album_id: track.album.id,
        release_date: track.album.release_date,
        popularity: track.popularity,
        artist_id: track_artist,
    }
}

/// Fetches the top tracks of an artist in the given market.
///
/// Album and popularity fields are flattened into one [`TrackSummary`] per
/// track, in the order the catalog returned them.
pub async fn get_top_tracks(
    ctx: &RequestContext,
    artist_id: &str,
    market: &str,
    limit: u32,
) -> Result<Vec<TrackSummary>> {
    let path = format!("artists/{id}/top-tracks", id = artist_id);
    let query = [
        ("market", market.to_string()),
        ("include_groups", "album".to_string()),
        ("limit", limit.to_string()),
    ];

    let response = ctx.get(&path, &query).await?;
    if response.status() == StatusCode::NOT_FOUND {
        return Err(Error::NotFound {
            kind: LookupKind::TopTracks,
            query: artist_id.to_string(),
        });
    }

    let response = ensure_success(response, &path).await?;
    let json: TopTracksResponse = decode(response, &path).await?;

    Ok(json
        .tracks
        .into_iter()
        .map(|t| summarize(t, artist_id))
        .collect())
}

/// Fetches valence, danceability and energy of a single track.
///
/// Fields the catalog omits or sends as `null` stay `None`.
pub async fn get_audio_features(ctx: &RequestContext, track_id: &str) -> Result<AudioFeatures> {
    let path = format!("audio-features/{id}", id = track_id);

    let response = ctx.get(&path, &[]).await?;
    if response.status() == StatusCode::NOT_FOUND {
        return Err(Error::NotFound {
            kind: LookupKind::AudioFeatures,
            query: track_id.to_string(),
        });
    }

    let response = ensure_success(response, &path).await?;
    decode(response, &path).await
}
