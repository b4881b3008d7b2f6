use chrono::Utc;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub obtained_at: u64,
}

impl AccessToken {
    pub fn new(access_token: String, token_type: Option<String>, expires_in: Option<u64>) -> Self {
        Self {
            access_token,
            token_type: token_type.unwrap_or_else(|| "Bearer".to_string()),
            expires_in: expires_in.unwrap_or(3600),
            obtained_at: Utc::now().timestamp() as u64,
        }
    }

    /// The token is considered expired four minutes ahead of the provider's
    /// deadline so an in-flight run never presents a stale token.
    pub fn is_expired(&self) -> bool {
        let now = Utc::now().timestamp() as u64;
        now + 240 >= self.obtained_at + self.expires_in
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: Option<String>,
    pub token_type: Option<String>,
    pub expires_in: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artist {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArtistSearchResponse {
    pub artists: ArtistsPage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArtistsPage {
    pub items: Vec<Artist>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TopTracksResponse {
    pub tracks: Vec<TrackObject>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackObject {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub popularity: u32,
    #[serde(default)]
    pub artists: Vec<TrackArtist>,
    pub album: TrackAlbum,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackArtist {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackAlbum {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub release_date: String,
}

/// A top track flattened to the fields the analysis cares about, before its
/// audio features are known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackSummary {
    pub id: String,
    pub name: String,
    pub album_name: String,
    pub album_id: String,
    pub release_date: String,
    pub popularity: u32,
    pub artist_id: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AudioFeatures {
    #[serde(default)]
    pub valence: Option<f64>,
    #[serde(default)]
    pub danceability: Option<f64>,
    #[serde(default)]
    pub energy: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackRecord {
    pub id: String,
    pub name: String,
    pub album_name: String,
    pub album_id: String,
    pub release_date: String,
    pub popularity: u32,
    pub artist_id: String,
    pub features: AudioFeatures,
}

impl TrackRecord {
    pub fn new(summary: TrackSummary, features: AudioFeatures) -> Self {
        Self {
            id: summary.id,
            name: summary.name,
            album_name: summary.album_name,
            album_id: summary.album_id,
            release_date: summary.release_date,
            popularity: summary.popularity,
            artist_id: summary.artist_id,
            features,
        }
    }
}

#[derive(Tabled)]
pub struct TrackTableRow {
    pub artist: String,
    pub track: String,
    pub album: String,
    pub released: String,
    pub popularity: u32,
    pub valence: String,
    pub danceability: String,
    pub energy: String,
}

#[derive(Tabled)]
pub struct MetricTableRow {
    pub metric: String,
    pub value: String,
}
