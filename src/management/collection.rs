use crate::types::TrackRecord;

/// Ordered set of collected tracks.
///
/// Tracks are stored as whole records; every per-field list is a projection of
/// the same sequence, so all lists share one length and one order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackCollection {
    tracks: Vec<TrackRecord>,
}

impl TrackCollection {
    pub fn new() -> Self {
        Self { tracks: Vec::new() }
    }

    pub fn push(&mut self, track: TrackRecord) -> &mut Self {
        self.tracks.push(track);
        self
    }

    pub fn extend<I: IntoIterator<Item = TrackRecord>>(&mut self, tracks: I) -> &mut Self {
        self.tracks.extend(tracks);
        self
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TrackRecord> {
        self.tracks.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.tracks.iter().map(|t| t.name.as_str()).collect()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.tracks.iter().map(|t| t.id.as_str()).collect()
    }

    pub fn release_dates(&self) -> Vec<&str> {
        self.tracks.iter().map(|t| t.release_date.as_str()).collect()
    }

    pub fn artist_ids(&self) -> Vec<&str> {
        self.tracks.iter().map(|t| t.artist_id.as_str()).collect()
    }

    pub fn album_names(&self) -> Vec<&str> {
        self.tracks.iter().map(|t| t.album_name.as_str()).collect()
    }

    pub fn album_ids(&self) -> Vec<&str> {
        self.tracks.iter().map(|t| t.album_id.as_str()).collect()
    }

    pub fn popularity(&self) -> Vec<u32> {
        self.tracks.iter().map(|t| t.popularity).collect()
    }

    pub fn valence(&self) -> Vec<Option<f64>> {
        self.tracks.iter().map(|t| t.features.valence).collect()
    }

    pub fn danceability(&self) -> Vec<Option<f64>> {
        self.tracks.iter().map(|t| t.features.danceability).collect()
    }

    pub fn energy(&self) -> Vec<Option<f64>> {
        self.tracks.iter().map(|t| t.features.energy).collect()
    }

    /// `(danceability, valence)` of every track that has both.
    pub fn feature_points(&self) -> Vec<(f64, f64)> {
        self.tracks
            .iter()
            .filter_map(|t| Some((t.features.danceability?, t.features.valence?)))
            .collect()
    }
}

impl FromIterator<TrackRecord> for TrackCollection {
    fn from_iter<I: IntoIterator<Item = TrackRecord>>(iter: I) -> Self {
        Self {
            tracks: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a TrackCollection {
    type Item = &'a TrackRecord;
    type IntoIter = std::slice::Iter<'a, TrackRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.tracks.iter()
    }
}
