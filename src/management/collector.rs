use crate::{
    config::Settings,
    error::{Error, Result},
    management::TrackCollection,
    spotify::{self, RequestContext},
    types::{Artist, AudioFeatures, TrackRecord, TrackSummary},
};

/// One configured artist name and what the search resolved it to.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtistLookup {
    pub query: String,
    pub artist: Option<Artist>,
}

/// A lookup that failed without aborting the run.
#[derive(Debug)]
pub struct LookupFailure {
    pub subject: String,
    pub error: Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CollectOptions {
    pub market: String,
    pub search_limit: u32,
    pub top_tracks_limit: u32,
}

impl Default for CollectOptions {
    fn default() -> Self {
        CollectOptions::from(&Settings::default())
    }
}

impl From<&Settings> for CollectOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            market: settings.market.clone(),
            search_limit: settings.search_limit,
            top_tracks_limit: settings.top_tracks_limit,
        }
    }
}

/// Progress notifications emitted while collecting.
#[derive(Debug)]
pub enum CollectEvent<'a> {
    ArtistStarted {
        position: usize,
        total: usize,
        query: &'a str,
    },
    ArtistResolved(&'a Artist),
    TracksFetched {
        artist: &'a Artist,
        count: usize,
    },
    FeaturesFetched {
        track: &'a TrackSummary,
        position: usize,
        total: usize,
    },
    LookupFailed(&'a LookupFailure),
}

#[derive(Debug, Default)]
pub struct CollectionOutcome {
    /// One entry per configured artist, in configuration order.
    pub lookups: Vec<ArtistLookup>,
    pub tracks: TrackCollection,
    pub failures: Vec<LookupFailure>,
}

impl CollectionOutcome {
    pub fn resolved_artists(&self) -> Vec<&Artist> {
        self.lookups.iter().filter_map(|l| l.artist.as_ref()).collect()
    }

    pub fn artist_ids(&self) -> Vec<&str> {
        self.resolved_artists()
            .into_iter()
            .map(|a| a.id.as_str())
            .collect()
    }

    pub fn artist_names(&self) -> Vec<&str> {
        self.resolved_artists()
            .into_iter()
            .map(|a| a.name.as_str())
            .collect()
    }
}

fn record_failure<F>(failures: &mut Vec<LookupFailure>, observer: &mut F, subject: String, error: Error)
where
    F: FnMut(CollectEvent<'_>),
{
    let failure = LookupFailure { subject, error };
    observer(CollectEvent::LookupFailed(&failure));
    failures.push(failure);
}

/// Resolves every artist, fetches its top tracks and their audio features.
///
/// Requests are issued one at a time in configuration order. Lookup failures
/// (unknown artist, missing features, rejected lookups) are recorded and the
/// run moves on; authentication, network and deadline failures abort it.
///
/// # Arguments
///
/// * `ctx` - Authenticated request context, see [`spotify::connect`]
/// * `artists` - Artist names as configured
/// * `options` - Market and page sizes
/// * `observer` - Called with a [`CollectEvent`] as the run progresses
///
/// # Returns
///
/// A [`CollectionOutcome`] with one [`ArtistLookup`] per configured name, the
/// tracks of every resolved artist in order, and the recorded failures.
///
/// # Errors
///
/// Any error for which [`Error::is_lookup_failure`] is false, e.g.
/// [`Error::Authentication`], [`Error::Network`] or
/// [`Error::DeadlineExceeded`].
///
/// # Example
///
/// ```
/// let options = CollectOptions::from(&config.settings);
/// let outcome = collect(&ctx, &config.artists, &options, |event| {
///     if let CollectEvent::LookupFailed(failure) = event {
///         eprintln!("skipped {}", failure.subject);
///     }
/// })
/// .await?;
/// ```
pub async fn collect<F>(
    ctx: &RequestContext,
    artists: &[String],
    options: &CollectOptions,
    mut observer: F,
) -> Result<CollectionOutcome>
where
    F: FnMut(CollectEvent<'_>),
{
    let mut outcome = CollectionOutcome::default();
    let total = artists.len();

    for (idx, query) in artists.iter().enumerate() {
        observer(CollectEvent::ArtistStarted {
            position: idx + 1,
            total,
            query,
        });

        let artist = match spotify::search_artist(ctx, query, options.search_limit).await {
            Ok(artist) => artist,
            Err(e) if e.is_lookup_failure() => {
                record_failure(&mut outcome.failures, &mut observer, query.clone(), e);
                outcome.lookups.push(ArtistLookup {
                    query: query.clone(),
                    artist: None,
                });
                continue;
            }
            Err(e) => return Err(e),
        };
        observer(CollectEvent::ArtistResolved(&artist));

        let summaries = match spotify::get_top_tracks(
            ctx,
            &artist.id,
            &options.market,
            options.top_tracks_limit,
        )
        .await
        {
            Ok(summaries) => summaries,
            Err(e) if e.is_lookup_failure() => {
                record_failure(&mut outcome.failures, &mut observer, artist.name.clone(), e);
                Vec::new()
            }
            Err(e) => return Err(e),
        };
        observer(CollectEvent::TracksFetched {
            artist: &artist,
            count: summaries.len(),
        });

        let track_total = summaries.len();
        for (pos, summary) in summaries.into_iter().enumerate() {
            let features = match spotify::get_audio_features(ctx, &summary.id).await {
                Ok(features) => features,
                Err(e) if e.is_lookup_failure() => {
                    let subject = format!("{} - {}", artist.name, summary.name);
                    record_failure(&mut outcome.failures, &mut observer, subject, e);
                    AudioFeatures::default()
                }
                Err(e) => return Err(e),
            };
            observer(CollectEvent::FeaturesFetched {
                track: &summary,
                position: pos + 1,
                total: track_total,
            });
            outcome.tracks.push(TrackRecord::new(summary, features));
        }

        outcome.lookups.push(ArtistLookup {
            query: query.clone(),
            artist: Some(artist),
        });
    }

    Ok(outcome)
}
