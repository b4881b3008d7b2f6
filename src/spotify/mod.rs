//! # Spotify Integration Module
//!
//! Read-only access to the Spotify Web API for the analysis pipeline.
//!
//! ```text
//! Collector / CLI
//!      ↓
//! auth      POST /api/token                  (client-credentials grant)
//! artists   GET  /search?type=artist
//! tracks    GET  /artists/{id}/top-tracks
//!           GET  /audio-features/{id}
//!      ↓
//! request   timeout, retry with backoff, deadline, status classification
//!      ↓
//! reqwest
//! ```
//!
//! Every operation borrows an immutable [`RequestContext`] holding the HTTP
//! client, the endpoints, the bearer token, the [`RequestPolicy`] and an
//! optional deadline. Operations return values, they never stash results on the
//! context, so the same context can be shared by any number of callers.
//!
//! ## Error Handling
//!
//! - `429` and `5xx` gateway errors, timeouts and connection failures are
//!   retried with exponential backoff; `Retry-After` is honoured up to
//!   [`RequestPolicy::max_retry_after`]. When retries run out the call fails
//!   with [`Error::Network`](crate::error::Error::Network).
//! - `401` on any call is an authentication failure.
//! - `404` on a lookup is a [`NotFound`](crate::error::Error::NotFound).
//! - Bodies that do not decode are a
//!   [`MalformedResponse`](crate::error::Error::MalformedResponse).
//!
//! ## Usage
//!
//! ```rust
//! let ctx = spotify::connect(&config.settings, &config.credentials()).await?;
//! let artist = spotify::search_artist(&ctx, "Röyksopp", 20).await?;
//! let tracks = spotify::get_top_tracks(&ctx, &artist.id, "US", 50).await?;
//! let features = spotify::get_audio_features(&ctx, &tracks[0].id).await?;
//! ```

pub mod artists;
pub mod auth;
pub mod request;
pub mod tracks;

pub use artists::search_artist;
pub use auth::{Credentials, connect, request_access_token};
pub use request::{Endpoints, RequestContext, RequestPolicy, build_http_client};
pub use tracks::{get_audio_features, get_top_tracks};
