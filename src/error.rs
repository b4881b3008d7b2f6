//! Error types shared by every stage of the analysis pipeline.

use std::{fmt, path::PathBuf};

use thiserror::Error;

/// What a failed lookup was looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupKind {
    Artist,
    TopTracks,
    AudioFeatures,
}

impl fmt::Display for LookupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LookupKind::Artist => "artist",
            LookupKind::TopTracks => "top tracks",
            LookupKind::AudioFeatures => "audio features",
        };
        write!(f, "{}", s)
    }
}

/// Every failure the pipeline can surface.
///
/// Configuration variants are fatal for the binary, lookup variants are
/// recorded per artist/track while the run continues. See
/// [`Error::is_lookup_failure`].
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),

    #[error("Cannot read configuration file {}: {source}", .path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot parse configuration file {}: {reason}", .path.display())]
    ConfigParse { path: PathBuf, reason: String },

    #[error("Missing configuration key '{0}'")]
    MissingConfigKey(String),

    #[error("Invalid value for configuration key '{key}': {reason}")]
    InvalidConfigValue { key: String, reason: String },

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("No {kind} found for '{query}'")]
    NotFound { kind: LookupKind, query: String },

    #[error("Network error after {attempts} attempt(s): {reason}")]
    Network { attempts: u32, reason: String },

    #[error("Request to {endpoint} failed with status {status}: {body}")]
    Api {
        status: u16,
        endpoint: String,
        body: String,
    },

    #[error("Malformed response from {endpoint}: {reason}")]
    MalformedResponse { endpoint: String, reason: String },

    #[error("Deadline exceeded before {0} could complete")]
    DeadlineExceeded(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Cannot write output to {}: {reason}", .path.display())]
    Output { path: PathBuf, reason: String },
}

impl Error {
    /// Lookup failures are recorded and skipped instead of aborting a run.
    pub fn is_lookup_failure(&self) -> bool {
        matches!(self, Error::NotFound { .. } | Error::Api { .. } | Error::MalformedResponse { .. })
    }

    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Error::ConfigNotFound(_)
                | Error::ConfigRead { .. }
                | Error::ConfigParse { .. }
                | Error::MissingConfigKey(_)
                | Error::InvalidConfigValue { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
