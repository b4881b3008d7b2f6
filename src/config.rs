//! Configuration management for the track analysis.
//!
//! The analysis is driven by three YAML documents that are merged into one
//! mapping in a fixed order:
//!
//! 1. `user_config.yml` - credentials of the Spotify application
//! 2. the analysis (job) file given on the command line
//! 3. `system_config.yml` - API endpoints, market, timeouts
//!
//! Later documents overwrite top-level keys of earlier ones. Environment
//! variables (optionally loaded from a `.env` file in the local data directory)
//! are applied on top of the merged mapping.

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    time::Duration,
};

use serde_yaml::{Mapping, Value};

use crate::{
    error::{Error, Result},
    spotify::{Credentials, Endpoints, RequestPolicy},
};

pub const USER_CONFIG_FILE: &str = "user_config.yml";
pub const JOB_CONFIG_FILE: &str = "job_file.yml";
pub const SYSTEM_CONFIG_FILE: &str = "system_config.yml";

pub const KEY_CLIENT_ID: &str = "Client_id";
pub const KEY_CLIENT_SECRET: &str = "Client_secret";
pub const KEY_ARTISTS: &str = "Artists";

const KEY_API_URL: &str = "Api_url";
const KEY_TOKEN_URL: &str = "Token_url";
const KEY_MARKET: &str = "Market";
const KEY_SEARCH_LIMIT: &str = "Search_limit";
const KEY_TOP_TRACKS_LIMIT: &str = "Top_tracks_limit";
const KEY_TIMEOUT_SECS: &str = "Timeout_secs";
const KEY_MAX_RETRIES: &str = "Max_retries";
const KEY_BACKOFF_MILLIS: &str = "Backoff_millis";
const KEY_DEADLINE_SECS: &str = "Deadline_secs";
const KEY_PLOT_PATH: &str = "Plot_path";

pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

/// Environment variables that take precedence over the merged files.
const ENV_OVERRIDES: [(&str, &str); 4] = [
    ("SPOTIFY_API_AUTH_CLIENT_ID", KEY_CLIENT_ID),
    ("SPOTIFY_API_AUTH_CLIENT_SECRET", KEY_CLIENT_SECRET),
    ("SPOTIFY_API_URL", KEY_API_URL),
    ("SPOTIFY_API_TOKEN_URL", KEY_TOKEN_URL),
];

/// Loads environment variables from an optional `.env` file in the local data
/// directory (e.g. `~/.local/share/trackcorr/.env` on Linux).
///
/// A missing file is fine; a file that exists but cannot be parsed is not.
pub async fn load_env() -> std::result::Result<(), String> {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("trackcorr/.env");

    if !path.exists() {
        return Ok(());
    }

    dotenv::from_path(&path).map_err(|e| format!("{}: {}", path.display(), e))
}

/// The ordered list of files that make up one analysis configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigSources {
    paths: Vec<PathBuf>,
}

impl ConfigSources {
    /// Resolves the sources for the given analysis path.
    ///
    /// A directory is expected to contain all three files. A file is taken as
    /// the job file and its siblings provide the user and system documents.
    pub fn resolve(path: &Path) -> Self {
        let paths = if path.is_dir() {
            vec![
                path.join(USER_CONFIG_FILE),
                path.join(JOB_CONFIG_FILE),
                path.join(SYSTEM_CONFIG_FILE),
            ]
        } else {
            let dir = match path.parent() {
                Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
                _ => PathBuf::from("."),
            };
            vec![
                dir.join(USER_CONFIG_FILE),
                path.to_path_buf(),
                dir.join(SYSTEM_CONFIG_FILE),
            ]
        };

        Self { paths }
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }
}

/// Reads and parses a single YAML document into a top-level mapping.
pub async fn parse_config_file(path: &Path) -> Result<Mapping> {
    let content = async_fs::read_to_string(path).await.map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            Error::ConfigNotFound(path.to_path_buf())
        } else {
            Error::ConfigRead {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;

    let value: Value = serde_yaml::from_str(&content).map_err(|e| Error::ConfigParse {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    match value {
        Value::Null => Ok(Mapping::new()),
        Value::Mapping(mapping) => Ok(mapping),
        _ => Err(Error::ConfigParse {
            path: path.to_path_buf(),
            reason: "top-level document must be a mapping".to_string(),
        }),
    }
}

/// Loads every file in order and merges them, later keys win.
///
/// Loading is all-or-nothing: the first missing or broken file fails the whole
/// call.
pub async fn load_config_files(paths: &[PathBuf]) -> Result<Mapping> {
    let mut merged = Mapping::new();
    for path in paths {
        let mapping = parse_config_file(path).await?;
        merge_into(&mut merged, mapping);
    }
    Ok(merged)
}

/// Inserts every top-level key of `overlay` into `base`, replacing existing
/// values. Nested mappings are replaced whole, not merged.
pub fn merge_into(base: &mut Mapping, overlay: Mapping) {
    for (key, value) in overlay {
        base.insert(key, value);
    }
}

/// Overlays environment values onto the mapping. `lookup` is usually
/// `|name| std::env::var(name).ok()`.
pub fn apply_env_overrides<F>(mapping: &mut Mapping, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    for (var, key) in ENV_OVERRIDES {
        if let Some(value) = lookup(var).filter(|v| !v.trim().is_empty()) {
            mapping.insert(Value::String(key.to_string()), Value::String(value));
        }
    }
}

/// Tunables of a run. Every field has a default so a minimal configuration
/// only needs credentials and artists.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub api_url: String,
    pub token_url: String,
    pub market: String,
    pub search_limit: u32,
    pub top_tracks_limit: u32,
    pub timeout: Duration,
    pub max_retries: u32,
    pub backoff: Duration,
    pub deadline: Option<Duration>,
    pub plot_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            market: "US".to_string(),
            search_limit: 20,
            top_tracks_limit: 50,
            timeout: Duration::from_secs(10),
            max_retries: 3,
            backoff: Duration::from_millis(500),
            deadline: None,
            plot_path: None,
        }
    }
}

impl Settings {
    pub fn from_mapping(mapping: &Mapping) -> Result<Self> {
        let defaults = Settings::default();

        Ok(Self {
            api_url: optional_string(mapping, KEY_API_URL)?
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_url),
            token_url: optional_string(mapping, KEY_TOKEN_URL)?.unwrap_or(defaults.token_url),
            market: optional_string(mapping, KEY_MARKET)?.unwrap_or(defaults.market),
            search_limit: optional_u32(mapping, KEY_SEARCH_LIMIT)?
                .unwrap_or(defaults.search_limit),
            top_tracks_limit: optional_u32(mapping, KEY_TOP_TRACKS_LIMIT)?
                .unwrap_or(defaults.top_tracks_limit),
            timeout: optional_u64(mapping, KEY_TIMEOUT_SECS)?
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            max_retries: optional_u32(mapping, KEY_MAX_RETRIES)?
                .unwrap_or(defaults.max_retries),
            backoff: optional_u64(mapping, KEY_BACKOFF_MILLIS)?
                .map(Duration::from_millis)
                .unwrap_or(defaults.backoff),
            deadline: optional_u64(mapping, KEY_DEADLINE_SECS)?.map(Duration::from_secs),
            plot_path: optional_string(mapping, KEY_PLOT_PATH)?.map(PathBuf::from),
        })
    }

    pub fn endpoints(&self) -> Endpoints {
        Endpoints {
            api_url: self.api_url.clone(),
            token_url: self.token_url.clone(),
        }
    }

    pub fn request_policy(&self) -> RequestPolicy {
        RequestPolicy {
            timeout: self.timeout,
            max_retries: self.max_retries,
            base_backoff: self.backoff,
            ..RequestPolicy::default()
        }
    }
}

/// The merged configuration of one analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub client_id: String,
    pub client_secret: String,
    pub artists: Vec<String>,
    pub settings: Settings,
}

impl AnalysisConfig {
    /// Resolves, loads and merges the configuration for `path`, then applies
    /// environment overrides.
    ///
    /// # Arguments
    ///
    /// * `path` - The analysis (job) file, or a directory holding
    ///   `user_config.yml`, `job_file.yml` and `system_config.yml`
    ///
    /// # Returns
    ///
    /// The credentials, the artist names in configuration order and the
    /// [`Settings`] with defaults filled in.
    ///
    /// # Errors
    ///
    /// - [`Error::ConfigNotFound`] / [`Error::ConfigRead`] if any source file
    ///   is missing or unreadable
    /// - [`Error::ConfigParse`] for invalid YAML or a non-mapping document
    /// - [`Error::MissingConfigKey`] when `Client_id`, `Client_secret` or
    ///   `Artists` is absent after merging
    /// - [`Error::InvalidConfigValue`] for values of the wrong type or range
    ///
    /// # Example
    ///
    /// ```
    /// let config = AnalysisConfig::load(Path::new("Configs/job_file.yml")).await?;
    /// println!("{} artists in {}", config.artists.len(), config.settings.market);
    /// ```
    pub async fn load(path: &Path) -> Result<Self> {
        let sources = ConfigSources::resolve(path);
        let mut values = load_config_files(sources.paths()).await?;
        apply_env_overrides(&mut values, |name| std::env::var(name).ok());
        Self::from_mapping(values)
    }

    pub fn from_mapping(values: Mapping) -> Result<Self> {
        let client_id = required_string(&values, KEY_CLIENT_ID)?;
        let client_secret = required_string(&values, KEY_CLIENT_SECRET)?;
        let artists = string_list(&values, KEY_ARTISTS)?;
        let settings = Settings::from_mapping(&values)?;

        Ok(Self {
            client_id,
            client_secret,
            artists,
            settings,
        })
    }

    pub fn credentials(&self) -> Credentials {
        Credentials {
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
        }
    }
}

fn optional_string(mapping: &Mapping, key: &str) -> Result<Option<String>> {
    match mapping.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(_) => Err(Error::InvalidConfigValue {
            key: key.to_string(),
            reason: "expected a string".to_string(),
        }),
    }
}

fn required_string(mapping: &Mapping, key: &str) -> Result<String> {
    match optional_string(mapping, key)? {
        Some(s) if !s.trim().is_empty() => Ok(s),
        _ => Err(Error::MissingConfigKey(key.to_string())),
    }
}

fn optional_u64(mapping: &Mapping, key: &str) -> Result<Option<u64>> {
    let invalid = || Error::InvalidConfigValue {
        key: key.to_string(),
        reason: "expected a non-negative integer".to_string(),
    };

    match mapping.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n.as_u64().map(Some).ok_or_else(invalid),
        Some(Value::String(s)) => s.trim().parse::<u64>().map(Some).map_err(|_| invalid()),
        Some(_) => Err(invalid()),
    }
}

fn optional_u32(mapping: &Mapping, key: &str) -> Result<Option<u32>> {
    optional_u64(mapping, key)?
        .map(|v| {
            u32::try_from(v).map_err(|_| Error::InvalidConfigValue {
                key: key.to_string(),
                reason: format!("{} does not fit into 32 bits", v),
            })
        })
        .transpose()
}

fn string_list(mapping: &Mapping, key: &str) -> Result<Vec<String>> {
    match mapping.get(key) {
        None | Some(Value::Null) => Err(Error::MissingConfigKey(key.to_string())),
        Some(Value::Sequence(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.clone()),
                Value::Number(n) => Ok(n.to_string()),
                _ => Err(Error::InvalidConfigValue {
                    key: key.to_string(),
                    reason: "expected a list of names".to_string(),
                }),
            })
            .collect(),
        Some(Value::String(s)) => Ok(vec![s.clone()]),
        Some(_) => Err(Error::InvalidConfigValue {
            key: key.to_string(),
            reason: "expected a list of names".to_string(),
        }),
    }
}
