use std::path::{Path, PathBuf};

use base64::{Engine, engine::general_purpose::STANDARD};

use crate::error::{Error, Result};

pub const DEFAULT_PLOT_EXTENSION: &str = "svg";
pub const SUPPORTED_PLOT_EXTENSIONS: [&str; 2] = ["svg", "png"];

/// Builds the value of an `Authorization: Basic` header for the given pair.
pub fn basic_auth_header(client_id: &str, client_secret: &str) -> String {
    let encoded = STANDARD.encode(format!("{}:{}", client_id, client_secret));
    format!("Basic {}", encoded)
}

/// Normalizes a caller-provided plot path.
///
/// A path that already carries an extension is used verbatim, a bare path gets
/// the default extension appended. Only formats the renderer knows are
/// accepted.
pub fn normalize_output_path(path: &Path) -> Result<PathBuf> {
    if path.as_os_str().is_empty() {
        return Err(Error::Output {
            path: path.to_path_buf(),
            reason: "empty path".to_string(),
        });
    }

    if path.is_dir() {
        return Err(Error::Output {
            path: path.to_path_buf(),
            reason: "path is a directory".to_string(),
        });
    }

    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => {
            let lower = ext.to_ascii_lowercase();
            if SUPPORTED_PLOT_EXTENSIONS.contains(&lower.as_str()) {
                Ok(path.to_path_buf())
            } else {
                Err(Error::Output {
                    path: path.to_path_buf(),
                    reason: format!(
                        "unsupported image format '{}', use one of: {}",
                        ext,
                        SUPPORTED_PLOT_EXTENSIONS.join(", ")
                    ),
                })
            }
        }
        None => Ok(path.with_extension(DEFAULT_PLOT_EXTENSION)),
    }
}

/// Three decimals, or `-` when the feature is absent.
pub fn format_feature(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.3}", v),
        None => "-".to_string(),
    }
}

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

pub fn max(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::max)
}
