use std::fmt;

use reqwest::Url;

use crate::foundation::error::{IcebergError, IcebergResult};

/// Hosts accepted when no explicit list is configured.
pub const DEFAULT_CATALOG_HOSTS: [&str; 1] = ["open.spotify.com"];

/// Validated playlist identifier extracted from a share link.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SourceId(String);

impl SourceId {
    /// Parse a playlist share URL such as `https://open.spotify.com/playlist/<id>?si=...`.
    ///
    /// The host must be one of `hosts` (case-insensitive). An optional `intl-xx` locale segment
    /// may precede `playlist`. Query and fragment are ignored.
    pub fn parse<S: AsRef<str>>(url: &str, hosts: &[S]) -> IcebergResult<Self> {
        let trimmed = url.trim();
        let parsed = Url::parse(trimmed)
            .map_err(|e| IcebergError::validation(format!("'{trimmed}' is not a valid URL: {e}")))?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(IcebergError::validation(format!(
                "unsupported URL scheme '{}'",
                parsed.scheme()
            )));
        }

        let host = parsed
            .host_str()
            .map(str::to_ascii_lowercase)
            .ok_or_else(|| IcebergError::validation(format!("'{trimmed}' has no host")))?;
        if !hosts
            .iter()
            .any(|h| h.as_ref().eq_ignore_ascii_case(&host))
        {
            return Err(IcebergError::validation(format!(
                "'{host}' is not a recognized playlist host"
            )));
        }

        let segments: Vec<&str> = parsed
            .path_segments()
            .map(|s| s.filter(|p| !p.is_empty()).collect())
            .unwrap_or_default();
        let rest = match segments.as_slice() {
            [first, rest @ ..] if first.starts_with("intl-") => rest,
            all => all,
        };
        let id = match rest {
            ["playlist", id] => *id,
            _ => {
                return Err(IcebergError::validation(format!(
                    "'{trimmed}' is not a playlist link"
                )));
            }
        };

        Self::from_id(id)
    }

    /// Wrap a bare playlist id, checking that it is non-empty ASCII alphanumeric.
    pub fn from_id(id: &str) -> IcebergResult<Self> {
        if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(IcebergError::validation(format!(
                "'{id}' is not a valid playlist id"
            )));
        }
        Ok(Self(id.to_string()))
    }

    /// The bare id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/catalog/source.rs"]
mod tests;
