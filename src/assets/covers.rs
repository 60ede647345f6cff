use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::foundation::error::{IcebergError, IcebergResult};

/// Default per-cover fetch timeout.
pub const DEFAULT_COVER_TIMEOUT: Duration = Duration::from_secs(10);

/// Source of encoded cover art bytes for an album's image reference.
pub trait CoverSource {
    /// Fetch the encoded bytes behind `image_ref`.
    ///
    /// Failures are reported as [`IcebergError::Image`]; they only ever drop one slot.
    fn fetch(&self, image_ref: &str) -> IcebergResult<Vec<u8>>;
}

/// Fetches covers over HTTP(S) with a bounded timeout.
pub struct HttpCoverSource {
    client: reqwest::blocking::Client,
}

impl HttpCoverSource {
    /// Build a source whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> IcebergResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| IcebergError::Other(anyhow::anyhow!("build cover http client: {e}")))?;
        Ok(Self { client })
    }
}

impl CoverSource for HttpCoverSource {
    fn fetch(&self, image_ref: &str) -> IcebergResult<Vec<u8>> {
        let response = self
            .client
            .get(image_ref)
            .send()
            .map_err(|e| IcebergError::image(format!("fetch cover '{image_ref}': {e}")))?;
        let status = response.status();
        if !status.is_success() {
            return Err(IcebergError::image(format!(
                "fetch cover '{image_ref}': HTTP {status}"
            )));
        }
        let bytes = response
            .bytes()
            .map_err(|e| IcebergError::image(format!("read cover '{image_ref}': {e}")))?;
        Ok(bytes.to_vec())
    }
}

/// Reads covers from files under a root directory.
///
/// References are resolved as relative paths; absolute paths and `..` are rejected.
#[derive(Clone, Debug)]
pub struct FsCoverSource {
    root: PathBuf,
}

impl FsCoverSource {
    /// Resolve references relative to `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory used when resolving references.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl CoverSource for FsCoverSource {
    fn fetch(&self, image_ref: &str) -> IcebergResult<Vec<u8>> {
        let rel = normalize_rel_path(image_ref).map_err(|e| IcebergError::image(e.to_string()))?;
        let path = self.root.join(Path::new(&rel));
        std::fs::read(&path)
            .map_err(|e| IcebergError::image(format!("read cover '{}': {e}", path.display())))
    }
}

/// Dispatches `http(s)://` references to the network and everything else to the filesystem.
pub struct RoutedCoverSource {
    http: HttpCoverSource,
    fs: Option<FsCoverSource>,
}

impl RoutedCoverSource {
    /// Route URLs to `http` and relative paths to `fs` (when configured).
    pub fn new(http: HttpCoverSource, fs: Option<FsCoverSource>) -> Self {
        Self { http, fs }
    }
}

impl CoverSource for RoutedCoverSource {
    fn fetch(&self, image_ref: &str) -> IcebergResult<Vec<u8>> {
        if is_remote_ref(image_ref) {
            return self.http.fetch(image_ref);
        }
        match &self.fs {
            Some(fs) => fs.fetch(image_ref),
            None => Err(IcebergError::image(format!(
                "cover '{image_ref}' is not a URL and no local cover root is configured"
            ))),
        }
    }
}

fn is_remote_ref(image_ref: &str) -> bool {
    let lower = image_ref.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Normalize and validate a relative cover path.
///
/// The normalized result uses `/` separators, removes `.` segments, and rejects absolute paths or
/// parent traversals (`..`).
pub fn normalize_rel_path(source: &str) -> IcebergResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(IcebergError::validation("cover paths must be relative"));
    }
    if s.is_empty() {
        return Err(IcebergError::validation("cover path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(IcebergError::validation("cover paths must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(IcebergError::validation(
            "cover path must contain a file name",
        ));
    }

    Ok(out.join("/"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/covers.rs"]
mod tests;
