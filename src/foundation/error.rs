/// Convenience result type used across the crate.
pub type IcebergResult<T> = Result<T, IcebergError>;

/// Top-level error taxonomy for a render request.
///
/// Each variant is one failure category a caller can act on. Per-album [`IcebergError::Image`]
/// failures are caught inside drawing and never reach the caller of a render.
#[derive(thiserror::Error, Debug)]
pub enum IcebergError {
    /// Malformed source identifier, threshold table or configuration.
    #[error("validation error: {0}")]
    Validation(String),

    /// Missing or rejected catalog credentials.
    #[error("auth error: {0}")]
    Auth(String),

    /// The source reference does not resolve.
    #[error("not found: {0}")]
    NotFound(String),

    /// The source reference exists but is private or otherwise inaccessible.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Network or rate-limit failure that survived the retry budget.
    #[error("transient fetch error: {0}")]
    TransientFetch(String),

    /// The fetch succeeded but produced zero usable albums.
    #[error("no valid albums: {0}")]
    EmptyResult(String),

    /// The fixed background canvas asset is absent or unreadable.
    #[error("asset missing: {0}")]
    AssetMissing(String),

    /// A single cover image failed to fetch or decode.
    #[error("image error: {0}")]
    Image(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl IcebergError {
    /// Build a [`IcebergError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`IcebergError::Auth`] value.
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Auth(msg.into())
    }

    /// Build a [`IcebergError::NotFound`] value.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Build a [`IcebergError::Forbidden`] value.
    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    /// Build a [`IcebergError::TransientFetch`] value.
    pub fn transient(msg: impl Into<String>) -> Self {
        Self::TransientFetch(msg.into())
    }

    /// Build a [`IcebergError::EmptyResult`] value.
    pub fn empty_result(msg: impl Into<String>) -> Self {
        Self::EmptyResult(msg.into())
    }

    /// Build a [`IcebergError::AssetMissing`] value.
    pub fn asset_missing(msg: impl Into<String>) -> Self {
        Self::AssetMissing(msg.into())
    }

    /// Build a [`IcebergError::Image`] value.
    pub fn image(msg: impl Into<String>) -> Self {
        Self::Image(msg.into())
    }

    /// Build a [`IcebergError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Return `true` for failures worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::TransientFetch(_))
    }

    /// Return `true` when a different input from the user can fix the failure.
    pub fn is_user_correctable(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::NotFound(_) | Self::Forbidden(_) | Self::EmptyResult(_)
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
