use crate::foundation::error::IcebergResult;

/// Most album ids accepted by one album lookup.
pub const ALBUM_BATCH_LIMIT: usize = 20;

/// One playlist entry, flattened to what aggregation needs.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TrackItem {
    /// Catalog id of the track's album, used for direct-score lookups.
    #[serde(default)]
    pub album_id: Option<String>,
    /// Album display name.
    pub album_name: String,
    /// Primary artist of the album.
    #[serde(default)]
    pub artist: Option<String>,
    /// First (largest) cover image listed for the album.
    #[serde(default)]
    pub image_ref: Option<String>,
    /// Track popularity in `[0, 100]`.
    #[serde(default)]
    pub popularity: Option<f64>,
}

/// One page of playlist entries.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TracksPage {
    /// Entries on this page; removed or local tracks are already filtered out.
    pub items: Vec<TrackItem>,
    /// Opaque cursor for the next page, `None` on the last page.
    #[serde(default)]
    pub next: Option<String>,
}

/// Album-level metadata including the album's own popularity.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AlbumMeta {
    /// Catalog album id.
    pub id: String,
    /// Album display name.
    pub name: String,
    /// Primary artist.
    #[serde(default)]
    pub artist: Option<String>,
    /// First (largest) cover image.
    #[serde(default)]
    pub image_ref: Option<String>,
    /// Album popularity in `[0, 100]`; `None` when the catalog reports no score.
    #[serde(default)]
    pub popularity: Option<f64>,
}

/// Read access to a music catalog.
///
/// Implementations map failures onto the crate's error taxonomy: `NotFound`, `Forbidden` and
/// `Auth` are terminal, `TransientFetch` may be retried.
pub trait CatalogClient {
    /// Fetch one page of a playlist's tracks. `cursor` is the previous page's `next`.
    fn list_tracks_page(&self, playlist_id: &str, cursor: Option<&str>)
    -> IcebergResult<TracksPage>;

    /// Look up albums by id. Callers pass at most [`ALBUM_BATCH_LIMIT`] ids.
    fn get_albums_by_ids(&self, ids: &[String]) -> IcebergResult<Vec<AlbumMeta>>;
}
