use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use crate::{
    catalog::client::{ALBUM_BATCH_LIMIT, AlbumMeta, CatalogClient, TrackItem, TracksPage},
    foundation::error::{IcebergError, IcebergResult},
};

const SNAPSHOT_PAGE_SIZE: usize = 100;

/// Catalog served from a JSON snapshot, for offline renders.
///
/// ```json
/// {
///   "playlists": { "<id>": [ { "album_id": "...", "album_name": "...", "popularity": 80 } ] },
///   "albums": [ { "id": "...", "name": "...", "popularity": 55 } ]
/// }
/// ```
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SnapshotCatalog {
    #[serde(default)]
    playlists: HashMap<String, Vec<TrackItem>>,
    #[serde(default)]
    albums: Vec<AlbumMeta>,
}

impl SnapshotCatalog {
    /// Build from in-memory data.
    pub fn new(playlists: HashMap<String, Vec<TrackItem>>, albums: Vec<AlbumMeta>) -> Self {
        Self { playlists, albums }
    }

    /// Parse a snapshot from JSON.
    pub fn from_reader<R: Read>(reader: R) -> IcebergResult<Self> {
        serde_json::from_reader(reader)
            .map_err(|e| IcebergError::serde(format!("catalog snapshot: {e}")))
    }

    /// Load a snapshot file.
    pub fn from_path(path: &Path) -> IcebergResult<Self> {
        let file = std::fs::File::open(path).map_err(|e| {
            IcebergError::validation(format!("open snapshot '{}': {e}", path.display()))
        })?;
        Self::from_reader(std::io::BufReader::new(file))
    }
}

impl CatalogClient for SnapshotCatalog {
    fn list_tracks_page(
        &self,
        playlist_id: &str,
        cursor: Option<&str>,
    ) -> IcebergResult<TracksPage> {
        let tracks = self
            .playlists
            .get(playlist_id)
            .ok_or_else(|| IcebergError::not_found(format!("playlist {playlist_id}")))?;

        let offset = match cursor {
            None => 0,
            Some(c) => c
                .parse::<usize>()
                .map_err(|_| IcebergError::validation(format!("bad snapshot cursor '{c}'")))?,
        };
        let end = (offset + SNAPSHOT_PAGE_SIZE).min(tracks.len());
        let items = tracks.get(offset..end).unwrap_or_default().to_vec();
        let next = (end < tracks.len()).then(|| end.to_string());
        Ok(TracksPage { items, next })
    }

    fn get_albums_by_ids(&self, ids: &[String]) -> IcebergResult<Vec<AlbumMeta>> {
        if ids.len() > ALBUM_BATCH_LIMIT {
            return Err(IcebergError::validation(format!(
                "album lookup accepts at most {ALBUM_BATCH_LIMIT} ids, got {}",
                ids.len()
            )));
        }
        Ok(ids
            .iter()
            .filter_map(|id| self.albums.iter().find(|a| &a.id == id).cloned())
            .collect())
    }
}
