#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};

use playlist_iceberg::{
    AlbumMeta, CatalogClient, CoverSource, IcebergError, IcebergResult, RasterImage, TrackItem,
    TracksPage,
};

/// In-memory catalog that counts calls and can fail a scripted number of times.
#[derive(Default)]
pub struct FakeCatalog {
    pub tracks: HashMap<String, Vec<TrackItem>>,
    pub albums: HashMap<String, AlbumMeta>,
    pub page_size: usize,
    pub failures: RefCell<VecDeque<IcebergError>>,
    pub page_calls: Cell<usize>,
    pub album_calls: Cell<usize>,
}

impl FakeCatalog {
    pub fn with_playlist(id: &str, tracks: Vec<TrackItem>) -> Self {
        Self {
            tracks: HashMap::from([(id.to_string(), tracks)]),
            page_size: 100,
            ..Self::default()
        }
    }

    pub fn fail_next(&self, err: IcebergError) {
        self.failures.borrow_mut().push_back(err);
    }

    pub fn calls(&self) -> usize {
        self.page_calls.get() + self.album_calls.get()
    }
}

impl CatalogClient for FakeCatalog {
    fn list_tracks_page(
        &self,
        playlist_id: &str,
        cursor: Option<&str>,
    ) -> IcebergResult<TracksPage> {
        self.page_calls.set(self.page_calls.get() + 1);
        if let Some(err) = self.failures.borrow_mut().pop_front() {
            return Err(err);
        }
        let tracks = self
            .tracks
            .get(playlist_id)
            .ok_or_else(|| IcebergError::not_found(format!("playlist {playlist_id}")))?;
        let offset: usize = cursor.map(|c| c.parse().unwrap()).unwrap_or(0);
        let end = (offset + self.page_size.max(1)).min(tracks.len());
        Ok(TracksPage {
            items: tracks[offset..end].to_vec(),
            next: (end < tracks.len()).then(|| end.to_string()),
        })
    }

    fn get_albums_by_ids(&self, ids: &[String]) -> IcebergResult<Vec<AlbumMeta>> {
        self.album_calls.set(self.album_calls.get() + 1);
        assert!(ids.len() <= playlist_iceberg::ALBUM_BATCH_LIMIT);
        Ok(ids
            .iter()
            .filter_map(|id| self.albums.get(id).cloned())
            .collect())
    }
}

/// Cover source backed by a map of encoded images.
#[derive(Default)]
pub struct FakeCovers {
    pub covers: HashMap<String, Vec<u8>>,
    pub fetches: RefCell<Vec<String>>,
}

impl FakeCovers {
    pub fn insert(&mut self, image_ref: &str, bytes: Vec<u8>) {
        self.covers.insert(image_ref.to_string(), bytes);
    }
}

impl CoverSource for FakeCovers {
    fn fetch(&self, image_ref: &str) -> IcebergResult<Vec<u8>> {
        self.fetches.borrow_mut().push(image_ref.to_string());
        self.covers
            .get(image_ref)
            .cloned()
            .ok_or_else(|| IcebergError::image(format!("HTTP 404 for {image_ref}")))
    }
}

pub fn track(name: &str, artist: &str, popularity: f64, image_ref: Option<&str>) -> TrackItem {
    TrackItem {
        album_id: Some(format!("id-{name}")),
        album_name: name.to_string(),
        artist: Some(artist.to_string()),
        image_ref: image_ref.map(str::to_string),
        popularity: Some(popularity),
    }
}

pub fn solid_png(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    RasterImage::filled(width, height, rgba).encode_png().unwrap()
}

pub fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "playlist_iceberg_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// Write an opaque background canvas and return its path.
pub fn write_base_canvas(dir: &Path, width: u32, height: u32) -> PathBuf {
    let path = dir.join("base.png");
    std::fs::write(&path, solid_png(width, height, [20, 40, 80, 255])).unwrap();
    path
}
