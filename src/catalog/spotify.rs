//! Spotify Web API catalog client (client-credentials flow).

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use serde::Deserialize;

use crate::{
    catalog::client::{ALBUM_BATCH_LIMIT, AlbumMeta, CatalogClient, TrackItem, TracksPage},
    foundation::error::{IcebergError, IcebergResult},
};

const API_BASE: &str = "https://api.spotify.com/v1";
const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const TRACKS_PAGE_LIMIT: u32 = 100;
const TRACK_FIELDS: &str = "items(track(album(id,name,images,artists(name)),popularity)),next";

/// Environment variable holding the client id.
pub const CLIENT_ID_ENV: &str = "SPOTIFY_CLIENT_ID";
/// Environment variable holding the client secret.
pub const CLIENT_SECRET_ENV: &str = "SPOTIFY_CLIENT_SECRET";

/// Client-credentials pair.
#[derive(Clone)]
pub struct SpotifyCredentials {
    client_id: String,
    client_secret: String,
}

impl std::fmt::Debug for SpotifyCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpotifyCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

impl SpotifyCredentials {
    /// Build from explicit values; both must be non-empty.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> IcebergResult<Self> {
        let client_id = client_id.into();
        let client_secret = client_secret.into();
        if client_id.trim().is_empty() || client_secret.trim().is_empty() {
            return Err(IcebergError::auth("client id and secret must be non-empty"));
        }
        Ok(Self {
            client_id,
            client_secret,
        })
    }

    /// Read credentials from `SPOTIFY_CLIENT_ID` / `SPOTIFY_CLIENT_SECRET`.
    pub fn from_env() -> IcebergResult<Self> {
        let read = |name: &str| {
            std::env::var(name)
                .map_err(|_| IcebergError::auth(format!("environment variable {name} is not set")))
        };
        Self::new(read(CLIENT_ID_ENV)?, read(CLIENT_SECRET_ENV)?)
    }
}

/// Blocking Spotify catalog client holding one access token.
pub struct SpotifyClient {
    client: Client,
    api_base: String,
    token: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct PlaylistTracksResponse {
    #[serde(default)]
    items: Vec<PlaylistEntry>,
    next: Option<String>,
}

#[derive(Deserialize)]
struct PlaylistEntry {
    track: Option<ApiTrack>,
}

#[derive(Deserialize)]
struct ApiTrack {
    album: Option<ApiAlbum>,
    popularity: Option<f64>,
}

#[derive(Deserialize)]
struct ApiAlbum {
    id: Option<String>,
    name: Option<String>,
    #[serde(default)]
    images: Vec<ApiImage>,
    #[serde(default)]
    artists: Vec<ApiArtist>,
    popularity: Option<f64>,
}

#[derive(Deserialize)]
struct ApiImage {
    url: String,
}

#[derive(Deserialize)]
struct ApiArtist {
    name: String,
}

#[derive(Deserialize)]
struct AlbumsResponse {
    #[serde(default)]
    albums: Vec<Option<ApiAlbum>>,
}

impl ApiAlbum {
    fn image_ref(&self) -> Option<String> {
        self.images.first().map(|img| img.url.clone())
    }

    fn artist(&self) -> Option<String> {
        self.artists.first().map(|a| a.name.clone())
    }
}

impl SpotifyClient {
    /// Obtain an access token and build a client against the public endpoints.
    pub fn connect(credentials: &SpotifyCredentials) -> IcebergResult<Self> {
        Self::connect_to(credentials, TOKEN_URL, API_BASE)
    }

    /// Like [`SpotifyClient::connect`] with explicit endpoints.
    pub fn connect_to(
        credentials: &SpotifyCredentials,
        token_url: &str,
        api_base: &str,
    ) -> IcebergResult<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| IcebergError::Other(anyhow::anyhow!("build catalog http client: {e}")))?;

        let response = client
            .post(token_url)
            .basic_auth(&credentials.client_id, Some(&credentials.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .map_err(|e| IcebergError::transient(format!("token request: {e}")))?;
        let response = match response.status() {
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED => {
                return Err(IcebergError::auth(format!(
                    "client credentials rejected (HTTP {})",
                    response.status()
                )));
            }
            _ => check_status(response, "token request")?,
        };
        let token: TokenResponse = response
            .json()
            .map_err(|e| IcebergError::auth(format!("malformed token response: {e}")))?;
        tracing::debug!("catalog access token acquired");

        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            token: token.access_token,
        })
    }

    fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str, what: &str) -> IcebergResult<T> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .map_err(|e| IcebergError::transient(format!("{what}: {e}")))?;
        let response = check_status(response, what)?;
        response
            .json()
            .map_err(|e| IcebergError::transient(format!("{what}: malformed response: {e}")))
    }
}

fn check_status(response: Response, what: &str) -> IcebergResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    Err(map_status(status, what))
}

/// Map a non-success HTTP status onto the error taxonomy.
pub fn map_status(status: StatusCode, what: &str) -> IcebergError {
    match status {
        StatusCode::UNAUTHORIZED => IcebergError::auth(format!("{what}: HTTP {status}")),
        StatusCode::FORBIDDEN => IcebergError::forbidden(format!("{what}: HTTP {status}")),
        StatusCode::NOT_FOUND => IcebergError::not_found(format!("{what}: HTTP {status}")),
        StatusCode::TOO_MANY_REQUESTS => IcebergError::transient(format!("{what}: rate limited")),
        s if s.is_server_error() => IcebergError::transient(format!("{what}: HTTP {status}")),
        _ => IcebergError::Other(anyhow::anyhow!("{what}: unexpected HTTP {status}")),
    }
}

// Entries without a track, an album or an album name carry nothing to aggregate.
fn track_items(entries: Vec<PlaylistEntry>) -> Vec<TrackItem> {
    entries
        .into_iter()
        .filter_map(|entry| {
            let track = entry.track?;
            let album = track.album?;
            Some(TrackItem {
                image_ref: album.image_ref(),
                artist: album.artist(),
                album_name: album.name?,
                album_id: album.id,
                popularity: track.popularity,
            })
        })
        .collect()
}

fn album_metas(albums: Vec<Option<ApiAlbum>>) -> Vec<AlbumMeta> {
    albums
        .into_iter()
        .flatten()
        .filter_map(|album| {
            Some(AlbumMeta {
                image_ref: album.image_ref(),
                artist: album.artist(),
                popularity: album.popularity,
                id: album.id?,
                name: album.name?,
            })
        })
        .collect()
}

impl CatalogClient for SpotifyClient {
    fn list_tracks_page(
        &self,
        playlist_id: &str,
        cursor: Option<&str>,
    ) -> IcebergResult<TracksPage> {
        let url = match cursor {
            Some(next) => next.to_string(),
            None => reqwest::Url::parse_with_params(
                &format!("{}/playlists/{playlist_id}/tracks", self.api_base),
                &[
                    ("limit", TRACKS_PAGE_LIMIT.to_string()),
                    ("fields", TRACK_FIELDS.to_string()),
                ],
            )
            .map_err(|e| IcebergError::validation(format!("playlist url: {e}")))?
            .to_string(),
        };

        let body: PlaylistTracksResponse =
            self.get_json(&url, &format!("playlist {playlist_id} tracks"))?;
        Ok(TracksPage {
            items: track_items(body.items),
            next: body.next,
        })
    }

    fn get_albums_by_ids(&self, ids: &[String]) -> IcebergResult<Vec<AlbumMeta>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        if ids.len() > ALBUM_BATCH_LIMIT {
            return Err(IcebergError::validation(format!(
                "album lookup accepts at most {ALBUM_BATCH_LIMIT} ids, got {}",
                ids.len()
            )));
        }
        let url = format!("{}/albums?ids={}", self.api_base, ids.join(","));
        let body: AlbumsResponse = self.get_json(&url, "album lookup")?;
        Ok(album_metas(body.albums))
    }
}
