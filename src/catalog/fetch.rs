use std::collections::HashSet;

use crate::{
    aggregate::aggregator::{AggregationMode, AlbumSample},
    catalog::client::{ALBUM_BATCH_LIMIT, AlbumMeta, CatalogClient, TrackItem},
    catalog::retry::RetryPolicy,
    catalog::source::SourceId,
    foundation::error::{IcebergError, IcebergResult},
};

/// Pull popularity samples for a playlist in the shape `mode` aggregates.
///
/// Mean mode yields one sample per track. Direct mode looks up each distinct album (first-seen
/// order, at most `max_albums`) in batches of [`ALBUM_BATCH_LIMIT`] and yields one sample per
/// album with the album's own popularity.
#[tracing::instrument(skip_all, fields(playlist = %playlist, mode = mode.as_str()))]
pub fn collect_samples(
    client: &dyn CatalogClient,
    playlist: &SourceId,
    mode: AggregationMode,
    max_albums: usize,
    retry: &RetryPolicy,
) -> IcebergResult<Vec<AlbumSample>> {
    let tracks = list_all_tracks(client, playlist, retry)?;
    tracing::info!(tracks = tracks.len(), "playlist tracks fetched");

    match mode {
        AggregationMode::MeanOfSamples => Ok(tracks.into_iter().filter_map(track_sample).collect()),
        AggregationMode::DirectScore => album_samples(client, &tracks, max_albums, retry),
    }
}

/// Every track of the playlist, following page cursors to the end.
pub fn list_all_tracks(
    client: &dyn CatalogClient,
    playlist: &SourceId,
    retry: &RetryPolicy,
) -> IcebergResult<Vec<TrackItem>> {
    let mut items = Vec::new();
    let mut cursor: Option<String> = None;
    let mut seen_cursors = HashSet::new();
    let mut pages = 0usize;

    loop {
        let page = retry.run("list_tracks_page", || {
            client.list_tracks_page(playlist.as_str(), cursor.as_deref())
        })?;
        pages += 1;
        items.extend(page.items);

        match page.next {
            Some(next) => {
                if !seen_cursors.insert(next.clone()) {
                    return Err(IcebergError::Other(anyhow::anyhow!(
                        "catalog returned a repeated page cursor after {pages} pages"
                    )));
                }
                cursor = Some(next);
            }
            None => break,
        }
    }

    tracing::debug!(pages, "playlist pagination finished");
    Ok(items)
}

fn track_sample(track: TrackItem) -> Option<AlbumSample> {
    let Some(popularity) = track.popularity else {
        tracing::debug!(album = %track.album_name, "track without popularity skipped");
        return None;
    };
    Some(AlbumSample::new(track.album_name, track.artist, popularity).with_image_ref(track.image_ref))
}

fn album_sample(album: AlbumMeta) -> Option<AlbumSample> {
    let Some(popularity) = album.popularity else {
        tracing::debug!(album = %album.name, "album without popularity skipped");
        return None;
    };
    Some(AlbumSample::new(album.name, album.artist, popularity).with_image_ref(album.image_ref))
}

fn album_samples(
    client: &dyn CatalogClient,
    tracks: &[TrackItem],
    max_albums: usize,
    retry: &RetryPolicy,
) -> IcebergResult<Vec<AlbumSample>> {
    let mut seen = HashSet::new();
    let ids: Vec<String> = tracks
        .iter()
        .filter_map(|t| t.album_id.as_deref())
        .filter(|id| seen.insert(*id))
        .take(max_albums)
        .map(str::to_string)
        .collect();

    let mut samples = Vec::with_capacity(ids.len());
    for batch in ids.chunks(ALBUM_BATCH_LIMIT) {
        let albums = retry.run("get_albums_by_ids", || client.get_albums_by_ids(batch))?;
        samples.extend(albums.into_iter().filter_map(album_sample));
    }
    tracing::debug!(albums = ids.len(), "album metadata fetched");
    Ok(samples)
}

#[cfg(test)]
#[path = "../../tests/unit/catalog/fetch.rs"]
mod tests;
