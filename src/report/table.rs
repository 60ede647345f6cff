use std::fmt::Write as _;

use crate::{aggregate::aggregator::AlbumSet, foundation::core::Tier};

/// One row of the companion album table.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AlbumRow {
    /// Primary artist, empty when unknown.
    pub artist: String,
    /// Album name.
    pub album: String,
    /// Aggregate popularity.
    pub popularity: f64,
    /// Assigned tier, if classification ran.
    pub tier: Option<Tier>,
}

/// Every album as a row, most popular first. Ties keep arrival order.
pub fn album_table(albums: &AlbumSet) -> Vec<AlbumRow> {
    let mut rows: Vec<AlbumRow> = albums
        .iter()
        .map(|a| AlbumRow {
            artist: a.artist.clone().unwrap_or_default(),
            album: a.name.clone(),
            popularity: a.popularity(),
            tier: a.tier(),
        })
        .collect();
    rows.sort_by(|a, b| b.popularity.total_cmp(&a.popularity));
    rows
}

/// Render rows as an aligned plain-text table.
pub fn format_table(rows: &[AlbumRow]) -> String {
    let artist_w = rows
        .iter()
        .map(|r| r.artist.chars().count())
        .chain(std::iter::once("Artist".len()))
        .max()
        .unwrap_or(0);
    let album_w = rows
        .iter()
        .map(|r| r.album.chars().count())
        .chain(std::iter::once("Album".len()))
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<artist_w$}  {:<album_w$}  {:>10}  {:>4}",
        "Artist", "Album", "Popularity", "Tier"
    );
    for r in rows {
        let tier = r.tier.map(|t| t.to_string()).unwrap_or_else(|| "-".into());
        let _ = writeln!(
            out,
            "{:<artist_w$}  {:<album_w$}  {:>10.1}  {:>4}",
            r.artist, r.album, r.popularity, tier
        );
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/report/table.rs"]
mod tests;
