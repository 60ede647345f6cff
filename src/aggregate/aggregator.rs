use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::foundation::core::{Tier, clamp_popularity};
use crate::foundation::error::{IcebergError, IcebergResult};

/// Stable album identity within one playlist: album name plus primary artist when known.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub struct AlbumKey(String);

impl AlbumKey {
    /// Build the identity for an album name and optional primary artist.
    pub fn new(name: &str, artist: Option<&str>) -> Self {
        match artist {
            Some(artist) => Self(format!("{name}\u{1f}{artist}")),
            None => Self(name.to_string()),
        }
    }

    /// Raw key string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AlbumKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.replace('\u{1f}', " / "))
    }
}

/// One popularity observation for an album, as produced by the catalog layer.
#[derive(Clone, Debug, PartialEq)]
pub struct AlbumSample {
    /// Album identity.
    pub key: AlbumKey,
    /// Album display name.
    pub name: String,
    /// Primary artist, if known.
    pub artist: Option<String>,
    /// Cover art reference (URL or relative path).
    pub image_ref: Option<String>,
    /// Popularity in `[0, 100]`.
    pub popularity: f64,
}

impl AlbumSample {
    /// Create a sample; the key is derived from `name` and `artist`.
    pub fn new(name: impl Into<String>, artist: Option<String>, popularity: f64) -> Self {
        let name = name.into();
        Self {
            key: AlbumKey::new(&name, artist.as_deref()),
            name,
            artist,
            image_ref: None,
            popularity,
        }
    }

    /// Attach a cover art reference.
    pub fn with_image_ref(mut self, image_ref: Option<String>) -> Self {
        self.image_ref = image_ref;
        self
    }
}

/// How samples sharing one identity combine into an aggregate score.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AggregationMode {
    /// Arithmetic mean of all per-track samples.
    #[default]
    MeanOfSamples,
    /// One authoritative album-level score; later duplicates are ignored.
    DirectScore,
}

impl AggregationMode {
    /// Stable kebab-case name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MeanOfSamples => "mean-of-samples",
            Self::DirectScore => "direct-score",
        }
    }
}

impl FromStr for AggregationMode {
    type Err = IcebergError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mean-of-samples" | "mean" => Ok(Self::MeanOfSamples),
            "direct-score" | "direct" => Ok(Self::DirectScore),
            other => Err(IcebergError::validation(format!(
                "unknown aggregation mode '{other}' (expected mean-of-samples or direct-score)"
            ))),
        }
    }
}

/// Aggregated album entry.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct AlbumRecord {
    /// Album identity, unique within an [`AlbumSet`].
    pub key: AlbumKey,
    /// Album display name.
    pub name: String,
    /// Primary artist, if known.
    pub artist: Option<String>,
    /// Cover art reference; `None` means the album is not drawn.
    pub image_ref: Option<String>,
    /// Position in first-seen order.
    pub arrival: usize,
    popularity: f64,
    samples: u32,
    tier: Option<Tier>,
    #[serde(skip)]
    popularity_sum: f64,
}

impl AlbumRecord {
    fn from_sample(sample: AlbumSample, popularity: f64, arrival: usize) -> Self {
        Self {
            key: sample.key,
            name: sample.name,
            artist: sample.artist,
            image_ref: sample.image_ref,
            arrival,
            popularity,
            samples: 1,
            tier: None,
            popularity_sum: popularity,
        }
    }

    fn fold(&mut self, popularity: f64) {
        self.samples += 1;
        self.popularity_sum += popularity;
        self.popularity = self.popularity_sum / f64::from(self.samples);
    }

    /// Aggregate popularity in `[0, 100]`.
    pub fn popularity(&self) -> f64 {
        self.popularity
    }

    /// Number of samples folded into the aggregate.
    pub fn sample_count(&self) -> u32 {
        self.samples
    }

    /// Assigned tier, once classification has run.
    pub fn tier(&self) -> Option<Tier> {
        self.tier
    }

    /// Attach the tier. A record is classified exactly once.
    pub fn assign_tier(&mut self, tier: Tier) -> IcebergResult<()> {
        if let Some(existing) = self.tier {
            return Err(IcebergError::validation(format!(
                "album '{}' already assigned to tier {existing}",
                self.key
            )));
        }
        self.tier = Some(tier);
        Ok(())
    }
}

/// Deduplicated albums in first-seen order.
#[derive(Clone, Debug, Default)]
pub struct AlbumSet {
    records: Vec<AlbumRecord>,
    index: HashMap<AlbumKey, usize>,
}

impl AlbumSet {
    /// Number of distinct albums.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// `true` when no album survived aggregation.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look up an album by identity.
    pub fn get(&self, key: &AlbumKey) -> Option<&AlbumRecord> {
        self.index.get(key).map(|&idx| &self.records[idx])
    }

    /// Albums in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = &AlbumRecord> {
        self.records.iter()
    }

    pub(crate) fn records_mut(&mut self) -> &mut [AlbumRecord] {
        &mut self.records
    }
}

/// Deduplicate samples by identity and compute one aggregate score per album.
///
/// At most `max_albums` distinct identities are admitted, in arrival order. Samples for an
/// already-admitted identity still fold in under [`AggregationMode::MeanOfSamples`]. The first
/// sample for an identity fixes its name, artist and cover reference.
pub fn aggregate<I>(samples: I, max_albums: usize, mode: AggregationMode) -> IcebergResult<AlbumSet>
where
    I: IntoIterator<Item = AlbumSample>,
{
    if max_albums == 0 {
        return Err(IcebergError::validation("max_albums must be > 0"));
    }

    let mut set = AlbumSet::default();
    let mut over_cap = 0usize;
    let mut discarded = 0usize;

    for sample in samples {
        let Some(popularity) = clamp_popularity(sample.popularity) else {
            discarded += 1;
            continue;
        };

        if let Some(&idx) = set.index.get(&sample.key) {
            if mode == AggregationMode::MeanOfSamples {
                set.records[idx].fold(popularity);
            }
            continue;
        }

        if set.records.len() >= max_albums {
            over_cap += 1;
            continue;
        }

        let arrival = set.records.len();
        set.index.insert(sample.key.clone(), arrival);
        set.records
            .push(AlbumRecord::from_sample(sample, popularity, arrival));
    }

    if discarded > 0 {
        tracing::warn!(discarded, "discarded samples with non-finite popularity");
    }
    if over_cap > 0 {
        tracing::debug!(over_cap, max_albums, "samples for new albums past the cap ignored");
    }
    tracing::debug!(albums = set.len(), mode = mode.as_str(), "aggregated samples");

    Ok(set)
}

#[cfg(test)]
#[path = "../../tests/unit/aggregate/aggregator.rs"]
mod tests;
