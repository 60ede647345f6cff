use std::collections::BTreeMap;

use crate::{
    aggregate::aggregator::{AlbumRecord, AlbumSet},
    foundation::core::Tier,
    foundation::error::{IcebergError, IcebergResult},
};

/// Albums bucketed by tier, each bucket sorted by popularity (descending, stable on arrival).
#[derive(Clone, Debug, Default)]
pub struct TierGroups<'a> {
    groups: BTreeMap<Tier, Vec<&'a AlbumRecord>>,
}

impl<'a> TierGroups<'a> {
    /// Albums in `tier`, most popular first. Unknown tiers are empty.
    pub fn get(&self, tier: Tier) -> &[&'a AlbumRecord] {
        self.groups.get(&tier).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Iterate non-empty tiers in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = (Tier, &[&'a AlbumRecord])> + '_ {
        self.groups.iter().map(|(&tier, albums)| (tier, albums.as_slice()))
    }

    /// Number of non-empty tiers.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// `true` when no album was grouped.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Group classified albums by tier.
///
/// Every album must already carry a tier.
pub fn group_by_tier(albums: &AlbumSet) -> IcebergResult<TierGroups<'_>> {
    let mut groups: BTreeMap<Tier, Vec<&AlbumRecord>> = BTreeMap::new();
    for record in albums.iter() {
        let tier = record.tier().ok_or_else(|| {
            IcebergError::Other(anyhow::anyhow!(
                "album '{}' was grouped before classification",
                record.key
            ))
        })?;
        groups.entry(tier).or_default().push(record);
    }

    // `sort_by` is stable and records arrive in first-seen order, so ties keep arrival order.
    for albums in groups.values_mut() {
        albums.sort_by(|a, b| b.popularity().total_cmp(&a.popularity()));
    }

    Ok(TierGroups { groups })
}

#[cfg(test)]
#[path = "../../tests/unit/tiering/groups.rs"]
mod tests;
