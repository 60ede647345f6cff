use crate::{
    aggregate::aggregator::AlbumSet,
    foundation::core::Tier,
    foundation::error::IcebergResult,
    tiering::table::TierThresholdTable,
};

/// Map an aggregate score to the first tier (ascending) whose threshold it clears.
///
/// A score equal to a threshold belongs to that tier. Scores below every threshold fall into the
/// highest-numbered tier.
pub fn classify(score: f64, table: &TierThresholdTable) -> Tier {
    table
        .tiers()
        .find(|&(_, threshold)| score >= f64::from(threshold))
        .map(|(tier, _)| tier)
        .unwrap_or_else(|| table.lowest_tier())
}

/// Classify every album in `albums` against `table`.
#[tracing::instrument(skip_all, fields(albums = albums.len(), tiers = table.len()))]
pub fn assign_tiers(albums: &mut AlbumSet, table: &TierThresholdTable) -> IcebergResult<()> {
    for record in albums.records_mut() {
        let tier = classify(record.popularity(), table);
        record.assign_tier(tier)?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/tiering/classify.rs"]
mod tests;
