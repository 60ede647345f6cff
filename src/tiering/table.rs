use std::collections::BTreeMap;

use crate::foundation::core::Tier;
use crate::foundation::error::{IcebergError, IcebergResult};

/// Lower-bound thresholds for tiers 1..=8 used when the user supplies no edits.
pub const DEFAULT_THRESHOLDS: [i64; 8] = [60, 50, 40, 30, 20, 10, 5, 1];

/// Ordered mapping from tier number (1..=N) to an integer popularity lower bound.
///
/// A table can only be constructed through validation: every value is an integer in `[0, 100]`
/// and values strictly descend as the tier number grows, for every adjacent pair.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TierThresholdTable {
    // index 0 holds tier 1
    thresholds: Vec<u8>,
}

impl Default for TierThresholdTable {
    fn default() -> Self {
        Self {
            thresholds: DEFAULT_THRESHOLDS.iter().map(|&t| t as u8).collect(),
        }
    }
}

impl TierThresholdTable {
    /// Build a table from thresholds listed in tier order (tier 1 first).
    pub fn new(values: &[i64]) -> IcebergResult<Self> {
        validate_thresholds(values)?;
        Ok(Self {
            thresholds: values.iter().map(|&t| t as u8).collect(),
        })
    }

    /// Build a table from explicit `(tier, threshold)` pairs.
    ///
    /// Tier numbers must be exactly `1..=N` with no gaps or duplicates.
    pub fn from_entries(entries: impl IntoIterator<Item = (Tier, i64)>) -> IcebergResult<Self> {
        let mut by_tier = BTreeMap::new();
        for (tier, value) in entries {
            if by_tier.insert(tier, value).is_some() {
                return Err(IcebergError::validation(format!(
                    "tier {tier} is listed more than once"
                )));
            }
        }
        for (expected, &tier) in (1..).zip(by_tier.keys()) {
            if tier != expected {
                return Err(IcebergError::validation(format!(
                    "tiers must be numbered contiguously from 1 (missing tier {expected})"
                )));
            }
        }
        Self::new(&by_tier.into_values().collect::<Vec<_>>())
    }

    /// Apply partial user edits (tier -> threshold) on top of this table, then validate.
    pub fn with_overrides(&self, overrides: &BTreeMap<Tier, i64>) -> IcebergResult<Self> {
        let mut values: Vec<i64> = self.thresholds.iter().map(|&t| i64::from(t)).collect();
        for (&tier, &value) in overrides {
            let slot = tier
                .checked_sub(1)
                .and_then(|idx| values.get_mut(idx as usize))
                .ok_or_else(|| {
                    IcebergError::validation(format!(
                        "tier {tier} is outside the table (1..={})",
                        self.len()
                    ))
                })?;
            *slot = value;
        }
        Self::new(&values)
    }

    /// Number of tiers.
    pub fn len(&self) -> usize {
        self.thresholds.len()
    }

    /// Always `false` for a validated table; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.thresholds.is_empty()
    }

    /// Threshold for `tier`, if the tier exists.
    pub fn threshold(&self, tier: Tier) -> Option<u8> {
        let idx = tier.checked_sub(1)? as usize;
        self.thresholds.get(idx).copied()
    }

    /// Iterate `(tier, threshold)` in ascending tier order.
    pub fn tiers(&self) -> impl Iterator<Item = (Tier, u8)> + '_ {
        (1..).zip(self.thresholds.iter().copied())
    }

    /// Highest-numbered (least popular) tier.
    pub fn lowest_tier(&self) -> Tier {
        self.thresholds.len() as Tier
    }

    /// Thresholds in tier order.
    pub fn values(&self) -> &[u8] {
        &self.thresholds
    }
}

/// Check the threshold rules without building a table.
pub fn validate_thresholds(values: &[i64]) -> IcebergResult<()> {
    if values.is_empty() {
        return Err(IcebergError::validation(
            "threshold table must contain at least one tier",
        ));
    }
    for (tier, &value) in (1..).zip(values) {
        if !(0..=100).contains(&value) {
            return Err(IcebergError::validation(format!(
                "threshold for tier {tier} must be in [0, 100], got {value}"
            )));
        }
    }
    for (tier, pair) in (1..).zip(values.windows(2)) {
        if pair[0] <= pair[1] {
            return Err(IcebergError::validation(format!(
                "thresholds must strictly descend: tier {tier} ({}) <= tier {} ({})",
                pair[0],
                tier + 1,
                pair[1]
            )));
        }
    }
    Ok(())
}

/// Parse user edits of the form `1=60,2=50`.
///
/// Values must be integers; `2=50.5` is rejected rather than truncated.
pub fn parse_overrides(s: &str) -> IcebergResult<BTreeMap<Tier, i64>> {
    let mut out = BTreeMap::new();
    for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (tier, value) = part.split_once('=').ok_or_else(|| {
            IcebergError::validation(format!("threshold edit '{part}' must look like TIER=VALUE"))
        })?;
        let tier = parse_tier(tier.trim())?;
        let value = parse_threshold_value(tier, value.trim())?;
        if out.insert(tier, value).is_some() {
            return Err(IcebergError::validation(format!(
                "tier {tier} is edited more than once"
            )));
        }
    }
    Ok(out)
}

/// Parse a whole table listed in tier order, e.g. `70,60,50,40,30,20,10,5,1`.
///
/// Only the syntax is checked here; [`TierThresholdTable::new`] applies the threshold rules.
pub fn parse_table(s: &str) -> IcebergResult<Vec<i64>> {
    (1..)
        .zip(s.split(',').map(str::trim).filter(|p| !p.is_empty()))
        .map(|(tier, value)| parse_threshold_value(tier, value))
        .collect()
}

/// Convert a JSON object of edits (`{"1": 60}`) into override pairs.
pub fn overrides_from_json(
    map: &serde_json::Map<String, serde_json::Value>,
) -> IcebergResult<BTreeMap<Tier, i64>> {
    let mut out = BTreeMap::new();
    for (key, value) in map {
        let tier = parse_tier(key.trim())?;
        let value = value.as_i64().ok_or_else(|| {
            IcebergError::validation(format!(
                "threshold for tier {tier} must be an integer, got {value}"
            ))
        })?;
        out.insert(tier, value);
    }
    Ok(out)
}

fn parse_tier(s: &str) -> IcebergResult<Tier> {
    match s.parse::<Tier>() {
        Ok(tier) if tier >= 1 => Ok(tier),
        _ => Err(IcebergError::validation(format!(
            "'{s}' is not a tier number (expected 1, 2, ...)"
        ))),
    }
}

fn parse_threshold_value(tier: Tier, s: &str) -> IcebergResult<i64> {
    if let Ok(v) = s.parse::<i64>() {
        return Ok(v);
    }
    if s.parse::<f64>().is_ok() {
        return Err(IcebergError::validation(format!(
            "threshold for tier {tier} must be an integer, got {s}"
        )));
    }
    Err(IcebergError::validation(format!(
        "threshold for tier {tier} is not a number: '{s}'"
    )))
}

#[cfg(test)]
#[path = "../../tests/unit/tiering/table.rs"]
mod tests;
