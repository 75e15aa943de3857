//! Instrument selection for dates that mix contracts.

use std::collections::BTreeMap;
use std::str::FromStr;
use tickbar_types::{InstrumentId, TradeRecord};

/// Which instruments of a date to keep before aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum InstrumentSelection {
    /// Keep every record.
    #[default]
    All,
    /// Keep only the instrument with the largest traded size.
    Dominant,
    /// Keep only the given instrument.
    Only(InstrumentId),
}

impl InstrumentSelection {
    /// Applies the selection, preserving record order.
    #[must_use]
    pub fn apply(&self, mut records: Vec<TradeRecord>) -> Vec<TradeRecord> {
        let keep = match self {
            Self::All => return records,
            Self::Dominant => match dominant_instrument(&records) {
                Some(id) => id,
                None => return records,
            },
            Self::Only(id) => id.clone(),
        };
        records.retain(|r| r.instrument_id == keep);
        records
    }
}

impl FromStr for InstrumentSelection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" => Err("instrument selection must not be empty".to_string()),
            "all" => Ok(Self::All),
            "dominant" => Ok(Self::Dominant),
            id => Ok(Self::Only(InstrumentId::new(id))),
        }
    }
}

impl std::fmt::Display for InstrumentSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Dominant => write!(f, "dominant"),
            Self::Only(id) => write!(f, "{id}"),
        }
    }
}

/// Total traded size per instrument.
#[must_use]
pub fn volume_by_instrument(records: &[TradeRecord]) -> BTreeMap<&InstrumentId, u64> {
    let mut volumes = BTreeMap::new();
    for record in records {
        let total: &mut u64 = volumes.entry(&record.instrument_id).or_default();
        *total = total.saturating_add(record.size);
    }
    volumes
}

/// Returns the instrument with the largest traded size.
///
/// Ties go to the smallest identifier so the choice is deterministic.
#[must_use]
pub fn dominant_instrument(records: &[TradeRecord]) -> Option<InstrumentId> {
    volume_by_instrument(records)
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(a.0)))
        .map(|(id, _)| id.clone())
}
