//! Instrument identifiers.

use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};

/// Opaque identifier of a traded instrument.
///
/// Source files identify instruments either by a numeric `instrument_id`
/// or by a `symbol` string; both are carried as text. The empty identifier
/// stands for "not provided".
#[derive(
    Debug,
    Clone,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    From,
    Into,
    Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct InstrumentId(String);

impl InstrumentId {
    /// Creates a new instrument identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if no identifier was provided.
    #[must_use]
    pub fn is_unspecified(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for InstrumentId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<i64> for InstrumentId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}
