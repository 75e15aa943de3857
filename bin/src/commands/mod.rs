//! CLI command implementations.

pub(crate) mod aggregate;
pub(crate) mod batch;
pub(crate) mod intervals;
pub(crate) mod normalize;
