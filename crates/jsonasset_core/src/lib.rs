//! Public library API for importing JSON asset exports into reflected object graphs.

/// Value model, host type descriptors, marshalling engine, and import sessions.
pub mod asset;
