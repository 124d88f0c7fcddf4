//! Versioned settings records and the key-value store they are read from.

pub(crate) mod settings;
pub(crate) mod store;
