//! Serde helpers for the orchestrator's JSON
//!
//! The service encodes empty slices and maps as `null`. `#[serde(default)]`
//! only covers absent keys, so collection fields also go through
//! [`null_as_default`].

use serde::{Deserialize, Deserializer};

/// Deserializes `null` as `T::default()`
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}
