use serde::{Deserialize, Deserializer};

pub mod job;
pub mod personal;
pub mod skills;

/// Reads an explicit JSON `null` as the field's default. Pair with
/// `#[serde(default)]` so a missing key behaves the same way.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
