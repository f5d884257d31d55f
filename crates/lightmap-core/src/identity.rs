//! Mapping from decoded signature numbers to light ids.

use crate::{CoreError, LightId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Signature number → light id, as produced by the capture run.
///
/// On disk this is a JSON object with the signature number as a string key,
/// e.g. `{"37": 0, "82": 1}`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, LightId>", into = "BTreeMap<String, LightId>")]
pub struct IdentityMap {
    entries: BTreeMap<u32, LightId>,
}

impl IdentityMap {
    pub fn from_pairs(pairs: impl IntoIterator<Item = (u32, LightId)>) -> Self {
        Self {
            entries: pairs.into_iter().collect(),
        }
    }

    /// Light assigned to a signature number, `None` when the number is unknown.
    #[inline]
    pub fn resolve(&self, number: u32) -> Option<LightId> {
        self.entries.get(&number).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, LightId)> + '_ {
        self.entries.iter().map(|(&n, &id)| (n, id))
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), CoreError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

impl TryFrom<BTreeMap<String, LightId>> for IdentityMap {
    type Error = CoreError;

    fn try_from(raw: BTreeMap<String, LightId>) -> Result<Self, Self::Error> {
        let mut entries = BTreeMap::new();
        for (key, id) in raw {
            let number = key
                .trim()
                .parse::<u32>()
                .map_err(|_| CoreError::InvalidIdentityKey { key: key.clone() })?;
            entries.insert(number, id);
        }
        Ok(Self { entries })
    }
}

impl From<IdentityMap> for BTreeMap<String, LightId> {
    fn from(map: IdentityMap) -> Self {
        map.entries
            .into_iter()
            .map(|(n, id)| (n.to_string(), id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_misses_are_none() {
        let map = IdentityMap::from_pairs([(5, 0), (9, 1)]);
        assert_eq!(map.resolve(9), Some(1));
        assert_eq!(map.resolve(6), None);
    }

    #[test]
    fn json_uses_string_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("numbers.json");
        let map = IdentityMap::from_pairs([(37, 2), (4, 3)]);
        map.write_json(&path).unwrap();
        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"37\""));
        assert_eq!(IdentityMap::load_json(&path).unwrap(), map);
    }

    #[test]
    fn non_numeric_key_is_rejected() {
        let err = serde_json::from_str::<IdentityMap>(r#"{"abc": 1}"#).unwrap_err();
        assert!(err.to_string().contains("abc"));
    }
}
