//! Tag lookup over dictionary-encoded ways
//!
//! Ingested ways store their tags as parallel key/value id arrays plus shared
//! id → string dictionaries. `TagLookup` exposes them as a [`TagSource`]
//! without materialising a map per way.

use std::collections::HashMap;

use super::tags::TagSource;

/// Reverse key index built once per dictionary and shared by every way
pub struct KeyIndex<'a> {
    rev_key: HashMap<&'a str, u32>,
}

impl<'a> KeyIndex<'a> {
    pub fn new(key_dict: &'a HashMap<u32, String>) -> Self {
        Self {
            rev_key: key_dict.iter().map(|(id, s)| (s.as_str(), *id)).collect(),
        }
    }

    pub fn id(&self, key: &str) -> Option<u32> {
        self.rev_key.get(key).copied()
    }
}

/// Helper for looking up tags in dictionary-encoded format
pub struct TagLookup<'a> {
    keys: &'a [u32],
    vals: &'a [u32],
    key_index: &'a KeyIndex<'a>,
    val_dict: &'a HashMap<u32, String>,
}

impl<'a> TagLookup<'a> {
    pub fn new(
        keys: &'a [u32],
        vals: &'a [u32],
        key_index: &'a KeyIndex<'a>,
        val_dict: &'a HashMap<u32, String>,
    ) -> Self {
        Self {
            keys,
            vals,
            key_index,
            val_dict,
        }
    }

    /// Get a tag value by key ID (when working with IDs directly)
    pub fn get_by_id(&self, key_id: u32) -> Option<u32> {
        self.keys
            .iter()
            .position(|k| *k == key_id)
            .and_then(|i| self.vals.get(i).copied())
    }
}

impl TagSource for TagLookup<'_> {
    fn tag(&self, key: &str) -> Option<&str> {
        let key_id = self.key_index.id(key)?;
        let val_id = self.get_by_id(key_id)?;
        self.val_dict.get(&val_id).map(|s| s.as_str())
    }
}
