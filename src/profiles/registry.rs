//! Profile registry
//!
//! Maps stable profile names to shared, immutable profiles. Unknown names
//! fail with a fuzzy-matched suggestion.

use std::collections::BTreeMap;
use std::sync::Arc;
use strsim::{jaro_winkler, normalized_levenshtein};

use crate::core::{Error, Profile, ProfileOptions, Result};

use super::horse;

/// Minimum combined similarity before a name is suggested
const SUGGESTION_THRESHOLD: f64 = 0.7;

#[derive(Debug, Default, Clone)]
pub struct ProfileRegistry {
    profiles: BTreeMap<String, Arc<Profile>>,
}

impl ProfileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in profile, built with `options`
    pub fn with_builtin(options: &ProfileOptions) -> Result<Self> {
        let mut registry = Self::new();
        registry.register(horse::profile(options)?)?;
        Ok(registry)
    }

    pub fn register(&mut self, profile: Profile) -> Result<Arc<Profile>> {
        let name = profile.name().to_string();
        if self.profiles.contains_key(&name) {
            return Err(Error::DuplicateProfile(name));
        }
        let profile = Arc::new(profile);
        self.profiles.insert(name, Arc::clone(&profile));
        Ok(profile)
    }

    pub fn get(&self, name: &str) -> Result<Arc<Profile>> {
        self.profiles
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownProfile {
                name: name.to_string(),
                suggestion: self.suggest(name),
            })
    }

    /// Registered names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(|k| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    fn suggest(&self, name: &str) -> Option<String> {
        let input = name.to_lowercase();
        let mut best: Option<(f64, &str)> = None;

        for candidate in self.names() {
            let lower = candidate.to_lowercase();
            let score = (jaro_winkler(&input, &lower) + normalized_levenshtein(&input, &lower)) / 2.0;
            if score >= SUGGESTION_THRESHOLD && best.map_or(true, |(s, _)| score > s) {
                best = Some((score, candidate));
            }
        }

        best.map(|(_, candidate)| candidate.to_string())
    }
}
