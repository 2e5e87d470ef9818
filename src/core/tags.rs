//! Tag attribute model
//!
//! Normalizes the raw tags of one way into the handful of attributes the
//! resolver cares about. Unknown or malformed values fall back to sentinels;
//! building an attribute set never fails.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

/// Highway class used when a way carries no usable `highway` tag
pub const UNKNOWN_HIGHWAY: &str = "unknown";

/// Read access to the raw key/value tags of a way
pub trait TagSource {
    fn tag(&self, key: &str) -> Option<&str>;
}

impl<S: BuildHasher> TagSource for HashMap<String, String, S> {
    fn tag(&self, key: &str) -> Option<&str> {
        self.get(key).map(|v| v.as_str())
    }
}

impl TagSource for BTreeMap<String, String> {
    fn tag(&self, key: &str) -> Option<&str> {
        self.get(key).map(|v| v.as_str())
    }
}

impl<T: TagSource + ?Sized> TagSource for &T {
    fn tag(&self, key: &str) -> Option<&str> {
        (**self).tag(key)
    }
}

/// Surface smoothness, from best to worst
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Smoothness {
    Excellent,
    Good,
    Intermediate,
    Bad,
    VeryBad,
    Horrible,
    VeryHorrible,
    Impassable,
    Unset,
}

impl Smoothness {
    /// Number of variants, `Unset` included
    pub const COUNT: usize = 9;

    pub fn all() -> &'static [Smoothness] {
        &[
            Smoothness::Excellent,
            Smoothness::Good,
            Smoothness::Intermediate,
            Smoothness::Bad,
            Smoothness::VeryBad,
            Smoothness::Horrible,
            Smoothness::VeryHorrible,
            Smoothness::Impassable,
            Smoothness::Unset,
        ]
    }

    /// Parse an OSM `smoothness` value; anything unrecognized is `Unset`
    pub fn parse(value: &str) -> Smoothness {
        match value.trim().to_ascii_lowercase().as_str() {
            "excellent" => Smoothness::Excellent,
            "good" => Smoothness::Good,
            "intermediate" => Smoothness::Intermediate,
            "bad" => Smoothness::Bad,
            "very_bad" => Smoothness::VeryBad,
            "horrible" => Smoothness::Horrible,
            "very_horrible" => Smoothness::VeryHorrible,
            "impassable" => Smoothness::Impassable,
            _ => Smoothness::Unset,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Smoothness::Excellent => "excellent",
            Smoothness::Good => "good",
            Smoothness::Intermediate => "intermediate",
            Smoothness::Bad => "bad",
            Smoothness::VeryBad => "very_bad",
            Smoothness::Horrible => "horrible",
            Smoothness::VeryHorrible => "very_horrible",
            Smoothness::Impassable => "impassable",
            Smoothness::Unset => "unset",
        }
    }
}

/// Direction restriction of a way
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Oneway {
    None,
    Forward,
    Backward,
}

impl Oneway {
    /// Parse an OSM oneway value; unknown values mean no restriction
    pub fn parse(value: &str) -> Oneway {
        match value.trim().to_ascii_lowercase().as_str() {
            "yes" | "true" | "1" => Oneway::Forward,
            "-1" | "reverse" => Oneway::Backward,
            _ => Oneway::None,
        }
    }
}

/// Tag keys consulted when building attributes, most specific first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagKeys {
    pub restrictions: Vec<String>,
    pub oneway: Vec<String>,
}

impl Default for TagKeys {
    fn default() -> Self {
        Self {
            restrictions: vec!["access".to_string()],
            oneway: vec!["oneway".to_string()],
        }
    }
}

/// Normalized view of one way's routing-relevant attributes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagAttributeSet {
    highway_class: String,
    smoothness: Smoothness,
    barrier: Option<String>,
    access_value: Option<String>,
    oneway: Oneway,
    ford: bool,
}

impl TagAttributeSet {
    /// Build attributes using the default key hierarchy
    pub fn build<T: TagSource + ?Sized>(tags: &T) -> Self {
        Self::build_with(tags, &TagKeys::default())
    }

    /// Build attributes using a profile's key hierarchy
    pub fn build_with<T: TagSource + ?Sized>(tags: &T, keys: &TagKeys) -> Self {
        let highway_class = match tags.tag("highway").map(str::trim) {
            Some(h) if !h.is_empty() => h.to_string(),
            _ => UNKNOWN_HIGHWAY.to_string(),
        };

        let smoothness = tags
            .tag("smoothness")
            .map(Smoothness::parse)
            .unwrap_or(Smoothness::Unset);

        let barrier = non_empty(tags.tag("barrier"));

        let access_value = keys
            .restrictions
            .iter()
            .find_map(|key| non_empty(tags.tag(key)));

        let explicit_oneway = keys
            .oneway
            .iter()
            .find_map(|key| non_empty(tags.tag(key)));
        let oneway = match explicit_oneway {
            Some(value) => Oneway::parse(&value),
            None if tags.tag("junction") == Some("roundabout") => Oneway::Forward,
            None => Oneway::None,
        };

        let ford = highway_class == "ford"
            || tags.tag("ford").is_some_and(|v| !v.is_empty() && v != "no");

        Self {
            highway_class,
            smoothness,
            barrier,
            access_value,
            oneway,
            ford,
        }
    }

    pub fn highway_class(&self) -> &str {
        &self.highway_class
    }

    pub fn smoothness(&self) -> Smoothness {
        self.smoothness
    }

    pub fn barrier(&self) -> Option<&str> {
        self.barrier.as_deref()
    }

    pub fn access_value(&self) -> Option<&str> {
        self.access_value.as_deref()
    }

    pub fn oneway(&self) -> Oneway {
        self.oneway
    }

    pub fn ford(&self) -> bool {
        self.ford
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
