//! Profile: one named rule table paired with one edge layout
//!
//! A profile is immutable once built and can be shared freely between
//! threads. Encoding a graph is an independent map over its ways, which
//! [`Profile::encode_ways`] runs on the rayon pool.

use log::{debug, info};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::error::{Error, Result};
use super::layout::{EdgeLayout, EncodedEdgeValue, EncoderOptions, LayoutDescription};
use super::resolver::{resolve, EdgeValues};
use super::rules::RuleTableStore;
use super::tags::{TagAttributeSet, TagSource};

/// Named options accepted at profile construction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileOptions {
    #[serde(flatten)]
    pub encoder: EncoderOptions,
    pub block_private: bool,
    pub block_fords: bool,
}

impl Default for ProfileOptions {
    fn default() -> Self {
        Self {
            encoder: EncoderOptions::default(),
            block_private: true,
            block_fords: false,
        }
    }
}

impl ProfileOptions {
    /// Parse `key=value` style properties; absent keys keep their defaults
    pub fn from_properties(properties: &HashMap<String, String>) -> Result<Self> {
        let mut options = Self::default();
        for (key, value) in properties {
            match key.as_str() {
                "speed_bits" => options.encoder.speed_bits = parse_value(key, value)?,
                "speed_factor" => options.encoder.speed_factor = parse_value(key, value)?,
                "turn_costs" => options.encoder.turn_costs = parse_value(key, value)?,
                "speed_two_directions" => {
                    options.encoder.speed_two_directions = parse_value(key, value)?
                }
                "block_private" => options.block_private = parse_value(key, value)?,
                "block_fords" => options.block_fords = parse_value(key, value)?,
                _ => {
                    return Err(Error::InvalidOption {
                        key: key.clone(),
                        reason: "unknown option".to_string(),
                    })
                }
            }
        }
        Ok(options)
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| Error::InvalidOption {
        key: key.to_string(),
        reason: format!("'{value}': {e}"),
    })
}

/// A frozen, validated travel-mode profile
#[derive(Debug, Clone)]
pub struct Profile {
    name: String,
    rules: RuleTableStore,
    layout: EdgeLayout,
}

impl Profile {
    /// Pair a rule table with a layout, checking every configured speed fits
    pub fn new(name: &str, rules: RuleTableStore, encoder: EncoderOptions) -> Result<Self> {
        if name.trim().is_empty() {
            return Err(Error::InvalidConfig("profile name must not be empty".to_string()));
        }

        let layout = EdgeLayout::new(encoder)?;
        let max_speed = rules.max_speed();
        if max_speed > layout.max_speed() {
            return Err(Error::InvalidConfig(format!(
                "profile '{name}': speed {max_speed} does not fit {} speed bits with factor {} (max {})",
                encoder.speed_bits,
                encoder.speed_factor,
                layout.max_speed()
            )));
        }

        info!(
            "profile '{name}': {} bits per edge, max speed {}",
            layout.total_bits(),
            layout.max_speed()
        );
        debug!("profile '{name}' layout: {:?}", layout.describe());

        Ok(Self {
            name: name.to_string(),
            rules,
            layout,
        })
    }

    /// Stable name used by the registry
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rules(&self) -> &RuleTableStore {
        &self.rules
    }

    pub fn layout(&self) -> &EdgeLayout {
        &self.layout
    }

    pub fn describe(&self) -> LayoutDescription {
        self.layout.describe()
    }

    pub fn attributes<T: TagSource + ?Sized>(&self, tags: &T) -> TagAttributeSet {
        TagAttributeSet::build_with(tags, self.rules.tag_keys())
    }

    /// Resolve speeds and priority without encoding
    pub fn resolve<T: TagSource + ?Sized>(&self, tags: &T) -> EdgeValues {
        resolve(&self.attributes(tags), &self.rules)
    }

    /// Full pipeline for one way: attributes, resolution, encoding
    pub fn process_way<T: TagSource + ?Sized>(&self, tags: &T) -> Result<EncodedEdgeValue> {
        self.layout.encode(&self.resolve(tags))
    }

    pub fn encode(&self, values: &EdgeValues) -> Result<EncodedEdgeValue> {
        self.layout.encode(values)
    }

    pub fn decode(&self, value: EncodedEdgeValue) -> EdgeValues {
        self.layout.decode(value)
    }

    /// Encode many ways in parallel; results keep the input order
    pub fn encode_ways<T: TagSource + Sync>(&self, ways: &[T]) -> Vec<Result<EncodedEdgeValue>> {
        ways.par_iter().map(|tags| self.process_way(tags)).collect()
    }
}
