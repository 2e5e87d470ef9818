//! Rule table store
//!
//! Per-profile tables mapping tag values to speed and priority contributions.
//! Tables are populated through [`RuleTableBuilder`], which starts from the
//! shared [`BASE_RULES`] and applies profile-specific overrides in call order
//! (last write wins). [`RuleTableBuilder::build`] validates everything once and
//! returns a frozen [`RuleTableStore`] that is safe to share across threads.

use log::{debug, warn};
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

use super::error::{Error, Result};
use super::priority::PriorityCode;
use super::tags::{Smoothness, TagKeys};

/// Speed (km/h) of a section that can only be traversed by dismounting
pub const PUSHING_SECTION_SPEED: f64 = 4.0;

/// Speed (km/h) for highway classes without a table entry
pub const DEFAULT_UNKNOWN_SPEED: f64 = 6.0;

/// Shared defaults every profile builder starts from
pub static BASE_RULES: Lazy<RuleTableBuilder> = Lazy::new(|| {
    let mut base = RuleTableBuilder::empty();
    for barrier in [
        "fence",
        "wall",
        "hedge",
        "retaining_wall",
        "city_wall",
        "ditch",
        "hampshire_gate",
        "sump_buster",
        "bus_trap",
    ] {
        base.block_barrier(barrier);
    }
    for value in ["yes", "designated", "official", "permissive"] {
        base.intended_value(value);
    }
    for value in [
        "no",
        "restricted",
        "military",
        "emergency",
        "agricultural",
        "forestry",
        "delivery",
    ] {
        base.restricted_value(value);
    }
    base
});

/// Mutable rule tables, validated and frozen by [`RuleTableBuilder::build`]
#[derive(Debug, Clone)]
pub struct RuleTableBuilder {
    highway_speeds: HashMap<String, f64>,
    unknown_speed: f64,
    prefer: HashSet<String>,
    avoid: HashSet<String>,
    smoothness_factors: HashMap<Smoothness, f64>,
    blocked_barriers: HashSet<String>,
    intended_values: HashSet<String>,
    restricted_values: HashSet<String>,
    tag_keys: TagKeys,
    pushing_threshold: f64,
    prefer_priority: PriorityCode,
    avoid_priority: PriorityCode,
    block_private: bool,
    block_fords: bool,
    respect_oneway: bool,
}

impl Default for RuleTableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleTableBuilder {
    /// Start from the shared base configuration
    pub fn new() -> Self {
        BASE_RULES.clone()
    }

    /// Start from empty tables, without the base barrier and access lists
    pub fn empty() -> Self {
        Self {
            highway_speeds: HashMap::new(),
            unknown_speed: DEFAULT_UNKNOWN_SPEED,
            prefer: HashSet::new(),
            avoid: HashSet::new(),
            smoothness_factors: HashMap::new(),
            blocked_barriers: HashSet::new(),
            intended_values: HashSet::new(),
            restricted_values: HashSet::new(),
            tag_keys: TagKeys::default(),
            pushing_threshold: 0.0,
            prefer_priority: PriorityCode::Prefer,
            avoid_priority: PriorityCode::Avoid,
            block_private: true,
            block_fords: false,
            respect_oneway: true,
        }
    }

    pub fn highway_speed(&mut self, highway: &str, speed: f64) -> &mut Self {
        if let Some(previous) = self.highway_speeds.insert(highway.to_string(), speed) {
            debug!("highway speed for '{highway}' overwritten: {previous} -> {speed}");
        }
        self
    }

    pub fn unknown_speed(&mut self, speed: f64) -> &mut Self {
        self.unknown_speed = speed;
        self
    }

    pub fn prefer_highway(&mut self, highway: &str) -> &mut Self {
        self.prefer.insert(highway.to_string());
        self
    }

    pub fn avoid_highway(&mut self, highway: &str) -> &mut Self {
        self.avoid.insert(highway.to_string());
        self
    }

    pub fn remove_prefer_highway(&mut self, highway: &str) -> &mut Self {
        self.prefer.remove(highway);
        self
    }

    pub fn remove_avoid_highway(&mut self, highway: &str) -> &mut Self {
        self.avoid.remove(highway);
        self
    }

    pub fn smoothness_factor(&mut self, smoothness: Smoothness, factor: f64) -> &mut Self {
        if let Some(previous) = self.smoothness_factors.insert(smoothness, factor) {
            debug!("smoothness factor for {smoothness:?} overwritten: {previous} -> {factor}");
        }
        self
    }

    pub fn block_barrier(&mut self, barrier: &str) -> &mut Self {
        self.blocked_barriers.insert(barrier.to_string());
        self
    }

    pub fn allow_barrier(&mut self, barrier: &str) -> &mut Self {
        self.blocked_barriers.remove(barrier);
        self
    }

    pub fn intended_value(&mut self, value: &str) -> &mut Self {
        self.intended_values.insert(value.to_string());
        self
    }

    pub fn restricted_value(&mut self, value: &str) -> &mut Self {
        self.restricted_values.insert(value.to_string());
        self
    }

    pub fn remove_restricted_value(&mut self, value: &str) -> &mut Self {
        self.restricted_values.remove(value);
        self
    }

    /// Restriction keys, most specific first (e.g. `horse`, `access`)
    pub fn restriction_keys(&mut self, keys: &[&str]) -> &mut Self {
        self.tag_keys.restrictions = keys.iter().map(|k| k.to_string()).collect();
        self
    }

    /// Oneway keys, most specific first (e.g. `oneway:horse`, `oneway`)
    pub fn oneway_keys(&mut self, keys: &[&str]) -> &mut Self {
        self.tag_keys.oneway = keys.iter().map(|k| k.to_string()).collect();
        self
    }

    /// Degraded speeds at or below this value become pushing sections.
    ///
    /// The threshold is a speed in km/h compared against
    /// `base speed * smoothness factor`, not a bound on the smoothness factor
    /// alone: a factor of 0.3 pushes a 10 km/h road under a 3.0 threshold but
    /// leaves an 18 km/h bridleway (5.4 km/h) rideable.
    pub fn pushing_threshold(&mut self, speed: f64) -> &mut Self {
        self.pushing_threshold = speed;
        self
    }

    pub fn prefer_priority(&mut self, priority: PriorityCode) -> &mut Self {
        self.prefer_priority = priority;
        self
    }

    pub fn avoid_priority(&mut self, priority: PriorityCode) -> &mut Self {
        self.avoid_priority = priority;
        self
    }

    pub fn block_private(&mut self, block: bool) -> &mut Self {
        self.block_private = block;
        self
    }

    pub fn block_fords(&mut self, block: bool) -> &mut Self {
        self.block_fords = block;
        self
    }

    pub fn respect_oneway(&mut self, respect: bool) -> &mut Self {
        self.respect_oneway = respect;
        self
    }

    /// Validate the tables and freeze them
    pub fn build(&self) -> Result<RuleTableStore> {
        for (highway, speed) in &self.highway_speeds {
            validate_speed(&format!("highway speed for '{highway}'"), *speed)?;
        }
        validate_speed("unknown highway speed", self.unknown_speed)?;

        let mut smoothness_factors = [1.0; Smoothness::COUNT];
        for (smoothness, factor) in &self.smoothness_factors {
            if *smoothness == Smoothness::Unset {
                return Err(Error::InvalidConfig(
                    "smoothness factor for unset smoothness is fixed at 1.0".to_string(),
                ));
            }
            if !factor.is_finite() || !(0.0..=1.0).contains(factor) {
                return Err(Error::InvalidConfig(format!(
                    "smoothness factor for {smoothness:?} must lie in [0, 1], got {factor}"
                )));
            }
            smoothness_factors[smoothness.index()] = *factor;
        }

        if !self.pushing_threshold.is_finite() || self.pushing_threshold < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "pushing threshold must be a non-negative speed, got {}",
                self.pushing_threshold
            )));
        }

        if self.prefer_priority <= PriorityCode::Unchanged {
            return Err(Error::InvalidConfig(format!(
                "prefer priority must be above unchanged, got {}",
                self.prefer_priority.name()
            )));
        }
        if self.avoid_priority >= PriorityCode::Unchanged
            || self.avoid_priority == PriorityCode::Exclude
        {
            return Err(Error::InvalidConfig(format!(
                "avoid priority must lie between exclude and unchanged, got {}",
                self.avoid_priority.name()
            )));
        }

        if self.tag_keys.restrictions.is_empty() {
            return Err(Error::InvalidConfig(
                "at least one restriction key is required".to_string(),
            ));
        }

        let mut conflicting: Vec<&String> = self.prefer.intersection(&self.avoid).collect();
        if !conflicting.is_empty() {
            conflicting.sort();
            warn!("highway classes both preferred and avoided, avoid wins: {conflicting:?}");
        }

        let mut restricted_values = self.restricted_values.clone();
        if self.block_private {
            restricted_values.insert("private".to_string());
        }

        Ok(RuleTableStore {
            highway_speeds: self.highway_speeds.clone(),
            unknown_speed: self.unknown_speed,
            prefer: self.prefer.clone(),
            avoid: self.avoid.clone(),
            smoothness_factors,
            blocked_barriers: self.blocked_barriers.clone(),
            intended_values: self.intended_values.clone(),
            restricted_values,
            tag_keys: self.tag_keys.clone(),
            pushing_threshold: self.pushing_threshold,
            prefer_priority: self.prefer_priority,
            avoid_priority: self.avoid_priority,
            block_fords: self.block_fords,
            respect_oneway: self.respect_oneway,
        })
    }
}

fn validate_speed(what: &str, speed: f64) -> Result<()> {
    if !speed.is_finite() || speed <= 0.0 {
        return Err(Error::InvalidConfig(format!(
            "{what} must be a positive speed, got {speed}"
        )));
    }
    if speed < PUSHING_SECTION_SPEED {
        return Err(Error::InvalidConfig(format!(
            "{what} ({speed}) is below the pushing section speed {PUSHING_SECTION_SPEED}"
        )));
    }
    Ok(())
}

/// Frozen per-profile rule tables
#[derive(Debug, Clone)]
pub struct RuleTableStore {
    highway_speeds: HashMap<String, f64>,
    unknown_speed: f64,
    prefer: HashSet<String>,
    avoid: HashSet<String>,
    smoothness_factors: [f64; Smoothness::COUNT],
    blocked_barriers: HashSet<String>,
    intended_values: HashSet<String>,
    restricted_values: HashSet<String>,
    tag_keys: TagKeys,
    pushing_threshold: f64,
    prefer_priority: PriorityCode,
    avoid_priority: PriorityCode,
    block_fords: bool,
    respect_oneway: bool,
}

impl RuleTableStore {
    /// Configured speed for a highway class, or the unknown fallback
    pub fn highway_speed(&self, highway: &str) -> f64 {
        self.configured_speed(highway).unwrap_or(self.unknown_speed)
    }

    /// Speed from the highway table only, `None` for unlisted classes
    pub fn configured_speed(&self, highway: &str) -> Option<f64> {
        self.highway_speeds.get(highway).copied()
    }

    pub fn unknown_speed(&self) -> f64 {
        self.unknown_speed
    }

    /// Highest speed any edge can resolve to
    pub fn max_speed(&self) -> f64 {
        self.highway_speeds
            .values()
            .copied()
            .fold(self.unknown_speed.max(PUSHING_SECTION_SPEED), f64::max)
    }

    pub fn smoothness_factor(&self, smoothness: Smoothness) -> f64 {
        self.smoothness_factors[smoothness.index()]
    }

    pub fn is_preferred(&self, highway: &str) -> bool {
        self.prefer.contains(highway)
    }

    pub fn is_avoided(&self, highway: &str) -> bool {
        self.avoid.contains(highway)
    }

    pub fn is_blocked_barrier(&self, barrier: &str) -> bool {
        self.blocked_barriers.contains(barrier)
    }

    pub fn is_intended(&self, access: &str) -> bool {
        self.intended_values.contains(access)
    }

    pub fn is_restricted(&self, access: &str) -> bool {
        self.restricted_values.contains(access)
    }

    pub fn tag_keys(&self) -> &TagKeys {
        &self.tag_keys
    }

    pub fn pushing_threshold(&self) -> f64 {
        self.pushing_threshold
    }

    pub fn prefer_priority(&self) -> PriorityCode {
        self.prefer_priority
    }

    pub fn avoid_priority(&self) -> PriorityCode {
        self.avoid_priority
    }

    pub fn block_fords(&self) -> bool {
        self.block_fords
    }

    pub fn respect_oneway(&self) -> bool {
        self.respect_oneway
    }
}
