//! Precedence resolver
//!
//! Turns a [`TagAttributeSet`] into directional speeds and a priority by
//! running a fixed sequence of stages against a [`RuleTableStore`]:
//!
//! 1. blocking (barriers, restricted access, fords), terminal
//! 2. base speed from the highway table, or the unknown fallback
//! 3. smoothness degradation, clamped to the pushing speed below threshold
//! 4. prefer/avoid priority, where avoid always wins
//! 5. oneway, zeroing the speed of the forbidden direction
//!
//! Later stages only narrow or override earlier results.

use log::trace;
use serde::{Deserialize, Serialize};

use super::priority::PriorityCode;
use super::rules::{RuleTableStore, PUSHING_SECTION_SPEED};
use super::tags::{Oneway, TagAttributeSet};

/// Directional speeds (km/h) and priority multiplier of one edge
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeValues {
    pub forward_speed: f64,
    pub backward_speed: f64,
    pub priority: f64,
    pub blocked: bool,
}

impl EdgeValues {
    pub fn new(forward_speed: f64, backward_speed: f64, priority: f64) -> Self {
        Self {
            forward_speed,
            backward_speed,
            priority,
            blocked: false,
        }
    }

    /// An edge excluded from routing in both directions
    pub fn blocked() -> Self {
        Self {
            forward_speed: 0.0,
            backward_speed: 0.0,
            priority: PriorityCode::Exclude.factor(),
            blocked: true,
        }
    }
}

/// Why an edge was excluded in stage 1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockReason {
    Barrier,
    RestrictedAccess,
    Ford,
}

/// Resolve the final edge values for one attribute set
pub fn resolve(attrs: &TagAttributeSet, rules: &RuleTableStore) -> EdgeValues {
    if let Some(reason) = block_reason(attrs, rules) {
        trace!(
            "edge blocked ({reason:?}): highway={} barrier={:?} access={:?}",
            attrs.highway_class(),
            attrs.barrier(),
            attrs.access_value()
        );
        return EdgeValues::blocked();
    }

    let base_speed = rules.highway_speed(attrs.highway_class());
    let (speed, pushing) = degrade(base_speed, attrs, rules);

    let mut priority = highway_priority(attrs.highway_class(), rules);
    if pushing {
        priority = priority.min(PriorityCode::SlightAvoid);
    }

    let (forward_speed, backward_speed) = if rules.respect_oneway() {
        match attrs.oneway() {
            Oneway::None => (speed, speed),
            Oneway::Forward => (speed, 0.0),
            Oneway::Backward => (0.0, speed),
        }
    } else {
        (speed, speed)
    };

    EdgeValues::new(forward_speed, backward_speed, priority.factor())
}

/// Stage 1. An intended access value overrides every blocking source.
pub fn block_reason(attrs: &TagAttributeSet, rules: &RuleTableStore) -> Option<BlockReason> {
    let access = attrs.access_value();
    if access.is_some_and(|a| rules.is_intended(a)) {
        return None;
    }

    if attrs.barrier().is_some_and(|b| rules.is_blocked_barrier(b)) {
        return Some(BlockReason::Barrier);
    }
    if access.is_some_and(|a| rules.is_restricted(a)) {
        return Some(BlockReason::RestrictedAccess);
    }
    if attrs.ford() && rules.block_fords() {
        return Some(BlockReason::Ford);
    }
    None
}

/// Stage 3. Returns the degraded speed and whether it became a pushing section.
fn degrade(base_speed: f64, attrs: &TagAttributeSet, rules: &RuleTableStore) -> (f64, bool) {
    let degraded = base_speed * rules.smoothness_factor(attrs.smoothness());
    if degraded <= rules.pushing_threshold() {
        (PUSHING_SECTION_SPEED, true)
    } else {
        (degraded, false)
    }
}

/// Stage 4
fn highway_priority(highway: &str, rules: &RuleTableStore) -> PriorityCode {
    if rules.is_avoided(highway) {
        rules.avoid_priority()
    } else if rules.is_preferred(highway) {
        rules.prefer_priority()
    } else {
        PriorityCode::Unchanged
    }
}
