//! Horse riding profile ("reiten")
//!
//! Pure configuration: speeds, preferences and access tweaks for riders,
//! layered on top of the shared base rules.

use crate::core::{
    PriorityCode, Profile, ProfileOptions, Result, RuleTableBuilder, RuleTableStore, Smoothness,
};

pub const NAME: &str = "reiten";

/// Rule tables for horse riding
pub fn rules(options: &ProfileOptions) -> Result<RuleTableStore> {
    let mut rules = RuleTableBuilder::new();

    rules
        .restriction_keys(&["horse", "access"])
        .oneway_keys(&["oneway:horse", "oneway"])
        .block_private(options.block_private)
        .block_fords(options.block_fords)
        .prefer_priority(PriorityCode::Prefer)
        .avoid_priority(PriorityCode::Avoid);

    for highway in [
        "trunk",
        "trunk_link",
        "primary",
        "primary_link",
        "secondary",
        "secondary_link",
        // Brandenburg riding rules keep horses off these
        "cycleway",
        "pedestrian",
        "footway",
    ] {
        rules.avoid_highway(highway);
    }

    for highway in [
        "bridleway",
        "path",
        "track",
        "service",
        "tertiary",
        "tertiary_link",
        "residential",
        "unclassified",
    ] {
        rules.prefer_highway(highway);
    }

    // Impassable only stops motor vehicles; horses still get through slowly
    rules
        .smoothness_factor(Smoothness::Excellent, 1.0)
        .smoothness_factor(Smoothness::Good, 1.0)
        .smoothness_factor(Smoothness::Intermediate, 1.0)
        .smoothness_factor(Smoothness::Bad, 0.9)
        .smoothness_factor(Smoothness::VeryBad, 0.7)
        .smoothness_factor(Smoothness::Horrible, 0.5)
        .smoothness_factor(Smoothness::VeryHorrible, 0.3)
        .smoothness_factor(Smoothness::Impassable, 0.1)
        .pushing_threshold(3.0);

    rules
        .block_barrier("kissing_gate")
        .block_barrier("stile")
        .block_barrier("turnstile");

    rules.intended_value("agricultural").intended_value("forestry");

    rules
        .highway_speed("bridleway", 18.0)
        .highway_speed("footway", 6.0)
        .highway_speed("platform", 6.0)
        .highway_speed("pedestrian", 6.0);
    for highway in [
        "track",
        "service",
        "residential",
        "unclassified",
        "road",
        "trunk",
        "trunk_link",
        "primary",
        "primary_link",
        "secondary",
        "secondary_link",
        "tertiary",
        "tertiary_link",
    ] {
        rules.highway_speed(highway, 10.0);
    }

    rules.build()
}

/// Build the horse riding profile with the given options
pub fn profile(options: &ProfileOptions) -> Result<Profile> {
    Profile::new(NAME, rules(options)?, options.encoder)
}
