//! Integration tests for butterfly-profile
//!
//! Exercise the public API end to end: tags in, encoded edge values out, for
//! the built-in horse profile and for profiles assembled from the builder.

use butterfly_profile::{
    EdgeLayout, EdgeValues, EncoderOptions, Error, PriorityCode, Profile, ProfileOptions,
    ProfileRegistry, RuleTableBuilder, Smoothness, KeyIndex, TagLookup, DEFAULT_UNKNOWN_SPEED,
    PUSHING_SECTION_SPEED,
};
use std::collections::HashMap;
use std::sync::Arc;

fn tags(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn horse() -> Arc<Profile> {
    ProfileRegistry::with_builtin(&ProfileOptions::default())
        .unwrap()
        .get("reiten")
        .unwrap()
}

#[test]
fn test_bridleway_scenario() {
    let profile = horse();
    let encoded = profile.process_way(&tags(&[("highway", "bridleway")])).unwrap();
    let values = profile.decode(encoded);

    assert_eq!(values.forward_speed, 18.0);
    assert_eq!(values.backward_speed, 18.0);
    assert_eq!(values.priority, PriorityCode::Prefer.factor());
    assert!(values.priority > PriorityCode::Unchanged.factor());
    assert!(!values.blocked);
}

#[test]
fn test_primary_very_horrible_scenario() {
    let profile = horse();
    let raw = tags(&[("highway", "primary"), ("smoothness", "VERY_HORRIBLE")]);
    let values = profile.resolve(&raw);
    assert_eq!(values.forward_speed, PUSHING_SECTION_SPEED);

    let decoded = profile.decode(profile.process_way(&raw).unwrap());
    assert_eq!(decoded.forward_speed, PUSHING_SECTION_SPEED);
}

#[test]
fn test_degraded_speed_above_threshold_is_kept() {
    let rules = RuleTableBuilder::new()
        .highway_speed("primary", 10.0)
        .smoothness_factor(Smoothness::VeryHorrible, 0.3)
        .pushing_threshold(2.0)
        .build()
        .unwrap();
    let profile = Profile::new("test", rules, EncoderOptions::default()).unwrap();
    let values = profile.resolve(&tags(&[("highway", "primary"), ("smoothness", "very_horrible")]));
    assert!((values.forward_speed - 3.0).abs() < 1e-9);
}

#[test]
fn test_stile_scenarios() {
    let profile = horse();

    let open = profile.resolve(&tags(&[
        ("highway", "track"),
        ("barrier", "stile"),
        ("access", "agricultural"),
    ]));
    assert!(!open.blocked);
    assert!(open.forward_speed > 0.0);

    let closed = profile.process_way(&tags(&[("highway", "track"), ("barrier", "stile")])).unwrap();
    assert!(closed.is_blocked());
    assert_eq!(profile.decode(closed), EdgeValues::blocked());
}

#[test]
fn test_blocked_barriers_for_every_non_intended_access() {
    let profile = horse();
    for barrier in ["kissing_gate", "stile", "turnstile", "fence"] {
        for access in [None, Some("no"), Some("destination"), Some("customers")] {
            let mut raw = tags(&[("highway", "track"), ("barrier", barrier)]);
            if let Some(access) = access {
                raw.insert("access".to_string(), access.to_string());
            }
            let values = profile.resolve(&raw);
            assert!(values.blocked, "{barrier} with {access:?} should block");
            assert_eq!(values.forward_speed, 0.0);
            assert_eq!(values.backward_speed, 0.0);
        }
        for intended in ["yes", "designated", "agricultural", "forestry"] {
            let values = profile.resolve(&tags(&[
                ("highway", "track"),
                ("barrier", barrier),
                ("horse", intended),
            ]));
            assert!(!values.blocked, "{barrier} with horse={intended} should pass");
        }
    }
}

#[test]
fn test_unknown_highway_uses_fallback() {
    let profile = horse();
    for highway in ["motorway", "escape", "", "made_up_value"] {
        let values = profile.resolve(&tags(&[("highway", highway)]));
        assert_eq!(values.forward_speed, DEFAULT_UNKNOWN_SPEED, "highway={highway:?}");
        assert!(values.forward_speed > 0.0);
    }
    let values = profile.resolve(&HashMap::<String, String>::new());
    assert_eq!(values.forward_speed, DEFAULT_UNKNOWN_SPEED);
}

#[test]
fn test_final_speed_never_exceeds_base() {
    let profile = horse();
    for highway in ["bridleway", "track", "primary", "footway", "unknown_class"] {
        let base = profile.rules().highway_speed(highway);
        for smoothness in Smoothness::all() {
            let values = profile.resolve(&tags(&[
                ("highway", highway),
                ("smoothness", smoothness.as_str()),
            ]));
            assert!(values.forward_speed <= base, "{highway} {smoothness:?}");

            let degraded = base * profile.rules().smoothness_factor(*smoothness);
            if degraded <= profile.rules().pushing_threshold() {
                assert_eq!(values.forward_speed, PUSHING_SECTION_SPEED);
            }
        }
    }
}

#[test]
fn test_avoid_wins_over_prefer() {
    let rules = RuleTableBuilder::new()
        .highway_speed("path", 8.0)
        .prefer_highway("path")
        .avoid_highway("path")
        .build()
        .unwrap();
    let profile = Profile::new("test", rules, EncoderOptions::default()).unwrap();
    let values = profile.resolve(&tags(&[("highway", "path")]));
    assert_eq!(values.priority, PriorityCode::Avoid.factor());
}

#[test]
fn test_oneway_for_horses() {
    let profile = horse();
    let values = profile.resolve(&tags(&[("highway", "track"), ("oneway:horse", "yes")]));
    assert_eq!(values.forward_speed, 10.0);
    assert_eq!(values.backward_speed, 0.0);

    let decoded = profile.decode(profile.encode(&values).unwrap());
    assert_eq!(decoded.forward_speed, 10.0);
    assert_eq!(decoded.backward_speed, 0.0);

    let values = profile.resolve(&tags(&[("highway", "track"), ("oneway", "-1")]));
    assert_eq!(values.forward_speed, 0.0);
    assert_eq!(values.backward_speed, 10.0);
}

#[test]
fn test_decode_within_one_step() {
    let layout = EdgeLayout::new(EncoderOptions {
        speed_two_directions: true,
        ..Default::default()
    })
    .unwrap();
    let step = layout.options().speed_factor;

    let mut speed = 0.0;
    while speed <= layout.max_speed() {
        for code in PriorityCode::all() {
            let values = EdgeValues::new(speed, layout.max_speed() - speed, code.factor());
            let decoded = layout.decode(layout.encode(&values).unwrap());
            assert!((decoded.forward_speed - values.forward_speed).abs() <= step);
            assert!((decoded.backward_speed - values.backward_speed).abs() <= step);
            assert!((decoded.priority - values.priority).abs() <= 0.1 + 1e-9);
            assert!(!decoded.blocked);
        }
        speed += 1.3;
    }
}

#[test]
fn test_overflow_is_an_error() {
    let profile = horse();
    let err = profile
        .encode(&EdgeValues::new(31.0, 31.0, 1.0))
        .unwrap_err();
    assert!(err.is_encoding());
    assert!(matches!(err, Error::EncodingOverflow { field: "forward speed", .. }));
}

#[test]
fn test_options_change_layout() {
    let options = ProfileOptions {
        encoder: EncoderOptions {
            speed_bits: 5,
            speed_two_directions: true,
            turn_costs: true,
            ..Default::default()
        },
        ..Default::default()
    };
    let registry = ProfileRegistry::with_builtin(&options).unwrap();
    let profile = registry.get("reiten").unwrap();
    let description = profile.describe();

    assert_eq!(description.max_speed, 62.0);
    assert_eq!(description.turn_cost_bits, 1);
    assert_eq!(description.total_bits, 3 + 5 + 5 + 4);
}

#[test]
fn test_invalid_bit_width_fails_at_construction() {
    for speed_bits in [0, 17] {
        let options = ProfileOptions {
            encoder: EncoderOptions {
                speed_bits,
                ..Default::default()
            },
            ..Default::default()
        };
        let err = ProfileRegistry::with_builtin(&options).unwrap_err();
        assert!(err.is_config(), "speed_bits={speed_bits}");
    }
}

#[test]
fn test_unknown_profile_error_message() {
    let registry = ProfileRegistry::with_builtin(&ProfileOptions::default()).unwrap();
    let err = registry.get("reitn").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Profile 'reitn' not found (did you mean 'reiten'?)"
    );
}

#[test]
fn test_parallel_encoding_matches_sequential() {
    let profile = horse();
    let highways = ["bridleway", "track", "primary", "footway", "residential"];
    let ways: Vec<HashMap<String, String>> = (0..2000)
        .map(|i| {
            let mut raw = tags(&[("highway", highways[i % highways.len()])]);
            if i % 7 == 0 {
                raw.insert("smoothness".to_string(), "horrible".to_string());
            }
            if i % 11 == 0 {
                raw.insert("barrier".to_string(), "stile".to_string());
            }
            raw
        })
        .collect();

    let parallel = profile.encode_ways(&ways);
    for (way, result) in ways.iter().zip(parallel) {
        assert_eq!(result.unwrap(), profile.process_way(way).unwrap());
    }
}

#[test]
fn test_dictionary_encoded_way() {
    let key_dict: HashMap<u32, String> = [(1, "highway"), (2, "smoothness"), (3, "horse")]
        .into_iter()
        .map(|(id, s)| (id, s.to_string()))
        .collect();
    let val_dict: HashMap<u32, String> = [(10, "bridleway"), (11, "horrible"), (12, "yes")]
        .into_iter()
        .map(|(id, s)| (id, s.to_string()))
        .collect();
    let key_index = KeyIndex::new(&key_dict);

    let keys = [1, 2, 3];
    let vals = [10, 11, 12];
    let lookup = TagLookup::new(&keys, &vals, &key_index, &val_dict);

    let profile = horse();
    let expected = tags(&[
        ("highway", "bridleway"),
        ("smoothness", "horrible"),
        ("horse", "yes"),
    ]);
    assert_eq!(
        profile.process_way(&lookup).unwrap(),
        profile.process_way(&expected).unwrap()
    );
}
