//! # Butterfly-profile Library
//!
//! Rule-composed encoding of OpenStreetMap ways for routing profiles. A way's
//! tags are normalized into a small attribute set, resolved against a
//! profile's rule tables into directional speeds and a priority, and packed
//! into a fixed-width value stored on the graph edge.
//!
//! ## Features
//!
//! - **Declarative profiles**: one generic engine, one immutable rule table per travel mode
//! - **Fixed precedence**: blocking, base speed, smoothness, prefer/avoid, oneway
//! - **Documented bit layout**: configurable speed width and step, optional per-direction speeds
//! - **Parallel encoding**: profiles are shareable and edges encode independently
//!
//! ## Basic Usage
//!
//! ```rust
//! use std::collections::HashMap;
//! use butterfly_profile::{ProfileOptions, ProfileRegistry};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = ProfileRegistry::with_builtin(&ProfileOptions::default())?;
//! let profile = registry.get("reiten")?;
//!
//! let mut tags = HashMap::new();
//! tags.insert("highway".to_string(), "bridleway".to_string());
//!
//! let encoded = profile.process_way(&tags)?;
//! let values = profile.decode(encoded);
//! assert_eq!(values.forward_speed, 18.0);
//! # Ok(())
//! # }
//! ```
//!
//! ## Custom Profiles
//!
//! ```rust
//! use butterfly_profile::{EncoderOptions, Profile, RuleTableBuilder, Smoothness};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let rules = RuleTableBuilder::new()
//!     .highway_speed("path", 6.0)
//!     .prefer_highway("path")
//!     .smoothness_factor(Smoothness::Horrible, 0.5)
//!     .build()?;
//! let profile = Profile::new("wandern", rules, EncoderOptions::default())?;
//! assert_eq!(profile.name(), "wandern");
//! # Ok(())
//! # }
//! ```

// Re-export core types that users might need
pub use crate::core::{
    resolve, EdgeLayout, EdgeValues, EncodedEdgeValue, EncoderOptions, Error, KeyIndex,
    LayoutDescription, Oneway, PriorityCode, Profile, ProfileOptions, Result, RuleTableBuilder,
    RuleTableStore, Smoothness, TagAttributeSet, TagKeys, TagLookup, TagSource, TurnCost,
    DEFAULT_UNKNOWN_SPEED, PUSHING_SECTION_SPEED,
};
pub use crate::profiles::ProfileRegistry;

pub mod core;
pub mod profiles;
