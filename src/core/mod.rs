//! Core encoding engine for butterfly-profile
//!
//! Leaves first: tag attributes, rule tables, the precedence resolver and
//! the bit-packed layout. A [`Profile`] ties one rule table to one layout.

pub mod error;
pub mod layout;
pub mod priority;
pub mod profile;
pub mod resolver;
pub mod rules;
pub mod tag_lookup;
pub mod tags;

pub use error::{Error, Result};
pub use layout::{EdgeLayout, EncodedEdgeValue, EncoderOptions, LayoutDescription, TurnCost};
pub use priority::PriorityCode;
pub use profile::{Profile, ProfileOptions};
pub use resolver::{resolve, EdgeValues};
pub use rules::{RuleTableBuilder, RuleTableStore, DEFAULT_UNKNOWN_SPEED, PUSHING_SECTION_SPEED};
pub use tag_lookup::{KeyIndex, TagLookup};
pub use tags::{Oneway, Smoothness, TagAttributeSet, TagKeys, TagSource};
