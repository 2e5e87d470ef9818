//! JSON-lines records read and written by `butterfly-profile encode`

use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use butterfly_profile::{EdgeValues, Profile};

/// One input way: `{"id": 42, "tags": {"highway": "track"}}`
#[derive(Debug, Clone, Deserialize)]
pub struct WayRecord {
    #[serde(default)]
    pub id: Option<i64>,
    pub tags: HashMap<String, String>,
}

/// One output line: raw encoded value plus its decoded fields
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EncodedRecord {
    pub id: Option<i64>,
    pub encoded: u64,
    #[serde(flatten)]
    pub values: EdgeValues,
}

/// Totals reported at the end of a run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EncodeStats {
    pub ways: u64,
    pub blocked: u64,
}

impl EncodeStats {
    pub fn record(&mut self, records: &[EncodedRecord]) {
        self.ways += records.len() as u64;
        self.blocked += records.iter().filter(|r| r.values.blocked).count() as u64;
    }
}

pub fn parse_line(line: &str, line_no: usize) -> Result<WayRecord> {
    serde_json::from_str(line).with_context(|| format!("Invalid way record on line {line_no}"))
}

/// Parse a `key=value` profile option
pub fn parse_option(s: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{s}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing option name in '{s}'"));
    }
    Ok((key.to_string(), value.trim().to_string()))
}

/// Encode a batch in parallel; the first failing way aborts the batch
pub fn encode_batch(profile: &Profile, batch: &[WayRecord]) -> Result<Vec<EncodedRecord>> {
    batch
        .par_iter()
        .map(|way| {
            let encoded = profile.process_way(&way.tags).with_context(|| match way.id {
                Some(id) => format!("Failed to encode way {id}"),
                None => "Failed to encode way without id".to_string(),
            })?;
            Ok(EncodedRecord {
                id: way.id,
                encoded: encoded.bits(),
                values: profile.decode(encoded),
            })
        })
        .collect()
}
