//! Bit-packed edge values
//!
//! Layout of an [`EncodedEdgeValue`], least significant bit first:
//!
//! ```text
//!   bit 0                      access forward
//!   bit 1                      access backward
//!   bit 2                      blocked
//!   bits 3..3+S                forward speed     (S = speed_bits, step = speed_factor)
//!   next S bits                backward speed    (only with speed_two_directions)
//!   next 4 bits                priority          (step 0.1)
//! ```
//!
//! With a single stored speed, the access bits decide which direction carries
//! it. Blocked edges carry only the blocked bit. Turn costs, when enabled, live
//! in a separate slot of [`EdgeLayout::turn_cost_bits`] bits.

use serde::{Deserialize, Serialize};

use super::error::{Error, Result};
use super::priority::{PRIORITY_BITS, PRIORITY_FACTOR};
use super::resolver::EdgeValues;

pub const ACCESS_FWD_BIT: u32 = 0;
pub const ACCESS_REV_BIT: u32 = 1;
pub const BLOCKED_BIT: u32 = 2;
pub const SPEED_SHIFT: u32 = 3;

/// Widest speed field a layout accepts
pub const MAX_SPEED_BITS: u32 = 16;

/// Highest turn cost when turn costs are enabled; the top value means restricted
pub const MAX_TURN_COSTS: u32 = 1;

const OVERFLOW_EPSILON: f64 = 1e-9;

/// Options that shape the encoded layout
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderOptions {
    pub speed_bits: u32,
    pub speed_factor: f64,
    pub turn_costs: bool,
    pub speed_two_directions: bool,
}

impl Default for EncoderOptions {
    fn default() -> Self {
        Self {
            speed_bits: 4,
            speed_factor: 2.0,
            turn_costs: false,
            speed_two_directions: false,
        }
    }
}

/// Fixed-width packed value stored on one edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncodedEdgeValue(u64);

impl EncodedEdgeValue {
    pub fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    pub fn bits(self) -> u64 {
        self.0
    }

    pub fn is_blocked(self) -> bool {
        self.0 & (1 << BLOCKED_BIT) != 0
    }
}

/// Turn cost stored in the turn-cost slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnCost {
    Cost(u32),
    Restricted,
}

/// One field of a layout description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescription {
    pub name: String,
    pub offset: u32,
    pub width: u32,
    pub step: Option<f64>,
}

/// Documented layout of a profile's encoded edge values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutDescription {
    pub total_bits: u32,
    pub max_speed: f64,
    pub max_priority: f64,
    pub fields: Vec<FieldDescription>,
    pub turn_cost_bits: u32,
}

/// Validated field offsets for one set of [`EncoderOptions`]
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeLayout {
    options: EncoderOptions,
    speed_mask: u64,
    backward_speed_shift: Option<u32>,
    priority_shift: u32,
}

impl EdgeLayout {
    pub fn new(options: EncoderOptions) -> Result<Self> {
        if options.speed_bits == 0 || options.speed_bits > MAX_SPEED_BITS {
            return Err(Error::InvalidConfig(format!(
                "speed_bits must lie in 1..={MAX_SPEED_BITS}, got {}",
                options.speed_bits
            )));
        }
        if !options.speed_factor.is_finite() || options.speed_factor <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "speed_factor must be a positive number, got {}",
                options.speed_factor
            )));
        }

        let mut next = SPEED_SHIFT + options.speed_bits;
        let backward_speed_shift = if options.speed_two_directions {
            let shift = next;
            next += options.speed_bits;
            Some(shift)
        } else {
            None
        };

        Ok(Self {
            options,
            speed_mask: (1u64 << options.speed_bits) - 1,
            backward_speed_shift,
            priority_shift: next,
        })
    }

    pub fn options(&self) -> &EncoderOptions {
        &self.options
    }

    /// Number of bits an encoded value occupies
    pub fn total_bits(&self) -> u32 {
        self.priority_shift + PRIORITY_BITS
    }

    /// Largest speed the speed field can hold
    pub fn max_speed(&self) -> f64 {
        self.speed_mask as f64 * self.options.speed_factor
    }

    pub fn max_priority(&self) -> f64 {
        priority_mask() as f64 * PRIORITY_FACTOR
    }

    pub fn encode(&self, values: &EdgeValues) -> Result<EncodedEdgeValue> {
        if values.blocked {
            return Ok(EncodedEdgeValue(1 << BLOCKED_BIT));
        }

        let step = self.options.speed_factor;
        let forward = quantize("forward speed", values.forward_speed, step, self.speed_mask)?;
        let backward = quantize("backward speed", values.backward_speed, step, self.speed_mask)?;
        let priority = quantize("priority", values.priority, PRIORITY_FACTOR, priority_mask())?;

        let mut bits = 0u64;
        if forward > 0 {
            bits |= 1 << ACCESS_FWD_BIT;
        }
        if backward > 0 {
            bits |= 1 << ACCESS_REV_BIT;
        }

        match self.backward_speed_shift {
            Some(shift) => {
                bits |= forward << SPEED_SHIFT;
                bits |= backward << shift;
            }
            None => {
                if forward > 0 && backward > 0 && forward != backward {
                    return Err(Error::DirectionalSpeedMismatch {
                        forward: values.forward_speed,
                        backward: values.backward_speed,
                    });
                }
                bits |= forward.max(backward) << SPEED_SHIFT;
            }
        }

        bits |= priority << self.priority_shift;
        Ok(EncodedEdgeValue(bits))
    }

    pub fn decode(&self, value: EncodedEdgeValue) -> EdgeValues {
        if value.is_blocked() {
            return EdgeValues::blocked();
        }

        let bits = value.bits();
        let step = self.options.speed_factor;
        let access_fwd = bits & (1 << ACCESS_FWD_BIT) != 0;
        let access_rev = bits & (1 << ACCESS_REV_BIT) != 0;

        let forward_raw = (bits >> SPEED_SHIFT) & self.speed_mask;
        let backward_raw = match self.backward_speed_shift {
            Some(shift) => (bits >> shift) & self.speed_mask,
            None => forward_raw,
        };
        let priority_raw = (bits >> self.priority_shift) & priority_mask();

        EdgeValues::new(
            if access_fwd { forward_raw as f64 * step } else { 0.0 },
            if access_rev { backward_raw as f64 * step } else { 0.0 },
            priority_raw as f64 * PRIORITY_FACTOR,
        )
    }

    /// Width of the turn-cost slot, zero when turn costs are disabled
    pub fn turn_cost_bits(&self) -> u32 {
        if self.options.turn_costs {
            u32::BITS - MAX_TURN_COSTS.leading_zeros()
        } else {
            0
        }
    }

    pub fn encode_turn_cost(&self, cost: TurnCost) -> Result<u32> {
        if !self.options.turn_costs {
            return Err(Error::InvalidConfig(
                "turn costs are not enabled for this profile".to_string(),
            ));
        }
        match cost {
            TurnCost::Restricted => Ok(MAX_TURN_COSTS),
            TurnCost::Cost(c) if c < MAX_TURN_COSTS => Ok(c),
            TurnCost::Cost(c) => Err(Error::EncodingOverflow {
                field: "turn cost",
                value: c as f64,
                max: (MAX_TURN_COSTS - 1) as f64,
            }),
        }
    }

    pub fn decode_turn_cost(&self, raw: u32) -> TurnCost {
        if raw >= MAX_TURN_COSTS {
            TurnCost::Restricted
        } else {
            TurnCost::Cost(raw)
        }
    }

    pub fn describe(&self) -> LayoutDescription {
        let field = |name: &str, offset: u32, width: u32, step: Option<f64>| FieldDescription {
            name: name.to_string(),
            offset,
            width,
            step,
        };
        let speed_step = Some(self.options.speed_factor);

        let mut fields = vec![
            field("access_forward", ACCESS_FWD_BIT, 1, None),
            field("access_backward", ACCESS_REV_BIT, 1, None),
            field("blocked", BLOCKED_BIT, 1, None),
            field("forward_speed", SPEED_SHIFT, self.options.speed_bits, speed_step),
        ];
        if let Some(shift) = self.backward_speed_shift {
            fields.push(field("backward_speed", shift, self.options.speed_bits, speed_step));
        }
        fields.push(field(
            "priority",
            self.priority_shift,
            PRIORITY_BITS,
            Some(PRIORITY_FACTOR),
        ));

        LayoutDescription {
            total_bits: self.total_bits(),
            max_speed: self.max_speed(),
            max_priority: self.max_priority(),
            fields,
            turn_cost_bits: self.turn_cost_bits(),
        }
    }
}

fn priority_mask() -> u64 {
    (1u64 << PRIORITY_BITS) - 1
}

/// Round to the nearest step. Non-zero values never round down to zero.
fn quantize(field: &'static str, value: f64, step: f64, max_raw: u64) -> Result<u64> {
    if !value.is_finite() || value < 0.0 {
        return Err(Error::InvalidValue { field, value });
    }
    let max = max_raw as f64 * step;
    if value > max + OVERFLOW_EPSILON {
        return Err(Error::EncodingOverflow { field, value, max });
    }

    let raw = ((value / step).round() as u64).min(max_raw);
    if raw == 0 && value > 0.0 {
        Ok(1)
    } else {
        Ok(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::priority::PriorityCode;

    fn layout(speed_two_directions: bool) -> EdgeLayout {
        EdgeLayout::new(EncoderOptions {
            speed_two_directions,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_default_layout_width() {
        let layout = layout(false);
        assert_eq!(layout.total_bits(), 3 + 4 + 4);
        assert_eq!(layout.max_speed(), 30.0);
        assert!((layout.max_priority() - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_two_direction_layout_width() {
        let layout = layout(true);
        assert_eq!(layout.total_bits(), 3 + 4 + 4 + 4);
    }

    #[test]
    fn test_rejects_invalid_options() {
        let bad_bits = EncoderOptions {
            speed_bits: 0,
            ..Default::default()
        };
        assert!(EdgeLayout::new(bad_bits).unwrap_err().is_config());

        let wide = EncoderOptions {
            speed_bits: 17,
            ..Default::default()
        };
        assert!(EdgeLayout::new(wide).is_err());

        let bad_factor = EncoderOptions {
            speed_factor: 0.0,
            ..Default::default()
        };
        assert!(EdgeLayout::new(bad_factor).is_err());
    }

    #[test]
    fn test_round_trip_single_speed() {
        let layout = layout(false);
        let values = EdgeValues::new(18.0, 18.0, PriorityCode::Prefer.factor());
        let decoded = layout.decode(layout.encode(&values).unwrap());
        assert_eq!(decoded, values);
    }

    #[test]
    fn test_round_trip_oneway_single_speed() {
        let layout = layout(false);
        let values = EdgeValues::new(10.0, 0.0, PriorityCode::Avoid.factor());
        let encoded = layout.encode(&values).unwrap();
        assert_eq!(encoded.bits() & 0b11, 0b01);
        assert_eq!(layout.decode(encoded), values);
    }

    #[test]
    fn test_round_trip_two_directions() {
        let layout = layout(true);
        let values = EdgeValues::new(18.0, 6.0, PriorityCode::Unchanged.factor());
        assert_eq!(layout.decode(layout.encode(&values).unwrap()), values);
    }

    #[test]
    fn test_quantization_within_one_step() {
        let layout = layout(false);
        let values = EdgeValues::new(16.2, 16.2, 1.0);
        let decoded = layout.decode(layout.encode(&values).unwrap());
        assert!((decoded.forward_speed - 16.2).abs() <= 2.0);
        assert_eq!(decoded.forward_speed, 16.0);
    }

    #[test]
    fn test_small_speed_keeps_access() {
        let layout = layout(false);
        let decoded = layout.decode(layout.encode(&EdgeValues::new(0.5, 0.5, 1.0)).unwrap());
        assert_eq!(decoded.forward_speed, 2.0);
    }

    #[test]
    fn test_overflow_is_reported() {
        let layout = layout(false);
        let err = layout
            .encode(&EdgeValues::new(32.0, 32.0, 1.0))
            .unwrap_err();
        assert_eq!(
            err,
            Error::EncodingOverflow {
                field: "forward speed",
                value: 32.0,
                max: 30.0
            }
        );

        let err = layout.encode(&EdgeValues::new(10.0, 10.0, 1.6)).unwrap_err();
        assert!(matches!(err, Error::EncodingOverflow { field: "priority", .. }));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let layout = layout(false);
        assert!(matches!(
            layout.encode(&EdgeValues::new(-2.0, 0.0, 1.0)),
            Err(Error::InvalidValue { .. })
        ));
        assert!(matches!(
            layout.encode(&EdgeValues::new(f64::NAN, 0.0, 1.0)),
            Err(Error::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_directional_mismatch_without_two_directions() {
        let layout = layout(false);
        let err = layout.encode(&EdgeValues::new(18.0, 6.0, 1.0)).unwrap_err();
        assert!(matches!(err, Error::DirectionalSpeedMismatch { .. }));
    }

    #[test]
    fn test_blocked_encoding() {
        let layout = layout(false);
        let encoded = layout.encode(&EdgeValues::blocked()).unwrap();
        assert_eq!(encoded.bits(), 1 << BLOCKED_BIT);
        assert!(encoded.is_blocked());

        let decoded = layout.decode(encoded);
        assert!(decoded.blocked);
        assert_eq!(decoded.forward_speed, 0.0);
        assert_eq!(decoded.backward_speed, 0.0);
    }

    #[test]
    fn test_blocked_flag_ignores_speeds() {
        let layout = layout(false);
        let mut values = EdgeValues::new(99.0, 99.0, 9.0);
        values.blocked = true;
        assert_eq!(layout.encode(&values).unwrap().bits(), 1 << BLOCKED_BIT);
    }

    #[test]
    fn test_turn_costs() {
        assert_eq!(layout(false).turn_cost_bits(), 0);
        assert!(layout(false).encode_turn_cost(TurnCost::Restricted).is_err());

        let layout = EdgeLayout::new(EncoderOptions {
            turn_costs: true,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(layout.turn_cost_bits(), 1);
        assert_eq!(layout.encode_turn_cost(TurnCost::Restricted).unwrap(), 1);
        assert_eq!(layout.encode_turn_cost(TurnCost::Cost(0)).unwrap(), 0);
        assert!(layout.encode_turn_cost(TurnCost::Cost(5)).is_err());
        assert_eq!(layout.decode_turn_cost(1), TurnCost::Restricted);
        assert_eq!(layout.decode_turn_cost(0), TurnCost::Cost(0));
    }

    #[test]
    fn test_describe_lists_fields_in_order() {
        let description = layout(true).describe();
        let names: Vec<&str> = description.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "access_forward",
                "access_backward",
                "blocked",
                "forward_speed",
                "backward_speed",
                "priority"
            ]
        );
        assert_eq!(description.fields[4].offset, 7);
        assert_eq!(description.fields[5].offset, 11);
        assert_eq!(description.total_bits, 15);
    }

    #[test]
    fn test_exhaustive_round_trip_small_layout() {
        let layout = EdgeLayout::new(EncoderOptions {
            speed_bits: 3,
            speed_factor: 5.0,
            turn_costs: false,
            speed_two_directions: true,
        })
        .unwrap();
        for f in 0..8u64 {
            for b in 0..8u64 {
                let values = EdgeValues::new(f as f64 * 5.0, b as f64 * 5.0, 1.2);
                let decoded = layout.decode(layout.encode(&values).unwrap());
                assert_eq!(decoded.forward_speed, values.forward_speed);
                assert_eq!(decoded.backward_speed, values.backward_speed);
                assert!((decoded.priority - 1.2).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_decode_stored_bits() {
        let layout = layout(true);
        let values = EdgeValues::new(8.0, 8.0, PriorityCode::Unchanged.factor());
        let raw: u64 = layout.encode(&values).unwrap().bits();

        let stored = EncodedEdgeValue::from_bits(raw);
        assert!(!stored.is_blocked());
        assert_eq!(layout.decode(stored), values);

        let blocked = EncodedEdgeValue::from_bits(1 << BLOCKED_BIT);
        assert!(blocked.is_blocked());
        assert_eq!(layout.decode(blocked), EdgeValues::blocked());
    }

    #[test]
    fn test_describe_reports_max_priority() {
        let description = layout(false).describe();
        assert!((description.max_priority - 1.5).abs() < 1e-9);
    }
}
