//! Sensor profiles
//!
//! Each sensor/collection is a static table mapping a [`Condition`] to the
//! bit group that encodes it, optionally restricted to a set of accepted
//! values. Profiles are immutable and shared by every decode call.
//!
//! | Sensor                 | Condition      | Offset | Width | Accepted |
//! |------------------------|----------------|--------|-------|----------|
//! | Landsat 8 collection 1 | fill           | 0      | 1     |          |
//! |                        | cloud_indicator| 4      | 1     |          |
//! |                        | cloud          | 5      | 2     |          |
//! |                        | cloud_shadow   | 7      | 2     |          |
//! |                        | snow           | 9      | 2     |          |
//! |                        | cirrus         | 11     | 2     |          |
//! | Landsat 8 collection 0 | water          | 4      | 2     | 0, 2     |
//! |                        | vegetation     | 8      | 2     |          |
//! |                        | snow           | 10     | 2     | 0, 3     |
//! |                        | cirrus         | 12     | 2     |          |
//! |                        | cloud          | 14     | 2     |          |
//! | MODIS                  | quality        | 0      | 2     |          |

use std::fmt;
use std::str::FromStr;

use super::bitfield::{BitField, BitLayout};
use super::condition::ConditionLevel;
use qamask_core::{Error, Result};

/// A named attribute encoded in a QA band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Condition {
    /// Designated fill pixel
    Fill,
    /// Single "cloud" bit set by the cloud detection algorithm
    CloudIndicator,
    Cloud,
    CloudShadow,
    Cirrus,
    Snow,
    Water,
    Vegetation,
    /// MODIS per-pixel data quality
    Quality,
}

impl Condition {
    pub const ALL: [Condition; 9] = [
        Condition::Fill,
        Condition::CloudIndicator,
        Condition::Cloud,
        Condition::CloudShadow,
        Condition::Cirrus,
        Condition::Snow,
        Condition::Water,
        Condition::Vegetation,
        Condition::Quality,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Condition::Fill => "fill",
            Condition::CloudIndicator => "cloud_indicator",
            Condition::Cloud => "cloud",
            Condition::CloudShadow => "cloud_shadow",
            Condition::Cirrus => "cirrus",
            Condition::Snow => "snow",
            Condition::Water => "water",
            Condition::Vegetation => "vegetation",
            Condition::Quality => "quality",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Condition {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().to_ascii_lowercase();
        Condition::ALL
            .into_iter()
            .find(|c| c.name() == key)
            .ok_or_else(|| Error::UnsupportedCondition {
                condition: s.to_string(),
                sensor: "any sensor".to_string(),
            })
    }
}

/// Landsat QA band encoding generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// Pre-collection encoding ("collection 0")
    PreCollection,
    Collection1,
}

impl Collection {
    pub fn from_number(number: u8) -> Result<Self> {
        match number {
            0 => Ok(Collection::PreCollection),
            1 => Ok(Collection::Collection1),
            n => Err(Error::UnsupportedSensor(format!(
                "Landsat collection {} (expected 0 or 1)",
                n
            ))),
        }
    }

    pub fn number(self) -> u8 {
        match self {
            Collection::PreCollection => 0,
            Collection::Collection1 => 1,
        }
    }
}

/// Sensor and encoding generation of a QA band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sensor {
    Landsat8(Collection),
    Modis,
}

impl Default for Sensor {
    fn default() -> Self {
        Sensor::Landsat8(Collection::Collection1)
    }
}

impl Sensor {
    /// Resolve a sensor from its identifier (`"landsat"` or `"modis"`).
    ///
    /// Landsat requires a collection number; MODIS ignores it.
    pub fn from_identifier(source: &str, collection: Option<u8>) -> Result<Self> {
        match source.trim().to_ascii_lowercase().as_str() {
            "landsat" | "landsat8" => match collection {
                Some(n) => Ok(Sensor::Landsat8(Collection::from_number(n)?)),
                None => Err(Error::UnsupportedSensor(
                    "Landsat requires a collection number".to_string(),
                )),
            },
            "modis" => Ok(Sensor::Modis),
            other => Err(Error::UnsupportedSensor(other.to_string())),
        }
    }

    /// Static bit table for this sensor
    pub fn profile(self) -> &'static SensorProfile {
        match self {
            Sensor::Landsat8(Collection::Collection1) => &LANDSAT8_COLLECTION1,
            Sensor::Landsat8(Collection::PreCollection) => &LANDSAT8_PRE_COLLECTION,
            Sensor::Modis => &MODIS,
        }
    }
}

impl fmt::Display for Sensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sensor::Landsat8(c) => write!(f, "Landsat 8 collection {}", c.number()),
            Sensor::Modis => write!(f, "MODIS"),
        }
    }
}

/// Bit group of one condition plus the values it may be matched against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConditionSpec {
    pub condition: Condition,
    pub layout: BitLayout,
    /// `None` accepts every value that fits the field
    pub accepted: Option<&'static [u8]>,
}

impl ConditionSpec {
    /// One-bit flag
    pub const fn flag(condition: Condition, offset: u32) -> Self {
        Self::field(condition, offset, 1)
    }

    /// Two-bit confidence scale
    pub const fn confidence(condition: Condition, offset: u32) -> Self {
        Self::field(condition, offset, 2)
    }

    /// Two-bit field that only accepts some values
    pub const fn restricted(condition: Condition, offset: u32, accepted: &'static [u8]) -> Self {
        Self {
            condition,
            layout: BitLayout::new(offset, 2),
            accepted: Some(accepted),
        }
    }

    pub const fn field(condition: Condition, offset: u32, width: u32) -> Self {
        Self {
            condition,
            layout: BitLayout::new(offset, width),
            accepted: None,
        }
    }

    /// Whether `value` is legal for this condition
    pub fn accepts(&self, value: u8) -> bool {
        match self.accepted {
            Some(values) => values.contains(&value),
            None => u64::from(value) <= self.layout.max_value(),
        }
    }

    /// Human readable list of legal values
    pub fn accepted_values(&self) -> String {
        let values: Vec<String> = match self.accepted {
            Some(values) => values.iter().map(|v| v.to_string()).collect(),
            None => (0..=self.layout.max_value()).map(|v| v.to_string()).collect(),
        };
        values.join(", ")
    }
}

/// Bit table of one sensor/collection
#[derive(Debug)]
pub struct SensorProfile {
    sensor: Sensor,
    conditions: &'static [ConditionSpec],
}

static LANDSAT8_COLLECTION1: SensorProfile = SensorProfile {
    sensor: Sensor::Landsat8(Collection::Collection1),
    conditions: &[
        ConditionSpec::flag(Condition::Fill, 0),
        ConditionSpec::flag(Condition::CloudIndicator, 4),
        ConditionSpec::confidence(Condition::Cloud, 5),
        ConditionSpec::confidence(Condition::CloudShadow, 7),
        ConditionSpec::confidence(Condition::Snow, 9),
        ConditionSpec::confidence(Condition::Cirrus, 11),
    ],
};

// Water and snow only accept a subset of the confidence scale in the
// pre-collection encoding.
static LANDSAT8_PRE_COLLECTION: SensorProfile = SensorProfile {
    sensor: Sensor::Landsat8(Collection::PreCollection),
    conditions: &[
        ConditionSpec::restricted(Condition::Water, 4, &[0, 2]),
        ConditionSpec::confidence(Condition::Vegetation, 8),
        ConditionSpec::restricted(Condition::Snow, 10, &[0, 3]),
        ConditionSpec::confidence(Condition::Cirrus, 12),
        ConditionSpec::confidence(Condition::Cloud, 14),
    ],
};

static MODIS: SensorProfile = SensorProfile {
    sensor: Sensor::Modis,
    conditions: &[ConditionSpec::field(Condition::Quality, 0, 2)],
};

impl SensorProfile {
    pub fn sensor(&self) -> Sensor {
        self.sensor
    }

    pub fn conditions(&self) -> &'static [ConditionSpec] {
        self.conditions
    }

    pub fn supports(&self, condition: Condition) -> bool {
        self.conditions.iter().any(|s| s.condition == condition)
    }

    /// Table entry for `condition`
    pub fn spec(&self, condition: Condition) -> Result<&'static ConditionSpec> {
        self.conditions
            .iter()
            .find(|s| s.condition == condition)
            .ok_or_else(|| Error::UnsupportedCondition {
                condition: condition.name().to_string(),
                sensor: self.sensor.to_string(),
            })
    }

    pub fn layout(&self, condition: Condition) -> Result<BitLayout> {
        Ok(self.spec(condition)?.layout)
    }

    /// Turn a requested level into the bit field to decode.
    ///
    /// `NotRequested` resolves to `Ok(None)` without consulting the table.
    pub fn resolve(&self, condition: Condition, level: ConditionLevel) -> Result<Option<BitField>> {
        let value = match level {
            ConditionLevel::NotRequested => return Ok(None),
            ConditionLevel::Value(v) => v,
        };

        let spec = self.spec(condition)?;
        if !spec.accepts(value) {
            return Err(Error::InvalidLevel {
                condition: condition.name().to_string(),
                sensor: self.sensor.to_string(),
                value: i32::from(value),
                accepted: spec.accepted_values(),
            });
        }

        spec.layout.with_target(u64::from(value)).map(Some)
    }
}
