//! Confidence and quality levels
//!
//! Landsat confidence fields hold a 2-bit scale where higher means more
//! certain. The MODIS quality field runs the other way: 0 is the best pixel.
//! Both collapse into [`ConditionLevel`], which also carries the
//! "condition not requested" state.

use std::fmt;

/// Landsat confidence scale (higher = more confident)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Confidence {
    Undefined = 0,
    Low = 1,
    Medium = 2,
    High = 3,
}

impl Confidence {
    pub const ALL: [Confidence; 4] = [
        Confidence::Undefined,
        Confidence::Low,
        Confidence::Medium,
        Confidence::High,
    ];

    pub fn value(self) -> u8 {
        self as u8
    }

    pub fn from_value(value: u8) -> Option<Self> {
        Self::ALL.get(value as usize).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            Confidence::Undefined => "undefined",
            Confidence::Low => "low",
            Confidence::Medium => "medium",
            Confidence::High => "high",
        }
    }
}

/// MODIS QA quality scale (lower = better)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModisQuality {
    High = 0,
    Medium = 1,
    Low = 2,
    LowCloud = 3,
}

impl ModisQuality {
    pub const ALL: [ModisQuality; 4] = [
        ModisQuality::High,
        ModisQuality::Medium,
        ModisQuality::Low,
        ModisQuality::LowCloud,
    ];

    pub fn value(self) -> u8 {
        self as u8
    }

    pub fn from_value(value: u8) -> Option<Self> {
        Self::ALL.get(value as usize).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            ModisQuality::High => "high",
            ModisQuality::Medium => "medium",
            ModisQuality::Low => "low",
            ModisQuality::LowCloud => "low_cloud",
        }
    }
}

/// Level requested for one condition.
///
/// `NotRequested` leaves the condition out of a combined mask altogether.
/// `Value` holds the raw field value to match, already in the sensor's own
/// scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConditionLevel {
    #[default]
    NotRequested,
    Value(u8),
}

impl ConditionLevel {
    /// Single-bit flag set
    pub const PRESENT: ConditionLevel = ConditionLevel::Value(1);
    /// Single-bit flag clear
    pub const ABSENT: ConditionLevel = ConditionLevel::Value(0);

    /// Parse the integer form used on the command line, where `-1` means
    /// not requested. Returns `None` for other negatives or values above 255.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            -1 => Some(ConditionLevel::NotRequested),
            0..=255 => Some(ConditionLevel::Value(code as u8)),
            _ => None,
        }
    }

    /// Integer form, `-1` for not requested
    pub fn code(self) -> i32 {
        match self {
            ConditionLevel::NotRequested => -1,
            ConditionLevel::Value(v) => i32::from(v),
        }
    }

    pub fn value(self) -> Option<u8> {
        match self {
            ConditionLevel::NotRequested => None,
            ConditionLevel::Value(v) => Some(v),
        }
    }

    pub fn is_requested(self) -> bool {
        matches!(self, ConditionLevel::Value(_))
    }
}

impl From<Confidence> for ConditionLevel {
    fn from(c: Confidence) -> Self {
        ConditionLevel::Value(c.value())
    }
}

impl From<ModisQuality> for ConditionLevel {
    fn from(q: ModisQuality) -> Self {
        ConditionLevel::Value(q.value())
    }
}

impl From<bool> for ConditionLevel {
    fn from(flag: bool) -> Self {
        if flag {
            ConditionLevel::PRESENT
        } else {
            ConditionLevel::ABSENT
        }
    }
}

impl From<Option<Confidence>> for ConditionLevel {
    fn from(c: Option<Confidence>) -> Self {
        c.map_or(ConditionLevel::NotRequested, ConditionLevel::from)
    }
}

impl fmt::Display for ConditionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConditionLevel::NotRequested => write!(f, "not requested"),
            ConditionLevel::Value(v) => write!(f, "{}", v),
        }
    }
}
