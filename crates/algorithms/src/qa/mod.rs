//! Quality-assessment band decoding
//!
//! - Bit-field codec: match one bit group of every pixel, exact or cumulative
//! - Condition levels: Landsat confidence, MODIS quality, "not requested"
//! - Sensor profiles: static bit tables for Landsat 8 (collections 0 and 1) and MODIS
//! - Combinator: AND/OR folding of several condition masks
//! - `QaMasker`: one-call helpers per condition

mod bitfield;
mod combine;
mod condition;
mod masker;
mod sensor;

pub use bitfield::{decode, BitField, BitLayout, MatchMode, Mask, QaWord};
pub use combine::{
    combine, count_set, fold_into, resolve_requests, FoldMode, MaskRequest, QaMask, QaMaskParams,
};
pub use condition::{ConditionLevel, Confidence, ModisQuality};
pub use masker::QaMasker;
pub use sensor::{Collection, Condition, ConditionSpec, Sensor, SensorProfile};
