//! # qamask Algorithms
//!
//! Decoding of bit-packed quality-assessment (QA) bands into 0/1 masks.
//!
//! ## Modules
//!
//! - **qa**: bit-field codec, sensor bit tables (Landsat 8, MODIS), mask
//!   combination and per-condition helpers
//!
//! Row loops run on rayon when the `parallel` feature is enabled (default).

pub mod qa;
mod maybe_rayon;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::qa::{
        combine, count_set, decode,
        BitField, BitLayout, Collection, Condition, ConditionLevel, Confidence,
        FoldMode, MaskRequest, MatchMode, Mask, ModisQuality, QaMask, QaMaskParams,
        QaMasker, QaWord, Sensor, SensorProfile,
    };
    pub use qamask_core::prelude::*;
}
