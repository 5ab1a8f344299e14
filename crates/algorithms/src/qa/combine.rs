//! Mask combinator
//!
//! Folds the masks of several requested conditions into one. Exclusive mode
//! ANDs them starting from all-ones, inclusive mode ORs them starting from
//! all-zeros. Requests at [`ConditionLevel::NotRequested`] are skipped.

use ndarray::Zip;
use qamask_core::{Algorithm, Error, Raster, Result};

use super::bitfield::{decode, BitField, MatchMode, Mask, QaWord};
use super::condition::ConditionLevel;
use super::sensor::{Condition, Sensor, SensorProfile};

/// One condition to include in a combined mask
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaskRequest {
    pub condition: Condition,
    pub level: ConditionLevel,
    pub mode: MatchMode,
}

impl MaskRequest {
    pub fn new(condition: Condition, level: impl Into<ConditionLevel>, mode: MatchMode) -> Self {
        Self {
            condition,
            level: level.into(),
            mode,
        }
    }

    pub fn exact(condition: Condition, level: impl Into<ConditionLevel>) -> Self {
        Self::new(condition, level, MatchMode::Exact)
    }

    pub fn cumulative(condition: Condition, level: impl Into<ConditionLevel>) -> Self {
        Self::new(condition, level, MatchMode::Cumulative)
    }

    pub fn not_requested(condition: Condition) -> Self {
        Self::new(condition, ConditionLevel::NotRequested, MatchMode::Exact)
    }
}

/// How per-condition masks are folded together
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FoldMode {
    /// Every condition must hold (AND)
    #[default]
    Exclusive,
    /// Any condition may hold (OR)
    Inclusive,
}

impl FoldMode {
    pub fn from_inclusive(inclusive: bool) -> Self {
        if inclusive {
            FoldMode::Inclusive
        } else {
            FoldMode::Exclusive
        }
    }

    /// Identity element of the fold
    pub fn seed(self) -> u8 {
        match self {
            FoldMode::Exclusive => 1,
            FoldMode::Inclusive => 0,
        }
    }

    #[inline]
    pub fn apply(self, acc: u8, value: u8) -> u8 {
        match self {
            FoldMode::Exclusive => acc & value,
            FoldMode::Inclusive => acc | value,
        }
    }
}

/// Resolve every active request against `profile`.
///
/// Runs to completion before any pixel is touched, so an invalid request
/// never leaves a partially built mask behind.
pub fn resolve_requests(
    profile: &SensorProfile,
    requests: &[MaskRequest],
) -> Result<Vec<(BitField, MatchMode)>> {
    let mut fields = Vec::with_capacity(requests.len());
    for request in requests {
        if let Some(field) = profile.resolve(request.condition, request.level)? {
            fields.push((field, request.mode));
        }
    }
    Ok(fields)
}

/// Build one mask from several condition requests.
///
/// The result has the band's shape and georeference. With no active request
/// it is the fold seed: all ones when exclusive, all zeros when inclusive.
pub fn combine<T: QaWord>(
    band: &Raster<T>,
    profile: &SensorProfile,
    requests: &[MaskRequest],
    fold: FoldMode,
) -> Result<Mask> {
    let fields = resolve_requests(profile, requests)?;

    let (rows, cols) = band.shape();
    let mut acc = band.with_same_meta::<u8>(rows, cols);
    acc.data_mut().fill(fold.seed());

    for (field, mode) in &fields {
        let mask = decode(band, field, *mode)?;
        fold_into(&mut acc, &mask, fold)?;
    }

    Ok(acc)
}

/// Fold `mask` into `acc` cell by cell
pub fn fold_into(acc: &mut Mask, mask: &Mask, fold: FoldMode) -> Result<()> {
    if acc.shape() != mask.shape() {
        let (er, ec) = acc.shape();
        let (ar, ac) = mask.shape();
        return Err(Error::SizeMismatch { er, ec, ar, ac });
    }

    Zip::from(acc.data_mut())
        .and(mask.data())
        .for_each(|a, &m| *a = fold.apply(*a, m));

    Ok(())
}

/// Number of cells set to 1
pub fn count_set(mask: &Mask) -> usize {
    mask.count_where(|v| v != 0)
}

/// Parameters for [`QaMask`]
#[derive(Debug, Clone, Default)]
pub struct QaMaskParams {
    /// Sensor whose bit table applies to the band
    pub sensor: Sensor,
    /// Conditions to combine
    pub requests: Vec<MaskRequest>,
    /// AND or OR folding
    pub fold: FoldMode,
}

/// Combined QA mask as an [`Algorithm`]
#[derive(Debug, Clone, Default)]
pub struct QaMask;

impl Algorithm for QaMask {
    type Input = Raster<u32>;
    type Output = Mask;
    type Params = QaMaskParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "QA Mask"
    }

    fn description(&self) -> &'static str {
        "Decode QA bit fields into a combined 0/1 condition mask"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        combine(&input, params.sensor.profile(), &params.requests, params.fold)
    }
}
