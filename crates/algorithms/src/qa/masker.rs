//! Per-condition mask helpers bound to one QA band

use qamask_core::{Error, Raster, Result};

use super::bitfield::{decode, BitField, MatchMode, Mask, QaWord};
use super::combine::{combine, FoldMode, MaskRequest};
use super::condition::{ConditionLevel, ModisQuality};
use super::sensor::{Condition, Sensor, SensorProfile};

/// A QA band paired with the sensor profile that describes its bits.
///
/// Each `*_mask` method is [`combine`] with a single request. Methods that
/// need a level fail with [`Error::MissingLevel`] when given
/// [`ConditionLevel::NotRequested`].
///
/// # Example
/// ```
/// use qamask_algorithms::qa::{Collection, Confidence, MatchMode, QaMasker, Sensor};
/// use qamask_core::Raster;
///
/// let band = Raster::from_vec(vec![0u16, 0b0110_0000, 0b0100_0000], 1, 3).unwrap();
/// let masker = QaMasker::new(&band, Sensor::Landsat8(Collection::Collection1));
///
/// let high = masker.cloud_mask(Confidence::High, MatchMode::Exact).unwrap();
/// assert_eq!(high.data().as_slice().unwrap(), &[0, 1, 0]);
///
/// let medium_up = masker.cloud_mask(Confidence::Medium, MatchMode::Cumulative).unwrap();
/// assert_eq!(medium_up.data().as_slice().unwrap(), &[0, 1, 1]);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct QaMasker<'a, T: QaWord> {
    band: &'a Raster<T>,
    profile: &'static SensorProfile,
}

impl<'a, T: QaWord> QaMasker<'a, T> {
    pub fn new(band: &'a Raster<T>, sensor: Sensor) -> Self {
        Self {
            band,
            profile: sensor.profile(),
        }
    }

    pub fn band(&self) -> &'a Raster<T> {
        self.band
    }

    pub fn profile(&self) -> &'static SensorProfile {
        self.profile
    }

    pub fn sensor(&self) -> Sensor {
        self.profile.sensor()
    }

    /// Exact mask for an arbitrary bit group, independent of the profile
    pub fn mask(&self, offset: u32, width: u32, value: u64) -> Result<Mask> {
        let field = BitField::new(offset, width, value)?;
        decode(self.band, &field, MatchMode::Exact)
    }

    /// Like [`mask`](Self::mask) with the value written in base 2
    pub fn mask_binary(&self, offset: u32, width: u32, value: &str) -> Result<Mask> {
        let field = BitField::from_binary(offset, width, value)?;
        decode(self.band, &field, MatchMode::Exact)
    }

    /// Pixels whose cloud indicator bit is clear
    pub fn no_cloud_mask(&self) -> Result<Mask> {
        self.single(MaskRequest::exact(Condition::CloudIndicator, false))
    }

    /// Cloud mask at `level`.
    ///
    /// When no level is requested and the profile has a cloud indicator bit,
    /// the mask is that bit being set.
    pub fn cloud_mask(&self, level: impl Into<ConditionLevel>, mode: MatchMode) -> Result<Mask> {
        let level = level.into();
        if !level.is_requested() && self.profile.supports(Condition::CloudIndicator) {
            return self.single(MaskRequest::exact(Condition::CloudIndicator, true));
        }
        self.leveled(Condition::Cloud, level, mode)
    }

    pub fn cloud_shadow_mask(&self, level: impl Into<ConditionLevel>, mode: MatchMode) -> Result<Mask> {
        self.leveled(Condition::CloudShadow, level.into(), mode)
    }

    pub fn cirrus_mask(&self, level: impl Into<ConditionLevel>, mode: MatchMode) -> Result<Mask> {
        self.leveled(Condition::Cirrus, level.into(), mode)
    }

    pub fn water_mask(&self, level: impl Into<ConditionLevel>, mode: MatchMode) -> Result<Mask> {
        self.leveled(Condition::Water, level.into(), mode)
    }

    pub fn snow_mask(&self, level: impl Into<ConditionLevel>, mode: MatchMode) -> Result<Mask> {
        self.leveled(Condition::Snow, level.into(), mode)
    }

    pub fn vegetation_mask(&self, level: impl Into<ConditionLevel>, mode: MatchMode) -> Result<Mask> {
        self.leveled(Condition::Vegetation, level.into(), mode)
    }

    /// Designated fill pixels
    pub fn fill_mask(&self) -> Result<Mask> {
        self.single(MaskRequest::exact(Condition::Fill, true))
    }

    /// MODIS pixels of exactly `quality`
    pub fn quality_mask(&self, quality: ModisQuality) -> Result<Mask> {
        self.single(MaskRequest::exact(Condition::Quality, quality))
    }

    /// Combine several requests, see [`combine`]
    pub fn multi_mask(&self, requests: &[MaskRequest], fold: FoldMode) -> Result<Mask> {
        combine(self.band, self.profile, requests, fold)
    }

    fn leveled(&self, condition: Condition, level: ConditionLevel, mode: MatchMode) -> Result<Mask> {
        if !level.is_requested() {
            return Err(Error::MissingLevel {
                condition: condition.name().to_string(),
                sensor: self.sensor().to_string(),
            });
        }
        self.single(MaskRequest::new(condition, level, mode))
    }

    fn single(&self, request: MaskRequest) -> Result<Mask> {
        combine(self.band, self.profile, &[request], FoldMode::Exclusive)
    }
}
