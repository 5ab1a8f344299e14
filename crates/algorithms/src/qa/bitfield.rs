//! Bit-field codec
//!
//! A QA word packs several attributes into contiguous bit groups. A
//! [`BitField`] names one group and the value it must hold; [`decode`] turns
//! a whole band into a 0/1 mask of the pixels whose group matches.
//!
//! Matching happens on the masked, still-shifted group:
//!
//! ```text
//! position = ((1 << width) - 1) << offset
//! target   = value << offset
//! exact:      (word & position) == target
//! cumulative: (word & position) >= target
//! ```

use ndarray::Array2;
use crate::maybe_rayon::*;
use qamask_core::raster::{Raster, RasterElement};
use qamask_core::{Error, Result};

/// A 0/1 mask with the shape and georeference of the band it came from
pub type Mask = Raster<u8>;

/// Unsigned integer types that can hold a bit-packed QA word
pub trait QaWord: RasterElement {
    /// The word widened to 64 bits
    fn bits(self) -> u64;
}

macro_rules! impl_qa_word {
    ($($t:ty),*) => {
        $(
            impl QaWord for $t {
                #[inline]
                fn bits(self) -> u64 {
                    self as u64
                }
            }
        )*
    };
}

impl_qa_word!(u8, u16, u32, u64);

/// Position of a bit group inside a QA word, without a target value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BitLayout {
    /// Index of the lowest bit of the group (0 = least significant)
    pub offset: u32,
    /// Number of bits in the group
    pub width: u32,
}

impl BitLayout {
    pub const fn new(offset: u32, width: u32) -> Self {
        Self { offset, width }
    }

    /// Largest value the group can hold
    pub fn max_value(&self) -> u64 {
        if self.width >= 64 {
            u64::MAX
        } else {
            (1u64 << self.width) - 1
        }
    }

    /// Attach a target value, producing a [`BitField`]
    pub fn with_target(self, target: u64) -> Result<BitField> {
        BitField::new(self.offset, self.width, target)
    }
}

/// How a bit group is compared against its target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MatchMode {
    /// The group must equal the target
    #[default]
    Exact,
    /// The group must be at least the target ("this level or higher")
    Cumulative,
}

impl MatchMode {
    pub fn from_cumulative(cumulative: bool) -> Self {
        if cumulative {
            MatchMode::Cumulative
        } else {
            MatchMode::Exact
        }
    }
}

/// A bit group together with the value it is matched against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BitField {
    layout: BitLayout,
    target: u64,
}

impl BitField {
    /// Create a bit field.
    ///
    /// Fails when `width` is zero, when the group does not fit a 64-bit word,
    /// or when `target` needs more than `width` bits.
    pub fn new(offset: u32, width: u32, target: u64) -> Result<Self> {
        let invalid = |reason| Error::InvalidBitField {
            offset,
            width,
            target: target.to_string(),
            reason,
        };

        if width == 0 {
            return Err(invalid("width must be positive"));
        }
        if offset.checked_add(width).map_or(true, |end| end > 64) {
            return Err(invalid("field does not fit a 64-bit word"));
        }

        let layout = BitLayout::new(offset, width);
        if target > layout.max_value() {
            return Err(invalid("target does not fit the field width"));
        }

        Ok(Self { layout, target })
    }

    /// Create a bit field whose target is written in base 2, e.g. `"10"`
    pub fn from_binary(offset: u32, width: u32, target: &str) -> Result<Self> {
        let value = u64::from_str_radix(target.trim(), 2).map_err(|_| Error::InvalidBitField {
            offset,
            width,
            target: target.to_string(),
            reason: "target is not a binary string",
        })?;
        Self::new(offset, width, value)
    }

    pub fn layout(&self) -> BitLayout {
        self.layout
    }

    pub fn offset(&self) -> u32 {
        self.layout.offset
    }

    pub fn width(&self) -> u32 {
        self.layout.width
    }

    pub fn target(&self) -> u64 {
        self.target
    }

    /// Word with every bit of the group set
    pub fn position_mask(&self) -> u64 {
        self.layout.max_value() << self.layout.offset
    }

    /// Target moved into the group's position
    pub fn target_shifted(&self) -> u64 {
        self.target << self.layout.offset
    }

    /// Value of the group in `word`
    pub fn extract(&self, word: u64) -> u64 {
        (word >> self.layout.offset) & self.layout.max_value()
    }

    /// Whether `word` satisfies this field under `mode`
    #[inline]
    pub fn matches(&self, word: u64, mode: MatchMode) -> bool {
        let group = word & self.position_mask();
        match mode {
            MatchMode::Exact => group == self.target_shifted(),
            MatchMode::Cumulative => group >= self.target_shifted(),
        }
    }
}

/// Decode one bit field over a whole band.
///
/// Each output cell is 1 where the pixel's bit group matches `field` under
/// `mode`, 0 elsewhere. The mask inherits the band's geotransform and CRS.
/// Bits outside the group never influence the result.
///
/// # Example
/// ```
/// use qamask_algorithms::qa::{decode, BitField, MatchMode};
/// use qamask_core::Raster;
///
/// let band = Raster::from_vec(vec![0b01u16, 0b10, 0b11], 1, 3).unwrap();
/// let field = BitField::from_binary(0, 2, "10").unwrap();
///
/// let exact = decode(&band, &field, MatchMode::Exact).unwrap();
/// assert_eq!(exact.data().as_slice().unwrap(), &[0, 1, 0]);
///
/// let at_least = decode(&band, &field, MatchMode::Cumulative).unwrap();
/// assert_eq!(at_least.data().as_slice().unwrap(), &[0, 1, 1]);
/// ```
pub fn decode<T: QaWord>(band: &Raster<T>, field: &BitField, mode: MatchMode) -> Result<Mask> {
    let (rows, cols) = band.shape();
    let view = band.view();

    let data: Vec<u8> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            view.row(row)
                .iter()
                .map(|&word| u8::from(field.matches(word.bits(), mode)))
                .collect::<Vec<u8>>()
        })
        .collect();

    let mut output = band.with_same_meta::<u8>(rows, cols);
    *output.data_mut() =
        Array2::from_shape_vec((rows, cols), data).map_err(|e| Error::Other(e.to_string()))?;

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use qamask_core::{GeoTransform, CRS};

    fn make_band(values: Vec<u16>, cols: usize) -> Raster<u16> {
        let rows = values.len() / cols;
        let mut r = Raster::from_vec(values, rows, cols).unwrap();
        r.set_transform(GeoTransform::new(0.0, 5.0, 30.0, -30.0));
        r
    }

    fn cells(mask: &Mask) -> Vec<u8> {
        mask.data().iter().copied().collect()
    }

    #[test]
    fn test_position_mask_and_target() {
        let field = BitField::new(5, 2, 3).unwrap();
        assert_eq!(field.position_mask(), 0b0110_0000);
        assert_eq!(field.target_shifted(), 0b0110_0000);

        let field = BitField::new(14, 2, 1).unwrap();
        assert_eq!(field.position_mask(), 0xC000);
        assert_eq!(field.target_shifted(), 0x4000);
    }

    #[test]
    fn test_extract() {
        let field = BitField::new(11, 2, 0).unwrap();
        assert_eq!(field.extract(0b0001_1000_0000_0000), 3);
        assert_eq!(field.extract(0b0000_1000_0000_0000), 1);
        assert_eq!(field.extract(0b1110_0111_1111_1111), 0);
    }

    #[test]
    fn test_from_binary() {
        let field = BitField::from_binary(4, 2, "10").unwrap();
        assert_eq!(field.target(), 2);
        assert_eq!(field, BitField::new(4, 2, 2).unwrap());

        assert!(BitField::from_binary(4, 2, "12").is_err());
        assert!(BitField::from_binary(4, 2, "").is_err());
    }

    #[test]
    fn test_invalid_fields() {
        assert!(matches!(
            BitField::new(0, 0, 0),
            Err(Error::InvalidBitField { reason: "width must be positive", .. })
        ));
        assert!(BitField::new(60, 8, 0).is_err());
        assert!(BitField::new(u32::MAX, 2, 0).is_err());
        assert!(matches!(
            BitField::new(0, 2, 4),
            Err(Error::InvalidBitField { reason: "target does not fit the field width", .. })
        ));
    }

    #[test]
    fn test_full_word_field() {
        let field = BitField::new(0, 64, u64::MAX).unwrap();
        assert_eq!(field.position_mask(), u64::MAX);
        assert!(field.matches(u64::MAX, MatchMode::Exact));
        assert!(!field.matches(u64::MAX - 1, MatchMode::Exact));
    }

    #[test]
    fn test_decode_exact_single_bit() {
        // Fill bit (bit 0)
        let band = make_band(vec![0, 1, 2, 3, 0xFFFF, 0xFFFE], 3);
        let field = BitField::new(0, 1, 1).unwrap();

        let mask = decode(&band, &field, MatchMode::Exact).unwrap();
        assert_eq!(cells(&mask), vec![0, 1, 0, 1, 1, 0]);
    }

    #[test]
    fn test_decode_cumulative_ignores_neighbouring_bits() {
        // Group at bits 5-6; bit 7 belongs to the next group
        let band = make_band(
            vec![
                0b0010_0000, // group = 1
                0b1010_0000, // group = 1, bit 7 set
                0b0100_0000, // group = 2
                0b0110_0000, // group = 3
                0b1000_0000, // group = 0, bit 7 set
                0b0001_1111, // group = 0, low bits set
            ],
            3,
        );
        let field = BitField::new(5, 2, 2).unwrap();

        let mask = decode(&band, &field, MatchMode::Cumulative).unwrap();
        assert_eq!(cells(&mask), vec![0, 0, 1, 1, 0, 0]);

        let exact = decode(&band, &field, MatchMode::Exact).unwrap();
        assert_eq!(cells(&exact), vec![0, 0, 1, 0, 0, 0]);
    }

    #[test]
    fn test_decode_target_zero_cumulative_is_all_true() {
        let band = make_band(vec![0, 17, 4096, 65535], 2);
        let field = BitField::new(9, 2, 0).unwrap();

        let mask = decode(&band, &field, MatchMode::Cumulative).unwrap();
        assert_eq!(cells(&mask), vec![1, 1, 1, 1]);
    }

    #[test]
    fn test_decode_keeps_georeference() {
        let mut band = make_band(vec![0; 6], 2);
        band.set_crs(Some(CRS::from_epsg(32617)));
        let field = BitField::new(0, 1, 0).unwrap();

        let mask = decode(&band, &field, MatchMode::Exact).unwrap();
        assert_eq!(mask.shape(), (3, 2));
        assert_eq!(mask.transform(), band.transform());
        assert_eq!(mask.crs(), Some(&CRS::from_epsg(32617)));
    }

    #[test]
    fn test_decode_wide_words() {
        let band = Raster::from_vec(vec![1u32 << 20, 3u32 << 20, 0], 1, 3).unwrap();
        let field = BitField::new(20, 2, 1).unwrap();

        let mask = decode(&band, &field, MatchMode::Exact).unwrap();
        assert_eq!(cells(&mask), vec![1, 0, 0]);
    }

    #[test]
    fn test_decode_empty_band() {
        let band: Raster<u16> = Raster::new(0, 0);
        let field = BitField::new(0, 1, 1).unwrap();
        let mask = decode(&band, &field, MatchMode::Exact).unwrap();
        assert!(mask.is_empty());
    }
}
