//! Raster element trait for generic cell values

use num_traits::{NumCast, Zero};
use std::fmt::Debug;

/// Trait for types that can be stored in a raster cell.
///
/// QA bands are unsigned integer words and masks are `u8`, but float
/// rasters are accepted by the I/O layer as well.
pub trait RasterElement:
    Copy + Clone + Debug + PartialOrd + PartialEq + NumCast + Zero + Send + Sync + 'static
{
    /// Value used when a decoded sample cannot be represented in this type
    fn default_nodata() -> Self;
}

macro_rules! impl_raster_element {
    ($($t:ty => $nodata:expr),*) => {
        $(
            impl RasterElement for $t {
                fn default_nodata() -> Self {
                    $nodata
                }
            }
        )*
    };
}

impl_raster_element!(
    i8 => i8::MIN, i16 => i16::MIN, i32 => i32::MIN, i64 => i64::MIN,
    u8 => u8::MIN, u16 => u16::MIN, u32 => u32::MIN, u64 => u64::MIN,
    f32 => f32::NAN, f64 => f64::NAN
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_nodata() {
        assert_eq!(u16::default_nodata(), 0);
        assert_eq!(i16::default_nodata(), i16::MIN);
        assert!(f32::default_nodata().is_nan());
    }
}
