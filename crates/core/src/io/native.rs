//! Native GeoTIFF reading/writing
//!
//! Uses the `tiff` crate. Only the georeferencing needed to copy a QA band's
//! placement onto its masks is understood: the pixel-scale and tiepoint tags
//! and the EPSG code stored in the GeoKey directory.

use crate::crs::CRS;
use crate::error::{Error, Result};
use crate::raster::{GeoTransform, Raster, RasterElement};
use num_traits::NumCast;
use std::fs::File;
use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::colortype::{ColorType, Gray16, Gray8};
use tiff::encoder::{TiffEncoder, TiffValue};
use tiff::tags::Tag;

const GT_MODEL_TYPE_KEY: u32 = 1024;
const GT_RASTER_TYPE_KEY: u32 = 1025;
const GEOGRAPHIC_TYPE_KEY: u32 = 2048;
const PROJECTED_CS_TYPE_KEY: u32 = 3072;
const USER_DEFINED: u32 = 32767;

/// Options for writing GeoTIFF files
#[derive(Debug, Clone)]
pub struct GeoTiffOptions {
    /// Write the geotransform and CRS tags. When false a plain TIFF is written.
    pub georeference: bool,
}

impl Default for GeoTiffOptions {
    fn default() -> Self {
        Self { georeference: true }
    }
}

/// Read one image of a (Geo)TIFF file into a Raster
///
/// `band` is the 0-based index of the image inside the file; `None` reads the
/// first one. Samples are converted to `T`; samples that don't fit become
/// `T::default_nodata()`.
pub fn read_geotiff<T, P>(path: P, band: Option<usize>) -> Result<Raster<T>>
where
    T: RasterElement,
    P: AsRef<Path>,
{
    let file = File::open(path.as_ref())?;
    decode_geotiff(file, band)
}

/// Read a GeoTIFF from an in-memory buffer into a Raster
pub fn read_geotiff_from_buffer<T>(data: &[u8], band: Option<usize>) -> Result<Raster<T>>
where
    T: RasterElement,
{
    decode_geotiff(Cursor::new(data), band)
}

fn decode_geotiff<T, R>(reader: R, band: Option<usize>) -> Result<Raster<T>>
where
    T: RasterElement,
    R: Read + Seek,
{
    let mut decoder = Decoder::new(reader)
        .map_err(|e| Error::Other(format!("TIFF decode error: {}", e)))?;

    let index = band.unwrap_or(0);
    for _ in 0..index {
        if !decoder.more_images() {
            return Err(Error::Other(format!("TIFF has no image at index {}", index)));
        }
        decoder
            .next_image()
            .map_err(|e| Error::Other(format!("Cannot seek to image {}: {}", index, e)))?;
    }

    let (width, height) = decoder
        .dimensions()
        .map_err(|e| Error::Other(format!("Cannot read dimensions: {}", e)))?;

    let rows = height as usize;
    let cols = width as usize;

    let result = decoder
        .read_image()
        .map_err(|e| Error::Other(format!("Cannot read image data: {}", e)))?;

    #[allow(unreachable_patterns)]
    let data: Vec<T> = match result {
        DecodingResult::U8(buf) => cast_samples(&buf),
        DecodingResult::U16(buf) => cast_samples(&buf),
        DecodingResult::U32(buf) => cast_samples(&buf),
        DecodingResult::U64(buf) => cast_samples(&buf),
        DecodingResult::I8(buf) => cast_samples(&buf),
        DecodingResult::I16(buf) => cast_samples(&buf),
        DecodingResult::I32(buf) => cast_samples(&buf),
        DecodingResult::I64(buf) => cast_samples(&buf),
        DecodingResult::F32(buf) => cast_samples(&buf),
        DecodingResult::F64(buf) => cast_samples(&buf),
        _ => return Err(Error::UnsupportedDataType("Unsupported TIFF pixel format".to_string())),
    };

    if data.len() != rows * cols {
        return Err(Error::InvalidDimensions {
            width: cols,
            height: rows,
        });
    }

    let mut raster = Raster::from_vec(data, rows, cols)?;

    if let Some(transform) = read_geotransform(&mut decoder) {
        raster.set_transform(transform);
    }
    raster.set_crs(read_crs(&mut decoder));

    Ok(raster)
}

fn cast_samples<S, T>(buf: &[S]) -> Vec<T>
where
    S: NumCast + Copy,
    T: RasterElement,
{
    buf.iter()
        .map(|&v| num_traits::cast(v).unwrap_or(T::default_nodata()))
        .collect()
}

fn read_geotransform<R: Read + Seek>(decoder: &mut Decoder<R>) -> Option<GeoTransform> {
    let scale = decoder
        .get_tag_f64_vec(Tag::ModelPixelScaleTag)
        .ok()?;
    let tiepoint = decoder
        .get_tag_f64_vec(Tag::ModelTiepointTag)
        .ok()?;

    GeoTransform::from_model_tags(&scale, &tiepoint)
}

fn read_crs<R: Read + Seek>(decoder: &mut Decoder<R>) -> Option<CRS> {
    let keys = decoder
        .get_tag_u32_vec(Tag::GeoKeyDirectoryTag)
        .ok()?;
    epsg_from_geokeys(&keys)
}

/// Pull the EPSG code out of a GeoKeyDirectoryTag.
///
/// Layout: a 4-entry header whose last entry is the key count, then one
/// `[key_id, tag_location, count, value]` entry per key. Only inline values
/// (`tag_location == 0`) can carry a code. Projected codes win over
/// geographic ones.
fn epsg_from_geokeys(keys: &[u32]) -> Option<CRS> {
    if keys.len() < 4 {
        return None;
    }
    let count = keys[3] as usize;
    let entries: Vec<&[u32]> = keys[4..].chunks_exact(4).take(count).collect();

    [PROJECTED_CS_TYPE_KEY, GEOGRAPHIC_TYPE_KEY]
        .iter()
        .find_map(|&wanted| {
            entries
                .iter()
                .find(|e| e[0] == wanted && e[1] == 0 && e[3] != 0 && e[3] != USER_DEFINED)
                .map(|e| CRS::from_epsg(e[3]))
        })
}

fn geokey_directory(crs: Option<&CRS>) -> Vec<u16> {
    let geographic = crs.map_or(false, |c| c.is_geographic());
    let model_type = if geographic { 2 } else { 1 };

    let mut keys: Vec<u16> = vec![
        1, 1, 0, 2, // Version 1.1.0, 2 keys
        GT_MODEL_TYPE_KEY as u16, 0, 1, model_type,
        GT_RASTER_TYPE_KEY as u16, 0, 1, 1, // RasterPixelIsArea
    ];

    if let Some(code) = crs.and_then(|c| u16::try_from(c.epsg()).ok()) {
        let key = if geographic {
            GEOGRAPHIC_TYPE_KEY
        } else {
            PROJECTED_CS_TYPE_KEY
        };
        keys[3] = 3;
        keys.extend_from_slice(&[key as u16, 0, 1, code]);
    }

    keys
}

/// Write a 0/1 mask to a GeoTIFF file as 8-bit unsigned samples
pub fn write_geotiff<P>(mask: &Raster<u8>, path: P, options: Option<GeoTiffOptions>) -> Result<()>
where
    P: AsRef<Path>,
{
    let file = File::create(path.as_ref())?;
    let samples: Vec<u8> = mask.data().iter().copied().collect();
    encode_gray::<Gray8, _, _>(mask, &samples, &options.unwrap_or_default(), file)
}

/// Write a 0/1 mask to an in-memory GeoTIFF buffer
pub fn write_geotiff_to_buffer(mask: &Raster<u8>, options: Option<GeoTiffOptions>) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let samples: Vec<u8> = mask.data().iter().copied().collect();
    encode_gray::<Gray8, _, _>(mask, &samples, &options.unwrap_or_default(), Cursor::new(&mut buf))?;
    Ok(buf)
}

/// Write a 16-bit band (e.g. a Landsat QA band) to a GeoTIFF file
pub fn write_geotiff_u16<P>(band: &Raster<u16>, path: P, options: Option<GeoTiffOptions>) -> Result<()>
where
    P: AsRef<Path>,
{
    let file = File::create(path.as_ref())?;
    let samples: Vec<u16> = band.data().iter().copied().collect();
    encode_gray::<Gray16, _, _>(band, &samples, &options.unwrap_or_default(), file)
}

fn encode_gray<C, T, W>(
    raster: &Raster<T>,
    samples: &[C::Inner],
    options: &GeoTiffOptions,
    writer: W,
) -> Result<()>
where
    C: ColorType,
    [C::Inner]: TiffValue,
    T: RasterElement,
    W: Write + Seek,
{
    let mut encoder = TiffEncoder::new(writer)
        .map_err(|e| Error::Other(format!("TIFF encoder error: {}", e)))?;

    let (rows, cols) = raster.shape();
    let mut image = encoder
        .new_image::<C>(cols as u32, rows as u32)
        .map_err(|e| Error::Other(format!("Cannot create TIFF image: {}", e)))?;

    if options.georeference {
        let (scale, tiepoint) = raster.transform().model_tags();
        image
            .encoder()
            .write_tag(Tag::ModelPixelScaleTag, &scale[..])
            .map_err(|e| Error::Other(format!("Cannot write scale tag: {}", e)))?;
        image
            .encoder()
            .write_tag(Tag::ModelTiepointTag, &tiepoint[..])
            .map_err(|e| Error::Other(format!("Cannot write tiepoint tag: {}", e)))?;

        let geokeys = geokey_directory(raster.crs());
        image
            .encoder()
            .write_tag(Tag::GeoKeyDirectoryTag, geokeys.as_slice())
            .map_err(|e| Error::Other(format!("Cannot write geokey tag: {}", e)))?;
    }

    image
        .write_data(samples)
        .map_err(|e| Error::Other(format!("Cannot write image data: {}", e)))?;

    Ok(())
}
