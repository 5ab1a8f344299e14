//! I/O operations for reading QA bands and writing masks

mod native;

pub use native::{
    read_geotiff, read_geotiff_from_buffer, write_geotiff, write_geotiff_to_buffer,
    write_geotiff_u16, GeoTiffOptions,
};
