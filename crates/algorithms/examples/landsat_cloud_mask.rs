//! Landsat cloud mask demo: synthetic collection 1 QA band
//!
//! Builds a 120x120 QA band with:
//! - A fill border two pixels wide
//! - A high-confidence cloud block with its shadow to the south-east
//! - A medium-confidence cloud edge around the block
//! - A cirrus stripe across the scene
//!
//! and writes one mask per condition plus a combined "unusable" mask:
//!   1. qa_band.tif      the synthetic 16-bit band
//!   2. fill.tif         designated fill
//!   3. cloud_high.tif   cloud confidence exactly high
//!   4. cloud_medium.tif cloud confidence medium or higher
//!   5. shadow.tif       cloud shadow, high
//!   6. cirrus.tif       cirrus, high
//!   7. unusable.tif     any of the above (inclusive fold)
//!
//! Run:
//!   cargo run -p qamask-algorithms --example landsat_cloud_mask

use std::fs;
use std::path::Path;

use qamask_algorithms::qa::{
    count_set, Collection, Condition, Confidence, FoldMode, MaskRequest, MatchMode, QaMasker,
    Sensor,
};
use qamask_core::io::{write_geotiff, write_geotiff_u16};
use qamask_core::{GeoTransform, Raster, CRS};

const SIZE: usize = 120;

const FILL: u16 = 1;
const CLOUD_BIT: u16 = 1 << 4;

fn cloud(confidence: Confidence) -> u16 {
    u16::from(confidence.value()) << 5
}

fn shadow(confidence: Confidence) -> u16 {
    u16::from(confidence.value()) << 7
}

fn cirrus(confidence: Confidence) -> u16 {
    u16::from(confidence.value()) << 11
}

fn synthetic_band() -> Raster<u16> {
    let mut band = Raster::new(SIZE, SIZE);
    band.set_transform(GeoTransform::new(399_960.0, 4_500_000.0, 30.0, -30.0));
    band.set_crs(Some(CRS::from_epsg(32617)));

    for row in 0..SIZE {
        for col in 0..SIZE {
            let mut word = cloud(Confidence::Low) | cirrus(Confidence::Low);

            if row < 2 || col < 2 || row >= SIZE - 2 || col >= SIZE - 2 {
                word = FILL;
            } else if (40..70).contains(&row) && (30..60).contains(&col) {
                word = CLOUD_BIT | cloud(Confidence::High);
            } else if (36..74).contains(&row) && (26..64).contains(&col) {
                word = cloud(Confidence::Medium);
            } else if (72..90).contains(&row) && (62..80).contains(&col) {
                word |= shadow(Confidence::High);
            }

            if (95..100).contains(&row) && word != FILL {
                word |= cirrus(Confidence::High);
            }

            band.set(row, col, word).unwrap();
        }
    }
    band
}

fn main() {
    let out_dir = Path::new("output/landsat_cloud_mask");
    fs::create_dir_all(out_dir).expect("Cannot create output directory");

    let band = synthetic_band();
    write_geotiff_u16(&band, out_dir.join("qa_band.tif"), None).unwrap();

    let masker = QaMasker::new(&band, Sensor::Landsat8(Collection::Collection1));

    let outputs = [
        ("fill.tif", masker.fill_mask().unwrap()),
        (
            "cloud_high.tif",
            masker.cloud_mask(Confidence::High, MatchMode::Exact).unwrap(),
        ),
        (
            "cloud_medium.tif",
            masker.cloud_mask(Confidence::Medium, MatchMode::Cumulative).unwrap(),
        ),
        (
            "shadow.tif",
            masker.cloud_shadow_mask(Confidence::High, MatchMode::Exact).unwrap(),
        ),
        (
            "cirrus.tif",
            masker.cirrus_mask(Confidence::High, MatchMode::Exact).unwrap(),
        ),
        (
            "unusable.tif",
            masker
                .multi_mask(
                    &[
                        MaskRequest::exact(Condition::Fill, true),
                        MaskRequest::cumulative(Condition::Cloud, Confidence::Medium),
                        MaskRequest::exact(Condition::CloudShadow, Confidence::High),
                        MaskRequest::exact(Condition::Cirrus, Confidence::High),
                    ],
                    FoldMode::Inclusive,
                )
                .unwrap(),
        ),
    ];

    println!("{:<18} {:>8}", "mask", "pixels");
    for (name, mask) in &outputs {
        write_geotiff(mask, out_dir.join(name), None).unwrap();
        println!("{:<18} {:>8}", name, count_set(mask));
    }
    println!("\nWrote {} files to {}", outputs.len() + 1, out_dir.display());
}
