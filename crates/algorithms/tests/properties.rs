//! Property tests for QA decoding and mask combination.

use proptest::prelude::*;
use qamask_algorithms::qa::{
    combine, decode, BitField, Collection, Condition, ConditionLevel, Confidence, FoldMode,
    MaskRequest, MatchMode, Mask, ModisQuality, QaMasker, Sensor,
};
use qamask_core::{ErrorKind, Raster};

const C1: Sensor = Sensor::Landsat8(Collection::Collection1);
const C0: Sensor = Sensor::Landsat8(Collection::PreCollection);

fn band_from(values: &[u16]) -> Raster<u16> {
    Raster::from_vec(values.to_vec(), 1, values.len()).unwrap()
}

fn cells(mask: &Mask) -> Vec<u8> {
    mask.data().iter().copied().collect()
}

/// (offset, width, target) with the group inside 16 bits
fn field_strategy() -> impl Strategy<Value = (u32, u32, u64)> {
    (1u32..=4)
        .prop_flat_map(|width| (0..=16 - width, Just(width), 0u64..(1 << width)))
}

fn band_strategy() -> impl Strategy<Value = Vec<u16>> {
    prop::collection::vec(any::<u16>(), 1..64)
}

fn level_strategy() -> impl Strategy<Value = ConditionLevel> {
    prop_oneof![
        Just(ConditionLevel::NotRequested),
        (0u8..=3).prop_map(ConditionLevel::Value),
    ]
}

fn c1_request_strategy() -> impl Strategy<Value = MaskRequest> {
    let confidence = prop_oneof![
        Just(Condition::Cloud),
        Just(Condition::CloudShadow),
        Just(Condition::Snow),
        Just(Condition::Cirrus),
    ];
    (confidence, level_strategy(), any::<bool>()).prop_map(|(condition, level, cumulative)| {
        MaskRequest::new(condition, level, MatchMode::from_cumulative(cumulative))
    })
}

proptest! {
    #[test]
    fn exact_decode_matches_extracted_bits(
        (offset, width, target) in field_strategy(),
        values in band_strategy(),
    ) {
        let band = band_from(&values);
        let field = BitField::new(offset, width, target).unwrap();
        let mask = decode(&band, &field, MatchMode::Exact).unwrap();

        for (v, m) in values.iter().zip(cells(&mask)) {
            let bits = (u64::from(*v) >> offset) & ((1 << width) - 1);
            prop_assert_eq!(m == 1, bits == target);
        }
    }

    #[test]
    fn cumulative_decode_is_at_least_target(
        (offset, width, target) in field_strategy(),
        values in band_strategy(),
    ) {
        let band = band_from(&values);
        let field = BitField::new(offset, width, target).unwrap();
        let mask = decode(&band, &field, MatchMode::Cumulative).unwrap();

        for (v, m) in values.iter().zip(cells(&mask)) {
            let bits = (u64::from(*v) >> offset) & ((1 << width) - 1);
            prop_assert_eq!(m == 1, bits >= target);
        }
    }

    #[test]
    fn cumulative_is_monotonic(
        offset in 0u32..=13,
        t1 in 0u64..8,
        t2 in 0u64..8,
        values in band_strategy(),
    ) {
        let (low, high) = if t1 <= t2 { (t1, t2) } else { (t2, t1) };
        let band = band_from(&values);
        let low_mask = decode(&band, &BitField::new(offset, 3, low).unwrap(), MatchMode::Cumulative).unwrap();
        let high_mask = decode(&band, &BitField::new(offset, 3, high).unwrap(), MatchMode::Cumulative).unwrap();

        for (l, h) in cells(&low_mask).into_iter().zip(cells(&high_mask)) {
            prop_assert!(h <= l);
        }
    }

    #[test]
    fn single_bit_cumulative_equals_exact(
        offset in 0u32..16,
        target in 0u64..=1,
        values in band_strategy(),
    ) {
        // Target 0 under cumulative accepts every pixel, so only target 1
        // coincides with the exact match.
        let band = band_from(&values);
        let field = BitField::new(offset, 1, target).unwrap();
        let exact = decode(&band, &field, MatchMode::Exact).unwrap();
        let cumulative = decode(&band, &field, MatchMode::Cumulative).unwrap();

        if target == 1 {
            prop_assert_eq!(cells(&exact), cells(&cumulative));
        } else {
            prop_assert!(cells(&cumulative).iter().all(|&m| m == 1));
        }
    }

    #[test]
    fn bits_outside_the_field_are_ignored(
        (offset, width, target) in field_strategy(),
        value in any::<u16>(),
        noise in any::<u16>(),
    ) {
        let field_bits = (((1u32 << width) - 1) << offset) as u16;
        let noisy = (value & field_bits) | (noise & !field_bits);
        let band = band_from(&[value, noisy]);
        let field = BitField::new(offset, width, target).unwrap();

        for mode in [MatchMode::Exact, MatchMode::Cumulative] {
            let m = cells(&decode(&band, &field, mode).unwrap());
            prop_assert_eq!(m[0], m[1]);
        }
    }

    #[test]
    fn not_requested_returns_seed(values in band_strategy(), inclusive in any::<bool>()) {
        let band = band_from(&values);
        let fold = FoldMode::from_inclusive(inclusive);
        let requests: Vec<MaskRequest> = [Condition::Cloud, Condition::Snow, Condition::Water]
            .into_iter()
            .map(MaskRequest::not_requested)
            .collect();

        // Water is not a collection 1 condition, but it is never looked up
        let mask = combine(&band, C1.profile(), &requests, fold).unwrap();
        prop_assert!(cells(&mask).iter().all(|&m| m == fold.seed()));
    }

    #[test]
    fn combine_is_order_invariant(
        values in band_strategy(),
        requests in prop::collection::vec(c1_request_strategy(), 0..5),
        inclusive in any::<bool>(),
    ) {
        let band = band_from(&values);
        let fold = FoldMode::from_inclusive(inclusive);
        let forward = combine(&band, C1.profile(), &requests, fold).unwrap();

        let mut reversed = requests.clone();
        reversed.reverse();
        let backward = combine(&band, C1.profile(), &reversed, fold).unwrap();

        prop_assert_eq!(cells(&forward), cells(&backward));
    }

    #[test]
    fn exclusive_combine_matches_all_conditions(
        cloud in 0u16..4,
        shadow in 0u16..4,
        fill in 0u16..2,
        values in band_strategy(),
    ) {
        // Append a pixel built from known bits to random ones
        let synthetic = fill | (cloud << 5) | (shadow << 7);
        let mut all = values.clone();
        all.push(synthetic);
        let band = band_from(&all);

        let requests = [
            MaskRequest::exact(Condition::Fill, ConditionLevel::Value(fill as u8)),
            MaskRequest::exact(Condition::Cloud, ConditionLevel::Value(cloud as u8)),
            MaskRequest::exact(Condition::CloudShadow, ConditionLevel::Value(shadow as u8)),
        ];
        let mask = combine(&band, C1.profile(), &requests, FoldMode::Exclusive).unwrap();
        let got = cells(&mask);

        for (v, m) in all.iter().zip(&got) {
            let expected = (v & 1) == fill
                && ((v >> 5) & 0b11) == cloud
                && ((v >> 7) & 0b11) == shadow;
            prop_assert_eq!(*m == 1, expected);
        }
        prop_assert_eq!(got.last().copied(), Some(1));
    }
}

#[test]
fn scenario_cloud_high_and_fill() {
    // Fill bit plus cloud confidence 3 at bits 5-6
    let band = band_from(&[0b0000_0000_0110_0001, 0b0000_0000_0110_0000, 0b0000_0000_0000_0001]);
    let requests = [
        MaskRequest::exact(Condition::Cloud, Confidence::High),
        MaskRequest::exact(Condition::Fill, true),
    ];

    let mask = combine(&band, C1.profile(), &requests, FoldMode::Exclusive).unwrap();
    assert_eq!(cells(&mask), vec![1, 0, 0]);
}

#[test]
fn scenario_word_0x6011_fields() {
    let band = band_from(&[0b0110_0000_0001_0001]);
    let masker = QaMasker::new(&band, C1);

    assert_eq!(cells(&masker.fill_mask().unwrap()), vec![1]);
    assert_eq!(
        cells(&masker.cloud_mask(ConditionLevel::NotRequested, MatchMode::Exact).unwrap()),
        vec![1]
    );
    assert_eq!(
        cells(&masker.cloud_mask(Confidence::Undefined, MatchMode::Exact).unwrap()),
        vec![1]
    );
}

#[test]
fn scenario_modis_quality() {
    let band = Raster::from_vec(vec![2u16], 1, 1).unwrap();
    let masker = QaMasker::new(&band, Sensor::Modis);

    assert_eq!(cells(&masker.quality_mask(ModisQuality::Medium).unwrap()), vec![0]);
    assert_eq!(cells(&masker.quality_mask(ModisQuality::Low).unwrap()), vec![1]);
}

#[test]
fn scenario_pre_collection_snow_level_rejected() {
    let band: Raster<u16> = Raster::new(3, 3);
    let masker = QaMasker::new(&band, C0);

    let err = masker.snow_mask(Confidence::Low, MatchMode::Exact).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Value);

    let err = masker
        .multi_mask(
            &[MaskRequest::exact(Condition::Snow, Confidence::Medium)],
            FoldMode::Inclusive,
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Value);
}
