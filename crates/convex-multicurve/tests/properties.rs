//! Property tests over randomly shaped curves.

mod common;

use convex_multicurve::prelude::*;
use proptest::prelude::*;

use common::*;

fn ois_strip(levels: &[f64]) -> Vec<(Tenor, f64)> {
    [Tenor::Days(1), Tenor::Years(1), Tenor::Years(2), Tenor::Years(5)]
        .into_iter()
        .zip(levels.iter().copied())
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_calibrated_curve_reprices(levels in prop::collection::vec(0.005f64..0.08, 4)) {
        let quotes = ois_strip(&levels);
        let block = BlockDefinition::new(vec![UnitDefinition::new(vec![dsc_curve(&quotes)])]);
        let result = calibrate(&repository(CalibrationConfig::default()), &[block]).unwrap();

        let pair = CalculatorPair::par_spread();
        for instrument in derivatives(&dsc_curve(&quotes)) {
            let spread = pair.value().evaluate(&instrument, &result.provider).unwrap();
            prop_assert!(spread.abs() <= 1e-10);
        }
    }

    #[test]
    fn prop_transition_is_inverse_jacobian_for_single_unit(
        levels in prop::collection::vec(0.005f64..0.08, 4),
    ) {
        let quotes = ois_strip(&levels);
        let block = BlockDefinition::new(vec![UnitDefinition::new(vec![dsc_curve(&quotes)])]);
        let result = calibrate(&repository(CalibrationConfig::default()), &[block]).unwrap();
        let entry = result.building_blocks.get(DSC).unwrap();

        // Par spreads move one for one against their quotes, so J * M = I.
        let product = &entry.jacobian * &entry.transition;
        for i in 0..product.nrows() {
            for j in 0..product.ncols() {
                let expected = if i == j { 1.0 } else { 0.0 };
                prop_assert!((product[(i, j)] - expected).abs() < 1e-8);
            }
        }
    }
}
