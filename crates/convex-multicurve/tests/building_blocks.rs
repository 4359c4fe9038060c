//! Integration tests: building block matrices and market quote risk.

mod common;

use approx::assert_relative_eq;
use convex_multicurve::calculators::ParSpreadMarketQuoteCurveSensitivityCalculator;
use convex_multicurve::prelude::*;

use common::*;

const BUMP: f64 = 1e-6;

fn calibrated(ois: &[(Tenor, f64)], ibor: &[(Tenor, f64)]) -> CalibratedCurves {
    calibrate(&repository(tight_config()), &[sequential_block(ois, ibor)]).unwrap()
}

/// Quotes with the `k`-th one (OIS first, then IBOR) shifted by `shift`.
fn shifted(k: usize, shift: f64) -> (Vec<(Tenor, f64)>, Vec<(Tenor, f64)>) {
    let mut ois = OIS_QUOTES.to_vec();
    let mut ibor = IBOR_QUOTES.to_vec();
    if k < ois.len() {
        ois[k].1 += shift;
    } else {
        ibor[k - ois.len()].1 += shift;
    }
    (ois, ibor)
}

fn parameters(result: &CalibratedCurves, curve: &str) -> Vec<f64> {
    result.provider.curve(curve).unwrap().y_data().to_vec()
}

#[test]
fn test_layouts() {
    let result = calibrated(&OIS_QUOTES, &IBOR_QUOTES);
    let dsc = result.building_blocks.get(DSC).unwrap();
    let fwd = result.building_blocks.get(FWD).unwrap();

    assert_eq!(dsc.columns.curve_names(), vec![DSC]);
    assert_eq!(dsc.transition.shape(), (5, 5));
    assert_eq!(fwd.columns.curve_names(), vec![DSC, FWD]);
    assert_eq!(fwd.columns.start(FWD), Some(5));
    assert_eq!(fwd.rows.curve_names(), vec![FWD]);
    assert_eq!(fwd.transition.shape(), (4, 9));
    assert_eq!(fwd.jacobian.shape(), (4, 4));
}

#[test]
fn test_transition_matches_finite_differences() {
    let result = calibrated(&OIS_QUOTES, &IBOR_QUOTES);
    let dsc = result.building_blocks.get(DSC).unwrap();
    let fwd = result.building_blocks.get(FWD).unwrap();

    for k in 0..OIS_QUOTES.len() + IBOR_QUOTES.len() {
        let (ois_up, ibor_up) = shifted(k, BUMP);
        let (ois_down, ibor_down) = shifted(k, -BUMP);
        let up = calibrated(&ois_up, &ibor_up);
        let down = calibrated(&ois_down, &ibor_down);

        for (curve, entry) in [(FWD, fwd), (DSC, dsc)] {
            if k >= entry.columns.total() {
                continue;
            }
            let rows = entry.curve_rows(curve).unwrap();
            let p_up = parameters(&up, curve);
            let p_down = parameters(&down, curve);
            for (i, (a, b)) in p_up.iter().zip(&p_down).enumerate() {
                let fd = (a - b) / (2.0 * BUMP);
                assert_relative_eq!(rows[(i, k)], fd, epsilon = 1e-6, max_relative = 1e-4);
            }
        }
        // The discounting curve does not move with the forward quotes.
        if k >= OIS_QUOTES.len() {
            assert_eq!(parameters(&up, DSC), parameters(&result, DSC));
        }
    }
}

#[test]
fn test_own_quote_sensitivity_is_unit_vector() {
    let result = calibrated(&OIS_QUOTES, &IBOR_QUOTES);
    let instruments = derivatives(&fwd_curve(&IBOR_QUOTES));
    let calculator = MarketQuoteSensitivityCalculator::new();

    for (j, instrument) in instruments.iter().enumerate() {
        let mqs = calculator
            .calculate(
                instrument,
                &result.provider,
                &ParSpreadMarketQuoteCurveSensitivityCalculator,
                &result.building_blocks,
            )
            .unwrap();
        let on_fwd = mqs.get(FWD).unwrap();
        for (k, value) in on_fwd.iter().enumerate() {
            let expected = if k == j { 1.0 } else { 0.0 };
            assert_relative_eq!(*value, expected, epsilon = 1e-8);
        }
        // The forward swaps are priced off both curves, but the discounting
        // quotes only move them through the forward curve's recalibration.
        for value in mqs.get(DSC).unwrap().iter() {
            assert_relative_eq!(*value, 0.0, epsilon = 1e-8);
        }
    }
}

#[test]
fn test_parameter_sensitivity_is_reported_per_curve() {
    let result = calibrated(&OIS_QUOTES, &IBOR_QUOTES);
    let swap = &derivatives(&fwd_curve(&IBOR_QUOTES))[2];
    let parameters = ParameterSensitivityCalculator::new(&ParSpreadMarketQuoteCurveSensitivityCalculator)
        .calculate(swap, &result.provider, &result.building_blocks)
        .unwrap();
    assert_eq!(parameters.curve_names(), vec![DSC, FWD]);
    assert_eq!(parameters.get(FWD).unwrap().len(), IBOR_QUOTES.len());
    assert_eq!(parameters.get(DSC).unwrap().len(), OIS_QUOTES.len());
}

#[test]
fn test_objectives_share_transition() {
    let blocks = [sequential_block(&OIS_QUOTES, &IBOR_QUOTES)];
    let by_spread = calibrate(&repository(tight_config()), &blocks).unwrap();
    let by_value = calibrate(
        &repository(tight_config().with_objective(CalibrationObjective::PresentValue)),
        &blocks,
    )
    .unwrap();
    for name in [DSC, FWD] {
        let a = &by_spread.building_blocks.get(name).unwrap().transition;
        let b = &by_value.building_blocks.get(name).unwrap().transition;
        assert_eq!(a.shape(), b.shape());
        for (x, y) in a.iter().zip(b.iter()) {
            assert_relative_eq!(*x, *y, epsilon = 1e-7, max_relative = 1e-6);
        }
    }
}

#[test]
fn test_joint_and_sequential_forward_rows_agree() {
    let joint = calibrate(
        &repository(tight_config()),
        &[joint_block(&OIS_QUOTES, &IBOR_QUOTES)],
    )
    .unwrap();
    let sequential = calibrated(&OIS_QUOTES, &IBOR_QUOTES);

    let a = joint.building_blocks.get(FWD).unwrap().curve_rows(FWD).unwrap();
    let b = sequential.building_blocks.get(FWD).unwrap().curve_rows(FWD).unwrap();
    assert_eq!(a.shape(), b.shape());
    for (x, y) in a.iter().zip(b.iter()) {
        assert_relative_eq!(*x, *y, epsilon = 1e-7);
    }
}
