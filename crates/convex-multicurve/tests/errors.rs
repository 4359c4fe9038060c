//! Integration tests: rejected and failing calibrations.

mod common;

use std::sync::Arc;

use convex_multicurve::prelude::*;

use common::*;

fn deposit(tenor: Tenor, rate: f64) -> InstrumentDefinition {
    InstrumentTemplate::Deposit {
        currency: usd(),
        day_count: DayCount::Act360,
    }
    .generate(valuation(), tenor, rate, 1.0)
    .unwrap()
}

fn fixed_nodes(nodes: Vec<f64>) -> Arc<dyn CurveGenerator> {
    Arc::new(GeneratorYieldInterpolated::with_nodes(
        nodes,
        InterpolationMethod::Linear,
    ))
}

fn single_curve(generator: Arc<dyn CurveGenerator>, instruments: Vec<InstrumentDefinition>) -> BlockDefinition {
    BlockDefinition::new(vec![UnitDefinition::new(vec![CurveDefinition::new(
        DSC,
        generator,
        instruments,
    )])])
}

#[test]
fn test_non_square_unit() {
    let block = single_curve(
        fixed_nodes(vec![0.25, 0.5, 1.0]),
        vec![deposit(Tenor::Months(3), 0.05), deposit(Tenor::Months(6), 0.051)],
    );
    let err = calibrate(&repository(CalibrationConfig::default()), &[block]).unwrap_err();
    match err {
        CalibrationError::StructuralConfiguration { reason } => {
            assert!(reason.contains("3 parameters but 2 instruments"), "{reason}");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_forward_reference() {
    let block = BlockDefinition::new(vec![
        UnitDefinition::new(vec![fwd_curve(&IBOR_QUOTES)]),
        UnitDefinition::new(vec![dsc_curve(&OIS_QUOTES)]),
    ]);
    let err = calibrate(&repository(CalibrationConfig::default()), &[block]).unwrap_err();
    match err {
        CalibrationError::StructuralConfiguration { reason } => {
            assert!(reason.contains("forward reference"), "{reason}");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_spread_declared_before_its_base_in_one_unit() {
    let spread: Arc<dyn CurveGenerator> = Arc::new(GeneratorDecorated::with_existing_curve(
        yield_generator(InterpolationMethod::Linear),
        DSC,
    ));
    let block = BlockDefinition::new(vec![UnitDefinition::new(vec![
        CurveDefinition::new(FWD, spread, ibor_definitions(&IBOR_QUOTES)),
        dsc_curve(&OIS_QUOTES),
    ])]);
    let err = calibrate(&repository(CalibrationConfig::default()), &[block]).unwrap_err();
    match err {
        CalibrationError::StructuralConfiguration { reason } => {
            assert!(reason.contains("forward reference"), "{reason}");
            assert!(reason.contains(DSC), "{reason}");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_unknown_curve() {
    let block = BlockDefinition::new(vec![UnitDefinition::new(vec![fwd_curve(&IBOR_QUOTES)])]);
    let err = calibrate(&repository(CalibrationConfig::default()), &[block]).unwrap_err();
    assert!(matches!(err, CalibrationError::StructuralConfiguration { .. }));
    assert!(err.to_string().contains(DSC));
}

#[test]
fn test_curve_already_known() {
    let repository = repository(CalibrationConfig::default());
    let first = calibrate(&repository, &[BlockDefinition::new(vec![UnitDefinition::new(vec![
        dsc_curve(&OIS_QUOTES),
    ])])])
    .unwrap();
    let err = repository
        .make_curves_from_definitions(
            &[BlockDefinition::new(vec![UnitDefinition::new(vec![dsc_curve(&OIS_QUOTES)])])],
            &context(),
            &first.provider,
            &CurveBindings::new(),
            &CalculatorPair::par_spread(),
        )
        .unwrap_err();
    assert!(matches!(err, CalibrationError::StructuralConfiguration { .. }));
}

#[test]
fn test_convergence_failure_names_the_unit() {
    let config = CalibrationConfig::default()
        .with_max_iterations(1)
        .with_function_tolerance(1e-14)
        .with_parameter_tolerance(1e-14);
    let block = BlockDefinition::new(vec![UnitDefinition::new(vec![dsc_curve(&OIS_QUOTES)])]);
    let err = calibrate(&repository(config), &[block]).unwrap_err();
    match err {
        CalibrationError::ConvergenceFailure {
            curves,
            iterations,
            last_iterate,
            ..
        } => {
            assert_eq!(curves, vec![DSC.to_string()]);
            assert_eq!(iterations, 1);
            assert_eq!(last_iterate.len(), OIS_QUOTES.len());
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_singular_system() {
    // Both deposits sit before the first node, so the second node is never read.
    let block = single_curve(
        fixed_nodes(vec![1.0, 2.0]),
        vec![deposit(Tenor::Months(6), 0.05), deposit(Tenor::Months(6), 0.05)],
    );
    let err = calibrate(&repository(CalibrationConfig::default()), &[block]).unwrap_err();
    match err {
        CalibrationError::NumericalSingularity { curves, .. } => {
            assert_eq!(curves, vec![DSC.to_string()]);
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[derive(Debug)]
struct Unsupported;

impl PricingCalculator for Unsupported {
    fn evaluate(
        &self,
        _instrument: &InstrumentDerivative,
        _curves: &MulticurveProvider,
    ) -> CalibrationResult<f64> {
        Err(CalibrationError::instrument_evaluation("unsupported instrument"))
    }
}

impl CurveSensitivityCalculator for Unsupported {
    fn evaluate(
        &self,
        _instrument: &InstrumentDerivative,
        _curves: &MulticurveProvider,
    ) -> CalibrationResult<CurveSensitivity> {
        Err(CalibrationError::instrument_evaluation("unsupported instrument"))
    }
}

#[test]
fn test_calculator_failure_surfaces_unchanged() {
    let unit = UnitDefinition::new(vec![dsc_curve(&OIS_QUOTES)])
        .with_calculators(CalculatorPair::new(Arc::new(Unsupported), Arc::new(Unsupported)));
    let err = calibrate(
        &repository(CalibrationConfig::default()),
        &[BlockDefinition::new(vec![unit])],
    )
    .unwrap_err();
    assert_eq!(
        err,
        CalibrationError::instrument_evaluation("unsupported instrument")
    );
}

#[test]
fn test_missing_binding() {
    let block = BlockDefinition::new(vec![UnitDefinition::new(vec![dsc_curve(&OIS_QUOTES)])]);
    let repository = repository(CalibrationConfig::default());
    let err = repository
        .make_curves_from_definitions(
            &[block],
            &context(),
            &MulticurveProvider::new(),
            &CurveBindings::new(),
            &repository.default_calculators(),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        CalibrationError::StructuralConfiguration { .. } | CalibrationError::CurveNotFound { .. }
    ));
}

#[test]
fn test_invalid_config_json() {
    assert!(CalibrationConfig::from_json(r#"{"max_iterations": 0}"#).is_err());
    assert!(CalibrationConfig::from_json("not json").is_err());
}
