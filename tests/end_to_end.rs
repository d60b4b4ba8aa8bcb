use approx::assert_relative_eq;

use reg_diagnostics::data::generate_linear_sample;
use reg_diagnostics::domain::{Dataset, DiagOptions, ModelSpec, SampleConfig};
use reg_diagnostics::{analyze, run_with_writer, DiagError};

fn sample() -> Dataset {
    generate_linear_sample(&SampleConfig::default()).unwrap()
}

fn capture(dataset: &Dataset, features: &[&str]) -> (reg_diagnostics::RunOutput, String) {
    let spec = ModelSpec::new("y", features).unwrap();
    let mut buf = Vec::new();
    let run = run_with_writer(dataset, &spec, &DiagOptions::default(), &mut buf).unwrap();
    (run, String::from_utf8(buf).unwrap())
}

fn assert_probability(p: f64) {
    assert!((0.0..=1.0).contains(&p), "p-value out of range: {p}");
}

#[test]
fn two_feature_scenario_prints_every_block() {
    let (run, text) = capture(&sample(), &["x1", "x2"]);

    let x1 = run.model.coefficient("x1").unwrap();
    let x2 = run.model.coefficient("x2").unwrap();
    assert!((x1 - 2.0).abs() < 0.5, "x1 = {x1}");
    assert!((x2 - 3.0).abs() < 0.5, "x2 = {x2}");
    assert!(text.contains("Formula: y ~ x1 + x2"));

    let vif = run.report.vif.as_ref().unwrap();
    assert_eq!(vif.iter().map(|v| v.feature.as_str()).collect::<Vec<_>>(), ["x1", "x2"]);
    assert!(vif.iter().all(|v| v.vif >= 1.0));
    let independence = &text[text.find("Independence").unwrap()..text.find("Homoscedasticity").unwrap()];
    let rows: Vec<&str> = independence.lines().filter(|l| l.trim_end().ends_with(['1', '2'])).collect();
    assert_eq!(rows.len(), 2);
    assert!(rows[0].trim_end().ends_with("x1"), "{independence}");

    assert_probability(run.report.rainbow.p_value);
    assert_probability(run.report.breusch_pagan.lm_p_value);
    assert_probability(run.report.breusch_pagan.f_p_value);
    assert!(text.contains("Rainbow p-value:"));
    assert!(text.contains("Lagrange Multiplier p-value:"));
    assert!(text.contains("F-statistic p-value:"));

    // One plot, drawn after the checks.
    assert_eq!(text.matches("x: Predicted Sale Price").count(), 1);
}

#[test]
fn single_feature_has_no_independence_section() {
    let (run, text) = capture(&sample(), &["x1"]);
    assert!(run.report.vif.is_none());
    assert!(!text.contains("Independence"));
    assert!(!text.contains("VIF"));
    assert!(text.contains("Formula: y ~ x1"));
}

#[test]
fn feature_order_does_not_change_the_fit() {
    let data = sample();
    let a = analyze(&data, &ModelSpec::new("y", &["x1", "x2"]).unwrap(), &DiagOptions::default()).unwrap();
    let b = analyze(&data, &ModelSpec::new("y", &["x2", "x1"]).unwrap(), &DiagOptions::default()).unwrap();

    assert_relative_eq!(a.model.stats.r_squared, b.model.stats.r_squared, epsilon = 1e-10);
    for (p, q) in a.residuals.iter().zip(&b.residuals) {
        assert_relative_eq!(p.predicted, q.predicted, epsilon = 1e-8);
    }

    let order: Vec<_> = b.report.vif.unwrap().into_iter().map(|v| v.feature).collect();
    assert_eq!(order, ["x2", "x1"]);
}

#[test]
fn residuals_are_predicted_minus_actual() {
    let run = analyze(&sample(), &ModelSpec::new("y", &["x1", "x2"]).unwrap(), &DiagOptions::default()).unwrap();
    let errors = run.model.prediction_errors();
    for (i, p) in run.residuals.iter().enumerate() {
        assert_relative_eq!(p.residual, p.predicted - p.actual, epsilon = 1e-12);
        assert_relative_eq!(p.residual, errors[i], epsilon = 1e-12);
    }
}

#[test]
fn input_errors_surface_as_typed_errors() {
    let data = sample();

    let missing = analyze(&data, &ModelSpec::new("y", &["x1", "price"]).unwrap(), &DiagOptions::default());
    assert!(matches!(missing, Err(DiagError::MissingColumn { ref name }) if name == "price"));

    assert!(matches!(ModelSpec::new("y", &[] as &[&str]), Err(DiagError::EmptyFeatures)));
    assert!(matches!(reg_diagnostics::run(&data, "y", &[] as &[&str]), Err(DiagError::EmptyFeatures)));
}

#[test]
fn collinear_features_are_singular() {
    let x1: Vec<f64> = (0..30).map(|i| i as f64).collect();
    let x2: Vec<f64> = x1.iter().map(|v| 2.0 * v + 1.0).collect();
    let y: Vec<f64> = x1.iter().map(|v| v + (v * 0.9).sin()).collect();
    let data = Dataset::from_columns([("y", y), ("x1", x1), ("x2", x2)]).unwrap();

    let err = analyze(&data, &ModelSpec::new("y", &["x1", "x2"]).unwrap(), &DiagOptions::default()).unwrap_err();
    assert!(matches!(err, DiagError::SingularMatrix { .. }), "{err}");
    assert_eq!(err.exit_code(), 4);
}

#[test]
fn rows_with_missing_cells_are_dropped_and_counted() {
    let mut y: Vec<f64> = (0..40).map(|i| 1.0 + 0.5 * i as f64 + ((i * 7 % 5) as f64 - 2.0) * 0.3).collect();
    let x: Vec<f64> = (0..40).map(|i| i as f64).collect();
    y[3] = f64::NAN;
    y[17] = f64::NAN;
    let data = Dataset::from_columns([("y", y), ("x", x)]).unwrap();

    let run = analyze(&data, &ModelSpec::new("y", &["x"]).unwrap(), &DiagOptions::default()).unwrap();
    assert_eq!(run.rows_dropped, 2);
    assert_eq!(run.model.stats.n_obs, 38);
    assert!(run.residuals.iter().all(|p| p.row != 3 && p.row != 17));
}

#[test]
fn dummy_feature_constant_over_the_center_still_gets_every_check() {
    let x: Vec<f64> = (0..100).map(|i| i as f64 / 10.0).collect();
    let d: Vec<f64> = (0..100).map(|i| if i < 20 || i >= 80 { 1.0 } else { 0.0 }).collect();
    let y: Vec<f64> = (0..100)
        .map(|i| 1.0 + 2.0 * x[i] + 3.0 * d[i] + ((i as f64) * 1.7).sin() * 0.3)
        .collect();
    let data = Dataset::from_columns([("y", y), ("x", x), ("d", d)]).unwrap();

    let spec = ModelSpec::new("y", &["x", "d"]).unwrap();
    let mut buf = Vec::new();
    let run = run_with_writer(&data, &spec, &DiagOptions::default(), &mut buf).unwrap();
    let text = String::from_utf8(buf).unwrap();

    assert_eq!(run.report.rainbow.df_denom, 48);
    assert_probability(run.report.rainbow.p_value);
    assert!(text.contains("Rainbow p-value:"));
    assert!(text.contains("Independence"));
    assert!(text.contains("Lagrange Multiplier p-value:"));
}
