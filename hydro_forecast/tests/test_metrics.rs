use approx::assert_relative_eq;
use hydro_forecast::metrics::{
    compute_metrics, mean_absolute_error, mean_squared_error, r2_score, root_mean_squared_error,
};
use hydro_forecast::ForecastError;
use rstest::rstest;

#[test]
fn test_worked_example() {
    let actual = [10.0, 12.0, 14.0, 16.0, 18.0];
    let predicted = [11.0, 12.0, 13.0, 19.0, 14.0];

    let metrics = compute_metrics(&actual, &predicted).unwrap();
    assert_relative_eq!(metrics.mae, 1.8, epsilon = 1e-12);
    assert_relative_eq!(metrics.mse, 5.4, epsilon = 1e-12);
    assert_relative_eq!(metrics.r2, 1.0 - 27.0 / 40.0, epsilon = 1e-12);
    assert!(!metrics.r2_degenerate);
    assert_relative_eq!(metrics.rmse(), 5.4_f64.sqrt(), epsilon = 1e-12);
}

#[rstest]
#[case(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0], 0.0)]
#[case(&[1.0, 2.0, 3.0], &[2.0, 3.0, 4.0], 1.0)]
#[case(&[0.0, 0.0], &[3.0, -3.0], 3.0)]
fn test_mae(#[case] actual: &[f64], #[case] predicted: &[f64], #[case] expected: f64) {
    assert_relative_eq!(mean_absolute_error(actual, predicted).unwrap(), expected);
}

#[test]
fn test_rmse_is_root_of_mse() {
    let actual = [3.0, -0.5, 2.0, 7.0];
    let predicted = [2.5, 0.0, 2.0, 8.0];
    let mse = mean_squared_error(&actual, &predicted).unwrap();
    let rmse = root_mean_squared_error(&actual, &predicted).unwrap();
    assert_relative_eq!(mse, 0.375);
    assert_relative_eq!(rmse * rmse, mse, epsilon = 1e-12);
}

#[test]
fn test_r2_can_be_negative() {
    let (r2, degenerate) = r2_score(&[1.0, 2.0, 3.0], &[3.0, 2.0, 1.0]).unwrap();
    assert_relative_eq!(r2, -3.0);
    assert!(!degenerate);
}

#[test]
fn test_constant_actuals_are_flagged() {
    let (exact, degenerate) = r2_score(&[5.0, 5.0, 5.0], &[5.0, 5.0, 5.0]).unwrap();
    assert_eq!(exact, 1.0);
    assert!(degenerate);

    let (missed, degenerate) = r2_score(&[5.0, 5.0, 5.0], &[4.0, 5.0, 6.0]).unwrap();
    assert_eq!(missed, 0.0);
    assert!(degenerate);
}

#[test]
fn test_invalid_inputs() {
    assert!(matches!(
        mean_absolute_error(&[], &[]),
        Err(ForecastError::ValidationError(_))
    ));
    assert!(matches!(
        compute_metrics(&[1.0, 2.0], &[1.0]),
        Err(ForecastError::ValidationError(_))
    ));
}
