use approx::assert_relative_eq;
use hydro_math::diff::{difference, seasonal_difference};
use hydro_math::optimize::NelderMead;
use hydro_math::{LinearRegression, MathError, MinMaxScaler, RandomForestRegressor, Regressor};
use rstest::rstest;

fn lag_windows(values: &[f64], lookback: usize) -> (Vec<Vec<f64>>, Vec<f64>) {
    (lookback..values.len())
        .map(|i| (values[i - lookback..i].to_vec(), values[i]))
        .unzip()
}

#[rstest]
#[case(1)]
#[case(3)]
#[case(12)]
fn test_linear_extends_a_ramp(#[case] lookback: usize) {
    let values: Vec<f64> = (0..60).map(|i| 5.0 + 2.0 * i as f64).collect();
    let (x, y) = lag_windows(&values, lookback);

    let mut model = LinearRegression::new();
    model.fit(&x, &y).unwrap();

    let next = model.predict(&[values[60 - lookback..].to_vec()]).unwrap();
    assert_relative_eq!(next[0], 125.0, epsilon = 1e-6);
}

#[test]
fn test_forest_learns_a_threshold() {
    let x: Vec<Vec<f64>> = (0..40).map(|i| vec![i as f64]).collect();
    let y: Vec<f64> = (0..40).map(|i| if i < 20 { 1.0 } else { 9.0 }).collect();

    let mut forest = RandomForestRegressor::new(25).with_random_state(3);
    forest.fit(&x, &y).unwrap();

    let predictions = forest.predict(&[vec![2.0], vec![37.0]]).unwrap();
    assert!(predictions[0] < 2.0);
    assert!(predictions[1] > 8.0);
}

#[test]
fn test_regressors_share_interface() {
    let (x, y) = lag_windows(&[1.0, 2.0, 4.0, 8.0, 16.0, 32.0, 64.0], 2);
    let mut models: Vec<Box<dyn Regressor>> = vec![
        Box::new(LinearRegression::new()),
        Box::new(RandomForestRegressor::new(5).with_random_state(1)),
    ];
    for model in models.iter_mut() {
        model.fit(&x, &y).unwrap();
        assert_eq!(model.predict(&x).unwrap().len(), y.len());
    }
}

#[test]
fn test_fit_validates_shapes() {
    let mut model = LinearRegression::new();
    assert!(matches!(
        model.fit(&[], &[]),
        Err(MathError::InsufficientData(_))
    ));
    assert!(model.fit(&[vec![1.0], vec![2.0]], &[1.0]).is_err());
}

#[test]
fn test_minimizes_coupled_quadratic() {
    let bowl = |p: &[f64]| {
        let (a, b) = (p[0] - 3.0, p[1] + 1.0);
        a * a + 2.0 * b * b + a * b
    };
    let minimum = NelderMead::new(2000)
        .with_tolerance(1e-10)
        .minimize(bowl, &[0.0, 0.0])
        .unwrap();

    assert!(minimum.converged);
    assert_relative_eq!(minimum.point[0], 3.0, epsilon = 1e-4);
    assert_relative_eq!(minimum.point[1], -1.0, epsilon = 1e-4);
}

#[test]
fn test_differencing_removes_trend_and_season() {
    let values: Vec<f64> = (0..48)
        .map(|i| 3.0 * i as f64 + [0.0, 5.0, -2.0, 7.0][i % 4])
        .collect();
    let stationary = difference(&seasonal_difference(&values, 1, 4), 1);

    assert_eq!(stationary.len(), 43);
    assert!(stationary.iter().all(|v| v.abs() < 1e-9));
}

#[test]
fn test_scaler_maps_to_unit_interval() {
    let values = [40.0, 10.0, 25.0];
    let scaler = MinMaxScaler::fit(&values).unwrap();
    assert_eq!(scaler.transform(&values), vec![1.0, 0.0, 0.5]);
    assert_eq!(scaler.inverse_transform(&[0.5]), vec![25.0]);
}
