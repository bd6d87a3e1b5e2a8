use approx::assert_relative_eq;
use hydro_forecast::{
    EngineConfig, ForecastError, ForestConfig, MetricCriterion, ModelComparison, ModelKind,
    TimeSeries,
};
use pretty_assertions::assert_eq;

fn engine() -> ModelComparison {
    let config = EngineConfig::default().with_forest(ForestConfig {
        n_estimators: 15,
        max_depth: 6,
    });
    ModelComparison::new(config).unwrap()
}

fn seasonal(n: usize, level: f64) -> TimeSeries {
    let values = (0..n)
        .map(|i| {
            let t = i as f64;
            level + 3.0 * t + 60.0 * (2.0 * std::f64::consts::PI * t / 12.0).sin()
        })
        .collect();
    TimeSeries::monthly(2008, 1, values).unwrap()
}

#[test]
fn test_compare_produces_a_row_per_model() {
    let mut engine = engine();
    let table = engine
        .compare(&seasonal(120, 1000.0), "Consumo Gasolina regular")
        .unwrap();

    assert_eq!(table.series_name, "Consumo Gasolina regular");
    let models: Vec<ModelKind> = table.rows.iter().map(|r| r.model).collect();
    assert_eq!(models, ModelKind::ALL.to_vec());

    for row in &table.rows {
        assert_relative_eq!(row.test_rmse() * row.test_rmse(), row.test.mse, epsilon = 1e-9);
        assert_relative_eq!(row.train_rmse() * row.train_rmse(), row.train.mse, epsilon = 1e-9);
    }
    assert!(table.best_by(MetricCriterion::LowestTestMae).is_some());
    assert!(engine.is_trained("Consumo Gasolina regular"));
}

#[test]
fn test_unavailable_model_is_omitted() {
    let mut engine = ModelComparison::new(EngineConfig::default().with_lookback(3)).unwrap();
    let table = engine.compare(&seasonal(30, 500.0), "short").unwrap();

    assert_eq!(table.rows.len(), 2);
    assert!(table.row(ModelKind::Sarima).is_none());
    assert!(engine.get_predictions("short", ModelKind::Sarima).is_none());
    assert!(engine.get_outcome("short", ModelKind::Sarima).is_some());
    assert!(engine.get_predictions("short", ModelKind::LinearRegression).is_some());
}

#[test]
fn test_predictions_lookup() {
    let mut engine = engine();
    engine.compare(&seasonal(96, 800.0), "A").unwrap();

    let bundle = engine.get_predictions("A", ModelKind::LinearRegression).unwrap();
    assert_eq!(bundle.train.len(), bundle.y_train.len());
    assert_eq!(bundle.dates.len(), 84);

    assert!(engine.get_predictions("B", ModelKind::LinearRegression).is_none());
    assert!(engine.get_result("B", ModelKind::Sarima).is_none());
}

#[test]
fn test_recompare_overwrites() {
    let mut engine = engine();
    engine.compare(&seasonal(96, 800.0), "A").unwrap();
    engine.compare(&seasonal(96, 2000.0), "A").unwrap();

    let bundle = engine.get_predictions("A", ModelKind::LinearRegression).unwrap();
    assert_eq!(bundle.y_test, seasonal(96, 2000.0).values()[96 - 17..].to_vec());
    assert_eq!(engine.trained_series(), vec!["A"]);
}

#[test]
fn test_input_error_leaves_registry_unchanged() {
    let mut engine = engine();
    engine.compare(&seasonal(96, 800.0), "A").unwrap();
    let before = engine.get_result("A", ModelKind::RandomForest).cloned();

    let too_short = seasonal(10, 100.0);
    assert!(matches!(
        engine.compare(&too_short, "A"),
        Err(ForecastError::InsufficientData { .. })
    ));
    assert!(engine.compare(&too_short, "B").is_err());

    assert_eq!(engine.get_result("A", ModelKind::RandomForest).cloned(), before);
    assert!(!engine.is_trained("B"));
}
