// Compares the three model families on the hydrocarbon series.
//
// With a directory argument holding importacion.csv and consumo.csv the real
// tables are used; otherwise a synthetic seasonal series is generated.
//
//     RUST_LOG=hydro_forecast=debug cargo run --example compare_models -- data/
use hydrocarbon_dashboard::forecast::comparison::MetricCriterion;
use hydrocarbon_dashboard::forecast::summary::describe;
use hydrocarbon_dashboard::{EngineConfig, HydrocarbonDataset, ModelComparison, ModelKind, TimeSeries};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "hydro_forecast=info".into()),
        )
        .init();

    let mut engine = ModelComparison::new(EngineConfig::default())?;

    match std::env::args().nth(1) {
        Some(dir) => {
            let dataset = HydrocarbonDataset::load(&dir)?;
            if let Some((first, last)) = dataset.date_range() {
                println!("Data from {} to {}\n", first, last);
            }
            for (name, table) in engine.compare_dataset(&dataset)? {
                println!("{}", table);
                if let Some(best) = table.best_by(MetricCriterion::LowestTestMae) {
                    println!("Best on {}: {}\n", name, best.model);
                }
            }
        }
        None => {
            let series = synthetic_series()?;
            let stats = describe(&series)?;
            println!(
                "Synthetic series: {} months, mean {:.1}, CV {:.1}%\n",
                stats.count, stats.mean, stats.cv_percent
            );

            let name = "Consumo Gasolina regular";
            let table = engine.compare(&series, name)?;
            println!("{}", table);
            println!("{}", table.to_dataframe()?);

            if let Some(bundle) = engine.get_predictions(name, ModelKind::Sarima) {
                println!("SARIMA test forecasts:");
                for ((date, actual), predicted) in bundle
                    .test_dates()
                    .iter()
                    .zip(&bundle.y_test)
                    .zip(&bundle.test)
                    .take(6)
                {
                    println!("  {}  actual {:>9.1}  predicted {:>9.1}", date, actual, predicted);
                }
            }
        }
    }

    Ok(())
}

fn synthetic_series() -> Result<TimeSeries, Box<dyn std::error::Error>> {
    let mut rng = StdRng::seed_from_u64(7);
    let noise = Normal::new(0.0, 25.0)?;
    let values = (0..156)
        .map(|i| {
            let t = i as f64;
            let season = 180.0 * (2.0 * std::f64::consts::PI * t / 12.0).sin();
            3200.0 + 9.0 * t + season + noise.sample(&mut rng)
        })
        .collect();
    Ok(TimeSeries::monthly(2012, 1, values)?)
}
