use chrono::NaiveDate;
use hydro_forecast::data::{DataKind, Product, SeriesName};
use hydro_forecast::{DataLoader, ForecastError, HydrocarbonDataset};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const HEADER: &str = "Fecha,Gasolina regular,Gasolina superior,Diesel alto azufre";

fn write_table(dir: &Path, file: &str, rows: &[&str]) {
    let mut text = String::from(HEADER);
    for row in rows {
        text.push('\n');
        text.push_str(row);
    }
    text.push('\n');
    fs::write(dir.join(file), text).unwrap();
}

fn date(y: i32, m: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, 1).unwrap()
}

fn dataset_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    write_table(
        dir.path(),
        "importacion.csv",
        &[
            "2020-02-01,210.5,110.0,320.0",
            "2020-01-01,200.0,100.0,300.0",
            "2020-03-01,,120.0,330.0",
            "2020-04-01,230.0,130.0,340.0",
        ],
    );
    write_table(
        dir.path(),
        "consumo.csv",
        &[
            "2019-12-01,150.0,90.0,250.0",
            "2020-01-01,160.0,95.0,260.0",
            "2020-02-01,170.0,99.0,270.0",
        ],
    );
    dir
}

#[test]
fn test_from_csv_drops_incomplete_rows() {
    let dir = dataset_dir();
    let table = DataLoader::from_csv(dir.path().join("importacion.csv"), DataKind::Importacion).unwrap();

    assert_eq!(table.len(), 3);
    assert_eq!(table.dates(), &[date(2020, 1), date(2020, 2), date(2020, 4)]);

    let regular = table.series(Product::GasolinaRegular).unwrap();
    assert_eq!(regular.values(), &[200.0, 210.5, 230.0]);
    assert!(!regular.has_missing());
}

#[test]
fn test_dataset_series_and_range() {
    let dir = dataset_dir();
    let dataset = HydrocarbonDataset::load(dir.path()).unwrap();

    let name = SeriesName::new(DataKind::Consumo, Product::DieselAltoAzufre);
    let diesel = dataset.series(&name).unwrap();
    assert_eq!(diesel.values(), &[250.0, 260.0, 270.0]);

    let combined = dataset.combined().unwrap();
    assert_eq!(combined.len(), 6);
    assert!(combined.contains_key("Importación Gasolina superior"));
    assert_eq!(combined["Consumo Gasolina regular"].len(), 3);

    assert_eq!(dataset.date_range(), Some((date(2019, 12), date(2020, 4))));
}

#[test]
fn test_missing_file() {
    let dir = TempDir::new().unwrap();
    assert!(matches!(
        HydrocarbonDataset::load(dir.path()),
        Err(ForecastError::IoError(_))
    ));
}

#[test]
fn test_missing_date_column() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("consumo.csv"),
        "Mes,Gasolina regular,Gasolina superior,Diesel alto azufre\n2020-01-01,1,2,3\n",
    )
    .unwrap();
    assert!(matches!(
        DataLoader::from_csv(dir.path().join("consumo.csv"), DataKind::Consumo),
        Err(ForecastError::DataError(_))
    ));
}
