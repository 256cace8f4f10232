mod common;

use approx::assert_relative_eq;
use aq_forecast::error::ForecastError;
use aq_forecast::export::write_features_csv;
use aq_forecast::schema::FEATURE_COLUMNS;
use aq_forecast::ForecastPipeline;
use common::{daily_csv, model_file, nth_day, pm25_values, roll7_model_json};
use pretty_assertions::assert_eq;

#[test]
fn test_bootstrap_end_to_end() {
    let data = daily_csv(25);
    let model = model_file(&roll7_model_json(0.5));

    let service = ForecastPipeline::bootstrap(data.path(), model.path()).unwrap();
    assert_eq!(service.model_name(), "roll7-echo");

    let values = pm25_values(25);
    let forecast = service.forecast_str("2021-01-25").unwrap();
    let expected = 0.5 + values[18..25].iter().sum::<f64>() / 7.0;
    assert_relative_eq!(forecast.pm25, expected, epsilon = 1e-9);
}

#[test]
fn test_bootstrap_rejects_short_history() {
    let data = daily_csv(13);
    let model = model_file(&roll7_model_json(0.0));

    match ForecastPipeline::bootstrap(data.path(), model.path()) {
        Err(ForecastError::DataLoad(msg)) => assert!(msg.contains("at least 14")),
        other => panic!("Expected DataLoad error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_bootstrap_rejects_incompatible_model() {
    let data = daily_csv(20);
    let json = roll7_model_json(0.0).replace("aq-daily-v1", "aq-daily-v2");
    let model = model_file(&json);

    let err = ForecastPipeline::bootstrap(data.path(), model.path()).unwrap_err();
    assert!(matches!(err, ForecastError::ModelLoad(_)));
}

#[test]
fn test_bootstrap_rejects_missing_data_file() {
    let model = model_file(&roll7_model_json(0.0));

    let err = ForecastPipeline::bootstrap("missing/agrimonia_daily.csv", model.path()).unwrap_err();
    assert!(matches!(err, ForecastError::DataLoad(_)));
}

#[test]
fn test_feature_export_matches_schema() {
    let data = daily_csv(16);
    let index = ForecastPipeline::index_from_path(data.path()).unwrap();

    let mut buffer = Vec::new();
    write_features_csv(&index, &mut buffer).unwrap();
    let text = String::from_utf8(buffer).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    let expected_header = format!("date,{}", FEATURE_COLUMNS.join(","));
    assert_eq!(lines[0], expected_header);
    assert_eq!(lines.len(), 1 + 3);

    let first: Vec<&str> = lines[1].split(',').collect();
    assert_eq!(first.len(), 1 + FEATURE_COLUMNS.len());
    assert_eq!(first[0], nth_day(13).to_string());
    // dayofyear, month, weekday of 2021-01-14
    assert_eq!(&first[10..13], &["14", "1", "3"]);
}
