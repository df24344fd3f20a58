use chrono::NaiveDate;
use powercast::error::PowercastError;
use powercast::features::build_features;
use powercast::models::{metrics, ModelType, Trainer, TrainerConfig};
use powercast::records::ConsumptionRecord;
use pretty_assertions::assert_eq;

fn series(days: usize, value_for_day: impl Fn(usize) -> f64) -> Vec<ConsumptionRecord> {
    let start: NaiveDate = "2024-01-01".parse().unwrap();
    (0..days)
        .map(|i| {
            ConsumptionRecord::new(
                1,
                "household",
                "General",
                start + chrono::Duration::days(i as i64),
                value_for_day(i),
            )
        })
        .collect()
}

/// 60 days with a weekly shape: higher on weekends, small mid-week ripple.
fn training_data() -> (Vec<Vec<f64>>, Vec<f64>) {
    let records = series(60, |i| {
        let weekend_bump = if i % 7 >= 5 { 8.0 } else { 0.0 };
        20.0 + weekend_bump + (i % 5) as f64
    });
    let features = build_features(&records).unwrap();
    (features.matrix(), features.targets())
}

#[test]
fn training_is_deterministic() {
    let (matrix, targets) = training_data();
    let trainer = Trainer::default();

    for model_type in ModelType::ALL {
        let first = trainer.train(model_type, &matrix, &targets).unwrap();
        let second = trainer.train(model_type, &matrix, &targets).unwrap();

        assert_eq!(first.metrics.rmse.to_bits(), second.metrics.rmse.to_bits());
        assert_eq!(first.metrics.mae.to_bits(), second.metrics.mae.to_bits());
        assert_eq!(first.metrics.r2.to_bits(), second.metrics.r2.to_bits());
    }
}

#[test]
fn empty_matrix_is_a_training_error() {
    let trainer = Trainer::default();
    let err = trainer.train(ModelType::Linear, &[], &[]).unwrap_err();
    assert!(matches!(err, PowercastError::Training(_)));
}

#[test]
fn non_finite_training_data_is_rejected() {
    let (mut matrix, targets) = training_data();
    matrix[3][4] = f64::INFINITY;

    let trainer = Trainer::default();
    let err = trainer
        .train(ModelType::Linear, &matrix, &targets)
        .unwrap_err();
    assert!(matches!(err, PowercastError::Training(_)));

    let (matrix, mut targets) = training_data();
    targets[0] = f64::NAN;
    let err = trainer
        .train(ModelType::Ensemble, &matrix, &targets)
        .unwrap_err();
    assert!(matches!(err, PowercastError::Training(_)));
}

#[test]
fn linear_model_recovers_a_constant_series() {
    let records = series(30, |_| 10.0);
    let features = build_features(&records).unwrap();

    let model = Trainer::default()
        .train(ModelType::Linear, &features.matrix(), &features.targets())
        .unwrap();

    let prediction = model.predict_row(&features.matrix()[0]).unwrap();
    assert!((prediction - 10.0).abs() < 1e-6);
    assert!(model.metrics.mae < 1e-6);
}

#[test]
fn ensemble_model_stays_near_the_series_level() {
    let records = series(30, |_| 10.0);
    let features = build_features(&records).unwrap();

    let model = Trainer::default()
        .train(ModelType::Ensemble, &features.matrix(), &features.targets())
        .unwrap();

    let prediction = model.predict_row(&features.matrix()[0]).unwrap();
    assert!((prediction - 10.0).abs() < 0.5);
}

#[test]
fn forest_size_is_configurable() {
    let (matrix, targets) = training_data();
    let trainer = Trainer::new(TrainerConfig {
        n_trees: 10,
        ..TrainerConfig::default()
    });

    let model = trainer
        .train(ModelType::Ensemble, &matrix, &targets)
        .unwrap();

    // A 10-tree forest still fits and predicts in range.
    let prediction = model.predict_row(&matrix[0]).unwrap();
    assert!(prediction > 15.0 && prediction < 35.0);
}

#[test]
fn trained_model_records_its_provenance() {
    let (matrix, targets) = training_data();
    let model = Trainer::default()
        .train(ModelType::Ensemble, &matrix, &targets)
        .unwrap();

    assert_eq!(model.model_type, ModelType::Ensemble);
    // 20% holdout of 53 rows rounds to 11 test rows.
    assert_eq!(model.training_samples, matrix.len() - 11);
}

#[test]
fn metrics_match_hand_computed_values() {
    let m = metrics::evaluate(&[1.0, 2.0, 3.0], &[2.0, 4.0, 3.0]).unwrap();

    assert!((m.mae - 1.0).abs() < 1e-12);
    assert!((m.rmse - (5.0f64 / 3.0).sqrt()).abs() < 1e-12);
    // ss_tot = 2, ss_res = 5
    assert!((m.r2 - (1.0 - 5.0 / 2.0)).abs() < 1e-12);
}

#[test]
fn constant_actuals_give_zero_r2() {
    let m = metrics::evaluate(&[1.0, 2.0, 3.0], &[2.0, 2.0, 2.0]).unwrap();
    assert_eq!(m.r2, 0.0);
}

#[test]
fn mismatched_metric_inputs_are_rejected() {
    let err = metrics::evaluate(&[1.0], &[1.0, 2.0]).unwrap_err();
    assert!(matches!(err, PowercastError::Validation(_)));

    let err = metrics::evaluate(&[], &[]).unwrap_err();
    assert!(matches!(err, PowercastError::Validation(_)));
}

#[test]
fn model_type_parses_known_tags() {
    assert_eq!("linear".parse::<ModelType>().unwrap(), ModelType::Linear);
    assert_eq!("ENSEMBLE".parse::<ModelType>().unwrap(), ModelType::Ensemble);
    assert!("xgboost".parse::<ModelType>().is_err());

    assert_eq!(ModelType::Linear.to_string(), "linear");
    assert_eq!(ModelType::Ensemble.to_string(), "ensemble");
}
