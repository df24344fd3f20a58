use chrono::NaiveDate;
use powercast::error::PowercastError;
use powercast::features::{
    build_features, calendar_features, StandardScaler, FEATURE_NAMES, MIN_HISTORY,
};
use powercast::records::ConsumptionRecord;
use pretty_assertions::assert_eq;
use rstest::rstest;

fn series(start: &str, values: &[f64]) -> Vec<ConsumptionRecord> {
    let start: NaiveDate = start.parse().unwrap();
    values
        .iter()
        .enumerate()
        .map(|(i, &consumption)| {
            ConsumptionRecord::new(
                1,
                "heat pump",
                "General",
                start + chrono::Duration::days(i as i64),
                consumption,
            )
        })
        .collect()
}

#[test]
fn lag_complete_rows_only() {
    let values: Vec<f64> = (1..=20).map(f64::from).collect();
    let records = series("2024-01-01", &values);

    let features = build_features(&records).unwrap();

    // The first 7 rows lack lag history and are dropped, not imputed.
    assert_eq!(features.len(), records.len() - 7);

    let first = &features.rows()[0];
    assert_eq!(first.date, "2024-01-08".parse::<NaiveDate>().unwrap());
    assert_eq!(first.prev_day_consumption, 7.0);
    assert_eq!(first.prev_week_consumption, 1.0);
    assert_eq!(first.consumption, 8.0);

    let last = features.rows().last().unwrap();
    assert_eq!(last.prev_day_consumption, 19.0);
    assert_eq!(last.prev_week_consumption, 13.0);
}

#[test]
fn unsorted_input_is_sorted_first() {
    let values: Vec<f64> = (1..=10).map(f64::from).collect();
    let mut records = series("2024-01-01", &values);
    records.reverse();

    let features = build_features(&records).unwrap();

    assert_eq!(features.len(), 3);
    assert_eq!(
        features.rows()[0].date,
        "2024-01-08".parse::<NaiveDate>().unwrap()
    );
    assert_eq!(features.rows()[0].prev_week_consumption, 1.0);
}

#[rstest]
#[case("2024-01-01", 0, false)] // Monday
#[case("2024-01-02", 1, false)]
#[case("2024-01-03", 2, false)]
#[case("2024-01-04", 3, false)]
#[case("2024-01-05", 4, false)]
#[case("2024-01-06", 5, true)] // Saturday
#[case("2024-01-07", 6, true)] // Sunday
fn weekend_flag_covers_all_weekdays(
    #[case] date: &str,
    #[case] expected_day_of_week: u32,
    #[case] expected_weekend: bool,
) {
    let (day_of_week, _, _, is_weekend) = calendar_features(date.parse().unwrap());
    assert_eq!(day_of_week, expected_day_of_week);
    assert_eq!(is_weekend, expected_weekend);
}

#[test]
fn short_series_is_rejected() {
    let records = series("2024-01-01", &[1.0; MIN_HISTORY - 1]);
    let err = build_features(&records).unwrap_err();
    assert!(matches!(err, PowercastError::InsufficientData(_)));
}

#[test]
fn minimum_series_yields_one_row() {
    let values: Vec<f64> = (1..=MIN_HISTORY as u32).map(f64::from).collect();
    let records = series("2024-01-01", &values);
    let features = build_features(&records).unwrap();
    assert_eq!(features.len(), 1);
}

#[test]
fn non_finite_values_take_the_batch_mean() {
    let mut values = vec![10.0; 10];
    values[8] = f64::NAN;
    let records = series("2024-01-01", &values);

    let features = build_features(&records).unwrap();

    let imputed_date: NaiveDate = "2024-01-09".parse().unwrap();
    let row = features
        .rows()
        .iter()
        .find(|r| r.date == imputed_date)
        .unwrap();
    // Mean over the finite values of this batch is 10.0.
    assert_eq!(row.consumption, 10.0);
}

#[test]
fn all_non_finite_batch_is_insufficient() {
    let records = series("2024-01-01", &[f64::NAN; 10]);
    let err = build_features(&records).unwrap_err();
    assert!(matches!(err, PowercastError::InsufficientData(_)));
}

#[test]
fn matrix_matches_feature_order() {
    let values: Vec<f64> = (1..=12).map(f64::from).collect();
    let records = series("2024-01-01", &values);

    let features = build_features(&records).unwrap();
    let matrix = features.matrix();
    let targets = features.targets();

    assert_eq!(matrix.len(), features.len());
    assert_eq!(targets.len(), features.len());
    assert_eq!(matrix[0].len(), FEATURE_NAMES.len());

    // Row 0 is 2024-01-08, a Monday.
    assert_eq!(matrix[0][0], 0.0); // day_of_week
    assert_eq!(matrix[0][1], 1.0); // month
    assert_eq!(matrix[0][2], 8.0); // day_of_month
    assert_eq!(matrix[0][3], 0.0); // is_weekend
    assert_eq!(matrix[0][4], 7.0); // prev_day_consumption
    assert_eq!(matrix[0][5], 1.0); // prev_week_consumption
    assert_eq!(targets[0], 8.0);
}

#[test]
fn scaler_standardizes_and_guards_zero_variance() {
    let matrix = vec![vec![1.0, 5.0], vec![3.0, 5.0]];

    let scaler = StandardScaler::fit(&matrix).unwrap();
    let scaled = scaler.transform(&matrix).unwrap();

    // Column 0: mean 2, population std 1.
    assert_eq!(scaled[0][0], -1.0);
    assert_eq!(scaled[1][0], 1.0);
    // Column 1 has zero variance and maps to 0.0.
    assert_eq!(scaled[0][1], 0.0);
    assert_eq!(scaled[1][1], 0.0);
}

#[test]
fn scaler_rejects_mismatched_rows() {
    let scaler = StandardScaler::fit(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
    let err = scaler.transform_row(&[1.0]).unwrap_err();
    assert!(matches!(err, PowercastError::Validation(_)));
}

#[test]
fn scaler_survives_a_serde_round_trip() {
    let scaler = StandardScaler::fit(&[vec![1.0, 10.0], vec![3.0, 30.0]]).unwrap();

    let json = serde_json::to_string(&scaler).unwrap();
    let restored: StandardScaler = serde_json::from_str(&json).unwrap();

    assert_eq!(restored, scaler);
    assert_eq!(
        restored.transform_row(&[2.0, 20.0]).unwrap(),
        scaler.transform_row(&[2.0, 20.0]).unwrap()
    );
}
