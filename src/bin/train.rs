//! Offline training entrypoint.
//!
//! Trains both model families on a consumption CSV (or a generated synthetic
//! series when no file is given) and commits artifacts for the forecast
//! service. Runs decoupled from request serving; families are fitted one at
//! a time so a run can be interrupted between fits without losing the
//! previously committed artifacts.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use powercast::features::build_features;
use powercast::ingest::parse_consumption_csv;
use powercast::models::Trainer;
use powercast::records::{ConsumptionRecord, DEFAULT_CATEGORY};
use powercast::store::ArtifactStore;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use std::{env, fs::File};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("powercast=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    init_tracing();

    let args: Vec<String> = env::args().collect();
    let artifacts_dir =
        env::var("POWERCAST_ARTIFACTS").unwrap_or_else(|_| "artifacts".to_string());

    let records = match args.get(1) {
        Some(path) => {
            info!(path = %path, "loading consumption data");
            let file = File::open(path).with_context(|| format!("opening {}", path))?;
            parse_consumption_csv(file, 0).context("parsing consumption CSV")?
        }
        None => {
            info!("no data file given, generating synthetic training series");
            synthetic_series()
        }
    };

    let features = build_features(&records)?;
    let (matrix, targets) = (features.matrix(), features.targets());
    info!(records = records.len(), rows = matrix.len(), "engineered features");

    let trainer = Trainer::default();
    let store = ArtifactStore::new(&artifacts_dir);
    for model in trainer.train_all(&matrix, &targets)? {
        println!("{}:\n{}", model.model_type, model.metrics);
        store.save(&model)?;
    }

    info!(dir = %artifacts_dir, "artifacts committed");
    Ok(())
}

/// Two years of daily data with a seasonal swing, matching the shape of the
/// demo series the service was originally trained on.
fn synthetic_series() -> Vec<ConsumptionRecord> {
    let mut rng = StdRng::seed_from_u64(42);
    let noise = Normal::new(50.0, 15.0).expect("valid distribution parameters");
    let start = NaiveDate::from_ymd_opt(2023, 1, 1).expect("valid date");

    (0..730)
        .map(|day| {
            let seasonal = (day as f64 * 2.0 * std::f64::consts::PI / 365.0).sin() * 10.0;
            let consumption: f64 = noise.sample(&mut rng) + seasonal;
            ConsumptionRecord::new(
                0,
                "household",
                DEFAULT_CATEGORY,
                start + chrono::Duration::days(day),
                consumption.max(0.0),
            )
        })
        .collect()
}
