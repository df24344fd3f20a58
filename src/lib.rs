//! # Powercast
//!
//! Core of a household power-consumption tracking service: the time-series
//! feature pipeline and the forecasting model lifecycle. HTTP routing,
//! authentication, and relational persistence live outside this crate and
//! talk to it through [`records::RecordStore`] and the serializable report
//! types.
//!
//! ## Features
//!
//! - Consumption record handling and validated spreadsheet ingest
//!   (all-or-nothing batches)
//! - Feature engineering: calendar features, 1- and 7-day lag features,
//!   batch-mean imputation
//! - Training of two model families (linear regression and a seeded
//!   100-tree random forest) with held-out RMSE/MAE/R² evaluation
//! - Atomic artifact persistence keyed by model type
//! - Recursive multi-step forecasting that feeds prior predictions back
//!   into the lag features
//!
//! ## Quick start
//!
//! ```no_run
//! use powercast::features::build_features;
//! use powercast::forecast::ForecastService;
//! use powercast::models::{ModelType, Trainer};
//! use powercast::records::{InMemoryRecordStore, RecordStore};
//! use powercast::store::ArtifactStore;
//!
//! fn main() -> powercast::Result<()> {
//!     let store = InMemoryRecordStore::new();
//!     // ... upload consumption history into `store` ...
//!     let history = store.list_records(1, None)?;
//!
//!     // Offline: engineer features and train both model families.
//!     let features = build_features(&history)?;
//!     let trainer = Trainer::default();
//!     let artifacts = ArtifactStore::new("artifacts");
//!     for model in trainer.train_all(&features.matrix(), &features.targets())? {
//!         artifacts.save(&model)?;
//!     }
//!
//!     // Online: recursive 7-day forecast.
//!     let service = ForecastService::new(&store, &artifacts);
//!     let report = service.forecast(1, 7, ModelType::Ensemble)?;
//!     println!("{}", serde_json::to_string_pretty(&report)?);
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod features;
pub mod forecast;
pub mod ingest;
pub mod models;
pub mod records;
pub mod store;

// Re-export commonly used types
pub use crate::error::{PowercastError, Result};
pub use crate::features::{build_features, FeatureSet, StandardScaler};
pub use crate::forecast::{ForecastReport, ForecastService};
pub use crate::models::{ModelType, TrainedModel, Trainer};
pub use crate::records::{ConsumptionRecord, InMemoryRecordStore, RecordStore};
pub use crate::store::ArtifactStore;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
