//! Vehicle service log with periodic-maintenance forecasting.
//!
//! # Examples
//!
//! Logging work and projecting the next service with
//! [`core::record::VehicleRecord`]:
//! ```
//! use chrono::NaiveDate;
//! use servint::{core::record::VehicleRecord, operation::Operation, types::Span};
//!
//! let produced = NaiveDate::from_ymd_opt(2006, 11, 30).unwrap();
//! let mut car = VehicleRecord::new("Sedan", produced);
//!
//! let oil = Operation::new("Oil change", 10_000.0, Span::from_years(1.0).unwrap()).unwrap();
//! let done = oil
//!     .complete(98_042.0, NaiveDate::from_ymd_opt(2015, 12, 5).unwrap(), "Price: 4000 RUR")
//!     .unwrap();
//! car.add_operation_to_log(done).expect("log");
//!
//! let plan = car.make_maintenance_plan(None, false).expect("plan");
//! assert_eq!(plan[0].done_at_km(), Some(108_042.0));
//! assert_eq!(plan[0].done_on(), NaiveDate::from_ymd_opt(2016, 12, 4));
//! ```
//!
//! Persisting with the SQLite store:
//! ```no_run
//! use chrono::NaiveDate;
//! use servint::{
//!     config::RecordStoreConfig,
//!     core::record::VehicleRecord,
//!     persist::{RecordStore, sqlite::SqliteRecordStore},
//! };
//!
//! let mut store = SqliteRecordStore::open("sedan.servint", RecordStoreConfig::default())
//!     .expect("open sqlite");
//! let mut car = VehicleRecord::new("Sedan", NaiveDate::from_ymd_opt(2006, 11, 30).unwrap());
//! car.set_haul(120_000.0).expect("haul");
//! store.save(&mut car).expect("save");
//!
//! let loaded = store.load().expect("load");
//! if let Some(warning) = loaded.warning {
//!     eprintln!("{warning}");
//! }
//! ```
#![deny(missing_docs)]

/// Crate settings with serde-backed defaults.
pub mod config;
/// Vehicle record, history log and periodic catalogue.
pub mod core;
/// Change notifications drained by adapters.
pub mod events;
/// Rolling file logger bootstrap.
pub mod logging;
/// Operation definitions and completed instances.
pub mod operation;
/// Snapshot persistence abstraction and SQLite implementation.
pub mod persist;
/// Maintenance forecast.
pub mod planner;
/// Human-readable text import and export.
pub mod text;
/// Shared primitive types and validation.
pub mod types;
