//! Core library: catalog listing, classification, upload coordination,
//! automatic uploads, and durable asset state.

pub mod catalog;
pub mod classifier;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod ledger;
pub mod manager;
pub mod models;
pub mod scheduler;
pub mod selection;
pub mod state;
pub mod store;
pub mod workflow;

pub use error::{AssetError, Result};
pub use manager::{AssetEvent, AssetManager, AutoCheck};
pub use models::{AssetRecord, FileType, UploadConfiguration, UploadMode, UploadOutcome};
pub use scheduler::{AutomaticUploadScheduler, SchedulerState};
