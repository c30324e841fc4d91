#![doc = include_str!("../README.md")]

pub mod config;
pub mod engine;
pub mod error;
pub mod lines;
pub mod organization;
pub mod outcome;
pub mod pool;

pub use config::{ScanEngineConfig, ScanEngineConfigBuilder};
pub use engine::ScanEngine;
pub use error::ScannerError;
pub use lines::{LineScan, scan_lines};
pub use organization::OrganizationScanner;
pub use outcome::Outcome;
pub use pool::{WorkerPermit, WorkerPool};
