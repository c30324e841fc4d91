//! reposcan server library.
//!
//! This library exposes internal modules for integration testing.
//! In production, `reposcan-server` is used as a binary (main.rs).

pub mod api;
pub mod app;
pub mod cli;
pub mod decode;
pub mod logging;
pub mod metrics_server;
pub mod serve;
