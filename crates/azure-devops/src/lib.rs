#![doc = include_str!("../README.md")]

pub mod client;
pub mod error;
pub mod models;

pub use client::{AzureDevOpsCatalog, AzureDevOpsConnector, ContentStream};
