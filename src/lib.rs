//! vmatch - Fuzzy lookup of vehicle fuel-efficiency records.
//!
//! Given a partial vehicle description (make, model and year, each optional),
//! vmatch ranks every record of an EPA-style vehicle dataset by a composite
//! distance score and returns the closest matches.
//!
//! # Modules
//!
//! - [`dataset`] - CSV parsing into typed vehicle records
//! - [`search`] - Scoring and ranking of records against a query
//! - [`cache`] - Load-once handle sharing the parsed dataset
//! - [`storage`] - Where the raw dataset text comes from
//! - [`commands`] - High-level operations (search, validate)
//! - [`config`] - Configuration loading
//! - [`cli`] - Command-line interface definitions

pub mod cache;
pub mod cli;
pub mod commands;
pub mod config;
pub mod dataset;
pub mod search;
pub mod storage;

#[cfg(feature = "mcp")]
pub mod mcp;
