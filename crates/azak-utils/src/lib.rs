//! Shared utilities for azak
//!
//! This crate provides common functionality used across the azak workspace:
//! tracing setup and the application-level configuration it reads.

pub mod config;
pub mod logging;

pub use config::Config;
pub use logging::init_tracing;
