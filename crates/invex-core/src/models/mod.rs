//! Data models: the canonical record and pipeline configuration.

pub mod amount;
pub mod config;
pub mod invoice;
