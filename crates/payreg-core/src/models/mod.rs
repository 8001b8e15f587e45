//! Data models: pipeline configuration and the extracted invoice record.

pub mod config;
pub mod record;
