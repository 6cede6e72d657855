//! Data models: configuration and request-scoped documents.

pub mod config;
pub mod document;
