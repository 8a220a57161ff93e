//! Library surface of the Tempo CLI, exposed for integration tests.

pub mod commands;
pub mod config;
pub mod store_json;
