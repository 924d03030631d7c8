//! Infrastructure layer - Backends and search caching services

pub mod cache;
pub mod database;
pub mod logging;
pub mod observability;
pub mod search;
pub mod services;
pub mod telemetry;
