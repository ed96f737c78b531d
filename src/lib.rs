// Library for tests to access modules

pub mod broadcaster;
pub mod config;
pub mod models;
pub mod normalizer;
pub mod routes;
pub mod telemetry_repo;
pub mod version;
pub mod views;
