//! HTTP API over the Premier League tables loaded by the ETL job.
//!
//! Squad rows are served without per-table types: [`materialize`] drains a
//! query cursor into a [`models::RecordSet`] keyed by whatever columns the
//! table has.

pub mod config;
pub mod db;
pub mod error;
pub mod materialize;
pub mod models;
pub mod routes;

pub use materialize::materialize;
