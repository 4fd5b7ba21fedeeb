//! qrlink - short-link resolution and scan analytics for QR codes
//!
//! Core functionality for the qrlink service: dynamic short links whose
//! destinations stay editable after the code is printed, a redirect hot
//! path that records scan telemetry off the request path, and the
//! aggregation queries behind owner dashboards.
//!
//! # Architecture
//! - `storages`: link persistence over SeaORM (SQLite/MySQL/Postgres)
//! - `analytics`: scan-event log and dashboard aggregation
//! - `services`: link creation, resolution, UA classification, recorder
//! - `ratelimit`: fixed-window limiter for the public redirect surface
//! - `api`: HTTP handlers and middleware
//! - `config`: environment-driven configuration

pub mod analytics;
pub mod api;
pub mod config;
pub mod errors;
pub mod ratelimit;
pub mod services;
pub mod storages;
pub mod utils;
