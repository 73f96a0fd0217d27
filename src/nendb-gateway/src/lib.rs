//! nendb-gateway - REST front end for a NenDB server
//!
//! Serves a JSON API over actix-web and forwards every call through the
//! `nendb-rs` client, translating client errors into HTTP status codes.
//!
//! # Usage
//!
//! ```bash
//! nendb-gateway            # reads gateway.json, falls back to defaults
//! NENDB_URL=http://db:8080 nendb-gateway
//! ```

pub use nendb_rs;

pub mod api;
pub mod config;
pub mod telemetry;
