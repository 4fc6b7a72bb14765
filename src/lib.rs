//! In-memory emulator of a quality-gate management service.
//!
//! ARCHITECTURE
//! ============
//! `api` defines the capability set, `emulator` implements it over an owned
//! gate list, and `routes` exposes it over HTTP for out-of-process callers.

pub mod api;
pub mod config;
pub mod emulator;
pub mod fixtures;
pub mod model;
pub mod routes;
pub mod state;

pub use api::{ConditionSpec, QualityGateApi, QualityGateError};
pub use emulator::{IdStrategy, QualityGateEmulator};
