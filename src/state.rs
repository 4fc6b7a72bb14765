//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! Handlers talk to the quality-gate service only through the
//! `QualityGateApi` capability set. The concrete emulator handle is kept
//! alongside so test-control routes (reset, admin flag) can reach it; it is
//! absent when the state wraps some other implementation.

use std::sync::Arc;

use crate::api::QualityGateApi;
use crate::config::ServerConfig;
use crate::emulator::QualityGateEmulator;

/// Clone is required by Axum — all inner fields are Arc-wrapped.
#[derive(Clone)]
pub struct AppState {
    pub gates: Arc<dyn QualityGateApi>,
    pub emulator: Option<Arc<QualityGateEmulator>>,
}

impl AppState {
    /// State backed by an arbitrary implementation, without test controls.
    #[must_use]
    pub fn new(gates: Arc<dyn QualityGateApi>) -> Self {
        Self { gates, emulator: None }
    }

    /// State backed by the emulator, with test controls enabled.
    #[must_use]
    pub fn with_emulator(emulator: Arc<QualityGateEmulator>) -> Self {
        Self { gates: emulator.clone(), emulator: Some(emulator) }
    }

    /// Build the emulator described by `config` and wrap it.
    pub async fn from_config(config: &ServerConfig) -> Self {
        let emulator =
            QualityGateEmulator::with_default_id(&config.default_gate_id).with_id_strategy(config.id_strategy);
        emulator.set_is_admin(config.is_admin).await;
        Self::with_emulator(Arc::new(emulator))
    }
}

#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
