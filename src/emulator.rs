//! Quality-gate store emulator — in-memory stand-in for the remote service.
//!
//! DESIGN
//! ======
//! The emulator owns an immutable baseline and a working copy of the gate
//! list. Every operation takes the write (or read) guard, runs to completion,
//! releases it, and then yields once before resolving so callers see
//! deferred delivery the way they would across a network. `reset` restores
//! the working copy from the baseline.
//!
//! Responses are built from clones, never from references into the working
//! list, so a caller mutating a response cannot reach internal state.
//!
//! ID GENERATION
//! =============
//! Gate ids are `newId{n}` and condition ids `condId{gateId}{n}`. Both `n`
//! sequences are monotonic and candidates already in use are skipped, so
//! deleting and re-creating entities never produces a duplicate id.

use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::api::{ConditionSpec, QualityGateApi, QualityGateError};
use crate::fixtures::{self, CORRUPTED_GATE_NAME, QualityGateBuilder};
use crate::model::{
    Actions, Condition, GateRef, GlobalActions, ListResponse, QualityGate, QualityGateDetails, QualityGateSummary,
    SearchGroupsResponse, SearchProjectsResponse, SearchUsersResponse, ShowResponse,
};

// =============================================================================
// TYPES
// =============================================================================

/// How fresh gate and condition ids are minted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdStrategy {
    /// Deterministic `newId{n}` / `condId{gate}{n}` ids.
    #[default]
    Sequential,
    /// UUID v4 based ids.
    Random,
}

/// Mutable half of the emulator. Only touched under the lock.
#[derive(Debug, Clone)]
struct WorkingSet {
    gates: Vec<QualityGate>,
    is_admin: bool,
    next_gate_seq: usize,
    next_condition_seq: usize,
}

impl WorkingSet {
    fn from_baseline(baseline: &[QualityGate]) -> Self {
        Self {
            gates: baseline.to_vec(),
            is_admin: false,
            next_gate_seq: baseline.len(),
            next_condition_seq: 0,
        }
    }

    fn gate(&self, id: &str) -> Option<&QualityGate> {
        self.gates.iter().find(|g| g.id == id)
    }

    fn gate_mut(&mut self, id: &str) -> Option<&mut QualityGate> {
        self.gates.iter_mut().find(|g| g.id == id)
    }

    fn has_condition(&self, id: &str) -> bool {
        self.gates
            .iter()
            .any(|g| g.conditions.iter().any(|c| c.id == id))
    }

    fn mint_gate_id(&mut self, strategy: IdStrategy) -> String {
        loop {
            let candidate = match strategy {
                IdStrategy::Sequential => {
                    let id = format!("newId{}", self.next_gate_seq);
                    self.next_gate_seq += 1;
                    id
                }
                IdStrategy::Random => Uuid::new_v4().to_string(),
            };
            if self.gate(&candidate).is_none() {
                return candidate;
            }
        }
    }

    fn mint_condition_id(&mut self, strategy: IdStrategy, gate_id: &str) -> String {
        loop {
            let candidate = match strategy {
                IdStrategy::Sequential => {
                    let id = format!("condId{gate_id}{}", self.next_condition_seq);
                    self.next_condition_seq += 1;
                    id
                }
                IdStrategy::Random => format!("condId{}", Uuid::new_v4().simple()),
            };
            if !self.has_condition(&candidate) {
                return candidate;
            }
        }
    }
}

/// In-memory implementation of [`QualityGateApi`].
#[derive(Debug)]
pub struct QualityGateEmulator {
    baseline: Vec<QualityGate>,
    id_strategy: IdStrategy,
    state: RwLock<WorkingSet>,
}

impl Default for QualityGateEmulator {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve on the next scheduler turn.
async fn reply<T>(response: T) -> T {
    tokio::task::yield_now().await;
    response
}

// =============================================================================
// CONSTRUCTION & TEST CONTROLS
// =============================================================================

impl QualityGateEmulator {
    /// Emulator seeded with the built-in three-gate baseline.
    #[must_use]
    pub fn new() -> Self {
        Self::with_default_id(fixtures::DEFAULT_GATE_ID)
    }

    /// Built-in baseline with a caller-chosen id for the default gate.
    #[must_use]
    pub fn with_default_id(default_id: &str) -> Self {
        Self::with_baseline(fixtures::default_baseline(default_id))
    }

    /// Emulator seeded with a caller-supplied baseline.
    #[must_use]
    pub fn with_baseline(baseline: Vec<QualityGate>) -> Self {
        let state = RwLock::new(WorkingSet::from_baseline(&baseline));
        Self { baseline, id_strategy: IdStrategy::default(), state }
    }

    #[must_use]
    pub fn with_id_strategy(mut self, id_strategy: IdStrategy) -> Self {
        self.id_strategy = id_strategy;
        self
    }

    /// Discard every mutation and clear the admin flag.
    pub async fn reset(&self) {
        let mut state = self.state.write().await;
        *state = WorkingSet::from_baseline(&self.baseline);
        info!(gates = state.gates.len(), "quality gates reset to baseline");
    }

    pub async fn set_is_admin(&self, is_admin: bool) {
        self.state.write().await.is_admin = is_admin;
        debug!(is_admin, "admin flag updated");
    }

    pub async fn is_admin(&self) -> bool {
        self.state.read().await.is_admin
    }

    /// Deep copy of the working list.
    pub async fn snapshot(&self) -> Vec<QualityGate> {
        self.state.read().await.gates.clone()
    }

    /// The untouched seed data.
    #[must_use]
    pub fn baseline(&self) -> &[QualityGate] {
        &self.baseline
    }

    /// The current default gate, or a placeholder default when none is marked.
    pub async fn default_quality_gate(&self) -> QualityGate {
        let state = self.state.read().await;
        state
            .gates
            .iter()
            .find(|g| g.is_default)
            .cloned()
            .unwrap_or_else(|| QualityGateBuilder::new().is_default(true).build())
    }

    /// The first built-in gate, or a placeholder built-in when none exists.
    pub async fn built_in_quality_gate(&self) -> QualityGate {
        let state = self.state.read().await;
        state
            .gates
            .iter()
            .find(|g| g.is_built_in)
            .cloned()
            .unwrap_or_else(|| QualityGateBuilder::new().is_built_in(true).build())
    }

    /// Name of the seeded gate that references a deprecated metric.
    #[must_use]
    pub fn corrupted_quality_gate_name(&self) -> &'static str {
        CORRUPTED_GATE_NAME
    }
}

// =============================================================================
// OPERATIONS
// =============================================================================

#[async_trait::async_trait]
impl QualityGateApi for QualityGateEmulator {
    async fn list(&self) -> ListResponse {
        let response = {
            let state = self.state.read().await;
            let default = state
                .gates
                .iter()
                .find(|g| g.is_default)
                .map_or_else(|| QualityGateBuilder::new().build().id, |g| g.id.clone());
            ListResponse {
                qualitygates: state
                    .gates
                    .iter()
                    .map(|g| QualityGateSummary::from_gate(g, state.is_admin))
                    .collect(),
                default,
                actions: GlobalActions { create: state.is_admin },
            }
        };
        debug!(count = response.qualitygates.len(), "listed quality gates");
        reply(response).await
    }

    async fn show(&self, id: &str) -> ShowResponse {
        let response = {
            let state = self.state.read().await;
            match state.gate(id) {
                Some(gate) => ShowResponse {
                    gate: Some(QualityGateDetails {
                        id: gate.id.clone(),
                        name: gate.name.clone(),
                        conditions: gate.conditions.clone(),
                        is_built_in: gate.is_built_in,
                    }),
                    // The default flag is dropped from the detail view, so
                    // setAsDefault is computed as if the gate were not default.
                    actions: Actions::compute(false, gate.is_built_in, state.is_admin),
                },
                None => {
                    debug!(%id, "show for unknown quality gate");
                    ShowResponse { gate: None, actions: Actions::compute(false, false, state.is_admin) }
                }
            }
        };
        reply(response).await
    }

    async fn create(&self, name: &str) -> GateRef {
        let created = {
            let mut state = self.state.write().await;
            let id = state.mint_gate_id(self.id_strategy);
            state.gates.push(QualityGateBuilder::new().id(id.clone()).name(name).build());
            GateRef { id, name: name.to_string() }
        };
        info!(id = %created.id, name = %created.name, "quality gate created");
        reply(created).await
    }

    async fn destroy(&self, id: &str) {
        {
            let mut state = self.state.write().await;
            let before = state.gates.len();
            state.gates.retain(|g| g.id != id);
            info!(%id, removed = before - state.gates.len(), "quality gate destroyed");
        }
        reply(()).await;
    }

    async fn copy(&self, id: &str, name: &str) -> Result<GateRef, QualityGateError> {
        let result = {
            let mut state = self.state.write().await;
            let source = state.gate(id).cloned();
            match source {
                Some(mut copy) => {
                    copy.id = state.mint_gate_id(self.id_strategy);
                    copy.name = name.to_string();
                    copy.is_default = false;
                    copy.is_built_in = false;
                    let created = GateRef { id: copy.id.clone(), name: copy.name.clone() };
                    state.gates.push(copy);
                    info!(source = %id, id = %created.id, name = %created.name, "quality gate copied");
                    Ok(created)
                }
                None => {
                    warn!(%id, "copy of unknown quality gate");
                    Err(QualityGateError::GateNotFound(id.to_string()))
                }
            }
        };
        reply(result).await
    }

    async fn rename(&self, id: &str, name: &str) -> Result<GateRef, QualityGateError> {
        let result = {
            let mut state = self.state.write().await;
            match state.gate_mut(id) {
                Some(gate) => {
                    gate.name = name.to_string();
                    info!(%id, %name, "quality gate renamed");
                    Ok(GateRef { id: gate.id.clone(), name: gate.name.clone() })
                }
                None => {
                    warn!(%id, "rename of unknown quality gate");
                    Err(QualityGateError::GateNotFound(id.to_string()))
                }
            }
        };
        reply(result).await
    }

    async fn set_as_default(&self, id: &str) -> Result<(), QualityGateError> {
        let result = {
            let mut state = self.state.write().await;
            if state.gate(id).is_some() {
                for gate in &mut state.gates {
                    gate.is_default = gate.id == id;
                }
                info!(%id, "default quality gate changed");
                Ok(())
            } else {
                warn!(%id, "set_as_default on unknown quality gate");
                Err(QualityGateError::GateNotFound(id.to_string()))
            }
        };
        reply(result).await
    }

    async fn create_condition(&self, gate_id: &str, spec: ConditionSpec) -> Result<Condition, QualityGateError> {
        let result = {
            let mut state = self.state.write().await;
            match state.gates.iter().position(|g| g.id == gate_id) {
                Some(index) => {
                    let id = state.mint_condition_id(self.id_strategy, gate_id);
                    let condition = Condition { id, metric: spec.metric, op: spec.op, error: spec.error };
                    state.gates[index].conditions.push(condition.clone());
                    info!(%gate_id, id = %condition.id, metric = %condition.metric, "condition created");
                    Ok(condition)
                }
                None => {
                    warn!(%gate_id, "create_condition on unknown quality gate");
                    Err(QualityGateError::GateNotFound(gate_id.to_string()))
                }
            }
        };
        reply(result).await
    }

    async fn update_condition(&self, id: &str, spec: ConditionSpec) -> Result<Condition, QualityGateError> {
        let result = {
            let mut state = self.state.write().await;
            let found = state
                .gates
                .iter_mut()
                .flat_map(|g| g.conditions.iter_mut())
                .find(|c| c.id == id);
            match found {
                Some(condition) => {
                    condition.metric = spec.metric;
                    condition.op = spec.op;
                    condition.error = spec.error;
                    info!(%id, metric = %condition.metric, "condition updated");
                    Ok(condition.clone())
                }
                None => {
                    warn!(%id, "update of unknown condition");
                    Err(QualityGateError::ConditionNotFound(id.to_string()))
                }
            }
        };
        reply(result).await
    }

    async fn delete_condition(&self, id: &str) {
        {
            let mut state = self.state.write().await;
            let mut removed = 0usize;
            for gate in &mut state.gates {
                let before = gate.conditions.len();
                gate.conditions.retain(|c| c.id != id);
                removed += before - gate.conditions.len();
            }
            info!(%id, removed, "condition deleted");
        }
        reply(()).await;
    }

    async fn search_users(&self, gate_name: &str, query: Option<&str>) -> SearchUsersResponse {
        debug!(%gate_name, ?query, "search users");
        reply(SearchUsersResponse::default()).await
    }

    async fn search_groups(&self, gate_name: &str, query: Option<&str>) -> SearchGroupsResponse {
        debug!(%gate_name, ?query, "search groups");
        reply(SearchGroupsResponse::default()).await
    }

    async fn search_projects(&self, gate_name: &str, query: Option<&str>) -> SearchProjectsResponse {
        debug!(%gate_name, ?query, "search projects");
        reply(SearchProjectsResponse::empty()).await
    }
}

#[cfg(test)]
#[path = "emulator_test.rs"]
mod tests;
