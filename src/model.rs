//! Quality-gate domain types and the payload shapes exchanged with callers.
//!
//! DESIGN
//! ======
//! Field names serialize in camelCase so payloads match what a dashboard
//! client of the remote service expects (`isDefault`, `setAsDefault`, ...).
//! Every response type owns its data; handing one out never exposes the
//! emulator's working state.

use serde::{Deserialize, Serialize};

// =============================================================================
// CONDITIONS
// =============================================================================

/// Comparison applied between a metric value and the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "LT")]
    LessThan,
    #[serde(rename = "GT")]
    GreaterThan,
}

/// A single metric threshold rule within a gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub id: String,
    pub metric: String,
    pub op: Operator,
    /// Threshold, kept string-encoded the way the service transmits it.
    pub error: String,
}

// =============================================================================
// QUALITY GATES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityGate {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub is_built_in: bool,
}

// =============================================================================
// ACTIONS
// =============================================================================

/// Operations the current actor may perform on one gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(clippy::struct_excessive_bools)]
pub struct Actions {
    pub rename: bool,
    pub set_as_default: bool,
    pub copy: bool,
    pub associate_projects: bool,
    pub delete: bool,
    pub manage_conditions: bool,
    pub delegate: bool,
}

impl Actions {
    /// Permission set for `gate` as seen by an actor with the given admin flag.
    ///
    /// Built-in gates can never be renamed or deleted, and the default gate
    /// cannot be made default again. Everything else follows the admin flag.
    #[must_use]
    pub fn compute(is_default: bool, is_built_in: bool, is_admin: bool) -> Self {
        Self {
            rename: !is_built_in && is_admin,
            set_as_default: !is_default && is_admin,
            copy: is_admin,
            associate_projects: is_admin,
            delete: !is_built_in && is_admin,
            manage_conditions: is_admin,
            delegate: is_admin,
        }
    }

    #[must_use]
    pub fn for_gate(gate: &QualityGate, is_admin: bool) -> Self {
        Self::compute(gate.is_default, gate.is_built_in, is_admin)
    }
}

/// Collection-level permissions returned alongside the gate list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GlobalActions {
    pub create: bool,
}

// =============================================================================
// RESPONSES
// =============================================================================

/// One entry of the gate list: the gate without its conditions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityGateSummary {
    pub id: String,
    pub name: String,
    pub is_default: bool,
    pub is_built_in: bool,
    pub actions: Actions,
}

impl QualityGateSummary {
    #[must_use]
    pub fn from_gate(gate: &QualityGate, is_admin: bool) -> Self {
        Self {
            id: gate.id.clone(),
            name: gate.name.clone(),
            is_default: gate.is_default,
            is_built_in: gate.is_built_in,
            actions: Actions::for_gate(gate, is_admin),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListResponse {
    pub qualitygates: Vec<QualityGateSummary>,
    /// Id of the gate currently applied to new projects.
    pub default: String,
    pub actions: GlobalActions,
}

/// Gate detail as returned by `show`. The default flag is not part of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityGateDetails {
    pub id: String,
    pub name: String,
    pub conditions: Vec<Condition>,
    pub is_built_in: bool,
}

/// `show` result. An unknown id yields `gate: None` rather than an error,
/// which serializes as an object holding only `actions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowResponse {
    #[serde(flatten)]
    pub gate: Option<QualityGateDetails>,
    pub actions: Actions,
}

/// Identity of a gate just created, copied or renamed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateRef {
    pub id: String,
    pub name: String,
}

// =============================================================================
// AUXILIARY SEARCHES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SearchUsersResponse {
    pub users: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SearchGroupsResponse {
    pub groups: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paging {
    pub page_index: u32,
    pub page_size: u32,
    pub total: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchProjectsResponse {
    pub paging: Paging,
    pub results: Vec<serde_json::Value>,
}

impl SearchProjectsResponse {
    /// First page of an empty result set.
    #[must_use]
    pub fn empty() -> Self {
        Self { paging: Paging { page_index: 1, page_size: 100, total: 0 }, results: Vec::new() }
    }
}

// =============================================================================
// ERRORS ON THE WIRE
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorMessage {
    pub msg: String,
}

/// Rejection body: a list holding a single human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub errors: Vec<ErrorMessage>,
}

impl ErrorPayload {
    #[must_use]
    pub fn single(msg: impl Into<String>) -> Self {
        Self { errors: vec![ErrorMessage { msg: msg.into() }] }
    }
}

#[cfg(test)]
#[path = "model_test.rs"]
mod tests;
