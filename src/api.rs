//! Quality-gate capability set.
//!
//! DESIGN
//! ======
//! `QualityGateApi` names every operation the remote quality-gate service
//! answers. Consumers hold an `Arc<dyn QualityGateApi>` so the in-memory
//! emulator and any real client are interchangeable.
//!
//! ERROR HANDLING
//! ==============
//! Only lookups that must resolve an existing gate or condition fail. Delete
//! operations on unknown ids succeed without effect, and `show` answers an
//! unknown id with an empty gate rather than an error.

use crate::model::{
    Condition, ErrorPayload, GateRef, ListResponse, Operator, SearchGroupsResponse, SearchProjectsResponse,
    SearchUsersResponse, ShowResponse,
};

// =============================================================================
// ERRORS
// =============================================================================

/// Grepable error code for structured error payloads.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QualityGateError {
    #[error("No quality gate has been found for id {0}")]
    GateNotFound(String),
    #[error("No condition has been found for id {0}")]
    ConditionNotFound(String),
}

impl ErrorCode for QualityGateError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::GateNotFound(_) => "E_GATE_NOT_FOUND",
            Self::ConditionNotFound(_) => "E_CONDITION_NOT_FOUND",
        }
    }
}

impl QualityGateError {
    /// Rejection body carrying this error's message.
    #[must_use]
    pub fn to_payload(&self) -> ErrorPayload {
        ErrorPayload::single(self.to_string())
    }
}

// =============================================================================
// REQUESTS
// =============================================================================

/// Fields of a condition to create or overwrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionSpec {
    pub metric: String,
    pub op: Operator,
    pub error: String,
}

impl ConditionSpec {
    #[must_use]
    pub fn new(metric: impl Into<String>, op: Operator, error: impl Into<String>) -> Self {
        Self { metric: metric.into(), op, error: error.into() }
    }
}

// =============================================================================
// CAPABILITY TRAIT
// =============================================================================

#[async_trait::async_trait]
pub trait QualityGateApi: Send + Sync {
    /// All gates without conditions, with per-gate actions and the default id.
    async fn list(&self) -> ListResponse;

    /// One gate with its conditions. Unknown ids yield `gate: None`.
    async fn show(&self, id: &str) -> ShowResponse;

    async fn create(&self, name: &str) -> GateRef;

    /// Remove a gate. Unknown ids are ignored.
    async fn destroy(&self, id: &str);

    /// # Errors
    ///
    /// Returns `GateNotFound` if `id` names no gate.
    async fn copy(&self, id: &str, name: &str) -> Result<GateRef, QualityGateError>;

    /// # Errors
    ///
    /// Returns `GateNotFound` if `id` names no gate.
    async fn rename(&self, id: &str, name: &str) -> Result<GateRef, QualityGateError>;

    /// Make `id` the only default gate.
    ///
    /// # Errors
    ///
    /// Returns `GateNotFound` if `id` names no gate.
    async fn set_as_default(&self, id: &str) -> Result<(), QualityGateError>;

    /// # Errors
    ///
    /// Returns `GateNotFound` if `gate_id` names no gate.
    async fn create_condition(&self, gate_id: &str, spec: ConditionSpec) -> Result<Condition, QualityGateError>;

    /// # Errors
    ///
    /// Returns `ConditionNotFound` if no gate holds a condition with `id`.
    async fn update_condition(&self, id: &str, spec: ConditionSpec) -> Result<Condition, QualityGateError>;

    /// Remove the condition from every gate holding it. Unknown ids are ignored.
    async fn delete_condition(&self, id: &str);

    async fn search_users(&self, gate_name: &str, query: Option<&str>) -> SearchUsersResponse;

    async fn search_groups(&self, gate_name: &str, query: Option<&str>) -> SearchGroupsResponse;

    async fn search_projects(&self, gate_name: &str, query: Option<&str>) -> SearchProjectsResponse;
}
