//! Gate construction helpers and the built-in seed data.

use crate::model::{Condition, Operator, QualityGate};

/// Id of the default gate in the built-in baseline.
pub const DEFAULT_GATE_ID: &str = "AWBWEMe2qGAMGEYPjJlm";

/// Baseline gate holding a condition on a metric that no longer exists.
pub const CORRUPTED_GATE_NAME: &str = "SonarSource way - CFamily";

// =============================================================================
// BUILDER
// =============================================================================

/// Produces well-formed gates; any field left unset keeps a sensible default.
#[derive(Debug, Clone)]
pub struct QualityGateBuilder {
    gate: QualityGate,
}

impl Default for QualityGateBuilder {
    fn default() -> Self {
        Self {
            gate: QualityGate {
                id: "1".into(),
                name: "qualitygate".into(),
                conditions: Vec::new(),
                is_default: false,
                is_built_in: false,
            },
        }
    }
}

impl QualityGateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.gate.id = id.into();
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.gate.name = name.into();
        self
    }

    #[must_use]
    pub fn conditions(mut self, conditions: Vec<Condition>) -> Self {
        self.gate.conditions = conditions;
        self
    }

    #[must_use]
    pub fn is_default(mut self, is_default: bool) -> Self {
        self.gate.is_default = is_default;
        self
    }

    #[must_use]
    pub fn is_built_in(mut self, is_built_in: bool) -> Self {
        self.gate.is_built_in = is_built_in;
        self
    }

    #[must_use]
    pub fn build(self) -> QualityGate {
        self.gate
    }
}

/// A gate with every field at its default.
#[must_use]
pub fn mock_quality_gate() -> QualityGate {
    QualityGateBuilder::default().build()
}

#[must_use]
pub fn condition(id: &str, metric: &str, op: Operator, error: &str) -> Condition {
    Condition { id: id.into(), metric: metric.into(), op, error: error.into() }
}

// =============================================================================
// BASELINE
// =============================================================================

/// The three seed gates: a default, one with a deprecated-metric condition,
/// and a built-in.
#[must_use]
pub fn default_baseline(default_id: &str) -> Vec<QualityGate> {
    use Operator::{GreaterThan as GT, LessThan as LT};

    vec![
        QualityGateBuilder::new()
            .id(default_id)
            .name("SonarSource way")
            .conditions(vec![
                condition("AXJMbIUGPAOIsUIE3eNC", "new_coverage", LT, "85"),
                condition("AXJMbIUGPAOIsUIE3eNE", "reliability_rating", GT, "4"),
                condition("AXJMbIUGPAOIsUIE3eND", "security_rating", GT, "4"),
                condition("AXJMbIUGPAOIsUIE3eNT", "new_maintainability_rating", GT, "1"),
                condition("AXJMbIUGPAOIsUIE3eNU", "new_reliability_rating", GT, "1"),
                condition("AXJMbIUGPAOIsUIE3eNV", "new_security_rating", GT, "1"),
                condition("AXJMbIUHPAOIsUIE3eNc", "new_duplicated_lines_density", GT, "3"),
                condition("AXJMbIUHPAOIsUIE3eOi", "new_security_hotspots_reviewed", LT, "100"),
            ])
            .is_default(true)
            .build(),
        QualityGateBuilder::new()
            .id("AXGYZrDqC-YjVCvvbRDY")
            .name(CORRUPTED_GATE_NAME)
            .conditions(vec![
                condition("AXJMbIUHPAOIsUIE3eOu", "new_coverage", LT, "0"),
                condition("AXJMbIUHPAOIsUIE3eOubis", "new_coverage", LT, "1"),
                condition("deprecated", "function_complexity", LT, "1"),
            ])
            .build(),
        QualityGateBuilder::new()
            .id("AWBWEMe4qGAMGEYPjJlr")
            .name("Sonar way")
            .conditions(vec![
                condition("AXJMbIUHPAOIsUIE3eNs", "new_security_rating", GT, "1"),
                condition("AXJMbIUHPAOIsUIE3eOD", "new_reliability_rating", GT, "1"),
                condition("AXJMbIUHPAOIsUIE3eOE", "new_maintainability_rating", GT, "1"),
                condition("AXJMbIUHPAOIsUIE3eOF", "new_coverage", LT, "80"),
                condition("AXJMbIUHPAOIsUIE3eOG", "new_duplicated_lines_density", GT, "3"),
                condition("AXJMbIUHPAOIsUIE3eOk", "new_security_hotspots_reviewed", LT, "100"),
            ])
            .is_built_in(true)
            .build(),
    ]
}

#[cfg(test)]
#[path = "fixtures_test.rs"]
mod tests;
