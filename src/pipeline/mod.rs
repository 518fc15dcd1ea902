//! # Pipeline Sequencer
//!
//! Ordered list of unit stages tagged with the route leg they belong to.
//! [`PipelineBuilder`] assembles and validates the list from a scenario,
//! [`Pipeline::run`] threads the shipment through it and records the ledger.

pub mod ledger;
pub mod run;
pub mod sequence;

pub use ledger::{LedgerRow, PipelineRun, RowKind, RunSummary, RunTotals};
pub use sequence::PipelineBuilder;

use std::fmt;
use std::sync::Arc;

use crate::bog::{BogSettings, RecoverySettings};
use crate::domain::{CarrierProperties, Leg, LegPolicies};
use crate::error::{Result, TransportError};
use crate::stages::{StageKind, StageReport, UnitStage};

/// One stage in the sequence.
#[derive(Clone)]
pub struct PipelineStep {
    pub label: String,
    pub leg: Leg,
    stage: Arc<dyn UnitStage>,
}

impl fmt::Debug for PipelineStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineStep")
            .field("label", &self.label)
            .field("leg", &self.leg)
            .field("kind", &self.stage.kind())
            .finish()
    }
}

impl PipelineStep {
    pub fn new(label: impl Into<String>, leg: Leg, stage: Arc<dyn UnitStage>) -> Self {
        Self {
            label: label.into(),
            leg,
            stage,
        }
    }

    pub fn kind(&self) -> StageKind {
        self.stage.kind()
    }

    pub fn validate(&self) -> Result<()> {
        self.stage.validate()
    }

    pub fn apply(&self, mass_kg: f64, carrier: &CarrierProperties, bog: &BogSettings) -> StageReport {
        self.stage.apply(mass_kg, carrier, bog)
    }
}

/// Validated, immutable stage sequence for one carrier.
#[derive(Debug, Clone)]
pub struct Pipeline {
    carrier: CarrierProperties,
    policies: LegPolicies,
    recovery: RecoverySettings,
    steps: Vec<PipelineStep>,
}

impl Pipeline {
    /// Validates every step before returning; nothing runs on invalid input.
    pub fn new(
        carrier: CarrierProperties,
        policies: LegPolicies,
        recovery: RecoverySettings,
        steps: Vec<PipelineStep>,
    ) -> Result<Self> {
        validator::Validate::validate(&recovery)?;
        for step in &steps {
            step.validate().map_err(|err| match err {
                TransportError::Configuration { field, reason } => TransportError::Configuration {
                    field: format!("{}.{}", step.label, field),
                    reason,
                },
                other => other,
            })?;
        }
        Ok(Self {
            carrier,
            policies,
            recovery,
            steps,
        })
    }

    pub fn carrier(&self) -> &CarrierProperties {
        &self.carrier
    }

    pub fn policies(&self) -> LegPolicies {
        self.policies
    }

    pub fn steps(&self) -> &[PipelineStep] {
        &self.steps
    }

    pub fn kinds(&self) -> Vec<StageKind> {
        self.steps.iter().map(PipelineStep::kind).collect()
    }

    /// Boil-off handling for stages on `leg`.
    pub fn bog_for(&self, leg: Leg) -> BogSettings {
        BogSettings::new(self.policies.policy_for(leg), self.recovery.clone())
    }

    /// Prefix of the sequence ending at the first stage of `kind`.
    pub fn truncated_through(&self, kind: StageKind) -> Result<Self> {
        let end = self
            .steps
            .iter()
            .position(|step| step.kind() == kind)
            .ok_or_else(|| {
                TransportError::configuration("pipeline", format!("no {kind} stage in sequence"))
            })?;
        Ok(Self {
            steps: self.steps[..=end].to_vec(),
            ..self.clone()
        })
    }
}
