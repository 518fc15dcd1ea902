use serde::{Deserialize, Serialize};

use crate::domain::{Carrier, Leg, StageResult};
use crate::economics::{OverheadBasis, OverheadCharge};
use crate::error::Infeasibility;
use crate::stages::{StageKind, StageReport, StageStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowKind {
    Stage,
    /// Restates the production premium; not added to totals a second time
    Insurance,
    Overhead,
}

/// One line of the itemized ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerRow {
    pub label: String,
    pub kind: RowKind,
    pub stage: Option<StageKind>,
    pub leg: Option<Leg>,
    pub mass_in_kg: f64,
    #[serde(flatten)]
    pub result: StageResult,
    /// Shipment-level charge for overhead rows, zero for stage rows
    pub overhead_cost: f64,
    pub elapsed_hours: f64,
    pub status: StageStatus,
    pub clamps: Vec<Infeasibility>,
}

impl LedgerRow {
    pub fn stage(label: &str, leg: Leg, kind: StageKind, report: StageReport) -> Self {
        Self {
            label: label.to_string(),
            kind: RowKind::Stage,
            stage: Some(kind),
            leg: Some(leg),
            mass_in_kg: report.mass_in_kg,
            result: report.result,
            overhead_cost: 0.0,
            elapsed_hours: report.elapsed_hours,
            status: report.status,
            clamps: report.clamps,
        }
    }

    fn shipment_level(label: String, kind: RowKind, mass_kg: f64) -> Self {
        Self {
            label,
            kind,
            stage: None,
            leg: None,
            mass_in_kg: mass_kg,
            result: StageResult::passthrough(mass_kg),
            overhead_cost: 0.0,
            elapsed_hours: 0.0,
            status: StageStatus::Executed,
            clamps: Vec::new(),
        }
    }

    pub fn is_stage(&self) -> bool {
        self.kind == RowKind::Stage
    }

    /// Everything this row adds to the shipment cost.
    pub fn cost(&self) -> f64 {
        match self.kind {
            RowKind::Stage => self.result.stage_cost() + self.result.insurance_cost,
            RowKind::Insurance => 0.0,
            RowKind::Overhead => self.overhead_cost,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunTotals {
    /// Sum over stage rows only
    pub stages: StageResult,
    pub overheads: f64,
    /// Hours the cargo spent in transfer, transport and storage
    pub transit_hours: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub carrier: Option<Carrier>,
    pub initial_mass_kg: f64,
    pub total_cost: f64,
    pub total_energy_kwh: f64,
    pub total_emissions_kg: f64,
    pub final_delivered_mass_kg: f64,
}

impl RunSummary {
    /// Cost per kg actually delivered.
    pub fn levelized_cost_per_kg(&self) -> Option<f64> {
        (self.final_delivered_mass_kg > 0.0).then(|| self.total_cost / self.final_delivered_mass_kg)
    }
}

/// Ledger and aggregates of one pipeline execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineRun {
    pub rows: Vec<LedgerRow>,
    pub totals: RunTotals,
    pub summary: RunSummary,
}

impl PipelineRun {
    pub fn new(carrier: Carrier, initial_mass_kg: f64, rows: Vec<LedgerRow>) -> Self {
        let mut run = Self {
            rows,
            totals: RunTotals::default(),
            summary: RunSummary {
                carrier: Some(carrier),
                initial_mass_kg,
                ..Default::default()
            },
        };
        run.recompute();
        run
    }

    pub fn stage_rows(&self) -> impl Iterator<Item = &LedgerRow> {
        self.rows.iter().filter(|row| row.is_stage())
    }

    pub fn final_mass_kg(&self) -> f64 {
        self.summary.final_delivered_mass_kg
    }

    /// Inputs for the shipment-level overheads.
    pub fn overhead_basis(&self) -> OverheadBasis {
        let stages = &self.totals.stages;
        let freight = self
            .stage_rows()
            .filter(|row| row.stage == Some(StageKind::OceanTransport))
            .map(|row| row.result.opex + row.result.capex)
            .sum();
        OverheadBasis {
            delivered_mass_kg: self.final_mass_kg(),
            stage_opex: stages.opex,
            stage_carbon_tax: stages.carbon_tax,
            insurance: stages.insurance_cost,
            freight,
            transit_hours: self.totals.transit_hours,
        }
    }

    /// Append the insurance restatement and the overhead rows.
    pub fn with_overheads(mut self, charges: &[OverheadCharge]) -> Self {
        let mass = self.final_mass_kg();
        let premium = self.totals.stages.insurance_cost;
        if premium > 0.0 {
            let mut row = LedgerRow::shipment_level("insurance".to_string(), RowKind::Insurance, mass);
            row.result.insurance_cost = premium;
            self.rows.push(row);
        }
        for charge in charges {
            let mut row = LedgerRow::shipment_level(charge.kind.to_string(), RowKind::Overhead, mass);
            row.overhead_cost = charge.amount.max(0.0);
            self.rows.push(row);
        }
        self.recompute();
        self
    }

    fn recompute(&mut self) {
        let mut stages = StageResult::default();
        let mut transit_hours = 0.0;
        let mut final_mass = self.summary.initial_mass_kg;
        for row in self.stage_rows() {
            stages += &row.result;
            final_mass = row.result.output_mass_kg;
            if row.stage.is_some_and(StageKind::counts_toward_transit) {
                transit_hours += row.elapsed_hours;
            }
        }
        let overheads = self
            .rows
            .iter()
            .filter(|row| row.kind == RowKind::Overhead)
            .map(|row| row.overhead_cost)
            .sum();
        let total_cost = self.rows.iter().map(LedgerRow::cost).sum();

        self.totals = RunTotals {
            stages,
            overheads,
            transit_hours,
        };
        self.summary.total_cost = total_cost;
        self.summary.total_energy_kwh = stages.energy_kwh;
        self.summary.total_emissions_kg = stages.emissions_kg;
        self.summary.final_delivered_mass_kg = final_mass;
    }
}
