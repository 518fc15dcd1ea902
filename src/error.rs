use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Convenient result alias for the transport model.
pub type Result<T> = std::result::Result<T, TransportError>;

/// Errors surfaced to callers of the transport model.
///
/// Recoverable range violations are not errors: stages clamp them to the
/// nearest valid boundary and list them as [`Infeasibility`] on the stage
/// report instead.
#[derive(Debug, Error)]
pub enum TransportError {
    /// A stage or scenario parameter is missing or out of range. Raised before
    /// any stage executes.
    #[error("configuration error in {field}: {reason}")]
    Configuration { field: String, reason: String },

    /// A site refers to a jurisdiction that has no carbon-price/tariff entry.
    #[error("unknown jurisdiction: {name}")]
    UnknownJurisdiction { name: String },

    /// A stage produced a value that cannot be clamped back into range
    /// (NaN or infinite).
    #[error("physically infeasible {quantity} = {value} at stage {stage}")]
    PhysicalInfeasibility {
        stage: String,
        quantity: &'static str,
        value: f64,
    },

    /// The sizing optimizer ran out of iterations or bounds before reaching
    /// the target within tolerance.
    #[error(
        "sizing did not converge after {iterations} iterations (best mass {best_mass:.3} kg, relative residual {residual:.3e})"
    )]
    OptimizerNonConvergence {
        best_mass: f64,
        residual: f64,
        iterations: u32,
    },

    /// Configuration sources could not be read or deserialized.
    #[error("failed to load configuration: {0}")]
    Config(#[from] Box<figment::Error>),
}

impl TransportError {
    pub fn configuration(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Configuration {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::Configuration { .. } | Self::UnknownJurisdiction { .. } | Self::Config(_)
        )
    }
}

impl From<figment::Error> for TransportError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl From<validator::ValidationErrors> for TransportError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let codes: Vec<String> = errs.iter().map(|e| e.code.to_string()).collect();
                format!("{} ({})", field, codes.join(", "))
            })
            .collect();
        fields.sort();

        let field = if fields.is_empty() {
            "nested".to_string()
        } else {
            fields.join("; ")
        };

        Self::Configuration {
            field,
            reason: errors.to_string(),
        }
    }
}

/// A physical quantity that left its valid range and was clamped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Infeasibility {
    /// Pipeline pressure drop exceeded the inlet pressure.
    NegativePressure { computed_kpa: f64 },
    /// Energy recovered from boil-off exceeded the demand it offsets.
    RecoveredEnergyExceedsDemand { recovered_kwh: f64, demand_kwh: f64 },
    /// The requested recovery was larger than the actual loss.
    RecoveryExceedsLoss { requested_kg: f64, loss_kg: f64 },
    /// Accumulated loss exceeded the mass entering the stage.
    LossExceedsInput { loss_kg: f64, input_kg: f64 },
}

impl fmt::Display for Infeasibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NegativePressure { computed_kpa } => {
                write!(f, "final pressure {computed_kpa:.1} kPa clamped to 0")
            }
            Self::RecoveredEnergyExceedsDemand {
                recovered_kwh,
                demand_kwh,
            } => write!(
                f,
                "recovered {recovered_kwh:.1} kWh exceeds demand {demand_kwh:.1} kWh; net clamped to 0"
            ),
            Self::RecoveryExceedsLoss {
                requested_kg,
                loss_kg,
            } => write!(
                f,
                "requested recovery {requested_kg:.3} kg clamped to loss {loss_kg:.3} kg"
            ),
            Self::LossExceedsInput { loss_kg, input_kg } => {
                write!(f, "loss {loss_kg:.3} kg clamped to input {input_kg:.3} kg")
            }
        }
    }
}
