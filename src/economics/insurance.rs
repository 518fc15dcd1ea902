use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use validator::Validate;

use crate::error::{Result, TransportError};

/// Premium charged once on the cargo value
pub trait PremiumModel: fmt::Debug + Send + Sync {
    fn premium(&self, cargo_value: f64) -> f64;

    fn validate_terms(&self) -> Result<()> {
        Ok(())
    }
}

/// Cargo premium scaled by a route risk factor.
///
/// The risk factor is resolved from route geometry (chokepoints, canal
/// transits, high-risk areas) before the model runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct RouteRiskPremium {
    /// Premium as a fraction of cargo value on a benign route
    #[validate(range(min = 0.0, max = 1.0))]
    pub base_rate: f64,
    #[validate(range(min = 0.0))]
    pub route_risk_factor: f64,
    #[validate(range(min = 0.0))]
    pub minimum_premium: f64,
}

impl Default for RouteRiskPremium {
    fn default() -> Self {
        Self {
            base_rate: 0.0015,
            route_risk_factor: 1.0,
            minimum_premium: 2500.0,
        }
    }
}

impl PremiumModel for RouteRiskPremium {
    fn premium(&self, cargo_value: f64) -> f64 {
        if cargo_value <= 0.0 {
            return 0.0;
        }
        (cargo_value * self.base_rate * self.route_risk_factor).max(self.minimum_premium)
    }

    fn validate_terms(&self) -> Result<()> {
        self.validate()?;
        Ok(())
    }
}

/// Premium model bound to the cargo's unit value.
#[derive(Debug, Clone)]
pub struct InsuranceCover {
    model: Arc<dyn PremiumModel>,
    cargo_value_per_kg: f64,
}

impl InsuranceCover {
    pub fn new(model: Arc<dyn PremiumModel>, cargo_value_per_kg: f64) -> Self {
        Self {
            model,
            cargo_value_per_kg,
        }
    }

    pub fn premium_for(&self, mass_kg: f64) -> f64 {
        self.model
            .premium(mass_kg.max(0.0) * self.cargo_value_per_kg)
            .max(0.0)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.cargo_value_per_kg.is_finite() || self.cargo_value_per_kg < 0.0 {
            return Err(TransportError::configuration(
                "insurance.cargo_value_per_kg",
                "must be a finite non-negative value",
            ));
        }
        self.model.validate_terms()
    }
}
