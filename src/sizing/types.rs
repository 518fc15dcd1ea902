use serde::{Deserialize, Serialize};

use crate::config::SizingConfig;
use crate::error::{Result, TransportError};

/// Find the initial mass whose delivered mass equals `target_mass_kg`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizingProblem {
    pub target_mass_kg: f64,
    pub lower_bound_kg: f64,
    pub upper_bound_kg: f64,
    /// Relative tolerance on the delivered mass
    pub tolerance: f64,
    pub max_iterations: u32,
}

impl SizingProblem {
    pub fn new(target_mass_kg: f64, config: &SizingConfig) -> Self {
        Self {
            target_mass_kg,
            lower_bound_kg: 0.0,
            upper_bound_kg: target_mass_kg * config.upper_bound_factor,
            tolerance: config.tolerance,
            max_iterations: config.max_iterations,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.target_mass_kg.is_finite() || self.target_mass_kg <= 0.0 {
            return Err(TransportError::configuration(
                "sizing.target_mass_kg",
                "must be a finite positive mass",
            ));
        }
        if !(self.lower_bound_kg >= 0.0 && self.upper_bound_kg > self.lower_bound_kg)
            || !self.upper_bound_kg.is_finite()
        {
            return Err(TransportError::configuration(
                "sizing.bounds",
                format!(
                    "need 0 <= lower < upper, got [{}, {}]",
                    self.lower_bound_kg, self.upper_bound_kg
                ),
            ));
        }
        if !(self.tolerance > 0.0 && self.tolerance < 1.0) {
            return Err(TransportError::configuration(
                "sizing.tolerance",
                "must be in (0, 1)",
            ));
        }
        if self.max_iterations == 0 {
            return Err(TransportError::configuration(
                "sizing.max_iterations",
                "must be at least 1",
            ));
        }
        Ok(())
    }

    pub fn relative_residual(&self, achieved_mass_kg: f64) -> f64 {
        (achieved_mass_kg - self.target_mass_kg).abs() / self.target_mass_kg
    }

    pub fn clamp(&self, mass_kg: f64) -> f64 {
        mass_kg.clamp(self.lower_bound_kg, self.upper_bound_kg)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizingOutcome {
    pub target_mass_kg: f64,
    /// Best initial mass found
    pub initial_mass_kg: f64,
    /// Delivered mass at that initial mass
    pub achieved_mass_kg: f64,
    pub relative_residual: f64,
    pub iterations: u32,
    pub converged: bool,
}

impl SizingOutcome {
    /// Turn a non-converged outcome into an error.
    pub fn require_converged(self) -> Result<Self> {
        if self.converged {
            return Ok(self);
        }
        Err(TransportError::OptimizerNonConvergence {
            best_mass: self.initial_mass_kg,
            residual: self.relative_residual,
            iterations: self.iterations,
        })
    }
}

/// Delivered mass as a function of initial mass.
pub type DeliveryFn<'a> = dyn Fn(f64) -> Result<f64> + Sync + 'a;

/// Inverse sizing algorithm
pub trait SizingStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn size(&self, problem: &SizingProblem, delivered: &DeliveryFn<'_>) -> Result<SizingOutcome>;
}

/// Tracks the closest evaluation seen so far.
#[derive(Debug, Clone, Copy)]
pub(crate) struct BestSoFar {
    initial_mass_kg: f64,
    achieved_mass_kg: f64,
    residual: f64,
}

impl BestSoFar {
    pub fn new() -> Self {
        Self {
            initial_mass_kg: f64::NAN,
            achieved_mass_kg: f64::NAN,
            residual: f64::INFINITY,
        }
    }

    pub fn offer(&mut self, problem: &SizingProblem, initial_mass_kg: f64, achieved_mass_kg: f64) -> f64 {
        let residual = problem.relative_residual(achieved_mass_kg);
        if residual < self.residual {
            *self = Self {
                initial_mass_kg,
                achieved_mass_kg,
                residual,
            };
        }
        residual
    }

    pub fn finish(self, problem: &SizingProblem, iterations: u32) -> SizingOutcome {
        SizingOutcome {
            target_mass_kg: problem.target_mass_kg,
            initial_mass_kg: self.initial_mass_kg,
            achieved_mass_kg: self.achieved_mass_kg,
            relative_residual: self.residual,
            iterations,
            converged: self.residual <= problem.tolerance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_problem_from_config() {
        let problem = SizingProblem::new(1000.0, &SizingConfig::default());
        assert_eq!(problem.lower_bound_kg, 0.0);
        assert_eq!(problem.upper_bound_kg, 4000.0);
        assert!(problem.validate().is_ok());
    }

    #[test]
    fn test_invalid_bounds_rejected() {
        let problem = SizingProblem {
            target_mass_kg: 1000.0,
            lower_bound_kg: 10.0,
            upper_bound_kg: 5.0,
            tolerance: 1e-6,
            max_iterations: 10,
        };
        assert!(problem.validate().unwrap_err().is_configuration());
    }

    #[test]
    fn test_require_converged() {
        let outcome = SizingOutcome {
            target_mass_kg: 100.0,
            initial_mass_kg: 120.0,
            achieved_mass_kg: 90.0,
            relative_residual: 0.1,
            iterations: 50,
            converged: false,
        };
        assert!(matches!(
            outcome.require_converged(),
            Err(TransportError::OptimizerNonConvergence { iterations: 50, .. })
        ));
    }
}
