use super::types::{BestSoFar, DeliveryFn, SizingOutcome, SizingProblem, SizingStrategy};
use crate::error::Result;

/// Iterates `X ← target / (1 − loss_fraction(X))` from half the target.
///
/// Converges in a few steps when the loss fraction barely depends on mass,
/// which holds for purely fractional boil-off.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedPointSizer;

impl SizingStrategy for FixedPointSizer {
    fn name(&self) -> &'static str {
        "fixed_point"
    }

    fn size(&self, problem: &SizingProblem, delivered: &DeliveryFn<'_>) -> Result<SizingOutcome> {
        problem.validate()?;
        let target = problem.target_mass_kg;
        let mut best = BestSoFar::new();
        let mut mass = problem.clamp(target / 2.0);

        for iteration in 1..=problem.max_iterations {
            let achieved = delivered(mass)?;
            if best.offer(problem, mass, achieved) <= problem.tolerance {
                return Ok(best.finish(problem, iteration));
            }
            if mass <= 0.0 || achieved <= 0.0 {
                return Ok(best.finish(problem, iteration));
            }
            let loss_fraction = 1.0 - achieved / mass;
            let next = problem.clamp(target / (1.0 - loss_fraction));
            if next == mass {
                return Ok(best.finish(problem, iteration));
            }
            mass = next;
        }

        Ok(best.finish(problem, problem.max_iterations))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn problem() -> SizingProblem {
        SizingProblem {
            target_mass_kg: 5000.0,
            lower_bound_kg: 0.0,
            upper_bound_kg: 20_000.0,
            tolerance: 1e-9,
            max_iterations: 50,
        }
    }

    #[test]
    fn test_constant_fraction_converges_in_two_steps() {
        let outcome = FixedPointSizer.size(&problem(), &|m| Ok(0.95 * m)).unwrap();
        assert!(outcome.converged);
        assert_eq!(outcome.iterations, 2);
        assert!((outcome.initial_mass_kg - 5000.0 / 0.95).abs() < 1e-6);
    }

    #[test]
    fn test_mass_dependent_loss() {
        // fixed 100 kg heel lost on top of 2 %
        let outcome = FixedPointSizer
            .size(&problem(), &|m: f64| Ok((0.98 * m - 100.0).max(0.0)))
            .unwrap();
        assert!(outcome.converged);
        assert!((outcome.achieved_mass_kg - 5000.0).abs() < 5000.0 * 1e-9);
    }

    #[test]
    fn test_total_loss_stops_early() {
        let outcome = FixedPointSizer.size(&problem(), &|_| Ok(0.0)).unwrap();
        assert!(!outcome.converged);
        assert_eq!(outcome.iterations, 1);
    }
}
