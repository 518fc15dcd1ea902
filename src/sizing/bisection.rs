use super::types::{BestSoFar, DeliveryFn, SizingOutcome, SizingProblem, SizingStrategy};
use crate::error::Result;

/// Bracketing search on the monotone delivered-mass curve.
///
/// Checks the upper bound first; if even that cannot reach the target the
/// best-found mass is returned unconverged. Otherwise probes the seed at half
/// the target and halves the bracket until the residual is within tolerance.
#[derive(Debug, Clone, Copy, Default)]
pub struct BisectionSizer;

impl SizingStrategy for BisectionSizer {
    fn name(&self) -> &'static str {
        "bisection"
    }

    fn size(&self, problem: &SizingProblem, delivered: &DeliveryFn<'_>) -> Result<SizingOutcome> {
        problem.validate()?;
        let target = problem.target_mass_kg;
        let mut best = BestSoFar::new();

        let mut lo = problem.lower_bound_kg;
        let mut hi = problem.upper_bound_kg;
        let at_hi = delivered(hi)?;
        if best.offer(problem, hi, at_hi) <= problem.tolerance || at_hi < target {
            return Ok(best.finish(problem, 1));
        }

        let mut mass = problem.clamp(target / 2.0);
        for iteration in 2..=problem.max_iterations {
            let achieved = delivered(mass)?;
            if best.offer(problem, mass, achieved) <= problem.tolerance {
                return Ok(best.finish(problem, iteration));
            }
            if achieved < target {
                lo = mass;
            } else {
                hi = mass;
            }
            mass = 0.5 * (lo + hi);
        }

        Ok(best.finish(problem, problem.max_iterations))
    }
}
