//! Inverse Sizing
//!
//! Finds the initial production mass that fills the vessel after all losses
//! up to and including ship loading:
//! - Bisection: bracketed search, always converges on a monotone curve
//! - Fixed point: loss-fraction iteration, fewer evaluations when losses are proportional

pub mod bisection;
pub mod fixed_point;
pub mod types;

pub use bisection::BisectionSizer;
pub use fixed_point::FixedPointSizer;
pub use types::{DeliveryFn, SizingOutcome, SizingProblem, SizingStrategy};

use crate::config::SizingMethod;

pub fn strategy_for(method: SizingMethod) -> Box<dyn SizingStrategy> {
    match method {
        SizingMethod::Bisection => Box::new(BisectionSizer),
        SizingMethod::FixedPoint => Box::new(FixedPointSizer),
    }
}
