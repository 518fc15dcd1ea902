//! Cost, energy, emissions and boil-off model for shipping hydrogen as
//! liquefied hydrogen, ammonia or methanol.

pub mod bog;
pub mod config;
pub mod domain;
pub mod economics;
pub mod error;
pub mod pipeline;
pub mod planner;
pub mod sizing;
pub mod stages;
pub mod sweep;
pub mod telemetry;

pub use error::{Infeasibility, Result, TransportError};
