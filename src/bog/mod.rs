//! # Boil-off Gas Recirculation
//!
//! Every lossy stage hands its boil-off to [`BogSettings::apply`], which
//! vents, reliquefies, burns for auxiliary power, or flares it according to
//! the leg's [`BogPolicy`].

pub mod policy;

pub use policy::{BogOutcome, BogPolicy, BogSettings, RecoveryRequest, RecoverySettings};
