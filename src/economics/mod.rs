//! # Economic Aggregation
//!
//! Insurance is priced once on the produced cargo; the remaining overheads
//! (tariff, financing, brokerage, certification, contingency) are levied on
//! the whole shipment after the stage loop and kept apart from stage rows.

pub mod insurance;
pub mod overheads;

pub use insurance::{InsuranceCover, PremiumModel, RouteRiskPremium};
pub use overheads::{OverheadBasis, OverheadCharge, OverheadKind, OverheadsConfig};
