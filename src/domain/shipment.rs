use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use super::{Carrier, StageResult};
use crate::bog::BogPolicy;

/// Physical segment of the route a stage belongs to
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Leg {
    /// Production and liquefaction plant
    Origin,
    /// Truck haul from the plant to the export port
    InlandOrigin,
    /// Export terminal storage and ship loading
    OriginPort,
    Ocean,
    /// Import terminal unloading and storage
    DestinationPort,
    /// Truck haul from the import port to the consumer
    InlandDestination,
    /// Consumer storage and conversion
    Destination,
}

/// Boil-off policy per leg; legs left out of the configuration vent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LegPolicies {
    pub origin: BogPolicy,
    pub inland_origin: BogPolicy,
    pub origin_port: BogPolicy,
    pub ocean: BogPolicy,
    pub destination_port: BogPolicy,
    pub inland_destination: BogPolicy,
    pub destination: BogPolicy,
}

impl LegPolicies {
    pub fn uniform(policy: BogPolicy) -> Self {
        Self {
            origin: policy,
            inland_origin: policy,
            origin_port: policy,
            ocean: policy,
            destination_port: policy,
            inland_destination: policy,
            destination: policy,
        }
    }

    pub fn policy_for(&self, leg: Leg) -> BogPolicy {
        *self.slot(leg)
    }

    pub fn with(mut self, leg: Leg, policy: BogPolicy) -> Self {
        *self.slot_mut(leg) = policy;
        self
    }

    fn slot(&self, leg: Leg) -> &BogPolicy {
        match leg {
            Leg::Origin => &self.origin,
            Leg::InlandOrigin => &self.inland_origin,
            Leg::OriginPort => &self.origin_port,
            Leg::Ocean => &self.ocean,
            Leg::DestinationPort => &self.destination_port,
            Leg::InlandDestination => &self.inland_destination,
            Leg::Destination => &self.destination,
        }
    }

    fn slot_mut(&mut self, leg: Leg) -> &mut BogPolicy {
        match leg {
            Leg::Origin => &mut self.origin,
            Leg::InlandOrigin => &mut self.inland_origin,
            Leg::OriginPort => &mut self.origin_port,
            Leg::Ocean => &mut self.ocean,
            Leg::DestinationPort => &mut self.destination_port,
            Leg::InlandDestination => &mut self.inland_destination,
            Leg::Destination => &mut self.destination,
        }
    }
}

/// Cargo state threaded through the pipeline.
///
/// Never mutated in place; each stage produces the next shipment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shipment {
    pub mass_kg: f64,
    pub carrier: Carrier,
    /// Set once the carrier has been converted back to hydrogen
    pub converted: bool,
    pub policies: LegPolicies,
}

impl Shipment {
    pub fn new(mass_kg: f64, carrier: Carrier, policies: LegPolicies) -> Self {
        Self {
            mass_kg: mass_kg.max(0.0),
            carrier,
            converted: false,
            policies,
        }
    }

    /// Next shipment state after a stage.
    pub fn advance(&self, result: &StageResult) -> Self {
        Self {
            mass_kg: result.output_mass_kg.max(0.0),
            ..self.clone()
        }
    }

    pub fn into_hydrogen(self) -> Self {
        Self {
            converted: true,
            ..self
        }
    }

    pub fn policy_for(&self, leg: Leg) -> BogPolicy {
        self.policies.policy_for(leg)
    }
}
