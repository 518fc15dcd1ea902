use std::sync::Arc;

use super::{Pipeline, PipelineStep};
use crate::config::ScenarioConfig;
use crate::domain::{CarrierPropertiesTable, Leg, ResolvedSite};
use crate::economics::InsuranceCover;
use crate::error::Result;
use crate::stages::{
    ConversionStage, OceanStage, PhaseChangeConfig, PhaseChangeStage, PhaseDirection,
    ProductionStage, PumpTransferStage, RoadTransportStage, ShipTransferStage, StorageStage,
    TransferDirection, UnitStage,
};

/// Assembles the canonical stage order for a scenario.
///
/// ```text
/// production → liquefaction → [pump → truck → pump] → port storage →
/// loading → ocean → unloading → port storage → [pump → truck → pump] →
/// storage → (vaporization) → (conversion)
/// ```
///
/// Bracketed inland legs are left out when the corresponding end of the
/// route is itself a port.
pub struct PipelineBuilder<'a> {
    scenario: &'a ScenarioConfig,
    table: &'a CarrierPropertiesTable,
}

struct ResolvedRoute {
    origin: ResolvedSite,
    origin_port: ResolvedSite,
    destination_port: ResolvedSite,
    destination: ResolvedSite,
}

impl<'a> PipelineBuilder<'a> {
    pub fn new(scenario: &'a ScenarioConfig, table: &'a CarrierPropertiesTable) -> Self {
        Self { scenario, table }
    }

    fn resolve_route(&self) -> Result<ResolvedRoute> {
        let table = &self.scenario.jurisdictions;
        let sites = &self.scenario.sites;
        Ok(ResolvedRoute {
            origin: table.resolve(&sites.origin)?,
            origin_port: table.resolve(&sites.origin_port)?,
            destination_port: table.resolve(&sites.destination_port)?,
            destination: table.resolve(&sites.destination)?,
        })
    }

    pub fn build(&self) -> Result<Pipeline> {
        let s = self.scenario;
        let route = self.resolve_route()?;
        let mut steps: Vec<PipelineStep> = Vec::new();
        let mut push = |label: &str, leg: Leg, stage: Arc<dyn UnitStage>| {
            steps.push(PipelineStep::new(label, leg, stage));
        };

        let cover = InsuranceCover::new(
            Arc::new(s.insurance.clone()),
            s.overheads.cargo_value_per_kg,
        );
        push(
            "production",
            Leg::Origin,
            Arc::new(
                ProductionStage::new(s.production.clone(), route.origin.clone()).with_insurance(cover),
            ),
        );

        let liquefaction = PhaseChangeConfig {
            direction: PhaseDirection::Liquefaction,
            ..s.liquefaction.clone()
        };
        push(
            "liquefaction",
            Leg::Origin,
            Arc::new(PhaseChangeStage::new(liquefaction, route.origin.clone())),
        );

        if !s.origin_is_port {
            push(
                "origin pump to truck",
                Leg::InlandOrigin,
                Arc::new(PumpTransferStage::new(s.transfer.clone(), route.origin.clone())),
            );
            push(
                "road to export port",
                Leg::InlandOrigin,
                Arc::new(RoadTransportStage::new(s.road.origin.clone(), route.origin.clone())),
            );
            push(
                "truck to export storage",
                Leg::InlandOrigin,
                Arc::new(PumpTransferStage::new(s.transfer.clone(), route.origin_port.clone())),
            );
        }

        push(
            "export port storage",
            Leg::OriginPort,
            Arc::new(StorageStage::new(s.storage.origin_port.clone(), route.origin_port.clone())),
        );
        push(
            "ship loading",
            Leg::OriginPort,
            Arc::new(ShipTransferStage::new(
                TransferDirection::Loading,
                s.ship_transfer.clone(),
                route.origin_port.clone(),
            )),
        );
        push(
            "ocean voyage",
            Leg::Ocean,
            Arc::new(OceanStage::new(
                s.ocean.clone(),
                route.destination_port.jurisdiction.clone(),
            )),
        );
        push(
            "ship unloading",
            Leg::DestinationPort,
            Arc::new(ShipTransferStage::new(
                TransferDirection::Unloading,
                s.ship_transfer.clone(),
                route.destination_port.clone(),
            )),
        );
        push(
            "import port storage",
            Leg::DestinationPort,
            Arc::new(StorageStage::new(
                s.storage.destination_port.clone(),
                route.destination_port.clone(),
            )),
        );

        if !s.destination_is_port {
            push(
                "port pump to truck",
                Leg::InlandDestination,
                Arc::new(PumpTransferStage::new(s.transfer.clone(), route.destination_port.clone())),
            );
            push(
                "road to consumer",
                Leg::InlandDestination,
                Arc::new(RoadTransportStage::new(
                    s.road.destination.clone(),
                    route.destination.clone(),
                )),
            );
            push(
                "truck to consumer storage",
                Leg::InlandDestination,
                Arc::new(PumpTransferStage::new(s.transfer.clone(), route.destination.clone())),
            );
        }

        push(
            "consumer storage",
            Leg::Destination,
            Arc::new(StorageStage::new(s.storage.destination.clone(), route.destination.clone())),
        );

        if let Some(regas) = &s.regasification {
            let regas = PhaseChangeConfig {
                direction: PhaseDirection::Vaporization,
                ..regas.clone()
            };
            push(
                "regasification",
                Leg::Destination,
                Arc::new(PhaseChangeStage::new(regas, route.destination.clone())),
            );
        }
        if let Some(conversion) = &s.conversion {
            push(
                "conversion to hydrogen",
                Leg::Destination,
                Arc::new(ConversionStage::new(conversion.clone(), route.destination.clone())),
            );
        }

        Pipeline::new(
            self.table.get(s.carrier).clone(),
            s.policies,
            s.recovery.clone(),
            steps,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Carrier, SiteConditions};
    use crate::stages::{ConversionConfig, StageKind};

    fn build(scenario: &ScenarioConfig) -> Result<Pipeline> {
        PipelineBuilder::new(scenario, &CarrierPropertiesTable::standard()).build()
    }

    #[test]
    fn test_full_inland_route_order() {
        let scenario = ScenarioConfig {
            conversion: Some(ConversionConfig::default()),
            ..Default::default()
        };
        let kinds = build(&scenario).unwrap().kinds();
        assert_eq!(
            kinds,
            vec![
                StageKind::Production,
                StageKind::Liquefaction,
                StageKind::PumpTransfer,
                StageKind::RoadTransport,
                StageKind::PumpTransfer,
                StageKind::Storage,
                StageKind::ShipLoading,
                StageKind::OceanTransport,
                StageKind::ShipUnloading,
                StageKind::Storage,
                StageKind::PumpTransfer,
                StageKind::RoadTransport,
                StageKind::PumpTransfer,
                StageKind::Storage,
                StageKind::Conversion,
            ]
        );
    }

    #[test]
    fn test_port_to_port_omits_inland_legs() {
        let scenario = ScenarioConfig {
            origin_is_port: true,
            destination_is_port: true,
            ..Default::default()
        };
        let pipeline = build(&scenario).unwrap();
        assert!(!pipeline.kinds().contains(&StageKind::RoadTransport));
        assert!(!pipeline.kinds().contains(&StageKind::PumpTransfer));
        assert_eq!(pipeline.steps().len(), 8);
    }

    #[test]
    fn test_truncated_through_ship_loading() {
        let pipeline = build(&ScenarioConfig::default()).unwrap();
        let head = pipeline.truncated_through(StageKind::ShipLoading).unwrap();
        assert_eq!(head.kinds().last(), Some(&StageKind::ShipLoading));
        assert_eq!(head.steps().len(), 7);

        let missing = pipeline.truncated_through(StageKind::Conversion).unwrap_err();
        assert!(missing.is_configuration());
    }

    #[test]
    fn test_unknown_jurisdiction_fails_before_running() {
        let mut scenario = ScenarioConfig::default();
        scenario.sites.destination = SiteConditions {
            country: "Nowhere".into(),
            ..Default::default()
        };
        assert!(build(&scenario).unwrap_err().is_configuration());
    }

    #[test]
    fn test_invalid_stage_config_names_stage() {
        let mut scenario = ScenarioConfig::default();
        scenario.storage.destination.duration_days = -2.0;
        match build(&scenario).unwrap_err() {
            crate::error::TransportError::Configuration { field, .. } => {
                assert!(field.starts_with("consumer storage"), "{field}");
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn test_carrier_comes_from_table() {
        let scenario = ScenarioConfig {
            carrier: Carrier::Methanol,
            ..Default::default()
        };
        let pipeline = build(&scenario).unwrap();
        assert_eq!(pipeline.carrier().carrier, Carrier::Methanol);
    }
}
