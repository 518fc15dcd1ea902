use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::bog::RecoverySettings;
use crate::domain::{Carrier, Jurisdiction, JurisdictionTable, LegPolicies, SiteConditions};
use crate::economics::{OverheadsConfig, RouteRiskPremium};
use crate::error::Result;
use crate::stages::{
    ConversionConfig, PhaseChangeConfig, ProductionConfig, PumpTransferConfig,
    RoadTransportConfig, ShipLegConfig, ShipTransferConfig, StorageConfig,
};

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";
pub const ENV_PREFIX: &str = "ECT__";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scenario: ScenarioConfig,
    pub sizing: SizingConfig,
}

/// Conditions at the four nodes of the route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteSites {
    pub origin: SiteConditions,
    pub origin_port: SiteConditions,
    pub destination_port: SiteConditions,
    pub destination: SiteConditions,
}

impl Default for RouteSites {
    fn default() -> Self {
        let site = |name: &str| SiteConditions {
            name: name.to_string(),
            ..Default::default()
        };
        Self {
            origin: site("origin"),
            origin_port: site("origin_port"),
            destination_port: site("destination_port"),
            destination: site("destination"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageLegs {
    pub origin_port: StorageConfig,
    pub destination_port: StorageConfig,
    pub destination: StorageConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoadLegs {
    pub origin: RoadTransportConfig,
    pub destination: RoadTransportConfig,
}

/// Everything needed to build one pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub carrier: Carrier,
    /// Production plant sits at the export terminal; no inland haul
    pub origin_is_port: bool,
    /// Consumer sits at the import terminal; no inland haul
    pub destination_is_port: bool,
    pub sites: RouteSites,
    pub jurisdictions: JurisdictionTable,
    pub production: ProductionConfig,
    pub liquefaction: PhaseChangeConfig,
    pub transfer: PumpTransferConfig,
    pub road: RoadLegs,
    pub storage: StorageLegs,
    pub ship_transfer: ShipTransferConfig,
    pub ocean: ShipLegConfig,
    /// Vaporization at the consumer, when gaseous delivery is wanted
    pub regasification: Option<PhaseChangeConfig>,
    pub conversion: Option<ConversionConfig>,
    pub policies: LegPolicies,
    pub recovery: RecoverySettings,
    pub overheads: OverheadsConfig,
    pub insurance: RouteRiskPremium,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        let mut jurisdictions = JurisdictionTable::default();
        jurisdictions.insert(
            "default",
            Jurisdiction {
                carbon_price_per_tonne: 50.0,
                import_tariff_rate: 0.0,
                carbon_levy_fraction: None,
            },
        );
        Self {
            carrier: Carrier::Ammonia,
            origin_is_port: false,
            destination_is_port: false,
            sites: RouteSites::default(),
            jurisdictions,
            production: ProductionConfig::default(),
            liquefaction: PhaseChangeConfig::default(),
            transfer: PumpTransferConfig::default(),
            road: RoadLegs::default(),
            storage: StorageLegs::default(),
            ship_transfer: ShipTransferConfig::default(),
            ocean: ShipLegConfig::default(),
            regasification: None,
            conversion: None,
            policies: LegPolicies::default(),
            recovery: RecoverySettings::default(),
            overheads: OverheadsConfig::default(),
            insurance: RouteRiskPremium::default(),
        }
    }
}

impl ScenarioConfig {
    pub fn with_carrier(&self, carrier: Carrier) -> Self {
        Self {
            carrier,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizingMethod {
    #[default]
    Bisection,
    FixedPoint,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizingConfig {
    pub method: SizingMethod,
    /// Relative tolerance on delivered mass at ship loading
    pub tolerance: f64,
    pub max_iterations: u32,
    /// Upper search bound as a multiple of the target mass
    pub upper_bound_factor: f64,
    /// Fail the run instead of continuing with the best mass found
    pub require_convergence: bool,
}

impl Default for SizingConfig {
    fn default() -> Self {
        Self {
            method: SizingMethod::Bisection,
            tolerance: 1e-6,
            max_iterations: 200,
            upper_bound_factor: 4.0,
            require_convergence: true,
        }
    }
}

impl Config {
    /// Defaults file merged with `ECT__`-prefixed environment variables.
    pub fn load() -> Result<Self> {
        Self::from_file(DEFAULT_CONFIG_PATH)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let figment = Figment::new()
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));
        Ok(figment.extract()?)
    }

    pub fn from_toml(source: &str) -> Result<Self> {
        Ok(Figment::new().merge(Toml::string(source)).extract()?)
    }
}
