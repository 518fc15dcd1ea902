use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// Reference ambient temperature for boil-off rate tables (°C)
pub const REFERENCE_AMBIENT_C: f64 = 25.0;

/// Chemical medium carrying the hydrogen payload
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Carrier {
    LiquefiedHydrogen,
    Ammonia,
    Methanol,
}

impl Carrier {
    fn index(self) -> usize {
        match self {
            Carrier::LiquefiedHydrogen => 0,
            Carrier::Ammonia => 1,
            Carrier::Methanol => 2,
        }
    }
}

/// Fractional boil-off rates at the 25 °C reference ambient
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoilOffRates {
    /// Fraction of mass lost per hour in pumped transfer lines
    pub transfer_per_hour: f64,
    /// Fraction lost per day in road tankers
    pub truck_per_day: f64,
    /// Fraction lost per day in stationary tanks
    pub storage_per_day: f64,
    /// Fraction lost per day in ship cargo tanks
    pub ship_per_day: f64,
    /// Relative rate change per kelvin of ambient offset from 25 °C
    pub temperature_slope_per_k: f64,
}

impl BoilOffRates {
    /// Linear ambient correction, floored at zero.
    pub fn temperature_factor(&self, ambient_c: f64) -> f64 {
        (1.0 + self.temperature_slope_per_k * (ambient_c - REFERENCE_AMBIENT_C)).max(0.0)
    }
}

/// Specific reliquefaction energy as a function of plant throughput.
///
/// `e(tpd) = floor + span * exp(-tpd / scale)`: small plants pay close to
/// `floor + span`, large plants saturate at `floor`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReliquefactionCurve {
    pub floor_kwh_per_kg: f64,
    pub span_kwh_per_kg: f64,
    pub scale_tpd: f64,
}

impl ReliquefactionCurve {
    pub fn specific_energy_kwh_per_kg(&self, throughput_tpd: f64) -> f64 {
        let tpd = throughput_tpd.max(0.0);
        if self.scale_tpd <= 0.0 {
            return self.floor_kwh_per_kg;
        }
        self.floor_kwh_per_kg + self.span_kwh_per_kg * (-tpd / self.scale_tpd).exp()
    }
}

/// Carrier-to-hydrogen conversion constants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HydrogenYield {
    /// kg H2 per kg carrier at full stoichiometric conversion
    pub stoichiometric_ratio: f64,
    /// Fraction of the stoichiometric hydrogen actually recovered
    pub conversion_efficiency: f64,
    /// Process energy per kg of produced hydrogen (kWh)
    pub energy_kwh_per_kg_h2: f64,
    /// CO2 released per kg of converted carrier (kg)
    pub process_co2_kg_per_kg: f64,
}

impl HydrogenYield {
    pub fn factor(&self) -> f64 {
        self.stoichiometric_ratio * self.conversion_efficiency
    }
}

/// Physical and process constants for one carrier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarrierProperties {
    pub carrier: Carrier,
    /// Liquid density (kg/m³)
    pub density_kg_m3: f64,
    /// Normal boiling point (°C)
    pub boiling_point_c: f64,
    /// Latent heat of vaporization (kJ/kg)
    pub latent_heat_kj_kg: f64,
    /// Specific heat used for sensible cooling (kJ/kg·K)
    pub specific_heat_kj_kg_k: f64,
    /// Higher heating value (MJ/kg)
    pub hhv_mj_kg: f64,
    /// Lower heating value (MJ/kg)
    pub lhv_mj_kg: f64,
    /// 100-year global warming potential of the vented vapour
    pub gwp100: f64,
    pub molar_mass_g_mol: f64,
    /// Electricity for synthesis at the origin site (kWh/kg carrier)
    pub production_energy_kwh_per_kg: f64,
    /// Coefficient of performance of the liquefaction train
    pub liquefaction_cop: f64,
    /// Coefficient of performance of heat-leak refrigeration at the boiling point
    pub refrigeration_cop: f64,
    /// CO2 from combusting one kg of vapour in a flare (kg)
    pub flare_co2_kg_per_kg: f64,
    pub boil_off: BoilOffRates,
    pub reliquefaction: ReliquefactionCurve,
    pub hydrogen_yield: HydrogenYield,
}

impl CarrierProperties {
    pub fn lhv_kwh_per_kg(&self) -> f64 {
        self.lhv_mj_kg / 3.6
    }

    /// Carrier must be kept below this ambient temperature to stay liquid.
    pub fn is_cold_at(&self, ambient_c: f64) -> bool {
        self.boiling_point_c < ambient_c
    }

    /// Temperature lift between ambient and the boiling point, floored at 0.
    pub fn cold_delta_k(&self, ambient_c: f64) -> f64 {
        (ambient_c - self.boiling_point_c).max(0.0)
    }

    pub fn liquefied_hydrogen() -> Self {
        Self {
            carrier: Carrier::LiquefiedHydrogen,
            density_kg_m3: 70.8,
            boiling_point_c: -252.87,
            latent_heat_kj_kg: 445.6,
            specific_heat_kj_kg_k: 14.3,
            hhv_mj_kg: 141.88,
            lhv_mj_kg: 119.96,
            gwp100: 11.6,
            molar_mass_g_mol: 2.016,
            production_energy_kwh_per_kg: 53.0,
            liquefaction_cop: 0.13,
            refrigeration_cop: 0.05,
            flare_co2_kg_per_kg: 0.0,
            boil_off: BoilOffRates {
                transfer_per_hour: 5.0e-4,
                truck_per_day: 1.0e-2,
                storage_per_day: 2.0e-3,
                ship_per_day: 2.0e-3,
                temperature_slope_per_k: 1.0 / 277.87,
            },
            reliquefaction: ReliquefactionCurve {
                floor_kwh_per_kg: 6.0,
                span_kwh_per_kg: 9.0,
                scale_tpd: 50.0,
            },
            hydrogen_yield: HydrogenYield {
                stoichiometric_ratio: 1.0,
                conversion_efficiency: 0.99,
                energy_kwh_per_kg_h2: 0.6,
                process_co2_kg_per_kg: 0.0,
            },
        }
    }

    pub fn ammonia() -> Self {
        Self {
            carrier: Carrier::Ammonia,
            density_kg_m3: 682.0,
            boiling_point_c: -33.34,
            latent_heat_kj_kg: 1371.0,
            specific_heat_kj_kg_k: 2.06,
            hhv_mj_kg: 22.5,
            lhv_mj_kg: 18.6,
            gwp100: 0.0,
            molar_mass_g_mol: 17.031,
            production_energy_kwh_per_kg: 10.2,
            liquefaction_cop: 2.0,
            refrigeration_cop: 1.5,
            flare_co2_kg_per_kg: 0.0,
            boil_off: BoilOffRates {
                transfer_per_hour: 1.0e-4,
                truck_per_day: 1.0e-3,
                storage_per_day: 4.0e-4,
                ship_per_day: 5.0e-4,
                temperature_slope_per_k: 1.0 / 58.34,
            },
            reliquefaction: ReliquefactionCurve {
                floor_kwh_per_kg: 0.1,
                span_kwh_per_kg: 0.4,
                scale_tpd: 20.0,
            },
            hydrogen_yield: HydrogenYield {
                // 2 NH3 -> N2 + 3 H2
                stoichiometric_ratio: 3.0 * 2.016 / (2.0 * 17.031),
                conversion_efficiency: 0.90,
                energy_kwh_per_kg_h2: 7.5,
                process_co2_kg_per_kg: 0.0,
            },
        }
    }

    pub fn methanol() -> Self {
        Self {
            carrier: Carrier::Methanol,
            density_kg_m3: 792.0,
            boiling_point_c: 64.7,
            latent_heat_kj_kg: 1100.0,
            specific_heat_kj_kg_k: 2.53,
            hhv_mj_kg: 22.7,
            lhv_mj_kg: 19.9,
            gwp100: 2.8,
            molar_mass_g_mol: 32.042,
            production_energy_kwh_per_kg: 11.5,
            liquefaction_cop: 2.5,
            refrigeration_cop: 3.0,
            flare_co2_kg_per_kg: 44.01 / 32.042,
            boil_off: BoilOffRates {
                transfer_per_hour: 1.0e-5,
                truck_per_day: 1.0e-4,
                storage_per_day: 2.0e-5,
                ship_per_day: 5.0e-5,
                temperature_slope_per_k: 0.01,
            },
            reliquefaction: ReliquefactionCurve {
                floor_kwh_per_kg: 0.05,
                span_kwh_per_kg: 0.2,
                scale_tpd: 20.0,
            },
            hydrogen_yield: HydrogenYield {
                // CH3OH + H2O -> CO2 + 3 H2
                stoichiometric_ratio: 3.0 * 2.016 / 32.042,
                conversion_efficiency: 0.85,
                energy_kwh_per_kg_h2: 5.5,
                process_co2_kg_per_kg: 44.01 / 32.042,
            },
        }
    }
}

/// Immutable property table, built once and passed by reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarrierPropertiesTable {
    entries: [CarrierProperties; 3],
}

impl Default for CarrierPropertiesTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl CarrierPropertiesTable {
    /// Literature point estimates for all carriers.
    pub fn standard() -> Self {
        Self {
            entries: [
                CarrierProperties::liquefied_hydrogen(),
                CarrierProperties::ammonia(),
                CarrierProperties::methanol(),
            ],
        }
    }

    pub fn get(&self, carrier: Carrier) -> &CarrierProperties {
        &self.entries[carrier.index()]
    }

    /// Returns a copy of the table with one carrier's entry replaced.
    pub fn with_properties(&self, properties: CarrierProperties) -> Self {
        let mut entries = self.entries.clone();
        let index = properties.carrier.index();
        entries[index] = properties;
        Self { entries }
    }

    pub fn iter(&self) -> impl Iterator<Item = &CarrierProperties> {
        Carrier::iter().map(move |c| self.get(c))
    }
}
