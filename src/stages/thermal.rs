//! Heat-leak and unit helpers shared by the stage models.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use validator::Validate;

pub const GRAVITY_M_S2: f64 = 9.81;
pub const KJ_PER_KWH: f64 = 3600.0;
pub const HOURS_PER_DAY: f64 = 24.0;
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Refrigeration electricity needed to remove `heat_w` for `hours`.
pub fn refrigeration_kwh(heat_w: f64, hours: f64, cop: f64) -> f64 {
    if cop <= 0.0 {
        return 0.0;
    }
    heat_w.max(0.0) * hours.max(0.0) / 1000.0 / cop
}

/// Surface of a sphere holding `volume_m3`.
pub fn sphere_surface_m2(volume_m3: f64) -> f64 {
    let radius = (3.0 * volume_m3.max(0.0) / (4.0 * PI)).cbrt();
    4.0 * PI * radius * radius
}

/// Tank wall as a metal layer and an insulation layer in series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct InsulatedShell {
    /// Wetted surface; derived from a spherical tank of the unit volume when unset
    #[validate(range(exclusive_min = 0.0))]
    pub surface_m2: Option<f64>,
    #[validate(range(min = 0.0))]
    pub metal_thickness_m: f64,
    #[validate(range(exclusive_min = 0.0))]
    pub metal_conductivity_w_mk: f64,
    #[validate(range(exclusive_min = 0.0))]
    pub insulation_thickness_m: f64,
    #[validate(range(exclusive_min = 0.0))]
    pub insulation_conductivity_w_mk: f64,
}

impl Default for InsulatedShell {
    fn default() -> Self {
        // Stainless inner wall with perlite fill
        Self {
            surface_m2: None,
            metal_thickness_m: 0.02,
            metal_conductivity_w_mk: 16.0,
            insulation_thickness_m: 0.5,
            insulation_conductivity_w_mk: 0.02,
        }
    }
}

impl InsulatedShell {
    pub fn surface_for(&self, volume_m3: f64) -> f64 {
        self.surface_m2
            .unwrap_or_else(|| sphere_surface_m2(volume_m3))
    }

    /// Conduction resistance of both layers over `area_m2` (K/W).
    pub fn resistance_k_per_w(&self, area_m2: f64) -> f64 {
        if area_m2 <= 0.0 {
            return f64::INFINITY;
        }
        self.metal_thickness_m / (self.metal_conductivity_w_mk * area_m2)
            + self.insulation_thickness_m / (self.insulation_conductivity_w_mk * area_m2)
    }

    /// Heat flowing in through one tank of `volume_m3` at a temperature lift of `delta_k`.
    pub fn heat_leak_w(&self, volume_m3: f64, delta_k: f64) -> f64 {
        let resistance = self.resistance_k_per_w(self.surface_for(volume_m3));
        if !resistance.is_finite() || resistance <= 0.0 {
            return 0.0;
        }
        delta_k.max(0.0) / resistance
    }
}

/// Insulated transfer line, conduction through a cylindrical layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct InsulatedPipe {
    #[validate(range(min = 0.0))]
    pub length_m: f64,
    #[validate(range(exclusive_min = 0.0))]
    pub inner_radius_m: f64,
    #[validate(range(exclusive_min = 0.0))]
    pub insulation_thickness_m: f64,
    #[validate(range(exclusive_min = 0.0))]
    pub insulation_conductivity_w_mk: f64,
}

impl Default for InsulatedPipe {
    fn default() -> Self {
        Self {
            length_m: 500.0,
            inner_radius_m: 0.15,
            insulation_thickness_m: 0.1,
            insulation_conductivity_w_mk: 0.02,
        }
    }
}

impl InsulatedPipe {
    /// Log-mean area of the insulation layer (m²).
    pub fn log_mean_area_m2(&self) -> f64 {
        let r_in = self.inner_radius_m;
        let r_out = r_in + self.insulation_thickness_m;
        if r_out <= r_in {
            return 2.0 * PI * r_in * self.length_m;
        }
        2.0 * PI * self.length_m * (r_out - r_in) / (r_out / r_in).ln()
    }

    pub fn heat_leak_w(&self, delta_k: f64) -> f64 {
        if self.insulation_thickness_m <= 0.0 {
            return 0.0;
        }
        self.insulation_conductivity_w_mk * self.log_mean_area_m2() * delta_k.max(0.0)
            / self.insulation_thickness_m
    }
}
