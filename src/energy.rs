//! Annual yield from panel area, a latitude irradiance proxy and losses.
//!
//! ```text
//! capacity_kw = panels * rated_power_w / 1000
//! irradiance  = max(0, base_irradiance - |latitude| * latitude_coefficient)
//! annual_kwh  = panel_area * irradiance * efficiency * (1 - system_loss) * shading
//! ```
use crate::packing::Layout;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct EnergyOptions {
    pub rated_power_w: f64,
    pub panel_efficiency: f64,
    pub system_loss: f64,
    /// kWh/m²/yr at the equator.
    pub base_irradiance: f64,
    /// kWh/m²/yr lost per degree of latitude.
    pub latitude_coefficient: f64,
    pub co2_factor_kg_per_kwh: f64,
}

impl Default for EnergyOptions {
    fn default() -> Self {
        Self {
            rated_power_w: 300.0,
            panel_efficiency: 0.20,
            system_loss: 0.14,
            base_irradiance: 2200.0,
            latitude_coefficient: 8.0,
            co2_factor_kg_per_kwh: 0.82,
        }
    }
}

impl EnergyOptions {
    pub fn validate(&self) -> Result<(), String> {
        if !(self.rated_power_w.is_finite() && self.rated_power_w >= 0.0) {
            return Err(format!("rated power must be non-negative, got {}", self.rated_power_w));
        }
        if !(self.panel_efficiency > 0.0 && self.panel_efficiency <= 1.0) {
            return Err(format!(
                "panel efficiency must lie in (0, 1], got {}",
                self.panel_efficiency
            ));
        }
        if !(self.system_loss >= 0.0 && self.system_loss < 1.0) {
            return Err(format!("system loss must lie in [0, 1), got {}", self.system_loss));
        }
        if !(self.co2_factor_kg_per_kwh.is_finite() && self.co2_factor_kg_per_kwh >= 0.0) {
            return Err(format!(
                "CO2 factor must be non-negative, got {}",
                self.co2_factor_kg_per_kwh
            ));
        }
        if !self.base_irradiance.is_finite() || !self.latitude_coefficient.is_finite() {
            return Err("irradiance constants must be finite".into());
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnergyEstimate {
    pub panel_count: usize,
    pub capacity_kw: f64,
    pub total_panel_area_m2: f64,
    pub irradiance_kwh_m2_year: f64,
    pub annual_kwh: f64,
    pub monthly_kwh: f64,
    pub daily_kwh: f64,
    pub co2_offset_kg_year: f64,
}

#[derive(Clone, Debug, Default)]
pub struct EnergyModel {
    options: EnergyOptions,
}

impl EnergyModel {
    pub fn new(options: EnergyOptions) -> Self {
        Self { options }
    }

    pub fn irradiance(&self, latitude: f64) -> f64 {
        (self.options.base_irradiance - latitude.abs() * self.options.latitude_coefficient).max(0.0)
    }

    pub fn estimate(&self, layout: &Layout, latitude: f64, shading: f64) -> EnergyEstimate {
        self.estimate_area(layout.len(), layout.total_panel_area_m2(), latitude, shading)
    }

    /// Yield for `panel_count` panels covering `panel_area_m2`.
    pub fn estimate_area(
        &self,
        panel_count: usize,
        panel_area_m2: f64,
        latitude: f64,
        shading: f64,
    ) -> EnergyEstimate {
        let irradiance = self.irradiance(latitude);
        if panel_count == 0 {
            return EnergyEstimate {
                irradiance_kwh_m2_year: irradiance,
                ..EnergyEstimate::default()
            };
        }
        let o = &self.options;
        let annual_kwh = panel_area_m2
            * irradiance
            * o.panel_efficiency
            * (1.0 - o.system_loss)
            * shading.clamp(0.0, 1.0);
        EnergyEstimate {
            panel_count,
            capacity_kw: panel_count as f64 * o.rated_power_w / 1000.0,
            total_panel_area_m2: panel_area_m2,
            irradiance_kwh_m2_year: irradiance,
            annual_kwh,
            monthly_kwh: annual_kwh / 12.0,
            daily_kwh: annual_kwh / 365.0,
            co2_offset_kg_year: annual_kwh * o.co2_factor_kg_per_kwh,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_installation() {
        let est = EnergyModel::default().estimate_area(25, 25.0 * 1.7, 28.6139, 1.0);
        assert!((est.capacity_kw - 7.5).abs() < 1e-12);
        assert!((est.irradiance_kwh_m2_year - 1971.0888).abs() < 1e-9);
        assert!((est.annual_kwh - 14_408.66).abs() < 0.01);
        assert!((est.monthly_kwh - 1_200.72).abs() < 0.01);
        assert!((est.daily_kwh - 39.476).abs() < 0.001);
        assert!((est.co2_offset_kg_year - 11_815.10).abs() < 0.01);
    }

    #[test]
    fn hemispheres_are_symmetric() {
        let model = EnergyModel::default();
        assert_eq!(model.irradiance(-33.9), model.irradiance(33.9));
    }

    #[test]
    fn irradiance_floors_at_zero() {
        let model = EnergyModel::new(EnergyOptions {
            latitude_coefficient: 30.0,
            ..EnergyOptions::default()
        });
        assert_eq!(model.irradiance(80.0), 0.0);
        assert_eq!(model.estimate_area(10, 17.0, 80.0, 1.0).annual_kwh, 0.0);
    }

    #[test]
    fn zero_panels_produce_zero_energy() {
        let est = EnergyModel::default().estimate(&Layout::empty(), 10.0, 1.0);
        assert_eq!(est.panel_count, 0);
        assert_eq!(est.annual_kwh, 0.0);
        assert_eq!(est.capacity_kw, 0.0);
    }

    #[test]
    fn shading_scales_yield_linearly() {
        let model = EnergyModel::default();
        let full = model.estimate_area(4, 6.8, 20.0, 1.0).annual_kwh;
        let half = model.estimate_area(4, 6.8, 20.0, 0.5).annual_kwh;
        assert!((half - 0.5 * full).abs() < 1e-9);
    }
}
