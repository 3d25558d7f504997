use serde::{Deserialize, Serialize};

use crate::domain::{check_capacity, DesignParameters, InverterSpec, ModuleOrientation, PanelSpec};
use crate::error::DesignResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacitySummary {
    pub dc_mw: f64,
    pub ac_mw: Option<f64>,
    /// Rounded to two decimals
    pub dc_ac_ratio: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelQuantity {
    pub manufacturer: String,
    pub model: String,
    pub power_w: f64,
    pub quantity: u64,
    pub total_area_m2: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InverterQuantity {
    pub manufacturer: String,
    pub model: String,
    pub power_ac_w: f64,
    pub quantity: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentSummary {
    pub panel: Option<PanelQuantity>,
    pub inverter: Option<InverterQuantity>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrientationSummary {
    pub tilt_angle: Option<f64>,
    pub azimuth_angle: Option<f64>,
    pub row_spacing: Option<f64>,
    pub module_orientation: ModuleOrientation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StringSummary {
    pub modules_per_string: u32,
    pub strings_per_inverter: Option<u32>,
    /// Known only when a panel is selected
    pub total_strings: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaSummary {
    pub defined: bool,
    pub estimated_m2: Option<f64>,
}

/// Bill of quantities and headline figures of a stored design.
///
/// Works from the stored design fields only; nothing is re-sized here.
/// Angles are reported as stored, so a design with findings still summarises.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignSummary {
    pub name: String,
    pub capacity: CapacitySummary,
    pub components: ComponentSummary,
    pub configuration: OrientationSummary,
    pub electrical: Option<StringSummary>,
    pub area: AreaSummary,
}

impl DesignSummary {
    pub fn build(
        design: &DesignParameters,
        panel: Option<&PanelSpec>,
        inverter: Option<&InverterSpec>,
    ) -> DesignResult<Self> {
        check_capacity(design.capacity_mw)?;

        let total_panels = panel.map(|p| p.count_for_capacity(design.capacity_mw));

        let panel_quantity = panel.zip(total_panels).map(|(p, quantity)| PanelQuantity {
            manufacturer: p.manufacturer.clone(),
            model: p.model.clone(),
            power_w: p.power_watts,
            quantity,
            total_area_m2: quantity as f64 * p.area_m2,
        });

        let mut capacity = CapacitySummary {
            dc_mw: design.capacity_mw,
            ac_mw: None,
            dc_ac_ratio: None,
        };
        let inverter_quantity = inverter.map(|inv| {
            let quantity = design.total_inverters.unwrap_or(0);
            if quantity > 0 && inv.power_ac_w > 0.0 {
                let ac_mw = quantity as f64 * inv.power_ac_w / 1_000_000.0;
                capacity.ac_mw = Some(ac_mw);
                capacity.dc_ac_ratio = Some(round2(design.capacity_mw / ac_mw));
            }
            InverterQuantity {
                manufacturer: inv.manufacturer.clone(),
                model: inv.model.clone(),
                power_ac_w: inv.power_ac_w,
                quantity,
            }
        });

        let electrical = design
            .modules_per_string
            .filter(|m| *m > 0)
            .map(|modules| StringSummary {
                modules_per_string: modules,
                strings_per_inverter: design.strings_per_inverter,
                total_strings: total_panels.map(|n| n / modules as u64),
            });

        Ok(Self {
            name: design.name.clone(),
            capacity,
            components: ComponentSummary {
                panel: panel_quantity.clone(),
                inverter: inverter_quantity,
            },
            configuration: OrientationSummary {
                tilt_angle: design.tilt_angle,
                azimuth_angle: design.azimuth_angle,
                row_spacing: design.row_spacing,
                module_orientation: design.module_orientation,
            },
            electrical,
            area: AreaSummary {
                defined: design.installation_area.is_some(),
                estimated_m2: panel_quantity.map(|p| p.total_area_m2),
            },
        })
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn panel() -> PanelSpec {
        PanelSpec::new("Acme", "AS-550", 550.0, 2.5)
            .with_electrical(49.6, 41.8, 14.0, 13.2)
    }

    fn inverter() -> InverterSpec {
        InverterSpec::new("Acme", "CI-100", 100_000.0, 10).with_dc_window(200.0, 1100.0)
    }

    #[test]
    fn test_full_summary() {
        let mut design = DesignParameters::new("North field", 1.0).with_modules_per_string(19);
        design.total_inverters = Some(8);
        design.strings_per_inverter = Some(11);

        let summary = DesignSummary::build(&design, Some(&panel()), Some(&inverter())).unwrap();

        let panels = summary.components.panel.as_ref().unwrap();
        assert_eq!(panels.quantity, 1818);
        assert_relative_eq!(panels.total_area_m2, 4545.0);
        assert_eq!(summary.area.estimated_m2, Some(panels.total_area_m2));
        assert!(!summary.area.defined);

        assert_eq!(summary.components.inverter.as_ref().unwrap().quantity, 8);
        assert_relative_eq!(summary.capacity.ac_mw.unwrap(), 0.8);
        assert_eq!(summary.capacity.dc_ac_ratio, Some(1.25));

        let electrical = summary.electrical.unwrap();
        assert_eq!(electrical.total_strings, Some(95));
        assert_eq!(electrical.strings_per_inverter, Some(11));
    }

    #[test]
    fn test_summary_without_components() {
        let design = DesignParameters::new("Draft", 5.0);
        let summary = DesignSummary::build(&design, None, None).unwrap();
        assert!(summary.components.panel.is_none());
        assert!(summary.components.inverter.is_none());
        assert!(summary.capacity.ac_mw.is_none());
        assert!(summary.electrical.is_none());
        assert!(summary.area.estimated_m2.is_none());
    }

    #[test]
    fn test_out_of_range_angles_kept_as_stored() {
        let design = DesignParameters::new("Steep", 1.0).with_orientation(95.0, 180.0);
        let summary = DesignSummary::build(&design, Some(&panel()), None).unwrap();
        assert_eq!(summary.configuration.tilt_angle, Some(95.0));

        let empty = DesignParameters::new("Empty", 0.0);
        assert!(DesignSummary::build(&empty, None, None).is_err());
    }

    #[test]
    fn test_inverter_without_count() {
        let design = DesignParameters::new("Draft", 5.0);
        let summary = DesignSummary::build(&design, None, Some(&inverter())).unwrap();
        assert_eq!(summary.components.inverter.unwrap().quantity, 0);
        assert!(summary.capacity.dc_ac_ratio.is_none());
    }
}
