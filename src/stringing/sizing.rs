use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::voltage::StringBounds;
use crate::config::EngineConfig;
use crate::domain::{check_capacity, check_dc_ac_ratio, DesignParameters, InverterSpec, PanelSpec};
use crate::error::{DesignError, DesignResult};

/// Voltage limits behind a configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoltageLimits {
    pub min_modules_per_string: u32,
    pub max_modules_per_string: u32,
    /// Per-module values at the design temperatures
    pub voc_cold_v: f64,
    pub vmp_hot_v: f64,
    /// Whole-string values for the chosen string length
    pub string_voc_cold_v: f64,
    pub string_vmp_hot_v: f64,
    pub inverter_vdc_min: f64,
    pub inverter_vdc_max: f64,
}

/// Stringing result for one design. Derived data, recomputed on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElectricalConfiguration {
    pub total_panels: u64,
    pub panels_used: u64,
    pub panels_unused: u64,
    pub modules_per_string: u32,
    pub total_strings: u64,
    pub strings_per_inverter: u64,
    pub total_inverters: u64,
    /// Strings left over after distributing whole strings across inverters
    pub unassigned_strings: u64,
    pub strings_per_mppt: f64,
    pub dc_capacity_mw: f64,
    pub ac_capacity_mw: f64,
    pub dc_ac_ratio: f64,
    pub target_dc_ac_ratio: f64,
    /// Linear estimate, not a clipping simulation
    pub clipping_loss_percent: f64,
    pub voltage_limits: VoltageLimits,
    pub warnings: Vec<String>,
}

impl ElectricalConfiguration {
    pub fn is_empty(&self) -> bool {
        self.total_strings == 0
    }
}

/// String sizing and inverter matching engine
#[derive(Debug, Clone, Default)]
pub struct StringSizer {
    cfg: EngineConfig,
}

impl StringSizer {
    pub fn new(cfg: EngineConfig) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.cfg
    }

    /// Compute a stringing configuration for `design`.
    ///
    /// Steps:
    /// 1. Panel count from the target capacity
    /// 2. Temperature-corrected voltage window
    /// 3. String length: override clamped into the window, else closest to the target length
    /// 4. Strings, then inverters from the target DC/AC ratio
    /// 5. MPPT input limit
    /// 6. Achieved capacities and clipping estimate
    #[tracing::instrument(
        skip_all,
        fields(capacity_mw = design.capacity_mw, target_dc_ac_ratio = target_dc_ac_ratio)
    )]
    pub fn compute_electrical_configuration(
        &self,
        panel: &PanelSpec,
        inverter: &InverterSpec,
        design: &DesignParameters,
        target_dc_ac_ratio: f64,
    ) -> DesignResult<ElectricalConfiguration> {
        let capacity_mw = check_capacity(design.capacity_mw)?;
        let target_dc_ac_ratio = check_dc_ac_ratio(target_dc_ac_ratio)?;
        panel.check()?;
        inverter.check()?;
        if design.modules_per_string == Some(0) {
            return Err(DesignError::invalid_range("design.modules_per_string", 0.0, ">= 1"));
        }

        // Step 1
        let total_panels = panel.count_for_capacity(capacity_mw);

        // Step 2
        let bounds = StringBounds::compute(panel, inverter, &self.cfg)?;
        debug!(
            voc_cold = bounds.voc_cold_v,
            vmp_hot = bounds.vmp_hot_v,
            min_modules = bounds.min_modules,
            max_modules = bounds.max_modules,
            "voltage window"
        );

        // Step 3
        let mut warnings = Vec::new();
        let modules_per_string = match design.modules_per_string {
            Some(requested) => {
                let clamped = bounds.clamp(requested);
                if clamped != requested {
                    warn!(requested, clamped, "modules per string override outside voltage window");
                    warnings.push(format!(
                        "Requested {} modules per string is outside the voltage window [{}, {}]; using {}",
                        requested, bounds.min_modules, bounds.max_modules, clamped
                    ));
                }
                clamped
            }
            None => bounds.closest_to(self.cfg.target_modules_per_string),
        };

        // Step 4
        let total_strings = total_panels / modules_per_string as u64;
        let panels_used = total_strings * modules_per_string as u64;
        let panels_unused = total_panels - panels_used;
        if panels_unused > 0 {
            warnings.push(format!(
                "{} panels do not fill a complete string and are left unused",
                panels_unused
            ));
        }

        let voltage_limits = VoltageLimits {
            min_modules_per_string: bounds.min_modules,
            max_modules_per_string: bounds.max_modules,
            voc_cold_v: bounds.voc_cold_v,
            vmp_hot_v: bounds.vmp_hot_v,
            string_voc_cold_v: bounds.string_voc_cold(modules_per_string),
            string_vmp_hot_v: bounds.string_vmp_hot(modules_per_string),
            inverter_vdc_min: bounds.vdc_min,
            inverter_vdc_max: bounds.vdc_max,
        };

        if total_strings == 0 {
            warn!(total_panels, modules_per_string, "capacity too small for a single string");
            warnings.push(format!(
                "{} panels cannot form a single string of {} modules",
                total_panels, modules_per_string
            ));
            return Ok(ElectricalConfiguration {
                total_panels,
                panels_used: 0,
                panels_unused,
                modules_per_string,
                total_strings: 0,
                strings_per_inverter: 0,
                total_inverters: 0,
                unassigned_strings: 0,
                strings_per_mppt: 0.0,
                dc_capacity_mw: 0.0,
                ac_capacity_mw: 0.0,
                dc_ac_ratio: 0.0,
                target_dc_ac_ratio,
                clipping_loss_percent: 0.0,
                voltage_limits,
                warnings,
            });
        }

        let ac_capacity_needed_w = panels_used as f64 * panel.power_watts / target_dc_ac_ratio;
        let mut total_inverters = ((ac_capacity_needed_w / inverter.power_ac_w).round() as u64).max(1);

        let mut strings_per_inverter = total_strings / total_inverters;
        if strings_per_inverter == 0 {
            strings_per_inverter = 1;
            total_inverters = total_strings;
        }

        // Step 5
        let max_strings_per_inverter = inverter.mppt_channels as u64 * self.cfg.strings_per_mppt as u64;
        if max_strings_per_inverter > 0 && strings_per_inverter > max_strings_per_inverter {
            warn!(
                strings_per_inverter,
                max_strings_per_inverter, "MPPT input limit reached, adding inverters"
            );
            warnings.push(format!(
                "{} strings per inverter exceeds the MPPT limit of {}; clamped",
                strings_per_inverter, max_strings_per_inverter
            ));
            strings_per_inverter = max_strings_per_inverter;
            total_inverters = (total_strings / strings_per_inverter).max(1);
        }

        let unassigned_strings =
            total_strings.saturating_sub(strings_per_inverter * total_inverters);
        debug!(
            modules_per_string,
            total_strings, strings_per_inverter, total_inverters, unassigned_strings, "stringing"
        );

        // Step 6
        let dc_capacity_mw = panels_used as f64 * panel.power_watts / 1_000_000.0;
        let ac_capacity_mw = total_inverters as f64 * inverter.power_ac_w / 1_000_000.0;
        let dc_ac_ratio = if ac_capacity_mw > 0.0 {
            dc_capacity_mw / ac_capacity_mw
        } else {
            0.0
        };
        let clipping_loss_percent = ((dc_ac_ratio - self.cfg.clipping_ratio_threshold)
            * self.cfg.clipping_loss_slope)
            .max(0.0);
        let strings_per_mppt = strings_per_inverter as f64 / inverter.mppt_channels as f64;

        info!(
            total_inverters,
            dc_capacity_mw, ac_capacity_mw, dc_ac_ratio, "electrical configuration computed"
        );

        Ok(ElectricalConfiguration {
            total_panels,
            panels_used,
            panels_unused,
            modules_per_string,
            total_strings,
            strings_per_inverter,
            total_inverters,
            unassigned_strings,
            strings_per_mppt,
            dc_capacity_mw,
            ac_capacity_mw,
            dc_ac_ratio,
            target_dc_ac_ratio,
            clipping_loss_percent,
            voltage_limits,
            warnings,
        })
    }
}

/// [`StringSizer::compute_electrical_configuration`] with the built-in constants
pub fn compute_electrical_configuration(
    panel: &PanelSpec,
    inverter: &InverterSpec,
    design: &DesignParameters,
    target_dc_ac_ratio: f64,
) -> DesignResult<ElectricalConfiguration> {
    StringSizer::default().compute_electrical_configuration(panel, inverter, design, target_dc_ac_ratio)
}
