use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};
use tracing::debug;

use super::sizing::StringSizer;
use super::voltage::{vmp_at_hot, voc_at_cold};
use crate::config::EngineConfig;
use crate::domain::{check_capacity, DesignParameters, InverterSpec, PanelSpec};
use crate::error::{ensure_finite, DesignError, DesignResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FindingCode {
    NoPanelSelected,
    NoInverterSelected,
    NoInstallationArea,
    ElectricalNotConfigured,
    StringVocAboveMax,
    StringVmpBelowMin,
    HighDcAcRatio,
    LowDcAcRatio,
    TiltOutOfRange,
    NoTiltAngle,
    ZeroTiltAtLatitude,
    AzimuthOutOfRange,
    NoAzimuthAngle,
    AzimuthDeviation,
    EstimatedArea,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub code: FindingCode,
    pub message: String,
}

impl Finding {
    fn new(code: FindingCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Which parts of the design are in place
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignChecklist {
    pub name: String,
    pub capacity_mw: f64,
    pub panel_selected: bool,
    pub inverter_selected: bool,
    pub area_defined: bool,
    pub electrical_configured: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub ready_to_simulate: bool,
    pub errors: Vec<Finding>,
    pub warnings: Vec<Finding>,
    pub info: Vec<Finding>,
    pub design_summary: DesignChecklist,
}

impl ValidationReport {
    pub fn has_error(&self, code: FindingCode) -> bool {
        self.errors.iter().any(|f| f.code == code)
    }

    pub fn has_warning(&self, code: FindingCode) -> bool {
        self.warnings.iter().any(|f| f.code == code)
    }

    pub fn has_info(&self, code: FindingCode) -> bool {
        self.info.iter().any(|f| f.code == code)
    }
}

/// Advisory checks of a stored design against its components.
///
/// Uses the design's current `modules_per_string`; it never re-optimises.
/// Advisory conditions go into the report. Only non-finite numbers, a
/// non-positive capacity, an impossible latitude or missing electrical data
/// needed for a requested check are returned as errors.
pub fn validate_configuration(
    design: &DesignParameters,
    panel: Option<&PanelSpec>,
    inverter: Option<&InverterSpec>,
    project_latitude: Option<f64>,
) -> DesignResult<ValidationReport> {
    validate_configuration_with(design, panel, inverter, project_latitude, &EngineConfig::default())
}

/// [`validate_configuration`] with explicit engine constants
#[tracing::instrument(skip_all, fields(design = %design.name))]
pub fn validate_configuration_with(
    design: &DesignParameters,
    panel: Option<&PanelSpec>,
    inverter: Option<&InverterSpec>,
    project_latitude: Option<f64>,
    cfg: &EngineConfig,
) -> DesignResult<ValidationReport> {
    let capacity_mw = check_capacity(design.capacity_mw)?;
    if let Some(lat) = project_latitude {
        let lat = ensure_finite("project_latitude", lat)?;
        if !(-90.0..=90.0).contains(&lat) {
            return Err(DesignError::invalid_range("project_latitude", lat, "[-90, 90]"));
        }
    }

    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let mut info = Vec::new();

    if panel.is_none() {
        errors.push(Finding::new(FindingCode::NoPanelSelected, "No panel type selected"));
    }
    if inverter.is_none() {
        errors.push(Finding::new(FindingCode::NoInverterSelected, "No inverter type selected"));
    }
    if design.installation_area.is_none() {
        warnings.push(Finding::new(
            FindingCode::NoInstallationArea,
            "No installation area defined - required for shading analysis",
        ));
    }

    if let (Some(panel), Some(inverter)) = (panel, inverter) {
        match design.modules_per_string {
            Some(modules) => {
                let window = inverter.dc_window()?;
                let string_voc = modules as f64 * voc_at_cold(panel, cfg)?;
                let string_vmp = modules as f64 * vmp_at_hot(panel, cfg)?;
                debug!(modules, string_voc, string_vmp, "string voltages at design temperatures");

                if string_voc > window.vdc_max {
                    errors.push(Finding::new(
                        FindingCode::StringVocAboveMax,
                        format!(
                            "String voltage at minimum temperature ({:.1}V) exceeds inverter maximum ({}V)",
                            string_voc, window.vdc_max
                        ),
                    ));
                }
                if string_vmp < window.vdc_min {
                    errors.push(Finding::new(
                        FindingCode::StringVmpBelowMin,
                        format!(
                            "String voltage at maximum temperature ({:.1}V) is below inverter minimum ({}V)",
                            string_vmp, window.vdc_min
                        ),
                    ));
                }

                if let Some(total_inverters) = design.total_inverters.filter(|n| *n > 0) {
                    let total_ac_w = total_inverters as f64 * inverter.power_ac_w;
                    let ratio = if total_ac_w > 0.0 {
                        capacity_mw * 1_000_000.0 / total_ac_w
                    } else {
                        0.0
                    };
                    if ratio > cfg.high_dc_ac_warning {
                        warnings.push(Finding::new(
                            FindingCode::HighDcAcRatio,
                            format!(
                                "High DC/AC ratio ({:.2}) may result in significant clipping losses",
                                ratio
                            ),
                        ));
                    } else if ratio < cfg.low_dc_ac_warning {
                        warnings.push(Finding::new(
                            FindingCode::LowDcAcRatio,
                            format!(
                                "Low DC/AC ratio ({:.2}) may result in underutilized inverter capacity",
                                ratio
                            ),
                        ));
                    }
                }
            }
            None => warnings.push(Finding::new(
                FindingCode::ElectricalNotConfigured,
                "Electrical configuration not calculated",
            )),
        }
    }

    match design.tilt_angle {
        Some(tilt) => {
            let tilt = ensure_finite("design.tilt_angle", tilt)?;
            if !(0.0..=90.0).contains(&tilt) {
                errors.push(Finding::new(
                    FindingCode::TiltOutOfRange,
                    "Tilt angle must be between 0 and 90 degrees",
                ));
            } else if project_latitude.unwrap_or(0.0).abs() > cfg.zero_tilt_latitude_deg
                && tilt == 0.0
            {
                warnings.push(Finding::new(
                    FindingCode::ZeroTiltAtLatitude,
                    "Zero tilt angle may not be optimal for this latitude",
                ));
            }
        }
        None => warnings.push(Finding::new(FindingCode::NoTiltAngle, "No tilt angle specified")),
    }

    match design.azimuth_angle {
        Some(azimuth) => {
            let azimuth = ensure_finite("design.azimuth_angle", azimuth)?;
            if !(0.0..360.0).contains(&azimuth) {
                errors.push(Finding::new(
                    FindingCode::AzimuthOutOfRange,
                    "Azimuth angle must be between 0 and 359 degrees",
                ));
            }
            // Equator has no preferred facing
            if let Some(lat) = project_latitude.filter(|lat| *lat != 0.0) {
                let optimal = optimal_azimuth(lat);
                let deviation = (azimuth - optimal).abs();
                let threshold = cfg.azimuth_deviation_threshold_deg;
                if deviation > threshold && deviation < 360.0 - threshold {
                    info.push(Finding::new(
                        FindingCode::AzimuthDeviation,
                        format!(
                            "Azimuth angle deviates significantly from optimal ({}° for this hemisphere)",
                            optimal
                        ),
                    ));
                }
            }
        }
        None => warnings.push(Finding::new(FindingCode::NoAzimuthAngle, "No azimuth angle specified")),
    }

    if let Some(panel) = panel {
        let area_m2 = panel.count_for_capacity(capacity_mw) as f64 * panel.area_m2;
        info.push(Finding::new(
            FindingCode::EstimatedArea,
            format!(
                "Estimated area needed: {:.0} m² ({:.2} hectares)",
                area_m2,
                area_m2 / 10_000.0
            ),
        ));
    }

    let valid = errors.is_empty();
    let report = ValidationReport {
        valid,
        ready_to_simulate: valid && panel.is_some() && inverter.is_some(),
        errors,
        warnings,
        info,
        design_summary: DesignChecklist {
            name: design.name.clone(),
            capacity_mw,
            panel_selected: panel.is_some(),
            inverter_selected: inverter.is_some(),
            area_defined: design.installation_area.is_some(),
            electrical_configured: design.modules_per_string.is_some(),
        },
    };
    debug!(
        valid = report.valid,
        errors = report.errors.len(),
        warnings = report.warnings.len(),
        "design validated"
    );
    Ok(report)
}

impl StringSizer {
    /// [`validate_configuration`] with this sizer's constants
    pub fn validate_configuration(
        &self,
        design: &DesignParameters,
        panel: Option<&PanelSpec>,
        inverter: Option<&InverterSpec>,
        project_latitude: Option<f64>,
    ) -> DesignResult<ValidationReport> {
        validate_configuration_with(design, panel, inverter, project_latitude, self.config())
    }
}

/// Equator-facing azimuth: north (0°) south of the equator, south (180°) north of it
pub fn optimal_azimuth(latitude: f64) -> f64 {
    if latitude < 0.0 {
        0.0
    } else {
        180.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::InstallationArea;

    fn panel() -> PanelSpec {
        PanelSpec::new("Acme", "AS-550", 550.0, 2.58)
            .with_electrical(49.6, 41.8, 14.0, 13.2)
            .with_temp_coefficients(-0.0029, -0.0034)
    }

    fn inverter() -> InverterSpec {
        InverterSpec::new("Acme", "CI-1000", 1_000_000.0, 10).with_dc_window(200.0, 1100.0)
    }

    fn configured(capacity_mw: f64) -> DesignParameters {
        let mut d = DesignParameters::new("Site A", capacity_mw)
            .with_modules_per_string(19)
            .with_orientation(25.0, 180.0);
        d.total_inverters = Some(1);
        d.installation_area = Some(InstallationArea::polygon(vec![
            [0.0, 0.0],
            [0.0, 1.0],
            [1.0, 1.0],
            [0.0, 0.0],
        ]));
        d
    }

    fn run(design: &DesignParameters, lat: Option<f64>) -> ValidationReport {
        validate_configuration(design, Some(&panel()), Some(&inverter()), lat).unwrap()
    }

    #[test]
    fn test_clean_design() {
        let report = run(&configured(1.25), Some(40.0));
        assert!(report.valid);
        assert!(report.ready_to_simulate);
        assert!(report.errors.is_empty());
        assert!(report.warnings.is_empty(), "{:?}", report.warnings);
        assert!(report.has_info(FindingCode::EstimatedArea));
        assert!(report.design_summary.electrical_configured);
    }

    #[test]
    fn test_string_voltage_errors() {
        // 21 * 54.63 V = 1147 V > 1100 V
        let mut d = configured(1.25);
        d.modules_per_string = Some(21);
        let report = run(&d, Some(40.0));
        assert!(report.has_error(FindingCode::StringVocAboveMax));
        assert!(!report.valid);

        // 5 * 35.40 V = 177 V < 200 V
        d.modules_per_string = Some(5);
        let report = run(&d, Some(40.0));
        assert!(report.has_error(FindingCode::StringVmpBelowMin));
    }

    #[test]
    fn test_angles_reported_not_raised() {
        let mut d = configured(1.25);
        d.tilt_angle = Some(95.0);
        d.azimuth_angle = Some(400.0);
        let report = run(&d, Some(40.0));
        assert!(report.has_error(FindingCode::TiltOutOfRange));
        assert!(report.has_error(FindingCode::AzimuthOutOfRange));
    }

    #[test]
    fn test_azimuth_deviation_by_hemisphere() {
        let mut d = configured(1.25);
        d.azimuth_angle = Some(90.0);
        assert!(run(&d, Some(40.0)).has_info(FindingCode::AzimuthDeviation));

        d.azimuth_angle = Some(0.0);
        assert!(!run(&d, Some(-33.0)).has_info(FindingCode::AzimuthDeviation));
        assert!(run(&d, Some(33.0)).has_info(FindingCode::AzimuthDeviation));

        // 350° is 10° from north once wrapped
        d.azimuth_angle = Some(350.0);
        assert!(!run(&d, Some(-33.0)).has_info(FindingCode::AzimuthDeviation));

        // No latitude, no deviation check
        assert!(!run(&d, None).has_info(FindingCode::AzimuthDeviation));
    }

    #[test]
    fn test_zero_tilt_warning() {
        let mut d = configured(1.25);
        d.tilt_angle = Some(0.0);
        assert!(run(&d, Some(45.0)).has_warning(FindingCode::ZeroTiltAtLatitude));
        assert!(!run(&d, Some(10.0)).has_warning(FindingCode::ZeroTiltAtLatitude));
    }

    #[test]
    fn test_missing_pieces_are_findings() {
        let mut d = DesignParameters::new("bare", 1.0);
        d.azimuth_angle = None;
        let report = validate_configuration(&d, None, None, None).unwrap();
        assert!(report.has_error(FindingCode::NoPanelSelected));
        assert!(report.has_error(FindingCode::NoInverterSelected));
        assert!(report.has_warning(FindingCode::NoInstallationArea));
        assert!(report.has_warning(FindingCode::NoTiltAngle));
        assert!(report.has_warning(FindingCode::NoAzimuthAngle));
        assert!(!report.ready_to_simulate);

        let report = validate_configuration(&d, Some(&panel()), Some(&inverter()), None).unwrap();
        assert!(report.has_warning(FindingCode::ElectricalNotConfigured));
    }

    #[test]
    fn test_out_of_domain_inputs_raise() {
        let d = configured(1.25);
        let cfg = EngineConfig::default();
        assert!(matches!(
            validate_configuration_with(&d, Some(&panel()), Some(&inverter()), Some(120.0), &cfg),
            Err(DesignError::InvalidRange { field: "project_latitude", .. })
        ));

        let bare = InverterSpec::new("Acme", "CI-1000", 1_000_000.0, 10);
        assert!(matches!(
            validate_configuration_with(&d, Some(&panel()), Some(&bare), Some(40.0), &cfg),
            Err(DesignError::MissingComponentData { .. })
        ));
    }

    #[test]
    fn test_optimal_azimuth() {
        assert_eq!(optimal_azimuth(-10.0), 0.0);
        assert_eq!(optimal_azimuth(10.0), 180.0);
    }
}
