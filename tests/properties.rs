use proptest::prelude::*;
use pv_design_core::{
    compute_electrical_configuration, project_financials, DesignParameters, InverterSpec,
    PanelSpec, ScenarioParameters,
};

fn panel(power_watts: f64, voc: f64, vmp_ratio: f64) -> PanelSpec {
    PanelSpec::new("Prop", "P", power_watts, 2.2)
        .with_electrical(voc, voc * vmp_ratio, 12.0, 11.0)
        .with_temp_coefficients(-0.0029, -0.0034)
}

fn inverter(power_ac_w: f64, mppt_channels: u32, vdc_max: f64) -> InverterSpec {
    InverterSpec::new("Prop", "I", power_ac_w, mppt_channels).with_dc_window(200.0, vdc_max)
}

prop_compose! {
    fn sizing_inputs()(
        power_watts in 300.0..700.0f64,
        voc in 35.0..55.0f64,
        vmp_ratio in 0.78..0.88f64,
        power_ac_w in prop::sample::select(vec![10_000.0, 50_000.0, 100_000.0, 250_000.0, 1_000_000.0]),
        mppt_channels in 1u32..12,
        vdc_max in prop::sample::select(vec![1000.0, 1100.0, 1500.0]),
        capacity_mw in 0.001..200.0f64,
        ratio in 1.0..2.0f64,
    ) -> (PanelSpec, InverterSpec, DesignParameters, f64) {
        (
            panel(power_watts, voc, vmp_ratio),
            inverter(power_ac_w, mppt_channels, vdc_max),
            DesignParameters::new("prop", capacity_mw),
            ratio,
        )
    }
}

proptest! {
    #[test]
    fn prop_string_length_within_window((panel, inverter, design, ratio) in sizing_inputs()) {
        let cfg = compute_electrical_configuration(&panel, &inverter, &design, ratio).unwrap();
        let limits = &cfg.voltage_limits;
        prop_assert!(limits.min_modules_per_string <= cfg.modules_per_string);
        prop_assert!(cfg.modules_per_string <= limits.max_modules_per_string);
        prop_assert!(limits.string_voc_cold_v <= limits.inverter_vdc_max);
    }

    #[test]
    fn prop_panel_accounting((panel, inverter, design, ratio) in sizing_inputs()) {
        let cfg = compute_electrical_configuration(&panel, &inverter, &design, ratio).unwrap();
        prop_assert!(cfg.panels_used <= cfg.total_panels);
        prop_assert_eq!(cfg.panels_used, cfg.total_strings * cfg.modules_per_string as u64);
        prop_assert_eq!(cfg.panels_used + cfg.panels_unused, cfg.total_panels);
    }

    #[test]
    fn prop_inverters_present_when_strings_exist((panel, inverter, design, ratio) in sizing_inputs()) {
        let cfg = compute_electrical_configuration(&panel, &inverter, &design, ratio).unwrap();
        if cfg.total_strings >= 1 {
            prop_assert!(cfg.strings_per_inverter >= 1);
            prop_assert!(cfg.total_inverters >= 1);
            prop_assert!(cfg.strings_per_inverter * cfg.total_inverters <= cfg.total_strings);
            prop_assert!(cfg.dc_ac_ratio.is_finite());
        } else {
            prop_assert_eq!(cfg.total_inverters, 0);
            prop_assert_eq!(cfg.dc_ac_ratio, 0.0);
        }
    }

    #[test]
    fn prop_sizing_is_idempotent((panel, inverter, design, ratio) in sizing_inputs()) {
        let first = compute_electrical_configuration(&panel, &inverter, &design, ratio).unwrap();
        let second = compute_electrical_configuration(&panel, &inverter, &design, ratio).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_energy_npv_decreases_with_discount_rate(
        production in 1.0..500_000.0f64,
        degradation in 0.0..0.02f64,
        low_rate in 0.0..0.2f64,
        step in 0.001..0.1f64,
    ) {
        let low = ScenarioParameters {
            discount_rate: low_rate,
            annual_degradation: degradation,
            ..Default::default()
        };
        let high = ScenarioParameters {
            discount_rate: low_rate + step,
            ..low.clone()
        };
        let a = project_financials(10.0, production, &low).unwrap();
        let b = project_financials(10.0, production, &high).unwrap();
        prop_assert!(b.energy_npv_mwh < a.energy_npv_mwh);
    }
}
