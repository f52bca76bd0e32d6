//! Photovoltaic kit sizing. A single pure function turns the project form into
//! a [`SizingResult`]; the generation date is passed in so runs are
//! reproducible.

use chrono::NaiveDate;
use tracing::debug;

use crate::errors::SizingError;
use crate::models::{PanelPower, ProjectInput, SizingResult};

/// Days used to turn monthly consumption into a daily figure.
pub const DAYS_PER_MONTH: f64 = 30.0;
/// Multiplier covering wiring, inverter and soiling losses.
pub const LOSS_FACTOR: f64 = 1.2;
/// Footprint of one module in square metres.
pub const PANEL_AREA_M2: f64 = 1.9;
/// Weight of one module in kilograms.
pub const PANEL_WEIGHT_KG: u32 = 20;
pub const INVERTER_MIN_RATIO: f64 = 0.9;
pub const INVERTER_MAX_RATIO: f64 = 1.1;
/// Lowest irradiation the form accepts; also keeps the division well defined.
pub const MIN_DAILY_IRRADIATION: f64 = 1.0;

/// Size a kit for `input`, stamping the result with `date`.
///
/// Module counts round half away from zero (`f64::round`), so 12.5 modules
/// become 13.
pub fn compute_sizing(input: &ProjectInput, date: NaiveDate) -> Result<SizingResult, SizingError> {
    let consumption = input.monthly_consumption_kwh;
    if !consumption.is_finite() || consumption < 0.0 {
        return Err(SizingError::invalid(
            "monthly_consumption_kwh",
            consumption,
            "must be a non-negative number",
        ));
    }

    let irradiation = input.daily_irradiation;
    if !irradiation.is_finite() || irradiation < MIN_DAILY_IRRADIATION {
        return Err(SizingError::invalid(
            "daily_irradiation",
            irradiation,
            "must be at least 1 kWh/m²/day",
        ));
    }

    let panel = PanelPower::try_from(input.panel_power_watts)?;

    let required_power = consumption / (irradiation * DAYS_PER_MONTH);
    let with_losses = required_power * LOSS_FACTOR;
    let modules = (with_losses * 1000.0 / f64::from(panel.watts())).round();
    let (module_count, total_weight_kg) = kit_counts(modules).ok_or_else(|| {
        SizingError::invalid(
            "monthly_consumption_kwh",
            consumption,
            "needs more modules than a single kit can hold",
        )
    })?;

    debug!(
        project = %input.name,
        required_power,
        with_losses,
        module_count,
        "computed kit sizing"
    );

    Ok(SizingResult {
        project_name: input.name.clone(),
        location: input.location.clone(),
        generated_date: date,
        monthly_consumption_kwh: consumption,
        daily_irradiation: irradiation,
        required_power_kw: round_to(required_power, 2),
        required_power_with_losses_kw: round_to(with_losses, 2),
        panel_power_watts: panel.watts(),
        module_count,
        total_area_m2: round_to(f64::from(module_count) * PANEL_AREA_M2, 2),
        total_weight_kg,
        inverter_min_kw: round_to(required_power * INVERTER_MIN_RATIO, 1),
        inverter_max_kw: round_to(with_losses * INVERTER_MAX_RATIO, 1),
        logo_base64: input.logo_base64.clone(),
    })
}

/// Module count and total weight, or `None` when either leaves `u32`.
fn kit_counts(modules: f64) -> Option<(u32, u32)> {
    if modules > f64::from(u32::MAX) {
        return None;
    }
    let count = modules as u32;
    Some((count, count.checked_mul(PANEL_WEIGHT_KG)?))
}

/// Round to a fixed number of decimals, half away from zero.
pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn input(consumption: f64, irradiation: f64, watts: u32) -> ProjectInput {
        ProjectInput {
            name: "Sítio Boa Vista".into(),
            location: "Petrolina".into(),
            monthly_consumption_kwh: consumption,
            daily_irradiation: irradiation,
            panel_power_watts: watts,
            logo_base64: None,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 17).unwrap()
    }

    #[test]
    fn reference_scenario_matches_published_figures() {
        let result = compute_sizing(&input(500.0, 5.0, 400), today()).unwrap();

        assert_relative_eq!(result.required_power_kw, 3.33);
        assert_relative_eq!(result.required_power_with_losses_kw, 4.0);
        assert_eq!(result.module_count, 10);
        assert_relative_eq!(result.total_area_m2, 19.0);
        assert_eq!(result.total_weight_kg, 200);
        assert_relative_eq!(result.inverter_min_kw, 3.0);
        assert_relative_eq!(result.inverter_max_kw, 4.4);
        assert_eq!(result.panel_power_watts, 400);
        assert_eq!(result.generated_date, today());
    }

    #[test]
    fn zero_irradiation_is_rejected() {
        let err = compute_sizing(&input(500.0, 0.0, 400), today()).unwrap_err();
        assert!(matches!(
            err,
            SizingError::InvalidInput {
                field: "daily_irradiation",
                ..
            }
        ));
    }

    #[test]
    fn irradiation_below_one_is_rejected() {
        assert!(compute_sizing(&input(500.0, 0.5, 400), today()).is_err());
        assert!(compute_sizing(&input(500.0, f64::NAN, 400), today()).is_err());
    }

    #[test]
    fn negative_consumption_is_rejected() {
        let err = compute_sizing(&input(-1.0, 5.0, 400), today()).unwrap_err();
        assert!(matches!(
            err,
            SizingError::InvalidInput {
                field: "monthly_consumption_kwh",
                ..
            }
        ));
    }

    #[test]
    fn unknown_panel_rating_is_rejected() {
        let err = compute_sizing(&input(500.0, 5.0, 500), today()).unwrap_err();
        assert!(matches!(
            err,
            SizingError::InvalidInput {
                field: "panel_power_watts",
                ..
            }
        ));
    }

    #[test]
    fn zero_consumption_needs_no_modules() {
        let result = compute_sizing(&input(0.0, 5.0, 330), today()).unwrap();
        assert_eq!(result.module_count, 0);
        assert_eq!(result.total_weight_kg, 0);
        assert_relative_eq!(result.total_area_m2, 0.0);
        assert_relative_eq!(result.inverter_min_kw, 0.0);
        assert_relative_eq!(result.inverter_max_kw, 0.0);
    }

    #[test]
    fn derived_quantities_follow_module_count() {
        for &(consumption, irradiation) in &[
            (120.0, 1.0),
            (350.0, 4.2),
            (987.5, 5.5),
            (2400.0, 6.1),
            (15000.0, 3.3),
        ] {
            for panel in PanelPower::ALL {
                let result =
                    compute_sizing(&input(consumption, irradiation, panel.watts()), today())
                        .unwrap();
                assert_relative_eq!(
                    result.total_area_m2,
                    round_to(f64::from(result.module_count) * PANEL_AREA_M2, 2)
                );
                assert_eq!(result.total_weight_kg, result.module_count * PANEL_WEIGHT_KG);
                assert!(result.inverter_min_kw <= result.inverter_max_kw);
            }
        }
    }

    #[test]
    fn oversized_consumption_is_rejected_instead_of_overflowing() {
        // 1e10 kWh at 5.0 with 330 W is about 2.4e8 modules, 4.8e9 kg.
        let err = compute_sizing(&input(1.0e10, 5.0, 330), today()).unwrap_err();
        assert!(matches!(
            err,
            SizingError::InvalidInput {
                field: "monthly_consumption_kwh",
                ..
            }
        ));
        assert!(compute_sizing(&input(f64::MAX, 1.0, 330), today()).is_err());
    }

    #[test]
    fn very_large_kits_are_still_sized() {
        // 1e9 kWh at 5.0 with 400 W: 2e10 W / 400 = 2e7 modules.
        let result = compute_sizing(&input(1.0e9, 5.0, 400), today()).unwrap();
        assert_eq!(result.module_count, 20_000_000);
        assert_eq!(result.total_weight_kg, 400_000_000);
    }

    #[test]
    fn module_count_rounds_half_away_from_zero() {
        // 375 kWh / (5 * 30) * 1.2 = 3 kW; 3000 / 400 = 7.5 modules.
        let result = compute_sizing(&input(375.0, 5.0, 400), today()).unwrap();
        assert_eq!(result.module_count, 8);
    }

    #[test]
    fn sizing_is_deterministic() {
        let mut project = input(640.0, 4.8, 450);
        project.logo_base64 = Some("iVBORw0KGgo=".into());
        let first = compute_sizing(&project, today()).unwrap();
        let second = compute_sizing(&project, today()).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.logo_base64.as_deref(), Some("iVBORw0KGgo="));
    }

    #[test]
    fn round_to_handles_one_and_two_decimals() {
        assert_relative_eq!(round_to(3.3333, 2), 3.33);
        assert_relative_eq!(round_to(4.400000000000001, 1), 4.4);
        assert_relative_eq!(round_to(2.25, 1), 2.3);
    }
}
