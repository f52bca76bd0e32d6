use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

use crate::models::SizingResult;
use crate::report::{format_number, REPORT_DATE_FORMAT};

/// A single report opened either right after generation or from the saved
/// list. The result is a copy; the store keeps the original.
pub(crate) struct ReportScreen {
    pub(crate) id: i64,
    pub(crate) result: SizingResult,
    pub(crate) scroll: u16,
}

impl ReportScreen {
    pub(crate) fn new(id: i64, result: SizingResult) -> Self {
        Self {
            id,
            result,
            scroll: 0,
        }
    }

    pub(crate) fn scroll_by(&mut self, delta: i32) {
        let max = self.lines().len().saturating_sub(1) as i32;
        self.scroll = (i32::from(self.scroll) + delta).clamp(0, max) as u16;
    }

    /// Text body of the report view, grouped the same way as the HTML page.
    pub(crate) fn lines(&self) -> Vec<Line<'static>> {
        let r = &self.result;
        let heading = Style::default().add_modifier(Modifier::BOLD);

        let mut lines = vec![
            Line::from(Span::styled(r.project_name.clone(), heading)),
            Line::from(format!(
                "{}  •  {}",
                r.location,
                r.generated_date.format(REPORT_DATE_FORMAT)
            )),
            Line::from(""),
            Line::from(Span::styled("Project data", heading)),
            row("Monthly consumption", format!("{} kWh", format_number(r.monthly_consumption_kwh))),
            row("Irradiation", format!("{} kWh/m²/day", format_number(r.daily_irradiation))),
            row("Panel power", format!("{} W", r.panel_power_watts)),
            Line::from(""),
            Line::from(Span::styled("Sizing", heading)),
            row("Required power", format!("{} kWp", format_number(r.required_power_kw))),
            row(
                "Power with losses",
                format!("{} kWp", format_number(r.required_power_with_losses_kw)),
            ),
            row("Modules", r.module_count.to_string()),
            row("Total area", format!("{} m²", format_number(r.total_area_m2))),
            row("Total weight", format!("{} kg", r.total_weight_kg)),
            row(
                "Inverter",
                format!(
                    "{} to {} kW",
                    format_number(r.inverter_min_kw),
                    format_number(r.inverter_max_kw)
                ),
            ),
        ];

        if r.logo_base64.is_some() {
            lines.push(Line::from(""));
            lines.push(Line::from("Logo attached (shown in the HTML export)."));
        }

        lines
    }
}

fn row(label: &str, value: String) -> Line<'static> {
    Line::from(vec![Span::raw(format!("{label:<22}")), Span::raw(value)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn screen() -> ReportScreen {
        ReportScreen::new(
            3,
            SizingResult {
                project_name: "Posto Norte".into(),
                location: "Sobral".into(),
                generated_date: NaiveDate::from_ymd_opt(2024, 9, 9).unwrap(),
                monthly_consumption_kwh: 500.0,
                daily_irradiation: 5.0,
                required_power_kw: 3.33,
                required_power_with_losses_kw: 4.0,
                panel_power_watts: 400,
                module_count: 10,
                total_area_m2: 19.0,
                total_weight_kg: 200,
                inverter_min_kw: 3.0,
                inverter_max_kw: 4.4,
                logo_base64: None,
            },
        )
    }

    #[test]
    fn scroll_stays_within_content() {
        let mut screen = screen();
        screen.scroll_by(-3);
        assert_eq!(screen.scroll, 0);
        screen.scroll_by(1000);
        assert_eq!(usize::from(screen.scroll), screen.lines().len() - 1);
    }

    #[test]
    fn inverter_window_is_listed() {
        let text: Vec<String> = screen().lines().iter().map(|l| l.to_string()).collect();
        assert!(text.iter().any(|l| l.ends_with("3.0 to 4.4 kW")));
    }
}
