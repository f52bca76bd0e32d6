use std::path::Path;

use anyhow::{anyhow, Result};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::{PanelPower, ProjectInput};
use crate::report::{encode_logo, format_number};

/// Internal representation of the "new project" form fields. Numbers are kept
/// as the raw text the user typed until the form is submitted.
#[derive(Default, Clone)]
pub(crate) struct ProjectForm {
    pub(crate) name: String,
    pub(crate) location: String,
    pub(crate) consumption: String,
    pub(crate) irradiation: String,
    pub(crate) panel: PanelPower,
    pub(crate) logo_path: String,
    pub(crate) active: ProjectField,
    pub(crate) error: Option<String>,
}

/// Fields available within the project form, in tab order.
#[derive(Copy, Clone, PartialEq, Eq, Default, Debug)]
pub(crate) enum ProjectField {
    #[default]
    Name,
    Location,
    Consumption,
    Irradiation,
    Panel,
    Logo,
}

impl ProjectField {
    pub(crate) const ORDER: [ProjectField; 6] = [
        ProjectField::Name,
        ProjectField::Location,
        ProjectField::Consumption,
        ProjectField::Irradiation,
        ProjectField::Panel,
        ProjectField::Logo,
    ];

    /// Label rendered in front of the value. The cursor math depends on it.
    pub(crate) fn label(self) -> &'static str {
        match self {
            ProjectField::Name => "Project name",
            ProjectField::Location => "Location",
            ProjectField::Consumption => "Monthly consumption (kWh)",
            ProjectField::Irradiation => "Irradiation (kWh/m²/day)",
            ProjectField::Panel => "Panel power",
            ProjectField::Logo => "Logo file (png/jpg)",
        }
    }

    pub(crate) fn row(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }

    fn is_numeric(self) -> bool {
        matches!(self, ProjectField::Consumption | ProjectField::Irradiation)
    }
}

impl ProjectForm {
    /// Seed the form with the configured irradiation and panel.
    pub(crate) fn with_defaults(irradiation: f64, panel: PanelPower) -> Self {
        Self {
            irradiation: format_number(irradiation),
            panel,
            ..Self::default()
        }
    }

    /// Move focus forward, wrapping from the last field to the first.
    pub(crate) fn next_field(&mut self) {
        self.shift_focus(1);
    }

    pub(crate) fn previous_field(&mut self) {
        self.shift_focus(-1);
    }

    fn shift_focus(&mut self, offset: isize) {
        let len = ProjectField::ORDER.len() as isize;
        let idx = (self.active.row() as isize + offset).rem_euclid(len);
        self.active = ProjectField::ORDER[idx as usize];
    }

    /// Step the panel choice when it has focus. Returns whether anything
    /// changed so the caller knows to swallow the key.
    pub(crate) fn cycle_panel(&mut self, offset: isize) -> bool {
        if self.active != ProjectField::Panel {
            return false;
        }
        self.panel = self.panel.cycle(offset);
        true
    }

    /// Append a character to the active field, validating allowed input.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        let numeric = self.active.is_numeric();
        let Some(value) = self.active_text_mut() else {
            return false;
        };
        if numeric && !(ch.is_ascii_digit() || (ch == '.' && !value.contains('.'))) {
            return false;
        }
        value.push(ch);
        true
    }

    /// Remove the last character from the active field.
    pub(crate) fn backspace(&mut self) {
        if let Some(value) = self.active_text_mut() {
            value.pop();
        }
    }

    /// Text buffer behind the focused field. The panel has none; it is edited
    /// by cycling.
    fn active_text_mut(&mut self) -> Option<&mut String> {
        match self.active {
            ProjectField::Name => Some(&mut self.name),
            ProjectField::Location => Some(&mut self.location),
            ProjectField::Consumption => Some(&mut self.consumption),
            ProjectField::Irradiation => Some(&mut self.irradiation),
            ProjectField::Panel => None,
            ProjectField::Logo => Some(&mut self.logo_path),
        }
    }

    fn value(&self, field: ProjectField) -> String {
        match field {
            ProjectField::Name => self.name.clone(),
            ProjectField::Location => self.location.clone(),
            ProjectField::Consumption => self.consumption.clone(),
            ProjectField::Irradiation => self.irradiation.clone(),
            ProjectField::Panel => format!("< {} >", self.panel),
            ProjectField::Logo => self.logo_path.clone(),
        }
    }

    /// Turn the raw text into a [`ProjectInput`]. Only parsing happens here;
    /// range checks belong to the sizing engine. A logo path, when present,
    /// is read and encoded now.
    pub(crate) fn parse_inputs(&self) -> Result<ProjectInput> {
        let consumption = parse_number(&self.consumption, "Monthly consumption")?;
        let irradiation = parse_number(&self.irradiation, "Irradiation")?;

        let logo_path = self.logo_path.trim();
        let logo_base64 = if logo_path.is_empty() {
            None
        } else {
            Some(encode_logo(Path::new(logo_path))?)
        };

        Ok(ProjectInput {
            name: self.name.trim().to_string(),
            location: self.location.trim().to_string(),
            monthly_consumption_kwh: consumption,
            daily_irradiation: irradiation,
            panel_power_watts: self.panel.watts(),
            logo_base64,
        })
    }

    /// Render a single line for the form widget.
    pub(crate) fn build_line(&self, field: ProjectField) -> Line<'static> {
        let value = self.value(field);
        let is_active = self.active == field;

        let placeholder = match field {
            ProjectField::Consumption | ProjectField::Irradiation => "<required>",
            _ => "<optional>",
        };

        let display = if value.is_empty() {
            placeholder.to_string()
        } else {
            value.clone()
        };

        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        Line::from(vec![
            Span::raw(format!("{}: ", field.label())),
            Span::styled(display, style),
        ])
    }

    /// Return the character count for the requested field.
    pub(crate) fn value_len(&self, field: ProjectField) -> usize {
        self.value(field).chars().count()
    }
}

fn parse_number(raw: &str, label: &str) -> Result<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("{label} is required."));
    }
    trimmed
        .parse::<f64>()
        .map_err(|_| anyhow!("{label} must be a number."))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> ProjectForm {
        let mut form = ProjectForm::with_defaults(5.0, PanelPower::W400);
        form.name = "Mercado Sol".into();
        form.location = "Caruaru".into();
        form.consumption = "500".into();
        form
    }

    #[test]
    fn defaults_prefill_irradiation_and_panel() {
        let form = ProjectForm::with_defaults(5.0, PanelPower::W450);
        assert_eq!(form.irradiation, "5.0");
        assert_eq!(form.panel, PanelPower::W450);
        assert_eq!(form.active, ProjectField::Name);
    }

    #[test]
    fn numeric_fields_accept_a_single_decimal_point() {
        let mut form = ProjectForm::default();
        form.active = ProjectField::Irradiation;
        assert!(form.push_char('5'));
        assert!(form.push_char('.'));
        assert!(!form.push_char('.'));
        assert!(!form.push_char('x'));
        assert!(form.push_char('5'));
        assert_eq!(form.irradiation, "5.5");
    }

    #[test]
    fn panel_field_is_changed_by_cycling_only() {
        let mut form = ProjectForm::default();
        form.active = ProjectField::Panel;
        assert!(!form.push_char('4'));
        assert!(form.cycle_panel(1));
        assert_eq!(form.panel, PanelPower::W400);
        form.backspace();
        assert_eq!(form.panel, PanelPower::W400);
        assert!(form.logo_path.is_empty());
    }

    #[test]
    fn focus_wraps_both_ways() {
        let mut form = ProjectForm::default();
        form.previous_field();
        assert_eq!(form.active, ProjectField::Logo);
        form.next_field();
        assert_eq!(form.active, ProjectField::Name);
    }

    #[test]
    fn parse_inputs_builds_project_input() {
        let input = filled().parse_inputs().unwrap();
        assert_eq!(input.name, "Mercado Sol");
        assert_eq!(input.monthly_consumption_kwh, 500.0);
        assert_eq!(input.daily_irradiation, 5.0);
        assert_eq!(input.panel_power_watts, 400);
        assert_eq!(input.logo_base64, None);
    }

    #[test]
    fn parse_inputs_requires_consumption() {
        let mut form = filled();
        form.consumption.clear();
        let err = form.parse_inputs().unwrap_err();
        assert_eq!(err.to_string(), "Monthly consumption is required.");
    }

    #[test]
    fn parse_inputs_rejects_bad_logo_type() {
        let mut form = filled();
        form.logo_path = "logo.bmp".into();
        assert!(form.parse_inputs().is_err());
    }
}
