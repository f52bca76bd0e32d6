//! Domain models shared by the sizing engine, the report store and the TUI.
//! These stay light-weight data holders; the arithmetic lives in `sizing` and
//! the persistence format lives in `db::payload`.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};

use crate::errors::SizingError;

/// Panel ratings offered by the kit catalogue. Anything else is rejected
/// before sizing starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PanelPower {
    #[default]
    W330,
    W400,
    W450,
}

impl PanelPower {
    /// Every rating in catalogue order. The form cycles through this list.
    pub const ALL: [PanelPower; 3] = [PanelPower::W330, PanelPower::W400, PanelPower::W450];

    pub fn watts(self) -> u32 {
        match self {
            PanelPower::W330 => 330,
            PanelPower::W400 => 400,
            PanelPower::W450 => 450,
        }
    }

    /// Step through the catalogue, wrapping at both ends.
    pub fn cycle(self, offset: isize) -> Self {
        let len = Self::ALL.len() as isize;
        let idx = Self::ALL.iter().position(|p| *p == self).unwrap_or(0) as isize;
        Self::ALL[(idx + offset).rem_euclid(len) as usize]
    }
}

impl TryFrom<u32> for PanelPower {
    type Error = SizingError;

    fn try_from(watts: u32) -> Result<Self, Self::Error> {
        PanelPower::ALL
            .into_iter()
            .find(|panel| panel.watts() == watts)
            .ok_or_else(|| {
                SizingError::invalid("panel_power_watts", watts, "must be one of 330, 400 or 450")
            })
    }
}

impl fmt::Display for PanelPower {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} W", self.watts())
    }
}

/// Everything the user typed into the project form. Transient: only the
/// derived [`SizingResult`] is ever stored.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectInput {
    pub name: String,
    pub location: String,
    pub monthly_consumption_kwh: f64,
    /// Average daily solar energy at the site, in kWh/m²/day.
    pub daily_irradiation: f64,
    /// Raw wattage as chosen by the caller. Validated against [`PanelPower`].
    pub panel_power_watts: u32,
    /// Company logo, already base64-encoded by the input layer.
    pub logo_base64: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
/// Snapshot of a sizing run. Power fields are rounded to two decimals and the
/// inverter window to one decimal; the module count is derived from the
/// unrounded power so the stored values never compound rounding error.
pub struct SizingResult {
    pub project_name: String,
    pub location: String,
    pub generated_date: NaiveDate,
    pub monthly_consumption_kwh: f64,
    pub daily_irradiation: f64,
    pub required_power_kw: f64,
    pub required_power_with_losses_kw: f64,
    pub panel_power_watts: u32,
    pub module_count: u32,
    pub total_area_m2: f64,
    pub total_weight_kg: u32,
    pub inverter_min_kw: f64,
    pub inverter_max_kw: f64,
    pub logo_base64: Option<String>,
}

/// Metadata row shown in the saved reports browser. The full payload is only
/// decoded once the user opens an entry.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSummary {
    pub id: i64,
    pub name: String,
    pub location: String,
    pub saved_at: NaiveDateTime,
}

impl ReportSummary {
    /// `Name - Location (YYYY-MM-DD HH:MM)`, skipping the hyphen when the
    /// location was left blank.
    pub fn display_title(&self) -> String {
        let stamp = self.saved_at.format("%Y-%m-%d %H:%M");
        if self.location.trim().is_empty() {
            format!("{} ({stamp})", self.name)
        } else {
            format!("{} - {} ({stamp})", self.name, self.location)
        }
    }
}
