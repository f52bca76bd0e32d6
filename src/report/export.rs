//! Writing reports to disk: the rendered HTML page and a one-row CSV table
//! that opens directly in a spreadsheet.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use crate::models::SizingResult;

use super::fields::{format_number, REPORT_DATE_FORMAT};
use super::html::render_html;

/// Column headers of the spreadsheet export, in output order.
pub const CSV_HEADERS: [&str; 13] = [
    "Project",
    "Location",
    "Date",
    "Monthly consumption (kWh)",
    "Irradiation (kWh/m2/day)",
    "Required power (kW)",
    "Power with losses (kW)",
    "Panel (W)",
    "Modules",
    "Total area (m2)",
    "Total weight (kg)",
    "Inverter min (kW)",
    "Inverter max (kW)",
];

/// Write `result` as a header row plus a single data row.
pub fn write_csv<W: Write>(result: &SizingResult, writer: W) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(CSV_HEADERS)
        .context("failed to write CSV header")?;
    out.write_record([
        result.project_name.clone(),
        result.location.clone(),
        result.generated_date.format(REPORT_DATE_FORMAT).to_string(),
        format_number(result.monthly_consumption_kwh),
        format_number(result.daily_irradiation),
        format_number(result.required_power_kw),
        format_number(result.required_power_with_losses_kw),
        result.panel_power_watts.to_string(),
        result.module_count.to_string(),
        format_number(result.total_area_m2),
        result.total_weight_kg.to_string(),
        format_number(result.inverter_min_kw),
        format_number(result.inverter_max_kw),
    ])
    .context("failed to write CSV row")?;
    out.flush().context("failed to flush CSV output")?;
    Ok(())
}

/// Render the HTML report for saved report `id` into `dir`.
pub fn export_html(result: &SizingResult, id: i64, dir: &Path) -> Result<PathBuf> {
    let path = export_path(dir, id, "html")?;
    fs::write(&path, render_html(result))
        .with_context(|| format!("failed to write {}", path.display()))?;
    info!(id, path = %path.display(), "exported HTML report");
    Ok(path)
}

/// Write the spreadsheet export for saved report `id` into `dir`.
pub fn export_csv(result: &SizingResult, id: i64, dir: &Path) -> Result<PathBuf> {
    let path = export_path(dir, id, "csv")?;
    let file =
        fs::File::create(&path).with_context(|| format!("failed to create {}", path.display()))?;
    write_csv(result, file)?;
    info!(id, path = %path.display(), "exported CSV report");
    Ok(path)
}

fn export_path(dir: &Path, id: i64, extension: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create report directory {}", dir.display()))?;
    Ok(dir.join(format!("relatorio-{id}.{extension}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn result() -> SizingResult {
        SizingResult {
            project_name: "Escola, Anexo".into(),
            location: "Mossoró".into(),
            generated_date: NaiveDate::from_ymd_opt(2024, 8, 2).unwrap(),
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
            logo_base64: Some("iVBORw==".into()),
        }
    }

    #[test]
    fn csv_has_one_header_and_one_row() {
        let mut buffer = Vec::new();
        write_csv(&result(), &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Project,Location,Date"));
        assert_eq!(
            lines[1],
            "\"Escola, Anexo\",Mossoró,02/08/2024,500.0,5.0,3.33,4.0,400,10,19.0,200,3.0,4.4"
        );
    }

    #[test]
    fn exports_land_in_the_output_directory() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("reports");

        let html = export_html(&result(), 7, &dir).unwrap();
        let csv = export_csv(&result(), 7, &dir).unwrap();

        assert_eq!(html, dir.join("relatorio-7.html"));
        assert_eq!(csv, dir.join("relatorio-7.csv"));
        assert!(fs::read_to_string(html).unwrap().contains("data:image/png;base64,iVBORw=="));
        assert!(fs::read_to_string(csv).unwrap().contains("Mossoró"));
    }
}
