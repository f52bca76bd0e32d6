use crate::models::SizingResult;

pub const NOME_PROJETO: &str = "NOME_PROJETO";
pub const LOCALIZACAO: &str = "LOCALIZACAO";
pub const DATA: &str = "DATA";
pub const CONSUMO_MENSAL: &str = "CONSUMO_MENSAL";
pub const IRRADIACAO: &str = "IRRADIACAO";
pub const POTENCIA_NECESSARIA: &str = "POTENCIA_NECESSARIA";
pub const POTENCIA_COM_PERDAS: &str = "POTENCIA_COM_PERDAS";
pub const POTENCIA_PAINEL: &str = "POTENCIA_PAINEL";
pub const NUM_MODULOS: &str = "NUM_MODULOS";
pub const AREA_TOTAL: &str = "AREA_TOTAL";
pub const PESO_TOTAL: &str = "PESO_TOTAL";
pub const INVERSOR_MIN: &str = "INVERSOR_MIN";
pub const INVERSOR_MAX: &str = "INVERSOR_MAX";
pub const LOGO_BASE64: &str = "LOGO_BASE64";

/// Date layout printed on reports and stored in payloads.
pub const REPORT_DATE_FORMAT: &str = "%d/%m/%Y";

/// Flatten a result into the fixed key/value mapping consumed by the report
/// template. Order follows the layout of the printed report.
pub fn template_fields(result: &SizingResult) -> Vec<(&'static str, String)> {
    vec![
        (NOME_PROJETO, result.project_name.clone()),
        (LOCALIZACAO, result.location.clone()),
        (
            DATA,
            result.generated_date.format(REPORT_DATE_FORMAT).to_string(),
        ),
        (CONSUMO_MENSAL, format_number(result.monthly_consumption_kwh)),
        (IRRADIACAO, format_number(result.daily_irradiation)),
        (POTENCIA_NECESSARIA, format_number(result.required_power_kw)),
        (
            POTENCIA_COM_PERDAS,
            format_number(result.required_power_with_losses_kw),
        ),
        (POTENCIA_PAINEL, result.panel_power_watts.to_string()),
        (NUM_MODULOS, result.module_count.to_string()),
        (AREA_TOTAL, format_number(result.total_area_m2)),
        (PESO_TOTAL, result.total_weight_kg.to_string()),
        (INVERSOR_MIN, format_number(result.inverter_min_kw)),
        (INVERSOR_MAX, format_number(result.inverter_max_kw)),
        (LOGO_BASE64, result.logo_base64.clone().unwrap_or_default()),
    ]
}

/// Shortest text that reads back as the same float, always with a decimal
/// point (`19.0`, `3.33`).
pub fn format_number(value: f64) -> String {
    format!("{value:?}")
}
