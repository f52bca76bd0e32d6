//! JSON encoding of a [`SizingResult`] for the `dados_json` column. The keys
//! are the report template names so a stored payload can be fed to the
//! renderer as-is, and `SCHEMA_VERSION` lets later releases add fields without
//! breaking rows written today.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::{StoreError, StoreResult};
use crate::models::SizingResult;

/// Version written by this build. Rows that predate versioning decode as 1.
pub const PAYLOAD_SCHEMA_VERSION: u32 = 1;

fn legacy_version() -> u32 {
    1
}

#[derive(Deserialize)]
struct VersionProbe {
    #[serde(rename = "SCHEMA_VERSION", default = "legacy_version")]
    schema_version: u32,
}

#[derive(Serialize, Deserialize)]
struct ReportPayload {
    #[serde(rename = "SCHEMA_VERSION", default = "legacy_version")]
    schema_version: u32,
    #[serde(rename = "NOME_PROJETO")]
    project_name: String,
    #[serde(rename = "LOCALIZACAO")]
    location: String,
    #[serde(rename = "DATA", with = "report_date")]
    generated_date: NaiveDate,
    #[serde(rename = "CONSUMO_MENSAL")]
    monthly_consumption_kwh: f64,
    #[serde(rename = "IRRADIACAO")]
    daily_irradiation: f64,
    #[serde(rename = "POTENCIA_NECESSARIA")]
    required_power_kw: f64,
    #[serde(rename = "POTENCIA_COM_PERDAS")]
    required_power_with_losses_kw: f64,
    #[serde(rename = "POTENCIA_PAINEL")]
    panel_power_watts: u32,
    #[serde(rename = "NUM_MODULOS")]
    module_count: u32,
    #[serde(rename = "AREA_TOTAL")]
    total_area_m2: f64,
    #[serde(rename = "PESO_TOTAL")]
    total_weight_kg: u32,
    #[serde(rename = "INVERSOR_MIN")]
    inverter_min_kw: f64,
    #[serde(rename = "INVERSOR_MAX")]
    inverter_max_kw: f64,
    #[serde(rename = "LOGO_BASE64", default, with = "blank_as_none")]
    logo_base64: Option<String>,
}

impl From<&SizingResult> for ReportPayload {
    fn from(result: &SizingResult) -> Self {
        Self {
            schema_version: PAYLOAD_SCHEMA_VERSION,
            project_name: result.project_name.clone(),
            location: result.location.clone(),
            generated_date: result.generated_date,
            monthly_consumption_kwh: result.monthly_consumption_kwh,
            daily_irradiation: result.daily_irradiation,
            required_power_kw: result.required_power_kw,
            required_power_with_losses_kw: result.required_power_with_losses_kw,
            panel_power_watts: result.panel_power_watts,
            module_count: result.module_count,
            total_area_m2: result.total_area_m2,
            total_weight_kg: result.total_weight_kg,
            inverter_min_kw: result.inverter_min_kw,
            inverter_max_kw: result.inverter_max_kw,
            logo_base64: result.logo_base64.clone(),
        }
    }
}

impl From<ReportPayload> for SizingResult {
    fn from(payload: ReportPayload) -> Self {
        Self {
            project_name: payload.project_name,
            location: payload.location,
            generated_date: payload.generated_date,
            monthly_consumption_kwh: payload.monthly_consumption_kwh,
            daily_irradiation: payload.daily_irradiation,
            required_power_kw: payload.required_power_kw,
            required_power_with_losses_kw: payload.required_power_with_losses_kw,
            panel_power_watts: payload.panel_power_watts,
            module_count: payload.module_count,
            total_area_m2: payload.total_area_m2,
            total_weight_kg: payload.total_weight_kg,
            inverter_min_kw: payload.inverter_min_kw,
            inverter_max_kw: payload.inverter_max_kw,
            logo_base64: payload.logo_base64,
        }
    }
}

/// Serialize a result into the stored JSON text.
pub fn encode_payload(result: &SizingResult) -> StoreResult<String> {
    serde_json::to_string(&ReportPayload::from(result)).map_err(|source| StoreError::Payload {
        action: "encode",
        source,
    })
}

/// Parse stored JSON text back into a result, rejecting versions newer than
/// this build understands.
pub fn decode_payload(json: &str) -> StoreResult<SizingResult> {
    let probe: VersionProbe = serde_json::from_str(json).map_err(|source| StoreError::Payload {
        action: "decode",
        source,
    })?;
    if probe.schema_version > PAYLOAD_SCHEMA_VERSION {
        return Err(StoreError::UnsupportedSchema {
            found: probe.schema_version,
            supported: PAYLOAD_SCHEMA_VERSION,
        });
    }

    let payload: ReportPayload =
        serde_json::from_str(json).map_err(|source| StoreError::Payload {
            action: "decode",
            source,
        })?;
    Ok(payload.into())
}

/// `DATA` is stored the way it is printed on the report: `dd/mm/YYYY`.
mod report_date {
    use chrono::NaiveDate;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%d/%m/%Y";

    pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&date.format(FORMAT))
    }

    pub fn deserialize<'de, D>(d: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(d)?;
        NaiveDate::parse_from_str(&raw, FORMAT)
            .map_err(|err| D::Error::custom(format!("invalid report date {raw:?}: {err}")))
    }
}

/// An absent logo is stored as an empty string rather than `null`.
mod blank_as_none {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(logo: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(logo.as_deref().unwrap_or(""))
    }

    pub fn deserialize<'de, D>(d: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(d)?;
        Ok(raw.filter(|logo| !logo.is_empty()))
    }
}
