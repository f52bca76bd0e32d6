use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection};
use solar_kit_sizer::{compute_sizing, ProjectInput, ReportStore, SizingResult};
use tempfile::TempDir;

fn project(name: &str, consumption: f64) -> ProjectInput {
    ProjectInput {
        name: name.to_string(),
        location: "Juazeiro do Norte".to_string(),
        monthly_consumption_kwh: consumption,
        daily_irradiation: 5.0,
        panel_power_watts: 400,
        logo_base64: None,
    }
}

fn sized(name: &str, consumption: f64) -> SizingResult {
    let date = NaiveDate::from_ymd_opt(2024, 10, 1).unwrap();
    compute_sizing(&project(name, consumption), date).unwrap()
}

fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 10, day)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

#[test]
fn test_save_and_load_roundtrip() {
    let tmp = TempDir::new().unwrap();
    let mut store = ReportStore::open(&tmp.path().join("relatorios.db")).unwrap();
    store.initialize().unwrap();

    let mut result = sized("Galpão", 500.0);
    result.logo_base64 = Some("iVBORw0KGgo=".to_string());
    let id = store.save("Galpão", "Juazeiro do Norte", &result).unwrap();

    let loaded = store.load_by_id(id).unwrap().unwrap();
    assert_eq!(loaded, result);
}

#[test]
fn test_reports_survive_reopen() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("nested").join("relatorios.db");

    let id = {
        let mut store = ReportStore::open(&path).unwrap();
        store.initialize().unwrap();
        store.save("Casa", "Crato", &sized("Casa", 320.0)).unwrap()
    };

    let store = ReportStore::open(&path).unwrap();
    store.initialize().unwrap();
    assert_eq!(store.count().unwrap(), 1);
    assert_eq!(store.load_by_id(id).unwrap().unwrap().project_name, "Casa");
}

#[test]
fn test_list_orders_newest_first() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("relatorios.db");

    // Each save gets its own clock so the stored minutes differ.
    let stamps: [(fn() -> NaiveDateTime, &str); 3] = [
        (|| at(2, 8, 15), "Middle"),
        (|| at(3, 7, 0), "Newest"),
        (|| at(1, 23, 59), "Oldest"),
    ];
    for (clock, name) in stamps {
        let mut store = ReportStore::open(&path).unwrap().with_clock(clock);
        store.initialize().unwrap();
        store.save(name, "Iguatu", &sized(name, 450.0)).unwrap();
    }

    let store = ReportStore::open(&path).unwrap();
    let listed = store.list().unwrap();
    let names: Vec<&str> = listed.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Newest", "Middle", "Oldest"]);
    assert_eq!(listed[0].saved_at, at(3, 7, 0));
}

#[test]
fn test_n_saves_list_n_entries_with_increasing_ids() {
    let mut store = ReportStore::open_in_memory().unwrap();
    store.initialize().unwrap();

    let mut ids = Vec::new();
    for n in 0..5 {
        let name = format!("Projeto {n}");
        ids.push(store.save(&name, "Quixadá", &sized(&name, 100.0 * f64::from(n))).unwrap());
    }

    assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
    assert_eq!(store.list().unwrap().len(), 5);
}

#[test]
fn test_missing_report_is_none() {
    let mut store = ReportStore::open_in_memory().unwrap();
    store.initialize().unwrap();
    store.save("Único", "Tauá", &sized("Único", 200.0)).unwrap();

    assert!(store.load_by_id(9999).unwrap().is_none());
    assert!(store.load_by_id(-1).unwrap().is_none());
}

#[test]
fn test_operations_fail_without_schema() {
    let mut store = ReportStore::open_in_memory().unwrap();
    assert!(store.list().is_err());
    assert!(store.save("Sem tabela", "", &sized("x", 1.0)).is_err());
}

#[test]
fn test_reads_database_written_by_earlier_release() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("relatorios.db");
    {
        let conn = Connection::open(&path).unwrap();
        conn.execute(
            "CREATE TABLE relatorios (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                nome TEXT,
                local TEXT,
                data TEXT,
                dados_json TEXT
            )",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO relatorios (nome, local, data, dados_json) VALUES (?1, ?2, ?3, ?4)",
            params![
                "Fazenda",
                "Limoeiro",
                "2023-04-10 16:42",
                r#"{"NOME_PROJETO": "Fazenda", "LOCALIZACAO": "Limoeiro", "DATA": "10/04/2023", "CONSUMO_MENSAL": 500.0, "IRRADIACAO": 5.0, "POTENCIA_NECESSARIA": 3.33, "POTENCIA_COM_PERDAS": 4.0, "POTENCIA_PAINEL": 400, "NUM_MODULOS": 10, "AREA_TOTAL": 19.0, "PESO_TOTAL": 200, "INVERSOR_MIN": 3.0, "INVERSOR_MAX": 4.4, "LOGO_BASE64": ""}"#
            ],
        )
        .unwrap();
    }

    let mut store = ReportStore::open(&path).unwrap();
    store.initialize().unwrap();

    let listed = store.list().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "Fazenda");
    let legacy = store.load_by_id(listed[0].id).unwrap().unwrap();
    assert_eq!(legacy, {
        let mut expected = sized("Fazenda", 500.0);
        expected.location = "Limoeiro".to_string();
        expected.generated_date = NaiveDate::from_ymd_opt(2023, 4, 10).unwrap();
        expected
    });

    let id = store.save("Nova", "Limoeiro", &sized("Nova", 250.0)).unwrap();
    assert!(id > listed[0].id);
}
