use std::path::PathBuf;

use chrono::NaiveDateTime;

use leadclean_pipeline::engine::{load_csv_table, run_at};
use leadclean_pipeline::model::Table;
use leadclean_pipeline::{PipelineError, PostalCatalog, RunConfig};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn dt(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%d/%m/%Y %H:%M").unwrap()
}

const CONFIG: &str = r#"
name = "Weekly guias"
start_date = "2024-01-01"

[leads]
file = "leads.csv"

[catalog]
file = "catalog.csv"
"#;

fn load_fixture(name: &str, delimiter: u8) -> Table {
    let path = fixtures_dir().join(name);
    let data = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()));
    load_csv_table(&data, delimiter).unwrap()
}

fn column(table: &Table, name: &str) -> Vec<Option<String>> {
    let idx = table.column_index(name).unwrap();
    table
        .rows
        .iter()
        .map(|r| r[idx].as_str().map(|s| s.to_string()))
        .collect()
}

#[test]
fn full_run_against_fixtures() {
    let config = RunConfig::from_toml(CONFIG).unwrap();
    let leads = load_fixture("leads.csv", b',');
    let catalog_table = load_fixture("catalog.csv", b';');
    let catalog = PostalCatalog::from_table(&catalog_table, &config.catalog.column).unwrap();

    let output = run_at(&config, leads, &catalog, dt("30/06/2024 12:00")).unwrap();
    let summary = &output.report.summary;

    // 7 fixture rows: the "Ninguno" course lead is dropped before the date
    // filter, the 2023 lead by the filter, the phone-less lead and the older
    // duplicate phone by the phone pass.
    assert_eq!(summary.rows_before_date_filter, 6);
    assert_eq!(summary.rows_after_date_filter, 5);
    assert_eq!(summary.rows_after_phone_dedupe, 3);
    assert_eq!(summary.rows_after_email_dedupe, 3);
    assert!(output.report.warnings.is_empty());

    let table = &output.table;
    assert_eq!(
        column(table, "id"),
        vec![
            Some("azercaguias-2".into()),
            Some("azercaguias-3".into()),
            Some("azercaguias-5".into()),
        ]
    );

    // The later capture wins the duplicated phone.
    assert_eq!(
        column(table, "fecha_captacion")[0],
        Some("02/01/2024 09:00".into())
    );

    // Postal resolution: exact match kept, unknown code falls back to the
    // district, foreign lead cleared.
    assert_eq!(
        column(table, "cp_normalizado"),
        vec![Some("08027".into()), Some("28000".into()), None]
    );

    // Raw/working columns are gone, classification constants are stamped.
    assert!(!table.has_column("cp"));
    assert!(!table.has_column("locate_pais"));
    assert!(!table.has_column("nombre_curso"));
    assert_eq!(
        table.columns,
        vec![
            "id",
            "fecha_captacion",
            "name",
            "surname",
            "email",
            "telefono",
            "origen_dato",
            "nombre_guia_master",
            "poblacion",
            "cp_normalizado",
            "tipo_registro",
            "subtipo_registro",
            "marca",
            "subcanal",
        ]
    );
    assert_eq!(
        column(table, "tipo_registro"),
        vec![Some("Inbound".into()); 3]
    );
}

#[test]
fn end_to_end_three_row_example() {
    // 3 rows, duplicated phone on the first two, all emails distinct:
    // output keeps the later capture of the duplicated phone plus the
    // unique phone.
    let csv = "\
id,fecha,email,phone
1,01/01/2024 10:00,a@x.es,600111222
2,02/01/2024 09:00,b@x.es,600111222
3,01/01/2024 08:00,c@x.es,600333444
";
    let config = RunConfig::from_toml(CONFIG).unwrap();
    let leads = load_csv_table(csv, b',').unwrap();
    let catalog = PostalCatalog::from_codes(["08027"]);

    let output = run_at(&config, leads, &catalog, dt("30/06/2024 12:00")).unwrap();
    assert_eq!(output.table.len(), 2);
    assert_eq!(
        column(&output.table, "id"),
        vec![Some("azercaguias-2".into()), Some("azercaguias-3".into())]
    );
}

#[test]
fn phone_pass_runs_before_email_pass() {
    // A and B share a phone; B and C share an email. The phone pass removes
    // A before the email pass runs, and the email pass then collapses B
    // into C. Running the passes in the reverse order would have kept A.
    let csv = "\
id,fecha,email,phone
A,01/01/2024 10:00,e1@x.es,600111222
B,02/01/2024 10:00,e2@x.es,600111222
C,03/01/2024 10:00,e2@x.es,600999888
";
    let config = RunConfig::from_toml(CONFIG).unwrap();
    let leads = load_csv_table(csv, b',').unwrap();
    let catalog = PostalCatalog::from_codes(["08027"]);

    let output = run_at(&config, leads, &catalog, dt("30/06/2024 12:00")).unwrap();
    assert_eq!(
        column(&output.table, "id"),
        vec![Some("azercaguias-C".into())]
    );
    assert_eq!(output.report.summary.rows_after_phone_dedupe, 2);
    assert_eq!(output.report.summary.rows_after_email_dedupe, 1);
}

#[test]
fn keeping_null_keys_when_drops_are_disabled() {
    let csv = "\
id,fecha,email,phone
1,01/01/2024 10:00,,
2,02/01/2024 10:00,,
";
    let config = RunConfig::from_toml(
        r#"
name = "Keep nulls"
start_date = "2024-01-01"
drop_rows_without_phone = false
drop_rows_without_email = false

[leads]
file = "leads.csv"

[catalog]
file = "catalog.csv"
"#,
    )
    .unwrap();
    let leads = load_csv_table(csv, b',').unwrap();
    let catalog = PostalCatalog::from_codes(["08027"]);

    let output = run_at(&config, leads, &catalog, dt("30/06/2024 12:00")).unwrap();
    // Missing keys never collapse together: both rows survive.
    assert_eq!(output.table.len(), 2);
}

#[test]
fn missing_timestamp_column_aborts_with_no_output() {
    let csv = "id,email\n1,a@x.es\n";
    let config = RunConfig::from_toml(CONFIG).unwrap();
    let leads = load_csv_table(csv, b',').unwrap();
    let catalog = PostalCatalog::from_codes(["08027"]);

    let err = run_at(&config, leads, &catalog, dt("30/06/2024 12:00")).unwrap_err();
    assert!(matches!(err, PipelineError::MissingRequiredColumn(c) if c == "fecha_captacion"));
}

#[test]
fn degraded_source_warns_and_continues() {
    let csv = "id,fecha\n1,05/01/2024 10:00\n";
    let config = RunConfig::from_toml(CONFIG).unwrap();
    let leads = load_csv_table(csv, b',').unwrap();
    let catalog = PostalCatalog::from_codes(["08027"]);

    let output = run_at(&config, leads, &catalog, dt("30/06/2024 12:00")).unwrap();
    assert_eq!(output.table.len(), 1);
    assert!(output
        .report
        .warnings
        .iter()
        .any(|w| w.contains("'telefono'")));
    // Dedup passes are no-ops without their key columns.
    assert_eq!(output.report.summary.rows_after_phone_dedupe, 1);
}

#[test]
fn report_serializes_to_json() {
    let config = RunConfig::from_toml(CONFIG).unwrap();
    let leads = load_fixture("leads.csv", b',');
    let catalog_table = load_fixture("catalog.csv", b';');
    let catalog = PostalCatalog::from_table(&catalog_table, &config.catalog.column).unwrap();

    let output = run_at(&config, leads, &catalog, dt("30/06/2024 12:00")).unwrap();
    let json = serde_json::to_string_pretty(&output.report).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["meta"]["config_name"], "Weekly guias");
    assert_eq!(value["summary"]["rows_before_date_filter"], 6);
    assert_eq!(value["summary"]["date_filter"]["rows_removed"], 1);
}
