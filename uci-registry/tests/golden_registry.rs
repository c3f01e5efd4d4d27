use std::fs;

use serde_json::Value;
use uci_core::DashboardConfig;
use uci_registry::{parse_envelope_str, summarize_envelope_str};

fn fixture_path(name: &str) -> String {
    format!("{}/tests/data/{name}", env!("CARGO_MANIFEST_DIR"))
}

#[test]
fn registry_envelope_matches_golden() {
    let envelope = fs::read_to_string(fixture_path("icu_registry_envelope.json"))
        .expect("could not read sample envelope");

    let snapshot = summarize_envelope_str(&envelope, &DashboardConfig::default())
        .expect("could not build snapshot");

    let mut actual = serde_json::to_value(snapshot).expect("could not serialize snapshot");
    normalize_dynamic_fields(&mut actual);

    let expected = fs::read_to_string(fixture_path("icu_registry_snapshot.json"))
        .expect("could not read golden snapshot");

    let mut expected_value: Value = serde_json::from_str(&expected).expect("invalid golden");
    normalize_dynamic_fields(&mut expected_value);

    assert_eq!(actual, expected_value);
}

#[test]
fn table_limit_comes_from_config() {
    let envelope = fs::read_to_string(fixture_path("icu_registry_envelope.json"))
        .expect("could not read sample envelope");
    let config = DashboardConfig {
        table_limit: 2,
        ..DashboardConfig::default()
    };

    let snapshot = summarize_envelope_str(&envelope, &config).expect("could not build snapshot");

    let names: Vec<_> = snapshot
        .recent
        .iter()
        .filter_map(|record| record.patient_name.as_deref())
        .collect();
    assert_eq!(names, vec!["Pedro Soto", "Sin Registro"]);
    assert_eq!(snapshot.summary.total, 5);
    assert_eq!(parse_envelope_str(&envelope).map(|r| r.len()), Ok(5));
}

fn normalize_dynamic_fields(value: &mut Value) {
    if let Some(obj) = value.as_object_mut() {
        if obj.contains_key("generated_at") {
            obj.insert(
                "generated_at".to_string(),
                Value::String("__DYNAMIC_TIMESTAMP__".to_string()),
            );
        }
    }
}
