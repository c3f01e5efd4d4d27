//! Framework-neutral WASM <-> JavaScript bridge for the registry pipeline.

use serde::Deserialize;
use serde_wasm_bindgen::{from_value, to_value};
use uci_core::{normalize_sex, DashboardConfig, RegistryError};
use wasm_bindgen::prelude::*;

#[derive(Deserialize, Default)]
struct JsDashboardConfig {
    #[serde(default)]
    endpoint: Option<String>,
    #[serde(default)]
    table_limit: Option<usize>,
    #[serde(default)]
    source_label: Option<String>,
    #[serde(default)]
    discard_stale_refreshes: Option<bool>,
}

impl From<JsDashboardConfig> for DashboardConfig {
    fn from(cfg: JsDashboardConfig) -> Self {
        let mut base = DashboardConfig::default();
        if let Some(endpoint) = cfg.endpoint {
            base.endpoint = endpoint;
        }
        if let Some(limit) = cfg.table_limit {
            base.table_limit = limit;
        }
        if let Some(label) = cfg.source_label {
            base.source_label = label;
        }
        if let Some(discard) = cfg.discard_stale_refreshes {
            base.discard_stale_refreshes = discard;
        }
        base
    }
}

/// Turn a registry read envelope into the dashboard snapshot (summary,
/// chart datasets and table rows).
#[wasm_bindgen]
pub fn summarize_registry(
    envelope: JsValue,
    config: Option<JsValue>,
) -> Result<JsValue, JsValue> {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();

    let envelope_value = from_value::<serde_json::Value>(envelope)
        .map_err(|err| JsValue::from_str(&format!("Could not read JSON envelope: {err}")))?;

    let cfg = match config {
        Some(js_cfg) => {
            let cfg: JsDashboardConfig = from_value(js_cfg)
                .map_err(|err| JsValue::from_str(&format!("Could not read config: {err}")))?;
            DashboardConfig::from(cfg)
        }
        None => DashboardConfig::default(),
    };

    let snapshot = uci_registry::summarize_envelope_value(&envelope_value, &cfg)
        .map_err(|err| JsValue::from_str(&format_registry_error(err)))?;

    to_value(&snapshot)
        .map_err(|err| JsValue::from_str(&format!("Could not serialize snapshot: {err}")))
}

/// Canonical sex tag for a free-text value.
#[wasm_bindgen]
pub fn normalize_sex_code(raw: &str) -> String {
    normalize_sex(raw).to_string()
}

/// Default dashboard settings, for callers that want to tweak one field.
#[wasm_bindgen]
pub fn default_config() -> Result<JsValue, JsValue> {
    to_value(&DashboardConfig::default())
        .map_err(|err| JsValue::from_str(&format!("Could not serialize config: {err}")))
}

fn format_registry_error(err: RegistryError) -> String {
    match err.detail() {
        Some(detail) => format!("Registry error: {detail}"),
        None => format!("Registry error: {err}"),
    }
}
