//! Core data pipeline for the ICU registry dashboard: records, sex-code
//! normalization, aggregation and the bounded table projection.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::{self, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Serialize};

mod aggregate;
mod projection;
mod sex;

pub use aggregate::{
    aggregate, coerce_age, CategoryCount, CategoryCounts, ChartDataset, ChartKind,
    RegistryAggregate, SummaryStats, NO_DATA_PLACEHOLDER,
};
pub use projection::{project_recent, recent_records};
pub use sex::{normalize_sex, SexCode};

/// Default number of rows shown in the registry table.
pub const TABLE_LIMIT: usize = 50;

/// Default registry endpoint, relative to the page origin.
pub const DEFAULT_ENDPOINT: &str = "/api/uci/registros";

/// Wire names of the seven record fields, in table column order.
pub const FIELD_NAMES: [&str; 7] = [
    "fecha_de_ingreso",
    "fecha_de_egreso",
    "edad",
    "sexo",
    "condicion_al_egreso",
    "diagnostico",
    "nombre_y_apellido",
];

/// Table column headings, aligned with [`FIELD_NAMES`].
pub const COLUMN_TITLES: [&str; 7] = [
    "Ingreso",
    "Egreso",
    "Edad",
    "Sexo",
    "Condición al egreso",
    "Diagnóstico",
    "Nombre y apellido",
];

/// Dashboard settings shared by the controller, the JS bridge and the CLI.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardConfig {
    /// Registry endpoint used for both reads and writes.
    pub endpoint: String,
    /// Maximum number of rows in the table projection.
    pub table_limit: usize,
    /// Name of the backing sheet, shown in the connected status badge.
    pub source_label: String,
    /// Drop refresh responses that resolve after a newer refresh was applied.
    pub discard_stale_refreshes: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            table_limit: TABLE_LIMIT,
            source_label: "BASE_UCI".to_string(),
            discard_stale_refreshes: false,
        }
    }
}

/// One registry entry. Every field is optional text; the registry is a
/// spreadsheet and nothing guarantees a cell is filled in.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Record {
    #[serde(rename = "fecha_de_ingreso", default, deserialize_with = "loose_text")]
    pub admission_date: Option<String>,
    #[serde(rename = "fecha_de_egreso", default, deserialize_with = "loose_text")]
    pub discharge_date: Option<String>,
    #[serde(rename = "edad", default, deserialize_with = "loose_text")]
    pub age: Option<String>,
    #[serde(rename = "sexo", default, deserialize_with = "loose_text")]
    pub sex: Option<String>,
    #[serde(rename = "condicion_al_egreso", default, deserialize_with = "loose_text")]
    pub discharge_condition: Option<String>,
    #[serde(rename = "diagnostico", default, deserialize_with = "loose_text")]
    pub diagnosis: Option<String>,
    #[serde(rename = "nombre_y_apellido", default, deserialize_with = "loose_text")]
    pub patient_name: Option<String>,
}

impl Record {
    /// Table cells in column order; missing fields become empty cells.
    pub fn cells(&self) -> [&str; 7] {
        [
            &self.admission_date,
            &self.discharge_date,
            &self.age,
            &self.sex,
            &self.discharge_condition,
            &self.diagnosis,
            &self.patient_name,
        ]
        .map(|field| field.as_deref().unwrap_or_default())
    }

    /// Canonical sex tag of this record.
    pub fn sex_code(&self) -> SexCode {
        normalize_sex(self.sex.as_deref().unwrap_or_default())
    }

    /// Trimmed discharge condition, `None` when blank.
    pub fn condition_label(&self) -> Option<&str> {
        self.discharge_condition
            .as_deref()
            .map(str::trim)
            .filter(|label| !label.is_empty())
    }
}

/// A record as typed into the entry form. Serializes to the write payload,
/// where every field is sent as text.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecordDraft {
    #[serde(rename = "fecha_de_ingreso")]
    pub admission_date: String,
    #[serde(rename = "fecha_de_egreso")]
    pub discharge_date: String,
    #[serde(rename = "edad")]
    pub age: String,
    #[serde(rename = "sexo")]
    pub sex: String,
    #[serde(rename = "condicion_al_egreso")]
    pub discharge_condition: String,
    #[serde(rename = "diagnostico")]
    pub diagnosis: String,
    #[serde(rename = "nombre_y_apellido")]
    pub patient_name: String,
}

impl RecordDraft {
    /// Sets a field by its wire name. Unknown names are ignored.
    pub fn set_field(&mut self, name: &str, value: String) {
        match name {
            "fecha_de_ingreso" => self.admission_date = value,
            "fecha_de_egreso" => self.discharge_date = value,
            "edad" => self.age = value,
            "sexo" => self.sex = value,
            "condicion_al_egreso" => self.discharge_condition = value,
            "diagnostico" => self.diagnosis = value,
            "nombre_y_apellido" => self.patient_name = value,
            _ => {}
        }
    }
}

impl From<RecordDraft> for Record {
    fn from(draft: RecordDraft) -> Self {
        Self {
            admission_date: Some(draft.admission_date),
            discharge_date: Some(draft.discharge_date),
            age: Some(draft.age),
            sex: Some(draft.sex),
            discharge_condition: Some(draft.discharge_condition),
            diagnosis: Some(draft.diagnosis),
            patient_name: Some(draft.patient_name),
        }
    }
}

/// Everything one refresh cycle renders, computed from a single collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardSnapshot {
    pub generated_at: DateTime<Utc>,
    pub summary: SummaryStats,
    pub by_sex: CategoryCounts,
    pub by_condition: CategoryCounts,
    pub sex_chart: ChartDataset,
    pub condition_chart: ChartDataset,
    /// Most recent records first, at most `table_limit` of them.
    pub recent: Vec<Record>,
}

impl DashboardSnapshot {
    /// Runs the aggregator and the table projection over `records`.
    pub fn from_records(records: &[Record], config: &DashboardConfig) -> Self {
        let RegistryAggregate {
            summary,
            by_sex,
            by_condition,
        } = aggregate(records);

        Self {
            generated_at: Utc::now(),
            sex_chart: ChartDataset::by_sex(&by_sex),
            condition_chart: ChartDataset::by_condition(&by_condition),
            summary,
            by_sex,
            by_condition,
            recent: project_recent(records, config.table_limit),
        }
    }

    /// Record-count badge text.
    pub fn record_badge(&self) -> String {
        format!("{} registros", self.summary.total)
    }
}

/// Failures at the registry boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// Network failure or a response body that is not a JSON envelope.
    #[error("transport error: {0}")]
    Transport(String),
    /// The envelope arrived but its status is not "ok".
    #[error("registry rejected the request: {}", .detail.as_deref().unwrap_or("no detail"))]
    Application { detail: Option<String> },
}

impl RegistryError {
    /// Server-provided detail, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            RegistryError::Application { detail } => detail.as_deref(),
            RegistryError::Transport(_) => None,
        }
    }
}

/// Accepts strings, numbers and booleans as text; `null`, arrays and objects
/// become `None`.
fn loose_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    struct LooseText;

    impl<'de> Visitor<'de> for LooseText {
        type Value = Option<String>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a text cell")
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
            Ok(Some(value.to_string()))
        }

        fn visit_string<E: de::Error>(self, value: String) -> Result<Self::Value, E> {
            Ok(Some(value))
        }

        fn visit_bool<E: de::Error>(self, value: bool) -> Result<Self::Value, E> {
            Ok(Some(value.to_string()))
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
            Ok(Some(value.to_string()))
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
            Ok(Some(value.to_string()))
        }

        fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
            Ok(Some(value.to_string()))
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D2: Deserializer<'de>>(self, inner: D2) -> Result<Self::Value, D2::Error> {
            inner.deserialize_any(LooseText)
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            while seq.next_element::<IgnoredAny>()?.is_some() {}
            Ok(None)
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
            Ok(None)
        }
    }

    deserializer.deserialize_any(LooseText)
}

/// Builds a snapshot over an empty collection (used by mocks and first paint).
pub fn empty_snapshot() -> DashboardSnapshot {
    DashboardSnapshot::from_records(&[], &DashboardConfig::default())
}
