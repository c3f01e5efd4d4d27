//! In-memory collaborators for controller and submitter tests.

use std::cell::{Cell, RefCell};

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeZone};
use uci_core::{ChartDataset, ChartKind, Record, RecordDraft, RegistryError, SummaryStats};

use crate::{
    ConnectionStatus, DashboardView, Notifier, RecordForm, RegistryTransport, SubmitControl,
};

pub fn fixed_clock() -> DateTime<Local> {
    Local
        .with_ymd_and_hms(2024, 5, 6, 7, 8, 9)
        .earliest()
        .expect("fixed test time")
}

pub fn patient(name: &str, sex: &str, age: &str, condition: &str) -> Record {
    Record {
        admission_date: Some("2024-05-01".into()),
        age: Some(age.into()),
        sex: Some(sex.into()),
        discharge_condition: Some(condition.into()),
        patient_name: Some(name.into()),
        ..Record::default()
    }
}

/// Registry that appends accepted drafts to its own collection.
#[derive(Default)]
pub struct FakeRegistry {
    records: RefCell<Vec<Record>>,
    read_failure: RefCell<Option<RegistryError>>,
    write_failure: RefCell<Option<RegistryError>>,
    reads: Cell<usize>,
    writes: Cell<usize>,
}

impl FakeRegistry {
    pub fn with_records(records: Vec<Record>) -> Self {
        Self {
            records: RefCell::new(records),
            ..Self::default()
        }
    }

    pub fn fail_reads(&self, err: RegistryError) {
        *self.read_failure.borrow_mut() = Some(err);
    }

    pub fn fail_writes(&self, err: RegistryError) {
        *self.write_failure.borrow_mut() = Some(err);
    }

    pub fn read_count(&self) -> usize {
        self.reads.get()
    }

    pub fn write_count(&self) -> usize {
        self.writes.get()
    }
}

#[async_trait(?Send)]
impl RegistryTransport for FakeRegistry {
    async fn fetch_records(&self) -> Result<Vec<Record>, RegistryError> {
        self.reads.set(self.reads.get() + 1);
        if let Some(err) = self.read_failure.borrow().clone() {
            return Err(err);
        }
        Ok(self.records.borrow().clone())
    }

    async fn append_record(&self, draft: &RecordDraft) -> Result<(), RegistryError> {
        self.writes.set(self.writes.get() + 1);
        if let Some(err) = self.write_failure.borrow().clone() {
            return Err(err);
        }
        self.records.borrow_mut().push(Record::from(draft.clone()));
        Ok(())
    }
}

/// Registry that never answers.
pub struct StalledRegistry;

#[async_trait(?Send)]
impl RegistryTransport for StalledRegistry {
    async fn fetch_records(&self) -> Result<Vec<Record>, RegistryError> {
        std::future::pending().await
    }

    async fn append_record(&self, _draft: &RecordDraft) -> Result<(), RegistryError> {
        std::future::pending().await
    }
}

/// Keeps the latest value pushed to each render target.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordingView {
    pub statuses: Vec<String>,
    pub summary: Option<SummaryStats>,
    pub record_badge: Option<String>,
    pub charts: Vec<(u32, ChartKind, ChartDataset)>,
    pub chart_events: Vec<String>,
    pub rows: Vec<Record>,
    pub updated_at: Option<String>,
    next_chart: u32,
}

impl RecordingView {
    pub fn live_chart(&self, kind: ChartKind) -> Option<&ChartDataset> {
        self.charts
            .iter()
            .find(|(_, live_kind, _)| *live_kind == kind)
            .map(|(_, _, dataset)| dataset)
    }

    pub fn row_names(&self) -> Vec<&str> {
        self.rows
            .iter()
            .map(|row| row.patient_name.as_deref().unwrap_or_default())
            .collect()
    }
}

impl DashboardView for RecordingView {
    type Chart = u32;

    fn show_status(&mut self, status: &ConnectionStatus) {
        self.statuses.push(status.label());
    }

    fn show_summary(&mut self, summary: &SummaryStats) {
        self.summary = Some(summary.clone());
    }

    fn show_record_count(&mut self, badge: &str) {
        self.record_badge = Some(badge.to_string());
    }

    fn create_chart(&mut self, kind: ChartKind, dataset: &ChartDataset) -> u32 {
        let id = self.next_chart;
        self.next_chart += 1;
        let kind_name = match kind {
            ChartKind::SexDonut => "sex_donut",
            ChartKind::ConditionBar => "condition_bar",
        };
        self.chart_events.push(format!("create {kind_name} #{id}"));
        self.charts.push((id, kind, dataset.clone()));
        id
    }

    fn destroy_chart(&mut self, chart: u32) {
        self.chart_events.push(format!("destroy #{chart}"));
        self.charts.retain(|(id, _, _)| *id != chart);
    }

    fn show_table(&mut self, rows: &[Record]) {
        self.rows = rows.to_vec();
    }

    fn show_updated_at(&mut self, stamp: &str) {
        self.updated_at = Some(stamp.to_string());
    }
}

/// Form whose required fields mirror the registry write model.
#[derive(Debug, Default)]
pub struct FakeForm {
    pub values: RecordDraft,
    pub validated: bool,
}

pub fn filled_form(name: &str) -> FakeForm {
    FakeForm {
        values: RecordDraft {
            admission_date: "2024-05-06".into(),
            discharge_date: String::new(),
            age: "52".into(),
            sex: "M".into(),
            discharge_condition: "Vivo".into(),
            diagnosis: "Neumonía".into(),
            patient_name: name.into(),
        },
        validated: false,
    }
}

impl RecordForm for FakeForm {
    fn check_validity(&self) -> bool {
        let v = &self.values;
        [&v.admission_date, &v.age, &v.sex, &v.discharge_condition]
            .iter()
            .all(|field| !field.trim().is_empty())
    }

    fn set_validated(&mut self, validated: bool) {
        self.validated = validated;
    }

    fn draft(&self) -> RecordDraft {
        self.values.clone()
    }

    fn reset(&mut self) {
        self.values = RecordDraft::default();
    }
}

#[derive(Debug)]
pub struct FakeButton {
    pub label: String,
    pub enabled: bool,
    pub history: Vec<String>,
}

impl FakeButton {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            enabled: true,
            history: Vec::new(),
        }
    }
}

impl SubmitControl for FakeButton {
    fn label(&self) -> String {
        self.label.clone()
    }

    fn set_label(&mut self, label: &str) {
        self.label = label.to_string();
        self.history.push(self.label.clone());
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}

#[derive(Debug, Default)]
pub struct AlertLog {
    pub messages: Vec<String>,
}

impl Notifier for AlertLog {
    fn alert(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }
}
