//! Refresh cycle: fetch, aggregate, project, render.

use chrono::{DateTime, Local};
use uci_core::{
    ChartDataset, ChartKind, DashboardConfig, DashboardSnapshot, Record, RegistryError,
    SummaryStats,
};

use crate::RegistryTransport;

/// Connection badge state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionStatus {
    Loading,
    Connected { source: String },
    Failed,
}

/// Colour family of the status badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTone {
    Success,
    Danger,
}

impl ConnectionStatus {
    pub fn label(&self) -> String {
        match self {
            ConnectionStatus::Loading => "Cargando datos...".to_string(),
            ConnectionStatus::Connected { source } => format!("Conectado a {source}"),
            ConnectionStatus::Failed => "Error al conectar".to_string(),
        }
    }

    pub fn tone(&self) -> StatusTone {
        match self {
            ConnectionStatus::Loading | ConnectionStatus::Connected { .. } => StatusTone::Success,
            ConnectionStatus::Failed => StatusTone::Danger,
        }
    }
}

/// Render targets driven by the controller. Implementations own the markup;
/// the controller only decides what to show and when.
pub trait DashboardView {
    /// Handle of a live chart instance.
    type Chart;

    fn show_status(&mut self, status: &ConnectionStatus);
    fn show_summary(&mut self, summary: &SummaryStats);
    fn show_record_count(&mut self, badge: &str);
    fn create_chart(&mut self, kind: ChartKind, dataset: &ChartDataset) -> Self::Chart;
    fn destroy_chart(&mut self, chart: Self::Chart);
    fn show_table(&mut self, rows: &[Record]);
    fn show_updated_at(&mut self, stamp: &str);
}

/// Where the current refresh cycle stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshPhase {
    Idle,
    Loading,
    Succeeded,
    Failed,
}

/// Issued by [`DashboardController::begin_refresh`]; generations increase
/// monotonically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RefreshTicket {
    generation: u64,
}

impl RefreshTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// What happened to a completed fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    /// Render targets now show the fetched collection.
    Applied { total: usize },
    /// The fetch failed; render targets keep their previous values.
    Failed(RegistryError),
    /// A newer refresh was already applied and stale responses are discarded.
    Stale,
}

/// Footer text for the last successful refresh.
pub fn format_updated_at(at: DateTime<Local>) -> String {
    format!("Última actualización: {}", at.format("%Y-%m-%d %H:%M"))
}

struct ChartSlots<H> {
    sex: Option<H>,
    condition: Option<H>,
}

impl<H> ChartSlots<H> {
    fn slot_mut(&mut self, kind: ChartKind) -> &mut Option<H> {
        match kind {
            ChartKind::SexDonut => &mut self.sex,
            ChartKind::ConditionBar => &mut self.condition,
        }
    }
}

/// Owns the render targets and both chart handles for the page lifetime.
pub struct DashboardController<V: DashboardView> {
    view: V,
    config: DashboardConfig,
    charts: ChartSlots<V::Chart>,
    phase: RefreshPhase,
    issued: u64,
    applied: u64,
    snapshot: Option<DashboardSnapshot>,
    clock: fn() -> DateTime<Local>,
}

impl<V: DashboardView> DashboardController<V> {
    pub fn new(view: V, config: DashboardConfig) -> Self {
        Self {
            view,
            config,
            charts: ChartSlots {
                sex: None,
                condition: None,
            },
            phase: RefreshPhase::Idle,
            issued: 0,
            applied: 0,
            snapshot: None,
            clock: Local::now,
        }
    }

    /// Replace the wall clock used for the last-updated stamp.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Local>) -> Self {
        self.clock = clock;
        self
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn phase(&self) -> RefreshPhase {
        self.phase
    }

    /// Snapshot behind what the render targets currently show.
    pub fn snapshot(&self) -> Option<&DashboardSnapshot> {
        self.snapshot.as_ref()
    }

    /// Run a full refresh cycle against `transport`.
    pub async fn refresh<T>(&mut self, transport: &T) -> RefreshOutcome
    where
        T: RegistryTransport + ?Sized,
    {
        let ticket = self.begin_refresh();
        let result = transport.fetch_records().await;
        self.complete_refresh(ticket, result)
    }

    /// Enter `loading` and hand out the ticket for the fetch about to start.
    ///
    /// Split from [`complete_refresh`](Self::complete_refresh) so callers
    /// sharing the controller do not hold it across the network call.
    pub fn begin_refresh(&mut self) -> RefreshTicket {
        self.issued += 1;
        self.phase = RefreshPhase::Loading;
        self.view.show_status(&ConnectionStatus::Loading);
        RefreshTicket {
            generation: self.issued,
        }
    }

    /// Apply the result of the fetch started with `ticket`.
    pub fn complete_refresh(
        &mut self,
        ticket: RefreshTicket,
        result: Result<Vec<Record>, RegistryError>,
    ) -> RefreshOutcome {
        if self.config.discard_stale_refreshes && ticket.generation < self.applied {
            tracing::warn!(
                generation = ticket.generation,
                applied = self.applied,
                "discarding stale registry response"
            );
            return RefreshOutcome::Stale;
        }

        match result {
            Ok(records) => {
                let snapshot = DashboardSnapshot::from_records(&records, &self.config);
                self.render(&snapshot);
                self.applied = self.applied.max(ticket.generation);
                self.phase = RefreshPhase::Succeeded;
                tracing::info!(
                    generation = ticket.generation,
                    total = snapshot.summary.total,
                    rows = snapshot.recent.len(),
                    "registry refresh applied"
                );
                let total = snapshot.summary.total;
                self.snapshot = Some(snapshot);
                RefreshOutcome::Applied { total }
            }
            Err(err) => {
                tracing::warn!(generation = ticket.generation, error = %err, "registry refresh failed");
                self.phase = RefreshPhase::Failed;
                self.view.show_status(&ConnectionStatus::Failed);
                RefreshOutcome::Failed(err)
            }
        }
    }

    fn render(&mut self, snapshot: &DashboardSnapshot) {
        self.view.show_summary(&snapshot.summary);
        self.view.show_record_count(&snapshot.record_badge());
        self.replace_chart(ChartKind::SexDonut, &snapshot.sex_chart);
        self.replace_chart(ChartKind::ConditionBar, &snapshot.condition_chart);
        self.view.show_table(&snapshot.recent);
        self.view.show_status(&ConnectionStatus::Connected {
            source: self.config.source_label.clone(),
        });
        self.view.show_updated_at(&format_updated_at((self.clock)()));
    }

    /// Destroy the live chart of `kind`, then create its replacement.
    fn replace_chart(&mut self, kind: ChartKind, dataset: &ChartDataset) {
        let slot = self.charts.slot_mut(kind);
        if let Some(previous) = slot.take() {
            self.view.destroy_chart(previous);
        }
        *slot = Some(self.view.create_chart(kind, dataset));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixed_clock, patient, FakeRegistry, RecordingView};

    fn controller(config: DashboardConfig) -> DashboardController<RecordingView> {
        DashboardController::new(RecordingView::default(), config).with_clock(fixed_clock)
    }

    #[tokio::test]
    async fn successful_refresh_renders_every_target() {
        let registry = FakeRegistry::with_records(vec![
            patient("Ana", "F", "34", "Vivo"),
            patient("Luis", "masculino", "abc", "Fallecido"),
        ]);
        let mut dashboard = controller(DashboardConfig::default());

        let outcome = dashboard.refresh(&registry).await;

        assert_eq!(outcome, RefreshOutcome::Applied { total: 2 });
        assert_eq!(dashboard.phase(), RefreshPhase::Succeeded);
        let view = dashboard.view();
        assert_eq!(
            view.statuses,
            vec!["Cargando datos...", "Conectado a BASE_UCI"]
        );
        let summary = view.summary.as_ref().unwrap();
        assert_eq!((summary.total, summary.female, summary.male), (2, 1, 1));
        assert_eq!(summary.mean_age_label(), "34.0");
        assert_eq!(view.record_badge.as_deref(), Some("2 registros"));
        assert_eq!(view.row_names(), vec!["Luis", "Ana"]);
        assert_eq!(
            view.updated_at.as_deref(),
            Some("Última actualización: 2024-05-06 07:08")
        );
        assert_eq!(
            view.live_chart(ChartKind::SexDonut).unwrap().labels,
            vec!["Femenino", "Masculino"]
        );
        assert_eq!(
            view.live_chart(ChartKind::ConditionBar).unwrap().labels,
            vec!["Vivo", "Fallecido"]
        );
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_targets() {
        let registry = FakeRegistry::with_records(vec![patient("Ana", "F", "34", "Vivo")]);
        let mut dashboard = controller(DashboardConfig::default());
        dashboard.refresh(&registry).await;
        let before = dashboard.view().clone();

        registry.fail_reads(RegistryError::Application {
            detail: Some("cuota excedida".into()),
        });
        let outcome = dashboard.refresh(&registry).await;

        assert!(matches!(outcome, RefreshOutcome::Failed(_)));
        assert_eq!(dashboard.phase(), RefreshPhase::Failed);
        let view = dashboard.view();
        assert_eq!(view.statuses.last().map(String::as_str), Some("Error al conectar"));
        assert_eq!(view.summary, before.summary);
        assert_eq!(view.rows, before.rows);
        assert_eq!(view.charts, before.charts);
        assert_eq!(view.updated_at, before.updated_at);
        assert_eq!(dashboard.snapshot().unwrap().summary.total, 1);
    }

    #[tokio::test]
    async fn charts_are_destroyed_before_replacement() {
        let registry = FakeRegistry::with_records(vec![patient("Ana", "F", "34", "Vivo")]);
        let mut dashboard = controller(DashboardConfig::default());

        dashboard.refresh(&registry).await;
        dashboard.refresh(&registry).await;

        let view = dashboard.view();
        assert_eq!(
            view.chart_events,
            vec![
                "create sex_donut #0",
                "create condition_bar #1",
                "destroy #0",
                "create sex_donut #2",
                "destroy #1",
                "create condition_bar #3",
            ]
        );
        assert_eq!(view.charts.len(), 2);
    }

    #[test]
    fn stale_responses_overwrite_by_default() {
        let mut dashboard = controller(DashboardConfig::default());
        let first = dashboard.begin_refresh();
        let second = dashboard.begin_refresh();
        assert!(second > first);

        dashboard.complete_refresh(second, Ok(vec![patient("Nuevo", "F", "1", "")]));
        let outcome = dashboard.complete_refresh(first, Ok(vec![patient("Viejo", "M", "2", "")]));

        assert_eq!(outcome, RefreshOutcome::Applied { total: 1 });
        assert_eq!(dashboard.view().row_names(), vec!["Viejo"]);
    }

    #[test]
    fn stale_responses_can_be_discarded() {
        let config = DashboardConfig {
            discard_stale_refreshes: true,
            ..DashboardConfig::default()
        };
        let mut dashboard = controller(config);
        let first = dashboard.begin_refresh();
        let second = dashboard.begin_refresh();

        dashboard.complete_refresh(second, Ok(vec![patient("Nuevo", "F", "1", "")]));
        let outcome = dashboard.complete_refresh(
            first,
            Err(RegistryError::Transport("connection reset".into())),
        );

        assert_eq!(outcome, RefreshOutcome::Stale);
        assert_eq!(dashboard.phase(), RefreshPhase::Succeeded);
        assert_eq!(dashboard.view().row_names(), vec!["Nuevo"]);
        assert_eq!(
            dashboard.view().statuses.last().map(String::as_str),
            Some("Conectado a BASE_UCI")
        );
    }

    #[test]
    fn status_tones() {
        assert_eq!(ConnectionStatus::Loading.tone(), StatusTone::Success);
        assert_eq!(ConnectionStatus::Failed.tone(), StatusTone::Danger);
        assert_eq!(
            ConnectionStatus::Connected {
                source: "BASE_UCI".into()
            }
            .label(),
            "Conectado a BASE_UCI"
        );
    }
}
