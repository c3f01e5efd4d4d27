use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Args as ClapArgs, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use uci_core::{
    ChartDataset, ChartKind, DashboardConfig, DashboardSnapshot, Record, RecordDraft,
    SummaryStats, COLUMN_TITLES,
};
use uci_registry::{
    summarize_envelope_str, ConnectionStatus, DashboardController, DashboardView, HttpTransport,
    Notifier, RecordForm, RecordSubmitter, RefreshOutcome, SubmitControl, SubmitOutcome,
};

#[derive(Parser, Debug)]
#[command(
    name = "uci-cli",
    about = "Summarize and append ICU registry records from the terminal."
)]
struct Args {
    /// Scheme and host of the registry API.
    #[arg(long, env = "UCI_BASE_URL", default_value = "http://localhost:8000")]
    base_url: String,

    /// Registry endpoint path.
    #[arg(long, default_value = uci_core::DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Maximum number of table rows.
    #[arg(long, default_value_t = uci_core::TABLE_LIMIT)]
    limit: usize,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Summarize a saved read envelope without touching the network.
    Summary {
        /// Path to the JSON envelope.
        #[arg(short, long)]
        input: PathBuf,
        /// Print the snapshot as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Fetch the registry and print the dashboard.
    Fetch,
    /// Append a record, then fetch the registry again.
    Add(EntryArgs),
}

#[derive(ClapArgs, Debug, Clone)]
struct EntryArgs {
    #[arg(long = "fecha-de-ingreso")]
    admission_date: String,
    #[arg(long = "fecha-de-egreso", default_value = "")]
    discharge_date: String,
    #[arg(long = "edad")]
    age: String,
    #[arg(long = "sexo")]
    sex: String,
    #[arg(long = "condicion-al-egreso")]
    discharge_condition: String,
    #[arg(long = "diagnostico", default_value = "")]
    diagnosis: String,
    #[arg(long = "nombre-y-apellido", default_value = "")]
    patient_name: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = DashboardConfig {
        endpoint: args.endpoint.clone(),
        table_limit: args.limit,
        ..DashboardConfig::default()
    };

    match args.command {
        Command::Summary { input, json } => {
            let data = std::fs::read_to_string(&input)
                .with_context(|| format!("Could not read file {:?}", input))?;
            let snapshot = summarize_envelope_str(&data, &config)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            } else {
                print_snapshot(&snapshot);
            }
        }
        Command::Fetch => {
            let transport = HttpTransport::from_config(&args.base_url, &config);
            let mut dashboard = DashboardController::new(TerminalView::default(), config);
            if let RefreshOutcome::Failed(err) = dashboard.refresh(&transport).await {
                bail!("could not load {}: {err}", transport.url());
            }
        }
        Command::Add(entry) => {
            let transport = HttpTransport::from_config(&args.base_url, &config);
            let mut dashboard = DashboardController::new(TerminalView::default(), config);
            let mut form = TerminalForm::new(entry);
            let mut control = TerminalControl::default();

            let outcome = RecordSubmitter::new()
                .submit(
                    &mut form,
                    &mut control,
                    &mut StderrNotifier,
                    &transport,
                    &mut dashboard,
                )
                .await;

            match outcome {
                SubmitOutcome::Saved => {}
                SubmitOutcome::Invalid => {
                    bail!("fecha de ingreso, edad, sexo and condición al egreso are required")
                }
                SubmitOutcome::Rejected { message } => bail!("record not saved: {message}"),
            }
        }
    }

    Ok(())
}

fn print_snapshot(snapshot: &DashboardSnapshot) {
    let mut view = TerminalView::default();
    view.show_summary(&snapshot.summary);
    view.show_record_count(&snapshot.record_badge());
    view.create_chart(ChartKind::SexDonut, &snapshot.sex_chart);
    view.create_chart(ChartKind::ConditionBar, &snapshot.condition_chart);
    view.show_table(&snapshot.recent);
}

/// Prints each render target as it is updated.
#[derive(Default)]
struct TerminalView {
    charts_created: usize,
}

impl DashboardView for TerminalView {
    type Chart = usize;

    fn show_status(&mut self, status: &ConnectionStatus) {
        tracing::info!(status = %status.label(), "connection");
    }

    fn show_summary(&mut self, summary: &SummaryStats) {
        println!("Total de registros: {}", summary.total);
        println!("Femenino:           {}", summary.female);
        println!("Masculino:          {}", summary.male);
        println!("Edad promedio:      {}", summary.mean_age_label());
    }

    fn show_record_count(&mut self, badge: &str) {
        println!("[{badge}]");
    }

    fn create_chart(&mut self, kind: ChartKind, dataset: &ChartDataset) -> usize {
        let title = match kind {
            ChartKind::SexDonut => "Distribución por sexo",
            ChartKind::ConditionBar => "Condición al egreso",
        };
        println!("\n{title}");
        let width = dataset.labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        for (label, value) in dataset.labels.iter().zip(&dataset.values) {
            println!("  {label:<width$}  {} {value}", "#".repeat((*value).min(60)));
        }
        self.charts_created += 1;
        self.charts_created
    }

    fn destroy_chart(&mut self, chart: usize) {
        tracing::debug!(chart, "chart replaced");
    }

    fn show_table(&mut self, rows: &[Record]) {
        println!("\n{}", COLUMN_TITLES.join(" | "));
        for row in rows {
            println!("{}", row.cells().join(" | "));
        }
    }

    fn show_updated_at(&mut self, stamp: &str) {
        println!("\n{stamp}");
    }
}

/// Form backed by command-line flags. Required fields follow the
/// registry's write model.
struct TerminalForm {
    entry: Option<EntryArgs>,
}

impl TerminalForm {
    fn new(entry: EntryArgs) -> Self {
        Self { entry: Some(entry) }
    }
}

impl RecordForm for TerminalForm {
    fn check_validity(&self) -> bool {
        let Some(entry) = &self.entry else {
            return false;
        };
        [
            &entry.admission_date,
            &entry.age,
            &entry.sex,
            &entry.discharge_condition,
        ]
        .iter()
        .all(|value| !value.trim().is_empty())
    }

    fn set_validated(&mut self, validated: bool) {
        if validated {
            tracing::warn!("required registry fields are blank");
        }
    }

    fn draft(&self) -> RecordDraft {
        let Some(entry) = self.entry.clone() else {
            return RecordDraft::default();
        };
        RecordDraft {
            admission_date: entry.admission_date,
            discharge_date: entry.discharge_date,
            age: entry.age,
            sex: entry.sex,
            discharge_condition: entry.discharge_condition,
            diagnosis: entry.diagnosis,
            patient_name: entry.patient_name,
        }
    }

    fn reset(&mut self) {
        self.entry = None;
    }
}

#[derive(Default)]
struct TerminalControl {
    label: String,
}

impl SubmitControl for TerminalControl {
    fn label(&self) -> String {
        self.label.clone()
    }

    fn set_label(&mut self, label: &str) {
        self.label = label.to_string();
        if !label.is_empty() {
            tracing::info!("{label}");
        }
    }

    fn set_enabled(&mut self, _enabled: bool) {}
}

struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn alert(&mut self, message: &str) {
        eprintln!("error: {message}");
    }
}
