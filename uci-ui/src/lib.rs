//! Browser dashboard for the ICU registry, built on Yew for WebAssembly.

pub mod charts;

#[cfg(target_arch = "wasm32")]
mod styles;

#[cfg(target_arch = "wasm32")]
mod wasm_ui {
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::charts::{bar_rows, circumference, donut_segments, summary_slots, DONUT_RADIUS};
    use crate::styles;
    use serde_wasm_bindgen::from_value;
    use uci_core::{
        ChartDataset, ChartKind, DashboardConfig, Record, RecordDraft, SummaryStats,
        COLUMN_TITLES, FIELD_NAMES,
    };
    use uci_registry::{
        ConnectionStatus, DashboardController, DashboardView, HttpTransport, Notifier,
        RecordForm, RecordSubmitter, RegistryTransport, StatusTone, SubmitControl,
        SubmitOutcome,
    };
    use wasm_bindgen::prelude::*;
    use wasm_bindgen::JsCast;
    use web_sys::{
        console, Document, Element, HtmlButtonElement, HtmlFormElement, HtmlInputElement,
        HtmlSelectElement, HtmlTextAreaElement, Window,
    };
    use yew::platform::spawn_local;
    use yew::prelude::*;

    type SharedController = Rc<RefCell<DashboardController<ModelView>>>;

    #[derive(Clone, PartialEq)]
    struct LiveChart {
        id: u32,
        kind: ChartKind,
        dataset: ChartDataset,
    }

    /// Render targets kept as plain data; the component draws from it.
    #[derive(Default)]
    struct ModelView {
        status: Option<ConnectionStatus>,
        summary: Option<SummaryStats>,
        record_badge: Option<String>,
        charts: Vec<LiveChart>,
        next_chart: u32,
        rows: Vec<Record>,
        updated_at: Option<String>,
    }

    impl ModelView {
        fn chart(&self, kind: ChartKind) -> Option<&LiveChart> {
            self.charts.iter().find(|chart| chart.kind == kind)
        }
    }

    impl DashboardView for ModelView {
        type Chart = u32;

        fn show_status(&mut self, status: &ConnectionStatus) {
            self.status = Some(status.clone());
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
            self.charts.push(LiveChart {
                id,
                kind,
                dataset: dataset.clone(),
            });
            id
        }

        fn destroy_chart(&mut self, chart: u32) {
            self.charts.retain(|live| live.id != chart);
        }

        fn show_table(&mut self, rows: &[Record]) {
            self.rows = rows.to_vec();
        }

        fn show_updated_at(&mut self, stamp: &str) {
            self.updated_at = Some(stamp.to_string());
        }
    }

    /// The entry `<form>`; validity and reset are delegated to the browser.
    struct DomForm(HtmlFormElement);

    impl DomForm {
        fn field_value(&self, name: &str) -> String {
            let selector = format!("[name=\"{name}\"]");
            let Ok(Some(element)) = self.0.query_selector(&selector) else {
                return String::new();
            };
            if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
                input.value()
            } else if let Some(select) = element.dyn_ref::<HtmlSelectElement>() {
                select.value()
            } else if let Some(area) = element.dyn_ref::<HtmlTextAreaElement>() {
                area.value()
            } else {
                String::new()
            }
        }
    }

    impl RecordForm for DomForm {
        fn check_validity(&self) -> bool {
            self.0.check_validity()
        }

        fn set_validated(&mut self, validated: bool) {
            let classes = self.0.class_list();
            let result = if validated {
                classes.add_1("was-validated")
            } else {
                classes.remove_1("was-validated")
            };
            if let Err(err) = result {
                console::error_1(&err);
            }
        }

        fn draft(&self) -> RecordDraft {
            let mut draft = RecordDraft::default();
            for name in FIELD_NAMES {
                draft.set_field(name, self.field_value(name));
            }
            draft
        }

        fn reset(&mut self) {
            self.0.reset();
        }
    }

    struct DomButton(HtmlButtonElement);

    impl SubmitControl for DomButton {
        fn label(&self) -> String {
            self.0.text_content().unwrap_or_default()
        }

        fn set_label(&mut self, label: &str) {
            self.0.set_text_content(Some(label));
        }

        fn set_enabled(&mut self, enabled: bool) {
            self.0.set_disabled(!enabled);
        }
    }

    struct WindowAlert;

    impl Notifier for WindowAlert {
        fn alert(&mut self, message: &str) {
            let Some(window) = web_sys::window() else {
                console::error_1(&JsValue::from_str(message));
                return;
            };
            if let Err(err) = window.alert_with_message(message) {
                console::error_1(&err);
            }
        }
    }

    #[derive(Properties)]
    pub struct DashboardProps {
        pub config: DashboardConfig,
        pub transport: Rc<HttpTransport>,
    }

    impl PartialEq for DashboardProps {
        fn eq(&self, other: &Self) -> bool {
            self.config == other.config && Rc::ptr_eq(&self.transport, &other.transport)
        }
    }

    async fn run_refresh(
        controller: SharedController,
        transport: Rc<HttpTransport>,
        redraw: UseForceUpdateHandle,
    ) {
        let ticket = controller.borrow_mut().begin_refresh();
        redraw.force_update();
        let result = transport.fetch_records().await;
        controller.borrow_mut().complete_refresh(ticket, result);
        redraw.force_update();
    }

    #[function_component(Dashboard)]
    fn dashboard(props: &DashboardProps) -> Html {
        let config = props.config.clone();
        let controller: SharedController = use_memo((), move |_| {
            RefCell::new(DashboardController::new(ModelView::default(), config))
        });
        let redraw = use_force_update();
        let form_ref = use_node_ref();
        let button_ref = use_node_ref();

        {
            let controller = controller.clone();
            let transport = props.transport.clone();
            let redraw = redraw.clone();
            use_effect_with((), move |_| {
                if let Some(document) = web_sys::window().and_then(|window| window.document()) {
                    if let Err(err) = styles::ensure_styles(&document) {
                        console::error_1(&err);
                    }
                }
                spawn_local(run_refresh(controller, transport, redraw));
                || ()
            });
        }

        let on_refresh = {
            let controller = controller.clone();
            let transport = props.transport.clone();
            let redraw = redraw.clone();
            Callback::from(move |_: MouseEvent| {
                spawn_local(run_refresh(
                    controller.clone(),
                    transport.clone(),
                    redraw.clone(),
                ));
            })
        };

        let on_submit = {
            let controller = controller.clone();
            let transport = props.transport.clone();
            let redraw = redraw.clone();
            let form_ref = form_ref.clone();
            let button_ref = button_ref.clone();
            Callback::from(move |event: SubmitEvent| {
                event.prevent_default();
                let (Some(form), Some(button)) = (
                    form_ref.cast::<HtmlFormElement>(),
                    button_ref.cast::<HtmlButtonElement>(),
                ) else {
                    return;
                };
                let mut form = DomForm(form);
                let mut button = DomButton(button);
                let submitter = RecordSubmitter::new();
                let Some(submission) = submitter.prepare(&mut form, &mut button) else {
                    return;
                };

                let controller = controller.clone();
                let transport = transport.clone();
                let redraw = redraw.clone();
                spawn_local(async move {
                    let result = transport.append_record(submission.draft()).await;
                    let outcome = submitter.finish(result, &mut form, &mut WindowAlert);
                    if outcome == SubmitOutcome::Saved {
                        run_refresh(controller, transport, redraw).await;
                    }
                    submitter.release(submission, &mut button);
                });
            })
        };

        let handle = controller.borrow();
        let model = handle.view();

        html! {
            <div class="uci-root">
                <header class="uci-header">
                    <h1>{"Registro UCI"}</h1>
                    <div class="uci-badges">
                        { render_status(model.status.as_ref()) }
                        <span class="uci-badge">
                            { model.record_badge.clone().unwrap_or_else(|| "0 registros".to_string()) }
                        </span>
                        <button type="button" class="uci-refresh" onclick={on_refresh}>{"Actualizar"}</button>
                    </div>
                </header>
                { render_summary(model.summary.as_ref()) }
                <section class="uci-charts">
                    <article class="uci-card">
                        <h2>{"Distribución por sexo"}</h2>
                        { model.chart(ChartKind::SexDonut).map(render_donut).unwrap_or_default() }
                    </article>
                    <article class="uci-card">
                        <h2>{"Condición al egreso"}</h2>
                        { model.chart(ChartKind::ConditionBar).map(render_bars).unwrap_or_default() }
                    </article>
                </section>
                <section class="uci-card">
                    <h2>{"Nuevo registro"}</h2>
                    { render_form(form_ref, button_ref, on_submit) }
                </section>
                <section class="uci-card">
                    <h2>{"Últimos registros"}</h2>
                    { render_table(&model.rows) }
                </section>
                <footer class="uci-footer">
                    { model.updated_at.clone().unwrap_or_default() }
                </footer>
            </div>
        }
    }

    fn render_status(status: Option<&ConnectionStatus>) -> Html {
        let Some(status) = status else {
            return Html::default();
        };
        let tone = match status.tone() {
            StatusTone::Success => "success",
            StatusTone::Danger => "danger",
        };
        html! { <span class="uci-badge" data-tone={tone}>{ status.label() }</span> }
    }

    fn render_summary(summary: Option<&SummaryStats>) -> Html {
        html! {
            <section class="uci-card uci-stats">
                {
                    for summary_slots(summary).into_iter().map(|(title, value)| html! {
                        <div class="uci-stat">
                            <span>{ title }</span>
                            <strong>{ value }</strong>
                        </div>
                    })
                }
            </section>
        }
    }

    fn render_donut(chart: &LiveChart) -> Html {
        let segments = donut_segments(&chart.dataset);
        if segments.is_empty() {
            return html! { <p class="uci-empty">{"Sin datos de sexo registrados."}</p> };
        }
        let full = circumference();
        let radius = DONUT_RADIUS.to_string();

        html! {
            <div key={chart.id.to_string()}>
                <svg class="uci-donut" viewBox="0 0 180 180" role="img" aria-label="Distribución por sexo">
                    <g transform="rotate(-90 90 90)">
                        {
                            for segments.iter().map(|segment| html! {
                                <circle
                                    cx="90"
                                    cy="90"
                                    r={radius.clone()}
                                    stroke={segment.color}
                                    stroke-dasharray={format!("{:.3} {:.3}", segment.length, full - segment.length)}
                                    stroke-dashoffset={format!("{:.3}", -segment.offset)}
                                >
                                    <title>{ format!("{}: {}", segment.label, segment.value) }</title>
                                </circle>
                            })
                        }
                    </g>
                </svg>
                <ul class="uci-legend">
                    {
                        for segments.iter().map(|segment| html! {
                            <li>
                                <i style={format!("background: {}", segment.color)}></i>
                                { format!("{} ({})", segment.label, segment.value) }
                            </li>
                        })
                    }
                </ul>
            </div>
        }
    }

    fn render_bars(chart: &LiveChart) -> Html {
        let rows = bar_rows(&chart.dataset);
        if rows.is_empty() {
            return html! { <p class="uci-empty">{"Sin condiciones al egreso registradas."}</p> };
        }

        html! {
            <div class="uci-bars" key={chart.id.to_string()}>
                {
                    for rows.iter().map(|row| html! {
                        <div class="uci-bar-row">
                            <span>{ row.label.clone() }</span>
                            <div class="uci-bar-track">
                                <div class="uci-bar-fill" style={format!("width: {:.1}%", row.percent)}></div>
                            </div>
                            <span>{ row.value }</span>
                        </div>
                    })
                }
            </div>
        }
    }

    fn render_form(
        form_ref: NodeRef,
        button_ref: NodeRef,
        on_submit: Callback<SubmitEvent>,
    ) -> Html {
        html! {
            <form class="uci-form" ref={form_ref} onsubmit={on_submit} novalidate=true>
                <label>{"Fecha de ingreso"}
                    <input type="date" name="fecha_de_ingreso" required=true />
                </label>
                <label>{"Fecha de egreso"}
                    <input type="date" name="fecha_de_egreso" />
                </label>
                <label>{"Edad"}
                    <input type="number" name="edad" min="0" required=true />
                </label>
                <label>{"Sexo"}
                    <select name="sexo" required=true>
                        <option value="">{"Seleccionar"}</option>
                        <option value="F">{"Femenino"}</option>
                        <option value="M">{"Masculino"}</option>
                    </select>
                </label>
                <label>{"Condición al egreso"}
                    <input type="text" name="condicion_al_egreso" required=true />
                </label>
                <label>{"Diagnóstico"}
                    <input type="text" name="diagnostico" />
                </label>
                <label>{"Nombre y apellido"}
                    <input type="text" name="nombre_y_apellido" />
                </label>
                <button type="submit" ref={button_ref}>{"Guardar registro"}</button>
            </form>
        }
    }

    fn render_table(rows: &[Record]) -> Html {
        html! {
            <div class="uci-table-wrap">
                <table class="uci-table">
                    <thead>
                        <tr>{ for COLUMN_TITLES.iter().map(|title| html! { <th>{ *title }</th> }) }</tr>
                    </thead>
                    <tbody>
                        {
                            for rows.iter().map(|row| html! {
                                <tr>{ for row.cells().into_iter().map(|cell| html! { <td>{ cell.to_string() }</td> }) }</tr>
                            })
                        }
                    </tbody>
                </table>
            </div>
        }
    }

    /// Mount the dashboard into the element matching `selector`. `config` is
    /// an optional partial `DashboardConfig`; the endpoint is resolved
    /// against the page origin.
    #[wasm_bindgen]
    pub fn mount_dashboard(selector: &str, config: Option<JsValue>) -> Result<(), JsValue> {
        let window: Window = web_sys::window().ok_or_else(|| JsValue::from_str("No window"))?;
        let document: Document = window
            .document()
            .ok_or_else(|| JsValue::from_str("Cannot access document"))?;

        let target: Element = document
            .query_selector(selector)
            .map_err(|err| JsValue::from_str(&format!("Invalid selector: {err:?}")))?
            .ok_or_else(|| JsValue::from_str("No element matches the selector"))?;

        let config = match config {
            Some(value) if !value.is_undefined() && !value.is_null() => {
                let overrides: serde_json::Value = from_value(value)?;
                merge_config(overrides)?
            }
            _ => DashboardConfig::default(),
        };

        let origin = window.location().origin()?;
        let transport = Rc::new(HttpTransport::from_config(&origin, &config));

        yew::Renderer::<Dashboard>::with_root_and_props(
            target,
            DashboardProps { config, transport },
        )
        .render();
        Ok(())
    }

    fn merge_config(overrides: serde_json::Value) -> Result<DashboardConfig, JsValue> {
        let mut base = serde_json::to_value(DashboardConfig::default())
            .map_err(|err| JsValue::from_str(&err.to_string()))?;
        if let (Some(fields), serde_json::Value::Object(overrides)) =
            (base.as_object_mut(), overrides)
        {
            fields.extend(overrides);
        }
        serde_json::from_value(base)
            .map_err(|err| JsValue::from_str(&format!("Invalid config: {err}")))
    }
}

#[cfg(target_arch = "wasm32")]
pub use wasm_ui::mount_dashboard;

#[cfg(not(target_arch = "wasm32"))]
pub fn mount_dashboard(
    _: &str,
    _: Option<wasm_bindgen::JsValue>,
) -> Result<(), wasm_bindgen::JsValue> {
    Err(wasm_bindgen::JsValue::from_str(
        "uci-ui only supports the wasm32 target",
    ))
}
