#![cfg(target_arch = "wasm32")]

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Node};

const STYLE_TAG_SELECTOR: &str = "style[data-uci-dashboard]";

/// Default CSS for the dashboard along with easy-to-override design tokens.
pub const DEFAULT_STYLES: &str = r#"
:root {
  --uci-font-family: 'Inter', system-ui, -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif;
  --uci-bg: #0f172a;
  --uci-card-bg: #111c33;
  --uci-card-border: rgba(148, 163, 184, 0.22);
  --uci-radius: 14px;
  --uci-text: #e5e7eb;
  --uci-muted: #94a3b8;
  --uci-grid: rgba(148, 163, 184, 0.3);
  --uci-success-bg: rgba(16, 185, 129, 0.16);
  --uci-success-text: #6ee7b7;
  --uci-danger-bg: rgba(239, 68, 68, 0.16);
  --uci-danger-text: #fca5a5;
  --uci-accent: #38bdf8;
}

.uci-root {
  font-family: var(--uci-font-family);
  background: var(--uci-bg);
  color: var(--uci-text);
  display: grid;
  gap: 22px;
  padding: 24px;
  border-radius: var(--uci-radius);
}

.uci-header {
  display: flex;
  flex-wrap: wrap;
  align-items: center;
  justify-content: space-between;
  gap: 12px;
}

.uci-header h1 {
  margin: 0;
  font-size: 1.35rem;
}

.uci-badges {
  display: flex;
  gap: 8px;
  align-items: center;
}

.uci-badge {
  border-radius: 999px;
  padding: 4px 12px;
  font-size: 0.8rem;
  font-weight: 600;
  background: rgba(148, 163, 184, 0.16);
}

.uci-badge[data-tone="success"] {
  background: var(--uci-success-bg);
  color: var(--uci-success-text);
}

.uci-badge[data-tone="danger"] {
  background: var(--uci-danger-bg);
  color: var(--uci-danger-text);
}

.uci-card {
  background: var(--uci-card-bg);
  border: 1px solid var(--uci-card-border);
  border-radius: var(--uci-radius);
  padding: 18px;
}

.uci-card h2 {
  margin: 0 0 12px;
  font-size: 1rem;
  color: var(--uci-muted);
  font-weight: 600;
}

.uci-stats {
  display: grid;
  grid-template-columns: repeat(4, minmax(0, 1fr));
  gap: 14px;
}

.uci-stat span {
  display: block;
  font-size: 0.78rem;
  color: var(--uci-muted);
  text-transform: uppercase;
  letter-spacing: 0.08em;
}

.uci-stat strong {
  font-size: 1.8rem;
  font-variant-numeric: tabular-nums;
}

.uci-charts {
  display: grid;
  grid-template-columns: minmax(260px, 1fr) minmax(320px, 1.5fr);
  gap: 18px;
}

.uci-donut {
  width: 180px;
  height: 180px;
  margin: 0 auto;
  display: block;
}

.uci-donut circle {
  fill: none;
  stroke-width: 18;
}

.uci-legend {
  display: flex;
  flex-wrap: wrap;
  justify-content: center;
  gap: 10px;
  margin: 12px 0 0;
  padding: 0;
  list-style: none;
  font-size: 0.82rem;
}

.uci-legend i {
  display: inline-block;
  width: 10px;
  height: 10px;
  border-radius: 2px;
  margin-right: 6px;
}

.uci-bars {
  display: flex;
  flex-direction: column;
  gap: 8px;
}

.uci-bar-row {
  display: grid;
  grid-template-columns: minmax(90px, 0.6fr) 1fr 36px;
  align-items: center;
  gap: 10px;
  font-size: 0.85rem;
}

.uci-bar-track {
  background: var(--uci-grid);
  border-radius: 6px;
  height: 14px;
  overflow: hidden;
}

.uci-bar-fill {
  background: var(--uci-accent);
  height: 100%;
}

.uci-empty {
  color: var(--uci-muted);
  font-size: 0.88rem;
}

.uci-table-wrap {
  overflow-x: auto;
}

.uci-table {
  width: 100%;
  border-collapse: collapse;
  font-size: 0.85rem;
}

.uci-table th,
.uci-table td {
  text-align: left;
  padding: 8px 10px;
  border-bottom: 1px solid var(--uci-card-border);
}

.uci-table th {
  color: var(--uci-muted);
  font-weight: 600;
}

.uci-form {
  display: grid;
  grid-template-columns: repeat(auto-fill, minmax(200px, 1fr));
  gap: 12px;
}

.uci-form label {
  display: flex;
  flex-direction: column;
  gap: 4px;
  font-size: 0.8rem;
  color: var(--uci-muted);
}

.uci-form input,
.uci-form select {
  background: var(--uci-bg);
  color: var(--uci-text);
  border: 1px solid var(--uci-card-border);
  border-radius: 8px;
  padding: 7px 9px;
}

.uci-form.was-validated :invalid {
  border-color: var(--uci-danger-text);
}

.uci-form button,
.uci-refresh {
  align-self: end;
  background: var(--uci-accent);
  color: #0b1220;
  border: none;
  border-radius: 8px;
  padding: 9px 14px;
  font-weight: 600;
  cursor: pointer;
}

.uci-form button:disabled {
  opacity: 0.6;
  cursor: progress;
}

.uci-footer {
  font-size: 0.78rem;
  color: var(--uci-muted);
}

@media (max-width: 860px) {
  .uci-stats {
    grid-template-columns: repeat(2, minmax(0, 1fr));
  }

  .uci-charts {
    grid-template-columns: 1fr;
  }
}
"#;

pub fn ensure_styles(document: &Document) -> Result<(), JsValue> {
    if document.query_selector(STYLE_TAG_SELECTOR)?.is_some() {
        return Ok(());
    }

    let head = document
        .head()
        .ok_or_else(|| JsValue::from_str("Document has no <head> element"))?;

    let style_el = document.create_element("style")?;
    style_el.set_attribute("data-uci-dashboard", "v1")?;
    style_el.set_text_content(Some(DEFAULT_STYLES));
    head.append_child(&style_el.clone().dyn_into::<Node>()?)?;

    Ok(())
}
