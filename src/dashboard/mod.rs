use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::debug;

use crate::catalog::Catalog;
use crate::error::{SelectionError, SubmitError, INCOMPLETE_FORM_MESSAGE};
use crate::form::{FormView, SelectionUpdate};
use crate::session::PredictionSession;

#[derive(Clone)]
pub struct AppState {
    pub session: PredictionSession,
}

type ApiError = (StatusCode, Json<serde_json::Value>);

/// Build the Axum router for the form UI.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/api/catalog", get(catalog_handler))
        .route("/api/state", get(state_handler))
        .route("/api/selection", post(selection_handler))
        .route("/api/predict", post(predict_handler))
        .route("/api/cancel", post(cancel_handler))
        .route("/api/reset", post(reset_handler))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

fn selection_error(e: SelectionError) -> ApiError {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({ "error": e.to_string() })),
    )
}

fn submit_error(e: SubmitError) -> ApiError {
    match e {
        SubmitError::Validation(v) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "error": INCOMPLETE_FORM_MESSAGE, "missing": v.missing })),
        ),
        SubmitError::AlreadyPending => (
            StatusCode::CONFLICT,
            Json(json!({ "error": e.to_string() })),
        ),
    }
}

async fn index_handler() -> impl IntoResponse {
    Html(FORM_HTML)
}

/// GET /api/catalog
async fn catalog_handler() -> impl IntoResponse {
    Json(Catalog::new())
}

/// GET /api/state
async fn state_handler(State(state): State<Arc<AppState>>) -> Json<FormView> {
    Json(state.session.view().await)
}

/// POST /api/selection  `{"field": "team1", "value": "India"}`
async fn selection_handler(
    State(state): State<Arc<AppState>>,
    Json(update): Json<SelectionUpdate>,
) -> Result<Json<FormView>, ApiError> {
    debug!("Selection update: {:?}", update);
    state
        .session
        .apply(update)
        .await
        .map(Json)
        .map_err(selection_error)
}

/// POST /api/predict — resolves once the prediction succeeds or fails.
async fn predict_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<FormView>, ApiError> {
    state.session.submit().await.map(Json).map_err(submit_error)
}

/// POST /api/cancel
async fn cancel_handler(State(state): State<Arc<AppState>>) -> Json<FormView> {
    Json(state.session.cancel().await)
}

/// POST /api/reset
async fn reset_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<FormView>, ApiError> {
    state.session.reset().await.map(Json).map_err(submit_error)
}

/// Embedded single-file form (HTML + CSS + JS). All state lives server-side;
/// the page only renders the `FormView` it gets back.
const FORM_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Match Predictor</title>
<style>
  :root {
    --bg: #0b1220;
    --card: #151c2c;
    --border: #2a3350;
    --accent: #22d3ee;
    --blue: #3b82f6;
    --red: #f87171;
    --text: #e5e7eb;
    --muted: #8b93a7;
  }
  * { box-sizing: border-box; margin: 0; padding: 0; }
  body { background: var(--bg); color: var(--text); font-family: 'Segoe UI', system-ui, sans-serif; min-height: 100vh; display: flex; flex-direction: column; align-items: center; justify-content: center; padding: 1.5rem; }
  h1 { font-size: 2.6rem; font-weight: 800; color: var(--accent); margin-bottom: 2rem; }
  .card { width: min(80vw, 56rem); background: var(--card); border: 1px solid var(--border); border-radius: 12px; padding: 2rem; display: grid; gap: 1.5rem; }
  .row { display: flex; gap: 1.5rem; }
  select { width: 100%; padding: .75rem; background: #0e7490; color: #fff; border: none; border-radius: 6px; font-size: 1rem; }
  .center { display: flex; flex-direction: column; align-items: center; gap: .75rem; }
  .choices { display: flex; gap: 1rem; }
  .choice { padding: .5rem 1.5rem; border-radius: 6px; border: none; background: #374151; color: #fff; cursor: pointer; }
  .choice.on { background: var(--blue); }
  .hidden { display: none !important; }
  #predict { width: 100%; padding: 1rem; border: none; border-radius: 6px; font-weight: 700; font-size: 1rem; color: #fff; background: linear-gradient(90deg, var(--accent), var(--blue)); cursor: pointer; }
  #predict:disabled { opacity: .6; cursor: wait; }
  #cancel { background: none; border: 1px solid var(--border); color: var(--muted); padding: .3rem .8rem; border-radius: 6px; cursor: pointer; }
  #result { background: #1f2937; border-radius: 10px; padding: 1rem; text-align: center; }
  #result h2 { color: var(--accent); font-size: 1.25rem; }
  .bar { width: 100%; background: #374151; border-radius: 999px; height: 1.5rem; margin-top: 1rem; overflow: hidden; }
  .fill { height: 100%; background: linear-gradient(90deg, var(--accent), var(--blue)); font-size: .85rem; font-weight: 700; display: flex; align-items: center; justify-content: center; transition: width 1s; }
  .error { color: var(--red); }
</style>
</head>
<body>
<h1>🏏 Match Predictor</h1>
<div class="card">
  <div class="row">
    <select id="team1"></select>
    <select id="team2"></select>
  </div>

  <div class="center hidden" id="toss-block">
    <span>🏆 Toss Winner:</span>
    <div class="choices" id="toss"></div>
  </div>

  <div class="center">
    <span>📍 Venue Type:</span>
    <div class="choices" id="category"></div>
  </div>

  <select id="venue"></select>

  <button id="predict">🔮 Predict Match Outcome</button>
  <div class="center hidden" id="cancel-block"><button id="cancel">Cancel</button></div>

  <div id="result" class="hidden"></div>
</div>

<script>
let catalog = null;

async function api(method, path, body) {
  const r = await fetch(path, {
    method,
    headers: { 'Content-Type': 'application/json' },
    body: body === undefined ? undefined : JSON.stringify(body),
  });
  const data = await r.json();
  if (!r.ok) {
    alert(data.error);
    return null;
  }
  return data;
}

function fillSelect(el, placeholder, options, selected) {
  el.innerHTML = '';
  const blank = document.createElement('option');
  blank.value = '';
  blank.textContent = placeholder;
  el.appendChild(blank);
  for (const o of options) {
    const opt = document.createElement('option');
    opt.value = o;
    opt.textContent = o;
    el.appendChild(opt);
  }
  el.value = selected || '';
}

function choiceButtons(el, options, selected, onPick) {
  el.innerHTML = '';
  for (const o of options) {
    const b = document.createElement('button');
    b.className = 'choice' + (o === selected ? ' on' : '');
    b.textContent = o;
    b.onclick = () => onPick(o);
    el.appendChild(b);
  }
}

function renderResult(result) {
  const el = document.getElementById('result');
  el.classList.toggle('hidden', result.state === 'hidden');
  if (result.state === 'loading') {
    el.innerHTML = '<p>Predicting...</p>';
  } else if (result.state === 'error') {
    el.innerHTML = '';
    const p = document.createElement('p');
    p.className = 'error';
    p.textContent = result.message;
    el.appendChild(p);
  } else if (result.state === 'winner') {
    el.innerHTML = `<h2>🏆 Predicted Winner: ${result.winner}</h2>
      <div class="bar"><div class="fill" style="width:${result.bar_width_pct}%">${result.label}</div></div>`;
  }
}

function render(view) {
  if (!view) return;
  const s = view.selection;
  fillSelect(document.getElementById('team1'), 'Select Team 1', view.team1_options, s.team1);
  fillSelect(document.getElementById('team2'), 'Select Team 2', view.team2_options, s.team2);

  document.getElementById('toss-block').classList.toggle('hidden', view.toss_options.length === 0);
  choiceButtons(document.getElementById('toss'), view.toss_options, s.toss_winner,
    t => update('toss_winner', t));

  choiceButtons(document.getElementById('category'), catalog.venue_categories, s.venue.category,
    c => update('venue_category', c));
  fillSelect(document.getElementById('venue'), 'Select Venue', view.venue_options, s.venue.venue);

  const predict = document.getElementById('predict');
  predict.disabled = !view.submit_enabled;
  predict.textContent = view.submit_enabled ? '🔮 ' + view.submit_label : view.submit_label + ' 🔄';
  document.getElementById('cancel-block').classList.toggle('hidden', view.lifecycle !== 'Pending');

  renderResult(view.result);
}

async function update(field, value) {
  render(await api('POST', '/api/selection', { field, value: value || null }));
}

document.getElementById('team1').onchange = e => update('team1', e.target.value);
document.getElementById('team2').onchange = e => update('team2', e.target.value);
document.getElementById('venue').onchange = e => update('venue', e.target.value);
document.getElementById('predict').onclick = async () => {
  const pending = api('POST', '/api/predict');
  render(await api('GET', '/api/state'));
  render(await pending);
};
document.getElementById('cancel').onclick = async () => render(await api('POST', '/api/cancel'));

(async () => {
  catalog = await api('GET', '/api/catalog');
  render(await api('GET', '/api/state'));
})();
</script>
</body>
</html>"#;
