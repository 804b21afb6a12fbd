use crate::actions::Action;
use crate::color::string_to_hex;
use crate::errors::AppError;
use crate::models::{
    ChartFrame, Chip, ClickPointRequest, CountryRequest, CountryRow, MetricRequest, StateResponse,
    StrategyRequest, TableQuery,
};
use crate::state::{AppState, Snapshot};
use crate::stats::{SortKey, SortOrder, build_table};
use crate::ui::render_index;
use axum::{
    Json,
    extract::{Query, State},
    response::Html,
};
use tracing::{info, warn};

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let snapshot = state.snapshot().await;
    Html(render_index(&snapshot))
}

pub async fn get_state(State(state): State<AppState>) -> Json<StateResponse> {
    let snapshot = state.snapshot().await;
    Json(state_response(&snapshot, state.is_ready()))
}

fn state_response(snapshot: &Snapshot, ready: bool) -> StateResponse {
    let selection = &snapshot.selection;
    StateResponse {
        revision: snapshot.revision,
        ready,
        selected_countries: selection.selected_countries.clone(),
        chips: selection
            .selected_countries
            .iter()
            .map(|name| Chip {
                name: name.clone(),
                color: string_to_hex(name),
            })
            .collect(),
        current_country: selection.current_country.clone(),
        strategy: selection.strategy.clone(),
        metric: selection.metric,
    }
}

pub async fn get_countries(
    State(state): State<AppState>,
    Query(query): Query<TableQuery>,
) -> Result<Json<Vec<CountryRow>>, AppError> {
    let key: SortKey = query
        .sort
        .as_deref()
        .map(str::parse)
        .transpose()
        .map_err(AppError::bad_request)?
        .unwrap_or_default();
    let order: SortOrder = query
        .order
        .as_deref()
        .map(str::parse)
        .transpose()
        .map_err(AppError::bad_request)?
        .unwrap_or_default();

    let snapshot = state.snapshot().await;
    Ok(Json(build_table(
        &snapshot.report,
        &snapshot.selection.selected_countries,
        key,
        order,
    )))
}

pub async fn get_chart(State(state): State<AppState>) -> Json<ChartFrame> {
    if !state.wait_ready().await {
        warn!("report still loading, serving current chart");
    }
    Json(state.latest_frame())
}

pub async fn add_country(
    State(state): State<AppState>,
    Json(payload): Json<CountryRequest>,
) -> Result<Json<ChartFrame>, AppError> {
    let country = payload
        .country
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty());
    Ok(Json(apply(&state, Action::AddCountry(country)).await))
}

pub async fn remove_country(
    State(state): State<AppState>,
    Json(payload): Json<CountryRequest>,
) -> Result<Json<ChartFrame>, AppError> {
    let country = required_country(payload)?;
    Ok(Json(apply(&state, Action::RemoveCountry(country)).await))
}

pub async fn toggle_country(
    State(state): State<AppState>,
    Json(payload): Json<CountryRequest>,
) -> Result<Json<ChartFrame>, AppError> {
    let country = required_country(payload)?;
    Ok(Json(apply(&state, Action::ToggleCountry(country)).await))
}

pub async fn select_country(
    State(state): State<AppState>,
    Json(payload): Json<CountryRequest>,
) -> Result<Json<ChartFrame>, AppError> {
    let country = required_country(payload)?;
    Ok(Json(apply(&state, Action::SelectCountry(country)).await))
}

pub async fn set_strategy(
    State(state): State<AppState>,
    Json(payload): Json<StrategyRequest>,
) -> Result<Json<ChartFrame>, AppError> {
    let kind = payload.kind.trim().parse().map_err(AppError::bad_request)?;
    Ok(Json(apply(&state, Action::SetStrategyKind(kind)).await))
}

pub async fn set_metric(
    State(state): State<AppState>,
    Json(payload): Json<MetricRequest>,
) -> Result<Json<ChartFrame>, AppError> {
    let metric = payload.metric.trim().parse().map_err(AppError::bad_request)?;
    Ok(Json(apply(&state, Action::SetMetric(metric)).await))
}

pub async fn click_point(
    State(state): State<AppState>,
    Json(payload): Json<ClickPointRequest>,
) -> Result<Json<ChartFrame>, AppError> {
    Ok(Json(apply(&state, Action::ClickPoint(payload.index)).await))
}

async fn apply(state: &AppState, action: Action) -> ChartFrame {
    info!(?action, "dispatch");
    state.dispatch(action).await
}

fn required_country(payload: CountryRequest) -> Result<String, AppError> {
    payload
        .country
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| AppError::bad_request("country is required"))
}
