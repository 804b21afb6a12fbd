use crate::handlers;
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/state", get(handlers::get_state))
        .route("/api/countries", get(handlers::get_countries))
        .route("/api/countries/add", post(handlers::add_country))
        .route("/api/countries/remove", post(handlers::remove_country))
        .route("/api/countries/toggle", post(handlers::toggle_country))
        .route("/api/current", post(handlers::select_country))
        .route("/api/strategy", post(handlers::set_strategy))
        .route("/api/metric", post(handlers::set_metric))
        .route("/api/chart", get(handlers::get_chart))
        .route("/api/chart/click", post(handlers::click_point))
        .with_state(state)
}
