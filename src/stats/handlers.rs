use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use tracing::instrument;

use crate::{error::ApiError, state::AppState};

use super::dto::{CategoryCount, CombinedData, MonthQuery, PriceRangeCount, Statistics};
use super::month::Month;
use super::services::{
    category_breakdown_for_month, combined_for_month, histogram_for_month, totals_for_month,
};

pub fn stats_routes() -> Router<AppState> {
    Router::new()
        .route("/statistics", get(get_statistics))
        .route("/bar-chart", get(get_bar_chart))
        .route("/pie-chart", get(get_pie_chart))
        .route("/combined-data", get(get_combined_data))
}

#[instrument(skip(state))]
pub async fn get_statistics(
    State(state): State<AppState>,
    Query(q): Query<MonthQuery>,
) -> Result<Json<Statistics>, ApiError> {
    let month = Month::from_query(q.month.as_deref())?;
    let stats = totals_for_month(&state.store, month)
        .await
        .map_err(ApiError::internal("Failed to fetch statistics."))?;
    Ok(Json(stats))
}

#[instrument(skip(state))]
pub async fn get_bar_chart(
    State(state): State<AppState>,
    Query(q): Query<MonthQuery>,
) -> Result<Json<Vec<PriceRangeCount>>, ApiError> {
    let month = Month::from_query(q.month.as_deref())?;
    let bars = histogram_for_month(&state.store, month)
        .await
        .map_err(ApiError::internal("Failed to fetch bar chart data."))?;
    Ok(Json(bars))
}

#[instrument(skip(state))]
pub async fn get_pie_chart(
    State(state): State<AppState>,
    Query(q): Query<MonthQuery>,
) -> Result<Json<Vec<CategoryCount>>, ApiError> {
    let month = Month::from_query(q.month.as_deref())?;
    let slices = category_breakdown_for_month(&state.store, month)
        .await
        .map_err(ApiError::internal("Failed to fetch pie chart data."))?;
    Ok(Json(slices))
}

#[instrument(skip(state))]
pub async fn get_combined_data(
    State(state): State<AppState>,
    Query(q): Query<MonthQuery>,
) -> Result<Json<CombinedData>, ApiError> {
    let month = Month::from_query(q.month.as_deref())?;
    let combined = combined_for_month(&state.store, month)
        .await
        .map_err(ApiError::internal("Failed to combine data."))?;
    Ok(Json(combined))
}
