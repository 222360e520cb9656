use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use shared::models::{
    AnalyticsEvent, AnalyticsEventCreate, Capability, Dashboard, OrderFilters,
};

use crate::api::{AppError, AppResult};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::prediction::{HISTORY_WINDOW, PredictionContext, Recommendation};

#[derive(Debug, Deserialize)]
pub struct PredictionParams {
    pub business_type: String,
    pub location: String,
    pub seasonality: Option<String>,
    pub budget: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct EventQuery {
    pub user_id: Option<String>,
    pub limit: Option<usize>,
}

const DEFAULT_EVENT_LIMIT: usize = 50;
const MAX_EVENT_LIMIT: usize = 500;

/// GET /api/dashboard
pub async fn dashboard(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<Dashboard>> {
    Ok(Json(state.analytics.dashboard(&user.actor()).await?))
}

/// GET /api/predictions
pub async fn predictions(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(params): Query<PredictionParams>,
) -> AppResult<Json<Vec<Recommendation>>> {
    if params.business_type.trim().is_empty() || params.location.trim().is_empty() {
        return Err(AppError::validation(
            "business_type and location are required",
        ));
    }
    if params.budget.is_some_and(|b| !b.is_finite() || b < 0.0) {
        return Err(AppError::validation("budget must be a non-negative number"));
    }

    let history = state
        .orders
        .list_orders(&OrderFilters {
            user_id: Some(user.id.clone()),
            role: Some(user.role),
            limit: Some(HISTORY_WINDOW),
            ..Default::default()
        })
        .await?;
    let context = PredictionContext {
        previous_orders: history.items,
        seasonality: params.seasonality,
        budget: params.budget,
    };

    let recommendations =
        state
            .predictor
            .predict(&params.business_type, &params.location, &context);
    tracing::info!(
        user_id = %user.id,
        count = recommendations.len(),
        "Recommendations served"
    );
    Ok(Json(recommendations))
}

/// POST /api/events
pub async fn record_event(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<AnalyticsEventCreate>,
) -> AppResult<StatusCode> {
    state.analytics.record_event(&user.actor(), payload).await?;
    Ok(StatusCode::ACCEPTED)
}

/// GET /api/events?user_id=&limit=
pub async fn list_events(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<EventQuery>,
) -> AppResult<Json<Vec<AnalyticsEvent>>> {
    user.require(Capability::ViewAll)?;
    let limit = query.limit.unwrap_or(DEFAULT_EVENT_LIMIT).min(MAX_EVENT_LIMIT);
    Ok(Json(
        state
            .analytics
            .recent_events(query.user_id.as_deref(), limit)
            .await?,
    ))
}
