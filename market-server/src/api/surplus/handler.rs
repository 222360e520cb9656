use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use shared::models::{
    Capability, Page, Reservation, ReservationRequest, SurplusCreate, SurplusFilters, SurplusItem,
};

use crate::api::{AppResult, Created};
use crate::auth::CurrentUser;
use crate::core::ServerState;

#[derive(Debug, Serialize, Deserialize)]
pub struct ReservationReceipt {
    pub item: SurplusItem,
    pub reservation: Reservation,
}

/// POST /api/surplus
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<SurplusCreate>,
) -> AppResult<Json<Created>> {
    user.require(Capability::CreateSurplus)?;
    let id = state
        .surplus
        .create_surplus_item(payload, &user.actor())
        .await?;
    Ok(Json(Created { id }))
}

/// GET /api/surplus
pub async fn list(
    State(state): State<ServerState>,
    Query(filters): Query<SurplusFilters>,
) -> AppResult<Json<Page<SurplusItem>>> {
    Ok(Json(state.surplus.list_items(&filters).await?))
}

/// GET /api/surplus/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<SurplusItem>> {
    Ok(Json(state.surplus.get_item(&id).await?))
}

/// POST /api/surplus/{id}/reserve
pub async fn reserve(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<ReservationRequest>,
) -> AppResult<Json<ReservationReceipt>> {
    user.require(Capability::ReserveSurplus)?;
    let (item, reservation) = state
        .surplus
        .reserve(&id, &user.actor(), payload.quantity, payload.expires_at)
        .await?;
    Ok(Json(ReservationReceipt { item, reservation }))
}

/// POST /api/surplus/{id}/withdraw
pub async fn withdraw(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<SurplusItem>> {
    Ok(Json(state.surplus.withdraw(&id, &user.id).await?))
}
