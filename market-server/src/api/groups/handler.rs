use axum::{
    Json,
    extract::{Path, Query, State},
};
use shared::models::{
    BuyingGroup, BuyingGroupCreate, Capability, GroupFilters, GroupStatusUpdate, Page,
};

use crate::api::{AppResult, Created};
use crate::auth::CurrentUser;
use crate::core::ServerState;

/// POST /api/groups
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<BuyingGroupCreate>,
) -> AppResult<Json<Created>> {
    user.require(Capability::CreateGroup)?;
    let id = state.groups.create_group(payload, &user.actor()).await?;
    Ok(Json(Created { id }))
}

/// GET /api/groups
pub async fn list(
    State(state): State<ServerState>,
    Query(filters): Query<GroupFilters>,
) -> AppResult<Json<Page<BuyingGroup>>> {
    Ok(Json(state.groups.list_groups(&filters).await?))
}

/// GET /api/groups/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<BuyingGroup>> {
    Ok(Json(state.groups.get_group(&id).await?))
}

/// POST /api/groups/{id}/join
pub async fn join(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<BuyingGroup>> {
    user.require(Capability::JoinGroup)?;
    Ok(Json(state.groups.join_group(&id, &user.actor()).await?))
}

/// PUT /api/groups/{id}/status
pub async fn set_status(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<GroupStatusUpdate>,
) -> AppResult<Json<BuyingGroup>> {
    user.require(Capability::ManageGroups)?;
    let group = state.groups.set_status(&id, payload.status).await?;
    tracing::info!(group_id = %id, admin_id = %user.id, "Group status set by admin");
    Ok(Json(group))
}
