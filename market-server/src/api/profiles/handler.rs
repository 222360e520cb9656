use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::models::{
    Capability, Page, PlatformStats, ProfileUpdate, Role, SupplierFilters, UserProfile,
};

use crate::api::AppResult;
use crate::auth::CurrentUser;
use crate::core::ServerState;

#[derive(Debug, Deserialize)]
pub struct RoleQuery {
    pub role: Role,
}

/// GET /api/profile
pub async fn get_own(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<UserProfile>> {
    Ok(Json(state.profiles.get_profile(&user.id).await?))
}

/// POST /api/profile
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    payload: Option<Json<ProfileUpdate>>,
) -> AppResult<Json<UserProfile>> {
    let data = payload.map(|Json(data)| data).unwrap_or_default();
    Ok(Json(state.profiles.create_profile(&user.actor(), data).await?))
}

/// PUT /api/profile
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<ProfileUpdate>,
) -> AppResult<Json<UserProfile>> {
    Ok(Json(state.profiles.update_profile(&user.id, payload).await?))
}

/// GET /api/users?role=
pub async fn list_by_role(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<RoleQuery>,
) -> AppResult<Json<Vec<UserProfile>>> {
    user.require(Capability::ViewAll)?;
    Ok(Json(state.profiles.list_users_by_role(query.role).await?))
}

/// GET /api/suppliers?location=&category=&min_rating=&is_verified=
pub async fn list_suppliers(
    State(state): State<ServerState>,
    Query(filters): Query<SupplierFilters>,
) -> AppResult<Json<Page<UserProfile>>> {
    Ok(Json(state.profiles.list_suppliers(&filters).await?))
}

/// POST /api/users/{uid}/verify
pub async fn verify(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(uid): Path<String>,
) -> AppResult<Json<UserProfile>> {
    user.require(Capability::Verify)?;
    Ok(Json(state.profiles.verify_user(&uid, &user.actor()).await?))
}

/// GET /api/stats
pub async fn platform_stats(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<PlatformStats>> {
    user.require(Capability::ViewAll)?;
    Ok(Json(state.profiles.platform_stats().await?))
}
