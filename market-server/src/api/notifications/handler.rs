use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use shared::models::{Notification, NotificationFilters, NotificationPage};

use crate::api::{AppError, AppResult};
use crate::auth::CurrentUser;
use crate::core::ServerState;

#[derive(Debug, Serialize, Deserialize)]
pub struct UnreadCount {
    pub unread_count: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MarkedRead {
    pub updated: usize,
}

/// Someone else's notification looks the same as a missing one
async fn owned(state: &ServerState, user: &CurrentUser, id: &str) -> AppResult<()> {
    let notification = state.notifications.get(id).await?;
    if notification.user_id != user.id {
        return Err(AppError::not_found(format!("Notification {id}")));
    }
    Ok(())
}

/// GET /api/notifications
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(filters): Query<NotificationFilters>,
) -> AppResult<Json<NotificationPage>> {
    Ok(Json(
        state.notifications.list_for_user(&user.id, &filters).await?,
    ))
}

/// GET /api/notifications/unread-count
pub async fn unread_count(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<UnreadCount>> {
    let unread_count = state.notifications.unread_count(&user.id).await?;
    Ok(Json(UnreadCount { unread_count }))
}

/// POST /api/notifications/read-all
pub async fn mark_all_read(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<MarkedRead>> {
    let updated = state.notifications.mark_all_read(&user.id).await?;
    Ok(Json(MarkedRead { updated }))
}

/// POST /api/notifications/{id}/read
pub async fn mark_read(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<Notification>> {
    owned(&state, &user, &id).await?;
    Ok(Json(state.notifications.mark_read(&id).await?))
}

/// POST /api/notifications/{id}/archive
pub async fn archive(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<Notification>> {
    owned(&state, &user, &id).await?;
    Ok(Json(state.notifications.archive(&id).await?))
}
