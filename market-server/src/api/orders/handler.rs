use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::models::{
    Capability, Order, OrderCreate, OrderFilters, OrderStatus, OrderStatusUpdate, Page, Role,
};

use crate::api::{AppError, AppResult, Created};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::orders::DEFAULT_PAGE_LIMIT;

/// Caller-settable listing filters; identity comes from the token
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub status: Option<OrderStatus>,
    pub group_id: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct OpenParams {
    pub limit: Option<usize>,
}

/// Vendors see their own orders, suppliers theirs and unassigned ones,
/// admins everything
fn can_view(user: &CurrentUser, order: &Order) -> bool {
    match user.role {
        Role::Admin => true,
        Role::Vendor => order.vendor_id == user.id,
        Role::Supplier => order
            .supplier_id
            .as_deref()
            .is_none_or(|supplier| supplier == user.id),
    }
}

/// POST /api/orders
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<OrderCreate>,
) -> AppResult<Json<Created>> {
    user.require(Capability::CreateOrder)?;
    let id = state.orders.create_order(payload, &user.actor()).await?;
    Ok(Json(Created { id }))
}

/// GET /api/orders
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(params): Query<ListParams>,
) -> AppResult<Json<Page<Order>>> {
    let filters = OrderFilters {
        user_id: Some(user.id.clone()),
        role: Some(user.role),
        status: params.status,
        group_id: params.group_id,
        limit: params.limit,
        offset: params.offset,
    };
    Ok(Json(state.orders.list_orders(&filters).await?))
}

/// GET /api/orders/open
pub async fn open_for_quotes(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(params): Query<OpenParams>,
) -> AppResult<Json<Vec<Order>>> {
    user.require(Capability::QuoteOrder)?;
    let limit = params.limit.unwrap_or(DEFAULT_PAGE_LIMIT);
    Ok(Json(state.orders.open_for_quotes(limit).await?))
}

/// GET /api/orders/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    let order = state.orders.get_order(&id).await?;
    if !can_view(&user, &order) {
        return Err(AppError::permission_denied(format!(
            "order {id} belongs to another account"
        )));
    }
    Ok(Json(order))
}

/// POST /api/orders/{id}/status
pub async fn update_status(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<OrderStatusUpdate>,
) -> AppResult<Json<Order>> {
    let order = state
        .orders
        .update_order_status(&id, payload.status, &user.actor(), payload.options)
        .await?;
    Ok(Json(order))
}
