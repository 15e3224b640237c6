//! Order endpoints: creation, detail, status transitions, item mutation, listing

use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};
use shared::util::now_millis;

use crate::auth::CurrentUser;
use crate::db::orders::{self, NewOrderItem, Order, OrderItem, OrderStatus};
use crate::state::AppState;

use super::{ApiResult, internal};

/// Cap applied to a non-admin's default listing (no explicit target user)
const DEFAULT_LIST_LIMIT: i64 = 10;

// ── Request / Response types ──

#[derive(Deserialize)]
pub struct CreateOrderRequest {
    pub user_id: i64,
    pub price: f64,
}

#[derive(Deserialize)]
pub struct AddItemRequest {
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub amount: i32,
}

#[derive(Serialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

// ── Helpers ──

/// Load an order and check the owner-or-admin policy for it
async fn load_authorized_order(
    state: &AppState,
    order_id: i64,
    user: &CurrentUser,
) -> Result<Order, AppError> {
    let order = orders::find_by_id(&state.pool, order_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;

    if !user.can_access(order.user_id) {
        return Err(AppError::permission_denied("Action not permitted"));
    }

    Ok(order)
}

// ── Handlers ──

/// POST /orders/order
pub async fn create_order(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<CreateOrderRequest>,
) -> ApiResult<serde_json::Value> {
    if !user.can_access(req.user_id) {
        return Err(AppError::permission_denied("Action not permitted"));
    }

    // The caller-supplied price stands until the first item mutation recomputes it
    let order_id = orders::create(&state.pool, req.user_id, req.price, now_millis())
        .await
        .map_err(internal)?;

    Ok(Json(serde_json::json!({
        "message": format!("Order created successfully. Order ID: {order_id}")
    })))
}

/// GET /orders/order/{order_id}
pub async fn get_order(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(order_id): Path<i64>,
) -> ApiResult<serde_json::Value> {
    let order = load_authorized_order(&state, order_id, &user).await?;

    let items = orders::list_items(&state.pool, order.id)
        .await
        .map_err(internal)?;

    Ok(Json(serde_json::json!({
        "order": OrderDetail { order, items }
    })))
}

/// POST /orders/order/cancel/{order_id}
///
/// Transitions are unguarded: any current status may move to CANCELED, and
/// re-canceling just rewrites the same value.
pub async fn cancel_order(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(order_id): Path<i64>,
) -> ApiResult<serde_json::Value> {
    let order = load_authorized_order(&state, order_id, &user).await?;

    orders::set_status(&state.pool, order.id, OrderStatus::Canceled)
        .await
        .map_err(internal)?;

    let order = Order {
        status: OrderStatus::Canceled.as_db().to_string(),
        ..order
    };

    Ok(Json(serde_json::json!({
        "message": format!("Order {} canceled successfully.", order.id),
        "order": order,
    })))
}

/// POST /orders/order/finish/{order_id}
pub async fn finish_order(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(order_id): Path<i64>,
) -> ApiResult<serde_json::Value> {
    let order = load_authorized_order(&state, order_id, &user).await?;

    orders::set_status(&state.pool, order.id, OrderStatus::Finished)
        .await
        .map_err(internal)?;

    let order = Order {
        status: OrderStatus::Finished.as_db().to_string(),
        ..order
    };

    Ok(Json(serde_json::json!({
        "message": format!("Order {} finished successfully.", order.id),
        "order": order,
    })))
}

/// POST /orders/order/add-item/{order_id}
pub async fn add_item(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(order_id): Path<i64>,
    Json(req): Json<AddItemRequest>,
) -> ApiResult<serde_json::Value> {
    let order = load_authorized_order(&state, order_id, &user).await?;

    let item = NewOrderItem {
        name: req.name,
        description: req.description,
        price: req.price,
        amount: req.amount,
    };
    orders::add_item(&state.pool, order.id, &item)
        .await
        .map_err(internal)?;

    let total = orders::recalculate_total(&state.pool, order.id)
        .await
        .map_err(internal)?;

    Ok(Json(serde_json::json!({
        "message": format!("Item added to order {} successfully.", order.id),
        "total_price": total,
    })))
}

/// POST /orders/order/remove-item/{item_id}
pub async fn remove_item(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(item_id): Path<i64>,
) -> ApiResult<serde_json::Value> {
    let item = orders::find_item_by_id(&state.pool, item_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::OrderItemNotFound))?;

    // Authorization runs against the parent order's owner
    let order = load_authorized_order(&state, item.order_id, &user).await?;

    orders::delete_item(&state.pool, item.id)
        .await
        .map_err(internal)?;

    let total = orders::recalculate_total(&state.pool, order.id)
        .await
        .map_err(internal)?;

    let items = orders::list_items(&state.pool, order.id)
        .await
        .map_err(internal)?;
    let order = Order {
        price: total,
        ..order
    };

    Ok(Json(serde_json::json!({
        "message": format!("Item {} removed from order successfully.", item.id),
        "order_price": total,
        "order": OrderDetail { order, items },
    })))
}

/// GET /orders/list
///
/// Admins see every order; everyone else sees their own, capped at the 10
/// most recent.
pub async fn list_orders(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<serde_json::Value> {
    let result = if user.is_admin() {
        orders::list_all(&state.pool).await
    } else {
        orders::list_for_user(&state.pool, user.id, Some(DEFAULT_LIST_LIMIT)).await
    };

    Ok(Json(serde_json::json!({
        "orders": result.map_err(internal)?
    })))
}

/// GET /orders/list/{user_id}
///
/// Admins may list any user's orders, uncapped. For non-admins the requested
/// id is ignored and they get their own orders, also uncapped — the cap
/// asymmetry with the default listing is intentional.
pub async fn list_orders_for_user(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(user_id): Path<i64>,
) -> ApiResult<serde_json::Value> {
    let target = if user.is_admin() { user_id } else { user.id };

    let result = orders::list_for_user(&state.pool, target, None)
        .await
        .map_err(internal)?;

    Ok(Json(serde_json::json!({ "orders": result })))
}
