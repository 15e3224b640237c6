//! API routes for order-server

pub mod auth;
pub mod orders;

use axum::routing::{get, post};
use axum::{Router, middleware};
use shared::error::AppError;
use tower_http::trace::TraceLayer;

use crate::auth::middleware::require_auth;
use crate::state::AppState;

pub type ApiResult<T> = Result<axum::Json<T>, AppError>;

/// Map a database error to a logged internal error
pub(crate) fn internal(e: sqlx::Error) -> AppError {
    tracing::error!("database error: {e}");
    AppError::database("Database error")
}

/// Create the combined router
pub fn create_router(state: AppState) -> Router {
    // Public authentication endpoints (no bearer token)
    let public = Router::new()
        .route("/auth/signup", post(auth::signup))
        .route("/auth/signin", post(auth::signin))
        .route("/auth/signin-test", post(auth::signin_test));

    // Bearer-authenticated endpoints
    let protected = Router::new()
        .route("/auth/refresh", post(auth::refresh))
        .route("/auth/create-admin", post(auth::create_admin))
        .route("/orders/order", post(orders::create_order))
        .route("/orders/order/{order_id}", get(orders::get_order))
        .route("/orders/order/cancel/{order_id}", post(orders::cancel_order))
        .route("/orders/order/finish/{order_id}", post(orders::finish_order))
        .route("/orders/order/add-item/{order_id}", post(orders::add_item))
        .route("/orders/order/remove-item/{item_id}", post(orders::remove_item))
        .route("/orders/list", get(orders::list_orders))
        .route("/orders/list/{user_id}", get(orders::list_orders_for_user))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
