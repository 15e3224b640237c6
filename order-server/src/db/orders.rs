//! Order and order item storage

use serde::Serialize;
use sqlx::PgPool;

/// Order status domain
///
/// DELIVERED is part of the declared domain but no transition in this service
/// produces it; finishing an order sets FINISHED. Transitions are deliberately
/// unguarded: any status may move to any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Pending,
    Canceled,
    Delivered,
    Finished,
}

impl OrderStatus {
    /// Parse from database string value
    #[allow(dead_code)]
    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(Self::Pending),
            "CANCELED" => Some(Self::Canceled),
            "DELIVERED" => Some(Self::Delivered),
            "FINISHED" => Some(Self::Finished),
            _ => None,
        }
    }

    /// Database string representation
    pub fn as_db(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Canceled => "CANCELED",
            Self::Delivered => "DELIVERED",
            Self::Finished => "FINISHED",
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    pub status: String,
    /// Derived: sum of price × amount over live items once any item exists
    pub price: f64,
    pub created_at: i64,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub amount: i32,
}

/// Insert payload for a new order item
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub amount: i32,
}

pub async fn create(
    pool: &PgPool,
    user_id: i64,
    price: f64,
    now: i64,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        "INSERT INTO orders (user_id, status, price, created_at)
         VALUES ($1, $2, $3, $4)
         RETURNING id",
    )
    .bind(user_id)
    .bind(OrderStatus::Pending.as_db())
    .bind(price)
    .bind(now)
    .fetch_one(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM orders WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn set_status(
    pool: &PgPool,
    order_id: i64,
    status: OrderStatus,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE orders SET status = $1 WHERE id = $2")
        .bind(status.as_db())
        .bind(order_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// List orders for one user, most recent first.
///
/// A `None` limit binds NULL, which PostgreSQL treats as LIMIT ALL.
pub async fn list_for_user(
    pool: &PgPool,
    user_id: i64,
    limit: Option<i64>,
) -> Result<Vec<Order>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM orders WHERE user_id = $1 ORDER BY id DESC LIMIT $2")
        .bind(user_id)
        .bind(limit)
        .fetch_all(pool)
        .await
}

/// List every order, most recent first (admin listing)
pub async fn list_all(pool: &PgPool) -> Result<Vec<Order>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM orders ORDER BY id DESC")
        .fetch_all(pool)
        .await
}

pub async fn list_items(pool: &PgPool, order_id: i64) -> Result<Vec<OrderItem>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM order_items WHERE order_id = $1 ORDER BY id")
        .bind(order_id)
        .fetch_all(pool)
        .await
}

pub async fn add_item(
    pool: &PgPool,
    order_id: i64,
    item: &NewOrderItem,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        "INSERT INTO order_items (order_id, name, description, price, amount)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING id",
    )
    .bind(order_id)
    .bind(&item.name)
    .bind(&item.description)
    .bind(item.price)
    .bind(item.amount)
    .fetch_one(pool)
    .await
}

pub async fn find_item_by_id(pool: &PgPool, id: i64) -> Result<Option<OrderItem>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM order_items WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn delete_item(pool: &PgPool, id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM order_items WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Sum of price × amount over a set of items
pub fn items_total(items: &[OrderItem]) -> f64 {
    items.iter().map(|i| i.price * f64::from(i.amount)).sum()
}

/// Recompute an order's derived price from its live items and persist it.
///
/// The stored price is never trusted or incremented in place; it is always
/// rebuilt from the items that currently exist.
pub async fn recalculate_total(pool: &PgPool, order_id: i64) -> Result<f64, sqlx::Error> {
    let items = list_items(pool, order_id).await?;
    let total = items_total(&items);

    sqlx::query("UPDATE orders SET price = $1 WHERE id = $2")
        .bind(total)
        .bind(order_id)
        .execute(pool)
        .await?;

    Ok(total)
}
