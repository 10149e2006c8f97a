use actix_web::{web, HttpResponse};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::order_service::SharedOrderService;
use crate::auth::AuthenticatedUser;
use crate::domain::order::{OrderDetails, OrderSummary, PlacedOrder};
use crate::errors::AppError;

// ── Response DTOs ────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlacedOrderResponse {
    pub id: Uuid,
    pub tracking_id: String,
    /// Decimal amount as a string to avoid floating-point issues, e.g. "13.50"
    pub total_amount: String,
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckoutResponse {
    pub message: String,
    pub order: PlacedOrderResponse,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummaryResponse {
    pub id: Uuid,
    pub tracking_id: String,
    pub total_amount: String,
    pub status: String,
    pub created_at: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineResponse {
    pub item_id: Uuid,
    pub name: String,
    pub image_url: Option<String>,
    pub quantity: i32,
    pub unit_price: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetailsResponse {
    pub id: Uuid,
    pub tracking_id: String,
    pub total_amount: String,
    pub status: String,
    pub created_at: String,
    pub items: Vec<OrderLineResponse>,
}

impl From<PlacedOrder> for PlacedOrderResponse {
    fn from(placed: PlacedOrder) -> Self {
        Self {
            id: placed.id,
            tracking_id: placed.tracking_id,
            total_amount: placed.total_amount.to_string(),
            status: placed.status.to_string(),
        }
    }
}

impl From<OrderSummary> for OrderSummaryResponse {
    fn from(summary: OrderSummary) -> Self {
        Self {
            id: summary.id,
            tracking_id: summary.tracking_id,
            total_amount: summary.total_amount.to_string(),
            status: summary.status.to_string(),
            created_at: summary.created_at.to_rfc3339(),
        }
    }
}

impl From<OrderDetails> for OrderDetailsResponse {
    fn from(details: OrderDetails) -> Self {
        Self {
            id: details.id,
            tracking_id: details.tracking_id,
            total_amount: details.total_amount.to_string(),
            status: details.status.to_string(),
            created_at: details.created_at.to_rfc3339(),
            items: details
                .lines
                .into_iter()
                .map(|line| OrderLineResponse {
                    item_id: line.item_id,
                    name: line.name,
                    image_url: line.image_url,
                    quantity: line.quantity,
                    unit_price: line.unit_price.to_string(),
                })
                .collect(),
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /api/orders/checkout
///
/// Converts the caller's cart into an order. The availability check, the
/// order and snapshot inserts, the stock decrements, and the cart removal
/// all happen inside one storage transaction, so a rejection or fault
/// leaves stock and cart untouched.
#[utoipa::path(
    post,
    path = "/api/orders/checkout",
    responses(
        (status = 201, description = "Order placed successfully", body = CheckoutResponse),
        (status = 400, description = "Cart is empty, or some items are not available in the requested quantity"),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn checkout(
    service: web::Data<SharedOrderService>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let user_id = user.user_id;

    let placed = web::block(move || service.checkout(user_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    log::info!(
        "order {} placed for user {} ({})",
        placed.id,
        user_id,
        placed.tracking_id
    );

    Ok(HttpResponse::Created().json(CheckoutResponse {
        message: "Order placed successfully".to_string(),
        order: placed.into(),
    }))
}

/// GET /api/orders
///
/// Lists the caller's orders, newest first, without their lines.
#[utoipa::path(
    get,
    path = "/api/orders",
    responses(
        (status = 200, description = "The caller's orders, newest first", body = [OrderSummaryResponse]),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn order_history(
    service: web::Data<SharedOrderService>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let user_id = user.user_id;

    let orders = web::block(move || service.order_history(user_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    let response: Vec<OrderSummaryResponse> =
        orders.into_iter().map(OrderSummaryResponse::from).collect();
    Ok(HttpResponse::Ok().json(response))
}

/// GET /api/orders/{order_id}
///
/// Returns one of the caller's orders with its snapshot lines. Orders of
/// other users answer 404, not 403, so order ids cannot be probed.
#[utoipa::path(
    get,
    path = "/api/orders/{order_id}",
    params(
        ("order_id" = Uuid, Path, description = "Order UUID"),
    ),
    responses(
        (status = 200, description = "Order found", body = OrderDetailsResponse),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn order_details(
    service: web::Data<SharedOrderService>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let user_id = user.user_id;
    let order_id = path.into_inner();

    let details = web::block(move || service.order_details(user_id, order_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    match details {
        Some(details) => Ok(HttpResponse::Ok().json(OrderDetailsResponse::from(details))),
        None => Err(AppError::NotFound("Order not found".to_string())),
    }
}
