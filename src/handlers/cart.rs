use actix_web::{web, HttpResponse};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::AuthenticatedUser;
use crate::db::DbPool;
use crate::errors::AppError;
use crate::models::{CartItem, Item, NewCartItem};
use crate::schema::{cart_items, items};

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub item_id: Option<Uuid>,
    #[serde(default)]
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCartRequest {
    #[serde(default)]
    pub quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartLineResponse {
    pub id: Uuid,
    pub item_id: Uuid,
    pub quantity: i32,
    pub name: String,
    /// Decimal price as a string to avoid floating-point issues, e.g. "4.50"
    pub price: String,
    pub stock: i32,
    pub image_url: Option<String>,
    pub description: Option<String>,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /api/cart
///
/// The caller's cart joined with live item data, most recently added first.
#[utoipa::path(
    get,
    path = "/api/cart",
    responses(
        (status = 200, description = "Cart lines", body = [CartLineResponse]),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "cart"
)]
pub async fn get_cart(
    pool: web::Data<DbPool>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let user_id = user.user_id;

    let rows = web::block(move || {
        let mut conn = pool.get()?;
        Ok::<_, AppError>(
            cart_items::table
                .inner_join(items::table)
                .filter(cart_items::user_id.eq(user_id))
                .order(cart_items::created_at.desc())
                .select((CartItem::as_select(), Item::as_select()))
                .load::<(CartItem, Item)>(&mut conn)?,
        )
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    let response: Vec<CartLineResponse> = rows
        .into_iter()
        .map(|(line, item)| CartLineResponse {
            id: line.id,
            item_id: line.item_id,
            quantity: line.quantity,
            name: item.name,
            price: item.price.to_string(),
            stock: item.stock,
            image_url: item.image_url,
            description: item.description,
        })
        .collect();
    Ok(HttpResponse::Ok().json(response))
}

/// POST /api/cart
///
/// Adds an item to the cart, merging quantities when the item is already
/// there. The check against stock here is advisory; checkout re-checks
/// inside its transaction.
#[utoipa::path(
    post,
    path = "/api/cart",
    request_body = AddToCartRequest,
    responses(
        (status = 200, description = "Item added or quantity merged"),
        (status = 400, description = "Missing item id, invalid quantity, or requested more than the available stock"),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 404, description = "Item not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "cart"
)]
pub async fn add_to_cart(
    pool: web::Data<DbPool>,
    user: AuthenticatedUser,
    body: web::Json<AddToCartRequest>,
) -> Result<HttpResponse, AppError> {
    let user_id = user.user_id;
    let AddToCartRequest { item_id, quantity } = body.into_inner();
    let Some(item_id) = item_id else {
        return Err(AppError::Validation(
            "Item ID and valid quantity are required".to_string(),
        ));
    };
    if quantity < 1 {
        return Err(AppError::Validation(
            "Item ID and valid quantity are required".to_string(),
        ));
    }

    let message = web::block(move || {
        let mut conn = pool.get()?;

        let item = items::table
            .find(item_id)
            .select(Item::as_select())
            .first(&mut conn)
            .optional()?;
        let Some(item) = item else {
            return Err(AppError::NotFound("Item not found".to_string()));
        };
        if item.stock < quantity {
            return Err(AppError::Validation(
                "Insufficient stock available".to_string(),
            ));
        }

        let existing = cart_items::table
            .filter(cart_items::user_id.eq(user_id))
            .filter(cart_items::item_id.eq(item_id))
            .select(CartItem::as_select())
            .first(&mut conn)
            .optional()?;

        match existing {
            Some(line) => {
                // Stock is i32 too, so a merged quantity that overflows can
                // never be covered.
                let new_quantity = match line.quantity.checked_add(quantity) {
                    Some(total) if item.stock >= total => total,
                    _ => {
                        return Err(AppError::Validation(
                            "Insufficient stock available".to_string(),
                        ))
                    }
                };
                diesel::update(cart_items::table.find(line.id))
                    .set(cart_items::quantity.eq(new_quantity))
                    .execute(&mut conn)?;
                Ok("Cart updated successfully")
            }
            None => {
                diesel::insert_into(cart_items::table)
                    .values(&NewCartItem {
                        id: Uuid::new_v4(),
                        user_id,
                        item_id,
                        quantity,
                    })
                    .execute(&mut conn)?;
                Ok("Item added to cart successfully")
            }
        }
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(json!({ "message": message })))
}

/// PUT /api/cart/{item_id}
///
/// Replaces the quantity of one cart line.
#[utoipa::path(
    put,
    path = "/api/cart/{item_id}",
    params(
        ("item_id" = Uuid, Path, description = "Item UUID"),
    ),
    request_body = UpdateCartRequest,
    responses(
        (status = 200, description = "Cart item updated successfully"),
        (status = 400, description = "Invalid quantity, or requested more than the available stock"),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 404, description = "Item or cart line not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "cart"
)]
pub async fn update_cart_item(
    pool: web::Data<DbPool>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    body: web::Json<UpdateCartRequest>,
) -> Result<HttpResponse, AppError> {
    let user_id = user.user_id;
    let item_id = path.into_inner();
    let quantity = body.into_inner().quantity;
    if quantity < 1 {
        return Err(AppError::Validation("Valid quantity is required".to_string()));
    }

    web::block(move || {
        let mut conn = pool.get()?;

        let stock = items::table
            .find(item_id)
            .select(items::stock)
            .first::<i32>(&mut conn)
            .optional()?;
        let Some(stock) = stock else {
            return Err(AppError::NotFound("Item not found".to_string()));
        };
        if stock < quantity {
            return Err(AppError::Validation(
                "Insufficient stock available".to_string(),
            ));
        }

        let updated = diesel::update(
            cart_items::table
                .filter(cart_items::user_id.eq(user_id))
                .filter(cart_items::item_id.eq(item_id)),
        )
        .set(cart_items::quantity.eq(quantity))
        .execute(&mut conn)?;
        if updated == 0 {
            return Err(AppError::NotFound("Cart item not found".to_string()));
        }

        Ok(())
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(json!({ "message": "Cart item updated successfully" })))
}

/// DELETE /api/cart/{item_id}
#[utoipa::path(
    delete,
    path = "/api/cart/{item_id}",
    params(
        ("item_id" = Uuid, Path, description = "Item UUID"),
    ),
    responses(
        (status = 200, description = "Item removed from cart successfully"),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 404, description = "Cart line not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "cart"
)]
pub async fn remove_from_cart(
    pool: web::Data<DbPool>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let user_id = user.user_id;
    let item_id = path.into_inner();

    web::block(move || {
        let mut conn = pool.get()?;

        let deleted = diesel::delete(
            cart_items::table
                .filter(cart_items::user_id.eq(user_id))
                .filter(cart_items::item_id.eq(item_id)),
        )
        .execute(&mut conn)?;
        if deleted == 0 {
            return Err(AppError::NotFound("Cart item not found".to_string()));
        }

        Ok(())
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(json!({ "message": "Item removed from cart successfully" })))
}
