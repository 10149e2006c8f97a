use actix_web::{web, HttpResponse};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::DbPool;
use crate::errors::AppError;
use crate::models::{Category, Item};
use crate::schema::{categories, items};

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct ListItemsParams {
    /// Category id to filter by; omit or pass "All" for the whole menu.
    pub category: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryResponse {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    /// Decimal price as a string to avoid floating-point issues, e.g. "4.50"
    pub price: String,
    pub stock: i32,
    pub category_id: Uuid,
    pub category_name: String,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /api/items/categories
#[utoipa::path(
    get,
    path = "/api/items/categories",
    responses(
        (status = 200, description = "All categories, alphabetical", body = [CategoryResponse]),
        (status = 500, description = "Internal server error"),
    ),
    tag = "items"
)]
pub async fn list_categories(pool: web::Data<DbPool>) -> Result<HttpResponse, AppError> {
    let rows = web::block(move || {
        let mut conn = pool.get()?;
        Ok::<_, AppError>(
            categories::table
                .order(categories::name.asc())
                .select(Category::as_select())
                .load(&mut conn)?,
        )
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    let response: Vec<CategoryResponse> = rows
        .into_iter()
        .map(|c| CategoryResponse {
            id: c.id,
            name: c.name,
        })
        .collect();
    Ok(HttpResponse::Ok().json(response))
}

/// GET /api/items?category={id|All}
///
/// The menu joined with category names, alphabetical by item name.
#[utoipa::path(
    get,
    path = "/api/items",
    params(
        ("category" = Option<String>, Query, description = "Category id to filter by, or \"All\""),
    ),
    responses(
        (status = 200, description = "Menu items", body = [ItemResponse]),
        (status = 400, description = "Malformed category id"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "items"
)]
pub async fn list_items(
    pool: web::Data<DbPool>,
    query: web::Query<ListItemsParams>,
) -> Result<HttpResponse, AppError> {
    let category_filter = match query.into_inner().category {
        None => None,
        Some(raw) if raw == "All" => None,
        Some(raw) => Some(
            Uuid::parse_str(&raw)
                .map_err(|_| AppError::Validation("Invalid category id".to_string()))?,
        ),
    };

    let rows = web::block(move || {
        let mut conn = pool.get()?;

        let mut query = items::table
            .inner_join(categories::table)
            .select((Item::as_select(), Category::as_select()))
            .into_boxed();
        if let Some(category_id) = category_filter {
            query = query.filter(items::category_id.eq(category_id));
        }

        Ok::<_, AppError>(
            query
                .order(items::name.asc())
                .load::<(Item, Category)>(&mut conn)?,
        )
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    let response: Vec<ItemResponse> = rows
        .into_iter()
        .map(|(item, category)| ItemResponse {
            id: item.id,
            name: item.name,
            description: item.description,
            image_url: item.image_url,
            price: item.price.to_string(),
            stock: item.stock,
            category_id: item.category_id,
            category_name: category.name,
        })
        .collect();
    Ok(HttpResponse::Ok().json(response))
}
