use actix_web::HttpResponse;

pub mod auth;
pub mod cart;
pub mod items;
pub mod orders;

/// GET /api/health
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service is up"),
    ),
    tag = "health"
)]
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "message": "Cafe Akasa API is running!" }))
}
