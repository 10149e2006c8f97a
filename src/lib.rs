pub mod application;
pub mod auth;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod models;
pub mod schema;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use application::order_service::OrderService;
use auth::JwtKeys;
use infrastructure::order_repo::DieselOrderRepository;

pub use db::{create_pool, DbPool};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) {
    let mut conn = pool.get().expect("Failed to get DB connection for migrations");
    conn.run_pending_migrations(MIGRATIONS)
        .expect("Failed to run database migrations");
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::auth::register,
        handlers::auth::login,
        handlers::items::list_categories,
        handlers::items::list_items,
        handlers::cart::get_cart,
        handlers::cart::add_to_cart,
        handlers::cart::update_cart_item,
        handlers::cart::remove_from_cart,
        handlers::orders::checkout,
        handlers::orders::order_history,
        handlers::orders::order_details,
    ),
    components(schemas(
        handlers::auth::RegisterRequest,
        handlers::auth::LoginRequest,
        handlers::auth::UserResponse,
        handlers::auth::AuthResponse,
        handlers::items::CategoryResponse,
        handlers::items::ItemResponse,
        handlers::cart::AddToCartRequest,
        handlers::cart::UpdateCartRequest,
        handlers::cart::CartLineResponse,
        handlers::orders::PlacedOrderResponse,
        handlers::orders::CheckoutResponse,
        handlers::orders::OrderSummaryResponse,
        handlers::orders::OrderLineResponse,
        handlers::orders::OrderDetailsResponse,
    )),
    tags(
        (name = "health", description = "Service liveness"),
        (name = "auth", description = "Registration and login"),
        (name = "items", description = "Menu browsing"),
        (name = "cart", description = "Shopping cart management"),
        (name = "orders", description = "Checkout and order history"),
    )
)]
pub struct ApiDoc;

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    pool: DbPool,
    jwt_keys: JwtKeys,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    let order_service = web::Data::new(OrderService::shared(DieselOrderRepository::new(
        pool.clone(),
    )));
    let jwt_keys = web::Data::new(jwt_keys);

    Ok(HttpServer::new(move || {
        App::new()
            .app_data(web::JsonConfig::default().error_handler(errors::json_error_handler))
            .app_data(web::PathConfig::default().error_handler(errors::path_error_handler))
            .app_data(web::Data::new(pool.clone()))
            .app_data(order_service.clone())
            .app_data(jwt_keys.clone())
            .wrap(Logger::default())
            .service(
                web::scope("/api")
                    .route("/health", web::get().to(handlers::health))
                    .service(
                        web::scope("/auth")
                            .route("/register", web::post().to(handlers::auth::register))
                            .route("/login", web::post().to(handlers::auth::login)),
                    )
                    .service(
                        web::scope("/items")
                            .route(
                                "/categories",
                                web::get().to(handlers::items::list_categories),
                            )
                            .route("", web::get().to(handlers::items::list_items)),
                    )
                    .service(
                        web::scope("/cart")
                            .route("", web::get().to(handlers::cart::get_cart))
                            .route("", web::post().to(handlers::cart::add_to_cart))
                            .route(
                                "/{item_id}",
                                web::put().to(handlers::cart::update_cart_item),
                            )
                            .route(
                                "/{item_id}",
                                web::delete().to(handlers::cart::remove_from_cart),
                            ),
                    )
                    .service(
                        web::scope("/orders")
                            .route("/checkout", web::post().to(handlers::orders::checkout))
                            .route("", web::get().to(handlers::orders::order_history))
                            .route(
                                "/{order_id}",
                                web::get().to(handlers::orders::order_details),
                            ),
                    ),
            )
            .service(
                SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}
