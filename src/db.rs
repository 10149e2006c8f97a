use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};

/// Shared r2d2 pool handed to every handler through actix app data.
pub type DbPool = Pool<ConnectionManager<PgConnection>>;

/// Builds the startup pool; panics if the database is unreachable.
pub fn create_pool(database_url: &str) -> DbPool {
    Pool::builder()
        .build(ConnectionManager::<PgConnection>::new(database_url))
        .expect("Failed to create database connection pool")
}
