use std::io;

use axum::{http::StatusCode, routing::get_service, Router};
use deadpool::managed::Pool;
use diesel_async::{pooled_connection::AsyncDieselConnectionManager, AsyncPgConnection};
use tower_http::services::ServeDir;

pub mod account;
pub mod api;
pub mod auth;
pub mod config;
pub mod email;
pub mod error;
pub mod images;
pub mod listing;
pub mod models;
pub mod org;
pub mod schema;
pub mod store;

pub type DbPool = Pool<AsyncDieselConnectionManager<AsyncPgConnection>>;

pub fn connect_to_db(db_url: &str) -> anyhow::Result<DbPool> {
    let db_config = AsyncDieselConnectionManager::<AsyncPgConnection>::new(db_url);
    Pool::builder(db_config)
        .build()
        .map_err(|e| anyhow::anyhow!("failed to build database pool: {e}"))
}

/// Routes only. Callers layer in the pool, the account service, the jwt keys
/// and the http client.
pub fn app(public_dir: &str) -> Router {
    let serve = get_service(ServeDir::new(public_dir)).handle_error(handle_error);
    Router::new()
        .nest("/api", api::app())
        .nest("/assets", serve)
}

async fn handle_error(err: io::Error) -> error::AppError {
    tracing::warn!(%err, "failed to serve asset");
    error::AppError::from(StatusCode::INTERNAL_SERVER_ERROR, "failed to fetch asset")
}
