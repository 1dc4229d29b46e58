//! A `Foo` resource wired through crudlayer, used by the integration tests
//! and benchmarks.

pub mod foo;
pub mod migration;

use axum::{Json, Router, routing::get};
use crudlayer::openapi::crud_openapi;
use crudlayer::{CrudController, CrudService, SeaOrmRepository, UtcInstantProvider, crud_router};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

use foo::{CreateFooDto, FooDto, FooDtoMapper, FooMapper, UpdateFooDto};
use migration::Migrator;

pub type FooService = CrudService<SeaOrmRepository<foo::Model>, FooMapper>;

/// `DATABASE_URL`, or an in-memory SQLite database.
#[must_use]
pub fn database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite::memory:".to_string())
}

/// Connects and brings the schema up to date. Persistent databases start
/// from an empty `foos` table, so tests sharing one run `#[serial]`.
///
/// # Errors
///
/// Connection or migration failures.
pub async fn setup_db(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(database_url).await?;
    if database_url.starts_with("sqlite::memory:") {
        Migrator::up(&db, None).await?;
    } else {
        Migrator::fresh(&db).await?;
    }
    info!(backend = ?db.get_database_backend(), "Database is ready");
    Ok(db)
}

#[must_use]
pub fn foo_service(db: DatabaseConnection) -> FooService {
    CrudService::new("Foo", Arc::new(UtcInstantProvider), SeaOrmRepository::new(db), FooMapper)
}

/// Router serving `/foos` and its description at `/openapi.json`.
pub fn app(service: FooService) -> Router {
    let controller = CrudController::new(service, FooDtoMapper);
    Router::new()
        .nest("/foos", crud_router(controller))
        .route(
            "/openapi.json",
            get(|| async { Json(crud_openapi::<FooDto, CreateFooDto, UpdateFooDto>("/foos", "Foo")) }),
        )
        .layer(TraceLayer::new_for_http())
}
