//! # crudlayer
//!
//! Building blocks for versioned CRUD resources on axum and sea-orm.
//!
//! An application supplies an entity type, a [`CrudMapper`], a
//! [`CrudDtoMapper`] and a [`CrudRepository`] (usually [`SeaOrmRepository`]).
//! The crate provides the rest:
//!
//! - [`CrudService`] with optimistic-locking updates and soft deletes
//! - [`CrudController`] and [`crud_router`] exposing the REST endpoints
//! - [`ApiError`] mapping failures to sanitized JSON responses
//! - [`openapi::crud_openapi`] describing the endpoints
//!
//! ```rust,ignore
//! let service = CrudService::new("Foo", Arc::new(UtcInstantProvider), SeaOrmRepository::new(db), FooMapper);
//! let app = Router::new().nest("/foos", crud_router(CrudController::new(service, FooDtoMapper)));
//! ```

pub mod config;
pub mod controller;
pub mod core;
pub mod database;
pub mod errors;
pub mod instant;
pub mod openapi;
pub mod pagination;
pub mod parameters;
pub mod routes;
pub mod validation;

pub use config::PaginationConfig;
pub use controller::CrudController;
pub use core::{
    CrudDtoMapper, CrudEntity, CrudError, CrudMapper, CrudRepository, CrudService, EntityId,
    StoreError,
};
pub use database::{SeaOrmEntity, SeaOrmRepository};
pub use errors::{ApiError, CrudErrorBody};
pub use instant::{InstantProvider, UtcInstantProvider};
pub use pagination::{Page, PageRequest, Paged};
pub use parameters::Parameters;
pub use routes::crud_router;
pub use validation::{Validatable, ValidationError};

// Used by `crud_entity!` expansions.
pub use chrono;
