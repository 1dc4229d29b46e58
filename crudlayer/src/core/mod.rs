// Entity, store and mapper contracts plus the service built on top of them.

pub mod entity;
pub mod error;
pub mod mapper;
pub mod repository;
pub mod service;

pub use entity::{CrudEntity, EntityId};
pub use error::{CrudError, StoreError};
pub use mapper::{CrudDtoMapper, CrudMapper};
pub use repository::CrudRepository;
pub use service::CrudService;
