// sea-orm backed persistence.

pub mod repository;

pub use repository::{SeaOrmEntity, SeaOrmRepository};
