use async_trait::async_trait;

use super::entity::CrudEntity;
use super::error::StoreError;
use crate::pagination::{Page, PageRequest};
use crate::parameters::Parameters;

/// Persistence contract used by [`CrudService`](crate::CrudService).
///
/// Every method receives the request [`Parameters`] untouched, so an
/// implementation can scope its queries by tenant, parent path variable and
/// so on. Soft-deleted entities must be invisible to every method.
#[async_trait]
pub trait CrudRepository: Send + Sync {
    type Entity: CrudEntity;

    /// One 0-indexed page of live entities in a stable order, plus
    /// `ceil(live_count / per_page)` as the total page count.
    async fn find_page(
        &self,
        request: PageRequest,
        parameters: &Parameters,
    ) -> Result<Page<Self::Entity>, StoreError>;

    /// The live entity with `id`, or `None` when it is missing or soft-deleted.
    async fn find_by_id(
        &self,
        id: &<Self::Entity as CrudEntity>::Id,
        parameters: &Parameters,
    ) -> Result<Option<Self::Entity>, StoreError>;

    /// Persists a new entity and returns it as stored, with its id assigned.
    ///
    /// Fails with [`StoreError::Duplicate`] on a uniqueness violation.
    async fn insert(
        &self,
        entity: Self::Entity,
        parameters: &Parameters,
    ) -> Result<Self::Entity, StoreError>;

    /// Writes `entity` only if the stored row is live and still carries
    /// `entity.version()`. On success the stored version becomes
    /// `entity.version() + 1`.
    ///
    /// Returns the number of affected rows, which is 0 or 1.
    async fn conditional_update(
        &self,
        entity: &Self::Entity,
        parameters: &Parameters,
    ) -> Result<u64, StoreError>;
}
