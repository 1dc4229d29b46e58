use crudlayer::{CrudMapper, CrudService, InstantProvider};
use std::sync::Arc;

use crate::data::CrudTestData;
use crate::repository::InMemoryRepository;

/// A [`CrudService`] over an [`InMemoryRepository`] seeded with test data.
///
/// The service shares the clock of the test data, so adjusting
/// [`CrudTestData::instant_provider`] moves the service's `now` too.
pub struct ServiceFixture<D, M>
where
    D: CrudTestData,
{
    test_data: Arc<D>,
    service: CrudService<InMemoryRepository<D>, M>,
}

impl<D, M> ServiceFixture<D, M>
where
    D: CrudTestData,
    M: CrudMapper<Entity = D::Entity, CreateModel = D::CreateModel, UpdateModel = D::UpdateModel>,
{
    /// Resets the clock and seeds a fresh repository.
    pub fn new(test_data: D, mapper: M) -> Self {
        let test_data = Arc::new(test_data);
        test_data.instant_provider().reset();

        let instant_provider: Arc<dyn InstantProvider> = test_data.instant_provider().clone();
        let repository = InMemoryRepository::new(Arc::clone(&test_data));
        let service = CrudService::new(test_data.type_name(), instant_provider, repository, mapper);

        Self { test_data, service }
    }

    pub fn test_data(&self) -> &D {
        &self.test_data
    }

    pub fn service(&self) -> &CrudService<InMemoryRepository<D>, M> {
        &self.service
    }

    pub fn repository(&self) -> &InMemoryRepository<D> {
        self.service.repository()
    }

    pub fn mapper(&self) -> &M {
        self.service.mapper()
    }
}
