use async_trait::async_trait;
use crudlayer::{CrudEntity, CrudRepository, Page, PageRequest, Parameters, StoreError};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::debug;

use crate::data::CrudTestData;

type IdOf<D> = <<D as CrudTestData>::Entity as CrudEntity>::Id;

/// [`CrudRepository`] keeping entities in insertion order in memory.
///
/// Duplicates are detected with [`CrudTestData::are_duplicates`] among live
/// entities other than the one being written. Conditional updates compare
/// versions under the write lock.
pub struct InMemoryRepository<D: CrudTestData> {
    test_data: Arc<D>,
    entities: RwLock<Vec<D::Entity>>,
}

impl<D: CrudTestData> InMemoryRepository<D> {
    /// Starts with the test entities of `test_data`.
    #[must_use]
    pub fn new(test_data: Arc<D>) -> Self {
        let repository = Self {
            test_data,
            entities: RwLock::new(Vec::new()),
        };
        repository.reset();
        repository
    }

    /// Every stored entity, deleted ones included.
    pub fn entities(&self) -> Vec<D::Entity> {
        self.entities.read().clone()
    }

    /// The stored entity with `id`, even if it is deleted.
    pub fn get(&self, id: &IdOf<D>) -> Option<D::Entity> {
        self.entities
            .read()
            .iter()
            .find(|entity| entity.id() == Some(id))
            .cloned()
    }

    /// Stores `entity` as is, replacing any entity with the same id.
    /// No duplicate or version checks are made.
    pub fn put(&self, mut entity: D::Entity) {
        if entity.id().is_none() {
            entity.set_id(self.test_data.id_generator().next());
        }
        let mut entities = self.entities.write();
        match entities.iter().position(|stored| stored.id() == entity.id()) {
            Some(index) => entities[index] = entity,
            None => entities.push(entity),
        }
    }

    /// Removes everything.
    pub fn clear(&self) {
        self.entities.write().clear();
    }

    /// Goes back to exactly the test entities.
    pub fn reset(&self) {
        let mut entities = self.entities.write();
        *entities = self.test_data.test_entities();
        debug!(type_name = self.test_data.type_name(), count = entities.len(), "Reset repository");
    }

    fn find_duplicate(&self, entities: &[D::Entity], entity: &D::Entity) -> Result<(), StoreError> {
        if entity.is_deleted() {
            return Ok(());
        }
        let duplicate = entities.iter().find(|stored| {
            !stored.is_deleted()
                && stored.id() != entity.id()
                && self.test_data.are_duplicates(stored, entity)
        });
        match duplicate {
            Some(stored) => Err(StoreError::Duplicate(format!("{entity:?} duplicates {stored:?}"))),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl<D: CrudTestData> CrudRepository for InMemoryRepository<D> {
    type Entity = D::Entity;

    async fn find_page(
        &self,
        request: PageRequest,
        _parameters: &Parameters,
    ) -> Result<Page<D::Entity>, StoreError> {
        let entities = self.entities.read();
        let live = entities.iter().filter(|entity| !entity.is_deleted());

        let total_pages = request.total_pages_for(live.clone().count() as u64);
        let items = live
            .skip(usize::try_from(request.offset()).unwrap_or(usize::MAX))
            .take(usize::try_from(request.per_page()).unwrap_or(usize::MAX))
            .cloned()
            .collect();

        Ok(Page { items, total_pages })
    }

    async fn find_by_id(
        &self,
        id: &IdOf<D>,
        _parameters: &Parameters,
    ) -> Result<Option<D::Entity>, StoreError> {
        Ok(self
            .entities
            .read()
            .iter()
            .find(|entity| entity.id() == Some(id) && !entity.is_deleted())
            .cloned())
    }

    async fn insert(
        &self,
        mut entity: D::Entity,
        _parameters: &Parameters,
    ) -> Result<D::Entity, StoreError> {
        let mut entities = self.entities.write();
        self.find_duplicate(&entities, &entity)?;

        if entity.id().is_none() {
            entity.set_id(self.test_data.id_generator().next());
        }
        entities.push(entity.clone());
        Ok(entity)
    }

    async fn conditional_update(
        &self,
        entity: &D::Entity,
        _parameters: &Parameters,
    ) -> Result<u64, StoreError> {
        let mut entities = self.entities.write();
        let Some(index) = entities.iter().position(|stored| {
            stored.id().is_some()
                && stored.id() == entity.id()
                && stored.version() == entity.version()
                && !stored.is_deleted()
        }) else {
            return Ok(0);
        };
        self.find_duplicate(&entities, entity)?;

        let mut updated = entity.clone();
        updated.set_version(entity.version() + 1);
        entities[index] = updated;
        Ok(1)
    }
}
