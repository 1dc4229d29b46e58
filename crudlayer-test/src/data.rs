use chrono::{DateTime, Utc};
use crudlayer::{CrudEntity, InstantProvider, PageRequest, Paged, Parameters};
use std::fmt::Debug;
use std::sync::Arc;

use crate::id::IdGenerator;
use crate::instant::AdjustableInstantProvider;

type IdOf<D> = <<D as CrudTestData>::Entity as CrudEntity>::Id;

/// Test entities and conversions for one entity type.
///
/// The three test entities are what [`InMemoryRepository::reset`](crate::InMemoryRepository::reset)
/// stores, in that order, so the listing expectations must follow it.
/// Entities should be built from [`CrudTestData::now`] with
/// `version = 0` and no `deleted_at`.
pub trait CrudTestData: Send + Sync + 'static {
    type Entity: CrudEntity;
    type CreateModel: Debug + Send + Sync;
    type UpdateModel: Debug + Send + Sync;

    fn type_name(&self) -> &str;

    fn id_generator(&self) -> &dyn IdGenerator<IdOf<Self>>;

    fn instant_provider(&self) -> &Arc<AdjustableInstantProvider>;

    fn test_entity_1(&self) -> Self::Entity;
    fn test_entity_2(&self) -> Self::Entity;
    fn test_entity_3(&self) -> Self::Entity;

    fn more_test_entities(&self) -> Vec<Self::Entity> {
        Vec::new()
    }

    /// Entities on page 0 when listing 20 per page.
    fn default_first_page_entities(&self) -> Vec<Self::Entity>;

    /// Page requests with the page of entities each one should return.
    fn pagination_test_cases(&self) -> Vec<(PageRequest, Paged<Self::Entity>)>;

    fn test_parameters(&self) -> Parameters {
        Parameters::default()
    }

    /// Must mirror the unique constraint of the real store.
    fn are_duplicates(&self, e1: &Self::Entity, e2: &Self::Entity) -> bool;

    fn entity_to_create_model(&self, entity: &Self::Entity) -> Self::CreateModel;

    fn entity_to_update_model_with_no_modifications(&self, entity: &Self::Entity) -> Self::UpdateModel;

    /// An update that changes every user-editable field.
    fn entity_to_update_model_with_modifications(&self, entity: &Self::Entity) -> Self::UpdateModel;

    fn now(&self) -> DateTime<Utc> {
        self.instant_provider().now()
    }

    fn random_id(&self) -> IdOf<Self> {
        self.id_generator().random()
    }

    fn test_entities(&self) -> Vec<Self::Entity> {
        let mut entities = vec![self.test_entity_1(), self.test_entity_2(), self.test_entity_3()];
        entities.extend(self.more_test_entities());
        entities
    }
}
