use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt::Debug;

use super::entity::CrudEntity;
use super::error::CrudError;
use crate::parameters::Parameters;
use crate::validation::Validatable;

/// Conversions between entities and the business-layer models.
///
/// When the model is the entity itself, use the same type for both and
/// return a clone from [`CrudMapper::entity_to_model`].
pub trait CrudMapper: Send + Sync {
    type Entity: CrudEntity;
    type Model: Clone + Debug + Send + Sync;
    type CreateModel: Debug + Send + Sync;
    type UpdateModel: Debug + Send + Sync;

    /// Builds a brand-new entity. Implementations must set
    /// `created_at = updated_at = now`, `version = 0` and `deleted_at = None`.
    fn entity_to_be_created_from(
        &self,
        create_model: &Self::CreateModel,
        now: DateTime<Utc>,
    ) -> Self::Entity;

    fn entity_to_model(&self, entity: &Self::Entity) -> Self::Model;

    /// Applies the user-changeable fields. Bookkeeping fields are handled by
    /// the service and must be left alone.
    fn update_entity_with(&self, entity: &mut Self::Entity, update_model: &Self::UpdateModel);
}

/// Conversions between models and the wire DTOs of a controller.
///
/// Incoming DTOs are validated before they reach the mapper.
pub trait CrudDtoMapper<M: CrudMapper>: Send + Sync {
    type Dto: Serialize + Send;
    type CreateDto: DeserializeOwned + Validatable + Debug + Send;
    type UpdateDto: DeserializeOwned + Validatable + Debug + Send;

    fn model_to_dto(&self, model: M::Model, parameters: &Parameters) -> Self::Dto;

    /// # Errors
    ///
    /// Returns [`CrudError::InvalidInput`] when the DTO cannot be mapped.
    fn create_dto_to_create_model(
        &self,
        dto: Self::CreateDto,
        parameters: &Parameters,
    ) -> Result<M::CreateModel, CrudError>;

    /// # Errors
    ///
    /// Returns [`CrudError::InvalidInput`] when the DTO cannot be mapped.
    fn update_dto_to_update_model(
        &self,
        dto: Self::UpdateDto,
        parameters: &Parameters,
    ) -> Result<M::UpdateModel, CrudError>;
}
