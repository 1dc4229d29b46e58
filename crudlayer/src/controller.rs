use tracing::{debug, trace};

use crate::config::PaginationConfig;
use crate::core::{CrudDtoMapper, CrudEntity, CrudError, CrudMapper, CrudRepository, CrudService};
use crate::pagination::{PageRequest, Paged};
use crate::parameters::Parameters;
use crate::validation::Validatable;

type IdOf<R> = <<R as CrudRepository>::Entity as CrudEntity>::Id;

/// CRUD operations in terms of DTOs.
///
/// Validates and maps incoming DTOs, delegates to the [`CrudService`] and
/// maps the results back. Mount it with [`crud_router`](crate::crud_router).
pub struct CrudController<R, M, D> {
    service: CrudService<R, M>,
    dto_mapper: D,
    pagination: PaginationConfig,
}

impl<R, M, D> CrudController<R, M, D>
where
    R: CrudRepository,
    M: CrudMapper<Entity = R::Entity>,
    D: CrudDtoMapper<M>,
{
    pub fn new(service: CrudService<R, M>, dto_mapper: D) -> Self {
        Self {
            service,
            dto_mapper,
            pagination: PaginationConfig::default(),
        }
    }

    #[must_use]
    pub fn with_pagination(mut self, pagination: PaginationConfig) -> Self {
        self.pagination = pagination;
        self
    }

    pub fn service(&self) -> &CrudService<R, M> {
        &self.service
    }

    pub fn dto_mapper(&self) -> &D {
        &self.dto_mapper
    }

    pub fn pagination(&self) -> PaginationConfig {
        self.pagination
    }

    fn type_name(&self) -> &str {
        self.service.type_name()
    }

    /// # Errors
    ///
    /// [`CrudError::Validation`] for invalid DTOs, otherwise see [`CrudService::create`].
    pub async fn create(&self, dto: D::CreateDto, parameters: &Parameters) -> Result<D::Dto, CrudError> {
        debug!(type_name = self.type_name(), ?parameters, ?dto, "Got request to create entity");
        dto.validate().map_err(CrudError::Validation)?;

        let create_model = self.dto_mapper.create_dto_to_create_model(dto, parameters)?;
        trace!(?create_model, "Built create model");

        let model = self.service.create(create_model, parameters).await?;
        Ok(self.dto_mapper.model_to_dto(model, parameters))
    }

    /// Lists one page, using the configured defaults for missing values.
    ///
    /// # Errors
    ///
    /// [`CrudError::InvalidInput`] for a zero page size, otherwise store failures.
    pub async fn list(
        &self,
        page: Option<u64>,
        per_page: Option<u64>,
        parameters: &Parameters,
    ) -> Result<Paged<D::Dto>, CrudError> {
        let request = PageRequest::new(
            page.unwrap_or(self.pagination.default_page),
            per_page.unwrap_or(self.pagination.default_per_page),
        )?;
        debug!(type_name = self.type_name(), ?parameters, ?request, "Got request to list entities");

        let paged = self.service.list(request, parameters).await?;
        trace!(models = ?paged.data, "Got page");

        Ok(paged.map(|model| self.dto_mapper.model_to_dto(model, parameters)))
    }

    /// # Errors
    ///
    /// [`CrudError::NotFound`] when the entity is missing or deleted.
    pub async fn get(&self, id: &IdOf<R>, parameters: &Parameters) -> Result<D::Dto, CrudError> {
        debug!(type_name = self.type_name(), ?parameters, %id, "Got request to get entity");

        let model = self
            .service
            .get(id, parameters)
            .await?
            .ok_or_else(|| CrudError::not_found(self.type_name(), id))?;
        trace!(?model, "Got model");

        Ok(self.dto_mapper.model_to_dto(model, parameters))
    }

    /// # Errors
    ///
    /// [`CrudError::Validation`] for invalid DTOs, otherwise see [`CrudService::update`].
    pub async fn update(
        &self,
        id: &IdOf<R>,
        dto: D::UpdateDto,
        parameters: &Parameters,
    ) -> Result<D::Dto, CrudError> {
        debug!(type_name = self.type_name(), ?parameters, %id, ?dto, "Got request to update entity");
        dto.validate().map_err(CrudError::Validation)?;

        let update_model = self.dto_mapper.update_dto_to_update_model(dto, parameters)?;
        trace!(?update_model, "Built update model");

        let model = self.service.update(id, update_model, parameters).await?;
        Ok(self.dto_mapper.model_to_dto(model, parameters))
    }

    /// # Errors
    ///
    /// See [`CrudService::delete`].
    pub async fn delete(&self, id: &IdOf<R>, parameters: &Parameters) -> Result<(), CrudError> {
        debug!(type_name = self.type_name(), ?parameters, %id, "Got request to delete entity");
        self.service.delete(id, parameters).await
    }
}
