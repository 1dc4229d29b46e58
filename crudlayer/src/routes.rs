use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    routing::{get, post},
};
use std::str::FromStr;
use std::sync::Arc;

use crate::controller::CrudController;
use crate::core::{CrudDtoMapper, CrudEntity, CrudError, CrudMapper, CrudRepository};
use crate::errors::ApiError;
use crate::pagination::Paged;
use crate::parameters::Parameters;

type IdOf<R> = <<R as CrudRepository>::Entity as CrudEntity>::Id;
type Shared<R, M, D> = State<Arc<CrudController<R, M, D>>>;

/// Builds the five CRUD routes for a controller.
///
/// | method   | path    | success |
/// |----------|---------|---------|
/// | `POST`   | `/`     | `201` + DTO |
/// | `GET`    | `/`     | `200` + paged DTOs (`?page=&perPage=`) |
/// | `GET`    | `/{id}` | `200` + DTO |
/// | `PUT`    | `/{id}` | `200` + DTO |
/// | `DELETE` | `/{id}` | `204` |
///
/// The router can be nested under a parent path. Its captures, like
/// `/users/{userId}/foos`, reach the repository through [`Parameters`].
pub fn crud_router<R, M, D>(controller: CrudController<R, M, D>) -> Router
where
    R: CrudRepository + 'static,
    M: CrudMapper<Entity = R::Entity> + 'static,
    D: CrudDtoMapper<M> + 'static,
    IdOf<R>: FromStr,
{
    Router::new()
        .route("/", post(create_one::<R, M, D>).get(get_all::<R, M, D>))
        .route(
            "/{id}",
            get(get_one::<R, M, D>)
                .put(update_one::<R, M, D>)
                .delete(delete_one::<R, M, D>),
        )
        .with_state(Arc::new(controller))
}

fn parse_id<I: FromStr>(parameters: &Parameters) -> Result<I, CrudError> {
    parameters
        .path_variable_as("id")?
        .ok_or_else(|| CrudError::invalid_input("Cannot get 'id' path variable, it is missing"))
}

async fn create_one<R, M, D>(
    State(controller): Shared<R, M, D>,
    parameters: Parameters,
    body: Result<Json<D::CreateDto>, JsonRejection>,
) -> Result<(StatusCode, Json<D::Dto>), ApiError>
where
    R: CrudRepository,
    M: CrudMapper<Entity = R::Entity>,
    D: CrudDtoMapper<M>,
{
    let Json(dto) = body?;
    let created = controller.create(dto, &parameters).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn get_all<R, M, D>(
    State(controller): Shared<R, M, D>,
    parameters: Parameters,
) -> Result<Json<Paged<D::Dto>>, ApiError>
where
    R: CrudRepository,
    M: CrudMapper<Entity = R::Entity>,
    D: CrudDtoMapper<M>,
{
    let page = parameters.query_parameter_as("page")?;
    let per_page = parameters.query_parameter_as("perPage")?;
    let paged = controller.list(page, per_page, &parameters).await?;
    Ok(Json(paged))
}

async fn get_one<R, M, D>(
    State(controller): Shared<R, M, D>,
    parameters: Parameters,
) -> Result<Json<D::Dto>, ApiError>
where
    R: CrudRepository,
    M: CrudMapper<Entity = R::Entity>,
    D: CrudDtoMapper<M>,
    IdOf<R>: FromStr,
{
    let id = parse_id(&parameters)?;
    let dto = controller.get(&id, &parameters).await?;
    Ok(Json(dto))
}

async fn update_one<R, M, D>(
    State(controller): Shared<R, M, D>,
    parameters: Parameters,
    body: Result<Json<D::UpdateDto>, JsonRejection>,
) -> Result<Json<D::Dto>, ApiError>
where
    R: CrudRepository,
    M: CrudMapper<Entity = R::Entity>,
    D: CrudDtoMapper<M>,
    IdOf<R>: FromStr,
{
    let id = parse_id(&parameters)?;
    let Json(dto) = body?;
    let updated = controller.update(&id, dto, &parameters).await?;
    Ok(Json(updated))
}

async fn delete_one<R, M, D>(
    State(controller): Shared<R, M, D>,
    parameters: Parameters,
) -> Result<StatusCode, ApiError>
where
    R: CrudRepository,
    M: CrudMapper<Entity = R::Entity>,
    D: CrudDtoMapper<M>,
    IdOf<R>: FromStr,
{
    let id = parse_id(&parameters)?;
    controller.delete(&id, &parameters).await?;
    Ok(StatusCode::NO_CONTENT)
}
