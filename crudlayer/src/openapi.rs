//! OpenAPI description of the routes built by [`crud_router`](crate::crud_router).
//!
//! ```rust,ignore
//! let doc = crudlayer::openapi::crud_openapi::<FooDto, CreateFooDto, UpdateFooDto>("/foos", "Foo");
//! println!("{}", doc.to_pretty_json()?);
//! ```

use utoipa::openapi::path::{HttpMethod, OperationBuilder, ParameterBuilder, ParameterIn, PathItemBuilder};
use utoipa::openapi::request_body::RequestBodyBuilder;
use utoipa::openapi::schema::{ObjectBuilder, Schema, Type};
use utoipa::openapi::{
    ComponentsBuilder, ContentBuilder, InfoBuilder, OpenApi, OpenApiBuilder, PathsBuilder, Ref,
    RefOr, Required, Response, ResponseBuilder,
};
use utoipa::{PartialSchema, ToSchema};

use crate::errors::CrudErrorBody;
use crate::pagination::Paged;
use crate::validation::ValidationError;

const JSON: &str = "application/json";

const NOT_FOUND_RESPONSE: &str = "Entity is not found.";
const CONFLICT_RESPONSE: &str = "Entity with given data already exists.";
const VALIDATION_RESPONSE: &str = "Given data is not valid.";
const PAGE_DESCRIPTION: &str = "Number of the 0-based page of entities to request";
const PER_PAGE_DESCRIPTION: &str = "Number of entities to request per page";

/// Builds the document for one resource mounted at `path`.
///
/// The DTO schemas and the error body schema are registered as components.
#[must_use]
pub fn crud_openapi<Dto, CreateDto, UpdateDto>(path: &str, type_name: &str) -> OpenApi
where
    Dto: ToSchema,
    CreateDto: ToSchema,
    UpdateDto: ToSchema,
{
    let path = path.trim_end_matches('/');
    let dto = Ref::from_schema_name(Dto::name());

    let create = operation(type_name, "create", "Create a new entity")
        .description(Some("Creates a new entity with given data and returns created entity."))
        .request_body(Some(
            RequestBodyBuilder::new()
                .description(Some("Create DTO containing data of the entity to create"))
                .content(JSON, ContentBuilder::new().schema(Some(Ref::from_schema_name(CreateDto::name()))).build())
                .required(Some(Required::True))
                .build(),
        ))
        .response("201", json_response("Entity is created successfully.", dto.clone()))
        .response("409", error_response(CONFLICT_RESPONSE))
        .response("422", error_response(VALIDATION_RESPONSE));

    let list = operation(type_name, "list", "List entities")
        .description(Some("List entities with given pagination."))
        .parameter(query_parameter("page", PAGE_DESCRIPTION))
        .parameter(query_parameter("perPage", PER_PAGE_DESCRIPTION))
        .response(
            "200",
            json_response("Entities are returned successfully.", <Paged<Dto> as PartialSchema>::schema()),
        )
        .response("400", error_response("Given pagination is not valid."));

    let get = operation(type_name, "get", "Get entity with given id")
        .description(Some("Gets entity with given id."))
        .parameter(id_parameter("Id of the entity to request"))
        .response("200", json_response("Entity is returned successfully.", dto.clone()))
        .response("404", error_response(NOT_FOUND_RESPONSE));

    let update = operation(type_name, "update", "Update entity with given id")
        .description(Some("Updates entity with given id with given data and returns updated entity."))
        .parameter(id_parameter("Id of the entity to update"))
        .request_body(Some(
            RequestBodyBuilder::new()
                .description(Some("Update DTO containing data of the entity to update"))
                .content(JSON, ContentBuilder::new().schema(Some(Ref::from_schema_name(UpdateDto::name()))).build())
                .required(Some(Required::True))
                .build(),
        ))
        .response("200", json_response("Entity is updated successfully.", dto))
        .response("404", error_response(NOT_FOUND_RESPONSE))
        .response("409", error_response(CONFLICT_RESPONSE))
        .response("422", error_response(VALIDATION_RESPONSE));

    let delete = operation(type_name, "delete", "Delete entity with given id")
        .description(Some("Deletes entity with given id."))
        .parameter(id_parameter("Id of the entity to delete"))
        .response("204", ResponseBuilder::new().description("Entity is deleted successfully.").build())
        .response("404", error_response(NOT_FOUND_RESPONSE));

    let collection = PathItemBuilder::new()
        .operation(HttpMethod::Post, create.build())
        .operation(HttpMethod::Get, list.build())
        .build();
    let item = PathItemBuilder::new()
        .operation(HttpMethod::Get, get.build())
        .operation(HttpMethod::Put, update.build())
        .operation(HttpMethod::Delete, delete.build())
        .build();

    let collection_path = if path.is_empty() { "/".to_string() } else { path.to_string() };

    OpenApiBuilder::new()
        .info(InfoBuilder::new().title(format!("{type_name} API")).version(env!("CARGO_PKG_VERSION")))
        .paths(
            PathsBuilder::new()
                .path(collection_path, collection)
                .path(format!("{path}/{{id}}"), item),
        )
        .components(Some(
            ComponentsBuilder::new()
                .schema_from::<Dto>()
                .schema_from::<CreateDto>()
                .schema_from::<UpdateDto>()
                .schema_from::<CrudErrorBody>()
                .schema_from::<ValidationError>()
                .build(),
        ))
        .build()
}

fn operation(type_name: &str, action: &str, summary: &str) -> OperationBuilder {
    OperationBuilder::new()
        .tag(type_name)
        .operation_id(Some(format!("{action}{type_name}")))
        .summary(Some(summary))
}

fn query_parameter(name: &str, description: &str) -> ParameterBuilder {
    ParameterBuilder::new()
        .name(name)
        .parameter_in(ParameterIn::Query)
        .required(Required::False)
        .description(Some(description))
        .schema(Some(typed_schema(Type::Integer)))
}

fn id_parameter(description: &str) -> ParameterBuilder {
    ParameterBuilder::new()
        .name("id")
        .parameter_in(ParameterIn::Path)
        .required(Required::True)
        .description(Some(description))
        .schema(Some(typed_schema(Type::String)))
}

fn typed_schema(schema_type: Type) -> RefOr<Schema> {
    RefOr::T(Schema::Object(ObjectBuilder::new().schema_type(schema_type).build()))
}

fn json_response(description: &str, schema: impl Into<RefOr<Schema>>) -> Response {
    ResponseBuilder::new()
        .description(description)
        .content(JSON, ContentBuilder::new().schema(Some(schema)).build())
        .build()
}

fn error_response(description: &str) -> Response {
    json_response(description, Ref::from_schema_name(CrudErrorBody::name()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, ToSchema)]
    struct FooDto {
        foo: String,
    }

    #[derive(Deserialize, ToSchema)]
    struct CreateFooDto {
        foo: String,
    }

    #[derive(Deserialize, ToSchema)]
    struct UpdateFooDto {
        foo: String,
    }

    fn document() -> OpenApi {
        crud_openapi::<FooDto, CreateFooDto, UpdateFooDto>("/foos/", "Foo")
    }

    #[test]
    fn test_paths_and_operations() {
        let doc = document();

        let collection = doc.paths.paths.get("/foos").expect("collection path");
        let create = collection.post.as_ref().expect("create operation");
        assert_eq!(create.operation_id.as_deref(), Some("createFoo"));
        assert!(create.responses.responses.contains_key("201"));
        assert!(create.responses.responses.contains_key("409"));
        assert!(collection.get.is_some());

        let item = doc.paths.paths.get("/foos/{id}").expect("item path");
        assert!(item.get.is_some());
        assert!(item.put.is_some());
        let delete = item.delete.as_ref().expect("delete operation");
        assert!(delete.responses.responses.contains_key("204"));
        assert!(delete.responses.responses.contains_key("404"));
    }

    #[test]
    fn test_schemas_are_registered() {
        let doc = document();
        let schemas = &doc.components.expect("components").schemas;
        for name in ["FooDto", "CreateFooDto", "UpdateFooDto", "CrudErrorBody", "ValidationError"] {
            assert!(schemas.contains_key(name), "missing schema {name}");
        }
    }
}
