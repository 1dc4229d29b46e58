use chrono::{DateTime, Utc};
use crudlayer::validation::{Validatable, ValidationError, validators};
use crudlayer::{CrudDtoMapper, CrudError, CrudMapper, Parameters, SeaOrmEntity};
use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Stored row, also used as the entity.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "foos")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub foo: String,
    pub bar: i32,
    pub version: i32,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub deleted_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

crudlayer::crud_entity!(Model, id: Uuid);

impl SeaOrmEntity for Model {
    type Table = Entity;
    type ActiveModel = ActiveModel;

    const ID_COLUMN: Column = Column::Id;
    const VERSION_COLUMN: Column = Column::Version;
    const CREATED_AT_COLUMN: Column = Column::CreatedAt;
    const DELETED_AT_COLUMN: Column = Column::DeletedAt;

    fn from_model(model: Model) -> Self {
        model
    }

    fn to_active_model(&self) -> ActiveModel {
        ActiveModel {
            id: Set(self.id),
            foo: Set(self.foo.clone()),
            bar: Set(self.bar),
            version: Set(self.version),
            created_at: Set(self.created_at),
            updated_at: Set(self.updated_at),
            deleted_at: Set(self.deleted_at),
        }
    }
}

/// Business model, without the bookkeeping the API does not expose.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Foo {
    pub id: Uuid,
    pub foo: String,
    pub bar: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateFoo {
    pub foo: String,
    pub bar: i32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpdateFoo {
    pub foo: String,
    pub bar: i32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FooDto {
    pub id: Uuid,
    pub foo: String,
    pub bar: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateFooDto {
    pub foo: String,
    pub bar: i32,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateFooDto {
    pub foo: String,
    pub bar: i32,
}

fn validate_foo_and_bar(foo: &str, bar: i32) -> Result<(), Vec<ValidationError>> {
    validators::collect([
        validators::validate_required("foo", foo),
        validators::validate_length("foo", foo, None, Some(100)),
        validators::validate_range("bar", bar, Some(0), None),
    ])
}

impl Validatable for CreateFooDto {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        validate_foo_and_bar(&self.foo, self.bar)
    }
}

impl Validatable for UpdateFooDto {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        validate_foo_and_bar(&self.foo, self.bar)
    }
}

/// Ids are assigned here, not by the database.
#[derive(Debug, Clone, Copy, Default)]
pub struct FooMapper;

impl CrudMapper for FooMapper {
    type Entity = Model;
    type Model = Foo;
    type CreateModel = CreateFoo;
    type UpdateModel = UpdateFoo;

    fn entity_to_be_created_from(&self, create_model: &CreateFoo, now: DateTime<Utc>) -> Model {
        Model {
            id: Uuid::new_v4(),
            foo: create_model.foo.clone(),
            bar: create_model.bar,
            version: 0,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    fn entity_to_model(&self, entity: &Model) -> Foo {
        Foo {
            id: entity.id,
            foo: entity.foo.clone(),
            bar: entity.bar,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }

    fn update_entity_with(&self, entity: &mut Model, update_model: &UpdateFoo) {
        entity.foo.clone_from(&update_model.foo);
        entity.bar = update_model.bar;
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FooDtoMapper;

impl CrudDtoMapper<FooMapper> for FooDtoMapper {
    type Dto = FooDto;
    type CreateDto = CreateFooDto;
    type UpdateDto = UpdateFooDto;

    fn model_to_dto(&self, model: Foo, _parameters: &Parameters) -> FooDto {
        FooDto {
            id: model.id,
            foo: model.foo,
            bar: model.bar,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }

    fn create_dto_to_create_model(
        &self,
        dto: CreateFooDto,
        _parameters: &Parameters,
    ) -> Result<CreateFoo, CrudError> {
        Ok(CreateFoo {
            foo: dto.foo.trim().to_string(),
            bar: dto.bar,
        })
    }

    fn update_dto_to_update_model(
        &self,
        dto: UpdateFooDto,
        _parameters: &Parameters,
    ) -> Result<UpdateFoo, CrudError> {
        Ok(UpdateFoo {
            foo: dto.foo.trim().to_string(),
            bar: dto.bar,
        })
    }
}
