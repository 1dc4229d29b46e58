//! Reusable service test cases.
//!
//! Every case takes a fresh [`ServiceFixture`] and panics on failure. Use
//! [`crud_service_tests!`](crate::crud_service_tests) to run all of them as
//! `#[tokio::test]`s, or call single cases from your own tests.

use chrono::{DateTime, TimeDelta, Utc};
use crudlayer::{CrudEntity, CrudError, CrudMapper, CrudRepository, PageRequest, Paged};
use std::fmt::Debug;

use crate::data::CrudTestData;
use crate::fixture::ServiceFixture;

fn id_of<E: CrudEntity>(entity: &E) -> E::Id {
    entity.id().cloned().expect("test entities must have ids")
}

fn one_second_later<D, M>(fixture: &ServiceFixture<D, M>) -> DateTime<Utc>
where
    D: CrudTestData,
    M: CrudMapper<Entity = D::Entity, CreateModel = D::CreateModel, UpdateModel = D::UpdateModel>,
{
    let data = fixture.test_data();
    data.instant_provider().adjust(|now| now + TimeDelta::seconds(1));
    data.now()
}

/// Soft-deletes `entity` directly through the repository.
async fn mark_deleted<D, M>(fixture: &ServiceFixture<D, M>, entity: &D::Entity)
where
    D: CrudTestData,
    M: CrudMapper<Entity = D::Entity, CreateModel = D::CreateModel, UpdateModel = D::UpdateModel>,
{
    let now = fixture.test_data().now();
    let mut deleted = entity.clone();
    deleted.set_updated_at(now);
    deleted.set_deleted_at(Some(now));

    let affected = fixture
        .repository()
        .conditional_update(&deleted, &fixture.test_data().test_parameters())
        .await
        .expect("marking test entity as deleted");
    assert_eq!(affected, 1, "test entity should have been deleted");
}

fn assert_not_found<I: std::fmt::Display>(type_name: &str, id: &I, err: &CrudError) {
    assert!(matches!(err, CrudError::NotFound { .. }), "expected not found, got {err:?}");
    assert_eq!(err.to_string(), format!("{type_name} with id {id} is not found."));
}

fn assert_already_exists(type_name: &str, data: &impl Debug, err: &CrudError) {
    assert!(matches!(err, CrudError::AlreadyExists { .. }), "expected already exists, got {err:?}");
    assert_eq!(err.to_string(), format!("{type_name} with {data:?} already exists."));
}

pub async fn create_already_exists<D, M>(fixture: &ServiceFixture<D, M>)
where
    D: CrudTestData,
    M: CrudMapper<Entity = D::Entity, CreateModel = D::CreateModel, UpdateModel = D::UpdateModel>,
    M::Model: PartialEq,
{
    let data = fixture.test_data();
    let create_model = data.entity_to_create_model(&data.test_entity_1());

    let err = fixture
        .service()
        .create(create_model, &data.test_parameters())
        .await
        .expect_err("creating a duplicate should fail");

    assert_already_exists(data.type_name(), &data.entity_to_create_model(&data.test_entity_1()), &err);
    assert_eq!(fixture.repository().entities().len(), data.test_entities().len());
}

pub async fn create<D, M>(fixture: &ServiceFixture<D, M>)
where
    D: CrudTestData,
    M: CrudMapper<Entity = D::Entity, CreateModel = D::CreateModel, UpdateModel = D::UpdateModel>,
    M::Model: PartialEq,
{
    let data = fixture.test_data();
    let parameters = data.test_parameters();
    fixture.repository().clear();

    let actual = fixture
        .service()
        .create(data.entity_to_create_model(&data.test_entity_1()), &parameters)
        .await
        .expect("creating entity");

    let stored = fixture.repository().entities();
    assert_eq!(stored.len(), 1);
    let mut expected_entity = data.test_entity_1();
    expected_entity.set_id(id_of(&stored[0]));
    let expected = fixture.mapper().entity_to_model(&expected_entity);
    assert_eq!(actual, expected);

    let found = fixture
        .service()
        .get(&id_of(&stored[0]), &parameters)
        .await
        .expect("getting created entity");
    assert_eq!(found, Some(expected));
}

pub async fn create_again_after_delete<D, M>(fixture: &ServiceFixture<D, M>)
where
    D: CrudTestData,
    M: CrudMapper<Entity = D::Entity, CreateModel = D::CreateModel, UpdateModel = D::UpdateModel>,
    M::Model: PartialEq,
{
    let data = fixture.test_data();
    let parameters = data.test_parameters();
    mark_deleted(fixture, &data.test_entity_1()).await;

    let actual = fixture
        .service()
        .create(data.entity_to_create_model(&data.test_entity_1()), &parameters)
        .await
        .expect("creating entity with the data of a deleted one");

    let created = fixture
        .repository()
        .entities()
        .pop()
        .expect("created entity is stored last");
    assert_ne!(created.id(), data.test_entity_1().id());

    let mut expected_entity = data.test_entity_1();
    expected_entity.set_id(id_of(&created));
    let expected = fixture.mapper().entity_to_model(&expected_entity);
    assert_eq!(actual, expected);

    let found = fixture
        .service()
        .get(&id_of(&created), &parameters)
        .await
        .expect("getting created entity");
    assert_eq!(found, Some(expected));
}

pub async fn list_with_default_pagination<D, M>(fixture: &ServiceFixture<D, M>)
where
    D: CrudTestData,
    M: CrudMapper<Entity = D::Entity, CreateModel = D::CreateModel, UpdateModel = D::UpdateModel>,
    M::Model: PartialEq,
{
    let data = fixture.test_data();
    let request = PageRequest::new(0, 20).expect("valid page request");

    let actual = fixture
        .service()
        .list(request, &data.test_parameters())
        .await
        .expect("listing entities");

    let models = data
        .default_first_page_entities()
        .iter()
        .map(|entity| fixture.mapper().entity_to_model(entity))
        .collect();
    let total_pages = request.total_pages_for(data.test_entities().len() as u64);
    assert_eq!(actual, Paged::new(models, request, total_pages));
}

pub async fn list_with_pagination<D, M>(fixture: &ServiceFixture<D, M>)
where
    D: CrudTestData,
    M: CrudMapper<Entity = D::Entity, CreateModel = D::CreateModel, UpdateModel = D::UpdateModel>,
    M::Model: PartialEq,
{
    let data = fixture.test_data();

    for (request, expected_entities) in data.pagination_test_cases() {
        let expected = expected_entities.map(|entity| fixture.mapper().entity_to_model(&entity));

        let actual = fixture
            .service()
            .list(request, &data.test_parameters())
            .await
            .expect("listing entities");

        assert_eq!(actual, expected, "listing {request:?}");
    }
}

pub async fn list_with_no_entities<D, M>(fixture: &ServiceFixture<D, M>)
where
    D: CrudTestData,
    M: CrudMapper<Entity = D::Entity, CreateModel = D::CreateModel, UpdateModel = D::UpdateModel>,
    M::Model: PartialEq,
{
    fixture.repository().clear();

    let actual = fixture
        .service()
        .list(PageRequest::new(0, 20).expect("valid page request"), &fixture.test_data().test_parameters())
        .await
        .expect("listing entities");

    assert_eq!(actual, Paged::empty(0, 20, 0));
}

/// Expects the three test entities to be the only ones.
pub async fn list_with_no_deleted_entities<D, M>(fixture: &ServiceFixture<D, M>)
where
    D: CrudTestData,
    M: CrudMapper<Entity = D::Entity, CreateModel = D::CreateModel, UpdateModel = D::UpdateModel>,
    M::Model: PartialEq,
{
    let data = fixture.test_data();
    let mapper = fixture.mapper();
    mark_deleted(fixture, &data.test_entity_3()).await;

    for (page, entity) in [(0, data.test_entity_1()), (1, data.test_entity_2())] {
        let request = PageRequest::new(page, 1).expect("valid page request");

        let actual = fixture
            .service()
            .list(request, &data.test_parameters())
            .await
            .expect("listing entities");

        assert_eq!(actual, Paged::new(vec![mapper.entity_to_model(&entity)], request, 2));
    }
}

pub async fn get_not_found<D, M>(fixture: &ServiceFixture<D, M>)
where
    D: CrudTestData,
    M: CrudMapper<Entity = D::Entity, CreateModel = D::CreateModel, UpdateModel = D::UpdateModel>,
    M::Model: PartialEq,
{
    let data = fixture.test_data();

    let actual = fixture
        .service()
        .get(&data.random_id(), &data.test_parameters())
        .await
        .expect("getting entity");

    assert_eq!(actual, None);
}

pub async fn get<D, M>(fixture: &ServiceFixture<D, M>)
where
    D: CrudTestData,
    M: CrudMapper<Entity = D::Entity, CreateModel = D::CreateModel, UpdateModel = D::UpdateModel>,
    M::Model: PartialEq,
{
    let data = fixture.test_data();
    let entity = data.test_entity_1();

    let actual = fixture
        .service()
        .get(&id_of(&entity), &data.test_parameters())
        .await
        .expect("getting entity");

    assert_eq!(actual, Some(fixture.mapper().entity_to_model(&entity)));
}

pub async fn get_deleted_not_found<D, M>(fixture: &ServiceFixture<D, M>)
where
    D: CrudTestData,
    M: CrudMapper<Entity = D::Entity, CreateModel = D::CreateModel, UpdateModel = D::UpdateModel>,
    M::Model: PartialEq,
{
    let data = fixture.test_data();
    let entity = data.test_entity_1();
    mark_deleted(fixture, &entity).await;

    let actual = fixture
        .service()
        .get(&id_of(&entity), &data.test_parameters())
        .await
        .expect("getting entity");

    assert_eq!(actual, None);
}

pub async fn update_not_found<D, M>(fixture: &ServiceFixture<D, M>)
where
    D: CrudTestData,
    M: CrudMapper<Entity = D::Entity, CreateModel = D::CreateModel, UpdateModel = D::UpdateModel>,
    M::Model: PartialEq,
{
    let data = fixture.test_data();
    let id = data.random_id();
    let update_model = data.entity_to_update_model_with_modifications(&data.test_entity_1());

    let err = fixture
        .service()
        .update(&id, update_model, &data.test_parameters())
        .await
        .expect_err("updating a missing entity should fail");

    assert_not_found(data.type_name(), &id, &err);
}

pub async fn update_deleted_not_found<D, M>(fixture: &ServiceFixture<D, M>)
where
    D: CrudTestData,
    M: CrudMapper<Entity = D::Entity, CreateModel = D::CreateModel, UpdateModel = D::UpdateModel>,
    M::Model: PartialEq,
{
    let data = fixture.test_data();
    let parameters = data.test_parameters();
    let entity = data.test_entity_1();
    let id = id_of(&entity);

    fixture.service().delete(&id, &parameters).await.expect("deleting entity");
    let deleted = fixture.repository().get(&id).expect("deleted entity is kept");

    let update_model = data.entity_to_update_model_with_modifications(&entity);
    let err = fixture
        .service()
        .update(&id, update_model, &parameters)
        .await
        .expect_err("updating a deleted entity should fail");

    assert_not_found(data.type_name(), &id, &err);
    let stored = fixture.repository().get(&id).expect("deleted entity is kept");
    assert_eq!(stored.version(), deleted.version());
    assert_eq!(stored.deleted_at(), deleted.deleted_at());
    assert_eq!(fixture.mapper().entity_to_model(&stored), fixture.mapper().entity_to_model(&deleted));
}

pub async fn update_already_exists<D, M>(fixture: &ServiceFixture<D, M>)
where
    D: CrudTestData,
    M: CrudMapper<Entity = D::Entity, CreateModel = D::CreateModel, UpdateModel = D::UpdateModel>,
    M::Model: PartialEq,
{
    let data = fixture.test_data();
    let id = id_of(&data.test_entity_2());
    let update_model = data.entity_to_update_model_with_no_modifications(&data.test_entity_1());
    let expected_message_data = data.entity_to_update_model_with_no_modifications(&data.test_entity_1());

    let err = fixture
        .service()
        .update(&id, update_model, &data.test_parameters())
        .await
        .expect_err("updating into a duplicate should fail");

    assert_already_exists(data.type_name(), &expected_message_data, &err);

    let mapper = fixture.mapper();
    let stored = fixture.repository().get(&id).map(|entity| mapper.entity_to_model(&entity));
    assert_eq!(stored, Some(mapper.entity_to_model(&data.test_entity_2())));
}

pub async fn update<D, M>(fixture: &ServiceFixture<D, M>)
where
    D: CrudTestData,
    M: CrudMapper<Entity = D::Entity, CreateModel = D::CreateModel, UpdateModel = D::UpdateModel>,
    M::Model: PartialEq,
{
    let data = fixture.test_data();
    let parameters = data.test_parameters();
    let entity = data.test_entity_1();
    let later = one_second_later(fixture);

    let actual = fixture
        .service()
        .update(&id_of(&entity), data.entity_to_update_model_with_modifications(&entity), &parameters)
        .await
        .expect("updating entity");

    let mut expected_entity = entity.clone();
    fixture
        .mapper()
        .update_entity_with(&mut expected_entity, &data.entity_to_update_model_with_modifications(&entity));
    expected_entity.set_version(entity.version() + 1);
    expected_entity.set_updated_at(later);
    let expected = fixture.mapper().entity_to_model(&expected_entity);
    assert_eq!(actual, expected);

    let found = fixture
        .service()
        .get(&id_of(&entity), &parameters)
        .await
        .expect("getting updated entity");
    assert_eq!(found, Some(expected));
}

pub async fn update_with_data_of_deleted_entity<D, M>(fixture: &ServiceFixture<D, M>)
where
    D: CrudTestData,
    M: CrudMapper<Entity = D::Entity, CreateModel = D::CreateModel, UpdateModel = D::UpdateModel>,
    M::Model: PartialEq,
{
    let data = fixture.test_data();
    let parameters = data.test_parameters();
    let entity = data.test_entity_1();
    mark_deleted(fixture, &data.test_entity_2()).await;
    let later = one_second_later(fixture);

    let actual = fixture
        .service()
        .update(
            &id_of(&entity),
            data.entity_to_update_model_with_no_modifications(&data.test_entity_2()),
            &parameters,
        )
        .await
        .expect("updating entity with the data of a deleted one");

    let mut expected_entity = entity.clone();
    fixture.mapper().update_entity_with(
        &mut expected_entity,
        &data.entity_to_update_model_with_no_modifications(&data.test_entity_2()),
    );
    expected_entity.set_version(entity.version() + 1);
    expected_entity.set_updated_at(later);
    let expected = fixture.mapper().entity_to_model(&expected_entity);
    assert_eq!(actual, expected);

    let found = fixture
        .service()
        .get(&id_of(&entity), &parameters)
        .await
        .expect("getting updated entity");
    assert_eq!(found, Some(expected));
}

/// Writing unchanged data twice bumps the version twice.
pub async fn update_twice_with_same_data<D, M>(fixture: &ServiceFixture<D, M>)
where
    D: CrudTestData,
    M: CrudMapper<Entity = D::Entity, CreateModel = D::CreateModel, UpdateModel = D::UpdateModel>,
    M::Model: PartialEq,
{
    let data = fixture.test_data();
    let parameters = data.test_parameters();
    let entity = data.test_entity_1();
    let id = id_of(&entity);

    for _ in 0..2 {
        fixture
            .service()
            .update(&id, data.entity_to_update_model_with_no_modifications(&entity), &parameters)
            .await
            .expect("updating entity with its own data");
    }

    let stored = fixture.repository().get(&id).expect("updated entity is stored");
    assert_eq!(stored.version(), entity.version() + 2);
}

pub async fn delete_not_found<D, M>(fixture: &ServiceFixture<D, M>)
where
    D: CrudTestData,
    M: CrudMapper<Entity = D::Entity, CreateModel = D::CreateModel, UpdateModel = D::UpdateModel>,
    M::Model: PartialEq,
{
    let data = fixture.test_data();
    let id = data.random_id();

    let err = fixture
        .service()
        .delete(&id, &data.test_parameters())
        .await
        .expect_err("deleting a missing entity should fail");

    assert_not_found(data.type_name(), &id, &err);
}

pub async fn delete<D, M>(fixture: &ServiceFixture<D, M>)
where
    D: CrudTestData,
    M: CrudMapper<Entity = D::Entity, CreateModel = D::CreateModel, UpdateModel = D::UpdateModel>,
    M::Model: PartialEq,
{
    let data = fixture.test_data();
    let parameters = data.test_parameters();
    let entity = data.test_entity_1();
    let id = id_of(&entity);
    let later = one_second_later(fixture);

    fixture
        .service()
        .delete(&id, &parameters)
        .await
        .expect("deleting entity");

    let found = fixture.service().get(&id, &parameters).await.expect("getting deleted entity");
    assert_eq!(found, None);

    let stored = fixture.repository().get(&id).expect("deleted entity is kept");
    assert_eq!(stored.version(), entity.version() + 1);
    assert_eq!(stored.updated_at(), later);
    assert_eq!(stored.deleted_at(), Some(later));
    assert_eq!(stored.created_at(), entity.created_at());
}

pub async fn delete_deleted_not_found<D, M>(fixture: &ServiceFixture<D, M>)
where
    D: CrudTestData,
    M: CrudMapper<Entity = D::Entity, CreateModel = D::CreateModel, UpdateModel = D::UpdateModel>,
    M::Model: PartialEq,
{
    let data = fixture.test_data();
    let parameters = data.test_parameters();
    let id = id_of(&data.test_entity_1());

    fixture.service().delete(&id, &parameters).await.expect("deleting entity");
    let err = fixture
        .service()
        .delete(&id, &parameters)
        .await
        .expect_err("deleting twice should fail");

    assert_not_found(data.type_name(), &id, &err);
}
