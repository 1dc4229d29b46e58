#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response};
use chrono::{DateTime, TimeDelta, Utc};
use crudlayer::{CrudService, InstantProvider, PageRequest, Paged, SeaOrmRepository};
use crudlayer_test::{AdjustableInstantProvider, CrudTestData, IdGenerator, ServiceFixture, UuidIdGenerator};
use sea_orm::DatabaseConnection;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use test_suite::foo::{CreateFoo, FooMapper, Model, UpdateFoo};
use test_suite::{FooService, setup_db};
use tower::ServiceExt;
use uuid::Uuid;

pub struct FooTestData {
    ids: [Uuid; 3],
    created_at: DateTime<Utc>,
    instant_provider: Arc<AdjustableInstantProvider>,
}

impl Default for FooTestData {
    fn default() -> Self {
        let instant_provider = Arc::new(AdjustableInstantProvider::new());
        Self {
            ids: [Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4()],
            created_at: instant_provider.now(),
            instant_provider,
        }
    }
}

impl FooTestData {
    /// `Foo n` with `bar = n`, created `n - 1` seconds after the start.
    fn foo(&self, n: i32) -> Model {
        let at = self.created_at + TimeDelta::seconds(i64::from(n - 1));
        Model {
            id: self.ids[(n - 1) as usize],
            foo: format!("Foo {n}"),
            bar: n,
            version: 0,
            created_at: at,
            updated_at: at,
            deleted_at: None,
        }
    }
}

impl CrudTestData for FooTestData {
    type Entity = Model;
    type CreateModel = CreateFoo;
    type UpdateModel = UpdateFoo;

    fn type_name(&self) -> &str {
        "Foo"
    }

    fn id_generator(&self) -> &dyn IdGenerator<Uuid> {
        &UuidIdGenerator
    }

    fn instant_provider(&self) -> &Arc<AdjustableInstantProvider> {
        &self.instant_provider
    }

    fn test_entity_1(&self) -> Model {
        self.foo(1)
    }

    fn test_entity_2(&self) -> Model {
        self.foo(2)
    }

    fn test_entity_3(&self) -> Model {
        self.foo(3)
    }

    fn default_first_page_entities(&self) -> Vec<Model> {
        self.test_entities()
    }

    fn pagination_test_cases(&self) -> Vec<(PageRequest, Paged<Model>)> {
        let page = |page| PageRequest::new(page, 2).expect("valid page request");
        vec![
            (page(0), Paged::new(vec![self.test_entity_1(), self.test_entity_2()], page(0), 2)),
            (page(1), Paged::new(vec![self.test_entity_3()], page(1), 2)),
            (page(2), Paged::empty(2, 2, 2)),
        ]
    }

    fn are_duplicates(&self, e1: &Model, e2: &Model) -> bool {
        e1.foo == e2.foo && e1.bar == e2.bar
    }

    fn entity_to_create_model(&self, entity: &Model) -> CreateFoo {
        CreateFoo {
            foo: entity.foo.clone(),
            bar: entity.bar,
        }
    }

    fn entity_to_update_model_with_no_modifications(&self, entity: &Model) -> UpdateFoo {
        UpdateFoo {
            foo: entity.foo.clone(),
            bar: entity.bar,
        }
    }

    fn entity_to_update_model_with_modifications(&self, entity: &Model) -> UpdateFoo {
        UpdateFoo {
            foo: format!("{}-updated", entity.foo),
            bar: entity.bar + 1,
        }
    }
}

/// Logs to the test output, filtered by `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn foo_fixture() -> ServiceFixture<FooTestData, FooMapper> {
    init_tracing();
    ServiceFixture::new(FooTestData::default(), FooMapper)
}

/// A database-backed service on a clock the test controls.
pub async fn foo_service_with_clock(clock: Arc<AdjustableInstantProvider>) -> (DatabaseConnection, FooService) {
    init_tracing();
    let db = setup_db(&test_suite::database_url())
        .await
        .expect("Failed to setup test database");
    let instant_provider: Arc<dyn InstantProvider> = clock;
    let service = CrudService::new("Foo", instant_provider, SeaOrmRepository::new(db.clone()), FooMapper);
    (db, service)
}

pub async fn setup_test_app() -> Router {
    init_tracing();
    let db = setup_db(&test_suite::database_url())
        .await
        .expect("Failed to setup test database");
    test_suite::app(test_suite::foo_service(db))
}

pub fn json_request(method: &str, uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

pub fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder().method(method).uri(uri).body(Body::empty()).unwrap()
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn body_json<T: DeserializeOwned>(response: Response<Body>) -> T {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}
