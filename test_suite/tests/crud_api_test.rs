// REST endpoints of the Foo resource: status codes, JSON bodies and error responses

use axum::body::Body;
use axum::http::{Request, StatusCode};
use crudlayer::{CrudErrorBody, Paged};
use serde_json::json;
use serial_test::serial;
use test_suite::foo::FooDto;
use uuid::Uuid;

mod common;
use common::{body_json, empty_request, json_request, send, setup_test_app};

async fn create_foo(app: &axum::Router, foo: &str, bar: i32) -> FooDto {
    let response = send(app, json_request("POST", "/foos", &json!({ "foo": foo, "bar": bar }))).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

#[tokio::test]
#[serial]
async fn test_create_foo_endpoint() {
    let app = setup_test_app().await;

    let response = send(&app, json_request("POST", "/foos", &json!({ "foo": "Foo 1", "bar": 1 }))).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body: serde_json::Value = body_json(response).await;
    assert_eq!(body["foo"], "Foo 1");
    assert_eq!(body["bar"], 1);
    assert!(body["createdAt"].is_string());
    assert_eq!(body["createdAt"], body["updatedAt"]);
    assert!(body.get("version").is_none());
    assert!(body.get("deletedAt").is_none());

    let id: Uuid = serde_json::from_value(body["id"].clone()).unwrap();
    assert!(!id.is_nil());
}

#[tokio::test]
#[serial]
async fn test_create_duplicate_is_conflict() {
    let app = setup_test_app().await;
    create_foo(&app, "Foo 1", 1).await;

    let response = send(&app, json_request("POST", "/foos", &json!({ "foo": "Foo 1", "bar": 1 }))).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let error: CrudErrorBody = body_json(response).await;
    assert_eq!(error.code, 409);
    assert_eq!(error.kind, "Conflict");
    assert!(error.message.starts_with("Foo with "), "{}", error.message);
    assert!(error.message.ends_with(" already exists."), "{}", error.message);
}

#[tokio::test]
#[serial]
async fn test_create_invalid_is_unprocessable() {
    let app = setup_test_app().await;

    let response = send(&app, json_request("POST", "/foos", &json!({ "foo": "  ", "bar": -1 }))).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let error: CrudErrorBody = body_json(response).await;
    let fields: Vec<String> = error
        .details
        .unwrap()
        .into_iter()
        .map(|detail| detail.field)
        .collect();
    assert_eq!(fields, vec!["foo", "bar"]);
}

fn raw_request(method: &str, uri: &str, content_type: Option<&str>, body: &'static str) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(content_type) = content_type {
        builder = builder.header("content-type", content_type);
    }
    builder.body(Body::from(body)).unwrap()
}

#[tokio::test]
#[serial]
async fn test_unreadable_body_is_bad_request_with_error_body() {
    let app = setup_test_app().await;
    let created = create_foo(&app, "Foo 1", 1).await;
    let uri = format!("/foos/{}", created.id);

    let cases = [
        ("POST", "/foos", Some("application/json"), "{not json"),
        ("POST", "/foos", Some("application/json"), r#"{"foo":"x"}"#),
        ("POST", "/foos", None, r#"{"foo":"x","bar":1}"#),
        ("PUT", uri.as_str(), Some("application/json"), "{not json"),
    ];

    for (method, uri, content_type, body) in cases {
        let response = send(&app, raw_request(method, uri, content_type, body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{method} {body}");
        assert_eq!(response.headers()["content-type"], "application/json");

        let error: CrudErrorBody = body_json(response).await;
        assert_eq!(error.code, 400);
        assert_eq!(error.kind, "Bad Request");
        assert!(error.message.starts_with("Request body is not valid: "), "{}", error.message);
    }

    // Nothing was stored or changed by the rejected requests
    let response = send(&app, empty_request("GET", "/foos")).await;
    let all: Paged<FooDto> = body_json(response).await;
    assert_eq!(all.data.len(), 1);
    assert_eq!(all.data[0].foo, "Foo 1");
}

#[tokio::test]
#[serial]
async fn test_get_one_and_not_found() {
    let app = setup_test_app().await;
    let created = create_foo(&app, "Foo 1", 1).await;

    let response = send(&app, empty_request("GET", &format!("/foos/{}", created.id))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let found: FooDto = body_json(response).await;
    assert_eq!((found.id, &found.foo, found.bar), (created.id, &created.foo, created.bar));
    assert_eq!(found.created_at.timestamp(), created.created_at.timestamp());

    let missing = Uuid::new_v4();
    let response = send(&app, empty_request("GET", &format!("/foos/{missing}"))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let error: CrudErrorBody = body_json(response).await;
    assert_eq!(error.message, format!("Foo with id {missing} is not found."));
    assert_eq!(error.kind, "Not Found");
}

#[tokio::test]
#[serial]
async fn test_invalid_id_is_bad_request() {
    let app = setup_test_app().await;

    let response = send(&app, empty_request("GET", "/foos/not-a-uuid")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let error: CrudErrorBody = body_json(response).await;
    assert_eq!(error.code, 400);
}

#[tokio::test]
#[serial]
async fn test_list_with_pagination() {
    let app = setup_test_app().await;
    for n in 1..=3 {
        create_foo(&app, &format!("Foo {n}"), n).await;
    }

    let response = send(&app, empty_request("GET", "/foos")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let all: Paged<FooDto> = body_json(response).await;
    assert_eq!((all.data.len(), all.page, all.per_page, all.total_pages), (3, 0, 20, 1));

    let response = send(&app, empty_request("GET", "/foos?page=1&perPage=2")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let second: serde_json::Value = body_json(response).await;
    assert_eq!(second["page"], 1);
    assert_eq!(second["perPage"], 2);
    assert_eq!(second["totalPages"], 2);
    assert_eq!(second["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
#[serial]
async fn test_list_with_bad_pagination_is_bad_request() {
    let app = setup_test_app().await;

    for query in ["page=abc", "perPage=0", "perPage=-1"] {
        let response = send(&app, empty_request("GET", &format!("/foos?{query}"))).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{query}");
    }
}

#[tokio::test]
#[serial]
async fn test_update_endpoint() {
    let app = setup_test_app().await;
    let created = create_foo(&app, "Foo 1", 1).await;
    let other = create_foo(&app, "Foo 2", 2).await;
    let uri = format!("/foos/{}", created.id);

    let response = send(&app, json_request("PUT", &uri, &json!({ "foo": "Foo 1-updated", "bar": 2 }))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated: FooDto = body_json(response).await;
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.foo, "Foo 1-updated");
    assert_eq!(updated.bar, 2);
    assert_eq!(updated.created_at.timestamp(), created.created_at.timestamp());
    assert!(updated.updated_at >= created.updated_at);

    let response = send(&app, json_request("PUT", &uri, &json!({ "foo": other.foo, "bar": other.bar }))).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = send(&app, json_request("PUT", &uri, &json!({ "foo": "", "bar": 1 }))).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let missing = format!("/foos/{}", Uuid::new_v4());
    let response = send(&app, json_request("PUT", &missing, &json!({ "foo": "Foo 9", "bar": 9 }))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[serial]
async fn test_delete_endpoint() {
    let app = setup_test_app().await;
    let created = create_foo(&app, "Foo 1", 1).await;
    let uri = format!("/foos/{}", created.id);

    let response = send(&app, empty_request("DELETE", &uri)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = send(&app, empty_request("GET", &uri)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(&app, empty_request("DELETE", &uri)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(&app, json_request("PUT", &uri, &json!({ "foo": "Foo 2", "bar": 2 }))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(&app, empty_request("GET", "/foos")).await;
    let all: Paged<FooDto> = body_json(response).await;
    assert!(all.data.is_empty());

    // Same data can be created again once deleted
    create_foo(&app, "Foo 1", 1).await;
}

#[tokio::test]
#[serial]
async fn test_openapi_document() {
    let app = setup_test_app().await;

    let response = send(&app, empty_request("GET", "/openapi.json")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let doc: serde_json::Value = body_json(response).await;
    assert_eq!(doc["info"]["title"], "Foo API");
    assert_eq!(doc["paths"]["/foos"]["post"]["operationId"], "createFoo");
    assert_eq!(doc["paths"]["/foos/{id}"]["delete"]["operationId"], "deleteFoo");
    assert!(doc["components"]["schemas"]["FooDto"].is_object());
    assert!(doc["components"]["schemas"]["CrudErrorBody"].is_object());
}
