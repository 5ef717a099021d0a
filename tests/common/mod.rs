#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Request, StatusCode},
};
use crudcore::{
    ApiBuilder, AppConfig, RouterCore,
    migration::{Migrator, create_record_table},
    resources::example::Example,
};
use sea_orm::{Database, DatabaseConnection, DbErr};
use sea_orm_migration::{MigratorTrait, SchemaManager};
use serde_json::Value;
use tower::ServiceExt;

pub mod task_entity;

pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect("sqlite::memory:").await?;

    // Run migrations
    Migrator::up(&db, None).await?;

    let manager = SchemaManager::new(&db);
    create_record_table(&manager, task_entity::Entity).await?;

    Ok(db)
}

pub fn setup_test_app(db: DatabaseConnection) -> Router {
    ApiBuilder::new(db)
        .resource(RouterCore::<Example>::new())
        .resource(task_entity::router())
        .build(&AppConfig::default())
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

pub async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> TestResponse {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    TestResponse {
        status,
        headers,
        body,
    }
}

pub async fn get(app: &Router, uri: &str) -> TestResponse {
    send(app, "GET", uri, None).await
}

pub async fn post(app: &Router, uri: &str, body: Value) -> TestResponse {
    send(app, "POST", uri, Some(body)).await
}

pub async fn patch(app: &Router, uri: &str, body: Option<Value>) -> TestResponse {
    send(app, "PATCH", uri, body).await
}

pub async fn delete(app: &Router, uri: &str) -> TestResponse {
    send(app, "DELETE", uri, None).await
}

/// Create an example record over HTTP and return its id.
pub async fn create_example(app: &Router, code: &str, title: &str) -> i64 {
    let response = post(
        app,
        "/v1/example",
        serde_json::json!({"code": code, "title": title}),
    )
    .await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
    response.body["data"]["id"].as_i64().unwrap()
}
