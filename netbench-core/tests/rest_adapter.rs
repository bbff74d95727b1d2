// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! HTTP adapter exercised against a local server backed by a record store.

use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use netbench_core::client::{ProtocolClient, RestClient};
use netbench_core::{
    ClientError, Composite, Entity, EntityId, Item, ItemQuery, LineRequest, Protocol,
    RecordStore,
};

#[derive(Deserialize)]
struct NewUser {
    name: String,
    email: String,
}

#[derive(Deserialize)]
struct NewOrder {
    user_id: EntityId,
    items: Vec<LineRequest>,
}

fn status_for(err: ClientError) -> StatusCode {
    match err {
        ClientError::NotFound { .. } => StatusCode::NOT_FOUND,
        _ => StatusCode::BAD_REQUEST,
    }
}

async fn create_user(State(store): State<RecordStore>, Json(body): Json<NewUser>) -> Json<Entity> {
    Json(store.create_entity(&body.name, &body.email))
}

async fn get_user(
    State(store): State<RecordStore>,
    Path(id): Path<EntityId>,
) -> Result<Json<Entity>, StatusCode> {
    store.get_entity(id).map(Json).map_err(status_for)
}

async fn list_products(
    State(store): State<RecordStore>,
    Query(query): Query<ItemQuery>,
) -> Json<Vec<Item>> {
    Json(store.list_items(&query))
}

async fn create_order(
    State(store): State<RecordStore>,
    Json(body): Json<NewOrder>,
) -> Result<Json<Composite>, StatusCode> {
    store
        .create_composite(body.user_id, &body.items)
        .map(Json)
        .map_err(status_for)
}

async fn user_orders(
    State(store): State<RecordStore>,
    Path(id): Path<EntityId>,
) -> Json<Vec<Composite>> {
    Json(store.list_owner_composites(id))
}

async fn spawn_server(store: RecordStore) -> String {
    let app = Router::new()
        .route("/users", post(create_user))
        .route("/users/{id}", get(get_user))
        .route("/users/{id}/orders", get(user_orders))
        .route("/products", get(list_products))
        .route("/orders", post(create_order))
        .with_state(store);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind fake server");
    let addr = listener.local_addr().expect("No local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    format!("http://{}", addr)
}

#[tokio::test]
async fn test_operation_chain() {
    let url = spawn_server(RecordStore::seeded()).await;
    let client = RestClient::new(&url, Duration::from_secs(5)).unwrap();
    assert_eq!(client.protocol(), Protocol::Rest);

    let entity = client
        .create_entity("Test User 0", "user0@test.com")
        .await
        .unwrap();
    assert_eq!(entity.id, 6);

    let items = client.list_items(&ItemQuery::new(5)).await.unwrap();
    assert_eq!(items.len(), 5);

    let composite = client
        .create_composite(
            entity.id,
            &[LineRequest {
                item_id: items[0].id,
                quantity: 2,
            }],
        )
        .await
        .unwrap();
    assert_eq!(composite.owner_id, entity.id);
    assert_eq!(composite.lines[0].item_name, items[0].name);
    assert!((composite.total_amount - items[0].price * 2.0).abs() < 1e-9);

    let owned = client.list_owner_composites(entity.id).await.unwrap();
    assert_eq!(owned.len(), 1);
}

#[tokio::test]
async fn test_category_filter() {
    let url = spawn_server(RecordStore::seeded()).await;
    let client = RestClient::new(&url, Duration::from_secs(5)).unwrap();

    let items = client
        .list_items(&ItemQuery::new(10).category("Electronics"))
        .await
        .unwrap();
    assert!(!items.is_empty());
    assert!(items.iter().all(|i| i.category == "Electronics"));
}

#[tokio::test]
async fn test_missing_entity_is_not_found() {
    let url = spawn_server(RecordStore::seeded()).await;
    let client = RestClient::new(&url, Duration::from_secs(5)).unwrap();

    let err = client.get_entity(999).await.unwrap_err();
    assert!(matches!(err, ClientError::NotFound { id: 999, .. }));
}

#[tokio::test]
async fn test_unknown_item_is_status_error() {
    let url = spawn_server(RecordStore::seeded()).await;
    let client = RestClient::new(&url, Duration::from_secs(5)).unwrap();

    let err = client
        .create_composite(
            1,
            &[LineRequest {
                item_id: 4242,
                quantity: 1,
            }],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Status { status: 404, .. }));
}

#[tokio::test]
async fn test_unreachable_server_is_transport_error() {
    let client = RestClient::new("http://127.0.0.1:1", Duration::from_millis(200)).unwrap();
    let err = client.create_entity("x", "x@test.com").await.unwrap_err();
    assert!(matches!(err, ClientError::Transport { .. }));
}
