// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! gRPC adapter exercised against a local HTTP/2 server that speaks the
//! `api.ApiService` wire format over a record store.

use std::time::Duration;

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use prost::Message;

use netbench_core::client::rpc::{method, proto};
use netbench_core::client::{ProtocolClient, RpcClient};
use netbench_core::{
    ClientError, Composite, Entity, ItemQuery, LineRequest, Protocol, RecordStore,
};

/// gRPC status codes used by the fake server.
const GRPC_UNKNOWN: i32 = 2;

fn decode<M: Message + Default>(body: &[u8]) -> M {
    assert!(body.len() >= 5, "short gRPC frame");
    assert_eq!(body[0], 0, "unexpected compressed frame");
    let len = u32::from_be_bytes([body[1], body[2], body[3], body[4]]) as usize;
    M::decode(&body[5..5 + len]).expect("Failed to decode request")
}

fn reply<M: Message>(message: &M) -> Response {
    let mut buf = vec![0u8];
    buf.extend_from_slice(&(message.encoded_len() as u32).to_be_bytes());
    message.encode(&mut buf).expect("Failed to encode reply");
    ([(header::CONTENT_TYPE, "application/grpc")], buf).into_response()
}

/// Trailers-only error response.
fn failure(code: i32, message: &str) -> Response {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/grpc")
        .header("grpc-status", code.to_string())
        .header("grpc-message", message)
        .body(Body::empty())
        .expect("Failed to build response")
}

fn user(entity: Entity) -> proto::User {
    proto::User {
        id: entity.id.to_string(),
        name: entity.name,
        email: entity.email,
        created_at: entity.created_at,
    }
}

fn order(composite: Composite) -> proto::Order {
    proto::Order {
        id: composite.id.to_string(),
        user_id: composite.owner_id.to_string(),
        total_amount: composite.total_amount,
        created_at: composite.created_at,
        items: composite
            .lines
            .into_iter()
            .map(|line| proto::OrderItem {
                product_id: line.item_id.to_string(),
                product_name: line.item_name,
                quantity: line.quantity as i32,
                price: line.price,
            })
            .collect(),
    }
}

async fn create_user(State(store): State<RecordStore>, body: Bytes) -> Response {
    let req: proto::CreateUserRequest = decode(&body);
    reply(&user(store.create_entity(&req.name, &req.email)))
}

async fn get_user(State(store): State<RecordStore>, body: Bytes) -> Response {
    let req: proto::GetUserRequest = decode(&body);
    match store.get_entity(req.id.parse().unwrap_or(0)) {
        Ok(entity) => reply(&user(entity)),
        // The API server reports a missing user as a plain error.
        Err(_) => failure(GRPC_UNKNOWN, "User not found"),
    }
}

async fn get_products(State(store): State<RecordStore>, body: Bytes) -> Response {
    let req: proto::GetProductsRequest = decode(&body);
    let mut query = ItemQuery::new(req.limit as u32).offset(req.offset as u32);
    if !req.category.is_empty() {
        query = query.category(req.category);
    }
    let products = store
        .list_items(&query)
        .into_iter()
        .map(|item| proto::Product {
            id: item.id.to_string(),
            name: item.name,
            price: item.price,
            category: item.category,
            created_at: item.created_at,
        })
        .collect();
    reply(&proto::ProductsResponse { products })
}

async fn create_order(State(store): State<RecordStore>, body: Bytes) -> Response {
    let req: proto::CreateOrderRequest = decode(&body);
    let lines: Vec<LineRequest> = req
        .items
        .iter()
        .map(|line| LineRequest {
            item_id: line.product_id.parse().unwrap_or(0),
            quantity: line.quantity as u32,
        })
        .collect();
    match store.create_composite(req.user_id.parse().unwrap_or(0), &lines) {
        Ok(composite) => reply(&order(composite)),
        Err(e) => failure(GRPC_UNKNOWN, &e.to_string()),
    }
}

async fn get_user_orders(State(store): State<RecordStore>, body: Bytes) -> Response {
    let req: proto::GetUserOrdersRequest = decode(&body);
    let orders = store
        .list_owner_composites(req.user_id.parse().unwrap_or(0))
        .into_iter()
        .map(order)
        .collect();
    reply(&proto::OrdersResponse { orders })
}

async fn spawn_server(store: RecordStore) -> String {
    let app = Router::new()
        .route(method::CREATE_USER, post(create_user))
        .route(method::GET_USER, post(get_user))
        .route(method::GET_PRODUCTS, post(get_products))
        .route(method::CREATE_ORDER, post(create_order))
        .route(method::GET_USER_ORDERS, post(get_user_orders))
        .with_state(store);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind fake server");
    let addr = listener.local_addr().expect("No local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    addr.to_string()
}

#[tokio::test]
async fn test_operation_chain() {
    let addr = spawn_server(RecordStore::seeded()).await;
    let client = RpcClient::new(&addr, Duration::from_secs(5)).unwrap();
    assert_eq!(client.protocol(), Protocol::Rpc);

    let entity = client
        .create_entity("Test User 0", "user0@test.com")
        .await
        .unwrap();
    assert_eq!(entity.id, 6);
    assert_eq!(entity.email, "user0@test.com");

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
    assert_eq!(owned[0].id, composite.id);

    let fetched = client.get_entity(entity.id).await.unwrap();
    assert_eq!(fetched, entity);
}

#[tokio::test]
async fn test_category_filter() {
    let addr = spawn_server(RecordStore::seeded()).await;
    let client = RpcClient::new(&addr, Duration::from_secs(5)).unwrap();

    let items = client
        .list_items(&ItemQuery::new(10).category("Electronics"))
        .await
        .unwrap();
    assert!(!items.is_empty());
    assert!(items.iter().all(|i| i.category == "Electronics"));
}

#[tokio::test]
async fn test_missing_entity_is_not_found() {
    let addr = spawn_server(RecordStore::seeded()).await;
    let client = RpcClient::new(&addr, Duration::from_secs(5)).unwrap();

    let err = client.get_entity(999).await.unwrap_err();
    assert!(matches!(
        err,
        ClientError::NotFound {
            resource: "entity",
            id: 999
        }
    ));
}

#[tokio::test]
async fn test_unknown_item_is_remote_error() {
    let addr = spawn_server(RecordStore::seeded()).await;
    let client = RpcClient::new(&addr, Duration::from_secs(5)).unwrap();

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
    assert!(matches!(err, ClientError::Remote { .. }));
}

#[tokio::test]
async fn test_http_uri_address_accepted() {
    let addr = spawn_server(RecordStore::seeded()).await;
    let client = RpcClient::new(&format!("http://{}", addr), Duration::from_secs(5)).unwrap();
    assert!(client.create_entity("A", "a@test.com").await.is_ok());
}
