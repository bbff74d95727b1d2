// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Query/mutation graph-style adapter.
//!
//! Every operation is a POST of `{query, variables}` to a single endpoint.
//! The first entry of a non-empty `errors` array is surfaced as
//! `ClientError::Remote`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use super::ProtocolClient;
use crate::error::{ClientError, ClientResult};
use crate::models::{Composite, Entity, EntityId, Item, ItemQuery, LineRequest};
use crate::types::Protocol;

const CREATE_USER: &str = r#"
mutation CreateUser($input: CreateUserInput!) {
  createUser(input: $input) { id name email created_at }
}"#;

const GET_USER: &str = r#"
query GetUser($id: ID!) {
  user(id: $id) { id name email created_at }
}"#;

const GET_PRODUCTS: &str = r#"
query GetProducts($category: String, $limit: Int, $offset: Int) {
  products(category: $category, limit: $limit, offset: $offset) {
    id name price category created_at
  }
}"#;

const CREATE_ORDER: &str = r#"
mutation CreateOrder($input: CreateOrderInput!) {
  createOrder(input: $input) {
    id user_id total_amount created_at
    items { product_id product_name quantity price }
  }
}"#;

const GET_USER_ORDERS: &str = r#"
query GetUserOrders($userId: ID!) {
  userOrders(userId: $userId) {
    id total_amount created_at
    items { product_id product_name quantity price }
  }
}"#;

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<RemoteError>,
}

#[derive(Debug, Deserialize)]
struct RemoteError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct CreateUserData {
    #[serde(rename = "createUser")]
    create_user: Entity,
}

#[derive(Debug, Deserialize)]
struct UserData {
    user: Option<Entity>,
}

#[derive(Debug, Deserialize)]
struct ProductsData {
    products: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct CreateOrderData {
    #[serde(rename = "createOrder")]
    create_order: Composite,
}

#[derive(Debug, Deserialize)]
struct UserOrdersData {
    #[serde(rename = "userOrders")]
    user_orders: Vec<Composite>,
}

/// Single-endpoint query/mutation client.
pub struct GraphClient {
    endpoint: String,
    http: Client,
}

impl GraphClient {
    /// `endpoint` is the full query URL, e.g. `http://network-proxy:8002/graphql`.
    pub fn new(endpoint: &str, timeout: Duration) -> ClientResult<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            endpoint: endpoint.to_string(),
            http,
        })
    }

    async fn execute<T: DeserializeOwned>(&self, query: &str, variables: Value) -> ClientResult<T> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        decode_envelope(status.as_u16(), &body)
    }
}

/// Interpret a response body, preferring reported errors over the HTTP status.
fn decode_envelope<T: DeserializeOwned>(status: u16, body: &str) -> ClientResult<T> {
    let envelope = serde_json::from_str::<Envelope<T>>(body);

    if let Ok(Envelope { errors, .. }) = &envelope {
        if let Some(first) = errors.first() {
            return Err(ClientError::Remote {
                message: first.message.clone(),
            });
        }
    }

    if !(200..300).contains(&status) {
        return Err(ClientError::Status {
            status,
            body: body.to_string(),
        });
    }

    envelope?.data.ok_or_else(|| ClientError::Decode {
        reason: "response carried neither data nor errors".to_string(),
    })
}

#[async_trait]
impl ProtocolClient for GraphClient {
    fn protocol(&self) -> Protocol {
        Protocol::Graph
    }

    async fn create_entity(&self, name: &str, email: &str) -> ClientResult<Entity> {
        let data: CreateUserData = self
            .execute(
                CREATE_USER,
                json!({ "input": { "name": name, "email": email } }),
            )
            .await?;
        Ok(data.create_user)
    }

    async fn get_entity(&self, id: EntityId) -> ClientResult<Entity> {
        let data: UserData = self
            .execute(GET_USER, json!({ "id": id.to_string() }))
            .await?;
        data.user.ok_or(ClientError::NotFound {
            resource: "entity",
            id,
        })
    }

    async fn list_items(&self, query: &ItemQuery) -> ClientResult<Vec<Item>> {
        let data: ProductsData = self
            .execute(
                GET_PRODUCTS,
                json!({
                    "category": query.category,
                    "limit": query.limit,
                    "offset": query.offset,
                }),
            )
            .await?;
        Ok(data.products)
    }

    async fn create_composite(
        &self,
        owner_id: EntityId,
        lines: &[LineRequest],
    ) -> ClientResult<Composite> {
        let data: CreateOrderData = self
            .execute(
                CREATE_ORDER,
                json!({ "input": { "user_id": owner_id.to_string(), "items": lines } }),
            )
            .await?;
        Ok(data.create_order)
    }

    async fn list_owner_composites(&self, owner_id: EntityId) -> ClientResult<Vec<Composite>> {
        let data: UserOrdersData = self
            .execute(GET_USER_ORDERS, json!({ "userId": owner_id.to_string() }))
            .await?;
        Ok(data.user_orders)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_data() {
        let body = r#"{"data":{"user":{"id":"1","name":"John Doe","email":"john@example.com"}}}"#;
        let data: UserData = decode_envelope(200, body).unwrap();
        assert_eq!(data.user.unwrap().id, 1);
    }

    #[test]
    fn test_decode_errors_take_precedence() {
        let body = r#"{"data":null,"errors":[{"message":"User not found"},{"message":"other"}]}"#;
        let result: ClientResult<UserData> = decode_envelope(400, body);
        match result {
            Err(ClientError::Remote { message }) => assert_eq!(message, "User not found"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_decode_http_failure_without_envelope() {
        let result: ClientResult<UserData> = decode_envelope(502, "Bad Gateway");
        assert!(matches!(result, Err(ClientError::Status { status: 502, .. })));
    }

    #[test]
    fn test_decode_missing_data() {
        let result: ClientResult<UserData> = decode_envelope(200, r#"{"data":null}"#);
        assert!(matches!(result, Err(ClientError::Decode { .. })));
    }

    #[test]
    fn test_decode_null_user() {
        let data: UserData = decode_envelope(200, r#"{"data":{"user":null}}"#).unwrap();
        assert!(data.user.is_none());
    }
}
