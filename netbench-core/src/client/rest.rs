// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! HTTP request/response adapter.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::json;

use super::ProtocolClient;
use crate::error::{ClientError, ClientResult};
use crate::models::{Composite, Entity, EntityId, Item, ItemQuery, LineRequest};
use crate::types::Protocol;

/// Resource-oriented JSON-over-HTTP client.
pub struct RestClient {
    base_url: String,
    http: Client,
}

impl RestClient {
    /// `base_url` is the server root, e.g. `http://network-proxy:8001`.
    pub fn new(base_url: &str, timeout: Duration) -> ClientResult<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    fn url(&self, path: &str) -> ClientResult<Url> {
        let raw = format!("{}{}", self.base_url, path);
        Url::parse(&raw).map_err(|e| ClientError::Transport {
            reason: format!("invalid url {}: {}", raw, e),
        })
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl ProtocolClient for RestClient {
    fn protocol(&self) -> Protocol {
        Protocol::Rest
    }

    async fn create_entity(&self, name: &str, email: &str) -> ClientResult<Entity> {
        let response = self
            .http
            .post(self.url("/users")?)
            .json(&json!({ "name": name, "email": email }))
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn get_entity(&self, id: EntityId) -> ClientResult<Entity> {
        let response = self
            .http
            .get(self.url(&format!("/users/{}", id))?)
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound {
                resource: "entity",
                id,
            });
        }
        Self::decode(response).await
    }

    async fn list_items(&self, query: &ItemQuery) -> ClientResult<Vec<Item>> {
        let mut url = self.url("/products")?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("limit", &query.limit.to_string());
            pairs.append_pair("offset", &query.offset.to_string());
            if let Some(category) = &query.category {
                pairs.append_pair("category", category);
            }
        }
        let response = self.http.get(url).send().await?;
        Self::decode(response).await
    }

    async fn create_composite(
        &self,
        owner_id: EntityId,
        lines: &[LineRequest],
    ) -> ClientResult<Composite> {
        let response = self
            .http
            .post(self.url("/orders")?)
            .json(&json!({ "user_id": owner_id, "items": lines }))
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn list_owner_composites(&self, owner_id: EntityId) -> ClientResult<Vec<Composite>> {
        let response = self
            .http
            .get(self.url(&format!("/users/{}/orders", owner_id))?)
            .send()
            .await?;
        Self::decode(response).await
    }
}
