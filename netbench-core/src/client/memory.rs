// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! In-process adapter that answers from a `RecordStore` directly.
//!
//! Used for dry runs and tests where no servers are reachable.

use std::time::Duration;

use async_trait::async_trait;

use super::ProtocolClient;
use crate::error::ClientResult;
use crate::models::{Composite, Entity, EntityId, Item, ItemQuery, LineRequest};
use crate::store::RecordStore;
use crate::types::Protocol;

pub struct InProcessClient {
    protocol: Protocol,
    store: RecordStore,
    latency: Duration,
}

impl InProcessClient {
    pub fn new(protocol: Protocol, store: RecordStore) -> Self {
        Self {
            protocol,
            store,
            latency: Duration::ZERO,
        }
    }

    /// Add a fixed delay to every call.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    async fn pace(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

#[async_trait]
impl ProtocolClient for InProcessClient {
    fn protocol(&self) -> Protocol {
        self.protocol
    }

    async fn create_entity(&self, name: &str, email: &str) -> ClientResult<Entity> {
        self.pace().await;
        Ok(self.store.create_entity(name, email))
    }

    async fn get_entity(&self, id: EntityId) -> ClientResult<Entity> {
        self.pace().await;
        self.store.get_entity(id)
    }

    async fn list_items(&self, query: &ItemQuery) -> ClientResult<Vec<Item>> {
        self.pace().await;
        Ok(self.store.list_items(query))
    }

    async fn create_composite(
        &self,
        owner_id: EntityId,
        lines: &[LineRequest],
    ) -> ClientResult<Composite> {
        self.pace().await;
        self.store.create_composite(owner_id, lines)
    }

    async fn list_owner_composites(&self, owner_id: EntityId) -> ClientResult<Vec<Composite>> {
        self.pace().await;
        Ok(self.store.list_owner_composites(owner_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;

    #[tokio::test]
    async fn test_contract_over_store() {
        let client = InProcessClient::new(Protocol::Graph, RecordStore::seeded());
        assert_eq!(client.protocol(), Protocol::Graph);

        let entity = client.create_entity("Test User 0", "user0@test.com").await.unwrap();
        let fetched = client.get_entity(entity.id).await.unwrap();
        assert_eq!(fetched, entity);

        let items = client.list_items(&ItemQuery::new(5)).await.unwrap();
        let composite = client
            .create_composite(
                entity.id,
                &[LineRequest {
                    item_id: items[0].id,
                    quantity: 1,
                }],
            )
            .await
            .unwrap();
        assert_eq!(composite.owner_id, entity.id);

        let listed = client.list_owner_composites(entity.id).await.unwrap();
        assert_eq!(listed, vec![composite]);

        assert!(matches!(
            client.get_entity(12345).await,
            Err(ClientError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_shared_store_across_protocols() {
        let store = RecordStore::seeded();
        let rest = InProcessClient::new(Protocol::Rest, store.clone());
        let rpc = InProcessClient::new(Protocol::Rpc, store);

        let created = rest.create_entity("Shared", "shared@test.com").await.unwrap();
        assert_eq!(rpc.get_entity(created.id).await.unwrap().name, "Shared");
    }
}
