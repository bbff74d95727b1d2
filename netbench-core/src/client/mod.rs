// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Protocol-client capability contract.
//!
//! The three API styles are consumed through one async trait so the benchmark
//! harness never needs to know which transport sits behind a client.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::ClientResult;
use crate::models::{Composite, Entity, EntityId, Item, ItemQuery, LineRequest};
use crate::types::Protocol;

pub mod graph;
pub mod memory;
pub mod rest;
pub mod rpc;

pub use graph::GraphClient;
pub use memory::InProcessClient;
pub use rest::RestClient;
pub use rpc::RpcClient;

/// Default per-request timeout for network adapters.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Operations every protocol implementation must provide identically.
#[async_trait]
pub trait ProtocolClient: Send + Sync {
    /// Which API style this client speaks.
    fn protocol(&self) -> Protocol;

    async fn create_entity(&self, name: &str, email: &str) -> ClientResult<Entity>;

    /// Fails with `ClientError::NotFound` when the entity does not exist.
    async fn get_entity(&self, id: EntityId) -> ClientResult<Entity>;

    async fn list_items(&self, query: &ItemQuery) -> ClientResult<Vec<Item>>;

    async fn create_composite(
        &self,
        owner_id: EntityId,
        lines: &[LineRequest],
    ) -> ClientResult<Composite>;

    async fn list_owner_composites(&self, owner_id: EntityId) -> ClientResult<Vec<Composite>>;
}

/// Shared handle to a protocol client.
pub type SharedClient = Arc<dyn ProtocolClient>;

/// Build the network adapter for `protocol` pointed at `address`.
pub fn connect(protocol: Protocol, address: &str, timeout: Duration) -> ClientResult<SharedClient> {
    let client: SharedClient = match protocol {
        Protocol::Rest => Arc::new(RestClient::new(address, timeout)?),
        Protocol::Graph => Arc::new(GraphClient::new(address, timeout)?),
        Protocol::Rpc => Arc::new(RpcClient::new(address, timeout)?),
    };
    Ok(client)
}
