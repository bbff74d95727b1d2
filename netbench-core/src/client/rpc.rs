// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! gRPC adapter for the `api.ApiService` server.
//!
//! Messages are declared by hand with `prost` derives and mirror
//! `proto/api.proto`; calls go through a lazily connected tonic `Channel`
//! which reconnects on its own after a transport failure. Identifiers travel
//! as decimal strings.

use std::time::Duration;

use async_trait::async_trait;
use tonic::codec::ProstCodec;
use tonic::codegen::http::uri::PathAndQuery;
use tonic::transport::{Channel, Endpoint};
use tonic::{Code, Status};

use super::ProtocolClient;
use crate::error::{ClientError, ClientResult};
use crate::models::{Composite, CompositeLine, Entity, EntityId, Item, ItemQuery, LineRequest};
use crate::types::Protocol;

/// Fully qualified method paths.
pub mod method {
    pub const CREATE_USER: &str = "/api.ApiService/CreateUser";
    pub const GET_USER: &str = "/api.ApiService/GetUser";
    pub const GET_PRODUCTS: &str = "/api.ApiService/GetProducts";
    pub const CREATE_ORDER: &str = "/api.ApiService/CreateOrder";
    pub const GET_USER_ORDERS: &str = "/api.ApiService/GetUserOrders";
}

/// Wire messages of `api.ApiService`.
pub mod proto {
    #[derive(Clone, PartialEq, prost::Message)]
    pub struct User {
        #[prost(string, tag = "1")]
        pub id: String,
        #[prost(string, tag = "2")]
        pub name: String,
        #[prost(string, tag = "3")]
        pub email: String,
        #[prost(string, tag = "4")]
        pub created_at: String,
    }

    #[derive(Clone, PartialEq, prost::Message)]
    pub struct CreateUserRequest {
        #[prost(string, tag = "1")]
        pub name: String,
        #[prost(string, tag = "2")]
        pub email: String,
    }

    #[derive(Clone, PartialEq, prost::Message)]
    pub struct GetUserRequest {
        #[prost(string, tag = "1")]
        pub id: String,
    }

    #[derive(Clone, PartialEq, prost::Message)]
    pub struct Product {
        #[prost(string, tag = "1")]
        pub id: String,
        #[prost(string, tag = "2")]
        pub name: String,
        #[prost(double, tag = "3")]
        pub price: f64,
        #[prost(string, tag = "4")]
        pub category: String,
        #[prost(string, tag = "5")]
        pub created_at: String,
    }

    /// An empty `category` means no filter.
    #[derive(Clone, PartialEq, prost::Message)]
    pub struct GetProductsRequest {
        #[prost(string, tag = "1")]
        pub category: String,
        #[prost(int32, tag = "2")]
        pub limit: i32,
        #[prost(int32, tag = "3")]
        pub offset: i32,
    }

    #[derive(Clone, PartialEq, prost::Message)]
    pub struct ProductsResponse {
        #[prost(message, repeated, tag = "1")]
        pub products: Vec<Product>,
    }

    #[derive(Clone, PartialEq, prost::Message)]
    pub struct OrderItemRequest {
        #[prost(string, tag = "1")]
        pub product_id: String,
        #[prost(int32, tag = "2")]
        pub quantity: i32,
    }

    #[derive(Clone, PartialEq, prost::Message)]
    pub struct CreateOrderRequest {
        #[prost(string, tag = "1")]
        pub user_id: String,
        #[prost(message, repeated, tag = "2")]
        pub items: Vec<OrderItemRequest>,
    }

    #[derive(Clone, PartialEq, prost::Message)]
    pub struct OrderItem {
        #[prost(string, tag = "1")]
        pub product_id: String,
        #[prost(string, tag = "2")]
        pub product_name: String,
        #[prost(int32, tag = "3")]
        pub quantity: i32,
        #[prost(double, tag = "4")]
        pub price: f64,
    }

    #[derive(Clone, PartialEq, prost::Message)]
    pub struct Order {
        #[prost(string, tag = "1")]
        pub id: String,
        #[prost(string, tag = "2")]
        pub user_id: String,
        #[prost(double, tag = "3")]
        pub total_amount: f64,
        #[prost(string, tag = "4")]
        pub created_at: String,
        #[prost(message, repeated, tag = "5")]
        pub items: Vec<OrderItem>,
    }

    #[derive(Clone, PartialEq, prost::Message)]
    pub struct GetUserOrdersRequest {
        #[prost(string, tag = "1")]
        pub user_id: String,
    }

    #[derive(Clone, PartialEq, prost::Message)]
    pub struct OrdersResponse {
        #[prost(message, repeated, tag = "1")]
        pub orders: Vec<Order>,
    }
}

fn parse_id(field: &'static str, raw: &str) -> ClientResult<u64> {
    raw.trim().parse().map_err(|_| ClientError::Decode {
        reason: format!("{} is not a numeric identifier: {:?}", field, raw),
    })
}

fn to_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

impl TryFrom<proto::User> for Entity {
    type Error = ClientError;

    fn try_from(user: proto::User) -> ClientResult<Self> {
        Ok(Self {
            id: parse_id("user.id", &user.id)?,
            name: user.name,
            email: user.email,
            created_at: user.created_at,
        })
    }
}

impl TryFrom<proto::Product> for Item {
    type Error = ClientError;

    fn try_from(product: proto::Product) -> ClientResult<Self> {
        Ok(Self {
            id: parse_id("product.id", &product.id)?,
            name: product.name,
            price: product.price,
            category: product.category,
            created_at: product.created_at,
        })
    }
}

impl TryFrom<proto::OrderItem> for CompositeLine {
    type Error = ClientError;

    fn try_from(line: proto::OrderItem) -> ClientResult<Self> {
        Ok(Self {
            item_id: parse_id("item.product_id", &line.product_id)?,
            item_name: line.product_name,
            quantity: u32::try_from(line.quantity).unwrap_or(0),
            price: line.price,
        })
    }
}

impl TryFrom<proto::Order> for Composite {
    type Error = ClientError;

    fn try_from(order: proto::Order) -> ClientResult<Self> {
        let owner_id = if order.user_id.is_empty() {
            0
        } else {
            parse_id("order.user_id", &order.user_id)?
        };
        Ok(Self {
            id: parse_id("order.id", &order.id)?,
            owner_id,
            total_amount: order.total_amount,
            created_at: order.created_at,
            lines: order
                .items
                .into_iter()
                .map(CompositeLine::try_from)
                .collect::<ClientResult<_>>()?,
        })
    }
}

impl From<&ItemQuery> for proto::GetProductsRequest {
    fn from(query: &ItemQuery) -> Self {
        Self {
            category: query.category.clone().unwrap_or_default(),
            limit: to_i32(query.limit),
            offset: to_i32(query.offset),
        }
    }
}

impl From<&LineRequest> for proto::OrderItemRequest {
    fn from(line: &LineRequest) -> Self {
        Self {
            product_id: line.item_id.to_string(),
            quantity: to_i32(line.quantity),
        }
    }
}

/// Classify a failed call.
fn status_error(status: Status) -> ClientError {
    match status.code() {
        Code::Unavailable | Code::DeadlineExceeded | Code::Cancelled => ClientError::Transport {
            reason: status.message().to_string(),
        },
        Code::DataLoss => ClientError::Codec {
            reason: status.message().to_string(),
        },
        Code::Internal if status.message().starts_with("failed to decode") => ClientError::Codec {
            reason: status.message().to_string(),
        },
        _ => ClientError::Remote {
            message: status.message().to_string(),
        },
    }
}

/// The server reports a missing user either as `NOT_FOUND` or as a plain
/// error whose message says so.
fn is_not_found(status: &Status) -> bool {
    status.code() == Code::NotFound || status.message().to_ascii_lowercase().contains("not found")
}

/// gRPC client for `api.ApiService`.
#[derive(Debug, Clone)]
pub struct RpcClient {
    channel: Channel,
}

impl RpcClient {
    /// `address` is `host:port` (e.g. `network-proxy:8051`) or a full
    /// `http://` URI. No connection is made until the first call.
    pub fn new(address: &str, timeout: Duration) -> ClientResult<Self> {
        let uri = if address.contains("://") {
            address.to_string()
        } else {
            format!("http://{}", address)
        };

        let endpoint = Endpoint::from_shared(uri)
            .map_err(|e| ClientError::Transport {
                reason: format!("invalid RPC address {}: {}", address, e),
            })?
            .timeout(timeout)
            .connect_timeout(timeout)
            .tcp_nodelay(true);

        Ok(Self {
            channel: endpoint.connect_lazy(),
        })
    }

    async fn unary<Req, Resp>(&self, path: &'static str, request: Req) -> Result<Resp, Status>
    where
        Req: prost::Message + Send + Sync + 'static,
        Resp: prost::Message + Default + Send + Sync + 'static,
    {
        let mut grpc = tonic::client::Grpc::new(self.channel.clone());
        grpc.ready()
            .await
            .map_err(|e| Status::unavailable(format!("channel not ready: {}", e)))?;

        let response = grpc
            .unary(
                tonic::Request::new(request),
                PathAndQuery::from_static(path),
                ProstCodec::default(),
            )
            .await?;
        Ok(response.into_inner())
    }
}

#[async_trait]
impl ProtocolClient for RpcClient {
    fn protocol(&self) -> Protocol {
        Protocol::Rpc
    }

    async fn create_entity(&self, name: &str, email: &str) -> ClientResult<Entity> {
        let request = proto::CreateUserRequest {
            name: name.to_string(),
            email: email.to_string(),
        };
        let user: proto::User = self
            .unary(method::CREATE_USER, request)
            .await
            .map_err(status_error)?;
        Entity::try_from(user)
    }

    async fn get_entity(&self, id: EntityId) -> ClientResult<Entity> {
        let request = proto::GetUserRequest { id: id.to_string() };
        match self.unary::<_, proto::User>(method::GET_USER, request).await {
            Ok(user) => Entity::try_from(user),
            Err(status) if is_not_found(&status) => Err(ClientError::NotFound {
                resource: "entity",
                id,
            }),
            Err(status) => Err(status_error(status)),
        }
    }

    async fn list_items(&self, query: &ItemQuery) -> ClientResult<Vec<Item>> {
        let response: proto::ProductsResponse = self
            .unary(method::GET_PRODUCTS, proto::GetProductsRequest::from(query))
            .await
            .map_err(status_error)?;
        response.products.into_iter().map(Item::try_from).collect()
    }

    async fn create_composite(
        &self,
        owner_id: EntityId,
        lines: &[LineRequest],
    ) -> ClientResult<Composite> {
        let request = proto::CreateOrderRequest {
            user_id: owner_id.to_string(),
            items: lines.iter().map(proto::OrderItemRequest::from).collect(),
        };
        let order: proto::Order = self
            .unary(method::CREATE_ORDER, request)
            .await
            .map_err(status_error)?;
        Composite::try_from(order)
    }

    async fn list_owner_composites(&self, owner_id: EntityId) -> ClientResult<Vec<Composite>> {
        let request = proto::GetUserOrdersRequest {
            user_id: owner_id.to_string(),
        };
        let response: proto::OrdersResponse = self
            .unary(method::GET_USER_ORDERS, request)
            .await
            .map_err(status_error)?;
        response
            .orders
            .into_iter()
            .map(|order| {
                let mut composite = Composite::try_from(order)?;
                if composite.owner_id == 0 {
                    composite.owner_id = owner_id;
                }
                Ok(composite)
            })
            .collect()
    }
}
