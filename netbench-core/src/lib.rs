// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Netbench Core Library
//!
//! Building blocks for comparing three API styles under simulated network
//! conditions: the condition catalog, the fault-injection controller that
//! programs the network-emulation proxies, the protocol-client contract and
//! its adapters, the in-memory record store, and configuration parsing.

pub mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod fault;
pub mod models;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use catalog::ConditionCatalog;
pub use client::{ProtocolClient, SharedClient};
pub use config::{BenchmarkConfig, Config, ConfigLoader, ControlPlaneConfig, ProtocolTarget};
pub use error::{
    ClientError, ClientResult, FaultInjectionError, HardValidationError, NetBenchError,
    NetBenchResult,
};
pub use fault::{ControlPlane, Effect, EffectKind, FaultInjectionController};
pub use models::{Composite, CompositeLine, Entity, EntityId, Item, ItemQuery, LineRequest};
pub use store::RecordStore;
pub use types::{NetworkProfile, Protocol, ProxyEndpoint, ProxyName};
