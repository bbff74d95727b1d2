// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Fault injection through a network-emulation control plane.
//!
//! Each protocol server sits behind a named proxy. A network profile is
//! realised as an ordered set of effects (latency, bandwidth cap, slicing)
//! attached to every proxy. Profiles are always applied clear-then-install,
//! so a proxy never carries effects from two profiles at once.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::catalog::ConditionCatalog;
use crate::error::{FaultInjectionError, NetBenchResult};
use crate::types::{NetworkProfile, ProxyEndpoint, ProxyName};

pub mod memory;
pub mod toxiproxy;

pub use memory::InMemoryControlPlane;
pub use toxiproxy::ToxiproxyClient;

/// Mean slice size, in bytes, of the loss-approximating effect.
pub const SLICE_AVERAGE_SIZE: u64 = 1024;
/// Slice size variation, in bytes, of the loss-approximating effect.
pub const SLICE_SIZE_VARIATION: u64 = 512;

/// Kind of a fault effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    Latency,
    Bandwidth,
    /// Traffic slicing with inter-slice delay; stands in for packet loss.
    Slicer,
    #[serde(other)]
    Other,
}

/// One fault effect ("toxic") attached to a proxy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EffectKind,
    #[serde(default = "default_stream")]
    pub stream: String,
    #[serde(default = "default_toxicity")]
    pub toxicity: f32,
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

fn default_stream() -> String {
    "downstream".to_string()
}

fn default_toxicity() -> f32 {
    1.0
}

impl Effect {
    fn new(name: String, kind: EffectKind, attributes: Map<String, Value>) -> Self {
        Self {
            name,
            kind,
            stream: default_stream(),
            toxicity: default_toxicity(),
            attributes,
        }
    }

    pub fn latency(proxy: &ProxyName, latency_ms: u64, jitter_ms: u64) -> Self {
        let mut attributes = Map::new();
        attributes.insert("latency".into(), latency_ms.into());
        attributes.insert("jitter".into(), jitter_ms.into());
        Self::new(format!("{}_latency", proxy), EffectKind::Latency, attributes)
    }

    pub fn bandwidth(proxy: &ProxyName, rate: u64) -> Self {
        let mut attributes = Map::new();
        attributes.insert("rate".into(), rate.into());
        Self::new(format!("{}_bandwidth", proxy), EffectKind::Bandwidth, attributes)
    }

    pub fn slicer(proxy: &ProxyName, delay: u64) -> Self {
        let mut attributes = Map::new();
        attributes.insert("average_size".into(), SLICE_AVERAGE_SIZE.into());
        attributes.insert("size_variation".into(), SLICE_SIZE_VARIATION.into());
        attributes.insert("delay".into(), delay.into());
        Self::new(format!("{}_slicer", proxy), EffectKind::Slicer, attributes)
    }

    /// Read a numeric attribute.
    pub fn attribute(&self, key: &str) -> Option<u64> {
        self.attributes.get(key).and_then(Value::as_u64)
    }
}

/// The effects realising `profile` on `proxy`, in installation order.
pub fn plan_effects(proxy: &ProxyName, profile: &NetworkProfile) -> Vec<Effect> {
    let mut effects = Vec::with_capacity(3);

    if profile.latency_ms > 0 {
        effects.push(Effect::latency(proxy, profile.latency_ms, profile.jitter_ms));
    }

    if let Some(rate) = profile.rate_bytes_per_sec() {
        effects.push(Effect::bandwidth(proxy, rate));
    }

    if profile.packet_loss_percent > 0.0 {
        effects.push(Effect::slicer(proxy, profile.slice_delay()));
    }

    effects
}

/// A proxy as reported by the control plane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProxyStatus {
    pub name: String,
    pub listen: String,
    pub upstream: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub toxics: Vec<Effect>,
}

fn default_enabled() -> bool {
    true
}

/// Administrative API of the network-emulation layer.
#[async_trait]
pub trait ControlPlane: Send + Sync {
    /// Returns `FaultInjectionError::Conflict` when the proxy already exists.
    async fn create_proxy(&self, endpoint: &ProxyEndpoint) -> Result<(), FaultInjectionError>;

    async fn list_proxies(&self) -> Result<Vec<ProxyStatus>, FaultInjectionError>;

    async fn delete_proxy(&self, proxy: &ProxyName) -> Result<(), FaultInjectionError>;

    async fn list_effects(&self, proxy: &ProxyName) -> Result<Vec<Effect>, FaultInjectionError>;

    async fn create_effect(
        &self,
        proxy: &ProxyName,
        effect: &Effect,
    ) -> Result<(), FaultInjectionError>;

    async fn delete_effect(&self, proxy: &ProxyName, effect: &str)
        -> Result<(), FaultInjectionError>;
}

/// Programs and clears network profiles on the registered proxies.
pub struct FaultInjectionController {
    control_plane: Arc<dyn ControlPlane>,
    catalog: ConditionCatalog,
    proxies: Vec<ProxyEndpoint>,
}

impl FaultInjectionController {
    pub fn new(control_plane: Arc<dyn ControlPlane>, catalog: ConditionCatalog) -> Self {
        Self {
            control_plane,
            catalog,
            proxies: Vec::new(),
        }
    }

    /// Track proxies that already exist on the control plane without creating them.
    pub fn with_proxies(mut self, proxies: impl IntoIterator<Item = ProxyEndpoint>) -> Self {
        for endpoint in proxies {
            self.track(endpoint);
        }
        self
    }

    fn track(&mut self, endpoint: ProxyEndpoint) {
        if !self.proxies.iter().any(|p| p.name == endpoint.name) {
            self.proxies.push(endpoint);
        }
    }

    /// Registered proxies in registration order.
    pub fn proxies(&self) -> &[ProxyEndpoint] {
        &self.proxies
    }

    pub fn catalog(&self) -> &ConditionCatalog {
        &self.catalog
    }

    pub fn control_plane(&self) -> &Arc<dyn ControlPlane> {
        &self.control_plane
    }

    /// Create the proxy if needed. An existing proxy counts as success.
    pub async fn register_proxy(
        &mut self,
        endpoint: ProxyEndpoint,
    ) -> Result<(), FaultInjectionError> {
        match self.control_plane.create_proxy(&endpoint).await {
            Ok(()) => {
                tracing::info!(
                    proxy = %endpoint.name,
                    listen = %endpoint.listen,
                    upstream = %endpoint.upstream,
                    "Created proxy"
                );
            }
            Err(FaultInjectionError::Conflict { .. }) => {
                tracing::info!(proxy = %endpoint.name, "Proxy already exists");
            }
            Err(e) => return Err(e),
        }
        self.track(endpoint);
        Ok(())
    }

    /// Remove every active effect on a proxy.
    ///
    /// Best-effort: failures are logged and swallowed since a clear is always
    /// followed by a fresh application.
    pub async fn clear_effects(&self, proxy: &ProxyName) {
        let effects = match self.control_plane.list_effects(proxy).await {
            Ok(effects) => effects,
            Err(e) => {
                tracing::warn!(proxy = %proxy, error = %e, "Failed to list effects");
                return;
            }
        };

        for effect in effects {
            if let Err(e) = self.control_plane.delete_effect(proxy, &effect.name).await {
                tracing::warn!(
                    proxy = %proxy,
                    effect = %effect.name,
                    error = %e,
                    "Failed to delete effect"
                );
            }
        }
    }

    /// Replace whatever is active on `proxy` with the effects of `profile`.
    pub async fn apply_profile(
        &self,
        proxy: &ProxyName,
        profile: &NetworkProfile,
    ) -> Result<(), FaultInjectionError> {
        self.clear_effects(proxy).await;

        for effect in plan_effects(proxy, profile) {
            self.control_plane
                .create_effect(proxy, &effect)
                .await
                .map_err(|e| match e {
                    // A surviving effect means the clear did not take.
                    FaultInjectionError::Conflict { .. } => FaultInjectionError::Failure {
                        proxy: proxy.to_string(),
                        reason: format!("effect {} is still active", effect.name),
                    },
                    other => other,
                })?;
            tracing::debug!(proxy = %proxy, effect = %effect.name, "Installed effect");
        }

        tracing::info!(proxy = %proxy, profile = %profile.name, "Applied network profile");
        Ok(())
    }

    /// Resolve `name` in the catalog and apply it to every registered proxy.
    pub async fn apply_to_all(&self, name: &str) -> NetBenchResult<NetworkProfile> {
        let profile = self.catalog.lookup(name)?.clone();

        tracing::info!(
            condition = %profile.name,
            latency_ms = profile.latency_ms,
            jitter_ms = profile.jitter_ms,
            bandwidth_mbps = profile.bandwidth_mbps,
            packet_loss_percent = profile.packet_loss_percent,
            "Applying network condition"
        );

        for endpoint in &self.proxies {
            self.apply_profile(&endpoint.name, &profile).await?;
        }
        Ok(profile)
    }

    /// Clear all effects on every registered proxy.
    pub async fn reset_all(&self) {
        for endpoint in &self.proxies {
            self.clear_effects(&endpoint.name).await;
        }
        tracing::info!(proxies = self.proxies.len(), "Reset all network conditions");
    }
}
