// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! In-memory control plane for dry runs and tests.

use async_trait::async_trait;
use dashmap::{DashMap, DashSet};

use super::{ControlPlane, Effect, ProxyStatus};
use crate::error::FaultInjectionError;
use crate::types::{ProxyEndpoint, ProxyName};

/// Control plane that keeps proxies and effects in concurrent maps.
///
/// Proxies can be marked as failing so callers can exercise error paths.
#[derive(Debug, Default)]
pub struct InMemoryControlPlane {
    proxies: DashMap<String, ProxyStatus>,
    failing: DashSet<String>,
}

impl InMemoryControlPlane {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent request naming `proxy` fail.
    pub fn fail_proxy(&self, proxy: &str) {
        self.failing.insert(proxy.to_string());
    }

    pub fn recover_proxy(&self, proxy: &str) {
        self.failing.remove(proxy);
    }

    fn guard(&self, proxy: &str) -> Result<(), FaultInjectionError> {
        if self.failing.contains(proxy) {
            return Err(FaultInjectionError::Failure {
                proxy: proxy.to_string(),
                reason: "injected failure".to_string(),
            });
        }
        Ok(())
    }

    fn missing(proxy: &str) -> FaultInjectionError {
        FaultInjectionError::Failure {
            proxy: proxy.to_string(),
            reason: "proxy not found".to_string(),
        }
    }
}

#[async_trait]
impl ControlPlane for InMemoryControlPlane {
    async fn create_proxy(&self, endpoint: &ProxyEndpoint) -> Result<(), FaultInjectionError> {
        let name = endpoint.name.as_str();
        self.guard(name)?;

        if self.proxies.contains_key(name) {
            return Err(FaultInjectionError::Conflict {
                proxy: name.to_string(),
            });
        }
        self.proxies.insert(
            name.to_string(),
            ProxyStatus {
                name: name.to_string(),
                listen: endpoint.listen.clone(),
                upstream: endpoint.upstream.clone(),
                enabled: true,
                toxics: Vec::new(),
            },
        );
        Ok(())
    }

    async fn list_proxies(&self) -> Result<Vec<ProxyStatus>, FaultInjectionError> {
        let mut proxies: Vec<ProxyStatus> =
            self.proxies.iter().map(|entry| entry.value().clone()).collect();
        proxies.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(proxies)
    }

    async fn delete_proxy(&self, proxy: &ProxyName) -> Result<(), FaultInjectionError> {
        self.guard(proxy.as_str())?;
        self.proxies
            .remove(proxy.as_str())
            .map(|_| ())
            .ok_or_else(|| Self::missing(proxy.as_str()))
    }

    async fn list_effects(&self, proxy: &ProxyName) -> Result<Vec<Effect>, FaultInjectionError> {
        self.guard(proxy.as_str())?;
        self.proxies
            .get(proxy.as_str())
            .map(|entry| entry.toxics.clone())
            .ok_or_else(|| Self::missing(proxy.as_str()))
    }

    async fn create_effect(
        &self,
        proxy: &ProxyName,
        effect: &Effect,
    ) -> Result<(), FaultInjectionError> {
        self.guard(proxy.as_str())?;
        let mut entry = self
            .proxies
            .get_mut(proxy.as_str())
            .ok_or_else(|| Self::missing(proxy.as_str()))?;

        if entry.toxics.iter().any(|t| t.name == effect.name) {
            return Err(FaultInjectionError::Conflict {
                proxy: proxy.to_string(),
            });
        }
        entry.toxics.push(effect.clone());
        Ok(())
    }

    async fn delete_effect(
        &self,
        proxy: &ProxyName,
        effect: &str,
    ) -> Result<(), FaultInjectionError> {
        self.guard(proxy.as_str())?;
        let mut entry = self
            .proxies
            .get_mut(proxy.as_str())
            .ok_or_else(|| Self::missing(proxy.as_str()))?;

        let before = entry.toxics.len();
        entry.toxics.retain(|t| t.name != effect);
        if entry.toxics.len() == before {
            return Err(FaultInjectionError::Failure {
                proxy: proxy.to_string(),
                reason: format!("effect {} not found", effect),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint() -> ProxyEndpoint {
        ProxyEndpoint::new("rest_proxy", "0.0.0.0:8001", "rest-api:3001").unwrap()
    }

    #[tokio::test]
    async fn test_duplicate_proxy_conflicts() {
        let plane = InMemoryControlPlane::new();
        plane.create_proxy(&endpoint()).await.unwrap();
        let err = plane.create_proxy(&endpoint()).await.unwrap_err();
        assert!(matches!(err, FaultInjectionError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_effect_lifecycle() {
        let plane = InMemoryControlPlane::new();
        plane.create_proxy(&endpoint()).await.unwrap();
        let name = endpoint().name;

        let effect = Effect::latency(&name, 100, 20);
        plane.create_effect(&name, &effect).await.unwrap();
        assert!(matches!(
            plane.create_effect(&name, &effect).await,
            Err(FaultInjectionError::Conflict { .. })
        ));

        assert_eq!(plane.list_effects(&name).await.unwrap(), vec![effect.clone()]);
        plane.delete_effect(&name, &effect.name).await.unwrap();
        assert!(plane.list_effects(&name).await.unwrap().is_empty());
        assert!(plane.delete_effect(&name, &effect.name).await.is_err());
    }

    #[tokio::test]
    async fn test_injected_failure_and_recovery() {
        let plane = InMemoryControlPlane::new();
        plane.fail_proxy("rest_proxy");
        assert!(plane.create_proxy(&endpoint()).await.is_err());

        plane.recover_proxy("rest_proxy");
        plane.create_proxy(&endpoint()).await.unwrap();

        plane.delete_proxy(&endpoint().name).await.unwrap();
        assert!(plane.list_proxies().await.unwrap().is_empty());
    }
}
