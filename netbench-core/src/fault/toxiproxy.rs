// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! HTTP client for a Toxiproxy-compatible control plane.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde_json::json;

use super::{ControlPlane, Effect, ProxyStatus};
use crate::error::FaultInjectionError;
use crate::types::{ProxyEndpoint, ProxyName};

/// Default control plane address inside the benchmark network.
pub const DEFAULT_CONTROL_PLANE_URL: &str = "http://network-proxy:8474";

/// Default timeout for control plane requests.
pub const DEFAULT_CONTROL_PLANE_TIMEOUT: Duration = Duration::from_millis(5000);

pub struct ToxiproxyClient {
    base_url: String,
    http: Client,
}

impl ToxiproxyClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FaultInjectionError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FaultInjectionError::ControlPlane {
                reason: e.to_string(),
            })?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn transport(proxy: &str, err: reqwest::Error) -> FaultInjectionError {
    FaultInjectionError::Failure {
        proxy: proxy.to_string(),
        reason: err.to_string(),
    }
}

/// Map a non-success response onto the error taxonomy.
async fn check(proxy: &str, response: Response) -> Result<Response, FaultInjectionError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::CONFLICT {
        return Err(FaultInjectionError::Conflict {
            proxy: proxy.to_string(),
        });
    }

    let body = response.text().await.unwrap_or_default();
    Err(FaultInjectionError::Failure {
        proxy: proxy.to_string(),
        reason: format!("status {}: {}", status.as_u16(), body.trim()),
    })
}

#[async_trait]
impl ControlPlane for ToxiproxyClient {
    async fn create_proxy(&self, endpoint: &ProxyEndpoint) -> Result<(), FaultInjectionError> {
        let proxy = endpoint.name.as_str();
        let response = self
            .http
            .post(self.url("/proxies"))
            .json(&json!({
                "name": proxy,
                "listen": endpoint.listen,
                "upstream": endpoint.upstream,
                "enabled": true,
            }))
            .send()
            .await
            .map_err(|e| transport(proxy, e))?;

        check(proxy, response).await?;
        Ok(())
    }

    async fn list_proxies(&self) -> Result<Vec<ProxyStatus>, FaultInjectionError> {
        let response = self
            .http
            .get(self.url("/proxies"))
            .send()
            .await
            .map_err(|e| FaultInjectionError::ControlPlane {
                reason: e.to_string(),
            })?;

        let response = check("*", response).await?;
        let by_name: HashMap<String, ProxyStatus> =
            response
                .json()
                .await
                .map_err(|e| FaultInjectionError::ControlPlane {
                    reason: e.to_string(),
                })?;

        let mut proxies: Vec<ProxyStatus> = by_name.into_values().collect();
        proxies.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(proxies)
    }

    async fn delete_proxy(&self, proxy: &ProxyName) -> Result<(), FaultInjectionError> {
        let response = self
            .http
            .delete(self.url(&format!("/proxies/{}", proxy)))
            .send()
            .await
            .map_err(|e| transport(proxy.as_str(), e))?;

        check(proxy.as_str(), response).await?;
        Ok(())
    }

    async fn list_effects(&self, proxy: &ProxyName) -> Result<Vec<Effect>, FaultInjectionError> {
        let response = self
            .http
            .get(self.url(&format!("/proxies/{}/toxics", proxy)))
            .send()
            .await
            .map_err(|e| transport(proxy.as_str(), e))?;

        let response = check(proxy.as_str(), response).await?;
        response
            .json()
            .await
            .map_err(|e| transport(proxy.as_str(), e))
    }

    async fn create_effect(
        &self,
        proxy: &ProxyName,
        effect: &Effect,
    ) -> Result<(), FaultInjectionError> {
        let response = self
            .http
            .post(self.url(&format!("/proxies/{}/toxics", proxy)))
            .json(effect)
            .send()
            .await
            .map_err(|e| transport(proxy.as_str(), e))?;

        check(proxy.as_str(), response).await?;
        Ok(())
    }

    async fn delete_effect(
        &self,
        proxy: &ProxyName,
        effect: &str,
    ) -> Result<(), FaultInjectionError> {
        let response = self
            .http
            .delete(self.url(&format!("/proxies/{}/toxics/{}", proxy, effect)))
            .send()
            .await
            .map_err(|e| transport(proxy.as_str(), e))?;

        check(proxy.as_str(), response).await?;
        Ok(())
    }
}
