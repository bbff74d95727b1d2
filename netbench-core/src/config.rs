// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! YAML configuration parser with strict schema validation.
//!
//! Every key is optional; an absent file yields the built-in defaults that
//! match the containerised benchmark environment. Invalid values are
//! rejected with a `HardValidationError` before any network call is made.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{HardValidationError, NetBenchError, NetBenchResult};
use crate::fault::toxiproxy::DEFAULT_CONTROL_PLANE_URL;
use crate::models::ItemQuery;
use crate::types::{Protocol, ProxyEndpoint};

/// Config file looked up when none is named explicitly.
pub const DEFAULT_CONFIG_PATH: &str = "netbench.yaml";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawControlPlane {
    #[serde(default = "default_control_plane_url")]
    url: String,
    #[serde(default = "default_control_plane_timeout_ms")]
    timeout_ms: u64,
}

fn default_control_plane_url() -> String {
    DEFAULT_CONTROL_PLANE_URL.to_string()
}

fn default_control_plane_timeout_ms() -> u64 {
    5000
}

impl Default for RawControlPlane {
    fn default() -> Self {
        Self {
            url: default_control_plane_url(),
            timeout_ms: default_control_plane_timeout_ms(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawProxy {
    name: String,
    listen: String,
    upstream: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawProtocolTarget {
    protocol: String,
    address: String,
    proxy: RawProxy,
}

fn default_protocols() -> Vec<RawProtocolTarget> {
    let target = |protocol: &str, address: &str, name: &str, listen: &str, upstream: &str| {
        RawProtocolTarget {
            protocol: protocol.to_string(),
            address: address.to_string(),
            proxy: RawProxy {
                name: name.to_string(),
                listen: listen.to_string(),
                upstream: upstream.to_string(),
            },
        }
    };

    vec![
        target(
            "rest",
            "http://network-proxy:8001",
            "rest_proxy",
            "0.0.0.0:8001",
            "rest-api:3001",
        ),
        target(
            "graphql",
            "http://network-proxy:8002/graphql",
            "graphql_proxy",
            "0.0.0.0:8002",
            "graphql-api:3002",
        ),
        target(
            "rpc",
            "network-proxy:8051",
            "grpc_proxy",
            "0.0.0.0:8051",
            "grpc-api:50051",
        ),
    ]
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawBenchmark {
    #[serde(default = "default_iterations")]
    iterations: u32,
    #[serde(default = "default_penalty_ms")]
    penalty_ms: u64,
    #[serde(default)]
    iteration_pause_ms: u64,
    #[serde(default = "default_settle_ms")]
    settle_ms: u64,
    #[serde(default = "default_suite_pause_ms")]
    suite_pause_ms: u64,
    #[serde(default = "default_readiness_attempts")]
    readiness_attempts: u32,
    #[serde(default = "default_readiness_delay_ms")]
    readiness_delay_ms: u64,
    #[serde(default = "default_list_limit")]
    list_limit: u32,
    #[serde(default)]
    list_category: Option<String>,
    #[serde(default = "default_report_path")]
    report_path: String,
    #[serde(default)]
    conditions: Option<Vec<String>>,
}

fn default_iterations() -> u32 {
    10
}

fn default_penalty_ms() -> u64 {
    5000
}

fn default_settle_ms() -> u64 {
    2000
}

fn default_suite_pause_ms() -> u64 {
    1000
}

fn default_readiness_attempts() -> u32 {
    30
}

fn default_readiness_delay_ms() -> u64 {
    2000
}

fn default_list_limit() -> u32 {
    5
}

fn default_report_path() -> String {
    "results/network-performance-report.json".to_string()
}

impl Default for RawBenchmark {
    fn default() -> Self {
        Self {
            iterations: default_iterations(),
            penalty_ms: default_penalty_ms(),
            iteration_pause_ms: 0,
            settle_ms: default_settle_ms(),
            suite_pause_ms: default_suite_pause_ms(),
            readiness_attempts: default_readiness_attempts(),
            readiness_delay_ms: default_readiness_delay_ms(),
            list_limit: default_list_limit(),
            list_category: None,
            report_path: default_report_path(),
            conditions: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    control_plane: RawControlPlane,
    #[serde(default = "default_protocols")]
    protocols: Vec<RawProtocolTarget>,
    #[serde(default)]
    benchmark: RawBenchmark,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            control_plane: RawControlPlane::default(),
            protocols: default_protocols(),
            benchmark: RawBenchmark::default(),
        }
    }
}

/// Validated control plane settings.
#[derive(Debug, Clone)]
pub struct ControlPlaneConfig {
    pub url: String,
    pub timeout: Duration,
}

/// One protocol under test and the proxy in front of it.
#[derive(Debug, Clone)]
pub struct ProtocolTarget {
    pub protocol: Protocol,
    /// Client-facing address (through the proxy).
    pub address: String,
    pub proxy: ProxyEndpoint,
}

/// Validated benchmark settings.
#[derive(Debug, Clone)]
pub struct BenchmarkConfig {
    pub iterations: u32,
    /// Duration recorded for a failed operation.
    pub penalty: Duration,
    pub iteration_pause: Duration,
    /// Wait after applying a condition before measuring.
    pub settle: Duration,
    /// Wait between condition suites.
    pub suite_pause: Duration,
    pub readiness_attempts: u32,
    pub readiness_delay: Duration,
    pub list_query: ItemQuery,
    pub report_path: PathBuf,
    /// Explicit condition order; `None` runs the whole catalog.
    pub conditions: Option<Vec<String>>,
}

/// Complete validated configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub control_plane: ControlPlaneConfig,
    pub protocols: Vec<ProtocolTarget>,
    pub benchmark: BenchmarkConfig,
}

impl Config {
    /// Proxy endpoints in protocol declaration order.
    pub fn proxies(&self) -> Vec<ProxyEndpoint> {
        self.protocols.iter().map(|t| t.proxy.clone()).collect()
    }
}

/// Configuration loader with strict validation.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Built-in configuration used when no file is present.
    pub fn defaults() -> NetBenchResult<Config> {
        Self::validate(RawConfig::default())
    }

    /// Load and validate configuration from a YAML file.
    pub fn load_file(path: impl AsRef<Path>) -> NetBenchResult<Config> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(NetBenchError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| NetBenchError::Io {
            context: "reading config file",
            source: e,
        })?;

        Self::load_string(&content)
    }

    /// Load an explicitly named file, or the default file if it exists,
    /// falling back to built-in defaults.
    pub fn load_or_default(path: Option<&Path>) -> NetBenchResult<Config> {
        match path {
            Some(path) => Self::load_file(path),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_PATH);
                if default_path.exists() {
                    Self::load_file(default_path)
                } else {
                    Self::defaults()
                }
            }
        }
    }

    /// Load and validate configuration from a YAML string.
    pub fn load_string(content: &str) -> NetBenchResult<Config> {
        // An empty document is a valid "all defaults" config.
        if content.trim().is_empty() {
            return Self::defaults();
        }

        let raw: RawConfig =
            serde_yaml::from_str(content).map_err(|e| NetBenchError::ConfigParse {
                message: format!("YAML parse error: {}", e),
            })?;

        Self::validate(raw)
    }

    fn validate(raw: RawConfig) -> NetBenchResult<Config> {
        let control_plane = Self::validate_control_plane(raw.control_plane)?;
        let benchmark = Self::validate_benchmark(raw.benchmark)?;

        if raw.protocols.is_empty() {
            return Err(HardValidationError::MissingRequiredField {
                field: "protocols",
                context: "configuration root".to_string(),
            }
            .into());
        }

        let mut protocols = Vec::with_capacity(raw.protocols.len());
        let mut seen_protocols = HashSet::new();
        let mut seen_proxies = HashSet::new();

        for (index, raw_target) in raw.protocols.into_iter().enumerate() {
            let target = Self::validate_target(raw_target, index)?;

            if !seen_protocols.insert(target.protocol) {
                return Err(HardValidationError::DuplicateProtocol {
                    protocol: target.protocol,
                }
                .into());
            }

            if !seen_proxies.insert(target.proxy.name.clone()) {
                return Err(HardValidationError::DuplicateProxyName {
                    name: target.proxy.name.to_string(),
                }
                .into());
            }

            protocols.push(target);
        }

        // Declaration order in the file is irrelevant; reports use protocol order.
        protocols.sort_by_key(|t| t.protocol);

        Ok(Config {
            control_plane,
            protocols,
            benchmark,
        })
    }

    fn validate_control_plane(raw: RawControlPlane) -> NetBenchResult<ControlPlaneConfig> {
        if raw.url.trim().is_empty() {
            return Err(HardValidationError::MissingRequiredField {
                field: "url",
                context: "control_plane".to_string(),
            }
            .into());
        }

        if raw.timeout_ms == 0 {
            return Err(HardValidationError::InvalidFieldValue {
                field: "timeout_ms",
                value: raw.timeout_ms.to_string(),
                reason: "Control plane timeout must be positive".to_string(),
            }
            .into());
        }

        Ok(ControlPlaneConfig {
            url: raw.url,
            timeout: Duration::from_millis(raw.timeout_ms),
        })
    }

    fn validate_target(raw: RawProtocolTarget, index: usize) -> NetBenchResult<ProtocolTarget> {
        let protocol: Protocol = raw.protocol.parse()?;

        if raw.address.trim().is_empty() {
            return Err(HardValidationError::MissingRequiredField {
                field: "address",
                context: format!("protocol at index {}", index),
            }
            .into());
        }

        let proxy = ProxyEndpoint::new(&raw.proxy.name, raw.proxy.listen, raw.proxy.upstream)?;

        Ok(ProtocolTarget {
            protocol,
            address: raw.address,
            proxy,
        })
    }

    fn validate_benchmark(raw: RawBenchmark) -> NetBenchResult<BenchmarkConfig> {
        if raw.iterations == 0 {
            return Err(HardValidationError::InvalidFieldValue {
                field: "iterations",
                value: raw.iterations.to_string(),
                reason: "At least one iteration is required".to_string(),
            }
            .into());
        }

        if raw.readiness_attempts == 0 {
            return Err(HardValidationError::InvalidFieldValue {
                field: "readiness_attempts",
                value: raw.readiness_attempts.to_string(),
                reason: "At least one readiness attempt is required".to_string(),
            }
            .into());
        }

        if raw.list_limit == 0 {
            return Err(HardValidationError::InvalidFieldValue {
                field: "list_limit",
                value: raw.list_limit.to_string(),
                reason: "List limit must be positive".to_string(),
            }
            .into());
        }

        if raw.report_path.trim().is_empty() {
            return Err(HardValidationError::MissingRequiredField {
                field: "report_path",
                context: "benchmark".to_string(),
            }
            .into());
        }

        if let Some(conditions) = &raw.conditions {
            if conditions.is_empty() {
                return Err(HardValidationError::InvalidFieldValue {
                    field: "conditions",
                    value: "[]".to_string(),
                    reason: "Omit the key to run every condition".to_string(),
                }
                .into());
            }
        }

        let mut list_query = ItemQuery::new(raw.list_limit);
        if let Some(category) = raw.list_category {
            list_query = list_query.category(category);
        }

        Ok(BenchmarkConfig {
            iterations: raw.iterations,
            penalty: Duration::from_millis(raw.penalty_ms),
            iteration_pause: Duration::from_millis(raw.iteration_pause_ms),
            settle: Duration::from_millis(raw.settle_ms),
            suite_pause: Duration::from_millis(raw.suite_pause_ms),
            readiness_attempts: raw.readiness_attempts,
            readiness_delay: Duration::from_millis(raw.readiness_delay_ms),
            list_query,
            report_path: PathBuf::from(raw.report_path),
            conditions: raw.conditions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ConfigLoader::defaults().unwrap();
        assert_eq!(config.control_plane.url, "http://network-proxy:8474");
        assert_eq!(config.control_plane.timeout, Duration::from_millis(5000));
        assert_eq!(config.protocols.len(), 3);
        assert_eq!(config.protocols[1].address, "http://network-proxy:8002/graphql");
        assert_eq!(config.protocols[2].proxy.upstream, "grpc-api:50051");
        assert_eq!(config.benchmark.iterations, 10);
        assert_eq!(config.benchmark.penalty, Duration::from_millis(5000));
        assert_eq!(config.benchmark.readiness_attempts, 30);
        assert_eq!(config.benchmark.list_query.limit, 5);
        assert!(config.benchmark.conditions.is_none());
    }

    #[test]
    fn test_empty_document_is_defaults() {
        let config = ConfigLoader::load_string("  \n").unwrap();
        assert_eq!(config.protocols.len(), 3);
    }

    #[test]
    fn test_partial_override() {
        let yaml = r#"
control_plane:
  url: http://localhost:8474
benchmark:
  iterations: 3
  list_category: electronics
  conditions: [FIBER, MOBILE_3G]
"#;
        let config = ConfigLoader::load_string(yaml).unwrap();
        assert_eq!(config.control_plane.url, "http://localhost:8474");
        assert_eq!(config.benchmark.iterations, 3);
        assert_eq!(
            config.benchmark.list_query.category.as_deref(),
            Some("electronics")
        );
        assert_eq!(
            config.benchmark.conditions,
            Some(vec!["FIBER".to_string(), "MOBILE_3G".to_string()])
        );
        // Untouched sections keep their defaults
        assert_eq!(config.protocols.len(), 3);
    }

    #[test]
    fn test_protocols_sorted_into_fixed_order() {
        let yaml = r#"
protocols:
  - protocol: rpc
    address: localhost:50051
    proxy: { name: grpc_proxy, listen: "0.0.0.0:8051", upstream: "localhost:50051" }
  - protocol: rest
    address: http://localhost:3001
    proxy: { name: rest_proxy, listen: "0.0.0.0:8001", upstream: "localhost:3001" }
"#;
        let config = ConfigLoader::load_string(yaml).unwrap();
        let order: Vec<_> = config.protocols.iter().map(|t| t.protocol).collect();
        assert_eq!(order, vec![Protocol::Rest, Protocol::Rpc]);
    }

    #[test]
    fn test_duplicate_proxy_name() {
        let yaml = r#"
protocols:
  - protocol: rest
    address: http://a
    proxy: { name: shared, listen: "0.0.0.0:1", upstream: "a:1" }
  - protocol: graphql
    address: http://b/graphql
    proxy: { name: shared, listen: "0.0.0.0:2", upstream: "b:2" }
"#;
        let err = ConfigLoader::load_string(yaml).unwrap_err();
        assert!(matches!(
            err,
            NetBenchError::HardValidation(HardValidationError::DuplicateProxyName { .. })
        ));
    }

    #[test]
    fn test_duplicate_protocol() {
        let yaml = r#"
protocols:
  - protocol: rest
    address: http://a
    proxy: { name: one, listen: "0.0.0.0:1", upstream: "a:1" }
  - protocol: REST
    address: http://b
    proxy: { name: two, listen: "0.0.0.0:2", upstream: "b:2" }
"#;
        let err = ConfigLoader::load_string(yaml).unwrap_err();
        assert!(matches!(
            err,
            NetBenchError::HardValidation(HardValidationError::DuplicateProtocol { .. })
        ));
    }

    #[test]
    fn test_zero_iterations_rejected() {
        let err = ConfigLoader::load_string("benchmark:\n  iterations: 0\n").unwrap_err();
        assert!(matches!(
            err,
            NetBenchError::HardValidation(HardValidationError::InvalidFieldValue {
                field: "iterations",
                ..
            })
        ));
    }

    #[test]
    fn test_unknown_protocol_rejected() {
        let yaml = r#"
protocols:
  - protocol: soap
    address: http://a
    proxy: { name: soap_proxy, listen: "0.0.0.0:1", upstream: "a:1" }
"#;
        assert!(ConfigLoader::load_string(yaml).is_err());
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = ConfigLoader::load_string("benchmark:\n  iteratons: 3\n").unwrap_err();
        assert!(matches!(err, NetBenchError::ConfigParse { .. }));
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("netbench.yaml");
        std::fs::write(&path, "benchmark:\n  report_path: out/report.json\n").unwrap();

        let config = ConfigLoader::load_or_default(Some(&path)).unwrap();
        assert_eq!(config.benchmark.report_path, PathBuf::from("out/report.json"));
    }

    #[test]
    fn test_missing_file() {
        let err = ConfigLoader::load_file("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, NetBenchError::ConfigNotFound { .. }));
    }
}
