// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Newtype wrappers for validated inputs.
//!
//! Following the "Newtype" pattern in Rust to ensure valid state by construction.
//! All types validate their invariants at creation time.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::HardValidationError;

/// Bandwidth at or above this value (Mbps) is treated as unmetered.
pub const UNMETERED_BANDWIDTH_MBPS: f64 = 1000.0;

/// 1 Mbps expressed in bytes per second.
pub const BYTES_PER_SEC_PER_MBPS: f64 = 125_000.0;

/// The API styles under comparison.
///
/// Declaration order is the fixed protocol iteration order used in reports
/// and for ranking tie-breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Protocol {
    #[serde(rename = "rest")]
    Rest,
    #[serde(rename = "graphql")]
    Graph,
    #[serde(rename = "rpc")]
    Rpc,
}

impl Protocol {
    /// All protocols in iteration order.
    pub const ALL: [Protocol; 3] = [Protocol::Rest, Protocol::Graph, Protocol::Rpc];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Rest => "rest",
            Self::Graph => "graphql",
            Self::Rpc => "rpc",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = HardValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rest" => Ok(Self::Rest),
            "graphql" | "graph" => Ok(Self::Graph),
            "rpc" | "grpc" => Ok(Self::Rpc),
            _ => Err(HardValidationError::InvalidFieldValue {
                field: "protocol",
                value: s.to_string(),
                reason: "Expected one of: rest, graphql, rpc".to_string(),
            }),
        }
    }
}

/// Validated proxy name.
/// Must be non-empty, alphanumeric with hyphens/underscores, max 64 chars.
/// It is the join key between configuration and the control plane.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProxyName(String);

impl ProxyName {
    /// Create a new ProxyName with validation.
    pub fn new(name: impl Into<String>) -> Result<Self, HardValidationError> {
        let name = name.into();

        if name.is_empty() {
            return Err(HardValidationError::InvalidFieldValue {
                field: "proxy_name",
                value: name,
                reason: "Proxy name cannot be empty".to_string(),
            });
        }

        if name.len() > 64 {
            return Err(HardValidationError::InvalidFieldValue {
                field: "proxy_name",
                value: name.clone(),
                reason: format!("Proxy name too long: {} chars (max 64)", name.len()),
            });
        }

        if !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(HardValidationError::InvalidFieldValue {
                field: "proxy_name",
                value: name,
                reason: "Proxy name must contain only ASCII alphanumerics, hyphens, and underscores"
                    .to_string(),
            });
        }

        Ok(Self(name))
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProxyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for ProxyName {
    type Error = HardValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ProxyName> for String {
    fn from(name: ProxyName) -> Self {
        name.0
    }
}

/// A network-emulation proxy sitting in front of one protocol server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyEndpoint {
    pub name: ProxyName,
    /// Address the proxy listens on, e.g. `0.0.0.0:8001`.
    pub listen: String,
    /// Address of the real server, e.g. `rest-api:3001`.
    pub upstream: String,
}

impl ProxyEndpoint {
    pub fn new(
        name: &str,
        listen: impl Into<String>,
        upstream: impl Into<String>,
    ) -> Result<Self, HardValidationError> {
        let listen = listen.into();
        let upstream = upstream.into();
        let name = ProxyName::new(name)?;

        if listen.is_empty() {
            return Err(HardValidationError::MissingRequiredField {
                field: "listen",
                context: format!("proxy '{}'", name),
            });
        }
        if upstream.is_empty() {
            return Err(HardValidationError::MissingRequiredField {
                field: "upstream",
                context: format!("proxy '{}'", name),
            });
        }

        Ok(Self {
            name,
            listen,
            upstream,
        })
    }
}

/// A named set of network parameters simulating one network condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkProfile {
    /// Catalog key, e.g. `LTE_4G`.
    pub name: String,
    /// Human readable label, e.g. `4G LTE`.
    pub label: String,
    pub latency_ms: u64,
    pub jitter_ms: u64,
    pub bandwidth_mbps: f64,
    pub packet_loss_percent: f64,
}

impl NetworkProfile {
    /// Create a new profile with validation.
    pub fn new(
        name: impl Into<String>,
        label: impl Into<String>,
        latency_ms: u64,
        jitter_ms: u64,
        bandwidth_mbps: f64,
        packet_loss_percent: f64,
    ) -> Result<Self, HardValidationError> {
        let name = name.into();

        if name.is_empty() {
            return Err(HardValidationError::InvalidFieldValue {
                field: "profile_name",
                value: name,
                reason: "Profile name cannot be empty".to_string(),
            });
        }

        if !bandwidth_mbps.is_finite() || bandwidth_mbps < 0.0 {
            return Err(HardValidationError::InvalidFieldValue {
                field: "bandwidth_mbps",
                value: bandwidth_mbps.to_string(),
                reason: format!("Bandwidth for '{}' must be a non-negative number", name),
            });
        }

        if !(0.0..=100.0).contains(&packet_loss_percent) {
            return Err(HardValidationError::InvalidFieldValue {
                field: "packet_loss_percent",
                value: packet_loss_percent.to_string(),
                reason: format!("Packet loss for '{}' must be within 0..=100", name),
            });
        }

        Ok(Self {
            name,
            label: label.into(),
            latency_ms,
            jitter_ms,
            bandwidth_mbps,
            packet_loss_percent,
        })
    }

    /// Zero or at/above the unmetered threshold means no rate limit.
    pub fn is_unmetered(&self) -> bool {
        self.bandwidth_mbps <= 0.0 || self.bandwidth_mbps >= UNMETERED_BANDWIDTH_MBPS
    }

    /// Rate limit in bytes per second, if this profile is metered.
    pub fn rate_bytes_per_sec(&self) -> Option<u64> {
        if self.is_unmetered() {
            None
        } else {
            Some((self.bandwidth_mbps * BYTES_PER_SEC_PER_MBPS).round() as u64)
        }
    }

    /// Inter-slice delay used to approximate packet loss.
    pub fn slice_delay(&self) -> u64 {
        self.latency_ms / 10
    }
}
