// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Registry of named network profiles.
//!
//! The built-in catalog is ordered from the fastest network to the worst so a
//! full run reads as a degradation trend.

use crate::error::{HardValidationError, NetBenchError, NetBenchResult};
use crate::types::NetworkProfile;

/// Ordered, immutable-once-registered set of network profiles.
#[derive(Debug, Clone, Default)]
pub struct ConditionCatalog {
    profiles: Vec<NetworkProfile>,
}

fn preset(
    name: &str,
    label: &str,
    latency_ms: u64,
    jitter_ms: u64,
    bandwidth_mbps: f64,
    packet_loss_percent: f64,
) -> NetworkProfile {
    NetworkProfile {
        name: name.to_string(),
        label: label.to_string(),
        latency_ms,
        jitter_ms,
        bandwidth_mbps,
        packet_loss_percent,
    }
}

impl ConditionCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in presets, fastest to worst.
    pub fn builtin() -> Self {
        Self {
            profiles: vec![
                preset("FIBER", "Fiber/5G", 5, 1, 1000.0, 0.01),
                preset("WIFI_EXCELLENT", "WiFi (Excellent)", 10, 2, 100.0, 0.1),
                preset("WIFI_GOOD", "WiFi (Good)", 30, 5, 50.0, 0.5),
                preset("LTE_4G", "4G LTE", 50, 10, 20.0, 1.0),
                preset("WIFI_POOR", "WiFi (Poor)", 100, 20, 10.0, 2.0),
                preset("MOBILE_3G", "3G Mobile", 200, 50, 2.0, 3.0),
                preset("MOBILE_2G", "2G Mobile", 500, 100, 0.1, 5.0),
                preset("SATELLITE", "Satellite", 600, 200, 5.0, 2.0),
                preset("UNRELIABLE", "Unreliable Network", 1000, 500, 0.5, 10.0),
            ],
        }
    }

    /// Append a profile. Names must be unique.
    pub fn register(&mut self, profile: NetworkProfile) -> Result<(), HardValidationError> {
        if self.profiles.iter().any(|p| p.name == profile.name) {
            return Err(HardValidationError::DuplicateProfile { name: profile.name });
        }
        self.profiles.push(profile);
        Ok(())
    }

    /// Resolve a profile by its exact catalog key.
    pub fn lookup(&self, name: &str) -> NetBenchResult<&NetworkProfile> {
        self.profiles
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| NetBenchError::UnknownCondition {
                name: name.to_string(),
            })
    }

    /// Registered names in run order.
    pub fn names(&self) -> Vec<&str> {
        self.profiles.iter().map(|p| p.name.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NetworkProfile> {
        self.profiles.iter()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}
