// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! CLI command modules.

use std::path::PathBuf;
use std::sync::Arc;

use netbench_core::fault::{ControlPlane, ToxiproxyClient};
use netbench_core::{
    ConditionCatalog, Config, ConfigLoader, FaultInjectionController, NetBenchResult,
};

pub mod apply;
pub mod list;
pub mod reset;
pub mod run;
pub mod setup;
pub mod status;

/// Global flags that take precedence over the configuration file.
pub struct Overrides {
    pub config: Option<PathBuf>,
    pub control_plane: Option<String>,
    pub report: Option<PathBuf>,
}

impl Overrides {
    /// Load the configuration and apply the overrides.
    pub fn load(&self) -> NetBenchResult<Config> {
        let mut config = ConfigLoader::load_or_default(self.config.as_deref())?;

        if let Some(url) = &self.control_plane {
            config.control_plane.url = url.clone();
        }
        if let Some(report) = &self.report {
            config.benchmark.report_path = report.clone();
        }

        Ok(config)
    }
}

/// HTTP client for the configured control plane.
pub fn control_plane(config: &Config) -> NetBenchResult<Arc<dyn ControlPlane>> {
    let client = ToxiproxyClient::new(&config.control_plane.url, config.control_plane.timeout)?;
    Ok(Arc::new(client))
}

/// Controller tracking the configured proxies, without registering them.
pub fn controller(config: &Config) -> NetBenchResult<FaultInjectionController> {
    Ok(
        FaultInjectionController::new(control_plane(config)?, ConditionCatalog::builtin())
            .with_proxies(config.proxies()),
    )
}
