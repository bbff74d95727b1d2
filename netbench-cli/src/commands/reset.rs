// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `netbench reset` command - Clear all network conditions.

use super::Overrides;

pub async fn execute(overrides: &Overrides) -> Result<(), Box<dyn std::error::Error>> {
    let config = overrides.load()?;
    let controller = super::controller(&config)?;

    controller.reset_all().await;

    println!("✓ Cleared effects on {} proxies", controller.proxies().len());
    Ok(())
}
