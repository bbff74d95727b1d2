// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `netbench status` command - Show proxies and their active effects.

use super::Overrides;

pub async fn execute(overrides: &Overrides) -> Result<(), Box<dyn std::error::Error>> {
    let config = overrides.load()?;
    let plane = super::control_plane(&config)?;

    let proxies = plane.list_proxies().await?;

    if proxies.is_empty() {
        println!("No proxies registered at {}.", config.control_plane.url);
        println!("Run `netbench setup` first.");
        return Ok(());
    }

    for proxy in &proxies {
        let state = if proxy.enabled { "enabled" } else { "disabled" };
        println!(
            "{} [{}] {} → {}",
            proxy.name, state, proxy.listen, proxy.upstream
        );

        if proxy.toxics.is_empty() {
            println!("  (no active effects)");
        }
        for effect in &proxy.toxics {
            let attributes = effect
                .attributes
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join(", ");
            println!("  - {} [{}] {}", effect.name, effect.stream, attributes);
        }
    }

    println!();
    println!("Total: {} proxy(ies)", proxies.len());
    Ok(())
}
