// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Benchmark runner driving timed operation chains against protocol clients.
//!
//! Operations run strictly one after another; nothing here fans out, so
//! measured durations never include queuing behind sibling requests.

use std::collections::BTreeMap;
use std::future::Future;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;

use netbench_core::{
    BenchmarkConfig, ItemQuery, LineRequest, NetBenchError, NetBenchResult, NetworkProfile,
    Protocol, ProtocolClient, SharedClient,
};

use crate::metrics::{OperationKind, Sample};

/// Entity written by the readiness check.
const READINESS_NAME: &str = "Test User";
const READINESS_EMAIL: &str = "test@test.com";

/// All samples gathered under one network condition.
#[derive(Debug, Clone)]
pub struct SuiteResult {
    pub profile: NetworkProfile,
    pub timestamp: DateTime<Utc>,
    pub samples: BTreeMap<Protocol, Vec<Sample>>,
}

/// Drives the create-entity → list-items → create-composite chain.
#[derive(Debug, Clone)]
pub struct BenchmarkRunner {
    iterations: u32,
    penalty: Duration,
    iteration_pause: Duration,
    list_query: ItemQuery,
}

impl BenchmarkRunner {
    /// Create a runner with the default settings.
    pub fn new() -> Self {
        Self {
            iterations: 10,
            penalty: Duration::from_millis(5000),
            iteration_pause: Duration::ZERO,
            list_query: ItemQuery::new(5),
        }
    }

    pub fn from_config(config: &BenchmarkConfig) -> Self {
        Self::new()
            .iterations(config.iterations)
            .penalty(config.penalty)
            .iteration_pause(config.iteration_pause)
            .list_query(config.list_query.clone())
    }

    /// Set the number of iterations per operation set.
    pub fn iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    /// Set the duration recorded for a failed operation.
    pub fn penalty(mut self, penalty: Duration) -> Self {
        self.penalty = penalty;
        self
    }

    /// Set the pause between iterations.
    pub fn iteration_pause(mut self, pause: Duration) -> Self {
        self.iteration_pause = pause;
        self
    }

    /// Set the filter used by the list step.
    pub fn list_query(mut self, query: ItemQuery) -> Self {
        self.list_query = query;
        self
    }

    pub fn iteration_count(&self) -> u32 {
        self.iterations
    }

    /// Poll `client` with a lightweight write until it answers.
    ///
    /// Returns the number of attempts used. Fails with `ServiceUnavailable`
    /// only once all `max_attempts` have failed; no delay follows the last one.
    pub async fn await_readiness(
        client: &dyn ProtocolClient,
        max_attempts: u32,
        delay: Duration,
    ) -> NetBenchResult<u32> {
        let protocol = client.protocol();
        let mut last_error = String::from("no attempt made");

        for attempt in 1..=max_attempts {
            match client.create_entity(READINESS_NAME, READINESS_EMAIL).await {
                Ok(_) => {
                    tracing::info!(%protocol, attempt, "Service is ready");
                    return Ok(attempt);
                }
                Err(e) => {
                    tracing::debug!(%protocol, attempt, max_attempts, error = %e, "Readiness check failed");
                    last_error = e.to_string();
                }
            }

            if attempt < max_attempts {
                tokio::time::sleep(delay).await;
            }
        }

        Err(NetBenchError::ServiceUnavailable {
            protocol,
            attempts: max_attempts,
            last_error,
        })
    }

    /// Run the operation chain `iterations` times against one client.
    ///
    /// A failing step records a penalty sample and skips the rest of that
    /// iteration; it never aborts the set.
    pub async fn run_operation_set(&self, client: &dyn ProtocolClient) -> Vec<Sample> {
        let protocol = client.protocol();
        let mut samples = Vec::with_capacity(self.iterations as usize * 3);

        for i in 0..self.iterations {
            if i > 0 && !self.iteration_pause.is_zero() {
                tokio::time::sleep(self.iteration_pause).await;
            }

            let name = format!("Test User {}", i);
            let email = format!("user{}@test.com", i);

            let (result, elapsed) = measure(client.create_entity(&name, &email)).await;
            let entity = match result {
                Ok(entity) => {
                    samples.push(Sample::success(
                        OperationKind::CreateEntity,
                        protocol,
                        i,
                        elapsed,
                        payload_size(&entity),
                    ));
                    entity
                }
                Err(e) => {
                    self.record_failure(&mut samples, OperationKind::CreateEntity, protocol, i, e);
                    continue;
                }
            };

            let (result, elapsed) = measure(client.list_items(&self.list_query)).await;
            let items = match result {
                Ok(items) => {
                    samples.push(Sample::success(
                        OperationKind::ListItems,
                        protocol,
                        i,
                        elapsed,
                        payload_size(&items),
                    ));
                    items
                }
                Err(e) => {
                    self.record_failure(&mut samples, OperationKind::ListItems, protocol, i, e);
                    continue;
                }
            };

            let Some(first) = items.first() else {
                continue;
            };
            let lines = [LineRequest {
                item_id: first.id,
                quantity: 1,
            }];

            let (result, elapsed) = measure(client.create_composite(entity.id, &lines)).await;
            match result {
                Ok(composite) => samples.push(Sample::success(
                    OperationKind::CreateComposite,
                    protocol,
                    i,
                    elapsed,
                    payload_size(&composite),
                )),
                Err(e) => {
                    self.record_failure(&mut samples, OperationKind::CreateComposite, protocol, i, e)
                }
            }
        }

        samples
    }

    fn record_failure(
        &self,
        samples: &mut Vec<Sample>,
        operation: OperationKind,
        protocol: Protocol,
        iteration: u32,
        error: impl std::fmt::Display,
    ) {
        tracing::warn!(
            %protocol,
            %operation,
            iteration,
            error = %error,
            "Operation failed"
        );
        samples.push(Sample::failure(
            operation,
            protocol,
            iteration,
            self.penalty,
            error,
        ));
    }

    /// Run the operation set for every client under `profile`.
    pub async fn run_condition_suite(
        &self,
        profile: &NetworkProfile,
        clients: &[SharedClient],
    ) -> SuiteResult {
        let timestamp = Utc::now();
        let mut samples = BTreeMap::new();

        for client in clients {
            let protocol = client.protocol();
            tracing::info!(condition = %profile.name, %protocol, "Testing protocol");

            let set = self.run_operation_set(client.as_ref()).await;
            let previous = samples.insert(protocol, set);
            debug_assert!(previous.is_none(), "{} client given twice", protocol);
        }

        SuiteResult {
            profile: profile.clone(),
            timestamp,
            samples,
        }
    }
}

impl Default for BenchmarkRunner {
    fn default() -> Self {
        Self::new()
    }
}

/// Await a future and report how long it took.
pub async fn measure<F: Future>(future: F) -> (F::Output, Duration) {
    let start = Instant::now();
    let output = future.await;
    (output, start.elapsed())
}

/// Serialized size of a response value.
pub fn payload_size<T: Serialize + ?Sized>(value: &T) -> u64 {
    serde_json::to_vec(value)
        .map(|bytes| bytes.len() as u64)
        .unwrap_or(0)
}
