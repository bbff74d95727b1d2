// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Custom error types for netbench.
//!
//! Library errors are typed enums; only the CLI boundary erases them into
//! `Box<dyn Error>`.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::Protocol;

/// Top-level error type for the benchmark orchestrator.
/// All errors are explicit variants - no catch-all or generic handling.
#[derive(Debug, Error)]
pub enum NetBenchError {
    // =========================================================================
    // Configuration Errors - Fail-Fast on Invalid Config
    // =========================================================================
    #[error("Hard validation error: {0}")]
    HardValidation(#[from] HardValidationError),

    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("Configuration parse error: {message}")]
    ConfigParse { message: String },

    // =========================================================================
    // Catalog Errors
    // =========================================================================
    #[error("Unknown network condition: {name}")]
    UnknownCondition { name: String },

    // =========================================================================
    // Benchmark Errors
    // =========================================================================
    #[error("{protocol} service unavailable after {attempts} readiness attempts: {last_error}")]
    ServiceUnavailable {
        protocol: Protocol,
        attempts: u32,
        last_error: String,
    },

    #[error("Operation failed: {0}")]
    Operation(#[from] ClientError),

    // =========================================================================
    // Fault Injection Errors - Abort the Current Condition Only
    // =========================================================================
    #[error("Fault injection error: {0}")]
    FaultInjection(#[from] FaultInjectionError),

    // =========================================================================
    // Report Errors
    // =========================================================================
    #[error("Failed to persist report to {path}: {reason}")]
    ReportPersist { path: PathBuf, reason: String },

    #[error("Failed to read report {path}: {reason}")]
    ReportLoad { path: PathBuf, reason: String },

    // =========================================================================
    // System Errors
    // =========================================================================
    #[error("IO error: {context} - {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Hard validation errors cause immediate process termination.
/// Used when configuration is invalid and the benchmark cannot safely start.
#[derive(Debug, Error)]
pub enum HardValidationError {
    #[error("Missing required field: {field} in {context}")]
    MissingRequiredField {
        field: &'static str,
        context: String,
    },

    #[error("Invalid field value: {field} = {value} - {reason}")]
    InvalidFieldValue {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("Duplicate proxy name: {name}")]
    DuplicateProxyName { name: String },

    #[error("Protocol configured more than once: {protocol}")]
    DuplicateProtocol { protocol: Protocol },

    #[error("Duplicate network profile: {name}")]
    DuplicateProfile { name: String },
}

/// Failures of a single protocol-client operation.
///
/// These are recovered by the benchmark runner and turned into failed samples.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("transport error: {reason}")]
    Transport { reason: String },

    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("{resource} {id} not found")]
    NotFound { resource: &'static str, id: u64 },

    #[error("remote error: {message}")]
    Remote { message: String },

    #[error("failed to decode response: {reason}")]
    Decode { reason: String },

    #[error("codec error: {reason}")]
    Codec { reason: String },
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode {
                reason: err.to_string(),
            }
        } else {
            ClientError::Transport {
                reason: err.to_string(),
            }
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode {
            reason: err.to_string(),
        }
    }
}

/// Control-plane failures while programming network effects.
#[derive(Debug, Error)]
pub enum FaultInjectionError {
    /// The resource already exists. `register_proxy` treats this as success.
    #[error("proxy {proxy} already exists")]
    Conflict { proxy: String },

    #[error("control plane request for proxy {proxy} failed: {reason}")]
    Failure { proxy: String, reason: String },

    #[error("control plane unavailable: {reason}")]
    ControlPlane { reason: String },
}

/// Result type alias using NetBenchError.
pub type NetBenchResult<T> = Result<T, NetBenchError>;

/// Result type alias for protocol-client operations.
pub type ClientResult<T> = Result<T, ClientError>;
