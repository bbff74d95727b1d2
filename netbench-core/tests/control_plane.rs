// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Fault-injection controller driven through the real HTTP control-plane
//! client against a local Toxiproxy-compatible server.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get},
    Json, Router,
};
use serde::Deserialize;

use netbench_core::fault::{
    plan_effects, ControlPlane, Effect, EffectKind, InMemoryControlPlane, ToxiproxyClient,
};
use netbench_core::{
    ConditionCatalog, FaultInjectionController, FaultInjectionError, NetBenchError,
    ProxyEndpoint, ProxyName,
};

#[derive(Deserialize)]
struct CreateProxy {
    name: String,
    listen: String,
    upstream: String,
}

type Backend = Arc<InMemoryControlPlane>;

fn status_for(err: FaultInjectionError) -> StatusCode {
    match err {
        FaultInjectionError::Conflict { .. } => StatusCode::CONFLICT,
        FaultInjectionError::Failure { reason, .. } if reason.contains("not found") => {
            StatusCode::NOT_FOUND
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn parse_name(name: &str) -> Result<ProxyName, StatusCode> {
    ProxyName::new(name).map_err(|_| StatusCode::BAD_REQUEST)
}

async fn create_proxy(
    State(backend): State<Backend>,
    Json(body): Json<CreateProxy>,
) -> Result<impl IntoResponse, StatusCode> {
    let endpoint = ProxyEndpoint::new(&body.name, body.listen, body.upstream)
        .map_err(|_| StatusCode::BAD_REQUEST)?;
    backend.create_proxy(&endpoint).await.map_err(status_for)?;
    Ok(StatusCode::CREATED)
}

async fn list_proxies(State(backend): State<Backend>) -> Result<impl IntoResponse, StatusCode> {
    let proxies = backend.list_proxies().await.map_err(status_for)?;
    let by_name: HashMap<_, _> = proxies.into_iter().map(|p| (p.name.clone(), p)).collect();
    Ok(Json(by_name))
}

async fn delete_proxy(
    State(backend): State<Backend>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, StatusCode> {
    let name = parse_name(&name)?;
    backend.delete_proxy(&name).await.map_err(status_for)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_toxics(
    State(backend): State<Backend>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, StatusCode> {
    let name = parse_name(&name)?;
    let effects = backend.list_effects(&name).await.map_err(status_for)?;
    Ok(Json(effects))
}

async fn create_toxic(
    State(backend): State<Backend>,
    Path(name): Path<String>,
    Json(effect): Json<Effect>,
) -> Result<impl IntoResponse, StatusCode> {
    let name = parse_name(&name)?;
    backend.create_effect(&name, &effect).await.map_err(status_for)?;
    Ok(Json(effect))
}

async fn delete_toxic(
    State(backend): State<Backend>,
    Path((name, toxic)): Path<(String, String)>,
) -> Result<impl IntoResponse, StatusCode> {
    let name = parse_name(&name)?;
    backend.delete_effect(&name, &toxic).await.map_err(status_for)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Serve a fake control plane on an ephemeral port.
async fn spawn_control_plane() -> (String, Backend) {
    let backend: Backend = Arc::new(InMemoryControlPlane::new());

    let app = Router::new()
        .route("/proxies", get(list_proxies).post(create_proxy))
        .route("/proxies/{name}", delete(delete_proxy))
        .route("/proxies/{name}/toxics", get(list_toxics).post(create_toxic))
        .route("/proxies/{name}/toxics/{toxic}", delete(delete_toxic))
        .with_state(backend.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind fake control plane");
    let addr = listener.local_addr().expect("No local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    (format!("http://{}", addr), backend)
}

fn endpoints() -> Vec<ProxyEndpoint> {
    vec![
        ProxyEndpoint::new("rest_proxy", "0.0.0.0:8001", "rest-api:3001").unwrap(),
        ProxyEndpoint::new("graphql_proxy", "0.0.0.0:8002", "graphql-api:3002").unwrap(),
    ]
}

async fn controller() -> (FaultInjectionController, Backend) {
    let (url, backend) = spawn_control_plane().await;
    let client = ToxiproxyClient::new(&url, Duration::from_secs(5)).unwrap();
    let mut ctl = FaultInjectionController::new(Arc::new(client), ConditionCatalog::builtin());
    for endpoint in endpoints() {
        ctl.register_proxy(endpoint).await.unwrap();
    }
    (ctl, backend)
}

#[tokio::test]
async fn test_register_twice_over_http() {
    let (mut ctl, backend) = controller().await;

    // 409 from the server is swallowed
    for endpoint in endpoints() {
        ctl.register_proxy(endpoint).await.unwrap();
    }

    assert_eq!(ctl.proxies().len(), 2);
    let names: Vec<_> = backend
        .list_proxies()
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(names, vec!["graphql_proxy", "rest_proxy"]);
}

#[tokio::test]
async fn test_profile_switch_leaves_no_residue() {
    let (ctl, backend) = controller().await;

    ctl.apply_to_all("MOBILE_2G").await.unwrap();
    let fiber = ctl.apply_to_all("FIBER").await.unwrap();

    for endpoint in ctl.proxies() {
        let active = backend.list_effects(&endpoint.name).await.unwrap();
        assert_eq!(active, plan_effects(&endpoint.name, &fiber));
        assert!(active.iter().all(|e| e.kind != EffectKind::Bandwidth));
    }
}

#[tokio::test]
async fn test_effects_round_trip_through_wire_format() {
    let (ctl, _backend) = controller().await;
    ctl.apply_to_all("LTE_4G").await.unwrap();

    let proxy = &ctl.proxies()[0].name;
    let effects = ctl.control_plane().list_effects(proxy).await.unwrap();
    let bandwidth = effects
        .iter()
        .find(|e| e.kind == EffectKind::Bandwidth)
        .unwrap();
    assert_eq!(bandwidth.name, "rest_proxy_bandwidth");
    assert_eq!(bandwidth.attribute("rate"), Some(2_500_000));
}

#[tokio::test]
async fn test_status_lists_active_effects() {
    let (ctl, _backend) = controller().await;
    ctl.apply_to_all("SATELLITE").await.unwrap();

    let proxies = ctl.control_plane().list_proxies().await.unwrap();
    assert_eq!(proxies.len(), 2);
    assert!(proxies.iter().all(|p| p.toxics.len() == 3));
}

#[tokio::test]
async fn test_reset_all_over_http() {
    let (ctl, backend) = controller().await;
    ctl.apply_to_all("UNRELIABLE").await.unwrap();
    ctl.reset_all().await;

    for endpoint in ctl.proxies() {
        assert!(backend.list_effects(&endpoint.name).await.unwrap().is_empty());
    }
}

#[tokio::test]
async fn test_server_error_surfaces_as_failure() {
    let (ctl, backend) = controller().await;
    backend.fail_proxy("graphql_proxy");

    let err = ctl.apply_to_all("WIFI_GOOD").await.unwrap_err();
    match err {
        NetBenchError::FaultInjection(FaultInjectionError::Failure { proxy, reason }) => {
            assert_eq!(proxy, "graphql_proxy");
            assert!(reason.contains("500"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_delete_proxy_over_http() {
    let (ctl, backend) = controller().await;
    let name = ProxyName::new("rest_proxy").unwrap();

    ctl.control_plane().delete_proxy(&name).await.unwrap();
    assert_eq!(backend.list_proxies().await.unwrap().len(), 1);

    let err = ctl.control_plane().delete_proxy(&name).await.unwrap_err();
    assert!(matches!(err, FaultInjectionError::Failure { .. }));
}
