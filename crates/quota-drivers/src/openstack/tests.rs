//! OpenStack driver tests against a local Keystone/Nova/Neutron/Cinder stub

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use os_quota_config::{AuthConfig, CloudConfig};
use os_quota_core::{QuotaError, QuotaReconciler, QuotaRequest, QuotaSdk};
use os_quota_types::{QuotaDomain, QuotaSet};

use super::OpenStackCloud;

const TOKEN: &str = "stub-token";

#[derive(Clone)]
struct Stub {
    base_url: String,
    overrides: Arc<Mutex<HashMap<(QuotaDomain, String), QuotaSet>>>,
}

fn envelope_key(domain: QuotaDomain) -> &'static str {
    match domain {
        QuotaDomain::Network => "quota",
        _ => "quota_set",
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("X-Auth-Token")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == TOKEN)
}

fn project_exists(id: &str) -> bool {
    id == "p-demo"
}

/// Defaults as configured by the stub's operator; compute differs from upstream
fn operator_defaults(domain: QuotaDomain) -> QuotaSet {
    let mut defaults = domain.defaults();
    if domain == QuotaDomain::Compute {
        defaults.insert("instances", 50);
    }
    defaults
}

fn quota_envelope(domain: QuotaDomain, id: &str, quotas: &QuotaSet) -> Response {
    let mut body = serde_json::to_value(quotas).unwrap();
    body["id"] = json!(id);
    if domain == QuotaDomain::Volume {
        body["gigabytes_lvmdriver-1"] = json!(-1);
    }
    let mut envelope = serde_json::Map::new();
    envelope.insert(envelope_key(domain).to_string(), body);
    Json(Value::Object(envelope)).into_response()
}

async fn issue_token(State(stub): State<Stub>, Json(body): Json<Value>) -> Response {
    let password = &body["auth"]["identity"]["password"]["user"]["password"];
    if password != "secret" {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": {"message": "The request you have made requires authentication."}})),
        )
            .into_response();
    }

    let catalog = json!({"token": {"catalog": [
        {"type": "compute", "endpoints": [
            {"interface": "public", "region": "RegionOne", "url": format!("{}/compute/v2.1", stub.base_url)}
        ]},
        {"type": "network", "endpoints": [
            {"interface": "public", "region": "RegionOne", "url": format!("{}/network", stub.base_url)}
        ]},
        {"type": "volumev3", "endpoints": [
            {"interface": "public", "region": "RegionOne", "url": format!("{}/volume/v3/p-admin", stub.base_url)}
        ]}
    ]}});

    let mut response = (StatusCode::CREATED, Json(catalog)).into_response();
    response
        .headers_mut()
        .insert("x-subject-token", TOKEN.parse().unwrap());
    response
}

async fn list_projects(
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let projects = match query.get("name").map(String::as_str) {
        Some("demo") => vec![json!({"id": "p-demo", "name": "demo"})],
        _ => vec![],
    };
    Json(json!({ "projects": projects })).into_response()
}

async fn show_project(headers: HeaderMap, Path(id): Path<String>) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if id == "p-locked" {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({"error": {"message": "You are not authorized to perform the requested action: identity:get_project."}})),
        )
            .into_response();
    }
    if project_exists(&id) {
        Json(json!({"project": {"id": id, "name": "demo"}})).into_response()
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(json!({"error": {"message": format!("Could not find project: {}", id)}})),
        )
            .into_response()
    }
}

fn read_quota(stub: &Stub, domain: QuotaDomain, id: &str) -> Response {
    let mut quotas = operator_defaults(domain);
    if let Some(custom) = stub.overrides.lock().unwrap().get(&(domain, id.to_string())) {
        quotas.merge(custom);
    }
    quota_envelope(domain, id, &quotas)
}

async fn default_quota_handler(
    domain: QuotaDomain,
    headers: HeaderMap,
    id: String,
) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if !project_exists(&id) {
        return StatusCode::NOT_FOUND.into_response();
    }
    quota_envelope(domain, &id, &operator_defaults(domain))
}

fn default_routes(domain: QuotaDomain) -> axum::routing::MethodRouter<Stub> {
    get(move |headers: HeaderMap, Path(id): Path<String>| {
        default_quota_handler(domain, headers, id)
    })
}

fn write_quota(stub: &Stub, domain: QuotaDomain, id: &str, body: &Value) -> Response {
    let Some(fields) = body.get(envelope_key(domain)).and_then(Value::as_object) else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    if let Some(bad) = fields.keys().find(|key| !domain.is_recognized(key)) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"badRequest": {"message": format!("Bad key(s) in quota set: {}", bad)}})),
        )
            .into_response();
    }

    let update = QuotaSet::from_json_object(fields);
    stub.overrides
        .lock()
        .unwrap()
        .entry((domain, id.to_string()))
        .or_default()
        .merge(&update);
    read_quota(stub, domain, id)
}

async fn quota_handler(
    stub: Stub,
    domain: QuotaDomain,
    method: axum::http::Method,
    headers: HeaderMap,
    id: String,
    body: Option<Value>,
) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if !project_exists(&id) {
        return StatusCode::NOT_FOUND.into_response();
    }

    match method {
        axum::http::Method::GET => read_quota(&stub, domain, &id),
        axum::http::Method::PUT => write_quota(&stub, domain, &id, &body.unwrap_or(Value::Null)),
        axum::http::Method::DELETE => {
            stub.overrides.lock().unwrap().remove(&(domain, id));
            StatusCode::ACCEPTED.into_response()
        }
        _ => StatusCode::METHOD_NOT_ALLOWED.into_response(),
    }
}

fn quota_routes(domain: QuotaDomain) -> axum::routing::MethodRouter<Stub> {
    get(
        move |State(stub): State<Stub>, headers: HeaderMap, Path(id): Path<String>| {
            quota_handler(stub, domain, axum::http::Method::GET, headers, id, None)
        },
    )
    .put(
        move |State(stub): State<Stub>,
              headers: HeaderMap,
              Path(id): Path<String>,
              Json(body): Json<Value>| {
            quota_handler(stub, domain, axum::http::Method::PUT, headers, id, Some(body))
        },
    )
    .delete(
        move |State(stub): State<Stub>, headers: HeaderMap, Path(id): Path<String>| {
            quota_handler(stub, domain, axum::http::Method::DELETE, headers, id, None)
        },
    )
}

/// Start the stub on an ephemeral port and return its base URL
async fn start_stub() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let stub = Stub {
        base_url: base_url.clone(),
        overrides: Arc::new(Mutex::new(HashMap::new())),
    };

    let app = Router::new()
        .route("/identity/v3/auth/tokens", post(issue_token))
        .route("/identity/v3/projects", get(list_projects))
        .route("/identity/v3/projects/:id", get(show_project))
        .route(
            "/compute/v2.1/os-quota-sets/:id",
            quota_routes(QuotaDomain::Compute),
        )
        .route(
            "/compute/v2.1/os-quota-sets/:id/defaults",
            default_routes(QuotaDomain::Compute),
        )
        .route("/network/v2.0/quotas/:id", quota_routes(QuotaDomain::Network))
        .route(
            "/network/v2.0/quotas/:id/default",
            default_routes(QuotaDomain::Network),
        )
        .route(
            "/volume/v3/p-admin/os-quota-sets/:id",
            quota_routes(QuotaDomain::Volume),
        )
        .with_state(stub);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    base_url
}

fn cloud_config(base_url: &str, password: &str) -> CloudConfig {
    CloudConfig {
        auth: AuthConfig {
            auth_url: Some(format!("{}/identity", base_url)),
            username: Some("admin".to_string()),
            password: Some(password.to_string()),
            project_name: Some("admin".to_string()),
            ..Default::default()
        },
        region_name: Some("RegionOne".to_string()),
        ..Default::default()
    }
}

fn quota(entries: &[(&str, i64)]) -> QuotaSet {
    entries.iter().map(|(k, v)| (*k, *v)).collect()
}

#[tokio::test]
async fn test_get_compute_quotas() {
    let base_url = start_stub().await;
    let cloud = OpenStackCloud::new(cloud_config(&base_url, "secret")).unwrap();

    let quotas = cloud.get_quotas(QuotaDomain::Compute, "demo").await.unwrap();
    assert_eq!(quotas, operator_defaults(QuotaDomain::Compute));
    assert!(!quotas.contains("id"));
}

#[tokio::test]
async fn test_compute_demo_scenario_over_http() {
    let base_url = start_stub().await;
    let cloud = OpenStackCloud::new(cloud_config(&base_url, "secret")).unwrap();
    let reconciler = QuotaReconciler::new(Arc::new(cloud)).unwrap();

    let request = QuotaRequest::present(
        QuotaDomain::Compute,
        "demo",
        quota(&[("instances", 33), ("cores", 33), ("ram", 33333)]),
    );
    let outcome = reconciler.reconcile(&request).await.unwrap();
    assert!(outcome.changed);
    assert_eq!(outcome.quotas.get("ram"), Some(33333));
    assert_eq!(outcome.quotas.get("key_pairs"), Some(100));

    let again = reconciler.reconcile(&request).await.unwrap();
    assert!(!again.changed);
}

#[tokio::test]
async fn test_network_quotas_use_v2_prefix() {
    let base_url = start_stub().await;
    let cloud = OpenStackCloud::new(cloud_config(&base_url, "secret")).unwrap();

    cloud
        .set_quotas(QuotaDomain::Network, "demo", &quota(&[("port", 42)]))
        .await
        .unwrap();
    let quotas = cloud.get_quotas(QuotaDomain::Network, "demo").await.unwrap();
    assert_eq!(quotas.get("port"), Some(42));
}

#[tokio::test]
async fn test_volume_absent_resets_and_ignores_backend_fields() {
    let base_url = start_stub().await;
    let cloud = OpenStackCloud::new(cloud_config(&base_url, "secret")).unwrap();
    let reconciler = QuotaReconciler::new(Arc::new(cloud)).unwrap();

    reconciler
        .reconcile(&QuotaRequest::present(
            QuotaDomain::Volume,
            "demo",
            quota(&[("volumes", 33), ("snapshots", 33)]),
        ))
        .await
        .unwrap();

    let outcome = reconciler
        .reconcile(&QuotaRequest::absent(QuotaDomain::Volume, "demo"))
        .await
        .unwrap();
    assert!(outcome.changed);
    assert_eq!(outcome.quotas, QuotaDomain::Volume.defaults());
}

#[tokio::test]
async fn test_project_lookup_by_id() {
    let base_url = start_stub().await;
    let cloud = OpenStackCloud::new(cloud_config(&base_url, "secret")).unwrap();

    let quotas = cloud.get_quotas(QuotaDomain::Volume, "p-demo").await.unwrap();
    assert_eq!(quotas.get("volumes"), Some(10));
}

#[tokio::test]
async fn test_unknown_project_fails() {
    let base_url = start_stub().await;
    let cloud = OpenStackCloud::new(cloud_config(&base_url, "secret")).unwrap();

    let err = cloud
        .get_quotas(QuotaDomain::Compute, "ghost")
        .await
        .unwrap_err();
    assert_eq!(err.message, "project does not exist: ghost");
}

#[tokio::test]
async fn test_project_lookup_keeps_keystone_error() {
    let base_url = start_stub().await;
    let cloud = OpenStackCloud::new(cloud_config(&base_url, "secret")).unwrap();

    let err = cloud
        .get_quotas(QuotaDomain::Compute, "p-locked")
        .await
        .unwrap_err();
    assert_eq!(err.status, Some(403));
    assert!(err.message.contains("403"), "{}", err.message);
    assert!(
        err.message.contains("identity:get_project"),
        "{}",
        err.message
    );
}

#[tokio::test]
async fn test_default_quotas_come_from_the_cloud() {
    let base_url = start_stub().await;
    let cloud = OpenStackCloud::new(cloud_config(&base_url, "secret")).unwrap();

    let compute = cloud
        .get_default_quotas(QuotaDomain::Compute, "demo")
        .await
        .unwrap();
    assert_eq!(compute.get("instances"), Some(50));

    let network = cloud
        .get_default_quotas(QuotaDomain::Network, "demo")
        .await
        .unwrap();
    assert_eq!(network, QuotaDomain::Network.defaults());
}

#[tokio::test]
async fn test_check_mode_reset_against_operator_defaults() {
    let base_url = start_stub().await;
    let cloud = OpenStackCloud::new(cloud_config(&base_url, "secret")).unwrap();
    let reconciler = QuotaReconciler::new(Arc::new(cloud))
        .unwrap()
        .with_check_mode(true);

    let outcome = reconciler
        .reconcile(&QuotaRequest::absent(QuotaDomain::Compute, "demo"))
        .await
        .unwrap();
    assert!(!outcome.changed);
    assert_eq!(outcome.quotas.get("instances"), Some(50));
}

#[tokio::test]
async fn test_bad_credentials_surface_as_cloud_error() {
    let base_url = start_stub().await;
    let cloud = OpenStackCloud::new(cloud_config(&base_url, "wrong")).unwrap();
    let reconciler = QuotaReconciler::new(Arc::new(cloud)).unwrap();

    let err = reconciler
        .reconcile(&QuotaRequest::absent(QuotaDomain::Compute, "demo"))
        .await
        .unwrap_err();
    match err {
        QuotaError::CloudOperation { message, .. } => {
            assert!(message.starts_with("Authentication failed: 401"), "{}", message);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_auth_url_required() {
    let err = OpenStackCloud::new(CloudConfig::default()).err().unwrap();
    assert_eq!(err.message, "auth_url is required");
}
