use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};

use anyhow::Context;
use axum::{
    Json, Router,
    extract::{
        FromRequestParts, Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::{self, HeaderMap, HeaderName, HeaderValue, Method, request::Parts},
    response::IntoResponse,
    routing::{get, post},
};
use entity::activity_logs;
use platform_api::{ApiError, ApiResult};
use platform_authz::Grants;
use platform_db::DbPool;
use products_hr::{
    Caller, EmployeeService,
    dto::{
        DeleteEmployeeInput, DeleteOutcome, EmployeeForm, EmployeeListQuery, EmployeePage,
        SaveEmployeeInput, SaveOutcome,
    },
};
use sea_orm::{ConnectionTrait, Statement};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::config::AppConfig;

const USER_ID_HEADER: &str = "x-user-id";
const COMPANY_ID_HEADER: &str = "x-company-id";
const PERMISSIONS_HEADER: &str = "x-user-permissions";

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub employees: EmployeeService,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(pool: DbPool, config: Arc<AppConfig>) -> Self {
        Self {
            employees: EmployeeService::new(pool.clone()),
            pool,
            config,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ServeConfig {
    addr: SocketAddr,
}

impl ServeConfig {
    pub fn new(host: IpAddr, port: u16) -> Self {
        Self {
            addr: SocketAddr::from((host, port)),
        }
    }
}

pub async fn serve(config: ServeConfig, state: AppState) -> anyhow::Result<()> {
    let router = build_router(state);
    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;

    info!(%config.addr, "hr server listening");
    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;
    Ok(())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed = origins
        .iter()
        .filter_map(|origin| origin.parse::<HeaderValue>().ok())
        .collect::<Vec<_>>();
    let allow_origin = if allowed.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(allowed)
    };
    CorsLayer::new()
        .allow_headers([
            http::header::CONTENT_TYPE,
            HeaderName::from_static(USER_ID_HEADER),
            HeaderName::from_static(COMPANY_ID_HEADER),
            HeaderName::from_static(PERMISSIONS_HEADER),
        ])
        .allow_methods([Method::POST, Method::GET])
        .allow_origin(allow_origin)
}

pub fn build_router(state: AppState) -> Router {
    let header_name = HeaderName::from_static("x-request-id");
    Router::new()
        .route("/health", get(health_handler))
        .route("/employees", get(list_handler).post(save_handler))
        .route("/employees/form", get(form_handler))
        .route("/employees/delete", post(delete_handler))
        .route("/employees/{id}/activity", get(activity_handler))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(header_name.clone(), MakeRequestUuid))
                .layer(PropagateRequestIdLayer::new(header_name))
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&state.config.cors_allowed_origins)),
        )
        .with_state(state)
}

/// Identity injected by the upstream gateway.
pub struct CurrentCaller(pub Caller);

impl<S> FromRequestParts<S> for CurrentCaller
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        caller_from_headers(&parts.headers)
            .map(CurrentCaller)
            .ok_or(ApiError::Unauthorized)
    }
}

fn caller_from_headers(headers: &HeaderMap) -> Option<Caller> {
    let user_id = id_header(headers, USER_ID_HEADER)?;
    let company_id = id_header(headers, COMPANY_ID_HEADER)?;
    let grants = headers
        .get(PERMISSIONS_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(Grants::parse_list)
        .unwrap_or_default();
    Some(Caller::new(user_id, company_id).with_grants(grants))
}

fn id_header(headers: &HeaderMap, name: &str) -> Option<i64> {
    headers.get(name)?.to_str().ok()?.trim().parse().ok()
}

fn bad_request(rejection: impl std::fmt::Display) -> ApiError {
    ApiError::InvalidInput(rejection.to_string())
}

async fn list_handler(
    State(state): State<AppState>,
    CurrentCaller(caller): CurrentCaller,
    query: Result<Query<EmployeeListQuery>, QueryRejection>,
) -> ApiResult<Json<EmployeePage>> {
    let Query(query) = query.map_err(bad_request)?;
    Ok(Json(state.employees.list(&caller, &query).await?))
}

#[derive(Debug, Default, Deserialize)]
struct FormQuery {
    id: Option<i64>,
}

async fn form_handler(
    State(state): State<AppState>,
    CurrentCaller(caller): CurrentCaller,
    query: Result<Query<FormQuery>, QueryRejection>,
) -> ApiResult<Json<EmployeeForm>> {
    let Query(query) = query.map_err(bad_request)?;
    Ok(Json(state.employees.form(&caller, query.id).await?))
}

async fn save_handler(
    State(state): State<AppState>,
    CurrentCaller(caller): CurrentCaller,
    body: Result<Json<SaveEmployeeInput>, JsonRejection>,
) -> ApiResult<Json<SaveOutcome>> {
    let Json(input) = body.map_err(bad_request)?;
    Ok(Json(state.employees.save(&caller, input).await?))
}

async fn delete_handler(
    State(state): State<AppState>,
    CurrentCaller(caller): CurrentCaller,
    body: Result<Json<DeleteEmployeeInput>, JsonRejection>,
) -> ApiResult<Json<DeleteOutcome>> {
    let Json(input) = body.map_err(bad_request)?;
    Ok(Json(state.employees.delete(&caller, input.id).await?))
}

async fn activity_handler(
    State(state): State<AppState>,
    CurrentCaller(caller): CurrentCaller,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Vec<activity_logs::Model>>> {
    let Path(id) = id.map_err(bad_request)?;
    Ok(Json(state.employees.activity(&caller, id).await?))
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let backend = state.pool.get_database_backend();
    let db_ok = state
        .pool
        .execute(Statement::from_string(backend, "SELECT 1".to_string()))
        .await
        .is_ok();
    Json(HealthResponse {
        ok: db_ok,
        db_ok,
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    db_ok: bool,
    version: &'static str,
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to listen for CTRL+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    ctrl_c.await;

    #[cfg(unix)]
    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use sea_orm::DatabaseBackend;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    async fn test_router() -> Router {
        let pool = platform_db::connect_url("sqlite::memory:", 1).await.unwrap();
        for sql in [
            "CREATE TABLE employees (id INTEGER PRIMARY KEY AUTOINCREMENT, company_id INTEGER NOT NULL, name TEXT NOT NULL, description TEXT NULL, created_by_id INTEGER NULL, updated_by_id INTEGER NULL, deleted_by_id INTEGER NULL, created_at TEXT NULL, updated_at TEXT NULL, deleted_at TEXT NULL, UNIQUE (company_id, name));",
            "CREATE TABLE activity_logs (id INTEGER PRIMARY KEY AUTOINCREMENT, date_time TEXT NOT NULL, user_id INTEGER NOT NULL, module TEXT NOT NULL, entity_id INTEGER NOT NULL, entity_type_id INTEGER NOT NULL, activity_id INTEGER NOT NULL, activity TEXT NOT NULL, details TEXT NOT NULL);",
        ] {
            pool.execute(Statement::from_string(DatabaseBackend::Sqlite, sql))
                .await
                .unwrap();
        }
        build_router(AppState::new(pool, Arc::new(AppConfig::default())))
    }

    fn request(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(USER_ID_HEADER, "3")
            .header(COMPANY_ID_HEADER, "7")
            .header(PERMISSIONS_HEADER, "edit-employee");
        match body {
            Some(body) => builder
                .header(http::header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    #[tokio::test]
    async fn health_reports_database() {
        let router = test_router().await;
        let response = router
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["db_ok"], true);
    }

    #[tokio::test]
    async fn missing_identity_is_unauthenticated() {
        let router = test_router().await;
        let (status, body) = send(
            &router,
            Request::get("/employees").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "UNAUTHENTICATED");
    }

    #[tokio::test]
    async fn save_then_list_round_trip() {
        let router = test_router().await;
        let (status, body) = send(
            &router,
            request(Method::POST, "/employees", Some(json!({"name": "Alice", "status": "Active"}))),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Employee Added Successfully");
        let id = body["id"].as_i64().unwrap();

        let (status, page) = send(
            &router,
            request(Method::GET, "/employees?draw=2&order_by=name", None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(page["draw"], 2);
        assert_eq!(page["recordsTotal"], 1);
        assert_eq!(page["recordsFiltered"], 1);
        assert_eq!(page["data"][0]["id"], id);
        assert_eq!(page["data"][0]["description"], "--");
        assert_eq!(page["data"][0]["actions"], json!({"edit": true, "delete": false}));
    }

    #[tokio::test]
    async fn short_name_returns_validation_envelope() {
        let router = test_router().await;
        let (status, body) = send(
            &router,
            request(Method::POST, "/employees", Some(json!({"name": "Al"}))),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            body,
            json!({
                "success": false,
                "code": "VALIDATION",
                "errors": ["Name is Minimum 3 Charachers"],
            })
        );
    }

    #[tokio::test]
    async fn malformed_body_is_bad_request() {
        let router = test_router().await;
        let (status, body) = send(
            &router,
            request(Method::POST, "/employees/delete", Some(json!({"id": "seven"}))),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn form_and_delete_of_unknown_id_are_not_found() {
        let router = test_router().await;
        let (status, body) = send(&router, request(Method::GET, "/employees/form?id=42", None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["errors"], json!(["Employee not found"]));

        let (status, _) = send(
            &router,
            request(Method::POST, "/employees/delete", Some(json!({"id": 42}))),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_then_activity_history() {
        let router = test_router().await;
        let (_, created) = send(
            &router,
            request(Method::POST, "/employees", Some(json!({"name": "Alice"}))),
        )
        .await;
        let id = created["id"].as_i64().unwrap();

        let (status, form) = send(
            &router,
            request(Method::GET, &format!("/employees/form?id={id}"), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(form["action"], "Edit");
        assert_eq!(form["employee"]["name"], "Alice");

        let (status, history) = send(
            &router,
            request(Method::GET, &format!("/employees/{id}/activity"), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(history[0]["activity_id"], 280);

        let (status, deleted) = send(
            &router,
            request(Method::POST, "/employees/delete", Some(json!({"id": id}))),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(deleted["message"], "Employee Deleted Successfully");

        let (_, page) = send(&router, request(Method::GET, "/employees", None)).await;
        assert_eq!(page["recordsTotal"], 0);
    }

    #[test]
    fn caller_headers_are_parsed() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_static("3"));
        assert!(caller_from_headers(&headers).is_none());

        headers.insert(COMPANY_ID_HEADER, HeaderValue::from_static(" 7 "));
        headers.insert(
            PERMISSIONS_HEADER,
            HeaderValue::from_static("delete-employee, view-reports"),
        );
        let caller = caller_from_headers(&headers).unwrap();
        assert_eq!(caller.user_id, 3);
        assert_eq!(caller.company_id, 7);
        assert!(caller.grants.can(platform_authz::Permission::DeleteEmployee));
        assert!(!caller.grants.can(platform_authz::Permission::EditEmployee));

        headers.insert(COMPANY_ID_HEADER, HeaderValue::from_static("acme"));
        assert!(caller_from_headers(&headers).is_none());
    }
}
