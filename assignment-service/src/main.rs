//! 号码分配与查询服务
//!
//! 从 000–999 的固定号码池中为请求者分配唯一号码，包括：
//! - 根据已有记录计算剩余号码并随机抽取
//! - 分配结果持久化
//! - 按邮箱、电话或号码查询分配记录

mod allocation;
mod handlers;
mod lookup;
mod routes;
mod service;
mod state;
mod store;

use axum::{middleware, routing::get, Json, Router};
use common::config::AppConfig;
use common::middleware::request_id::request_id_middleware;
use state::AppState;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;

const SERVICE_NAME: &str = "assignment-service";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "号码分配服务 API",
        version = "0.1.0",
        description = "号码分配与查询微服务"
    ),
    paths(
        handlers::create_assignment,
        handlers::search_assignments,
        handlers::pool_stats,
        handlers::health_check,
    ),
    components(schemas(
        common::models::Assignment,
        common::models::CreateAssignmentRequest,
        common::models::PoolStats,
        common::models::SearchType,
        handlers::HealthResponse,
    )),
    tags(
        (name = "assignments", description = "号码分配与查询端点"),
        (name = "health", description = "健康检查端点")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志追踪
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // 加载配置（.env 文件优先于默认值，环境变量优先于 .env）
    let config = AppConfig::load_with_service(SERVICE_NAME);

    // 创建应用状态（连接记录存储）
    let state = AppState::connect(config.clone()).await?;

    // 创建路由
    let app = create_router(state);

    // 启动服务
    let addr = format!("{}:{}", config.host, config.port);
    info!(
        service = %config.service_name,
        address = %addr,
        store = %config.store_backend,
        "启动服务"
    );

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(routes::router())
        .route("/api-docs/openapi.json", get(openapi_json))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::store::testing::{Containment, TestStore};
    use crate::store::MemoryStore;

    fn app_over(store: Arc<dyn store::AssignmentStore>) -> Router {
        create_router(AppState::new(AppConfig::default(), store))
    }

    fn memory_app() -> Router {
        app_over(Arc::new(MemoryStore::new()))
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn post_assignment(body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/assignments")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_create_then_search_by_every_key() {
        let app = memory_app();
        let (status, body) = send(
            &app,
            post_assignment(json!({
                "name": "Ana",
                "email": "Ana@Example.com",
                "phone": "+54 911 5555",
                "quantity": 3
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], json!(true));
        assert!(body["meta"]["request_id"].is_string());
        let created = body["data"].clone();
        assert_eq!(created["email"], json!("ana@example.com"));
        assert_eq!(created["identifiers"].as_array().unwrap().len(), 3);

        let (_, by_email) = send(&app, get_request("/api/assignments/search?by=email&value=ANA%40example.com")).await;
        assert_eq!(by_email["data"], json!([created.clone()]));
        assert_eq!(by_email["meta"]["count"], json!(1));

        let (_, by_phone) = send(&app, get_request("/api/assignments/search?by=whatsapp&value=%2B54%20911%205555")).await;
        assert_eq!(by_phone["data"], json!([created.clone()]));

        let identifier = created["identifiers"][0].as_str().unwrap().to_string();
        let uri = format!("/api/assignments/search?by=identifier&value={}", identifier);
        let (_, by_identifier) = send(&app, get_request(&uri)).await;
        assert_eq!(by_identifier["data"], json!([created]));

        let (_, pool) = send(&app, get_request("/api/pool")).await;
        assert_eq!(pool["data"], json!({ "total": 1000, "assigned": 3, "available": 997 }));
    }

    #[tokio::test]
    async fn test_invalid_identifier_is_bad_request() {
        let app = memory_app();
        for value in ["12a", "1234", ""] {
            let uri = format!("/api/assignments/search?by=number&value={}", value);
            let (status, body) = send(&app, get_request(&uri)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "value {:?}", value);
            assert_eq!(body["error"]["code"], json!("INVALID_QUERY"));
        }
    }

    #[tokio::test]
    async fn test_malformed_query_uses_error_envelope() {
        let app = memory_app();
        for uri in [
            "/api/assignments/search?by=foo&value=1",
            "/api/assignments/search?value=1",
        ] {
            let (status, body) = send(&app, get_request(uri)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "uri {}", uri);
            assert_eq!(body["success"], json!(false));
            assert_eq!(body["error"]["code"], json!("VALIDATION_ERROR"));
        }
    }

    #[tokio::test]
    async fn test_malformed_body_uses_error_envelope() {
        let app = memory_app();
        let req = Request::builder()
            .method("POST")
            .uri("/api/assignments")
            .header("content-type", "application/json")
            .body(Body::from("{\"name\": \"Ana\""))
            .unwrap();
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], json!("VALIDATION_ERROR"));
    }

    #[tokio::test]
    async fn test_validation_errors() {
        let app = memory_app();
        let (status, body) = send(
            &app,
            post_assignment(json!({
                "name": "Ana",
                "email": "ana@example.com",
                "phone": "1",
                "quantity": 101
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], json!("VALIDATION_ERROR"));
    }

    #[tokio::test]
    async fn test_pool_exhausted_is_conflict_with_counts() {
        let app = memory_app();
        for _ in 0..9 {
            let (status, _) = send(
                &app,
                post_assignment(json!({
                    "name": "Ana", "email": "a@x.com", "phone": "1", "quantity": 100
                })),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
        }
        let (status, body) = send(
            &app,
            post_assignment(json!({
                "name": "Bo", "email": "b@x.com", "phone": "2", "quantity": 100
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{}", body);

        let (status, body) = send(
            &app,
            post_assignment(json!({
                "name": "Cy", "email": "c@x.com", "phone": "3", "quantity": 1
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], json!("POOL_EXHAUSTED"));
        assert_eq!(body["error"]["details"], json!({ "available": 0, "requested": 1 }));
    }

    #[tokio::test]
    async fn test_search_falls_back_when_containment_fails() {
        let inner = Arc::new(MemoryStore::new());
        let app = app_over(Arc::new(
            TestStore::new(inner.clone()).containment(Containment::Failing),
        ));
        let (_, body) = send(
            &app,
            post_assignment(json!({
                "name": "Ana", "email": "a@x.com", "phone": "1", "quantity": 2
            })),
        )
        .await;
        let identifier = body["data"]["identifiers"][1].as_str().unwrap().to_string();

        let uri = format!("/api/assignments/search?by=identifier&value={}", identifier);
        let (status, found) = send(&app, get_request(&uri)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(found["data"], json!([body["data"].clone()]));
    }

    #[tokio::test]
    async fn test_store_outage_is_service_unavailable() {
        let app = app_over(Arc::new(
            TestStore::new(Arc::new(MemoryStore::new())).failing_scan(),
        ));
        let (status, body) = send(&app, get_request("/api/pool")).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"]["code"], json!("STORE_UNAVAILABLE"));
    }

    #[tokio::test]
    async fn test_request_id_is_echoed() {
        let app = memory_app();
        let req = Request::builder()
            .uri("/api/health")
            .header("x-request-id", "req-123")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(
            response.headers().get("x-request-id").unwrap(),
            "req-123"
        );
    }

    #[tokio::test]
    async fn test_health_and_openapi() {
        let app = memory_app();
        let (status, body) = send(&app, get_request("/api/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["store"], json!("memory"));

        let (status, doc) = send(&app, get_request("/api-docs/openapi.json")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(doc["paths"]["/api/assignments"].is_object());
    }
}
