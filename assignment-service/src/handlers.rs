//! Handler模块

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    extract::{Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use common::errors::AppError;
use common::middleware::RequestId;
use common::models::{Assignment, CreateAssignmentRequest, PoolStats, SearchQuery};
use common::response::ApiResponse;
use crate::service::AssignmentServiceTrait;
use crate::state::AppState;

const SERVICE_NAME: &str = "assignment-service";

/// 为请求者分配号码
#[utoipa::path(
    post,
    path = "/api/assignments",
    tag = "assignments",
    request_body = CreateAssignmentRequest,
    responses(
        (status = 200, description = "号码已分配", body = ApiResponse<Assignment>),
        (status = 400, description = "请求参数校验失败"),
        (status = 409, description = "号码池剩余不足或号码已被占用"),
        (status = 503, description = "记录存储不可用")
    )
)]
pub async fn create_assignment(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    body: Result<Json<CreateAssignmentRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<Assignment>>, AppError> {
    let Json(req) = body?;
    let service = state.assignment_service();
    let data = service.assign(req).await?;
    Ok(Json(
        ApiResponse::ok_with_service(data, SERVICE_NAME).with_request_id(request_id.as_str()),
    ))
}

/// 按邮箱、电话或号码查询分配记录
#[utoipa::path(
    get,
    path = "/api/assignments/search",
    tag = "assignments",
    params(SearchQuery),
    responses(
        (status = 200, description = "匹配的分配记录（按时间倒序）", body = ApiResponse<Vec<Assignment>>),
        (status = 400, description = "查询参数或号码格式无效"),
        (status = 503, description = "记录存储不可用")
    )
)]
pub async fn search_assignments(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<Assignment>>>, AppError> {
    let Query(query) = query?;
    let service = state.assignment_service();
    let data = service.search(&query).await?;
    Ok(Json(
        ApiResponse::list(data)
            .with_service(SERVICE_NAME)
            .with_request_id(request_id.as_str()),
    ))
}

/// 号码池使用情况
#[utoipa::path(
    get,
    path = "/api/pool",
    tag = "assignments",
    responses(
        (status = 200, description = "号码池统计", body = ApiResponse<PoolStats>),
        (status = 503, description = "记录存储不可用")
    )
)]
pub async fn pool_stats(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<PoolStats>>, AppError> {
    let data = state.assignment_service().pool_stats().await?;
    Ok(Json(ApiResponse::ok_with_service(data, SERVICE_NAME)))
}

/// 健康检查端点
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "health",
    responses(
        (status = 200, description = "服务运行正常", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
        store: state.store.backend().to_string(),
    })
}

/// 健康检查响应
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    /// 服务状态
    pub status: String,
    /// 服务名称
    pub service: String,
    /// 服务版本
    pub version: String,
    /// 当前时间戳
    pub timestamp: DateTime<Utc>,
    /// 记录存储后端
    pub store: String,
}
