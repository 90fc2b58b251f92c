//! 号码分配业务服务模块

use async_trait::async_trait;
use validator::Validate;

use common::errors::{AppError, AppResult};
use common::models::{Assignment, CreateAssignmentRequest, PoolStats, SearchQuery, SearchType};

use crate::allocation::AllocationService;
use crate::lookup::LookupService;

/// 号码分配服务 Trait
#[async_trait]
pub trait AssignmentServiceTrait: Send + Sync {
    /// 分配号码并持久化为一条分配记录
    async fn assign(&self, req: CreateAssignmentRequest) -> AppResult<Assignment>;

    /// 按邮箱、电话或号码查询分配记录
    async fn search(&self, query: &SearchQuery) -> AppResult<Vec<Assignment>>;

    /// 号码池使用情况
    async fn pool_stats(&self) -> AppResult<PoolStats>;
}

/// 号码分配服务
///
/// Drives the allocation component and commits its draw; the draw and the
/// commit are separate store round trips.
pub struct AssignmentService {
    allocation: AllocationService,
    lookup: LookupService,
    max_request_quantity: usize,
}

impl AssignmentService {
    /// 创建新的分配服务实例
    pub fn new(
        allocation: AllocationService,
        lookup: LookupService,
        max_request_quantity: usize,
    ) -> Self {
        Self {
            allocation,
            lookup,
            max_request_quantity,
        }
    }
}

#[async_trait]
impl AssignmentServiceTrait for AssignmentService {
    async fn assign(&self, req: CreateAssignmentRequest) -> AppResult<Assignment> {
        let req = req.normalized();
        req.validate()?;
        if req.quantity > self.max_request_quantity {
            return Err(AppError::Validation(format!(
                "quantity must be at most {}",
                self.max_request_quantity
            )));
        }

        let identifiers = self.allocation.allocate(req.quantity).await?;
        let assignment = self
            .allocation
            .store()
            .insert(req.into_new_assignment(identifiers))
            .await?;

        tracing::info!(
            id = %assignment.id,
            quantity = assignment.quantity,
            "号码已分配"
        );
        Ok(assignment)
    }

    async fn search(&self, query: &SearchQuery) -> AppResult<Vec<Assignment>> {
        let value = query.normalized_value();
        let found = match query.by {
            SearchType::Email => self.lookup.find_by_email(&value).await?,
            SearchType::Phone => self.lookup.find_by_phone(&value).await?,
            SearchType::Identifier => self.lookup.find_by_identifier(&value).await?,
        };
        tracing::info!(by = %query.by, matches = found.len(), "查询完成");
        Ok(found)
    }

    async fn pool_stats(&self) -> AppResult<PoolStats> {
        self.allocation.stats().await
    }
}
