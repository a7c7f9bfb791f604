// ==========================================
// 线缆生产订单管理系统 - 线盘台账引擎
// ==========================================
// 职责: 线盘入账与重量/长度汇总
// 红线: 台账只追加; 盘号订单内连续分配且永不复用
// 红线: 仅 IN_PROGRESS 订单可入账 (状态咨询走生命周期引擎)
// ==========================================

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::spool::{Spool, SpoolDraft};
use crate::engine::error::{CoreError, CoreResult};
use crate::engine::lifecycle::OrderLifecycleEngine;
use crate::engine::order_lock::OrderLockManager;
use crate::repository::spool_repo::SpoolRepository;

// ==========================================
// SpoolLedger - 线盘台账引擎
// ==========================================
pub struct SpoolLedger {
    spool_repo: Arc<SpoolRepository>,
    lifecycle: Arc<OrderLifecycleEngine>,
    locks: OrderLockManager,
}

impl SpoolLedger {
    /// 创建新的线盘台账引擎
    pub fn new(
        spool_repo: Arc<SpoolRepository>,
        lifecycle: Arc<OrderLifecycleEngine>,
        locks: OrderLockManager,
    ) -> Self {
        Self {
            spool_repo,
            lifecycle,
            locks,
        }
    }

    /// 校验线盘草稿的物理属性
    fn validate_draft(draft: &SpoolDraft) -> CoreResult<()> {
        for (field, value) in [
            ("naked_weight_kg", draft.naked_weight_kg),
            ("length_m", draft.length_m),
            ("diameter_mm", draft.diameter_mm),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(CoreError::InvalidAttributes(format!(
                    "{} 必须为正数, 实际为 {}",
                    field, value
                )));
            }
        }
        Ok(())
    }

    // ==========================================
    // 入账操作
    // ==========================================

    /// 线盘入账
    ///
    /// 在订单锁内完成 “状态检查 → 盘号分配 → 写入” 的复合操作:
    /// 盘号取当前最大盘号 + 1 (首个为 1), 保证连续无空洞。
    ///
    /// # 错误
    /// - `CoreError::InvalidAttributes`: 物理属性非正数
    /// - `CoreError::OrderNotStarted` / `CoreError::OrderClosed`: 订单状态不允许
    /// - `CoreError::Busy`: 订单锁等待超时
    pub fn add_spool(&self, order_id: &str, draft: SpoolDraft) -> CoreResult<Spool> {
        Self::validate_draft(&draft)?;

        let _guard = self.locks.acquire(order_id)?;

        // 状态咨询: 仅 IN_PROGRESS 可入账
        if let Err(e) = self.lifecycle.require_in_progress(order_id) {
            warn!(order_id = %order_id, error = %e, "线盘入账被拒绝");
            return Err(e);
        }

        let next_number = self.spool_repo.max_spool_number(order_id)?.unwrap_or(0) + 1;
        let spool = Spool::from_draft(order_id.to_string(), next_number, draft);

        self.spool_repo.insert(&spool)?;

        info!(
            order_id = %order_id,
            spool_number = spool.spool_number,
            naked_weight_kg = spool.naked_weight_kg,
            length_m = spool.length_m,
            "线盘已入账"
        );

        Ok(spool)
    }

    // ==========================================
    // 汇总查询 (供报表协作方使用)
    // ==========================================

    /// 订单裸线总重量 (kg)
    pub fn total_weight_kg(&self, order_id: &str) -> CoreResult<f64> {
        Ok(self.spool_repo.total_weight_kg(order_id)?)
    }

    /// 订单线长总计 (m)
    pub fn total_length_m(&self, order_id: &str) -> CoreResult<f64> {
        Ok(self.spool_repo.total_length_m(order_id)?)
    }

    /// 订单线盘数量
    pub fn spool_count(&self, order_id: &str) -> CoreResult<i64> {
        Ok(self.spool_repo.count_by_order(order_id)?)
    }

    /// 订单的全部线盘 (按盘号升序)
    pub fn list_spools(&self, order_id: &str) -> CoreResult<Vec<Spool>> {
        Ok(self.spool_repo.list_by_order(order_id)?)
    }
}
