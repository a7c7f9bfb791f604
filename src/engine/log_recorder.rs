// ==========================================
// 线缆生产订单管理系统 - 生产记录引擎
// ==========================================
// 职责: 生产事件的校验与追加
// 红线: 记录只追加; 同一机台时间窗口 [start, end) 不得重叠 (跨订单)
// 红线: 仅 IN_PROGRESS 订单可记录 (状态咨询走生命周期引擎)
// ==========================================

use std::sync::Arc;

use chrono::NaiveDateTime;
use tracing::{info, warn};

use crate::domain::production_log::ProductionLog;
use crate::engine::error::{CoreError, CoreResult};
use crate::engine::lifecycle::OrderLifecycleEngine;
use crate::engine::order_lock::OrderLockManager;
use crate::repository::directory_repo::{EmployeeDirectory, MachineDirectory};
use crate::repository::production_log_repo::ProductionLogRepository;

// ==========================================
// ProductionLogRecorder - 生产记录引擎
// ==========================================
pub struct ProductionLogRecorder {
    log_repo: Arc<ProductionLogRepository>,
    employee_dir: Arc<EmployeeDirectory>,
    machine_dir: Arc<MachineDirectory>,
    lifecycle: Arc<OrderLifecycleEngine>,
    locks: OrderLockManager,
}

impl ProductionLogRecorder {
    /// 创建新的生产记录引擎
    pub fn new(
        log_repo: Arc<ProductionLogRepository>,
        employee_dir: Arc<EmployeeDirectory>,
        machine_dir: Arc<MachineDirectory>,
        lifecycle: Arc<OrderLifecycleEngine>,
        locks: OrderLockManager,
    ) -> Self {
        Self {
            log_repo,
            employee_dir,
            machine_dir,
            lifecycle,
            locks,
        }
    }

    /// 校验生产事件输入
    ///
    /// # 校验规则
    /// 1. end > start (时间窗口非空)
    /// 2. quantity > 0 且为有限数
    /// 3. 员工/机台引用非空, 且在目录中存在并在用
    fn validate_event(
        &self,
        employee_id: &str,
        machine_id: &str,
        quantity_kg: f64,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> CoreResult<()> {
        if end <= start {
            return Err(CoreError::InvalidAttributes(format!(
                "结束时间必须晚于开始时间: start={}, end={}",
                start, end
            )));
        }
        if !quantity_kg.is_finite() || quantity_kg <= 0.0 {
            return Err(CoreError::InvalidAttributes(format!(
                "quantity_produced_kg 必须为正数, 实际为 {}",
                quantity_kg
            )));
        }
        if employee_id.trim().is_empty() {
            return Err(CoreError::InvalidAttributes(
                "员工引用不能为空".to_string(),
            ));
        }
        if machine_id.trim().is_empty() {
            return Err(CoreError::InvalidAttributes(
                "机台引用不能为空".to_string(),
            ));
        }
        if !self.employee_dir.exists(employee_id)? {
            return Err(CoreError::InvalidAttributes(format!(
                "员工不存在或已停用: {}",
                employee_id
            )));
        }
        if !self.machine_dir.exists(machine_id)? {
            return Err(CoreError::InvalidAttributes(format!(
                "机台不存在或已停用: {}",
                machine_id
            )));
        }
        Ok(())
    }

    // ==========================================
    // 记录操作
    // ==========================================

    /// 追加生产记录
    ///
    /// 在订单锁内完成 “状态检查 → 机台冲突检查 → 写入” 的复合操作。
    ///
    /// # 错误
    /// - `CoreError::InvalidAttributes`: 输入校验失败
    /// - `CoreError::OrderNotStarted` / `CoreError::OrderClosed`: 订单状态不允许
    /// - `CoreError::MachineConflict`: 机台时间窗口重叠 (双重占用)
    /// - `CoreError::Busy`: 订单锁等待超时
    #[allow(clippy::too_many_arguments)]
    pub fn record(
        &self,
        order_id: &str,
        employee_id: &str,
        machine_id: &str,
        quantity_kg: f64,
        start: NaiveDateTime,
        end: NaiveDateTime,
        notes: Option<String>,
    ) -> CoreResult<ProductionLog> {
        self.validate_event(employee_id, machine_id, quantity_kg, start, end)?;

        let _guard = self.locks.acquire(order_id)?;

        // 状态咨询: 仅 IN_PROGRESS 可记录
        if let Err(e) = self.lifecycle.require_in_progress(order_id) {
            warn!(order_id = %order_id, error = %e, "生产记录被拒绝");
            return Err(e);
        }

        // 机台双重占用检查 (跨订单, 半开区间)
        if self.log_repo.has_machine_overlap(machine_id, start, end)? {
            warn!(
                order_id = %order_id,
                machine_id = %machine_id,
                start = %start,
                end = %end,
                "生产记录被拒绝: 机台时间冲突"
            );
            return Err(CoreError::MachineConflict {
                machine_id: machine_id.to_string(),
                start,
                end,
            });
        }

        let log = ProductionLog::new(
            uuid::Uuid::new_v4().to_string(),
            order_id.to_string(),
            employee_id.to_string(),
            machine_id.to_string(),
            quantity_kg,
            start,
            end,
        )
        .with_notes(notes);

        self.log_repo.insert(&log)?;

        info!(
            order_id = %order_id,
            log_id = %log.log_id,
            employee_id = %employee_id,
            machine_id = %machine_id,
            quantity_kg,
            duration_minutes = log.duration_minutes(),
            "生产记录已追加"
        );

        Ok(log)
    }

    // ==========================================
    // 汇总查询
    // ==========================================

    /// 订单产量汇总 (kg) — 完工门槛的取数口径
    pub fn aggregate_quantity_kg(&self, order_id: &str) -> CoreResult<f64> {
        Ok(self.log_repo.aggregate_quantity_kg(order_id)?)
    }

    /// 订单的全部生产记录 (按开始时间升序)
    pub fn list_logs(&self, order_id: &str) -> CoreResult<Vec<ProductionLog>> {
        Ok(self.log_repo.list_by_order(order_id)?)
    }

    /// 订单生产记录数量
    pub fn log_count(&self, order_id: &str) -> CoreResult<i64> {
        Ok(self.log_repo.count_by_order(order_id)?)
    }
}
