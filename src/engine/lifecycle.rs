// ==========================================
// 线缆生产订单管理系统 - 订单生命周期引擎
// ==========================================
// 职责: 订单状态机与完工门槛
// 红线: WorkOrder 状态仅由本引擎修改
// 红线: 合法转换仅 PENDING→IN_PROGRESS→COMPLETED 与 *→CANCELLED (COMPLETED 除外)
// ==========================================

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::ConfigManager;
use crate::domain::order::{
    OrderDraft, ProductionSpecification, SpecificationDraft, WorkOrder,
};
use crate::domain::types::OrderStatus;
use crate::engine::error::{CoreError, CoreResult};
use crate::engine::order_lock::OrderLockManager;
use crate::repository::error::RepositoryError;
use crate::repository::order_repo::WorkOrderRepository;
use crate::repository::production_log_repo::ProductionLogRepository;

// ==========================================
// OrderLifecycleEngine - 订单生命周期引擎
// ==========================================
pub struct OrderLifecycleEngine {
    order_repo: Arc<WorkOrderRepository>,
    log_repo: Arc<ProductionLogRepository>,
    config_manager: Arc<ConfigManager>,
    locks: OrderLockManager,
}

impl OrderLifecycleEngine {
    /// 创建新的生命周期引擎
    pub fn new(
        order_repo: Arc<WorkOrderRepository>,
        log_repo: Arc<ProductionLogRepository>,
        config_manager: Arc<ConfigManager>,
        locks: OrderLockManager,
    ) -> Self {
        Self {
            order_repo,
            log_repo,
            config_manager,
            locks,
        }
    }

    // ==========================================
    // 参数校验
    // ==========================================

    /// 校验正数字段 (拒绝 NaN/无穷大/非正数)
    fn require_positive(field: &str, value: f64) -> CoreResult<()> {
        if !value.is_finite() || value <= 0.0 {
            return Err(CoreError::InvalidAttributes(format!(
                "{} 必须为正数, 实际为 {}",
                field, value
            )));
        }
        Ok(())
    }

    /// 校验订单草稿
    fn validate_order_draft(draft: &OrderDraft) -> CoreResult<()> {
        if draft.customer_id.trim().is_empty() {
            return Err(CoreError::InvalidAttributes(
                "客户引用不能为空".to_string(),
            ));
        }
        if draft.product_code.trim().is_empty() {
            return Err(CoreError::InvalidAttributes(
                "产品型号不能为空".to_string(),
            ));
        }
        Self::require_positive("cross_section_mm2", draft.cross_section_mm2)?;
        Self::require_positive("total_order_weight_kg", draft.total_order_weight_kg)?;
        Self::require_positive("total_order_length_m", draft.total_order_length_m)?;
        Ok(())
    }

    /// 校验工艺规格草稿
    ///
    /// 公差字段仅为描述性元数据, 但数值本身必须有效。
    fn validate_specification(draft: &SpecificationDraft) -> CoreResult<()> {
        Self::require_positive("insulation_thickness_mm", draft.insulation_thickness_mm)?;
        Self::require_positive("line_speed_m_per_min", draft.line_speed_m_per_min)?;
        Self::require_positive("diameter_tolerance_mm", draft.diameter_tolerance_mm)?;
        Self::require_positive("thickness_tolerance_mm", draft.thickness_tolerance_mm)?;
        Ok(())
    }

    // ==========================================
    // 内部辅助
    // ==========================================

    /// 按ID加载订单, 不存在时返回 OrderNotFound
    fn load_order(&self, order_id: &str) -> CoreResult<WorkOrder> {
        self.order_repo
            .find_by_id(order_id)?
            .ok_or_else(|| CoreError::OrderNotFound(order_id.to_string()))
    }

    /// 完工门槛比例 (config_kv: completion_threshold_ratio, 默认 1.0)
    fn completion_threshold_ratio(&self) -> CoreResult<f64> {
        let ratio = self
            .config_manager
            .completion_threshold_ratio()
            .map_err(RepositoryError::from)?;
        Ok(ratio)
    }

    // ==========================================
    // 状态机操作
    // ==========================================

    /// 创建订单 (初始状态 PENDING, 线盘数为 0)
    ///
    /// # 参数
    /// - `draft`: 订单草稿
    /// - `spec_draft`: 工艺规格草稿 (与订单一对一, 同一事务写入)
    ///
    /// # 返回
    /// - `Ok(order)`: 新订单
    /// - `Err(CoreError::InvalidAttributes)`: 草稿校验失败
    pub fn create_order(
        &self,
        draft: OrderDraft,
        spec_draft: SpecificationDraft,
    ) -> CoreResult<WorkOrder> {
        Self::validate_order_draft(&draft)?;
        Self::validate_specification(&spec_draft)?;

        let order_id = uuid::Uuid::new_v4().to_string();
        let order = WorkOrder::from_draft(order_id.clone(), draft);
        let spec = ProductionSpecification::from_draft(order_id, spec_draft);

        self.order_repo.create(&order, &spec)?;

        info!(
            order_id = %order.order_id,
            customer_id = %order.customer_id,
            product_code = %order.product_code,
            total_order_weight_kg = order.total_order_weight_kg,
            "订单已创建"
        );

        Ok(order)
    }

    /// 开工: PENDING → IN_PROGRESS
    ///
    /// # 错误
    /// - `CoreError::InvalidTransition`: 当前状态不是 PENDING
    pub fn start_order(&self, order_id: &str) -> CoreResult<()> {
        let _guard = self.locks.acquire(order_id)?;

        let order = self.load_order(order_id)?;
        if order.status != OrderStatus::Pending {
            warn!(
                order_id = %order_id,
                status = %order.status,
                "开工被拒绝: 订单不在 PENDING 状态"
            );
            return Err(CoreError::InvalidTransition {
                order_id: order_id.to_string(),
                from: order.status,
                to: OrderStatus::InProgress,
            });
        }

        self.order_repo
            .update_status(order_id, OrderStatus::Pending, OrderStatus::InProgress)?;

        info!(order_id = %order_id, "订单已开工");
        Ok(())
    }

    /// 完工: IN_PROGRESS → COMPLETED
    ///
    /// # 完工门槛
    /// 从生产记录仓储取产量汇总, 与
    /// `total_order_weight_kg × completion_threshold_ratio` 比较,
    /// 未达标返回 `IncompleteProduction`, 订单保持 IN_PROGRESS。
    pub fn complete_order(&self, order_id: &str) -> CoreResult<()> {
        let _guard = self.locks.acquire(order_id)?;

        let order = self.load_order(order_id)?;
        if order.status != OrderStatus::InProgress {
            warn!(
                order_id = %order_id,
                status = %order.status,
                "完工被拒绝: 订单不在 IN_PROGRESS 状态"
            );
            return Err(CoreError::InvalidTransition {
                order_id: order_id.to_string(),
                from: order.status,
                to: OrderStatus::Completed,
            });
        }

        let produced_kg = self.log_repo.aggregate_quantity_kg(order_id)?;
        let required_kg = order.total_order_weight_kg * self.completion_threshold_ratio()?;

        if produced_kg < required_kg {
            warn!(
                order_id = %order_id,
                produced_kg,
                required_kg,
                "完工被拒绝: 产量未达门槛"
            );
            return Err(CoreError::IncompleteProduction {
                order_id: order_id.to_string(),
                produced_kg,
                required_kg,
            });
        }

        self.order_repo
            .update_status(order_id, OrderStatus::InProgress, OrderStatus::Completed)?;

        info!(order_id = %order_id, produced_kg, required_kg, "订单已完工");
        Ok(())
    }

    /// 取消: 除 COMPLETED 外任意状态 → CANCELLED (终态)
    ///
    /// # 错误
    /// - `CoreError::InvalidTransition`: 订单已完工或已取消
    pub fn cancel_order(&self, order_id: &str) -> CoreResult<()> {
        let _guard = self.locks.acquire(order_id)?;

        let order = self.load_order(order_id)?;
        if order.status.is_terminal() {
            warn!(
                order_id = %order_id,
                status = %order.status,
                "取消被拒绝: 订单已处于终态"
            );
            return Err(CoreError::InvalidTransition {
                order_id: order_id.to_string(),
                from: order.status,
                to: OrderStatus::Cancelled,
            });
        }

        self.order_repo
            .update_status(order_id, order.status, OrderStatus::Cancelled)?;

        info!(order_id = %order_id, from = %order.status, "订单已取消");
        Ok(())
    }

    /// 更新工艺规格 (仅 PENDING 状态允许)
    ///
    /// # 错误
    /// - `CoreError::SpecificationLocked`: 订单已离开 PENDING
    pub fn update_specification(
        &self,
        order_id: &str,
        spec_draft: SpecificationDraft,
    ) -> CoreResult<ProductionSpecification> {
        Self::validate_specification(&spec_draft)?;

        let _guard = self.locks.acquire(order_id)?;

        let order = self.load_order(order_id)?;
        if order.status != OrderStatus::Pending {
            warn!(
                order_id = %order_id,
                status = %order.status,
                "规格变更被拒绝: 订单已离开 PENDING"
            );
            return Err(CoreError::SpecificationLocked {
                order_id: order_id.to_string(),
                status: order.status,
            });
        }

        let spec = ProductionSpecification::from_draft(order_id.to_string(), spec_draft);
        self.order_repo.update_specification(&spec)?;

        info!(order_id = %order_id, "工艺规格已更新");
        Ok(spec)
    }

    // ==========================================
    // 状态咨询 (供台账与记录引擎调用)
    // ==========================================

    /// 要求订单处于 IN_PROGRESS, 返回订单实体
    ///
    /// 台账与生产记录引擎在各自的订单锁内调用本方法,
    /// 本方法自身不加锁。
    ///
    /// # 错误
    /// - `CoreError::OrderNotStarted`: 订单仍在 PENDING
    /// - `CoreError::OrderClosed`: 订单已完工或已取消
    pub fn require_in_progress(&self, order_id: &str) -> CoreResult<WorkOrder> {
        let order = self.load_order(order_id)?;
        match order.status {
            OrderStatus::InProgress => Ok(order),
            OrderStatus::Pending => Err(CoreError::OrderNotStarted {
                order_id: order_id.to_string(),
                status: order.status,
            }),
            OrderStatus::Completed | OrderStatus::Cancelled => Err(CoreError::OrderClosed {
                order_id: order_id.to_string(),
                status: order.status,
            }),
        }
    }

    /// 查询订单 (不存在时返回 OrderNotFound)
    pub fn get_order(&self, order_id: &str) -> CoreResult<WorkOrder> {
        self.load_order(order_id)
    }
}
