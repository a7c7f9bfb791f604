// ==========================================
// 线缆生产订单管理系统 - 订单 API
// ==========================================
// 职责: 订单生命周期操作编排、进度查询、事件发布
// 说明: 业务规则全部在引擎层, 本层只做编排与观测
// ==========================================

use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::order::{
    OrderDraft, ProductionSpecification, SpecificationDraft, WorkOrder,
};
use crate::domain::production_log::ProductionLog;
use crate::domain::spool::{Spool, SpoolDraft};
use crate::domain::types::OrderStatus;
use crate::engine::error::{CoreError, CoreResult};
use crate::engine::events::{
    OptionalEventPublisher, OrderEvent, OrderEventPublisher, OrderEventType,
};
use crate::engine::lifecycle::OrderLifecycleEngine;
use crate::engine::log_recorder::ProductionLogRecorder;
use crate::engine::spool_ledger::SpoolLedger;
use crate::perf::PerfGuard;
use crate::repository::order_repo::WorkOrderRepository;

// ==========================================
// OrderProgress - 订单进度视图
// ==========================================

/// 订单进度汇总 (供报表协作方使用)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderProgress {
    pub order_id: String,
    pub status: OrderStatus,

    // ===== 产量进度 =====
    pub total_order_weight_kg: f64, // 订货重量
    pub produced_kg: f64,           // 已记录产量
    pub completion_ratio: f64,      // produced / total

    // ===== 台账汇总 =====
    pub spool_count: i64,
    pub spool_total_weight_kg: f64,
    pub spool_total_length_m: f64,

    pub log_count: i64,
}

// ==========================================
// OrderApi - 订单 API
// ==========================================

/// 订单API
///
/// 职责：
/// 1. 生命周期操作（创建、开工、完工、取消、规格变更）
/// 2. 生产活动（线盘入账、生产记录）
/// 3. 查询（订单、规格、台账、记录、进度汇总）
/// 4. 变更事件发布
pub struct OrderApi {
    order_repo: Arc<WorkOrderRepository>,
    lifecycle: Arc<OrderLifecycleEngine>,
    ledger: Arc<SpoolLedger>,
    recorder: Arc<ProductionLogRecorder>,
    // 事件发布器（依赖倒置: 下游协作方实现适配器）
    event_publisher: OptionalEventPublisher,
}

impl OrderApi {
    /// 创建新的OrderApi实例
    pub fn new(
        order_repo: Arc<WorkOrderRepository>,
        lifecycle: Arc<OrderLifecycleEngine>,
        ledger: Arc<SpoolLedger>,
        recorder: Arc<ProductionLogRecorder>,
        event_publisher: Option<Arc<dyn OrderEventPublisher>>,
    ) -> Self {
        let event_publisher = match event_publisher {
            Some(p) => OptionalEventPublisher::with_publisher(p),
            None => OptionalEventPublisher::none(),
        };

        Self {
            order_repo,
            lifecycle,
            ledger,
            recorder,
            event_publisher,
        }
    }

    fn publish(&self, order_id: &str, event_type: OrderEventType) {
        self.event_publisher.publish(OrderEvent::new(
            order_id.to_string(),
            event_type,
            Some("OrderApi".to_string()),
        ));
    }

    fn publish_with_payload<T: serde::Serialize>(
        &self,
        order_id: &str,
        event_type: OrderEventType,
        payload: &T,
    ) {
        self.event_publisher.publish(
            OrderEvent::new(
                order_id.to_string(),
                event_type,
                Some("OrderApi".to_string()),
            )
            .with_payload(payload),
        );
    }

    // ==========================================
    // 生命周期操作
    // ==========================================

    /// 创建订单 (连同工艺规格)
    pub fn create_order(
        &self,
        draft: OrderDraft,
        spec_draft: SpecificationDraft,
    ) -> CoreResult<WorkOrder> {
        let _perf = PerfGuard::new("create_order");

        let order = self.lifecycle.create_order(draft, spec_draft)?;
        self.publish(&order.order_id, OrderEventType::OrderCreated);
        Ok(order)
    }

    /// 开工
    pub fn start_order(&self, order_id: &str) -> CoreResult<()> {
        let _perf = PerfGuard::new("start_order");

        self.lifecycle.start_order(order_id)?;
        self.publish(order_id, OrderEventType::OrderStarted);
        Ok(())
    }

    /// 完工 (产量需达到完工门槛)
    pub fn complete_order(&self, order_id: &str) -> CoreResult<()> {
        let _perf = PerfGuard::new("complete_order");

        self.lifecycle.complete_order(order_id)?;
        self.publish(order_id, OrderEventType::OrderCompleted);
        Ok(())
    }

    /// 取消 (终态)
    pub fn cancel_order(&self, order_id: &str) -> CoreResult<()> {
        let _perf = PerfGuard::new("cancel_order");

        self.lifecycle.cancel_order(order_id)?;
        self.publish(order_id, OrderEventType::OrderCancelled);
        Ok(())
    }

    /// 更新工艺规格 (仅 PENDING)
    pub fn update_specification(
        &self,
        order_id: &str,
        spec_draft: SpecificationDraft,
    ) -> CoreResult<ProductionSpecification> {
        let _perf = PerfGuard::new("update_specification");

        let spec = self.lifecycle.update_specification(order_id, spec_draft)?;
        self.publish(order_id, OrderEventType::SpecificationUpdated);
        Ok(spec)
    }

    // ==========================================
    // 生产活动
    // ==========================================

    /// 线盘入账
    pub fn add_spool(&self, order_id: &str, draft: SpoolDraft) -> CoreResult<Spool> {
        let _perf = PerfGuard::new("add_spool");

        let spool = self.ledger.add_spool(order_id, draft)?;
        self.publish_with_payload(
            order_id,
            OrderEventType::SpoolAdded,
            &serde_json::json!({
                "spool_number": spool.spool_number,
                "naked_weight_kg": spool.naked_weight_kg,
                "length_m": spool.length_m,
            }),
        );
        Ok(spool)
    }

    /// 追加生产记录
    #[allow(clippy::too_many_arguments)]
    pub fn record_production(
        &self,
        order_id: &str,
        employee_id: &str,
        machine_id: &str,
        quantity_kg: f64,
        start: NaiveDateTime,
        end: NaiveDateTime,
        notes: Option<String>,
    ) -> CoreResult<ProductionLog> {
        let _perf = PerfGuard::new("record_production");

        let log = self.recorder.record(
            order_id,
            employee_id,
            machine_id,
            quantity_kg,
            start,
            end,
            notes,
        )?;
        self.publish_with_payload(
            order_id,
            OrderEventType::ProductionRecorded,
            &serde_json::json!({
                "log_id": log.log_id,
                "machine_id": log.machine_id,
                "quantity_produced_kg": log.quantity_produced_kg,
            }),
        );
        Ok(log)
    }

    // ==========================================
    // 查询接口
    // ==========================================

    /// 查询订单
    pub fn get_order(&self, order_id: &str) -> CoreResult<WorkOrder> {
        self.lifecycle.get_order(order_id)
    }

    /// 查询订单的工艺规格
    pub fn get_specification(&self, order_id: &str) -> CoreResult<ProductionSpecification> {
        self.order_repo
            .find_specification(order_id)?
            .ok_or_else(|| CoreError::OrderNotFound(order_id.to_string()))
    }

    /// 按状态查询订单列表 (None 查询全部)
    pub fn list_orders(&self, status: Option<OrderStatus>) -> CoreResult<Vec<WorkOrder>> {
        Ok(self.order_repo.list_by_status(status)?)
    }

    /// 查询订单的全部线盘
    pub fn list_spools(&self, order_id: &str) -> CoreResult<Vec<Spool>> {
        self.ledger.list_spools(order_id)
    }

    /// 查询订单的全部生产记录
    pub fn list_logs(&self, order_id: &str) -> CoreResult<Vec<ProductionLog>> {
        self.recorder.list_logs(order_id)
    }

    /// 订单进度汇总
    ///
    /// 产量口径与完工门槛一致 (生产记录仓储的唯一汇总出口)。
    pub fn order_progress(&self, order_id: &str) -> CoreResult<OrderProgress> {
        let _perf = PerfGuard::new("order_progress");

        let order = self.lifecycle.get_order(order_id)?;
        let produced_kg = self.recorder.aggregate_quantity_kg(order_id)?;

        Ok(OrderProgress {
            order_id: order.order_id.clone(),
            status: order.status,
            total_order_weight_kg: order.total_order_weight_kg,
            produced_kg,
            completion_ratio: if order.total_order_weight_kg > 0.0 {
                produced_kg / order.total_order_weight_kg
            } else {
                0.0
            },
            spool_count: self.ledger.spool_count(order_id)?,
            spool_total_weight_kg: self.ledger.total_weight_kg(order_id)?,
            spool_total_length_m: self.ledger.total_length_m(order_id)?,
            log_count: self.recorder.log_count(order_id)?,
        })
    }
}
