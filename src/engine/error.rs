// ==========================================
// 线缆生产订单管理系统 - 引擎层错误类型
// ==========================================
// 职责: 订单生命周期的业务错误全集
// 红线: 所有错误信息必须包含显式原因 (可解释性)
// 工具: thiserror 派生宏
// ==========================================

use crate::domain::types::OrderStatus;
use crate::repository::error::RepositoryError;
use chrono::NaiveDateTime;
use thiserror::Error;

/// 引擎层错误类型
///
/// 外部 HTTP 层将这些错误种类映射为传输层失败码。
#[derive(Error, Debug)]
pub enum CoreError {
    // ===== 输入校验错误 (调用方修正后可重试) =====
    #[error("参数无效: {0}")]
    InvalidAttributes(String),

    // ===== 状态机错误 (不可自动重试) =====
    #[error("无效的状态转换: order_id={order_id}, from={from}, to={to}")]
    InvalidTransition {
        order_id: String,
        from: OrderStatus,
        to: OrderStatus,
    },

    #[error("订单尚未开工: order_id={order_id}, status={status}")]
    OrderNotStarted {
        order_id: String,
        status: OrderStatus,
    },

    #[error("订单已关闭: order_id={order_id}, status={status}")]
    OrderClosed {
        order_id: String,
        status: OrderStatus,
    },

    #[error("工艺规格已锁定: order_id={order_id}, status={status}")]
    SpecificationLocked {
        order_id: String,
        status: OrderStatus,
    },

    // ===== 排班冲突 (调整时间窗口后可重试) =====
    #[error("机台时间冲突: machine_id={machine_id}, window=[{start}, {end})")]
    MachineConflict {
        machine_id: String,
        start: NaiveDateTime,
        end: NaiveDateTime,
    },

    // ===== 完工门槛 (订单保持 IN_PROGRESS) =====
    #[error(
        "产量未达完工门槛: order_id={order_id}, produced={produced_kg}kg, required={required_kg}kg"
    )]
    IncompleteProduction {
        order_id: String,
        produced_kg: f64,
        required_kg: f64,
    },

    // ===== 并发控制 (瞬态, 可安全重试) =====
    #[error("订单正被其他操作占用: order_id={order_id}, 等待{waited_ms}ms后超时")]
    Busy { order_id: String, waited_ms: u64 },

    // ===== 数据访问 =====
    #[error("订单不存在: order_id={0}")]
    OrderNotFound(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Result 类型别名
pub type CoreResult<T> = Result<T, CoreError>;
