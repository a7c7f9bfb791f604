// ==========================================
// 线缆生产订单管理系统 - 引擎层
// ==========================================
// 职责: 实现订单生命周期业务规则, 不拼 SQL
// 红线: 状态机检查与写入必须在同一订单锁内完成 (check-then-act)
// 红线: 所有拒绝必须输出可解释的错误原因
// ==========================================

pub mod error;
pub mod events;
pub mod lifecycle;
pub mod log_recorder;
pub mod order_lock;
pub mod spool_ledger;

// 重导出核心引擎
pub use error::{CoreError, CoreResult};
pub use events::{
    NoOpEventPublisher, OptionalEventPublisher, OrderEvent, OrderEventPublisher, OrderEventType,
};
pub use lifecycle::OrderLifecycleEngine;
pub use log_recorder::ProductionLogRecorder;
pub use order_lock::{OrderLockGuard, OrderLockManager};
pub use spool_ledger::SpoolLedger;
