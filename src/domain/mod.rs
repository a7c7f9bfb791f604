// ==========================================
// 线缆生产订单管理系统 - 领域层
// ==========================================
// 职责: 实体与类型定义, 不含数据访问与业务流程
// ==========================================

pub mod order;
pub mod production_log;
pub mod spool;
pub mod types;

// 重导出核心实体
pub use order::{OrderDraft, ProductionSpecification, SpecificationDraft, WorkOrder};
pub use production_log::ProductionLog;
pub use spool::{Spool, SpoolDraft};
pub use types::{OrderStatus, SpoolType};
