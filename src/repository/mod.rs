// ==========================================
// 线缆生产订单管理系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口, 屏蔽数据库细节
// 约束: 所有查询使用参数化, 防止 SQL 注入
// ==========================================

pub mod directory_repo;
pub mod error;
pub mod order_repo;
pub mod production_log_repo;
pub mod spool_repo;

// 重导出核心仓储
pub use directory_repo::{EmployeeDirectory, MachineDirectory};
pub use error::{RepositoryError, RepositoryResult};
pub use order_repo::WorkOrderRepository;
pub use production_log_repo::ProductionLogRepository;
pub use spool_repo::SpoolRepository;
