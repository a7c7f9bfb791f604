// ==========================================
// 线缆生产订单管理系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 生产订单生命周期核心 (订单状态机 / 线盘台账 / 生产记录)
// 红线: 状态转换单向推进, 台账与生产记录只追加
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 业务规则
pub mod engine;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA/建表统一）
pub mod db;

// 日志系统
pub mod logging;

// 性能观测
pub mod perf;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{OrderStatus, SpoolType};

// 领域实体
pub use domain::{
    OrderDraft, ProductionLog, ProductionSpecification, SpecificationDraft, Spool, SpoolDraft,
    WorkOrder,
};

// 引擎
pub use engine::{
    CoreError, CoreResult, NoOpEventPublisher, OptionalEventPublisher, OrderEvent,
    OrderEventPublisher, OrderEventType, OrderLifecycleEngine, OrderLockManager,
    ProductionLogRecorder, SpoolLedger,
};

// API
pub use api::{OrderApi, OrderProgress};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "线缆生产订单管理系统";

// 数据库版本
pub const DB_VERSION: &str = "v0.1";
