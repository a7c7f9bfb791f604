// ==========================================
// 线缆生产订单管理系统 - API 层
// ==========================================
// 职责: 面向外部 HTTP 层的业务接口
// 说明: 错误种类由外部层映射为传输层失败码
// ==========================================

pub mod order_api;

// 重导出核心 API
pub use order_api::{OrderApi, OrderProgress};
