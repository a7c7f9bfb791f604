// ==========================================
// 线缆生产订单管理系统 - 引擎层事件发布
// ==========================================
// 职责: 定义订单事件发布 trait, 实现依赖倒置
// 说明: 核心定义 trait, 外部协作方 (管理后台/移动端推送) 实现适配器
// ==========================================

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::sync::Arc;

// ==========================================
// 订单事件类型
// ==========================================

/// 订单事件触发类型
///
/// 核心在每次被接受的变更后发布, 用于通知下游刷新
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderEventType {
    /// 订单创建
    OrderCreated,
    /// 订单开工
    OrderStarted,
    /// 生产记录追加
    ProductionRecorded,
    /// 线盘入账
    SpoolAdded,
    /// 订单完工
    OrderCompleted,
    /// 订单取消
    OrderCancelled,
    /// 工艺规格变更
    SpecificationUpdated,
}

impl OrderEventType {
    /// 转换为字符串标识
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderEventType::OrderCreated => "OrderCreated",
            OrderEventType::OrderStarted => "OrderStarted",
            OrderEventType::ProductionRecorded => "ProductionRecorded",
            OrderEventType::SpoolAdded => "SpoolAdded",
            OrderEventType::OrderCompleted => "OrderCompleted",
            OrderEventType::OrderCancelled => "OrderCancelled",
            OrderEventType::SpecificationUpdated => "SpecificationUpdated",
        }
    }
}

/// 订单事件
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderEvent {
    /// 订单 ID
    pub order_id: String,
    /// 事件类型
    pub event_type: OrderEventType,
    /// 事件来源描述
    pub source: Option<String>,
    /// 事件负载 (JSON, 可选)
    pub payload_json: Option<serde_json::Value>,
}

impl OrderEvent {
    pub fn new(order_id: String, event_type: OrderEventType, source: Option<String>) -> Self {
        Self {
            order_id,
            event_type,
            source,
            payload_json: None,
        }
    }

    /// 设置事件负载 (转换为JSON)
    pub fn with_payload<T: serde::Serialize>(mut self, payload: &T) -> Self {
        self.payload_json = serde_json::to_value(payload).ok();
        self
    }
}

// ==========================================
// 事件发布 Trait
// ==========================================

/// 订单事件发布者 Trait
///
/// 核心定义, 外部实现; 发布失败不回滚已落库的变更,
/// 由调用方决定是否告警。
pub trait OrderEventPublisher: Send + Sync {
    /// 发布订单事件
    fn publish(&self, event: OrderEvent) -> Result<(), Box<dyn Error + Send + Sync>>;
}

/// 空操作事件发布者
///
/// 用于不需要事件发布的场景（如单元测试）
#[derive(Debug, Clone, Default)]
pub struct NoOpEventPublisher;

impl OrderEventPublisher for NoOpEventPublisher {
    fn publish(&self, event: OrderEvent) -> Result<(), Box<dyn Error + Send + Sync>> {
        tracing::debug!(
            order_id = %event.order_id,
            event_type = event.event_type.as_str(),
            "NoOpEventPublisher: 跳过事件发布"
        );
        Ok(())
    }
}

/// 可选的事件发布者包装
///
/// 简化 Option<Arc<dyn OrderEventPublisher>> 的使用
pub struct OptionalEventPublisher {
    inner: Option<Arc<dyn OrderEventPublisher>>,
}

impl OptionalEventPublisher {
    /// 创建带发布者的实例
    pub fn with_publisher(publisher: Arc<dyn OrderEventPublisher>) -> Self {
        Self {
            inner: Some(publisher),
        }
    }

    /// 创建空实例（不发布事件）
    pub fn none() -> Self {
        Self { inner: None }
    }

    /// 发布事件（如果有发布者）
    pub fn publish(&self, event: OrderEvent) {
        if let Some(publisher) = &self.inner {
            if let Err(e) = publisher.publish(event.clone()) {
                tracing::warn!(
                    order_id = %event.order_id,
                    event_type = event.event_type.as_str(),
                    error = %e,
                    "订单事件发布失败"
                );
            }
        }
    }

    /// 检查是否配置了发布者
    pub fn is_configured(&self) -> bool {
        self.inner.is_some()
    }
}

impl Default for OptionalEventPublisher {
    fn default() -> Self {
        Self::none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_publisher() {
        let publisher = NoOpEventPublisher;
        let event = OrderEvent::new(
            "O001".to_string(),
            OrderEventType::OrderCreated,
            Some("OrderApi".to_string()),
        );

        assert!(publisher.publish(event).is_ok());
    }

    #[test]
    fn test_optional_publisher_none() {
        let publisher = OptionalEventPublisher::none();
        assert!(!publisher.is_configured());

        // 未配置时发布为空操作
        publisher.publish(OrderEvent::new(
            "O001".to_string(),
            OrderEventType::OrderStarted,
            None,
        ));
    }

    #[test]
    fn test_optional_publisher_with_noop() {
        let noop = Arc::new(NoOpEventPublisher) as Arc<dyn OrderEventPublisher>;
        let publisher = OptionalEventPublisher::with_publisher(noop);
        assert!(publisher.is_configured());

        publisher.publish(OrderEvent::new(
            "O001".to_string(),
            OrderEventType::OrderCompleted,
            None,
        ));
    }

    #[test]
    fn test_event_with_payload() {
        let event = OrderEvent::new(
            "O001".to_string(),
            OrderEventType::SpoolAdded,
            Some("OrderApi".to_string()),
        )
        .with_payload(&serde_json::json!({ "spool_number": 3 }));

        let payload = event.payload_json.unwrap();
        assert_eq!(payload["spool_number"], 3);
    }

    #[test]
    fn test_event_type_as_str() {
        assert_eq!(OrderEventType::SpoolAdded.as_str(), "SpoolAdded");
        assert_eq!(
            OrderEventType::ProductionRecorded.as_str(),
            "ProductionRecorded"
        );
    }
}
