// ==========================================
// 线缆生产订单管理系统 - 生产记录领域模型
// ==========================================
// 红线: 生产记录只追加, 一条记录对应一次连续生产
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// ProductionLog - 生产记录
// ==========================================
// 员工与机台为外部参照实体, 核心仅持有其不透明ID
// 对齐: production_log 表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductionLog {
    pub log_id: String, // 记录ID (UUID)
    pub order_id: String,

    // ===== 外部引用 =====
    pub employee_id: String,
    pub machine_id: String,

    // ===== 产量与时间窗口 =====
    pub quantity_produced_kg: f64, // 本次产量 (kg)
    pub start_time: NaiveDateTime, // 开始时间 (含)
    pub end_time: NaiveDateTime,   // 结束时间 (不含)

    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
}

impl ProductionLog {
    /// 创建新的生产记录
    ///
    /// # 参数
    /// - `log_id`: 记录ID (通常使用UUID)
    /// - `order_id`: 订单ID
    /// - `employee_id`: 员工ID
    /// - `machine_id`: 机台ID
    /// - `quantity_produced_kg`: 产量 (kg)
    /// - `start_time` / `end_time`: 时间窗口 [start, end)
    pub fn new(
        log_id: String,
        order_id: String,
        employee_id: String,
        machine_id: String,
        quantity_produced_kg: f64,
        start_time: NaiveDateTime,
        end_time: NaiveDateTime,
    ) -> Self {
        Self {
            log_id,
            order_id,
            employee_id,
            machine_id,
            quantity_produced_kg,
            start_time,
            end_time,
            notes: None,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }

    /// 设置备注
    pub fn with_notes(mut self, notes: Option<String>) -> Self {
        self.notes = notes;
        self
    }

    /// 生产时长 (分钟)
    pub fn duration_minutes(&self) -> i64 {
        (self.end_time - self.start_time).num_minutes()
    }

    /// 时间窗口是否与 [start, end) 重叠
    ///
    /// 区间按半开处理: 首尾相接 (end == other.start) 不算重叠
    pub fn overlaps(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        self.start_time < end && start < self.end_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn dt(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 2)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn sample_log(start: NaiveDateTime, end: NaiveDateTime) -> ProductionLog {
        ProductionLog::new(
            "L001".to_string(),
            "O001".to_string(),
            "E001".to_string(),
            "M001".to_string(),
            50.0,
            start,
            end,
        )
    }

    #[test]
    fn test_overlaps_half_open() {
        let log = sample_log(dt(9, 0), dt(10, 0));

        // 首尾相接不算重叠
        assert!(!log.overlaps(dt(10, 0), dt(11, 0)));
        assert!(!log.overlaps(dt(8, 0), dt(9, 0)));

        // 部分重叠
        assert!(log.overlaps(dt(9, 30), dt(10, 30)));
        assert!(log.overlaps(dt(8, 30), dt(9, 30)));

        // 完全包含
        assert!(log.overlaps(dt(9, 10), dt(9, 50)));
        assert!(log.overlaps(dt(8, 0), dt(11, 0)));
    }

    #[test]
    fn test_duration_minutes() {
        let log = sample_log(dt(9, 0), dt(10, 30));
        assert_eq!(log.duration_minutes(), 90);
    }
}
