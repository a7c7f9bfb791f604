// ==========================================
// 线缆生产订单管理系统 - 线盘领域模型
// ==========================================
// 红线: 线盘台账只追加, 盘号不复用
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::SpoolType;

// ==========================================
// Spool - 线盘
// ==========================================
// 盘号在订单内唯一且从 1 连续递增
// 对齐: spool 表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spool {
    pub order_id: String,
    pub spool_number: i32, // 订单内盘号 (从1开始连续分配)

    // ===== 物理属性 =====
    pub naked_weight_kg: f64, // 裸线重量 (kg, 不含盘具)
    pub length_m: f64,        // 线长 (m)
    pub diameter_mm: f64,     // 成品外径 (mm)
    pub spool_type: SpoolType,

    pub created_at: NaiveDateTime,
}

impl Spool {
    /// 由草稿构造线盘 (盘号由台账引擎分配)
    pub fn from_draft(order_id: String, spool_number: i32, draft: SpoolDraft) -> Self {
        Self {
            order_id,
            spool_number,
            naked_weight_kg: draft.naked_weight_kg,
            length_m: draft.length_m,
            diameter_mm: draft.diameter_mm,
            spool_type: draft.spool_type,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }
}

// ==========================================
// SpoolDraft - 线盘草稿
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpoolDraft {
    pub naked_weight_kg: f64,
    pub length_m: f64,
    pub diameter_mm: f64,
    pub spool_type: SpoolType,
}
