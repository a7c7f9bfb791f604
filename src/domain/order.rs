// ==========================================
// 线缆生产订单管理系统 - 生产订单领域模型
// ==========================================
// 红线: WorkOrder 仅由生命周期引擎修改
// 红线: 工艺规格在订单离开 PENDING 后不可变更
// ==========================================

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::domain::types::OrderStatus;

// ==========================================
// WorkOrder - 生产订单
// ==========================================
// 对齐: work_order 表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkOrder {
    // ===== 主键与引用 =====
    pub order_id: String,    // 订单ID (UUID)
    pub customer_id: String, // 客户引用 (外部实体, 不透明)

    // ===== 产品属性 =====
    pub product_code: String,       // 产品型号 (如 "NYA-1x2.5")
    pub conductor_material: String, // 导体材质 (如 "CU" / "AL")
    pub cross_section_mm2: f64,     // 导体截面积 (mm²)

    // ===== 订货量 =====
    pub total_order_weight_kg: f64, // 订货总重量 (kg)
    pub total_order_length_m: f64,  // 订货总长度 (m)

    // ===== 状态 =====
    pub status: OrderStatus,

    // ===== 日期 =====
    pub order_date: NaiveDate,             // 下单日期
    pub delivery_date: Option<NaiveDate>,  // 交货日期

    // ===== 时间戳 =====
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl WorkOrder {
    /// 由草稿构造新订单 (初始状态 PENDING)
    ///
    /// # 参数
    /// - `order_id`: 订单ID (通常使用UUID)
    /// - `draft`: 订单草稿
    pub fn from_draft(order_id: String, draft: OrderDraft) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            order_id,
            customer_id: draft.customer_id,
            product_code: draft.product_code,
            conductor_material: draft.conductor_material,
            cross_section_mm2: draft.cross_section_mm2,
            total_order_weight_kg: draft.total_order_weight_kg,
            total_order_length_m: draft.total_order_length_m,
            status: OrderStatus::Pending,
            order_date: draft.order_date,
            delivery_date: draft.delivery_date,
            created_at: now,
            updated_at: now,
        }
    }
}

// ==========================================
// OrderDraft - 订单草稿
// ==========================================
// 用途: 创建订单时的输入, ID/状态/时间戳由引擎补齐
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDraft {
    pub customer_id: String,
    pub product_code: String,
    pub conductor_material: String,
    pub cross_section_mm2: f64,
    pub total_order_weight_kg: f64,
    pub total_order_length_m: f64,
    pub order_date: NaiveDate,
    pub delivery_date: Option<NaiveDate>,
}

// ==========================================
// ProductionSpecification - 工艺规格
// ==========================================
// 与 WorkOrder 一对一; 公差字段仅为描述性元数据, 不作为质量门槛
// 对齐: production_spec 表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductionSpecification {
    pub order_id: String,

    // ===== 工艺参数 =====
    pub insulation_thickness_mm: f64, // 绝缘层厚度 (mm)
    pub line_speed_m_per_min: f64,    // 生产线速度 (m/min)

    // ===== 公差 (描述性) =====
    pub diameter_tolerance_mm: f64,  // 外径公差 (mm)
    pub thickness_tolerance_mm: f64, // 壁厚公差 (mm)

    pub notes: Option<String>,
}

impl ProductionSpecification {
    /// 由草稿构造工艺规格
    pub fn from_draft(order_id: String, draft: SpecificationDraft) -> Self {
        Self {
            order_id,
            insulation_thickness_mm: draft.insulation_thickness_mm,
            line_speed_m_per_min: draft.line_speed_m_per_min,
            diameter_tolerance_mm: draft.diameter_tolerance_mm,
            thickness_tolerance_mm: draft.thickness_tolerance_mm,
            notes: draft.notes,
        }
    }
}

// ==========================================
// SpecificationDraft - 工艺规格草稿
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecificationDraft {
    pub insulation_thickness_mm: f64,
    pub line_speed_m_per_min: f64,
    pub diameter_tolerance_mm: f64,
    pub thickness_tolerance_mm: f64,
    #[serde(default)]
    pub notes: Option<String>,
}
