// ==========================================
// WorkOrderRepository - 生产订单仓储
// ==========================================
// 红线: Repository 不做业务逻辑, 只做数据映射
// 说明: 订单与工艺规格同属一个一致性域, 创建时在同一事务内写入
// ==========================================

use crate::domain::order::{ProductionSpecification, WorkOrder};
use crate::domain::types::OrderStatus;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

pub struct WorkOrderRepository {
    conn: Arc<Mutex<Connection>>,
}

impl WorkOrderRepository {
    /// 创建新的生产订单仓储
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // 写入操作
    // ==========================================

    /// 创建订单 (连同工艺规格, 同一事务)
    ///
    /// # 返回
    /// - `Ok(order_id)`: 成功插入
    /// - `Err(...)`: 数据库错误
    pub fn create(
        &self,
        order: &WorkOrder,
        spec: &ProductionSpecification,
    ) -> RepositoryResult<String> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        tx.execute(
            r#"INSERT INTO work_order (
                order_id, customer_id, product_code, conductor_material,
                cross_section_mm2, total_order_weight_kg, total_order_length_m,
                status, order_date, delivery_date, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
            params![
                order.order_id,
                order.customer_id,
                order.product_code,
                order.conductor_material,
                order.cross_section_mm2,
                order.total_order_weight_kg,
                order.total_order_length_m,
                order.status.to_db_str(),
                order.order_date.format("%Y-%m-%d").to_string(),
                order.delivery_date.map(|d| d.format("%Y-%m-%d").to_string()),
                order.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                order.updated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            ],
        )?;

        tx.execute(
            r#"INSERT INTO production_spec (
                order_id, insulation_thickness_mm, line_speed_m_per_min,
                diameter_tolerance_mm, thickness_tolerance_mm, notes
            ) VALUES (?, ?, ?, ?, ?, ?)"#,
            params![
                spec.order_id,
                spec.insulation_thickness_mm,
                spec.line_speed_m_per_min,
                spec.diameter_tolerance_mm,
                spec.thickness_tolerance_mm,
                spec.notes,
            ],
        )?;

        tx.commit()?;
        Ok(order.order_id.clone())
    }

    /// 状态转换 (带期望状态检查)
    ///
    /// # 并发控制
    /// UPDATE 附带 `status = expected` 条件; 行数为 0 时区分
    /// “记录不存在”与“状态已被并发修改”。
    ///
    /// # 错误
    /// - `RepositoryError::StaleState`: 当前状态与期望不符
    /// - `RepositoryError::NotFound`: order_id 不存在
    pub fn update_status(
        &self,
        order_id: &str,
        expected: OrderStatus,
        next: OrderStatus,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let now = chrono::Utc::now().naive_utc();

        let rows_affected = conn.execute(
            "UPDATE work_order SET status = ?, updated_at = ? WHERE order_id = ? AND status = ?",
            params![
                next.to_db_str(),
                now.format("%Y-%m-%d %H:%M:%S").to_string(),
                order_id,
                expected.to_db_str(),
            ],
        )?;

        if rows_affected == 0 {
            let actual: Result<String, _> = conn.query_row(
                "SELECT status FROM work_order WHERE order_id = ?",
                params![order_id],
                |row| row.get(0),
            );

            return match actual {
                Ok(actual_status) => Err(RepositoryError::StaleState {
                    message: format!(
                        "order_id={}, expected={}, actual={}",
                        order_id,
                        expected.to_db_str(),
                        actual_status
                    ),
                }),
                Err(_) => Err(RepositoryError::NotFound {
                    entity: "WorkOrder".to_string(),
                    id: order_id.to_string(),
                }),
            };
        }

        Ok(())
    }

    /// 更新工艺规格
    ///
    /// 是否允许更新由生命周期引擎判定 (仅 PENDING), 仓储不做状态检查。
    pub fn update_specification(&self, spec: &ProductionSpecification) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        let rows_affected = conn.execute(
            r#"UPDATE production_spec
               SET insulation_thickness_mm = ?, line_speed_m_per_min = ?,
                   diameter_tolerance_mm = ?, thickness_tolerance_mm = ?, notes = ?
               WHERE order_id = ?"#,
            params![
                spec.insulation_thickness_mm,
                spec.line_speed_m_per_min,
                spec.diameter_tolerance_mm,
                spec.thickness_tolerance_mm,
                spec.notes,
                spec.order_id,
            ],
        )?;

        if rows_affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "ProductionSpecification".to_string(),
                id: spec.order_id.clone(),
            });
        }

        Ok(())
    }

    // ==========================================
    // 查询操作
    // ==========================================

    /// 按ID查询订单
    pub fn find_by_id(&self, order_id: &str) -> RepositoryResult<Option<WorkOrder>> {
        let conn = self.get_conn()?;

        match conn.query_row(
            r#"SELECT order_id, customer_id, product_code, conductor_material,
                      cross_section_mm2, total_order_weight_kg, total_order_length_m,
                      status, order_date, delivery_date, created_at, updated_at
               FROM work_order
               WHERE order_id = ?"#,
            params![order_id],
            |row| Self::map_order_row(row),
        ) {
            Ok(order) => Ok(Some(order)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 按状态查询订单列表 (None 查询全部)
    pub fn list_by_status(&self, status: Option<OrderStatus>) -> RepositoryResult<Vec<WorkOrder>> {
        let conn = self.get_conn()?;

        let sql_all = r#"SELECT order_id, customer_id, product_code, conductor_material,
                      cross_section_mm2, total_order_weight_kg, total_order_length_m,
                      status, order_date, delivery_date, created_at, updated_at
               FROM work_order
               ORDER BY created_at DESC, order_id"#;
        let sql_filtered = r#"SELECT order_id, customer_id, product_code, conductor_material,
                      cross_section_mm2, total_order_weight_kg, total_order_length_m,
                      status, order_date, delivery_date, created_at, updated_at
               FROM work_order
               WHERE status = ?
               ORDER BY created_at DESC, order_id"#;

        let orders = match status {
            Some(s) => {
                let mut stmt = conn.prepare(sql_filtered)?;
                let rows = stmt
                    .query_map(params![s.to_db_str()], |row| Self::map_order_row(row))?
                    .collect::<Result<Vec<WorkOrder>, _>>()?;
                rows
            }
            None => {
                let mut stmt = conn.prepare(sql_all)?;
                let rows = stmt
                    .query_map([], |row| Self::map_order_row(row))?
                    .collect::<Result<Vec<WorkOrder>, _>>()?;
                rows
            }
        };

        Ok(orders)
    }

    /// 查询订单的工艺规格
    pub fn find_specification(
        &self,
        order_id: &str,
    ) -> RepositoryResult<Option<ProductionSpecification>> {
        let conn = self.get_conn()?;

        match conn.query_row(
            r#"SELECT order_id, insulation_thickness_mm, line_speed_m_per_min,
                      diameter_tolerance_mm, thickness_tolerance_mm, notes
               FROM production_spec
               WHERE order_id = ?"#,
            params![order_id],
            |row| {
                Ok(ProductionSpecification {
                    order_id: row.get(0)?,
                    insulation_thickness_mm: row.get(1)?,
                    line_speed_m_per_min: row.get(2)?,
                    diameter_tolerance_mm: row.get(3)?,
                    thickness_tolerance_mm: row.get(4)?,
                    notes: row.get(5)?,
                })
            },
        ) {
            Ok(spec) => Ok(Some(spec)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 映射数据库行到 WorkOrder 对象
    fn map_order_row(row: &rusqlite::Row) -> rusqlite::Result<WorkOrder> {
        let status_str: String = row.get(7)?;
        Ok(WorkOrder {
            order_id: row.get(0)?,
            customer_id: row.get(1)?,
            product_code: row.get(2)?,
            conductor_material: row.get(3)?,
            cross_section_mm2: row.get(4)?,
            total_order_weight_kg: row.get(5)?,
            total_order_length_m: row.get(6)?,
            status: OrderStatus::from_str(&status_str).ok_or_else(|| {
                rusqlite::Error::FromSqlConversionFailure(
                    7,
                    rusqlite::types::Type::Text,
                    format!("非法订单状态: {}", status_str).into(),
                )
            })?,
            order_date: parse_date(row, 8)?,
            delivery_date: row
                .get::<_, Option<String>>(9)?
                .and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()),
            created_at: parse_datetime(row, 10)?,
            updated_at: parse_datetime(row, 11)?,
        })
    }
}

/// 解析 TEXT 列中的日期 (%Y-%m-%d)
pub(super) fn parse_date(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<NaiveDate> {
    let s: String = row.get(idx)?;
    NaiveDate::parse_from_str(&s, "%Y-%m-%d").map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// 解析 TEXT 列中的时间戳 (%Y-%m-%d %H:%M:%S)
pub(super) fn parse_datetime(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<NaiveDateTime> {
    let s: String = row.get(idx)?;
    NaiveDateTime::parse_from_str(&s, "%Y-%m-%d %H:%M:%S").map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}
