// ==========================================
// ProductionLogRepository - 生产记录仓储
// ==========================================
// 红线: 只追加, 不提供删除/修改接口
// 说明: aggregate_quantity_kg 是产量汇总的唯一出口,
//       完工门槛与进度报表都从这里取数
// ==========================================

use crate::domain::production_log::ProductionLog;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

use super::order_repo::parse_datetime;

pub struct ProductionLogRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ProductionLogRepository {
    /// 创建新的生产记录仓储
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

    /// 插入生产记录
    pub fn insert(&self, log: &ProductionLog) -> RepositoryResult<String> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"INSERT INTO production_log (
                log_id, order_id, employee_id, machine_id,
                quantity_produced_kg, start_time, end_time, notes, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
            params![
                log.log_id,
                log.order_id,
                log.employee_id,
                log.machine_id,
                log.quantity_produced_kg,
                log.start_time.format("%Y-%m-%d %H:%M:%S").to_string(),
                log.end_time.format("%Y-%m-%d %H:%M:%S").to_string(),
                log.notes,
                log.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            ],
        )?;

        Ok(log.log_id.clone())
    }

    // ==========================================
    // 查询操作
    // ==========================================

    /// 订单产量汇总 (kg)
    ///
    /// 唯一的产量汇总口径: 所有已接受记录的 quantity_produced_kg 之和。
    pub fn aggregate_quantity_kg(&self, order_id: &str) -> RepositoryResult<f64> {
        let conn = self.get_conn()?;

        let total: Option<f64> = conn.query_row(
            "SELECT SUM(quantity_produced_kg) FROM production_log WHERE order_id = ?",
            params![order_id],
            |row| row.get(0),
        )?;

        Ok(total.unwrap_or(0.0))
    }

    /// 机台在 [start, end) 窗口内是否存在重叠记录 (跨订单)
    ///
    /// 区间按半开处理: 已有记录的 end_time 等于新窗口的 start 不算重叠。
    /// 时间以 "%Y-%m-%d %H:%M:%S" 文本存储, 字典序即时间序。
    pub fn has_machine_overlap(
        &self,
        machine_id: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;

        let count: i64 = conn.query_row(
            r#"SELECT COUNT(*) FROM production_log
               WHERE machine_id = ? AND start_time < ? AND end_time > ?"#,
            params![
                machine_id,
                end.format("%Y-%m-%d %H:%M:%S").to_string(),
                start.format("%Y-%m-%d %H:%M:%S").to_string(),
            ],
            |row| row.get(0),
        )?;

        Ok(count > 0)
    }

    /// 查询订单的全部生产记录 (按开始时间升序)
    pub fn list_by_order(&self, order_id: &str) -> RepositoryResult<Vec<ProductionLog>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"SELECT log_id, order_id, employee_id, machine_id,
                      quantity_produced_kg, start_time, end_time, notes, created_at
               FROM production_log
               WHERE order_id = ?
               ORDER BY start_time, log_id"#,
        )?;

        let logs = stmt
            .query_map(params![order_id], |row| Self::map_row(row))?
            .collect::<Result<Vec<ProductionLog>, _>>()?;

        Ok(logs)
    }

    /// 订单生产记录数量
    pub fn count_by_order(&self, order_id: &str) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM production_log WHERE order_id = ?",
            params![order_id],
            |row| row.get(0),
        )?;

        Ok(count)
    }

    /// 映射数据库行到 ProductionLog 对象
    fn map_row(row: &rusqlite::Row) -> rusqlite::Result<ProductionLog> {
        Ok(ProductionLog {
            log_id: row.get(0)?,
            order_id: row.get(1)?,
            employee_id: row.get(2)?,
            machine_id: row.get(3)?,
            quantity_produced_kg: row.get(4)?,
            start_time: parse_datetime(row, 5)?,
            end_time: parse_datetime(row, 6)?,
            notes: row.get(7)?,
            created_at: parse_datetime(row, 8)?,
        })
    }
}
