// ==========================================
// SpoolRepository - 线盘台账仓储
// ==========================================
// 红线: 只追加, 不提供删除/修改接口
// ==========================================

use crate::domain::spool::Spool;
use crate::domain::types::SpoolType;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

use super::order_repo::parse_datetime;

pub struct SpoolRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SpoolRepository {
    /// 创建新的线盘台账仓储
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

    /// 插入线盘
    ///
    /// 盘号由台账引擎在订单锁内分配; 主键 (order_id, spool_number)
    /// 兜底拦截重复盘号。
    pub fn insert(&self, spool: &Spool) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"INSERT INTO spool (
                order_id, spool_number, naked_weight_kg, length_m,
                diameter_mm, spool_type, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)"#,
            params![
                spool.order_id,
                spool.spool_number,
                spool.naked_weight_kg,
                spool.length_m,
                spool.diameter_mm,
                spool.spool_type.to_db_str(),
                spool.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            ],
        )?;

        Ok(())
    }

    // ==========================================
    // 查询操作
    // ==========================================

    /// 查询订单当前最大盘号 (无线盘时返回 None)
    pub fn max_spool_number(&self, order_id: &str) -> RepositoryResult<Option<i32>> {
        let conn = self.get_conn()?;

        let max: Option<i32> = conn.query_row(
            "SELECT MAX(spool_number) FROM spool WHERE order_id = ?",
            params![order_id],
            |row| row.get(0),
        )?;

        Ok(max)
    }

    /// 查询订单的全部线盘 (按盘号升序)
    pub fn list_by_order(&self, order_id: &str) -> RepositoryResult<Vec<Spool>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"SELECT order_id, spool_number, naked_weight_kg, length_m,
                      diameter_mm, spool_type, created_at
               FROM spool
               WHERE order_id = ?
               ORDER BY spool_number"#,
        )?;

        let spools = stmt
            .query_map(params![order_id], |row| Self::map_row(row))?
            .collect::<Result<Vec<Spool>, _>>()?;

        Ok(spools)
    }

    /// 订单线盘数量
    pub fn count_by_order(&self, order_id: &str) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM spool WHERE order_id = ?",
            params![order_id],
            |row| row.get(0),
        )?;

        Ok(count)
    }

    /// 订单裸线总重量 (kg)
    pub fn total_weight_kg(&self, order_id: &str) -> RepositoryResult<f64> {
        let conn = self.get_conn()?;

        let total: Option<f64> = conn.query_row(
            "SELECT SUM(naked_weight_kg) FROM spool WHERE order_id = ?",
            params![order_id],
            |row| row.get(0),
        )?;

        Ok(total.unwrap_or(0.0))
    }

    /// 订单线长总计 (m)
    pub fn total_length_m(&self, order_id: &str) -> RepositoryResult<f64> {
        let conn = self.get_conn()?;

        let total: Option<f64> = conn.query_row(
            "SELECT SUM(length_m) FROM spool WHERE order_id = ?",
            params![order_id],
            |row| row.get(0),
        )?;

        Ok(total.unwrap_or(0.0))
    }

    /// 映射数据库行到 Spool 对象
    fn map_row(row: &rusqlite::Row) -> rusqlite::Result<Spool> {
        let type_str: String = row.get(5)?;
        Ok(Spool {
            order_id: row.get(0)?,
            spool_number: row.get(1)?,
            naked_weight_kg: row.get(2)?,
            length_m: row.get(3)?,
            diameter_mm: row.get(4)?,
            spool_type: SpoolType::from_str(&type_str).ok_or_else(|| {
                rusqlite::Error::FromSqlConversionFailure(
                    5,
                    rusqlite::types::Type::Text,
                    format!("非法线盘类型: {}", type_str).into(),
                )
            })?,
            created_at: parse_datetime(row, 6)?,
        })
    }
}
