// ==========================================
// 员工/机台目录仓储
// ==========================================
// 职责: 外部参照实体的只读存在性查询
// 说明: 核心不拥有员工/机台属性, 仅校验引用存在且在用
// ==========================================

use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

// ==========================================
// EmployeeDirectory - 员工目录
// ==========================================
pub struct EmployeeDirectory {
    conn: Arc<Mutex<Connection>>,
}

impl EmployeeDirectory {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 员工是否存在且在用
    pub fn exists(&self, employee_id: &str) -> RepositoryResult<bool> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM employee_master WHERE employee_id = ? AND is_active = 1",
            params![employee_id],
            |row| row.get(0),
        )?;

        Ok(count > 0)
    }
}

// ==========================================
// MachineDirectory - 机台目录
// ==========================================
pub struct MachineDirectory {
    conn: Arc<Mutex<Connection>>,
}

impl MachineDirectory {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 机台是否存在且在用
    pub fn exists(&self, machine_id: &str) -> RepositoryResult<bool> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM machine_master WHERE machine_id = ? AND is_active = 1",
            params![machine_id],
            |row| row.get(0),
        )?;

        Ok(count > 0)
    }
}
