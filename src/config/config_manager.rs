// ==========================================
// 线缆生产订单管理系统 - 配置管理器
// ==========================================
// 职责: 策略配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::db::open_sqlite_connection;
use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};
use tracing::warn;

// ==========================================
// 配置键全集
// ==========================================
pub mod config_keys {
    /// 完工门槛比例 (产量需达到 订货重量 × 该比例)
    pub const COMPLETION_THRESHOLD_RATIO: &str = "completion_threshold_ratio";
    /// 订单锁等待超时 (毫秒)
    pub const ORDER_LOCK_WAIT_MS: &str = "order_lock_wait_ms";
}

/// 完工门槛比例默认值: 必须达到或超过订货重量
pub const DEFAULT_COMPLETION_THRESHOLD_RATIO: f64 = 1.0;

/// 订单锁等待超时默认值（毫秒）
pub const DEFAULT_ORDER_LOCK_WAIT_MS: u64 = 5_000;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self> {
        let conn = open_sqlite_connection(db_path).context("打开配置数据库失败")?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self> {
        {
            let conn_guard = conn
                .lock()
                .map_err(|e| anyhow::anyhow!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    fn get_config_value(&self, key: &str) -> Result<Option<String>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| anyhow::anyhow!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 读取 global scope 的配置值（公开方法，供其他模块复用）
    pub fn get_global_config_value(&self, key: &str) -> Result<Option<String>> {
        self.get_config_value(key)
    }

    /// 写入 global scope 的配置值 (INSERT OR REPLACE)
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| anyhow::anyhow!("锁获取失败: {}", e))?;

        conn.execute(
            r#"INSERT OR REPLACE INTO config_kv (scope_id, key, value, updated_at)
               VALUES ('global', ?1, ?2, datetime('now'))"#,
            params![key, value],
        )?;

        Ok(())
    }

    // ==========================================
    // 类型化读取
    // ==========================================

    /// 完工门槛比例 (默认 1.0)
    ///
    /// 值非法 (非数字/非正数/NaN) 时告警并回落默认值。
    pub fn completion_threshold_ratio(&self) -> Result<f64> {
        let raw = self.get_config_value(config_keys::COMPLETION_THRESHOLD_RATIO)?;

        let ratio = match raw {
            Some(s) => match s.trim().parse::<f64>() {
                Ok(v) if v.is_finite() && v > 0.0 => v,
                _ => {
                    warn!(
                        key = config_keys::COMPLETION_THRESHOLD_RATIO,
                        value = %s,
                        "配置值非法, 回落默认值"
                    );
                    DEFAULT_COMPLETION_THRESHOLD_RATIO
                }
            },
            None => DEFAULT_COMPLETION_THRESHOLD_RATIO,
        };

        Ok(ratio)
    }

    /// 订单锁等待超时 (毫秒, 默认 5000)
    pub fn order_lock_wait_ms(&self) -> Result<u64> {
        let raw = self.get_config_value(config_keys::ORDER_LOCK_WAIT_MS)?;

        let ms = match raw {
            Some(s) => match s.trim().parse::<u64>() {
                Ok(v) if v > 0 => v,
                _ => {
                    warn!(
                        key = config_keys::ORDER_LOCK_WAIT_MS,
                        value = %s,
                        "配置值非法, 回落默认值"
                    );
                    DEFAULT_ORDER_LOCK_WAIT_MS
                }
            },
            None => DEFAULT_ORDER_LOCK_WAIT_MS,
        };

        Ok(ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    fn setup() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        db::configure_sqlite_connection(&conn).unwrap();
        db::init_schema(&conn).unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn))).unwrap()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = setup();
        assert_eq!(
            config.completion_threshold_ratio().unwrap(),
            DEFAULT_COMPLETION_THRESHOLD_RATIO
        );
        assert_eq!(
            config.order_lock_wait_ms().unwrap(),
            DEFAULT_ORDER_LOCK_WAIT_MS
        );
    }

    #[test]
    fn test_set_and_read_back() {
        let config = setup();
        config
            .set_global_config_value(config_keys::COMPLETION_THRESHOLD_RATIO, "0.95")
            .unwrap();
        assert_eq!(config.completion_threshold_ratio().unwrap(), 0.95);

        config
            .set_global_config_value(config_keys::ORDER_LOCK_WAIT_MS, "200")
            .unwrap();
        assert_eq!(config.order_lock_wait_ms().unwrap(), 200);
    }

    #[test]
    fn test_invalid_value_falls_back_to_default() {
        let config = setup();
        config
            .set_global_config_value(config_keys::COMPLETION_THRESHOLD_RATIO, "not-a-number")
            .unwrap();
        assert_eq!(
            config.completion_threshold_ratio().unwrap(),
            DEFAULT_COMPLETION_THRESHOLD_RATIO
        );

        config
            .set_global_config_value(config_keys::COMPLETION_THRESHOLD_RATIO, "-1.0")
            .unwrap();
        assert_eq!(
            config.completion_threshold_ratio().unwrap(),
            DEFAULT_COMPLETION_THRESHOLD_RATIO
        );
    }
}
