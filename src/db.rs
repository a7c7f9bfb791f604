// ==========================================
// 线缆生产订单管理系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为，避免“部分模块外键开启/部分不开启”
// - 统一 busy_timeout，减少并发写入时的偶发 busy 错误
// - 统一建表入口，库自身拥有 schema（测试与应用共用）
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

/// 初始化数据库 schema（幂等）
///
/// 所有表使用 CREATE TABLE IF NOT EXISTS，可在已有库上重复执行。
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS config_scope (
            scope_id TEXT PRIMARY KEY,
            scope_type TEXT NOT NULL,
            scope_key TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(scope_type, scope_key)
        );

        INSERT OR IGNORE INTO config_scope (scope_id, scope_type, scope_key)
        VALUES ('global', 'GLOBAL', 'global');

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL REFERENCES config_scope(scope_id) ON DELETE CASCADE,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (scope_id, key)
        );

        -- 生产订单主表
        CREATE TABLE IF NOT EXISTS work_order (
            order_id TEXT PRIMARY KEY,
            customer_id TEXT NOT NULL,
            product_code TEXT NOT NULL,
            conductor_material TEXT NOT NULL,
            cross_section_mm2 REAL NOT NULL,
            total_order_weight_kg REAL NOT NULL,
            total_order_length_m REAL NOT NULL,
            status TEXT NOT NULL,
            order_date TEXT NOT NULL,
            delivery_date TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        -- 工艺规格表 (与 work_order 一对一)
        CREATE TABLE IF NOT EXISTS production_spec (
            order_id TEXT PRIMARY KEY REFERENCES work_order(order_id) ON DELETE CASCADE,
            insulation_thickness_mm REAL NOT NULL,
            line_speed_m_per_min REAL NOT NULL,
            diameter_tolerance_mm REAL NOT NULL,
            thickness_tolerance_mm REAL NOT NULL,
            notes TEXT
        );

        -- 线盘台账表 (只追加, 盘号订单内唯一且连续)
        CREATE TABLE IF NOT EXISTS spool (
            order_id TEXT NOT NULL REFERENCES work_order(order_id),
            spool_number INTEGER NOT NULL,
            naked_weight_kg REAL NOT NULL,
            length_m REAL NOT NULL,
            diameter_mm REAL NOT NULL,
            spool_type TEXT NOT NULL,
            created_at TEXT NOT NULL,
            PRIMARY KEY (order_id, spool_number)
        );

        -- 生产记录表 (只追加)
        CREATE TABLE IF NOT EXISTS production_log (
            log_id TEXT PRIMARY KEY,
            order_id TEXT NOT NULL REFERENCES work_order(order_id),
            employee_id TEXT NOT NULL,
            machine_id TEXT NOT NULL,
            quantity_produced_kg REAL NOT NULL,
            start_time TEXT NOT NULL,
            end_time TEXT NOT NULL,
            notes TEXT,
            created_at TEXT NOT NULL
        );

        -- 机台时间冲突检查走该索引
        CREATE INDEX IF NOT EXISTS idx_production_log_machine_time
            ON production_log (machine_id, start_time);

        CREATE INDEX IF NOT EXISTS idx_production_log_order
            ON production_log (order_id);

        -- 员工目录 (外部参照实体, 只读镜像)
        CREATE TABLE IF NOT EXISTS employee_master (
            employee_id TEXT PRIMARY KEY,
            employee_name TEXT,
            is_active INTEGER NOT NULL DEFAULT 1
        );

        -- 机台目录 (外部参照实体, 只读镜像)
        CREATE TABLE IF NOT EXISTS machine_master (
            machine_id TEXT PRIMARY KEY,
            machine_name TEXT,
            machine_type TEXT,
            is_active INTEGER NOT NULL DEFAULT 1
        );
        "#,
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;

    Ok(())
}
