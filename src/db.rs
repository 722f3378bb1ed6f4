// ==========================================
// 张拉布框架报价系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为
// - 统一 busy_timeout，减少草稿快照频繁写入时的偶发 busy 错误
// - 提供建表脚本（目录 / 步骤文案 / 报价快照 / 配置）
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 默认数据库文件名
pub const DEFAULT_DB_FILE: &str = "tension_frame_quote.db";

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version     INTEGER NOT NULL PRIMARY KEY,
    applied_at  TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS catalog_record (
    category        TEXT NOT NULL,
    id              TEXT NOT NULL,
    name            TEXT NOT NULL,
    sell            REAL,
    sell_per_lm     REAL,
    sell_per_sqm    REAL,
    weight_per_lm   REAL,
    weight_per_sqm  REAL,
    tier            TEXT,
    destination     TEXT,
    PRIMARY KEY (category, id)
);

CREATE TABLE IF NOT EXISTS step_content (
    step_key  TEXT NOT NULL PRIMARY KEY,
    title     TEXT NOT NULL,
    subtitle  TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS quote_snapshot (
    quote_id      TEXT NOT NULL,
    revision      INTEGER NOT NULL,
    status        TEXT NOT NULL,
    payload_json  TEXT NOT NULL,
    grand_total   TEXT,
    created_at    TEXT NOT NULL,
    PRIMARY KEY (quote_id, revision, status)
);

CREATE INDEX IF NOT EXISTS idx_quote_snapshot_quote
    ON quote_snapshot (quote_id, revision DESC);

CREATE TABLE IF NOT EXISTS config_kv (
    scope_id  TEXT NOT NULL DEFAULT 'global',
    key       TEXT NOT NULL,
    value     TEXT NOT NULL,
    PRIMARY KEY (scope_id, key)
);
"#;

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

/// 建表（幂等）并登记 schema_version
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;
    Ok(())
}

/// 打开内存数据库并建表（测试/演示用）
pub fn open_in_memory() -> rusqlite::Result<Connection> {
    let conn = Connection::open_in_memory()?;
    configure_sqlite_connection(&conn)?;
    init_schema(&conn)?;
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

    let v: Option<i64> = conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

/// 获取默认数据库路径
///
/// 优先使用系统数据目录，失败时退回当前目录
pub fn get_default_db_path() -> String {
    match dirs::data_dir() {
        Some(dir) => {
            let app_dir = dir.join("tension-frame-quote");
            if let Err(e) = std::fs::create_dir_all(&app_dir) {
                tracing::warn!("无法创建数据目录 {}: {}，使用当前目录", app_dir.display(), e);
                return DEFAULT_DB_FILE.to_string();
            }
            app_dir.join(DEFAULT_DB_FILE).to_string_lossy().to_string()
        }
        None => DEFAULT_DB_FILE.to_string(),
    }
}
