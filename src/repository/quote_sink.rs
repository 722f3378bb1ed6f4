// ==========================================
// 张拉布框架报价系统 - 报价持久化端
// ==========================================
// 职责: 保存草稿快照与定稿报价；按报价 ID 恢复最新草稿
// 红线:
// - 只追加，不修改已写入的快照
// - 定稿记录每个报价只有一条 (status = completed, revision 固定)
// ==========================================

use crate::domain::quote::{FinalizedQuote, QuoteSnapshot};
use crate::domain::types::QuoteStatus;
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};

// ==========================================
// QuoteSink Trait
// ==========================================
// 用途: 报价会话在每次变更后推送草稿、定稿后推送结果
// 实现者: QuoteSnapshotRepository（使用 rusqlite），测试中的内存记录器
#[async_trait]
pub trait QuoteSink: Send + Sync {
    /// 写入草稿快照
    async fn write_draft(&self, snapshot: &QuoteSnapshot) -> RepositoryResult<()>;

    /// 写入定稿报价
    async fn write_final(&self, quote: &FinalizedQuote) -> RepositoryResult<()>;
}

// ==========================================
// QuoteSnapshotRepository - SQLite 实现
// ==========================================
pub struct QuoteSnapshotRepository {
    conn: Arc<Mutex<Connection>>,
}

/// 定稿记录使用的固定 revision
const FINAL_REVISION: i64 = -1;

impl QuoteSnapshotRepository {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = crate::db::open_sqlite_connection(db_path)?;
        crate::db::init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 保存草稿快照（同一 revision 重复写入时覆盖）
    pub fn insert_draft(&self, snapshot: &QuoteSnapshot) -> RepositoryResult<()> {
        let payload = serde_json::to_string(snapshot)?;
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT OR REPLACE INTO quote_snapshot (
                quote_id, revision, status, payload_json, grand_total, created_at
            ) VALUES (?1, ?2, ?3, ?4, NULL, ?5)
            "#,
            params![
                snapshot.quote_id,
                snapshot.revision as i64,
                QuoteStatus::Draft.to_db_str(),
                payload,
                snapshot.captured_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// 保存定稿报价
    ///
    /// # 返回
    /// - Err(UniqueConstraintViolation): 该报价已有定稿记录
    pub fn insert_final(&self, quote: &FinalizedQuote) -> RepositoryResult<()> {
        let payload = serde_json::to_string(quote)?;
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO quote_snapshot (
                quote_id, revision, status, payload_json, grand_total, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                quote.quote_id,
                FINAL_REVISION,
                QuoteStatus::Completed.to_db_str(),
                payload,
                quote.grand_total.to_string(),
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// 最新草稿快照
    pub fn latest_snapshot(&self, quote_id: &str) -> RepositoryResult<Option<QuoteSnapshot>> {
        let conn = self.get_conn()?;
        let payload: Option<String> = conn
            .query_row(
                r#"
                SELECT payload_json FROM quote_snapshot
                WHERE quote_id = ?1 AND status = ?2
                ORDER BY revision DESC
                LIMIT 1
                "#,
                params![quote_id, QuoteStatus::Draft.to_db_str()],
                |row| row.get(0),
            )
            .optional()?;

        match payload {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// 定稿报价
    pub fn find_final(&self, quote_id: &str) -> RepositoryResult<Option<FinalizedQuote>> {
        let conn = self.get_conn()?;
        let payload: Option<String> = conn
            .query_row(
                "SELECT payload_json FROM quote_snapshot WHERE quote_id = ?1 AND status = ?2",
                params![quote_id, QuoteStatus::Completed.to_db_str()],
                |row| row.get(0),
            )
            .optional()?;

        match payload {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// 草稿快照数量
    pub fn count_drafts(&self, quote_id: &str) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let n = conn.query_row(
            "SELECT COUNT(*) FROM quote_snapshot WHERE quote_id = ?1 AND status = ?2",
            params![quote_id, QuoteStatus::Draft.to_db_str()],
            |row| row.get(0),
        )?;
        Ok(n)
    }
}

#[async_trait]
impl QuoteSink for QuoteSnapshotRepository {
    async fn write_draft(&self, snapshot: &QuoteSnapshot) -> RepositoryResult<()> {
        self.insert_draft(snapshot)
    }

    async fn write_final(&self, quote: &FinalizedQuote) -> RepositoryResult<()> {
        self.insert_final(quote)
    }
}
