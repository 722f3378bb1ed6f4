// ==========================================
// 张拉布框架报价系统 - 步骤文案仓储
// ==========================================
// 职责: 读取向导步骤标题/副标题
// 红线: 文案只用于展示；读取失败由 API 层回退到内置文案
// ==========================================

use crate::domain::content::StepHeader;
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};

// ==========================================
// ContentReader Trait
// ==========================================
#[async_trait]
pub trait ContentReader: Send + Sync {
    /// 读取步骤文案
    ///
    /// # 返回
    /// - Err(NotFound): 该步骤无文案
    async fn get_text(&self, step_key: &str) -> RepositoryResult<StepHeader>;
}

// ==========================================
// StepContentRepository - SQLite 实现
// ==========================================
pub struct StepContentRepository {
    conn: Arc<Mutex<Connection>>,
}

impl StepContentRepository {
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

    /// 写入/覆盖步骤文案
    pub fn upsert(&self, step_key: &str, header: &StepHeader) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO step_content (step_key, title, subtitle)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(step_key) DO UPDATE SET
                title = excluded.title,
                subtitle = excluded.subtitle
            "#,
            params![step_key, header.title, header.subtitle],
        )?;
        Ok(())
    }

    pub fn find(&self, step_key: &str) -> RepositoryResult<Option<StepHeader>> {
        let conn = self.get_conn()?;
        let header = conn
            .query_row(
                "SELECT title, subtitle FROM step_content WHERE step_key = ?1",
                params![step_key],
                |row| Ok(StepHeader::new(row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?;
        Ok(header)
    }
}

#[async_trait]
impl ContentReader for StepContentRepository {
    async fn get_text(&self, step_key: &str) -> RepositoryResult<StepHeader> {
        self.find(step_key)?.ok_or_else(|| RepositoryError::NotFound {
            entity: "step_content".to_string(),
            id: step_key.to_string(),
        })
    }
}
