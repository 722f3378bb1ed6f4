// ==========================================
// 张拉布框架报价系统 - 目录费率仓储
// ==========================================
// 职责: 按目录集合读取费率记录；导入时批量写入
// 红线: Repository 不含计价逻辑；引擎只通过 CatalogReader 读取
// ==========================================

use crate::domain::catalog::CatalogRateRecord;
use crate::domain::types::FreightTier;
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex, MutexGuard};

// ==========================================
// CatalogReader Trait
// ==========================================
// 用途: 报价会话读取目录
// 实现者: CatalogRecordRepository（使用 rusqlite），测试中的内存目录
#[async_trait]
pub trait CatalogReader: Send + Sync {
    /// 列出某目录集合的全部记录（按名称排序）
    ///
    /// # 参数
    /// - category: 目录集合名 (frame/fabric/freight/...)
    async fn list_records(&self, category: &str) -> RepositoryResult<Vec<CatalogRateRecord>>;

    /// 按 ID 读取单条记录
    ///
    /// # 返回
    /// - Err(NotFound): 记录不存在
    async fn get_record(&self, category: &str, id: &str) -> RepositoryResult<CatalogRateRecord>;
}

// ==========================================
// CatalogRecordRepository - SQLite 实现
// ==========================================
pub struct CatalogRecordRepository {
    conn: Arc<Mutex<Connection>>,
}

const SELECT_COLUMNS: &str = r#"
    id, category, name, sell, sell_per_lm, sell_per_sqm,
    weight_per_lm, weight_per_sqm, tier, destination
"#;

impl CatalogRecordRepository {
    /// 创建新的仓储实例
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = crate::db::open_sqlite_connection(db_path)?;
        crate::db::init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<CatalogRateRecord> {
        let tier: Option<String> = row.get(8)?;
        Ok(CatalogRateRecord {
            id: row.get(0)?,
            category: row.get(1)?,
            name: row.get(2)?,
            sell: row.get(3)?,
            sell_per_lm: row.get(4)?,
            sell_per_sqm: row.get(5)?,
            weight_per_lm: row.get(6)?,
            weight_per_sqm: row.get(7)?,
            tier: tier.as_deref().and_then(FreightTier::parse),
            destination: row.get(9)?,
        })
    }

    /// 按集合读取（同步）
    pub fn find_by_category(&self, category: &str) -> RepositoryResult<Vec<CatalogRateRecord>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM catalog_record WHERE category = ?1 ORDER BY name, id",
            SELECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let records = stmt
            .query_map(params![category], Self::map_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// 按主键读取（同步）
    pub fn find_by_id(&self, category: &str, id: &str) -> RepositoryResult<Option<CatalogRateRecord>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM catalog_record WHERE category = ?1 AND id = ?2",
            SELECT_COLUMNS
        );
        let record = conn
            .query_row(&sql, params![category, id], Self::map_row)
            .optional()?;
        Ok(record)
    }

    /// 批量写入（INSERT OR REPLACE，单事务）
    ///
    /// # 返回
    /// - Ok(usize): 写入的记录数
    /// - Err: 数据库错误（整个事务回滚）
    pub fn upsert_batch(&self, records: &[CatalogRateRecord]) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let mut count = 0;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT OR REPLACE INTO catalog_record (
                    category, id, name, sell, sell_per_lm, sell_per_sqm,
                    weight_per_lm, weight_per_sqm, tier, destination
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                "#,
            )?;

            for record in records {
                stmt.execute(params![
                    record.category,
                    record.id,
                    record.name,
                    record.sell,
                    record.sell_per_lm,
                    record.sell_per_sqm,
                    record.weight_per_lm,
                    record.weight_per_sqm,
                    record.tier.map(|t| t.as_str()),
                    record.destination,
                ])?;
                count += 1;
            }
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(count)
    }

    /// 删除某集合的全部记录
    pub fn delete_category(&self, category: &str) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let deleted = conn.execute(
            "DELETE FROM catalog_record WHERE category = ?1",
            params![category],
        )?;
        Ok(deleted)
    }

    /// 记录总数
    pub fn count(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let n = conn.query_row("SELECT COUNT(*) FROM catalog_record", [], |row| row.get(0))?;
        Ok(n)
    }
}

#[async_trait]
impl CatalogReader for CatalogRecordRepository {
    async fn list_records(&self, category: &str) -> RepositoryResult<Vec<CatalogRateRecord>> {
        self.find_by_category(category)
    }

    async fn get_record(&self, category: &str, id: &str) -> RepositoryResult<CatalogRateRecord> {
        self.find_by_id(category, id)?
            .ok_or_else(|| RepositoryError::NotFound {
                entity: format!("catalog_record[{}]", category),
                id: id.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo() -> CatalogRecordRepository {
        let conn = crate::db::open_in_memory().unwrap();
        CatalogRecordRepository::from_connection(Arc::new(Mutex::new(conn)))
    }

    fn frame(id: &str, sell_per_lm: f64) -> CatalogRateRecord {
        let mut record = CatalogRateRecord::new(id, "frame", &format!("Frame {}", id));
        record.sell_per_lm = Some(sell_per_lm);
        record.weight_per_lm = Some(0.3);
        record
    }

    #[tokio::test]
    async fn test_upsert_and_read_back() {
        let repo = repo();
        let mut freight = CatalogRateRecord::new("FR-S-SYD", "freight", "Small Sydney");
        freight.sell = Some(80.0);
        freight.tier = Some(FreightTier::SmallComplete);
        freight.destination = Some("Sydney".to_string());

        let written = repo
            .upsert_batch(&[frame("F-40", 20.0), frame("F-60", 28.0), freight.clone()])
            .unwrap();
        assert_eq!(written, 3);
        assert_eq!(repo.count().unwrap(), 3);

        let frames = repo.list_records("frame").await.unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].id, "F-40");

        let loaded = repo.get_record("freight", "FR-S-SYD").await.unwrap();
        assert_eq!(loaded, freight);
    }

    #[tokio::test]
    async fn test_upsert_replaces_existing() {
        let repo = repo();
        repo.upsert_batch(&[frame("F-40", 20.0)]).unwrap();
        repo.upsert_batch(&[frame("F-40", 22.5)]).unwrap();

        let loaded = repo.get_record("frame", "F-40").await.unwrap();
        assert_eq!(loaded.sell_per_lm, Some(22.5));
        assert_eq!(repo.count().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_missing_record_is_not_found() {
        let repo = repo();
        let err = repo.get_record("frame", "NOPE").await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound { .. }));
        assert!(repo.list_records("lighting").await.unwrap().is_empty());
    }

    #[test]
    fn test_delete_category() {
        let repo = repo();
        repo.upsert_batch(&[frame("F-40", 20.0), frame("F-60", 28.0)]).unwrap();
        assert_eq!(repo.delete_category("frame").unwrap(), 2);
        assert_eq!(repo.count().unwrap(), 0);
    }
}
