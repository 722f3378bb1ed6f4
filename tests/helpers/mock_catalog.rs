// ==========================================
// Mock 目录 / 文案实现 - 用于集成测试
// ==========================================

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;
use tension_frame_quote::domain::{CatalogRateRecord, StepHeader};
use tension_frame_quote::repository::{
    CatalogReader, ContentReader, RepositoryError, RepositoryResult,
};

/// 内存目录
#[derive(Default)]
pub struct MockCatalog {
    records: Vec<CatalogRateRecord>,
    failing: Mutex<HashSet<String>>,     // 查询即失败的集合
    delays_ms: HashMap<String, u64>,     // 模拟网络延迟
    lookups: Mutex<Vec<String>>,         // 查询记录 (category/id)
}

impl MockCatalog {
    pub fn new(records: Vec<CatalogRateRecord>) -> Self {
        Self {
            records,
            ..Default::default()
        }
    }

    pub fn with_delay(mut self, category: &str, ms: u64) -> Self {
        self.delays_ms.insert(category.to_string(), ms);
        self
    }

    pub fn fail_category(&self, category: &str) {
        self.failing.lock().unwrap().insert(category.to_string());
    }

    pub fn recover_category(&self, category: &str) {
        self.failing.lock().unwrap().remove(category);
    }

    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }

    async fn before_lookup(&self, category: &str, id: &str) -> RepositoryResult<()> {
        self.lookups
            .lock()
            .unwrap()
            .push(format!("{}/{}", category, id));

        if let Some(ms) = self.delays_ms.get(category) {
            tokio::time::sleep(Duration::from_millis(*ms)).await;
        }

        if self.failing.lock().unwrap().contains(category) {
            return Err(RepositoryError::DatabaseConnectionError(format!(
                "catalog '{}' unavailable",
                category
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogReader for MockCatalog {
    async fn list_records(&self, category: &str) -> RepositoryResult<Vec<CatalogRateRecord>> {
        self.before_lookup(category, "*").await?;
        Ok(self
            .records
            .iter()
            .filter(|r| r.category == category)
            .cloned()
            .collect())
    }

    async fn get_record(&self, category: &str, id: &str) -> RepositoryResult<CatalogRateRecord> {
        self.before_lookup(category, id).await?;
        self.records
            .iter()
            .find(|r| r.category == category && r.id == id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound {
                entity: format!("catalog_record[{}]", category),
                id: id.to_string(),
            })
    }
}

/// 内存步骤文案
#[derive(Default)]
pub struct MockContent {
    headers: HashMap<String, StepHeader>,
}

impl MockContent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, step_key: &str, header: StepHeader) -> Self {
        self.headers.insert(step_key.to_string(), header);
        self
    }
}

#[async_trait]
impl ContentReader for MockContent {
    async fn get_text(&self, step_key: &str) -> RepositoryResult<StepHeader> {
        self.headers
            .get(step_key)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound {
                entity: "step_content".to_string(),
                id: step_key.to_string(),
            })
    }
}
