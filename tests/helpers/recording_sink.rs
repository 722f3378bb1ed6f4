// ==========================================
// 记录型持久化端 - 用于集成测试
// ==========================================

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tension_frame_quote::domain::{FinalizedQuote, QuoteSnapshot};
use tension_frame_quote::repository::{QuoteSink, RepositoryError, RepositoryResult};

#[derive(Default)]
pub struct RecordingSink {
    drafts: Mutex<Vec<QuoteSnapshot>>,
    finals: Mutex<Vec<FinalizedQuote>>,
    fail_drafts: AtomicBool,
    fail_finals: AtomicBool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_drafts(&self, fail: bool) {
        self.fail_drafts.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_finals(&self, fail: bool) {
        self.fail_finals.store(fail, Ordering::SeqCst);
    }

    pub fn drafts(&self) -> Vec<QuoteSnapshot> {
        self.drafts.lock().unwrap().clone()
    }

    pub fn finals(&self) -> Vec<FinalizedQuote> {
        self.finals.lock().unwrap().clone()
    }
}

#[async_trait]
impl QuoteSink for RecordingSink {
    async fn write_draft(&self, snapshot: &QuoteSnapshot) -> RepositoryResult<()> {
        if self.fail_drafts.load(Ordering::SeqCst) {
            return Err(RepositoryError::DatabaseConnectionError("draft store offline".to_string()));
        }
        self.drafts.lock().unwrap().push(snapshot.clone());
        Ok(())
    }

    async fn write_final(&self, quote: &FinalizedQuote) -> RepositoryResult<()> {
        if self.fail_finals.load(Ordering::SeqCst) {
            return Err(RepositoryError::DatabaseConnectionError("final store offline".to_string()));
        }
        self.finals.lock().unwrap().push(quote.clone());
        Ok(())
    }
}
