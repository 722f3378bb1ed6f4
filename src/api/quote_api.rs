// ==========================================
// 张拉布框架报价系统 - 报价会话 API
// ==========================================
// 职责: 一次向导会话的编排
// 流程: 步骤输入 → 目录查询 → 聚合变更 → 重算 → 草稿快照
//       最后一步 → 定稿 → 定稿记录
// 红线:
// - 单写者: 聚合只由本会话通过 &mut self 修改
// - 目录查询失败时该类别保持原选择
// - 草稿写入失败只告警；定稿写入失败必须上抛
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::QuoteConfig;
use crate::domain::catalog::{CatalogRateRecord, Selection, NOT_APPLICABLE_ID};
use crate::domain::content::StepHeader;
use crate::domain::error::QuoteError;
use crate::domain::geometry::DimensionSet;
use crate::domain::quote::{FinalizedQuote, QuoteAggregate, QuoteSnapshot};
use crate::domain::types::{DimensionKey, QuoteCategory, Shape};
use crate::engine::finalizer::{QuoteFinalizer, QuotePreview};
use crate::engine::pricing::AppliedSelection;
use crate::i18n::t;
use crate::repository::{CatalogReader, ContentReader, QuoteSink};
use futures::future::join_all;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

// ==========================================
// QuoteApi - 报价会话
// ==========================================

/// 报价会话API
///
/// 职责：
/// 1. 形状/尺寸/类别选择的变更与重算
/// 2. 目录选项并发加载
/// 3. 步骤文案（带内置回退）
/// 4. 草稿快照与定稿记录推送
pub struct QuoteApi {
    catalog: Arc<dyn CatalogReader>,
    content: Arc<dyn ContentReader>,
    sink: Arc<dyn QuoteSink>,
    finalizer: QuoteFinalizer,
    aggregate: QuoteAggregate,
    final_persisted: bool,
}

impl QuoteApi {
    /// 开始新的报价会话
    pub fn new(
        catalog: Arc<dyn CatalogReader>,
        content: Arc<dyn ContentReader>,
        sink: Arc<dyn QuoteSink>,
        config: &QuoteConfig,
    ) -> Self {
        Self::from_aggregate(catalog, content, sink, config, QuoteAggregate::new())
    }

    /// 从草稿快照恢复会话
    pub fn resume(
        catalog: Arc<dyn CatalogReader>,
        content: Arc<dyn ContentReader>,
        sink: Arc<dyn QuoteSink>,
        config: &QuoteConfig,
        snapshot: QuoteSnapshot,
    ) -> Self {
        info!(
            quote_id = %snapshot.quote_id,
            revision = snapshot.revision,
            "从草稿快照恢复报价会话"
        );
        Self::from_aggregate(catalog, content, sink, config, snapshot.aggregate)
    }

    fn from_aggregate(
        catalog: Arc<dyn CatalogReader>,
        content: Arc<dyn ContentReader>,
        sink: Arc<dyn QuoteSink>,
        config: &QuoteConfig,
        mut aggregate: QuoteAggregate,
    ) -> Self {
        let finalizer = QuoteFinalizer::new(config);
        finalizer.recalc().recompute_in_place(&mut aggregate);
        let final_persisted = aggregate.is_completed();
        Self {
            catalog,
            content,
            sink,
            finalizer,
            aggregate,
            final_persisted,
        }
    }

    // ==========================================
    // 只读访问
    // ==========================================

    pub fn aggregate(&self) -> &QuoteAggregate {
        &self.aggregate
    }

    pub fn quote_id(&self) -> &str {
        self.aggregate.quote_id()
    }

    /// 实时报价
    ///
    /// # 错误
    /// - PricingError: 明细金额无法表示或合计溢出
    pub fn preview(&self) -> ApiResult<QuotePreview> {
        Ok(self.finalizer.preview(&self.aggregate)?)
    }

    // ==========================================
    // 形状与尺寸
    // ==========================================

    /// 设置形状
    ///
    /// # 参数
    /// - shape_id: 形状标识（大小写不敏感）
    pub async fn set_shape(&mut self, shape_id: &str) -> ApiResult<Shape> {
        let shape = Shape::parse(shape_id)
            .ok_or_else(|| ApiError::InvalidInput(format!("未知形状: {}", shape_id)))?;
        self.aggregate.set_shape(shape)?;
        self.after_mutation().await;
        Ok(shape)
    }

    /// 整体替换尺寸
    pub async fn set_dimensions(&mut self, dimensions: DimensionSet) -> ApiResult<()> {
        self.aggregate.set_dimensions(dimensions)?;
        self.after_mutation().await;
        Ok(())
    }

    /// 设置单个尺寸（原始输入，非法值按缺失处理）
    pub async fn set_dimension(&mut self, key: DimensionKey, raw: &str) -> ApiResult<()> {
        let mut dimensions = *self.aggregate.dimensions();
        dimensions.set_raw(key, raw);
        self.set_dimensions(dimensions).await
    }

    // ==========================================
    // 类别选择
    // ==========================================

    /// 按目录记录 ID 选择
    ///
    /// # 错误
    /// - CatalogLookup: 目录查询失败（该类别保持原选择）
    /// - QuoteFinalized: 报价已完成
    #[instrument(skip(self), fields(quote_id = %self.aggregate.quote_id()))]
    pub async fn select(
        &mut self,
        category: QuoteCategory,
        record_id: &str,
    ) -> ApiResult<AppliedSelection> {
        self.ensure_draft()?;

        if record_id.trim().eq_ignore_ascii_case(NOT_APPLICABLE_ID) {
            return self.select_not_applicable(category).await;
        }

        let record = self
            .catalog
            .get_record(category.catalog_key(), record_id)
            .await
            .map_err(|e| {
                warn!(category = %category, record_id = record_id, "目录查询失败: {}", e);
                QuoteError::CatalogLookup {
                    category: category.to_string(),
                    message: e.to_string(),
                }
            })?;

        self.apply_record(category, &record).await
    }

    /// 选择 NA
    pub async fn select_not_applicable(
        &mut self,
        category: QuoteCategory,
    ) -> ApiResult<AppliedSelection> {
        self.aggregate.select(category, Selection::not_applicable())?;
        self.after_mutation().await;
        Ok(AppliedSelection {
            selection: Selection::not_applicable(),
            line_cost: 0.0,
            weight_delta: 0.0,
        })
    }

    /// 按当前档位与目的地选择运费
    ///
    /// # 错误
    /// - NotFound: 目录中没有匹配的运费记录（运费保持原选择）
    pub async fn select_freight(&mut self, destination: &str) -> ApiResult<AppliedSelection> {
        self.ensure_draft()?;

        let tier = self
            .aggregate
            .freight_tier()
            .ok_or_else(|| ApiError::InternalError("运费档位尚未计算".to_string()))?;

        let key = QuoteCategory::Freight.catalog_key();
        let records = self.catalog.list_records(key).await.map_err(|e| {
            ApiError::from(QuoteError::CatalogLookup {
                category: QuoteCategory::Freight.to_string(),
                message: e.to_string(),
            })
        })?;

        let record = records
            .into_iter()
            .find(|r| r.matches_freight(tier, destination))
            .ok_or_else(|| {
                ApiError::NotFound(format!("运费记录 (tier={}, destination={})", tier, destination))
            })?;

        self.apply_record(QuoteCategory::Freight, &record).await
    }

    /// 清除某类别选择（该步骤需重新选择）
    pub async fn clear(&mut self, category: QuoteCategory) -> ApiResult<()> {
        self.aggregate.clear_selection(category)?;
        self.after_mutation().await;
        Ok(())
    }

    // ==========================================
    // 目录与文案
    // ==========================================

    /// 并发加载多个类别的目录选项
    ///
    /// 结果按类别归位，与完成顺序无关；任一类别失败即返回错误
    pub async fn load_options(
        &self,
        categories: &[QuoteCategory],
    ) -> ApiResult<BTreeMap<QuoteCategory, Vec<CatalogRateRecord>>> {
        let fetches = categories.iter().map(|category| async move {
            let result = self.catalog.list_records(category.catalog_key()).await;
            (*category, result)
        });

        let mut options = BTreeMap::new();
        for (category, result) in join_all(fetches).await {
            let records = result.map_err(|e| {
                ApiError::from(QuoteError::CatalogLookup {
                    category: category.to_string(),
                    message: e.to_string(),
                })
            })?;
            options.insert(category, records);
        }
        Ok(options)
    }

    /// 步骤文案（读取失败时回退到内置文案）
    pub async fn step_header(&self, step_key: &str) -> StepHeader {
        match self.content.get_text(step_key).await {
            Ok(header) => header,
            Err(e) => {
                debug!(step_key = step_key, "步骤文案读取失败，使用内置文案: {}", e);
                StepHeader::new(
                    t(&format!("steps.{}.title", step_key)),
                    t(&format!("steps.{}.subtitle", step_key)),
                )
            }
        }
    }

    // ==========================================
    // 定稿
    // ==========================================

    /// 定稿并写入定稿记录
    ///
    /// 重复调用返回同一结果；定稿记录写入失败时可重试
    pub async fn finalize(&mut self) -> ApiResult<FinalizedQuote> {
        let finalized = self.finalizer.finalize(&mut self.aggregate)?;

        if !self.final_persisted {
            self.sink.write_final(&finalized).await?;
            self.final_persisted = true;
        }

        Ok(finalized)
    }

    // ==========================================
    // 内部
    // ==========================================

    fn ensure_draft(&self) -> ApiResult<()> {
        if self.aggregate.is_completed() {
            return Err(ApiError::QuoteFinalized(self.aggregate.quote_id().to_string()));
        }
        Ok(())
    }

    async fn apply_record(
        &mut self,
        category: QuoteCategory,
        record: &CatalogRateRecord,
    ) -> ApiResult<AppliedSelection> {
        let applied = self.finalizer.recalc().pricing().apply_selection(
            category,
            record,
            self.aggregate.geometry(),
        );
        self.aggregate.select(category, applied.selection.clone())?;
        self.after_mutation().await;

        debug!(
            category = %category,
            record_id = %record.id,
            line_cost = applied.line_cost,
            "类别选择已更新"
        );
        Ok(applied)
    }

    /// 重算并推送草稿快照
    async fn after_mutation(&mut self) {
        self.finalizer.recalc().recompute_in_place(&mut self.aggregate);

        let snapshot = QuoteSnapshot::capture(&self.aggregate);
        if let Err(e) = self.sink.write_draft(&snapshot).await {
            warn!(
                quote_id = %snapshot.quote_id,
                revision = snapshot.revision,
                "草稿快照写入失败: {}",
                e
            );
        }
    }
}
