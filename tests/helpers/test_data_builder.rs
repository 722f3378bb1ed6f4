// ==========================================
// 测试数据构建器
// ==========================================

use std::sync::Arc;
use tension_frame_quote::config::QuoteConfig;
use tension_frame_quote::domain::{CatalogRateRecord, FreightTier, StepHeader};
use tension_frame_quote::QuoteApi;

use super::mock_catalog::{MockCatalog, MockContent};
use super::recording_sink::RecordingSink;

/// 目录记录构建器
pub struct RecordBuilder {
    record: CatalogRateRecord,
}

impl RecordBuilder {
    pub fn new(category: &str, id: &str) -> Self {
        Self {
            record: CatalogRateRecord::new(id, category, id),
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.record.name = name.to_string();
        self
    }

    pub fn sell(mut self, v: f64) -> Self {
        self.record.sell = Some(v);
        self
    }

    pub fn per_lm(mut self, sell: f64, weight: Option<f64>) -> Self {
        self.record.sell_per_lm = Some(sell);
        self.record.weight_per_lm = weight;
        self
    }

    pub fn per_sqm(mut self, sell: f64, weight: Option<f64>) -> Self {
        self.record.sell_per_sqm = Some(sell);
        self.record.weight_per_sqm = weight;
        self
    }

    pub fn freight(mut self, tier: FreightTier, destination: &str) -> Self {
        self.record.tier = Some(tier);
        self.record.destination = Some(destination.to_string());
        self
    }

    pub fn build(self) -> CatalogRateRecord {
        self.record
    }
}

/// 标准目录
///
/// - frame F-40: 20/延米, 0.3kg/延米；F-60: 35/延米, 0.5kg/延米
/// - fabric FAB-1: 50/平方米, 1kg/平方米；FAB-2: 30/平方米, 0.5kg/平方米
/// - lighting LED-1: 120/平方米
/// - design D-STD: 45；setup S-STD: 25
/// - freight: 各档位 Sydney / Perth
pub fn standard_catalog() -> Vec<CatalogRateRecord> {
    let mut records = vec![
        RecordBuilder::new("frame", "F-40").name("Slim 40").per_lm(20.0, Some(0.3)).build(),
        RecordBuilder::new("frame", "F-60").name("Wide 60").per_lm(35.0, Some(0.5)).build(),
        RecordBuilder::new("corners", "C-RND").name("Rounded").per_lm(2.5, None).build(),
        RecordBuilder::new("fabric", "FAB-1").name("Backlit").per_sqm(50.0, Some(1.0)).build(),
        RecordBuilder::new("fabric", "FAB-2").name("Blockout").per_sqm(30.0, Some(0.5)).build(),
        RecordBuilder::new("lighting", "LED-1").name("Edge LED").per_sqm(120.0, None).build(),
        RecordBuilder::new("control", "CTRL-1").name("Dimmer").sell(95.0).build(),
        RecordBuilder::new("acoustics", "AC-1").name("Foam").per_sqm(40.0, Some(2.0)).build(),
        RecordBuilder::new("design", "D-STD").name("Standard design").sell(45.0).build(),
        RecordBuilder::new("setup", "S-STD").name("Standard setup").sell(25.0).build(),
    ];

    let prices = [
        (FreightTier::FabricOnly, 20.0),
        (FreightTier::SmallComplete, 80.0),
        (FreightTier::MediumComplete, 120.0),
        (FreightTier::LargeComplete, 180.0),
        (FreightTier::PalletCrate, 350.0),
    ];
    for destination in ["Sydney", "Perth"] {
        for (tier, price) in prices {
            let surcharge = if destination == "Perth" { 40.0 } else { 0.0 };
            records.push(
                RecordBuilder::new("freight", &format!("FR-{}-{}", tier.as_str(), destination))
                    .name(&format!("{} {}", tier, destination))
                    .sell(price + surcharge)
                    .freight(tier, destination)
                    .build(),
            );
        }
    }
    records
}

/// 标准测试会话
pub struct TestSession {
    pub api: QuoteApi,
    pub catalog: Arc<MockCatalog>,
    pub sink: Arc<RecordingSink>,
}

pub fn session_with(catalog: MockCatalog, content: MockContent) -> TestSession {
    let catalog = Arc::new(catalog);
    let sink = Arc::new(RecordingSink::new());
    let api = QuoteApi::new(
        catalog.clone(),
        Arc::new(content),
        sink.clone(),
        &QuoteConfig::default(),
    );
    TestSession { api, catalog, sink }
}

pub fn standard_session() -> TestSession {
    session_with(
        MockCatalog::new(standard_catalog()),
        MockContent::new().with("frame", StepHeader::new("Frame profile", "Choose a profile")),
    )
}

/// 运费记录 ID
pub fn freight_id(tier: FreightTier, destination: &str) -> String {
    format!("FR-{}-{}", tier.as_str(), destination)
}
