// ==========================================
// 张拉布框架报价系统 - 目录 CSV 导入
// ==========================================
// 流程: 读取 → 行映射 → 校验 → 单事务写入 catalog_record
// 列: category,id,name,sell,sell_per_lm,sell_per_sqm,
//     weight_per_lm,weight_per_sqm,tier,destination
// 红线:
// - 非法行不写入，逐行记录原因
// - 合法行整批写入，失败时整批回滚
// ==========================================

use crate::domain::catalog::CatalogRateRecord;
use crate::domain::types::{FreightTier, QuoteCategory};
use crate::importer::error::{ImportError, ImportResult};
use crate::repository::CatalogRecordRepository;
use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{info, instrument, warn};

const REQUIRED_COLUMNS: [&str; 3] = ["category", "id", "name"];

/// 单价/单位重量上限
pub const MAX_CATALOG_VALUE: f64 = 1_000_000_000.0;

/// 被拒绝的行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedRow {
    pub row: usize, // 数据行号（表头之后从 1 开始）
    pub reason: String,
}

/// 解析结果
#[derive(Debug, Clone, Default)]
pub struct CatalogParseOutcome {
    pub records: Vec<CatalogRateRecord>,
    pub rejected: Vec<RejectedRow>,
}

/// 导入报告
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogImportReport {
    pub total_rows: usize,
    pub imported: usize,
    pub rejected: Vec<RejectedRow>,
}

/// 从任意 Reader 解析目录 CSV
pub fn parse_catalog_csv<R: Read>(reader: R) -> ImportResult<CatalogParseOutcome> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();

    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(ImportError::MissingColumn(column.to_string()));
        }
    }

    let mut outcome = CatalogParseOutcome::default();
    for (idx, result) in reader.records().enumerate() {
        let row_no = idx + 1;
        let record = result?;

        let row: HashMap<&str, &str> = headers
            .iter()
            .zip(record.iter())
            .map(|(h, v)| (h.as_str(), v.trim()))
            .collect();

        // 跳过完全空白的行
        if row.values().all(|v| v.is_empty()) {
            continue;
        }

        match map_row(row_no, &row) {
            Ok(rate) => outcome.records.push(rate),
            Err(e) if e.is_row_level() => {
                warn!(row = row_no, "目录行被拒绝: {}", e);
                outcome.rejected.push(RejectedRow {
                    row: row_no,
                    reason: e.to_string(),
                });
            }
            Err(e) => return Err(e),
        }
    }

    Ok(outcome)
}

/// 从文件解析目录 CSV
pub fn parse_catalog_file(path: &Path) -> ImportResult<CatalogParseOutcome> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }
    if let Some(ext) = path.extension() {
        if !ext.eq_ignore_ascii_case("csv") {
            return Err(ImportError::UnsupportedFormat(ext.to_string_lossy().to_string()));
        }
    }
    parse_catalog_csv(File::open(path)?)
}

/// 导入目录 CSV 到仓储
#[instrument(skip(repo), fields(path = %path.display()))]
pub fn import_catalog_csv(
    path: &Path,
    repo: &CatalogRecordRepository,
) -> ImportResult<CatalogImportReport> {
    let outcome = parse_catalog_file(path)?;
    let imported = repo.upsert_batch(&outcome.records)?;

    info!(
        imported = imported,
        rejected = outcome.rejected.len(),
        "目录导入完成"
    );

    Ok(CatalogImportReport {
        total_rows: outcome.records.len() + outcome.rejected.len(),
        imported,
        rejected: outcome.rejected,
    })
}

// ==========================================
// 行映射与校验
// ==========================================

fn map_row(row_no: usize, row: &HashMap<&str, &str>) -> ImportResult<CatalogRateRecord> {
    let text = |field: &str| -> Option<String> {
        row.get(field)
            .filter(|v| !v.is_empty())
            .map(|v| v.to_string())
    };

    let id = text("id").ok_or(ImportError::PrimaryKeyMissing(row_no))?;

    let category = text("category").unwrap_or_default().to_lowercase();
    if !QuoteCategory::is_catalog_key(&category) {
        return Err(ImportError::UnknownCategory {
            row: row_no,
            category,
        });
    }

    let mut record = CatalogRateRecord::new(&id, &category, &text("name").unwrap_or_else(|| id.clone()));
    record.sell = number(row_no, row, "sell")?;
    record.sell_per_lm = number(row_no, row, "sell_per_lm")?;
    record.sell_per_sqm = number(row_no, row, "sell_per_sqm")?;
    record.weight_per_lm = number(row_no, row, "weight_per_lm")?;
    record.weight_per_sqm = number(row_no, row, "weight_per_sqm")?;
    record.destination = text("destination");

    record.tier = match text("tier") {
        Some(raw) => Some(FreightTier::parse(&raw).ok_or_else(|| ImportError::TypeConversionError {
            row: row_no,
            field: "tier".to_string(),
            message: format!("未知档位 '{}'", raw),
        })?),
        None => None,
    };

    if category == QuoteCategory::Freight.catalog_key()
        && !record.is_not_applicable()
        && record.tier.is_none()
    {
        return Err(ImportError::FreightTierMissing { row: row_no, id });
    }

    Ok(record)
}

fn number(row_no: usize, row: &HashMap<&str, &str>, field: &str) -> ImportResult<Option<f64>> {
    let raw = match row.get(field) {
        Some(v) if !v.is_empty() => *v,
        _ => return Ok(None),
    };

    let value: f64 = raw.parse().map_err(|_| ImportError::TypeConversionError {
        row: row_no,
        field: field.to_string(),
        message: format!("'{}' 不是数字", raw),
    })?;

    if !value.is_finite() {
        return Err(ImportError::TypeConversionError {
            row: row_no,
            field: field.to_string(),
            message: format!("'{}' 不是有限数值", raw),
        });
    }
    if value < 0.0 {
        return Err(ImportError::NegativeValue {
            row: row_no,
            field: field.to_string(),
            value,
        });
    }
    if value > MAX_CATALOG_VALUE {
        return Err(ImportError::ValueOutOfRange {
            row: row_no,
            field: field.to_string(),
            value,
            max: MAX_CATALOG_VALUE,
        });
    }
    Ok(Some(value))
}
