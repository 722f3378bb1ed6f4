// ==========================================
// 张拉布框架报价系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::quote_config::{QuoteConfig, TierThresholds};
use crate::db::open_sqlite_connection;
use rusqlite::{params, Connection};
use serde_json::json;
use std::collections::HashMap;
use std::error::Error;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;
        crate::db::init_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 读取 global scope 的配置值（公开方法，供其他模块复用）
    pub fn get_global_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        self.get_config_value(key)
    }

    /// 写入 global scope 的配置值（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2",
            params![key, value],
        )?;
        Ok(())
    }

    /// 读取并解析配置值，缺失或格式错误时返回默认值
    fn get_parsed_or_default<T>(&self, key: &str, default: T) -> Result<T, Box<dyn Error>>
    where
        T: FromStr + Copy + std::fmt::Debug,
    {
        match self.get_config_value(key)? {
            None => Ok(default),
            Some(raw) => match raw.trim().parse::<T>() {
                Ok(v) => Ok(v),
                Err(_) => {
                    tracing::warn!(
                        key = key,
                        value = %raw,
                        default = ?default,
                        "配置值格式错误，使用默认值"
                    );
                    Ok(default)
                }
            },
        }
    }

    /// 获取所有配置的快照（JSON格式）
    ///
    /// # 用途
    /// - 在定稿报价时记录当时生效的计价参数
    pub fn get_config_snapshot(&self) -> Result<String, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt = conn.prepare(
            "SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key"
        )?;

        let mut config_map: HashMap<String, String> = HashMap::new();
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
            ))
        })?;

        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        let json_value = json!(config_map);
        Ok(serde_json::to_string(&json_value)?)
    }

    /// 从配置快照恢复配置
    ///
    /// # 返回
    /// - Ok(usize): 恢复的配置项数量
    ///
    /// # 注意
    /// - 此方法会覆盖现有的 global 配置
    pub fn restore_config_from_snapshot(&self, snapshot_json: &str) -> Result<usize, Box<dyn Error>> {
        let config_map: HashMap<String, String> = serde_json::from_str(snapshot_json)?;

        let mut conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        let tx = conn.transaction()?;

        let mut count = 0;
        for (key, value) in config_map.iter() {
            let affected = tx.execute(
                "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
                 ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2",
                params![key, value],
            )?;
            count += affected;
        }

        tx.commit()?;
        Ok(count)
    }

    // ===== 报价引擎配置 =====

    /// 加载报价引擎配置（默认值 + config_kv 覆写）
    ///
    /// 阈值不满足单调递增时整体退回默认阈值
    pub fn load_quote_config(&self) -> Result<QuoteConfig, Box<dyn Error>> {
        let defaults = QuoteConfig::default();
        let default_tiers = defaults.tier_thresholds;

        let overhead = self.get_parsed_or_default(
            config_keys::LIGHTING_OVERHEAD_KG_PER_SQM,
            defaults.lighting_overhead_kg_per_sqm,
        )?;

        let tier_thresholds = TierThresholds {
            pallet_weight_kg: self
                .get_parsed_or_default(config_keys::TIER_PALLET_WEIGHT_KG, default_tiers.pallet_weight_kg)?,
            pallet_dim_mm: self
                .get_parsed_or_default(config_keys::TIER_PALLET_DIM_MM, default_tiers.pallet_dim_mm)?,
            large_dim_mm: self
                .get_parsed_or_default(config_keys::TIER_LARGE_DIM_MM, default_tiers.large_dim_mm)?,
            medium_dim_mm: self
                .get_parsed_or_default(config_keys::TIER_MEDIUM_DIM_MM, default_tiers.medium_dim_mm)?,
        };

        let tier_thresholds = if tier_thresholds.is_consistent() {
            tier_thresholds
        } else {
            tracing::warn!(?tier_thresholds, "运费档位阈值不一致，使用默认阈值");
            default_tiers
        };

        let allow_zero_dimensions = self.get_parsed_or_default(
            config_keys::ALLOW_ZERO_DIMENSIONS,
            defaults.allow_zero_dimensions,
        )?;

        Ok(QuoteConfig {
            lighting_overhead_kg_per_sqm: if overhead.is_finite() && overhead >= 0.0 {
                overhead
            } else {
                defaults.lighting_overhead_kg_per_sqm
            },
            tier_thresholds,
            allow_zero_dimensions,
        })
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 重量
    pub const LIGHTING_OVERHEAD_KG_PER_SQM: &str = "lighting_overhead_kg_per_sqm";

    // 运费档位
    pub const TIER_PALLET_WEIGHT_KG: &str = "tier_pallet_weight_kg";
    pub const TIER_PALLET_DIM_MM: &str = "tier_pallet_dim_mm";
    pub const TIER_LARGE_DIM_MM: &str = "tier_large_dim_mm";
    pub const TIER_MEDIUM_DIM_MM: &str = "tier_medium_dim_mm";

    // 完整性
    pub const ALLOW_ZERO_DIMENSIONS: &str = "allow_zero_dimensions";
}
