// ==========================================
// 张拉布框架报价系统 - 命令行入口
// ==========================================
// 用法:
//   tension-frame-quote [db_path] <request.json>
// 读取报价请求 → 按向导顺序回放 → 定稿报价 JSON 输出到 stdout
// ==========================================

use std::error::Error;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tension_frame_quote::config::ConfigManager;
use tension_frame_quote::db::{get_default_db_path, init_schema, open_sqlite_connection};
use tension_frame_quote::repository::{
    CatalogRecordRepository, QuoteSnapshotRepository, StepContentRepository,
};
use tension_frame_quote::{logging, QuoteApi, QuoteRequest};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    logging::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (db_path, request_path) = match args.as_slice() {
        [request] => (get_default_db_path(), request.clone()),
        [db, request] => (db.clone(), request.clone()),
        _ => {
            eprintln!("用法: tension-frame-quote [db_path] <request.json>");
            std::process::exit(2);
        }
    };

    tracing::info!("==================================================");
    tracing::info!("{} v{}", tension_frame_quote::APP_NAME, tension_frame_quote::VERSION);
    tracing::info!("使用数据库: {}", db_path);
    tracing::info!("==================================================");

    let conn = open_sqlite_connection(&db_path)?;
    init_schema(&conn)?;
    let conn = Arc::new(Mutex::new(conn));

    let config = ConfigManager::from_connection(conn.clone())?.load_quote_config()?;
    let catalog = Arc::new(CatalogRecordRepository::from_connection(conn.clone()));
    let content = Arc::new(StepContentRepository::from_connection(conn.clone()));
    let sink = Arc::new(QuoteSnapshotRepository::from_connection(conn));

    let raw = std::fs::read_to_string(Path::new(&request_path))?;
    let request: QuoteRequest = serde_json::from_str(&raw)?;

    let mut api = QuoteApi::new(catalog, content, sink, &config);
    tracing::info!(quote_id = %api.quote_id(), "开始回放报价请求");

    let finalized = api.replay(&request).await?;
    println!("{}", serde_json::to_string_pretty(&finalized)?);
    Ok(())
}
