// Small dev utility: load a catalog CSV into the quote database.
//
// Usage:
//   cargo run --bin import_catalog -- [db_path] <catalog.csv>

use std::path::Path;
use tension_frame_quote::db::get_default_db_path;
use tension_frame_quote::i18n::t_with_args;
use tension_frame_quote::importer::{import_catalog_csv, ImportError};
use tension_frame_quote::logging;
use tension_frame_quote::repository::CatalogRecordRepository;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (db_path, csv_path) = match args.as_slice() {
        [csv] => (get_default_db_path(), csv.clone()),
        [db, csv] => (db.clone(), csv.clone()),
        _ => return Err("usage: import_catalog [db_path] <catalog.csv>".into()),
    };

    let repo = CatalogRecordRepository::new(&db_path)?;
    let report = match import_catalog_csv(Path::new(&csv_path), &repo) {
        Ok(report) => report,
        Err(ImportError::FileNotFound(path)) => {
            return Err(t_with_args("import.file_not_found", &[("path", path.as_str())]).into());
        }
        Err(e) => return Err(e.into()),
    };

    let imported = report.imported.to_string();
    println!("{}", t_with_args("import.imported", &[("count", imported.as_str())]));
    println!("rejected={}", report.rejected.len());
    for rejected in &report.rejected {
        println!("  row {}: {}", rejected.row, rejected.reason);
    }
    Ok(())
}
