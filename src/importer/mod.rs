// ==========================================
// 包装物料 BOM 系统 - 导入层
// ==========================================
// 职责: 外部物料目录导入
// 支持: Excel, CSV
// ==========================================

pub mod catalog_importer;
pub mod error;
pub mod file_parser;

// 重导出核心类型
pub use catalog_importer::{CatalogImportReport, CatalogImporter};
pub use error::{ImportError, ImportResult};
pub use file_parser::{CsvParser, ExcelParser, FileParser, RawRow, UniversalFileParser};
