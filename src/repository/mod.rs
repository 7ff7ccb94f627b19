// ==========================================
// 包装物料 BOM 系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 数据访问契约 + 本地 SQLite 实现 + 远端优先缓存
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

mod columns;

pub mod bom_repo;
pub mod cached_access;
pub mod data_access;
pub mod error;
pub mod product_repo;
pub mod sqlite_access;

// 重导出核心仓储
pub use bom_repo::BomRecordRepository;
pub use cached_access::CachedDataAccess;
pub use data_access::BomDataAccess;
pub use error::{RepositoryError, RepositoryResult};
pub use product_repo::ProductRepository;
pub use sqlite_access::SqliteDataAccess;
