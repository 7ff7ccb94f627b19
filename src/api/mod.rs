// ==========================================
// 包装物料 BOM 系统 - API 层
// ==========================================
// 职责: 提供业务 API 接口，供宿主界面调用
// ==========================================

pub mod bom_api;
pub mod dashboard_api;
pub mod error;
pub mod product_api;

// 重导出核心类型
pub use bom_api::BomApi;
pub use dashboard_api::{DashboardApi, DashboardCounts, ProductListing, SkuGroup};
pub use error::{ApiError, ApiResult};
pub use product_api::ProductApi;
