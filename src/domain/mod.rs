// ==========================================
// 包装物料 BOM 系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、派生规则
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod bom;
pub mod product;
pub mod session;
pub mod supply;
pub mod types;

// 重导出核心类型
pub use bom::{AdditionalSupply, BomFormData, BomLineItem, BomPatch, CategoryWorkingState};
pub use product::{
    average_weight_per_package, format_sku_code, is_valid_sku_code, parse_lenient_number,
    Product, ProductDraft, ProductFormData, ProductPatch, ProductValidationError,
};
pub use session::Session;
pub use supply::SupplyItem;
pub use types::{
    is_count_unit, CategorySlot, PackageSize, PackageType, ParseEnumError, SupplyCategory,
    WeightUnit,
};
