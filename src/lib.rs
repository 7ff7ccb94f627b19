// ==========================================
// 包装物料 BOM 系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite（本地缓存）
// 系统定位: 包装物料消耗计算 + BOM 记录录入
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "es");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 物料目录 - 只读参考数据
pub mod catalog;

// 引擎层 - 消耗公式、可见性、组装
pub mod engine;

// 数据仓储层 - 数据访问
pub mod repository;

// 导入层 - 外部物料目录
pub mod importer;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 业务接口
pub mod api;

// 应用层 - 共享状态
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{CategorySlot, PackageSize, PackageType, SupplyCategory, WeightUnit};

// 领域实体
pub use domain::{BomFormData, BomLineItem, CategoryWorkingState, Product, Session, SupplyItem};

// 目录
pub use catalog::SupplyCatalog;

// 引擎
pub use engine::{BomEditSession, RecordAssembler, RecordEditSession};

// API
pub use api::{BomApi, DashboardApi, ProductApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "BOM Insumos de Empaque";
