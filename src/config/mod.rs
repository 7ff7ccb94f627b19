// ==========================================
// 包装物料 BOM 系统 - 配置层
// ==========================================
// 职责: 系统配置管理（重量单位、提交间隔、语言、登录名）
// 存储: config_kv 表
// ==========================================

pub mod bom_config_trait;
pub mod config_manager;

// 重导出核心配置管理器
pub use bom_config_trait::{BomConfigReader, ConfigResult};
pub use config_manager::{config_keys, ConfigManager};
