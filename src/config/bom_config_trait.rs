// ==========================================
// 包装物料 BOM 系统 - 配置读取 Trait
// ==========================================
// 职责: 定义 API 层所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::domain::types::WeightUnit;
use async_trait::async_trait;
use std::error::Error;

/// 配置层结果类型
pub type ConfigResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

// ==========================================
// BomConfigReader Trait
// ==========================================
// 用途: 录入/保存流程所需的配置读取接口
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait BomConfigReader: Send + Sync {
    /// 获取重量单位（产品重量字段的唯一口径）
    ///
    /// # 默认值
    /// - KG
    async fn weight_unit(&self) -> ConfigResult<WeightUnit>;

    /// 获取顺序提交时相邻两条记录之间的间隔（毫秒）
    ///
    /// # 默认值
    /// - 300
    async fn submit_delay_ms(&self) -> ConfigResult<u64>;

    /// 获取界面语言
    ///
    /// # 默认值
    /// - es
    async fn locale(&self) -> ConfigResult<String>;

    /// 获取上次记住的登录名
    ///
    /// # 返回
    /// - None: 未记住或为空
    async fn last_user(&self) -> ConfigResult<Option<String>>;

    /// 是否记住登录名
    ///
    /// # 默认值
    /// - false
    async fn remember_user(&self) -> ConfigResult<bool>;
}
