// ==========================================
// 包装物料 BOM 系统 - 物料目录条目
// ==========================================
// 职责: 定义物料 (insumo) 的不可变参考记录
// 红线: 启动时加载一次，运行期不修改
// ==========================================

use crate::domain::types::SupplyCategory;
use serde::{Deserialize, Serialize};

// ==========================================
// SupplyItem - 物料目录条目
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplyItem {
    #[serde(rename = "codigo")]
    pub code: String,
    #[serde(rename = "descripcion")]
    pub description: String,
    #[serde(rename = "categoria")]
    pub category: SupplyCategory,
    #[serde(rename = "unidad_medida")]
    pub unit_of_measure: String,
    /// 每个采购单位包含的计量单位数量（> 0）
    #[serde(rename = "contenido_por_unidad")]
    pub content_per_unit: f64,
}

impl SupplyItem {
    /// 创建目录条目
    ///
    /// # 返回
    /// - None: content_per_unit 非正数或非有限值，或编码为空
    pub fn new(
        code: impl Into<String>,
        description: impl Into<String>,
        category: SupplyCategory,
        unit_of_measure: impl Into<String>,
        content_per_unit: f64,
    ) -> Option<Self> {
        let code = code.into().trim().to_string();
        if code.is_empty() || !content_per_unit.is_finite() || content_per_unit <= 0.0 {
            return None;
        }

        Some(Self {
            code,
            description: description.into().trim().to_string(),
            category,
            unit_of_measure: unit_of_measure.into().trim().to_string(),
            content_per_unit,
        })
    }

    /// 搜索匹配（描述或编码，大小写不敏感）
    pub fn matches_query(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        self.description.to_lowercase().contains(&query)
            || self.code.to_lowercase().contains(&query)
    }
}
