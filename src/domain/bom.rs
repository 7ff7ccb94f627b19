// ==========================================
// 包装物料 BOM 系统 - BOM 记录领域模型
// ==========================================
// 职责: BOM 行记录、新建数据、局部更新、编辑中的类别工作状态
// 红线: cantidad_requerida 总是由公式派生，不允许独立录入
// 红线: 持久化的类别名称永远是规范名称（不带 "2" 后缀）
// ==========================================

use crate::domain::supply::SupplyItem;
use crate::domain::types::SupplyCategory;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// BomLineItem - BOM 行记录（每个 SKU × 物料类别一条）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BomLineItem {
    pub id: String,
    #[serde(rename = "codigo_sku")]
    pub sku_code: String,
    #[serde(rename = "descripcion_sku")]
    pub sku_description: String,
    #[serde(rename = "categoria_insumo")]
    pub category: SupplyCategory,
    #[serde(rename = "codigo_insumo")]
    pub supply_code: String,
    #[serde(rename = "descripcion_insumo")]
    pub supply_description: String,
    #[serde(rename = "cantidad_piezas_por_caja")]
    pub pieces_per_box: f64,
    #[serde(rename = "consumo_por_caja")]
    pub consumption_per_box: f64,
    #[serde(rename = "cantidad_requerida")]
    pub quantity_required: f64,
    #[serde(rename = "unidad_medida")]
    pub unit_of_measure: String,

    // ===== 审计字段 =====
    #[serde(rename = "createdBy")]
    pub created_by: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedBy", default, skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
    #[serde(rename = "updatedAt", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

// ==========================================
// BomFormData - 新建 BOM 行数据（组装器输出）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BomFormData {
    #[serde(rename = "codigo_sku")]
    pub sku_code: String,
    #[serde(rename = "descripcion_sku")]
    pub sku_description: String,
    #[serde(rename = "categoria_insumo")]
    pub category: SupplyCategory,
    #[serde(rename = "codigo_insumo")]
    pub supply_code: String,
    #[serde(rename = "descripcion_insumo")]
    pub supply_description: String,
    #[serde(rename = "cantidad_piezas_por_caja")]
    pub pieces_per_box: f64,
    #[serde(rename = "consumo_por_caja")]
    pub consumption_per_box: f64,
    #[serde(rename = "cantidad_requerida")]
    pub quantity_required: f64,
    #[serde(rename = "unidad_medida")]
    pub unit_of_measure: String,
    #[serde(rename = "createdBy")]
    pub created_by: String,
}

impl BomFormData {
    pub fn into_line_item(self, id: String, created_at: DateTime<Utc>) -> BomLineItem {
        BomLineItem {
            id,
            sku_code: self.sku_code,
            sku_description: self.sku_description,
            category: self.category,
            supply_code: self.supply_code,
            supply_description: self.supply_description,
            pieces_per_box: self.pieces_per_box,
            consumption_per_box: self.consumption_per_box,
            quantity_required: self.quantity_required,
            unit_of_measure: self.unit_of_measure,
            created_by: self.created_by,
            created_at,
            updated_by: None,
            updated_at: None,
        }
    }
}

// ==========================================
// BomPatch - BOM 行局部更新
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BomPatch {
    #[serde(rename = "categoria_insumo", skip_serializing_if = "Option::is_none")]
    pub category: Option<SupplyCategory>,
    #[serde(rename = "codigo_insumo", skip_serializing_if = "Option::is_none")]
    pub supply_code: Option<String>,
    #[serde(rename = "descripcion_insumo", skip_serializing_if = "Option::is_none")]
    pub supply_description: Option<String>,
    #[serde(rename = "cantidad_piezas_por_caja", skip_serializing_if = "Option::is_none")]
    pub pieces_per_box: Option<f64>,
    #[serde(rename = "consumo_por_caja", skip_serializing_if = "Option::is_none")]
    pub consumption_per_box: Option<f64>,
    #[serde(rename = "cantidad_requerida", skip_serializing_if = "Option::is_none")]
    pub quantity_required: Option<f64>,
    #[serde(rename = "unidad_medida", skip_serializing_if = "Option::is_none")]
    pub unit_of_measure: Option<String>,
    #[serde(rename = "updatedBy", skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
}

impl BomPatch {
    pub fn apply_to(&self, item: &mut BomLineItem, updated_at: DateTime<Utc>) {
        if let Some(category) = self.category {
            item.category = category;
        }
        if let Some(code) = &self.supply_code {
            item.supply_code = code.clone();
        }
        if let Some(description) = &self.supply_description {
            item.supply_description = description.clone();
        }
        if let Some(pieces) = self.pieces_per_box {
            item.pieces_per_box = pieces;
        }
        if let Some(consumption) = self.consumption_per_box {
            item.consumption_per_box = consumption;
        }
        if let Some(quantity) = self.quantity_required {
            item.quantity_required = quantity;
        }
        if let Some(unit) = &self.unit_of_measure {
            item.unit_of_measure = unit.clone();
        }
        if self.updated_by.is_some() {
            item.updated_by = self.updated_by.clone();
        }
        item.updated_at = Some(updated_at);
    }
}

// ==========================================
// CategoryWorkingState - 类别工作状态
// ==========================================
// 生命周期: 选中产品时创建，保存或取消时丢弃
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryWorkingState {
    pub selected_item: Option<SupplyItem>,
    pub pieces_per_box: f64,
    pub consumption_per_box: f64,
    pub quantity_required: f64,
    /// 由开关（打包带/订书钉）自动填充
    pub toggled: bool,
}

impl CategoryWorkingState {
    pub fn supply_code(&self) -> &str {
        self.selected_item.as_ref().map(|i| i.code.as_str()).unwrap_or("")
    }

    pub fn supply_description(&self) -> &str {
        self.selected_item
            .as_ref()
            .map(|i| i.description.as_str())
            .unwrap_or("")
    }

    pub fn unit_of_measure(&self) -> &str {
        self.selected_item
            .as_ref()
            .map(|i| i.unit_of_measure.as_str())
            .unwrap_or("")
    }

    /// 是否已选择物料（描述非空）
    pub fn has_selection(&self) -> bool {
        !self.supply_description().trim().is_empty()
    }

    /// 清空回初始状态
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

// ==========================================
// AdditionalSupply - 额外物料（自由添加，可重复任意类别）
// ==========================================
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdditionalSupply {
    pub id: String,
    pub category: Option<SupplyCategory>,
    pub state: CategoryWorkingState,
}

impl AdditionalSupply {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// 显示名称（未选类别时为空串）
    pub fn label(&self) -> &str {
        self.category.map(|c| c.as_str()).unwrap_or("")
    }
}
