// ==========================================
// 包装物料 BOM 系统 - 物料目录
// ==========================================
// 职责: 只读参考数据（物料条目 + 类别列表）与查询
// 红线: 目录在启动时加载一次，之后只读
// ==========================================

mod seed;

use crate::domain::supply::SupplyItem;
use crate::domain::types::SupplyCategory;
use std::collections::HashMap;

// ==========================================
// SupplyCatalog - 物料目录
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct SupplyCatalog {
    items: Vec<SupplyItem>,
    by_code: HashMap<String, usize>,
}

impl SupplyCatalog {
    /// 从条目列表构建目录（编码重复时保留第一条）
    pub fn new(items: Vec<SupplyItem>) -> Self {
        let mut kept = Vec::with_capacity(items.len());
        let mut by_code = HashMap::with_capacity(items.len());
        for item in items {
            if by_code.contains_key(&item.code) {
                tracing::warn!(code = %item.code, "物料编码重复，忽略后出现的条目");
                continue;
            }
            by_code.insert(item.code.clone(), kept.len());
            kept.push(item);
        }
        Self {
            items: kept,
            by_code,
        }
    }

    /// 内置基础目录
    pub fn builtin() -> Self {
        let items = seed::BUILTIN_ITEMS
            .iter()
            .filter_map(|(code, description, category, unit, content)| {
                SupplyItem::new(*code, *description, *category, *unit, *content)
            })
            .collect();
        Self::new(items)
    }

    /// 已识别的物料类别（固定顺序）
    pub fn categories(&self) -> &'static [SupplyCategory] {
        &SupplyCategory::ALL
    }

    pub fn items(&self) -> &[SupplyItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// 按物料编码查找
    pub fn find_by_code(&self, code: &str) -> Option<&SupplyItem> {
        self.by_code.get(code.trim()).map(|&idx| &self.items[idx])
    }

    /// 类别下的第一个物料（开关自动填充、THERMOPACK 膜自动计算使用）
    pub fn first_in_category(&self, category: SupplyCategory) -> Option<&SupplyItem> {
        self.items.iter().find(|i| i.category == category)
    }

    /// 类别下的全部物料
    pub fn items_in_category(
        &self,
        category: SupplyCategory,
    ) -> impl Iterator<Item = &SupplyItem> + '_ {
        self.items.iter().filter(move |i| i.category == category)
    }

    /// 物料选择器：类别内按描述/编码模糊搜索
    pub fn search(&self, category: SupplyCategory, query: &str) -> Vec<&SupplyItem> {
        self.items_in_category(category)
            .filter(|i| i.matches_query(query))
            .collect()
    }
}
