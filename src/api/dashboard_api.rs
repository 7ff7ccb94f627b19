// ==========================================
// 包装物料 BOM 系统 - 看板 API
// ==========================================
// 职责: 记录/产品计数、SKU 分组列表、带重量单位的产品列表
// 说明: 有效 BOM 记录 = 物料描述非空
// ==========================================

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult};
use crate::api::product_api::filter_products;
use crate::config::BomConfigReader;
use crate::domain::bom::BomLineItem;
use crate::domain::product::{format_weight, Product};
use crate::domain::types::WeightUnit;
use crate::repository::data_access::BomDataAccess;

/// 看板计数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardCounts {
    pub bom_records: usize,
    pub products: usize,
}

/// SKU 分组（列表页一行）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkuGroup {
    pub sku_code: String,
    pub sku_description: String,
    pub product: Option<Product>,
    pub line_count: usize,
}

/// 产品列表行（重量按配置单位显示）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductListing {
    pub product: Product,
    pub weight_unit: WeightUnit,
    pub weight_per_box_label: String,
    pub avg_weight_label: String,
}

impl ProductListing {
    pub fn new(product: Product, weight_unit: WeightUnit) -> Self {
        Self {
            weight_per_box_label: format_weight(product.weight_per_box, weight_unit),
            avg_weight_label: format_weight(product.avg_weight_per_package, weight_unit),
            product,
            weight_unit,
        }
    }
}

// ==========================================
// DashboardApi - 看板 API
// ==========================================
pub struct DashboardApi {
    data: Arc<dyn BomDataAccess>,
    config: Arc<dyn BomConfigReader>,
}

impl DashboardApi {
    pub fn new(data: Arc<dyn BomDataAccess>, config: Arc<dyn BomConfigReader>) -> Self {
        Self { data, config }
    }

    /// 有效 BOM 记录数与产品数
    pub async fn counts(&self) -> ApiResult<DashboardCounts> {
        let records = self.data.get_bom_records().await?;
        let products = self.data.get_products().await?;
        Ok(DashboardCounts {
            bom_records: records.iter().filter(|r| is_valid_record(r)).count(),
            products: products.len(),
        })
    }

    /// SKU 分组（按编码排序，按编码或描述子串过滤，不区分大小写）
    pub async fn sku_groups(&self, query: &str) -> ApiResult<Vec<SkuGroup>> {
        let records = self.data.get_bom_records().await?;
        let products = self.data.get_products().await?;
        Ok(group_by_sku(&records, &products, query))
    }

    /// 产品检索（编码/名称/来源车间）
    pub async fn search_products(&self, query: &str) -> ApiResult<Vec<Product>> {
        let products = self.data.get_products().await?;
        Ok(filter_products(products, query))
    }

    /// 产品列表（检索后附带按配置单位格式化的重量）
    pub async fn product_listing(&self, query: &str) -> ApiResult<Vec<ProductListing>> {
        let unit = self
            .config
            .weight_unit()
            .await
            .map_err(|e| ApiError::Config(e.to_string()))?;
        Ok(self
            .search_products(query)
            .await?
            .into_iter()
            .map(|p| ProductListing::new(p, unit))
            .collect())
    }
}

fn is_valid_record(record: &BomLineItem) -> bool {
    !record.supply_description.trim().is_empty()
}

/// 按 SKU 分组
pub fn group_by_sku(records: &[BomLineItem], products: &[Product], query: &str) -> Vec<SkuGroup> {
    let mut groups: BTreeMap<&str, (&str, usize)> = BTreeMap::new();
    for record in records {
        let entry = groups
            .entry(record.sku_code.as_str())
            .or_insert((record.sku_description.as_str(), 0));
        entry.1 += 1;
    }

    let needle = query.trim().to_lowercase();
    groups
        .into_iter()
        .filter(|(code, (description, _))| {
            needle.is_empty()
                || code.to_lowercase().contains(&needle)
                || description.to_lowercase().contains(&needle)
        })
        .map(|(code, (description, line_count))| SkuGroup {
            sku_code: code.to_string(),
            sku_description: description.to_string(),
            product: products.iter().find(|p| p.code == code).cloned(),
            line_count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::SupplyCategory;
    use chrono::Utc;

    fn line(sku: &str, description: &str, supply_description: &str) -> BomLineItem {
        BomLineItem {
            id: format!("{}-{}", sku, supply_description),
            sku_code: sku.to_string(),
            sku_description: description.to_string(),
            category: SupplyCategory::Strap,
            supply_code: "INS-1001".to_string(),
            supply_description: supply_description.to_string(),
            pieces_per_box: 1.0,
            consumption_per_box: 0.00045,
            quantity_required: 0.00045,
            unit_of_measure: "KG".to_string(),
            created_by: "ana".to_string(),
            created_at: Utc::now(),
            updated_by: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_group_by_sku_sorted_and_filtered() {
        let records = vec![
            line("2-001", "SALCHICHA", "FLEJE"),
            line("1-193", "CHULETA", "FLEJE"),
            line("1-193", "CHULETA", "GRAPA"),
        ];
        let groups = group_by_sku(&records, &[], "");
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].sku_code, "1-193");
        assert_eq!(groups[0].line_count, 2);
        assert!(groups[0].product.is_none());

        let groups = group_by_sku(&records, &[], "salch");
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].sku_code, "2-001");
    }

    #[test]
    fn test_blank_description_is_not_valid() {
        assert!(is_valid_record(&line("1-193", "X", "FLEJE")));
        assert!(!is_valid_record(&line("1-193", "X", "  ")));
    }
}
