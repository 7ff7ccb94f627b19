// ==========================================
// 包装物料 BOM 系统 - 产品 API
// ==========================================
// 职责: 产品登记、局部更新、删除、检索
// 红线: 平均包重只由每箱重量与包数派生，不单独修改
// ==========================================

use std::sync::Arc;

use tracing::{debug, info};

use crate::api::error::{ApiError, ApiResult};
use crate::domain::product::{Product, ProductDraft, ProductPatch};
use crate::domain::session::Session;
use crate::repository::data_access::BomDataAccess;

// ==========================================
// ProductApi - 产品 API
// ==========================================
pub struct ProductApi {
    data: Arc<dyn BomDataAccess>,
}

impl ProductApi {
    pub fn new(data: Arc<dyn BomDataAccess>) -> Self {
        Self { data }
    }

    /// 校验表单并登记产品
    ///
    /// # 返回
    /// - Err(ProductValidation): 表单规则不满足
    /// - Err(InvalidInput): 编码已被其他产品使用
    pub async fn create_product(&self, draft: &ProductDraft, user: &Session) -> ApiResult<Product> {
        let form = draft.validate(user)?;
        if self.find_by_code(&form.code).await?.is_some() {
            return Err(ApiError::InvalidInput(format!("产品编码已存在: {}", form.code)));
        }

        let product = self.data.add_product(form).await?;
        info!(code = %product.code, id = %product.id, "产品已登记");
        Ok(product)
    }

    /// 局部更新产品（写入 updated_by）
    ///
    /// 补丁先合并到当前产品上按登记规则校验，下发的补丁带派生后的平均包重
    ///
    /// # 返回
    /// - Err(NotFound): 产品 id 不存在
    /// - Err(ProductValidation): 合并后的产品不满足登记规则
    pub async fn update_product(
        &self,
        id: &str,
        mut patch: ProductPatch,
        user: &Session,
    ) -> ApiResult<Product> {
        if !patch.has_changes() {
            return Err(ApiError::InvalidInput("没有需要更新的字段".to_string()));
        }
        let current = self
            .data
            .get_products()
            .await?
            .into_iter()
            .find(|p| p.id == id)
            .ok_or_else(|| ApiError::NotFound(format!("product(id={})不存在", id)))?;

        patch.updated_by = Some(user.user().to_string());
        let outgoing = patch.resolve_against(&current)?;
        debug!(id, "产品补丁已校验");
        let product = self.data.update_product(id, outgoing).await?;
        info!(code = %product.code, "产品已更新");
        Ok(product)
    }

    pub async fn delete_product(&self, id: &str) -> ApiResult<()> {
        self.data.delete_product(id).await?;
        info!(id, "产品已删除");
        Ok(())
    }

    pub async fn list_products(&self) -> ApiResult<Vec<Product>> {
        Ok(self.data.get_products().await?)
    }

    pub async fn find_by_code(&self, code: &str) -> ApiResult<Option<Product>> {
        let code = code.trim();
        Ok(self
            .data
            .get_products()
            .await?
            .into_iter()
            .find(|p| p.code == code))
    }

    /// 按编码/名称/来源车间检索（不区分大小写，空查询返回全部）
    pub async fn search_products(&self, query: &str) -> ApiResult<Vec<Product>> {
        let products = self.data.get_products().await?;
        let found = filter_products(products, query);
        debug!(query, count = found.len(), "产品检索");
        Ok(found)
    }
}

/// 产品检索过滤
pub fn filter_products(products: Vec<Product>, query: &str) -> Vec<Product> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return products;
    }
    products
        .into_iter()
        .filter(|p| {
            p.code.to_lowercase().contains(&needle)
                || p.name.to_lowercase().contains(&needle)
                || p.origin_room.to_lowercase().contains(&needle)
        })
        .collect()
}
