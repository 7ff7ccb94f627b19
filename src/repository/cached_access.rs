// ==========================================
// 包装物料 BOM 系统 - 远端优先 + 本地缓存
// ==========================================
// 职责: 读: 远端成功则刷新缓存，失败回退到缓存
//       写: 先写远端，成功后同步到缓存；远端失败直接返回错误
//       删: 远端"未找到"视为成功，本地副本一并删除
// 红线: 缓存写入失败只记日志，不影响远端已成功的结果
// ==========================================

use crate::domain::bom::{BomFormData, BomLineItem, BomPatch};
use crate::domain::product::{Product, ProductFormData, ProductPatch};
use crate::repository::data_access::BomDataAccess;
use crate::repository::error::RepositoryResult;
use crate::repository::sqlite_access::SqliteDataAccess;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

// ==========================================
// CachedDataAccess - 远端优先数据访问
// ==========================================
pub struct CachedDataAccess<R: BomDataAccess> {
    remote: R,
    cache: Arc<SqliteDataAccess>,
}

impl<R: BomDataAccess> CachedDataAccess<R> {
    pub fn new(remote: R, cache: Arc<SqliteDataAccess>) -> Self {
        Self { remote, cache }
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    pub fn cache(&self) -> &SqliteDataAccess {
        &self.cache
    }

    fn log_cache_error(op: &str, result: RepositoryResult<impl Sized>) {
        if let Err(e) = result {
            warn!(op, error = %e, "本地缓存写入失败");
        }
    }
}

#[async_trait]
impl<R: BomDataAccess> BomDataAccess for CachedDataAccess<R> {
    async fn get_products(&self) -> RepositoryResult<Vec<Product>> {
        match self.remote.get_products().await {
            Ok(products) => {
                Self::log_cache_error("replace_products", self.cache.products().replace_all(&products));
                Ok(products)
            }
            Err(e) => {
                warn!(error = %e, "远端读取产品失败，回退到本地缓存");
                self.cache.products().list_all()
            }
        }
    }

    async fn add_product(&self, data: ProductFormData) -> RepositoryResult<Product> {
        let product = self.remote.add_product(data).await?;
        Self::log_cache_error("upsert_product", self.cache.products().upsert(&product));
        Ok(product)
    }

    async fn update_product(&self, id: &str, patch: ProductPatch) -> RepositoryResult<Product> {
        let product = self.remote.update_product(id, patch).await?;
        Self::log_cache_error("upsert_product", self.cache.products().upsert(&product));
        Ok(product)
    }

    async fn delete_product(&self, id: &str) -> RepositoryResult<()> {
        match self.remote.delete_product(id).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                debug!(id, "远端已无此产品，仅删除本地副本");
            }
            Err(e) => return Err(e),
        }
        Self::log_cache_error("delete_product", self.cache.products().delete(id));
        Ok(())
    }

    async fn get_bom_records(&self) -> RepositoryResult<Vec<BomLineItem>> {
        match self.remote.get_bom_records().await {
            Ok(records) => {
                Self::log_cache_error("replace_records", self.cache.records().replace_all(&records));
                Ok(records)
            }
            Err(e) => {
                warn!(error = %e, "远端读取 BOM 记录失败，回退到本地缓存");
                self.cache.records().list_all()
            }
        }
    }

    async fn add_bom_record(&self, data: BomFormData) -> RepositoryResult<BomLineItem> {
        let record = self.remote.add_bom_record(data).await?;
        Self::log_cache_error("upsert_record", self.cache.records().upsert(&record));
        Ok(record)
    }

    async fn update_bom_record(&self, id: &str, patch: BomPatch) -> RepositoryResult<BomLineItem> {
        let record = self.remote.update_bom_record(id, patch).await?;
        Self::log_cache_error("upsert_record", self.cache.records().upsert(&record));
        Ok(record)
    }

    async fn delete_bom_record(&self, id: &str) -> RepositoryResult<()> {
        match self.remote.delete_bom_record(id).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                debug!(id, "远端已无此记录，仅删除本地副本");
            }
            Err(e) => return Err(e),
        }
        Self::log_cache_error("delete_record", self.cache.records().delete(id));
        Ok(())
    }
}
