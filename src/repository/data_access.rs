// ==========================================
// 包装物料 BOM 系统 - 数据访问契约
// ==========================================
// 职责: 产品与 BOM 记录两个集合的 CRUD 接口
// 实现: SqliteDataAccess（本地缓存库）/ CachedDataAccess（远端优先 + 本地回退）
// 红线: 每个写操作都可能失败；调用方把失败视为当前操作的中止错误，不自动重试
// ==========================================

use crate::domain::bom::{BomFormData, BomLineItem, BomPatch};
use crate::domain::product::{Product, ProductFormData, ProductPatch};
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

/// 数据访问接口
#[async_trait]
pub trait BomDataAccess: Send + Sync {
    // ===== 产品 =====

    /// 全部产品
    async fn get_products(&self) -> RepositoryResult<Vec<Product>>;

    /// 新建产品（分配 id 与创建审计字段）
    async fn add_product(&self, data: ProductFormData) -> RepositoryResult<Product>;

    /// 局部更新产品（平均包重随之重新派生）
    async fn update_product(&self, id: &str, patch: ProductPatch) -> RepositoryResult<Product>;

    async fn delete_product(&self, id: &str) -> RepositoryResult<()>;

    // ===== BOM 记录 =====

    /// 全部 BOM 记录
    async fn get_bom_records(&self) -> RepositoryResult<Vec<BomLineItem>>;

    /// 新建 BOM 行（分配 id 与创建审计字段）
    async fn add_bom_record(&self, data: BomFormData) -> RepositoryResult<BomLineItem>;

    async fn update_bom_record(&self, id: &str, patch: BomPatch)
        -> RepositoryResult<BomLineItem>;

    async fn delete_bom_record(&self, id: &str) -> RepositoryResult<()>;
}
