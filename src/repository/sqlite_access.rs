// ==========================================
// 包装物料 BOM 系统 - 本地数据访问实现
// ==========================================
// 职责: 以本地 SQLite 库实现 BomDataAccess（离线 / 缓存）
// 说明: 分配 UUID v4 id 与创建时间；更新时写 updated_at
// ==========================================

use crate::domain::bom::{BomFormData, BomLineItem, BomPatch};
use crate::domain::product::{Product, ProductFormData, ProductPatch};
use crate::repository::bom_repo::BomRecordRepository;
use crate::repository::data_access::BomDataAccess;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::product_repo::ProductRepository;
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

// ==========================================
// SqliteDataAccess - 本地库数据访问
// ==========================================
pub struct SqliteDataAccess {
    products: ProductRepository,
    records: BomRecordRepository,
}

impl SqliteDataAccess {
    /// 打开（必要时创建）本地库
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = crate::db::open_and_init(db_path)?;
        Ok(Self::from_connection(Arc::new(Mutex::new(conn))))
    }

    /// 从已有连接创建（调用方负责建表）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            products: ProductRepository::from_connection(conn.clone()),
            records: BomRecordRepository::from_connection(conn),
        }
    }

    pub fn products(&self) -> &ProductRepository {
        &self.products
    }

    pub fn records(&self) -> &BomRecordRepository {
        &self.records
    }
}

#[async_trait]
impl BomDataAccess for SqliteDataAccess {
    async fn get_products(&self) -> RepositoryResult<Vec<Product>> {
        self.products.list_all()
    }

    async fn add_product(&self, data: ProductFormData) -> RepositoryResult<Product> {
        let product = data.into_product(Uuid::new_v4().to_string(), Utc::now());
        self.products.upsert(&product)?;
        Ok(product)
    }

    async fn update_product(&self, id: &str, patch: ProductPatch) -> RepositoryResult<Product> {
        let mut product = self
            .products
            .find_by_id(id)?
            .ok_or_else(|| RepositoryError::not_found("product_info", id))?;
        patch.apply_to(&mut product, Utc::now());
        self.products.upsert(&product)?;
        Ok(product)
    }

    async fn delete_product(&self, id: &str) -> RepositoryResult<()> {
        if !self.products.delete(id)? {
            return Err(RepositoryError::not_found("product_info", id));
        }
        Ok(())
    }

    async fn get_bom_records(&self) -> RepositoryResult<Vec<BomLineItem>> {
        self.records.list_all()
    }

    async fn add_bom_record(&self, data: BomFormData) -> RepositoryResult<BomLineItem> {
        let record = data.into_line_item(Uuid::new_v4().to_string(), Utc::now());
        self.records.upsert(&record)?;
        Ok(record)
    }

    async fn update_bom_record(&self, id: &str, patch: BomPatch) -> RepositoryResult<BomLineItem> {
        let mut record = self
            .records
            .find_by_id(id)?
            .ok_or_else(|| RepositoryError::not_found("bom_record", id))?;
        patch.apply_to(&mut record, Utc::now());
        self.records.upsert(&record)?;
        Ok(record)
    }

    async fn delete_bom_record(&self, id: &str) -> RepositoryResult<()> {
        if !self.records.delete(id)? {
            return Err(RepositoryError::not_found("bom_record", id));
        }
        Ok(())
    }
}
