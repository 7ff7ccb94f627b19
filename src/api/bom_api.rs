// ==========================================
// 包装物料 BOM 系统 - BOM 记录 API
// ==========================================
// 职责: 录入会话组装后顺序提交、编辑保存、按 SKU 删除
// 红线: 逐条顺序提交，不并行；首个失败即停止并报告已保存条数
// 红线: 已保存的记录不回滚
// ==========================================

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, instrument, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::catalog::SupplyCatalog;
use crate::config::BomConfigReader;
use crate::domain::bom::BomLineItem;
use crate::domain::session::Session;
use crate::engine::assembler::RecordAssembler;
use crate::engine::edit_flow::RecordEditSession;
use crate::engine::working_state::BomEditSession;
use crate::repository::data_access::BomDataAccess;

// ==========================================
// BomApi - BOM 记录 API
// ==========================================
pub struct BomApi {
    data: Arc<dyn BomDataAccess>,
    config: Arc<dyn BomConfigReader>,
    catalog: Arc<SupplyCatalog>,
}

impl BomApi {
    /// 创建新的 BomApi 实例
    ///
    /// # 参数
    /// - data: 数据访问实现（本地库或远端优先缓存）
    /// - config: 配置读取（提交间隔）
    /// - catalog: 物料目录
    pub fn new(
        data: Arc<dyn BomDataAccess>,
        config: Arc<dyn BomConfigReader>,
        catalog: Arc<SupplyCatalog>,
    ) -> Self {
        Self {
            data,
            config,
            catalog,
        }
    }

    pub fn catalog(&self) -> &Arc<SupplyCatalog> {
        &self.catalog
    }

    // ==========================================
    // 录入
    // ==========================================

    /// 开始新的录入会话（尚未选择产品）
    pub fn new_entry_session(&self) -> BomEditSession {
        BomEditSession::new(self.catalog.clone())
    }

    /// 为指定产品开始录入会话
    ///
    /// # 返回
    /// - Err(NotFound): 产品 id 不存在
    pub async fn start_entry(&self, product_id: &str) -> ApiResult<BomEditSession> {
        let product = self
            .data
            .get_products()
            .await?
            .into_iter()
            .find(|p| p.id == product_id)
            .ok_or_else(|| ApiError::NotFound(format!("product(id={})不存在", product_id)))?;
        Ok(BomEditSession::for_product(self.catalog.clone(), product))
    }

    /// 组装并顺序提交录入会话中的全部 BOM 行
    ///
    /// # 返回
    /// - Ok(Vec<BomLineItem>): 全部写入成功的记录（按提交顺序）
    /// - Err(Assembly): 校验失败，未发生任何写入
    /// - Err(PartialPersistence): 第 failed_index 条失败，之前 saved 条已写入
    #[instrument(skip_all, fields(sku = %session.sku_code()))]
    pub async fn create_records(
        &self,
        session: &BomEditSession,
        user: &Session,
    ) -> ApiResult<Vec<BomLineItem>> {
        let records = RecordAssembler::assemble(session, user)?;
        let delay = self
            .config
            .submit_delay_ms()
            .await
            .map_err(|e| ApiError::Config(e.to_string()))?;

        let total = records.len();
        let mut saved = Vec::with_capacity(total);
        for (index, record) in records.into_iter().enumerate() {
            if index > 0 && delay > 0 {
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }
            info!(
                index = index + 1,
                total,
                category = %record.category,
                supply = %record.supply_code,
                "提交 BOM 行"
            );
            match self.data.add_bom_record(record).await {
                Ok(item) => saved.push(item),
                Err(e) => {
                    error!(saved = saved.len(), total, error = %e, "BOM 行提交失败，停止剩余提交");
                    return Err(ApiError::PartialPersistence {
                        saved: saved.len(),
                        total,
                        failed_index: index + 1,
                        reason: e.to_string(),
                    });
                }
            }
        }

        info!(total, "BOM 记录全部保存");
        Ok(saved)
    }

    // ==========================================
    // 查询
    // ==========================================

    pub async fn list_records(&self) -> ApiResult<Vec<BomLineItem>> {
        Ok(self.data.get_bom_records().await?)
    }

    /// 指定 SKU 的全部行
    pub async fn records_for_sku(&self, sku_code: &str) -> ApiResult<Vec<BomLineItem>> {
        let sku_code = sku_code.trim();
        Ok(self
            .data
            .get_bom_records()
            .await?
            .into_iter()
            .filter(|r| r.sku_code == sku_code)
            .collect())
    }

    // ==========================================
    // 编辑
    // ==========================================

    /// 打开 SKU 编辑会话（产品按编码匹配，可能不存在）
    pub async fn open_edit_session(&self, sku_code: &str) -> ApiResult<RecordEditSession> {
        let sku_code = sku_code.trim();
        if sku_code.is_empty() {
            return Err(ApiError::InvalidInput("SKU 编码不能为空".to_string()));
        }

        let records = self.data.get_bom_records().await?;
        let product = self
            .data
            .get_products()
            .await?
            .into_iter()
            .find(|p| p.code == sku_code);
        if product.is_none() {
            warn!(sku = sku_code, "SKU 没有对应的产品，仅编辑 BOM 行");
        }

        Ok(RecordEditSession::open(
            self.catalog.clone(),
            sku_code,
            product,
            records,
        ))
    }

    /// 保存编辑会话的变更（先产品，后逐行）
    ///
    /// # 返回
    /// - Ok(usize): 成功提交的调用次数（无变更时为 0）
    /// - Err(PartialPersistence): 首个失败即停止
    #[instrument(skip_all, fields(sku = %edit.sku_code()))]
    pub async fn save_changes(&self, edit: &RecordEditSession, user: &Session) -> ApiResult<usize> {
        let changes = edit.pending_changes(user)?;
        if changes.is_empty() {
            info!("没有待保存的变更");
            return Ok(0);
        }

        let total = changes.len();
        let mut saved = 0usize;

        if let Some((product_id, patch)) = changes.product {
            let patch = match edit.product() {
                Some(current) => patch.resolve_against(current)?,
                None => patch,
            };
            if let Err(e) = self.data.update_product(&product_id, patch).await {
                error!(saved, total, error = %e, "产品更新失败");
                return Err(ApiError::PartialPersistence {
                    saved,
                    total,
                    failed_index: saved + 1,
                    reason: e.to_string(),
                });
            }
            saved += 1;
        }

        for (line_id, patch) in changes.lines {
            info!(index = saved + 1, total, line = %line_id, "更新 BOM 行");
            if let Err(e) = self.data.update_bom_record(&line_id, patch).await {
                error!(saved, total, error = %e, "BOM 行更新失败，停止剩余提交");
                return Err(ApiError::PartialPersistence {
                    saved,
                    total,
                    failed_index: saved + 1,
                    reason: e.to_string(),
                });
            }
            saved += 1;
        }

        Ok(saved)
    }

    /// 删除 SKU 的全部 BOM 行（顺序执行）
    ///
    /// # 返回
    /// - Ok(usize): 删除的行数
    #[instrument(skip(self))]
    pub async fn delete_sku_records(&self, sku_code: &str) -> ApiResult<usize> {
        let lines = self.records_for_sku(sku_code).await?;
        let total = lines.len();
        let mut deleted = 0usize;

        for line in lines {
            if let Err(e) = self.data.delete_bom_record(&line.id).await {
                error!(deleted, total, error = %e, "BOM 行删除失败");
                return Err(ApiError::PartialPersistence {
                    saved: deleted,
                    total,
                    failed_index: deleted + 1,
                    reason: e.to_string(),
                });
            }
            deleted += 1;
        }

        info!(deleted, "SKU 记录已删除");
        Ok(deleted)
    }
}
