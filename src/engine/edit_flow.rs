// ==========================================
// 包装物料 BOM 系统 - 记录编辑流程
// ==========================================
// 职责: 打开一个 SKU 的已有记录，重新解析目录物料，编辑时保持需求数量随输入重算
// 红线: 目录中找不到原物料时保留已存储的需求数量，直到重新选料
// 红线: 只输出真正变化的字段
// ==========================================

use crate::catalog::SupplyCatalog;
use crate::domain::bom::{BomLineItem, BomPatch, CategoryWorkingState};
use crate::domain::product::{parse_lenient_number, Product, ProductPatch};
use crate::domain::session::Session;
use crate::domain::supply::SupplyItem;
use crate::domain::types::SupplyCategory;
use crate::engine::assembler::RecordAssembler;
use crate::engine::consumption::{self, FormulaKind};
use crate::engine::error::{AssemblyError, WorkingStateError, WorkingStateResult};
use std::sync::Arc;

// ==========================================
// EditableLine - 可编辑的 BOM 行
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct EditableLine {
    pub id: String,
    pub category: SupplyCategory,
    pub supply_code: String,
    pub supply_description: String,
    pub unit_of_measure: String,
    pub pieces_per_box: f64,
    pub consumption_per_box: f64,
    pub quantity_required: f64,
    /// 重新解析到的目录物料（None 表示目录已无此编码）
    pub resolved: Option<SupplyItem>,
    original: BomLineItem,
}

impl EditableLine {
    fn open(line: BomLineItem, catalog: &SupplyCatalog) -> Self {
        let resolved = catalog.find_by_code(&line.supply_code).cloned();
        if resolved.is_none() && !line.supply_code.trim().is_empty() {
            tracing::warn!(
                id = %line.id,
                supply_code = %line.supply_code,
                "目录中找不到物料，保留已存储的需求数量"
            );
        }
        Self {
            id: line.id.clone(),
            category: line.category,
            supply_code: line.supply_code.clone(),
            supply_description: line.supply_description.clone(),
            unit_of_measure: line.unit_of_measure.clone(),
            pieces_per_box: line.pieces_per_box,
            consumption_per_box: line.consumption_per_box,
            quantity_required: line.quantity_required,
            resolved,
            original: line,
        }
    }

    pub fn original(&self) -> &BomLineItem {
        &self.original
    }

    /// 仅在目录物料可用时重算
    fn recompute(&mut self) {
        let Some(item) = &self.resolved else {
            return;
        };
        let quantity = consumption::compute_quantity(
            FormulaKind::classify(self.category),
            self.pieces_per_box,
            self.consumption_per_box,
            item.content_per_unit,
        );
        if quantity != self.quantity_required {
            self.quantity_required = quantity;
        }
    }

    /// 转为工作状态（用于复用组装校验）
    fn as_working_state(&self) -> CategoryWorkingState {
        let selected_item = if self.supply_code.trim().is_empty() {
            None
        } else {
            Some(SupplyItem {
                code: self.supply_code.clone(),
                description: self.supply_description.clone(),
                category: self.category,
                unit_of_measure: self.unit_of_measure.clone(),
                content_per_unit: self
                    .resolved
                    .as_ref()
                    .map(|i| i.content_per_unit)
                    .unwrap_or(1.0),
            })
        };
        CategoryWorkingState {
            selected_item,
            pieces_per_box: self.pieces_per_box,
            consumption_per_box: self.consumption_per_box,
            quantity_required: self.quantity_required,
            toggled: false,
        }
    }

    /// 与原记录的差异（无变化为 None）
    pub fn patch(&self) -> Option<BomPatch> {
        let o = &self.original;
        let patch = BomPatch {
            category: (self.category != o.category).then_some(self.category),
            supply_code: (self.supply_code != o.supply_code).then(|| self.supply_code.clone()),
            supply_description: (self.supply_description != o.supply_description)
                .then(|| self.supply_description.clone()),
            pieces_per_box: (self.pieces_per_box != o.pieces_per_box)
                .then_some(self.pieces_per_box),
            consumption_per_box: (self.consumption_per_box != o.consumption_per_box)
                .then_some(self.consumption_per_box),
            quantity_required: (self.quantity_required != o.quantity_required)
                .then_some(self.quantity_required),
            unit_of_measure: (self.unit_of_measure != o.unit_of_measure)
                .then(|| self.unit_of_measure.clone()),
            updated_by: None,
        };
        (patch != BomPatch::default()).then_some(patch)
    }
}

/// 待保存的变更
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditChanges {
    /// (产品 id, 产品局部更新)
    pub product: Option<(String, ProductPatch)>,
    /// (BOM 行 id, 局部更新)，按行顺序
    pub lines: Vec<(String, BomPatch)>,
}

impl EditChanges {
    pub fn is_empty(&self) -> bool {
        self.product.is_none() && self.lines.is_empty()
    }

    /// 需要提交的调用次数
    pub fn len(&self) -> usize {
        self.lines.len() + usize::from(self.product.is_some())
    }
}

// ==========================================
// RecordEditSession - SKU 记录编辑会话
// ==========================================
#[derive(Debug, Clone)]
pub struct RecordEditSession {
    catalog: Arc<SupplyCatalog>,
    sku_code: String,
    product: Option<Product>,
    product_patch: ProductPatch,
    lines: Vec<EditableLine>,
}

impl RecordEditSession {
    /// 打开 SKU（只保留属于该 SKU 的行）
    pub fn open(
        catalog: Arc<SupplyCatalog>,
        sku_code: &str,
        product: Option<Product>,
        records: Vec<BomLineItem>,
    ) -> Self {
        let lines = records
            .into_iter()
            .filter(|r| r.sku_code == sku_code)
            .map(|r| EditableLine::open(r, &catalog))
            .collect();
        Self {
            catalog,
            sku_code: sku_code.to_string(),
            product,
            product_patch: ProductPatch::default(),
            lines,
        }
    }

    pub fn sku_code(&self) -> &str {
        &self.sku_code
    }

    pub fn product(&self) -> Option<&Product> {
        self.product.as_ref()
    }

    pub fn lines(&self) -> &[EditableLine] {
        &self.lines
    }

    pub fn line(&self, id: &str) -> Option<&EditableLine> {
        self.lines.iter().find(|l| l.id == id)
    }

    fn line_mut(&mut self, id: &str) -> WorkingStateResult<&mut EditableLine> {
        self.lines
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| WorkingStateError::LineNotFound(id.to_string()))
    }

    /// 修改行的类别（清空已选物料与数值）
    pub fn set_category(&mut self, id: &str, category: SupplyCategory) -> WorkingStateResult<()> {
        let line = self.line_mut(id)?;
        if line.category == category {
            return Ok(());
        }
        line.category = category;
        line.supply_code.clear();
        line.supply_description.clear();
        line.unit_of_measure.clear();
        line.pieces_per_box = 0.0;
        line.consumption_per_box = 0.0;
        line.quantity_required = 0.0;
        line.resolved = None;
        Ok(())
    }

    /// 重新选择目录物料（写入类别默认值并重算）
    pub fn select_supply(&mut self, id: &str, code: &str) -> WorkingStateResult<()> {
        let item = self
            .catalog
            .find_by_code(code)
            .cloned()
            .ok_or_else(|| WorkingStateError::SupplyNotFound(code.to_string()))?;
        let product = self.current_product();
        let line = self.line_mut(id)?;
        if item.category != line.category {
            return Err(WorkingStateError::CategoryMismatch {
                code: code.to_string(),
                expected: line.category.to_string(),
                actual: item.category.to_string(),
            });
        }

        let mut state = CategoryWorkingState::default();
        consumption::apply_selection(line.category, &mut state, item.clone(), product.as_ref());
        line.supply_code = item.code.clone();
        line.supply_description = item.description.clone();
        line.unit_of_measure = item.unit_of_measure.clone();
        line.pieces_per_box = state.pieces_per_box;
        line.consumption_per_box = state.consumption_per_box;
        line.resolved = Some(item);
        line.recompute();
        Ok(())
    }

    pub fn set_pieces(&mut self, id: &str, text: &str) -> WorkingStateResult<()> {
        let line = self.line_mut(id)?;
        line.pieces_per_box = parse_lenient_number(text);
        line.recompute();
        Ok(())
    }

    pub fn set_consumption(&mut self, id: &str, text: &str) -> WorkingStateResult<()> {
        let line = self.line_mut(id)?;
        line.consumption_per_box = parse_lenient_number(text);
        line.recompute();
        Ok(())
    }

    /// 产品编辑（累积到同一个局部更新）
    pub fn edit_product(&mut self, patch: ProductPatch) {
        let merged = ProductPatch {
            name: patch.name.or(self.product_patch.name.take()),
            package_type: patch.package_type.or(self.product_patch.package_type),
            package_size: patch.package_size.or(self.product_patch.package_size),
            box_count: patch.box_count.or(self.product_patch.box_count),
            weight_per_box: patch.weight_per_box.or(self.product_patch.weight_per_box),
            avg_weight_per_package: None,
            origin_room: patch.origin_room.or(self.product_patch.origin_room.take()),
            updated_by: None,
        };
        self.product_patch = merged;
    }

    /// 应用待保存产品变更后的产品视图
    fn current_product(&self) -> Option<Product> {
        let mut product = self.product.clone()?;
        if self.product_patch.has_changes() {
            self.product_patch.apply_to(&mut product, chrono::Utc::now());
        }
        Some(product)
    }

    /// 汇总待保存变更（校验被修改的行，写入 updated_by）
    pub fn pending_changes(&self, user: &Session) -> Result<EditChanges, AssemblyError> {
        let mut changes = EditChanges::default();

        if let Some(product) = &self.product {
            if self.product_patch.has_changes() {
                let mut patch = self.product_patch.clone();
                patch.updated_by = Some(user.user().to_string());
                changes.product = Some((product.id.clone(), patch));
            }
        }

        for line in &self.lines {
            let Some(mut patch) = line.patch() else {
                continue;
            };
            RecordAssembler::validate_state(
                line.category.as_str(),
                line.category,
                &line.as_working_state(),
            )?;
            patch.updated_by = Some(user.user().to_string());
            changes.lines.push((line.id.clone(), patch));
        }

        Ok(changes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(
        id: &str,
        category: SupplyCategory,
        code: &str,
        pieces: f64,
        consumption: f64,
        quantity: f64,
    ) -> BomLineItem {
        BomLineItem {
            id: id.to_string(),
            sku_code: "1-193".to_string(),
            sku_description: "CHULETA".to_string(),
            category,
            supply_code: code.to_string(),
            supply_description: "GUARDADO".to_string(),
            pieces_per_box: pieces,
            consumption_per_box: consumption,
            quantity_required: quantity,
            unit_of_measure: "KG".to_string(),
            created_by: "ana".to_string(),
            created_at: Utc::now(),
            updated_by: None,
            updated_at: None,
        }
    }

    fn open(records: Vec<BomLineItem>) -> RecordEditSession {
        RecordEditSession::open(Arc::new(SupplyCatalog::builtin()), "1-193", None, records)
    }

    #[test]
    fn test_catalog_hit_stays_reactive() {
        let mut s = open(vec![record("r1", SupplyCategory::WaxPaper, "INS-0701", 10.0, 0.1, 1.0)]);
        assert!(s.line("r1").unwrap().resolved.is_some());
        s.set_consumption("r1", "0.2").unwrap();
        assert!((s.line("r1").unwrap().quantity_required - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_catalog_miss_keeps_stored_quantity() {
        let mut s = open(vec![record("r1", SupplyCategory::WaxPaper, "GONE-1", 10.0, 0.1, 7.5)]);
        s.set_consumption("r1", "0.9").unwrap();
        let line = s.line("r1").unwrap();
        assert_eq!(line.quantity_required, 7.5);
        assert_eq!(line.consumption_per_box, 0.9);

        // 重新选料后恢复重算
        s.select_supply("r1", "INS-0701").unwrap();
        s.set_pieces("r1", "4").unwrap();
        s.set_consumption("r1", "0.5").unwrap();
        assert!((s.line("r1").unwrap().quantity_required - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_set_category_clears_selection() {
        let mut s = open(vec![record("r1", SupplyCategory::WaxPaper, "INS-0701", 10.0, 0.1, 1.0)]);
        s.set_category("r1", SupplyCategory::PrimaryPack).unwrap();
        let line = s.line("r1").unwrap();
        assert!(line.supply_code.is_empty());
        assert!(line.resolved.is_none());
        assert_eq!(line.quantity_required, 0.0);

        // 未重新选料时不允许保存
        let err = s.pending_changes(&Session::anonymous()).unwrap_err();
        assert!(matches!(err, AssemblyError::SupplyCodeRequired { .. }));
    }

    #[test]
    fn test_pending_changes_only_dirty_lines() {
        let mut s = open(vec![
            record("r1", SupplyCategory::WaxPaper, "INS-0701", 10.0, 0.1, 1.0),
            record("r2", SupplyCategory::Strap, "INS-1001", 1.0, 0.00045, 0.00045),
            record("other", SupplyCategory::Strap, "INS-1001", 1.0, 0.00045, 0.00045),
        ]);
        assert_eq!(s.lines().len(), 3);
        s.set_pieces("r1", "20").unwrap();

        let user = Session::login("luis").unwrap();
        let changes = s.pending_changes(&user).unwrap();
        assert_eq!(changes.lines.len(), 1);
        let (id, patch) = &changes.lines[0];
        assert_eq!(id, "r1");
        assert_eq!(patch.pieces_per_box, Some(20.0));
        assert!((patch.quantity_required.unwrap() - 2.0).abs() < 1e-12);
        assert_eq!(patch.consumption_per_box, None);
        assert_eq!(patch.updated_by.as_deref(), Some("luis"));
    }
}
