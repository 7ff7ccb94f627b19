// ==========================================
// 包装物料 BOM 系统 - BOM 录入会话（工作状态）
// ==========================================
// 职责: 持有一次录入的类别工作状态与额外物料，每次变更后显式重算
// 生命周期: 选中产品时创建，保存或取消时丢弃
// 红线: 不访问数据层；所有派生值由 consumption 模块计算
// ==========================================

use crate::catalog::SupplyCatalog;
use crate::domain::bom::{AdditionalSupply, CategoryWorkingState};
use crate::domain::product::{parse_lenient_number, Product};
use crate::domain::supply::SupplyItem;
use crate::domain::types::{CategorySlot, SupplyCategory};
use crate::engine::consumption::{self, FieldVisibility};
use crate::engine::error::{WorkingStateError, WorkingStateResult};
use crate::engine::visibility;
use std::sync::Arc;

/// 可见类别槽位 + 工作状态
#[derive(Debug, Clone, PartialEq)]
pub struct SlotEntry {
    pub slot: CategorySlot,
    pub state: CategoryWorkingState,
}

// ==========================================
// BomEditSession - BOM 录入会话
// ==========================================
#[derive(Debug, Clone)]
pub struct BomEditSession {
    catalog: Arc<SupplyCatalog>,
    product: Option<Product>,
    sku_code: String,
    sku_description: String,
    slots: Vec<SlotEntry>,
    additional: Vec<AdditionalSupply>,
    next_additional_id: u64,
}

impl BomEditSession {
    pub fn new(catalog: Arc<SupplyCatalog>) -> Self {
        Self {
            catalog,
            product: None,
            sku_code: String::new(),
            sku_description: String::new(),
            slots: Vec::new(),
            additional: Vec::new(),
            next_additional_id: 1,
        }
    }

    /// 为产品创建会话（等同于 new + select_product）
    pub fn for_product(catalog: Arc<SupplyCatalog>, product: Product) -> Self {
        let mut session = Self::new(catalog);
        session.select_product(product);
        session
    }

    // ==========================================
    // 访问器
    // ==========================================

    pub fn catalog(&self) -> &SupplyCatalog {
        &self.catalog
    }

    pub fn product(&self) -> Option<&Product> {
        self.product.as_ref()
    }

    pub fn sku_code(&self) -> &str {
        &self.sku_code
    }

    pub fn sku_description(&self) -> &str {
        &self.sku_description
    }

    pub fn slots(&self) -> &[SlotEntry] {
        &self.slots
    }

    pub fn additional(&self) -> &[AdditionalSupply] {
        &self.additional
    }

    pub fn state(&self, slot: CategorySlot) -> Option<&CategoryWorkingState> {
        self.slots.iter().find(|e| e.slot == slot).map(|e| &e.state)
    }

    pub fn additional_item(&self, id: &str) -> Option<&AdditionalSupply> {
        self.additional.iter().find(|a| a.id == id)
    }

    /// 槽位的字段可见性
    pub fn field_visibility(&self, slot: CategorySlot) -> FieldVisibility {
        consumption::field_visibility(slot.category, self.product.as_ref())
    }

    // ==========================================
    // 产品 / SKU
    // ==========================================

    /// 选中产品：重建可见槽位，清空工作状态，应用 THERMOPACK 膜计算
    pub fn select_product(&mut self, product: Product) {
        self.sku_code = product.code.clone();
        self.sku_description = product.name.clone();
        self.slots = visibility::slots_for(product.package_type)
            .into_iter()
            .map(|slot| SlotEntry {
                slot,
                state: CategoryWorkingState::default(),
            })
            .collect();
        tracing::debug!(
            sku = %product.code,
            package_type = %product.package_type,
            slots = self.slots.len(),
            "选中产品"
        );
        self.product = Some(product);
        self.apply_film_plan();
    }

    /// 手工录入 SKU 文本（不改变已选产品）
    pub fn set_sku(&mut self, code: &str, description: &str) {
        self.sku_code = code.to_string();
        self.sku_description = description.to_string();
    }

    /// 产品包装规格或每箱包数变化后调用：重新计算膜并刷新小包标签件数
    pub fn update_product(&mut self, product: Product) {
        let box_count = product.box_count;
        self.product = Some(product);
        for entry in &mut self.slots {
            if entry.slot.category == SupplyCategory::PackageLabel
                && entry.state.selected_item.is_some()
            {
                entry.state.pieces_per_box = box_count;
                consumption::recompute(entry.slot.category, &mut entry.state);
            }
        }
        self.apply_film_plan();
    }

    fn apply_film_plan(&mut self) {
        let Some(plan) = self.product.as_ref().and_then(consumption::thermopack_film_plan) else {
            return;
        };
        for entry in &mut self.slots {
            let category = entry.slot.category;
            let first = self.catalog.first_in_category(category);
            if consumption::apply_film_plan(&plan, category, &mut entry.state, first) {
                tracing::debug!(
                    category = %category,
                    consumption = entry.state.consumption_per_box,
                    "THERMOPACK 膜自动计算"
                );
            }
        }
    }

    // ==========================================
    // 固定类别槽位
    // ==========================================

    fn entry_mut(&mut self, slot: CategorySlot) -> WorkingStateResult<&mut SlotEntry> {
        self.slots
            .iter_mut()
            .find(|e| e.slot == slot)
            .ok_or_else(|| WorkingStateError::SlotNotVisible(slot.label()))
    }

    fn lookup(&self, category: SupplyCategory, code: &str) -> WorkingStateResult<SupplyItem> {
        let item = self
            .catalog
            .find_by_code(code)
            .ok_or_else(|| WorkingStateError::SupplyNotFound(code.to_string()))?;
        if item.category != category {
            return Err(WorkingStateError::CategoryMismatch {
                code: code.to_string(),
                expected: category.to_string(),
                actual: item.category.to_string(),
            });
        }
        Ok(item.clone())
    }

    /// 为槽位选择目录物料（写入默认件数/消耗并重算）
    pub fn select_supply(&mut self, slot: CategorySlot, code: &str) -> WorkingStateResult<()> {
        let item = self.lookup(slot.category, code)?;
        let product = self.product.clone();
        let entry = self.entry_mut(slot)?;
        consumption::apply_selection(slot.category, &mut entry.state, item, product.as_ref());
        Ok(())
    }

    /// 清空槽位
    pub fn clear_slot(&mut self, slot: CategorySlot) -> WorkingStateResult<()> {
        self.entry_mut(slot)?.state.clear();
        Ok(())
    }

    /// 录入每箱件数（文本，宽松解析）
    pub fn set_pieces(&mut self, slot: CategorySlot, text: &str) -> WorkingStateResult<()> {
        let entry = self.entry_mut(slot)?;
        entry.state.pieces_per_box = parse_lenient_number(text);
        consumption::recompute(slot.category, &mut entry.state);
        Ok(())
    }

    /// 录入每箱（或每件）消耗（文本，宽松解析）
    pub fn set_consumption(&mut self, slot: CategorySlot, text: &str) -> WorkingStateResult<()> {
        let entry = self.entry_mut(slot)?;
        entry.state.consumption_per_box = parse_lenient_number(text);
        consumption::recompute(slot.category, &mut entry.state);
        Ok(())
    }

    /// 打包带 / 订书钉开关
    pub fn set_toggle(&mut self, category: SupplyCategory, enabled: bool) -> WorkingStateResult<()> {
        if consumption::toggle_consumption(category).is_none() {
            return Err(WorkingStateError::NotToggleable(category.to_string()));
        }
        let first = self.catalog.first_in_category(category).cloned();
        let entry = self.entry_mut(CategorySlot::primary(category))?;
        if !consumption::apply_toggle(category, &mut entry.state, enabled, first.as_ref()) {
            return Err(WorkingStateError::EmptyCategory(category.to_string()));
        }
        Ok(())
    }

    // ==========================================
    // 额外物料
    // ==========================================

    /// 新增一条空的额外物料，返回其 id
    pub fn add_additional(&mut self) -> String {
        let id = format!("extra-{}", self.next_additional_id);
        self.next_additional_id += 1;
        self.additional.push(AdditionalSupply::new(id.clone()));
        id
    }

    pub fn remove_additional(&mut self, id: &str) -> WorkingStateResult<()> {
        let before = self.additional.len();
        self.additional.retain(|a| a.id != id);
        if self.additional.len() == before {
            return Err(WorkingStateError::AdditionalNotFound(id.to_string()));
        }
        Ok(())
    }

    fn additional_mut(&mut self, id: &str) -> WorkingStateResult<&mut AdditionalSupply> {
        self.additional
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| WorkingStateError::AdditionalNotFound(id.to_string()))
    }

    /// 设置额外物料的类别（类别变化时清空已选物料）
    pub fn set_additional_category(
        &mut self,
        id: &str,
        category: SupplyCategory,
    ) -> WorkingStateResult<()> {
        let extra = self.additional_mut(id)?;
        if extra.category != Some(category) {
            extra.category = Some(category);
            extra.state.clear();
        }
        Ok(())
    }

    pub fn select_additional_supply(&mut self, id: &str, code: &str) -> WorkingStateResult<()> {
        let category = self
            .additional_item(id)
            .ok_or_else(|| WorkingStateError::AdditionalNotFound(id.to_string()))?
            .category
            .ok_or_else(|| WorkingStateError::AdditionalCategoryMissing(id.to_string()))?;
        let item = self.lookup(category, code)?;
        let product = self.product.clone();
        let extra = self.additional_mut(id)?;
        consumption::apply_selection(category, &mut extra.state, item, product.as_ref());
        Ok(())
    }

    pub fn set_additional_pieces(&mut self, id: &str, text: &str) -> WorkingStateResult<()> {
        let extra = self.additional_mut(id)?;
        extra.state.pieces_per_box = parse_lenient_number(text);
        if let Some(category) = extra.category {
            consumption::recompute(category, &mut extra.state);
        }
        Ok(())
    }

    pub fn set_additional_consumption(&mut self, id: &str, text: &str) -> WorkingStateResult<()> {
        let extra = self.additional_mut(id)?;
        extra.state.consumption_per_box = parse_lenient_number(text);
        if let Some(category) = extra.category {
            consumption::recompute(category, &mut extra.state);
        }
        Ok(())
    }

    /// 会话是否有任何已选物料（保存按钮可用）
    pub fn has_any_selection(&self) -> bool {
        self.slots.iter().any(|e| e.state.selected_item.is_some())
            || self
                .additional
                .iter()
                .any(|a| a.state.selected_item.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{PackageSize, PackageType};
    use chrono::Utc;

    fn product(package_type: PackageType, size: PackageSize, box_count: f64) -> Product {
        Product {
            id: "p1".to_string(),
            code: "1-193".to_string(),
            name: "CHULETA".to_string(),
            package_type,
            package_size: size,
            box_count,
            weight_per_box: 10.0,
            avg_weight_per_package: 0.0,
            origin_room: "SALA 1".to_string(),
            created_by: "tester".to_string(),
            created_at: Utc::now(),
            updated_by: None,
            updated_at: None,
        }
    }

    fn session(p: Product) -> BomEditSession {
        BomEditSession::for_product(Arc::new(SupplyCatalog::builtin()), p)
    }

    #[test]
    fn test_select_product_builds_slots() {
        let s = session(product(PackageType::BulkPack, PackageSize::NotApplicable, 0.0));
        assert_eq!(s.slots().len(), 6);
        assert_eq!(s.sku_code(), "1-193");
        assert_eq!(s.sku_description(), "CHULETA");
        assert!(!s.has_any_selection());
    }

    #[test]
    fn test_thermopack_films_applied_on_select() {
        let s = session(product(PackageType::Thermopack, PackageSize::ThreeByOne, 50.0));
        let bottom = s.state(CategorySlot::primary(SupplyCategory::FilmBottom)).unwrap();
        assert!((bottom.consumption_per_box - 0.01225).abs() < 1e-12);
        assert_eq!(bottom.pieces_per_box, 50.0);
        assert!((bottom.quantity_required - 0.6125).abs() < 1e-9);

        let top = s.state(CategorySlot::primary(SupplyCategory::FilmTop)).unwrap();
        assert!((top.consumption_per_box - 0.01665).abs() < 1e-12);
    }

    #[test]
    fn test_update_product_recomputes_films() {
        let mut s = session(product(PackageType::Thermopack, PackageSize::ThreeByOne, 50.0));
        s.update_product(product(PackageType::Thermopack, PackageSize::TwoByOne, 100.0));
        let bottom = s.state(CategorySlot::primary(SupplyCategory::FilmBottom)).unwrap();
        assert!((bottom.consumption_per_box - 0.0369).abs() < 1e-12);
        assert_eq!(bottom.pieces_per_box, 100.0);
    }

    #[test]
    fn test_select_supply_rejects_wrong_category_and_hidden_slot() {
        let mut s = session(product(PackageType::BulkPack, PackageSize::NotApplicable, 0.0));
        let err = s
            .select_supply(CategorySlot::primary(SupplyCategory::MasterBag), "INS-1001")
            .unwrap_err();
        assert!(matches!(err, WorkingStateError::CategoryMismatch { .. }));

        let err = s
            .select_supply(CategorySlot::primary(SupplyCategory::WaxPaper), "INS-0701")
            .unwrap_err();
        assert!(matches!(err, WorkingStateError::SlotNotVisible(_)));
    }

    #[test]
    fn test_lenient_inputs_recompute() {
        let mut s = session(product(
            PackageType::IndividualBoxes,
            PackageSize::NotApplicable,
            6.0,
        ));
        let slot = CategorySlot::primary(SupplyCategory::WaxPaper);
        s.select_supply(slot, "INS-0701").unwrap();
        s.set_pieces(slot, "12").unwrap();
        s.set_consumption(slot, "0,01").unwrap();
        assert!((s.state(slot).unwrap().quantity_required - 0.12).abs() < 1e-12);

        s.set_consumption(slot, "abc").unwrap();
        assert_eq!(s.state(slot).unwrap().quantity_required, 0.0);
    }

    #[test]
    fn test_toggle_strap() {
        let mut s = session(product(PackageType::BulkPack, PackageSize::NotApplicable, 0.0));
        s.set_toggle(SupplyCategory::Strap, true).unwrap();
        let strap = s.state(CategorySlot::primary(SupplyCategory::Strap)).unwrap();
        assert_eq!(strap.supply_code(), "INS-1001");
        assert!(strap.toggled);

        s.set_toggle(SupplyCategory::Strap, false).unwrap();
        let strap = s.state(CategorySlot::primary(SupplyCategory::Strap)).unwrap();
        assert_eq!(*strap, CategoryWorkingState::default());

        assert!(matches!(
            s.set_toggle(SupplyCategory::MasterBag, true),
            Err(WorkingStateError::NotToggleable(_))
        ));
    }

    #[test]
    fn test_additional_supply_lifecycle() {
        let mut s = session(product(PackageType::VacuumPack, PackageSize::NotApplicable, 20.0));
        let id = s.add_additional();
        assert!(matches!(
            s.select_additional_supply(&id, "INS-0301"),
            Err(WorkingStateError::AdditionalCategoryMissing(_))
        ));

        s.set_additional_category(&id, SupplyCategory::PackageLabel).unwrap();
        s.select_additional_supply(&id, "INS-0301").unwrap();
        let extra = s.additional_item(&id).unwrap();
        assert_eq!(extra.state.pieces_per_box, 20.0);
        assert!((extra.state.quantity_required - 0.02).abs() < 1e-12);

        // 切换类别清空选择
        s.set_additional_category(&id, SupplyCategory::WaxPaper).unwrap();
        assert!(s.additional_item(&id).unwrap().state.selected_item.is_none());

        s.remove_additional(&id).unwrap();
        assert!(s.additional().is_empty());
        assert!(s.remove_additional(&id).is_err());
    }
}
