// ==========================================
// 包装物料 BOM 系统 - 记录组装器
// ==========================================
// 职责: 校验录入会话，把已完成的类别打包成待持久化的 BOM 行
// 红线: 第一个失败的检查即中止组装，在任何持久化调用之前
// 红线: "2" 副本槽位归一化为规范类别后输出
// ==========================================
// 校验顺序（每个选中的类别）:
// 1) 物料编码非空
// 2) 物料描述非空
// 3) 非标签类: 消耗 > 0（按件/按箱措辞区分）
// 4) 件数 > 0（小包标签措辞为"标签"）
// ==========================================

use crate::domain::bom::{BomFormData, CategoryWorkingState};
use crate::domain::session::Session;
use crate::domain::types::{CategorySlot, SupplyCategory};
use crate::engine::consumption::FormulaKind;
use crate::engine::error::AssemblyError;
use crate::engine::working_state::BomEditSession;
use tracing::instrument;

// ==========================================
// RecordAssembler - 记录组装器
// ==========================================
pub struct RecordAssembler;

impl RecordAssembler {
    /// 从录入会话组装 BOM 行
    #[instrument(skip_all, fields(sku = %session.sku_code()))]
    pub fn assemble(
        session: &BomEditSession,
        user: &Session,
    ) -> Result<Vec<BomFormData>, AssemblyError> {
        let fixed: Vec<(CategorySlot, &CategoryWorkingState)> = session
            .slots()
            .iter()
            .map(|e| (e.slot, &e.state))
            .collect();
        let additional: Vec<(&str, Option<SupplyCategory>, &CategoryWorkingState)> = session
            .additional()
            .iter()
            .map(|a| (a.id.as_str(), a.category, &a.state))
            .collect();

        Self::assemble_parts(
            session.sku_code(),
            session.sku_description(),
            &fixed,
            &additional,
            user,
        )
    }

    /// 组装核心（与会话解耦）
    ///
    /// # 参数
    /// - fixed: 可见槽位及其工作状态（按显示顺序）
    /// - additional: 额外物料 (id, 类别, 工作状态)
    ///
    /// # 返回
    /// - Ok: 待持久化的 BOM 行（固定类别在前，额外物料在后）
    /// - Err: 第一个失败的校验
    pub fn assemble_parts(
        sku_code: &str,
        sku_description: &str,
        fixed: &[(CategorySlot, &CategoryWorkingState)],
        additional: &[(&str, Option<SupplyCategory>, &CategoryWorkingState)],
        user: &Session,
    ) -> Result<Vec<BomFormData>, AssemblyError> {
        let sku_code = sku_code.trim();
        if sku_code.is_empty() {
            return Err(AssemblyError::SkuCodeRequired);
        }
        let sku_description = sku_description.trim();
        if sku_description.is_empty() {
            return Err(AssemblyError::SkuDescriptionRequired);
        }

        // 已选物料的类别参与输出；空槽位（含 "2" 副本）直接跳过
        let mut selected: Vec<(String, SupplyCategory, &CategoryWorkingState)> = fixed
            .iter()
            .filter(|(_, state)| state.selected_item.is_some())
            .map(|(slot, state)| (slot.label(), slot.category, *state))
            .collect();

        for (id, category, state) in additional {
            if state.selected_item.is_none() {
                continue;
            }
            let category = category.ok_or_else(|| AssemblyError::AdditionalCategoryRequired {
                id: id.to_string(),
            })?;
            selected.push((category.as_str().to_string(), category, *state));
        }

        if selected.is_empty() {
            return Err(AssemblyError::NothingToSave);
        }

        let mut records = Vec::with_capacity(selected.len());
        for (label, category, state) in selected {
            Self::validate_state(&label, category, state)?;
            records.push(BomFormData {
                sku_code: sku_code.to_string(),
                sku_description: sku_description.to_string(),
                category,
                supply_code: state.supply_code().trim().to_string(),
                supply_description: state.supply_description().trim().to_string(),
                pieces_per_box: state.pieces_per_box,
                consumption_per_box: state.consumption_per_box,
                quantity_required: state.quantity_required,
                unit_of_measure: state.unit_of_measure().to_string(),
                created_by: user.user().to_string(),
            });
        }

        tracing::debug!(count = records.len(), "组装完成");
        Ok(records)
    }

    /// 单个类别校验（顺序即优先级）
    pub fn validate_state(
        label: &str,
        category: SupplyCategory,
        state: &CategoryWorkingState,
    ) -> Result<(), AssemblyError> {
        let kind = FormulaKind::classify(category);

        if state.supply_code().trim().is_empty() {
            return Err(AssemblyError::SupplyCodeRequired {
                category: label.to_string(),
            });
        }
        if state.supply_description().trim().is_empty() {
            return Err(AssemblyError::DescriptionRequired {
                category: label.to_string(),
            });
        }
        if !kind.is_label() && !(state.consumption_per_box > 0.0) {
            return Err(AssemblyError::ConsumptionRequired {
                category: label.to_string(),
                per_piece: kind.consumption_is_per_piece(),
            });
        }
        if !(state.pieces_per_box > 0.0) {
            return Err(AssemblyError::PiecesRequired {
                category: label.to_string(),
                labels: kind == FormulaKind::PackageLabel,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::supply::SupplyItem;

    fn selected(category: SupplyCategory, pieces: f64, consumption: f64) -> CategoryWorkingState {
        let item = SupplyItem::new("C-1", "ITEM", category, "UND", 1.0).unwrap();
        let mut state = CategoryWorkingState {
            selected_item: Some(item),
            pieces_per_box: pieces,
            consumption_per_box: consumption,
            ..Default::default()
        };
        crate::engine::consumption::recompute(category, &mut state);
        state
    }

    #[test]
    fn test_sku_preconditions_run_first() {
        let user = Session::anonymous();
        assert_eq!(
            RecordAssembler::assemble_parts(" ", "X", &[], &[], &user),
            Err(AssemblyError::SkuCodeRequired)
        );
        assert_eq!(
            RecordAssembler::assemble_parts("1-193", "", &[], &[], &user),
            Err(AssemblyError::SkuDescriptionRequired)
        );
        assert_eq!(
            RecordAssembler::assemble_parts("1-193", "X", &[], &[], &user),
            Err(AssemblyError::NothingToSave)
        );
    }

    #[test]
    fn test_duplicate_slot_normalized_and_empty_skipped() {
        let user = Session::login("ana").unwrap();
        let label = selected(SupplyCategory::BoxLabel, 1.0, 2.0);
        let empty = CategoryWorkingState::default();
        let fixed = vec![
            (CategorySlot::primary(SupplyCategory::BoxLabel), &empty),
            (CategorySlot::second(SupplyCategory::BoxLabel), &label),
        ];
        let out = RecordAssembler::assemble_parts("1-193", "CHULETA", &fixed, &[], &user).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].category, SupplyCategory::BoxLabel);
        assert_eq!(out[0].created_by, "ana");
        assert_eq!(out[0].quantity_required, 2.0);
    }

    #[test]
    fn test_zero_consumption_names_category() {
        let user = Session::anonymous();
        let wax = selected(SupplyCategory::WaxPaper, 3.0, 0.0);
        let fixed = vec![(CategorySlot::primary(SupplyCategory::WaxPaper), &wax)];
        let err = RecordAssembler::assemble_parts("1-193", "X", &fixed, &[], &user).unwrap_err();
        assert_eq!(
            err,
            AssemblyError::ConsumptionRequired {
                category: "Papel Encerado".to_string(),
                per_piece: true,
            }
        );
        assert_eq!(err.category(), Some("Papel Encerado"));
    }

    #[test]
    fn test_package_label_skips_consumption_check() {
        let user = Session::anonymous();
        let label = selected(SupplyCategory::PackageLabel, 24.0, 0.0);
        let fixed = vec![(CategorySlot::second(SupplyCategory::PackageLabel), &label)];
        let out = RecordAssembler::assemble_parts("1-193", "X", &fixed, &[], &user).unwrap();
        assert_eq!(out[0].category, SupplyCategory::PackageLabel);

        let no_pieces = selected(SupplyCategory::PackageLabel, 0.0, 0.0);
        let fixed = vec![(CategorySlot::second(SupplyCategory::PackageLabel), &no_pieces)];
        let err = RecordAssembler::assemble_parts("1-193", "X", &fixed, &[], &user).unwrap_err();
        assert_eq!(
            err,
            AssemblyError::PiecesRequired {
                category: "Etiqueta Paquetería 2".to_string(),
                labels: true,
            }
        );
    }

    #[test]
    fn test_additional_requires_category() {
        let user = Session::anonymous();
        let state = selected(SupplyCategory::PrimaryPack, 0.0, 1.0);
        let additional = vec![("extra-1", None, &state)];
        let err =
            RecordAssembler::assemble_parts("1-193", "X", &[], &additional, &user).unwrap_err();
        assert!(matches!(err, AssemblyError::AdditionalCategoryRequired { .. }));
    }
}
