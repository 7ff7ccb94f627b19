// ==========================================
// 包装物料 BOM 系统 - 类别可见性解析
// ==========================================
// 职责: 包装类型 → 有序的物料类别槽位列表
// 红线: 本表是"产品类型需要哪些物料类别"的唯一来源
// 红线: 未识别的包装类型返回空列表（不是错误）
// ==========================================

use crate::domain::types::{CategorySlot, PackageType, SupplyCategory};

use SupplyCategory::*;

/// 各包装类型的类别槽位（顺序用于显示，不影响语义）
pub fn slots_for(package_type: PackageType) -> Vec<CategorySlot> {
    let p = CategorySlot::primary;
    let second = CategorySlot::second;
    match package_type {
        PackageType::BulkPack => vec![
            p(MasterBag),
            p(BoxLabel),
            second(BoxLabel),
            p(Strap),
            p(CorrugatedBottom),
            p(CorrugatedTop),
        ],
        PackageType::IndividualBoxes => vec![
            p(PrimaryPack),
            p(BoxLabel),
            second(BoxLabel),
            p(CakeDetailBox),
            p(CakeMasterBox),
            p(WaxPaper),
            p(CorrugatedTop),
            p(CorrugatedBottom),
            p(Strap),
        ],
        PackageType::PlasticBag => vec![
            p(MasterBag),
            p(PrimaryPack),
            p(BoxLabel),
            second(BoxLabel),
            p(Strap),
            p(CorrugatedBottom),
            p(CorrugatedTop),
            p(Staple),
        ],
        PackageType::IndividuallyWrapped | PackageType::LayerPack => vec![
            p(MasterBag),
            p(PrimaryPack),
            p(BoxLabel),
            second(BoxLabel),
            p(Strap),
            p(CorrugatedBottom),
            p(CorrugatedTop),
        ],
        PackageType::Thermopack => vec![
            p(MasterBag),
            p(PackageLabel),
            second(PackageLabel),
            p(BoxLabel),
            second(BoxLabel),
            p(Strap),
            p(CorrugatedBottom),
            p(CorrugatedTop),
            p(FilmTop),
            p(FilmBottom),
        ],
        PackageType::VacuumPack | PackageType::VacuumPackTbg => vec![
            p(MasterBag),
            p(PrimaryPack),
            p(PackageLabel),
            second(PackageLabel),
            p(BoxLabel),
            second(BoxLabel),
            p(Strap),
            p(CorrugatedBottom),
            p(CorrugatedTop),
        ],
    }
}

/// 按包装类型名称解析可见类别槽位
///
/// # 参数
/// - package_type: 包装类型名称（规范名称或英文别名）
///
/// # 返回
/// - 有序槽位列表；无法识别的类型返回空列表
pub fn visible_categories(package_type: &str) -> Vec<CategorySlot> {
    match package_type.parse::<PackageType>() {
        Ok(pt) => slots_for(pt),
        Err(_) => {
            tracing::debug!(package_type, "未识别的包装类型，无可见类别");
            Vec::new()
        }
    }
}

/// 可见类别的显示标签
pub fn visible_category_labels(package_type: &str) -> Vec<String> {
    visible_categories(package_type)
        .iter()
        .map(CategorySlot::label)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unrecognized_type_is_empty() {
        assert!(visible_categories("CAJA MISTERIOSA").is_empty());
        assert!(visible_categories("").is_empty());
    }

    #[test]
    fn test_bulk_pack_table() {
        let labels = visible_category_labels("BULK PACK");
        assert_eq!(
            labels,
            vec![
                "Bolsa Master",
                "Etiqueta Caja",
                "Etiqueta Caja 2",
                "Fleje",
                "Fondo Carton Corrugado",
                "Tapa Carton Corrugado",
            ]
        );
    }

    #[test]
    fn test_thermopack_has_films_and_package_labels() {
        let slots = visible_categories("THERMOPACK");
        assert_eq!(slots.len(), 10);
        assert_eq!(slots[1], CategorySlot::primary(PackageLabel));
        assert_eq!(slots[2], CategorySlot::second(PackageLabel));
        assert_eq!(slots[8], CategorySlot::primary(FilmTop));
        assert_eq!(slots[9], CategorySlot::primary(FilmBottom));
    }

    #[test]
    fn test_aliases_share_tables() {
        assert_eq!(
            visible_categories("VACUUM PACK"),
            visible_categories("VACUUM PACK TBG")
        );
        assert_eq!(
            visible_categories("INDIVIDUALLY WRAPPED (IW)"),
            visible_categories("LAYER PACK")
        );
        assert_eq!(
            visible_categories("Plastic Bag"),
            visible_categories("FUNDA PLASTICA")
        );
        assert_eq!(visible_categories("CAJAS INDIVIDUALES").len(), 9);
    }

    #[test]
    fn test_only_label_categories_get_duplicate_slots() {
        for pt in PackageType::ALL {
            for slot in slots_for(pt) {
                if slot.duplicate {
                    assert!(slot.category.allows_duplicate_slot());
                }
            }
        }
    }
}
