// ==========================================
// 包装物料 BOM 系统 - 领域类型定义
// ==========================================
// 职责: 包装类型、包装规格、物料类别、类别槽位
// 红线: 持久化使用规范名称（与远端表格一致），解析兼容英文别名
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// 解析错误
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("无法识别的{kind}: {value}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseEnumError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// 规范化比较键：去首尾空白、转大写、压缩内部空白
fn normalize_key(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

// ==========================================
// 包装类型 (Package Type)
// ==========================================
// 共 8 种；BULK PACK 不计包数，THERMOPACK 需要规格
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PackageType {
    BulkPack,            // 散装（按箱）
    IndividualBoxes,     // 独立盒装
    PlasticBag,          // 塑料袋
    IndividuallyWrapped, // 单独包裹
    LayerPack,           // 分层包装
    Thermopack,          // 热成型包装
    VacuumPack,          // 真空包装
    VacuumPackTbg,       // 真空包装 TBG
}

impl PackageType {
    pub const ALL: [PackageType; 8] = [
        PackageType::BulkPack,
        PackageType::IndividualBoxes,
        PackageType::PlasticBag,
        PackageType::IndividuallyWrapped,
        PackageType::LayerPack,
        PackageType::Thermopack,
        PackageType::VacuumPack,
        PackageType::VacuumPackTbg,
    ];

    /// 规范名称（持久化值）
    pub fn as_str(&self) -> &'static str {
        match self {
            PackageType::BulkPack => "BULK PACK",
            PackageType::IndividualBoxes => "CAJAS INDIVIDUALES",
            PackageType::PlasticBag => "FUNDA PLASTICA",
            PackageType::IndividuallyWrapped => "INDIVIDUALLY WRAPPED (IW)",
            PackageType::LayerPack => "LAYER PACK (LP)",
            PackageType::Thermopack => "THERMOPACK",
            PackageType::VacuumPack => "VACUUM PACK",
            PackageType::VacuumPackTbg => "VACUUM PACK TBG",
        }
    }

    /// 是否散装（免除包数/平均重量校验）
    pub fn is_bulk(&self) -> bool {
        matches!(self, PackageType::BulkPack)
    }

    pub fn is_thermopack(&self) -> bool {
        matches!(self, PackageType::Thermopack)
    }
}

impl FromStr for PackageType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = normalize_key(s);
        let parsed = match key.as_str() {
            "BULK PACK" | "BULK PACK (GRANEL)" => PackageType::BulkPack,
            "CAJAS INDIVIDUALES" | "INDIVIDUAL BOXES" => PackageType::IndividualBoxes,
            "FUNDA PLASTICA" | "FUNDA PLÁSTICA" | "PLASTIC BAG" => PackageType::PlasticBag,
            "INDIVIDUALLY WRAPPED (IW)" | "INDIVIDUALLY WRAPPED" => {
                PackageType::IndividuallyWrapped
            }
            "LAYER PACK (LP)" | "LAYER PACK" => PackageType::LayerPack,
            "THERMOPACK" => PackageType::Thermopack,
            "VACUUM PACK" => PackageType::VacuumPack,
            "VACUUM PACK TBG" => PackageType::VacuumPackTbg,
            _ => return Err(ParseEnumError::new("包装类型", s)),
        };
        Ok(parsed)
    }
}

impl TryFrom<String> for PackageType {
    type Error = ParseEnumError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PackageType> for String {
    fn from(value: PackageType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for PackageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 包装规格 (Package Size)
// ==========================================
// 仅对 THERMOPACK 有意义，其余类型为 N/A
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PackageSize {
    ThreeByOne,
    TwoByOne,
    TwoByTwo,
    NotApplicable,
}

impl PackageSize {
    pub const SELECTABLE: [PackageSize; 3] = [
        PackageSize::ThreeByOne,
        PackageSize::TwoByOne,
        PackageSize::TwoByTwo,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PackageSize::ThreeByOne => "3X1",
            PackageSize::TwoByOne => "2X1",
            PackageSize::TwoByTwo => "2X2",
            PackageSize::NotApplicable => "N/A",
        }
    }

    pub fn is_set(&self) -> bool {
        !matches!(self, PackageSize::NotApplicable)
    }
}

impl Default for PackageSize {
    fn default() -> Self {
        PackageSize::NotApplicable
    }
}

impl FromStr for PackageSize {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = normalize_key(s).replace(' ', "");
        match key.as_str() {
            "3X1" => Ok(PackageSize::ThreeByOne),
            "2X1" => Ok(PackageSize::TwoByOne),
            "2X2" => Ok(PackageSize::TwoByTwo),
            "" | "N/A" | "NA" => Ok(PackageSize::NotApplicable),
            _ => Err(ParseEnumError::new("包装规格", s)),
        }
    }
}

impl TryFrom<String> for PackageSize {
    type Error = ParseEnumError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PackageSize> for String {
    fn from(value: PackageSize) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for PackageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 物料类别 (Supply Category)
// ==========================================
// 13 个规范类别；持久化名称为西语原名
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SupplyCategory {
    MasterBag,        // 外袋
    PrimaryPack,      // 内包装
    PackageLabel,     // 小包标签
    BoxLabel,         // 箱标签
    CakeDetailBox,    // 饼状产品零售盒
    CakeMasterBox,    // 饼状产品外箱
    WaxPaper,         // 蜡纸
    CorrugatedTop,    // 瓦楞纸箱盖
    CorrugatedBottom, // 瓦楞纸箱底
    Strap,            // 打包带
    Staple,           // 订书钉
    FilmTop,          // 上膜
    FilmBottom,       // 底膜
}

impl SupplyCategory {
    pub const ALL: [SupplyCategory; 13] = [
        SupplyCategory::MasterBag,
        SupplyCategory::PrimaryPack,
        SupplyCategory::PackageLabel,
        SupplyCategory::BoxLabel,
        SupplyCategory::CakeDetailBox,
        SupplyCategory::CakeMasterBox,
        SupplyCategory::WaxPaper,
        SupplyCategory::CorrugatedTop,
        SupplyCategory::CorrugatedBottom,
        SupplyCategory::Strap,
        SupplyCategory::Staple,
        SupplyCategory::FilmTop,
        SupplyCategory::FilmBottom,
    ];

    /// 规范名称（持久化值）
    pub fn as_str(&self) -> &'static str {
        match self {
            SupplyCategory::MasterBag => "Bolsa Master",
            SupplyCategory::PrimaryPack => "Empaque Primario",
            SupplyCategory::PackageLabel => "Etiqueta Paquetería",
            SupplyCategory::BoxLabel => "Etiqueta Caja",
            SupplyCategory::CakeDetailBox => "Caja Detalle Tortas",
            SupplyCategory::CakeMasterBox => "Caja Master Tortas",
            SupplyCategory::WaxPaper => "Papel Encerado",
            SupplyCategory::CorrugatedTop => "Tapa Carton Corrugado",
            SupplyCategory::CorrugatedBottom => "Fondo Carton Corrugado",
            SupplyCategory::Strap => "Fleje",
            SupplyCategory::Staple => "Grapa",
            SupplyCategory::FilmTop => "Film Tapa",
            SupplyCategory::FilmBottom => "Film Fondo",
        }
    }

    /// 英文标识（兼容解析）
    fn english_name(&self) -> &'static str {
        match self {
            SupplyCategory::MasterBag => "MasterBag",
            SupplyCategory::PrimaryPack => "PrimaryPack",
            SupplyCategory::PackageLabel => "PackageLabel",
            SupplyCategory::BoxLabel => "BoxLabel",
            SupplyCategory::CakeDetailBox => "CakeDetailBox",
            SupplyCategory::CakeMasterBox => "CakeMasterBox",
            SupplyCategory::WaxPaper => "WaxPaper",
            SupplyCategory::CorrugatedTop => "CorrugatedTop",
            SupplyCategory::CorrugatedBottom => "CorrugatedBottom",
            SupplyCategory::Strap => "Strap",
            SupplyCategory::Staple => "Staple",
            SupplyCategory::FilmTop => "FilmTop",
            SupplyCategory::FilmBottom => "FilmBottom",
        }
    }

    /// 是否允许出现第二个槽位（"2" 副本）
    pub fn allows_duplicate_slot(&self) -> bool {
        matches!(self, SupplyCategory::PackageLabel | SupplyCategory::BoxLabel)
    }
}

impl FromStr for SupplyCategory {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = normalize_key(s);
        let compact = key.replace(' ', "");
        SupplyCategory::ALL
            .into_iter()
            .find(|c| {
                let canonical = normalize_key(c.as_str());
                canonical == key
                    || canonical.replace('Í', "I") == key
                    || c.english_name().to_uppercase() == compact
            })
            .ok_or_else(|| ParseEnumError::new("物料类别", s))
    }
}

impl TryFrom<String> for SupplyCategory {
    type Error = ParseEnumError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SupplyCategory> for String {
    fn from(value: SupplyCategory) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for SupplyCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 类别槽位 (Category Slot)
// ==========================================
// 界面显示标签 → 规范类别的映射；"2" 副本仅在组装时归一化
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CategorySlot {
    pub category: SupplyCategory,
    pub duplicate: bool,
}

/// 副本槽位标签表（显示标签 → 规范类别）
const DUPLICATE_SLOT_LABELS: [(&str, SupplyCategory); 2] = [
    ("Etiqueta Paquetería 2", SupplyCategory::PackageLabel),
    ("Etiqueta Caja 2", SupplyCategory::BoxLabel),
];

impl CategorySlot {
    pub const fn primary(category: SupplyCategory) -> Self {
        Self {
            category,
            duplicate: false,
        }
    }

    pub const fn second(category: SupplyCategory) -> Self {
        Self {
            category,
            duplicate: true,
        }
    }

    /// 显示标签
    pub fn label(&self) -> String {
        if self.duplicate {
            format!("{} 2", self.category.as_str())
        } else {
            self.category.as_str().to_string()
        }
    }

    /// 从显示标签解析（接受 "Etiqueta Caja 2" / "BoxLabel2" 等）
    pub fn from_label(label: &str) -> Option<Self> {
        let trimmed = label.trim();
        if let Some((_, category)) = DUPLICATE_SLOT_LABELS
            .iter()
            .find(|(l, _)| normalize_key(l) == normalize_key(trimmed))
        {
            return Some(Self::second(*category));
        }

        if let Ok(category) = trimmed.parse::<SupplyCategory>() {
            return Some(Self::primary(category));
        }

        // 英文副本标签: "BoxLabel2" / "Box Label 2"
        let base = trimmed.strip_suffix('2')?.trim_end();
        let category = base.parse::<SupplyCategory>().ok()?;
        category
            .allows_duplicate_slot()
            .then(|| Self::second(category))
    }
}

impl fmt::Display for CategorySlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ==========================================
// 重量单位 (Weight Unit)
// ==========================================
// 单一口径，由配置决定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WeightUnit {
    Kilogram,
    Pound,
}

impl WeightUnit {
    pub fn symbol(&self) -> &'static str {
        match self {
            WeightUnit::Kilogram => "kg",
            WeightUnit::Pound => "lb",
        }
    }
}

impl Default for WeightUnit {
    fn default() -> Self {
        WeightUnit::Kilogram
    }
}

impl FromStr for WeightUnit {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_key(s).as_str() {
            "KG" | "KILOGRAM" | "KILOGRAMOS" => Ok(WeightUnit::Kilogram),
            "LB" | "LBS" | "POUND" | "LIBRAS" => Ok(WeightUnit::Pound),
            _ => Err(ParseEnumError::new("重量单位", s)),
        }
    }
}

impl fmt::Display for WeightUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// 计数型计量单位（袋/个）：显示时取整
pub fn is_count_unit(unit_of_measure: &str) -> bool {
    matches!(
        normalize_key(unit_of_measure).as_str(),
        "BOLSAS" | "BAGS" | "UND" | "UNIT"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_type_aliases() {
        assert_eq!("BULK PACK".parse::<PackageType>(), Ok(PackageType::BulkPack));
        assert_eq!(
            "BULK PACK (GRANEL)".parse::<PackageType>(),
            Ok(PackageType::BulkPack)
        );
        assert_eq!(
            "individual boxes".parse::<PackageType>(),
            Ok(PackageType::IndividualBoxes)
        );
        assert_eq!(
            "LAYER PACK".parse::<PackageType>(),
            Ok(PackageType::LayerPack)
        );
        assert!("CARTON".parse::<PackageType>().is_err());
    }

    #[test]
    fn test_package_type_serde_uses_canonical_name() {
        let json = serde_json::to_string(&PackageType::PlasticBag).unwrap();
        assert_eq!(json, "\"FUNDA PLASTICA\"");
        let back: PackageType = serde_json::from_str("\"PLASTIC BAG\"").unwrap();
        assert_eq!(back, PackageType::PlasticBag);
    }

    #[test]
    fn test_package_size_parse() {
        assert_eq!("2x1".parse::<PackageSize>(), Ok(PackageSize::TwoByOne));
        assert_eq!("N/A".parse::<PackageSize>(), Ok(PackageSize::NotApplicable));
        assert!("4X4".parse::<PackageSize>().is_err());
    }

    #[test]
    fn test_category_parse_spanish_and_english() {
        assert_eq!(
            "Etiqueta Paquetería".parse::<SupplyCategory>(),
            Ok(SupplyCategory::PackageLabel)
        );
        assert_eq!(
            "etiqueta paqueteria".parse::<SupplyCategory>(),
            Ok(SupplyCategory::PackageLabel)
        );
        assert_eq!(
            "FilmBottom".parse::<SupplyCategory>(),
            Ok(SupplyCategory::FilmBottom)
        );
        assert!("Cinta".parse::<SupplyCategory>().is_err());
    }

    #[test]
    fn test_slot_labels_round_trip_to_canonical() {
        let slot = CategorySlot::from_label("Etiqueta Caja 2").unwrap();
        assert_eq!(slot, CategorySlot::second(SupplyCategory::BoxLabel));
        assert_eq!(slot.label(), "Etiqueta Caja 2");

        let english = CategorySlot::from_label("BoxLabel2").unwrap();
        assert_eq!(english, slot);

        // 非标签类不存在副本槽位
        assert!(CategorySlot::from_label("Fleje 2").is_none());
    }

    #[test]
    fn test_count_units() {
        assert!(is_count_unit("BOLSAS"));
        assert!(is_count_unit("und"));
        assert!(is_count_unit("UNIT"));
        assert!(!is_count_unit("KG"));
    }
}
