// ==========================================
// 包装物料 BOM 系统 - 消耗计算引擎
// ==========================================
// 职责: 类别分类 → 公式；选料默认值；开关自动填充；THERMOPACK 膜自动计算
// 输入: 物料类别 + 类别工作状态 + 产品上下文
// 输出: 每箱件数 / 每箱消耗 / 需求数量 + 字段可见性
// 红线: 纯函数，不访问数据层
// 红线: 任一非正数分量短路为 0，永不产生 NaN 或负数
// ==========================================

use crate::domain::bom::CategoryWorkingState;
use crate::domain::product::Product;
use crate::domain::supply::SupplyItem;
use crate::domain::types::{is_count_unit, PackageSize, SupplyCategory};
use serde::{Deserialize, Serialize};

// ==========================================
// 常量
// ==========================================

/// 打包带开关的固定每箱消耗
pub const STRAP_CONSUMPTION_PER_BOX: f64 = 0.00045;

/// 订书钉开关的固定每箱消耗
pub const STAPLE_CONSUMPTION_PER_BOX: f64 = 0.00294;

/// THERMOPACK 膜系数 (底膜, 上膜)，按每箱包数相乘
fn film_factors(size: PackageSize) -> Option<(f64, f64)> {
    match size {
        PackageSize::ThreeByOne => Some((0.000245, 0.000333)),
        PackageSize::TwoByOne => Some((0.000369, 0.000492)),
        PackageSize::TwoByTwo => Some((0.00025, 0.000327)),
        PackageSize::NotApplicable => None,
    }
}

// ==========================================
// FormulaKind - 公式分类（互斥）
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormulaKind {
    /// 小包标签: 件数 / 含量（件数取自每箱包数）
    PackageLabel,
    /// 箱标签: 消耗 / 含量（固定 1 件, 2 张）
    BoxLabel,
    /// 一次性: 瓦楞盖/底、外袋（固定 1 件, 1 个）
    SingleUse,
    /// 按件: (件数 × 每件消耗) / 含量
    PerPiece,
    /// 按箱: 消耗 / 含量
    PerBox,
}

impl FormulaKind {
    pub fn classify(category: SupplyCategory) -> Self {
        match category {
            SupplyCategory::PackageLabel => FormulaKind::PackageLabel,
            SupplyCategory::BoxLabel => FormulaKind::BoxLabel,
            SupplyCategory::CorrugatedTop
            | SupplyCategory::CorrugatedBottom
            | SupplyCategory::MasterBag => FormulaKind::SingleUse,
            SupplyCategory::FilmBottom
            | SupplyCategory::FilmTop
            | SupplyCategory::Strap
            | SupplyCategory::Staple
            | SupplyCategory::WaxPaper => FormulaKind::PerPiece,
            SupplyCategory::PrimaryPack
            | SupplyCategory::CakeDetailBox
            | SupplyCategory::CakeMasterBox => FormulaKind::PerBox,
        }
    }

    /// 选料时自动填充的固定值 (件数, 消耗)
    pub fn fixed_values(&self) -> Option<(f64, f64)> {
        match self {
            FormulaKind::BoxLabel => Some((1.0, 2.0)),
            FormulaKind::SingleUse => Some((1.0, 1.0)),
            _ => None,
        }
    }

    /// 是否标签类（组装校验跳过消耗检查）
    pub fn is_label(&self) -> bool {
        matches!(self, FormulaKind::PackageLabel | FormulaKind::BoxLabel)
    }

    /// 消耗字段是否按件理解
    pub fn consumption_is_per_piece(&self) -> bool {
        matches!(self, FormulaKind::PerPiece)
    }
}

// ==========================================
// 公式计算
// ==========================================

/// 按分类计算需求数量
///
/// # 参数
/// - kind: 公式分类
/// - pieces_per_box: 每箱件数
/// - consumption_per_box: 每箱（或每件）消耗
/// - content_per_unit: 物料每单位含量
///
/// # 返回
/// - 需求数量；任一必需分量非正（或非有限）时为 0
pub fn compute_quantity(
    kind: FormulaKind,
    pieces_per_box: f64,
    consumption_per_box: f64,
    content_per_unit: f64,
) -> f64 {
    let positive = |v: f64| v.is_finite() && v > 0.0;
    if !positive(content_per_unit) {
        return 0.0;
    }

    let numerator = match kind {
        FormulaKind::PackageLabel => {
            if !positive(pieces_per_box) {
                return 0.0;
            }
            pieces_per_box
        }
        FormulaKind::PerPiece => {
            if !positive(pieces_per_box) || !positive(consumption_per_box) {
                return 0.0;
            }
            pieces_per_box * consumption_per_box
        }
        FormulaKind::BoxLabel | FormulaKind::SingleUse | FormulaKind::PerBox => {
            if !positive(consumption_per_box) {
                return 0.0;
            }
            consumption_per_box
        }
    };

    numerator / content_per_unit
}

/// 工作状态当前应有的需求数量（未选料为 0）
pub fn quantity_for(category: SupplyCategory, state: &CategoryWorkingState) -> f64 {
    match &state.selected_item {
        Some(item) => compute_quantity(
            FormulaKind::classify(category),
            state.pieces_per_box,
            state.consumption_per_box,
            item.content_per_unit,
        ),
        None => 0.0,
    }
}

/// 重新派生需求数量，仅在数值变化时写入
///
/// # 返回
/// - true: 写入了新值
pub fn recompute(category: SupplyCategory, state: &mut CategoryWorkingState) -> bool {
    if state.selected_item.is_none() {
        return false;
    }
    let quantity = quantity_for(category, state);
    if quantity != state.quantity_required {
        state.quantity_required = quantity;
        true
    } else {
        false
    }
}

// ==========================================
// 选料默认值
// ==========================================

/// 选择目录物料后写入默认件数/消耗
///
/// - 小包标签: 件数 = 每箱包数，消耗 0
/// - 箱标签 / 一次性: 固定值
/// - 按箱: 件数 1（不参与公式，满足件数校验），消耗待录入
/// - 按件: 清零，等待录入
pub fn apply_selection(
    category: SupplyCategory,
    state: &mut CategoryWorkingState,
    item: SupplyItem,
    product: Option<&Product>,
) {
    let kind = FormulaKind::classify(category);
    let (pieces, consumption) = match kind {
        FormulaKind::PackageLabel => (product.map(|p| p.box_count).unwrap_or(0.0), 0.0),
        FormulaKind::PerBox => (1.0, 0.0),
        _ => kind.fixed_values().unwrap_or((0.0, 0.0)),
    };

    state.selected_item = Some(item);
    state.pieces_per_box = pieces;
    state.consumption_per_box = consumption;
    state.toggled = false;
    recompute(category, state);
}

// ==========================================
// 开关（打包带 / 订书钉）
// ==========================================

/// 开关类别的固定每箱消耗
pub fn toggle_consumption(category: SupplyCategory) -> Option<f64> {
    match category {
        SupplyCategory::Strap => Some(STRAP_CONSUMPTION_PER_BOX),
        SupplyCategory::Staple => Some(STAPLE_CONSUMPTION_PER_BOX),
        _ => None,
    }
}

/// 应用开关
///
/// # 参数
/// - first_item: 该类别的第一个目录物料
///
/// # 返回
/// - false: 类别不支持开关，或开启时目录中无该类别物料（状态不变）
pub fn apply_toggle(
    category: SupplyCategory,
    state: &mut CategoryWorkingState,
    enabled: bool,
    first_item: Option<&SupplyItem>,
) -> bool {
    let Some(consumption) = toggle_consumption(category) else {
        return false;
    };

    if !enabled {
        state.clear();
        return true;
    }

    let Some(item) = first_item else {
        return false;
    };

    state.selected_item = Some(item.clone());
    state.pieces_per_box = 1.0;
    state.consumption_per_box = consumption;
    state.toggled = true;
    recompute(category, state);
    true
}

// ==========================================
// THERMOPACK 膜自动计算
// ==========================================

/// 膜自动计算结果
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilmPlan {
    pub pieces_per_box: f64,
    pub bottom_consumption: f64,
    pub top_consumption: f64,
}

impl FilmPlan {
    /// 指定膜类别的消耗
    pub fn consumption_for(&self, category: SupplyCategory) -> Option<f64> {
        match category {
            SupplyCategory::FilmBottom => Some(self.bottom_consumption),
            SupplyCategory::FilmTop => Some(self.top_consumption),
            _ => None,
        }
    }
}

/// 按包装类型/规格/每箱包数计算膜消耗
///
/// # 返回
/// - None: 非 THERMOPACK 或未设置规格
pub fn thermopack_film_plan(product: &Product) -> Option<FilmPlan> {
    if !product.package_type.is_thermopack() {
        return None;
    }
    let (bottom, top) = film_factors(product.package_size)?;
    let n = product.box_count;
    Some(FilmPlan {
        pieces_per_box: n,
        bottom_consumption: n * bottom,
        top_consumption: n * top,
    })
}

/// 将膜计算写入对应类别状态（消耗 > 0 且目录中有该类别物料时）
///
/// # 返回
/// - true: 写入了状态
pub fn apply_film_plan(
    plan: &FilmPlan,
    category: SupplyCategory,
    state: &mut CategoryWorkingState,
    first_item: Option<&SupplyItem>,
) -> bool {
    let Some(consumption) = plan.consumption_for(category) else {
        return false;
    };
    let Some(item) = first_item else {
        return false;
    };
    if consumption <= 0.0 {
        return false;
    }

    state.selected_item = Some(item.clone());
    state.pieces_per_box = plan.pieces_per_box;
    state.consumption_per_box = consumption;
    state.toggled = false;
    recompute(category, state);
    true
}

// ==========================================
// 字段可见性
// ==========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldMode {
    Hidden,
    ReadOnly,
    Editable,
}

/// 消耗字段的含义
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConsumptionWording {
    PerPiece,
    PerBox,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldVisibility {
    /// 是否显示目录选择器
    pub picker: bool,
    /// 是否为开关类别
    pub toggle: bool,
    /// 是否自动计算（无需任何输入）
    pub auto_calculated: bool,
    /// 是否显示"固定值"提示
    pub fixed_notice: bool,
    pub pieces: FieldMode,
    pub consumption: FieldMode,
    pub wording: ConsumptionWording,
}

/// 类别在当前产品下的字段可见性
pub fn field_visibility(category: SupplyCategory, product: Option<&Product>) -> FieldVisibility {
    let kind = FormulaKind::classify(category);
    let wording = if kind.consumption_is_per_piece() {
        ConsumptionWording::PerPiece
    } else {
        ConsumptionWording::PerBox
    };
    let base = FieldVisibility {
        picker: true,
        toggle: false,
        auto_calculated: false,
        fixed_notice: false,
        pieces: FieldMode::Hidden,
        consumption: FieldMode::Hidden,
        wording,
    };

    if toggle_consumption(category).is_some() {
        return FieldVisibility {
            picker: false,
            toggle: true,
            ..base
        };
    }

    let film_auto = matches!(
        category,
        SupplyCategory::FilmTop | SupplyCategory::FilmBottom
    ) && product.map_or(false, |p| p.package_type.is_thermopack());
    if film_auto {
        return FieldVisibility {
            picker: false,
            auto_calculated: true,
            pieces: FieldMode::ReadOnly,
            consumption: FieldMode::ReadOnly,
            ..base
        };
    }

    match kind {
        FormulaKind::PackageLabel => FieldVisibility {
            pieces: FieldMode::ReadOnly,
            ..base
        },
        FormulaKind::BoxLabel | FormulaKind::SingleUse => FieldVisibility {
            fixed_notice: true,
            ..base
        },
        FormulaKind::PerPiece => FieldVisibility {
            pieces: FieldMode::Editable,
            consumption: FieldMode::Editable,
            ..base
        },
        FormulaKind::PerBox => FieldVisibility {
            consumption: FieldMode::Editable,
            ..base
        },
    }
}

// ==========================================
// 显示
// ==========================================

/// 需求数量显示：计数单位取整，其余 6 位小数
pub fn format_quantity(quantity: f64, unit_of_measure: &str) -> String {
    if is_count_unit(unit_of_measure) {
        format!("{}", quantity.round() as i64)
    } else {
        format!("{:.6}", quantity)
    }
}

/// 公式提示，例如 "= (50 × 0.01225) / 1"；未选料时为空串
pub fn formula_hint(category: SupplyCategory, state: &CategoryWorkingState) -> String {
    let Some(item) = &state.selected_item else {
        return String::new();
    };
    let content = item.content_per_unit;
    match FormulaKind::classify(category) {
        FormulaKind::PackageLabel => format!("= {} / {}", state.pieces_per_box, content),
        FormulaKind::PerPiece => format!(
            "= ({} × {}) / {}",
            state.pieces_per_box, state.consumption_per_box, content
        ),
        _ => format!("= {} / {}", state.consumption_per_box, content),
    }
}
