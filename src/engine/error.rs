// ==========================================
// 包装物料 BOM 系统 - 引擎层错误类型
// ==========================================
// 职责: 组装校验错误 + 编辑会话操作错误
// 红线: 输入不完整不是错误（需求数量为 0 即可）
// ==========================================

use crate::i18n::{t, t_with_args};
use thiserror::Error;

/// 组装校验错误（第一个失败即中止，报告类别名称）
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AssemblyError {
    #[error("SKU code is required")]
    SkuCodeRequired,

    #[error("SKU description is required")]
    SkuDescriptionRequired,

    #[error("must complete at least one supply category")]
    NothingToSave,

    #[error("supply code required in category {category}")]
    SupplyCodeRequired { category: String },

    #[error("description required in category {category}")]
    DescriptionRequired { category: String },

    #[error("consumption {} must be greater than 0 in category {category}", consumption_wording(.per_piece))]
    ConsumptionRequired { category: String, per_piece: bool },

    #[error("quantity of {} per box must be greater than 0 in category {category}", pieces_wording(.labels))]
    PiecesRequired { category: String, labels: bool },

    #[error("additional supply {id} has a selected item but no category")]
    AdditionalCategoryRequired { id: String },
}

fn consumption_wording(per_piece: &bool) -> &'static str {
    if *per_piece {
        "per piece"
    } else {
        "per box"
    }
}

fn pieces_wording(labels: &bool) -> &'static str {
    if *labels {
        "labels"
    } else {
        "pieces"
    }
}

impl AssemblyError {
    /// 出错的类别标签（顶层前置条件错误为 None）
    pub fn category(&self) -> Option<&str> {
        match self {
            AssemblyError::SupplyCodeRequired { category }
            | AssemblyError::DescriptionRequired { category }
            | AssemblyError::ConsumptionRequired { category, .. }
            | AssemblyError::PiecesRequired { category, .. } => Some(category),
            _ => None,
        }
    }

    /// 本地化提示（按当前 locale）
    pub fn localized(&self) -> String {
        match self {
            AssemblyError::SkuCodeRequired => t("assembly.sku_code_required"),
            AssemblyError::SkuDescriptionRequired => {
                t("assembly.sku_description_required")
            }
            AssemblyError::NothingToSave => t("assembly.nothing_to_save"),
            AssemblyError::SupplyCodeRequired { category } => {
                t_with_args("assembly.supply_code_required", &[("category", category.as_str())])
            }
            AssemblyError::DescriptionRequired { category } => {
                t_with_args("assembly.description_required", &[("category", category.as_str())])
            }
            AssemblyError::ConsumptionRequired {
                category,
                per_piece,
            } => {
                let key = if *per_piece {
                    "assembly.consumption_per_piece_required"
                } else {
                    "assembly.consumption_per_box_required"
                };
                t_with_args(key, &[("category", category.as_str())])
            }
            AssemblyError::PiecesRequired { category, labels } => {
                let key = if *labels {
                    "assembly.labels_required"
                } else {
                    "assembly.pieces_required"
                };
                t_with_args(key, &[("category", category.as_str())])
            }
            AssemblyError::AdditionalCategoryRequired { .. } => {
                t("assembly.additional_category_required")
            }
        }
    }
}

/// 编辑会话操作错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WorkingStateError {
    #[error("category slot is not visible for this product: {0}")]
    SlotNotVisible(String),

    #[error("supply code not found in catalog: {0}")]
    SupplyNotFound(String),

    #[error("supply {code} belongs to {actual}, not {expected}")]
    CategoryMismatch {
        code: String,
        expected: String,
        actual: String,
    },

    #[error("category {0} has no toggle")]
    NotToggleable(String),

    #[error("catalog has no item in category {0}")]
    EmptyCategory(String),

    #[error("additional supply not found: {0}")]
    AdditionalNotFound(String),

    #[error("additional supply {0} has no category selected")]
    AdditionalCategoryMissing(String),

    #[error("BOM line not found in edit session: {0}")]
    LineNotFound(String),
}

pub type WorkingStateResult<T> = Result<T, WorkingStateError>;
