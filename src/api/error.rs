// ==========================================
// 包装物料 BOM 系统 - API层错误类型
// ==========================================
// 职责: 汇总各层错误，转换为用户可读的错误消息
// 红线: 部分持久化必须报告已保存条数
// ==========================================

use crate::domain::product::ProductValidationError;
use crate::engine::error::{AssemblyError, WorkingStateError};
use crate::i18n::{t, t_with_args};
use crate::importer::error::ImportError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 录入与校验错误
    // ==========================================
    #[error("BOM 组装校验失败: {0}")]
    Assembly(#[from] AssemblyError),

    #[error("产品校验失败: {0}")]
    ProductValidation(#[from] ProductValidationError),

    #[error("编辑操作无效: {0}")]
    WorkingState(#[from] WorkingStateError),

    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("未登录")]
    Unauthenticated,

    // ==========================================
    // 持久化错误
    // ==========================================
    /// 顺序提交在第 failed_index 条失败；之前 saved 条已写入，不回滚
    #[error("部分保存: 已保存 {saved}/{total}，第 {failed_index} 条失败: {reason}")]
    PartialPersistence {
        saved: usize,
        total: usize,
        failed_index: usize,
        reason: String,
    },

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error(transparent)]
    Repository(RepositoryError),

    // ==========================================
    // 导入与配置错误
    // ==========================================
    #[error("物料目录导入失败: {0}")]
    Import(#[from] ImportError),

    #[error("配置读取失败: {0}")]
    Config(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::FieldValueError { field, message } => {
                ApiError::InvalidInput(format!("字段{}错误: {}", field, message))
            }
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
            other => ApiError::Repository(other),
        }
    }
}

impl ApiError {
    /// 部分持久化时已写入的条数（其他错误为 0）
    pub fn saved_count(&self) -> usize {
        match self {
            ApiError::PartialPersistence { saved, .. } => *saved,
            _ => 0,
        }
    }

    /// 本地化提示（按当前 locale）
    pub fn localized(&self) -> String {
        match self {
            ApiError::Assembly(err) => err.localized(),
            ApiError::Unauthenticated => t("session.login_required"),
            ApiError::PartialPersistence {
                saved,
                total,
                reason,
                ..
            } => {
                let saved = saved.to_string();
                let total = total.to_string();
                if saved == "0" {
                    t_with_args("persistence.failed", &[("reason", reason.as_str())])
                } else {
                    t_with_args(
                        "persistence.partial",
                        &[
                            ("saved", saved.as_str()),
                            ("total", total.as_str()),
                            ("reason", reason.as_str()),
                        ],
                    )
                }
            }
            other => other.to_string(),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_api_not_found() {
        let err: ApiError = RepositoryError::not_found("bom_record", "r-1").into();
        assert!(matches!(err, ApiError::NotFound(ref msg) if msg.contains("r-1")));
    }

    #[test]
    fn test_remote_error_kept_as_repository() {
        let err: ApiError = RepositoryError::Remote("timeout".to_string()).into();
        assert!(matches!(err, ApiError::Repository(RepositoryError::Remote(_))));
        assert_eq!(err.saved_count(), 0);
    }

    #[test]
    fn test_partial_persistence_reports_saved() {
        let err = ApiError::PartialPersistence {
            saved: 2,
            total: 5,
            failed_index: 3,
            reason: "timeout".to_string(),
        };
        assert_eq!(err.saved_count(), 2);
        assert!(err.to_string().contains("2/5"));
    }
}
