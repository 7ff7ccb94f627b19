// ==========================================
// 包装物料 BOM 系统 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件格式不支持: {0}（仅支持 .xlsx/.xls/.csv）")]
    UnsupportedFormat(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("Excel 解析失败: {0}")]
    ExcelParseError(String),

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    // ===== 表头 / 行错误 =====
    #[error("缺少必需列: {0}")]
    MissingColumn(String),

    #[error("必填字段为空 (行 {row}, 字段 {field})")]
    EmptyField { row: usize, field: String },

    #[error("无法识别的物料类别 (行 {row}): {value}")]
    UnknownCategory { row: usize, value: String },

    #[error("类型转换失败 (行 {row}, 字段 {field}): {message}")]
    TypeConversionError {
        row: usize,
        field: String,
        message: String,
    },

    #[error("每单位含量必须大于 0 (行 {row}): {value}")]
    NonPositiveContent { row: usize, value: f64 },

    #[error("物料编码重复 (行 {row}): {code} 已在行 {first_row} 出现")]
    DuplicateCode {
        row: usize,
        code: String,
        first_row: usize,
    },

    // ===== 通用错误 =====
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ImportError {
    /// 行级错误的行号（文件级错误为 None）
    pub fn row(&self) -> Option<usize> {
        match self {
            ImportError::EmptyField { row, .. }
            | ImportError::UnknownCategory { row, .. }
            | ImportError::TypeConversionError { row, .. }
            | ImportError::NonPositiveContent { row, .. }
            | ImportError::DuplicateCode { row, .. } => Some(*row),
            _ => None,
        }
    }
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

// 实现 From<calamine::Error>
impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
