// ==========================================
// 包装物料 BOM 系统 - 列值转换工具
// ==========================================

use rusqlite::types::Type;
use std::str::FromStr;

/// 文本列解析为枚举（失败映射为 FromSqlConversionFailure）
pub(crate) fn parse_text_column<T>(idx: usize, raw: String) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.parse::<T>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
