// ==========================================
// 包装物料 BOM 系统 - 物料目录导入器
// ==========================================
// 职责: CSV/Excel → SupplyCatalog（字段映射 + 行校验 + 编码去重）
// 红线: 无效行不进入目录，错误带行号返回
// ==========================================

use crate::catalog::SupplyCatalog;
use crate::domain::supply::SupplyItem;
use crate::domain::types::SupplyCategory;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::{FileParser, RawRow, UniversalFileParser};
use std::collections::HashMap;
use std::path::Path;
use tracing::instrument;

// 标准字段（西语表头）及其别名
const FIELD_CODE: &str = "codigo";
const FIELD_DESCRIPTION: &str = "descripcion";
const FIELD_CATEGORY: &str = "categoria";
const FIELD_UNIT: &str = "unidad_medida";
const FIELD_CONTENT: &str = "contenido_por_unidad";

fn aliases(field: &str) -> &'static [&'static str] {
    match field {
        FIELD_CODE => &["codigo", "código", "code", "supply_code"],
        FIELD_DESCRIPTION => &["descripcion", "descripción", "description"],
        FIELD_CATEGORY => &["categoria", "categoría", "category"],
        FIELD_UNIT => &["unidad_medida", "unidad", "unit_of_measure", "unit"],
        FIELD_CONTENT => &["contenido_por_unidad", "contenido", "content_per_unit"],
        _ => &[],
    }
}

/// 导入结果
#[derive(Debug, Default)]
pub struct CatalogImportReport {
    pub items: Vec<SupplyItem>,
    /// 被拒绝的行（带行号）
    pub rejected: Vec<ImportError>,
    pub rows_read: usize,
}

impl CatalogImportReport {
    pub fn into_catalog(self) -> SupplyCatalog {
        SupplyCatalog::new(self.items)
    }

    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

// ==========================================
// CatalogImporter - 物料目录导入器
// ==========================================
pub struct CatalogImporter<P: FileParser = UniversalFileParser> {
    parser: P,
}

impl CatalogImporter<UniversalFileParser> {
    pub fn new() -> Self {
        Self {
            parser: UniversalFileParser,
        }
    }
}

impl Default for CatalogImporter<UniversalFileParser> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: FileParser> CatalogImporter<P> {
    pub fn with_parser(parser: P) -> Self {
        Self { parser }
    }

    /// 从文件导入目录
    ///
    /// # 返回
    /// - Ok(report): 有效条目 + 被拒绝的行
    /// - Err: 文件级错误（不存在、格式、缺少必需列）
    #[instrument(skip_all, fields(path = %file_path.as_ref().display()))]
    pub fn import_file<Q: AsRef<Path>>(&self, file_path: Q) -> ImportResult<CatalogImportReport> {
        let rows = self.parser.parse_to_raw_records(file_path.as_ref())?;
        let report = self.import_rows(rows)?;
        tracing::info!(
            rows = report.rows_read,
            imported = report.items.len(),
            rejected = report.rejected.len(),
            "物料目录导入完成"
        );
        Ok(report)
    }

    /// 从已解析的行导入（行号以表头为第 1 行）
    pub fn import_rows(&self, rows: Vec<(usize, RawRow)>) -> ImportResult<CatalogImportReport> {
        if let Some((_, first)) = rows.first() {
            for field in [FIELD_CODE, FIELD_DESCRIPTION, FIELD_CATEGORY, FIELD_CONTENT] {
                if lookup(first, field).is_none() {
                    return Err(ImportError::MissingColumn(field.to_string()));
                }
            }
        }

        let mut report = CatalogImportReport {
            rows_read: rows.len(),
            ..Default::default()
        };
        let mut seen: HashMap<String, usize> = HashMap::new();

        for (row_number, row) in rows {
            match map_row(&row, row_number) {
                Ok(item) => {
                    if let Some(&first_row) = seen.get(&item.code) {
                        report.rejected.push(ImportError::DuplicateCode {
                            row: row_number,
                            code: item.code,
                            first_row,
                        });
                        continue;
                    }
                    seen.insert(item.code.clone(), row_number);
                    report.items.push(item);
                }
                Err(err) => {
                    tracing::warn!(row = row_number, error = %err, "目录行被拒绝");
                    report.rejected.push(err);
                }
            }
        }

        Ok(report)
    }
}

/// 按别名取字段值（表头大小写不敏感）
fn lookup<'a>(row: &'a RawRow, field: &str) -> Option<&'a str> {
    aliases(field).iter().find_map(|alias| {
        row.iter()
            .find(|(k, _)| k.trim().to_lowercase() == *alias)
            .map(|(_, v)| v.as_str())
    })
}

fn required<'a>(row: &'a RawRow, field: &str, row_number: usize) -> ImportResult<&'a str> {
    match lookup(row, field).map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ImportError::EmptyField {
            row: row_number,
            field: field.to_string(),
        }),
    }
}

fn map_row(row: &RawRow, row_number: usize) -> ImportResult<SupplyItem> {
    let code = required(row, FIELD_CODE, row_number)?;
    let description = required(row, FIELD_DESCRIPTION, row_number)?;
    let category_raw = required(row, FIELD_CATEGORY, row_number)?;
    let unit = lookup(row, FIELD_UNIT).unwrap_or("").trim();
    let content_raw = required(row, FIELD_CONTENT, row_number)?;

    let category: SupplyCategory =
        category_raw
            .parse()
            .map_err(|_| ImportError::UnknownCategory {
                row: row_number,
                value: category_raw.to_string(),
            })?;

    let content: f64 = content_raw
        .replace(',', ".")
        .parse()
        .map_err(|e: std::num::ParseFloatError| ImportError::TypeConversionError {
            row: row_number,
            field: FIELD_CONTENT.to_string(),
            message: e.to_string(),
        })?;

    SupplyItem::new(code, description, category, unit, content).ok_or(
        ImportError::NonPositiveContent {
            row: row_number,
            value: content,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_import_rows_with_english_headers() {
        let rows = vec![(
            2,
            row(&[
                ("Code", "A-1"),
                ("Description", "FLEJE NEGRO"),
                ("Category", "Strap"),
                ("Unit", "KG"),
                ("Content_Per_Unit", "1"),
            ]),
        )];
        let report = CatalogImporter::new().import_rows(rows).unwrap();
        assert!(report.is_clean());
        assert_eq!(report.items[0].category, SupplyCategory::Strap);
    }

    #[test]
    fn test_rejects_bad_rows_with_row_numbers() {
        let header = |code: &str, cat: &str, content: &str| {
            row(&[
                ("codigo", code),
                ("descripcion", "X"),
                ("categoria", cat),
                ("unidad_medida", "UND"),
                ("contenido_por_unidad", content),
            ])
        };
        let rows = vec![
            (2, header("A", "Fleje", "1")),
            (3, header("B", "Cinta", "1")),
            (4, header("C", "Grapa", "0")),
            (5, header("D", "Grapa", "abc")),
            (6, header("A", "Fleje", "2")),
        ];
        let report = CatalogImporter::new().import_rows(rows).unwrap();
        assert_eq!(report.items.len(), 1);
        let rows: Vec<_> = report.rejected.iter().filter_map(|e| e.row()).collect();
        assert_eq!(rows, vec![3, 4, 5, 6]);
        assert!(matches!(
            report.rejected[3],
            ImportError::DuplicateCode { first_row: 2, .. }
        ));
    }

    #[test]
    fn test_missing_column_is_file_level_error() {
        let rows = vec![(2, row(&[("codigo", "A"), ("descripcion", "X")]))];
        let err = CatalogImporter::new().import_rows(rows).unwrap_err();
        assert!(matches!(err, ImportError::MissingColumn(_)));
    }
}
