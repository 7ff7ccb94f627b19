// ==========================================
// 包装物料 BOM 系统 - 文件解析器
// ==========================================
// 支持: Excel (.xlsx/.xls) / CSV (.csv)
// 输出: 行记录 HashMap<列名, 值>（表头取第一行）
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use calamine::{open_workbook_auto, Reader};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

/// 解析后的行记录
pub type RawRow = HashMap<String, String>;

/// 文件解析器接口
pub trait FileParser: Send + Sync {
    /// 解析文件为原始行记录（跳过完全空白的行）
    ///
    /// # 返回
    /// - Ok(Vec<(行号, 行记录)>): 行号以表头为第 1 行
    /// - Err: 文件不存在、格式不支持、解析失败
    fn parse_to_raw_records(&self, file_path: &Path) -> ImportResult<Vec<(usize, RawRow)>>;
}

fn ensure_exists(path: &Path) -> ImportResult<()> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }
    Ok(())
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl FileParser for CsvParser {
    fn parse_to_raw_records(&self, file_path: &Path) -> ImportResult<Vec<(usize, RawRow)>> {
        ensure_exists(file_path)?;
        let ext = extension(file_path);
        if ext != "csv" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let file = File::open(file_path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(file);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().trim_start_matches('\u{feff}').to_string())
            .collect();

        let mut records = Vec::new();
        for (idx, result) in reader.records().enumerate() {
            let record = result?;
            let row: RawRow = headers
                .iter()
                .cloned()
                .zip(record.iter().map(|v| v.trim().to_string()))
                .collect();

            if row.values().all(|v| v.is_empty()) {
                continue;
            }
            records.push((idx + 2, row));
        }

        Ok(records)
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser;

impl FileParser for ExcelParser {
    fn parse_to_raw_records(&self, file_path: &Path) -> ImportResult<Vec<(usize, RawRow)>> {
        ensure_exists(file_path)?;
        let ext = extension(file_path);
        if ext != "xlsx" && ext != "xls" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let mut workbook = open_workbook_auto(file_path)?;

        // 读取第一个 sheet
        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无工作表".to_string()))?;
        let range = workbook.worksheet_range(&sheet_name)?;

        let mut rows = range.rows();
        let header_row = rows
            .next()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无数据行".to_string()))?;
        let headers: Vec<String> = header_row
            .iter()
            .map(|cell| cell.to_string().trim().to_string())
            .collect();

        let mut records = Vec::new();
        for (idx, data_row) in rows.enumerate() {
            let row: RawRow = headers
                .iter()
                .cloned()
                .zip(data_row.iter().map(|cell| cell.to_string().trim().to_string()))
                .collect();

            if row.values().all(|v| v.is_empty()) {
                continue;
            }
            records.push((idx + 2, row));
        }

        Ok(records)
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl FileParser for UniversalFileParser {
    fn parse_to_raw_records(&self, file_path: &Path) -> ImportResult<Vec<(usize, RawRow)>> {
        match extension(file_path).as_str() {
            "csv" => CsvParser.parse_to_raw_records(file_path),
            "xlsx" | "xls" => ExcelParser.parse_to_raw_records(file_path),
            other => Err(ImportError::UnsupportedFormat(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    fn csv_file(lines: &[&str]) -> tempfile::NamedTempFile {
        let mut file = Builder::new().suffix(".csv").tempfile().unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        file
    }

    #[test]
    fn test_csv_parser_valid_file() {
        let file = csv_file(&["codigo,descripcion", "INS-1,FLEJE", "INS-2,GRAPA"]);
        let records = CsvParser.parse_to_raw_records(file.path()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].0, 2);
        assert_eq!(records[0].1.get("codigo"), Some(&"INS-1".to_string()));
        assert_eq!(records[1].1.get("descripcion"), Some(&"GRAPA".to_string()));
    }

    #[test]
    fn test_csv_parser_file_not_found() {
        let result = CsvParser.parse_to_raw_records(Path::new("non_existent.csv"));
        assert!(matches!(result, Err(ImportError::FileNotFound(_))));
    }

    #[test]
    fn test_csv_parser_skip_empty_rows_keeps_row_numbers() {
        let file = csv_file(&["codigo,descripcion", "INS-1,FLEJE", ",", "INS-2,GRAPA"]);
        let records = CsvParser.parse_to_raw_records(file.path()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[1].0, 4);
    }

    #[test]
    fn test_universal_rejects_unknown_extension() {
        let file = Builder::new().suffix(".txt").tempfile().unwrap();
        let result = UniversalFileParser.parse_to_raw_records(file.path());
        assert!(matches!(result, Err(ImportError::UnsupportedFormat(_))));
    }
}
