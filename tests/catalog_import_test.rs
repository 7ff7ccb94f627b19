// ==========================================
// 物料目录导入集成测试
// ==========================================
// 测试范围:
// 1. CSV 导入 → 目录（别名表头、行号、拒绝原因）
// 2. 以导入目录启动 AppState 并在录入会话中使用
// ==========================================


use std::io::Write;
use std::path::Path;

use packaging_bom::app::AppState;
use packaging_bom::domain::types::{CategorySlot, PackageSize, PackageType, SupplyCategory};
use packaging_bom::importer::{CatalogImporter, ImportError};
use tempfile::NamedTempFile;
use test_helpers::{create_test_db, product};

fn write_csv(content: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

const CATALOG_CSV: &str = "\
codigo,descripcion,categoria,unidad_medida,contenido_por_unidad
FL-01,FLEJE NEGRO,Fleje,KG,1
EC-01,ETIQUETA CAJA 4X6,Etiqueta Caja,UND,500
EC-01,ETIQUETA CAJA REPETIDA,Etiqueta Caja,UND,500
XX-01,DESCONOCIDO,Cinta Adhesiva,UND,1
FB-01,FILM FONDO 420,FilmBottom,KG,0
";

#[test]
fn test_csv导入_有效行进入目录_无效行带行号() {
    let file = write_csv(CATALOG_CSV);
    let report = CatalogImporter::new().import_file(file.path()).unwrap();

    assert_eq!(report.rows_read, 5);
    assert_eq!(report.items.len(), 2);
    assert_eq!(report.rejected.len(), 3);
    assert!(!report.is_clean());

    assert!(report.rejected.iter().any(|e| matches!(
        e,
        ImportError::DuplicateCode { row: 4, first_row: 3, .. }
    )));
    assert!(report
        .rejected
        .iter()
        .any(|e| matches!(e, ImportError::UnknownCategory { row: 5, .. })));
    assert!(report
        .rejected
        .iter()
        .any(|e| matches!(e, ImportError::NonPositiveContent { row: 6, .. })));

    let catalog = report.into_catalog();
    assert_eq!(
        catalog.find_by_code("FL-01").unwrap().category,
        SupplyCategory::Strap
    );
}

#[test]
fn test_英文表头别名() {
    let file = write_csv("code,description,category,unit,content_per_unit\nW-1,WAX,WaxPaper,KG,2\n");
    let report = CatalogImporter::new().import_file(file.path()).unwrap();
    assert!(report.is_clean());
    assert_eq!(report.items[0].content_per_unit, 2.0);
}

#[test]
fn test_缺少必需列_整个文件失败() {
    let file = write_csv("codigo,descripcion\nFL-01,FLEJE\n");
    let err = CatalogImporter::new().import_file(file.path()).unwrap_err();
    assert!(matches!(err, ImportError::MissingColumn(_)));
}

#[test]
fn test_不支持的文件格式() {
    let file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
    let err = CatalogImporter::new().import_file(file.path()).unwrap_err();
    assert!(matches!(err, ImportError::UnsupportedFormat(_)));
}

#[test]
fn test_导入目录驱动录入会话() {
    let (_db, db_path) = create_test_db().unwrap();
    let file = write_csv(CATALOG_CSV);
    let state = AppState::with_catalog_file(db_path, Path::new(file.path())).unwrap();
    assert_eq!(state.catalog.len(), 2);

    let mut session = state.bom_api.new_entry_session();
    session.select_product(product(PackageType::LayerPack, PackageSize::NotApplicable, 10.0));

    // 开关取目录中该类别的第一个物料
    session.set_toggle(SupplyCategory::Strap, true).unwrap();
    let strap = session
        .state(CategorySlot::primary(SupplyCategory::Strap))
        .unwrap();
    assert_eq!(strap.supply_code(), "FL-01");

    let label = CategorySlot::primary(SupplyCategory::BoxLabel);
    session.select_supply(label, "EC-01").unwrap();
    assert_eq!(session.state(label).unwrap().quantity_required, 2.0 / 500.0);

    // 内置目录的编码在导入目录中不存在
    assert!(session
        .select_supply(CategorySlot::primary(SupplyCategory::MasterBag), "INS-0101")
        .is_err());
}
