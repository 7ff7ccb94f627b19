// ==========================================
// 包装物料 BOM 系统 - 内置物料目录
// ==========================================
// 职责: 无外部目录文件时使用的基础目录
// 说明: 生产目录通过 importer::CatalogImporter 从 CSV/Excel 导入
// ==========================================

use crate::domain::types::SupplyCategory;

/// (编码, 描述, 类别, 计量单位, 每单位含量)
pub(crate) const BUILTIN_ITEMS: &[(&str, &str, SupplyCategory, &str, f64)] = &[
    ("INS-0101", "BOLSA MASTER PEAD 24X36", SupplyCategory::MasterBag, "UND", 1.0),
    ("INS-0102", "BOLSA MASTER PEBD 30X40", SupplyCategory::MasterBag, "UND", 1.0),
    ("INS-0201", "FUNDA EMPAQUE PRIMARIO 10X14", SupplyCategory::PrimaryPack, "BOLSAS", 1000.0),
    ("INS-0202", "BANDEJA EMPAQUE PRIMARIO 2S", SupplyCategory::PrimaryPack, "UND", 500.0),
    ("INS-0301", "ETIQUETA PAQUETERIA TERMICA 4X3", SupplyCategory::PackageLabel, "UND", 1000.0),
    ("INS-0302", "ETIQUETA PAQUETERIA NUTRICIONAL 2X3", SupplyCategory::PackageLabel, "UND", 2000.0),
    ("INS-0401", "ETIQUETA CAJA TERMICA 4X6", SupplyCategory::BoxLabel, "UND", 500.0),
    ("INS-0402", "ETIQUETA CAJA EXPORTACION 4X4", SupplyCategory::BoxLabel, "UND", 1000.0),
    ("INS-0501", "CAJA DETALLE TORTAS 6U", SupplyCategory::CakeDetailBox, "UND", 1.0),
    ("INS-0601", "CAJA MASTER TORTAS 48U", SupplyCategory::CakeMasterBox, "UND", 1.0),
    ("INS-0701", "PAPEL ENCERADO 12X12", SupplyCategory::WaxPaper, "KG", 1.0),
    ("INS-0801", "TAPA CARTON CORRUGADO 60X40", SupplyCategory::CorrugatedTop, "UND", 1.0),
    ("INS-0901", "FONDO CARTON CORRUGADO 60X40", SupplyCategory::CorrugatedBottom, "UND", 1.0),
    ("INS-1001", "FLEJE POLIPROPILENO 1/2", SupplyCategory::Strap, "KG", 1.0),
    ("INS-1101", "GRAPA GALVANIZADA 3/4", SupplyCategory::Staple, "KG", 1.0),
    ("INS-1201", "FILM FONDO TERMOFORMADO 420MM", SupplyCategory::FilmBottom, "KG", 1.0),
    ("INS-1301", "FILM TAPA TERMOFORMADO 400MM", SupplyCategory::FilmTop, "KG", 1.0),
];
