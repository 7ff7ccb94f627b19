// ==========================================
// 包装物料 BOM 系统 - 产品 (SKU) 领域模型
// ==========================================
// 职责: 产品实体、表单数据、局部更新、表单校验
// 红线: peso_promedio_por_paquete 只由 peso_por_caja / cantidad_paquetes_por_caja 派生
// ==========================================

use crate::domain::session::Session;
use crate::domain::types::{PackageSize, PackageType, WeightUnit};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ==========================================
// Product - 产品实体
// ==========================================
// 序列化字段名与远端表格列名一致
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    #[serde(rename = "codigo")]
    pub code: String,
    #[serde(rename = "nombre_producto")]
    pub name: String,
    #[serde(rename = "tipo_empaque")]
    pub package_type: PackageType,
    #[serde(rename = "size_empaque", default)]
    pub package_size: PackageSize,
    /// 每箱包数（散装为 0）
    #[serde(rename = "cantidad_paquetes_por_caja")]
    pub box_count: f64,
    #[serde(rename = "peso_por_caja")]
    pub weight_per_box: f64,
    #[serde(rename = "peso_promedio_por_paquete")]
    pub avg_weight_per_package: f64,
    #[serde(rename = "sala_origen")]
    pub origin_room: String,

    // ===== 审计字段 =====
    #[serde(rename = "createdBy")]
    pub created_by: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedBy", default, skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
    #[serde(rename = "updatedAt", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

// ==========================================
// ProductFormData - 新建产品数据（不含 id 与时间戳）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductFormData {
    #[serde(rename = "codigo")]
    pub code: String,
    #[serde(rename = "nombre_producto")]
    pub name: String,
    #[serde(rename = "tipo_empaque")]
    pub package_type: PackageType,
    #[serde(rename = "size_empaque")]
    pub package_size: PackageSize,
    #[serde(rename = "cantidad_paquetes_por_caja")]
    pub box_count: f64,
    #[serde(rename = "peso_por_caja")]
    pub weight_per_box: f64,
    #[serde(rename = "peso_promedio_por_paquete")]
    pub avg_weight_per_package: f64,
    #[serde(rename = "sala_origen")]
    pub origin_room: String,
    #[serde(rename = "createdBy")]
    pub created_by: String,
}

impl ProductFormData {
    /// 补齐 id 与创建时间，形成实体
    pub fn into_product(self, id: String, created_at: DateTime<Utc>) -> Product {
        Product {
            id,
            code: self.code,
            name: self.name,
            package_type: self.package_type,
            package_size: self.package_size,
            box_count: self.box_count,
            weight_per_box: self.weight_per_box,
            avg_weight_per_package: self.avg_weight_per_package,
            origin_room: self.origin_room,
            created_by: self.created_by,
            created_at,
            updated_by: None,
            updated_at: None,
        }
    }
}

// ==========================================
// ProductPatch - 产品局部更新
// ==========================================
// avg_weight_per_package 由 resolve_against 派生，调用方写入的值会被覆盖
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductPatch {
    #[serde(rename = "nombre_producto", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "tipo_empaque", skip_serializing_if = "Option::is_none")]
    pub package_type: Option<PackageType>,
    #[serde(rename = "size_empaque", skip_serializing_if = "Option::is_none")]
    pub package_size: Option<PackageSize>,
    #[serde(rename = "cantidad_paquetes_por_caja", skip_serializing_if = "Option::is_none")]
    pub box_count: Option<f64>,
    #[serde(rename = "peso_por_caja", skip_serializing_if = "Option::is_none")]
    pub weight_per_box: Option<f64>,
    #[serde(rename = "peso_promedio_por_paquete", skip_serializing_if = "Option::is_none")]
    pub avg_weight_per_package: Option<f64>,
    #[serde(rename = "sala_origen", skip_serializing_if = "Option::is_none")]
    pub origin_room: Option<String>,
    #[serde(rename = "updatedBy", skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
}

impl ProductPatch {
    /// 是否包含任何业务字段变更（不计审计字段）
    pub fn has_changes(&self) -> bool {
        self.name.is_some()
            || self.package_type.is_some()
            || self.package_size.is_some()
            || self.box_count.is_some()
            || self.weight_per_box.is_some()
            || self.origin_room.is_some()
    }

    /// 将局部更新应用到产品上，并重新派生平均包重
    pub fn apply_to(&self, product: &mut Product, updated_at: DateTime<Utc>) {
        if let Some(name) = &self.name {
            product.name = name.trim().to_uppercase();
        }
        if let Some(package_type) = self.package_type {
            product.package_type = package_type;
        }
        if let Some(package_size) = self.package_size {
            product.package_size = package_size;
        }
        if let Some(box_count) = self.box_count {
            product.box_count = box_count;
        }
        if let Some(weight) = self.weight_per_box {
            product.weight_per_box = weight;
        }
        if let Some(room) = &self.origin_room {
            product.origin_room = room.trim().to_string();
        }
        if product.package_type.is_bulk() {
            product.box_count = 0.0;
        }
        if !product.package_type.is_thermopack() {
            product.package_size = PackageSize::NotApplicable;
        }
        product.avg_weight_per_package =
            average_weight_per_package(product.weight_per_box, product.box_count);
        if self.updated_by.is_some() {
            product.updated_by = self.updated_by.clone();
        }
        product.updated_at = Some(updated_at);
    }

    /// 合并到当前产品并按登记规则校验，得到可下发的局部更新
    ///
    /// # 参数
    /// - current: 远端当前的产品
    ///
    /// # 返回
    /// - Ok(patch): 名称已规范化；类型变化时带上归一化后的规格与包数；
    ///   每箱重量、包数或类型变化时带上重新派生的平均包重
    /// - Err: 合并后的产品不满足登记规则
    pub fn resolve_against(&self, current: &Product) -> Result<ProductPatch, ProductValidationError> {
        let mut merged = current.clone();
        self.apply_to(&mut merged, Utc::now());
        validate_product(&merged)?;

        let type_changed = self.package_type.is_some();
        let mut outgoing = self.clone();
        outgoing.name = self.name.as_ref().map(|_| merged.name.clone());
        outgoing.origin_room = self.origin_room.as_ref().map(|_| merged.origin_room.clone());
        if type_changed || self.package_size.is_some() {
            outgoing.package_size = Some(merged.package_size);
        }
        if type_changed || self.box_count.is_some() {
            outgoing.box_count = Some(merged.box_count);
        }
        outgoing.avg_weight_per_package =
            if type_changed || self.box_count.is_some() || self.weight_per_box.is_some() {
                Some(merged.avg_weight_per_package)
            } else {
                None
            };
        Ok(outgoing)
    }
}

/// 校验已合并的产品（与新建表单同一套规则）
pub fn validate_product(product: &Product) -> Result<(), ProductValidationError> {
    if product.name.trim().is_empty() {
        return Err(ProductValidationError::NameRequired);
    }
    if !(product.weight_per_box > 0.0) || !product.weight_per_box.is_finite() {
        return Err(ProductValidationError::WeightPerBoxRequired);
    }
    if product.origin_room.trim().is_empty() {
        return Err(ProductValidationError::OriginRoomRequired);
    }
    if product.package_type.is_bulk() {
        return Ok(());
    }
    if !(product.box_count > 0.0) || !product.box_count.is_finite() {
        return Err(ProductValidationError::BoxCountRequired);
    }
    if !(product.avg_weight_per_package > 0.0) {
        return Err(ProductValidationError::AverageWeightRequired);
    }
    if product.package_type.is_thermopack() && !product.package_size.is_set() {
        return Err(ProductValidationError::PackageSizeRequired);
    }
    Ok(())
}

// ==========================================
// 派生规则
// ==========================================

/// 平均包重 = 每箱重量 / 每箱包数（任一非正则为 0）
pub fn average_weight_per_package(weight_per_box: f64, box_count: f64) -> f64 {
    if weight_per_box > 0.0 && box_count > 0.0 {
        weight_per_box / box_count
    } else {
        0.0
    }
}

/// 重量显示：两位小数 + 配置的单位符号
pub fn format_weight(value: f64, unit: WeightUnit) -> String {
    format!("{:.2} {}", value, unit.symbol())
}

/// SKU 编码格式化：只保留数字，最多 4 位，第 1 位后插入 "-"
///
/// # 示例
/// - "1193" → "1-193"
/// - "1" → "1"
/// - "a1b2" → "1-2"
pub fn format_sku_code(text: &str) -> String {
    let digits: String = text.chars().filter(|c| c.is_ascii_digit()).take(4).collect();
    match digits.len() {
        0 => String::new(),
        1 => digits,
        _ => format!("{}-{}", &digits[..1], &digits[1..]),
    }
}

/// 是否为完整的 D-DDD 编码
pub fn is_valid_sku_code(code: &str) -> bool {
    let bytes = code.as_bytes();
    bytes.len() == 5
        && bytes[1] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 1 || b.is_ascii_digit())
}

/// 宽松数字解析：取最长合法前缀，失败返回 0
///
/// 输入不完整不是错误，只会得到 0（由下游 "非正数短路" 处理）
pub fn parse_lenient_number(text: &str) -> f64 {
    let trimmed = text.trim().replace(',', ".");
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;

    for (idx, ch) in trimmed.char_indices() {
        match ch {
            '+' | '-' if idx == 0 => {}
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end = idx + ch.len_utf8();
    }

    if !seen_digit {
        return 0.0;
    }

    trimmed[..end]
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

// ==========================================
// ProductDraft - 产品表单原始输入
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct ProductDraft {
    pub code: String,
    pub name: String,
    pub box_count: String,
    pub weight_per_box: String,
    pub package_type: String,
    pub package_size: String,
    pub origin_room: String,
}

/// 产品表单校验错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProductValidationError {
    #[error("product code is required")]
    CodeRequired,

    #[error("product code must have the format D-DDD: {0}")]
    CodeFormat(String),

    #[error("product name is required")]
    NameRequired,

    #[error("weight per box must be greater than 0")]
    WeightPerBoxRequired,

    #[error("unknown package type: {0}")]
    UnknownPackageType(String),

    #[error("origin room is required")]
    OriginRoomRequired,

    #[error("packages per box must be greater than 0")]
    BoxCountRequired,

    #[error("average weight per package must be greater than 0")]
    AverageWeightRequired,

    #[error("package size is required for THERMOPACK")]
    PackageSizeRequired,
}

impl ProductDraft {
    /// 校验并转换为新建数据
    ///
    /// # 规则
    /// - 编码、名称、每箱重量 (> 0)、包装类型、来源车间必填
    /// - 非散装：每箱包数 > 0，平均包重 > 0；THERMOPACK 还需规格
    /// - 散装：包数/平均包重记 0，规格 N/A（免校验）
    pub fn validate(&self, session: &Session) -> Result<ProductFormData, ProductValidationError> {
        let code = self.code.trim();
        if code.is_empty() {
            return Err(ProductValidationError::CodeRequired);
        }
        let code = format_sku_code(code);
        if !is_valid_sku_code(&code) {
            return Err(ProductValidationError::CodeFormat(code));
        }

        let name = self.name.trim();
        if name.is_empty() {
            return Err(ProductValidationError::NameRequired);
        }

        let weight_per_box = parse_lenient_number(&self.weight_per_box);
        if weight_per_box <= 0.0 {
            return Err(ProductValidationError::WeightPerBoxRequired);
        }

        let package_type: PackageType = self
            .package_type
            .parse()
            .map_err(|_| ProductValidationError::UnknownPackageType(self.package_type.clone()))?;

        let origin_room = self.origin_room.trim();
        if origin_room.is_empty() {
            return Err(ProductValidationError::OriginRoomRequired);
        }

        let (box_count, avg_weight, package_size) = if package_type.is_bulk() {
            (0.0, 0.0, PackageSize::NotApplicable)
        } else {
            let box_count = parse_lenient_number(&self.box_count);
            if box_count <= 0.0 {
                return Err(ProductValidationError::BoxCountRequired);
            }
            let avg = average_weight_per_package(weight_per_box, box_count);
            if avg <= 0.0 {
                return Err(ProductValidationError::AverageWeightRequired);
            }
            let size = if package_type.is_thermopack() {
                let size = self
                    .package_size
                    .parse::<PackageSize>()
                    .unwrap_or(PackageSize::NotApplicable);
                if !size.is_set() {
                    return Err(ProductValidationError::PackageSizeRequired);
                }
                size
            } else {
                PackageSize::NotApplicable
            };
            (box_count, avg, size)
        };

        Ok(ProductFormData {
            code,
            name: name.to_uppercase(),
            package_type,
            package_size,
            box_count,
            weight_per_box,
            avg_weight_per_package: avg_weight,
            origin_room: origin_room.to_string(),
            created_by: session.user().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(package_type: &str) -> ProductDraft {
        ProductDraft {
            code: "1193".to_string(),
            name: " chorizo parrillero ".to_string(),
            box_count: "12".to_string(),
            weight_per_box: "6".to_string(),
            package_type: package_type.to_string(),
            package_size: "2X1".to_string(),
            origin_room: "SALA 2".to_string(),
        }
    }

    #[test]
    fn test_format_sku_code() {
        assert_eq!(format_sku_code(""), "");
        assert_eq!(format_sku_code("1"), "1");
        assert_eq!(format_sku_code("11"), "1-1");
        assert_eq!(format_sku_code("1193"), "1-193");
        assert_eq!(format_sku_code("11934"), "1-193");
        assert_eq!(format_sku_code("a1-1b93"), "1-193");
        assert!(is_valid_sku_code("1-193"));
        assert!(!is_valid_sku_code("1-19"));
        assert!(!is_valid_sku_code("11193"));
    }

    #[test]
    fn test_parse_lenient_number() {
        assert_eq!(parse_lenient_number("12"), 12.0);
        assert_eq!(parse_lenient_number(" 0.5 "), 0.5);
        assert_eq!(parse_lenient_number("0,25"), 0.25);
        assert_eq!(parse_lenient_number("12abc"), 12.0);
        assert_eq!(parse_lenient_number("abc"), 0.0);
        assert_eq!(parse_lenient_number(""), 0.0);
        assert_eq!(parse_lenient_number("."), 0.0);
        assert_eq!(parse_lenient_number("-3"), -3.0);
    }

    #[test]
    fn test_average_weight() {
        assert_eq!(average_weight_per_package(6.0, 12.0), 0.5);
        assert_eq!(average_weight_per_package(6.0, 0.0), 0.0);
        assert_eq!(average_weight_per_package(0.0, 12.0), 0.0);
    }

    #[test]
    fn test_format_weight_uses_unit_symbol() {
        assert_eq!(format_weight(12.0, WeightUnit::Kilogram), "12.00 kg");
        assert_eq!(format_weight(0.75, WeightUnit::Pound), "0.75 lb");
    }

    #[test]
    fn test_validate_regular_product() {
        let session = Session::login("ana").unwrap();
        let form = draft("LAYER PACK (LP)").validate(&session).unwrap();
        assert_eq!(form.code, "1-193");
        assert_eq!(form.name, "CHORIZO PARRILLERO");
        assert_eq!(form.box_count, 12.0);
        assert_eq!(form.avg_weight_per_package, 0.5);
        // 非 THERMOPACK 规格统一为 N/A
        assert_eq!(form.package_size, PackageSize::NotApplicable);
        assert_eq!(form.created_by, "ana");
    }

    #[test]
    fn test_validate_bulk_is_exempt_from_box_count() {
        let session = Session::anonymous();
        let mut d = draft("BULK PACK");
        d.box_count = String::new();
        let form = d.validate(&session).unwrap();
        assert_eq!(form.box_count, 0.0);
        assert_eq!(form.avg_weight_per_package, 0.0);
        assert_eq!(form.package_size, PackageSize::NotApplicable);
    }

    #[test]
    fn test_validate_requires_box_count_for_non_bulk() {
        let session = Session::anonymous();
        let mut d = draft("VACUUM PACK");
        d.box_count = "0".to_string();
        assert_eq!(
            d.validate(&session),
            Err(ProductValidationError::BoxCountRequired)
        );
    }

    #[test]
    fn test_validate_thermopack_requires_size() {
        let session = Session::anonymous();
        let mut d = draft("THERMOPACK");
        d.package_size = "N/A".to_string();
        assert_eq!(
            d.validate(&session),
            Err(ProductValidationError::PackageSizeRequired)
        );

        d.package_size = "3X1".to_string();
        let form = d.validate(&session).unwrap();
        assert_eq!(form.package_size, PackageSize::ThreeByOne);
    }

    #[test]
    fn test_patch_recomputes_average_weight() {
        let session = Session::anonymous();
        let form = draft("LAYER PACK (LP)").validate(&session).unwrap();
        let mut product = form.into_product("p1".to_string(), Utc::now());

        let patch = ProductPatch {
            box_count: Some(24.0),
            updated_by: Some("luis".to_string()),
            ..Default::default()
        };
        assert!(patch.has_changes());
        patch.apply_to(&mut product, Utc::now());

        assert_eq!(product.box_count, 24.0);
        assert_eq!(product.avg_weight_per_package, 0.25);
        assert_eq!(product.updated_by.as_deref(), Some("luis"));
        assert!(product.updated_at.is_some());
    }

    fn thermopack_product() -> Product {
        let session = Session::anonymous();
        draft("THERMOPACK")
            .validate(&session)
            .unwrap()
            .into_product("p1".to_string(), Utc::now())
    }

    #[test]
    fn test_resolve_carries_derived_average() {
        let product = thermopack_product();
        let patch = ProductPatch {
            box_count: Some(20.0),
            avg_weight_per_package: Some(99.0),
            ..Default::default()
        };
        let outgoing = patch.resolve_against(&product).unwrap();
        assert_eq!(outgoing.avg_weight_per_package, Some(6.0 / 20.0));

        let json = serde_json::to_string(&outgoing).unwrap();
        assert!(json.contains("\"peso_promedio_por_paquete\":0.3"));

        // 不涉及重量/包数的更新不带平均包重
        let rename = ProductPatch {
            name: Some(" chorizo ".to_string()),
            ..Default::default()
        };
        let outgoing = rename.resolve_against(&product).unwrap();
        assert_eq!(outgoing.name.as_deref(), Some("CHORIZO"));
        assert!(outgoing.avg_weight_per_package.is_none());
    }

    #[test]
    fn test_type_change_resets_size_to_not_applicable() {
        let mut product = thermopack_product();
        assert_eq!(product.package_size, PackageSize::TwoByOne);

        let patch = ProductPatch {
            package_type: Some(PackageType::VacuumPack),
            ..Default::default()
        };
        let outgoing = patch.resolve_against(&product).unwrap();
        assert_eq!(outgoing.package_size, Some(PackageSize::NotApplicable));

        patch.apply_to(&mut product, Utc::now());
        assert_eq!(product.package_size, PackageSize::NotApplicable);
    }

    #[test]
    fn test_resolve_rejects_rule_violations() {
        let session = Session::anonymous();
        let layer = draft("LAYER PACK (LP)")
            .validate(&session)
            .unwrap()
            .into_product("p2".to_string(), Utc::now());

        let to_thermopack = ProductPatch {
            package_type: Some(PackageType::Thermopack),
            ..Default::default()
        };
        assert_eq!(
            to_thermopack.resolve_against(&layer),
            Err(ProductValidationError::PackageSizeRequired)
        );

        let zero_boxes = ProductPatch {
            box_count: Some(0.0),
            ..Default::default()
        };
        assert_eq!(
            zero_boxes.resolve_against(&layer),
            Err(ProductValidationError::BoxCountRequired)
        );

        // 散装免校验包数，包数与平均包重归零
        let to_bulk = ProductPatch {
            package_type: Some(PackageType::BulkPack),
            ..Default::default()
        };
        let outgoing = to_bulk.resolve_against(&layer).unwrap();
        assert_eq!(outgoing.box_count, Some(0.0));
        assert_eq!(outgoing.avg_weight_per_package, Some(0.0));
    }
}
