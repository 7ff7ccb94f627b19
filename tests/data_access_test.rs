// ==========================================
// 数据访问集成测试
// ==========================================
// 测试范围:
// 1. SqliteDataAccess: 产品/BOM 记录 CRUD，未找到错误
// 2. CachedDataAccess: 远端成功刷新缓存、远端失败回退缓存、
//    写入同步缓存、删除容忍远端未找到
// ==========================================


use std::sync::Arc;

use packaging_bom::domain::bom::BomPatch;
use packaging_bom::domain::product::ProductPatch;
use packaging_bom::domain::types::{PackageType, SupplyCategory};
use packaging_bom::repository::{
    BomDataAccess, CachedDataAccess, RepositoryError, SqliteDataAccess,
};
use test_helpers::{bom_form, create_test_db, product_form, MemoryDataAccess};

// ==========================================
// SqliteDataAccess
// ==========================================

#[tokio::test]
async fn test_sqlite_产品增改删() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let store = SqliteDataAccess::new(&db_path).unwrap();

    let created = store
        .add_product(product_form("1-193", PackageType::LayerPack, 12.0))
        .await
        .unwrap();
    assert!(!created.id.is_empty());
    assert_eq!(created.avg_weight_per_package, 10.0 / 12.0);

    let updated = store
        .update_product(
            &created.id,
            ProductPatch {
                weight_per_box: Some(6.0),
                updated_by: Some("ana".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.avg_weight_per_package, 0.5);
    assert_eq!(updated.updated_by.as_deref(), Some("ana"));
    assert!(updated.updated_at.is_some());

    let listed = store.get_products().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].weight_per_box, 6.0);
    assert_eq!(listed[0].package_type, PackageType::LayerPack);

    store.delete_product(&created.id).await.unwrap();
    assert!(store.get_products().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_sqlite_bom记录增改删() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let store = SqliteDataAccess::new(&db_path).unwrap();

    let record = store
        .add_bom_record(bom_form("1-193", SupplyCategory::BoxLabel, "INS-0401"))
        .await
        .unwrap();
    assert_eq!(record.category, SupplyCategory::BoxLabel);

    let updated = store
        .update_bom_record(
            &record.id,
            BomPatch {
                consumption_per_box: Some(2.0),
                quantity_required: Some(0.004),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.consumption_per_box, 2.0);
    assert_eq!(updated.quantity_required, 0.004);

    let by_sku = store.records().list_by_sku("1-193").unwrap();
    assert_eq!(by_sku.len(), 1);

    store.delete_bom_record(&record.id).await.unwrap();
    assert!(store.get_bom_records().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_sqlite_更新不存在的记录_返回未找到() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let store = SqliteDataAccess::new(&db_path).unwrap();

    let err = store
        .update_bom_record("missing", BomPatch::default())
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    let err = store.delete_product("missing").await.unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound { .. }));
}

// ==========================================
// CachedDataAccess
// ==========================================

fn cached(db_path: &str) -> CachedDataAccess<MemoryDataAccess> {
    let cache = Arc::new(SqliteDataAccess::new(db_path).unwrap());
    CachedDataAccess::new(MemoryDataAccess::new(), cache)
}

#[tokio::test]
async fn test_cached_远端失败_回退到缓存() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let access = cached(&db_path);

    access
        .add_bom_record(bom_form("1-193", SupplyCategory::Strap, "INS-1001"))
        .await
        .unwrap();
    access
        .add_product(product_form("1-193", PackageType::BulkPack, 0.0))
        .await
        .unwrap();

    // 写入已同步到缓存
    assert_eq!(access.cache().records().list_all().unwrap().len(), 1);

    access.remote().set_offline(true);
    let records = access.get_bom_records().await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].supply_code, "INS-1001");
    assert_eq!(access.get_products().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_cached_远端写入失败_不写缓存() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let access = cached(&db_path);
    access.remote().set_offline(true);

    let err = access
        .add_bom_record(bom_form("1-193", SupplyCategory::Strap, "INS-1001"))
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Remote(_)));
    assert!(access.cache().records().list_all().unwrap().is_empty());
}

#[tokio::test]
async fn test_cached_远端读取成功_刷新缓存() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let access = cached(&db_path);

    // 缓存里有一条远端已不存在的旧记录
    let stale = bom_form("9-999", SupplyCategory::Staple, "INS-1101")
        .into_line_item("stale-1".to_string(), chrono::Utc::now());
    access.cache().records().upsert(&stale).unwrap();

    access
        .remote()
        .add_bom_record(bom_form("1-193", SupplyCategory::Strap, "INS-1001"))
        .await
        .unwrap();

    let records = access.get_bom_records().await.unwrap();
    assert_eq!(records.len(), 1);
    let cached = access.cache().records().list_all().unwrap();
    assert_eq!(cached.len(), 1);
    assert_eq!(cached[0].sku_code, "1-193");
}

#[tokio::test]
async fn test_cached_删除_容忍远端未找到() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let access = cached(&db_path);

    let local_only = bom_form("1-193", SupplyCategory::Strap, "INS-1001")
        .into_line_item("local-1".to_string(), chrono::Utc::now());
    access.cache().records().upsert(&local_only).unwrap();

    access.delete_bom_record("local-1").await.unwrap();
    assert!(access.cache().records().list_all().unwrap().is_empty());
}
