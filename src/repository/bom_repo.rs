// ==========================================
// 包装物料 BOM 系统 - BOM 记录仓储
// ==========================================
// 职责: 管理 bom_record 表的 CRUD 操作
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::bom::BomLineItem;
use crate::repository::columns::parse_text_column;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex};

const SELECT_COLUMNS: &str = r#"
    id, codigo_sku, descripcion_sku, categoria_insumo, codigo_insumo, descripcion_insumo,
    cantidad_piezas_por_caja, consumo_por_caja, cantidad_requerida, unidad_medida,
    created_by, created_at, updated_by, updated_at
"#;

// ==========================================
// BomRecordRepository - BOM 记录仓储
// ==========================================
pub struct BomRecordRepository {
    conn: Arc<Mutex<Connection>>,
}

impl BomRecordRepository {
    /// 创建新的 BomRecordRepository 实例
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = crate::db::open_and_init(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<BomLineItem> {
        Ok(BomLineItem {
            id: row.get(0)?,
            sku_code: row.get(1)?,
            sku_description: row.get(2)?,
            category: parse_text_column(3, row.get(3)?)?,
            supply_code: row.get(4)?,
            supply_description: row.get(5)?,
            pieces_per_box: row.get(6)?,
            consumption_per_box: row.get(7)?,
            quantity_required: row.get(8)?,
            unit_of_measure: row.get(9)?,
            created_by: row.get(10)?,
            created_at: row.get(11)?,
            updated_by: row.get(12)?,
            updated_at: row.get(13)?,
        })
    }

    /// 查询全部 BOM 记录（按 SKU、创建时间排序）
    pub fn list_all(&self) -> RepositoryResult<Vec<BomLineItem>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM bom_record ORDER BY codigo_sku, created_at, rowid",
            SELECT_COLUMNS
        ))?;
        let records = stmt
            .query_map([], Self::map_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// 查询某个 SKU 的全部行
    pub fn list_by_sku(&self, sku_code: &str) -> RepositoryResult<Vec<BomLineItem>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM bom_record WHERE codigo_sku = ?1 ORDER BY created_at, rowid",
            SELECT_COLUMNS
        ))?;
        let records = stmt
            .query_map(params![sku_code], Self::map_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// 按 id 查询
    pub fn find_by_id(&self, id: &str) -> RepositoryResult<Option<BomLineItem>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM bom_record WHERE id = ?1",
            SELECT_COLUMNS
        ))?;
        match stmt.query_row(params![id], Self::map_row) {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 插入或覆盖（按 id）
    pub fn upsert(&self, record: &BomLineItem) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        Self::upsert_with(&conn, record)?;
        Ok(())
    }

    fn upsert_with(conn: &Connection, r: &BomLineItem) -> rusqlite::Result<usize> {
        conn.execute(
            r#"
            INSERT OR REPLACE INTO bom_record (
                id, codigo_sku, descripcion_sku, categoria_insumo, codigo_insumo,
                descripcion_insumo, cantidad_piezas_por_caja, consumo_por_caja,
                cantidad_requerida, unidad_medida, created_by, created_at, updated_by, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            "#,
            params![
                r.id,
                r.sku_code,
                r.sku_description,
                r.category.as_str(),
                r.supply_code,
                r.supply_description,
                r.pieces_per_box,
                r.consumption_per_box,
                r.quantity_required,
                r.unit_of_measure,
                r.created_by,
                r.created_at,
                r.updated_by,
                r.updated_at,
            ],
        )
    }

    /// 删除记录（返回是否存在）
    pub fn delete(&self, id: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM bom_record WHERE id = ?1", params![id])?;
        Ok(affected > 0)
    }

    /// 整表替换（远端读取成功后刷新本地缓存）
    pub fn replace_all(&self, records: &[BomLineItem]) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        tx.execute("DELETE FROM bom_record", [])?;
        for record in records {
            Self::upsert_with(&tx, record)?;
        }
        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(())
    }
}
