// ==========================================
// 包装物料 BOM 系统 - 产品仓储
// ==========================================
// 职责: 管理 product_info 表的 CRUD 操作
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::product::Product;
use crate::repository::columns::parse_text_column;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex};

const SELECT_COLUMNS: &str = r#"
    id, codigo, nombre_producto, tipo_empaque, size_empaque,
    cantidad_paquetes_por_caja, peso_por_caja, peso_promedio_por_paquete,
    sala_origen, created_by, created_at, updated_by, updated_at
"#;

// ==========================================
// ProductRepository - 产品仓储
// ==========================================
pub struct ProductRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ProductRepository {
    /// 创建新的 ProductRepository 实例
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

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<Product> {
        Ok(Product {
            id: row.get(0)?,
            code: row.get(1)?,
            name: row.get(2)?,
            package_type: parse_text_column(3, row.get(3)?)?,
            package_size: parse_text_column(4, row.get(4)?)?,
            box_count: row.get(5)?,
            weight_per_box: row.get(6)?,
            avg_weight_per_package: row.get(7)?,
            origin_room: row.get(8)?,
            created_by: row.get(9)?,
            created_at: row.get(10)?,
            updated_by: row.get(11)?,
            updated_at: row.get(12)?,
        })
    }

    /// 查询全部产品（按编码排序）
    pub fn list_all(&self) -> RepositoryResult<Vec<Product>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM product_info ORDER BY codigo, created_at",
            SELECT_COLUMNS
        ))?;
        let products = stmt
            .query_map([], Self::map_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(products)
    }

    /// 按 id 查询
    ///
    /// # 返回
    /// - Ok(Some(Product)): 找到
    /// - Ok(None): 未找到
    pub fn find_by_id(&self, id: &str) -> RepositoryResult<Option<Product>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM product_info WHERE id = ?1",
            SELECT_COLUMNS
        ))?;
        match stmt.query_row(params![id], Self::map_row) {
            Ok(product) => Ok(Some(product)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 插入或覆盖（按 id）
    pub fn upsert(&self, product: &Product) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        Self::upsert_with(&conn, product)?;
        Ok(())
    }

    fn upsert_with(conn: &Connection, p: &Product) -> rusqlite::Result<usize> {
        conn.execute(
            r#"
            INSERT OR REPLACE INTO product_info (
                id, codigo, nombre_producto, tipo_empaque, size_empaque,
                cantidad_paquetes_por_caja, peso_por_caja, peso_promedio_por_paquete,
                sala_origen, created_by, created_at, updated_by, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
            params![
                p.id,
                p.code,
                p.name,
                p.package_type.as_str(),
                p.package_size.as_str(),
                p.box_count,
                p.weight_per_box,
                p.avg_weight_per_package,
                p.origin_room,
                p.created_by,
                p.created_at,
                p.updated_by,
                p.updated_at,
            ],
        )
    }

    /// 删除产品
    ///
    /// # 返回
    /// - Ok(true): 已删除
    /// - Ok(false): 不存在
    pub fn delete(&self, id: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM product_info WHERE id = ?1", params![id])?;
        Ok(affected > 0)
    }

    /// 整表替换（远端读取成功后刷新本地缓存）
    pub fn replace_all(&self, products: &[Product]) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        tx.execute("DELETE FROM product_info", [])?;
        for product in products {
            Self::upsert_with(&tx, product)?;
        }
        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(())
    }
}
