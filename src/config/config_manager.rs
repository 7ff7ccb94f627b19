// ==========================================
// 包装物料 BOM 系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::bom_config_trait::{BomConfigReader, ConfigResult};
use crate::db::open_and_init;
use crate::domain::types::WeightUnit;
use async_trait::async_trait;
use rusqlite::{params, Connection};
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> ConfigResult<Self> {
        let conn = open_and_init(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ConfigResult<Self> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get(&self, key: &str) -> ConfigResult<Option<String>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 写入 global scope 配置（存在则覆盖）
    pub fn set(&self, key: &str, value: &str) -> ConfigResult<()> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2",
            params![key, value],
        )?;
        tracing::debug!(key, "配置已写入");
        Ok(())
    }

    /// 删除配置项，返回是否存在
    pub fn remove(&self, key: &str) -> ConfigResult<bool> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        let affected = conn.execute(
            "DELETE FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
        )?;
        Ok(affected > 0)
    }

    fn get_or_default(&self, key: &str, default: &str) -> ConfigResult<String> {
        Ok(self.get(key)?.unwrap_or_else(|| default.to_string()))
    }

    /// 获取所有配置的快照（JSON格式）
    pub fn get_config_snapshot(&self) -> ConfigResult<String> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt = conn
            .prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;

        let mut config_map: HashMap<String, String> = HashMap::new();
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        Ok(serde_json::to_string(&json!(config_map))?)
    }

    // ===== 类型化写入 =====

    pub fn set_weight_unit(&self, unit: WeightUnit) -> ConfigResult<()> {
        let value = match unit {
            WeightUnit::Kilogram => "KG",
            WeightUnit::Pound => "LB",
        };
        self.set(config_keys::WEIGHT_UNIT, value)
    }

    pub fn set_submit_delay_ms(&self, delay_ms: u64) -> ConfigResult<()> {
        self.set(config_keys::SUBMIT_DELAY_MS, &delay_ms.to_string())
    }

    pub fn set_locale(&self, locale: &str) -> ConfigResult<()> {
        self.set(config_keys::LOCALE, locale.trim())
    }

    /// 记住登录名（remember_user 关闭时清除）
    pub fn remember_login(&self, user: &str, remember: bool) -> ConfigResult<()> {
        self.set(config_keys::REMEMBER_USER, if remember { "true" } else { "false" })?;
        if remember {
            self.set(config_keys::LAST_USER, user.trim())
        } else {
            self.remove(config_keys::LAST_USER).map(|_| ())
        }
    }
}

// ==========================================
// BomConfigReader Trait 实现
// ==========================================
#[async_trait]
impl BomConfigReader for ConfigManager {
    async fn weight_unit(&self) -> ConfigResult<WeightUnit> {
        let value = self.get_or_default(config_keys::WEIGHT_UNIT, "KG")?;
        Ok(value.parse::<WeightUnit>().unwrap_or_else(|_| {
            tracing::warn!(
                config_key = config_keys::WEIGHT_UNIT,
                raw_value = %value,
                "重量单位配置无法识别，使用 KG"
            );
            WeightUnit::Kilogram
        }))
    }

    async fn submit_delay_ms(&self) -> ConfigResult<u64> {
        let value = self.get_or_default(config_keys::SUBMIT_DELAY_MS, "300")?;
        Ok(value.trim().parse::<u64>().unwrap_or(300))
    }

    async fn locale(&self) -> ConfigResult<String> {
        let value = self.get_or_default(config_keys::LOCALE, "es")?;
        let value = value.trim();
        if value.is_empty() {
            Ok("es".to_string())
        } else {
            Ok(value.to_string())
        }
    }

    async fn last_user(&self) -> ConfigResult<Option<String>> {
        Ok(self
            .get(config_keys::LAST_USER)?
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty()))
    }

    async fn remember_user(&self) -> ConfigResult<bool> {
        let value = self.get_or_default(config_keys::REMEMBER_USER, "false")?;
        Ok(matches!(
            value.trim().to_ascii_lowercase().as_str(),
            "true" | "1" | "yes" | "si" | "sí"
        ))
    }
}

pub mod config_keys {
    // 单位
    pub const WEIGHT_UNIT: &str = "weight_unit";

    // 顺序提交间隔
    pub const SUBMIT_DELAY_MS: &str = "submit_delay_ms";

    // 界面
    pub const LOCALE: &str = "locale";

    // 登录
    pub const LAST_USER: &str = "last_user";
    pub const REMEMBER_USER: &str = "remember_user";
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn manager() -> (NamedTempFile, ConfigManager) {
        let file = NamedTempFile::new().unwrap();
        let manager = ConfigManager::new(file.path().to_str().unwrap()).unwrap();
        (file, manager)
    }

    #[tokio::test]
    async fn test_defaults_when_empty() {
        let (_f, config) = manager();
        assert_eq!(config.weight_unit().await.unwrap(), WeightUnit::Kilogram);
        assert_eq!(config.submit_delay_ms().await.unwrap(), 300);
        assert_eq!(config.locale().await.unwrap(), "es");
        assert_eq!(config.last_user().await.unwrap(), None);
        assert!(!config.remember_user().await.unwrap());
    }

    #[tokio::test]
    async fn test_typed_setters_round_trip() {
        let (_f, config) = manager();
        config.set_weight_unit(WeightUnit::Pound).unwrap();
        config.set_submit_delay_ms(0).unwrap();
        config.remember_login(" ana ", true).unwrap();

        assert_eq!(config.weight_unit().await.unwrap(), WeightUnit::Pound);
        assert_eq!(config.submit_delay_ms().await.unwrap(), 0);
        assert_eq!(config.last_user().await.unwrap().as_deref(), Some("ana"));
        assert!(config.remember_user().await.unwrap());

        config.remember_login("ana", false).unwrap();
        assert_eq!(config.last_user().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_garbage_values_fall_back() {
        let (_f, config) = manager();
        config.set(config_keys::WEIGHT_UNIT, "stone").unwrap();
        config.set(config_keys::SUBMIT_DELAY_MS, "soon").unwrap();
        assert_eq!(config.weight_unit().await.unwrap(), WeightUnit::Kilogram);
        assert_eq!(config.submit_delay_ms().await.unwrap(), 300);
    }

    #[test]
    fn test_snapshot_contains_all_keys() {
        let (_f, config) = manager();
        config.set_locale("en").unwrap();
        config.set_submit_delay_ms(50).unwrap();
        let snapshot: HashMap<String, String> =
            serde_json::from_str(&config.get_config_snapshot().unwrap()).unwrap();
        assert_eq!(snapshot.get("locale").map(String::as_str), Some("en"));
        assert_eq!(snapshot.get("submit_delay_ms").map(String::as_str), Some("50"));
    }
}
