// ==========================================
// 包装物料 BOM 系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// 说明: 当前登录会话显式保存在这里，并显式传入组装/保存调用
// ==========================================

use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::api::{ApiError, ApiResult, BomApi, DashboardApi, ProductApi};
use crate::catalog::SupplyCatalog;
use crate::config::{BomConfigReader, ConfigManager};
use crate::domain::session::Session;
use crate::importer::CatalogImporter;
use crate::repository::{BomDataAccess, SqliteDataAccess};

/// 应用状态
///
/// 包含所有API实例和共享资源
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 物料目录（启动时加载，只读）
    pub catalog: Arc<SupplyCatalog>,

    /// 配置管理器
    pub config: Arc<ConfigManager>,

    /// BOM 记录API
    pub bom_api: Arc<BomApi>,

    /// 产品API
    pub product_api: Arc<ProductApi>,

    /// 看板API
    pub dashboard_api: Arc<DashboardApi>,

    session: Mutex<Option<Session>>,
}

impl AppState {
    /// 创建新的AppState实例（内置目录 + 本地库）
    ///
    /// # 返回
    /// - Err(String): 初始化错误
    pub fn new(db_path: String) -> Result<Self, String> {
        let data = SqliteDataAccess::new(&db_path)
            .map_err(|e| format!("无法打开本地数据库: {}", e))?;
        Self::with_parts(db_path, Arc::new(data), Arc::new(SupplyCatalog::builtin()))
    }

    /// 使用外部物料目录文件创建（.csv / .xlsx / .xls）
    ///
    /// 有被拒绝的行时仍以通过校验的物料启动，并记录警告
    pub fn with_catalog_file(db_path: String, catalog_path: &Path) -> Result<Self, String> {
        let report = CatalogImporter::new()
            .import_file(catalog_path)
            .map_err(|e| format!("物料目录导入失败: {}", e))?;
        if !report.is_clean() {
            tracing::warn!(
                rejected = report.rejected.len(),
                accepted = report.items.len(),
                "物料目录存在被拒绝的行"
            );
        }
        let catalog = Arc::new(report.into_catalog());

        let data = SqliteDataAccess::new(&db_path)
            .map_err(|e| format!("无法打开本地数据库: {}", e))?;
        Self::with_parts(db_path, Arc::new(data), catalog)
    }

    /// 由调用方提供数据访问实现（例如远端优先缓存）
    pub fn with_parts(
        db_path: String,
        data: Arc<dyn BomDataAccess>,
        catalog: Arc<SupplyCatalog>,
    ) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let config = Arc::new(
            ConfigManager::new(&db_path).map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );
        let config_reader: Arc<dyn BomConfigReader> = config.clone();

        let bom_api = Arc::new(BomApi::new(data.clone(), config_reader.clone(), catalog.clone()));
        let product_api = Arc::new(ProductApi::new(data.clone()));
        let dashboard_api = Arc::new(DashboardApi::new(data, config_reader));

        tracing::info!(catalog_items = catalog.len(), "AppState初始化完成");

        Ok(Self {
            db_path,
            catalog,
            config,
            bom_api,
            product_api,
            dashboard_api,
            session: Mutex::new(None),
        })
    }

    // ==========================================
    // 会话
    // ==========================================

    /// 登录（名称去空格后不能为空）
    pub fn login(&self, name: &str, remember: bool) -> ApiResult<Session> {
        let session = Session::login(name)
            .ok_or_else(|| ApiError::InvalidInput("用户名不能为空".to_string()))?;
        self.config
            .remember_login(session.user(), remember)
            .map_err(|e| ApiError::Config(e.to_string()))?;
        self.set_session(Some(session.clone()))?;
        tracing::info!(user = session.user(), "用户登录");
        Ok(session)
    }

    pub fn logout(&self) -> ApiResult<()> {
        self.set_session(None)
    }

    /// 当前会话
    ///
    /// # 返回
    /// - Err(Unauthenticated): 尚未登录
    pub fn current_session(&self) -> ApiResult<Session> {
        let guard = self
            .session
            .lock()
            .map_err(|e| ApiError::InternalError(format!("会话锁获取失败: {}", e)))?;
        guard.clone().ok_or(ApiError::Unauthenticated)
    }

    /// 按配置恢复上次记住的登录名
    pub async fn restore_session(&self) -> ApiResult<Option<Session>> {
        let remember = self
            .config
            .remember_user()
            .await
            .map_err(|e| ApiError::Config(e.to_string()))?;
        if !remember {
            return Ok(None);
        }
        let last_user = self
            .config
            .last_user()
            .await
            .map_err(|e| ApiError::Config(e.to_string()))?;
        let session = last_user.as_deref().and_then(Session::login);
        if let Some(session) = &session {
            self.set_session(Some(session.clone()))?;
        }
        Ok(session)
    }

    /// 按配置切换界面语言，返回实际生效的语言
    pub async fn apply_locale(&self) -> ApiResult<String> {
        let locale = self
            .config
            .locale()
            .await
            .map_err(|e| ApiError::Config(e.to_string()))?;
        Ok(crate::i18n::set_locale(&locale).to_string())
    }

    fn set_session(&self, session: Option<Session>) -> ApiResult<()> {
        let mut guard = self
            .session
            .lock()
            .map_err(|e| ApiError::InternalError(format!("会话锁获取失败: {}", e)))?;
        *guard = session;
        Ok(())
    }
}

/// 获取默认数据库路径
///
/// 优先使用环境变量 PACKAGING_BOM_DB，否则放在用户数据目录下
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var("PACKAGING_BOM_DB") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./packaging_bom.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("packaging-bom");
        // 目录创建失败时退回当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("packaging_bom.db");
        }
    }

    path.to_string_lossy().to_string()
}
