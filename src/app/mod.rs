// ==========================================
// 包装物料 BOM 系统 - 应用层
// ==========================================
// 职责: 组装共享状态，连接宿主界面与后端
// ==========================================

pub mod state;

// 重导出
pub use state::{get_default_db_path, AppState};
