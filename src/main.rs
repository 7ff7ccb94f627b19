// ==========================================
// 包装物料 BOM 系统 - 命令行入口
// ==========================================
// 职责: 打开本地库，加载配置与目录，输出看板计数
// 说明: 界面由宿主应用提供，这里只做无界面启动检查
// ==========================================

use std::path::PathBuf;
use std::process::ExitCode;

use packaging_bom::app::{get_default_db_path, AppState};
use packaging_bom::logging;

#[tokio::main]
async fn main() -> ExitCode {
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("{}", packaging_bom::APP_NAME);
    tracing::info!("系统版本: {}", packaging_bom::VERSION);
    tracing::info!("==================================================");

    let db_path = get_default_db_path();
    tracing::info!("使用数据库: {}", db_path);

    // 可选参数: 物料目录文件
    let state = match std::env::args().nth(1).map(PathBuf::from) {
        Some(catalog_path) => AppState::with_catalog_file(db_path, &catalog_path),
        None => AppState::new(db_path),
    };
    let state = match state {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("无法初始化AppState: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match state.apply_locale().await {
        Ok(locale) => tracing::info!(locale = %locale, "界面语言"),
        Err(e) => tracing::warn!("语言配置读取失败: {}", e),
    }
    match state.restore_session().await {
        Ok(Some(session)) => tracing::info!(user = session.user(), "已恢复登录"),
        Ok(None) => tracing::info!("未记住登录名"),
        Err(e) => tracing::warn!("登录恢复失败: {}", e),
    }

    match state.dashboard_api.product_listing("").await {
        Ok(listing) => {
            for row in &listing {
                tracing::debug!(
                    code = %row.product.code,
                    weight_per_box = %row.weight_per_box_label,
                    avg_weight = %row.avg_weight_label,
                    "产品"
                );
            }
        }
        Err(e) => tracing::warn!("读取产品列表失败: {}", e.localized()),
    }

    match state.dashboard_api.counts().await {
        Ok(counts) => {
            tracing::info!(
                bom_records = counts.bom_records,
                products = counts.products,
                catalog_items = state.catalog.len(),
                "看板计数"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("读取看板计数失败: {}", e.localized());
            ExitCode::FAILURE
        }
    }
}
