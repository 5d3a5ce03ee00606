// src/web/mod.rs

mod handlers;
pub mod pages;
pub mod session;

pub use self::session::SessionStore;

use crate::error::AppResult;
use axum::{
    Router,
    routing::{get, post},
};
use log::info;
use tokio::net::TcpListener;

pub fn router(store: SessionStore) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/init", post(handlers::init))
        .route("/config", get(handlers::config_page))
        .route("/config/credential", post(handlers::save_credential))
        .route("/config/import", post(handlers::import_config))
        .route("/videos", post(handlers::list_videos))
        .route("/selection", post(handlers::selection))
        .route("/selection/keywords", post(handlers::select_by_keywords))
        .route("/details", post(handlers::fetch_details))
        .route("/export/csv", post(handlers::export_csv))
        .route("/export/json", post(handlers::export_json))
        .route("/export/download", get(handlers::download))
        .with_state(store)
}

/// 在已绑定的端口上运行页面服务，直到进程退出
pub async fn serve(listener: TcpListener, store: SessionStore) -> AppResult<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("页面服务已启动: http://{}", addr);
    }
    axum::serve(listener, router(store)).await?;
    Ok(())
}
