// src/lib.rs

pub mod cli;
pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod export;
pub mod logging;
pub mod models;
pub mod platform;
pub mod utils;
pub mod web;
pub mod workbench;

use crate::{cli::Cli, error::AppResult, web::SessionStore, workbench::bili_connector};
use anyhow::Context;
use colored::*;
use log::{debug, info};
use tokio::net::TcpListener;

/// 库的公共入口点，由 `main.rs` 调用
pub async fn run_from_cli(args: Cli) -> AppResult<()> {
    logging::setup_logger(args.log_level);
    debug!("CLI 参数: {:?}", args);

    let addr = args.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("无法监听 {}", addr))?;
    info!("使用配置文件 {}", args.config.display());

    println!(
        "{} 在浏览器中打开 {}",
        "[i]".cyan(),
        format!("http://{}", addr).green().bold()
    );
    println!("{} 按 Ctrl+C 退出", "[i]".cyan());

    let store = SessionStore::new(args.config.clone(), bili_connector());
    web::serve(listener, store).await
}
