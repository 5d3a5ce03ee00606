// src/main.rs

use bili_harvest::{cli::Cli, run_from_cli};
use clap::Parser;
use colored::*;

#[tokio::main]
async fn main() {
    // 为 Windows 终端启用 ANSI 颜色支持
    #[cfg(windows)]
    {
        colored::control::set_virtual_terminal(true).ok();
    }
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            println!("\n{} 已停止页面服务。", "[!]".yellow());
            std::process::exit(130);
        }
    });

    let args = Cli::parse();

    if let Err(e) = run_from_cli(args).await {
        eprintln!("\n{} {}", "[X]".red(), format!("程序执行出错: {}", e).red());
        std::process::exit(1);
    }
}
