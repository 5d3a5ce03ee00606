// src/logging.rs

use crate::{cli::LogLevel, constants};
use fern::colors::{Color, ColoredLevelConfig};
use std::{env, path::PathBuf};

fn log_file_path() -> PathBuf {
    match dirs::home_dir() {
        Some(home) => home
            .join(constants::APP_DIR_NAME)
            .join(constants::LOG_FILE_NAME),
        // 无法获取主目录时写入临时目录
        None => {
            eprintln!("警告: 无法获取用户主目录，日志将写入临时目录。");
            env::temp_dir()
                .join(clap::crate_name!())
                .join(constants::LOG_FILE_NAME)
        }
    }
}

/// 初始化日志：彩色输出到 stderr，同时写入日志文件。文件无法打开时只输出到终端。
pub fn setup_logger(level: LogLevel) {
    let filter: log::LevelFilter = level.into();
    if filter == log::LevelFilter::Off {
        return;
    }

    let colors = ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::Green)
        .debug(Color::Cyan)
        .trace(Color::BrightBlack);

    let stderr_dispatch = fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "[{}] [{:<5}] {}",
                chrono::Local::now().format("%H:%M:%S"),
                colors.color(record.level()),
                message
            ))
        })
        .chain(std::io::stderr());

    let mut dispatch = fern::Dispatch::new()
        .level(filter)
        // 依赖库的调试日志过多
        .level_for("hyper", log::LevelFilter::Warn)
        .level_for("hyper_util", log::LevelFilter::Warn)
        .level_for("reqwest", log::LevelFilter::Warn)
        .chain(stderr_dispatch);

    let log_file_path = log_file_path();
    if let Some(dir) = log_file_path.parent()
        && let Err(e) = std::fs::create_dir_all(dir)
    {
        eprintln!("警告: 无法创建日志目录 {:?}: {}", dir, e);
    }
    match fern::log_file(&log_file_path) {
        Ok(file) => {
            dispatch = dispatch.chain(
                fern::Dispatch::new()
                    .format(|out, message, record| {
                        out.finish(format_args!(
                            "[{}] [{:<5}] [{}:{}] - {}",
                            chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                            record.level(),
                            record.target(),
                            record.line().unwrap_or(0),
                            message
                        ))
                    })
                    .chain(file),
            );
        }
        Err(e) => {
            eprintln!(
                "警告: 无法打开日志文件 {:?}: {}。日志只会输出到终端。",
                log_file_path, e
            );
        }
    }

    if let Err(e) = dispatch.apply() {
        eprintln!("警告: 日志系统初始化失败: {}", e);
    }
}
