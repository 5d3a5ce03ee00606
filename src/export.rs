// src/export.rs

use crate::{constants, error::*, utils};
use chrono::{DateTime, Local};
use log::info;
use serde::Serialize;
use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::Json => "application/json",
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "csv" => Some(ExportFormat::Csv),
            "json" => Some(ExportFormat::Json),
            _ => None,
        }
    }
}

fn ensure_parent_dir(path: &Path) -> AppResult<()> {
    if let Some(dir) = path.parent()
        && !dir.as_os_str().is_empty()
    {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

/// 写出 CSV：首行为字段名（按结构体字段顺序），其后每条记录一行。已存在的文件会被覆盖。
pub fn save_to_csv<T: Serialize>(records: &[T], path: &Path) -> AppResult<()> {
    if records.is_empty() {
        return Err(AppError::EmptyExport);
    }
    ensure_parent_dir(path)?;
    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    info!("已导出 {} 条记录到 {}", records.len(), path.display());
    Ok(())
}

/// 写出 JSON 数组，数值保持数值类型
pub fn save_to_json<T: Serialize>(records: &[T], path: &Path) -> AppResult<()> {
    if records.is_empty() {
        return Err(AppError::EmptyExport);
    }
    ensure_parent_dir(path)?;
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, records)?;
    writer.flush()?;
    info!("已导出 {} 条记录到 {}", records.len(), path.display());
    Ok(())
}

pub fn save<T: Serialize>(records: &[T], path: &Path, format: ExportFormat) -> AppResult<()> {
    match format {
        ExportFormat::Csv => save_to_csv(records, path),
        ExportFormat::Json => save_to_json(records, path),
    }
}

/// `videos_<用户名>_<时间>.<扩展名>`
pub fn export_path(
    output_dir: &Path,
    user_name: &str,
    at: DateTime<Local>,
    format: ExportFormat,
) -> PathBuf {
    output_dir.join(format!(
        "videos_{}_{}.{}",
        utils::sanitize_filename_part(user_name),
        at.format(constants::FILE_TIME_FORMAT),
        format.extension()
    ))
}
