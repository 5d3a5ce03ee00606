// src/config.rs

pub mod credential;

use self::credential::{
    CredentialBundle, CredentialSection, load_or_create_config_file, parse_config_text,
    render_config,
};
use crate::{
    constants,
    error::{AppError, AppResult},
};
use log::warn;
use serde::Deserialize;
use std::{
    path::{Path, PathBuf},
    time::Duration,
};

/// 配置文件的整体结构，段名与键名大小写均可
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ConfigFile {
    #[serde(default, rename = "Credential", alias = "credential")]
    pub credential: CredentialSection,
    #[serde(default, rename = "Settings", alias = "settings")]
    pub settings: SettingsSection,
    #[serde(default, rename = "Network", alias = "network")]
    pub network: NetworkSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct SettingsSection {
    #[serde(default)]
    pub output_dir: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct NetworkSection {
    pub api_base: Option<String>,
    pub connect_timeout_secs: Option<u64>,
    pub timeout_secs: Option<u64>,
    pub max_retries: Option<u32>,
    pub comment_page_delay_ms: Option<u64>,
}

/// 一次初始化得到的完整运行配置，显式向下传递
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub credential: CredentialBundle,
    pub output_dir: PathBuf,
    pub api_base: String,
    pub user_agent: String,
    pub connect_timeout: Duration,
    pub timeout: Duration,
    pub max_retries: u32,
    pub comment_page_delay: Duration,
}

impl AppConfig {
    pub fn load(path: &Path) -> AppResult<Self> {
        Self::from_file(load_or_create_config_file(path)?)
    }

    /// 由页面提交的配置文本构造，不读写磁盘
    pub fn from_ini_text(content: &str) -> AppResult<Self> {
        Self::from_file(parse_config_text(content)?)
    }

    /// 用新凭据替换 `path` 中的 `[Credential]`，返回完整的新配置文本。
    /// 文件不存在或无法解析时其余段使用默认值。
    pub fn render_with_credential(path: &Path, credential: &CredentialBundle) -> AppResult<String> {
        let current = if path.is_file() {
            match parse_config_text(&std::fs::read_to_string(path)?) {
                Ok(file) => file,
                Err(e) => {
                    warn!("现有配置文件无法解析，其余设置将使用默认值: {}", e);
                    ConfigFile::default()
                }
            }
        } else {
            ConfigFile::default()
        };
        Ok(render_config(credential, &current))
    }

    fn from_file(file: ConfigFile) -> AppResult<Self> {
        let credential = CredentialBundle::from_section(file.credential)?;

        let output_dir = file
            .settings
            .output_dir
            .map(|dir| dir.trim().to_string())
            .filter(|dir| !dir.is_empty())
            .unwrap_or_else(|| constants::DEFAULT_OUTPUT_DIR.to_string());
        let api_base = file
            .network
            .api_base
            .map(|base| base.trim().trim_end_matches('/').to_string())
            .filter(|base| !base.is_empty())
            .unwrap_or_else(|| constants::api::DEFAULT_BASE.to_string());

        Ok(Self {
            credential,
            output_dir: PathBuf::from(output_dir),
            api_base,
            user_agent: constants::USER_AGENT.into(),
            connect_timeout: Duration::from_secs(file.network.connect_timeout_secs.unwrap_or(10)),
            timeout: Duration::from_secs(file.network.timeout_secs.unwrap_or(30)),
            max_retries: file.network.max_retries.unwrap_or(0),
            comment_page_delay: Duration::from_millis(
                file.network.comment_page_delay_ms.unwrap_or(1000),
            ),
        })
    }

    /// 配置中登录账号的 UID，用于初始化时校验凭据
    pub fn user_id(&self) -> AppResult<u64> {
        self.credential
            .user_id()
            .trim()
            .parse::<u64>()
            .map_err(|_| {
                AppError::Config(format!(
                    "DEDEUSERID 应为数字 UID，实际为 '{}'",
                    self.credential.user_id()
                ))
            })
    }
}

#[cfg(feature = "testing")]
impl AppConfig {
    pub fn for_tests(api_base: &str) -> Self {
        Self {
            credential: CredentialBundle::new("test-sessdata", "test-jct", "test-buvid", "42")
                .expect("test credential is complete"),
            output_dir: PathBuf::from(constants::DEFAULT_OUTPUT_DIR),
            api_base: api_base.trim_end_matches('/').to_string(),
            user_agent: "test-agent/1.0".to_string(),
            connect_timeout: Duration::from_secs(5),
            timeout: Duration::from_secs(15),
            max_retries: 0,
            comment_page_delay: Duration::ZERO,
        }
    }
}
