// src/config/credential.rs

use crate::{
    config::ConfigFile, // 只需要从父模块导入结构体定义
    constants,
    error::{AppError, AppResult},
};
use config::{Config, File, FileFormat};
use log::{debug, info};
use serde::Deserialize;
use std::{
    fmt::{self, Write as _},
    fs,
    path::Path,
};

/// 配置文件 `[Credential]` 段的原始内容
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct CredentialSection {
    #[serde(default, rename = "SESSDATA", alias = "sessdata")]
    pub sessdata: String,
    #[serde(default, rename = "BILI_JCT", alias = "bili_jct")]
    pub bili_jct: String,
    #[serde(default, rename = "BUVID3", alias = "buvid3")]
    pub buvid3: String,
    #[serde(default, rename = "DEDEUSERID", alias = "dedeuserid")]
    pub dedeuserid: String,
}

/// 访问平台所需的四个 Cookie 值。加载后不可修改。
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialBundle {
    session_id: String,
    csrf_token: String,
    client_id: String,
    user_id: String,
}

impl CredentialBundle {
    pub fn new(
        session_id: impl Into<String>,
        csrf_token: impl Into<String>,
        client_id: impl Into<String>,
        user_id: impl Into<String>,
    ) -> AppResult<Self> {
        let bundle = Self {
            session_id: session_id.into(),
            csrf_token: csrf_token.into(),
            client_id: client_id.into(),
            user_id: user_id.into(),
        };
        let missing: Vec<&str> = [
            ("SESSDATA", &bundle.session_id),
            ("BILI_JCT", &bundle.csrf_token),
            ("BUVID3", &bundle.client_id),
            ("DEDEUSERID", &bundle.user_id),
        ]
        .into_iter()
        .filter(|(_, value)| is_unset(value))
        .map(|(key, _)| key)
        .collect();
        if !missing.is_empty() {
            return Err(AppError::Config(format!(
                "[Credential] 中以下字段缺失或未填写: {}",
                missing.join(", ")
            )));
        }
        // 换行等控制字符会破坏 INI 结构与 Cookie 请求头
        if bundle.values().iter().any(|v| v.chars().any(char::is_control)) {
            return Err(AppError::Config("凭据中不能包含换行等控制字符".to_string()));
        }
        Ok(bundle)
    }

    pub(crate) fn from_section(section: CredentialSection) -> AppResult<Self> {
        Self::new(
            section.sessdata,
            section.bili_jct,
            section.buvid3,
            section.dedeuserid,
        )
    }

    fn values(&self) -> [&str; 4] {
        [
            &self.session_id,
            &self.csrf_token,
            &self.client_id,
            &self.user_id,
        ]
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn csrf_token(&self) -> &str {
        &self.csrf_token
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// 原样拼接为 Cookie 请求头，不做任何 URL 解码
    pub fn cookie_header(&self) -> String {
        format!(
            "SESSDATA={}; bili_jct={}; buvid3={}; DedeUserID={}",
            self.session_id, self.csrf_token, self.client_id, self.user_id
        )
    }
}

// 日志里只输出脱敏后的凭据
impl fmt::Debug for CredentialBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialBundle")
            .field("session_id", &"***")
            .field("csrf_token", &"***")
            .field("client_id", &"***")
            .field("user_id", &self.user_id)
            .finish()
    }
}

fn is_unset(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty() || trimmed.starts_with(constants::PLACEHOLDER_PREFIX)
}

/// 读取 INI 配置文件；文件不存在时写出模板并返回配置错误
pub(crate) fn load_or_create_config_file(path: &Path) -> AppResult<ConfigFile> {
    if !path.is_file() {
        info!("配置文件 {:?} 不存在，将创建模板。", path);
        write_text(path, constants::CONFIG_TEMPLATE)?;
        return Err(AppError::Config(format!(
            "未找到配置文件，已在 '{}' 创建模板，请填写凭据后重新初始化",
            path.display()
        )));
    }

    debug!("读取配置文件: {}", path.display());
    parse_config_text(&fs::read_to_string(path)?)
}

/// 作为原始键值文本解析，值中的 '%' 不做任何插值
pub(crate) fn parse_config_text(content: &str) -> AppResult<ConfigFile> {
    Config::builder()
        .add_source(File::from_str(content, FileFormat::Ini))
        .build()?
        .try_deserialize::<ConfigFile>()
        .map_err(AppError::from)
}

/// 读出配置文件的原始文本，用于页面上的导出
pub fn read_text(path: &Path) -> AppResult<String> {
    if !path.is_file() {
        return Err(AppError::Config(format!(
            "配置文件 '{}' 不存在",
            path.display()
        )));
    }
    Ok(fs::read_to_string(path)?)
}

/// 整体覆盖写入配置文件，必要时创建上级目录
pub fn write_text(path: &Path, content: &str) -> AppResult<()> {
    let to_error = |source| AppError::FileWrite {
        path: path.display().to_string(),
        source,
    };
    if let Some(dir) = path.parent()
        && !dir.as_os_str().is_empty()
    {
        fs::create_dir_all(dir).map_err(to_error)?;
    }
    fs::write(path, content).map_err(to_error)
}

/// 以新凭据生成完整的配置文本，其余段沿用 `file` 中的设置
pub(crate) fn render_config(credential: &CredentialBundle, file: &ConfigFile) -> String {
    let mut out = String::from("[Credential]\n");
    let _ = writeln!(out, "SESSDATA = {}", credential.session_id());
    let _ = writeln!(out, "BILI_JCT = {}", credential.csrf_token());
    let _ = writeln!(out, "BUVID3 = {}", credential.client_id());
    let _ = writeln!(out, "DEDEUSERID = {}", credential.user_id());

    out.push_str("\n[Settings]\n");
    let output_dir = file
        .settings
        .output_dir
        .as_deref()
        .unwrap_or(constants::DEFAULT_OUTPUT_DIR);
    let _ = writeln!(out, "output_dir = {}", output_dir);

    let network = &file.network;
    let entries = [
        ("api_base", network.api_base.clone()),
        ("connect_timeout_secs", network.connect_timeout_secs.map(|v| v.to_string())),
        ("timeout_secs", network.timeout_secs.map(|v| v.to_string())),
        ("max_retries", network.max_retries.map(|v| v.to_string())),
        ("comment_page_delay_ms", network.comment_page_delay_ms.map(|v| v.to_string())),
    ];
    if entries.iter().any(|(_, value)| value.is_some()) {
        out.push_str("\n[Network]\n");
        for (key, value) in entries {
            if let Some(value) = value {
                let _ = writeln!(out, "{} = {}", key, value);
            }
        }
    }
    out
}

/// 从配置文件加载凭据
pub fn load(path: &Path) -> AppResult<CredentialBundle> {
    let file = load_or_create_config_file(path)?;
    CredentialBundle::from_section(file.credential)
}
