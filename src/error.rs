// src/error.rs

use thiserror::Error;

/// 面向操作者的错误分类，决定界面上的提示方式与恢复手段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 配置文件缺失或内容无效，修正后重新初始化
    Config,
    /// 凭据被平台拒绝，需要刷新 Cookie
    Auth,
    /// UID / BV 号不存在或不可见
    NotFound,
    /// 网络传输失败或平台临时拒绝，重试即可
    Network,
    /// 本地文件读写或运行环境（如监听端口）出错
    Io,
    /// 操作者输入不合法，请求尚未发出
    Input,
}

impl ErrorKind {
    pub fn label(&self) -> &'static str {
        match self {
            ErrorKind::Config => "配置错误",
            ErrorKind::Auth => "认证失败",
            ErrorKind::NotFound => "目标不存在",
            ErrorKind::Network => "网络错误",
            ErrorKind::Io => "本地 I/O 错误",
            ErrorKind::Input => "输入错误",
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("配置无效: {0}")]
    Config(String),
    #[error("读取配置文件失败: {0}")]
    ConfigSource(#[from] config::ConfigError),
    #[error("凭据被拒绝 (code={code}): {message}")]
    AuthRejected { code: i64, message: String },
    #[error("资源不存在: {0}")]
    NotFound(String),
    #[error("无效的 BV 号: '{0}'")]
    InvalidBvid(String),
    #[error("平台接口返回错误 (code={code}): {message}")]
    Api { code: i64, message: String },
    #[error("网络请求失败: {0}")]
    Network(#[from] reqwest::Error),
    #[error("网络中间件错误: {0}")]
    NetworkMiddleware(#[from] reqwest_middleware::Error),
    #[error("无法解析来自 '{url}' 的API响应: {source}")]
    ApiParseFailed {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("URL 解析错误: {0}")]
    Url(#[from] url::ParseError),
    #[error("I/O 错误: {0}")]
    Io(#[from] std::io::Error),
    #[error("写入文件 '{path}' 失败: {source}")]
    FileWrite {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("CSV 写入失败: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON 序列化错误: {0}")]
    Json(#[from] serde_json::Error),
    #[error("没有可导出的记录")]
    EmptyExport,
    #[error("{0}")] // 只打印内部信息，不加任何前缀
    UserInputError(String),
    #[error("未知错误: {0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Config(_) | AppError::ConfigSource(_) => ErrorKind::Config,
            AppError::AuthRejected { .. } => ErrorKind::Auth,
            AppError::NotFound(_) | AppError::InvalidBvid(_) => ErrorKind::NotFound,
            AppError::Api { .. }
            | AppError::Network(_)
            | AppError::NetworkMiddleware(_)
            | AppError::ApiParseFailed { .. }
            | AppError::Url(_) => ErrorKind::Network,
            AppError::Io(_)
            | AppError::FileWrite { .. }
            | AppError::Csv(_)
            | AppError::Json(_)
            | AppError::Other(_) => ErrorKind::Io,
            AppError::EmptyExport | AppError::UserInputError(_) => ErrorKind::Input,
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
