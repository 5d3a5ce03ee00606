// src/client.rs

use crate::{
    config::AppConfig,
    constants::{self, api::codes},
    error::*,
    models::api::ApiEnvelope,
};
use log::{debug, warn};
use reqwest::{
    StatusCode,
    header::{COOKIE, HeaderMap, HeaderValue, REFERER},
};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde::de::DeserializeOwned;

/// 携带凭据的 HTTP 客户端，负责统一处理状态码与响应外壳
#[derive(Clone)]
pub struct RobustClient {
    client: ClientWithMiddleware,
    api_base: String,
}

impl RobustClient {
    pub fn new(config: &AppConfig) -> AppResult<Self> {
        let mut headers = HeaderMap::new();
        let cookie = HeaderValue::from_str(&config.credential.cookie_header())
            .map_err(|e| AppError::Config(format!("凭据包含无法放入 Cookie 的字符: {}", e)))?;
        headers.insert(COOKIE, cookie);
        headers.insert(REFERER, HeaderValue::from_static(constants::REFERER));

        let inner = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .connect_timeout(config.connect_timeout)
            .timeout(config.timeout)
            .build()?;

        let mut builder = ClientBuilder::new(inner);
        // 默认不自动重试，只有操作者在配置中显式开启时才挂载重试中间件
        if config.max_retries > 0 {
            let retry_policy =
                ExponentialBackoff::builder().build_with_max_retries(config.max_retries);
            builder = builder.with(RetryTransientMiddleware::new_with_policy(retry_policy));
        }

        Ok(Self {
            client: builder.build(),
            api_base: config.api_base.clone(),
        })
    }

    /// 请求接口并返回完整的响应外壳，不检查业务 code
    pub async fn fetch_envelope(&self, path: &str, query: &str) -> AppResult<ApiEnvelope> {
        let url = if query.is_empty() {
            format!("{}{}", self.api_base, path)
        } else {
            format!("{}{}?{}", self.api_base, path, query)
        };
        debug!("GET {}", url);

        let res = self.client.get(&url).send().await?;
        match res.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(AppError::AuthRejected {
                    code: i64::from(res.status().as_u16()),
                    message: format!("HTTP {}", res.status()),
                });
            }
            StatusCode::NOT_FOUND => {
                return Err(AppError::NotFound(format!("接口 '{}' 返回 404", path)));
            }
            _ => {}
        }
        let body = res.error_for_status()?.text().await?;
        serde_json::from_str(&body).map_err(|source| AppError::ApiParseFailed { url, source })
    }

    /// 请求接口，业务 code 非 0 时转换为对应错误，成功时解析 data
    pub async fn fetch_data<T: DeserializeOwned>(&self, path: &str, query: &str) -> AppResult<T> {
        let envelope = self.fetch_envelope(path, query).await?;
        check_code(envelope.code, &envelope.message)?;
        decode_data(path, envelope)
    }
}

/// 将外壳中的 data 解析为具体结构
pub fn decode_data<T: DeserializeOwned>(path: &str, envelope: ApiEnvelope) -> AppResult<T> {
    let data = envelope.data.ok_or_else(|| AppError::Api {
        code: envelope.code,
        message: format!("接口 '{}' 的响应缺少 data 字段", path),
    })?;
    serde_json::from_value(data).map_err(|source| AppError::ApiParseFailed {
        url: path.to_string(),
        source,
    })
}

/// 将平台的业务 code 映射为错误分类
pub fn check_code(code: i64, message: &str) -> AppResult<()> {
    match code {
        codes::OK => Ok(()),
        codes::NOT_LOGGED_IN | codes::CSRF_FAILED | codes::ACCESS_DENIED => {
            warn!("平台拒绝凭据: code={} message={}", code, message);
            Err(AppError::AuthRejected {
                code,
                message: message.to_string(),
            })
        }
        codes::NOT_FOUND
        | codes::VIDEO_INVISIBLE
        | codes::VIDEO_UNDER_REVIEW
        | codes::VIDEO_OWNER_ONLY => Err(AppError::NotFound(format!("{} (code={})", message, code))),
        _ => Err(AppError::Api {
            code,
            message: message.to_string(),
        }),
    }
}

/// 普通查询参数编码
pub fn encode_query(params: &[(&str, String)]) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in params {
        serializer.append_pair(key, value);
    }
    serializer.finish()
}
