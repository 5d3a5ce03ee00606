// src/platform/wbi.rs

//! 空间类接口要求的 WBI 请求签名。
//!
//! 密钥取自导航接口返回的两张图片地址的文件名，按固定置换表混合成
//! 32 位的 mixin key；签名时把参数连同 `wts` 按键名排序、编码后与
//! mixin key 拼接取 MD5，作为 `w_rid` 附加在查询串末尾。

use crate::{
    client::{RobustClient, decode_data},
    constants::{WBI_MIXIN_KEY_ENC_TAB, api::paths},
    error::{AppError, AppResult},
    models::api::NavData,
};
use itertools::Itertools;
use log::debug;
use md5::{Digest, Md5};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// RFC 3986 非保留字符之外的全部编码
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WbiKeys {
    mixin_key: String,
}

impl WbiKeys {
    pub fn from_raw(img_key: &str, sub_key: &str) -> AppResult<Self> {
        let raw: Vec<char> = format!("{}{}", img_key, sub_key).chars().collect();
        if raw.len() < WBI_MIXIN_KEY_ENC_TAB.len() {
            return Err(AppError::Api {
                code: 0,
                message: format!("WBI 密钥长度异常: {}", raw.len()),
            });
        }
        let mixin_key = WBI_MIXIN_KEY_ENC_TAB
            .iter()
            .map(|&i| raw[i])
            .take(32)
            .collect();
        Ok(Self { mixin_key })
    }

    pub fn from_urls(img_url: &str, sub_url: &str) -> AppResult<Self> {
        Self::from_raw(file_stem(img_url), file_stem(sub_url))
    }

    pub fn mixin_key(&self) -> &str {
        &self.mixin_key
    }

    /// 返回附带 `wts` 与 `w_rid` 的完整查询串
    pub fn sign(&self, params: &[(&str, String)], wts: i64) -> String {
        let query = params
            .iter()
            .map(|(key, value)| (key.to_string(), strip_reserved(value)))
            .chain(std::iter::once(("wts".to_string(), wts.to_string())))
            .sorted_by(|a, b| a.0.cmp(&b.0))
            .map(|(key, value)| {
                format!(
                    "{}={}",
                    utf8_percent_encode(&key, COMPONENT),
                    utf8_percent_encode(&value, COMPONENT)
                )
            })
            .join("&");
        let w_rid = Md5::digest(format!("{}{}", query, self.mixin_key).as_bytes());
        format!("{}&w_rid={:x}", query, w_rid)
    }
}

fn file_stem(url: &str) -> &str {
    let name = url.rsplit('/').next().unwrap_or(url);
    name.split('.').next().unwrap_or(name)
}

fn strip_reserved(value: &str) -> String {
    value.chars().filter(|c| !"!'()*".contains(*c)).collect()
}

/// 从导航接口获取当前的 WBI 密钥。未登录时接口返回 -101，但 data 中仍带有密钥。
pub async fn fetch_keys(client: &RobustClient) -> AppResult<WbiKeys> {
    let envelope = client.fetch_envelope(paths::NAV, "").await?;
    let nav: NavData = decode_data(paths::NAV, envelope)?;
    debug!(
        "WBI 密钥来源: img={} sub={}",
        nav.wbi_img.img_url, nav.wbi_img.sub_url
    );
    WbiKeys::from_urls(&nav.wbi_img.img_url, &nav.wbi_img.sub_url)
}

pub fn current_wts() -> i64 {
    chrono::Utc::now().timestamp()
}
