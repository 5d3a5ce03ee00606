// src/models/api.rs

use serde::{Deserialize, Deserializer};
use serde_json::Value;

// --- 通用结构体 ---

/// 所有接口共用的响应外壳，data 先保留为原始 JSON，确认 code 后再解析
#[derive(Deserialize, Debug, Clone)]
pub struct ApiEnvelope {
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: Option<Value>,
}

/// 计数字段偶尔以字符串（如 "--"）返回，无法解析时记为 0
fn lenient_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_u64().unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    })
}

/// 嵌套对象或数组可能以 null 返回，统一按默认值处理
fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// --- 导航 (WBI 密钥) ---

#[derive(Deserialize, Debug, Clone, Default)]
pub struct NavData {
    #[serde(default)]
    pub wbi_img: WbiImg,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct WbiImg {
    #[serde(default)]
    pub img_url: String,
    #[serde(default)]
    pub sub_url: String,
}

// --- 用户 ---

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct AccInfo {
    pub mid: u64,
    pub name: String,
    pub face: String,
    pub sign: String,
    pub level: u32,
    pub sex: String,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct RelationStat {
    #[serde(deserialize_with = "lenient_u64")]
    pub follower: u64,
    #[serde(deserialize_with = "lenient_u64")]
    pub following: u64,
}

// --- 投稿列表 ---

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct ArcSearchData {
    #[serde(deserialize_with = "null_default")]
    pub list: ArcList,
    #[serde(deserialize_with = "null_default")]
    pub page: ArcPage,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct ArcList {
    #[serde(deserialize_with = "null_default")]
    pub vlist: Vec<ArcItem>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct ArcPage {
    pub pn: u32,
    pub ps: u32,
    pub count: u64,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct ArcItem {
    pub bvid: String,
    pub aid: u64,
    pub title: String,
    pub description: String,
    pub pic: String,
    pub created: i64,
    pub length: String,
    #[serde(deserialize_with = "lenient_u64")]
    pub play: u64,
}

// --- 视频详情 ---

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct ViewData {
    pub bvid: String,
    pub aid: u64,
    pub title: String,
    pub desc: String,
    pub dynamic: String,
    pub pubdate: i64,
    pub duration: u64,
    #[serde(deserialize_with = "null_default")]
    pub owner: ViewOwner,
    #[serde(deserialize_with = "null_default")]
    pub stat: ViewStat,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct ViewOwner {
    pub mid: u64,
    pub name: String,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct ViewStat {
    #[serde(deserialize_with = "lenient_u64")]
    pub view: u64,
    #[serde(deserialize_with = "lenient_u64")]
    pub danmaku: u64,
    #[serde(deserialize_with = "lenient_u64")]
    pub reply: u64,
    #[serde(deserialize_with = "lenient_u64")]
    pub favorite: u64,
    #[serde(deserialize_with = "lenient_u64")]
    pub coin: u64,
    #[serde(deserialize_with = "lenient_u64")]
    pub share: u64,
    #[serde(deserialize_with = "lenient_u64")]
    pub like: u64,
}

// --- 评论 ---

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct ReplyData {
    #[serde(deserialize_with = "null_default")]
    pub page: ReplyPage,
    pub replies: Option<Vec<Reply>>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct ReplyPage {
    pub num: u32,
    pub size: u32,
    pub count: u64,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Reply {
    pub rpid: u64,
    pub mid: u64,
    pub ctime: i64,
    #[serde(deserialize_with = "lenient_u64")]
    pub like: u64,
    #[serde(deserialize_with = "lenient_u64")]
    pub rcount: u64,
    #[serde(deserialize_with = "null_default")]
    pub member: ReplyMember,
    #[serde(deserialize_with = "null_default")]
    pub content: ReplyContent,
    #[serde(deserialize_with = "null_default")]
    pub reply_control: ReplyControl,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct ReplyMember {
    pub uname: String,
    #[serde(deserialize_with = "null_default")]
    pub level_info: LevelInfo,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct LevelInfo {
    pub current_level: u32,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct ReplyContent {
    pub message: String,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct ReplyControl {
    pub location: Option<String>,
}
