// src/constants.rs

pub const APP_DIR_NAME: &str = concat!(".", clap::crate_name!());
pub const LOG_FILE_NAME: &str = concat!(clap::crate_name!(), ".log");
pub const DEFAULT_CONFIG_FILE: &str = "config.ini";
pub const DEFAULT_OUTPUT_DIR: &str = "output";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8501;
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
pub const REFERER: &str = "https://www.bilibili.com/";
pub const SESSION_COOKIE: &str = "bh_sid";
/// 会话闲置超过该时长后被回收
pub const SESSION_IDLE_TTL: std::time::Duration = std::time::Duration::from_secs(2 * 3600);
pub const MAX_SESSIONS: usize = 256;

/// 配置模板中的占位值前缀，视为未填写
pub const PLACEHOLDER_PREFIX: &str = "你的";

pub const MIN_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 50;
pub const DEFAULT_PAGE_SIZE: u32 = 30;
/// 发布时间筛选可选的月数，0 表示不筛选
pub const MONTH_FILTERS: [u32; 5] = [0, 1, 3, 6, 12];

/// B 站接口按北京时间展示发布时间
pub const CST_OFFSET_SECS: i32 = 8 * 3600;
pub const DISPLAY_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const FILE_TIME_FORMAT: &str = "%Y%m%d_%H%M%S";

pub const CONFIG_TEMPLATE: &str = r#"; 获取方法：登录B站后按F12打开开发者工具，在 Application 或 Storage 中查看 Cookie
; SESSDATA 中的 URL 编码字符（如 %2C）直接原样复制即可
[Credential]
SESSDATA = 你的SESSDATA值
BILI_JCT = 你的BILI_JCT值
BUVID3 = 你的BUVID3值
DEDEUSERID = 你的DEDEUSERID值

[Settings]
output_dir = output

; 可选的网络参数
; [Network]
; timeout_secs = 30
; max_retries = 0
; comment_page_delay_ms = 1000
"#;

pub mod api {
    pub const DEFAULT_BASE: &str = "https://api.bilibili.com";

    pub mod paths {
        pub const NAV: &str = "/x/web-interface/nav";
        pub const USER_INFO: &str = "/x/space/wbi/acc/info";
        pub const RELATION_STAT: &str = "/x/relation/stat";
        pub const USER_VIDEOS: &str = "/x/space/wbi/arc/search";
        pub const VIDEO_VIEW: &str = "/x/web-interface/view";
        pub const REPLIES: &str = "/x/v2/reply";
    }

    pub mod codes {
        pub const OK: i64 = 0;
        pub const NOT_LOGGED_IN: i64 = -101;
        pub const CSRF_FAILED: i64 = -111;
        pub const ACCESS_DENIED: i64 = -403;
        pub const NOT_FOUND: i64 = -404;
        pub const VIDEO_INVISIBLE: i64 = 62002;
        pub const VIDEO_UNDER_REVIEW: i64 = 62004;
        pub const VIDEO_OWNER_ONLY: i64 = 62012;
    }

    /// 评论区类型：视频
    pub const REPLY_TYPE_VIDEO: &str = "1";
    /// 评论排序：按时间
    pub const REPLY_SORT_TIME: &str = "0";
}

/// WBI 签名使用的固定置换表
pub const WBI_MIXIN_KEY_ENC_TAB: [usize; 64] = [
    46, 47, 18, 2, 53, 8, 23, 32, 15, 50, 10, 31, 58, 3, 45, 35, 27, 43, 5, 49, 33, 9, 42, 19, 29,
    28, 14, 39, 12, 38, 41, 13, 37, 48, 7, 16, 24, 55, 40, 61, 26, 17, 0, 1, 60, 51, 30, 4, 22, 25,
    54, 21, 56, 59, 6, 63, 57, 62, 11, 36, 20, 34, 44, 52,
];
