// src/workbench/mod.rs

pub mod selection;

pub use self::selection::{KeywordField, KeywordOp, Listing, MatchMode};

use crate::{
    config::{
        AppConfig,
        credential::{self, CredentialBundle},
    },
    constants,
    error::*,
    export::{self, ExportFormat},
    models::{UserInfo, VideoDetail},
    platform::{BiliClient, PlatformApi},
};
use chrono::{Duration as ChronoDuration, Local, Utc};
use log::{error, info, warn};
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

/// 由配置构造平台适配器，测试中可替换为内存实现
pub type Connector = Arc<dyn Fn(&AppConfig) -> AppResult<Arc<dyn PlatformApi>> + Send + Sync>;

pub fn bili_connector() -> Connector {
    Arc::new(|config: &AppConfig| -> AppResult<Arc<dyn PlatformApi>> {
        let client = BiliClient::new(config)?;
        Ok(Arc::new(client) as Arc<dyn PlatformApi>)
    })
}

/// 初始化成功后持有的上下文
#[derive(Clone)]
pub struct Connection {
    pub api: Arc<dyn PlatformApi>,
    pub config: Arc<AppConfig>,
    /// 凭据对应的登录账号
    pub account: UserInfo,
}

/// 界面状态机。每个阶段只持有在该阶段有效的数据。
pub enum Stage {
    Unconfigured,
    Initialized {
        conn: Connection,
    },
    VideosListed {
        conn: Connection,
        listing: Listing,
    },
    DetailsFetched {
        conn: Connection,
        listing: Listing,
        details: Vec<VideoDetail>,
    },
    Exported {
        conn: Connection,
        listing: Listing,
        details: Vec<VideoDetail>,
        file: PathBuf,
    },
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Unconfigured => "unconfigured",
            Stage::Initialized { .. } => "initialized",
            Stage::VideosListed { .. } => "videos_listed",
            Stage::DetailsFetched { .. } => "details_fetched",
            Stage::Exported { .. } => "exported",
        }
    }

    pub fn connection(&self) -> Option<&Connection> {
        match self {
            Stage::Unconfigured => None,
            Stage::Initialized { conn }
            | Stage::VideosListed { conn, .. }
            | Stage::DetailsFetched { conn, .. }
            | Stage::Exported { conn, .. } => Some(conn),
        }
    }

    pub fn listing(&self) -> Option<&Listing> {
        match self {
            Stage::VideosListed { listing, .. }
            | Stage::DetailsFetched { listing, .. }
            | Stage::Exported { listing, .. } => Some(listing),
            _ => None,
        }
    }

    fn listing_mut(&mut self) -> Option<&mut Listing> {
        match self {
            Stage::VideosListed { listing, .. }
            | Stage::DetailsFetched { listing, .. }
            | Stage::Exported { listing, .. } => Some(listing),
            _ => None,
        }
    }

    pub fn details(&self) -> Option<&[VideoDetail]> {
        match self {
            Stage::DetailsFetched { details, .. } | Stage::Exported { details, .. } => {
                Some(details)
            }
            _ => None,
        }
    }

    pub fn exported_file(&self) -> Option<&Path> {
        match self {
            Stage::Exported { file, .. } => Some(file),
            _ => None,
        }
    }

    /// 选择发生变化后，已获取的详情不再对应当前选择
    fn back_to_listed(self) -> Stage {
        match self {
            Stage::DetailsFetched { conn, listing, .. } | Stage::Exported { conn, listing, .. } => {
                Stage::VideosListed { conn, listing }
            }
            other => other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Error,
}

impl NoticeLevel {
    pub fn css_class(&self) -> &'static str {
        match self {
            NoticeLevel::Success => "success",
            NoticeLevel::Info => "info",
            NoticeLevel::Warning => "warning",
            NoticeLevel::Error => "error",
        }
    }
}

/// 操作结束后在页面上显示一次的提示
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            text: text.into(),
        }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            text: text.into(),
        }
    }

    /// 输入类错误显示为警告，其余显示为错误
    pub fn from_error(err: &AppError) -> Self {
        let kind = err.kind();
        let level = if kind == ErrorKind::Input {
            NoticeLevel::Warning
        } else {
            NoticeLevel::Error
        };
        Self {
            level,
            text: format!("{}: {}", kind.label(), err),
        }
    }
}

/// 操作者在页面上可以触发的动作
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Initialize,
    ListVideos {
        uid: u64,
        page_size: u32,
        months: u32,
    },
    SetSelection(Vec<String>),
    SelectAll,
    InvertSelection,
    ClearSelection,
    SelectByKeywords {
        field: KeywordField,
        mode: MatchMode,
        op: KeywordOp,
        keywords: String,
    },
    FetchDetails,
    Export(ExportFormat),
    /// 在页面上填写凭据，验证通过后写回配置文件
    SaveCredential {
        session_id: String,
        csrf_token: String,
        client_id: String,
        user_id: String,
    },
    /// 用粘贴的完整配置文本替换配置文件
    ImportConfig(String),
}

/// 一个浏览器会话对应的工作台
pub struct Workbench {
    config_path: PathBuf,
    connector: Connector,
    stage: Stage,
    notice: Option<Notice>,
}

impl Workbench {
    pub fn new(config_path: impl Into<PathBuf>, connector: Connector) -> Self {
        Self {
            config_path: config_path.into(),
            connector,
            stage: Stage::Unconfigured,
            notice: None,
        }
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    /// 取出待显示的提示，页面渲染后即清空
    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    /// 执行一个动作。错误在此处转换为提示，状态保持不变。
    pub async fn perform(&mut self, action: Action) -> &Notice {
        let result = match action {
            Action::Initialize => self.initialize().await,
            Action::ListVideos {
                uid,
                page_size,
                months,
            } => self.list_videos(uid, page_size, months).await,
            Action::SetSelection(bvids) => self.edit_selection(|listing| {
                listing.set_selected(&bvids);
                format!("已选择 {} 个视频", listing.selected_count())
            }),
            Action::SelectAll => self.edit_selection(|listing| {
                listing.select_all();
                format!("已全选 {} 个视频", listing.selected_count())
            }),
            Action::InvertSelection => self.edit_selection(|listing| {
                listing.invert();
                format!("反选后已选择 {} 个视频", listing.selected_count())
            }),
            Action::ClearSelection => self.edit_selection(|listing| {
                listing.clear();
                "已清空选择".to_string()
            }),
            Action::SelectByKeywords {
                field,
                mode,
                op,
                keywords,
            } => self.select_by_keywords(field, mode, op, &keywords),
            Action::FetchDetails => self.fetch_details().await,
            Action::Export(format) => self.export(format),
            Action::SaveCredential {
                session_id,
                csrf_token,
                client_id,
                user_id,
            } => {
                self.save_credential(&session_id, &csrf_token, &client_id, &user_id)
                    .await
            }
            Action::ImportConfig(content) => self.import_config(content).await,
        };
        self.finish(result)
    }

    /// 动作在进入工作台之前就被拒绝（如表单无法解析）时记录提示
    pub fn reject(&mut self, err: AppError) -> &Notice {
        self.finish(Err(err))
    }

    fn finish(&mut self, result: AppResult<Notice>) -> &Notice {
        let notice = match result {
            Ok(notice) => notice,
            Err(err) => {
                if err.kind() == ErrorKind::Input {
                    warn!("操作被拒绝: {}", err);
                } else {
                    error!("操作失败 ({}): {}", self.stage.name(), err);
                }
                Notice::from_error(&err)
            }
        };
        self.notice.insert(notice)
    }

    pub async fn initialize(&mut self) -> AppResult<Notice> {
        let config = AppConfig::load(&self.config_path)?;
        let conn = self.connect(config).await?;

        info!("初始化成功，当前账号: {} (UID {})", conn.account.name, conn.account.uid);
        let notice = Notice::success(format!("初始化成功，当前账号: {}", conn.account.name));
        self.stage = Stage::Initialized { conn };
        Ok(notice)
    }

    /// 构造适配器并用登录账号的信息验证凭据
    async fn connect(&self, config: AppConfig) -> AppResult<Connection> {
        let config = Arc::new(config);
        let own_uid = config.user_id()?;
        let api = (self.connector)(&config)?;
        let account = api.get_user_info(own_uid).await?;
        Ok(Connection {
            api,
            config,
            account,
        })
    }

    pub async fn save_credential(
        &mut self,
        session_id: &str,
        csrf_token: &str,
        client_id: &str,
        user_id: &str,
    ) -> AppResult<Notice> {
        let credential = CredentialBundle::new(
            session_id.trim(),
            csrf_token.trim(),
            client_id.trim(),
            user_id.trim(),
        )?;
        let text = AppConfig::render_with_credential(&self.config_path, &credential)?;
        self.apply_config_text(&text, "凭据验证成功并已保存").await
    }

    pub async fn import_config(&mut self, content: String) -> AppResult<Notice> {
        if content.trim().is_empty() {
            return Err(AppError::UserInputError("请粘贴配置文件内容".to_string()));
        }
        self.apply_config_text(&content, "配置导入成功").await
    }

    /// 先验证再写盘：凭据被拒绝时配置文件与当前状态都保持不变
    async fn apply_config_text(&mut self, text: &str, done: &str) -> AppResult<Notice> {
        let config = AppConfig::from_ini_text(text)?;
        let conn = self.connect(config).await?;
        credential::write_text(&self.config_path, text)?;

        info!(
            "配置已写入 {}，当前账号: {} (UID {})",
            self.config_path.display(),
            conn.account.name,
            conn.account.uid
        );
        let notice = Notice::success(format!("{}，当前账号: {}", done, conn.account.name));
        self.stage = Stage::Initialized { conn };
        Ok(notice)
    }

    pub async fn list_videos(&mut self, uid: u64, page_size: u32, months: u32) -> AppResult<Notice> {
        let conn = self
            .stage
            .connection()
            .cloned()
            .ok_or_else(|| AppError::UserInputError("请先初始化".to_string()))?;
        if uid == 0 {
            return Err(AppError::UserInputError("UID 必须为正整数".to_string()));
        }
        if !(constants::MIN_PAGE_SIZE..=constants::MAX_PAGE_SIZE).contains(&page_size) {
            return Err(AppError::UserInputError(format!(
                "获取数量应在 {} 到 {} 之间",
                constants::MIN_PAGE_SIZE,
                constants::MAX_PAGE_SIZE
            )));
        }
        if !constants::MONTH_FILTERS.contains(&months) {
            return Err(AppError::UserInputError(format!("不支持的时间范围: {} 个月", months)));
        }

        let owner = conn.api.get_user_info(uid).await?;
        let mut videos = conn.api.get_user_videos(uid, page_size).await?;
        let fetched = videos.len();
        if months > 0 {
            let cutoff = (Utc::now() - ChronoDuration::days(30 * i64::from(months))).timestamp();
            videos.retain(|video| video.pubdate >= cutoff);
        }

        let text = if months > 0 {
            format!(
                "获取到 {} 的 {} 个视频，其中近 {} 个月发布的有 {} 个",
                owner.name,
                fetched,
                months,
                videos.len()
            )
        } else {
            format!("获取到 {} 的 {} 个视频", owner.name, videos.len())
        };
        let notice = if videos.is_empty() {
            Notice::info(text)
        } else {
            Notice::success(text)
        };
        self.stage = Stage::VideosListed {
            conn,
            listing: Listing::new(owner, videos),
        };
        Ok(notice)
    }

    fn edit_selection(&mut self, edit: impl FnOnce(&mut Listing) -> String) -> AppResult<Notice> {
        let listing = self
            .stage
            .listing_mut()
            .ok_or_else(|| AppError::UserInputError("请先获取视频列表".to_string()))?;
        let before = listing.selection_snapshot();
        let text = edit(listing);
        if listing.selection_snapshot() != before {
            let stage = std::mem::replace(&mut self.stage, Stage::Unconfigured);
            self.stage = stage.back_to_listed();
        }
        Ok(Notice::info(text))
    }

    fn select_by_keywords(
        &mut self,
        field: KeywordField,
        mode: MatchMode,
        op: KeywordOp,
        input: &str,
    ) -> AppResult<Notice> {
        let keywords = selection::parse_keywords(input);
        if keywords.is_empty() {
            return Err(AppError::UserInputError("请输入至少一个关键词".to_string()));
        }
        self.edit_selection(|listing| {
            let matched = listing.apply_keywords(field, mode, op, &keywords);
            format!(
                "{}匹配到 {} 个视频，当前已选择 {} 个",
                field.label(),
                matched,
                listing.selected_count()
            )
        })
    }

    pub async fn fetch_details(&mut self) -> AppResult<Notice> {
        let (conn, bvids) = match &self.stage {
            Stage::VideosListed { conn, listing }
            | Stage::DetailsFetched { conn, listing, .. }
            | Stage::Exported { conn, listing, .. } => (conn.clone(), listing.selected_bvids()),
            _ => return Err(AppError::UserInputError("请先获取视频列表".to_string())),
        };
        if bvids.is_empty() {
            return Err(AppError::UserInputError("请先选择要整理的视频".to_string()));
        }

        let mut details = Vec::with_capacity(bvids.len());
        for bvid in &bvids {
            details.push(conn.api.get_video_details(bvid).await?);
        }
        info!("已获取 {} 个视频的详情", details.len());

        let notice = Notice::success(format!("已整理 {} 个视频的详情", details.len()));
        self.stage = match std::mem::replace(&mut self.stage, Stage::Unconfigured) {
            Stage::VideosListed { conn, listing }
            | Stage::DetailsFetched { conn, listing, .. }
            | Stage::Exported { conn, listing, .. } => Stage::DetailsFetched {
                conn,
                listing,
                details,
            },
            other => other,
        };
        Ok(notice)
    }

    pub fn export(&mut self, format: ExportFormat) -> AppResult<Notice> {
        let (path, count) = match &self.stage {
            Stage::DetailsFetched {
                conn,
                listing,
                details,
            }
            | Stage::Exported {
                conn,
                listing,
                details,
                ..
            } => {
                let path = export::export_path(
                    &conn.config.output_dir,
                    &listing.owner().name,
                    Local::now(),
                    format,
                );
                export::save(details, &path, format)?;
                (path, details.len())
            }
            _ => return Err(AppError::UserInputError("请先整理视频详情".to_string())),
        };

        let notice = Notice::success(format!("已导出 {} 条记录到 {}", count, path.display()));
        self.stage = match std::mem::replace(&mut self.stage, Stage::Unconfigured) {
            Stage::DetailsFetched {
                conn,
                listing,
                details,
            }
            | Stage::Exported {
                conn,
                listing,
                details,
                ..
            } => Stage::Exported {
                conn,
                listing,
                details,
                file: path,
            },
            other => other,
        };
        Ok(notice)
    }
}
