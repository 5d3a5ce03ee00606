// src/platform/mod.rs

mod comments;
mod videos;
pub mod wbi;

use crate::{
    client::{RobustClient, encode_query},
    config::AppConfig,
    constants::api::paths,
    error::*,
    models::{
        CommentRecord, UserInfo, VideoDetail, VideoSummary,
        api::{AccInfo, RelationStat},
    },
};
use async_trait::async_trait;
use log::info;
use std::time::Duration;

/// 平台接口适配层。界面控制器只依赖这个 trait。
#[async_trait]
pub trait PlatformApi: Send + Sync {
    /// 查询用户主页信息（昵称、粉丝数等）
    async fn get_user_info(&self, uid: u64) -> AppResult<UserInfo>;

    /// 按发布时间倒序获取用户投稿，最多 `page_size` 条
    async fn get_user_videos(&self, uid: u64, page_size: u32) -> AppResult<Vec<VideoSummary>>;

    /// 获取单个视频的详情与统计数据，不做重试
    async fn get_video_details(&self, bvid: &str) -> AppResult<VideoDetail>;

    /// 按时间顺序翻页抓取评论，最多 `max_pages` 页
    async fn get_video_comments(&self, bvid: &str, max_pages: u32)
    -> AppResult<Vec<CommentRecord>>;
}

/// 基于 HTTP 接口的 B 站客户端
pub struct BiliClient {
    http: RobustClient,
    comment_page_delay: Duration,
}

impl BiliClient {
    pub fn new(config: &AppConfig) -> AppResult<Self> {
        Ok(Self {
            http: RobustClient::new(config)?,
            comment_page_delay: config.comment_page_delay,
        })
    }

    async fn fetch_user_info(&self, uid: u64) -> AppResult<UserInfo> {
        check_uid(uid)?;
        let keys = wbi::fetch_keys(&self.http).await?;
        let query = keys.sign(&[("mid", uid.to_string())], wbi::current_wts());
        let info: AccInfo = self.http.fetch_data(paths::USER_INFO, &query).await?;

        let stat: RelationStat = self
            .http
            .fetch_data(paths::RELATION_STAT, &encode_query(&[("vmid", uid.to_string())]))
            .await?;

        info!("获取用户信息成功: {} (UID {})", info.name, uid);
        Ok(UserInfo::from_parts(uid, info, stat))
    }
}

#[async_trait]
impl PlatformApi for BiliClient {
    async fn get_user_info(&self, uid: u64) -> AppResult<UserInfo> {
        self.fetch_user_info(uid).await
    }

    async fn get_user_videos(&self, uid: u64, page_size: u32) -> AppResult<Vec<VideoSummary>> {
        self.list_videos(uid, page_size).await
    }

    async fn get_video_details(&self, bvid: &str) -> AppResult<VideoDetail> {
        self.fetch_video_detail(bvid).await
    }

    async fn get_video_comments(
        &self,
        bvid: &str,
        max_pages: u32,
    ) -> AppResult<Vec<CommentRecord>> {
        self.fetch_comments(bvid, max_pages).await
    }
}

fn check_uid(uid: u64) -> AppResult<()> {
    if uid == 0 {
        return Err(AppError::UserInputError("UID 必须为正整数".to_string()));
    }
    Ok(())
}
