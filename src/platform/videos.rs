// src/platform/videos.rs

use super::{BiliClient, check_uid, wbi};
use crate::{
    client::encode_query,
    constants::{MAX_PAGE_SIZE, MIN_PAGE_SIZE, api::paths},
    error::*,
    models::{
        VideoDetail, VideoSummary,
        api::{ArcSearchData, ViewData},
    },
    utils,
};
use log::{debug, info};
use std::collections::HashSet;

impl BiliClient {
    pub(super) async fn list_videos(&self, uid: u64, page_size: u32) -> AppResult<Vec<VideoSummary>> {
        check_uid(uid)?;
        if !(MIN_PAGE_SIZE..=MAX_PAGE_SIZE).contains(&page_size) {
            return Err(AppError::UserInputError(format!(
                "每次获取数量须在 {} 到 {} 之间，实际为 {}",
                MIN_PAGE_SIZE, MAX_PAGE_SIZE, page_size
            )));
        }

        let keys = wbi::fetch_keys(&self.http).await?;
        let limit = page_size as usize;
        let mut seen = HashSet::new();
        let mut videos = Vec::with_capacity(limit);
        let mut pn: u32 = 1;

        loop {
            let query = keys.sign(
                &[
                    ("mid", uid.to_string()),
                    ("ps", page_size.to_string()),
                    ("pn", pn.to_string()),
                    ("order", "pubdate".to_string()),
                ],
                wbi::current_wts(),
            );
            let data: ArcSearchData = self.http.fetch_data(paths::USER_VIDEOS, &query).await?;
            let total = data.page.count;
            let before = videos.len();
            videos.extend(
                data.list
                    .vlist
                    .into_iter()
                    .filter(|item| !item.bvid.is_empty() && seen.insert(item.bvid.clone()))
                    .map(VideoSummary::from),
            );
            let added = videos.len() - before;
            debug!("UID {} 第 {} 页新增 {} 个视频，累计 {}/{}", uid, pn, added, videos.len(), total);

            let exhausted = u64::from(pn) * u64::from(page_size) >= total;
            if added == 0 || videos.len() >= limit || exhausted {
                break;
            }
            pn += 1;
        }

        videos.truncate(limit);
        info!("UID {} 共获取 {} 个视频", uid, videos.len());
        Ok(videos)
    }

    pub(super) async fn fetch_video_detail(&self, bvid: &str) -> AppResult<VideoDetail> {
        let data = self.fetch_view(bvid).await?;
        Ok(VideoDetail::from(data))
    }

    pub(super) async fn fetch_view(&self, bvid: &str) -> AppResult<ViewData> {
        if !utils::is_bvid(bvid) {
            return Err(AppError::InvalidBvid(bvid.to_string()));
        }
        let query = encode_query(&[("bvid", bvid.to_string())]);
        self.http.fetch_data(paths::VIDEO_VIEW, &query).await
    }
}
