// src/platform/comments.rs

use super::BiliClient;
use crate::{
    client::encode_query,
    constants::api::{REPLY_SORT_TIME, REPLY_TYPE_VIDEO, paths},
    error::*,
    models::{CommentRecord, api::ReplyData},
};
use log::{debug, info};

impl BiliClient {
    pub(super) async fn fetch_comments(
        &self,
        bvid: &str,
        max_pages: u32,
    ) -> AppResult<Vec<CommentRecord>> {
        if max_pages == 0 {
            return Ok(Vec::new());
        }
        let aid = self.fetch_view(bvid).await?.aid;
        info!("开始抓取 {} (av{}) 的评论，最大页数: {}", bvid, aid, max_pages);

        let mut comments = Vec::new();
        for pn in 1..=max_pages {
            if pn > 1 && !self.comment_page_delay.is_zero() {
                tokio::time::sleep(self.comment_page_delay).await;
            }
            let query = encode_query(&[
                ("type", REPLY_TYPE_VIDEO.to_string()),
                ("oid", aid.to_string()),
                ("pn", pn.to_string()),
                ("sort", REPLY_SORT_TIME.to_string()),
            ]);
            let data: ReplyData = self.http.fetch_data(paths::REPLIES, &query).await?;

            let replies = data.replies.unwrap_or_default();
            if replies.is_empty() {
                debug!("第 {} 页无评论，停止抓取", pn);
                break;
            }
            comments.extend(replies.into_iter().map(CommentRecord::from));

            let page = data.page;
            if page.size > 0 && u64::from(page.num.max(pn)) * u64::from(page.size) >= page.count {
                debug!("评论已全部取完 (共 {} 条)", page.count);
                break;
            }
        }

        info!("{} 评论抓取完成，共 {} 条", bvid, comments.len());
        Ok(comments)
    }
}
