// src/models/mod.rs

pub mod api;

use self::api::{AccInfo, ArcItem, RelationStat, Reply, ViewData};
use crate::utils;
use serde::{Deserialize, Serialize};

/// 用户主页的基本信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub uid: u64,
    pub name: String,
    pub face: String,
    pub sign: String,
    pub level: u32,
    pub sex: String,
    pub follower: u64,
    pub following: u64,
}

impl UserInfo {
    pub fn from_parts(uid: u64, info: AccInfo, stat: RelationStat) -> Self {
        Self {
            uid,
            name: info.name,
            face: info.face,
            sign: info.sign,
            level: info.level,
            sex: info.sex,
            follower: stat.follower,
            following: stat.following,
        }
    }
}

/// 投稿列表中的一项，用于勾选
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoSummary {
    pub bvid: String,
    pub title: String,
    pub pubdate: i64,
    pub created_str: String,
    pub description: String,
    pub length: String,
    pub play: u64,
}

impl From<ArcItem> for VideoSummary {
    fn from(item: ArcItem) -> Self {
        Self {
            created_str: utils::format_timestamp(item.created),
            bvid: item.bvid,
            title: item.title,
            pubdate: item.created,
            description: item.description,
            length: item.length,
            play: item.play,
        }
    }
}

/// 导出用的视频详情，字段顺序即 CSV 列顺序
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoDetail {
    pub bvid: String,
    pub title: String,
    pub description: String,
    pub dynamic: String,
    pub pubdate_str: String,
    pub duration: u64,
    pub view: u64,
    pub danmaku: u64,
    pub like: u64,
    pub coin: u64,
    pub favorite: u64,
    pub share: u64,
}

impl From<ViewData> for VideoDetail {
    fn from(data: ViewData) -> Self {
        Self {
            pubdate_str: utils::format_timestamp(data.pubdate),
            bvid: data.bvid,
            title: data.title,
            description: data.desc,
            dynamic: data.dynamic,
            duration: data.duration,
            view: data.stat.view,
            danmaku: data.stat.danmaku,
            like: data.stat.like,
            coin: data.stat.coin,
            favorite: data.stat.favorite,
            share: data.stat.share,
        }
    }
}

/// 单条评论
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentRecord {
    pub rpid: u64,
    pub author: String,
    pub uid: u64,
    pub level: u32,
    pub content: String,
    pub likes: u64,
    pub reply_count: u64,
    pub ctime: i64,
    pub timestamp: String,
    pub location: String,
}

impl From<Reply> for CommentRecord {
    fn from(reply: Reply) -> Self {
        Self {
            rpid: reply.rpid,
            author: reply.member.uname,
            uid: reply.mid,
            level: reply.member.level_info.current_level,
            content: reply.content.message,
            likes: reply.like,
            reply_count: reply.rcount,
            ctime: reply.ctime,
            timestamp: utils::format_timestamp(reply.ctime),
            location: reply.reply_control.location.unwrap_or_default(),
        }
    }
}
