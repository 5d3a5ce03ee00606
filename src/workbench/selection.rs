// src/workbench/selection.rs

use crate::models::{UserInfo, VideoSummary};
use serde::Deserialize;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeywordField {
    Title,
    Description,
}

impl KeywordField {
    pub fn label(&self) -> &'static str {
        match self {
            KeywordField::Title => "标题",
            KeywordField::Description => "简介",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// 包含任意一个关键词
    Any,
    /// 包含全部关键词
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeywordOp {
    /// 把匹配项加入选择
    Add,
    /// 反转匹配项的选择状态
    Toggle,
    /// 仅选择匹配项
    Only,
}

/// 含逗号时按逗号切分，否则按空白切分
pub fn parse_keywords(input: &str) -> Vec<String> {
    let parts: Vec<&str> = if input.contains(',') {
        input.split(',').collect()
    } else {
        input.split_whitespace().collect()
    };
    parts
        .into_iter()
        .map(str::trim)
        .filter(|kw| !kw.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// `keywords` 须已转为小写
pub fn matches_keywords(
    video: &VideoSummary,
    field: KeywordField,
    mode: MatchMode,
    keywords: &[String],
) -> bool {
    if keywords.is_empty() {
        return false;
    }
    let haystack = match field {
        KeywordField::Title => video.title.to_lowercase(),
        KeywordField::Description => video.description.to_lowercase(),
    };
    match mode {
        MatchMode::Any => keywords.iter().any(|kw| haystack.contains(kw.as_str())),
        MatchMode::All => keywords.iter().all(|kw| haystack.contains(kw.as_str())),
    }
}

/// 一次获取到的投稿列表及其勾选状态
#[derive(Debug, Clone)]
pub struct Listing {
    owner: UserInfo,
    videos: Vec<VideoSummary>,
    selected: Vec<bool>,
}

impl Listing {
    pub fn new(owner: UserInfo, videos: Vec<VideoSummary>) -> Self {
        let selected = vec![false; videos.len()];
        Self {
            owner,
            videos,
            selected,
        }
    }

    pub fn owner(&self) -> &UserInfo {
        &self.owner
    }

    pub fn videos(&self) -> &[VideoSummary] {
        &self.videos
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.selected.get(index).copied().unwrap_or(false)
    }

    pub fn selected_count(&self) -> usize {
        self.selected.iter().filter(|s| **s).count()
    }

    /// 按列表顺序返回已选中的 BV 号
    pub fn selected_bvids(&self) -> Vec<String> {
        self.videos
            .iter()
            .zip(&self.selected)
            .filter(|(_, selected)| **selected)
            .map(|(video, _)| video.bvid.clone())
            .collect()
    }

    pub(crate) fn selection_snapshot(&self) -> Vec<bool> {
        self.selected.clone()
    }

    /// 用勾选表单的提交结果覆盖当前选择，列表外的 BV 号被忽略
    pub fn set_selected<S: AsRef<str>>(&mut self, bvids: &[S]) {
        let wanted: HashSet<&str> = bvids.iter().map(AsRef::as_ref).collect();
        for (video, selected) in self.videos.iter().zip(self.selected.iter_mut()) {
            *selected = wanted.contains(video.bvid.as_str());
        }
    }

    pub fn select_all(&mut self) {
        self.selected.iter_mut().for_each(|s| *s = true);
    }

    pub fn invert(&mut self) {
        self.selected.iter_mut().for_each(|s| *s = !*s);
    }

    pub fn clear(&mut self) {
        self.selected.iter_mut().for_each(|s| *s = false);
    }

    /// 按关键词修改选择，返回匹配到的视频数
    pub fn apply_keywords(
        &mut self,
        field: KeywordField,
        mode: MatchMode,
        op: KeywordOp,
        keywords: &[String],
    ) -> usize {
        let mut matched = 0;
        for (video, selected) in self.videos.iter().zip(self.selected.iter_mut()) {
            let hit = matches_keywords(video, field, mode, keywords);
            if hit {
                matched += 1;
            }
            match op {
                KeywordOp::Add if hit => *selected = true,
                KeywordOp::Toggle if hit => *selected = !*selected,
                KeywordOp::Only => *selected = hit,
                _ => {}
            }
        }
        matched
    }
}
