// src/web/pages.rs

use crate::{
    constants,
    models::{UserInfo, VideoDetail},
    utils,
    workbench::{Listing, Notice, Stage},
};
use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};
use std::fmt::Write;

const STYLE: &str = r#"
body { font-family: sans-serif; max-width: 1100px; margin: 0 auto; padding: 1em; color: #222; }
section { border: 1px solid #ddd; border-radius: 6px; padding: 0.8em 1em; margin-bottom: 1em; }
h1 { color: #fb7299; }
.notice { padding: 0.6em 1em; border-radius: 4px; margin-bottom: 1em; }
.notice.success { background: #e6f7e6; }
.notice.info { background: #e8f1fb; }
.notice.warning { background: #fff6dd; }
.notice.error { background: #fde8e8; }
table { border-collapse: collapse; width: 100%; font-size: 0.9em; }
th, td { border-bottom: 1px solid #eee; padding: 0.3em 0.5em; text-align: left; }
.muted { color: #888; }
form.inline { display: inline; }
"#;

fn render_notice(notice: Option<&Notice>) -> String {
    notice
        .map(|notice| {
            format!(
                r#"<div class="notice {}">{}</div>"#,
                notice.level.css_class(),
                text(&notice.text)
            )
        })
        .unwrap_or_default()
}

fn layout(body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="zh-CN">
<head>
<meta charset="utf-8">
<title>B站视频信息整理</title>
<style>{}</style>
</head>
<body>
<h1>B站视频信息整理</h1>
{}
</body>
</html>"#,
        STYLE, body
    )
}

pub fn render_page(stage: &Stage, notice: Option<&Notice>) -> String {
    let mut body = render_notice(notice);
    body.push_str(&render_init(stage));
    if stage.connection().is_some() {
        body.push_str(&render_list_form(stage.listing()));
    }
    if let Some(listing) = stage.listing() {
        body.push_str(&render_owner(listing.owner()));
        body.push_str(&render_keyword_form());
        body.push_str(&render_checklist(listing));
    }
    if let Some(details) = stage.details() {
        body.push_str(&render_details(details, stage.exported_file().is_some()));
    }
    layout(&body)
}

/// 凭据配置页。`current` 为配置文件当前内容，文件不存在时为 None。
pub fn render_config_page(
    stage: &Stage,
    notice: Option<&Notice>,
    config_path: &str,
    current: Option<&str>,
) -> String {
    let mut body = render_notice(notice);
    body.push_str(r#"<p><a href="/">返回主页</a></p>"#);

    let account = match stage.connection() {
        Some(conn) => format!(
            "当前账号: <strong>{}</strong> (UID {})",
            text(&conn.account.name),
            conn.account.uid
        ),
        None => r#"<span class="muted">尚未初始化</span>"#.to_string(),
    };
    let _ = write!(
        body,
        r#"<section>
<h2>填写登录凭据</h2>
<p>{account}</p>
<p class="muted">登录 bilibili.com 后按 F12 打开开发者工具，在 Application / 存储 → Cookies 中复制以下字段。SESSDATA 中的 %2C 等编码字符原样粘贴即可。</p>
<form method="post" action="/config/credential">
<p><label>SESSDATA <textarea name="SESSDATA" rows="3" cols="60" required></textarea></label></p>
<p><label>BILI_JCT <input name="BILI_JCT" required></label></p>
<p><label>BUVID3 <input name="BUVID3" required></label></p>
<p><label>DEDEUSERID <input name="DEDEUSERID" inputmode="numeric" required></label></p>
<button type="submit">验证并保存到 {path}</button>
</form>
</section>"#,
        account = account,
        path = text(config_path),
    );

    let exported = match current {
        Some(content) => format!(
            r#"<textarea readonly rows="12" cols="80">{}</textarea>"#,
            text(content)
        ),
        None => r#"<p class="muted">配置文件不存在，初始化或保存凭据后会自动创建</p>"#.to_string(),
    };
    let _ = write!(
        body,
        r#"<section>
<h2>导出配置</h2>
<p class="muted">复制下方内容备份，或在其他设备上导入</p>
{exported}
</section>
<section>
<h2>导入配置</h2>
<form method="post" action="/config/import">
<textarea name="content" rows="12" cols="80" placeholder="粘贴之前导出的配置内容"></textarea>
<p><button type="submit">导入并重新初始化</button></p>
</form>
</section>"#,
        exported = exported,
    );
    layout(&body)
}

fn render_init(stage: &Stage) -> String {
    let status = match stage.connection() {
        Some(conn) => format!(
            "当前账号: <strong>{}</strong> (UID {})",
            text(&conn.account.name),
            conn.account.uid
        ),
        None => r#"<span class="muted">尚未初始化，请先在配置文件或配置页中填写 Cookie</span>"#.to_string(),
    };
    format!(
        r#"<section>
<h2>1. 初始化</h2>
<p>{}</p>
<form method="post" action="/init"><button type="submit">初始化</button></form>
<p><a href="/config">配置凭据</a></p>
</section>"#,
        status
    )
}

fn render_list_form(listing: Option<&Listing>) -> String {
    let uid = listing
        .map(|l| l.owner().uid.to_string())
        .unwrap_or_default();
    let months = constants::MONTH_FILTERS
        .iter()
        .map(|m| {
            let label = if *m == 0 {
                "全部".to_string()
            } else {
                format!("近 {} 个月", m)
            };
            format!(r#"<option value="{}">{}</option>"#, m, label)
        })
        .collect::<String>();
    format!(
        r#"<section>
<h2>2. 获取投稿列表</h2>
<form method="post" action="/videos">
<label>UID <input name="uid" value="{uid}" inputmode="numeric" required></label>
<label>获取数量 <input type="number" name="page_size" min="{min}" max="{max}" value="{default}"></label>
<label>发布时间 <select name="months">{months}</select></label>
<button type="submit">获取视频列表</button>
</form>
</section>"#,
        uid = attr(&uid),
        min = constants::MIN_PAGE_SIZE,
        max = constants::MAX_PAGE_SIZE,
        default = constants::DEFAULT_PAGE_SIZE,
        months = months,
    )
}

fn render_owner(owner: &UserInfo) -> String {
    format!(
        r#"<section>
<h2>{name}</h2>
<p>UID {uid} · Lv{level} · 粉丝 {follower} · 关注 {following}</p>
<p class="muted">{sign}</p>
</section>"#,
        name = text(&owner.name),
        uid = owner.uid,
        level = owner.level,
        follower = owner.follower,
        following = owner.following,
        sign = text(&owner.sign),
    )
}

fn render_keyword_form() -> String {
    r#"<section>
<h2>3. 按关键词选择</h2>
<form method="post" action="/selection/keywords">
<input name="keywords" placeholder="多个关键词用空格或逗号分隔">
<select name="field"><option value="title">标题</option><option value="description">简介</option></select>
<select name="mode"><option value="any">包含任一</option><option value="all">包含全部</option></select>
<select name="op"><option value="add">加入选择</option><option value="toggle">反转选择</option><option value="only">仅选匹配</option></select>
<button type="submit">应用</button>
</form>
</section>"#
        .to_string()
}

fn render_checklist(listing: &Listing) -> String {
    let mut rows = String::new();
    for (index, video) in listing.videos().iter().enumerate() {
        let checked = if listing.is_selected(index) { " checked" } else { "" };
        let _ = write!(
            rows,
            r#"<tr><td><input type="checkbox" name="bvid" value="{bvid}"{checked}></td><td>{bvid}</td><td title="{title}">{short}</td><td>{created}</td><td>{length}</td><td>{play}</td></tr>"#,
            bvid = attr(&video.bvid),
            checked = checked,
            title = attr(&video.title),
            short = text(&utils::truncate_text(&video.title, 60)),
            created = text(&video.created_str),
            length = text(&video.length),
            play = video.play,
        );
    }
    if listing.videos().is_empty() {
        rows.push_str(r#"<tr><td colspan="6" class="muted">没有符合条件的视频</td></tr>"#);
    }

    format!(
        r#"<section>
<h2>4. 选择视频（已选 {selected} / {total}）</h2>
<form method="post" action="/selection">
<table>
<tr><th></th><th>BV号</th><th>标题</th><th>发布时间</th><th>时长</th><th>播放</th></tr>
{rows}
</table>
<p>
<button type="submit" name="op" value="apply">确认勾选</button>
<button type="submit" name="op" value="all">全选</button>
<button type="submit" name="op" value="invert">反选</button>
<button type="submit" name="op" value="clear">清空</button>
</p>
</form>
<form method="post" action="/details"><button type="submit">整理选中视频的详情</button></form>
</section>"#,
        selected = listing.selected_count(),
        total = listing.videos().len(),
        rows = rows,
    )
}

fn render_details(details: &[VideoDetail], exported: bool) -> String {
    let mut rows = String::new();
    for detail in details {
        let _ = write!(
            rows,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            text(&detail.bvid),
            text(&utils::truncate_text(&detail.title, 50)),
            text(&detail.pubdate_str),
            utils::format_duration(detail.duration),
            detail.view,
            detail.danmaku,
            detail.like,
            detail.coin,
            detail.favorite,
            detail.share,
        );
    }
    let download = if exported {
        r#"<p><a href="/export/download">下载最近一次导出的文件</a></p>"#
    } else {
        ""
    };
    format!(
        r#"<section>
<h2>5. 视频详情（{count} 个）</h2>
<table>
<tr><th>BV号</th><th>标题</th><th>发布时间</th><th>时长</th><th>播放</th><th>弹幕</th><th>点赞</th><th>投币</th><th>收藏</th><th>分享</th></tr>
{rows}
</table>
<p>
<form class="inline" method="post" action="/export/csv"><button type="submit">导出 CSV</button></form>
<form class="inline" method="post" action="/export/json"><button type="submit">导出 JSON</button></form>
</p>
{download}
</section>"#,
        count = details.len(),
        rows = rows,
        download = download,
    )
}
