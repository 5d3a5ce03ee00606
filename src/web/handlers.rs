// src/web/handlers.rs

use super::{
    pages,
    session::{Session, SessionStore, set_cookie_value},
};
use crate::{
    config::credential,
    error::{AppError, AppResult},
    export::ExportFormat,
    workbench::{Action, KeywordField, KeywordOp, MatchMode},
};
use axum::{
    Form,
    extract::State,
    http::{
        HeaderMap, HeaderValue, StatusCode,
        header::{CONTENT_DISPOSITION, CONTENT_TYPE, SET_COOKIE},
    },
    response::{Html, IntoResponse, Redirect, Response},
};
use log::{error, info};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Deserialize;

/// Content-Disposition 中的文件名保留 `_` `.` `-`
const FILENAME_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC.remove(b'_').remove(b'.').remove(b'-');

#[derive(Debug, Deserialize)]
pub struct VideosForm {
    #[serde(default)]
    pub uid: String,
    #[serde(default)]
    pub page_size: String,
    #[serde(default)]
    pub months: String,
}

#[derive(Deserialize)]
pub struct CredentialForm {
    #[serde(default, rename = "SESSDATA")]
    pub sessdata: String,
    #[serde(default, rename = "BILI_JCT")]
    pub bili_jct: String,
    #[serde(default, rename = "BUVID3")]
    pub buvid3: String,
    #[serde(default, rename = "DEDEUSERID")]
    pub dedeuserid: String,
}

#[derive(Deserialize)]
pub struct ImportForm {
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct KeywordForm {
    pub field: KeywordField,
    pub mode: MatchMode,
    pub op: KeywordOp,
    #[serde(default)]
    pub keywords: String,
}

/// 新会话在响应中下发 Cookie
fn with_session_cookie(session: &Session, mut response: Response) -> Response {
    if session.is_new
        && let Ok(value) = HeaderValue::from_str(&set_cookie_value(session.id))
    {
        response.headers_mut().insert(SET_COOKIE, value);
    }
    response
}

async fn run_action(store: &SessionStore, headers: &HeaderMap, action: Action) -> Response {
    run_action_then(store, headers, action, "/").await
}

async fn run_action_then(
    store: &SessionStore,
    headers: &HeaderMap,
    action: Action,
    to: &str,
) -> Response {
    let session = store.resolve(headers);
    {
        let mut workbench = session.workbench.lock().await;
        workbench.perform(action).await;
    }
    with_session_cookie(&session, Redirect::to(to).into_response())
}

/// 表单无法解析时不执行动作，只留下提示
async fn reject_input(store: &SessionStore, headers: &HeaderMap, err: AppError) -> Response {
    let session = store.resolve(headers);
    session.workbench.lock().await.reject(err);
    with_session_cookie(&session, Redirect::to("/").into_response())
}

pub async fn index(State(store): State<SessionStore>, headers: HeaderMap) -> Response {
    let session = store.resolve(&headers);
    let html = {
        let mut workbench = session.workbench.lock().await;
        let notice = workbench.take_notice();
        pages::render_page(workbench.stage(), notice.as_ref())
    };
    with_session_cookie(&session, Html(html).into_response())
}

pub async fn init(State(store): State<SessionStore>, headers: HeaderMap) -> Response {
    run_action(&store, &headers, Action::Initialize).await
}

fn parse_number<T: std::str::FromStr>(raw: &str, what: &str) -> AppResult<T> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::UserInputError(format!("{}必须为整数，收到 '{}'", what, raw.trim())))
}

fn parse_videos_form(form: &VideosForm) -> AppResult<Action> {
    Ok(Action::ListVideos {
        uid: parse_number(&form.uid, "UID ")?,
        page_size: parse_number(&form.page_size, "获取数量")?,
        months: parse_number(&form.months, "发布时间范围")?,
    })
}

pub async fn list_videos(
    State(store): State<SessionStore>,
    headers: HeaderMap,
    Form(form): Form<VideosForm>,
) -> Response {
    // 取值范围由工作台校验
    match parse_videos_form(&form) {
        Ok(action) => run_action(&store, &headers, action).await,
        Err(err) => reject_input(&store, &headers, err).await,
    }
}

/// 勾选表单：`op` 区分确认勾选 / 全选 / 反选 / 清空，`bvid` 可重复出现
pub async fn selection(
    State(store): State<SessionStore>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let mut op = String::from("apply");
    let mut bvids = Vec::new();
    for (key, value) in url::form_urlencoded::parse(body.as_bytes()) {
        match key.as_ref() {
            "op" => op = value.into_owned(),
            "bvid" => bvids.push(value.into_owned()),
            _ => {}
        }
    }
    let action = match op.as_str() {
        "all" => Action::SelectAll,
        "invert" => Action::InvertSelection,
        "clear" => Action::ClearSelection,
        _ => Action::SetSelection(bvids),
    };
    run_action(&store, &headers, action).await
}

pub async fn select_by_keywords(
    State(store): State<SessionStore>,
    headers: HeaderMap,
    Form(form): Form<KeywordForm>,
) -> Response {
    let action = Action::SelectByKeywords {
        field: form.field,
        mode: form.mode,
        op: form.op,
        keywords: form.keywords,
    };
    run_action(&store, &headers, action).await
}

pub async fn fetch_details(State(store): State<SessionStore>, headers: HeaderMap) -> Response {
    run_action(&store, &headers, Action::FetchDetails).await
}

pub async fn export_csv(State(store): State<SessionStore>, headers: HeaderMap) -> Response {
    run_action(&store, &headers, Action::Export(ExportFormat::Csv)).await
}

pub async fn export_json(State(store): State<SessionStore>, headers: HeaderMap) -> Response {
    run_action(&store, &headers, Action::Export(ExportFormat::Json)).await
}

/// 凭据配置页：填写并保存凭据、导出与导入配置文件
pub async fn config_page(State(store): State<SessionStore>, headers: HeaderMap) -> Response {
    let session = store.resolve(&headers);
    let current = match credential::read_text(store.config_path()) {
        Ok(text) => Some(text),
        Err(e) => {
            info!("配置页无法读取配置文件: {}", e);
            None
        }
    };
    let html = {
        let mut workbench = session.workbench.lock().await;
        let notice = workbench.take_notice();
        pages::render_config_page(
            workbench.stage(),
            notice.as_ref(),
            &store.config_path().display().to_string(),
            current.as_deref(),
        )
    };
    with_session_cookie(&session, Html(html).into_response())
}

pub async fn save_credential(
    State(store): State<SessionStore>,
    headers: HeaderMap,
    Form(form): Form<CredentialForm>,
) -> Response {
    let action = Action::SaveCredential {
        session_id: form.sessdata,
        csrf_token: form.bili_jct,
        client_id: form.buvid3,
        user_id: form.dedeuserid,
    };
    run_action_then(&store, &headers, action, "/config").await
}

pub async fn import_config(
    State(store): State<SessionStore>,
    headers: HeaderMap,
    Form(form): Form<ImportForm>,
) -> Response {
    run_action_then(&store, &headers, Action::ImportConfig(form.content), "/config").await
}

/// 下载当前会话最近一次导出的文件
pub async fn download(State(store): State<SessionStore>, headers: HeaderMap) -> Response {
    let session = store.resolve(&headers);
    let path = {
        let workbench = session.workbench.lock().await;
        workbench.stage().exported_file().map(|p| p.to_path_buf())
    };
    let Some(path) = path else {
        let response = (StatusCode::NOT_FOUND, "当前会话还没有导出文件").into_response();
        return with_session_cookie(&session, response);
    };

    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) => {
            error!("读取导出文件 {} 失败: {}", path.display(), e);
            let response =
                (StatusCode::INTERNAL_SERVER_ERROR, format!("读取导出文件失败: {}", e)).into_response();
            return with_session_cookie(&session, response);
        }
    };
    info!("下载导出文件 {}", path.display());

    let mime = ExportFormat::from_path(&path)
        .map(|f| f.mime())
        .unwrap_or("application/octet-stream");
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "export".to_string());
    let disposition = format!(
        "attachment; filename*=UTF-8''{}",
        utf8_percent_encode(&file_name, FILENAME_ENCODE_SET)
    );

    let mut response = bytes.into_response();
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(mime));
    if let Ok(value) = HeaderValue::from_str(&disposition) {
        response.headers_mut().insert(CONTENT_DISPOSITION, value);
    }
    with_session_cookie(&session, response)
}
