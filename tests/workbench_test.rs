// tests/workbench_test.rs

use async_trait::async_trait;
use bili_harvest::{
    config::AppConfig,
    error::{AppError, AppResult},
    export::ExportFormat,
    models::{CommentRecord, UserInfo, VideoDetail, VideoSummary},
    platform::PlatformApi,
    workbench::{
        Action, Connector, KeywordField, KeywordOp, MatchMode, NoticeLevel, Stage, Workbench,
    },
};
use std::{
    fs,
    path::Path,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};
use tempfile::{TempDir, tempdir};

const DAY: i64 = 86_400;

/// 内存中的平台实现，记录每类请求的次数
#[derive(Default)]
struct FakeApi {
    videos: Vec<VideoSummary>,
    failing_bvid: Option<String>,
    user_calls: AtomicUsize,
    list_calls: AtomicUsize,
    detail_calls: AtomicUsize,
}

impl FakeApi {
    fn with_videos(videos: Vec<VideoSummary>) -> Self {
        Self {
            videos,
            ..Default::default()
        }
    }
}

#[async_trait]
impl PlatformApi for FakeApi {
    async fn get_user_info(&self, uid: u64) -> AppResult<UserInfo> {
        self.user_calls.fetch_add(1, Ordering::SeqCst);
        Ok(UserInfo {
            uid,
            name: format!("用户{}", uid),
            face: String::new(),
            sign: "签名".into(),
            level: 6,
            sex: "保密".into(),
            follower: 100,
            following: 10,
        })
    }

    async fn get_user_videos(&self, _uid: u64, page_size: u32) -> AppResult<Vec<VideoSummary>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.videos.iter().take(page_size as usize).cloned().collect())
    }

    async fn get_video_details(&self, bvid: &str) -> AppResult<VideoDetail> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_bvid.as_deref() == Some(bvid) {
            return Err(AppError::NotFound(format!("{} 不可见", bvid)));
        }
        Ok(VideoDetail {
            bvid: bvid.to_string(),
            title: format!("{} 的标题", bvid),
            description: String::new(),
            dynamic: String::new(),
            pubdate_str: "2024-01-01 00:00:00".into(),
            duration: 100,
            view: 1,
            danmaku: 2,
            like: 3,
            coin: 4,
            favorite: 5,
            share: 6,
        })
    }

    async fn get_video_comments(&self, _bvid: &str, _max_pages: u32) -> AppResult<Vec<CommentRecord>> {
        Ok(Vec::new())
    }
}

fn video(bvid: &str, title: &str, description: &str, age_days: i64) -> VideoSummary {
    VideoSummary {
        bvid: bvid.to_string(),
        title: title.to_string(),
        pubdate: chrono::Utc::now().timestamp() - age_days * DAY,
        created_str: String::new(),
        description: description.to_string(),
        length: "10:00".into(),
        play: 0,
    }
}

fn sample_videos() -> Vec<VideoSummary> {
    vec![
        video("BV1aa411c001", "游戏实况 第一期", "攻略", 5),
        video("BV1aa411c002", "日常 vlog", "随便拍拍", 20),
        video("BV1aa411c003", "游戏评测", "深度分析", 50),
        video("BV1aa411c004", "音乐翻唱", "游戏配乐", 120),
        video("BV1aa411c005", "年度总结", "", 400),
    ]
}

fn write_config(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("config.ini");
    let output = dir.join("exports");
    fs::write(
        &path,
        format!(
            "[Credential]\nSESSDATA = s%2C1\nBILI_JCT = j\nBUVID3 = b\nDEDEUSERID = 42\n\n[Settings]\noutput_dir = {}\n",
            output.display()
        ),
    )
    .unwrap();
    path
}

fn connector_for(api: &Arc<FakeApi>) -> Connector {
    let api = api.clone();
    Arc::new(move |_config: &AppConfig| -> AppResult<Arc<dyn PlatformApi>> {
        Ok(api.clone())
    })
}

async fn listed_workbench(api: &Arc<FakeApi>) -> (Workbench, TempDir) {
    let dir = tempdir().unwrap();
    let mut workbench = Workbench::new(write_config(dir.path()), connector_for(api));
    assert_eq!(workbench.perform(Action::Initialize).await.level, NoticeLevel::Success);
    let notice = workbench
        .perform(Action::ListVideos {
            uid: 7,
            page_size: 30,
            months: 0,
        })
        .await;
    assert_eq!(notice.level, NoticeLevel::Success);
    (workbench, dir)
}

fn selected(workbench: &Workbench) -> Vec<String> {
    workbench.stage().listing().unwrap().selected_bvids()
}

#[tokio::test]
async fn test_initialize_without_config_keeps_unconfigured() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.ini");
    let api = Arc::new(FakeApi::default());
    let mut workbench = Workbench::new(&path, connector_for(&api));

    let notice = workbench.perform(Action::Initialize).await;
    assert_eq!(notice.level, NoticeLevel::Error);
    assert!(notice.text.contains("配置错误"));
    assert!(matches!(workbench.stage(), Stage::Unconfigured));
    assert!(path.exists(), "a template should have been written");
    assert_eq!(api.user_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_initialize_verifies_own_account() {
    let dir = tempdir().unwrap();
    let api = Arc::new(FakeApi::default());
    let mut workbench = Workbench::new(write_config(dir.path()), connector_for(&api));

    let notice = workbench.perform(Action::Initialize).await;
    assert_eq!(notice.level, NoticeLevel::Success);
    let conn = workbench.stage().connection().unwrap();
    assert_eq!(conn.account.uid, 42);
    assert_eq!(conn.config.credential.session_id(), "s%2C1");
    assert!(matches!(workbench.stage(), Stage::Initialized { .. }));
}

#[tokio::test]
async fn test_actions_before_listing_are_rejected() {
    let dir = tempdir().unwrap();
    let api = Arc::new(FakeApi::with_videos(sample_videos()));
    let mut workbench = Workbench::new(write_config(dir.path()), connector_for(&api));

    assert_eq!(workbench.perform(Action::SelectAll).await.level, NoticeLevel::Warning);
    assert_eq!(workbench.perform(Action::FetchDetails).await.level, NoticeLevel::Warning);
    assert_eq!(
        workbench.perform(Action::Export(ExportFormat::Csv)).await.level,
        NoticeLevel::Warning
    );
    assert!(matches!(workbench.stage(), Stage::Unconfigured));
}

#[tokio::test]
async fn test_full_flow_reaches_exported() {
    let api = Arc::new(FakeApi::with_videos(sample_videos()));
    let (mut workbench, dir) = listed_workbench(&api).await;
    assert_eq!(workbench.stage().listing().unwrap().videos().len(), 5);

    workbench
        .perform(Action::SetSelection(vec![
            "BV1aa411c003".into(),
            "BV1aa411c001".into(),
        ]))
        .await;
    // 按列表顺序抓取
    assert_eq!(selected(&workbench), vec!["BV1aa411c001", "BV1aa411c003"]);

    let notice = workbench.perform(Action::FetchDetails).await;
    assert_eq!(notice.level, NoticeLevel::Success);
    assert_eq!(api.detail_calls.load(Ordering::SeqCst), 2);
    let details = workbench.stage().details().unwrap();
    assert_eq!(details[0].bvid, "BV1aa411c001");

    let notice = workbench.perform(Action::Export(ExportFormat::Csv)).await;
    assert_eq!(notice.level, NoticeLevel::Success);
    let file = workbench.stage().exported_file().unwrap().to_path_buf();
    assert!(file.starts_with(dir.path().join("exports")));
    let name = file.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("videos_用户7_"));
    assert!(name.ends_with(".csv"));
    assert_eq!(fs::read_to_string(&file).unwrap().lines().count(), 3);

    let notice = workbench.perform(Action::Export(ExportFormat::Json)).await;
    assert_eq!(notice.level, NoticeLevel::Success);
    assert!(workbench.stage().exported_file().unwrap().extension().unwrap() == "json");
}

#[tokio::test]
async fn test_empty_selection_makes_no_call_and_keeps_stage() {
    let api = Arc::new(FakeApi::with_videos(sample_videos()));
    let (mut workbench, _dir) = listed_workbench(&api).await;

    let notice = workbench.perform(Action::FetchDetails).await;
    assert_eq!(notice.level, NoticeLevel::Warning);
    assert_eq!(api.detail_calls.load(Ordering::SeqCst), 0);
    assert!(matches!(workbench.stage(), Stage::VideosListed { .. }));
}

#[tokio::test]
async fn test_failed_fetch_leaves_previous_stage() {
    let api = Arc::new(FakeApi {
        videos: sample_videos(),
        failing_bvid: Some("BV1aa411c002".into()),
        ..Default::default()
    });
    let (mut workbench, _dir) = listed_workbench(&api).await;

    workbench.perform(Action::SetSelection(vec!["BV1aa411c001".into()])).await;
    workbench.perform(Action::FetchDetails).await;
    assert!(matches!(workbench.stage(), Stage::DetailsFetched { .. }));

    workbench.perform(Action::SelectAll).await;
    let notice = workbench.perform(Action::FetchDetails).await;
    assert_eq!(notice.level, NoticeLevel::Error);
    assert!(notice.text.contains("目标不存在"));
    // 第一处失败即停止
    assert_eq!(api.detail_calls.load(Ordering::SeqCst), 3);
    assert!(matches!(workbench.stage(), Stage::VideosListed { .. }));
    assert_eq!(selected(&workbench).len(), 5);
}

#[tokio::test]
async fn test_selection_change_discards_fetched_details() {
    let api = Arc::new(FakeApi::with_videos(sample_videos()));
    let (mut workbench, _dir) = listed_workbench(&api).await;

    workbench.perform(Action::SetSelection(vec!["BV1aa411c001".into()])).await;
    workbench.perform(Action::FetchDetails).await;

    // 选择没有变化时保留详情
    workbench.perform(Action::SetSelection(vec!["BV1aa411c001".into()])).await;
    assert!(matches!(workbench.stage(), Stage::DetailsFetched { .. }));

    workbench.perform(Action::InvertSelection).await;
    assert!(matches!(workbench.stage(), Stage::VideosListed { .. }));
    assert_eq!(selected(&workbench).len(), 4);
}

#[tokio::test]
async fn test_fresh_listing_clears_selection() {
    let api = Arc::new(FakeApi::with_videos(sample_videos()));
    let (mut workbench, _dir) = listed_workbench(&api).await;

    workbench.perform(Action::SelectAll).await;
    assert_eq!(selected(&workbench).len(), 5);

    workbench
        .perform(Action::ListVideos {
            uid: 8,
            page_size: 10,
            months: 0,
        })
        .await;
    assert!(selected(&workbench).is_empty());
    assert_eq!(workbench.stage().listing().unwrap().owner().uid, 8);
}

#[tokio::test]
async fn test_month_filter_and_input_validation() {
    let api = Arc::new(FakeApi::with_videos(sample_videos()));
    let (mut workbench, _dir) = listed_workbench(&api).await;

    workbench
        .perform(Action::ListVideos {
            uid: 7,
            page_size: 30,
            months: 3,
        })
        .await;
    let bvids: Vec<&str> = workbench
        .stage()
        .listing()
        .unwrap()
        .videos()
        .iter()
        .map(|v| v.bvid.as_str())
        .collect();
    assert_eq!(bvids, vec!["BV1aa411c001", "BV1aa411c002", "BV1aa411c003"]);

    let list_calls = api.list_calls.load(Ordering::SeqCst);
    for (uid, page_size, months) in [(0, 30, 0), (7, 9, 0), (7, 51, 0), (7, 30, 2)] {
        let notice = workbench
            .perform(Action::ListVideos {
                uid,
                page_size,
                months,
            })
            .await;
        assert_eq!(notice.level, NoticeLevel::Warning);
    }
    assert_eq!(api.list_calls.load(Ordering::SeqCst), list_calls);
    assert_eq!(workbench.stage().listing().unwrap().videos().len(), 3);
}

#[tokio::test]
async fn test_keyword_selection() {
    let api = Arc::new(FakeApi::with_videos(sample_videos()));
    let (mut workbench, _dir) = listed_workbench(&api).await;

    workbench
        .perform(Action::SelectByKeywords {
            field: KeywordField::Title,
            mode: MatchMode::Any,
            op: KeywordOp::Add,
            keywords: "游戏".into(),
        })
        .await;
    assert_eq!(selected(&workbench), vec!["BV1aa411c001", "BV1aa411c003"]);

    workbench
        .perform(Action::SelectByKeywords {
            field: KeywordField::Description,
            mode: MatchMode::Any,
            op: KeywordOp::Only,
            keywords: "游戏, 攻略".into(),
        })
        .await;
    assert_eq!(selected(&workbench), vec!["BV1aa411c001", "BV1aa411c004"]);

    let notice = workbench
        .perform(Action::SelectByKeywords {
            field: KeywordField::Title,
            mode: MatchMode::All,
            op: KeywordOp::Toggle,
            keywords: "   ".into(),
        })
        .await;
    assert_eq!(notice.level, NoticeLevel::Warning);
    assert_eq!(selected(&workbench), vec!["BV1aa411c001", "BV1aa411c004"]);
}

/// 会话 Cookie 为 `rejected` 时模拟平台拒绝凭据
fn connector_rejecting(api: &Arc<FakeApi>, rejected: &'static str) -> Connector {
    let api = api.clone();
    Arc::new(move |config: &AppConfig| -> AppResult<Arc<dyn PlatformApi>> {
        if config.credential.session_id() == rejected {
            return Err(AppError::AuthRejected {
                code: -101,
                message: "账号未登录".into(),
            });
        }
        Ok(api.clone())
    })
}

fn credential_action(session_id: &str, csrf_token: &str, user_id: &str) -> Action {
    Action::SaveCredential {
        session_id: session_id.into(),
        csrf_token: csrf_token.into(),
        client_id: "b2".into(),
        user_id: user_id.into(),
    }
}

#[tokio::test]
async fn test_save_credential_writes_config_and_initializes() {
    let dir = tempdir().unwrap();
    let path = write_config(dir.path());
    let api = Arc::new(FakeApi::default());
    let mut workbench = Workbench::new(&path, connector_for(&api));

    let notice = workbench.perform(credential_action(" new%2C9 ", "j2", "43")).await;
    assert_eq!(notice.level, NoticeLevel::Success, "{}", notice.text);
    assert_eq!(workbench.stage().connection().unwrap().account.uid, 43);

    let config = AppConfig::load(&path).unwrap();
    assert_eq!(config.credential.session_id(), "new%2C9");
    assert_eq!(config.credential.user_id(), "43");
    assert_eq!(config.output_dir, dir.path().join("exports"));
}

#[tokio::test]
async fn test_rejected_credential_leaves_config_and_stage() {
    let dir = tempdir().unwrap();
    let path = write_config(dir.path());
    let before = fs::read_to_string(&path).unwrap();
    let api = Arc::new(FakeApi::default());
    let mut workbench = Workbench::new(&path, connector_rejecting(&api, "bad"));
    workbench.perform(Action::Initialize).await;

    let notice = workbench.perform(credential_action("bad", "j2", "43")).await;
    assert_eq!(notice.level, NoticeLevel::Error);
    assert!(notice.text.contains("认证失败"));
    assert_eq!(fs::read_to_string(&path).unwrap(), before);
    assert_eq!(workbench.stage().connection().unwrap().account.uid, 42);

    // 缺字段时不访问平台
    let calls = api.user_calls.load(Ordering::SeqCst);
    let notice = workbench.perform(credential_action("s", "  ", "43")).await;
    assert!(notice.text.contains("BILI_JCT"));
    assert_eq!(api.user_calls.load(Ordering::SeqCst), calls);
    assert_eq!(fs::read_to_string(&path).unwrap(), before);
}

#[tokio::test]
async fn test_import_config_replaces_file_and_resets_listing() {
    let api = Arc::new(FakeApi::with_videos(sample_videos()));
    let (mut workbench, dir) = listed_workbench(&api).await;
    let path = dir.path().join("config.ini");

    let notice = workbench.perform(Action::ImportConfig("  \n".into())).await;
    assert_eq!(notice.level, NoticeLevel::Warning);
    assert!(matches!(workbench.stage(), Stage::VideosListed { .. }));

    let imported = "[Credential]\nSESSDATA = other%2C1\nBILI_JCT = j\nBUVID3 = b\nDEDEUSERID = 77\n";
    let notice = workbench.perform(Action::ImportConfig(imported.into())).await;
    assert_eq!(notice.level, NoticeLevel::Success, "{}", notice.text);
    assert!(matches!(workbench.stage(), Stage::Initialized { .. }));
    assert_eq!(workbench.stage().connection().unwrap().account.uid, 77);
    assert_eq!(fs::read_to_string(&path).unwrap(), imported);

    // 无法通过校验的内容不写盘
    let notice = workbench
        .perform(Action::ImportConfig("[Credential]\nSESSDATA = x\n".into()))
        .await;
    assert_eq!(notice.level, NoticeLevel::Error);
    assert_eq!(fs::read_to_string(&path).unwrap(), imported);
}
