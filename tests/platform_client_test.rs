// tests/platform_client_test.rs

use bili_harvest::{
    config::AppConfig,
    error::{AppError, ErrorKind},
    platform::{BiliClient, PlatformApi},
};
use mockito::{Matcher, Mock, ServerGuard};
use serde_json::{Value, json};

async fn nav_mock(server: &mut ServerGuard) -> Mock {
    // 未登录时 nav 返回 -101，但依然带有 wbi_img
    server
        .mock("GET", "/x/web-interface/nav")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "code": -101,
                "message": "账号未登录",
                "data": {
                    "isLogin": false,
                    "wbi_img": {
                        "img_url": "https://i0.hdslb.com/bfs/wbi/7cd084941338484aae1ad9425b84077c.png",
                        "sub_url": "https://i0.hdslb.com/bfs/wbi/4932caff0ff746eab6f01bf08b70ac45.png"
                    }
                }
            })
            .to_string(),
        )
        .create_async()
        .await
}

fn ok_body(data: Value) -> String {
    json!({ "code": 0, "message": "0", "data": data }).to_string()
}

fn arc_item(index: u32) -> Value {
    json!({
        "bvid": format!("BV1xx411c{:03}", index),
        "aid": 1000 + index,
        "title": format!("视频 {}", index),
        "description": "简介",
        "pic": "",
        "created": 1_700_000_000 - i64::from(index) * 86_400,
        "length": "03:20",
        "play": 100 + index
    })
}

fn client_for(server: &ServerGuard) -> BiliClient {
    BiliClient::new(&AppConfig::for_tests(&server.url())).expect("client should build")
}

#[tokio::test]
async fn test_user_with_fewer_videos_than_page_size_returns_all() {
    let mut server = mockito::Server::new_async().await;
    let nav = nav_mock(&mut server).await;
    let list = server
        .mock("GET", "/x/space/wbi/arc/search")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("mid".into(), "123".into()),
            Matcher::UrlEncoded("ps".into(), "15".into()),
            Matcher::UrlEncoded("pn".into(), "1".into()),
            Matcher::UrlEncoded("order".into(), "pubdate".into()),
            Matcher::Regex("w_rid=[0-9a-f]{32}".into()),
        ]))
        .with_status(200)
        .with_body(ok_body(json!({
            "list": { "vlist": (0..10).map(arc_item).collect::<Vec<_>>() },
            "page": { "pn": 1, "ps": 15, "count": 10 }
        })))
        .expect(1)
        .create_async()
        .await;

    let videos = client_for(&server).get_user_videos(123, 15).await.unwrap();

    assert_eq!(videos.len(), 10);
    assert_eq!(videos[0].bvid, "BV1xx411c000");
    assert!(videos.windows(2).all(|w| w[0].pubdate >= w[1].pubdate));
    assert_eq!(videos[3].created_str, "2023-11-12 06:13:20");
    nav.assert_async().await;
    list.assert_async().await;
}

#[tokio::test]
async fn test_listing_skips_duplicates_and_stops_at_page_size() {
    let mut server = mockito::Server::new_async().await;
    let _nav = nav_mock(&mut server).await;

    // 第一页有两条重复，只得到 8 个不同的视频
    let mut first: Vec<Value> = (0..8).map(arc_item).collect();
    first.push(arc_item(0));
    first.push(arc_item(1));
    let page1 = server
        .mock("GET", "/x/space/wbi/arc/search")
        .match_query(Matcher::UrlEncoded("pn".into(), "1".into()))
        .with_status(200)
        .with_body(ok_body(json!({
            "list": { "vlist": first },
            "page": { "pn": 1, "ps": 10, "count": 30 }
        })))
        .expect(1)
        .create_async()
        .await;
    let page2 = server
        .mock("GET", "/x/space/wbi/arc/search")
        .match_query(Matcher::UrlEncoded("pn".into(), "2".into()))
        .with_status(200)
        .with_body(ok_body(json!({
            "list": { "vlist": (8..18).map(arc_item).collect::<Vec<_>>() },
            "page": { "pn": 2, "ps": 10, "count": 30 }
        })))
        .expect(1)
        .create_async()
        .await;

    let videos = client_for(&server).get_user_videos(42, 10).await.unwrap();

    assert_eq!(videos.len(), 10);
    let unique: std::collections::HashSet<_> = videos.iter().map(|v| v.bvid.as_str()).collect();
    assert_eq!(unique.len(), 10);
    assert_eq!(videos[8].bvid, "BV1xx411c008");
    page1.assert_async().await;
    page2.assert_async().await;
}

#[tokio::test]
async fn test_page_size_out_of_range_is_rejected_before_any_request() {
    let mut server = mockito::Server::new_async().await;
    let nav = server
        .mock("GET", "/x/web-interface/nav")
        .expect(0)
        .create_async()
        .await;

    let client = client_for(&server);
    for page_size in [9, 51] {
        let err = client.get_user_videos(123, page_size).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Input);
    }
    let err = client.get_user_videos(0, 20).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Input);
    nav.assert_async().await;
}

#[tokio::test]
async fn test_user_info_combines_profile_and_relation_stat() {
    let mut server = mockito::Server::new_async().await;
    let _nav = nav_mock(&mut server).await;
    let _info = server
        .mock("GET", "/x/space/wbi/acc/info")
        .match_query(Matcher::UrlEncoded("mid".into(), "2".into()))
        .with_status(200)
        .with_body(ok_body(json!({
            "mid": 2, "name": "碧诗", "face": "https://i0.hdslb.com/face.jpg",
            "sign": "kami.im", "level": 6, "sex": "男"
        })))
        .create_async()
        .await;
    let _stat = server
        .mock("GET", "/x/relation/stat")
        .match_query(Matcher::UrlEncoded("vmid".into(), "2".into()))
        .with_status(200)
        .with_body(ok_body(json!({ "mid": 2, "following": 46, "follower": 1_080_000 })))
        .create_async()
        .await;

    let user = client_for(&server).get_user_info(2).await.unwrap();
    assert_eq!(user.uid, 2);
    assert_eq!(user.name, "碧诗");
    assert_eq!(user.level, 6);
    assert_eq!(user.follower, 1_080_000);
    assert_eq!(user.following, 46);
}

#[tokio::test]
async fn test_rejected_credentials_map_to_auth_error() {
    let mut server = mockito::Server::new_async().await;
    let _nav = nav_mock(&mut server).await;
    let _info = server
        .mock("GET", "/x/space/wbi/acc/info")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(json!({ "code": -101, "message": "账号未登录", "ttl": 1 }).to_string())
        .create_async()
        .await;

    let err = client_for(&server).get_user_info(2).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Auth);
    assert!(matches!(err, AppError::AuthRejected { code: -101, .. }));
}

#[tokio::test]
async fn test_unknown_user_maps_to_not_found() {
    let mut server = mockito::Server::new_async().await;
    let _nav = nav_mock(&mut server).await;
    let _info = server
        .mock("GET", "/x/space/wbi/acc/info")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(json!({ "code": -404, "message": "啥都木有", "data": null }).to_string())
        .create_async()
        .await;

    let err = client_for(&server).get_user_info(999_999_999).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_video_details_are_flattened() {
    let mut server = mockito::Server::new_async().await;
    let view = server
        .mock("GET", "/x/web-interface/view")
        .match_query(Matcher::UrlEncoded("bvid".into(), "BV1xx411c7mD".into()))
        .with_status(200)
        .with_body(ok_body(json!({
            "bvid": "BV1xx411c7mD",
            "aid": 170001,
            "title": "【MV】保加利亚妖王",
            "desc": "视频简介",
            "dynamic": "#动态#",
            "pubdate": 1_700_000_000,
            "duration": 212,
            "owner": { "mid": 2, "name": "碧诗" },
            "stat": {
                "view": 12345, "danmaku": 678, "reply": 90, "favorite": 111,
                "coin": 222, "share": 33, "like": 4444
            }
        })))
        .expect(1)
        .create_async()
        .await;

    let detail = client_for(&server)
        .get_video_details("BV1xx411c7mD")
        .await
        .unwrap();

    assert_eq!(detail.bvid, "BV1xx411c7mD");
    assert_eq!(detail.description, "视频简介");
    assert_eq!(detail.dynamic, "#动态#");
    assert_eq!(detail.pubdate_str, "2023-11-15 06:13:20");
    assert_eq!(detail.duration, 212);
    assert_eq!(
        (detail.view, detail.danmaku, detail.like, detail.coin, detail.favorite, detail.share),
        (12345, 678, 4444, 222, 111, 33)
    );
    view.assert_async().await;
}

#[tokio::test]
async fn test_missing_video_maps_to_not_found() {
    let mut server = mockito::Server::new_async().await;
    let _view = server
        .mock("GET", "/x/web-interface/view")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(json!({ "code": -404, "message": "啥都木有", "ttl": 1 }).to_string())
        .create_async()
        .await;

    let err = client_for(&server)
        .get_video_details("BV1zz411c7zZ")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_invalid_bvid_makes_no_request() {
    let mut server = mockito::Server::new_async().await;
    let view = server
        .mock("GET", "/x/web-interface/view")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let err = client_for(&server)
        .get_video_details("av170001")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidBvid(_)));
    assert_eq!(err.kind(), ErrorKind::NotFound);
    view.assert_async().await;
}

#[tokio::test]
async fn test_server_error_is_network_error_and_not_retried() {
    let mut server = mockito::Server::new_async().await;
    let view = server
        .mock("GET", "/x/web-interface/view")
        .match_query(Matcher::Any)
        .with_status(502)
        .with_body("Bad Gateway")
        .expect(1)
        .create_async()
        .await;

    let err = client_for(&server)
        .get_video_details("BV1xx411c7mD")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Network);
    view.assert_async().await;
}

async fn view_for_comments(server: &mut ServerGuard) -> Mock {
    server
        .mock("GET", "/x/web-interface/view")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(ok_body(json!({ "bvid": "BV1xx411c7mD", "aid": 170001, "stat": {} })))
        .create_async()
        .await
}

fn reply(rpid: u64, name: &str, text: &str) -> Value {
    json!({
        "rpid": rpid,
        "mid": rpid + 10,
        "ctime": 1_700_000_000,
        "like": 3,
        "rcount": 1,
        "member": { "uname": name, "level_info": { "current_level": 5 } },
        "content": { "message": text },
        "reply_control": { "location": "IP属地：上海" }
    })
}

#[tokio::test]
async fn test_comments_follow_pages_until_exhausted() {
    let mut server = mockito::Server::new_async().await;
    let _view = view_for_comments(&mut server).await;
    let page1 = server
        .mock("GET", "/x/v2/reply")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("type".into(), "1".into()),
            Matcher::UrlEncoded("oid".into(), "170001".into()),
            Matcher::UrlEncoded("sort".into(), "0".into()),
            Matcher::UrlEncoded("pn".into(), "1".into()),
        ]))
        .with_status(200)
        .with_body(ok_body(json!({
            "page": { "num": 1, "size": 2, "count": 3 },
            "replies": [reply(1, "甲", "第一"), reply(2, "乙", "第二")]
        })))
        .expect(1)
        .create_async()
        .await;
    let page2 = server
        .mock("GET", "/x/v2/reply")
        .match_query(Matcher::UrlEncoded("pn".into(), "2".into()))
        .with_status(200)
        .with_body(ok_body(json!({
            "page": { "num": 2, "size": 2, "count": 3 },
            "replies": [reply(3, "丙", "第三")]
        })))
        .expect(1)
        .create_async()
        .await;

    let comments = client_for(&server)
        .get_video_comments("BV1xx411c7mD", 5)
        .await
        .unwrap();

    let authors: Vec<&str> = comments.iter().map(|c| c.author.as_str()).collect();
    assert_eq!(authors, vec!["甲", "乙", "丙"]);
    assert_eq!(comments[0].content, "第一");
    assert_eq!(comments[0].level, 5);
    assert_eq!(comments[0].timestamp, "2023-11-15 06:13:20");
    assert_eq!(comments[2].location, "IP属地：上海");
    page1.assert_async().await;
    page2.assert_async().await;
}

#[tokio::test]
async fn test_comments_respect_max_pages_and_empty_pages() {
    let mut server = mockito::Server::new_async().await;
    let _view = view_for_comments(&mut server).await;
    let page1 = server
        .mock("GET", "/x/v2/reply")
        .match_query(Matcher::UrlEncoded("pn".into(), "1".into()))
        .with_status(200)
        .with_body(ok_body(json!({
            "page": { "num": 1, "size": 1, "count": 100 },
            "replies": [reply(1, "甲", "第一")]
        })))
        .expect(2)
        .create_async()
        .await;
    let page2 = server
        .mock("GET", "/x/v2/reply")
        .match_query(Matcher::UrlEncoded("pn".into(), "2".into()))
        .with_status(200)
        .with_body(ok_body(json!({ "page": { "num": 2, "size": 1, "count": 100 }, "replies": null })))
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server);
    let one_page = client.get_video_comments("BV1xx411c7mD", 1).await.unwrap();
    assert_eq!(one_page.len(), 1);

    // 第二页为空时提前停止，不会继续请求第三页
    let all = client.get_video_comments("BV1xx411c7mD", 10).await.unwrap();
    assert_eq!(all.len(), 1);

    assert!(client.get_video_comments("BV1xx411c7mD", 0).await.unwrap().is_empty());
    page1.assert_async().await;
    page2.assert_async().await;
}
