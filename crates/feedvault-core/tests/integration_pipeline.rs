//! Integration test: recorded profile traffic replayed through the archiver,
//! with media served by a local HTTP server.

mod common;

use common::media_server::{MediaServer, Route};
use feedvault_core::config::FeedvaultConfig;
use feedvault_core::pipeline::Archiver;
use feedvault_core::session::har::HarSession;
use serde_json::{json, Value};
use std::io::Write;
use std::path::Path;
use tempfile::tempdir;

const PROFILE_BASE: &str = "https://www.skland.com/profile?id=";

fn record(server: &MediaServer, id: &str, ts: i64, with_media: bool) -> Value {
    let (images, videos) = if with_media {
        (
            json!([
                { "displayInfos": [
                    { "style": "thumbnail", "url": server.url("/img/thumb.webp") },
                    { "style": "origin", "url": server.url("/img/origin.png") }
                ]},
                { "displayInfos": [ { "style": "origin", "url": server.url("/img/missing.png") } ] }
            ]),
            json!([
                { "resolutions": [
                    { "width": 640, "height": 360, "playURL": server.url("/v/360.m3u8"), "resolution": "360p" },
                    { "width": 1920, "height": 1080, "playURL": server.url("/v/1080.m3u8"), "resolution": "1080p" }
                ]}
            ]),
        )
    } else {
        (json!([]), json!([]))
    };
    json!({
        "item": {
            "id": id,
            "title": format!("post {}", id),
            "publishedAtTs": ts,
            "timestamp": ts,
            "imageListSlice": images,
            "videoListSlice": videos
        },
        "user": { "id": 9001, "nickname": "Amiya" }
    })
}

fn feed_page(list: Vec<Value>) -> String {
    json!({ "code": 0, "message": "OK", "data": { "list": list } }).to_string()
}

fn entry(url: &str, text: String) -> Value {
    json!({
        "pageref": "page_1",
        "request": { "method": "GET", "url": url },
        "response": { "status": 200, "headers": [], "content": { "text": text } }
    })
}

fn write_har(dir: &Path, server: &MediaServer) -> std::path::PathBuf {
    let har = json!({ "log": {
        "version": "1.2",
        "pages": [ { "id": "page_1", "title": format!("{}9001", PROFILE_BASE) } ],
        "entries": [
            entry("https://www.skland.com/static/app.js", "void 0".to_string()),
            entry(
                "https://zonai.skland.com/web/v1/user/items?userId=9001&pageSize=10",
                feed_page(vec![record(server, "11", 1_700_000_100, false), record(server, "12", 1_700_000_300, true)])
            ),
            entry(
                "https://zonai.skland.com/web/v1/user/items?userId=9001&pageToken=2",
                feed_page(vec![record(server, "13", 1_700_000_200, false)])
            ),
            entry(
                "https://zonai.skland.com/web/v1/user/items?userId=9001&pageToken=3",
                json!({ "code": 10001, "message": "rate limited" }).to_string()
            )
        ]
    }});
    let path = dir.join("profile.har");
    let mut f = std::fs::File::create(&path).unwrap();
    f.write_all(har.to_string().as_bytes()).unwrap();
    path
}

fn config(root: &Path) -> FeedvaultConfig {
    FeedvaultConfig {
        storage_root: root.to_path_buf(),
        profile_url_base: PROFILE_BASE.to_string(),
        idle_timeout_secs: 0,
        poll_interval_ms: 5,
        initial_load_secs: 0,
        item_workers: 2,
        segment_workers: 4,
        ..FeedvaultConfig::default()
    }
}

#[test]
fn profile_is_archived_and_rerun_is_idempotent() {
    let server = MediaServer::start(vec![
        ("/img/origin.png", Route::ok(b"PNGDATA".to_vec())),
        ("/v/1080.m3u8", Route::ok(
            "#EXTM3U\n#EXT-X-TARGETDURATION:2\n#EXTINF:2.0,\nhd0.ts\n#EXTINF:2.0,\nhd1.ts\n#EXT-X-ENDLIST\n"
                .as_bytes()
                .to_vec(),
        )),
        ("/v/hd0.ts", Route::ok(b"[hd0]".to_vec())),
        ("/v/hd1.ts", Route::ok(b"[hd1]".to_vec())),
    ]);
    let work = tempdir().unwrap();
    let root = work.path().join("archive");
    let har_path = write_har(work.path(), &server);
    let archiver = Archiver::from_config(&config(&root));

    let mut session = HarSession::open(&har_path).unwrap().with_entries_per_scroll(2);
    let report = archiver.run_profile(&mut session, "9001").unwrap();
    assert_eq!(report.records, 3);
    // origin.png and the video succeed; missing.png is a 404.
    assert_eq!(report.tasks_ok, 2);
    assert_eq!(report.tasks_failed, 1);

    let profile_dir = root.join("Amiya_9001");
    assert_eq!(report.profile_dir.as_deref(), Some(profile_dir.as_path()));
    let archived: Vec<Value> =
        serde_json::from_slice(&std::fs::read(profile_dir.join("feed_9001.json")).unwrap()).unwrap();
    let ids: Vec<&str> = archived
        .iter()
        .map(|r| r["item"]["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["12", "13", "11"]);

    let item_dir = std::fs::read_dir(&profile_dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .find(|p| p.is_dir() && p.to_string_lossy().ends_with("_post 12_12"))
        .expect("item directory for 12");
    assert!(item_dir.join("post 12_12.json").is_file());
    assert_eq!(std::fs::read(item_dir.join("post 12_1.png")).unwrap(), b"PNGDATA");
    assert!(!item_dir.join("post 12_2.png").exists());
    assert_eq!(
        std::fs::read(item_dir.join("post 12_1_1080p.mp4")).unwrap(),
        b"[hd0][hd1]"
    );
    assert_eq!(server.hits("/img/thumb.webp"), 0);
    assert_eq!(server.hits("/v/360.m3u8"), 0);
    assert_eq!(
        server.referer("/v/hd0.ts").as_deref(),
        Some("https://www.skland.com/")
    );

    // Rerun: completed media is not requested again; only the failed image retries.
    let before = server.total_hits();
    let mut session = HarSession::open(&har_path).unwrap().with_entries_per_scroll(2);
    let again = archiver.run_profile(&mut session, "9001").unwrap();
    assert_eq!(again.records, 3);
    assert_eq!(server.total_hits(), before + 1);
    assert_eq!(server.hits("/img/missing.png"), 2);
}

#[test]
fn unknown_profile_is_skipped_and_next_runs() {
    let server = MediaServer::start(vec![]);
    let work = tempdir().unwrap();
    let root = work.path().join("archive");
    let har_path = write_har(work.path(), &server);
    let archiver = Archiver::from_config(&config(&root));

    let mut session = HarSession::open(&har_path).unwrap();
    let reports = archiver.run_profiles(&mut session, &["1".to_string(), "9001".to_string()]);
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].profile_id, "9001");
    assert_eq!(reports[0].records, 3);
}
