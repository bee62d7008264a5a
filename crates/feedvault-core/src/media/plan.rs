//! Turning an item's image and video lists into download tasks.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::model::Item;
use crate::naming;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    /// Single-file download.
    Image,
    /// Segmented playlist assembled into one file.
    Video,
}

/// One unit of work for the item-scope pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTask {
    pub kind: TaskKind,
    /// Image URL or playlist URL.
    pub url: String,
    pub dest: PathBuf,
    pub headers: HashMap<String, String>,
    /// `<item id>_img<n>` or `<item id>_vid<n>`, for logs.
    pub label: String,
}

/// Plans every task of `item`, images first, numbered from 1 by list position.
///
/// Images without an `origin` display URL and videos whose best variant has
/// no playlist URL produce no task but keep their number.
pub fn plan_item(item: &Item, item_dir: &Path, referer: &str) -> Vec<DownloadTask> {
    let mut headers = HashMap::new();
    if !referer.is_empty() {
        headers.insert("Referer".to_string(), referer.to_string());
    }

    let images = item.images.iter().enumerate().filter_map(|(i, image)| {
        let url = image.origin_url()?;
        let n = i + 1;
        Some(DownloadTask {
            kind: TaskKind::Image,
            url: url.to_string(),
            dest: item_dir.join(naming::image_file_name(&item.title, n, url)),
            headers: headers.clone(),
            label: format!("{}_img{}", item.id, n),
        })
    });

    let videos = item.videos.iter().enumerate().filter_map(|(i, video)| {
        let best = video.best_variant()?;
        let url = best.play_url.as_deref().filter(|u| !u.is_empty())?;
        let n = i + 1;
        Some(DownloadTask {
            kind: TaskKind::Video,
            url: url.to_string(),
            dest: item_dir.join(naming::video_file_name(
                &item.title,
                n,
                best.resolution.as_deref(),
            )),
            headers: headers.clone(),
            label: format!("{}_vid{}", item.id, n),
        })
    });

    images.chain(videos).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item() -> Item {
        serde_json::from_value(json!({
            "id": "900",
            "title": "Trip: day 1",
            "publishedAtTs": 1,
            "imageListSlice": [
                { "displayInfos": [
                    { "style": "thumb", "url": "https://img/t1.webp" },
                    { "style": "origin", "url": "https://img/o1.png?x=1" }
                ]},
                { "displayInfos": [ { "style": "thumb", "url": "https://img/t2.webp" } ] },
                { "displayInfos": [ { "style": "origin", "url": "https://img/o3" } ] }
            ],
            "videoListSlice": [
                { "resolutions": [
                    { "width": 1280, "height": 720, "playURL": "https://v/720.m3u8", "resolution": "720p" },
                    { "width": 1920, "height": 1080, "playURL": "https://v/1080.m3u8", "resolution": "1080p" }
                ]},
                { "resolutions": [ { "width": 1, "height": 1 } ] },
                { "resolutions": [ { "width": 640, "height": 360, "playURL": "https://v/360.m3u8" } ] }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn plans_origin_images_and_best_videos() {
        let dir = Path::new("/a/item");
        let tasks = plan_item(&item(), dir, "https://www.skland.com/");
        let summary: Vec<(TaskKind, &str, &str)> = tasks
            .iter()
            .map(|t| {
                (
                    t.kind,
                    t.url.as_str(),
                    t.dest.file_name().unwrap().to_str().unwrap(),
                )
            })
            .collect();
        assert_eq!(
            summary,
            vec![
                (TaskKind::Image, "https://img/o1.png?x=1", "Trip_ day 1_1.png"),
                (TaskKind::Image, "https://img/o3", "Trip_ day 1_3.jpg"),
                (TaskKind::Video, "https://v/1080.m3u8", "Trip_ day 1_1_1080p.mp4"),
                (TaskKind::Video, "https://v/360.m3u8", "Trip_ day 1_3_high.mp4"),
            ]
        );
        assert_eq!(tasks[0].label, "900_img1");
        assert_eq!(tasks[3].label, "900_vid3");
        assert!(tasks.iter().all(|t| t.dest.starts_with(dir)));
        assert_eq!(
            tasks[2].headers.get("Referer").map(String::as_str),
            Some("https://www.skland.com/")
        );
    }

    #[test]
    fn item_without_media_plans_nothing() {
        let item: Item =
            serde_json::from_value(json!({ "id": 1, "title": "", "publishedAtTs": 0 })).unwrap();
        assert!(plan_item(&item, Path::new("x"), "").is_empty());
    }
}
