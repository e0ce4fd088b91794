// postprocess.rs — 解析结果的后处理
// 给图片 URL 追加渲染参数、给来源页追加跟踪参数，最后打乱顺序

use rand::Rng;
use rand::seq::SliceRandom;

use crate::source::{PhotoRecord, WallpaperEntry, WallpaperKind};
use crate::url::append_query_parameters;

/// Imgix 渲染参数：4K 横屏、jpg、质量 90，按比例缩放不裁剪
pub const IMAGE_OPTIONS: [(&str, &str); 6] = [
    ("q", "90"),
    ("fm", "jpg"),
    ("h", "2160"),
    ("w", "3840"),
    ("dpr", "1"),
    ("fit", "clip"),
];

/// 把 PhotoRecord 转成 WallpaperEntry 并随机排列
pub fn post_process(records: Vec<PhotoRecord>, tracking_source: &str) -> Vec<WallpaperEntry> {
    post_process_with(records, tracking_source, &mut rand::thread_rng())
}

/// 同 [`post_process`]，使用调用方提供的随机数生成器
pub fn post_process_with<R: Rng + ?Sized>(
    records: Vec<PhotoRecord>,
    tracking_source: &str,
    rng: &mut R,
) -> Vec<WallpaperEntry> {
    let tracking = [("utm_source", tracking_source), ("utm_medium", "referral")];

    let mut entries: Vec<WallpaperEntry> = records
        .into_iter()
        .map(|record| WallpaperEntry {
            uri: append_query_parameters(&record.raw_image_url, &IMAGE_OPTIONS),
            kind: WallpaperKind::Image,
            author: record.author_name,
            title: record.description,
            source: append_query_parameters(&record.source_page_url, &tracking),
        })
        .collect();

    entries.shuffle(rng);
    entries
}
