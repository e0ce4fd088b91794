// pipeline.rs — 壁纸拉取流水线
// 构建查询 -> HTTP 拉取 -> 解析 -> 后处理，任何一步失败都返回空列表

use std::panic::AssertUnwindSafe;

use futures::FutureExt; // catch_unwind()
use tracing::{debug, error, info, warn};

use crate::error::{Error, Result};
use crate::postprocess::post_process;
use crate::query::{ModeSettings, build_query};
use crate::source::unsplash::parse_photos;
use crate::source::{PhotoSource, WallpaperEntry};

/// 跟踪参数 utm_source 的默认值
pub const DEFAULT_TRACKING_SOURCE: &str = "splashing";

/// 壁纸拉取流水线
///
/// 自身不保存任何可变状态，多次运行（包括并发运行）之间互不影响。
pub struct WallpaperPipeline<S> {
    source: S,
    tracking_source: String,
}

impl<S: PhotoSource> WallpaperPipeline<S> {
    pub fn new(source: S, tracking_source: impl Into<String>) -> Self {
        Self {
            source,
            tracking_source: tracking_source.into(),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// 执行一次完整拉取
    ///
    /// 永远不会返回错误：失败（包括 panic）只会记录日志并得到空列表，
    /// 空列表对宿主来说意味着"不更换壁纸"。
    pub async fn run(&self, settings: &ModeSettings) -> Vec<WallpaperEntry> {
        match AssertUnwindSafe(self.try_run(settings)).catch_unwind().await {
            Ok(Ok(entries)) => {
                info!(count = entries.len(), mode = %settings.mode, "fetched wallpapers");
                entries
            }
            Ok(Err(Error::Configuration(reason))) => {
                debug!(%reason, "skipping wallpaper fetch");
                Vec::new()
            }
            Ok(Err(e)) => {
                warn!(category = e.category(), error = %e, "wallpaper fetch failed");
                Vec::new()
            }
            Err(_) => {
                error!("wallpaper fetch panicked");
                Vec::new()
            }
        }
    }

    /// 内部实现，各阶段的错误原样向上传递
    pub async fn try_run(&self, settings: &ModeSettings) -> Result<Vec<WallpaperEntry>> {
        let query = build_query(&settings.mode, &settings.params).ok_or_else(|| {
            Error::Configuration(format!("unrecognized source mode {:?}", settings.mode))
        })?;

        debug!(?query, "fetching wallpapers");
        let body = self.source.fetch_photos(&query).await?;
        let records = parse_photos(&body)?;

        Ok(post_process(records, &self.tracking_source))
    }
}
