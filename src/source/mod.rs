// source/mod.rs — 壁纸源模块入口
pub mod unsplash;

// 定义了壁纸源必须实现的通用 Trait，以及在各阶段之间流转的数据结构

use async_trait::async_trait; // 异步 Trait 支持宏
use serde::{Deserialize, Serialize};

use crate::error::FetchError;
use crate::query::QueryParams;

/// 解析阶段的中间产物，尚未追加任何渲染 / 跟踪参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoRecord {
    /// 原始图片 URL（Unsplash 的 urls.raw）
    pub raw_image_url: String,
    /// 图片在 Unsplash 上的页面地址（links.html）
    pub source_page_url: String,
    /// 作者名（user.name）
    pub author_name: String,
    /// 图片描述，缺失时为空字符串
    pub description: String,
}

/// 壁纸条目的类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WallpaperKind {
    /// 远程图片
    Image,
    /// 宿主内置的 drawable 资源
    Drawable,
}

/// 交给宿主的最终壁纸条目
///
/// 生成之后不再修改
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WallpaperEntry {
    pub uri: String,
    pub kind: WallpaperKind,
    pub author: String,
    pub title: String,
    pub source: String,
}

/// 壁纸源的抽象 Trait
///
/// 只负责一次 HTTP 拉取并返回原始响应体，
/// 解析和后处理由 pipeline 负责。
#[async_trait]
pub trait PhotoSource: Send + Sync {
    /// 按给定的模式参数请求一批随机图片，返回原始 JSON 文本
    async fn fetch_photos(&self, query: &QueryParams) -> Result<String, FetchError>;
}
