// lib.rs — splashing 库入口
// 为宿主启动器提供 Unsplash 壁纸：按事件拉取壁纸列表，读写用户偏好

pub mod config;
pub mod error;
pub mod pipeline;
pub mod postprocess;
pub mod preferences;
pub mod provider;
pub mod query;
pub mod source;
pub mod url;

pub use error::{Error, FetchError, Result};
pub use pipeline::WallpaperPipeline;
pub use preferences::{FilePreferences, MemoryPreferences, PreferenceKey, PreferenceStore};
pub use provider::{Event, SplashingProvider, WallpaperProvider};
pub use query::{ModeParameters, ModeSettings, SourceMode};
pub use source::{PhotoRecord, PhotoSource, WallpaperEntry, WallpaperKind};
