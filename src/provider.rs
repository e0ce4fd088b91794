// provider.rs — 面向宿主启动器的接口
// 宿主按事件请求壁纸，并通过不透明字符串读写偏好设置

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::pipeline::WallpaperPipeline;
use crate::preferences::PreferenceStore;
use crate::source::{PhotoSource, WallpaperEntry};

/// 宿主发来的事件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// 刷新周期到了
    TimeElapsed,
    /// 正在播放的内容变化
    NowPlayingChanged { title: Option<String> },
    /// 焦点卡片变化
    CardFocused { id: String },
    /// 焦点节目卡片变化
    ProgramCardFocused { id: String },
    /// 启动器进入或退出空闲状态
    LauncherIdleModeChanged { is_idle: bool },
}

/// 宿主调用的壁纸提供者接口
#[async_trait]
pub trait WallpaperProvider: Send + Sync {
    /// 返回空列表表示不更换当前壁纸
    async fn get_wallpapers(&self, event: &Event) -> Vec<WallpaperEntry>;

    fn get_preferences(&self) -> String;

    fn set_preferences(&self, params: &str);
}

/// 基于 Unsplash 流水线的壁纸提供者
pub struct SplashingProvider<S, P> {
    pipeline: WallpaperPipeline<S>,
    preferences: P,
}

impl<S, P> SplashingProvider<S, P>
where
    S: PhotoSource,
    P: PreferenceStore,
{
    pub fn new(pipeline: WallpaperPipeline<S>, preferences: P) -> Self {
        Self {
            pipeline,
            preferences,
        }
    }

    pub fn pipeline(&self) -> &WallpaperPipeline<S> {
        &self.pipeline
    }

    pub fn preferences(&self) -> &P {
        &self.preferences
    }
}

#[async_trait]
impl<S, P> WallpaperProvider for SplashingProvider<S, P>
where
    S: PhotoSource,
    P: PreferenceStore,
{
    async fn get_wallpapers(&self, event: &Event) -> Vec<WallpaperEntry> {
        match event {
            Event::TimeElapsed => {
                debug!("Event.TimeElapsed");
                let settings = self.preferences.snapshot();
                self.pipeline.run(&settings).await
            }
            // 其余事件暂不处理，返回空列表不会改变当前壁纸
            other => {
                debug!(event = ?other, "ignoring event");
                Vec::new()
            }
        }
    }

    fn get_preferences(&self) -> String {
        self.preferences.export()
    }

    fn set_preferences(&self, params: &str) {
        if let Err(e) = self.preferences.import(params) {
            warn!(error = %e, "rejected preferences from host");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::tests::FakeSource;
    use crate::preferences::{MemoryPreferences, PreferenceKey};
    use crate::source::unsplash::tests::photo_json;
    use serde_json::json;

    fn provider(body: &str) -> SplashingProvider<FakeSource, MemoryPreferences> {
        SplashingProvider::new(
            WallpaperPipeline::new(FakeSource::ok(body), "splashing"),
            MemoryPreferences::default(),
        )
    }

    #[tokio::test]
    async fn only_time_elapsed_runs_pipeline() {
        let body = json!([photo_json("a", json!("A")), photo_json("b", json!("B"))]).to_string();
        let provider = provider(&body);

        let ignored = [
            Event::NowPlayingChanged { title: None },
            Event::CardFocused { id: "1".into() },
            Event::ProgramCardFocused { id: "2".into() },
            Event::LauncherIdleModeChanged { is_idle: true },
        ];
        for event in &ignored {
            assert!(provider.get_wallpapers(event).await.is_empty());
        }
        assert_eq!(provider.pipeline().source().calls(), 0);

        assert_eq!(provider.get_wallpapers(&Event::TimeElapsed).await.len(), 2);
        assert_eq!(provider.pipeline().source().calls(), 1);
    }

    #[tokio::test]
    async fn uses_preferences_snapshot() {
        let provider = provider("[]");
        provider.set_preferences(r#"{"mode":"COLLECTION","collectionID":"42"}"#);

        provider.get_wallpapers(&Event::TimeElapsed).await;

        let last = provider.pipeline().source().last_query.lock().unwrap().clone();
        assert_eq!(last, Some(vec![("collections".to_string(), "42".to_string())]));
    }

    #[tokio::test]
    async fn unknown_stored_mode_skips_fetch() {
        let provider = provider("[]");
        provider
            .preferences()
            .set(PreferenceKey::Mode, "LIKES".to_string())
            .unwrap();

        assert!(provider.get_wallpapers(&Event::TimeElapsed).await.is_empty());
        assert_eq!(provider.pipeline().source().calls(), 0);
    }

    #[test]
    fn preferences_round_trip_through_host_calls() {
        let provider = provider("[]");
        provider.set_preferences(r#"{"mode":"SEARCH","searchTerm":"tokyo"}"#);
        provider.set_preferences("garbage");

        let exported: serde_json::Value = serde_json::from_str(&provider.get_preferences()).unwrap();
        assert_eq!(exported["mode"], "SEARCH");
        assert_eq!(exported["searchTerm"], "tokyo");
        assert_eq!(exported["collectionID"], "");
    }

    #[test]
    fn events_deserialize_from_tagged_json() {
        let event: Event = serde_json::from_str(r#"{"type":"time_elapsed"}"#).unwrap();
        assert_eq!(event, Event::TimeElapsed);
        let event: Event =
            serde_json::from_str(r#"{"type":"launcher_idle_mode_changed","is_idle":false}"#).unwrap();
        assert_eq!(event, Event::LauncherIdleModeChanged { is_idle: false });
    }
}
