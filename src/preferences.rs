// preferences.rs — 用户偏好设置
// 三个字符串：来源模式、collection ID、搜索关键词
//
// 宿主通过 export / import 整体读写，格式为 JSON 对象；
// pipeline 只读取运行开始时的快照。

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard, PoisonError};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::query::{ModeParameters, ModeSettings, SourceMode};

/// 偏好设置的 key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferenceKey {
    Mode,
    CollectionId,
    SearchTerm,
}

impl PreferenceKey {
    pub const ALL: [PreferenceKey; 3] = [
        PreferenceKey::Mode,
        PreferenceKey::CollectionId,
        PreferenceKey::SearchTerm,
    ];

    /// 导出格式中使用的名字
    pub fn name(self) -> &'static str {
        match self {
            PreferenceKey::Mode => "mode",
            PreferenceKey::CollectionId => "collectionID",
            PreferenceKey::SearchTerm => "searchTerm",
        }
    }
}

impl fmt::Display for PreferenceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PreferenceKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "mode" => Ok(PreferenceKey::Mode),
            "collectionID" | "collection_id" | "collection" => Ok(PreferenceKey::CollectionId),
            "searchTerm" | "search_term" | "query" => Ok(PreferenceKey::SearchTerm),
            other => Err(Error::Preferences(format!("unknown preference key: {}", other))),
        }
    }
}

/// 偏好设置内容
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Preferences {
    /// 来源模式 (COLLECTION / RANDOM / SEARCH)
    #[serde(default = "default_mode")]
    pub mode: String,
    /// Unsplash collection ID，仅 COLLECTION 模式使用
    #[serde(default, rename = "collectionID")]
    pub collection_id: String,
    /// 搜索关键词，仅 SEARCH 模式使用
    #[serde(default, rename = "searchTerm")]
    pub search_term: String,
}

fn default_mode() -> String {
    SourceMode::Random.name().to_string()
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            collection_id: String::new(),
            search_term: String::new(),
        }
    }
}

/// 导入时使用的补丁结构，缺失的 key 保持原值
#[derive(Debug, Deserialize)]
struct PreferencesPatch {
    mode: Option<String>,
    #[serde(rename = "collectionID")]
    collection_id: Option<String>,
    #[serde(rename = "searchTerm")]
    search_term: Option<String>,
}

impl Preferences {
    pub fn get(&self, key: PreferenceKey) -> &str {
        match key {
            PreferenceKey::Mode => &self.mode,
            PreferenceKey::CollectionId => &self.collection_id,
            PreferenceKey::SearchTerm => &self.search_term,
        }
    }

    pub fn set(&mut self, key: PreferenceKey, value: String) {
        match key {
            PreferenceKey::Mode => self.mode = value,
            PreferenceKey::CollectionId => self.collection_id = value,
            PreferenceKey::SearchTerm => self.search_term = value,
        }
    }

    /// 导出为 JSON 字符串
    pub fn export(&self) -> String {
        serde_json::json!({
            "mode": self.mode,
            "collectionID": self.collection_id,
            "searchTerm": self.search_term,
        })
        .to_string()
    }

    /// 从 JSON 字符串导入，格式错误时不做任何修改
    pub fn import(&mut self, raw: &str) -> Result<()> {
        let patch: PreferencesPatch = serde_json::from_str(raw)
            .map_err(|e| Error::Preferences(format!("invalid preferences payload: {}", e)))?;

        if let Some(mode) = patch.mode {
            self.mode = mode;
        }
        if let Some(collection_id) = patch.collection_id {
            self.collection_id = collection_id;
        }
        if let Some(search_term) = patch.search_term {
            self.search_term = search_term;
        }
        Ok(())
    }

    /// pipeline 使用的只读快照
    pub fn mode_settings(&self) -> ModeSettings {
        ModeSettings {
            mode: self.mode.clone(),
            params: ModeParameters {
                collection_id: self.collection_id.clone(),
                search_term: self.search_term.clone(),
            },
        }
    }
}

/// 偏好设置存储
///
/// 外部的键值存储，pipeline 只通过 [`PreferenceStore::snapshot`] 读取
pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: PreferenceKey) -> String;

    fn set(&self, key: PreferenceKey, value: String) -> Result<()>;

    /// 整体导出为不透明字符串
    fn export(&self) -> String;

    /// 从 [`PreferenceStore::export`] 的格式导入
    fn import(&self, raw: &str) -> Result<()>;

    /// 一次性读取三个值
    fn snapshot(&self) -> ModeSettings {
        ModeSettings {
            mode: self.get(PreferenceKey::Mode),
            params: ModeParameters {
                collection_id: self.get(PreferenceKey::CollectionId),
                search_term: self.get(PreferenceKey::SearchTerm),
            },
        }
    }
}

fn lock(prefs: &Mutex<Preferences>) -> MutexGuard<'_, Preferences> {
    prefs.lock().unwrap_or_else(PoisonError::into_inner)
}

/// 只保存在内存中的偏好设置
#[derive(Debug, Default)]
pub struct MemoryPreferences {
    prefs: Mutex<Preferences>,
}

impl MemoryPreferences {
    pub fn new(prefs: Preferences) -> Self {
        Self {
            prefs: Mutex::new(prefs),
        }
    }
}

impl PreferenceStore for MemoryPreferences {
    fn get(&self, key: PreferenceKey) -> String {
        lock(&self.prefs).get(key).to_string()
    }

    fn set(&self, key: PreferenceKey, value: String) -> Result<()> {
        lock(&self.prefs).set(key, value);
        Ok(())
    }

    fn export(&self) -> String {
        lock(&self.prefs).export()
    }

    fn import(&self, raw: &str) -> Result<()> {
        lock(&self.prefs).import(raw)
    }

    fn snapshot(&self) -> ModeSettings {
        lock(&self.prefs).mode_settings()
    }
}

/// 保存在 TOML 文件中的偏好设置，每次修改都会写回文件
#[derive(Debug)]
pub struct FilePreferences {
    path: PathBuf,
    prefs: Mutex<Preferences>,
}

impl FilePreferences {
    /// 从文件加载，文件不存在时使用默认值
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let prefs = if path.exists() {
            let content = fs::read_to_string(&path)?;
            toml::from_str(&content)?
        } else {
            debug!(path = %path.display(), "preferences file not found, using defaults");
            Preferences::default()
        };

        Ok(Self {
            path,
            prefs: Mutex::new(prefs),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self, prefs: &Preferences) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, toml::to_string_pretty(prefs)?)?;
        Ok(())
    }

    /// 在锁内修改并写回文件，写入失败时回滚内存中的值
    fn update(&self, change: impl FnOnce(&mut Preferences) -> Result<()>) -> Result<()> {
        let mut guard = lock(&self.prefs);
        let mut next = guard.clone();
        change(&mut next)?;
        self.save(&next)?;
        *guard = next;
        Ok(())
    }
}

impl PreferenceStore for FilePreferences {
    fn get(&self, key: PreferenceKey) -> String {
        lock(&self.prefs).get(key).to_string()
    }

    fn set(&self, key: PreferenceKey, value: String) -> Result<()> {
        self.update(|prefs| {
            prefs.set(key, value);
            Ok(())
        })
    }

    fn export(&self) -> String {
        lock(&self.prefs).export()
    }

    fn import(&self, raw: &str) -> Result<()> {
        self.update(|prefs| prefs.import(raw))
    }

    fn snapshot(&self) -> ModeSettings {
        lock(&self.prefs).mode_settings()
    }
}
