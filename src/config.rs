// config.rs — 配置管理模块
// 遵循 Unix 风格：优先从 ~/.config/splashing/config.toml 读取配置

use schemars::JsonSchema; // 引入用于生成 JSON Schema 的 trait
use serde::{Deserialize, Serialize}; // 引入序列化与反序列化 trait
use shellexpand::tilde; // 用于展开 ~ 和环境变量
use std::env; // 环境变量模块
use std::fs; // 文件系统模块
use std::path::{Path, PathBuf}; // 路径处理类型
use std::time::Duration;

use crate::error::{Error, Result};
use crate::pipeline::DEFAULT_TRACKING_SOURCE;
use crate::source::unsplash::{ClientOptions, DEFAULT_BASE_URL, DEFAULT_IMAGES_PER_REQUEST};

/// 展开路径中的 ~ 和环境变量，相对路径则相对于 home
fn expand_path(path_str: &str, home: &Path) -> PathBuf {
    let p = PathBuf::from(tilde(path_str).into_owned());
    if p.is_absolute() { p } else { home.join(p) }
}

/// 映射 config.toml 文件内容的嵌套结构体
#[derive(Debug, Deserialize, Serialize, Default, JsonSchema)]
pub struct ConfigFile {
    #[serde(default)]
    common: CommonConfig,
    #[serde(default)]
    source: SourceConfigs,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
struct CommonConfig {
    /// 每次请求的图片数量
    #[serde(default = "default_images_per_request")]
    images_per_request: u32,
    /// 来源链接上 utm_source 跟踪参数的值
    #[serde(default = "default_tracking_source")]
    tracking_source: String,
    /// 偏好设置文件路径 (支持 ~、$HOME 等环境变量，相对路径则相对于 $HOME)
    /// 不配置则默认为 ~/.config/splashing/preferences.toml
    #[serde(default)]
    preferences_path: Option<String>,
    /// 日志级别，RUST_LOG 环境变量优先
    #[serde(default = "default_log_level")]
    log_level: String,
}

impl Default for CommonConfig {
    fn default() -> Self {
        Self {
            images_per_request: default_images_per_request(),
            tracking_source: default_tracking_source(),
            preferences_path: None,
            log_level: default_log_level(),
        }
    }
}

fn default_images_per_request() -> u32 {
    DEFAULT_IMAGES_PER_REQUEST
}
fn default_tracking_source() -> String {
    DEFAULT_TRACKING_SOURCE.to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Deserialize, Serialize, Default, JsonSchema)]
struct SourceConfigs {
    #[serde(default)]
    unsplash: UnsplashConfig,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
struct UnsplashConfig {
    /// Unsplash Access Key，环境变量 UNSPLASH_ACCESS_KEY 优先
    access_key: Option<String>,
    #[serde(default = "default_base_url")]
    base_url: String,
    /// 连接超时（秒）
    #[serde(default = "default_timeout_secs")]
    connect_timeout_secs: u64,
    /// 读取超时（秒）
    #[serde(default = "default_timeout_secs")]
    read_timeout_secs: u64,
}

impl Default for UnsplashConfig {
    fn default() -> Self {
        Self {
            access_key: None,
            base_url: default_base_url(),
            connect_timeout_secs: default_timeout_secs(),
            read_timeout_secs: default_timeout_secs(),
        }
    }
}

/// 应用全局配置项
#[derive(Debug)]
pub struct AppConfig {
    /// Unsplash Access Key (优先级：ENV > TOML)
    pub access_key: Option<String>,
    /// API 基础 URL
    pub base_url: String,
    pub images_per_request: u32,
    pub tracking_source: String,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    /// 偏好设置文件
    pub preferences_path: PathBuf,
    pub log_level: String,
    /// 配置文件所在路径
    pub config_path: PathBuf,
}

impl AppConfig {
    /// 从 ~/.config/splashing/config.toml 初始化配置
    pub fn load() -> Result<Self> {
        let home = env::var("HOME")
            .map_err(|_| Error::Configuration("cannot read $HOME".to_string()))?;
        let home_path = PathBuf::from(home);
        let config_path = home_path
            .join(".config")
            .join("splashing")
            .join("config.toml");

        Self::from_path(config_path, &home_path, env::var("UNSPLASH_ACCESS_KEY").ok())
    }

    /// 从指定文件初始化配置，文件不存在时全部使用默认值
    ///
    /// `env_access_key` 不为空时覆盖文件中的 access_key
    pub fn from_path(
        config_path: PathBuf,
        home: &Path,
        env_access_key: Option<String>,
    ) -> Result<Self> {
        let config_file = Self::load_config_from_file(&config_path)?.unwrap_or_default();

        let access_key = env_access_key
            .filter(|k| !k.is_empty())
            .or(config_file.source.unsplash.access_key);

        // 偏好设置默认与配置文件放在同一目录
        let preferences_path = match config_file.common.preferences_path {
            Some(p) => expand_path(&p, home),
            None => config_path.with_file_name("preferences.toml"),
        };

        Ok(Self {
            access_key,
            base_url: config_file.source.unsplash.base_url,
            images_per_request: config_file.common.images_per_request,
            tracking_source: config_file.common.tracking_source,
            connect_timeout: Duration::from_secs(config_file.source.unsplash.connect_timeout_secs),
            read_timeout: Duration::from_secs(config_file.source.unsplash.read_timeout_secs),
            preferences_path,
            log_level: config_file.common.log_level,
            config_path,
        })
    }

    /// 辅助函数：解析 TOML 配置文件
    fn load_config_from_file(path: &Path) -> Result<Option<ConfigFile>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path)?;
        Ok(Some(toml::from_str(&content)?))
    }

    /// 生成 Unsplash 客户端参数，缺少 access key 时报错
    pub fn client_options(&self) -> Result<ClientOptions> {
        let access_key = self.access_key.clone().ok_or_else(|| {
            Error::Configuration("missing Unsplash access key".to_string())
        })?;

        Ok(ClientOptions {
            access_key,
            base_url: self.base_url.clone(),
            images_per_request: self.images_per_request,
            connect_timeout: self.connect_timeout,
            read_timeout: self.read_timeout,
        })
    }

    /// 获取配置文件的 JSON Schema
    pub fn get_schema() -> String {
        let schema = schemars::schema_for!(ConfigFile);
        serde_json::to_string_pretty(&schema).unwrap_or_default()
    }

    /// 将当前配置转换为 TOML 字符串
    pub fn to_toml(&self) -> String {
        let config_file = ConfigFile {
            common: CommonConfig {
                images_per_request: self.images_per_request,
                tracking_source: self.tracking_source.clone(),
                preferences_path: Some(self.preferences_path.to_string_lossy().to_string()),
                log_level: self.log_level.clone(),
            },
            source: SourceConfigs {
                unsplash: UnsplashConfig {
                    access_key: self.access_key.clone(),
                    base_url: self.base_url.clone(),
                    connect_timeout_secs: self.connect_timeout.as_secs(),
                    read_timeout_secs: self.read_timeout.as_secs(),
                },
            },
        };

        toml::to_string_pretty(&config_file)
            .unwrap_or_else(|_| "# Error serializing config".to_string())
    }
}
