// main.rs — 程序入口
// 负责初始化异步运行时、日志、解析命令行参数、分发子命令
// 命令行在这里充当宿主启动器，直接在进程内调用 WallpaperProvider

mod cli; // 声明 cli 模块，对应 src/cli.rs

// 初始化多语言支持，嵌入 locales 目录下的所有翻译
rust_i18n::i18n!("locales");

use clap::{CommandFactory, Parser}; // 引入 Parser trait 的 parse() 方法; CommandFactory 用于生成补全脚本
use clap_complete::generate; // 引入补全脚本生成函数
use cli::{Cli, Commands, ConfigAction, EventKind, PrefsAction}; // 引入 CLI 结构体和子命令枚举
use rust_i18n::t; // 引入翻译宏
use splashing::config::AppConfig; // 引入应用配置
use splashing::preferences::Preferences;
use splashing::source::unsplash::UnsplashClient;
use splashing::{
    FilePreferences, PreferenceKey, PreferenceStore, SourceMode, SplashingProvider,
    WallpaperEntry, WallpaperPipeline, WallpaperProvider,
};
use tracing_subscriber::EnvFilter;

type Provider = SplashingProvider<UnsplashClient, FilePreferences>;

/// `#[tokio::main]` 宏将 async main 转换为同步 main + tokio 运行时
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 自动检测系统语言并设置
    let locale = std::env::var("LANG").unwrap_or_else(|_| "en".to_string());
    if locale.starts_with("zh") {
        rust_i18n::set_locale("zh-CN");
    } else {
        rust_i18n::set_locale("en");
    }

    // 解析命令行参数
    let cli = Cli::parse();

    // 读取配置（环境变量 + ~/.config/splashing/config.toml）
    let config = AppConfig::load()?;

    init_tracing(&config.log_level);

    // 根据子命令分发执行逻辑
    match &cli.command {
        Commands::Fetch {
            mode,
            collection,
            query,
            json,
        } => {
            handle_fetch(
                &config,
                mode.as_deref(),
                collection.as_deref(),
                query.as_deref(),
                *json,
            )
            .await?;
        }

        Commands::Event { kind } => {
            handle_event(&config, *kind).await?;
        }

        Commands::Prefs { action } => {
            handle_prefs(&config, action)?;
        }

        Commands::Config { action } => {
            handle_config(&config, action);
        }

        Commands::Completions { shell } => {
            generate(
                *shell,
                &mut Cli::command(),
                "splashing",
                &mut std::io::stdout(),
            );
        }
    }

    Ok(())
}

/// 初始化 tracing 日志，RUST_LOG 优先于配置文件中的 log_level
/// 日志写到 stderr，避免干扰 --json 输出
fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// 组装壁纸提供者：Unsplash 客户端 + 流水线 + 文件偏好设置
fn build_provider(config: &AppConfig) -> Result<Provider, Box<dyn std::error::Error>> {
    let options = config
        .client_options()
        .map_err(|_| t!("error_no_access_key"))?;
    let client = UnsplashClient::new(options)?;
    let preferences = FilePreferences::open(&config.preferences_path)?;

    Ok(SplashingProvider::new(
        WallpaperPipeline::new(client, config.tracking_source.clone()),
        preferences,
    ))
}

/// 处理 fetch 子命令：按偏好（可被参数临时覆盖）拉取一批壁纸
async fn handle_fetch(
    config: &AppConfig,
    mode: Option<&str>,
    collection: Option<&str>,
    query: Option<&str>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let provider = build_provider(config)?;

    let mut settings = provider.preferences().snapshot();
    if let Some(mode) = mode {
        settings.mode = mode.to_string();
    }
    if let Some(collection) = collection {
        settings.params.collection_id = collection.to_string();
    }
    if let Some(query) = query {
        settings.params.search_term = query.to_string();
    }

    if !json {
        println!("{}", t!("fetch_start", mode => settings.mode));
    }

    let entries = provider.pipeline().run(&settings).await;
    print_entries(&entries, json)
}

/// 处理 event 子命令：把事件交给提供者处理
async fn handle_event(
    config: &AppConfig,
    kind: EventKind,
) -> Result<(), Box<dyn std::error::Error>> {
    let provider = build_provider(config)?;
    let entries = provider.get_wallpapers(&kind.to_event()).await;
    print_entries(&entries, false)
}

/// 打印壁纸列表
fn print_entries(entries: &[WallpaperEntry], json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("{}", t!("no_wallpapers"));
        return Ok(());
    }

    for (i, entry) in entries.iter().enumerate() {
        println!(
            "{}",
            t!(
                "entry_info",
                current => i + 1,
                total => entries.len(),
                author => entry.author,
                title => entry.title
            )
        );
        println!("    {}", entry.uri);
        println!("    {}", entry.source);
    }

    println!("{}", t!("fetch_done", count => entries.len()));
    Ok(())
}

/// 处理 prefs 子命令：查看或修改偏好设置（不需要 access key）
fn handle_prefs(
    config: &AppConfig,
    action: &PrefsAction,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = FilePreferences::open(&config.preferences_path)?;

    match action {
        PrefsAction::Show => {
            let settings = store.snapshot();
            println!("{}", t!("prefs_title"));
            println!("{}", t!("prefs_path", path => store.path().display()));
            println!("{}", t!("prefs_mode", mode => settings.mode));
            println!(
                "{}",
                t!("prefs_collection", collection => settings.params.collection_id)
            );
            println!("{}", t!("prefs_search", query => settings.params.search_term));
        }
        PrefsAction::Export => {
            println!("{}", store.export());
        }
        PrefsAction::Import { payload } => {
            store.import(payload)?;
            println!("{}", t!("prefs_imported"));
        }
        PrefsAction::Set { key, value } => {
            let key: PreferenceKey = key.parse()?;
            if key == PreferenceKey::Mode && value.parse::<SourceMode>().is_err() {
                println!("{}", t!("prefs_unknown_mode", mode => value));
            }
            store.set(key, value.clone())?;
            println!("{}", t!("prefs_updated", key => key, value => value));
        }
        PrefsAction::Schema => {
            let schema = schemars::schema_for!(Preferences);
            println!("{}", serde_json::to_string_pretty(&schema)?);
        }
    }
    Ok(())
}

/// 处理 config 子命令：查看配置
fn handle_config(config: &AppConfig, action: &ConfigAction) {
    match action {
        ConfigAction::Show => {
            println!("{}", t!("config_title"));
            println!(
                "{}",
                t!("config_path", path => config.config_path.display())
            );
            let key_state = if config.access_key.is_some() {
                t!("config_key_set")
            } else {
                t!("config_key_missing")
            };
            println!("{}", t!("config_access_key", state => key_state));
            println!("{}", t!("config_base_url", url => config.base_url));
            println!(
                "{}",
                t!("config_count", count => config.images_per_request)
            );
            println!(
                "{}",
                t!(
                    "config_timeouts",
                    connect => config.connect_timeout.as_secs(),
                    read => config.read_timeout.as_secs()
                )
            );
        }
        ConfigAction::Schema => {
            println!("{}", AppConfig::get_schema());
        }
        ConfigAction::Dump => {
            println!("{}", config.to_toml());
        }
    }
}
