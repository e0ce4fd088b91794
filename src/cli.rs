// cli.rs — 命令行接口定义模块
// 使用 clap 的 derive 模式定义所有子命令和参数

use clap::{Parser, Subcommand, ValueEnum}; // Parser: 解析命令行参数; Subcommand: 定义子命令; ValueEnum: 枚举参数
use clap_complete::Shell; // Shell 枚举：Bash, Zsh, Fish, Elvish, PowerShell
use splashing::Event;

/// Unsplash 壁纸提供者
///
/// 在本地模拟宿主启动器：按事件拉取 Unsplash 壁纸列表，
/// 并管理来源模式、collection ID、搜索关键词等偏好设置。
#[derive(Parser)]
#[command(name = "splashing")]
#[command(version)] // 自动从 Cargo.toml 读取 version 字段
#[command(author)] // 自动从 Cargo.toml 读取 authors 字段（如有）
#[command(about = "Unsplash 壁纸提供者 — 按来源模式拉取一批随机横屏壁纸")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 按当前偏好拉取一批壁纸
    ///
    /// 用法示例:
    ///   splashing fetch
    ///   splashing fetch --mode search --query forest
    ///   splashing fetch --mode collection --collection 317099 --json
    Fetch {
        /// 临时覆盖来源模式 (collection / random / search)
        #[arg(short, long)]
        mode: Option<String>,

        /// 临时覆盖 collection ID
        #[arg(short, long)]
        collection: Option<String>,

        /// 临时覆盖搜索关键词
        #[arg(short, long)]
        query: Option<String>,

        /// 以 JSON 输出结果
        #[arg(long)]
        json: bool,
    },

    /// 模拟宿主发送一个事件
    ///
    /// 用法示例:
    ///   splashing event time-elapsed
    ///   splashing event idle
    Event {
        /// 事件类型
        kind: EventKind,
    },

    /// 偏好设置操作
    ///
    /// 用法示例:
    ///   splashing prefs show
    ///   splashing prefs set mode SEARCH
    ///   splashing prefs import '{"mode":"COLLECTION","collectionID":"317099"}'
    Prefs {
        #[command(subcommand)]
        action: PrefsAction,
    },

    /// 配置管理操作
    ///
    /// 用法示例:
    ///   splashing config show
    ///   splashing config dump
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// 生成 shell 补全脚本（支持 bash, zsh, fish, elvish, powershell）
    ///
    /// 用法示例：
    ///   splashing completions zsh > ~/.zsh/completions/_splashing
    Completions {
        /// 目标 shell 类型
        shell: Shell,
    },
}

/// 可模拟的宿主事件
#[derive(Clone, Copy, ValueEnum)]
pub enum EventKind {
    TimeElapsed,
    NowPlayingChanged,
    CardFocused,
    ProgramCardFocused,
    /// 进入空闲
    Idle,
    /// 退出空闲
    Active,
}

impl EventKind {
    pub fn to_event(self) -> Event {
        match self {
            EventKind::TimeElapsed => Event::TimeElapsed,
            EventKind::NowPlayingChanged => Event::NowPlayingChanged { title: None },
            EventKind::CardFocused => Event::CardFocused { id: String::new() },
            EventKind::ProgramCardFocused => Event::ProgramCardFocused { id: String::new() },
            EventKind::Idle => Event::LauncherIdleModeChanged { is_idle: true },
            EventKind::Active => Event::LauncherIdleModeChanged { is_idle: false },
        }
    }
}

/// 偏好设置操作
#[derive(Subcommand)]
pub enum PrefsAction {
    /// 查看当前偏好设置
    Show,
    /// 以宿主使用的格式导出
    Export,
    /// 从导出格式导入
    Import {
        /// export 输出的 JSON 字符串
        payload: String,
    },
    /// 设置单个值 (mode, collectionID, searchTerm)
    Set {
        key: String,
        value: String,
    },
    /// 生成偏好设置文件对应的 JSON Schema
    Schema,
}

/// 配置管理操作
#[derive(Subcommand)]
pub enum ConfigAction {
    /// 查看当前所有配置简报
    Show,
    /// 生成配置文件对应的 JSON Schema
    Schema,
    /// 以 TOML 格式打印当前完整配置内容
    Dump,
}
