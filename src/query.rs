// query.rs — 根据来源模式构建 Unsplash 查询参数

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// 有序的查询参数列表
pub type QueryParams = Vec<(String, String)>;

/// 壁纸来源模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SourceMode {
    /// 从指定的 Unsplash collection 取图
    Collection,
    /// 完全随机
    Random,
    /// 按关键词搜索
    Search,
}

impl SourceMode {
    /// 偏好设置里保存的名字
    pub fn name(self) -> &'static str {
        match self {
            SourceMode::Collection => "COLLECTION",
            SourceMode::Random => "RANDOM",
            SourceMode::Search => "SEARCH",
        }
    }

    /// 该模式对应的查询参数，只读取与模式匹配的那个字段
    pub fn query_for(self, params: &ModeParameters) -> QueryParams {
        match self {
            SourceMode::Collection => {
                vec![("collections".to_string(), params.collection_id.clone())]
            }
            SourceMode::Random => Vec::new(),
            SourceMode::Search => vec![("query".to_string(), params.search_term.clone())],
        }
    }
}

impl fmt::Display for SourceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SourceMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "COLLECTION" => Ok(SourceMode::Collection),
            "RANDOM" => Ok(SourceMode::Random),
            "SEARCH" => Ok(SourceMode::Search),
            other => Err(format!("unknown source mode: {:?}", other)),
        }
    }
}

/// 各模式的参数
///
/// 两个字段可以同时有值，但只有当前模式对应的那个会被使用
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModeParameters {
    pub collection_id: String,
    pub search_term: String,
}

/// 一次运行开始时拍下的只读快照
///
/// `mode` 保留原始字符串，识别不了的值由 [`build_query`] 处理
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModeSettings {
    pub mode: String,
    pub params: ModeParameters,
}

/// 构建查询参数
///
/// 返回 `None` 表示模式无法识别，本次不应发起任何网络请求
pub fn build_query(mode: &str, params: &ModeParameters) -> Option<QueryParams> {
    let mode: SourceMode = mode.parse().ok()?;
    Some(mode.query_for(params))
}
