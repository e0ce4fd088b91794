// error.rs — 错误类型模块
// 库内部各阶段都返回结构化错误，只有 pipeline 边界才把错误吞掉变成空列表

use thiserror::Error;

/// 库内统一的 Result 别名
pub type Result<T> = std::result::Result<T, Error>;

/// HTTP 拉取阶段的错误
///
/// 对应 Unsplash 单次 GET 请求可能出现的几类失败
#[derive(Debug, Error)]
pub enum FetchError {
    /// 连接或读取超时
    #[error("request timed out")]
    Timeout,

    /// 无法建立连接（拒绝连接、DNS 失败等）
    #[error("connection failed: {0}")]
    Connect(String),

    /// 服务端返回非 2xx 状态码
    #[error("HTTP error code: {0}")]
    HttpStatus(u16),

    /// 拼接出来的请求 URL 不合法
    #[error("invalid request URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// 其他传输层错误（读取响应体失败、客户端构建失败等）
    #[error("transport error: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else if e.is_connect() {
            FetchError::Connect(e.to_string())
        } else if let Some(status) = e.status() {
            FetchError::HttpStatus(status.as_u16())
        } else {
            FetchError::Transport(e.to_string())
        }
    }
}

/// 库的主错误类型
#[derive(Debug, Error)]
pub enum Error {
    /// 配置错误：未知的 mode、缺失的 access key 等
    #[error("configuration error: {0}")]
    Configuration(String),

    /// 网络或协议错误
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// 响应体不是合法 JSON
    #[error("malformed data: {0}")]
    MalformedData(#[from] serde_json::Error),

    /// 偏好设置读写错误（未知的 key、导入格式不对等）
    #[error("preferences error: {0}")]
    Preferences(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

impl Error {
    /// 错误所属的大类，用于日志里的 `category` 字段
    pub fn category(&self) -> &'static str {
        match self {
            Error::Configuration(_) => "configuration",
            Error::Fetch(FetchError::HttpStatus(_)) => "protocol",
            Error::Fetch(_) => "network",
            Error::MalformedData(_) => "malformed_data",
            Error::Preferences(_) => "preferences",
            Error::Io(_) | Error::TomlDe(_) | Error::TomlSer(_) => "io",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_follow_taxonomy() {
        assert_eq!(
            Error::Configuration("mode".into()).category(),
            "configuration"
        );
        assert_eq!(Error::from(FetchError::Timeout).category(), "network");
        assert_eq!(
            Error::from(FetchError::Connect("refused".into())).category(),
            "network"
        );
        assert_eq!(
            Error::from(FetchError::HttpStatus(500)).category(),
            "protocol"
        );

        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(Error::from(json_err).category(), "malformed_data");
    }

    #[test]
    fn http_status_message_includes_code() {
        assert_eq!(
            FetchError::HttpStatus(403).to_string(),
            "HTTP error code: 403"
        );
    }
}
