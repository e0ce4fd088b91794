// unsplash.rs — Unsplash API 异步客户端模块
// 负责与 Unsplash API 交互：请求随机图片并把响应解析成 PhotoRecord
//
// 注意：Unsplash 要求使用 `Authorization: Client-ID <key>` 认证，
// 并建议带上 `Accept-Version: v1` 固定 API 版本。

use super::{PhotoRecord, PhotoSource};
use crate::error::{FetchError, Result};
use crate::query::QueryParams;
use crate::url::append_query_parameters;
use async_trait::async_trait;
use serde::Deserialize; // 反序列化 trait，用于将 JSON 转为 Rust 结构体
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Unsplash API 默认地址
pub const DEFAULT_BASE_URL: &str = "https://api.unsplash.com";

/// 默认连接 / 读取超时
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// 单次请求的图片数量
pub const DEFAULT_IMAGES_PER_REQUEST: u32 = 10;

/// 单张图片的数据结构
///
/// 只提取我们需要的字段，JSON 中多余的字段会被 serde 自动忽略
#[derive(Deserialize, Debug)]
struct Photo {
    /// 作者信息
    user: PhotoUser,

    /// 各尺寸图片 URL 集合
    urls: PhotoUrls,

    /// 图片相关链接
    links: PhotoLinks,

    /// 图片描述，可能缺失、为 null，这里不限制类型
    #[serde(default)]
    description: Value,
}

#[derive(Deserialize, Debug)]
struct PhotoUser {
    name: String,
}

/// 图片 URL 集合
#[derive(Deserialize, Debug)]
struct PhotoUrls {
    /// 原始图片 URL，不带任何处理参数
    /// 可追加 &w=3840&h=2160&fit=clip 等 Imgix 参数自定义尺寸
    raw: String,
}

/// 图片链接集合
#[derive(Deserialize, Debug)]
struct PhotoLinks {
    /// 图片在 Unsplash 网站上的页面
    html: String,
}

/// 客户端参数
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Unsplash Access Key（必填，用于 Authorization header）
    pub access_key: String,
    /// API 基础 URL
    pub base_url: String,
    /// 每次请求的图片数量（对应 count 参数）
    pub images_per_request: u32,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
}

impl ClientOptions {
    /// 使用默认地址和超时创建参数
    pub fn new(access_key: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            images_per_request: DEFAULT_IMAGES_PER_REQUEST,
            connect_timeout: DEFAULT_TIMEOUT,
            read_timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Unsplash API 异步客户端
///
/// 封装了 reqwest::Client 和 API 配置。
/// reqwest::Client 内部有连接池，可以在并发的多次运行之间共享。
pub struct UnsplashClient {
    /// HTTP 客户端（内部有连接池，应复用）
    client: reqwest::Client,

    /// API 基础 URL
    base_url: String,

    /// Unsplash Access Key
    access_key: String,

    /// 每次请求的图片数量
    images_per_request: u32,
}

impl UnsplashClient {
    /// 创建新的 Unsplash 客户端
    ///
    /// 连接超时和读取超时分别生效，同时用两者之和作为整个请求的上限
    pub fn new(options: ClientOptions) -> std::result::Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .connect_timeout(options.connect_timeout)
            .read_timeout(options.read_timeout)
            .timeout(options.connect_timeout + options.read_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: options.base_url.trim_end_matches('/').to_string(),
            access_key: options.access_key,
            images_per_request: options.images_per_request,
        })
    }

    /// Unsplash 使用 "Client-ID <key>" 格式，而非 Bearer token
    fn auth_header(&self) -> String {
        format!("Client-ID {}", self.access_key)
    }

    /// 拼出最终的请求 URL：模式参数在前，固定参数在后
    pub fn request_url(&self, query: &QueryParams) -> String {
        let mut params = query.clone();
        params.push(("count".to_string(), self.images_per_request.to_string()));
        params.push(("content_filter".to_string(), "high".to_string()));
        params.push(("orientation".to_string(), "landscape".to_string()));

        let endpoint = format!("{}/photos/random", self.base_url);
        append_query_parameters(&endpoint, &params)
    }
}

#[async_trait]
impl PhotoSource for UnsplashClient {
    async fn fetch_photos(&self, query: &QueryParams) -> std::result::Result<String, FetchError> {
        let url = self.request_url(query);
        let parsed = reqwest::Url::parse(&url).map_err(|e| FetchError::InvalidUrl {
            url: url.clone(),
            reason: e.to_string(),
        })?;

        debug!(%url, "fetching wallpapers from unsplash");

        // 只尝试一次，不做重试
        let response = self
            .client
            .get(parsed)
            .header(reqwest::header::AUTHORIZATION, self.auth_header())
            .header("Accept-Version", "v1")
            .send()
            .await
            .map_err(classify)?;

        // 非 2xx 直接返回，response 在这里被 drop，连接随之释放
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        // text() 消费 response，读完或出错时连接都会被释放
        response.text().await.map_err(classify)
    }
}

/// 把 reqwest 错误归类，读取阶段的 io 超时也算作 Timeout
fn classify(e: reqwest::Error) -> FetchError {
    let mut source = std::error::Error::source(&e);
    while let Some(err) = source {
        if let Some(io) = err.downcast_ref::<std::io::Error>() {
            if io.kind() == std::io::ErrorKind::TimedOut {
                return FetchError::Timeout;
            }
        }
        source = std::error::Error::source(err);
    }
    FetchError::from(e)
}

/// 把响应体解析成 PhotoRecord 列表
///
/// - 不是合法 JSON：返回 `Error::MalformedData`
/// - 顶层不是数组或数组为空：返回空列表
/// - 单个元素缺字段或类型不对：跳过该元素并记录 warn，继续解析其余元素
pub fn parse_photos(body: &str) -> Result<Vec<PhotoRecord>> {
    let value: Value = serde_json::from_str(body)?;

    let Value::Array(items) = value else {
        debug!("unsplash response is not a JSON array");
        return Ok(Vec::new());
    };

    let total = items.len();
    let mut records = Vec::with_capacity(total);
    for (index, item) in items.into_iter().enumerate() {
        match photo_record(item) {
            Ok(record) => records.push(record),
            Err(reason) => warn!(index, %reason, "skipping malformed photo record"),
        }
    }

    debug!(parsed = records.len(), total, "parsed unsplash response");
    Ok(records)
}

/// 从单个数组元素中提取字段
fn photo_record(item: Value) -> std::result::Result<PhotoRecord, String> {
    let photo: Photo = serde_json::from_value(item).map_err(|e| e.to_string())?;

    // 最终的 uri 必须是绝对 URL
    reqwest::Url::parse(&photo.urls.raw)
        .map_err(|e| format!("urls.raw is not an absolute URL: {}", e))?;

    Ok(PhotoRecord {
        raw_image_url: photo.urls.raw,
        source_page_url: photo.links.html,
        author_name: photo.user.name,
        description: photo.description.as_str().unwrap_or_default().to_string(),
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Instant;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// 构造一条 Unsplash 风格的图片 JSON
    pub(crate) fn photo_json(id: &str, description: Value) -> Value {
        json!({
            "id": id,
            "description": description,
            "user": { "name": format!("Author {}", id) },
            "urls": {
                "raw": format!("https://images.unsplash.com/photo-{}?ixid=abc", id),
                "full": format!("https://images.unsplash.com/photo-{}?q=80", id),
            },
            "links": { "html": format!("https://unsplash.com/photos/{}", id) },
        })
    }

    fn options(server: &MockServer) -> ClientOptions {
        ClientOptions {
            base_url: server.uri(),
            ..ClientOptions::new("test-key")
        }
    }

    #[test]
    fn parses_well_formed_array() {
        let body = json!([
            photo_json("a", json!("Snowy peaks")),
            photo_json("b", Value::Null),
        ])
        .to_string();

        let records = parse_photos(&body).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0],
            PhotoRecord {
                raw_image_url: "https://images.unsplash.com/photo-a?ixid=abc".to_string(),
                source_page_url: "https://unsplash.com/photos/a".to_string(),
                author_name: "Author a".to_string(),
                description: "Snowy peaks".to_string(),
            }
        );
        assert_eq!(records[1].description, "");
    }

    #[test]
    fn missing_description_is_empty() {
        let mut photo = photo_json("c", Value::Null);
        photo.as_object_mut().unwrap().remove("description");
        let records = parse_photos(&json!([photo]).to_string()).unwrap();
        assert_eq!(records[0].description, "");
    }

    #[test]
    fn skips_record_missing_raw_url() {
        let mut broken = photo_json("b", json!("x"));
        broken["urls"].as_object_mut().unwrap().remove("raw");
        let body = json!([photo_json("a", json!("x")), broken, photo_json("c", json!("x"))]);

        let records = parse_photos(&body.to_string()).unwrap();
        let authors: Vec<_> = records.iter().map(|r| r.author_name.as_str()).collect();
        assert_eq!(authors, vec!["Author a", "Author c"]);
    }

    #[test]
    fn skips_records_with_wrong_types_or_relative_urls() {
        let mut wrong_type = photo_json("b", json!("x"));
        wrong_type["user"]["name"] = json!(42);
        let mut relative = photo_json("c", json!("x"));
        relative["urls"]["raw"] = json!("/photo-c");

        let body = json!([wrong_type, relative, "not an object", photo_json("d", json!("x"))]);
        let records = parse_photos(&body.to_string()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].author_name, "Author d");
    }

    #[test]
    fn non_array_or_empty_body_yields_nothing() {
        assert!(parse_photos(r#"{"errors":["Rate Limit Exceeded"]}"#).unwrap().is_empty());
        assert!(parse_photos("[]").unwrap().is_empty());
        assert!(parse_photos("\"text\"").unwrap().is_empty());
    }

    #[test]
    fn invalid_json_is_malformed_data() {
        let err = parse_photos("[{").unwrap_err();
        assert_eq!(err.category(), "malformed_data");
    }

    #[test]
    fn request_url_puts_fixed_params_after_mode_params() {
        let client = UnsplashClient::new(ClientOptions {
            base_url: "https://api.unsplash.com/".to_string(),
            images_per_request: 5,
            ..ClientOptions::new("k")
        })
        .unwrap();

        let query = vec![("query".to_string(), "forest".to_string())];
        assert_eq!(
            client.request_url(&query),
            "https://api.unsplash.com/photos/random?query=forest&count=5&content_filter=high&orientation=landscape"
        );
        assert_eq!(
            client.request_url(&Vec::new()),
            "https://api.unsplash.com/photos/random?count=5&content_filter=high&orientation=landscape"
        );
    }

    #[tokio::test]
    async fn sends_auth_headers_and_fixed_params() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/photos/random"))
            .and(header("Authorization", "Client-ID test-key"))
            .and(header("Accept-Version", "v1"))
            .and(query_param("collections", "317099"))
            .and(query_param("count", "10"))
            .and(query_param("content_filter", "high"))
            .and(query_param("orientation", "landscape"))
            .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
            .expect(1)
            .mount(&server)
            .await;

        let client = UnsplashClient::new(options(&server)).unwrap();
        let query = vec![("collections".to_string(), "317099".to_string())];
        let body = client.fetch_photos(&query).await.unwrap();

        assert_eq!(body, "[]");
    }

    #[tokio::test]
    async fn non_success_status_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = UnsplashClient::new(options(&server)).unwrap();
        let err = client.fetch_photos(&Vec::new()).await.unwrap_err();

        assert!(matches!(err, FetchError::HttpStatus(500)), "got {:?}", err);
    }

    #[tokio::test]
    async fn slow_response_times_out_within_bound() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("[]")
                    .set_delay(Duration::from_secs(10)),
            )
            .mount(&server)
            .await;

        let client = UnsplashClient::new(ClientOptions {
            connect_timeout: Duration::from_millis(300),
            read_timeout: Duration::from_millis(300),
            ..options(&server)
        })
        .unwrap();

        let started = Instant::now();
        let err = client.fetch_photos(&Vec::new()).await.unwrap_err();

        assert!(matches!(err, FetchError::Timeout), "got {:?}", err);
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn invalid_base_url_is_rejected_before_sending() {
        let client = UnsplashClient::new(ClientOptions {
            base_url: "not a url".to_string(),
            ..ClientOptions::new("k")
        })
        .unwrap();

        let err = client.fetch_photos(&Vec::new()).await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl { .. }), "got {:?}", err);
    }
}
