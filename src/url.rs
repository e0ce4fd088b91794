// url.rs — URL 查询参数拼接
//
// 值不做任何百分号编码，调用方需保证传入的值本身是 URL 安全的。

/// 在 URL 后追加查询参数
///
/// - URL 里没有 `?` 时以 `?` 开头，否则以 `&` 接在已有参数后面
/// - 参数之间用 `&` 连接，末尾不留分隔符
/// - 参数为空时原样返回
pub fn append_query_parameters<K, V>(url: &str, params: &[(K, V)]) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    if params.is_empty() {
        return url.to_string();
    }

    let separator = if url.contains('?') { '&' } else { '?' };
    let query = params
        .iter()
        .map(|(k, v)| format!("{}={}", k.as_ref(), v.as_ref()))
        .collect::<Vec<_>>()
        .join("&");

    format!("{}{}{}", url, separator, query)
}
