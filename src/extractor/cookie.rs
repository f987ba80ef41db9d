//! Cookie 字符串宽松解析

use std::collections::BTreeMap;

/// 解析 `document.cookie` 风格的字符串
///
/// 以 `;` 分隔，按 `=` 切分后取前两段作为名称与值（`a=b=c` 得到 `a` -> `b`）；
/// 名称或值为空的条目直接跳过，同名后者覆盖前者。
pub fn parse_cookie_string(raw: &str) -> BTreeMap<String, String> {
    let mut cookies = BTreeMap::new();
    for pair in raw.split(';') {
        let mut parts = pair.trim().split('=');
        let (Some(name), Some(value)) = (parts.next(), parts.next()) else {
            continue;
        };
        let (name, value) = (name.trim(), value.trim());
        if name.is_empty() || value.is_empty() {
            continue;
        }
        cookies.insert(name.to_string(), value.to_string());
    }
    cookies
}
