//! 文本标准化
//!
//! 所有匹配逻辑都在标准化之后的文本上进行：
//! 宽松解码 → 兼容分解去重音 → 小写 → 非字母数字字符折叠为单个空格。

use std::borrow::Cow;

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// 宽松解码：非法 UTF-8 序列替换为 U+FFFD，不会失败
///
/// ```rust
/// assert_eq!(frgeo::decode(b"Pays:France ?"), "Pays:France ?");
/// assert_eq!(frgeo::decode(b"caf\xe9"), "caf\u{fffd}");
/// ```
pub fn decode(input: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(input)
}

/// 生成用于比较的标准化键
///
/// - 去掉重音符号（`é` → `e`），展开连字（`œ` → `oe`）
/// - 全部小写
/// - 空白（含不间断空格）、标点、连字符、撇号统一视为分隔符
/// - 连续分隔符折叠为一个空格，去掉首尾空格
///
/// 数字保持不变。函数是幂等的。
///
/// ```rust
/// assert_eq!(frgeo::normalize("  Côte d'Ivoire\u{a0}"), "cote d ivoire");
/// assert_eq!(frgeo::normalize("B.P. 20117, Haut-Rhin-68006"), "b p 20117 haut rhin 68006");
/// ```
pub fn normalize(text: impl AsRef<[u8]>) -> String {
    let decoded = decode(text.as_ref());
    let mut out = String::with_capacity(decoded.len());
    let mut separator = false;

    let chars = decoded
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .filter(|c| !is_combining_mark(*c));

    for ch in chars {
        let expanded = match ch {
            'œ' => "oe",
            'æ' => "ae",
            'ß' => "ss",
            c if c.is_alphanumeric() => {
                push_pending_separator(&mut out, &mut separator);
                out.push(c);
                continue;
            }
            _ => {
                separator = true;
                continue;
            }
        };
        push_pending_separator(&mut out, &mut separator);
        out.push_str(expanded);
    }

    out
}

/// 把名称转换为短横线形式（`Loire-Atlantique` → `loire-atlantique`）
pub fn slugify(text: impl AsRef<[u8]>) -> String {
    normalize(text).replace(' ', "-")
}

fn push_pending_separator(out: &mut String, separator: &mut bool) {
    if *separator && !out.is_empty() {
        out.push(' ');
    }
    *separator = false;
}
