//! 名称查找
//!
//! 把自由文本（国家名、省份名、大区名）映射为编码。
//! 查找按 [`MatchStrategy::ORDER`] 的顺序依次尝试，第一个成功的策略胜出。

use log::trace;

use crate::disambiguate::pick_name;
use crate::error::{GeoError, Result};
use crate::normalize::{decode, normalize};
use crate::scanner::{Candidate, CandidateKind};
use crate::trie::Trie;

/// 常见的前缀噪声（标准化形式，长的在前）
pub const STOP_PREFIXES: [&str; 5] = [
    "pays d execution",
    "country of execution",
    "country execution",
    "pays",
    "country",
];

/// 别名表：标准化别名 -> 编码（多对一）
#[derive(Debug)]
pub struct NameTable {
    table: &'static str,
    aliases: Trie<String>,
}

impl NameTable {
    /// 创建空表，`table` 用于错误信息
    pub fn new(table: &'static str) -> Self {
        Self {
            table,
            aliases: Trie::new(),
        }
    }

    /// 插入别名
    ///
    /// 同一别名重复指向同一编码时忽略；指向不同编码时返回错误。
    pub fn insert(&mut self, alias: &str, code: &str, line: u64) -> Result<()> {
        let key = normalize(alias);
        if key.is_empty() {
            return Err(GeoError::InvalidRecord {
                table: self.table,
                line,
                reason: format!("alias {alias:?} is empty once normalized"),
            });
        }
        match self.aliases.get(&key) {
            Some(existing) if existing == code => Ok(()),
            Some(existing) => Err(GeoError::InvalidRecord {
                table: self.table,
                line,
                reason: format!("alias {key:?} maps to both {existing} and {code}"),
            }),
            None => {
                self.aliases.insert(&key, code.to_string());
                Ok(())
            }
        }
    }

    /// 插入别名，冲突时保留已有编码并返回 `false`
    pub fn insert_or_keep(&mut self, alias: &str, code: &str) -> bool {
        let key = normalize(alias);
        match self.aliases.get(&key) {
            Some(existing) => existing == code,
            None => {
                self.aliases.insert(&key, code.to_string());
                true
            }
        }
    }

    /// 按标准化键精确查找
    pub fn get(&self, key: &str) -> Option<&str> {
        self.aliases.get(key).map(String::as_str)
    }

    /// 别名数量
    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }

    /// 文本中按词对齐出现的所有别名
    pub fn containment_candidates(&self, normalized: &str) -> Vec<Candidate> {
        self.aliases
            .find_all_words(normalized)
            .into_iter()
            .map(|(start, matched, code)| Candidate {
                matched: matched.to_string(),
                start,
                end: start + matched.len(),
                kind: CandidateKind::NameMatch,
                code: code.clone(),
                score: matched.len() as i32,
            })
            .collect()
    }
}

/// 名称匹配策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStrategy {
    /// 整体精确匹配
    Exact,
    /// 去掉 "pays:" 一类前缀后精确匹配
    StrippedPrefix,
    /// 按词包含，最长别名优先
    Containment,
    /// 多行输入时只看最后一个非空行
    TrailingSegment,
}

impl MatchStrategy {
    pub const ORDER: [MatchStrategy; 4] = [
        MatchStrategy::Exact,
        MatchStrategy::StrippedPrefix,
        MatchStrategy::Containment,
        MatchStrategy::TrailingSegment,
    ];

    fn apply<'t>(self, raw: &str, normalized: &str, table: &'t NameTable) -> Option<&'t str> {
        match self {
            MatchStrategy::Exact => table.get(normalized),
            MatchStrategy::StrippedPrefix => {
                let stripped = strip_stop_prefix(normalized);
                if stripped.len() == normalized.len() {
                    return None;
                }
                table.get(stripped)
            }
            MatchStrategy::Containment => {
                let candidates = table.containment_candidates(normalized);
                let best = pick_name(&candidates)?;
                table.get(&best.matched)
            }
            MatchStrategy::TrailingSegment => {
                let lines: Vec<String> = raw
                    .lines()
                    .map(normalize)
                    .filter(|line| !line.is_empty())
                    .collect();
                if lines.len() < 2 {
                    return None;
                }
                let last = lines.last()?;
                [
                    MatchStrategy::Exact,
                    MatchStrategy::StrippedPrefix,
                    MatchStrategy::Containment,
                ]
                .into_iter()
                .find_map(|strategy| strategy.apply(last, last, table))
            }
        }
    }
}

/// 去掉一个前缀噪声
pub fn strip_stop_prefix(normalized: &str) -> &str {
    for prefix in STOP_PREFIXES {
        if normalized == prefix {
            return "";
        }
        if let Some(rest) = normalized.strip_prefix(prefix).and_then(|r| r.strip_prefix(' ')) {
            return rest;
        }
    }
    normalized
}

/// 在别名表中查找文本对应的编码
///
/// 依次尝试精确匹配、去前缀匹配、按词包含匹配和末行匹配。
pub fn lookup_name<'t>(text: impl AsRef<[u8]>, table: &'t NameTable) -> Option<&'t str> {
    let raw = decode(text.as_ref());
    let normalized = normalize(raw.as_bytes());
    if normalized.is_empty() {
        return None;
    }

    for strategy in MatchStrategy::ORDER {
        if let Some(code) = strategy.apply(&raw, &normalized, table) {
            trace!("{:?} matched {normalized:?} -> {code} in {} table", strategy, table.table);
            return Some(code);
        }
    }

    trace!("no {} entry for {normalized:?}", table.table);
    None
}

/// 只做精确匹配（不纠错、不做包含匹配）
pub fn lookup_exact<'t>(text: impl AsRef<[u8]>, table: &'t NameTable) -> Option<&'t str> {
    let normalized = normalize(text);
    if normalized.is_empty() {
        return None;
    }
    table.get(&normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> NameTable {
        let mut t = NameTable::new("test");
        t.insert("Nigeria", "NG", 1).unwrap();
        t.insert("Nigéria", "NG", 2).unwrap();
        t.insert("Niger", "NE", 3).unwrap();
        t.insert("France", "FR", 4).unwrap();
        t.insert("Iraq", "IQ", 5).unwrap();
        t.insert("Congo", "CG", 6).unwrap();
        t.insert("République démocratique du Congo", "CD", 7).unwrap();
        t.insert("Guinée", "GN", 8).unwrap();
        t.insert("Guinée équatoriale", "GQ", 9).unwrap();
        t.insert("Mali", "ML", 10).unwrap();
        t.insert("Oman", "OM", 11).unwrap();
        t
    }

    // ==================== 建表测试 ====================

    #[test]
    fn test_insert_conflict() {
        let mut t = table();
        assert!(t.insert("NIGER", "NE", 20).is_ok());
        let err = t.insert("niger", "NG", 21).unwrap_err();
        assert!(matches!(err, GeoError::InvalidRecord { line: 21, .. }));
        assert!(t.insert("?!", "XX", 22).is_err());
    }

    #[test]
    fn test_insert_or_keep() {
        let mut t = table();
        assert!(t.insert_or_keep("niger", "NE"));
        assert!(!t.insert_or_keep("niger", "NG"));
        assert_eq!(t.get("niger"), Some("NE"));
        assert!(t.insert_or_keep("Tchad", "TD"));
        assert_eq!(t.len(), 11);
    }

    // ==================== 查找策略测试 ====================

    #[test]
    fn test_exact() {
        let t = table();
        assert_eq!(lookup_name("France", &t), Some("FR"));
        assert_eq!(lookup_name(" NIGÉRIA ", &t), Some("NG"));
        assert_eq!(lookup_name("Niger", &t), Some("NE"));
    }

    #[test]
    fn test_stripped_prefix() {
        let t = table();
        assert_eq!(lookup_name("Pays:France ?", &t), Some("FR"));
        assert_eq!(lookup_name("Pays d'exécution : Niger", &t), Some("NE"));
        assert_eq!(lookup_name("Country execution:nigeria.", &t), Some("NG"));
        assert_eq!(strip_stop_prefix("pays"), "");
        assert_eq!(strip_stop_prefix("paysage"), "paysage");
    }

    #[test]
    fn test_containment_whole_words() {
        let t = table();
        assert_eq!(lookup_name(" Le  nigéria c'est trop   sympa", &t), Some("NG"));
        // "niger" 不是 "nigeria" 中的完整单词
        assert_eq!(lookup_name("nigeriane", &t), None);
        // "somalie" 包含 "mali"，但不是完整单词
        assert_eq!(lookup_name("la somalie", &t), None);
    }

    #[test]
    fn test_containment_prefers_longest() {
        let t = table();
        assert_eq!(lookup_name("ambassade de Guinée équatoriale", &t), Some("GQ"));
        assert_eq!(lookup_name("République démocratique du Congo", &t), Some("CD"));
        assert_eq!(lookup_name("la république démocratique du congo ici", &t), Some("CD"));
    }

    #[test]
    fn test_containment_ambiguity() {
        let t = table();
        // 长度相同、编码不同
        assert_eq!(lookup_name("mali oman", &t), None);
    }

    #[test]
    fn test_trailing_segment() {
        let t = table();
        assert_eq!(lookup_name("U.S. Mission Iraq\n\nIraq", &t), Some("IQ"));
        // 整体有歧义时以最后一行为准
        assert_eq!(lookup_name("Mali\nOman\n", &t), Some("OM"));
    }

    #[test]
    fn test_no_match() {
        let t = table();
        assert_eq!(lookup_name("aaa ( bbb", &t), None);
        assert_eq!(lookup_name("", &t), None);
        assert_eq!(lookup_name("   ", &t), None);
        assert_eq!(lookup_name(b"\xff\xfe", &t), None);
    }

    #[test]
    fn test_lookup_exact() {
        let t = table();
        assert_eq!(lookup_exact("FRANCE", &t), Some("FR"));
        assert_eq!(lookup_exact("Pays: France", &t), None);
        assert_eq!(lookup_exact("", &t), None);
    }
}
