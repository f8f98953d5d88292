//! 候选消歧
//!
//! 邮编候选按 [`ScoreRule`] 打分，分数最高者胜出，同分取文档中靠前的一个。
//! 名称候选取最长的别名，最长者有多个且编码不同时视为无法判断。

use std::ops::Range;

use log::trace;

use crate::data::DepartmentTable;
use crate::parser::ParserConfig;
use crate::scanner::{Candidate, CandidateKind};

/// 邮编后面出现时说明前面是门牌号的道路类型
const STREET_TYPES: [&str; 24] = [
    "rue", "avenue", "av", "ave", "bd", "boulevard", "bld", "chemin", "route", "rte", "place",
    "pl", "allee", "impasse", "imp", "quai", "cours", "square", "voie", "chaussee", "passage",
    "faubourg", "fbg", "esplanade",
];

/// 打分规则
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreRule {
    /// 完整的五位邮编
    FullLength,
    /// 能推导出省份
    DepartmentConsistent,
    /// 后面跟着道路类型，更像门牌号
    StreetNumber,
    /// 后面跟着 `cedex`
    CedexFollows,
    /// 后面跟着一个普通单词，多半是城市名
    CityFollows,
    /// 出现在信箱号之后
    ///
    /// 经验规则：商业信函中真正的邮编通常写在信箱号之后。
    /// 可以通过 [`ParserConfig::with_after_box_preference`] 关闭。
    AfterBoxClause,
}

impl ScoreRule {
    pub const ORDER: [ScoreRule; 6] = [
        ScoreRule::FullLength,
        ScoreRule::DepartmentConsistent,
        ScoreRule::StreetNumber,
        ScoreRule::CedexFollows,
        ScoreRule::CityFollows,
        ScoreRule::AfterBoxClause,
    ];

    pub fn weight(self) -> i32 {
        match self {
            ScoreRule::FullLength => 2,
            ScoreRule::DepartmentConsistent => 1,
            ScoreRule::StreetNumber => -3,
            ScoreRule::CedexFollows => 2,
            ScoreRule::CityFollows => 1,
            ScoreRule::AfterBoxClause => 1,
        }
    }

    fn enabled(self, config: &ParserConfig) -> bool {
        match self {
            ScoreRule::AfterBoxClause => config.prefer_after_box,
            _ => true,
        }
    }

    /// 规则是否适用于该候选
    pub(crate) fn applies(self, candidate: &Candidate, ctx: &ScoreContext<'_>) -> bool {
        let next = next_word(ctx.text, candidate.end);
        match self {
            ScoreRule::FullLength => candidate.kind == CandidateKind::Zipcode,
            ScoreRule::DepartmentConsistent => ctx.departments.code_for_zipcode(&candidate.code).is_some(),
            ScoreRule::StreetNumber => next.is_some_and(is_street_type),
            ScoreRule::CedexFollows => next == Some("cedex"),
            ScoreRule::CityFollows => next.is_some_and(|w| {
                w.chars().next().is_some_and(char::is_alphabetic) && w != "cedex" && !is_street_type(w)
            }),
            ScoreRule::AfterBoxClause => ctx.box_numbers.iter().any(|b| b.end <= candidate.start),
        }
    }
}

/// 打分所需的上下文
#[derive(Debug, Clone, Copy)]
pub struct ScoreContext<'a> {
    /// 标准化文本
    pub text: &'a str,
    pub box_numbers: &'a [Range<usize>],
    pub departments: &'a DepartmentTable,
}

/// 计算候选分数
pub fn score(candidate: &Candidate, ctx: &ScoreContext<'_>, config: &ParserConfig) -> i32 {
    ScoreRule::ORDER
        .into_iter()
        .filter(|rule| rule.enabled(config) && rule.applies(candidate, ctx))
        .map(ScoreRule::weight)
        .sum()
}

/// 选出最可能的邮编，没有候选时返回 `None`
pub fn pick_zipcode(
    candidates: Vec<Candidate>,
    ctx: &ScoreContext<'_>,
    config: &ParserConfig,
) -> Option<Candidate> {
    let mut best: Option<Candidate> = None;

    for mut candidate in candidates {
        candidate.score = score(&candidate, ctx, config);
        trace!(
            "candidate {:?} ({:?}) at {} scores {}",
            candidate.code,
            candidate.matched,
            candidate.start,
            candidate.score
        );
        // 严格大于：同分保留靠前的
        if best.as_ref().map_or(true, |b| candidate.score > b.score) {
            best = Some(candidate);
        }
    }

    best
}

/// 选出最长的名称候选
pub fn pick_name(candidates: &[Candidate]) -> Option<&Candidate> {
    let best = candidates.iter().max_by_key(|c| c.score)?;
    let ambiguous = candidates
        .iter()
        .any(|c| c.score == best.score && c.code != best.code);
    if ambiguous {
        trace!("ambiguous name candidates for length {}", best.score);
        return None;
    }
    Some(best)
}

fn next_word(text: &str, end: usize) -> Option<&str> {
    text.get(end..)?
        .trim_start_matches(' ')
        .split(' ')
        .next()
        .filter(|w| !w.is_empty())
}

fn is_street_type(word: &str) -> bool {
    STREET_TYPES.contains(&word)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ReferenceTables;
    use crate::normalize::normalize;
    use crate::scanner::scan_zipcodes;

    fn pick(text: &str, config: &ParserConfig) -> Option<String> {
        let normalized = normalize(text);
        let outcome = scan_zipcodes(&normalized, config);
        let ctx = ScoreContext {
            text: &normalized,
            box_numbers: &outcome.box_numbers,
            departments: &ReferenceTables::global().departments,
        };
        pick_zipcode(outcome.candidates, &ctx, config).map(|c| c.code)
    }

    fn name(code: &str, len: i32) -> Candidate {
        Candidate {
            matched: "x".repeat(len as usize),
            start: 0,
            end: len as usize,
            kind: CandidateKind::NameMatch,
            code: code.to_string(),
            score: len,
        }
    }

    // ==================== 邮编打分测试 ====================

    #[test]
    fn test_single_candidate() {
        let config = ParserConfig::default();
        assert_eq!(pick("27006 Évreux Cedex", &config), Some("27006".to_string()));
        assert_eq!(pick("Avenue des client", &config), None);
    }

    #[test]
    fn test_street_number_loses() {
        let config = ParserConfig::default();
        assert_eq!(
            pick("Mme Cindy DUMAS, 15000 Bd Lepic - 73103 bp 89348 Aix-les-Bains", &config),
            Some("73103".to_string())
        );
    }

    #[test]
    fn test_full_length_beats_short() {
        let config = ParserConfig::default();
        assert_eq!(
            pick("Mme Cindy DUMAS, 1500 Bd Lepic - B.P. 348 73103 Aix-les-Bains", &config),
            Some("73103".to_string())
        );
    }

    #[test]
    fn test_after_box_clause() {
        let normalized = normalize("BP 414 - 20183 AJACCIO");
        let outcome = scan_zipcodes(&normalized, &ParserConfig::default());
        let ctx = ScoreContext {
            text: &normalized,
            box_numbers: &outcome.box_numbers,
            departments: &ReferenceTables::global().departments,
        };
        let candidate = &outcome.candidates[0];
        assert!(ScoreRule::AfterBoxClause.applies(candidate, &ctx));
        assert!(ScoreRule::CityFollows.applies(candidate, &ctx));
        assert!(!ScoreRule::StreetNumber.applies(candidate, &ctx));

        let with = score(candidate, &ctx, &ParserConfig::default());
        let without = score(candidate, &ctx, &ParserConfig::default().with_after_box_preference(false));
        assert_eq!(with - without, ScoreRule::AfterBoxClause.weight());
    }

    #[test]
    fn test_tie_keeps_document_order() {
        let config = ParserConfig::default().with_after_box_preference(false);
        assert_eq!(pick("44200 Nantes 33175 Gradignan", &config), Some("44200".to_string()));
    }

    #[test]
    fn test_cedex_follows() {
        let config = ParserConfig::default();
        assert_eq!(pick("44200 Nantes, 33175 cedex", &config), Some("33175".to_string()));
    }

    // ==================== 名称消歧测试 ====================

    #[test]
    fn test_pick_name_longest() {
        let candidates = vec![name("CG", 5), name("CD", 32), name("CG", 5)];
        assert_eq!(pick_name(&candidates).map(|c| c.code.as_str()), Some("CD"));
    }

    #[test]
    fn test_pick_name_ambiguous() {
        let candidates = vec![name("ML", 4), name("OM", 4)];
        assert!(pick_name(&candidates).is_none());

        let candidates = vec![name("IQ", 4), name("IQ", 4)];
        assert_eq!(pick_name(&candidates).map(|c| c.code.as_str()), Some("IQ"));

        assert!(pick_name(&[]).is_none());
    }
}
