//! 邮编候选扫描
//!
//! 在标准化文本中查找"数字簇"（用单个空格隔开的若干组数字），
//! 按 [`ScanRule`] 的固定顺序排除电话号码和信箱号，剩下的组合成候选邮编。

use std::ops::Range;

use log::trace;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::parser::ParserConfig;

/// 数字簇：`33175`、`33 175`、`05 62 54 58 63`
static DIGIT_CLUSTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[0-9]+(?: [0-9]+)*").expect("valid regex"));

/// 紧挨在数字簇前面的信箱标记（BP / B.P. / CS / TSA）
static BOX_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^| )(?:bp|b p|cs|tsa|boite postale|case postale) ?$").expect("valid regex")
});

/// 紧挨在数字簇前面的电话标记
static PHONE_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^| )(?:tel|telephone|fax|portable|mobile|standard) ?$").expect("valid regex")
});

/// 候选类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateKind {
    /// 五位邮编（可能写作 `33 175`）
    Zipcode,
    /// 丢了前导零的四位邮编（`6503` → `06503`）
    ShortZipcode,
    /// 别名表中按词包含找到的名称
    NameMatch,
}

/// 候选匹配
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// 文本中的原样片段
    pub matched: String,
    /// 在标准化文本中的字节位置
    pub start: usize,
    pub end: usize,
    pub kind: CandidateKind,
    /// 推导出的编码：五位邮编或别名表中的编码
    pub code: String,
    pub score: i32,
}

/// 扫描规则，按声明顺序对每个数字簇执行
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanRule {
    /// 前面是 `tel` / `fax` 等：跳过开头的电话号码，不认识的格式只跳过第一组
    PhoneMarker,
    /// 开头是 4 组以上两位数组成的电话号码（`05 62 54 58 63`）：跳过这些组
    PhoneGrouping,
    /// 前面是信箱标记：第一组是信箱号
    BoxNumber,
    /// 五位数字
    FiveDigits,
    /// 相邻几组合计恰好五位（`33 175`、`3 3175`、`3 31 75`）
    SplitFiveDigits,
    /// 四位数字，补前导零
    ShortFourDigits,
}

impl ScanRule {
    pub const ORDER: [ScanRule; 6] = [
        ScanRule::PhoneMarker,
        ScanRule::PhoneGrouping,
        ScanRule::BoxNumber,
        ScanRule::FiveDigits,
        ScanRule::SplitFiveDigits,
        ScanRule::ShortFourDigits,
    ];
}

/// 扫描结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanOutcome {
    /// 按文档顺序排列的候选
    pub candidates: Vec<Candidate>,
    /// 被识别为信箱号的位置
    pub box_numbers: Vec<Range<usize>>,
}

#[derive(Debug, Clone, Copy)]
struct Group<'a> {
    start: usize,
    digits: &'a str,
}

impl Group<'_> {
    fn end(&self) -> usize {
        self.start + self.digits.len()
    }
}

/// 扫描标准化文本中的邮编候选
pub fn scan_zipcodes(normalized: &str, config: &ParserConfig) -> ScanOutcome {
    let mut outcome = ScanOutcome::default();

    for cluster in DIGIT_CLUSTER.find_iter(normalized) {
        let before = &normalized[..cluster.start()];
        let groups = split_groups(cluster.as_str(), cluster.start());
        let mut first_usable = 0;
        // 已并入拼接邮编的组，不再补零
        let mut joined = vec![false; groups.len()];

        for rule in ScanRule::ORDER {
            match rule {
                ScanRule::PhoneMarker if PHONE_MARKER.is_match(before) => {
                    first_usable = phone_prefix(&groups).unwrap_or(1);
                    trace!("{:?} skips {} group(s) of {:?}", rule, first_usable, cluster.as_str());
                }
                ScanRule::PhoneGrouping if first_usable == 0 => {
                    if let Some(n) = phone_prefix(&groups).filter(|&n| n >= 4) {
                        trace!("{:?} skips {} group(s) of {:?}", rule, n, cluster.as_str());
                        first_usable = n;
                    }
                }
                ScanRule::BoxNumber if first_usable == 0 && BOX_MARKER.is_match(before) => {
                    let number = groups[0];
                    trace!("{:?} skips {:?}", rule, number.digits);
                    outcome.box_numbers.push(number.start..number.end());
                    first_usable = 1;
                }
                ScanRule::FiveDigits => {
                    for group in groups.iter().skip(first_usable) {
                        if group.digits.len() == 5 {
                            outcome.candidates.push(zipcode_candidate(
                                normalized,
                                group.start..group.end(),
                                CandidateKind::Zipcode,
                                group.digits.to_string(),
                            ));
                        }
                    }
                }
                ScanRule::SplitFiveDigits => {
                    for start in first_usable..groups.len() {
                        let Some(end) = five_digit_run(&groups[start..]).map(|n| start + n) else {
                            continue;
                        };
                        let run = &groups[start..end];
                        let code: String = run.iter().map(|g| g.digits).collect();
                        outcome.candidates.push(zipcode_candidate(
                            normalized,
                            run[0].start..run[run.len() - 1].end(),
                            CandidateKind::Zipcode,
                            code,
                        ));
                        joined[start..end].iter_mut().for_each(|j| *j = true);
                    }
                }
                ScanRule::ShortFourDigits if config.accept_short_zipcodes => {
                    for (i, group) in groups.iter().enumerate().skip(first_usable) {
                        if !joined[i] && group.digits.len() == 4 && !group.digits.starts_with('0') {
                            outcome.candidates.push(zipcode_candidate(
                                normalized,
                                group.start..group.end(),
                                CandidateKind::ShortZipcode,
                                format!("0{}", group.digits),
                            ));
                        }
                    }
                }
                _ => {}
            }
        }
    }

    outcome.candidates.sort_by_key(|c| c.start);
    outcome
}

/// 开头的电话号码占用的组数
///
/// 识别一个十位数组、合计十位的两位数组，以及 `33` / `0033`
/// 国家前缀（可带 `0`）后合计九位的号码。
fn phone_prefix(groups: &[Group<'_>]) -> Option<usize> {
    if matches!(groups.first()?.digits, "33" | "0033") {
        let start = if groups.get(1).is_some_and(|g| g.digits == "0") { 2 } else { 1 };
        if let Some(n) = national_number(&groups[start..], 9) {
            return Some(start + n);
        }
    }
    national_number(groups, 10)
}

fn national_number(groups: &[Group<'_>], digits: usize) -> Option<usize> {
    if groups.first()?.digits.len() == digits {
        return Some(1);
    }
    let mut total = 0;
    for (i, group) in groups.iter().enumerate() {
        if group.digits.len() > 2 {
            return None;
        }
        total += group.digits.len();
        if total == digits {
            return Some(i + 1);
        }
    }
    None
}

/// 从开头起至少两组、合计恰好五位时返回组数
fn five_digit_run(groups: &[Group<'_>]) -> Option<usize> {
    let mut total = 0;
    for (i, group) in groups.iter().enumerate() {
        total += group.digits.len();
        if total >= 5 {
            return (total == 5 && i >= 1).then_some(i + 1);
        }
    }
    None
}

fn split_groups(cluster: &str, offset: usize) -> Vec<Group<'_>> {
    let mut groups = Vec::new();
    let mut start = offset;
    for digits in cluster.split(' ') {
        groups.push(Group { start, digits });
        start += digits.len() + 1;
    }
    groups
}

fn zipcode_candidate(text: &str, span: Range<usize>, kind: CandidateKind, code: String) -> Candidate {
    Candidate {
        matched: text[span.clone()].to_string(),
        start: span.start,
        end: span.end,
        kind,
        code,
        score: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;

    fn codes(text: &str) -> Vec<String> {
        scan_zipcodes(&normalize(text), &ParserConfig::default())
            .candidates
            .into_iter()
            .map(|c| c.code)
            .collect()
    }

    #[test]
    fn test_five_digits() {
        assert_eq!(codes("33175 GRADIGNAN CEDEX"), vec!["33175"]);
        assert_eq!(codes("Roissy-en-France95700"), vec!["95700"]);
    }

    #[test]
    fn test_split_five_digits() {
        let outcome = scan_zipcodes(&normalize("Vigneau 33 175 GRADIGNAN"), &ParserConfig::default());
        assert_eq!(outcome.candidates.len(), 1);
        let c = &outcome.candidates[0];
        assert_eq!(c.code, "33175");
        assert_eq!(c.matched, "33 175");
        assert_eq!(c.kind, CandidateKind::Zipcode);
    }

    #[test]
    fn test_joined_runs() {
        // 1 + 4
        assert_eq!(codes("3 3175 Gradignan"), vec!["33175"]);
        // 3 + 2
        assert_eq!(codes("Gradignan 331 75"), vec!["33175"]);
        // 1 + 2 + 2
        assert_eq!(codes("3 31 75 Gradignan"), vec!["33175"]);
        // 超过五位的不拼
        assert_eq!(codes("Cedex 01 38031 Grenoble"), vec!["38031"]);
        assert!(codes("12 345 6").len() == 1);
    }

    #[test]
    fn test_joined_run_beats_short_zipcode() {
        let outcome = scan_zipcodes(&normalize("3 3175 Gradignan"), &ParserConfig::default());
        assert_eq!(outcome.candidates.len(), 1);
        assert_eq!(outcome.candidates[0].kind, CandidateKind::Zipcode);
        assert_eq!(outcome.candidates[0].matched, "3 3175");
    }

    #[test]
    fn test_long_runs_are_not_zipcodes() {
        assert!(codes("Chemin du Solarium 061256784589 Le Haut").is_empty());
    }

    #[test]
    fn test_phone_numbers_excluded() {
        assert!(codes("tel. 05.62.54.58.63").is_empty());
        assert!(codes("appelez le 05 62 54 58 63").is_empty());
        assert!(codes("fax 33175").is_empty());
    }

    #[test]
    fn test_phone_prefix_keeps_following_zipcode() {
        assert_eq!(codes("Mairie, tél. 05.62.54.58.63, 65013 Tarbes"), vec!["65013"]);
        assert_eq!(codes("Tél. 05 62 54 58 63 - 31020 Toulouse"), vec!["31020"]);
        assert_eq!(codes("fax 0562545863, 33175 Gradignan"), vec!["33175"]);
        assert_eq!(codes("tel +33 (0)5 62 54 58 63, 65013 Tarbes"), vec!["65013"]);
        assert_eq!(codes("tel +33 5 62 54 58 63 - 65013 Tarbes"), vec!["65013"]);
        assert_eq!(codes("05.62.54.58.63, 65013 Tarbes"), vec!["65013"]);
    }

    #[test]
    fn test_phone_prefix_shapes() {
        fn groups(text: &str) -> Vec<Group<'_>> {
            split_groups(text, 0)
        }
        assert_eq!(phone_prefix(&groups("05 62 54 58 63 65013")), Some(5));
        assert_eq!(phone_prefix(&groups("0562545863 33175")), Some(1));
        assert_eq!(phone_prefix(&groups("33 0 5 62 54 58 63")), Some(7));
        assert_eq!(phone_prefix(&groups("0033 562545863")), Some(2));
        assert_eq!(phone_prefix(&groups("33 175")), None);
        assert_eq!(phone_prefix(&groups("33175")), None);
    }

    #[test]
    fn test_box_numbers_excluded() {
        let outcome = scan_zipcodes(&normalize("BP 55342 20223 Solenzara"), &ParserConfig::default());
        assert_eq!(outcome.candidates.len(), 1);
        assert_eq!(outcome.candidates[0].code, "20223");
        assert_eq!(outcome.box_numbers, vec![3..8]);

        assert_eq!(codes("clients BP72152, F - 31020 Toulouse"), vec!["31020"]);
        assert_eq!(codes("clients bp72152, F - 31020 Toulouse"), vec!["31020"]);
        assert_eq!(codes("Avenue des clients CS 72152, F - 31020 Toulouse"), vec!["31020"]);
        assert_eq!(codes("rue Dupaty B.P. 20117, Edant-33294 Blanquefort."), vec!["33294"]);
        assert_eq!(codes("avenue Pravaz BP\n\n 66\n38480\n - Pont"), vec!["38480"]);
    }

    #[test]
    fn test_short_zipcodes() {
        let outcome = scan_zipcodes(&normalize("BP 1330, 6503 TARBES"), &ParserConfig::default());
        assert_eq!(outcome.candidates.len(), 1);
        assert_eq!(outcome.candidates[0].code, "06503");
        assert_eq!(outcome.candidates[0].kind, CandidateKind::ShortZipcode);

        // 以 0 开头的四位数不补零
        assert!(codes("0650 TARBES").is_empty());

        let strict = ParserConfig::default().with_short_zipcodes(false);
        assert!(scan_zipcodes(&normalize("6503 TARBES"), &strict).candidates.is_empty());
    }

    #[test]
    fn test_document_order() {
        assert_eq!(
            codes("Mme Cindy DUMAS, 15000 Bd Lepic - 73103 B.P. 89348 Aix-les-Bains"),
            vec!["15000", "73103"]
        );
    }

    #[test]
    fn test_no_digits() {
        assert!(codes("a l attention de M. Bon Jean, Avenue des client").is_empty());
        assert!(codes("").is_empty());
    }
}
