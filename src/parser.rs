//! 地址解析器核心实现

use std::sync::Arc;

use log::debug;
use once_cell::sync::Lazy;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::data::ReferenceTables;
use crate::disambiguate::{pick_zipcode, ScoreContext};
use crate::normalize::{decode, normalize};
use crate::region::Address;
use crate::scanner::scan_zipcodes;

/// 全局解析器实例
static GLOBAL_PARSER: Lazy<AddressParser> = Lazy::new(AddressParser::new);

/// 解析器配置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ParserConfig {
    /// 接受丢了前导零的四位邮编（`6503 TARBES`）
    pub accept_short_zipcodes: bool,
    /// 信箱号之后的邮编加分
    pub prefer_after_box: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            accept_short_zipcodes: true,
            prefer_after_box: true,
        }
    }
}

impl ParserConfig {
    pub fn with_short_zipcodes(mut self, accept: bool) -> Self {
        self.accept_short_zipcodes = accept;
        self
    }

    pub fn with_after_box_preference(mut self, prefer: bool) -> Self {
        self.prefer_after_box = prefer;
        self
    }
}

/// 地址解析器
///
/// 在自由格式的法国邮寄地址中找出邮编，并推导所属省份。
/// 解析器只读，可以在线程间共享。
#[derive(Debug, Clone)]
pub struct AddressParser {
    tables: Arc<ReferenceTables>,
    config: ParserConfig,
}

impl AddressParser {
    /// 使用内嵌数据和默认配置创建解析器
    pub fn new() -> Self {
        Self::with_config(ParserConfig::default())
    }

    /// 使用内嵌数据和指定配置创建解析器
    pub fn with_config(config: ParserConfig) -> Self {
        Self::with_tables(ReferenceTables::shared(), config)
    }

    /// 使用自定义参考表创建解析器
    pub fn with_tables(tables: Arc<ReferenceTables>, config: ParserConfig) -> Self {
        Self { tables, config }
    }

    /// 获取全局解析器实例
    pub fn global() -> &'static AddressParser {
        &GLOBAL_PARSER
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn tables(&self) -> &ReferenceTables {
        &self.tables
    }

    /// 解析地址
    ///
    /// 输入可以是 `&str` 也可以是字节串，非法 UTF-8 会被替换而不是报错。
    /// 找不到邮编时返回的 [`Address`] 中 `zipcode` 为 `None`。
    ///
    /// # 示例
    /// ```rust
    /// use frgeo::AddressParser;
    ///
    /// let parser = AddressParser::new();
    /// let result = parser.parse("7 cours Grandval\nBP 414 - 20183 AJACCIO - CEDEX");
    /// assert_eq!(result.zipcode.as_deref(), Some("20183"));
    /// assert_eq!(result.department(), Some("2A"));
    /// ```
    pub fn parse(&self, text: impl AsRef<[u8]>) -> Address {
        let raw = decode(text.as_ref());
        let normalized = normalize(raw.as_bytes());
        if normalized.is_empty() {
            return Address::empty(raw);
        }

        let outcome = scan_zipcodes(&normalized, &self.config);
        let ctx = ScoreContext {
            text: &normalized,
            box_numbers: &outcome.box_numbers,
            departments: &self.tables.departments,
        };

        match pick_zipcode(outcome.candidates, &ctx, &self.config) {
            Some(best) => Address::new(raw, Some(best.code), &self.tables),
            None => {
                debug!("no zipcode found in {normalized:?}");
                Address::empty(raw)
            }
        }
    }

    /// 批量解析地址
    pub fn parse_batch(&self, addresses: &[&str]) -> Vec<Address> {
        addresses.iter().map(|a| self.parse(a)).collect()
    }
}

impl Default for AddressParser {
    fn default() -> Self {
        Self::new()
    }
}
