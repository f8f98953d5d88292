//! # frgeo - French zipcode / department / country resolver
//!
//! 法国地址解析库：从自由格式的邮寄地址中提取邮编并推导省份（département），
//! 并提供省份、大区和国家名称与编码之间的转换。
//!
//! ## 功能特性
//!
//! - 从多行、带噪声的地址中找出邮编（排除电话号码、信箱号和门牌号）
//! - 支持 `33 175` 这样被拆开的邮编，以及丢了前导零的四位邮编
//! - 科西嘉（`2A` / `2B`）和海外省份的特殊编码规则
//! - 省份名称精确查找，国家名称（法语 / 英语）容错查找
//! - 内置 101 个省份、6 个海外集体、18 个大区和约 200 个国家的数据
//! - 输入可以是字符串也可以是字节串，解析接口从不报错
//!
//! ## 快速开始
//!
//! ```rust
//! use frgeo::{AddressParser, Lang};
//!
//! let parser = AddressParser::new();
//!
//! // 解析地址
//! let result = parser.parse("7 cours Grandval\nBP 414 - 20183 AJACCIO - CEDEX");
//! assert_eq!(result.zipcode.as_deref(), Some("20183"));
//! assert_eq!(result.department(), Some("2A"));
//!
//! // 便捷函数
//! assert_eq!(frgeo::address_to_zipcode("6503 TARBES Cedex 9").as_deref(), Some("06"));
//! assert_eq!(frgeo::zipcode_to_dept_name("44000").as_deref(), Some("loire-atlantique"));
//! assert_eq!(frgeo::dept_name_to_zipcode("Corse-du-Sud").as_deref(), Some("20A"));
//! assert_eq!(frgeo::country_name_to_id("Pays:France ?", Lang::Fr).as_deref(), Some("FR"));
//! ```

mod data;
mod disambiguate;
mod error;
mod lookup;
mod normalize;
mod parser;
mod region;
mod resolver;
mod scanner;
mod trie;

pub use data::{CountryTable, DepartmentTable, ReferenceTables, RegionTable};
pub use disambiguate::ScoreRule;
pub use error::{GeoError, Result};
pub use lookup::{MatchStrategy, NameTable};
pub use normalize::{decode, normalize, slugify};
pub use parser::{AddressParser, ParserConfig};
pub use region::{Address, Department, Lang, Region, RegionInfo};
pub use resolver::Resolver;
pub use scanner::{Candidate, CandidateKind, ScanRule};

/// 便捷函数：使用全局解析器解析地址
///
/// ```rust
/// let result = frgeo::parse("20212   Erbajolo");
/// assert_eq!(result.department(), Some("2B"));
/// ```
pub fn parse(address: impl AsRef<[u8]>) -> Address {
    AddressParser::global().parse(address)
}

/// 便捷函数：邮编或省份编码 -> 省份名称
pub fn zipcode_to_dept_name(zipcode: impl AsRef<[u8]>) -> Option<String> {
    Resolver::global().zipcode_to_dept_name(zipcode)
}

/// 便捷函数：邮编或省份编码 -> 省份编码
pub fn zipcode_to_dept_code(zipcode: impl AsRef<[u8]>) -> Option<String> {
    Resolver::global().zipcode_to_dept_code(zipcode)
}

/// 便捷函数：地址 -> 邮编前缀
pub fn address_to_zipcode(address: impl AsRef<[u8]>) -> Option<String> {
    Resolver::global().address_to_zipcode(address)
}

/// 便捷函数：省份名称 -> 邮编前缀
pub fn dept_name_to_zipcode(name: impl AsRef<[u8]>) -> Option<String> {
    Resolver::global().dept_name_to_zipcode(name)
}

/// 便捷函数：省份名称 -> 省份编码
pub fn dept_name_to_code(name: impl AsRef<[u8]>) -> Option<String> {
    Resolver::global().dept_name_to_code(name)
}

/// 便捷函数：国家名称 -> ISO 编码
///
/// ```rust
/// use frgeo::Lang;
///
/// assert_eq!(frgeo::country_name_to_id(" Le nigéria c'est trop sympa", Lang::default()).as_deref(), Some("NG"));
/// assert_eq!(frgeo::country_name_to_id("sweden", Lang::Fr), None);
/// ```
pub fn country_name_to_id(text: impl AsRef<[u8]>, lang: Lang) -> Option<String> {
    Resolver::global().country_name_to_id(text, lang)
}

/// 便捷函数：ISO 编码 -> 国家名称
pub fn country_id_to_name(code: &str, lang: Lang) -> Option<String> {
    Resolver::global().country_id_to_name(code, lang)
}

/// 便捷函数：大区编号 -> 名称
pub fn region_id_to_name(id: &str) -> Option<String> {
    Resolver::global().region_id_to_name(id)
}

/// 便捷函数：大区名称 -> 编号
pub fn region_name_to_id(name: impl AsRef<[u8]>) -> Option<String> {
    Resolver::global().region_name_to_id(name)
}

/// 便捷函数：大区编号 -> 大区及其下属省份
pub fn region_info_from_id(id: &str) -> Option<RegionInfo> {
    Resolver::global().region_info_from_id(id)
}

/// 便捷函数：大区名称 -> 大区及其下属省份
pub fn region_info_from_name(name: impl AsRef<[u8]>) -> Option<RegionInfo> {
    Resolver::global().region_info_from_name(name)
}
