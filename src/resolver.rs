//! 对外查询接口
//!
//! 所有方法都不会失败：无法识别、为空或有歧义的输入返回 `None`。

use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::data::ReferenceTables;
use crate::normalize::decode;
use crate::parser::{AddressParser, ParserConfig};
use crate::region::{Department, Lang, Region, RegionInfo};

/// 全局查询实例
static GLOBAL_RESOLVER: Lazy<Resolver> = Lazy::new(Resolver::new);

/// 省份、邮编、国家和大区查询
#[derive(Debug, Clone)]
pub struct Resolver {
    tables: Arc<ReferenceTables>,
    parser: AddressParser,
}

impl Resolver {
    /// 使用内嵌数据创建
    pub fn new() -> Self {
        Self::with_tables(ReferenceTables::shared(), ParserConfig::default())
    }

    /// 使用自定义参考表创建
    pub fn with_tables(tables: Arc<ReferenceTables>, config: ParserConfig) -> Self {
        let parser = AddressParser::with_tables(Arc::clone(&tables), config);
        Self { tables, parser }
    }

    /// 获取全局实例
    pub fn global() -> &'static Resolver {
        &GLOBAL_RESOLVER
    }

    pub fn parser(&self) -> &AddressParser {
        &self.parser
    }

    /// 邮编或省份编码 -> 省份名称（短横线小写形式）
    ///
    /// 接受省份编码（`44`、`2a`、`971`）、邮编前缀（`20A`）、
    /// 五位邮编以及丢了前导零的四位邮编。
    ///
    /// ```rust
    /// use frgeo::Resolver;
    ///
    /// let resolver = Resolver::global();
    /// assert_eq!(resolver.zipcode_to_dept_name("44000").as_deref(), Some("loire-atlantique"));
    /// assert_eq!(resolver.zipcode_to_dept_name("20A").as_deref(), Some("corse-du-sud"));
    /// assert_eq!(resolver.zipcode_to_dept_name("121"), None);
    /// ```
    pub fn zipcode_to_dept_name(&self, zipcode: impl AsRef<[u8]>) -> Option<String> {
        self.resolve_department(zipcode).map(Department::slug)
    }

    /// 邮编或省份编码 -> 省份编码（`2A`）
    pub fn zipcode_to_dept_code(&self, zipcode: impl AsRef<[u8]>) -> Option<String> {
        self.resolve_department(zipcode).map(|d| d.code.clone())
    }

    /// 自由格式地址 -> 邮编前缀（科西嘉为 `20A` / `20B`）
    ///
    /// ```rust
    /// use frgeo::Resolver;
    ///
    /// let resolver = Resolver::global();
    /// let prefix = resolver.address_to_zipcode("BP 1330, 6503 TARBES Cedex 9, tel. 05.62.54.58.63");
    /// assert_eq!(prefix.as_deref(), Some("06"));
    /// ```
    pub fn address_to_zipcode(&self, address: impl AsRef<[u8]>) -> Option<String> {
        self.parser.parse(address).zipcode_prefix()
    }

    /// 省份名称 -> 邮编前缀，只做精确匹配
    pub fn dept_name_to_zipcode(&self, name: impl AsRef<[u8]>) -> Option<String> {
        self.tables
            .departments
            .find_by_name(name)
            .map(Department::zipcode_prefix)
    }

    /// 省份名称 -> 省份编码
    pub fn dept_name_to_code(&self, name: impl AsRef<[u8]>) -> Option<String> {
        self.tables.departments.find_by_name(name).map(|d| d.code.clone())
    }

    /// 国家名称 -> ISO 3166-1 二位编码
    ///
    /// 文本可以带 "Pays :" 之类的前缀，也可以是一整句话或多行地址。
    ///
    /// ```rust
    /// use frgeo::{Lang, Resolver};
    ///
    /// let resolver = Resolver::global();
    /// assert_eq!(resolver.country_name_to_id("Pays:France ?", Lang::Fr).as_deref(), Some("FR"));
    /// assert_eq!(resolver.country_name_to_id("sweden", Lang::En).as_deref(), Some("SE"));
    /// ```
    pub fn country_name_to_id(&self, text: impl AsRef<[u8]>, lang: Lang) -> Option<String> {
        self.tables.countries.lookup(text, Some(lang)).map(str::to_string)
    }

    /// ISO 编码 -> 国家标准名称
    pub fn country_id_to_name(&self, code: &str, lang: Lang) -> Option<String> {
        self.tables.countries.name_of(code, lang).map(str::to_string)
    }

    /// 大区编号 -> 名称
    pub fn region_id_to_name(&self, id: &str) -> Option<String> {
        self.tables.regions.get(id).map(|r| r.name.clone())
    }

    /// 大区名称 -> 编号
    pub fn region_name_to_id(&self, name: impl AsRef<[u8]>) -> Option<String> {
        self.tables.regions.find_by_name(name).map(|r| r.id.clone())
    }

    /// 大区编号 -> 大区及其下属省份
    pub fn region_info_from_id(&self, id: &str) -> Option<RegionInfo> {
        self.tables.regions.get(id).map(|r| self.region_info(r))
    }

    /// 大区名称 -> 大区及其下属省份
    pub fn region_info_from_name(&self, name: impl AsRef<[u8]>) -> Option<RegionInfo> {
        self.tables.regions.find_by_name(name).map(|r| self.region_info(r))
    }

    /// 全部省份，按编码排序
    pub fn departments(&self) -> Vec<&Department> {
        self.tables.departments.all()
    }

    /// 全部大区，按编号排序
    pub fn regions(&self) -> Vec<&Region> {
        self.tables.regions.all()
    }

    fn resolve_department(&self, input: impl AsRef<[u8]>) -> Option<&Department> {
        let input: String = decode(input.as_ref())
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .collect();
        self.tables.departments.resolve(&input)
    }

    fn region_info(&self, region: &Region) -> RegionInfo {
        RegionInfo {
            id: region.id.clone(),
            name: region.name.clone(),
            departments: self
                .tables
                .departments
                .in_region(&region.id)
                .into_iter()
                .cloned()
                .collect(),
        }
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}
