//! 参考数据加载和索引构建

use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, warn};
use once_cell::sync::Lazy;

use crate::error::{GeoError, Result};
use crate::lookup::{lookup_exact, lookup_name, NameTable};
use crate::region::{Department, Lang, Region};

/// 内嵌的省份数据（编译时包含）
const DEPARTMENTS_CSV: &str = include_str!("../data/departments.csv");
/// 内嵌的大区数据
const REGIONS_CSV: &str = include_str!("../data/regions.csv");
/// 内嵌的国家别名数据
const COUNTRIES_CSV: &str = include_str!("../data/countries.csv");

/// 全局参考表
static GLOBAL_TABLES: Lazy<Arc<ReferenceTables>> = Lazy::new(|| Arc::new(ReferenceTables::builtin()));

/// 全部参考表，构建后只读
#[derive(Debug)]
pub struct ReferenceTables {
    pub departments: DepartmentTable,
    pub regions: RegionTable,
    pub countries: CountryTable,
}

impl ReferenceTables {
    /// 从 CSV 文本构建参考表
    ///
    /// - 省份：`code,name,region,aliases`
    /// - 大区：`id,name,aliases`
    /// - 国家：`code,lang,name`
    ///
    /// 别名列用 `|` 分隔。
    pub fn load(departments_csv: &str, regions_csv: &str, countries_csv: &str) -> Result<Self> {
        let regions = RegionTable::load(regions_csv)?;
        let departments = DepartmentTable::load(departments_csv, &regions)?;
        let countries = CountryTable::load(countries_csv)?;

        debug!(
            "loaded {} departments, {} regions, {} country aliases",
            departments.by_code.len(),
            regions.by_id.len(),
            countries.merged.len()
        );

        Ok(Self {
            departments,
            regions,
            countries,
        })
    }

    /// 加载内嵌数据
    ///
    /// 内嵌数据有误属于编程错误，直接 panic。
    pub fn builtin() -> Self {
        Self::load(DEPARTMENTS_CSV, REGIONS_CSV, COUNTRIES_CSV).expect("bundled reference data is valid")
    }

    /// 全局实例（首次访问时加载一次）
    pub fn global() -> &'static ReferenceTables {
        &GLOBAL_TABLES
    }

    /// 全局实例的共享引用
    pub fn shared() -> Arc<ReferenceTables> {
        Arc::clone(&GLOBAL_TABLES)
    }
}

/// 省份表
#[derive(Debug)]
pub struct DepartmentTable {
    /// 编码 -> 省份
    by_code: HashMap<String, Department>,
    /// 标准化名称及别名 -> 编码
    names: NameTable,
}

impl DepartmentTable {
    fn load(data: &str, regions: &RegionTable) -> Result<Self> {
        let mut by_code = HashMap::new();
        let mut names = NameTable::new("department");

        for (line, row) in read_rows(data, &["code", "name", "region", "aliases"])? {
            let [code, name, region, aliases] = row;
            let code = code.to_ascii_uppercase();
            if code.is_empty() || name.is_empty() {
                return Err(invalid("department", line, "code and name are required"));
            }
            let region = (!region.is_empty()).then_some(region);
            if let Some(ref id) = region {
                if regions.get(id).is_none() {
                    return Err(invalid("department", line, format!("unknown region {id}")));
                }
            }

            names.insert(&name, &code, line)?;
            for alias in split_aliases(&aliases) {
                names.insert(alias, &code, line)?;
            }

            let department = Department::new(code.clone(), name, region);
            if by_code.insert(code.clone(), department).is_some() {
                return Err(invalid("department", line, format!("duplicate code {code}")));
            }
        }

        Ok(Self { by_code, names })
    }

    /// 按编码查找（大小写不敏感）
    pub fn get(&self, code: &str) -> Option<&Department> {
        self.by_code.get(code.trim().to_ascii_uppercase().as_str())
    }

    /// 由五位邮编推导省份编码
    ///
    /// 这是邮编 -> 省份的唯一推导规则：
    /// - `20` 开头：第三位为 0 或 1 时是 `2A`，否则是 `2B`
    /// - `97` / `98` 开头：取前三位
    /// - 其余取前两位
    ///
    /// 推导出的编码必须在表中存在。
    pub fn code_for_zipcode(&self, zipcode: &str) -> Option<&str> {
        if zipcode.len() != 5 || !zipcode.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let code = if zipcode.starts_with("20") {
            if matches!(zipcode.as_bytes()[2], b'0' | b'1') {
                "2A"
            } else {
                "2B"
            }
        } else if zipcode.starts_with("97") || zipcode.starts_with("98") {
            &zipcode[..3]
        } else {
            &zipcode[..2]
        };
        self.by_code.get(code).map(|d| d.code.as_str())
    }

    /// 解析省份编码、邮编前缀（`20A`）、五位邮编或丢了前导零的四位邮编
    pub fn resolve(&self, input: &str) -> Option<&Department> {
        let key = input.trim().to_ascii_uppercase();
        let all_digits = !key.is_empty() && key.bytes().all(|b| b.is_ascii_digit());

        match key.as_str() {
            "20A" => self.get("2A"),
            "20B" => self.get("2B"),
            k if all_digits && k.len() == 5 => self.code_for_zipcode(k).and_then(|c| self.get(c)),
            k if all_digits && k.len() == 4 && !k.starts_with('0') => self
                .code_for_zipcode(&format!("0{k}"))
                .and_then(|c| self.get(c)),
            k => self.get(k),
        }
    }

    /// 按名称精确查找（不纠错）
    pub fn find_by_name(&self, name: impl AsRef<[u8]>) -> Option<&Department> {
        lookup_exact(name, &self.names).and_then(|code| self.get(code))
    }

    /// 按编码排序的全部省份
    pub fn all(&self) -> Vec<&Department> {
        let mut all: Vec<&Department> = self.by_code.values().collect();
        all.sort_by(|a, b| a.code.cmp(&b.code));
        all
    }

    /// 某大区下的省份，按编码排序
    pub fn in_region(&self, region_id: &str) -> Vec<&Department> {
        self.all()
            .into_iter()
            .filter(|d| d.region.as_deref() == Some(region_id))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }
}

/// 大区表
#[derive(Debug)]
pub struct RegionTable {
    by_id: HashMap<String, Region>,
    names: NameTable,
}

impl RegionTable {
    fn load(data: &str) -> Result<Self> {
        let mut by_id = HashMap::new();
        let mut names = NameTable::new("region");

        for (line, row) in read_rows(data, &["id", "name", "aliases"])? {
            let [id, name, aliases] = row;
            if id.is_empty() || name.is_empty() {
                return Err(invalid("region", line, "id and name are required"));
            }

            names.insert(&name, &id, line)?;
            for alias in split_aliases(&aliases) {
                names.insert(alias, &id, line)?;
            }

            if by_id.insert(id.clone(), Region { id: id.clone(), name }).is_some() {
                return Err(invalid("region", line, format!("duplicate id {id}")));
            }
        }

        Ok(Self { by_id, names })
    }

    /// 按编号查找，一位数编号自动补零（`1` -> `01`）
    pub fn get(&self, id: &str) -> Option<&Region> {
        let id = id.trim();
        if id.len() == 1 {
            return self.by_id.get(&format!("0{id}"));
        }
        self.by_id.get(id)
    }

    /// 按名称查找
    pub fn find_by_name(&self, name: impl AsRef<[u8]>) -> Option<&Region> {
        lookup_exact(name, &self.names).and_then(|id| self.by_id.get(id))
    }

    /// 按编号排序的全部大区
    pub fn all(&self) -> Vec<&Region> {
        let mut all: Vec<&Region> = self.by_id.values().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        all
    }
}

/// 国家别名表
#[derive(Debug)]
pub struct CountryTable {
    by_lang: HashMap<Lang, NameTable>,
    /// 所有语言合并
    merged: NameTable,
    /// (编码, 语言) -> 标准名称
    names: HashMap<(String, Lang), String>,
}

impl CountryTable {
    fn load(data: &str) -> Result<Self> {
        let mut by_lang: HashMap<Lang, NameTable> = Lang::ALL
            .into_iter()
            .map(|lang| (lang, NameTable::new("country")))
            .collect();
        let mut merged = NameTable::new("country");
        let mut names = HashMap::new();

        for (line, row) in read_rows(data, &["code", "lang", "name"])? {
            let [code, lang, name] = row;
            if code.len() != 2 || !code.bytes().all(|b| b.is_ascii_uppercase()) {
                return Err(invalid("country", line, format!("bad ISO code {code:?}")));
            }
            let lang: Lang = lang.parse()?;

            by_lang.entry(lang).or_insert_with(|| NameTable::new("country")).insert(&name, &code, line)?;
            if !merged.insert_or_keep(&name, &code) {
                warn!("country alias {name:?} ({lang}) already names another country, kept the first");
            }
            names.entry((code, lang)).or_insert(name);
        }

        Ok(Self {
            by_lang,
            merged,
            names,
        })
    }

    /// 别名表：指定语言或所有语言
    pub fn table(&self, lang: Option<Lang>) -> &NameTable {
        lang.and_then(|l| self.by_lang.get(&l)).unwrap_or(&self.merged)
    }

    /// 在自由文本中查找国家编码
    pub fn lookup(&self, text: impl AsRef<[u8]>, lang: Option<Lang>) -> Option<&str> {
        lookup_name(text, self.table(lang))
    }

    /// 国家的标准名称
    pub fn name_of(&self, code: &str, lang: Lang) -> Option<&str> {
        self.names
            .get(&(code.trim().to_ascii_uppercase(), lang))
            .map(String::as_str)
    }
}

/// 读取 CSV，按列名取出字段，返回 (行号, 字段)
fn read_rows<const N: usize>(data: &str, columns: &[&str; N]) -> Result<Vec<(u64, [String; N])>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(data.as_bytes());

    let headers = reader.headers()?.clone();
    let mut indexes = [0usize; N];
    for (slot, column) in indexes.iter_mut().zip(columns) {
        *slot = headers
            .iter()
            .position(|h| h == *column)
            .ok_or_else(|| GeoError::DataLoadError(format!("missing column {column:?}")))?;
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let line = record.position().map_or(0, |p| p.line());
        let fields = indexes.map(|i| record.get(i).unwrap_or_default().to_string());
        rows.push((line, fields));
    }
    Ok(rows)
}

fn split_aliases(aliases: &str) -> impl Iterator<Item = &str> {
    aliases.split('|').map(str::trim).filter(|a| !a.is_empty())
}

fn invalid(table: &'static str, line: u64, reason: impl Into<String>) -> GeoError {
    GeoError::InvalidRecord {
        table,
        line,
        reason: reason.into(),
    }
}
