//! 行政区划数据结构与解析结果

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::data::ReferenceTables;
use crate::error::GeoError;
use crate::normalize::slugify;

/// 省份（département）记录
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Department {
    /// 编码（`33`、`2A`、`971`）
    pub code: String,
    /// 标准名称（`Loire-Atlantique`）
    pub name: String,
    /// 所属大区编号（海外集体可能为空）
    pub region: Option<String>,
}

impl Department {
    /// 创建新的省份记录
    pub fn new(code: impl Into<String>, name: impl Into<String>, region: Option<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            region,
        }
    }

    /// 短横线形式的名称（`loire-atlantique`）
    pub fn slug(&self) -> String {
        slugify(&self.name)
    }

    /// 邮编前缀形式的编码，科西嘉写作 `20A` / `20B`
    pub fn zipcode_prefix(&self) -> String {
        zipcode_prefix_of(&self.code)
    }
}

/// 省份编码转换为邮编前缀形式
pub(crate) fn zipcode_prefix_of(code: &str) -> String {
    match code {
        "2A" => "20A".to_string(),
        "2B" => "20B".to_string(),
        other => other.to_string(),
    }
}

/// 大区记录
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Region {
    /// INSEE 大区编号
    pub id: String,
    /// 名称
    pub name: String,
}

/// 大区及其下属省份
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RegionInfo {
    pub id: String,
    pub name: String,
    /// 按编码排序
    pub departments: Vec<Department>,
}

impl RegionInfo {
    /// 下属省份编码列表
    pub fn department_codes(&self) -> Vec<&str> {
        self.departments.iter().map(|d| d.code.as_str()).collect()
    }
}

/// 国家别名表的语言
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Lang {
    #[default]
    Fr,
    En,
}

impl Lang {
    pub const ALL: [Lang; 2] = [Lang::Fr, Lang::En];

    pub fn as_str(&self) -> &'static str {
        match self {
            Lang::Fr => "FR",
            Lang::En => "EN",
        }
    }
}

impl fmt::Display for Lang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Lang {
    type Err = GeoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "FR" => Ok(Lang::Fr),
            "EN" => Ok(Lang::En),
            _ => Err(GeoError::UnknownLanguage(s.to_string())),
        }
    }
}

/// 地址解析结果
///
/// 省份编码在构造时由邮编推导并缓存，推导规则与
/// [`zipcode_to_dept_name`](crate::zipcode_to_dept_name) 完全相同。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Address {
    /// 原始输入（宽松解码后）
    pub raw: String,
    /// 五位邮编
    pub zipcode: Option<String>,
    department: Option<String>,
}

impl Address {
    /// 使用参考表构造解析结果
    pub fn new(raw: impl Into<String>, zipcode: Option<String>, tables: &ReferenceTables) -> Self {
        let department = zipcode
            .as_deref()
            .and_then(|z| tables.departments.code_for_zipcode(z))
            .map(str::to_string);
        Self {
            raw: raw.into(),
            zipcode,
            department,
        }
    }

    /// 未识别出邮编的结果
    pub fn empty(raw: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            ..Self::default()
        }
    }

    /// 是否识别出了邮编
    pub fn has_zipcode(&self) -> bool {
        self.zipcode.is_some()
    }

    /// 省份编码（`33`、`2A`、`978`）
    pub fn department(&self) -> Option<&str> {
        self.department.as_deref()
    }

    /// 邮编前缀形式的省份编码（`33`、`20A`、`978`）
    pub fn zipcode_prefix(&self) -> Option<String> {
        self.department.as_deref().map(zipcode_prefix_of)
    }

    /// 查询省份完整记录
    pub fn department_info<'t>(&self, tables: &'t ReferenceTables) -> Option<&'t Department> {
        self.department().and_then(|code| tables.departments.get(code))
    }
}
