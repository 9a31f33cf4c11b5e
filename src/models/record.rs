//! 记录与 XML 元素之间的映射
//!
//! 每种实体实现 `Record`：描述自己的元素名、服务名，以及字段如何读写。
//! 下方的字段辅助函数统一处理空值、数字、是/否旗标与 XML 片段。

use crate::error::{AppError, AppResult};
use crate::infrastructure::xml::XmlElement;
use std::fmt::Display;

/// 一个实体对应的四个远端服务
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceNames {
    pub select: &'static str,
    pub insert: &'static str,
    pub update: &'static str,
    pub delete: &'static str,
}

/// 记录：一个 XML 实体元素的平面数据
pub trait Record: Clone + Send + Sync + 'static {
    /// 实体元素名（如 `Exam`）
    const ELEMENT: &'static str;
    /// 远端服务名
    const SERVICES: ServiceNames;
    /// 更新/删除时作为条件的键字段
    const KEY_FIELD: &'static str = "ID";

    /// 系统编号；尚未保存的记录为 None
    fn id(&self) -> Option<&str>;

    /// 从实体元素解析
    fn from_element(element: &XmlElement) -> AppResult<Self>;

    /// 字段元素（新增与更新共用）
    fn field_elements(&self) -> AppResult<Vec<XmlElement>>;
}

// ========== 读取 ==========

/// 系统编号：优先取 `ID` 属性，其次取 `<ID>` 子元素
pub fn read_id(element: &XmlElement) -> Option<String> {
    element
        .attribute("ID")
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .or_else(|| element.child_text("ID"))
}

/// 文本字段，缺少时为空字符串
pub fn read_text(element: &XmlElement, field: &str) -> String {
    element.child_text(field).unwrap_or_default()
}

pub fn read_opt_text(element: &XmlElement, field: &str) -> Option<String> {
    element.child_text(field)
}

/// 小数字段；空值为 None，非数字为错误
pub fn read_decimal(element: &XmlElement, field: &str) -> AppResult<Option<f64>> {
    parse_decimal(element.name(), field, element.child_text(field))
}

/// 整数字段；空值为 None，非数字为错误
pub fn read_int(element: &XmlElement, field: &str) -> AppResult<Option<i32>> {
    match element.child_text(field) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<i32>()
            .map(Some)
            .map_err(|_| AppError::invalid_field(element.name(), field, raw, "整数")),
    }
}

/// 是/否旗标
pub fn read_flag(element: &XmlElement, field: &str) -> bool {
    element
        .child_text(field)
        .map(|v| parse_flag(&v))
        .unwrap_or(false)
}

/// XML 片段字段：保留子元素的 inner XML；缺少或为空时为 None
pub fn read_fragment(element: &XmlElement, field: &str) -> Option<String> {
    element
        .child(field)
        .map(|e| e.inner_xml().trim().to_string())
        .filter(|xml| !xml.is_empty())
}

/// 属性中的小数
pub fn read_attr_decimal(element: &XmlElement, attr: &str) -> AppResult<Option<f64>> {
    let raw = element
        .attribute(attr)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
    parse_decimal(element.name(), attr, raw)
}

pub fn parse_flag(raw: &str) -> bool {
    let raw = raw.trim();
    raw == "是" || raw == "1" || raw.eq_ignore_ascii_case("true")
}

fn parse_decimal(element: &str, field: &str, raw: Option<String>) -> AppResult<Option<f64>> {
    match raw {
        None => Ok(None),
        Some(raw) => match raw.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(Some(value)),
            _ => Err(AppError::invalid_field(element, field, raw, "数字")),
        },
    }
}

// ========== 写入 ==========

pub fn text_field(name: &str, value: &str) -> XmlElement {
    XmlElement::new(name).with_text(value)
}

/// 可选值字段；None 写成空元素（更新时即清空）
pub fn opt_field<T: Display>(name: &str, value: Option<T>) -> XmlElement {
    match value {
        Some(v) => XmlElement::new(name).with_text(v.to_string()),
        None => XmlElement::new(name),
    }
}

/// 旗标字段，写成「是」/「否」
pub fn flag_field(name: &str, value: bool) -> XmlElement {
    XmlElement::new(name).with_text(if value { "是" } else { "否" })
}

/// XML 片段字段；片段会先被解析检查
pub fn fragment_field(name: &str, fragment: Option<&str>) -> AppResult<XmlElement> {
    match fragment {
        Some(xml) if !xml.trim().is_empty() => XmlElement::new(name).with_fragment(xml),
        _ => Ok(XmlElement::new(name)),
    }
}
