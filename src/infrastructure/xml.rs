//! XML 元素树 - 基础设施层
//!
//! 远端服务的请求与回应都是 XML。这里提供一个小型的自有元素树：
//! 用 quick-xml 解析成 `XmlElement`，再由 `to_xml` 序列化回字符串。
//! 不认识任何业务实体。

use crate::error::{AppError, AppResult, XmlError};
use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use std::fmt;

/// XML 节点
#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

/// XML 元素
#[derive(Debug, Clone, PartialEq)]
pub struct XmlElement {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<XmlNode>,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// 解析完整的 XML 文档，返回根元素
    pub fn parse(xml: &str) -> AppResult<Self> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            let event = reader.read_event().map_err(|cause| XmlError::Parse {
                position: reader.buffer_position(),
                cause,
            })?;

            match event {
                Event::Start(ref e) => {
                    stack.push(element_from_start(e, reader.buffer_position())?);
                }
                Event::Empty(ref e) => {
                    let element = element_from_start(e, reader.buffer_position())?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| AppError::malformed_xml("出现多余的结束标签"))?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::Text(e) => {
                    let text = e.unescape().map_err(|cause| XmlError::Parse {
                        position: reader.buffer_position(),
                        cause,
                    })?;
                    push_text(&mut stack, &text)?;
                }
                Event::CData(e) => {
                    let text = String::from_utf8_lossy(&e).into_owned();
                    push_text(&mut stack, &text)?;
                }
                Event::Eof => break,
                // 声明、注释、处理指令一律忽略
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(AppError::malformed_xml(format!(
                "元素 <{}> 未闭合",
                open.name
            )));
        }
        root.ok_or_else(|| AppError::malformed_xml("文档中没有任何元素"))
    }

    /// 解析 inner XML 片段（可以有多个顶层节点）
    pub fn parse_fragment(fragment: &str) -> AppResult<Vec<XmlNode>> {
        let wrapped = format!("<Fragment>{}</Fragment>", fragment);
        Ok(Self::parse(&wrapped)?.children)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        if !text.is_empty() {
            self.children.push(XmlNode::Text(text));
        }
        self
    }

    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(XmlNode::Element(child));
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = XmlElement>) -> Self {
        self.children
            .extend(children.into_iter().map(XmlNode::Element));
        self
    }

    /// 以 inner XML 片段作为子节点，片段会先被解析检查
    pub fn with_fragment(mut self, fragment: &str) -> AppResult<Self> {
        self.children.extend(Self::parse_fragment(fragment)?);
        Ok(self)
    }

    pub fn push_child(&mut self, child: XmlElement) {
        self.children.push(XmlNode::Element(child));
    }

    /// 第一个指定名称的子元素
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.elements().find(|e| e.name == name)
    }

    /// 所有指定名称的子元素
    pub fn children<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> + 'a {
        self.elements().filter(move |e| e.name == name)
    }

    /// 所有子元素
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(e) => Some(e),
            XmlNode::Text(_) => None,
        })
    }

    pub fn has_elements(&self) -> bool {
        self.elements().next().is_some()
    }

    /// 直接文本内容（不含子元素的文本）
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                XmlNode::Text(t) => Some(t.as_str()),
                XmlNode::Element(_) => None,
            })
            .collect()
    }

    /// 子元素的文本，去除首尾空白；不存在或为空时返回 None
    pub fn child_text(&self, name: &str) -> Option<String> {
        self.child(name)
            .map(|e| e.text().trim().to_string())
            .filter(|t| !t.is_empty())
    }

    /// 以 "A/B/C" 形式逐层查找子元素
    pub fn path(&self, path: &str) -> Option<&XmlElement> {
        path.split('/')
            .filter(|seg| !seg.is_empty())
            .try_fold(self, |current, seg| current.child(seg))
    }

    /// 子节点序列化后的字符串
    pub fn inner_xml(&self) -> String {
        let mut out = String::new();
        for node in &self.children {
            write_node(node, &mut out);
        }
        out
    }

    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        write_element(self, &mut out);
        out
    }
}

impl fmt::Display for XmlElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_xml())
    }
}

// ========== 辅助函数 ==========

fn element_from_start(e: &BytesStart, position: usize) -> AppResult<XmlElement> {
    let mut element = XmlElement::new(String::from_utf8_lossy(e.name().as_ref()).into_owned());
    for attr in e.attributes() {
        let attr = attr.map_err(|cause| XmlError::Parse {
            position,
            cause: cause.into(),
        })?;
        let value = attr
            .unescape_value()
            .map_err(|cause| XmlError::Parse { position, cause })?;
        element.attributes.push((
            String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
            value.into_owned(),
        ));
    }
    Ok(element)
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> AppResult<()> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(XmlNode::Element(element));
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(element);
            Ok(())
        }
        None => Err(AppError::malformed_xml(format!(
            "文档有多个根元素: <{}>",
            element.name
        ))),
    }
}

fn push_text(stack: &mut [XmlElement], text: &str) -> AppResult<()> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(XmlNode::Text(text.to_string()));
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err(AppError::malformed_xml("根元素之外出现文本")),
    }
}

fn write_node(node: &XmlNode, out: &mut String) {
    match node {
        XmlNode::Element(e) => write_element(e, out),
        XmlNode::Text(t) => out.push_str(&escape(t.as_str())),
    }
}

fn write_element(element: &XmlElement, out: &mut String) {
    out.push('<');
    out.push_str(&element.name);
    for (key, value) in &element.attributes {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        out.push_str(&escape(value.as_str()));
        out.push('"');
    }
    if element.children.is_empty() {
        out.push_str("/>");
        return;
    }
    out.push('>');
    for node in &element.children {
        write_node(node, out);
    }
    out.push_str("</");
    out.push_str(&element.name);
    out.push('>');
}
