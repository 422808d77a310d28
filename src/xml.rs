//! Minimal element tree on top of quick-xml
//!
//! Both input dialects are small, attribute-driven documents, so they are
//! read into a generic tree first and mapped onto typed models afterwards.

use anyhow::{anyhow, Context, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    /// Local name, namespace prefix stripped
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Element>,
}

impl Element {
    pub fn parse(content: &str) -> Result<Element> {
        let mut reader = Reader::from_str(content);
        reader.trim_text(true);

        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    stack.push(Element::from_start(e)?);
                }
                Ok(Event::Empty(ref e)) => {
                    let element = Element::from_start(e)?;
                    attach(&mut stack, &mut root, element);
                }
                Ok(Event::End(_)) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| anyhow!("Unbalanced closing tag at byte {}", reader.buffer_position()))?;
                    attach(&mut stack, &mut root, element);
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(anyhow!(
                        "Error parsing XML at byte {}: {}",
                        reader.buffer_position(),
                        e
                    ))
                }
                _ => {}
            }
            buf.clear();
        }

        if let Some(open) = stack.last() {
            anyhow::bail!("Unexpected end of document inside <{}>", open.name);
        }

        root.ok_or_else(|| anyhow!("Document has no root element"))
    }

    fn from_start(e: &BytesStart) -> Result<Element> {
        let name = String::from_utf8_lossy(e.local_name().as_ref()).to_string();

        let mut attributes = Vec::new();
        for attr in e.attributes() {
            let attr = attr.with_context(|| format!("Invalid attribute on <{}>", name))?;
            let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).to_string();
            let value = attr
                .unescape_value()
                .with_context(|| format!("Invalid value for {}@{}", name, key))?
                .to_string();
            attributes.push((key, value));
        }

        Ok(Element {
            name,
            attributes,
            children: Vec::new(),
        })
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Attribute as a string, empty when absent
    pub fn attr_or_empty(&self, key: &str) -> String {
        self.attr(key).unwrap_or_default().to_string()
    }

    /// Required non-negative count attribute
    pub fn count(&self, key: &str) -> Result<u64> {
        let value = self
            .attr(key)
            .ok_or_else(|| anyhow!("<{}> is missing attribute '{}'", self.name, key))?;
        value
            .trim()
            .parse::<u64>()
            .with_context(|| format!("<{}> has invalid {}=\"{}\"", self.name, key, value))
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    pub fn has_child(&self, name: &str) -> bool {
        self.children.iter().any(|c| c.name == name)
    }
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => {
            if root.is_none() {
                *root = Some(element);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tree() {
        let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<!-- comment -->
<Root xmlns="urn:test" Total="3">
    <Child Name="a &amp; b"/>
    <Child Name="List&lt;T&gt;">
        <Leaf/>
    </Child>
</Root>"#;

        let root = Element::parse(xml).unwrap();
        assert_eq!(root.name, "Root");
        assert_eq!(root.count("Total").unwrap(), 3);
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[0].attr("Name"), Some("a & b"));
        assert_eq!(root.children[1].attr("Name"), Some("List<T>"));
        assert!(root.children[1].has_child("Leaf"));
        assert_eq!(root.children_named("Child").count(), 2);
    }

    #[test]
    fn test_prefixed_names_use_local_part() {
        let root = Element::parse(r#"<b:cov xmlns:b="urn:x"><b:folder b:name="src"/></b:cov>"#).unwrap();
        assert_eq!(root.name, "cov");
        assert_eq!(root.children[0].name, "folder");
        assert_eq!(root.children[0].attr("name"), Some("src"));
    }

    #[test]
    fn test_missing_and_invalid_counts() {
        let root = Element::parse(r#"<fn fn_cov="x"/>"#).unwrap();
        assert!(root.count("fn_total").is_err());
        assert!(root.count("fn_cov").is_err());
        assert_eq!(root.attr_or_empty("name"), "");
    }

    #[test]
    fn test_malformed_document() {
        assert!(Element::parse("<a><b></a>").is_err());
        assert!(Element::parse("").is_err());
        assert!(Element::parse("<a>").is_err());
    }
}
