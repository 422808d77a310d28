//! dotCover XML model
//!
//! `Root → Assembly → (Namespace →) Type`, where types nest types and hold
//! member-like entries. Methods, constructors and accessors may carry
//! anonymous-method detail instead of a single ratio.

mod convert;

pub use convert::*;

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::coverage::Ratio;
use crate::xml::Element;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DotCoverReport {
    pub statements: Ratio,
    /// `None` when the document declares no assemblies at all
    pub assemblies: Option<Vec<Assembly>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assembly {
    pub name: String,
    pub statements: Ratio,
    pub namespaces: Vec<Namespace>,
    /// Types declared outside any namespace
    pub types: Vec<Type>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Namespace {
    pub name: String,
    pub statements: Ratio,
    pub types: Vec<Type>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Type {
    pub name: String,
    pub statements: Ratio,
    /// `None` when the element had no member or nested type children
    pub items: Option<Vec<TypeItem>>,
}

/// Children of a type, in document order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeItem {
    Type(Type),
    Member(Member),
    Method(MethodNode),
    Constructor(MethodNode),
    Property(Accessors),
    Event(Accessors),
}

/// A member with a ratio and no further detail
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Member {
    pub name: String,
    pub statements: Ratio,
}

/// A method, constructor or anonymous method
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MethodNode {
    pub name: String,
    pub statements: Ratio,
    /// Own coverage split from nested anonymous methods, when reported
    pub detail: Option<Vec<Detail>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Detail {
    OwnCoverage(Ratio),
    AnonymousMethod(MethodNode),
}

/// A property or event and its accessor methods
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Accessors {
    pub name: String,
    pub methods: Vec<MethodNode>,
}

impl DotCoverReport {
    pub fn assemblies(&self) -> &[Assembly] {
        self.assemblies.as_deref().unwrap_or(&[])
    }

    /// Replace absent collections with empty ones so walks need no checks
    pub fn normalize(&mut self) {
        let assemblies = self.assemblies.get_or_insert_with(Vec::new);
        for assembly in assemblies.iter_mut() {
            for ns in &mut assembly.namespaces {
                ns.types.iter_mut().for_each(Type::normalize);
            }
            assembly.types.iter_mut().for_each(Type::normalize);
        }
    }
}

impl Type {
    pub fn items(&self) -> &[TypeItem] {
        self.items.as_deref().unwrap_or(&[])
    }

    pub fn nested(&self) -> impl Iterator<Item = &Type> {
        self.items().iter().filter_map(|item| match item {
            TypeItem::Type(t) => Some(t),
            _ => None,
        })
    }

    fn normalize(&mut self) {
        for item in self.items.get_or_insert_with(Vec::new).iter_mut() {
            if let TypeItem::Type(inner) = item {
                inner.normalize();
            }
        }
    }
}

pub fn parse_dotcover(path: &Path) -> Result<DotCoverReport> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read dotCover report: {}", path.display()))?;
    parse_dotcover_string(&content)
        .with_context(|| format!("Invalid dotCover report: {}", path.display()))
}

pub fn parse_dotcover_string(content: &str) -> Result<DotCoverReport> {
    let root = Element::parse(content)?;
    if root.name != "Root" {
        anyhow::bail!("Expected dotCover <Root> element, found <{}>", root.name);
    }

    let assemblies = if root.has_child("Assembly") {
        Some(
            root.children_named("Assembly")
                .map(read_assembly)
                .collect::<Result<Vec<_>>>()?,
        )
    } else {
        None
    };

    Ok(DotCoverReport {
        statements: statements(&root)?,
        assemblies,
    })
}

fn statements(e: &Element) -> Result<Ratio> {
    Ok(Ratio::new(
        e.count("CoveredStatements")?,
        e.count("TotalStatements")?,
    ))
}

fn read_types(e: &Element) -> Result<Vec<Type>> {
    e.children_named("Type").map(read_type).collect()
}

fn read_assembly(e: &Element) -> Result<Assembly> {
    Ok(Assembly {
        name: e.attr_or_empty("Name"),
        statements: statements(e)?,
        namespaces: e
            .children_named("Namespace")
            .map(|ns| {
                Ok(Namespace {
                    name: ns.attr_or_empty("Name"),
                    statements: statements(ns)?,
                    types: read_types(ns)?,
                })
            })
            .collect::<Result<Vec<_>>>()?,
        types: read_types(e)?,
    })
}

fn read_type(e: &Element) -> Result<Type> {
    let mut items = Vec::new();
    for child in &e.children {
        let item = match child.name.as_str() {
            "Type" => TypeItem::Type(read_type(child)?),
            "Member" => TypeItem::Member(Member {
                name: child.attr_or_empty("Name"),
                statements: statements(child)?,
            }),
            "Method" => TypeItem::Method(read_method(child)?),
            "Constructor" => TypeItem::Constructor(read_method(child)?),
            "Property" => TypeItem::Property(read_accessors(child)?),
            "Event" => TypeItem::Event(read_accessors(child)?),
            _ => continue,
        };
        items.push(item);
    }

    Ok(Type {
        name: e.attr_or_empty("Name"),
        statements: statements(e)?,
        items: if items.is_empty() { None } else { Some(items) },
    })
}

fn read_method(e: &Element) -> Result<MethodNode> {
    let mut detail = Vec::new();
    for child in &e.children {
        match child.name.as_str() {
            "OwnCoverage" => detail.push(Detail::OwnCoverage(statements(child)?)),
            "AnonymousMethod" => detail.push(Detail::AnonymousMethod(read_method(child)?)),
            _ => {}
        }
    }

    Ok(MethodNode {
        name: e.attr_or_empty("Name"),
        statements: statements(e)?,
        detail: if detail.is_empty() { None } else { Some(detail) },
    })
}

fn read_accessors(e: &Element) -> Result<Accessors> {
    Ok(Accessors {
        name: e.attr_or_empty("Name"),
        methods: e
            .children_named("Method")
            .map(read_method)
            .collect::<Result<Vec<_>>>()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<Root CoveredStatements="6" TotalStatements="12" CoveragePercent="50" ReportType="Xml" DotCoverVersion="2023.1">
  <Assembly Name="Acme" CoveredStatements="6" TotalStatements="12" CoveragePercent="50">
    <Namespace Name="Acme.Core" CoveredStatements="6" TotalStatements="10" CoveragePercent="60">
      <Type Name="Widget" CoveredStatements="6" TotalStatements="10" CoveragePercent="60">
        <Constructor Name="Widget()" CoveredStatements="1" TotalStatements="1" CoveragePercent="100"/>
        <Method Name="Run():void" CoveredStatements="3" TotalStatements="5" CoveragePercent="60">
          <OwnCoverage CoveredStatements="2" TotalStatements="3" CoveragePercent="67"/>
          <AnonymousMethod Name="Anonymous method #1" CoveredStatements="1" TotalStatements="2" CoveragePercent="50"/>
        </Method>
        <Property Name="Size:int" CoveredStatements="2" TotalStatements="2" CoveragePercent="100">
          <Method Name="get_Size():int" CoveredStatements="2" TotalStatements="2" CoveragePercent="100"/>
        </Property>
        <Type Name="Part" CoveredStatements="0" TotalStatements="2" CoveragePercent="0">
          <Member Name="Bolt" CoveredStatements="0" TotalStatements="2" CoveragePercent="0"/>
        </Type>
      </Type>
    </Namespace>
    <Type Name="Loose" CoveredStatements="0" TotalStatements="2" CoveragePercent="0"/>
  </Assembly>
</Root>"#;

    #[test]
    fn test_parse_dotcover() {
        let report = parse_dotcover_string(REPORT).unwrap();
        assert_eq!(report.statements, Ratio::new(6, 12));

        let assembly = &report.assemblies()[0];
        assert_eq!(assembly.name, "Acme");
        assert_eq!(assembly.namespaces.len(), 1);
        assert_eq!(assembly.types.len(), 1);
        assert_eq!(assembly.types[0].items, None);

        let widget = &assembly.namespaces[0].types[0];
        assert_eq!(widget.items().len(), 4);
        assert_eq!(widget.nested().count(), 1);

        match &widget.items()[1] {
            TypeItem::Method(m) => {
                let detail = m.detail.as_ref().unwrap();
                assert_eq!(detail.len(), 2);
                assert_eq!(detail[0], Detail::OwnCoverage(Ratio::new(2, 3)));
            }
            other => panic!("expected method, got {:?}", other),
        }
        match &widget.items()[2] {
            TypeItem::Property(p) => {
                assert_eq!(p.name, "Size:int");
                assert_eq!(p.methods[0].detail, None);
            }
            other => panic!("expected property, got {:?}", other),
        }
    }

    #[test]
    fn test_normalize_fills_absent_collections() {
        let mut report = parse_dotcover_string(
            r#"<Root CoveredStatements="0" TotalStatements="0"/>"#,
        )
        .unwrap();
        assert_eq!(report.assemblies, None);
        report.normalize();
        assert_eq!(report.assemblies, Some(Vec::new()));

        let mut report = parse_dotcover_string(REPORT).unwrap();
        report.normalize();
        let assembly = &report.assemblies()[0];
        assert_eq!(assembly.types[0].items, Some(Vec::new()));
        let part = assembly.namespaces[0].types[0].nested().next().unwrap();
        assert!(part.items.is_some());
    }

    #[test]
    fn test_missing_statements_fails() {
        let xml = r#"<Root CoveredStatements="0" TotalStatements="0"><Assembly Name="A" CoveredStatements="0"/></Root>"#;
        assert!(parse_dotcover_string(xml).is_err());
    }
}
