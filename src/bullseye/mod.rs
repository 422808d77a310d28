//! BullseyeCoverage XML model
//!
//! A `folder` / `src` / `fn` path tree where every node already carries its
//! function and condition ratios.

mod convert;

pub use convert::*;

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::coverage::Ratio;
use crate::xml::Element;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BullseyeCoverage {
    pub folders: Vec<Folder>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Folder {
    pub name: String,
    pub functions: Ratio,
    pub conditions: Ratio,
    pub items: Vec<FolderItem>,
}

/// Folder children, in document order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FolderItem {
    Folder(Folder),
    Src(Src),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Src {
    pub name: String,
    pub functions: Ratio,
    pub conditions: Ratio,
    pub fns: Vec<Function>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    /// Qualified name, e.g. `NS::Foo::Bar(int)`
    pub name: String,
    pub functions: Ratio,
    pub conditions: Ratio,
}

pub fn parse_bullseye(path: &Path) -> Result<BullseyeCoverage> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read BullseyeCoverage report: {}", path.display()))?;
    parse_bullseye_string(&content)
        .with_context(|| format!("Invalid BullseyeCoverage report: {}", path.display()))
}

pub fn parse_bullseye_string(content: &str) -> Result<BullseyeCoverage> {
    let root = Element::parse(content)?;
    if root.name != "BullseyeCoverage" {
        anyhow::bail!("Expected <BullseyeCoverage> root element, found <{}>", root.name);
    }

    let folders = root
        .children_named("folder")
        .map(read_folder)
        .collect::<Result<Vec<_>>>()?;

    Ok(BullseyeCoverage { folders })
}

fn ratios(e: &Element) -> Result<(Ratio, Ratio)> {
    Ok((
        Ratio::new(e.count("fn_cov")?, e.count("fn_total")?),
        Ratio::new(e.count("cd_cov")?, e.count("cd_total")?),
    ))
}

fn read_folder(e: &Element) -> Result<Folder> {
    let (functions, conditions) = ratios(e)?;

    let mut items = Vec::new();
    for child in &e.children {
        match child.name.as_str() {
            "folder" => items.push(FolderItem::Folder(read_folder(child)?)),
            "src" => items.push(FolderItem::Src(read_src(child)?)),
            _ => {}
        }
    }

    Ok(Folder {
        name: e.attr_or_empty("name"),
        functions,
        conditions,
        items,
    })
}

fn read_src(e: &Element) -> Result<Src> {
    let (functions, conditions) = ratios(e)?;

    let fns = e
        .children_named("fn")
        .map(|f| {
            let (functions, conditions) = ratios(f)?;
            Ok(Function {
                name: f.attr_or_empty("name"),
                functions,
                conditions,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Src {
        name: e.attr_or_empty("name"),
        functions,
        conditions,
        fns,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bullseye() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<BullseyeCoverage name="test.cov" dir="C:/work/" buildId="1" version="6" xmlns="https://www.bullseye.com/covxml" fn_cov="2" fn_total="3" cd_cov="1" cd_total="4" d_cov="1" d_total="2">
  <folder name="src" fn_cov="2" fn_total="3" cd_cov="1" cd_total="4" d_cov="1" d_total="2">
    <folder name="util" fn_cov="1" fn_total="1" cd_cov="0" cd_total="0" d_cov="0" d_total="0">
      <src name="str.cpp" mtime="1" fn_cov="1" fn_total="1" cd_cov="0" cd_total="0" d_cov="0" d_total="0">
        <fn name="trim(char*)" fn_cov="1" fn_total="1" cd_cov="0" cd_total="0" d_cov="0" d_total="0">
          <probe line="3" kind="function" event="full"/>
        </fn>
      </src>
    </folder>
    <src name="main.cpp" mtime="1" fn_cov="1" fn_total="2" cd_cov="1" cd_total="4" d_cov="1" d_total="2">
      <fn name="App::run()" fn_cov="1" fn_total="1" cd_cov="1" cd_total="2" d_cov="1" d_total="1"/>
      <fn name="App::stop()" fn_cov="0" fn_total="1" cd_cov="0" cd_total="2" d_cov="0" d_total="1"/>
    </src>
  </folder>
</BullseyeCoverage>"#;

        let data = parse_bullseye_string(xml).unwrap();
        assert_eq!(data.folders.len(), 1);

        let src = &data.folders[0];
        assert_eq!(src.name, "src");
        assert_eq!(src.conditions, Ratio::new(1, 4));
        assert_eq!(src.items.len(), 2);

        match &src.items[0] {
            FolderItem::Folder(util) => {
                assert_eq!(util.name, "util");
                assert_eq!(util.items.len(), 1);
            }
            other => panic!("expected folder, got {:?}", other),
        }
        match &src.items[1] {
            FolderItem::Src(main) => {
                assert_eq!(main.fns.len(), 2);
                assert_eq!(main.fns[1].name, "App::stop()");
                assert_eq!(main.fns[1].conditions, Ratio::new(0, 2));
            }
            other => panic!("expected src, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_ratio_attribute_fails() {
        let xml = r#"<BullseyeCoverage><folder name="a" fn_cov="1" fn_total="1" cd_cov="0"/></BullseyeCoverage>"#;
        let err = parse_bullseye_string(xml).unwrap_err();
        assert!(format!("{:#}", err).contains("cd_total"));
    }

    #[test]
    fn test_wrong_root() {
        assert!(parse_bullseye_string("<Root/>").is_err());
    }
}
