//! Read back the summary of an existing EMMA report

use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;

use super::Stats;
use crate::coverage::{CoverageEntry, Quadruple};
use crate::xml::Element;

#[derive(Debug, Clone, Serialize)]
pub struct PackageSummary {
    pub name: String,
    pub coverage: Quadruple,
}

/// Statistics and top-level coverage of an EMMA report
#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    pub name: String,
    pub stats: Stats,
    pub coverage: Quadruple,
    pub packages: Vec<PackageSummary>,
}

pub fn read_summary_file(path: &Path) -> Result<ReportSummary> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read EMMA report: {}", path.display()))?;
    read_summary(&content).with_context(|| format!("Invalid EMMA report: {}", path.display()))
}

pub fn read_summary(content: &str) -> Result<ReportSummary> {
    let root = Element::parse(content)?;
    if root.name != "report" {
        anyhow::bail!("Expected <report> root element, found <{}>", root.name);
    }

    let stats = root
        .children_named("stats")
        .next()
        .map(read_stats)
        .transpose()?
        .unwrap_or_default();

    let all = root
        .children_named("data")
        .flat_map(|data| data.children_named("all"))
        .next()
        .ok_or_else(|| anyhow!("Report has no data/all element"))?;

    let packages = all
        .children_named("package")
        .map(|package| {
            Ok(PackageSummary {
                name: package.attr_or_empty("name"),
                coverage: read_coverage(package)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ReportSummary {
        name: all.attr_or_empty("name"),
        stats,
        coverage: read_coverage(all)?,
        packages,
    })
}

fn read_stats(stats: &Element) -> Result<Stats> {
    let value = |tag: &str| -> Result<u64> {
        match stats.children_named(tag).next() {
            Some(e) => e.count("value"),
            None => Ok(0),
        }
    };

    Ok(Stats {
        packages: value("packages")?,
        classes: value("classes")?,
        methods: value("methods")?,
        srcfiles: value("srcfiles")?,
        srclines: value("srclines")?,
    })
}

fn read_coverage(node: &Element) -> Result<Quadruple> {
    let entries: Vec<CoverageEntry> = node
        .children_named("coverage")
        .map(|e| CoverageEntry {
            kind: e.attr_or_empty("type"),
            value: e.attr_or_empty("value"),
        })
        .collect();

    Quadruple::from_entries(&entries)
        .with_context(|| format!("Bad coverage on <{} name=\"{}\">", node.name, node.attr_or_empty("name")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coverage::Ratio;
    use crate::error::CoverageError;

    const REPORT: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<report>
  <stats>
    <packages value="1"/>
    <classes value="2"/>
    <methods value="5"/>
    <srcfiles value="2"/>
    <srclines value="40"/>
  </stats>
  <data>
    <all name="all classes">
      <coverage type="class, %" value="50%  (1/2)"/>
      <coverage type="method, %" value="60%  (3/5)"/>
      <coverage type="block, %" value="25%  (10/40)"/>
      <coverage type="line, %" value="25%  (10/40)"/>
      <package name="Acme.Core">
        <coverage type="class, %" value="50%  (1/2)"/>
        <coverage type="method, %" value="60%  (3/5)"/>
        <coverage type="block, %" value="25%  (10/40)"/>
        <coverage type="line, %" value="25%  (10/40)"/>
      </package>
    </all>
  </data>
</report>"#;

    #[test]
    fn test_read_summary() {
        let summary = read_summary(REPORT).unwrap();
        assert_eq!(summary.name, "all classes");
        assert_eq!(summary.stats.methods, 5);
        assert_eq!(summary.stats.srclines, 40);
        assert_eq!(summary.coverage.block, Ratio::new(10, 40));
        assert_eq!(summary.packages.len(), 1);
        assert_eq!(summary.packages[0].name, "Acme.Core");
        assert_eq!(summary.packages[0].coverage.method, Ratio::new(3, 5));
    }

    #[test]
    fn test_malformed_value_aborts() {
        let broken = REPORT.replace("60%  (3/5)", "60%");
        let err = read_summary(&broken).unwrap_err();
        assert_eq!(
            err.downcast_ref::<CoverageError>(),
            Some(&CoverageError::MalformedRatio("60%".to_string()))
        );
    }

    #[test]
    fn test_unknown_label_aborts() {
        let broken = REPORT.replacen("class, %", "branch, %", 1);
        let err = read_summary(&broken).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CoverageError>(),
            Some(CoverageError::UnknownMetric(_))
        ));
    }

    #[test]
    fn test_wrong_root() {
        assert!(read_summary("<coverage/>").is_err());
    }
}
