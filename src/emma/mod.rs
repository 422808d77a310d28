//! EMMA report model
//!
//! The destination tree is `Report → Package → SrcFile → Class → Method`,
//! where classes may nest classes. Both adapters build packages and hand
//! them to [`build_report`], which derives the statistics and the root
//! quadruple.

mod reader;
mod writer;

pub use reader::*;
pub use writer::*;

use serde::Serialize;

use crate::coverage::{MethodCoverage, Quadruple, Ratio};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub packages: u64,
    pub classes: u64,
    pub methods: u64,
    pub srcfiles: u64,
    pub srclines: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub stats: Stats,
    pub all: All,
}

/// The `data/all` node holding every package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct All {
    pub name: String,
    pub coverage: Quadruple,
    pub packages: Vec<Package>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    pub name: String,
    pub coverage: Quadruple,
    pub srcfiles: Vec<SrcFile>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SrcFile {
    pub name: String,
    pub coverage: Quadruple,
    pub classes: Vec<Class>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Class {
    pub name: String,
    pub coverage: Quadruple,
    /// Inner types
    pub classes: Vec<Class>,
    pub methods: Vec<Method>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Method {
    pub name: String,
    pub coverage: MethodCoverage,
}

impl Class {
    /// Visit this class and every nested class, outermost first
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Class)) {
        visit(self);
        for inner in &self.classes {
            inner.walk(visit);
        }
    }
}

impl Report {
    pub fn packages(&self) -> &[Package] {
        &self.all.packages
    }

    pub fn for_each_class<'a>(&'a self, mut visit: impl FnMut(&'a Class)) {
        for package in &self.all.packages {
            for src in &package.srcfiles {
                for class in &src.classes {
                    class.walk(&mut visit);
                }
            }
        }
    }
}

/// Per-class record collected by an adapter before the class is finalized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassRecord {
    pub name: String,
    pub methods: Vec<Method>,
    /// The class's own entry in the class ratio
    pub own: Ratio,
}

impl ClassRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            methods: Vec::new(),
            own: Ratio::default(),
        }
    }

    pub fn push(&mut self, name: impl Into<String>, coverage: MethodCoverage) {
        self.methods.push(Method {
            name: name.into(),
            coverage,
        });
    }

    /// Proportional sum of the method ratios
    pub fn method_totals(&self) -> MethodCoverage {
        let mut total = MethodCoverage::default();
        for method in &self.methods {
            total.method += method.coverage.method;
            total.block += method.coverage.block;
            total.line += method.coverage.line;
        }
        total
    }

    /// Finalize with the class ratio taken from `own` and the other three
    /// summed over the methods
    pub fn into_class(self) -> Class {
        let totals = self.method_totals();
        let coverage = Quadruple::new(self.own, totals.method, totals.block, totals.line);
        self.into_class_with(coverage, Vec::new())
    }

    pub fn into_class_with(self, coverage: Quadruple, classes: Vec<Class>) -> Class {
        Class {
            name: self.name,
            coverage,
            classes,
            methods: self.methods,
        }
    }
}

/// How `stats.srcfiles` is derived
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SrcFileCount {
    /// Number of `SrcFile` nodes in the tree
    Files,
    /// Same as the class count, for dialects without file names
    Classes,
}

/// Assemble the report envelope around finished packages.
///
/// The root quadruple is the plain sum of the package quadruples.
pub fn build_report(
    all_name: &str,
    packages: Vec<Package>,
    srcfiles: SrcFileCount,
    srclines: u64,
) -> Report {
    let mut coverage = Quadruple::default();
    for package in &packages {
        coverage += package.coverage;
    }

    let all = All {
        name: all_name.to_string(),
        coverage,
        packages,
    };

    let mut report = Report {
        stats: Stats::default(),
        all,
    };

    let mut classes = 0u64;
    let mut methods = 0u64;
    report.for_each_class(|class| {
        classes += 1;
        methods += class.methods.len() as u64;
    });

    let files: u64 = report
        .packages()
        .iter()
        .map(|p| p.srcfiles.len() as u64)
        .sum();

    report.stats = Stats {
        packages: report.all.packages.len() as u64,
        classes,
        methods,
        srcfiles: match srcfiles {
            SrcFileCount::Files => files,
            SrcFileCount::Classes => classes,
        },
        srclines,
    };

    report
}

/// A ratio whose covered count exceeds its total
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Overflow {
    pub path: String,
    pub metric: &'static str,
    pub ratio: Ratio,
}

/// Find every `covered > total` ratio in the report. Nothing is corrected.
pub fn audit(report: &Report) -> Vec<Overflow> {
    let mut found = Vec::new();

    check_quad(&mut found, &report.all.name, &report.all.coverage);
    for package in &report.all.packages {
        check_quad(&mut found, &package.name, &package.coverage);
        for src in &package.srcfiles {
            let path = format!("{}/{}", package.name, src.name);
            check_quad(&mut found, &path, &src.coverage);
            for class in &src.classes {
                audit_class(&mut found, &path, class);
            }
        }
    }

    found
}

fn audit_class(found: &mut Vec<Overflow>, parent: &str, class: &Class) {
    let path = format!("{}/{}", parent, class.name);
    check_quad(found, &path, &class.coverage);

    for method in &class.methods {
        let method_path = format!("{}#{}", path, method.name);
        let c = &method.coverage;
        for (metric, ratio) in [("method", c.method), ("block", c.block), ("line", c.line)] {
            check(found, &method_path, metric, ratio);
        }
    }

    for inner in &class.classes {
        audit_class(found, &path, inner);
    }
}

fn check_quad(found: &mut Vec<Overflow>, path: &str, quad: &Quadruple) {
    for (metric, ratio) in quad.ratios() {
        check(found, path, metric.name(), ratio);
    }
}

fn check(found: &mut Vec<Overflow>, path: &str, metric: &'static str, ratio: Ratio) {
    if ratio.is_overflowing() {
        found.push(Overflow {
            path: path.to_string(),
            metric,
            ratio,
        });
    }
}
