//! dotCover → EMMA
//!
//! Namespaces (or assemblies, for types outside any namespace) become
//! packages and every top-level type gets its own guessed source file.
//! Class and method ratios are binary "touched at all" counts; block and
//! line both carry the statement ratio.

use std::slice;

use super::{Accessors, Detail, DotCoverReport, MethodNode, Type, TypeItem};
use crate::coverage::{MethodCoverage, Quadruple, Ratio};
use crate::emma::{build_report, Class, ClassRecord, Package, Report, SrcFile, SrcFileCount};

pub const SRC_GUESS_SUFFIX: &str = ".src_guess";

/// Separator between a parent and a nested entry name
const NAME_JOINER: &str = "  ";

/// A flattened member-like entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaf {
    pub name: String,
    pub statements: Ratio,
}

impl Leaf {
    fn coverage(&self) -> MethodCoverage {
        MethodCoverage::new(
            Ratio::binary(self.statements.covered),
            self.statements,
            self.statements,
        )
    }
}

pub fn convert(mut report: DotCoverReport) -> Report {
    report.normalize();

    let mut packages = Vec::new();
    for assembly in report.assemblies() {
        for ns in &assembly.namespaces {
            packages.push(convert_package(&ns.name, &ns.types));
        }
        if !assembly.types.is_empty() {
            packages.push(convert_package(&assembly.name, &assembly.types));
        }
    }

    build_report(
        "all classes",
        packages,
        SrcFileCount::Classes,
        report.statements.total,
    )
}

fn convert_package(name: &str, types: &[Type]) -> Package {
    Package {
        name: name.to_string(),
        coverage: coverage_of(types),
        srcfiles: types
            .iter()
            .map(|t| SrcFile {
                name: format!("{}{}", t.name, SRC_GUESS_SUFFIX),
                coverage: coverage_of(slice::from_ref(t)),
                classes: vec![build_class(t)],
            })
            .collect(),
    }
}

/// One class per type; inner types become nested classes and only the
/// type's own members become its methods
pub fn build_class(t: &Type) -> Class {
    let mut record = ClassRecord::new(t.name.as_str());
    record.own = Ratio::binary(t.statements.covered);
    for_each_own_leaf(t, &mut |leaf| {
        let coverage = leaf.coverage();
        record.push(leaf.name, coverage);
    });

    let nested = t.nested().map(build_class).collect();
    record.into_class_with(coverage_of(slice::from_ref(t)), nested)
}

/// Quadruple over `types` and everything nested in them, re-walked from the
/// leaves so the binary counts stay exact
pub fn coverage_of(types: &[Type]) -> Quadruple {
    let mut coverage = Quadruple::default();
    for t in types {
        for_each_type(t, &mut |inner| {
            coverage.class += Ratio::binary(inner.statements.covered);
            for_each_own_leaf(inner, &mut |leaf| {
                coverage.method += Ratio::binary(leaf.statements.covered);
                coverage.block += leaf.statements;
            });
        });
    }
    coverage.line = coverage.block;
    coverage
}

fn for_each_type<'a>(t: &'a Type, visit: &mut impl FnMut(&'a Type)) {
    visit(t);
    for inner in t.nested() {
        for_each_type(inner, visit);
    }
}

/// Flatten the member-like items of `t`, skipping nested types
pub fn for_each_own_leaf(t: &Type, visit: &mut impl FnMut(Leaf)) {
    for item in t.items() {
        match item {
            TypeItem::Type(_) => {}
            TypeItem::Member(member) => visit(Leaf {
                name: member.name.clone(),
                statements: member.statements,
            }),
            TypeItem::Method(method) | TypeItem::Constructor(method) => {
                method_leaves(method, None, visit)
            }
            TypeItem::Property(accessors) | TypeItem::Event(accessors) => {
                accessor_leaves(accessors, visit)
            }
        }
    }
}

fn accessor_leaves(accessors: &Accessors, visit: &mut impl FnMut(Leaf)) {
    for method in &accessors.methods {
        method_leaves(method, Some(accessors.name.as_str()), visit);
    }
}

fn method_leaves(method: &MethodNode, parent: Option<&str>, visit: &mut impl FnMut(Leaf)) {
    let name = join_name(parent, &method.name);
    match &method.detail {
        None => visit(Leaf {
            name,
            statements: method.statements,
        }),
        Some(detail) => {
            for entry in detail {
                match entry {
                    // Own coverage is reported under the enclosing name
                    Detail::OwnCoverage(statements) => visit(Leaf {
                        name: name.clone(),
                        statements: *statements,
                    }),
                    Detail::AnonymousMethod(anonymous) => {
                        method_leaves(anonymous, Some(name.as_str()), visit)
                    }
                }
            }
        }
    }
}

fn join_name(parent: Option<&str>, name: &str) -> String {
    match parent {
        Some(parent) if name.is_empty() => parent.to_string(),
        Some(parent) => format!("{}{}{}", parent, NAME_JOINER, name),
        None => name.to_string(),
    }
}
