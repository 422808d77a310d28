//! BullseyeCoverage → EMMA
//!
//! Packages are folder paths, source files are `src` nodes and classes are
//! recovered from the qualified function names.

use std::collections::HashMap;

use super::{BullseyeCoverage, Folder, FolderItem, Src};
use crate::coverage::{MethodCoverage, Quadruple, Ratio};
use crate::emma::{build_report, ClassRecord, Package, Report, SrcFile, SrcFileCount};

/// Class name given to free functions
pub const GLOBAL_CLASS: &str = "::";

pub fn convert(coverage: &BullseyeCoverage) -> Report {
    let mut packages: Vec<Package> = Vec::new();
    let mut by_path: HashMap<String, usize> = HashMap::new();

    for_each_src(coverage, &mut |path, folder, src| {
        let index = *by_path.entry(path.to_string()).or_insert_with(|| {
            packages.push(Package {
                name: package_name(path),
                // Method and block totals come from the folder itself
                coverage: Quadruple::new(
                    Ratio::default(),
                    folder.functions,
                    folder.conditions,
                    Ratio::default(),
                ),
                srcfiles: Vec::new(),
            });
            packages.len() - 1
        });
        packages[index].srcfiles.push(convert_src(src));
    });

    for package in &mut packages {
        let mut classes = Ratio::default();
        for src in &package.srcfiles {
            classes += src.coverage.class;
        }
        package.coverage.class = classes;
    }

    build_report("all files", packages, SrcFileCount::Files, 0)
}

/// Turn a folder path into a dotted package name.
///
/// `C:\src\Foo.Bar` becomes `src.Foo_Bar`: the drive becomes `.`, leading
/// `./` and `../` segments are dropped, literal dots become underscores and
/// separators become dots.
pub fn package_name(path: &str) -> String {
    let mut path = match path.find(':') {
        Some(pos) => format!(".{}", &path[pos + 1..]),
        None => path.to_string(),
    };

    loop {
        if path.starts_with("..\\") || path.starts_with("../") {
            path.drain(..3);
        } else if path.starts_with(".\\") || path.starts_with("./") {
            path.drain(..2);
        } else {
            break;
        }
    }

    path.replace('.', "_").replace(['\\', '/'], ".")
}

/// Split `NS::Foo::Bar(int)` into `("NS::Foo", "Bar(int)")`.
///
/// Only the part before the last `(` is searched for `::`, so separators
/// inside parameter lists are ignored. Without a separator the function
/// belongs to [`GLOBAL_CLASS`].
pub fn split_function_name(name: &str) -> (&str, &str) {
    let end = name.rfind('(').unwrap_or(name.len());

    match name[..end].rfind("::") {
        Some(pos) => (&name[..pos], &name[pos + 2..]),
        None => (GLOBAL_CLASS, name),
    }
}

fn convert_src(src: &Src) -> SrcFile {
    let mut records: Vec<ClassRecord> = Vec::new();
    let mut by_name: HashMap<&str, usize> = HashMap::new();

    for f in &src.fns {
        let (class_name, method_name) = split_function_name(&f.name);
        let index = *by_name.entry(class_name).or_insert_with(|| {
            records.push(ClassRecord::new(class_name));
            records.len() - 1
        });
        records[index].push(
            method_name,
            MethodCoverage::new(f.functions, f.conditions, Ratio::default()),
        );
    }

    let classes: Vec<_> = records
        .into_iter()
        .map(|mut record| {
            // Covered at all, not how much
            record.own = Ratio::binary(record.method_totals().block.covered);
            record.into_class()
        })
        .collect();

    let mut class_flags = Ratio::default();
    for class in &classes {
        class_flags += class.coverage.class;
    }

    SrcFile {
        name: src.name.clone(),
        coverage: Quadruple::new(class_flags, src.functions, src.conditions, Ratio::default()),
        classes,
    }
}

/// Visit every `src` with the backslash-joined path of its folder and the
/// folder that directly contains it
fn for_each_src<'a>(coverage: &'a BullseyeCoverage, visit: &mut impl FnMut(&str, &'a Folder, &'a Src)) {
    for folder in &coverage.folders {
        walk_folder("", folder, visit);
    }
}

fn walk_folder<'a>(parent: &str, folder: &'a Folder, visit: &mut impl FnMut(&str, &'a Folder, &'a Src)) {
    let path = if parent.is_empty() {
        folder.name.clone()
    } else {
        format!("{}\\{}", parent, folder.name)
    };

    for item in &folder.items {
        match item {
            FolderItem::Folder(inner) => walk_folder(&path, inner, visit),
            FolderItem::Src(src) => visit(&path, folder, src),
        }
    }
}
