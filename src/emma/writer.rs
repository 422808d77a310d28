//! EMMA XML serialization

use anyhow::{Context, Result};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;
use std::fs;
use std::io::Write;
use std::path::Path;

use super::{Class, Method, Report};
use crate::coverage::CoverageEntry;

pub const DEFAULT_INDENT: usize = 2;

/// Write the report as EMMA XML
pub fn write_report<W: Write>(report: &Report, inner: W, indent: usize) -> Result<()> {
    let mut writer = if indent > 0 {
        Writer::new_with_indent(inner, b' ', indent)
    } else {
        Writer::new(inner)
    };

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    writer.write_event(Event::Start(BytesStart::new("report")))?;

    let stats = &report.stats;
    writer.write_event(Event::Start(BytesStart::new("stats")))?;
    for (tag, value) in [
        ("packages", stats.packages),
        ("classes", stats.classes),
        ("methods", stats.methods),
        ("srcfiles", stats.srcfiles),
        ("srclines", stats.srclines),
    ] {
        let value = value.to_string();
        writer.write_event(Event::Empty(
            BytesStart::new(tag).with_attributes([("value", value.as_str())]),
        ))?;
    }
    writer.write_event(Event::End(BytesEnd::new("stats")))?;

    writer.write_event(Event::Start(BytesStart::new("data")))?;
    start_named(&mut writer, "all", &report.all.name)?;
    write_coverage(&mut writer, &report.all.coverage.entries())?;

    for package in &report.all.packages {
        start_named(&mut writer, "package", &package.name)?;
        write_coverage(&mut writer, &package.coverage.entries())?;

        for src in &package.srcfiles {
            start_named(&mut writer, "srcfile", &src.name)?;
            write_coverage(&mut writer, &src.coverage.entries())?;
            for class in &src.classes {
                write_class(&mut writer, class)?;
            }
            writer.write_event(Event::End(BytesEnd::new("srcfile")))?;
        }

        writer.write_event(Event::End(BytesEnd::new("package")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("all")))?;
    writer.write_event(Event::End(BytesEnd::new("data")))?;
    writer.write_event(Event::End(BytesEnd::new("report")))?;

    writer.into_inner().flush()?;
    Ok(())
}

pub fn to_xml_string(report: &Report, indent: usize) -> Result<String> {
    let mut buffer = Vec::new();
    write_report(report, &mut buffer, indent)?;
    Ok(String::from_utf8(buffer)?)
}

/// Write the report to `path`, replacing any existing file.
///
/// The document is rendered in memory first so a failure leaves no partial file.
pub fn write_report_file(report: &Report, path: &Path, indent: usize) -> Result<()> {
    let xml = to_xml_string(report, indent)?;
    fs::write(path, xml)
        .with_context(|| format!("Failed to write EMMA report: {}", path.display()))
}

fn start_named<W: Write>(writer: &mut Writer<W>, tag: &str, name: &str) -> Result<()> {
    writer.write_event(Event::Start(
        BytesStart::new(tag).with_attributes([("name", name)]),
    ))?;
    Ok(())
}

fn write_coverage<W: Write>(writer: &mut Writer<W>, entries: &[CoverageEntry]) -> Result<()> {
    for entry in entries {
        writer.write_event(Event::Empty(BytesStart::new("coverage").with_attributes([
            ("type", entry.kind.as_str()),
            ("value", entry.value.as_str()),
        ])))?;
    }
    Ok(())
}

// Quadruple first, then inner classes, then methods
fn write_class<W: Write>(writer: &mut Writer<W>, class: &Class) -> Result<()> {
    start_named(writer, "class", &class.name)?;
    write_coverage(writer, &class.coverage.entries())?;

    for inner in &class.classes {
        write_class(writer, inner)?;
    }
    for method in &class.methods {
        write_method(writer, method)?;
    }

    writer.write_event(Event::End(BytesEnd::new("class")))?;
    Ok(())
}

fn write_method<W: Write>(writer: &mut Writer<W>, method: &Method) -> Result<()> {
    start_named(writer, "method", &method.name)?;
    write_coverage(writer, &method.coverage.entries())?;
    writer.write_event(Event::End(BytesEnd::new("method")))?;
    Ok(())
}
