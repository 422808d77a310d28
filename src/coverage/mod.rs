//! Coverage ratios
//!
//! Provides:
//! - `Ratio` accumulation and EMMA percentage rendering
//! - The four-metric `Quadruple` carried by every report node
//! - Re-parsing of already rendered coverage entries
//! - Threshold validation

mod threshold;

pub use threshold::*;

use serde::Serialize;
use std::fmt;
use std::ops::AddAssign;

use crate::error::CoverageError;

/// A covered/total pair.
///
/// `covered > total` is never corrected here; see `emma::audit`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Ratio {
    pub covered: u64,
    pub total: u64,
}

impl Ratio {
    pub fn new(covered: u64, total: u64) -> Self {
        Self { covered, total }
    }

    /// One-of-one when `hit` is non-zero, zero-of-one otherwise.
    pub fn binary(hit: u64) -> Self {
        Self::new(if hit > 0 { 1 } else { 0 }, 1)
    }

    pub fn add(&mut self, covered: u64, total: u64) {
        self.covered += covered;
        self.total += total;
    }

    pub fn percent(&self) -> u64 {
        if self.total == 0 {
            return 0;
        }
        // Midpoints round to even, matching the historical reports
        (self.covered as f64 / self.total as f64 * 100.0).round_ties_even() as u64
    }

    pub fn is_overflowing(&self) -> bool {
        self.covered > self.total
    }

    /// Render as `"<pct>%"` padded to five columns followed by `(covered/total)`.
    pub fn render(&self) -> String {
        format!("{:<5}({}/{})", format!("{}%", self.percent()), self.covered, self.total)
    }

    /// Parse the `(covered/total)` part of a rendered ratio.
    pub fn parse_rendered(value: &str) -> Result<Self, CoverageError> {
        let malformed = || CoverageError::MalformedRatio(value.to_string());

        let open = value.find('(').ok_or_else(malformed)?;
        let close = value[open..].find(')').map(|i| open + i).ok_or_else(malformed)?;
        let (covered, total) = value[open + 1..close].split_once('/').ok_or_else(malformed)?;

        let covered = covered.parse::<u64>().map_err(|_| malformed())?;
        let total = total.parse::<u64>().map_err(|_| malformed())?;

        Ok(Self::new(covered, total))
    }
}

impl AddAssign for Ratio {
    fn add_assign(&mut self, rhs: Ratio) {
        self.add(rhs.covered, rhs.total);
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// The four EMMA metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Class,
    Method,
    Block,
    Line,
}

impl Metric {
    pub const ALL: [Metric; 4] = [Metric::Class, Metric::Method, Metric::Block, Metric::Line];

    pub fn label(&self) -> &'static str {
        match self {
            Metric::Class => "class, %",
            Metric::Method => "method, %",
            Metric::Block => "block, %",
            Metric::Line => "line, %",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Metric::Class => "class",
            Metric::Method => "method",
            Metric::Block => "block",
            Metric::Line => "line",
        }
    }

    pub fn from_label(label: &str) -> Result<Self, CoverageError> {
        Metric::ALL
            .into_iter()
            .find(|m| m.label() == label)
            .ok_or_else(|| CoverageError::UnknownMetric(label.to_string()))
    }
}

/// A rendered `<coverage type=".." value=".."/>` entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageEntry {
    pub kind: String,
    pub value: String,
}

impl CoverageEntry {
    pub fn new(metric: Metric, ratio: Ratio) -> Self {
        Self {
            kind: metric.label().to_string(),
            value: ratio.render(),
        }
    }
}

/// Class, method, block and line ratios of one report node
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Quadruple {
    pub class: Ratio,
    pub method: Ratio,
    pub block: Ratio,
    pub line: Ratio,
}

impl Quadruple {
    pub fn new(class: Ratio, method: Ratio, block: Ratio, line: Ratio) -> Self {
        Self { class, method, block, line }
    }

    pub fn get(&self, metric: Metric) -> Ratio {
        match metric {
            Metric::Class => self.class,
            Metric::Method => self.method,
            Metric::Block => self.block,
            Metric::Line => self.line,
        }
    }

    fn slot(&mut self, metric: Metric) -> &mut Ratio {
        match metric {
            Metric::Class => &mut self.class,
            Metric::Method => &mut self.method,
            Metric::Block => &mut self.block,
            Metric::Line => &mut self.line,
        }
    }

    pub fn entries(&self) -> Vec<CoverageEntry> {
        Metric::ALL
            .into_iter()
            .map(|m| CoverageEntry::new(m, self.get(m)))
            .collect()
    }

    /// Recover ratios from rendered entries. Labels not present stay `0/0`.
    pub fn from_entries(entries: &[CoverageEntry]) -> Result<Self, CoverageError> {
        let mut quad = Quadruple::default();
        for entry in entries {
            let ratio = Ratio::parse_rendered(&entry.value)?;
            *quad.slot(Metric::from_label(&entry.kind)?) = ratio;
        }
        Ok(quad)
    }

    pub fn ratios(&self) -> impl Iterator<Item = (Metric, Ratio)> + '_ {
        Metric::ALL.into_iter().map(move |m| (m, self.get(m)))
    }
}

impl AddAssign for Quadruple {
    fn add_assign(&mut self, rhs: Quadruple) {
        self.class += rhs.class;
        self.method += rhs.method;
        self.block += rhs.block;
        self.line += rhs.line;
    }
}

/// Method-level coverage: EMMA methods carry no class ratio
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MethodCoverage {
    pub method: Ratio,
    pub block: Ratio,
    pub line: Ratio,
}

impl MethodCoverage {
    pub fn new(method: Ratio, block: Ratio, line: Ratio) -> Self {
        Self { method, block, line }
    }

    pub fn entries(&self) -> Vec<CoverageEntry> {
        vec![
            CoverageEntry::new(Metric::Method, self.method),
            CoverageEntry::new(Metric::Block, self.block),
            CoverageEntry::new(Metric::Line, self.line),
        ]
    }
}
