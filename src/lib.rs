//! cov2emma - coverage report converter
//!
//! Converts coverage reports into the EMMA XML format:
//! - BullseyeCoverage folder/source/function trees
//! - dotCover assembly/namespace/type/member trees
//!
//! Both sources are regrouped into `package → srcfile → class → method`
//! with class, method, block and line ratios recomputed at every level.

pub mod bullseye;
pub mod config;
pub mod coverage;
pub mod dotcover;
pub mod emma;
pub mod error;
pub mod xml;

pub use coverage::{Metric, Quadruple, Ratio, Thresholds};
pub use emma::Report;
pub use error::CoverageError;

use anyhow::Result;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Input report dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Bullseye,
    DotCover,
}

impl FromStr for InputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim_start_matches('-').to_lowercase().as_str() {
            "bullseye" => Ok(InputFormat::Bullseye),
            "dotcover" => Ok(InputFormat::DotCover),
            _ => anyhow::bail!("Unknown input format: {}. Supported: bullseye, dotcover", s),
        }
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputFormat::Bullseye => write!(f, "bullseye"),
            InputFormat::DotCover => write!(f, "dotcover"),
        }
    }
}

/// Convert report text of the given dialect
pub fn convert_str(content: &str, format: InputFormat) -> Result<Report> {
    match format {
        InputFormat::Bullseye => Ok(bullseye::convert(&bullseye::parse_bullseye_string(content)?)),
        InputFormat::DotCover => Ok(dotcover::convert(dotcover::parse_dotcover_string(content)?)),
    }
}

/// Convert a report file of the given dialect
pub fn convert_file(path: &Path, format: InputFormat) -> Result<Report> {
    match format {
        InputFormat::Bullseye => Ok(bullseye::convert(&bullseye::parse_bullseye(path)?)),
        InputFormat::DotCover => Ok(dotcover::convert(dotcover::parse_dotcover(path)?)),
    }
}
