//! Coverage threshold validation

use colored::Colorize;
use serde::{Deserialize, Serialize};

use super::{Metric, Quadruple};

/// Minimum percentages per metric; `None` means unchecked
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize, Serialize)]
pub struct Thresholds {
    #[serde(default)]
    pub class: Option<f64>,
    #[serde(default)]
    pub method: Option<f64>,
    #[serde(default)]
    pub block: Option<f64>,
    #[serde(default)]
    pub line: Option<f64>,
}

impl Thresholds {
    pub fn get(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Class => self.class,
            Metric::Method => self.method,
            Metric::Block => self.block,
            Metric::Line => self.line,
        }
    }

    /// Values from `other` win where set
    pub fn overridden_by(&self, other: &Thresholds) -> Thresholds {
        Thresholds {
            class: other.class.or(self.class),
            method: other.method.or(self.method),
            block: other.block.or(self.block),
            line: other.line.or(self.line),
        }
    }

    pub fn is_empty(&self) -> bool {
        Metric::ALL.iter().all(|m| self.get(*m).is_none())
    }
}

/// Outcome for one metric
#[derive(Debug, Clone, Serialize)]
pub struct MetricCheck {
    pub metric: &'static str,
    pub coverage: f64,
    pub threshold: f64,
    pub delta: f64,
    pub passed: bool,
}

/// Result of threshold validation
#[derive(Debug, Clone, Serialize)]
pub struct ThresholdResult {
    pub passed: bool,
    pub checks: Vec<MetricCheck>,
}

impl ThresholdResult {
    pub fn print_summary(&self) {
        for check in &self.checks {
            let status = if check.passed { "✓".green() } else { "✗".red() };
            let delta_str = if check.delta >= 0.0 {
                format!("+{:.1}%", check.delta).green()
            } else {
                format!("{:.1}%", check.delta).red()
            };

            println!(
                "  {} {} coverage: {:.1}% (threshold: {:.1}%, {})",
                status, check.metric, check.coverage, check.threshold, delta_str
            );
        }
    }
}

/// Percentage of a metric as a float, 0 when nothing was measured
pub fn percentage(quad: &Quadruple, metric: Metric) -> f64 {
    let ratio = quad.get(metric);
    if ratio.total == 0 {
        return 0.0;
    }
    (ratio.covered as f64 / ratio.total as f64) * 100.0
}

/// Validate coverage against thresholds
pub fn validate_thresholds(quad: &Quadruple, thresholds: &Thresholds) -> ThresholdResult {
    let checks: Vec<MetricCheck> = Metric::ALL
        .into_iter()
        .filter_map(|metric| {
            let threshold = thresholds.get(metric)?;
            let coverage = percentage(quad, metric);
            Some(MetricCheck {
                metric: metric.name(),
                coverage,
                threshold,
                delta: coverage - threshold,
                passed: coverage >= threshold,
            })
        })
        .collect();

    ThresholdResult {
        passed: checks.iter().all(|c| c.passed),
        checks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coverage::Ratio;

    fn quad() -> Quadruple {
        Quadruple::new(
            Ratio::new(3, 4),
            Ratio::new(1, 2),
            Ratio::new(0, 0),
            Ratio::new(75, 100),
        )
    }

    #[test]
    fn test_threshold_validation() {
        let thresholds = Thresholds {
            line: Some(70.0),
            method: Some(40.0),
            ..Default::default()
        };

        // Passing case
        let result = validate_thresholds(&quad(), &thresholds);
        assert!(result.passed);
        assert_eq!(result.checks.len(), 2);

        // Failing case
        let thresholds = Thresholds {
            line: Some(80.0),
            ..thresholds
        };
        let result = validate_thresholds(&quad(), &thresholds);
        assert!(!result.passed);
        assert_eq!(result.checks.iter().filter(|c| !c.passed).count(), 1);
    }

    #[test]
    fn test_empty_total_counts_as_zero_percent() {
        let thresholds = Thresholds {
            block: Some(1.0),
            ..Default::default()
        };
        let result = validate_thresholds(&quad(), &thresholds);
        assert!(!result.passed);
        assert_eq!(result.checks[0].coverage, 0.0);
    }

    #[test]
    fn test_override() {
        let base = Thresholds {
            class: Some(10.0),
            line: Some(50.0),
            ..Default::default()
        };
        let cli = Thresholds {
            line: Some(90.0),
            ..Default::default()
        };
        let merged = base.overridden_by(&cli);
        assert_eq!(merged.class, Some(10.0));
        assert_eq!(merged.line, Some(90.0));
        assert!(Thresholds::default().is_empty());
        assert!(!merged.is_empty());
    }
}
