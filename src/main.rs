use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};

use cov2emma::config::Config;
use cov2emma::coverage::{validate_thresholds, Metric, Quadruple, Thresholds};
use cov2emma::emma::{self, Stats};
use cov2emma::InputFormat;

#[derive(Parser)]
#[command(name = "cov2emma")]
#[command(about = "Convert BullseyeCoverage and dotCover reports to EMMA XML")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file (default: cov2emma.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a coverage report into an EMMA report
    Convert {
        /// Input dialect: bullseye or dotcover
        #[arg(short, long)]
        from: InputFormat,

        /// Coverage report to read
        input: PathBuf,

        /// EMMA report to write
        output: PathBuf,

        #[command(flatten)]
        thresholds: ThresholdArgs,
    },

    /// Summarize an existing EMMA report
    Check {
        /// EMMA report to read
        report: PathBuf,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        thresholds: ThresholdArgs,
    },
}

#[derive(Args)]
struct ThresholdArgs {
    /// Minimum class coverage in percent
    #[arg(long)]
    min_class: Option<f64>,

    /// Minimum method coverage in percent
    #[arg(long)]
    min_method: Option<f64>,

    /// Minimum block coverage in percent
    #[arg(long)]
    min_block: Option<f64>,

    /// Minimum line coverage in percent
    #[arg(long)]
    min_line: Option<f64>,
}

impl ThresholdArgs {
    fn resolve(&self, config: &Config) -> Thresholds {
        config.thresholds.overridden_by(&Thresholds {
            class: self.min_class,
            method: self.min_method,
            block: self.min_block,
            line: self.min_line,
        })
    }
}

fn main() {
    match run() {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    }
}

/// Returns whether every threshold passed
fn run() -> Result<bool> {
    let cli = Cli::parse();
    let config = Config::discover(cli.config.as_deref())?;

    match cli.command {
        Commands::Convert {
            from,
            input,
            output,
            thresholds,
        } => cmd_convert(&config, from, &input, &output, &thresholds.resolve(&config)),
        Commands::Check {
            report,
            json,
            thresholds,
        } => cmd_check(&report, json, &thresholds.resolve(&config)),
    }
}

fn cmd_convert(
    config: &Config,
    format: InputFormat,
    input: &Path,
    output: &Path,
    thresholds: &Thresholds,
) -> Result<bool> {
    let report = cov2emma::convert_file(input, format)?;

    for overflow in emma::audit(&report) {
        eprintln!(
            "{} {} {} coverage {} has more covered than total",
            "⚠".yellow(),
            overflow.path.yellow(),
            overflow.metric,
            overflow.ratio
        );
    }

    emma::write_report_file(&report, output, config.output.indent)?;

    println!(
        "\n{} {} {} {}\n",
        "📦".cyan(),
        format.to_string().bold(),
        "→".dimmed(),
        output.display().to_string().green()
    );
    print_summary(&report.stats, &report.all.coverage);

    Ok(check_thresholds(&report.all.coverage, thresholds))
}

fn cmd_check(path: &Path, json: bool, thresholds: &Thresholds) -> Result<bool> {
    let summary = emma::read_summary_file(path)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(validate_thresholds(&summary.coverage, thresholds).passed);
    }

    println!("\n{} {}\n", "📦".cyan(), path.display().to_string().bold());
    print_summary(&summary.stats, &summary.coverage);

    if !summary.packages.is_empty() {
        println!("{}", "Packages:".bold());
        for package in &summary.packages {
            let name = if package.name.is_empty() { "(default)" } else { package.name.as_str() };
            println!("  {} {}", "•".green(), name.cyan());
            for (metric, ratio) in package.coverage.ratios() {
                println!("    {} {}", format!("{}:", metric.name()).dimmed(), ratio);
            }
        }
        println!();
    }

    Ok(check_thresholds(&summary.coverage, thresholds))
}

fn print_summary(stats: &Stats, coverage: &Quadruple) {
    println!(
        "  {} {}  {} {}  {} {}  {} {}  {} {}",
        "packages:".dimmed(),
        stats.packages,
        "classes:".dimmed(),
        stats.classes,
        "methods:".dimmed(),
        stats.methods,
        "srcfiles:".dimmed(),
        stats.srcfiles,
        "srclines:".dimmed(),
        stats.srclines
    );
    for metric in Metric::ALL {
        println!("  {:<10} {}", metric.label(), coverage.get(metric));
    }
    println!();
}

fn check_thresholds(coverage: &Quadruple, thresholds: &Thresholds) -> bool {
    if thresholds.is_empty() {
        return true;
    }

    let result = validate_thresholds(coverage, thresholds);
    println!("{}", "Thresholds:".bold());
    result.print_summary();
    result.passed
}
