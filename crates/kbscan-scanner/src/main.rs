//! KBScan Scanner - evaluates a knowledge base against a target application
//!
//! This is the main entry point for the command line scanner.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use kbscan_checks::{load_checks_from_dir, ScanEngine, ScanReport};
use kbscan_common::logging::{init_logging_with_config, LogConfig, LogFormat};
use kbscan_common::Config;
use kbscan_core::{Severity, TargetApplication};
use std::path::Path;
use tracing::info;

/// KBScan knowledge-base vulnerability scanner
#[derive(Parser, Debug)]
#[command(name = "kbscan-scanner")]
#[command(version)]
#[command(about = "Check a target application against a vulnerability knowledge base", long_about = None)]
struct Args {
    /// Target description file (YAML or JSON)
    #[arg(short, long)]
    target: String,

    /// Knowledge-base directory (overrides config)
    #[arg(short, long)]
    kb_dir: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "kbscan.toml")]
    config: String,

    /// Minimum severity to report (overrides config)
    #[arg(long)]
    min_severity: Option<String>,

    /// Report output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Log level (trace, debug, info, warn, error; overrides config)
    #[arg(long)]
    log_level: Option<String>,

    /// Log format (pretty, json, compact; overrides config)
    #[arg(long)]
    log_format: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = if Path::new(&args.config).exists() {
        Config::from_file(&args.config)?
    } else {
        Config::default()
    };
    let mut config = config.merge_env()?;

    if let Some(dir) = &args.kb_dir {
        config.knowledge_base.dir = Some(dir.clone());
    }
    if let Some(severity) = &args.min_severity {
        config.scan.min_severity = Severity::parse_lenient(severity);
    }

    let log_config = LogConfig::new()
        .level(args.log_level.as_deref().unwrap_or(&config.logging.level))
        .format(LogFormat::from_name(
            args.log_format.as_deref().unwrap_or(&config.logging.format),
        ));
    init_logging_with_config(log_config);

    info!("KBScan Scanner starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let kb_dir = config.kb_dir()?;
    let mut registry = load_checks_from_dir(kb_dir)
        .with_context(|| format!("loading knowledge base from {}", kb_dir))?;
    registry.retain_kinds(&config.knowledge_base.enabled_kinds);

    let target = TargetApplication::from_file(&args.target)
        .with_context(|| format!("loading target description {}", args.target))?;

    let report = ScanEngine::new(&registry)
        .with_min_severity(config.scan.min_severity)
        .with_report_mitigated(config.scan.report_mitigated)
        .scan(&target);

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => print_text_report(&report),
    }

    if report.vulnerable && config.scan.fail_on_vulnerable {
        std::process::exit(1);
    }

    Ok(())
}

fn print_text_report(report: &ScanReport) {
    println!(
        "{} ({}): {} checks run",
        report.target,
        report.framework.as_deref().unwrap_or("unknown framework"),
        report.checks_run
    );

    for finding in &report.findings {
        let state = if finding.vulnerable {
            "VULNERABLE"
        } else {
            "MITIGATED"
        };
        let score = finding
            .cvss_score
            .map(|s| format!("{:.1}", s))
            .unwrap_or_else(|| String::from("    "));

        println!();
        println!(
            "[{}] {} {} (severity: {}, cvss: {})",
            state, finding.check_name, finding.title, finding.severity, score
        );
        for evidence in &finding.evidences {
            println!("    evidence: {}", evidence);
        }
        if let Some(remediation) = &finding.remediation {
            println!("    remediation: {}", remediation);
        }
        for reference in &finding.references {
            println!("    see: {}", reference);
        }
    }

    let counts = &report.severity_counts;
    println!();
    println!(
        "{} vulnerable (Critical: {}, High: {}, Medium: {}, Low: {}, Info: {}), {} mitigated",
        counts.total_vulnerable(),
        counts.critical,
        counts.high,
        counts.medium,
        counts.low,
        counts.info,
        counts.mitigated
    );
}
