//! Netsheet - weekly networking-sheet reporting
//!
//! Reads an activity sheet with "last contact", "last planned meeting" and
//! "last held meeting" dates, counts them per ISO week, keeps the highest
//! count ever seen for each week in a persisted table, and renders the table
//! and a grouped bar chart.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Any error (invalid arguments, unreadable source, schema, persistence)

mod analysis;
mod cli;
mod config;
mod error;
mod models;
mod report;
mod source;
mod store;
mod tabular;

use anyhow::{Context, Result};
use chrono::{Datelike, Utc};
use cli::{Args, OutputFormat};
use config::{Config, DEFAULT_CONFIG_FILE};
use models::{Report, ReportMetadata, ReportMode, ReportSummary, WeekRange};
use source::{FetchOptions, Source};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Configuration decides the default verbosity, so it is read before logging starts
    let mut config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    init_logging(&args, config.general.verbose);

    info!("Netsheet v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", redacted_args(&args));

    match run_report(&args, &config).await {
        Ok(()) => Ok(()),
        Err(e) => {
            error!("Report failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .netsheet.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            DEFAULT_CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", DEFAULT_CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", DEFAULT_CONFIG_FILE);
    println!("   Edit it to set the source sheet, column names and output paths.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args, config_verbose: bool) {
    let level = if !args.quiet && config_verbose {
        tracing::Level::DEBUG
    } else {
        args.log_level()
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Arguments with the source URL hidden, for debug logging.
fn redacted_args(args: &Args) -> Args {
    let mut shown = args.clone();
    let hide = |value: &mut Option<String>| {
        if let Some(v) = value.as_mut() {
            if v.contains("://") {
                *v = source::fetch::redact_url(v);
            }
        }
    };
    hide(&mut shown.source);
    hide(&mut shown.source_url);
    shown
}

/// Run the complete report workflow.
async fn run_report(args: &Args, config: &Config) -> Result<()> {
    let start_time = Instant::now();
    let mode = config.general.mode;
    let year = config.general.year.unwrap_or_else(|| chrono::Local::now().year());
    let edits = args.edits()?;

    // Step 1: Read the activity sheet
    let source = Source::resolve(&config.source)?;
    if !args.quiet {
        println!("📥 Reading activity sheet: {}", source);
    }

    let fetch_options = FetchOptions {
        timeout_seconds: config.source.timeout_seconds,
        retries: config.source.retries,
        accept_invalid_certs: config.source.accept_invalid_certs,
        show_progress: !args.quiet,
    };
    let records = source::load_records(&source, &config.columns, &fetch_options).await?;

    // Step 2: Count per week, and merge with the persisted table
    info!("Building {} report for label year {}", mode, year);
    let table_path = Path::new(&config.table.path);
    let mut table = match mode {
        ReportMode::Snapshot => analysis::snapshot_report(&records, year),
        ReportMode::Accumulate => {
            let fresh = analysis::aggregate(&records, WeekRange::from(mode), year);
            let persisted = store::load_or_init(table_path)?;
            analysis::merge(&fresh, &persisted)
        }
    };

    // Step 3: Manual edits, then persist
    if !edits.is_empty() {
        analysis::apply_edits(&mut table, &edits, year);
        info!("Applied {} manual edit(s)", edits.len());
    }

    if mode == ReportMode::Accumulate {
        if args.dry_run {
            info!("Dry run: not writing {}", table_path.display());
        } else {
            store::save(table_path, &table)?;
        }
    }

    // Step 4: Build the report
    let summary = ReportSummary::from_table(&table);
    let metadata = ReportMetadata {
        source: source.to_string(),
        generated_at: Utc::now(),
        mode,
        year,
        records_read: records.len(),
        table_path: (mode == ReportMode::Accumulate).then(|| config.table.path.clone()),
        edits_applied: edits.len(),
        duration_seconds: start_time.elapsed().as_secs_f64(),
    };
    let report = Report {
        metadata,
        summary,
        table,
    };

    // Step 5: Generate and save the report
    let output = match config.report.format {
        OutputFormat::Html => report::generate_html_report(&report),
        OutputFormat::Markdown => report::generate_markdown_report(&report),
        OutputFormat::Json => report::generate_json_report(&report)?,
    };
    write_output(Path::new(&config.report.output), &output)?;

    if let Some(ref chart_path) = config.report.chart {
        write_output(Path::new(chart_path), &report::render_svg(&report.table))?;
    }

    if !args.quiet {
        print_summary(&report, config, args.dry_run);
    }

    Ok(())
}

/// Write a rendered file, creating parent directories.
fn write_output(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Wrote {}", path.display());
    Ok(())
}

fn print_summary(report: &Report, config: &Config, dry_run: bool) {
    let summary = &report.summary;

    println!("\n📊 Weekly Summary:");
    println!("   Weeks shown: {}", summary.weeks);
    println!(
        "   🤝 Contacts made: {} | 📅 Meetings planned: {} | ✅ Meetings performed: {}",
        summary.contacts_made, summary.meetings_planned, summary.meetings_performed
    );
    if let Some(week) = summary.busiest_week {
        println!("   Busiest week: {}", week);
    }
    println!("   Duration: {:.1}s", report.metadata.duration_seconds);

    if let Some(ref table_path) = report.metadata.table_path {
        if dry_run {
            println!("\n🔍 Dry run: {} was not updated.", table_path);
        } else {
            println!("\n💾 Table saved to: {}", table_path);
        }
    }
    println!("✅ Report saved to: {}", config.report.output);
    if let Some(ref chart) = config.report.chart {
        println!("📈 Chart saved to: {}", chart);
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        return Config::load(config_path);
    }

    // Try default location
    Ok(Config::load_default()?.unwrap_or_default())
}
