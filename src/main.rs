use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use sales_trend_monitor::filter::{self, Filter};
use sales_trend_monitor::loader::{self, SalesTable};
use sales_trend_monitor::{analysis, export, report, ClassifiedRow, Config, Status};

#[derive(Parser)]
#[command(name = "sales-trend-monitor")]
#[command(about = "Classify monthly client sales into trend statuses", long_about = None)]
struct Cli {
    /// TOML file with column aliases, periods and report settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Selection {
    #[arg(long)]
    csv: PathBuf,
    /// Period column label, oldest first; repeat to override discovery
    #[arg(long = "period")]
    periods: Vec<String>,
    #[arg(long = "manager")]
    managers: Vec<String>,
    #[arg(long = "status")]
    statuses: Vec<Status>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Table,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the status of every client
    Classify {
        #[command(flatten)]
        selection: Selection,
        #[arg(long, value_enum, default_value_t = Format::Table)]
        format: Format,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Generate a markdown report
    Report {
        #[command(flatten)]
        selection: Selection,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Export the filtered rows as CSV
    Export {
        #[command(flatten)]
        selection: Selection,
        #[arg(long, default_value = "sales_report.csv")]
        out: PathBuf,
    },
    /// List every status with its id and color
    Statuses,
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

struct Analyzed {
    table: SalesTable,
    rows: Vec<ClassifiedRow>,
}

fn load_and_classify(selection: &Selection, config: &Config) -> anyhow::Result<Analyzed> {
    let mut config = config.clone();
    if !selection.periods.is_empty() {
        config.periods.labels = selection.periods.clone();
    }

    let table = loader::load_path(&selection.csv, &config)
        .with_context(|| format!("failed to load {}", selection.csv.display()))?;
    let classified = analysis::analyze(&table.rows)
        .with_context(|| format!("failed to classify {}", selection.csv.display()))?;

    let selected = Filter {
        managers: selection.managers.clone(),
        statuses: selection.statuses.clone(),
    };
    let known = filter::distinct_managers(&classified);
    for manager in selected.managers.iter().filter(|m| !known.contains(m)) {
        warn!(manager = %manager, "manager not present in export");
    }
    let rows = selected.apply(&classified);

    for summary in analysis::summarize_by_status(&rows) {
        info!(status = summary.status.id(), count = summary.count, "status count");
    }

    Ok(Analyzed { table, rows })
}

fn source_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load(cli.config.as_deref()).context("failed to load configuration")?;

    match cli.command {
        Commands::Classify {
            selection,
            format,
            limit,
        } => {
            let analyzed = load_and_classify(&selection, &config)?;
            let limit = limit.unwrap_or(analyzed.rows.len());
            let shown = &analyzed.rows[..limit.min(analyzed.rows.len())];

            match format {
                Format::Json => {
                    println!("{}", export::to_json(&analyzed.table.periods, shown)?);
                }
                Format::Table => {
                    if shown.is_empty() {
                        println!("No clients match these filters.");
                        return Ok(());
                    }
                    for row in shown {
                        let last_active = report::last_active_label(row, &analyzed.table.periods);
                        if last_active.is_empty() {
                            println!("- {} / {}: {}", row.manager, row.client, row.status());
                        } else {
                            println!(
                                "- {} / {}: {} (last active {})",
                                row.manager,
                                row.client,
                                row.status(),
                                last_active
                            );
                        }
                    }
                }
            }
        }
        Commands::Report { selection, out } => {
            let analyzed = load_and_classify(&selection, &config)?;
            let report = report::build_report(
                &source_name(&selection.csv),
                &analyzed.table.periods,
                &analyzed.rows,
                config.report.top_clients,
                chrono::Utc::now(),
            );
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
        Commands::Export { selection, out } => {
            let analyzed = load_and_classify(&selection, &config)?;
            let file = std::fs::File::create(&out)
                .with_context(|| format!("failed to create {}", out.display()))?;
            export::write_csv(
                std::io::BufWriter::new(file),
                &analyzed.table.periods,
                &analyzed.rows,
            )?;
            println!("Exported {} rows to {}.", analyzed.rows.len(), out.display());
        }
        Commands::Statuses => {
            for status in Status::ALL {
                println!("{:<18} {:<8} {}", status.id(), status.color(), status.label());
            }
        }
    }

    Ok(())
}
