use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use worldstats::{Client, stats, storage};

#[derive(Parser, Debug)]
#[command(
    name = "worldstats",
    version,
    about = "Fetch, export & summarize cross-country statistical data"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Export table data for one year (and optionally print stats).
    Export(ExportArgs),
}

#[derive(ValueEnum, Clone, Debug)]
enum OutFormat {
    Csv,
    Json,
}

#[derive(Args, Debug)]
struct ExportArgs {
    /// Year to export (defaults to the newest year with data).
    #[arg(short, long)]
    year: Option<i32>,
    /// Indicator ids separated by comma or semicolon; all when omitted.
    #[arg(short, long)]
    indexes: Option<String>,
    /// Save results to file (format inferred by --format or extension).
    #[arg(long)]
    out: Option<PathBuf>,
    /// Output format (csv or json). If omitted, inferred from --out extension.
    #[arg(long, value_enum)]
    format: Option<OutFormat>,
    /// Print per-indicator statistics to stdout.
    #[arg(long, default_value_t = false)]
    stats: bool,
    /// Base URL of the dashboard query API.
    #[arg(long, default_value = "http://localhost:8004")]
    base_url: String,
}

fn fmt_opt(v: Option<f64>) -> String {
    match v {
        Some(x) if x.is_finite() => {
            // Format up to 4 decimals, then trim trailing zeros and trailing dot.
            let s = format!("{:.4}", x);
            s.trim_end_matches('0').trim_end_matches('.').to_string()
        }
        _ => "NA".to_string(),
    }
}

fn parse_list(s: &str) -> Vec<String> {
    s.split([',', ';'])
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Export(args) => cmd_export(args),
    }
}

fn cmd_export(args: ExportArgs) -> Result<()> {
    let client = Client::new(args.base_url.clone());

    let year = match args.year {
        Some(y) => y,
        None => {
            let years = client.fetch_raw_years()?;
            *years
                .iter()
                .max()
                .ok_or_else(|| anyhow::anyhow!("no data years available at {}", args.base_url))?
        }
    };

    let rows = client.fetch_raw_rows(year)?;
    if rows.is_empty() {
        anyhow::bail!("no data for year {year}");
    }

    let indexes: Vec<String> = match &args.indexes {
        Some(list) => parse_list(list),
        None => {
            let indicators = client.fetch_indicators()?;
            if indicators.is_empty() {
                // fall back to the columns present in the data
                rows[0].values.keys().cloned().collect()
            } else {
                indicators.into_iter().map(|i| i.id).collect()
            }
        }
    };

    if let Some(path) = args.out.as_ref() {
        let fmt = match args.format {
            Some(OutFormat::Csv) => "csv",
            Some(OutFormat::Json) => "json",
            None => path.extension().and_then(|e| e.to_str()).unwrap_or("csv"),
        }
        .to_ascii_lowercase();
        match fmt.as_str() {
            "csv" => storage::save_csv(&rows, &indexes, path)?,
            "json" => storage::save_json(&rows, path)?,
            other => anyhow::bail!("unsupported format: {}", other),
        }
        eprintln!("Saved {} rows to {}", rows.len(), path.display());
    }

    if args.stats {
        let summaries = stats::indicator_summary(&rows, &indexes);
        for s in summaries {
            println!(
                "{}  count={} missing={}  min={} max={} mean={} median={}",
                s.indicator_id,
                s.count,
                s.missing,
                fmt_opt(s.min),
                fmt_opt(s.max),
                fmt_opt(s.mean),
                fmt_opt(s.median)
            );
        }
    }

    Ok(())
}
