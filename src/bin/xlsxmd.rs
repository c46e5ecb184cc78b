//! xlsxmd CLI - Convert an XLSX workbook into Markdown tables

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use xlsxmd::{ConverterBuilder, JsonLinesAuditSink};

#[derive(Parser)]
#[command(name = "xlsxmd")]
#[command(version)]
#[command(about = "Convert XLSX workbooks into Markdown tables", long_about = None)]
struct Cli {
    /// Input .xlsx file (reads from stdin if not provided)
    input_file: Option<PathBuf>,

    /// Output file path (writes to stdout if not provided)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the full conversion result as JSON instead of Markdown
    #[arg(long)]
    json: bool,

    /// Include hidden sheets
    #[arg(long)]
    include_hidden: bool,

    /// Maximum number of sheets in the workbook (0 = unlimited)
    #[arg(long, default_value_t = 50)]
    max_sheets: usize,

    /// Maximum number of cells per sheet (0 = unlimited)
    #[arg(long, default_value_t = 200_000)]
    max_cells: usize,

    /// Conversion timeout in seconds (0 disables the timeout)
    #[arg(long, default_value_t = 10)]
    timeout: u64,

    /// Append a JSON Lines audit record to this file
    #[arg(long)]
    audit_log: Option<PathBuf>,
}

fn main() -> ExitCode {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut builder = ConverterBuilder::new()
        .include_hidden_sheets(cli.include_hidden)
        .with_max_sheets(cli.max_sheets)
        .with_max_cells_per_sheet(cli.max_cells);

    builder = if cli.timeout == 0 {
        builder.without_timeout()
    } else {
        builder.with_timeout(Duration::from_secs(cli.timeout))
    };

    if let Some(path) = &cli.audit_log {
        let file = fs::OpenOptions::new().create(true).append(true).open(path)?;
        builder = builder.with_audit_sink(Arc::new(JsonLinesAuditSink::new(file)));
    }

    let converter = builder.build()?;

    let (filename, input) = match &cli.input_file {
        Some(path) => (path.display().to_string(), fs::read(path)?),
        None => {
            let mut buffer = Vec::new();
            io::stdin().read_to_end(&mut buffer)?;
            ("<stdin>".to_string(), buffer)
        }
    };

    let result = converter.convert_named(&filename, &input)?;

    let rendered = if cli.json {
        result.to_json_pretty()?
    } else {
        result.combined_markdown
    };

    match &cli.output {
        Some(path) => fs::write(path, rendered)?,
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{}", rendered)?;
            stdout.flush()?;
        }
    }

    Ok(())
}
