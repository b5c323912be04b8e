//! label-sheet: print table rows as barcode labels on A4 sheets
//!
//! Rows come from a JSON array of objects with `branch`, `area`,
//! `purchase_order`, `code` and `quantity`. The PDF is only written when
//! every row validates and renders.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use flexi_logger::Logger;
use thiserror::Error;

use label_sheet::{
    build_sheet, output_file_name, parse_format, BarcodeRasterizer, CommandLog, GridConfig, LayoutError, PdfCanvas,
    RawRow,
};

#[derive(Error, Debug)]
enum CliError {
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error("failed to read rows: {0}")]
    Io(#[from] std::io::Error),
    #[error("rows file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Usage(&'static str),
}

#[derive(Parser, Debug)]
#[command(name = "label-sheet", version, about = "Print barcode labels on A4 sheets")]
struct Args {
    /// JSON rows file, `-` for stdin
    rows: PathBuf,

    /// Barcode format: EAN13, EAN8, ITF14, UPC or CODE128
    #[arg(short, long)]
    format: Option<String>,

    /// Company title printed at the top of every label
    #[arg(short, long, default_value = "")]
    title: String,

    /// Output file (defaults to etiquetas_<FORMAT>.pdf)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Regular TrueType face to embed instead of Helvetica
    #[arg(long, requires = "font_bold")]
    font: Option<PathBuf>,

    /// Bold TrueType face, used with --font
    #[arg(long, requires = "font")]
    font_bold: Option<PathBuf>,

    /// Validate and lay out without writing a PDF
    #[arg(long)]
    dry_run: bool,

    /// Log every placed label
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    let logger = match Logger::try_with_env_or_str(level).and_then(|l| l.start()) {
        Ok(handle) => Some(handle),
        Err(err) => {
            eprintln!("Failed to start logger: {err}");
            None
        }
    };

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if logger.is_some() {
                log::error!("{err}");
            } else {
                eprintln!("error: {err}");
            }
            ExitCode::FAILURE
        }
    }
}

fn read_rows(path: &Path) -> Result<Vec<RawRow>, CliError> {
    let text = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(path)?
    };
    Ok(serde_json::from_str(&text)?)
}

fn run(args: &Args) -> Result<(), CliError> {
    let format = parse_format(args.format.as_deref()).map_err(LayoutError::from)?;
    let rows = read_rows(&args.rows)?;
    log::info!("{} row(s) read from {}", rows.len(), args.rows.display());

    let cfg = GridConfig::default();
    let mut rasterizer = BarcodeRasterizer;

    if args.dry_run {
        let mut log = CommandLog::new();
        let summary = build_sheet(&rows, args.format.as_deref(), &args.title, &cfg, &mut rasterizer, &mut log)?;
        println!("{} label(s) on {} page(s), {} draw calls", summary.labels, summary.pages, log.commands.len());
        return Ok(());
    }

    let mut canvas = match (&args.font, &args.font_bold) {
        (Some(regular), Some(bold)) => PdfCanvas::with_fonts("Etiquetas", std::fs::read(regular)?, std::fs::read(bold)?)?,
        (None, None) => PdfCanvas::new("Etiquetas")?,
        _ => return Err(CliError::Usage("--font and --font-bold must be given together")),
    };
    build_sheet(&rows, args.format.as_deref(), &args.title, &cfg, &mut rasterizer, &mut canvas)?;

    let output = args.output.clone().unwrap_or_else(|| PathBuf::from(output_file_name(format)));
    canvas.save(&output)?;
    Ok(())
}
