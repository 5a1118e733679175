// supsum CLI - supplier payment summaries from procurement spreadsheets

mod browse;
mod display;
mod exit_codes;
mod load;

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use supsum_config::{ConfigError, Settings};
use supsum_io::{write_report, ExportError, IngestError, SheetCache};
use supsum_pipeline::columns::{col_letter, column_labels};
use supsum_pipeline::{
    locate, resolve, ColumnMap, ColumnSource, Field, ManualSelection, PipelineError, Resolution, Summary, SummaryState,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use exit_codes::{
    EXIT_COLUMN_AMBIGUOUS, EXIT_EMPTY_RESULT, EXIT_ERROR, EXIT_HEADER_NOT_FOUND, EXIT_INGEST, EXIT_SUCCESS,
    EXIT_USAGE,
};
use load::{describe_labels, open_session, InputArgs};

#[derive(Parser)]
#[command(name = "supsum")]
#[command(about = "Summarize supplier payments from a procurement spreadsheet")]
#[command(version)]
struct Cli {
    /// Settings file (default: <config dir>/supsum/settings.toml)
    #[arg(long, global = true, env = "SUPSUM_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug). SUPSUM_LOG overrides.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Colour the table (header bold, total row highlighted)
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    color: ColorChoice,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ColorChoice {
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    fn enabled(self) -> bool {
        match self {
            ColorChoice::Auto => atty::is(atty::Stream::Stdout),
            ColorChoice::Always => true,
            ColorChoice::Never => false,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print the supplier table with its total row
    #[command(after_help = "\
Examples:
  supsum summary payments.xlsx
  supsum summary payments.xlsx --query acme
  supsum summary payments.csv --query 123-456 --json
  supsum summary payments.xlsx --supplier-col B --amount-col 'Amount Paid' --tin-col none")]
    Summary {
        #[command(flatten)]
        input: InputArgs,

        /// Case-insensitive search on supplier name or TIN
        #[arg(long, short = 'q', default_value = "")]
        query: String,

        /// Output JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Exit 6 when there is nothing to report
        #[arg(long)]
        fail_on_empty: bool,
    },

    /// Write the filtered summary as a styled xlsx report
    #[command(after_help = "\
Examples:
  supsum export payments.xlsx
  supsum export payments.xlsx --query acme -o acme.xlsx")]
    Export {
        #[command(flatten)]
        input: InputArgs,

        /// Case-insensitive search on supplier name or TIN
        #[arg(long, short = 'q', default_value = "")]
        query: String,

        /// Output file (default: export.file_name from settings)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Exit 6 instead of writing an empty report
        #[arg(long)]
        fail_on_empty: bool,

        /// Suppress the confirmation line on stderr
        #[arg(long)]
        quiet: bool,
    },

    /// Show the detected header row and column labels
    Columns {
        /// Procurement file
        file: PathBuf,

        /// Output JSON
        #[arg(long)]
        json: bool,
    },

    /// Read search terms from stdin, one per line, re-filtering each time
    #[command(after_help = "\
Commands inside the loop:
  :export [PATH]   write the current view as xlsx
  :reload          re-read the file
  :quit            leave")]
    Browse {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Settings file management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the settings file location
    Path,
    /// Print the effective settings as TOML
    Show,
    /// Write a commented default settings file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let color = cli.color.enabled();
    let config = cli.config.as_deref();

    let result = match cli.command {
        Commands::Summary { input, query, json, fail_on_empty } => {
            cmd_summary(config, &input, &query, json, fail_on_empty, color)
        }
        Commands::Export { input, query, output, fail_on_empty, quiet } => {
            cmd_export(config, &input, &query, output, fail_on_empty, quiet)
        }
        Commands::Columns { file, json } => cmd_columns(config, &file, json),
        Commands::Browse { input } => cmd_browse(config, &input, color),
        Commands::Config { command } => match command {
            ConfigCommands::Path => cmd_config_path(config),
            ConfigCommands::Show => cmd_config_show(config),
            ConfigCommands::Init { force } => cmd_config_init(config, force),
        },
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

/// Log records from the library crates go to stderr; stdout stays clean
/// for tables and JSON.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let env_filter = EnvFilter::try_from_env("SUPSUM_LOG").unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(false)
                .with_ansi(atty::is(atty::Stream::Stderr))
                .with_filter(env_filter),
        )
        .try_init();
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn ingest(err: IngestError) -> Self {
        let hint = match &err {
            IngestError::UnsupportedFormat(_) => {
                Some("supported: .xlsx .xlsm .xls .xlsb .ods .csv .tsv".to_string())
            }
            IngestError::NoSheets => Some("the workbook has no worksheets".to_string()),
            _ => None,
        };
        Self { code: EXIT_INGEST, message: err.to_string(), hint }
    }

    pub fn pipeline(err: PipelineError) -> Self {
        match &err {
            PipelineError::HeaderNotFound { .. } => Self {
                code: EXIT_HEADER_NOT_FOUND,
                message: err.to_string(),
                hint: Some("labels can be changed in settings (supsum config show)".to_string()),
            },
            PipelineError::UnknownColumn { available, .. } => Self {
                code: EXIT_USAGE,
                message: err.to_string(),
                hint: Some(format!("available columns: {}", describe_labels(available))),
            },
            PipelineError::MissingChoice(field) => Self {
                code: EXIT_COLUMN_AMBIGUOUS,
                message: err.to_string(),
                hint: Some(format!("pass {}", flag_for(*field))),
            },
        }
    }

    /// Columns could not be resolved; `field` narrows the message to one flag.
    pub fn ambiguous(selection: &ManualSelection, field: Option<Field>) -> Self {
        let missing: Vec<Field> = match field {
            Some(f) => vec![f],
            None => selection.missing.clone(),
        };
        let names: Vec<&str> = missing.iter().map(|f| f.title()).collect();
        let flags: Vec<&str> = missing.iter().map(|f| flag_for(*f)).collect();
        Self {
            code: EXIT_COLUMN_AMBIGUOUS,
            message: format!("could not find column(s): {}", names.join(", ")),
            hint: Some(format!(
                "pass {} (label, letter or number); available columns: {}",
                flags.join(" "),
                describe_labels(&selection.labels)
            )),
        }
    }

    pub fn export(err: ExportError) -> Self {
        Self { code: EXIT_ERROR, message: err.to_string(), hint: None }
    }

    pub fn config(err: ConfigError) -> Self {
        let hint = match &err {
            ConfigError::Parse { .. } => Some("fix the file or regenerate it with `supsum config init --force`"),
            _ => None,
        };
        Self { code: EXIT_ERROR, message: err.to_string(), hint: hint.map(String::from) }
    }

    pub fn empty(msg: impl Into<String>) -> Self {
        Self { code: EXIT_EMPTY_RESULT, message: msg.into(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

fn flag_for(field: Field) -> &'static str {
    match field {
        Field::SupplierName => "--supplier-col",
        Field::TaxId => "--tin-col",
        Field::TotalAmount => "--amount-col",
    }
}

fn load_settings(config: Option<&Path>) -> Result<Settings, CliError> {
    Settings::load(config).map_err(CliError::config)
}

// ============================================================================
// summary
// ============================================================================

#[derive(Serialize)]
struct ColumnLetters {
    supplier_name: String,
    tax_id: Option<String>,
    total_amount: String,
}

impl From<&ColumnMap> for ColumnLetters {
    fn from(map: &ColumnMap) -> Self {
        Self {
            supplier_name: col_letter(map.supplier_name),
            tax_id: map.tax_id.map(col_letter),
            total_amount: col_letter(map.total_amount),
        }
    }
}

#[derive(Serialize)]
struct SummaryJson<'a> {
    file: String,
    /// 1-based, as shown in a spreadsheet
    header_row: usize,
    columns: ColumnLetters,
    column_source: ColumnSource,
    #[serde(flatten)]
    summary: &'a Summary,
}

fn cmd_summary(
    config: Option<&Path>,
    input: &InputArgs,
    query: &str,
    json: bool,
    fail_on_empty: bool,
    color: bool,
) -> Result<(), CliError> {
    let settings = load_settings(config)?;
    let mut cache = SheetCache::new();
    let session = open_session(&mut cache, &settings.header_labels(), input)?;
    let summary = session.view(query);

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    if json {
        let out = SummaryJson {
            file: input.file.display().to_string(),
            header_row: session.header().0 + 1,
            columns: ColumnLetters::from(session.columns()),
            column_source: session.column_source(),
            summary: &summary,
        };
        let text = serde_json::to_string_pretty(&out).map_err(|e| CliError::io(e.to_string()))?;
        writeln!(handle, "{}", text).map_err(|e| CliError::io(e.to_string()))?;
        return check_empty(&summary, fail_on_empty);
    }

    match display::empty_message(&summary) {
        Some(message) if fail_on_empty => Err(CliError::empty(message)),
        Some(message) => {
            eprintln!("{}", message);
            writeln!(handle, "{}", display::entry_count_line(0)).map_err(|e| CliError::io(e.to_string()))
        }
        None => handle
            .write_all(display::render_summary(&summary, color).as_bytes())
            .map_err(|e| CliError::io(e.to_string())),
    }
}

fn check_empty(summary: &Summary, fail_on_empty: bool) -> Result<(), CliError> {
    match display::empty_message(summary) {
        Some(message) if fail_on_empty => Err(CliError::empty(message)),
        _ => Ok(()),
    }
}

// ============================================================================
// export
// ============================================================================

fn cmd_export(
    config: Option<&Path>,
    input: &InputArgs,
    query: &str,
    output: Option<PathBuf>,
    fail_on_empty: bool,
    quiet: bool,
) -> Result<(), CliError> {
    let settings = load_settings(config)?;
    let mut cache = SheetCache::new();
    let session = open_session(&mut cache, &settings.header_labels(), input)?;
    let summary = session.view(query);
    check_empty(&summary, fail_on_empty)?;

    let path = output.unwrap_or_else(|| PathBuf::from(&settings.export.file_name));
    write_report(&summary.report(), &path).map_err(CliError::export)?;

    if !quiet {
        eprintln!("wrote {} ({} entries)", path.display(), summary.entry_count);
        if summary.state != SummaryState::Records {
            eprintln!("note: the report has only the header and a zero total");
        }
    }
    Ok(())
}

// ============================================================================
// columns
// ============================================================================

#[derive(Serialize)]
struct ColumnsJson {
    file: String,
    header_row: usize,
    labels: Vec<String>,
    resolution: Resolution,
}

fn cmd_columns(config: Option<&Path>, file: &Path, json: bool) -> Result<(), CliError> {
    let settings = load_settings(config)?;
    let labels = settings.header_labels();
    let mut cache = SheetCache::new();
    let grid = cache.load(file).map_err(CliError::ingest)?;
    let header = locate(&grid, &labels).map_err(CliError::pipeline)?;
    let available = column_labels(&grid, header);
    let resolution = resolve(&grid, header, &labels);

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let write_err = |e: io::Error| CliError::io(e.to_string());

    if json {
        let out = ColumnsJson {
            file: file.display().to_string(),
            header_row: header.0 + 1,
            labels: available,
            resolution,
        };
        let text = serde_json::to_string_pretty(&out).map_err(|e| CliError::io(e.to_string()))?;
        return writeln!(handle, "{}", text).map_err(write_err);
    }

    writeln!(handle, "header row: {}", header.0 + 1).map_err(write_err)?;
    let mapped = |col: usize| -> Option<&'static str> {
        let Resolution::Resolved(map) = &resolution else { return None };
        if map.supplier_name == col {
            Some(Field::SupplierName.title())
        } else if map.tax_id == Some(col) {
            Some(Field::TaxId.title())
        } else if map.total_amount == col {
            Some(Field::TotalAmount.title())
        } else {
            None
        }
    };
    for (col, label) in available.iter().enumerate() {
        let line = match mapped(col) {
            Some(field) => format!("  {:<3} {}  -> {}", col_letter(col), label, field),
            None => format!("  {:<3} {}", col_letter(col), label),
        };
        writeln!(handle, "{}", line).map_err(write_err)?;
    }
    let status = match &resolution {
        Resolution::Resolved(_) => "columns: detected automatically".to_string(),
        Resolution::NeedsManualInput(sel) => {
            let missing: Vec<&str> = sel.missing.iter().map(|f| f.title()).collect();
            let flags: Vec<&str> = sel.missing.iter().map(|f| flag_for(*f)).collect();
            format!("columns: not detected ({}); use {}", missing.join(", "), flags.join(" "))
        }
    };
    writeln!(handle, "{}", status).map_err(write_err)
}

// ============================================================================
// browse
// ============================================================================

fn cmd_browse(config: Option<&Path>, input: &InputArgs, color: bool) -> Result<(), CliError> {
    let settings = load_settings(config)?;
    let labels = settings.header_labels();
    let mut cache = SheetCache::new();
    let default_export = PathBuf::from(&settings.export.file_name);

    let mut browser = browse::Browser::open(&mut cache, &labels, input, default_export, color)?;
    let stdin = io::stdin();
    let prompt = atty::is(atty::Stream::Stdin);
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    browser.run(stdin.lock(), &mut handle, prompt)?;
    drop(browser);

    let (hits, misses) = cache.stats();
    log::debug!("sheet cache: {} hits, {} misses", hits, misses);
    Ok(())
}

// ============================================================================
// config
// ============================================================================

fn settings_path(config: Option<&Path>) -> PathBuf {
    config.map(Path::to_path_buf).unwrap_or_else(Settings::config_path)
}

fn cmd_config_path(config: Option<&Path>) -> Result<(), CliError> {
    let path = settings_path(config);
    let state = if path.exists() { "" } else { " (not created yet)" };
    println!("{}{}", path.display(), state);
    Ok(())
}

fn cmd_config_show(config: Option<&Path>) -> Result<(), CliError> {
    let settings = load_settings(config)?;
    let text = toml::to_string_pretty(&settings).map_err(|e| CliError::io(e.to_string()))?;
    print!("{}", text);
    Ok(())
}

fn cmd_config_init(config: Option<&Path>, force: bool) -> Result<(), CliError> {
    let path = settings_path(config);
    if path.exists() && !force {
        return Err(CliError::args(format!("{} already exists", path.display()))
            .with_hint("pass --force to overwrite it"));
    }
    Settings::write_default_file(&path).map_err(CliError::config)?;
    eprintln!("wrote {}", path.display());
    Ok(())
}
