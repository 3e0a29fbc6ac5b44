// skucalc CLI - join usage against SKU commitments and review billing per tenant

mod dataset;
mod exit_codes;
mod logging;
mod report;
mod settings;
mod util;
mod views;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use skucalc_pipeline::config::PageLayout;
use skucalc_pipeline::load::USAGE_TABLE;
use skucalc_pipeline::PipelineError;
use skucalc_report::ReportError;

use exit_codes::{
    pipeline_exit_code, report_exit_code, EXIT_ERROR, EXIT_INVALID_CONFIG, EXIT_IO, EXIT_SUCCESS,
    EXIT_USAGE,
};

#[derive(Parser)]
#[command(name = "skucalc")]
#[command(about = "Price usage exports against SKU commitments and review cost per tenant")]
#[command(version)]
#[command(after_help = "\
Input files are read from --usage/--commitment, or from skucalc.toml
([usage] file / [commitment] file). Flags override the config file.

Examples:
  skucalc --usage current_usage.xlsx --commitment sku_commitment.xlsx top -n 10
  skucalc products --service Backup --sku S1
  skucalc tenant Acme --json
  skucalc report Acme --layout landscape -o reports/
  skucalc export -o MergedUsageWithCosts.xlsx")]
struct Cli {
    #[command(flatten)]
    input: InputArgs,

    /// Debug logging on stderr
    #[arg(long, short = 'v', global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Errors only on stderr
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Where the two input tables come from. Every flag overrides the matching
/// config value.
#[derive(Args, Debug, Clone, Default)]
pub struct InputArgs {
    /// Config file (default: ./skucalc.toml, then the user config dir)
    #[arg(long, global = true, env = "SKUCALC_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Usage table (.xlsx, .xls, .xlsb, .ods, .csv, .tsv)
    #[arg(long, global = true, value_name = "FILE")]
    pub usage: Option<PathBuf>,

    /// SKU commitment table
    #[arg(long, global = true, value_name = "FILE")]
    pub commitment: Option<PathBuf>,

    /// Zero-based row holding the usage headers [config default: 7]
    #[arg(long, global = true, value_name = "N")]
    pub usage_header_row: Option<usize>,

    /// Zero-based row holding the commitment headers [config default: 0]
    #[arg(long, global = true, value_name = "N")]
    pub commitment_header_row: Option<usize>,

    /// Worksheet to read from the usage workbook (default: first)
    #[arg(long, global = true, value_name = "NAME")]
    pub usage_sheet: Option<String>,

    /// Worksheet to read from the commitment workbook (default: first)
    #[arg(long, global = true, value_name = "NAME")]
    pub commitment_sheet: Option<String>,

    /// Commitment column holding the per-unit price [config default: "Commitment 4"]
    #[arg(long, global = true, value_name = "COLUMN")]
    pub price_column: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Tenants ranked by total cost
    #[command(after_help = "\
Examples:
  skucalc top
  skucalc top -n 5 --json")]
    Top {
        /// How many tenants to show [config default: 30]
        #[arg(short = 'n', long)]
        n: Option<usize>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Per-tenant usage and cost for one service and/or SKU
    #[command(after_help = "\
Examples:
  skucalc products --service Backup
  skucalc products --sku S1
  skucalc products --service Backup --sku 'Storage - S1'
  skucalc products --service Email --top 5")]
    Products {
        /// Only lines of this service
        #[arg(long)]
        service: Option<String>,

        /// Only lines of this SKU (a SKU or a "<metric> - <sku>" option label)
        #[arg(long)]
        sku: Option<String>,

        /// Customers in the revenue ranking (default 10)
        #[arg(long, value_name = "N")]
        top: Option<usize>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Every billed line of one tenant with totals
    Tenant {
        /// Tenant name, exactly as in the usage table
        name: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the services, SKU options and tenants available for selection
    Options {
        /// Restrict SKU options to one service
        #[arg(long)]
        service: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write the joined dataset to a spreadsheet
    #[command(after_help = "\
The format follows the extension: .xlsx, .csv or .tsv.

Examples:
  skucalc export
  skucalc export -o merged.csv")]
    Export {
        /// Output file [default: MergedUsageWithCosts.xlsx]
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Render a PDF billing report for one tenant
    #[command(after_help = "\
Examples:
  skucalc report Acme
  skucalc report Acme --layout landscape -o reports/
  skucalc report Acme -o acme-2024-01.pdf")]
    Report {
        /// Tenant name, exactly as in the usage table
        name: String,

        /// Page orientation [config default: portrait]
        #[arg(long, value_enum)]
        layout: Option<LayoutArg>,

        /// Output file or directory [default: ./Report_<tenant>.pdf]
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Answer a view request read from a TOML file, as JSON
    #[command(after_help = "\
Request file format:
  tenant = \"Acme\"            # tenant_detail
  service_filter = \"Backup\"  # product_breakdown, selection_options
  sku_filter = \"S1\"          # product_breakdown

  [action]
  kind = \"top_tenants\"       # or product_breakdown, tenant_detail, selection_options
  n = 10                     # top_tenants only")]
    Request {
        /// TOML request file
        file: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LayoutArg {
    Portrait,
    Landscape,
}

impl From<LayoutArg> for PageLayout {
    fn from(arg: LayoutArg) -> Self {
        match arg {
            LayoutArg::Portrait => PageLayout::Portrait,
            LayoutArg::Landscape => PageLayout::Landscape,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.quiet);

    let input = cli.input;
    let result = match cli.command {
        Commands::Top { n, json } => views::cmd_top(&input, n, json),
        Commands::Products { service, sku, top, json } => {
            views::cmd_products(&input, service, sku, top, json)
        }
        Commands::Tenant { name, json } => views::cmd_tenant(&input, name, json),
        Commands::Options { service, json } => views::cmd_options(&input, service, json),
        Commands::Request { file } => views::cmd_request(&input, &file),
        Commands::Export { output } => report::cmd_export(&input, output),
        Commands::Report { name, layout, output } => {
            report::cmd_report(&input, &name, layout.map(PageLayout::from), output)
        }
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

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn args(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self::new(EXIT_IO, msg)
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::new(EXIT_INVALID_CONFIG, msg)
    }

    pub fn other(msg: impl Into<String>) -> Self {
        Self::new(EXIT_ERROR, msg)
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<PipelineError> for CliError {
    fn from(err: PipelineError) -> Self {
        let code = pipeline_exit_code(&err);
        let hint = match &err {
            PipelineError::MissingColumn { table, .. } if table == USAGE_TABLE => {
                Some("check --usage-header-row: the header may sit on a different row".to_string())
            }
            PipelineError::MissingColumn { .. } => {
                Some("check --commitment-header-row and --price-column".to_string())
            }
            PipelineError::DuplicateSku { .. } => {
                Some("set [commitment] duplicate_skus = \"fan_out\" to keep every match".to_string())
            }
            _ => None,
        };
        Self { code, message: err.to_string(), hint }
    }
}

impl From<ReportError> for CliError {
    fn from(err: ReportError) -> Self {
        Self::new(report_exit_code(&err), err.to_string())
    }
}
