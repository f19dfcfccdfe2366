mod export;
mod filters;
mod presets;
mod search;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use onset_core::SortKey;

use crate::filters::FilterArgs;

#[derive(Debug, Parser)]
#[command(name = "onset")]
#[command(about = "Company lead search, batch collection and export")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch and print one page of companies
    Search {
        #[command(flatten)]
        filters: FilterArgs,

        /// Page to fetch (1-based)
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        page: u32,

        /// Keep only these industries (raw name or Portuguese label); repeatable
        #[arg(long = "industry")]
        industries: Vec<String>,

        /// Sort order: name, industry, employees or revenue
        #[arg(long, default_value = "name")]
        sort: SortKey,

        /// Also write the page to a comma-delimited CSV
        #[arg(long)]
        export: bool,
    },
    /// Collect a range of pages and export them as one file
    Export {
        #[command(flatten)]
        filters: FilterArgs,

        /// First page to collect (1-based)
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        from: u32,

        /// Last page to collect, inclusive
        #[arg(long, conflicts_with = "all", required_unless_present = "all")]
        to: Option<u32>,

        /// Keep collecting until a page comes back empty
        #[arg(long)]
        all: bool,

        /// Do not reprocess failed pages before exporting
        #[arg(long)]
        no_retry: bool,

        /// Output layout
        #[arg(long, value_enum, default_value_t = ExportFormat::Display)]
        format: ExportFormat,

        /// Look up missing locations before writing the file
        #[arg(long)]
        enrich: bool,
    },
    /// List the configured search presets
    Presets,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ExportFormat {
    /// Name, industry, location, employees, website
    Display,
    /// Location split into city, state and country, plus contact columns
    Table,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = onset_core::load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    tracing::debug!(env = %config.env, "configuration loaded");

    match cli.command {
        Commands::Search {
            filters,
            page,
            industries,
            sort,
            export,
        } => {
            let filters = filters.resolve(&config)?;
            search::run_search(&config, &filters, page, &industries, sort, export).await
        }
        Commands::Export {
            filters,
            from,
            to,
            all,
            no_retry,
            format,
            enrich,
        } => {
            let filters = filters.resolve(&config)?;
            let plan = export::ExportPlan {
                from,
                to: if all { None } else { to },
                retry: !no_retry,
                format,
                enrich,
            };
            export::run_export(&config, filters, &plan).await
        }
        Commands::Presets => presets::list_presets(&config),
    }
}
