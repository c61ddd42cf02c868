use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{HttpBackend, ProcurementBackend, SortColumn};
use shared::{domain::RequestStatus, protocol::RequestFilters};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use commands::{parse_line_arg, parse_status, LineArg, NewRequestArgs};
use config::load_settings;

#[derive(Parser, Debug)]
#[command(about = "Procurement request intake client")]
struct Cli {
    /// Config file; defaults to ./intake.toml when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List requests, filtered and sorted locally.
    List {
        #[arg(long, value_parser = parse_status)]
        status: Option<RequestStatus>,
        #[arg(long)]
        department: Option<String>,
        #[arg(long)]
        search: Option<String>,
        /// Column to sort by, e.g. total_cost or created_at.
        #[arg(long)]
        sort: Option<SortColumn>,
        /// Reverse the column's default direction.
        #[arg(long, requires = "sort")]
        reverse: bool,
    },
    Show {
        id: String,
    },
    /// Create a request. Fields left out may be filled from `--offer`.
    New {
        #[arg(long)]
        requestor: Option<String>,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        vendor: Option<String>,
        #[arg(long)]
        vat_id: Option<String>,
        #[arg(long)]
        department: Option<String>,
        #[arg(long)]
        commodity_group: Option<String>,
        /// `description;unit price;quantity[;unit]`, repeatable.
        #[arg(long = "line", value_parser = parse_line_arg)]
        lines: Vec<LineArg>,
        #[arg(long)]
        offer: Option<PathBuf>,
    },
    /// Extract fields from an offer PDF and print the pre-filled payload.
    ParseOffer {
        path: PathBuf,
    },
    SetStatus {
        id: String,
        #[arg(value_parser = parse_status)]
        status: RequestStatus,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let cli = Cli::parse();

    let settings = load_settings(cli.config.as_deref()).context("failed to load settings")?;
    let tz = settings.timezone()?;
    let backend: Arc<dyn ProcurementBackend> = Arc::new(
        HttpBackend::new(settings.base_url()?, settings.request_timeout())
            .context("failed to build http client")?,
    );
    info!(api_base_url = %settings.api_base_url, "using procurement backend");

    match cli.command {
        Command::List {
            status,
            department,
            search,
            sort,
            reverse,
        } => {
            let filters = RequestFilters {
                status,
                department,
                search,
            };
            commands::list(backend, filters, sort, reverse, tz).await?;
        }
        Command::Show { id } => commands::show(backend, id, tz).await?,
        Command::New {
            requestor,
            title,
            vendor,
            vat_id,
            department,
            commodity_group,
            lines,
            offer,
        } => {
            let args = NewRequestArgs {
                requestor,
                title,
                vendor,
                vat_id,
                department,
                commodity_group,
                lines,
                offer,
            };
            commands::new_request(backend, args).await?;
        }
        Command::ParseOffer { path } => commands::parse_offer(backend, &path).await?,
        Command::SetStatus { id, status } => {
            commands::set_status(backend, id, status, tz).await?;
        }
    }

    Ok(())
}
