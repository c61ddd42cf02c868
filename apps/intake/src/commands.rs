use std::{path::Path, sync::Arc};

use anyhow::{anyhow, bail, Context, Result};
use chrono::FixedOffset;
use client_core::{
    format::{format_currency, format_timestamp, short_id, sort_indicator},
    list_query::parse_status_filter,
    status::STATUS_UPDATE_FAILED_FALLBACK,
    DetailState, DetailView, DraftField, IntakeController, IntakeError, LineField,
    ListQueryState, ListView, ProcurementBackend, SortColumn, SortState,
};
use shared::{
    domain::{CommodityGroup, ProcurementRequest, RequestId, RequestStatus},
    protocol::{OfferUpload, RequestFilters},
};
use tokio::sync::broadcast;
use tracing::info;

/// One `--line` argument: `description;unit price;quantity[;unit]`.
#[derive(Debug, Clone, PartialEq)]
pub struct LineArg {
    pub description: String,
    pub unit_price: String,
    pub quantity: String,
    pub unit: String,
}

pub fn parse_line_arg(raw: &str) -> Result<LineArg, String> {
    let parts: Vec<&str> = raw.split(';').map(str::trim).collect();
    match parts.as_slice() {
        [description, unit_price, quantity] => Ok(LineArg {
            description: description.to_string(),
            unit_price: unit_price.to_string(),
            quantity: quantity.to_string(),
            unit: String::new(),
        }),
        [description, unit_price, quantity, unit] => Ok(LineArg {
            description: description.to_string(),
            unit_price: unit_price.to_string(),
            quantity: quantity.to_string(),
            unit: unit.to_string(),
        }),
        _ => Err(format!(
            "expected 'description;unit price;quantity[;unit]', got '{raw}'"
        )),
    }
}

#[derive(Debug, Default)]
pub struct NewRequestArgs {
    pub requestor: Option<String>,
    pub title: Option<String>,
    pub vendor: Option<String>,
    pub vat_id: Option<String>,
    pub department: Option<String>,
    pub commodity_group: Option<String>,
    pub lines: Vec<LineArg>,
    pub offer: Option<std::path::PathBuf>,
}

async fn read_offer(path: &Path) -> Result<OfferUpload> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read offer '{}'", path.display()))?;
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "offer.pdf".to_string());
    let content_type = filename
        .to_ascii_lowercase()
        .ends_with(".pdf")
        .then(|| OfferUpload::PDF_MIME.to_string());
    Ok(OfferUpload::new(filename, content_type, bytes))
}

fn table_row(request: &ProcurementRequest, tz: &FixedOffset) -> String {
    format!(
        "{:<10} {:<28} {:<20} {:<14} {:>14} {:<12} {}",
        short_id(request.id.as_str()),
        request.title,
        request.vendor_name,
        request.department,
        format_currency(request.total_cost),
        request.status,
        format_timestamp(&request.created_at, tz),
    )
}

/// `--sort` picks the column in its default direction; `--reverse` flips it.
fn sort_from_args(column: Option<SortColumn>, reverse: bool) -> SortState {
    match column {
        Some(column) => SortState::by(column, reverse),
        None => SortState::default(),
    }
}

pub async fn list(
    backend: Arc<dyn ProcurementBackend>,
    filters: RequestFilters,
    sort: Option<SortColumn>,
    reverse: bool,
    tz: FixedOffset,
) -> Result<()> {
    let mut view = ListView::new(backend, ListQueryState::new());
    let query = view.apply_filters(filters);
    view.set_sort(sort_from_args(sort, reverse));
    view.load().await;
    if let Some(message) = view.error() {
        bail!("{message}");
    }

    let sort = view.query().sort();
    if !query.is_empty() {
        println!("/requests?{query}");
    }
    let header: Vec<String> = SortColumn::ALL
        .into_iter()
        .map(|column| format!("{} {}", column.label(), sort_indicator(sort, column)))
        .collect();
    println!(
        "{:<10} {:<28} {:<20} {:<14} {:>14} {:<12} {}",
        header[0], header[1], header[2], header[3], header[4], header[5], header[6],
    );
    if let Some(message) = view.empty_message() {
        println!("{message}");
    }
    let rows = view.rows();
    for request in &rows {
        println!("{}", table_row(request, &tz));
    }
    println!("{}", view.summary());
    Ok(())
}

fn print_request(request: &ProcurementRequest, tz: &FixedOffset) {
    println!("{} ({})", request.title, request.id);
    println!("  status:          {}", request.status);
    println!("  requestor:       {}", request.requestor_name);
    println!("  department:      {}", request.department);
    println!("  vendor:          {}", request.vendor_name);
    if !request.vendor_vat_id.is_empty() {
        println!("  vendor VAT ID:   {}", request.vendor_vat_id);
    }
    if let Some(group) = request.commodity_group.as_deref() {
        println!("  commodity group: {group}");
    }
    println!("  created:         {}", format_timestamp(&request.created_at, tz));
    println!("  updated:         {}", format_timestamp(&request.updated_at, tz));
    for line in &request.order_lines {
        println!(
            "  - {} x {} {} @ {} = {}",
            line.amount,
            line.unit,
            line.position_description,
            format_currency(line.unit_price),
            format_currency(line.total_price),
        );
    }
    println!("  total:           {}", format_currency(request.total_cost));
}

pub async fn show(backend: Arc<dyn ProcurementBackend>, id: String, tz: FixedOffset) -> Result<()> {
    let (events, _) = broadcast::channel(16);
    let mut view = DetailView::new(backend, events, RequestId(id));
    view.load().await;
    match view.state() {
        DetailState::Loaded(status) => {
            print_request(status.request(), &tz);
            Ok(())
        }
        DetailState::NotFound => bail!("Request {} not found", view.id()),
        DetailState::Failed { message } => bail!("{message}"),
        DetailState::Loading => Err(anyhow!("request {} did not load", view.id())),
    }
}

pub async fn set_status(
    backend: Arc<dyn ProcurementBackend>,
    id: String,
    status: RequestStatus,
    tz: FixedOffset,
) -> Result<()> {
    let (events, _) = broadcast::channel(16);
    let mut view = DetailView::new(backend, events, RequestId(id));
    view.load().await;
    match view.state() {
        DetailState::NotFound => bail!("Request {} not found", view.id()),
        DetailState::Failed { message } => bail!("{message}"),
        DetailState::Loading | DetailState::Loaded(_) => {}
    }
    let controller = view
        .status_mut()
        .ok_or_else(|| anyhow!("request did not load"))?;

    match controller.set_status(status).await {
        Ok(true) => print_request(controller.request(), &tz),
        Ok(false) => println!("Status is already {status}."),
        Err(_) => bail!(
            "{}",
            controller.error().unwrap_or(STATUS_UPDATE_FAILED_FALLBACK)
        ),
    }
    Ok(())
}

pub async fn parse_offer(backend: Arc<dyn ProcurementBackend>, path: &Path) -> Result<()> {
    let upload = read_offer(path).await?;
    let mut intake = IntakeController::new(backend);
    intake.extract_offer(&upload).await.map_err(|err| {
        anyhow!(
            "{}",
            intake
                .extraction()
                .message()
                .map(str::to_string)
                .unwrap_or_else(|| err.to_string())
        )
    })?;
    if let Some(message) = intake.extraction().message() {
        eprintln!("{message}");
    }
    println!("{}", serde_json::to_string_pretty(&intake.draft().to_payload())?);
    Ok(())
}

pub async fn new_request(backend: Arc<dyn ProcurementBackend>, args: NewRequestArgs) -> Result<()> {
    let mut intake = IntakeController::new(backend);

    for (field, value) in [
        (DraftField::RequestorName, args.requestor),
        (DraftField::Title, args.title),
        (DraftField::VendorName, args.vendor),
        (DraftField::VendorVatId, args.vat_id),
        (DraftField::Department, args.department),
    ] {
        if let Some(value) = value {
            intake.set_field(field, value);
        }
    }
    if let Some(raw) = args.commodity_group {
        let group = CommodityGroup::parse(raw.trim())
            .ok_or_else(|| anyhow!("unknown commodity group '{raw}'"))?;
        intake.set_commodity_group(Some(group));
    }
    for (index, line) in args.lines.iter().enumerate() {
        if index > 0 {
            intake.add_line();
        }
        intake.update_line(index, LineField::Description, &line.description);
        intake.update_line(index, LineField::UnitPrice, &line.unit_price);
        intake.update_line(index, LineField::Quantity, &line.quantity);
        intake.update_line(index, LineField::Unit, &line.unit);
    }

    if let Some(path) = args.offer.as_deref() {
        let upload = read_offer(path).await?;
        // Extraction failures leave the form as typed.
        if intake.extract_offer(&upload).await.is_err() {
            if let Some(message) = intake.extraction().message() {
                eprintln!("{message}");
            }
        }
    }

    info!(total_cost = intake.total_cost(), "submitting");
    let outcome = match intake.submit().await {
        Ok(outcome) => outcome,
        Err(IntakeError::Validation(err)) => match err.focus {
            Some(field) => bail!("{} ({})", err.message, field.label()),
            None => bail!("{}", err.message),
        },
        Err(err) => return Err(err).context("request was not created"),
    };
    println!("{}", outcome.message);
    println!("{}", outcome.route);
    intake.finish_navigation();
    Ok(())
}

pub fn parse_status(raw: &str) -> Result<RequestStatus, String> {
    parse_status_filter(raw).ok_or_else(|| {
        format!(
            "expected one of {}",
            RequestStatus::ALL.map(RequestStatus::as_str).join(", ")
        )
    })
}
