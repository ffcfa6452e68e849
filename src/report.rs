//! Flat comma-separated invoice report

use crate::crm::CrmApi;
use crate::lookup::InvoiceSearcher;
use crate::models::{invoice_props, CrmObject};
use crate::pipeline::location::{INVOICE_COLLECTION, INVOICE_COLLECTION_FALLBACK};
use anyhow::{Context, Result};
use std::io::Write;
use tracing::info;

/// Columns written when the caller doesn't pick any
pub const DEFAULT_COLUMNS: [&str; 8] = [
    invoice_props::OBJECT_ID,
    invoice_props::LOCATION_ID,
    invoice_props::NUMBER,
    invoice_props::STATUS,
    invoice_props::CREATE_DATE,
    invoice_props::AMOUNT_BILLED,
    invoice_props::DUE_DATE,
    invoice_props::BALANCE_DUE,
];

/// Write invoices with `location_id` as rows of `columns`; returns the row count
pub async fn export_by_location<W: Write>(
    api: &dyn CrmApi,
    location_id: &str,
    columns: &[&str],
    out: &mut W,
) -> Result<usize> {
    let response = InvoiceSearcher::new(api, INVOICE_COLLECTION)
        .with_fallback(INVOICE_COLLECTION_FALLBACK)
        .search(location_id, invoice_props::LOCATION_ID, columns, 100, None)
        .await
        .context("Failed to search invoices")?;

    if response.results.is_empty() {
        info!("No invoices found with location_id {}", location_id);
    }

    write_rows(&response.results, columns, out)?;
    Ok(response.results.len())
}

fn write_rows<W: Write>(invoices: &[CrmObject], columns: &[&str], out: &mut W) -> Result<()> {
    let header: Vec<String> = columns.iter().map(|c| field(c)).collect();
    writeln!(out, "{}", header.join(","))?;

    for invoice in invoices {
        let row: Vec<String> = columns
            .iter()
            .map(|c| field(invoice.property(c).unwrap_or("")))
            .collect();
        writeln!(out, "{}", row.join(","))?;
    }

    out.flush()?;
    Ok(())
}

/// Quote a field only when it would break the row
fn field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
