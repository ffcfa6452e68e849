use crate::handler::{AssociatedInvoiceResponse, InvoiceListResponse, GET_ASSOCIATED_INVOICE, GET_INVOICES};
use crate::models::{InvoiceDetail, InvoiceSummary};
use crate::panel::format;
use crate::panel::invoke::{InvokeResult, InvokeStatus};
use crate::panel::{PanelState, PanelView};
use crate::pipeline::association::INVOICE_OBJECT_TYPE;
use serde_json::Value;

const UNEXPECTED_FORMAT: &str = "Unexpected response format";

fn host_error(response: &Value) -> String {
    response
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("Unknown error")
        .to_string()
}

/// Invoices at the record's location, shown as a table
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceTable {
    pub total: u64,
    pub rows: Vec<InvoiceSummary>,
}

impl PanelView for InvoiceTable {
    const FUNCTION: &'static str = GET_INVOICES;
    const LOADING: &'static str = "Loading invoices...";
    const ERROR_TITLE: &'static str = "Error";
    const EMPTY_ACTION: Option<&'static str> = Some("[Refresh]");

    fn from_invocation(result: InvokeResult) -> PanelState<Self> {
        if result.status == InvokeStatus::Error {
            return PanelState::Error(host_error(&result.response));
        }

        match serde_json::from_value::<InvoiceListResponse>(result.response) {
            Ok(InvoiceListResponse::Success { results, .. }) if results.is_empty() => {
                PanelState::Empty("No invoices found".to_string())
            }
            Ok(InvoiceListResponse::Success { total, results }) => {
                PanelState::Success(InvoiceTable {
                    total,
                    rows: results,
                })
            }
            Ok(InvoiceListResponse::Empty { message }) => PanelState::Empty(message),
            Ok(InvoiceListResponse::Error { message }) => PanelState::Error(message),
            Err(_) => PanelState::Error(UNEXPECTED_FORMAT.to_string()),
        }
    }

    fn render(&self) -> Vec<String> {
        let headers = ["Invoice #", "Status", "Amount", "Balance", "Due Date"];
        let cells: Vec<[String; 5]> = self
            .rows
            .iter()
            .map(|row| {
                [
                    row.invoice_number.clone().unwrap_or_default(),
                    row.status.clone().unwrap_or_default(),
                    row.amount_billed.as_deref().map(format::money).unwrap_or_default(),
                    row.balance.as_deref().map(format::money).unwrap_or_default(),
                    row.due_date.as_deref().map(format::date).unwrap_or_default(),
                ]
            })
            .collect();

        let mut widths = headers.map(str::len);
        for row in &cells {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let line = |values: Vec<&str>| {
            values
                .iter()
                .zip(widths)
                .map(|(v, w)| format!("{:<w$}", v, w = w))
                .collect::<Vec<_>>()
                .join(" | ")
                .trim_end()
                .to_string()
        };

        let count = self.rows.len();
        let mut lines = vec![format!(
            "{} invoice{} found",
            count,
            if count == 1 { "" } else { "s" }
        )];
        lines.push(line(headers.to_vec()));
        lines.push(
            widths
                .iter()
                .map(|w| "-".repeat(*w))
                .collect::<Vec<_>>()
                .join("-+-"),
        );
        for row in &cells {
            lines.push(line(row.iter().map(String::as_str).collect()));
        }
        lines.push("[Refresh]".to_string());
        lines
    }
}

/// The one invoice linked to a conference, shown as a detail card
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceCard {
    pub invoice: InvoiceDetail,
}

impl PanelView for InvoiceCard {
    const FUNCTION: &'static str = GET_ASSOCIATED_INVOICE;
    const LOADING: &'static str = "Loading...";
    const ERROR_TITLE: &'static str = "Error loading invoice data";
    const EMPTY_ACTION: Option<&'static str> = None;

    fn from_invocation(result: InvokeResult) -> PanelState<Self> {
        if result.status == InvokeStatus::Error {
            return PanelState::Error(host_error(&result.response));
        }

        match serde_json::from_value::<AssociatedInvoiceResponse>(result.response) {
            Ok(AssociatedInvoiceResponse::Success {
                invoice: Some(invoice),
            }) => PanelState::Success(InvoiceCard { invoice }),
            Ok(AssociatedInvoiceResponse::Success { invoice: None }) => PanelState::Empty(
                "No associated invoice found for this conference.".to_string(),
            ),
            Ok(AssociatedInvoiceResponse::Error { message }) => PanelState::Error(message),
            Err(_) => PanelState::Error(UNEXPECTED_FORMAT.to_string()),
        }
    }

    fn render(&self) -> Vec<String> {
        let invoice = self.invoice.clone();
        let rows = [
            ("Invoice Number:", format::or_na(invoice.hs_number)),
            ("Status:", format::or_na(invoice.hs_invoice_status)),
            (
                "Invoice Date:",
                format::or_na(invoice.hs_invoice_date.as_deref().map(format::date)),
            ),
            (
                "Amount Billed:",
                format::or_na(invoice.hs_amount_billed.as_deref().map(format::money)),
            ),
            (
                "Amount Paid:",
                format::or_na(invoice.hs_amount_paid.as_deref().map(format::money)),
            ),
        ];

        let mut lines = vec!["Invoice Details".to_string(), "-".repeat(30)];
        for (label, value) in rows {
            lines.push(format!("{:<16}{}", label, value));
        }
        lines.push("-".repeat(30));
        lines.push(format!(
            "View Invoice Details: /objects/{}/{}",
            INVOICE_OBJECT_TYPE, invoice.id
        ));
        lines
    }
}
