//! Fill in `location_id` on invoices that lack it.
//!
//! The location code is the first six characters of the invoice number. One page
//! of up to 100 invoices is handled per run.

use crate::crm::{CrmApi, CrmError, Filter, ObjectUpdate, SearchRequest};
use crate::lookup::{InvoiceSearcher, SearchFailure};
use crate::models::invoice_props;
use crate::pipeline::association::INVOICE_OBJECT_TYPE;
use std::collections::HashMap;
use tracing::{info, warn};

const LOCATION_CODE_LEN: usize = 6;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BackfillPlan {
    /// Invoices returned by the search
    pub scanned: usize,
    pub updates: Vec<ObjectUpdate>,
    /// Ids of invoices whose number is missing or too short
    pub skipped: Vec<String>,
}

/// Location code for an invoice number, if it is long enough
///
/// The number is taken as stored; surrounding whitespace is part of the prefix.
pub fn location_code(invoice_number: &str) -> Option<String> {
    (invoice_number.chars().count() >= LOCATION_CODE_LEN)
        .then(|| invoice_number.chars().take(LOCATION_CODE_LEN).collect())
}

/// Find invoices without `location_id` and work out their new value
pub async fn plan(api: &dyn CrmApi) -> Result<BackfillPlan, SearchFailure> {
    let request = SearchRequest::single(
        Filter::not_has_property(invoice_props::LOCATION_ID),
        &[invoice_props::OBJECT_ID, invoice_props::NUMBER],
        100,
    );
    let response = InvoiceSearcher::new(api, INVOICE_OBJECT_TYPE)
        .run(&request)
        .await?;

    let mut plan = BackfillPlan {
        scanned: response.results.len(),
        ..Default::default()
    };

    for invoice in response.results {
        let number = invoice.property(invoice_props::NUMBER).unwrap_or("");
        match location_code(number) {
            Some(code) => plan.updates.push(ObjectUpdate {
                id: invoice.id,
                properties: HashMap::from([(invoice_props::LOCATION_ID.to_string(), code)]),
            }),
            None => {
                warn!(
                    "Skipped invoice {}: {} is invalid or too short ('{}')",
                    invoice.id,
                    invoice_props::NUMBER,
                    number
                );
                plan.skipped.push(invoice.id);
            }
        }
    }

    info!(
        "Scanned {} invoice(s): {} to update, {} skipped",
        plan.scanned,
        plan.updates.len(),
        plan.skipped.len()
    );
    Ok(plan)
}

/// Send the planned updates as a single batch
pub async fn apply(api: &dyn CrmApi, plan: &BackfillPlan) -> Result<usize, CrmError> {
    if plan.updates.is_empty() {
        info!("No updates to send");
        return Ok(0);
    }

    api.batch_update(INVOICE_OBJECT_TYPE, &plan.updates).await?;
    info!("Submitted batch of {} invoice update(s)", plan.updates.len());
    Ok(plan.updates.len())
}
