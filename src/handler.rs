//! Serverless invocation boundary.
//!
//! Functions receive the loosely typed context the UI host sends and always
//! answer with a tagged response; no failure escapes as an `Err`.

use crate::config::Config;
use crate::crm::CrmApi;
use crate::models::{InvoiceDetail, InvoiceSummary};
use crate::pipeline::{AssociationPipeline, LocationLookupError, LocationOutcome, LocationPipeline};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{error, info, warn};

pub const GET_INVOICES: &str = "getInvoices";
pub const GET_ASSOCIATED_INVOICE: &str = "getAssociatedInvoice";

const OBJECT_ID_KEYS: [&str; 2] = ["objectId", "hs_object_id"];

/// What the host passes to a serverless function
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServerlessContext {
    #[serde(default)]
    pub parameters: Map<String, Value>,
    #[serde(default)]
    pub properties_to_send: Map<String, Value>,
}

impl ServerlessContext {
    pub fn for_object(object_id: &str) -> Self {
        let mut context = Self::default();
        context
            .parameters
            .insert("objectId".to_string(), Value::from(object_id));
        context
            .properties_to_send
            .insert("hs_object_id".to_string(), Value::from(object_id));
        context
    }

    /// Record id from either bag, as a string; numbers are accepted too
    pub fn object_id(&self) -> Option<String> {
        [&self.parameters, &self.properties_to_send]
            .into_iter()
            .flat_map(|bag| OBJECT_ID_KEYS.iter().filter_map(move |key| bag.get(*key)))
            .find_map(|value| match value {
                Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
    }
}

/// Response of `getInvoices`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum InvoiceListResponse {
    Success {
        total: u64,
        results: Vec<InvoiceSummary>,
    },
    /// Nothing to show, but nothing failed either
    Empty { message: String },
    Error { message: String },
}

/// Response of `getAssociatedInvoice`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum AssociatedInvoiceResponse {
    Success { invoice: Option<InvoiceDetail> },
    Error { message: String },
}

/// Functions exposed to the UI, bound to one CRM backend
pub struct Functions<'a> {
    api: &'a dyn CrmApi,
    config: &'a Config,
}

impl<'a> Functions<'a> {
    pub fn new(api: &'a dyn CrmApi, config: &'a Config) -> Self {
        Self { api, config }
    }

    /// `getInvoices`: invoices sharing the property record's location
    pub async fn get_invoices(&self, context: &ServerlessContext) -> InvoiceListResponse {
        info!("Serverless function \"{}\" starting", GET_INVOICES);

        let Some(object_id) = context.object_id() else {
            warn!("No object ID provided. Aborting.");
            return InvoiceListResponse::Error {
                message: LocationLookupError::MissingObjectId.to_string(),
            };
        };

        let pipeline = LocationPipeline::new(self.api, &self.config.property_object_type);
        match pipeline.run(&object_id).await {
            Ok(LocationOutcome::Found { total, results }) => {
                InvoiceListResponse::Success { total, results }
            }
            Ok(LocationOutcome::MissingLocation) => InvoiceListResponse::Empty {
                message: "Property record missing location_id.".to_string(),
            },
            Ok(LocationOutcome::PropertyNotFound) => InvoiceListResponse::Empty {
                message: "Property record not found.".to_string(),
            },
            Err(LocationLookupError::MissingObjectId) => InvoiceListResponse::Error {
                message: LocationLookupError::MissingObjectId.to_string(),
            },
            Err(LocationLookupError::Search(failure)) => {
                error!(tried = ?failure.tried, "Invoice search failed: {:?}", failure.source);
                InvoiceListResponse::Error {
                    message: "Unable to search invoices.".to_string(),
                }
            }
            Err(LocationLookupError::Lookup(err)) => {
                error!("Unexpected error: {:?}", err);
                InvoiceListResponse::Error {
                    message: err.to_string(),
                }
            }
        }
    }

    /// `getAssociatedInvoice`: the invoice referenced by a conference record
    pub async fn get_associated_invoice(
        &self,
        context: &ServerlessContext,
    ) -> AssociatedInvoiceResponse {
        info!("Serverless function \"{}\" starting", GET_ASSOCIATED_INVOICE);

        let object_id = context.object_id().unwrap_or_default();
        let pipeline = AssociationPipeline::new(self.api, &self.config.conference_object_type);

        match pipeline.run(&object_id).await {
            Ok(invoice) => AssociatedInvoiceResponse::Success { invoice },
            Err(err) => AssociatedInvoiceResponse::Error {
                message: err.to_string(),
            },
        }
    }

    /// Dispatch by function name, the way the UI host addresses functions
    ///
    /// `None` means no function has that name.
    pub async fn call(&self, name: &str, context: &ServerlessContext) -> Option<Value> {
        let response = match name {
            GET_INVOICES => to_response(&self.get_invoices(context).await),
            GET_ASSOCIATED_INVOICE => to_response(&self.get_associated_invoice(context).await),
            _ => return None,
        };

        Some(response)
    }
}

/// Serialize a response; a failure becomes an error response instead of vanishing
fn to_response<T: Serialize>(response: &T) -> Value {
    serde_json::to_value(response).unwrap_or_else(|err| {
        error!("Failed to serialize response: {}", err);
        serde_json::json!({ "status": "error", "message": err.to_string() })
    })
}
