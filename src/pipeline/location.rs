use crate::crm::{CrmApi, Sort};
use crate::lookup::{InvoiceSearcher, ObjectResolver, ResolveError, SearchFailure};
use crate::models::{invoice_props, InvoiceRecord, InvoiceSummary, PropertyRecord};
use thiserror::Error;
use tracing::{info, warn};

/// Invoice collection name on most portals
pub const INVOICE_COLLECTION: &str = "invoices";
/// Name used by portals where the plural is not registered
pub const INVOICE_COLLECTION_FALLBACK: &str = "invoice";

pub const SUMMARY_PROPERTIES: [&str; 6] = [
    invoice_props::NUMBER,
    invoice_props::STATUS,
    invoice_props::CREATE_DATE,
    invoice_props::AMOUNT_BILLED,
    invoice_props::DUE_DATE,
    invoice_props::BALANCE_DUE,
];

const PAGE_SIZE: u32 = 100;

/// How a lookup by location ended when nothing went wrong
#[derive(Debug, Clone, PartialEq)]
pub enum LocationOutcome {
    Found {
        total: u64,
        results: Vec<InvoiceSummary>,
    },
    /// The property record exists but has no `location_id`
    MissingLocation,
    PropertyNotFound,
}

#[derive(Debug, Error)]
pub enum LocationLookupError {
    #[error("No object ID was provided.")]
    MissingObjectId,

    #[error(transparent)]
    Search(#[from] SearchFailure),

    #[error(transparent)]
    Lookup(ResolveError),
}

/// Property record -> `location_id` -> invoices at that location, newest first
pub struct LocationPipeline<'a> {
    api: &'a dyn CrmApi,
    property_object_type: &'a str,
}

impl<'a> LocationPipeline<'a> {
    pub fn new(api: &'a dyn CrmApi, property_object_type: &'a str) -> Self {
        Self {
            api,
            property_object_type,
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn run(&self, object_id: &str) -> Result<LocationOutcome, LocationLookupError> {
        let object_id = object_id.trim();
        if object_id.is_empty() {
            return Err(LocationLookupError::MissingObjectId);
        }

        let object = match ObjectResolver::new(self.api)
            .fetch(
                self.property_object_type,
                object_id,
                &[invoice_props::LOCATION_ID],
            )
            .await
        {
            Ok(object) => object,
            Err(ResolveError::NotFound { .. }) => {
                warn!("Property record {} not found", object_id);
                return Ok(LocationOutcome::PropertyNotFound);
            }
            Err(err) => return Err(LocationLookupError::Lookup(err)),
        };

        let property = PropertyRecord::from(object);
        let Some(location_id) = property.location_id else {
            warn!("No location_id on property record {}", property.id);
            return Ok(LocationOutcome::MissingLocation);
        };
        info!("Property {} has location_id {}", property.id, location_id);

        let response = InvoiceSearcher::new(self.api, INVOICE_COLLECTION)
            .with_fallback(INVOICE_COLLECTION_FALLBACK)
            .search(
                &location_id,
                invoice_props::LOCATION_ID,
                &SUMMARY_PROPERTIES,
                PAGE_SIZE,
                Some(Sort::descending(invoice_props::CREATE_DATE)),
            )
            .await?;

        let total = response.effective_total();
        info!("Found {} invoice(s)", total);

        let results = response
            .results
            .iter()
            .map(|object| InvoiceSummary::from(InvoiceRecord::from(object)))
            .collect();

        Ok(LocationOutcome::Found { total, results })
    }
}
