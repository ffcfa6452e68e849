use crate::crm::CrmApi;
use crate::lookup::{InvoiceSearcher, ObjectResolver, ResolveError, SearchFailure};
use crate::models::{invoice_props, ConferenceRecord, InvoiceDetail, InvoiceRecord};
use thiserror::Error;
use tracing::{error, info};

/// Object type id of the built-in invoice object
pub const INVOICE_OBJECT_TYPE: &str = "0-53";

pub const DETAIL_PROPERTIES: [&str; 5] = [
    invoice_props::NUMBER,
    invoice_props::STATUS,
    invoice_props::INVOICE_DATE,
    invoice_props::AMOUNT_BILLED,
    invoice_props::AMOUNT_PAID,
];

#[derive(Debug, Error)]
pub enum ResolutionCause {
    #[error("no object id was provided")]
    MissingObjectId,

    #[error(transparent)]
    Lookup(#[from] ResolveError),

    #[error(transparent)]
    Search(#[from] SearchFailure),
}

/// Any failure while resolving the associated invoice.
///
/// Callers only ever see the fixed message; the cause is kept for logs.
#[derive(Debug, Error)]
#[error("Failed to find invoice")]
pub struct ResolutionError {
    #[source]
    pub cause: ResolutionCause,
}

impl From<ResolutionCause> for ResolutionError {
    fn from(cause: ResolutionCause) -> Self {
        Self { cause }
    }
}

impl From<ResolveError> for ResolutionError {
    fn from(err: ResolveError) -> Self {
        ResolutionCause::from(err).into()
    }
}

impl From<SearchFailure> for ResolutionError {
    fn from(err: SearchFailure) -> Self {
        ResolutionCause::from(err).into()
    }
}

/// Conference record -> `invoice_id` -> the matching invoice, if any
pub struct AssociationPipeline<'a> {
    api: &'a dyn CrmApi,
    conference_object_type: &'a str,
}

impl<'a> AssociationPipeline<'a> {
    pub fn new(api: &'a dyn CrmApi, conference_object_type: &'a str) -> Self {
        Self {
            api,
            conference_object_type,
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn run(&self, object_id: &str) -> Result<Option<InvoiceDetail>, ResolutionError> {
        let result = self.resolve(object_id.trim()).await;
        if let Err(err) = &result {
            error!("Error finding invoice: {}", err.cause);
        }
        result
    }

    async fn resolve(&self, object_id: &str) -> Result<Option<InvoiceDetail>, ResolutionError> {
        if object_id.is_empty() {
            return Err(ResolutionCause::MissingObjectId.into());
        }

        let object = match ObjectResolver::new(self.api)
            .fetch(
                self.conference_object_type,
                object_id,
                &[invoice_props::INVOICE_ID],
            )
            .await
        {
            Ok(object) => object,
            Err(ResolveError::NotFound { .. }) => {
                info!("Conference {} not found", object_id);
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        };

        let conference = ConferenceRecord::from(object);
        let Some(invoice_id) = conference.invoice_id else {
            info!("Conference {} has no invoice_id", conference.id);
            return Ok(None);
        };

        let response = InvoiceSearcher::new(self.api, INVOICE_OBJECT_TYPE)
            .search(
                &invoice_id,
                invoice_props::INVOICE_ID,
                &DETAIL_PROPERTIES,
                1,
                None,
            )
            .await?;

        Ok(response
            .results
            .first()
            .map(|object| InvoiceDetail::from(InvoiceRecord::from(object))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CrmObject;
    use crate::crm::memory::InMemoryCrm;

    const CONFERENCES: &str = "2-20107961";

    fn crm() -> InMemoryCrm {
        InMemoryCrm::new()
            .with_type(
                CONFERENCES,
                vec![
                    CrmObject::new("C1"),
                    CrmObject::new("C2").with("invoice_id", "INV-7"),
                    CrmObject::new("C3").with("invoice_id", "INV-unknown"),
                ],
            )
            .with_type(
                INVOICE_OBJECT_TYPE,
                vec![CrmObject::new("900")
                    .with("invoice_id", "INV-7")
                    .with("hs_number", "ZRSVSH-7")
                    .with("hs_amount_billed", "125.00")],
            )
    }

    #[tokio::test]
    async fn conference_without_invoice_id_yields_none() {
        let crm = crm();
        let invoice = AssociationPipeline::new(&crm, CONFERENCES)
            .run("C1")
            .await
            .unwrap();

        assert_eq!(invoice, None);
        assert!(crm.searches().is_empty());
    }

    #[tokio::test]
    async fn finds_the_associated_invoice() {
        let crm = crm();
        let invoice = AssociationPipeline::new(&crm, CONFERENCES)
            .run("C2")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(invoice.id, "900");
        assert_eq!(invoice.hs_number.as_deref(), Some("ZRSVSH-7"));
        assert_eq!(invoice.hs_amount_paid, None);

        let searches = crm.searches();
        assert_eq!(searches.len(), 1);
        assert_eq!(searches[0].object_type, INVOICE_OBJECT_TYPE);
        assert_eq!(searches[0].request.limit, 1);
    }

    #[tokio::test]
    async fn zero_matches_yields_none() {
        let crm = crm();
        let invoice = AssociationPipeline::new(&crm, CONFERENCES)
            .run("C3")
            .await
            .unwrap();
        assert_eq!(invoice, None);
    }

    #[tokio::test]
    async fn failures_collapse_to_one_message() {
        let crm = InMemoryCrm::new().broken();
        let err = AssociationPipeline::new(&crm, CONFERENCES)
            .run("C2")
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Failed to find invoice");
        assert!(matches!(err.cause, ResolutionCause::Lookup(_)));
    }
}
