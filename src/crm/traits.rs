use crate::crm::types::{AssociationInput, ObjectUpdate, SearchRequest, SearchResult};
use crate::models::CrmObject;
use async_trait::async_trait;
use thiserror::Error;

/// Failures reported by a CRM backend
#[derive(Debug, Error)]
pub enum CrmError {
    #[error("{object_type} {object_id} does not exist")]
    NotFound {
        object_type: String,
        object_id: String,
    },

    #[error("{0:?} is not a valid object id")]
    InvalidId(String),

    #[error("cannot build request URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("request to CRM failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Operations the invoice flows need from the CRM
///
/// Implemented by the HubSpot REST client and by an in-memory store in tests.
#[async_trait]
pub trait CrmApi: Send + Sync {
    /// Point lookup of one object
    async fn get_object(
        &self,
        object_type: &str,
        object_id: &str,
        properties: &[String],
    ) -> Result<CrmObject, CrmError>;

    /// Run a filtered search against one object type
    async fn search(
        &self,
        object_type: &str,
        request: &SearchRequest,
    ) -> Result<SearchResult, CrmError>;

    /// Update properties on several objects in one call
    async fn batch_update(
        &self,
        object_type: &str,
        updates: &[ObjectUpdate],
    ) -> Result<(), CrmError>;

    /// Create labelled associations from `from_type` objects to `to_type` objects
    async fn batch_associate(
        &self,
        from_type: &str,
        to_type: &str,
        inputs: &[AssociationInput],
    ) -> Result<(), CrmError>;

    /// Name of the backend, used in logs
    fn backend_name(&self) -> &'static str;
}
