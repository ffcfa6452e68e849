use crate::crm::{CrmApi, CrmError};
use crate::models::CrmObject;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("{object_type} {object_id} not found")]
    NotFound {
        object_type: String,
        object_id: String,
    },

    #[error("failed to fetch {object_type} {object_id}")]
    Crm {
        object_type: String,
        object_id: String,
        #[source]
        source: CrmError,
    },
}

/// Point lookups of single CRM records
pub struct ObjectResolver<'a> {
    api: &'a dyn CrmApi,
}

impl<'a> ObjectResolver<'a> {
    pub fn new(api: &'a dyn CrmApi) -> Self {
        Self { api }
    }

    /// Fetch one object with the given properties; a missing object is not retried
    pub async fn fetch(
        &self,
        object_type: &str,
        object_id: &str,
        properties: &[&str],
    ) -> Result<CrmObject, ResolveError> {
        debug!(
            "Fetching {}/{} from {}",
            object_type,
            object_id,
            self.api.backend_name()
        );
        let properties: Vec<String> = properties.iter().map(|p| p.to_string()).collect();

        match self.api.get_object(object_type, object_id, &properties).await {
            Ok(object) => Ok(object),
            Err(CrmError::NotFound { .. }) => Err(ResolveError::NotFound {
                object_type: object_type.to_string(),
                object_id: object_id.to_string(),
            }),
            Err(source) => Err(ResolveError::Crm {
                object_type: object_type.to_string(),
                object_id: object_id.to_string(),
                source,
            }),
        }
    }
}
