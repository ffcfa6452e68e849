use crate::config::Config;
use crate::crm::traits::{CrmApi, CrmError};
use crate::crm::types::{AssociationInput, ObjectUpdate, SearchRequest, SearchResult};
use crate::models::CrmObject;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, Response, StatusCode, Url};
use serde_json::json;
use std::time::Duration;
use tracing::{debug, warn};

/// HubSpot CRM v3 REST client
#[derive(Clone)]
pub struct HubSpotClient {
    client: Client,
    base_url: String,
}

impl HubSpotClient {
    /// Create a client authenticated with the configured private app token
    pub fn new(config: &Config) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", config.access_token()))
            .context("Access token is not a valid header value")?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .default_headers(headers)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: config.api_url.clone(),
        })
    }

    /// Base URL plus `segments`, each percent-encoded as a single path segment
    fn api_url(&self, segments: &[&str]) -> Result<Url, CrmError> {
        let mut url =
            Url::parse(&self.base_url).map_err(|e| CrmError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| CrmError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn objects_url(&self, object_type: &str, rest: &[&str]) -> Result<Url, CrmError> {
        let mut segments = vec!["crm", "v3", "objects", object_type];
        segments.extend_from_slice(rest);
        self.api_url(&segments)
    }

    async fn check(response: Response) -> Result<Response, CrmError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        warn!("HubSpot returned status: {}", status);
        Err(CrmError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

/// Record ids are numeric on HubSpot; letters, `-` and `_` cover custom id schemes
fn is_valid_object_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[async_trait]
impl CrmApi for HubSpotClient {
    #[tracing::instrument(skip(self, properties))]
    async fn get_object(
        &self,
        object_type: &str,
        object_id: &str,
        properties: &[String],
    ) -> Result<CrmObject, CrmError> {
        if !is_valid_object_id(object_id) {
            return Err(CrmError::InvalidId(object_id.to_string()));
        }
        let url = self.objects_url(object_type, &[object_id])?;
        debug!("Fetching URL: {}", url);

        let response = self
            .client
            .get(url)
            .query(&[("properties", properties.join(","))])
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(CrmError::NotFound {
                object_type: object_type.to_string(),
                object_id: object_id.to_string(),
            });
        }

        let object = Self::check(response).await?.json::<CrmObject>().await?;
        Ok(object)
    }

    #[tracing::instrument(skip(self, request))]
    async fn search(
        &self,
        object_type: &str,
        request: &SearchRequest,
    ) -> Result<SearchResult, CrmError> {
        let url = self.objects_url(object_type, &["search"])?;
        debug!("Searching URL: {}", url);

        let response = self.client.post(url).json(request).send().await?;
        let result = Self::check(response).await?.json::<SearchResult>().await?;

        debug!("Search returned {} result(s)", result.results.len());
        Ok(result)
    }

    #[tracing::instrument(skip(self, updates), fields(count = updates.len()))]
    async fn batch_update(
        &self,
        object_type: &str,
        updates: &[ObjectUpdate],
    ) -> Result<(), CrmError> {
        let url = self.objects_url(object_type, &["batch", "update"])?;

        let response = self
            .client
            .post(url)
            .json(&json!({ "inputs": updates }))
            .send()
            .await?;
        Self::check(response).await?;

        Ok(())
    }

    #[tracing::instrument(skip(self, inputs), fields(count = inputs.len()))]
    async fn batch_associate(
        &self,
        from_type: &str,
        to_type: &str,
        inputs: &[AssociationInput],
    ) -> Result<(), CrmError> {
        let url = self.api_url(&[
            "crm",
            "v4",
            "associations",
            from_type,
            to_type,
            "batch",
            "create",
        ])?;

        let response = self
            .client
            .post(url)
            .json(&json!({ "inputs": inputs }))
            .send()
            .await?;
        Self::check(response).await?;

        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "HubSpot"
    }
}
