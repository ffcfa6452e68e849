use crate::crm::{CrmApi, CrmError, Filter, SearchRequest, SearchResult, Sort};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Every collection name was tried and the last attempt failed
#[derive(Debug, Error)]
#[error("invoice search failed after trying {}", .tried.join(", "))]
pub struct SearchFailure {
    /// Collection names in the order they were tried
    pub tried: Vec<String>,
    #[source]
    pub source: CrmError,
}

/// Filtered search over the invoice object type.
///
/// The invoice schema name differs between portals (`invoices` on some, `invoice`
/// on others), so a searcher can hold a second name that is tried once, with the
/// same payload, when the first one fails.
pub struct InvoiceSearcher<'a> {
    api: &'a dyn CrmApi,
    primary: String,
    secondary: Option<String>,
}

impl<'a> InvoiceSearcher<'a> {
    /// Searcher that only ever queries `collection`
    pub fn new(api: &'a dyn CrmApi, collection: &str) -> Self {
        Self {
            api,
            primary: collection.to_string(),
            secondary: None,
        }
    }

    /// Add a collection name to fall back to
    pub fn with_fallback(mut self, collection: &str) -> Self {
        self.secondary = Some(collection.to_string());
        self
    }

    /// One `EQ` predicate on `filter_property`, optionally sorted
    pub async fn search(
        &self,
        filter_value: &str,
        filter_property: &str,
        wanted_properties: &[&str],
        limit: u32,
        sort: Option<Sort>,
    ) -> Result<SearchResult, SearchFailure> {
        let mut request = SearchRequest::single(
            Filter::eq(filter_property, filter_value),
            wanted_properties,
            limit,
        );
        if let Some(sort) = sort {
            request = request.sorted_by(sort);
        }

        self.run(&request).await
    }

    /// Run a prepared request against the primary name, then the fallback
    pub async fn run(&self, request: &SearchRequest) -> Result<SearchResult, SearchFailure> {
        let mut tried = vec![self.primary.clone()];

        debug!("Searching \"{}\"", self.primary);
        let first_err = match self.api.search(&self.primary, request).await {
            Ok(result) => return Ok(result),
            Err(err) => err,
        };

        let Some(secondary) = &self.secondary else {
            warn!("Search \"{}\" failed: {}", self.primary, first_err);
            return Err(SearchFailure {
                tried,
                source: first_err,
            });
        };

        warn!(
            "Search \"{}\" failed ({}), falling back to \"{}\"",
            self.primary, first_err, secondary
        );
        tried.push(secondary.clone());

        match self.api.search(secondary, request).await {
            Ok(result) => {
                info!("Fallback collection \"{}\" answered", secondary);
                Ok(result)
            }
            Err(err) => {
                warn!("Search failed on {}: {}", tried.join(" and "), err);
                Err(SearchFailure { tried, source: err })
            }
        }
    }
}
