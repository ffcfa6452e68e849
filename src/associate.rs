//! Associate invoices with location records that share their `location_id`.
//!
//! One search page (up to 100 objects) is read from each side. Pairs are sent to
//! the v4 association endpoint as a single batch labelled with the portal's
//! user-defined association type.

use crate::crm::{AssociationInput, CrmApi, CrmError, Filter, SearchRequest};
use crate::models::invoice_props;
use crate::pipeline::association::INVOICE_OBJECT_TYPE;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, info, warn};

const PAGE_SIZE: u32 = 100;

#[derive(Debug, Error)]
#[error("search of {object_type} by location failed")]
pub struct IndexError {
    pub object_type: String,
    #[source]
    pub source: CrmError,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssociationPlan {
    /// Distinct locations seen on invoices
    pub invoice_locations: usize,
    /// Distinct locations seen on location records
    pub location_records: usize,
    pub inputs: Vec<AssociationInput>,
}

/// `location_id` to object id, for objects of one type that carry a location.
/// When several objects share a location the last one returned wins.
async fn index_by_location(
    api: &dyn CrmApi,
    object_type: &str,
) -> Result<BTreeMap<String, String>, IndexError> {
    let request = SearchRequest::single(
        Filter::has_property(invoice_props::LOCATION_ID),
        &[invoice_props::LOCATION_ID],
        PAGE_SIZE,
    );
    let response = api
        .search(object_type, &request)
        .await
        .map_err(|source| IndexError {
            object_type: object_type.to_string(),
            source,
        })?;

    let mut index = BTreeMap::new();
    for object in response.results {
        match object.property(invoice_props::LOCATION_ID) {
            Some(location) => {
                index.insert(location.to_string(), object.id);
            }
            None => debug!("{} {} has no location_id", object_type, object.id),
        }
    }

    info!(
        "Found {} {} object(s) with a location_id",
        index.len(),
        object_type
    );
    Ok(index)
}

/// Pair invoices with location records on `location_id`
pub async fn plan(
    api: &dyn CrmApi,
    location_object_type: &str,
    association_type_id: u32,
) -> Result<AssociationPlan, IndexError> {
    let invoices = index_by_location(api, INVOICE_OBJECT_TYPE).await?;
    let locations = index_by_location(api, location_object_type).await?;

    let inputs: Vec<AssociationInput> = invoices
        .iter()
        .filter_map(|(location, invoice_id)| {
            locations.get(location).map(|location_record| {
                AssociationInput::user_defined(invoice_id, location_record, association_type_id)
            })
        })
        .collect();

    if inputs.is_empty() {
        warn!("No invoice shares a location_id with a location record");
    } else {
        info!("Found {} pair(s) to associate", inputs.len());
    }

    Ok(AssociationPlan {
        invoice_locations: invoices.len(),
        location_records: locations.len(),
        inputs,
    })
}

/// Create the planned associations in one batch
pub async fn apply(
    api: &dyn CrmApi,
    location_object_type: &str,
    plan: &AssociationPlan,
) -> Result<usize, CrmError> {
    if plan.inputs.is_empty() {
        info!("No associations to create");
        return Ok(0);
    }

    api.batch_associate(INVOICE_OBJECT_TYPE, location_object_type, &plan.inputs)
        .await?;
    info!("Submitted batch of {} association(s)", plan.inputs.len());
    Ok(plan.inputs.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crm::memory::InMemoryCrm;
    use crate::crm::Operator;
    use crate::models::CrmObject;

    const LOCATIONS: &str = "2-16842375";

    fn located(id: &str, location: &str) -> CrmObject {
        CrmObject::new(id).with("location_id", location)
    }

    fn crm() -> InMemoryCrm {
        InMemoryCrm::new()
            .with_type(
                INVOICE_OBJECT_TYPE,
                vec![
                    located("101", "ZRSVSH"),
                    located("102", "QWERTY"),
                    located("103", "NOWHERE"),
                    CrmObject::new("104").with("hs_number", "A-1"),
                ],
            )
            .with_type(
                LOCATIONS,
                vec![located("9001", "ZRSVSH"), located("9002", "QWERTY"), located("9003", "EMPTY")],
            )
    }

    #[tokio::test]
    async fn pairs_invoices_with_locations_on_location_id() {
        let crm = crm();

        let plan = plan(&crm, LOCATIONS, 77).await.unwrap();

        assert_eq!(plan.invoice_locations, 3);
        assert_eq!(plan.location_records, 3);
        assert_eq!(
            plan.inputs,
            vec![
                AssociationInput::user_defined("102", "9002", 77),
                AssociationInput::user_defined("101", "9001", 77),
            ]
        );

        let searches = crm.searches();
        assert_eq!(searches.len(), 2);
        assert_eq!(searches[0].object_type, INVOICE_OBJECT_TYPE);
        assert_eq!(searches[1].object_type, LOCATIONS);
        for search in &searches {
            let filter = &search.request.filter_groups[0].filters[0];
            assert_eq!(filter.operator, Operator::HasProperty);
            assert_eq!(filter.property_name, "location_id");
            assert_eq!(search.request.limit, 100);
        }
    }

    #[tokio::test]
    async fn apply_sends_one_batch_from_invoices_to_locations() {
        let crm = crm();
        let plan = plan(&crm, LOCATIONS, 77).await.unwrap();

        assert_eq!(apply(&crm, LOCATIONS, &plan).await.unwrap(), 2);

        let calls = crm.associations();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].from_type, INVOICE_OBJECT_TYPE);
        assert_eq!(calls[0].to_type, LOCATIONS);
        assert_eq!(calls[0].inputs, plan.inputs);
    }

    #[tokio::test]
    async fn nothing_to_pair_sends_nothing() {
        let crm = InMemoryCrm::new()
            .with_type(INVOICE_OBJECT_TYPE, vec![located("1", "A")])
            .with_type(LOCATIONS, vec![located("2", "B")]);

        let plan = plan(&crm, LOCATIONS, 1).await.unwrap();
        assert!(plan.inputs.is_empty());
        assert_eq!(apply(&crm, LOCATIONS, &plan).await.unwrap(), 0);
        assert!(crm.associations().is_empty());
    }

    #[tokio::test]
    async fn unknown_location_type_names_the_failing_search() {
        let crm = InMemoryCrm::new().with_type(INVOICE_OBJECT_TYPE, vec![located("1", "A")]);

        let err = plan(&crm, "2-missing", 1).await.unwrap_err();

        assert_eq!(err.object_type, "2-missing");
        assert!(matches!(err.source, CrmError::Status { status: 400, .. }));
    }
}
