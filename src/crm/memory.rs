//! In-memory CRM backend for tests

use crate::crm::traits::{CrmApi, CrmError};
use crate::crm::types::{
    AssociationInput, Filter, FilterGroup, ObjectUpdate, Operator, SearchRequest, SearchResult,
    SortDirection,
};
use crate::models::CrmObject;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// A search call as the backend saw it
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedSearch {
    pub object_type: String,
    pub request: SearchRequest,
}

/// A batch association call as the backend saw it
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedAssociation {
    pub from_type: String,
    pub to_type: String,
    pub inputs: Vec<AssociationInput>,
}

#[derive(Default)]
struct State {
    objects: HashMap<String, Vec<CrmObject>>,
    searches: Vec<RecordedSearch>,
    lookups: Vec<(String, String)>,
    updates: Vec<(String, Vec<ObjectUpdate>)>,
    associations: Vec<RecordedAssociation>,
    broken: bool,
}

/// Object types not registered with `with_type` behave like an unknown schema name.
#[derive(Clone, Default)]
pub struct InMemoryCrm {
    state: Arc<Mutex<State>>,
}

impl InMemoryCrm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an object type with its objects
    pub fn with_type(self, object_type: &str, objects: Vec<CrmObject>) -> Self {
        self.state
            .lock()
            .unwrap()
            .objects
            .insert(object_type.to_string(), objects);
        self
    }

    /// Make every call fail with a server error
    pub fn broken(self) -> Self {
        self.state.lock().unwrap().broken = true;
        self
    }

    pub fn searches(&self) -> Vec<RecordedSearch> {
        self.state.lock().unwrap().searches.clone()
    }

    pub fn lookups(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().lookups.clone()
    }

    pub fn updates(&self) -> Vec<(String, Vec<ObjectUpdate>)> {
        self.state.lock().unwrap().updates.clone()
    }

    pub fn associations(&self) -> Vec<RecordedAssociation> {
        self.state.lock().unwrap().associations.clone()
    }

    fn unknown_type(object_type: &str) -> CrmError {
        CrmError::Status {
            status: 400,
            body: format!("Unable to infer object type from: {}", object_type),
        }
    }

    fn server_error() -> CrmError {
        CrmError::Status {
            status: 500,
            body: "internal error".to_string(),
        }
    }
}

#[async_trait]
impl CrmApi for InMemoryCrm {
    async fn get_object(
        &self,
        object_type: &str,
        object_id: &str,
        properties: &[String],
    ) -> Result<CrmObject, CrmError> {
        let mut state = self.state.lock().unwrap();
        state
            .lookups
            .push((object_type.to_string(), object_id.to_string()));
        if state.broken {
            return Err(Self::server_error());
        }

        let objects = state
            .objects
            .get(object_type)
            .ok_or_else(|| Self::unknown_type(object_type))?;
        let object = objects
            .iter()
            .find(|o| o.id == object_id)
            .ok_or_else(|| CrmError::NotFound {
                object_type: object_type.to_string(),
                object_id: object_id.to_string(),
            })?;

        Ok(project(object, properties))
    }

    async fn search(
        &self,
        object_type: &str,
        request: &SearchRequest,
    ) -> Result<SearchResult, CrmError> {
        let mut state = self.state.lock().unwrap();
        state.searches.push(RecordedSearch {
            object_type: object_type.to_string(),
            request: request.clone(),
        });
        if state.broken {
            return Err(Self::server_error());
        }

        let objects = state
            .objects
            .get(object_type)
            .ok_or_else(|| Self::unknown_type(object_type))?;

        let mut matched: Vec<&CrmObject> = objects.iter().filter(|o| request_matches(request, o)).collect();
        if let Some(sort) = request.sorts.first() {
            matched.sort_by(|a, b| {
                let ordering = a
                    .property(&sort.property_name)
                    .cmp(&b.property(&sort.property_name));
                match sort.direction {
                    SortDirection::Ascending => ordering,
                    SortDirection::Descending => ordering.reverse(),
                }
            });
        }

        let total = matched.len() as u64;
        let results = matched
            .into_iter()
            .take(request.limit as usize)
            .map(|o| project(o, &request.properties))
            .collect();

        Ok(SearchResult {
            total: Some(total),
            results,
        })
    }

    async fn batch_update(
        &self,
        object_type: &str,
        updates: &[ObjectUpdate],
    ) -> Result<(), CrmError> {
        let mut state = self.state.lock().unwrap();
        if state.broken {
            return Err(Self::server_error());
        }

        let objects = state
            .objects
            .get_mut(object_type)
            .ok_or_else(|| Self::unknown_type(object_type))?;
        for update in updates {
            if let Some(object) = objects.iter_mut().find(|o| o.id == update.id) {
                for (name, value) in &update.properties {
                    object.properties.insert(name.clone(), Some(value.clone()));
                }
            }
        }
        state
            .updates
            .push((object_type.to_string(), updates.to_vec()));

        Ok(())
    }

    async fn batch_associate(
        &self,
        from_type: &str,
        to_type: &str,
        inputs: &[AssociationInput],
    ) -> Result<(), CrmError> {
        let mut state = self.state.lock().unwrap();
        if state.broken {
            return Err(Self::server_error());
        }
        for object_type in [from_type, to_type] {
            if !state.objects.contains_key(object_type) {
                return Err(Self::unknown_type(object_type));
            }
        }

        state.associations.push(RecordedAssociation {
            from_type: from_type.to_string(),
            to_type: to_type.to_string(),
            inputs: inputs.to_vec(),
        });

        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "in-memory"
    }
}

/// Keep only the requested properties, as the real API does
fn project(object: &CrmObject, properties: &[String]) -> CrmObject {
    let mut projected = CrmObject::new(object.id.clone());
    for name in properties {
        if let Some(value) = object.properties.get(name) {
            projected.properties.insert(name.clone(), value.clone());
        }
    }
    projected
}

fn filter_matches(filter: &Filter, object: &CrmObject) -> bool {
    let actual = object.property(&filter.property_name);
    match filter.operator {
        Operator::Eq => actual.is_some() && actual == filter.value.as_deref(),
        Operator::Neq => actual != filter.value.as_deref(),
        Operator::HasProperty => actual.is_some(),
        Operator::NotHasProperty => actual.is_none(),
    }
}

fn group_matches(group: &FilterGroup, object: &CrmObject) -> bool {
    group.filters.iter().all(|f| filter_matches(f, object))
}

/// Groups are ORed; a request without groups matches everything
fn request_matches(request: &SearchRequest, object: &CrmObject) -> bool {
    request.filter_groups.is_empty()
        || request
            .filter_groups
            .iter()
            .any(|g| group_matches(g, object))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invoice(id: &str, number: &str, location: Option<&str>) -> CrmObject {
        let object = CrmObject::new(id).with("hs_number", number);
        match location {
            Some(location) => object.with("location_id", location),
            None => object,
        }
    }

    #[test]
    fn groups_are_ored_and_filters_anded() {
        let object = invoice("1", "ZRSVSH-1", Some("L1"));
        let request = SearchRequest {
            filter_groups: vec![
                FilterGroup {
                    filters: vec![Filter::eq("location_id", "L1"), Filter::eq("hs_number", "nope")],
                },
                FilterGroup {
                    filters: vec![Filter::has_property("hs_number")],
                },
            ],
            properties: Vec::new(),
            limit: 10,
            sorts: Vec::new(),
        };

        assert!(!group_matches(&request.filter_groups[0], &object));
        assert!(request_matches(&request, &object));
        assert!(!request_matches(
            &SearchRequest::single(Filter::not_has_property("location_id"), &[], 10),
            &object
        ));
    }

    #[test]
    fn empty_value_counts_as_missing() {
        let object = CrmObject::new("1").with("location_id", "");

        assert!(filter_matches(&Filter::not_has_property("location_id"), &object));
        assert!(!filter_matches(&Filter::eq("location_id", ""), &object));
    }

    #[tokio::test]
    async fn search_projects_sorts_and_limits() {
        let crm = InMemoryCrm::new().with_type(
            "0-53",
            vec![
                invoice("1", "A-1", Some("L1")),
                invoice("2", "C-1", Some("L1")),
                invoice("3", "B-1", Some("L2")),
            ],
        );
        let request = SearchRequest::single(Filter::eq("location_id", "L1"), &["hs_number"], 1)
            .sorted_by(crate::crm::types::Sort::descending("hs_number"));

        let result = crm.search("0-53", &request).await.unwrap();

        assert_eq!(result.total, Some(2));
        assert_eq!(result.results.len(), 1);
        assert_eq!(result.results[0].id, "2");
        assert!(result.results[0].property("location_id").is_none());
    }

    #[tokio::test]
    async fn associations_are_recorded_per_call() {
        let crm = InMemoryCrm::new()
            .with_type("0-53", Vec::new())
            .with_type("2-16842375", Vec::new());
        let inputs = vec![AssociationInput::user_defined("1", "9", 42)];

        crm.batch_associate("0-53", "2-16842375", &inputs)
            .await
            .unwrap();
        let err = crm
            .batch_associate("0-53", "missing", &inputs)
            .await
            .unwrap_err();

        assert!(matches!(err, CrmError::Status { status: 400, .. }));
        assert_eq!(
            crm.associations(),
            vec![RecordedAssociation {
                from_type: "0-53".to_string(),
                to_type: "2-16842375".to_string(),
                inputs,
            }]
        );
    }
}
