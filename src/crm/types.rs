use crate::models::CrmObject;
use serde::{Deserialize, Serialize};

/// Largest page the search endpoint will return
pub const MAX_SEARCH_LIMIT: u32 = 100;

/// Comparison operators understood by the search endpoint
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operator {
    Eq,
    Neq,
    HasProperty,
    NotHasProperty,
}

/// A single predicate inside a filter group
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
    pub property_name: String,
    pub operator: Operator,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl Filter {
    pub fn eq(property: &str, value: impl Into<String>) -> Self {
        Self {
            property_name: property.to_string(),
            operator: Operator::Eq,
            value: Some(value.into()),
        }
    }

    pub fn has_property(property: &str) -> Self {
        Self {
            property_name: property.to_string(),
            operator: Operator::HasProperty,
            value: None,
        }
    }

    pub fn not_has_property(property: &str) -> Self {
        Self {
            property_name: property.to_string(),
            operator: Operator::NotHasProperty,
            value: None,
        }
    }
}

/// Filters inside a group are ANDed; groups are ORed with each other
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FilterGroup {
    pub filters: Vec<Filter>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Sort {
    pub property_name: String,
    pub direction: SortDirection,
}

impl Sort {
    pub fn descending(property: &str) -> Self {
        Self {
            property_name: property.to_string(),
            direction: SortDirection::Descending,
        }
    }
}

/// Body of `POST /crm/v3/objects/{type}/search`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub filter_groups: Vec<FilterGroup>,
    pub properties: Vec<String>,
    pub limit: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sorts: Vec<Sort>,
}

impl SearchRequest {
    /// One group, one predicate; the limit is clamped into `1..=100`
    pub fn single(filter: Filter, properties: &[&str], limit: u32) -> Self {
        Self {
            filter_groups: vec![FilterGroup {
                filters: vec![filter],
            }],
            properties: properties.iter().map(|p| p.to_string()).collect(),
            limit: limit.clamp(1, MAX_SEARCH_LIMIT),
            sorts: Vec::new(),
        }
    }

    pub fn sorted_by(mut self, sort: Sort) -> Self {
        self.sorts.push(sort);
        self
    }
}

/// Response of the search endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub results: Vec<CrmObject>,
}

impl SearchResult {
    /// Reported total, or the page length when the remote leaves it out
    pub fn effective_total(&self) -> u64 {
        match self.total {
            Some(total) if total > 0 => total,
            _ => self.results.len() as u64,
        }
    }
}

/// One entry of a batch update call
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ObjectUpdate {
    pub id: String,
    pub properties: std::collections::HashMap<String, String>,
}

/// Reference to one object in an association call
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ObjectRef {
    pub id: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssociationCategory {
    HubspotDefined,
    UserDefined,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AssociationSpec {
    pub association_category: AssociationCategory,
    pub association_type_id: u32,
}

/// One entry of `POST /crm/v4/associations/{from}/{to}/batch/create`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssociationInput {
    pub from: ObjectRef,
    pub to: ObjectRef,
    pub types: Vec<AssociationSpec>,
}

impl AssociationInput {
    /// Link `from` to `to` with a portal-defined association label
    pub fn user_defined(from: &str, to: &str, association_type_id: u32) -> Self {
        Self {
            from: ObjectRef { id: from.to_string() },
            to: ObjectRef { id: to.to_string() },
            types: vec![AssociationSpec {
                association_category: AssociationCategory::UserDefined,
                association_type_id,
            }],
        }
    }
}
