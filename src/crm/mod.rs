pub mod hubspot;
#[cfg(test)]
pub mod memory;
pub mod traits;
pub mod types;

pub use hubspot::HubSpotClient;
pub use traits::{CrmApi, CrmError};
pub use types::{
    AssociationInput, Filter, FilterGroup, ObjectUpdate, Operator, SearchRequest, SearchResult,
    Sort,
};
