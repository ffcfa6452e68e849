pub mod association;
pub mod location;

pub use association::{AssociationPipeline, ResolutionCause, ResolutionError};
pub use location::{LocationLookupError, LocationOutcome, LocationPipeline};
