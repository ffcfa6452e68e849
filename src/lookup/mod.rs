pub mod resolver;
pub mod searcher;

pub use resolver::{ObjectResolver, ResolveError};
pub use searcher::{InvoiceSearcher, SearchFailure};
