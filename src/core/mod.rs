pub mod errors;
pub mod types;
pub mod value;
pub mod seq;
pub mod store;
pub mod context;
pub mod report;


pub use errors::{ErrorKind, QueryError, Result};
pub use types::{TypeTag, ValueKind};
pub use store::Store;
pub use context::{Binding, QueryContext};
pub use report::MutationReport;
