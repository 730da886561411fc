pub mod query;

pub use query::{MAX_RESULTS, QueryService};
