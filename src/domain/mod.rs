pub mod profile;
pub mod search_query;

pub use profile::*;
pub use search_query::*;
