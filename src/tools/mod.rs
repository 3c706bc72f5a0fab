pub mod parse_query;
pub mod search_listings;

pub use parse_query::*;
pub use search_listings::*;
