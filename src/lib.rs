pub mod catalog;
pub mod config;
pub mod error;
pub mod listing;
pub mod schema;
pub mod search;
pub mod server;
pub mod state;
pub mod suggest;
pub mod tools;
pub mod tracing;

pub use catalog::ListingCatalog;
pub use config::SearchConfig;
pub use error::{ConfigError, Result, SourceError, VocabularyError};
pub use listing::{Amenity, Attribute, Listing};
pub use search::{ParsedQuery, SmartSearch};
pub use server::ListingServer;
pub use state::SearchState;
pub use suggest::{SuggestionController, SuggestionRow};
