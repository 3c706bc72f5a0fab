//! MCP server exposing listing search over stdio.

use crate::schema::inline_schema_for_type;
use crate::state::SearchState;
use crate::tools::{
    ParseQueryRequest, SearchListingsRequest, handle_parse_query, handle_search_listings,
};
use rmcp::{
    ServerHandler,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::*,
    tool, tool_handler, tool_router,
};
use std::sync::Arc;

/// MCP Server for property listing search
#[derive(Clone)]
pub struct ListingServer {
    /// Shared search state (engine, listing cache, config)
    state: Arc<SearchState>,

    /// Tool router for handling MCP tool calls
    tool_router: ToolRouter<Self>,
}

impl std::fmt::Debug for ListingServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListingServer")
            .field("state", &self.state)
            .finish()
    }
}

#[tool_router]
impl ListingServer {
    pub fn new(state: SearchState) -> Self {
        Self {
            state: Arc::new(state),
            tool_router: Self::tool_router(),
        }
    }

    pub fn state(&self) -> &Arc<SearchState> {
        &self.state
    }

    #[tool(
        description = "Search property listings with free text. Understands Spanish and English amenity and property-type synonyms ('piscina'/'pool', 'apto'/'apartment'), accent-insensitive neighborhoods and shorthand minimums like '3h' (bedrooms), '2b' (bathrooms) and '1g' (parking). Returns up to 12 ranked listings.",
        input_schema = inline_schema_for_type::<SearchListingsRequest>()
    )]
    async fn search_listings(
        &self,
        Parameters(request): Parameters<SearchListingsRequest>,
    ) -> std::result::Result<String, String> {
        tracing::debug!("search_listings: {:?}", request.query);
        handle_search_listings(&self.state, request).await
    }

    #[tool(
        description = "Show how a search query is interpreted: normalized text, detected amenity and type phrases, free tokens and numeric constraints. With a source, also reports each listing's score or rejection reason.",
        input_schema = inline_schema_for_type::<ParseQueryRequest>()
    )]
    async fn parse_query(
        &self,
        Parameters(request): Parameters<ParseQueryRequest>,
    ) -> std::result::Result<String, String> {
        handle_parse_query(&self.state, request).await
    }
}

#[tool_handler]
impl ServerHandler for ListingServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo::new(ServerCapabilities::builder().enable_tools().build())
            .with_protocol_version(ProtocolVersion::V_2024_11_05)
            .with_server_info(Implementation::from_build_env())
            .with_instructions(
                "listing-search: smart free-text search over property listings. \
                 Use search_listings for ranked results and parse_query to see how a query is understood. \
                 Listings are read from a JSON file (the configured source unless a request names one) \
                 and cached in memory for 20 minutes."
                    .to_string(),
            )
    }
}
