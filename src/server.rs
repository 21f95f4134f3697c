//! MCP server exposing the search index tools.

use crate::config::Config;
use crate::state::IndexState;
use crate::tools::inspect_entry::{InspectEntryRequest, handle_inspect_entry};
use crate::tools::list_pages::handle_list_pages;
use crate::tools::search::{SearchRequest, handle_search};
use crate::tools::set_index::{SetIndexRequest, handle_set_index};
use rmcp::{
    ServerHandler,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::*,
    schemars::{self, JsonSchema, generate::SchemaSettings},
    tool, tool_handler, tool_router,
};
use std::sync::Arc;

/// MCP server for documentation search index queries
#[derive(Clone)]
pub struct DocSearchServer {
    /// Shared index state (active index, loaded indexes, configuration)
    state: Arc<IndexState>,

    /// Tool router for handling MCP tool calls
    tool_router: ToolRouter<Self>,
}

impl std::fmt::Debug for DocSearchServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocSearchServer")
            .field("state", &self.state)
            .finish()
    }
}

#[tool_router]
impl DocSearchServer {
    pub fn new(config: Config) -> Self {
        Self::with_state(Arc::new(IndexState::new(config)))
    }

    pub fn with_state(state: Arc<IndexState>) -> Self {
        Self {
            state,
            tool_router: Self::tool_router(),
        }
    }

    pub const fn state(&self) -> &Arc<IndexState> {
        &self.state
    }

    #[tool(
        description = "Load a Documenter search index (search_index.js) and make it the target of subsequent searches. Reports entry counts per category and the pages the index covers.",
        input_schema = inline_schema_for_type::<SetIndexRequest>()
    )]
    async fn set_index(
        &self,
        Parameters(request): Parameters<SetIndexRequest>,
    ) -> std::result::Result<String, String> {
        handle_set_index(&self.state, request).await
    }

    #[tool(
        description = "Search the documentation index. The default substring mode finds entries whose title, text or location contain the query (case-insensitive), title matches first. The ranked mode scores entries with TF-IDF over stemmed words. Results can be filtered by category (page, section, Type, Function, Method) and page.",
        input_schema = inline_schema_for_type::<SearchRequest>()
    )]
    async fn search(
        &self,
        Parameters(request): Parameters<SearchRequest>,
    ) -> std::result::Result<String, String> {
        handle_search(&self.state, request).await
    }

    #[tool(
        description = "List the pages of the active search index with the number of sections and documented symbols on each."
    )]
    async fn list_pages(&self) -> std::result::Result<String, String> {
        handle_list_pages(&self.state).await
    }

    #[tool(
        description = "Show a single index entry in full: category, page, symbol and method signature, and the complete docstring text. Accepts an entry location such as 'Greedy.html#Greedy.kruskal-Tuple{Any,Any}' or an exact title such as 'Greedy.kruskal'. Page entries also list everything on the page.",
        input_schema = inline_schema_for_type::<InspectEntryRequest>()
    )]
    async fn inspect_entry(
        &self,
        Parameters(request): Parameters<InspectEntryRequest>,
    ) -> std::result::Result<String, String> {
        handle_inspect_entry(&self.state, request).await
    }
}

#[tool_handler(router = self.tool_router)]
impl ServerHandler for DocSearchServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo::new(ServerCapabilities::builder().enable_tools().build())
            .with_protocol_version(ProtocolVersion::V_2024_11_05)
            .with_server_info(Implementation::from_build_env())
            .with_instructions(
                "docsearch-mcp: Search the index behind a Documenter-generated documentation site. \
                 Use set_index with the path to search_index.js unless one was configured at startup, \
                 then search for titles, docstring text or locations and use inspect_entry to read an entry in full.",
            )
    }
}

/// Generate an inline JSON schema for MCP tools
///
/// Unlike rmcp's default `schema_for_type()`, this function sets `inline_subschemas = true`
/// to generate inline enum definitions instead of $ref patterns, so clients render the
/// search mode as a choice rather than a raw JSON field.
pub fn inline_schema_for_type<T: JsonSchema>() -> Arc<JsonObject> {
    let mut settings = SchemaSettings::draft07();
    settings.transforms = vec![Box::new(schemars::transform::AddNullable::default())];
    settings.inline_subschemas = true;

    let generator = settings.into_generator();
    let schema = generator.into_root_schema_for::<T>();

    match serde_json::to_value(schema) {
        Ok(serde_json::Value::Object(object)) => Arc::new(object),
        Ok(_) | Err(_) => {
            tracing::error!(
                "Schema for {} did not serialize to an object",
                std::any::type_name::<T>()
            );
            Arc::new(JsonObject::new())
        }
    }
}
