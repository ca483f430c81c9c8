//! MCP server implementation for vmatch.
//!
//! Exposes vehicle search as an MCP tool for AI editors.

use std::borrow::Cow;
use std::sync::Arc;

use rmcp::{
    ServerHandler, ServiceExt,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{
        CallToolResult, Content, ErrorCode, ErrorData as McpError, ServerCapabilities, ServerInfo,
    },
    schemars, tool, tool_handler, tool_router,
    transport::stdio,
};
use serde::Deserialize;

use crate::cache::DatasetHandle;
use crate::commands;
use crate::search::{self, SearchQuery};

/// Parameters for `search_vehicles` tool.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SearchParams {
    #[schemars(description = "Vehicle make, e.g. 'Chevrolet' (case-sensitive)")]
    pub make: Option<String>,
    #[schemars(description = "Vehicle model, e.g. 'Bolt' (case-sensitive)")]
    pub model: Option<String>,
    #[schemars(description = "Model year, e.g. 2018")]
    pub year: Option<i32>,
}

impl From<SearchParams> for SearchQuery {
    fn from(params: SearchParams) -> Self {
        Self {
            make: params.make,
            model: params.model,
            year: params.year,
        }
    }
}

fn mcp_error(code: ErrorCode, message: String) -> McpError {
    McpError {
        code,
        message: Cow::from(message),
        data: None,
    }
}

/// MCP server exposing vmatch tools.
///
/// Clones share one dataset handle, so the dataset is loaded at most once.
#[derive(Clone)]
pub struct VehicleServer {
    tool_router: ToolRouter<Self>,
    dataset: Arc<DatasetHandle>,
}

#[tool_router]
impl VehicleServer {
    #[must_use]
    pub fn new(dataset: DatasetHandle) -> Self {
        Self {
            tool_router: Self::tool_router(),
            dataset: Arc::new(dataset),
        }
    }

    #[tool(
        description = "Find the 10 vehicles closest to a partial make/model/year description, \
        with fuel efficiency (MPG, or kWh/100mi for electric vehicles). Lower score is closer."
    )]
    async fn search_vehicles(
        &self,
        Parameters(params): Parameters<SearchParams>,
    ) -> Result<CallToolResult, McpError> {
        let query = SearchQuery::from(params);

        commands::validate_query(&query)
            .map_err(|e| mcp_error(ErrorCode::INVALID_PARAMS, format!("Invalid query: {e}")))?;

        let records = self.dataset.records().map_err(|e| {
            mcp_error(
                ErrorCode::INTERNAL_ERROR,
                format!("Vehicle data unavailable: {e}"),
            )
        })?;

        let results = search::search(&query, &records);
        let output = serde_json::to_string_pretty(&results).map_err(|e| {
            mcp_error(
                ErrorCode::INTERNAL_ERROR,
                format!("Failed to encode results: {e}"),
            )
        })?;

        Ok(CallToolResult::success(vec![Content::text(output)]))
    }
}

#[tool_handler]
impl ServerHandler for VehicleServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "vmatch looks up vehicle fuel-efficiency records. \
                Use search_vehicles with any of make, model and year to find the closest matches."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

/// Start the MCP server with stdio transport.
///
/// # Errors
///
/// Returns an error if the server fails to start or encounters a fatal error.
pub async fn serve(dataset: DatasetHandle) -> anyhow::Result<()> {
    let server = VehicleServer::new(dataset);
    let service = server.serve(stdio()).await?;
    service.waiting().await?;
    Ok(())
}
