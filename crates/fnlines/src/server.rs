//! MCP (Model Context Protocol) server implementation.
//!
//! Exposes the same operations as the CLI subcommands as MCP tools over
//! stdio. Tools take C source text rather than paths, so the server never
//! touches the filesystem.
//!
//! Each `#[tool]` method delegates to `fnlines_core`; the only logic here is
//! the input size check and serialization.

use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo};
use rmcp::schemars;
use rmcp::{ErrorData as McpError, ServerHandler, tool, tool_handler, tool_router};

use fnlines_core::error::check_input_size;

/// Parameters for the `get_info` tool.
#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct GetInfoParams {
    /// Output format: "text" or "json"
    #[serde(default = "default_format")]
    pub format: String,
}

fn default_format() -> String {
    "text".to_string()
}

/// Parameters for tools that take only C source.
#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct SourceParams {
    /// Complete C source text.
    pub source: String,
}

/// Parameters for the `count_functions` tool.
#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct CountFunctionsParams {
    /// Complete C source text.
    pub source: String,
    /// Maximum body lines per function. Falls back to the server's configured limit.
    pub max_lines: Option<usize>,
}

/// MCP server exposing the source tools.
#[derive(Clone)]
pub struct ProjectServer {
    max_input_bytes: Option<usize>,
    default_max_lines: Option<usize>,
    tool_router: rmcp::handler::server::router::tool::ToolRouter<Self>,
}

impl Default for ProjectServer {
    fn default() -> Self {
        Self::new(Some(fnlines_core::DEFAULT_MAX_INPUT_BYTES), None)
    }
}

fn serialization_error(e: serde_json::Error) -> McpError {
    McpError::internal_error(format!("serialization error: {e}"), None)
}

#[tool_router]
impl ProjectServer {
    /// Create a server enforcing `max_input_bytes` on every source it receives.
    pub fn new(max_input_bytes: Option<usize>, default_max_lines: Option<usize>) -> Self {
        Self {
            max_input_bytes,
            default_max_lines,
            tool_router: Self::tool_router(),
        }
    }

    fn check_size(&self, source: &str) -> Result<(), McpError> {
        check_input_size("source", source.len(), self.max_input_bytes)
            .map_err(|e| McpError::invalid_params(e.to_string(), None))
    }

    /// Get project information.
    #[tool(description = "Get project name, version, and description")]
    #[tracing::instrument(skip(self), fields(otel.kind = "server"))]
    fn get_info(
        &self,
        #[allow(unused_variables)] Parameters(params): Parameters<GetInfoParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::debug!(tool = "get_info", format = %params.format, "executing MCP tool");

        let info = serde_json::json!({
            "name": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
            "description": env!("CARGO_PKG_DESCRIPTION"),
        });

        let text = if params.format == "json" {
            serde_json::to_string_pretty(&info).map_err(serialization_error)?
        } else {
            format!(
                "{} v{}\n{}",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION"),
                env!("CARGO_PKG_DESCRIPTION"),
            )
        };

        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    /// Reformat and annotate C source.
    #[tool(
        description = "Reformat C functions to Allman style and write a `// »»-----► Number of lines: N` comment above each one. Returns the new source."
    )]
    #[tracing::instrument(skip(self, params), fields(otel.kind = "server"))]
    fn annotate_source(
        &self,
        #[allow(unused_variables)] Parameters(params): Parameters<SourceParams>,
    ) -> Result<CallToolResult, McpError> {
        self.check_size(&params.source)?;
        let annotated = fnlines_core::annotate(&params.source);
        tracing::info!(tool = "annotate_source", "MCP tool completed");
        Ok(CallToolResult::success(vec![Content::text(annotated)]))
    }

    /// Reformat C source without annotating.
    #[tool(
        description = "Move function opening braces onto their own line (Allman style) and split one-line bodies. Returns the new source."
    )]
    #[tracing::instrument(skip(self, params), fields(otel.kind = "server"))]
    fn format_source(
        &self,
        #[allow(unused_variables)] Parameters(params): Parameters<SourceParams>,
    ) -> Result<CallToolResult, McpError> {
        self.check_size(&params.source)?;
        let formatted = fnlines_core::format_only(&params.source);
        tracing::info!(tool = "format_source", "MCP tool completed");
        Ok(CallToolResult::success(vec![Content::text(formatted)]))
    }

    /// Remove line-count annotations.
    #[tool(description = "Remove every line-count annotation comment. Returns the new source.")]
    #[tracing::instrument(skip(self, params), fields(otel.kind = "server"))]
    fn strip_annotations(
        &self,
        #[allow(unused_variables)] Parameters(params): Parameters<SourceParams>,
    ) -> Result<CallToolResult, McpError> {
        self.check_size(&params.source)?;
        let stripped = fnlines_core::strip_annotations(&params.source);
        tracing::info!(tool = "strip_annotations", "MCP tool completed");
        Ok(CallToolResult::success(vec![Content::text(stripped)]))
    }

    /// Report line totals and Allman compliance.
    #[tool(
        description = "Count code, comment and empty lines, and how many function signatures already have their brace on the next line. Returns JSON."
    )]
    #[tracing::instrument(skip(self, params), fields(otel.kind = "server"))]
    fn analyze_style(
        &self,
        #[allow(unused_variables)] Parameters(params): Parameters<SourceParams>,
    ) -> Result<CallToolResult, McpError> {
        self.check_size(&params.source)?;
        let report = fnlines_core::analyze(&params.source);
        let json = serde_json::to_string_pretty(&report).map_err(serialization_error)?;
        tracing::info!(
            tool = "analyze_style",
            functions = report.function_count,
            "MCP tool completed"
        );
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    /// List functions with their body line counts.
    #[tool(
        description = "List every C function with its significant body line count, optionally failing those longer than max_lines. Returns JSON."
    )]
    #[tracing::instrument(skip(self, params), fields(otel.kind = "server"))]
    fn count_functions(
        &self,
        #[allow(unused_variables)] Parameters(params): Parameters<CountFunctionsParams>,
    ) -> Result<CallToolResult, McpError> {
        self.check_size(&params.source)?;
        let max_lines = params.max_lines.or(self.default_max_lines);
        let report = fnlines_core::functions(&params.source, max_lines);
        let json = serde_json::to_string_pretty(&report).map_err(serialization_error)?;
        tracing::info!(
            tool = "count_functions",
            functions = report.functions.len(),
            pass = report.pass,
            "MCP tool completed"
        );
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }
}

#[tool_handler]
impl ServerHandler for ProjectServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: Default::default(),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            instructions: Some(format!(
                "{} MCP server. Tools take complete C source text: annotate_source, \
                 format_source and strip_annotations return rewritten source; \
                 analyze_style and count_functions return JSON reports.",
                env!("CARGO_PKG_NAME"),
            )),
        }
    }
}
