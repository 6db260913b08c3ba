//! MCP (Model Context Protocol) server implementation.
//!
//! This module provides an MCP server that exposes the networth reports and entry recording as
//! tools for AI agent integration. The server communicates via JSON-RPC over stdio. One
//! `LedgerCache` is shared by every tool call of the process.

/// Checks if the server has been initialized and returns an error if not.
macro_rules! require_init {
    ($self:expr) => {
        if !$self.check_initialized().await {
            return Self::uninitialized();
        }
    };
}

mod mcp_utils;
mod tools;

use crate::commands::Backend;
use crate::error::{ErrorType, IntoResult};
use crate::session::Session;
use crate::{Config, Mode};
use rmcp::handler::server::tool::ToolRouter;
use rmcp::model::{
    CallToolResult, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::transport::stdio;
use rmcp::ErrorData as McpError;
use rmcp::{tool_handler, ServerHandler, ServiceExt};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

/// The networth MCP server.
#[derive(Debug, Clone)]
pub struct NetworthServer {
    initialized: Arc<Mutex<bool>>,
    backend: Arc<Backend>,
    /// Used when a tool call does not name an owner.
    session: Session,
    tool_router: ToolRouter<NetworthServer>,
}

impl NetworthServer {
    /// Creates a new NetworthServer with the given configuration.
    pub fn new(config: Config, mode: Mode, session: Session) -> Self {
        Self {
            initialized: Arc::new(Mutex::new(false)),
            backend: Arc::new(Backend::new(config, mode)),
            session,
            tool_router: Self::tool_router(),
        }
    }

    async fn check_initialized(&self) -> bool {
        *self.initialized.lock().await
    }

    fn uninitialized() -> Result<CallToolResult, McpError> {
        Ok(CallToolResult::error(vec![rmcp::model::Content::text(
            "You have not yet initialized the service. Please call __initialize_service__ first.",
        )]))
    }

    /// The session for a tool call: the given owner, or the server's own when there is none.
    fn session(&self, owner: Option<&str>) -> crate::Result<Session> {
        match owner.map(str::trim).filter(|s| !s.is_empty()) {
            Some(owner) => Session::parse(Some(owner)),
            None => Ok(self.session.clone()),
        }
    }
}

#[tool_handler]
impl ServerHandler for NetworthServer {
    /// Returns server information sent to the MCP client during initialization.
    ///
    /// Agents tend to treat `instructions` as optional reading, so the tools also refuse to run
    /// until `__initialize_service__` has been called.
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "networth".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            instructions: Some(include_str!("docs/INTRO.md").into()),
        }
    }
}

/// Transport type for the MCP server.
#[derive(Debug, Default)]
pub(crate) enum Io {
    #[default]
    Stdio,
    /// Mock transport for testing - holds one end of a duplex channel.
    #[cfg(test)]
    Mock(tokio::io::DuplexStream),
}

/// Runs the MCP server with stdio transport or mock transport. This function starts the MCP server
/// and blocks until the client disconnects or an error occurs.
///
/// # Arguments
/// - `config`: The `Config` object
/// - `mode`: Whether we are running with a live Google sheet or with a test sheet
/// - `session`: The default session for tool calls that do not name an owner
/// - `io`: Whether we are using stdio as the transport or using mock io for testing
pub(crate) async fn run_server(
    config: Config,
    mode: Mode,
    session: Session,
    io: Io,
) -> crate::Result<()> {
    let server = NetworthServer::new(config, mode, session);
    info!("Starting MCP server...");

    let service = match io {
        Io::Stdio => server
            .serve(stdio())
            .await
            .map_err(|e| anyhow::anyhow!("Failed to start MCP server: {e}"))
            .pub_result(ErrorType::Service)?,
        #[cfg(test)]
        Io::Mock(stream) => server
            .serve(stream)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to start MCP server: {e}"))
            .pub_result(ErrorType::Service)?,
    };

    info!("MCP server running, waiting for requests...");

    // Wait for the server to complete (client disconnects or error)
    service
        .waiting()
        .await
        .map_err(|e| anyhow::anyhow!("MCP server error: {e}"))
        .pub_result(ErrorType::Service)?;

    info!("MCP server shut down");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;
    use rmcp::model::CallToolRequestParam;
    use rmcp::service::{RoleClient, RunningService};
    use serde_json::{json, Map, Value};
    use tokio::io::duplex;

    async fn call(
        client: &RunningService<RoleClient, ()>,
        name: &str,
        arguments: Value,
    ) -> (bool, String) {
        let arguments: Option<Map<String, Value>> = match arguments {
            Value::Object(map) => Some(map),
            _ => None,
        };
        let result = client
            .call_tool(CallToolRequestParam {
                name: name.to_string().into(),
                arguments,
            })
            .await
            .unwrap_or_else(|e| panic!("{name} call failed: {e}"));
        let content = serde_json::to_string(&result.content).unwrap();
        (result.is_error.unwrap_or(false), content)
    }

    /// Integration test for the MCP server using an in-memory transport.
    #[tokio::test]
    async fn test_mcp_server_integration() {
        let (client_io, server_io) = duplex(4096);
        let env = TestEnv::new().await;
        let config = env.config();
        let server_handle = tokio::spawn(async move {
            run_server(config, Mode::Testing, Session::default(), Io::Mock(server_io)).await
        });
        let client = ().serve(client_io).await.expect("Failed to create client");

        // Tools refuse to run before initialization.
        let (is_error, content) = call(&client, "dashboard", json!({})).await;
        assert!(is_error);
        assert!(content.contains("initialize_service"));

        let (is_error, content) = call(&client, "initialize_service", Value::Null).await;
        assert!(!is_error, "{content}");

        let (is_error, content) = call(&client, "dashboard", json!({})).await;
        assert!(!is_error, "{content}");
        assert!(content.contains("828400"));

        let (is_error, content) = call(
            &client,
            "add_asset",
            json!({
                "date": "2026-02-14",
                "category": "Investments",
                "name": "Index Fund",
                "value": "₹20,000",
                "notes": "first buy"
            }),
        )
        .await;
        assert!(!is_error, "{content}");
        assert!(content.contains("Feb 2026"));

        let (is_error, content) = call(
            &client,
            "mom_history",
            json!({ "category": "Investments" }),
        )
        .await;
        assert!(!is_error, "{content}");
        assert!(content.contains("2026-02-28"));

        let (is_error, content) =
            call(&client, "allocation", json!({ "kind": "liability" })).await;
        assert!(!is_error, "{content}");
        assert!(content.contains("Mortgage"));

        let (is_error, content) =
            call(&client, "list_categories", json!({ "kind": "liability" })).await;
        assert!(!is_error, "{content}");
        assert!(content.contains("Student Loan"));

        let (is_error, content) = call(&client, "trend", json!({})).await;
        assert!(!is_error, "{content}");

        let (is_error, content) = call(
            &client,
            "add_liability",
            json!({ "category": "Gambling", "name": "x", "value": "1" }),
        )
        .await;
        assert!(is_error);
        assert!(content.contains("Unknown liability category"));

        // The ledger is single-user, so naming an owner for a write is refused.
        let (is_error, _) = call(
            &client,
            "add_liability",
            json!({ "owner": "bob", "category": "Mortgage", "name": "x", "value": "1" }),
        )
        .await;
        assert!(is_error);

        drop(client);
        let server_result = tokio::time::timeout(std::time::Duration::from_secs(5), server_handle)
            .await
            .expect("Server timed out")
            .expect("Server task panicked");
        assert!(
            server_result.is_ok(),
            "Server returned error: {:?}",
            server_result
        );
    }

    #[tokio::test]
    async fn test_list_tools() {
        let (client_io, server_io) = duplex(4096);
        let env = TestEnv::new().await;
        let config = env.config();
        let _server_handle = tokio::spawn(async move {
            run_server(config, Mode::Testing, Session::default(), Io::Mock(server_io)).await
        });
        let client = ().serve(client_io).await.expect("Failed to create client");

        let tools = client
            .list_tools(Default::default())
            .await
            .expect("Failed to list tools");
        let mut names: Vec<String> = tools.tools.iter().map(|t| t.name.to_string()).collect();
        names.sort();
        assert_eq!(
            names,
            vec![
                "add_asset",
                "add_liability",
                "allocation",
                "dashboard",
                "initialize_service",
                "list_categories",
                "mom_history",
                "trend",
            ]
        );
        let add_asset = tools
            .tools
            .iter()
            .find(|t| t.name == "add_asset")
            .unwrap();
        let schema = serde_json::to_string(&add_asset.input_schema).unwrap();
        assert!(schema.contains("owner"));
        assert!(schema.contains("category"));
    }
}
