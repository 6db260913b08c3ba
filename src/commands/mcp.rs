//! MCP server command handler.
//!
//! This module implements the `networth mcp` command which runs an MCP server
//! for AI agent integration.

use crate::commands::Out;
use crate::mcp::Io;
use crate::session::Session;
use crate::{mcp, Config, Mode, Result};

/// Runs the MCP server.
///
/// This launches a long-running process that communicates via JSON-RPC over stdin/stdout.
/// MCP clients launch this as a subprocess. `session` supplies the owner for tool calls that do
/// not name one.
pub async fn mcp(config: Config, mode: Mode, session: Session) -> Result<Out<()>> {
    mcp::run_server(config, mode, session, Io::Stdio).await?;
    Ok("Done running MCP server".into())
}
