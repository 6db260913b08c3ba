//! The networth tools exposed over MCP.

use crate::args::{EntryArgs, KindArgs, MomArgs};
use crate::commands;
use crate::mcp::mcp_utils::tool_result;
use crate::mcp::NetworthServer;
use crate::model::EntryKind;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::CallToolResult;
use rmcp::ErrorData as McpError;
use rmcp::{tool, tool_router};
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::info;

/// Parameters for tools that take nothing but an optional owner.
#[derive(Debug, Default, Deserialize, JsonSchema)]
#[schemars(title = "OwnerParams")]
pub struct OwnerParams {
    /// In a multi-user ledger, whose data to use. Leave out to use the owner the server was
    /// started with.
    #[serde(default)]
    pub owner: Option<String>,
}

/// Tool arguments together with an optional owner.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct WithOwner<T> {
    /// In a multi-user ledger, whose data to use. Leave out to use the owner the server was
    /// started with.
    #[serde(default)]
    pub owner: Option<String>,

    #[serde(flatten)]
    pub args: T,
}

#[tool_router(vis = "pub(super)")]
impl NetworthServer {
    #[tool]
    /// Initialize the networth MCP service for this session and return usage instructions. You
    /// **MUST** call this **ONCE** before using other tools so that you have the full usage
    /// instructions. You **MAY** call it more than once if you have forgotten the usage
    /// instructions.
    async fn initialize_service(&self) -> Result<CallToolResult, McpError> {
        let mut initialized = self.initialized.lock().await;
        *initialized = true;
        Ok(CallToolResult::success(vec![rmcp::model::Content::text(
            include_str!("docs/INSTRUCTIONS.md"),
        )]))
    }

    /// The full net worth dashboard: total assets, total liabilities and net worth; the monthly
    /// breakdown; net worth growth for the latest month; month-over-month change per category;
    /// and the allocation of assets and liabilities across categories.
    ///
    /// Totals sum every entry of every month, so they grow with the number of months recorded.
    /// Use the `breakdown` for the position at a given month-end.
    #[tool]
    async fn dashboard(
        &self,
        Parameters(params): Parameters<OwnerParams>,
    ) -> Result<CallToolResult, McpError> {
        require_init!(self);
        info!("MCP: dashboard called");
        let out = match self.session(params.owner.as_deref()) {
            Ok(session) => commands::dashboard(&self.backend, &session).await,
            Err(e) => Err(e),
        };
        tool_result(out)
    }

    /// Assets, liabilities and net worth for each month, oldest first.
    #[tool]
    async fn trend(
        &self,
        Parameters(params): Parameters<OwnerParams>,
    ) -> Result<CallToolResult, McpError> {
        require_init!(self);
        info!("MCP: trend called");
        let out = match self.session(params.owner.as_deref()) {
            Ok(session) => commands::trend(&self.backend, &session).await,
            Err(e) => Err(e),
        };
        tool_result(out)
    }

    /// Month-over-month history of total assets, or of a single asset category when `category`
    /// is given. Each point has the month's value, the change from the previous month and the
    /// change as a percentage. The first month has no change.
    #[tool]
    async fn mom_history(
        &self,
        Parameters(params): Parameters<WithOwner<MomArgs>>,
    ) -> Result<CallToolResult, McpError> {
        require_init!(self);
        info!("MCP: mom_history called");
        let out = match self.session(params.owner.as_deref()) {
            Ok(session) => commands::mom(&self.backend, &session, &params.args).await,
            Err(e) => Err(e),
        };
        tool_result(out)
    }

    /// How the assets or the liabilities are split across categories, largest first, as totals
    /// and percentage shares.
    #[tool]
    async fn allocation(
        &self,
        Parameters(params): Parameters<WithOwner<KindArgs>>,
    ) -> Result<CallToolResult, McpError> {
        require_init!(self);
        info!("MCP: allocation called");
        let out = match self.session(params.owner.as_deref()) {
            Ok(session) => commands::allocation(&self.backend, &session, &params.args).await,
            Err(e) => Err(e),
        };
        tool_result(out)
    }

    /// The categories that may be used for new asset or liability entries. Call this before
    /// `add_asset` or `add_liability` if you are unsure of the category names.
    #[tool]
    async fn list_categories(
        &self,
        Parameters(params): Parameters<WithOwner<KindArgs>>,
    ) -> Result<CallToolResult, McpError> {
        require_init!(self);
        info!("MCP: list_categories called");
        let out = match self.session(params.owner.as_deref()) {
            Ok(session) => commands::categories(&self.backend, &session, &params.args).await,
            Err(e) => Err(e),
        };
        tool_result(out)
    }

    /// Record the value of an asset for a month. The date is stored as the last day of its
    /// month. The category must be one of the asset categories and the value must not be
    /// negative. In a multi-user ledger an owner is required.
    #[tool]
    async fn add_asset(
        &self,
        Parameters(params): Parameters<WithOwner<EntryArgs>>,
    ) -> Result<CallToolResult, McpError> {
        require_init!(self);
        info!("MCP: add_asset called");
        self.add(EntryKind::Asset, params).await
    }

    /// Record the balance of a liability for a month. The date is stored as the last day of its
    /// month. The category must be one of the liability categories and the value must not be
    /// negative. In a multi-user ledger an owner is required.
    #[tool]
    async fn add_liability(
        &self,
        Parameters(params): Parameters<WithOwner<EntryArgs>>,
    ) -> Result<CallToolResult, McpError> {
        require_init!(self);
        info!("MCP: add_liability called");
        self.add(EntryKind::Liability, params).await
    }
}

impl NetworthServer {
    async fn add(
        &self,
        kind: EntryKind,
        params: WithOwner<EntryArgs>,
    ) -> Result<CallToolResult, McpError> {
        let out = match self.session(params.owner.as_deref()) {
            Ok(session) => commands::add_entry(&self.backend, &session, kind, &params.args).await,
            Err(e) => Err(e),
        };
        tool_result(out)
    }
}
