//! Authentication command handlers for OAuth flow.
//!
//! This module implements the CLI commands for:
//! - `networth auth` - Initial OAuth consent flow
//! - `networth auth --verify` - Verify and refresh authentication

use crate::api::TokenProvider;
use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::{Config, Result};
use anyhow::Context;

/// Handles the `networth auth` command - runs the OAuth consent flow
///
/// This is the ONLY command that needs a browser. It:
/// 1. Checks for client_secret.json (provides instructions if missing)
/// 2. Prints the consent URL and waits for the redirect on a local port
/// 3. Saves tokens to token.json with required scopes
pub async fn auth(config: &Config) -> Result<Out<()>> {
    TokenProvider::initialize(&config.client_secret_path(), &config.token_path())
        .await
        .pub_result(ErrorType::Auth)?;
    Ok("Authorization complete".into())
}

/// Handles the `networth auth --verify` command - verifies authentication
///
/// This command NEVER opens a browser. It loads the saved tokens, checks their scopes and
/// refreshes the access token. If the token is missing, invalid, or has the wrong scopes, this
/// command fails with an error message telling the user to run `networth auth`.
pub async fn auth_verify(config: &Config) -> Result<Out<()>> {
    let mut token_provider =
        TokenProvider::load(&config.client_secret_path(), &config.token_path())
            .await
            .context(
                "Unable to use the existing tokens found in the token JSON file. \n\n\
                You should run 'networth auth' (without the --verify flag).",
            )
            .pub_result(ErrorType::Auth)?;
    token_provider
        .refresh()
        .await
        .context("Unable to refresh the token")
        .pub_result(ErrorType::Auth)?;
    Ok("Your OAuth token is valid!".into())
}
