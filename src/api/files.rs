//! The two OAuth files kept in the networth home.
//! - `client_secret.json`: the Desktop app client downloaded from the Google Cloud Console
//! - `token.json`: the access and refresh tokens saved after the consent flow

use crate::api::OAUTH_SCOPES;
use crate::error::Res;
use crate::utils;
use anyhow::{ensure, Context};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The client secret must list this redirect (or its 127.0.0.1 twin), without a port.
pub(super) const REDIRECT: &str = "http://localhost";

/// The client credentials nested under `"installed"` in `client_secret.json`.
#[derive(Debug, Clone, Deserialize)]
pub(super) struct ClientCredentials {
    pub(super) client_id: String,
    pub(super) client_secret: String,
    pub(super) auth_uri: String,
    pub(super) token_uri: String,
    redirect_uris: Vec<String>,
}

#[derive(Deserialize)]
struct SecretJson {
    installed: ClientCredentials,
}

impl ClientCredentials {
    pub(super) async fn load(path: &Path) -> Res<Self> {
        let json: SecretJson = utils::deserialize(path).await.with_context(|| {
            format!(
                "Unable to read the OAuth client secret file at {}",
                path.display()
            )
        })?;
        let secret = json.installed;
        ensure!(
            secret
                .redirect_uris
                .iter()
                .any(|uri| uri == REDIRECT || uri == "http://127.0.0.1"),
            "The OAuth client in {} must list '{REDIRECT}' among its redirect URIs",
            path.display()
        );
        Ok(secret)
    }
}

/// The saved tokens, together with the path they are saved to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(super) struct Token {
    #[serde(skip)]
    path: PathBuf,
    scopes: Vec<String>,
    access_token: String,
    refresh_token: String,
    expires_at: DateTime<Utc>,
}

impl Token {
    pub(super) fn new(
        path: impl Into<PathBuf>,
        scopes: Vec<String>,
        access_token: String,
        refresh_token: String,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            path: path.into(),
            scopes,
            access_token,
            refresh_token,
            expires_at,
        }
    }

    /// Loads `token.json`. Tokens that lack a required scope are refused.
    pub(super) async fn load(path: &Path) -> Res<Self> {
        let mut token: Token = utils::deserialize(path)
            .await
            .context("Unable to deserialize the token JSON file")?;
        for scope in OAUTH_SCOPES {
            ensure!(
                token.scopes.iter().any(|s| s == scope),
                "OAuth scope '{scope}' is missing."
            );
        }
        token.path = path.to_path_buf();
        Ok(token)
    }

    /// Saves the tokens with owner-only permissions.
    pub(super) async fn save(&self) -> Res<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize the tokens")?;
        utils::write(&self.path, json).await?;
        #[cfg(unix)]
        {
            use std::fs::Permissions;
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(&self.path, Permissions::from_mode(0o600))
                .await
                .context("Failed to set file permissions")?;
        }
        Ok(())
    }

    pub(super) fn path(&self) -> &Path {
        &self.path
    }

    pub(super) fn access_token(&self) -> &str {
        &self.access_token
    }

    pub(super) fn refresh_token(&self) -> &str {
        &self.refresh_token
    }

    pub(super) fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// True when the access token expires within five minutes.
    pub(super) fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now() + chrono::Duration::minutes(5)
    }

    /// Google only sometimes sends a new refresh token, so the old one stays when there is none.
    pub(super) fn update(
        &mut self,
        access_token: String,
        expires_at: DateTime<Utc>,
        refresh_token: Option<String>,
    ) {
        self.access_token = access_token;
        self.expires_at = expires_at;
        if let Some(rt) = refresh_token {
            self.refresh_token = rt;
        }
    }
}
