//! OAuth 2.0 installed-app flow for the Google Sheets API.
//!
//! `TokenProvider::initialize` runs the consent flow: it starts a loopback HTTP server, prints the
//! consent URL and waits for Google to redirect back with an authorization code, which it exchanges
//! for tokens (with PKCE). `TokenProvider::load` reads saved tokens and refreshes them when they
//! are about to expire. Only `initialize` ever needs a browser.

use crate::api::files::{ClientCredentials, Token, REDIRECT};
use crate::api::OAUTH_SCOPES;
use crate::error::Res;
use anyhow::{anyhow, bail, Context};
use chrono::Utc;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use oauth2::basic::{BasicClient, BasicTokenResponse};
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, EndpointNotSet, EndpointSet,
    PkceCodeChallenge, RedirectUrl, RefreshToken, Scope, TokenResponse, TokenUrl,
};
use std::convert::Infallible;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

/// How long the consent flow waits for the browser to come back.
const CONSENT_TIMEOUT: Duration = Duration::from_secs(300);

type OAuthClient = BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// Holds a valid access token and refreshes it when needed.
pub(crate) struct TokenProvider {
    client: OAuthClient,
    http: reqwest::Client,
    token: Token,
}

impl TokenProvider {
    /// Runs the consent flow and saves the resulting tokens to `token_path`.
    pub(crate) async fn initialize(secret_path: &Path, token_path: &Path) -> Res<Self> {
        info!("Starting OAuth consent flow");
        let secret = ClientCredentials::load(secret_path).await.with_context(|| {
            format!(
                "Download an OAuth client secret for a Desktop app from the Google Cloud Console \
                and save it at {}",
                secret_path.display()
            )
        })?;

        let listener = TcpListener::bind(("127.0.0.1", 0))
            .await
            .context("Unable to start the local OAuth callback server")?;
        let port = listener
            .local_addr()
            .context("Unable to read the callback server address")?
            .port();
        let redirect = format!("{REDIRECT}:{port}");
        let client = oauth_client(&secret)?.set_redirect_uri(
            RedirectUrl::new(redirect.clone()).context("Invalid OAuth redirect URL")?,
        );

        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();
        let mut request = client.authorize_url(CsrfToken::new_random);
        for scope in OAUTH_SCOPES {
            request = request.add_scope(Scope::new(scope.to_string()));
        }
        let (auth_url, csrf) = request
            .add_extra_param("access_type", "offline")
            .add_extra_param("prompt", "consent")
            .set_pkce_challenge(pkce_challenge)
            .url();

        info!("Open this URL in your browser to authorize access:\n\n{auth_url}\n");
        info!("Waiting for the OAuth callback on {redirect}");

        let callback = tokio::time::timeout(CONSENT_TIMEOUT, wait_for_callback(listener))
            .await
            .context("Timed out waiting for the OAuth consent")??;
        if callback.state != *csrf.secret() {
            bail!("The OAuth callback state did not match, the authorization was not trusted");
        }

        let http = http_client()?;
        let response = client
            .exchange_code(AuthorizationCode::new(callback.code))
            .set_pkce_verifier(pkce_verifier)
            .request_async(&http)
            .await
            .map_err(|e| anyhow!("{e}"))
            .context("Failed to exchange the authorization code for tokens")?;

        let refresh_token = response
            .refresh_token()
            .map(|t| t.secret().to_string())
            .context("Google did not return a refresh token")?;
        let token = Token::new(
            token_path,
            granted_scopes(&response),
            response.access_token().secret().to_string(),
            refresh_token,
            expires_at(&response),
        );
        token.save().await?;
        info!("Authorization successful, tokens saved to {}", token_path.display());

        Ok(Self {
            client,
            http,
            token,
        })
    }

    /// Loads saved tokens. Fails when there are none or they lack the required scopes.
    pub(crate) async fn load(secret_path: &Path, token_path: &Path) -> Res<Self> {
        let secret = ClientCredentials::load(secret_path).await?;
        let token = Token::load(token_path).await?;
        Ok(Self {
            client: oauth_client(&secret)?,
            http: http_client()?,
            token,
        })
    }

    /// The current access token, which may be expired.
    pub(crate) fn token(&self) -> &str {
        self.token.access_token()
    }

    /// The access token, refreshed first if it expires within five minutes.
    pub(crate) async fn token_with_refresh(&mut self) -> Res<&str> {
        if self.token.is_expired() {
            self.refresh().await?;
        }
        Ok(self.token())
    }

    /// Exchanges the refresh token for a new access token and saves it.
    pub(crate) async fn refresh(&mut self) -> Res<()> {
        debug!("Refreshing the OAuth access token");
        let refresh_token = RefreshToken::new(self.token.refresh_token().to_string());
        let response = self
            .client
            .exchange_refresh_token(&refresh_token)
            .request_async(&self.http)
            .await
            .map_err(|e| anyhow!("{e}"))
            .context("Failed to refresh the OAuth token, you may need to run 'networth auth'")?;

        let expires_at = expires_at(&response);
        self.token.update(
            response.access_token().secret().to_string(),
            expires_at,
            response.refresh_token().map(|t| t.secret().to_string()),
        );
        self.token.save().await?;
        debug!(
            "Token saved to {}, valid until {}",
            self.token.path().display(),
            self.token.expires_at()
        );
        Ok(())
    }
}

fn oauth_client(secret: &ClientCredentials) -> Res<OAuthClient> {
    Ok(BasicClient::new(ClientId::new(secret.client_id.clone()))
        .set_client_secret(ClientSecret::new(secret.client_secret.clone()))
        .set_auth_uri(AuthUrl::new(secret.auth_uri.clone()).context("Invalid auth_uri")?)
        .set_token_uri(TokenUrl::new(secret.token_uri.clone()).context("Invalid token_uri")?))
}

fn http_client() -> Res<reqwest::Client> {
    reqwest::ClientBuilder::new()
        // The token exchange must not follow redirects.
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .context("Unable to build the HTTP client")
}

fn expires_at(response: &BasicTokenResponse) -> chrono::DateTime<Utc> {
    let lifetime = response
        .expires_in()
        .and_then(|d| chrono::Duration::from_std(d).ok())
        .unwrap_or_else(|| chrono::Duration::hours(1));
    Utc::now() + lifetime
}

fn granted_scopes(response: &BasicTokenResponse) -> Vec<String> {
    match response.scopes() {
        Some(scopes) => scopes.iter().map(|s| s.to_string()).collect(),
        None => OAUTH_SCOPES.iter().map(|s| s.to_string()).collect(),
    }
}

/// What Google sends to the loopback redirect.
#[derive(Debug, Clone, Eq, PartialEq)]
struct Callback {
    code: String,
    state: String,
}

/// Parses the query of a callback request. Requests without a `code` or `error` are not callbacks
/// (for example, the browser asking for a favicon) and give `None`.
fn parse_callback(query: Option<&str>) -> Option<Res<Callback>> {
    let url = url::Url::parse(&format!("http://localhost/?{}", query.unwrap_or_default())).ok()?;
    let mut code = None;
    let mut state = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            "error" => return Some(Err(anyhow!("The OAuth consent was refused: {value}"))),
            _ => {}
        }
    }
    let code = code?;
    Some(Ok(Callback {
        code,
        state: state.unwrap_or_default(),
    }))
}

/// Serves the loopback redirect until the first callback arrives.
async fn wait_for_callback(listener: TcpListener) -> Res<Callback> {
    let (sender, receiver) = oneshot::channel::<Res<Callback>>();
    let sender = Arc::new(Mutex::new(Some(sender)));

    let server = tokio::spawn(async move {
        loop {
            let stream = match listener.accept().await {
                Ok((stream, _)) => stream,
                Err(e) => {
                    warn!("OAuth callback server failed to accept a connection: {e}");
                    continue;
                }
            };
            let sender = Arc::clone(&sender);
            let service = service_fn(move |request: Request<Incoming>| {
                let sender = Arc::clone(&sender);
                async move {
                    let body = match parse_callback(request.uri().query()) {
                        Some(callback) => {
                            let message = match &callback {
                                Ok(_) => "Authorization complete. You can close this window.",
                                Err(_) => "Authorization failed. Check the terminal for details.",
                            };
                            if let Ok(mut guard) = sender.lock() {
                                if let Some(tx) = guard.take() {
                                    let _ = tx.send(callback);
                                }
                            }
                            message
                        }
                        None => "Waiting for the OAuth callback.",
                    };
                    Ok::<_, Infallible>(Response::new(body.to_string()))
                }
            });
            tokio::spawn(async move {
                if let Err(e) = http1::Builder::new()
                    .serve_connection(TokioIo::new(stream), service)
                    .await
                {
                    debug!("OAuth callback connection ended with an error: {e}");
                }
            });
        }
    });

    let callback = receiver
        .await
        .context("The OAuth callback server stopped unexpectedly");
    server.abort();
    callback?
}
