//! Authentication state and the token lifecycle
//!
//! [`Authentication`] owns the credentials and the current access/refresh
//! token pair, and is the single source of truth for the bearer token on
//! every outgoing request. It moves through four states:
//!
//! - `Unauthenticated`: no token yet; the first [`attach`] logs in
//! - `Authenticated`: a live access token is attached to requests
//! - `Expired`: the server rejected the access token; a refresh is due
//! - `Failed`: credentials or refresh token rejected; terminal until the
//!   credentials are replaced
//!
//! Token refresh is single-flight: the whole detect-refresh-update sequence
//! runs under one async mutex held across the refresh call, so concurrent
//! requests that observe a rejected token wait for the in-flight refresh and
//! share its outcome instead of issuing redundant refresh calls.
//!
//! [`attach`]: Authentication::attach

use chrono::{DateTime, Utc};
use paddock_core::{PaddockError, Result};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::Mutex;

use crate::server::ServerContext;
use crate::transport::{HttpRequest, Method, Transport};

const LOGIN_PATH: &str = "v1/auth/login";
const REFRESH_PATH: &str = "v1/auth/refresh";

/// Authentication states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    /// No token has been obtained yet
    Unauthenticated,
    /// A live access token is available
    Authenticated,
    /// The access token was rejected; refresh not yet resolved
    Expired,
    /// Credentials or refresh token rejected; terminal until reset
    Failed,
}

/// Username/password pair, retained only for token (re)acquisition
#[derive(Clone)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// The current access/refresh token pair
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access: String,
    pub refresh: Option<String>,
    pub obtained_at: DateTime<Utc>,
}

/// Proof that a request was attached under a particular token generation.
///
/// Returned by [`Authentication::attach`]; passed back to
/// [`Authentication::handle_rejection`] when the server rejects the request,
/// so a rejection of an already-replaced token never triggers a second
/// refresh.
#[derive(Debug, Clone, Copy)]
pub struct AuthTicket {
    generation: u64,
}

#[derive(Debug)]
struct AuthInner {
    state: AuthState,
    tokens: Option<TokenPair>,
    /// Bumped every time a new token pair is installed
    generation: u64,
}

/// Login/refresh response body
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access: String,
    #[serde(default)]
    refresh: Option<String>,
}

/// Owns credentials and tokens; attaches the bearer token to requests and
/// runs the login/refresh protocol against whatever server context the
/// connection currently holds.
pub struct Authentication {
    credentials: Credentials,
    inner: Mutex<AuthInner>,
}

impl Authentication {
    /// Create an unauthenticated instance with the given credentials
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            credentials: Credentials::new(username, password),
            inner: Mutex::new(AuthInner {
                state: AuthState::Unauthenticated,
                tokens: None,
                generation: 0,
            }),
        }
    }

    /// Create an unauthenticated instance with blank credentials
    pub fn blank() -> Self {
        Self::new("", "")
    }

    /// The configured username
    pub fn username(&self) -> &str {
        self.credentials.username()
    }

    /// Current state snapshot
    pub async fn state(&self) -> AuthState {
        self.inner.lock().await.state
    }

    /// Attach the bearer token to `request`, logging in first when no token
    /// has been obtained yet.
    ///
    /// Does not eagerly refresh an expired token; expiry is only discovered
    /// through a server rejection reported via [`handle_rejection`].
    ///
    /// [`handle_rejection`]: Authentication::handle_rejection
    pub async fn attach(
        &self,
        transport: &dyn Transport,
        server: &ServerContext,
        request: &mut HttpRequest,
    ) -> Result<AuthTicket> {
        let mut inner = self.inner.lock().await;

        match inner.state {
            AuthState::Failed => {
                return Err(PaddockError::Auth(
                    "Credentials were rejected; set new credentials to continue".to_string(),
                ));
            }
            AuthState::Unauthenticated => {
                self.login(transport, server, &mut inner).await?;
            }
            AuthState::Authenticated | AuthState::Expired => {}
        }

        let access = inner
            .tokens
            .as_ref()
            .map(|t| t.access.clone())
            .ok_or_else(|| PaddockError::Auth("No access token available".to_string()))?;
        request.set_header("Authorization", format!("Bearer {}", access));

        Ok(AuthTicket {
            generation: inner.generation,
        })
    }

    /// Report that a request attached under `ticket` came back with an
    /// auth-failure response.
    ///
    /// Returns `true` when the caller should retry the request exactly once
    /// with the (now refreshed) token, `false` when the original failure
    /// should propagate unchanged.
    ///
    /// If another caller already completed a refresh since `ticket` was
    /// issued, no second refresh is attempted; the caller simply retries with
    /// the newer token (or gives up if that refresh failed).
    pub async fn handle_rejection(
        &self,
        transport: &dyn Transport,
        server: &ServerContext,
        ticket: AuthTicket,
    ) -> Result<bool> {
        let mut inner = self.inner.lock().await;

        // Someone else resolved this generation while we waited on the lock.
        if inner.generation != ticket.generation {
            return Ok(inner.state == AuthState::Authenticated);
        }

        match inner.state {
            AuthState::Failed | AuthState::Unauthenticated => return Ok(false),
            AuthState::Authenticated | AuthState::Expired => {}
        }

        inner.state = AuthState::Expired;
        tracing::warn!("Access token rejected by server; attempting refresh");

        let refresh = match inner.tokens.as_ref().and_then(|t| t.refresh.clone()) {
            Some(token) => token,
            None => {
                inner.state = AuthState::Failed;
                inner.tokens = None;
                tracing::warn!("No refresh token available; authentication failed");
                return Ok(false);
            }
        };

        let refresh_request = HttpRequest::new(Method::Post, server.build(REFRESH_PATH))
            .with_json(json!({ "refresh": refresh }));

        // Transport failures propagate with state left at Expired, so a later
        // request may attempt the refresh again.
        let response = transport.send(&refresh_request).await?;

        if response.is_success() {
            let parsed: TokenResponse = response.json()?;
            inner.tokens = Some(TokenPair {
                access: parsed.access,
                refresh: parsed.refresh.or(Some(refresh)),
                obtained_at: Utc::now(),
            });
            inner.state = AuthState::Authenticated;
            inner.generation += 1;
            tracing::info!("Access token refreshed");
            Ok(true)
        } else if matches!(response.status, 400 | 401 | 403) {
            inner.state = AuthState::Failed;
            inner.tokens = None;
            tracing::warn!("Refresh token rejected (HTTP {})", response.status);
            Ok(false)
        } else {
            // Server-side hiccup during refresh; keep Expired so the next
            // request can try again, and let the original failure propagate.
            tracing::warn!("Refresh attempt failed (HTTP {})", response.status);
            Ok(false)
        }
    }

    /// Drop the current token pair and return to the unauthenticated state.
    ///
    /// The next attached request performs a fresh login with the stored
    /// credentials. Rejections of requests attached before the logout no
    /// longer trigger a refresh.
    pub async fn logout(&self) {
        let mut inner = self.inner.lock().await;
        inner.tokens = None;
        inner.state = AuthState::Unauthenticated;
        inner.generation += 1;
        tracing::debug!("Logged out");
    }

    async fn login(
        &self,
        transport: &dyn Transport,
        server: &ServerContext,
        inner: &mut AuthInner,
    ) -> Result<()> {
        tracing::debug!(username = %self.credentials.username(), "Logging in");

        let login_request = HttpRequest::new(Method::Post, server.build(LOGIN_PATH)).with_json(
            json!({
                "username": self.credentials.username,
                "password": self.credentials.password,
            }),
        );

        // Transport failures propagate with state unchanged so the next call
        // can retry the login.
        let response = transport.send(&login_request).await?;

        if response.is_success() {
            let parsed: TokenResponse = response.json()?;
            inner.tokens = Some(TokenPair {
                access: parsed.access,
                refresh: parsed.refresh,
                obtained_at: Utc::now(),
            });
            inner.state = AuthState::Authenticated;
            inner.generation += 1;
            tracing::info!(username = %self.credentials.username(), "Logged in");
            Ok(())
        } else if matches!(response.status, 400 | 401 | 403) {
            inner.state = AuthState::Failed;
            inner.tokens = None;
            Err(PaddockError::Auth(format!(
                "Invalid credentials for user '{}' (HTTP {})",
                self.credentials.username(),
                response.status
            )))
        } else {
            Err(PaddockError::Api {
                status: response.status,
                message: response.text(),
            })
        }
    }
}

impl std::fmt::Debug for Authentication {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authentication")
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::mock::{empty_response, json_response, MockTransport};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn token_body(access: &str, refresh: &str) -> serde_json::Value {
        json!({ "access": access, "refresh": refresh })
    }

    fn login_only_transport() -> MockTransport {
        MockTransport::new(|req| {
            if req.url.ends_with("v1/auth/login") {
                Ok(json_response(200, token_body("acc-1", "ref-1")))
            } else {
                Ok(empty_response(200))
            }
        })
    }

    #[tokio::test]
    async fn test_first_attach_logs_in_once() {
        let transport = login_only_transport();
        let server = ServerContext::new("http://x");
        let auth = Authentication::new("alice", "secret");

        let mut req = HttpRequest::new(Method::Get, server.build("v1/users"));
        auth.attach(&transport, &server, &mut req).await.unwrap();

        assert_eq!(auth.state().await, AuthState::Authenticated);
        assert_eq!(req.header("Authorization"), Some("Bearer acc-1"));

        let logins = transport
            .requests()
            .iter()
            .filter(|r| r.url.ends_with("v1/auth/login"))
            .count();
        assert_eq!(logins, 1);
    }

    #[tokio::test]
    async fn test_second_attach_reuses_token() {
        let transport = login_only_transport();
        let server = ServerContext::new("http://x");
        let auth = Authentication::new("alice", "secret");

        let mut first = HttpRequest::new(Method::Get, server.build("v1/users"));
        auth.attach(&transport, &server, &mut first).await.unwrap();
        let mut second = HttpRequest::new(Method::Get, server.build("v1/datasets"));
        auth.attach(&transport, &server, &mut second).await.unwrap();

        // Only the single login from the first attach hit the network
        assert_eq!(transport.send_count(), 1);
        assert_eq!(second.header("Authorization"), Some("Bearer acc-1"));
    }

    #[tokio::test]
    async fn test_invalid_credentials_fail_terminally() {
        let transport = MockTransport::new(|_| Ok(empty_response(401)));
        let server = ServerContext::new("http://x");
        let auth = Authentication::new("alice", "wrong");

        let mut req = HttpRequest::new(Method::Get, server.build("v1/users"));
        let err = auth.attach(&transport, &server, &mut req).await.unwrap_err();
        assert!(matches!(err, PaddockError::Auth(_)));
        assert_eq!(auth.state().await, AuthState::Failed);

        // Subsequent attach fails without touching the network
        let before = transport.send_count();
        let mut req2 = HttpRequest::new(Method::Get, server.build("v1/users"));
        let err2 = auth.attach(&transport, &server, &mut req2).await.unwrap_err();
        assert!(matches!(err2, PaddockError::Auth(_)));
        assert_eq!(transport.send_count(), before);
    }

    #[tokio::test]
    async fn test_login_transport_failure_leaves_state_retryable() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = calls.clone();
        let transport = MockTransport::new(move |_| {
            if calls_clone.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(PaddockError::Transport("connection reset".to_string()))
            } else {
                Ok(json_response(200, json!({ "access": "a", "refresh": "r" })))
            }
        });
        let server = ServerContext::new("http://x");
        let auth = Authentication::new("alice", "secret");

        let mut req = HttpRequest::new(Method::Get, server.build("v1/users"));
        let err = auth.attach(&transport, &server, &mut req).await.unwrap_err();
        assert!(matches!(err, PaddockError::Transport(_)));
        assert_eq!(auth.state().await, AuthState::Unauthenticated);

        // The identical call succeeds on retry
        auth.attach(&transport, &server, &mut req).await.unwrap();
        assert_eq!(auth.state().await, AuthState::Authenticated);
    }

    #[tokio::test]
    async fn test_malformed_login_body_is_protocol_error() {
        let transport = MockTransport::new(|_| {
            Ok(json_response(200, json!({ "token": "not-the-right-shape" })))
        });
        let server = ServerContext::new("http://x");
        let auth = Authentication::new("alice", "secret");

        let mut req = HttpRequest::new(Method::Get, server.build("v1/users"));
        let err = auth.attach(&transport, &server, &mut req).await.unwrap_err();
        assert!(matches!(err, PaddockError::Protocol(_)));
        assert_eq!(auth.state().await, AuthState::Unauthenticated);
    }

    #[tokio::test]
    async fn test_rejection_triggers_refresh() {
        let transport = MockTransport::new(|req| {
            if req.url.ends_with("v1/auth/login") {
                Ok(json_response(200, token_body("acc-1", "ref-1")))
            } else if req.url.ends_with("v1/auth/refresh") {
                Ok(json_response(200, token_body("acc-2", "ref-2")))
            } else {
                Ok(empty_response(200))
            }
        });
        let server = ServerContext::new("http://x");
        let auth = Authentication::new("alice", "secret");

        let mut req = HttpRequest::new(Method::Get, server.build("v1/users"));
        let ticket = auth.attach(&transport, &server, &mut req).await.unwrap();

        let retry = auth
            .handle_rejection(&transport, &server, ticket)
            .await
            .unwrap();
        assert!(retry);
        assert_eq!(auth.state().await, AuthState::Authenticated);

        // The next attach carries the refreshed token
        let mut again = HttpRequest::new(Method::Get, server.build("v1/users"));
        auth.attach(&transport, &server, &mut again).await.unwrap();
        assert_eq!(again.header("Authorization"), Some("Bearer acc-2"));
    }

    #[tokio::test]
    async fn test_failed_refresh_is_terminal() {
        let transport = MockTransport::new(|req| {
            if req.url.ends_with("v1/auth/login") {
                Ok(json_response(200, token_body("acc-1", "ref-1")))
            } else if req.url.ends_with("v1/auth/refresh") {
                Ok(empty_response(401))
            } else {
                Ok(empty_response(200))
            }
        });
        let server = ServerContext::new("http://x");
        let auth = Authentication::new("alice", "secret");

        let mut req = HttpRequest::new(Method::Get, server.build("v1/users"));
        let ticket = auth.attach(&transport, &server, &mut req).await.unwrap();

        let retry = auth
            .handle_rejection(&transport, &server, ticket)
            .await
            .unwrap();
        assert!(!retry);
        assert_eq!(auth.state().await, AuthState::Failed);

        // A second rejection report does not attempt another refresh
        let before = transport.send_count();
        let retry2 = auth
            .handle_rejection(&transport, &server, ticket)
            .await
            .unwrap();
        assert!(!retry2);
        assert_eq!(transport.send_count(), before);
    }

    #[tokio::test]
    async fn test_stale_ticket_skips_second_refresh() {
        let refreshes = Arc::new(AtomicUsize::new(0));
        let refreshes_clone = refreshes.clone();
        let transport = MockTransport::new(move |req| {
            if req.url.ends_with("v1/auth/login") {
                Ok(json_response(200, token_body("acc-1", "ref-1")))
            } else if req.url.ends_with("v1/auth/refresh") {
                refreshes_clone.fetch_add(1, Ordering::SeqCst);
                Ok(json_response(200, token_body("acc-2", "ref-2")))
            } else {
                Ok(empty_response(200))
            }
        });
        let server = ServerContext::new("http://x");
        let auth = Authentication::new("alice", "secret");

        let mut req = HttpRequest::new(Method::Get, server.build("v1/users"));
        let ticket = auth.attach(&transport, &server, &mut req).await.unwrap();

        // Two rejection reports for the same generation: only the first
        // refreshes, the second sees the bumped generation and just retries.
        assert!(auth
            .handle_rejection(&transport, &server, ticket)
            .await
            .unwrap());
        assert!(auth
            .handle_rejection(&transport, &server, ticket)
            .await
            .unwrap());
        assert_eq!(refreshes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_refresh_without_refresh_token_fails() {
        let transport = MockTransport::new(|req| {
            if req.url.ends_with("v1/auth/login") {
                // Login that yields no refresh token
                Ok(json_response(200, json!({ "access": "acc-1" })))
            } else {
                Ok(empty_response(200))
            }
        });
        let server = ServerContext::new("http://x");
        let auth = Authentication::new("alice", "secret");

        let mut req = HttpRequest::new(Method::Get, server.build("v1/users"));
        let ticket = auth.attach(&transport, &server, &mut req).await.unwrap();

        let retry = auth
            .handle_rejection(&transport, &server, ticket)
            .await
            .unwrap();
        assert!(!retry);
        assert_eq!(auth.state().await, AuthState::Failed);
    }

    #[tokio::test]
    async fn test_logout_clears_tokens_and_relogs_in() {
        let transport = login_only_transport();
        let server = ServerContext::new("http://x");
        let auth = Authentication::new("alice", "secret");

        let mut req = HttpRequest::new(Method::Get, server.build("v1/users"));
        let stale_ticket = auth.attach(&transport, &server, &mut req).await.unwrap();

        auth.logout().await;
        assert_eq!(auth.state().await, AuthState::Unauthenticated);

        // A rejection of a pre-logout request does not refresh the new session
        let retry = auth
            .handle_rejection(&transport, &server, stale_ticket)
            .await
            .unwrap();
        assert!(!retry);

        // The next attach performs a fresh login
        let mut again = HttpRequest::new(Method::Get, server.build("v1/users"));
        auth.attach(&transport, &server, &mut again).await.unwrap();
        let logins = transport
            .requests()
            .iter()
            .filter(|r| r.url.ends_with("v1/auth/login"))
            .count();
        assert_eq!(logins, 2);
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let creds = Credentials::new("alice", "hunter2");
        let debug = format!("{:?}", creds);
        assert!(debug.contains("alice"));
        assert!(!debug.contains("hunter2"));
    }
}
