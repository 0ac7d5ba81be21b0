//! The shared connection: transport + server location + authentication
//!
//! One [`Connection`] is shared by every action of a client. It owns the
//! transport session (created once, reused for its whole life), the current
//! [`ServerContext`], and the current [`Authentication`]. Replacing the
//! server or the credentials never recreates the transport, so connection
//! pooling survives reconfiguration.
//!
//! # Usage contract
//!
//! [`set_server`] and [`set_credentials`] are not safe to race with in-flight
//! requests issued under the previous configuration. Reconfigure before
//! issuing concurrent work, not interleaved with it.
//!
//! [`set_server`]: Connection::set_server
//! [`set_credentials`]: Connection::set_credentials

use paddock_core::{ClientConfig, PaddockError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::auth::Authentication;
use crate::server::ServerContext;
use crate::transport::{HttpRequest, HttpResponse, Method, ReqwestTransport, Transport};

/// Bundle of transport session, server location, and authentication state
/// shared by all actions of one client.
pub struct Connection {
    transport: Arc<dyn Transport>,
    server: RwLock<ServerContext>,
    auth: RwLock<Arc<Authentication>>,
    closed: AtomicBool,
}

impl Connection {
    /// Create a connection with a default server context and blank
    /// credentials.
    pub fn new() -> Result<Self> {
        let transport = ReqwestTransport::new(Duration::from_secs(30))?;
        Ok(Self::with_transport(Arc::new(transport)))
    }

    /// Create a connection configured from a [`ClientConfig`]
    pub fn with_config(config: &ClientConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(Duration::from_secs(config.timeout_secs))?;
        Ok(Self::with_transport(Arc::new(transport))
            .with_server(&config.server_url)
            .with_credentials(&config.username, &config.password))
    }

    /// Create a connection over a caller-supplied transport
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            server: RwLock::new(ServerContext::default()),
            auth: RwLock::new(Arc::new(Authentication::blank())),
            closed: AtomicBool::new(false),
        }
    }

    /// Fluent: point the connection at `url`
    pub fn with_server(self, url: &str) -> Self {
        self.set_server(url);
        self
    }

    /// Fluent: install fresh credentials
    pub fn with_credentials(self, username: &str, password: &str) -> Self {
        self.set_credentials(username, password);
        self
    }

    /// Replace the server context.
    ///
    /// The existing authentication automatically targets the new server on
    /// its next login/refresh call; its state and tokens are left untouched
    /// (a token obtained from the old server stays attached until the next
    /// request reveals it is invalid). The transport is untouched.
    ///
    /// Must not race with in-flight requests (see module docs).
    pub fn set_server(&self, url: &str) -> &Self {
        *self.server.write().expect("server lock poisoned") = ServerContext::new(url);
        self
    }

    /// Replace the authentication wholesale: fresh unauthenticated state with
    /// the given credentials. The transport is untouched.
    ///
    /// Must not race with in-flight requests (see module docs).
    pub fn set_credentials(&self, username: &str, password: &str) -> &Self {
        *self.auth.write().expect("auth lock poisoned") =
            Arc::new(Authentication::new(username, password));
        self
    }

    /// The shared transport session
    pub fn transport(&self) -> Arc<dyn Transport> {
        self.transport.clone()
    }

    /// Snapshot of the current server context
    pub fn server(&self) -> ServerContext {
        self.server.read().expect("server lock poisoned").clone()
    }

    /// The current authentication
    pub fn authentication(&self) -> Arc<Authentication> {
        self.auth.read().expect("auth lock poisoned").clone()
    }

    /// Release the connection. Idempotent; all operations fail with
    /// [`PaddockError::Closed`] afterwards.
    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            tracing::debug!("Connection closed");
        }
    }

    /// Whether [`close`](Connection::close) has been called
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Send an authenticated request, refreshing the token and retrying
    /// exactly once if the server rejects the attached access token.
    ///
    /// When the refresh itself fails, the original request's failure is what
    /// propagates to the caller, never a wrapped refresh error.
    pub async fn execute(&self, mut request: HttpRequest) -> Result<HttpResponse> {
        if self.is_closed() {
            return Err(PaddockError::Closed);
        }

        let auth = self.authentication();
        let server = self.server();

        tracing::debug!(method = %request.method, url = %request.url, "Dispatching request");

        let ticket = auth
            .attach(self.transport.as_ref(), &server, &mut request)
            .await?;
        let response = self.transport.send(&request).await?;

        if response.status != 401 {
            return into_result(response);
        }

        if auth
            .handle_rejection(self.transport.as_ref(), &server, ticket)
            .await?
        {
            auth.attach(self.transport.as_ref(), &server, &mut request)
                .await?;
            let retried = self.transport.send(&request).await?;
            return into_result(retried);
        }

        into_result(response)
    }

    /// GET `path` and deserialize the JSON response
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let request = HttpRequest::new(Method::Get, self.server().build(path));
        self.execute(request).await?.json()
    }

    /// POST `body` as JSON to `path` and deserialize the JSON response
    pub async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let request = HttpRequest::new(Method::Post, self.server().build(path))
            .with_json(serde_json::to_value(body)?);
        self.execute(request).await?.json()
    }

    /// PATCH `body` as JSON to `path` and deserialize the JSON response
    pub async fn patch_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let request = HttpRequest::new(Method::Patch, self.server().build(path))
            .with_json(serde_json::to_value(body)?);
        self.execute(request).await?.json()
    }

    /// DELETE `path`, expecting an empty success response
    pub async fn delete(&self, path: &str) -> Result<()> {
        let request = HttpRequest::new(Method::Delete, self.server().build(path));
        self.execute(request).await?;
        Ok(())
    }

    /// GET `path` and return the raw response body
    pub async fn get_bytes(&self, path: &str) -> Result<Vec<u8>> {
        let request = HttpRequest::new(Method::Get, self.server().build(path));
        Ok(self.execute(request).await?.body)
    }

    /// POST a raw body to `path`, expecting a success response
    pub async fn post_bytes(&self, path: &str, content_type: &str, data: Vec<u8>) -> Result<()> {
        let request = HttpRequest::new(Method::Post, self.server().build(path))
            .with_bytes(content_type, data);
        self.execute(request).await?;
        Ok(())
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("server", &self.server())
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

/// Map a final response to the caller-visible result: 2xx passes through,
/// auth-failure statuses become authentication errors, everything else an
/// API error.
fn into_result(response: HttpResponse) -> Result<HttpResponse> {
    if response.is_success() {
        Ok(response)
    } else if matches!(response.status, 401 | 403) {
        Err(PaddockError::Auth(format!(
            "Request rejected by server (HTTP {})",
            response.status
        )))
    } else {
        Err(PaddockError::Api {
            status: response.status,
            message: response.text(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::mock::{empty_response, json_response, MockTransport};
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;

    fn token_body(access: &str, refresh: &str) -> serde_json::Value {
        json!({ "access": access, "refresh": refresh })
    }

    /// Transport where the data endpoint accepts only the given bearer token
    fn transport_requiring(valid_token: &'static str) -> MockTransport {
        MockTransport::new(move |req| {
            if req.url.ends_with("v1/auth/login") {
                Ok(json_response(200, token_body("stale", "ref-1")))
            } else if req.url.ends_with("v1/auth/refresh") {
                Ok(json_response(200, token_body(valid_token, "ref-2")))
            } else if req.header("Authorization") == Some(&format!("Bearer {}", valid_token)) {
                Ok(json_response(200, json!([])))
            } else {
                Ok(empty_response(401))
            }
        })
    }

    fn connected(transport: Arc<dyn Transport>) -> Connection {
        Connection::with_transport(transport)
            .with_server("http://x")
            .with_credentials("alice", "secret")
    }

    #[tokio::test]
    async fn test_execute_refreshes_and_retries_once() {
        let transport = Arc::new(transport_requiring("fresh"));
        let conn = connected(transport.clone());

        // Login yields a stale token, the data call 401s, refresh yields the
        // valid one, and the retry succeeds - all within one execute.
        let users: Vec<paddock_core::User> = conn.get_json("v1/users").await.unwrap();
        assert!(users.is_empty());

        let urls: Vec<String> = transport.requests().iter().map(|r| r.url.clone()).collect();
        let data_calls = urls.iter().filter(|u| u.ends_with("v1/users")).count();
        let refreshes = urls.iter().filter(|u| u.ends_with("v1/auth/refresh")).count();
        assert_eq!(data_calls, 2, "original call plus exactly one retry");
        assert_eq!(refreshes, 1);
    }

    #[tokio::test]
    async fn test_failed_refresh_propagates_original_failure() {
        let transport = Arc::new(MockTransport::new(|req| {
            if req.url.ends_with("v1/auth/login") {
                Ok(json_response(200, token_body("stale", "ref-1")))
            } else if req.url.ends_with("v1/auth/refresh") {
                Ok(empty_response(401))
            } else {
                Ok(empty_response(401))
            }
        }));
        let conn = connected(transport.clone());

        let err = conn.get_json::<Vec<paddock_core::User>>("v1/users").await.unwrap_err();
        // The original request's auth failure, not a refresh-specific error
        assert!(matches!(err, PaddockError::Auth(_)));

        // No retry of the data call happened
        let data_calls = transport
            .requests()
            .iter()
            .filter(|r| r.url.ends_with("v1/users"))
            .count();
        assert_eq!(data_calls, 1);

        // The next call fails fast without another refresh attempt
        let before = transport.send_count();
        let err2 = conn.get_json::<Vec<paddock_core::User>>("v1/users").await.unwrap_err();
        assert!(matches!(err2, PaddockError::Auth(_)));
        assert_eq!(transport.send_count(), before);
    }

    #[tokio::test]
    async fn test_set_server_retargets_without_new_transport() {
        let sends = Arc::new(AtomicUsize::new(0));
        let sends_clone = sends.clone();
        let transport = Arc::new(MockTransport::new(move |req| {
            sends_clone.fetch_add(1, Ordering::SeqCst);
            if req.url.ends_with("v1/auth/login") {
                Ok(json_response(200, token_body("acc", "ref")))
            } else {
                Ok(json_response(200, json!([])))
            }
        }));
        let conn = connected(transport.clone());

        let _: Vec<paddock_core::User> = conn.get_json("v1/users").await.unwrap();
        conn.set_server("http://second.example.com");
        let _: Vec<paddock_core::User> = conn.get_json("v1/users").await.unwrap();

        let urls: Vec<String> = transport.requests().iter().map(|r| r.url.clone()).collect();
        assert!(urls
            .iter()
            .any(|u| u == "http://second.example.com/v1/users"));
        // Every request flowed through the one transport instance
        assert_eq!(sends.load(Ordering::SeqCst), transport.send_count());
    }

    #[tokio::test]
    async fn test_set_server_preserves_tokens() {
        let transport = Arc::new(MockTransport::new(|req| {
            if req.url.ends_with("v1/auth/login") {
                Ok(json_response(200, token_body("acc", "ref")))
            } else {
                Ok(json_response(200, json!([])))
            }
        }));
        let conn = connected(transport.clone());

        let _: Vec<paddock_core::User> = conn.get_json("v1/users").await.unwrap();
        let auth_before = conn.authentication();
        conn.set_server("http://second.example.com");

        // Same Authentication instance, still authenticated
        assert!(Arc::ptr_eq(&auth_before, &conn.authentication()));
        let logins = transport
            .requests()
            .iter()
            .filter(|r| r.url.ends_with("v1/auth/login"))
            .count();
        let _: Vec<paddock_core::User> = conn.get_json("v1/users").await.unwrap();
        let logins_after = transport
            .requests()
            .iter()
            .filter(|r| r.url.ends_with("v1/auth/login"))
            .count();
        assert_eq!(logins, logins_after, "no re-login after server change");
    }

    #[tokio::test]
    async fn test_set_credentials_installs_fresh_authentication() {
        let transport = Arc::new(MockTransport::new(|_| Ok(empty_response(401))));
        let conn = connected(transport.clone());

        // Bad credentials fail terminally...
        let err = conn.get_json::<Vec<paddock_core::User>>("v1/users").await.unwrap_err();
        assert!(matches!(err, PaddockError::Auth(_)));

        // ...but replacing them resets the state machine
        conn.set_credentials("bob", "better-secret");
        assert_eq!(
            conn.authentication().state().await,
            crate::auth::AuthState::Unauthenticated
        );
    }

    #[tokio::test]
    async fn test_close_is_idempotent_and_terminal() {
        let transport = Arc::new(MockTransport::new(|_| Ok(empty_response(200))));
        let conn = connected(transport.clone());

        conn.close();
        conn.close();
        assert!(conn.is_closed());

        let err = conn.get_json::<Vec<paddock_core::User>>("v1/users").await.unwrap_err();
        assert!(matches!(err, PaddockError::Closed));
        assert_eq!(transport.send_count(), 0);
    }

    #[tokio::test]
    async fn test_non_auth_api_error_passes_through() {
        let transport = Arc::new(MockTransport::new(|req| {
            if req.url.ends_with("v1/auth/login") {
                Ok(json_response(200, token_body("acc", "ref")))
            } else {
                Ok(HttpResponse {
                    status: 404,
                    headers: Vec::new(),
                    body: b"no such dataset".to_vec(),
                })
            }
        }));
        let conn = connected(transport);

        let err = conn.get_json::<paddock_core::Dataset>("v1/datasets/99").await.unwrap_err();
        match err {
            PaddockError::Api { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "no such dataset");
            }
            other => panic!("expected Api error, got {:?}", other),
        }
    }
}
