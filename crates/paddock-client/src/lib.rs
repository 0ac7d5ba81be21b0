//! # paddock-client
//!
//! Client for a remote machine-learning-dataset management backend.
//!
//! One [`Client`] owns one [`Connection`]: a shared HTTP transport, the
//! current server location, and the authentication state every request
//! depends on. Resource actions (users, datasets, projects, ...) are
//! instantiated lazily, cached per client, and all borrow the same
//! connection, so the token obtained by one action is reused by every other.
//!
//! ## Token lifecycle
//!
//! The first authenticated request logs in with the configured credentials
//! and stores the access/refresh token pair. When the server rejects an
//! access token (HTTP 401), the rejected request triggers a refresh and is
//! retried exactly once; concurrent requests that hit the same rejection
//! coalesce on a single refresh call and share its outcome.
//!
//! ## Example
//!
//! ```no_run
//! use paddock_client::{Client, Connection};
//!
//! # async fn example() -> paddock_core::Result<()> {
//! let connection = Connection::new()?
//!     .with_server("https://data.example.com")
//!     .with_credentials("alice", "secret");
//! let client = Client::with_connection(connection);
//!
//! let datasets = client.datasets().list().await?;
//! for ds in datasets {
//!     println!("{} (v{})", ds.name, ds.version);
//! }
//! client.close();
//! # Ok(())
//! # }
//! ```

pub mod actions;
mod auth;
mod client;
mod connection;
mod server;
mod transport;

pub use actions::Action;
pub use auth::{AuthState, AuthTicket, Authentication, Credentials, TokenPair};
pub use client::{Client, ResourceKind};
pub use connection::Connection;
pub use server::ServerContext;
pub use transport::{Body, HttpRequest, HttpResponse, Method, ReqwestTransport, Transport};
