//! Server location and endpoint URL construction

/// Holds the backend base URL and builds full endpoint URLs from relative
/// paths.
///
/// The stored base never ends with a trailing slash, so [`build`] always
/// joins with exactly one separator regardless of how the URL was written.
/// Syntactic URL validation is left to the transport on first use.
///
/// [`build`]: ServerContext::build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerContext {
    base_url: String,
}

impl ServerContext {
    /// Create a context for the given base URL, stripping one trailing `/`
    /// if present.
    pub fn new(url: &str) -> Self {
        let base_url = url.strip_suffix('/').unwrap_or(url).to_string();
        Self { base_url }
    }

    /// The stored base URL (no trailing slash)
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a full endpoint URL from a relative path.
    ///
    /// Pure and idempotent: repeated calls with the same path yield the same
    /// URL, with exactly one `/` at the join point even when the URL was
    /// written with extra trailing slashes.
    pub fn build(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = path.strip_prefix('/').unwrap_or(path);
        format!("{}/{}", base, path)
    }
}

impl Default for ServerContext {
    fn default() -> Self {
        Self::new("http://localhost:8000")
    }
}
