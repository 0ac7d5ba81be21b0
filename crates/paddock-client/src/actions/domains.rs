//! Problem-domain catalogue (read-only)

use paddock_core::{Domain, Result};
use std::sync::Arc;

use super::Action;
use crate::client::ResourceKind;
use crate::connection::Connection;

const DOMAINS_PATH: &str = "v1/domains";

/// Handler for the server's problem-domain catalogue
pub struct DomainsAction {
    connection: Arc<Connection>,
}

impl DomainsAction {
    pub(crate) fn new(connection: Arc<Connection>) -> Self {
        Self { connection }
    }

    /// List all known problem domains
    pub async fn list(&self) -> Result<Vec<Domain>> {
        self.connection.get_json(DOMAINS_PATH).await
    }

    /// Load a single problem domain by primary key
    pub async fn get(&self, pk: i64) -> Result<Domain> {
        self.connection
            .get_json(&format!("{}/{}", DOMAINS_PATH, pk))
            .await
    }
}

impl Action for DomainsAction {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Domains
    }

    fn connection(&self) -> &Arc<Connection> {
        &self.connection
    }
}
