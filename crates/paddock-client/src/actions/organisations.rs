//! Organisation management

use paddock_core::{Organisation, OrganisationCreate, Result};
use std::sync::Arc;

use super::Action;
use crate::client::ResourceKind;
use crate::connection::Connection;

const ORGANISATIONS_PATH: &str = "v1/organisations";

/// Handler for organisations
pub struct OrganisationsAction {
    connection: Arc<Connection>,
}

impl OrganisationsAction {
    pub(crate) fn new(connection: Arc<Connection>) -> Self {
        Self { connection }
    }

    /// List all organisations
    pub async fn list(&self) -> Result<Vec<Organisation>> {
        self.connection.get_json(ORGANISATIONS_PATH).await
    }

    /// Load a single organisation by primary key
    pub async fn get(&self, pk: i64) -> Result<Organisation> {
        self.connection
            .get_json(&format!("{}/{}", ORGANISATIONS_PATH, pk))
            .await
    }

    /// Create a new organisation
    pub async fn create(&self, payload: &OrganisationCreate) -> Result<Organisation> {
        self.connection.post_json(ORGANISATIONS_PATH, payload).await
    }

    /// Delete an organisation
    pub async fn delete(&self, pk: i64) -> Result<()> {
        self.connection
            .delete(&format!("{}/{}", ORGANISATIONS_PATH, pk))
            .await
    }
}

impl Action for OrganisationsAction {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Organisations
    }

    fn connection(&self) -> &Arc<Connection> {
        &self.connection
    }
}
