//! License management

use paddock_core::{License, LicenseCreate, Result};
use std::sync::Arc;

use super::Action;
use crate::client::ResourceKind;
use crate::connection::Connection;

const LICENSES_PATH: &str = "v1/licenses";

/// Handler for dataset licenses
pub struct LicensesAction {
    connection: Arc<Connection>,
}

impl LicensesAction {
    pub(crate) fn new(connection: Arc<Connection>) -> Self {
        Self { connection }
    }

    /// List all licenses
    pub async fn list(&self) -> Result<Vec<License>> {
        self.connection.get_json(LICENSES_PATH).await
    }

    /// Load a single license by primary key
    pub async fn get(&self, pk: i64) -> Result<License> {
        self.connection
            .get_json(&format!("{}/{}", LICENSES_PATH, pk))
            .await
    }

    /// Register a new license
    pub async fn create(&self, payload: &LicenseCreate) -> Result<License> {
        self.connection.post_json(LICENSES_PATH, payload).await
    }

    /// Delete a license
    pub async fn delete(&self, pk: i64) -> Result<()> {
        self.connection
            .delete(&format!("{}/{}", LICENSES_PATH, pk))
            .await
    }
}

impl Action for LicensesAction {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Licenses
    }

    fn connection(&self) -> &Arc<Connection> {
        &self.connection
    }
}
