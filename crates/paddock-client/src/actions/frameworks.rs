//! Framework catalogue (read-only)

use paddock_core::{Framework, Result};
use std::sync::Arc;

use super::Action;
use crate::client::ResourceKind;
use crate::connection::Connection;

const FRAMEWORKS_PATH: &str = "v1/frameworks";

/// Handler for the server's framework catalogue
pub struct FrameworksAction {
    connection: Arc<Connection>,
}

impl FrameworksAction {
    pub(crate) fn new(connection: Arc<Connection>) -> Self {
        Self { connection }
    }

    /// List all known frameworks
    pub async fn list(&self) -> Result<Vec<Framework>> {
        self.connection.get_json(FRAMEWORKS_PATH).await
    }

    /// Load a single framework by primary key
    pub async fn get(&self, pk: i64) -> Result<Framework> {
        self.connection
            .get_json(&format!("{}/{}", FRAMEWORKS_PATH, pk))
            .await
    }
}

impl Action for FrameworksAction {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Frameworks
    }

    fn connection(&self) -> &Arc<Connection> {
        &self.connection
    }
}
