//! Project management

use paddock_core::{Project, ProjectCreate, Result};
use std::sync::Arc;

use super::Action;
use crate::client::ResourceKind;
use crate::connection::Connection;

const PROJECTS_PATH: &str = "v1/projects";

/// Handler for projects
pub struct ProjectsAction {
    connection: Arc<Connection>,
}

impl ProjectsAction {
    pub(crate) fn new(connection: Arc<Connection>) -> Self {
        Self { connection }
    }

    /// List all projects
    pub async fn list(&self) -> Result<Vec<Project>> {
        self.connection.get_json(PROJECTS_PATH).await
    }

    /// Load a single project by primary key
    pub async fn get(&self, pk: i64) -> Result<Project> {
        self.connection
            .get_json(&format!("{}/{}", PROJECTS_PATH, pk))
            .await
    }

    /// Create a new project
    pub async fn create(&self, payload: &ProjectCreate) -> Result<Project> {
        self.connection.post_json(PROJECTS_PATH, payload).await
    }

    /// Delete a project
    pub async fn delete(&self, pk: i64) -> Result<()> {
        self.connection
            .delete(&format!("{}/{}", PROJECTS_PATH, pk))
            .await
    }
}

impl Action for ProjectsAction {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Projects
    }

    fn connection(&self) -> &Arc<Connection> {
        &self.connection
    }
}
