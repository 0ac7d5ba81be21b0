//! Team management

use paddock_core::{Result, Team, TeamCreate};
use std::sync::Arc;

use super::Action;
use crate::client::ResourceKind;
use crate::connection::Connection;

const TEAMS_PATH: &str = "v1/teams";

/// Handler for teams
pub struct TeamsAction {
    connection: Arc<Connection>,
}

impl TeamsAction {
    pub(crate) fn new(connection: Arc<Connection>) -> Self {
        Self { connection }
    }

    /// List all teams
    pub async fn list(&self) -> Result<Vec<Team>> {
        self.connection.get_json(TEAMS_PATH).await
    }

    /// Load a single team by primary key
    pub async fn get(&self, pk: i64) -> Result<Team> {
        self.connection
            .get_json(&format!("{}/{}", TEAMS_PATH, pk))
            .await
    }

    /// Create a new team
    pub async fn create(&self, payload: &TeamCreate) -> Result<Team> {
        self.connection.post_json(TEAMS_PATH, payload).await
    }

    /// Delete a team
    pub async fn delete(&self, pk: i64) -> Result<()> {
        self.connection
            .delete(&format!("{}/{}", TEAMS_PATH, pk))
            .await
    }
}

impl Action for TeamsAction {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Teams
    }

    fn connection(&self) -> &Arc<Connection> {
        &self.connection
    }
}
