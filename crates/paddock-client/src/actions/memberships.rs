//! Team membership management
//!
//! Memberships are addressed per team and username; permission levels are
//! one of read/write/admin.

use paddock_core::{Membership, Permissions, Result};
use serde_json::json;
use std::sync::Arc;

use super::Action;
use crate::client::ResourceKind;
use crate::connection::Connection;

const MEMBERSHIPS_PATH: &str = "v1/memberships";

/// Handler for team memberships
pub struct MembershipsAction {
    connection: Arc<Connection>,
}

impl MembershipsAction {
    pub(crate) fn new(connection: Arc<Connection>) -> Self {
        Self { connection }
    }

    /// List all memberships visible to the authenticated user
    pub async fn list(&self) -> Result<Vec<Membership>> {
        self.connection.get_json(MEMBERSHIPS_PATH).await
    }

    /// Add a user to a team with the given permissions
    pub async fn add(
        &self,
        team_pk: i64,
        username: &str,
        permissions: Permissions,
    ) -> Result<Membership> {
        self.connection
            .post_json(
                &format!("v1/teams/{}/memberships", team_pk),
                &json!({ "username": username, "permissions": permissions }),
            )
            .await
    }

    /// Change a user's permissions within a team
    pub async fn modify(
        &self,
        team_pk: i64,
        username: &str,
        permissions: Permissions,
    ) -> Result<Membership> {
        self.connection
            .patch_json(
                &self.member_path(team_pk, username),
                &json!({ "permissions": permissions }),
            )
            .await
    }

    /// Remove a user from a team
    pub async fn remove(&self, team_pk: i64, username: &str) -> Result<()> {
        self.connection
            .delete(&self.member_path(team_pk, username))
            .await
    }

    fn member_path(&self, team_pk: i64, username: &str) -> String {
        format!(
            "v1/teams/{}/memberships/{}",
            team_pk,
            urlencoding::encode(username)
        )
    }
}

impl Action for MembershipsAction {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Memberships
    }

    fn connection(&self) -> &Arc<Connection> {
        &self.connection
    }
}
