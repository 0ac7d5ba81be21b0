//! User account management

use paddock_core::{Result, User, UserCreate, UserUpdate};
use std::sync::Arc;

use super::Action;
use crate::client::ResourceKind;
use crate::connection::Connection;

const USERS_PATH: &str = "v1/users";

/// Handler for user accounts
pub struct UsersAction {
    connection: Arc<Connection>,
}

impl UsersAction {
    pub(crate) fn new(connection: Arc<Connection>) -> Self {
        Self { connection }
    }

    /// List all users
    pub async fn list(&self) -> Result<Vec<User>> {
        self.connection.get_json(USERS_PATH).await
    }

    /// Load a single user by primary key
    pub async fn get(&self, pk: i64) -> Result<User> {
        self.connection
            .get_json(&format!("{}/{}", USERS_PATH, pk))
            .await
    }

    /// Create a new user
    pub async fn create(&self, payload: &UserCreate) -> Result<User> {
        self.connection.post_json(USERS_PATH, payload).await
    }

    /// Partially update a user; absent fields are left unchanged
    pub async fn update(&self, pk: i64, payload: &UserUpdate) -> Result<User> {
        self.connection
            .patch_json(&format!("{}/{}", USERS_PATH, pk), payload)
            .await
    }

    /// Delete a user
    pub async fn delete(&self, pk: i64) -> Result<()> {
        self.connection
            .delete(&format!("{}/{}", USERS_PATH, pk))
            .await
    }
}

impl Action for UsersAction {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Users
    }

    fn connection(&self) -> &Arc<Connection> {
        &self.connection
    }
}
