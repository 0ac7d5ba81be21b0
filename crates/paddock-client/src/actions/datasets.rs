//! Dataset management, including file transfer
//!
//! Besides plain CRUD, datasets carry their files: individual files are
//! uploaded and downloaded by name, and a whole dataset can be downloaded
//! as one archive or copied server-side into a new version.

use paddock_core::{Dataset, DatasetCreate, DatasetUpdate, Result};
use serde_json::json;
use std::sync::Arc;

use super::Action;
use crate::client::ResourceKind;
use crate::connection::Connection;

const DATASETS_PATH: &str = "v1/datasets";

/// Handler for datasets
pub struct DatasetsAction {
    connection: Arc<Connection>,
}

impl DatasetsAction {
    pub(crate) fn new(connection: Arc<Connection>) -> Self {
        Self { connection }
    }

    /// List all datasets visible to the authenticated user
    pub async fn list(&self) -> Result<Vec<Dataset>> {
        self.connection.get_json(DATASETS_PATH).await
    }

    /// Load a single dataset by primary key
    pub async fn get(&self, pk: i64) -> Result<Dataset> {
        self.connection
            .get_json(&format!("{}/{}", DATASETS_PATH, pk))
            .await
    }

    /// Create a new dataset
    pub async fn create(&self, payload: &DatasetCreate) -> Result<Dataset> {
        self.connection.post_json(DATASETS_PATH, payload).await
    }

    /// Partially update a dataset; absent fields are left unchanged
    pub async fn update(&self, pk: i64, payload: &DatasetUpdate) -> Result<Dataset> {
        self.connection
            .patch_json(&format!("{}/{}", DATASETS_PATH, pk), payload)
            .await
    }

    /// Delete a dataset (the server soft-deletes; see [`Dataset::is_deleted`])
    pub async fn delete(&self, pk: i64) -> Result<()> {
        self.connection
            .delete(&format!("{}/{}", DATASETS_PATH, pk))
            .await
    }

    /// Copy a dataset server-side under a new name, yielding the copy
    pub async fn copy(&self, pk: i64, new_name: &str) -> Result<Dataset> {
        self.connection
            .post_json(
                &format!("{}/{}/copy", DATASETS_PATH, pk),
                &json!({ "name": new_name }),
            )
            .await
    }

    /// Download the whole dataset as one archive
    pub async fn download(&self, pk: i64) -> Result<Vec<u8>> {
        self.connection
            .get_bytes(&format!("{}/{}/download", DATASETS_PATH, pk))
            .await
    }

    /// Upload one file into the dataset under the given name
    pub async fn upload_file(&self, pk: i64, filename: &str, data: Vec<u8>) -> Result<()> {
        self.connection
            .post_bytes(
                &self.file_path(pk, filename),
                "application/octet-stream",
                data,
            )
            .await
    }

    /// Download one file from the dataset by name
    pub async fn download_file(&self, pk: i64, filename: &str) -> Result<Vec<u8>> {
        self.connection.get_bytes(&self.file_path(pk, filename)).await
    }

    /// Delete one file from the dataset by name
    pub async fn delete_file(&self, pk: i64, filename: &str) -> Result<()> {
        self.connection.delete(&self.file_path(pk, filename)).await
    }

    fn file_path(&self, pk: i64, filename: &str) -> String {
        format!(
            "{}/{}/files/{}",
            DATASETS_PATH,
            pk,
            urlencoding::encode(filename)
        )
    }
}

impl Action for DatasetsAction {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Datasets
    }

    fn connection(&self) -> &Arc<Connection> {
        &self.connection
    }
}
