use std::future::Future;

use docblocks_reorder::Ordered;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entity::EntityKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// The atomic entity kind an upload of this file becomes.
    pub fn media_kind(&self) -> EntityKind {
        if self.mime_type.starts_with("image/") {
            EntityKind::Image
        } else if self.mime_type.starts_with("video/") {
            EntityKind::Video
        } else {
            EntityKind::File
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadOptions {
    #[serde(default)]
    pub document_id: Option<String>,
    #[serde(default)]
    pub public: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedObject {
    pub presigned_object_url: String,
}

/// A workspace navigation node (document, folder, board).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Unit {
    pub id: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub order: usize,
}

impl Ordered for Unit {
    type Id = String;

    fn id(&self) -> &String {
        &self.id
    }

    fn set_order(&mut self, order: usize) {
        self.order = order;
    }
}

/// Collaborator failures. The display string is what the user sees inline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollaboratorError {
    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Could not create the task board: {0}")]
    TaskBoard(String),

    #[error("Could not create the document: {0}")]
    Document(String),

    #[error("The service is unavailable, try again later")]
    Unavailable,
}

pub trait UploadService {
    fn upload_image(
        &self,
        file: &UploadFile,
        workspace_id: &str,
        options: &UploadOptions,
    ) -> impl Future<Output = Result<UploadedObject, CollaboratorError>>;
}

pub trait TaskBoardService {
    /// Returns the new board id.
    fn create_task_board(
        &self,
        unit_id: &str,
    ) -> impl Future<Output = Result<String, CollaboratorError>>;
}

pub trait DocumentService {
    fn create_document(
        &self,
        parent_id: &str,
        id: &str,
    ) -> impl Future<Output = Result<Unit, CollaboratorError>>;
}
