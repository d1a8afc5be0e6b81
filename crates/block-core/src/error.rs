use thiserror::Error;

use crate::core::{BlockKey, BlockKind};
use crate::keys::BlockCommand;

pub type EditorResult<T> = Result<T, EditorError>;

#[derive(Debug, Error)]
pub enum EditorError {
    /// A block reached dispatch with no plugin able to handle it.
    #[error("no plugin registered for block `{key}` of kind `{kind}`")]
    MissingPlugin { key: BlockKey, kind: BlockKind },

    #[error("plugin `{plugin}` does not handle `{command}`")]
    CommandNotHandled {
        command: BlockCommand,
        plugin: &'static str,
    },

    #[error("on-change hooks did not settle after {iterations} passes")]
    NormalizeDidNotConverge { iterations: usize },

    #[error("invalid document: {0}")]
    InvalidDocument(String),

    #[error("invalid editor config")]
    Config(#[source] serde_json::Error),

    #[error(transparent)]
    Serde(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("duplicate plugin id: {0}")]
    DuplicatePlugin(&'static str),

    #[error("duplicate input transform id: {0}")]
    DuplicateTransform(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("selection points at unknown block `{0}`")]
    UnknownBlock(String),

    #[error("document has no blocks")]
    EmptyDocument,
}
