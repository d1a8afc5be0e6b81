use docblocks_core::{BlockData, BlockKey, BlockKind, CommentThread, EntityKey, EntityKind, InlineStyles};
use serde::Serialize;

/// A run of characters sharing styles and entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextRun {
    pub text: String,
    pub styles: InlineStyles,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<EntityKey>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockBody {
    Text {
        runs: Vec<TextRun>,
    },
    Table {
        rows: Vec<Vec<String>>,
    },
    Divider {
        dashed: bool,
    },
    /// `url` is the typed text until the embed is confirmed, then the entity URL.
    Embed {
        url: String,
        live: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    Atomic {
        kind: Option<EntityKind>,
        data: BlockData,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ListMarker {
    Bullet,
    Number { index: usize },
    Check { checked: bool },
    Toggle { open: bool },
}

/// Counts shown by the comment overlay, with the threads it can act on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentOverlay {
    pub threads: Vec<EntityKey>,
    pub comments: usize,
    pub replies: usize,
}

impl CommentOverlay {
    pub fn from_threads(threads: &[CommentThread]) -> Self {
        let comments = threads.iter().map(|t| t.comments.len()).sum();
        let replies = threads
            .iter()
            .flat_map(|t| t.comments.iter())
            .map(|c| c.replies.len())
            .sum();
        Self {
            threads: threads.iter().map(|t| t.entity_key).collect(),
            comments,
            replies,
        }
    }

    pub fn message_count(&self) -> usize {
        self.comments + self.replies
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DragHandle {
    pub key: BlockKey,
    pub enabled: bool,
}

/// What a host needs to draw one block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockView {
    pub key: BlockKey,
    pub kind: BlockKind,
    pub depth: usize,
    pub classes: Vec<String>,
    pub body: BlockBody,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<ListMarker>,
    pub readonly: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<CommentOverlay>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drag_handle: Option<DragHandle>,
}

impl BlockView {
    pub fn plain_text(&self) -> String {
        match &self.body {
            BlockBody::Text { runs } => runs.iter().map(|r| r.text.as_str()).collect(),
            BlockBody::Embed { url, .. } => url.clone(),
            BlockBody::Table { rows } => rows
                .iter()
                .map(|row| row.join(" | "))
                .collect::<Vec<_>>()
                .join("\n"),
            BlockBody::Divider { .. } | BlockBody::Atomic { .. } => String::new(),
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}
