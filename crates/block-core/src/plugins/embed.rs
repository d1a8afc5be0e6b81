use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::config::EditorConfig;
use crate::core::{Block, BlockData, BlockKey, BlockKind, DataPatch, EditorState, Point, Selection};
use crate::entity::{Entity, EntityKind, EntityMutability};
use crate::keys::{BlockCommand, Key, KeyPress};
use crate::ops;
use crate::plugin::BlockPlugin;
use crate::selection::CursorContext;

use super::{handle_atomic_command, plain, reset_to_text, text_block_after};

static FIGMA_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https://([\w-]+\.)?figma\.com/(file|proto|design|board)/[\w-]+").unwrap()
});
static MIRO_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https://miro\.com/app/board/[\w=-]+").unwrap());
static GOOGLE_DRIVE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https://(drive|docs)\.google\.com/(file|document|spreadsheets|presentation|drive)/")
        .unwrap()
});
static TRELLO_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https://trello\.com/[bc]/[\w-]+").unwrap());
static LOOM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https://(www\.)?loom\.com/(share|embed)/[\w-]+").unwrap());
static BOOKMARK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://[^\s/$.?#][^\s]*\.[^\s]+$").unwrap());

/// Whether `url` is acceptable for the given embed kind.
pub fn embed_url_is_valid(kind: BlockKind, url: &str) -> bool {
    let re = match kind {
        BlockKind::EmbedFigma => &FIGMA_RE,
        BlockKind::EmbedMiro => &MIRO_RE,
        BlockKind::EmbedGoogleDrive => &GOOGLE_DRIVE_RE,
        BlockKind::EmbedTrello => &TRELLO_RE,
        BlockKind::EmbedLoom => &LOOM_RE,
        BlockKind::EmbedBookmark => &BOOKMARK_RE,
        _ => return false,
    };
    re.is_match(url)
}

fn provider_name(kind: BlockKind) -> &'static str {
    match kind {
        BlockKind::EmbedFigma => "Figma",
        BlockKind::EmbedMiro => "Miro",
        BlockKind::EmbedGoogleDrive => "Google Drive",
        BlockKind::EmbedTrello => "Trello",
        BlockKind::EmbedLoom => "Loom",
        _ => "bookmark",
    }
}

/// Third-party embeds. The block text holds the URL until Enter confirms it; a
/// confirmed embed (`isDisable`) behaves like an atomic block.
pub struct EmbedPlugin;

impl BlockPlugin for EmbedPlugin {
    fn id(&self) -> &'static str {
        "embed"
    }

    fn kinds(&self) -> &'static [BlockKind] {
        &[
            BlockKind::EmbedFigma,
            BlockKind::EmbedMiro,
            BlockKind::EmbedGoogleDrive,
            BlockKind::EmbedTrello,
            BlockKind::EmbedLoom,
            BlockKind::EmbedBookmark,
        ]
    }

    fn style_class(&self, block: &Block) -> &'static str {
        if block.data_bool("isShow") {
            "block-embed block-embed-live"
        } else if block.data().contains_key("error") {
            "block-embed block-embed-error"
        } else {
            "block-embed"
        }
    }

    fn key_binding(
        &self,
        press: &KeyPress,
        cx: &CursorContext<'_>,
        _config: &EditorConfig,
    ) -> Option<BlockCommand> {
        if cx.block.data_bool("isDisable") {
            if plain(press, Key::Enter) {
                return Some(BlockCommand::InsertBlockAfterAtomic);
            }
            if plain(press, Key::Backspace) || plain(press, Key::Delete) {
                return Some(BlockCommand::RemoveBlock);
            }
            return None;
        }
        if plain(press, Key::Enter) {
            if cx.is_empty_block() {
                return Some(BlockCommand::ResetType);
            }
            return Some(BlockCommand::ActivateEmbedBlock);
        }
        if plain(press, Key::Backspace) && cx.at_start() && cx.is_empty_block() {
            return Some(BlockCommand::ResetType);
        }
        None
    }

    fn handle_command(
        &self,
        command: BlockCommand,
        state: &EditorState,
        _config: &EditorConfig,
    ) -> Option<EditorState> {
        let key = state.selection().focus.key.clone();
        match command {
            BlockCommand::ResetType => Some(reset_to_text(state, &key)),
            BlockCommand::ActivateEmbedBlock => Some(activate_embed(state, &key)),
            _ => handle_atomic_command(command, state),
        }
    }
}

fn activate_embed(state: &EditorState, key: &BlockKey) -> EditorState {
    let Some(block) = state.content().block(key) else {
        return state.clone();
    };
    let kind = block.kind();
    let url = block.text().trim().to_string();

    if !embed_url_is_valid(kind, &url) {
        tracing::debug!(block = %key, kind = %kind, "rejected embed url");
        let message = format!("Not a valid {} link", provider_name(kind));
        return ops::set_block_data(state, key, &DataPatch::set("error", Value::String(message)));
    }

    let mut data = BlockData::new();
    data.insert("provider".to_string(), Value::String(kind.as_str().to_string()));
    data.insert("url".to_string(), Value::String(url));
    let (next, entity) = ops::create_entity(
        state,
        Entity::new(EntityKind::Embed, EntityMutability::Immutable, data),
    );

    let len = block.len();
    let whole = Selection::range(Point::new(key.clone(), 0), Point::new(key.clone(), len));
    let next = ops::apply_entity(&next, &whole, Some(entity));
    let next = ops::set_block_data(
        &next,
        key,
        &DataPatch::set("isShow", Value::Bool(true))
            .and_set("isDisable", Value::Bool(true))
            .and_remove("error"),
    );
    text_block_after(&next, key)
}
