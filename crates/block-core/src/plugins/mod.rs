mod atomic;
mod autoformat;
mod divider;
mod embed;
mod heading;
mod linkify;
mod list;
mod structure;
mod table;
mod text;
mod title;
mod toggle;

use crate::config::EditorConfig;
use crate::core::{BlockKey, BlockKind, ContentModel, DataPatch, EditorState, Selection};
use crate::entity::EntityKind;
use crate::keys::{BlockCommand, Key, KeyPress};
use crate::ops::{self, NewBlock};
use crate::plugin::{BlockPlugin, InputTransform};
use crate::selection::CursorContext;

pub use atomic::AtomicPlugin;
pub use autoformat::AutoformatOnSpace;
pub use divider::DividerPlugin;
pub use embed::{EmbedPlugin, embed_url_is_valid};
pub use heading::{BannerPlugin, HeadingPlugin};
pub use linkify::{LinkifyOnBoundary, looks_like_url};
pub use list::{ListPlugin, numbered_list_index};
pub use structure::DepthPlugin;
pub use table::{TablePlugin, set_table_cell, table_data, table_rows};
pub use text::TextPlugin;
pub use title::TitlePlugin;
pub use toggle::TogglePlugin;

/// Registration order doubles as match priority for `PluginRegistry::resolve`.
pub fn standard_plugins() -> Vec<Box<dyn BlockPlugin>> {
    vec![
        Box::new(TitlePlugin),
        Box::new(DepthPlugin),
        Box::new(TextPlugin),
        Box::new(HeadingPlugin),
        Box::new(BannerPlugin),
        Box::new(ListPlugin),
        Box::new(TogglePlugin),
        Box::new(TablePlugin),
        Box::new(DividerPlugin),
        Box::new(EmbedPlugin),
        Box::new(AtomicPlugin::new("image", EntityKind::Image, "block-image")),
        Box::new(AtomicPlugin::new("file", EntityKind::File, "block-file")),
        Box::new(AtomicPlugin::new("video", EntityKind::Video, "block-video")),
        Box::new(AtomicPlugin::new(
            "task_board",
            EntityKind::TaskBoard,
            "block-task-board",
        )),
        Box::new(AtomicPlugin::new(
            "document",
            EntityKind::Document,
            "block-document",
        )),
    ]
}

pub fn standard_transforms() -> Vec<Box<dyn InputTransform>> {
    vec![Box::new(AutoformatOnSpace), Box::new(LinkifyOnBoundary)]
}

/// Data keys owned by structural kinds; dropped when a block falls back to text.
const STRUCTURAL_DATA_KEYS: [&str; 7] = [
    "state",
    "checked",
    "isShow",
    "isDisable",
    "error",
    "rows",
    "tone",
];

pub(crate) fn plain(press: &KeyPress, key: Key) -> bool {
    press.key == key && press.modifiers == Default::default()
}

pub(crate) fn shifted(press: &KeyPress, key: Key) -> bool {
    press.key == key
        && press.modifiers.shift
        && !press.modifiers.command()
        && !press.modifiers.alt
}

pub(crate) fn with_command(press: &KeyPress, key: Key) -> bool {
    press.key == key && press.modifiers.command()
}

/// Index one past the last block nested under `ix`.
pub(crate) fn subtree_end(content: &ContentModel, ix: usize) -> usize {
    let Some(root) = content.block_at(ix) else {
        return ix;
    };
    let depth = root.depth();
    let mut end = ix + 1;
    while content.block_at(end).is_some_and(|b| b.depth() > depth) {
        end += 1;
    }
    end
}

/// `tab_command` when indenting keeps the nesting chain valid, else `tab_command_disabled`.
///
/// Legal only below a non-title previous block that is at least as deep as the current
/// one, and only while the deepest block of the moved subtree stays within `max_depth`.
pub(crate) fn tab_binding(cx: &CursorContext<'_>, config: &EditorConfig) -> BlockCommand {
    let Some(previous) = cx.previous else {
        return BlockCommand::TabDisabled;
    };
    if previous.kind() == BlockKind::Title || previous.depth() < cx.block.depth() {
        return BlockCommand::TabDisabled;
    }
    let deepest = (cx.index..subtree_end(cx.content, cx.index))
        .filter_map(|ix| cx.content.block_at(ix))
        .map(|b| b.depth())
        .max()
        .unwrap_or(cx.block.depth());
    if deepest >= config.max_depth {
        return BlockCommand::TabDisabled;
    }
    BlockCommand::Tab
}

/// Shared Tab / Shift-Tab / Backspace-outdent resolution for nestable text kinds.
pub(crate) fn depth_binding(
    press: &KeyPress,
    cx: &CursorContext<'_>,
    config: &EditorConfig,
) -> Option<BlockCommand> {
    if plain(press, Key::Tab) {
        return Some(tab_binding(cx, config));
    }
    if shifted(press, Key::Tab) {
        return Some(if cx.block.depth() > 0 {
            BlockCommand::DecreaseDepth
        } else {
            BlockCommand::TabDisabled
        });
    }
    None
}

/// Handles the depth commands every nestable kind shares.
pub(crate) fn handle_depth_command(
    command: BlockCommand,
    state: &EditorState,
) -> Option<EditorState> {
    let key = state.selection().focus.key.clone();
    match command {
        BlockCommand::Tab => Some(shift_subtree(state, &key, 1)),
        BlockCommand::DecreaseDepth => Some(shift_subtree(state, &key, -1)),
        BlockCommand::TabDisabled => Some(state.clone()),
        _ => None,
    }
}

/// Moves a block and everything nested under it by `delta` levels.
pub(crate) fn shift_subtree(state: &EditorState, key: &BlockKey, delta: isize) -> EditorState {
    let content = state.content();
    let Some(ix) = content.index_of(key) else {
        return state.clone();
    };
    let end = subtree_end(content, ix);
    let keys: Vec<(BlockKey, usize)> = (ix..end)
        .filter_map(|i| content.block_at(i))
        .map(|b| (b.key().clone(), b.depth()))
        .collect();
    if delta < 0 && keys.first().is_some_and(|(_, depth)| *depth == 0) {
        return state.clone();
    }

    let mut next = state.clone();
    for (key, depth) in keys {
        let depth = depth.saturating_add_signed(delta);
        next = ops::set_block_depth(&next, &key, depth);
    }
    next
}

/// Turns a block back into plain text, keeping depth. A plain text block is returned
/// unchanged.
pub(crate) fn reset_to_text(state: &EditorState, key: &BlockKey) -> EditorState {
    let Some(block) = state.content().block(key) else {
        return state.clone();
    };
    let stale: Vec<&str> = STRUCTURAL_DATA_KEYS
        .into_iter()
        .filter(|k| block.data().contains_key(*k))
        .collect();
    if block.kind() == BlockKind::Text && stale.is_empty() {
        return state.clone();
    }

    let mut next = state.clone();
    if block.kind() != BlockKind::Text {
        next = ops::set_block_type(&next, key, BlockKind::Text);
    }
    if !stale.is_empty() {
        let patch = stale
            .into_iter()
            .fold(DataPatch::default(), |patch, k| patch.and_remove(k));
        next = ops::set_block_data(&next, key, &patch);
    }
    next
}

/// Appends an empty text block after `key` at the same depth.
pub(crate) fn text_block_after(state: &EditorState, key: &BlockKey) -> EditorState {
    let depth = state.content().block(key).map_or(0, |b| b.depth());
    ops::insert_empty_block_after(state, key, NewBlock::new(BlockKind::Text, depth))
}

/// Split at the caret with a text tail, as used after titles, headings and toggles.
pub(crate) fn split_into_text(state: &EditorState) -> EditorState {
    let selection: Selection = state.selection().clone();
    ops::split_block(state, &selection, Some(BlockKind::Text))
}

/// Handles the commands shared by blocks that cannot hold typed text.
pub(crate) fn handle_atomic_command(
    command: BlockCommand,
    state: &EditorState,
) -> Option<EditorState> {
    let key = state.selection().focus.key.clone();
    match command {
        BlockCommand::InsertBlockAfterAtomic => Some(text_block_after(state, &key)),
        BlockCommand::RemoveBlock => Some(ops::remove_block(state, &key)),
        _ => None,
    }
}
