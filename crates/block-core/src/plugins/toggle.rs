use serde_json::Value;

use crate::config::EditorConfig;
use crate::core::{Block, BlockKind, DataPatch, EditorState};
use crate::keys::{BlockCommand, Key, KeyPress};
use crate::ops;
use crate::plugin::BlockPlugin;
use crate::selection::CursorContext;

use super::{
    depth_binding, handle_depth_command, plain, reset_to_text, split_into_text, subtree_end,
    with_command,
};

/// Collapsible block. `data.state == true` means expanded; children are the
/// following blocks that sit deeper than the toggle.
pub struct TogglePlugin;

impl BlockPlugin for TogglePlugin {
    fn id(&self) -> &'static str {
        "toggle"
    }

    fn kinds(&self) -> &'static [BlockKind] {
        &[BlockKind::ToggleList]
    }

    fn style_class(&self, block: &Block) -> &'static str {
        if block.data_bool("state") {
            "block-toggle block-toggle-open"
        } else {
            "block-toggle"
        }
    }

    fn key_binding(
        &self,
        press: &KeyPress,
        cx: &CursorContext<'_>,
        config: &EditorConfig,
    ) -> Option<BlockCommand> {
        if with_command(press, Key::Enter) {
            return Some(BlockCommand::ToggleState);
        }
        if plain(press, Key::Enter) {
            if cx.collapsed && cx.is_empty_block() && !cx.has_children() {
                return Some(BlockCommand::ResetType);
            }
            return Some(if cx.block.data_bool("state") {
                BlockCommand::InsertBlockIntoToggle
            } else {
                BlockCommand::InsertBlockAfterToggle
            });
        }
        if plain(press, Key::Backspace) && cx.at_start() {
            return Some(BlockCommand::ResetType);
        }
        depth_binding(press, cx, config)
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
            BlockCommand::ToggleState => {
                let open = state.content().block(&key)?.data_bool("state");
                Some(ops::set_block_data(
                    state,
                    &key,
                    &DataPatch::set("state", Value::Bool(!open)),
                ))
            }
            BlockCommand::InsertBlockIntoToggle => {
                let depth = state.content().block(&key)?.depth();
                let split = split_into_text(state);
                let child = split.selection().focus.key.clone();
                Some(ops::set_block_depth(&split, &child, depth + 1))
            }
            BlockCommand::InsertBlockAfterToggle => {
                let content = state.content();
                let ix = content.index_of(&key)?;
                let end = subtree_end(content, ix);
                let last_descendant = (end > ix + 1)
                    .then(|| content.block_at(end - 1))
                    .flatten()
                    .map(|b| b.key().clone());

                let split = split_into_text(state);
                let sibling = split.selection().focus.key.clone();
                Some(match last_descendant {
                    Some(anchor) => ops::move_block(&split, &sibling, &anchor),
                    None => split,
                })
            }
            _ => handle_depth_command(command, state),
        }
    }
}
