use serde_json::Value;

use crate::config::EditorConfig;
use crate::core::{Block, BlockKey, BlockKind, ContentModel, DataPatch, EditorState};
use crate::keys::{BlockCommand, Key, KeyPress};
use crate::ops;
use crate::plugin::BlockPlugin;
use crate::selection::CursorContext;

use super::{depth_binding, handle_depth_command, plain, reset_to_text, with_command};

pub struct ListPlugin;

impl BlockPlugin for ListPlugin {
    fn id(&self) -> &'static str {
        "list"
    }

    fn kinds(&self) -> &'static [BlockKind] {
        &[
            BlockKind::BulletList,
            BlockKind::NumberedList,
            BlockKind::CheckList,
        ]
    }

    fn style_class(&self, block: &Block) -> &'static str {
        match block.kind() {
            BlockKind::BulletList => "block-bullet-list",
            BlockKind::NumberedList => "block-numbered-list",
            _ if block.data_bool("checked") => "block-check-list block-checked",
            _ => "block-check-list",
        }
    }

    fn key_binding(
        &self,
        press: &KeyPress,
        cx: &CursorContext<'_>,
        config: &EditorConfig,
    ) -> Option<BlockCommand> {
        if plain(press, Key::Enter) {
            if cx.collapsed && cx.is_empty_block() {
                return Some(BlockCommand::ResetType);
            }
            return Some(BlockCommand::SplitListItem);
        }
        if with_command(press, Key::Enter) && cx.block.kind() == BlockKind::CheckList {
            return Some(BlockCommand::ToggleState);
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
            BlockCommand::SplitListItem => Some(split_list_item(state, &key)),
            BlockCommand::ToggleState => {
                let checked = state.content().block(&key)?.data_bool("checked");
                Some(ops::set_block_data(
                    state,
                    &key,
                    &DataPatch::set("checked", Value::Bool(!checked)),
                ))
            }
            _ => handle_depth_command(command, state),
        }
    }
}

fn split_list_item(state: &EditorState, key: &BlockKey) -> EditorState {
    let kind = state.content().block(key).map(|b| b.kind());
    let selection = state.selection().clone();
    let next = ops::split_block(state, &selection, None);
    if kind != Some(BlockKind::CheckList) {
        return next;
    }
    let new_key = next.selection().focus.key.clone();
    ops::set_block_data(&next, &new_key, &DataPatch::set("checked", Value::Bool(false)))
}

/// 1-based position of a numbered item among its consecutive siblings. Deeper
/// blocks in between do not break the run.
pub fn numbered_list_index(content: &ContentModel, key: &BlockKey) -> Option<usize> {
    let ix = content.index_of(key)?;
    let block = content.block_at(ix)?;
    if block.kind() != BlockKind::NumberedList {
        return None;
    }
    let depth = block.depth();
    let mut index = 1;
    for prev in content.blocks().take(ix).rev() {
        if prev.depth() > depth {
            continue;
        }
        if prev.depth() < depth || prev.kind() != BlockKind::NumberedList {
            break;
        }
        index += 1;
    }
    Some(index)
}
