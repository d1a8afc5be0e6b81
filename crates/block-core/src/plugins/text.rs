use crate::config::EditorConfig;
use crate::core::{Block, BlockKind, EditorState};
use crate::keys::{BlockCommand, Key, KeyPress};
use crate::plugin::BlockPlugin;
use crate::selection::CursorContext;

use super::{depth_binding, handle_depth_command, plain, reset_to_text};

pub struct TextPlugin;

impl BlockPlugin for TextPlugin {
    fn id(&self) -> &'static str {
        "text"
    }

    fn kinds(&self) -> &'static [BlockKind] {
        &[BlockKind::Text]
    }

    fn style_class(&self, _block: &Block) -> &'static str {
        "block-text"
    }

    fn key_binding(
        &self,
        press: &KeyPress,
        cx: &CursorContext<'_>,
        config: &EditorConfig,
    ) -> Option<BlockCommand> {
        if let Some(command) = depth_binding(press, cx, config) {
            return Some(command);
        }
        let nested = cx.block.depth() > 0;
        if plain(press, Key::Backspace) && cx.at_start() && nested {
            return Some(BlockCommand::DecreaseDepth);
        }
        // Enter on an empty nested line steps out of the enclosing list or toggle.
        if plain(press, Key::Enter) && cx.collapsed && cx.is_empty_block() && nested {
            return Some(BlockCommand::DecreaseDepth);
        }
        None
    }

    fn handle_command(
        &self,
        command: BlockCommand,
        state: &EditorState,
        _config: &EditorConfig,
    ) -> Option<EditorState> {
        match command {
            BlockCommand::ResetType => {
                let key = state.selection().focus.key.clone();
                Some(reset_to_text(state, &key))
            }
            _ => handle_depth_command(command, state),
        }
    }
}
