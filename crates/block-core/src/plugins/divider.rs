use crate::config::EditorConfig;
use crate::core::{Block, BlockKind, EditorState};
use crate::keys::{BlockCommand, Key, KeyPress};
use crate::plugin::BlockPlugin;
use crate::selection::CursorContext;

use super::{handle_atomic_command, plain};

pub struct DividerPlugin;

impl BlockPlugin for DividerPlugin {
    fn id(&self) -> &'static str {
        "divider"
    }

    fn kinds(&self) -> &'static [BlockKind] {
        &[BlockKind::SolidDivider, BlockKind::DashDivider]
    }

    fn style_class(&self, block: &Block) -> &'static str {
        match block.kind() {
            BlockKind::DashDivider => "block-divider block-divider-dash",
            _ => "block-divider",
        }
    }

    fn key_binding(
        &self,
        press: &KeyPress,
        _cx: &CursorContext<'_>,
        _config: &EditorConfig,
    ) -> Option<BlockCommand> {
        if plain(press, Key::Enter) {
            return Some(BlockCommand::InsertBlockAfterAtomic);
        }
        if plain(press, Key::Backspace) || plain(press, Key::Delete) {
            return Some(BlockCommand::RemoveBlock);
        }
        None
    }

    fn handle_command(
        &self,
        command: BlockCommand,
        state: &EditorState,
        _config: &EditorConfig,
    ) -> Option<EditorState> {
        handle_atomic_command(command, state)
    }
}
