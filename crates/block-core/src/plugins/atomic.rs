use crate::config::EditorConfig;
use crate::core::{Block, BlockKind, ContentModel, EditorState};
use crate::entity::EntityKind;
use crate::keys::{BlockCommand, Key, KeyPress};
use crate::plugin::BlockPlugin;
use crate::selection::CursorContext;

use super::{handle_atomic_command, plain};

/// An atomic block resolved by the type of the entity it carries.
pub struct AtomicPlugin {
    id: &'static str,
    entity_kind: EntityKind,
    style_class: &'static str,
}

impl AtomicPlugin {
    pub const fn new(id: &'static str, entity_kind: EntityKind, style_class: &'static str) -> Self {
        Self {
            id,
            entity_kind,
            style_class,
        }
    }

    pub fn entity_kind(&self) -> EntityKind {
        self.entity_kind
    }
}

impl BlockPlugin for AtomicPlugin {
    fn id(&self) -> &'static str {
        self.id
    }

    fn kinds(&self) -> &'static [BlockKind] {
        &[BlockKind::Atomic]
    }

    fn matches(&self, block: &Block, content: &ContentModel) -> bool {
        block.kind() == BlockKind::Atomic
            && block
                .block_entity()
                .and_then(|key| content.entity(key))
                .is_some_and(|entity| entity.kind == self.entity_kind)
    }

    fn style_class(&self, _block: &Block) -> &'static str {
        self.style_class
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
