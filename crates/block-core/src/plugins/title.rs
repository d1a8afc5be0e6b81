use crate::config::EditorConfig;
use crate::core::{Block, BlockKind, ContentModel, DataPatch, EditorState};
use crate::keys::{BlockCommand, Key, KeyPress};
use crate::ops::{self, NewBlock};
use crate::plugin::BlockPlugin;
use crate::selection::CursorContext;

use super::{plain, shifted, split_into_text};

/// Keeps exactly one title, always first, always at depth 0.
pub struct TitlePlugin;

impl BlockPlugin for TitlePlugin {
    fn id(&self) -> &'static str {
        "title"
    }

    fn kinds(&self) -> &'static [BlockKind] {
        &[BlockKind::Title]
    }

    fn style_class(&self, _block: &Block) -> &'static str {
        "block-title"
    }

    fn key_binding(
        &self,
        press: &KeyPress,
        _cx: &CursorContext<'_>,
        _config: &EditorConfig,
    ) -> Option<BlockCommand> {
        if plain(press, Key::Enter) {
            return Some(BlockCommand::InsertBlockAfterTitle);
        }
        if plain(press, Key::Tab) || shifted(press, Key::Tab) {
            return Some(BlockCommand::TabDisabled);
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
            BlockCommand::InsertBlockAfterTitle => Some(split_into_text(state)),
            BlockCommand::TabDisabled => Some(state.clone()),
            _ => None,
        }
    }

    fn on_change(&self, state: &EditorState, _config: &EditorConfig) -> Option<EditorState> {
        let content = state.content();
        let selection = state.selection().clone();

        let Some(first) = content.first_block() else {
            return Some(state.amend(ContentModel::empty()).with_selection(selection));
        };

        let mut next = state.clone();
        if first.kind() != BlockKind::Title {
            let key = first.key().clone();
            if first.kind().is_text_family() {
                tracing::debug!(block = %key, kind = %first.kind(), "promoting first block to title");
                next = ops::set_block_type(&next, &key, BlockKind::Title);
                let stale = ["state", "checked", "tone"]
                    .into_iter()
                    .filter(|k| first.data().contains_key(*k))
                    .fold(DataPatch::default(), |patch, k| patch.and_remove(k));
                if !stale.is_empty() {
                    next = ops::set_block_data(&next, &key, &stale);
                }
            } else {
                tracing::debug!(block = %key, kind = %first.kind(), "inserting title before first block");
                next =
                    ops::insert_empty_block_before(&next, &key, NewBlock::new(BlockKind::Title, 0));
            }
        }

        let title_key = next.content().first_block()?.key().clone();
        if next.content().first_block()?.depth() != 0 {
            next = ops::set_block_depth(&next, &title_key, 0);
        }

        let extra_titles: Vec<_> = next
            .content()
            .blocks()
            .skip(1)
            .filter(|b| b.kind() == BlockKind::Title)
            .map(|b| b.key().clone())
            .collect();
        for key in extra_titles {
            next = ops::set_block_type(&next, &key, BlockKind::Text);
        }

        if next.content() == content {
            return None;
        }
        Some(next.with_selection(selection))
    }

    fn on_change_priority(&self) -> i32 {
        -100
    }
}
