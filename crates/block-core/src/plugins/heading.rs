use crate::config::EditorConfig;
use crate::core::{Block, BlockKind, EditorState};
use crate::keys::{BlockCommand, Key, KeyPress};
use crate::plugin::BlockPlugin;
use crate::selection::CursorContext;

use super::{depth_binding, handle_depth_command, plain, reset_to_text, split_into_text};

fn heading_like_binding(
    press: &KeyPress,
    cx: &CursorContext<'_>,
    config: &EditorConfig,
) -> Option<BlockCommand> {
    if plain(press, Key::Enter) {
        return Some(BlockCommand::InsertBlockAfterHeading);
    }
    if plain(press, Key::Backspace) && cx.at_start() {
        return Some(BlockCommand::ResetType);
    }
    depth_binding(press, cx, config)
}

fn heading_like_command(command: BlockCommand, state: &EditorState) -> Option<EditorState> {
    match command {
        BlockCommand::InsertBlockAfterHeading => Some(split_into_text(state)),
        BlockCommand::ResetType => {
            let key = state.selection().focus.key.clone();
            Some(reset_to_text(state, &key))
        }
        _ => handle_depth_command(command, state),
    }
}

pub struct HeadingPlugin;

impl BlockPlugin for HeadingPlugin {
    fn id(&self) -> &'static str {
        "heading"
    }

    fn kinds(&self) -> &'static [BlockKind] {
        &[
            BlockKind::HeadingOne,
            BlockKind::HeadingTwo,
            BlockKind::HeadingThree,
        ]
    }

    fn style_class(&self, block: &Block) -> &'static str {
        match block.kind() {
            BlockKind::HeadingOne => "block-heading-1",
            BlockKind::HeadingTwo => "block-heading-2",
            _ => "block-heading-3",
        }
    }

    fn key_binding(
        &self,
        press: &KeyPress,
        cx: &CursorContext<'_>,
        config: &EditorConfig,
    ) -> Option<BlockCommand> {
        heading_like_binding(press, cx, config)
    }

    fn handle_command(
        &self,
        command: BlockCommand,
        state: &EditorState,
        _config: &EditorConfig,
    ) -> Option<EditorState> {
        heading_like_command(command, state)
    }
}

/// Callout block. Behaves like a heading; `data.tone` picks the palette.
pub struct BannerPlugin;

impl BlockPlugin for BannerPlugin {
    fn id(&self) -> &'static str {
        "banner"
    }

    fn kinds(&self) -> &'static [BlockKind] {
        &[BlockKind::Banner]
    }

    fn style_class(&self, block: &Block) -> &'static str {
        match block.data_str("tone") {
            Some("warning") => "block-banner block-banner-warning",
            Some("error") => "block-banner block-banner-error",
            _ => "block-banner",
        }
    }

    fn key_binding(
        &self,
        press: &KeyPress,
        cx: &CursorContext<'_>,
        config: &EditorConfig,
    ) -> Option<BlockCommand> {
        heading_like_binding(press, cx, config)
    }

    fn handle_command(
        &self,
        command: BlockCommand,
        state: &EditorState,
        _config: &EditorConfig,
    ) -> Option<EditorState> {
        heading_like_command(command, state)
    }
}
