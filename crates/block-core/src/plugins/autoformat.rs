use serde_json::Value;

use crate::config::EditorConfig;
use crate::core::{BlockKind, DataPatch, EditorState, Point, Selection};
use crate::keys::{Key, KeyPress};
use crate::ops;
use crate::plugin::{InputTransform, TransformOutcome};
use crate::selection::{current_block, text_before_cursor};

use super::text_block_after;

/// Markdown-style shortcuts typed at the start of a text block, completed by Space.
const SHORTCUTS: [(&str, BlockKind); 9] = [
    ("-", BlockKind::BulletList),
    ("*", BlockKind::BulletList),
    ("1.", BlockKind::NumberedList),
    ("[]", BlockKind::CheckList),
    (">", BlockKind::ToggleList),
    ("#", BlockKind::HeadingOne),
    ("##", BlockKind::HeadingTwo),
    ("###", BlockKind::HeadingThree),
    ("---", BlockKind::SolidDivider),
];

pub struct AutoformatOnSpace;

impl InputTransform for AutoformatOnSpace {
    fn id(&self) -> &'static str {
        "autoformat.on_space"
    }

    fn transform(
        &self,
        press: &KeyPress,
        state: &EditorState,
        config: &EditorConfig,
    ) -> Option<TransformOutcome> {
        if !config.autoformat || press.key != Key::Space || press.modifiers.command() {
            return None;
        }
        if !state.selection().is_collapsed() {
            return None;
        }
        let block = current_block(state)?;
        if block.kind() != BlockKind::Text {
            return None;
        }
        let marker = text_before_cursor(state);
        let (_, kind) = SHORTCUTS.iter().find(|(m, _)| *m == marker)?;
        let kind = *kind;
        if kind.is_divider() && block.len() != marker.chars().count() {
            return None;
        }

        let key = block.key().clone();
        tracing::debug!(block = %key, kind = %kind, "autoformat");
        let len = marker.chars().count();
        let marker_range =
            Selection::range(Point::new(key.clone(), 0), Point::new(key.clone(), len));
        let mut next = ops::remove_range(state, &marker_range);
        next = ops::set_block_type(&next, &key, kind);
        match kind {
            BlockKind::CheckList => {
                let patch = DataPatch::set("checked", Value::Bool(false));
                next = ops::set_block_data(&next, &key, &patch);
            }
            BlockKind::ToggleList => {
                let patch = DataPatch::set("state", Value::Bool(true));
                next = ops::set_block_data(&next, &key, &patch);
            }
            BlockKind::SolidDivider => {
                next = text_block_after(&next, &key);
            }
            _ => {}
        }
        Some(TransformOutcome {
            state: next,
            consumed: true,
        })
    }
}
