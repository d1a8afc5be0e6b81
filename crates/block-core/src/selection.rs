use serde::{Deserialize, Serialize};

use crate::core::{Block, BlockKey, ContentModel, EditorState, Point, Selection};
use crate::error::SelectionError;

pub fn current_block(state: &EditorState) -> Option<&Block> {
    state.content().block(&state.selection().anchor.key)
}

pub fn text_before_cursor(state: &EditorState) -> String {
    let focus = &state.selection().focus;
    match state.content().block(&focus.key) {
        Some(block) => block.text().chars().take(focus.offset).collect(),
        None => String::new(),
    }
}

pub fn text_after_cursor(state: &EditorState) -> String {
    let focus = &state.selection().focus;
    match state.content().block(&focus.key) {
        Some(block) => block.text().chars().skip(focus.offset).collect(),
        None => String::new(),
    }
}

/// The run of non-space characters ending at the caret, with its char offset.
pub fn word_before_cursor(state: &EditorState) -> Option<(usize, String)> {
    let before: Vec<char> = text_before_cursor(state).chars().collect();
    let start = before
        .iter()
        .rposition(|ch| ch.is_whitespace())
        .map_or(0, |ix| ix + 1);
    if start == before.len() {
        return None;
    }
    Some((start, before[start..].iter().collect()))
}

/// Everything a key-binding resolver may look at.
#[derive(Debug, Clone, Copy)]
pub struct CursorContext<'a> {
    pub content: &'a ContentModel,
    pub block: &'a Block,
    pub index: usize,
    pub offset: usize,
    pub collapsed: bool,
    pub previous: Option<&'a Block>,
    pub next: Option<&'a Block>,
}

impl CursorContext<'_> {
    pub fn at_start(&self) -> bool {
        self.collapsed && self.offset == 0
    }

    pub fn at_end(&self) -> bool {
        self.collapsed && self.offset >= self.block.len()
    }

    pub fn is_empty_block(&self) -> bool {
        self.block.is_empty()
    }

    /// Whether the next block is nested under the current one.
    pub fn has_children(&self) -> bool {
        self.next
            .is_some_and(|next| next.depth() > self.block.depth())
    }
}

pub fn cursor_context(state: &EditorState) -> Option<CursorContext<'_>> {
    let content = state.content();
    let selection = state.selection();
    let index = content.index_of(&selection.focus.key)?;
    let block = content.block_at(index)?;
    Some(CursorContext {
        content,
        block,
        index,
        offset: selection.focus.offset.min(block.len()),
        collapsed: selection.is_collapsed(),
        previous: index.checked_sub(1).and_then(|ix| content.block_at(ix)),
        next: content.block_at(index + 1),
    })
}

/// A selection as reported by the host, with UTF-16 code unit offsets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeSelection {
    pub anchor_key: String,
    pub anchor_offset: usize,
    pub focus_key: String,
    pub focus_offset: usize,
}

impl NativeSelection {
    pub fn caret(key: impl Into<String>, offset: usize) -> Self {
        let key = key.into();
        Self {
            anchor_key: key.clone(),
            anchor_offset: offset,
            focus_key: key,
            focus_offset: offset,
        }
    }
}

/// Maps a host selection onto the content model, clamping offsets to block length.
pub fn resolve_native_selection(
    content: &ContentModel,
    native: &NativeSelection,
) -> Result<Selection, SelectionError> {
    if content.is_empty() {
        return Err(SelectionError::EmptyDocument);
    }
    let anchor = resolve_point(content, &native.anchor_key, native.anchor_offset)?;
    let focus = resolve_point(content, &native.focus_key, native.focus_offset)?;
    Ok(Selection::range(anchor, focus))
}

fn resolve_point(
    content: &ContentModel,
    key: &str,
    utf16_offset: usize,
) -> Result<Point, SelectionError> {
    let key = BlockKey::new(key);
    let Some(block) = content.block(&key) else {
        return Err(SelectionError::UnknownBlock(key.to_string()));
    };
    let offset = utf16_to_char_offset(block.text(), utf16_offset);
    Ok(Point::new(key, offset))
}

/// Converts a UTF-16 offset to a char offset. Offsets past the end, or inside a
/// surrogate pair, round down.
pub fn utf16_to_char_offset(text: &str, utf16_offset: usize) -> usize {
    let mut units = 0;
    for (ix, ch) in text.chars().enumerate() {
        let next = units + ch.len_utf16();
        if next > utf16_offset {
            return ix;
        }
        units = next;
    }
    text.chars().count()
}

pub fn char_to_utf16_offset(text: &str, char_offset: usize) -> usize {
    text.chars().take(char_offset).map(char::len_utf16).sum()
}
