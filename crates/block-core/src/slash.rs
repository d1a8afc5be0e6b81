use serde_json::Value;

use crate::core::{BlockData, BlockKey, BlockKind, DataPatch, EditorState, Point, Selection};
use crate::ops::{self, NewBlock};
use crate::plugins::{table_data, text_block_after};
use crate::selection::{current_block, text_before_cursor};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlashAction {
    TurnInto(BlockKind),
    InsertDivider(BlockKind),
    InsertTable { rows: usize, cols: usize },
    InsertEmbed(BlockKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlashItem {
    pub id: &'static str,
    pub label: &'static str,
    pub keywords: &'static [&'static str],
    pub action: SlashAction,
}

const fn item(
    id: &'static str,
    label: &'static str,
    keywords: &'static [&'static str],
    action: SlashAction,
) -> SlashItem {
    SlashItem {
        id,
        label,
        keywords,
        action,
    }
}

#[rustfmt::skip]
const ITEMS: [SlashItem; 18] = [
    item("text", "Text", &["plain", "paragraph"], SlashAction::TurnInto(BlockKind::Text)),
    item("h1", "Heading 1", &["title", "big", "#"], SlashAction::TurnInto(BlockKind::HeadingOne)),
    item("h2", "Heading 2", &["subtitle", "##"], SlashAction::TurnInto(BlockKind::HeadingTwo)),
    item("h3", "Heading 3", &["###"], SlashAction::TurnInto(BlockKind::HeadingThree)),
    item("bullet", "Bulleted list", &["unordered", "ul", "-"], SlashAction::TurnInto(BlockKind::BulletList)),
    item("numbered", "Numbered list", &["ordered", "ol", "1."], SlashAction::TurnInto(BlockKind::NumberedList)),
    item("todo", "To-do list", &["check", "task", "[]"], SlashAction::TurnInto(BlockKind::CheckList)),
    item("toggle", "Toggle list", &["collapse", "fold", ">"], SlashAction::TurnInto(BlockKind::ToggleList)),
    item("banner", "Banner", &["callout", "note"], SlashAction::TurnInto(BlockKind::Banner)),
    item("divider", "Divider", &["line", "rule", "---"], SlashAction::InsertDivider(BlockKind::SolidDivider)),
    item("dash-divider", "Dashed divider", &["line", "rule"], SlashAction::InsertDivider(BlockKind::DashDivider)),
    item("table", "Table", &["grid", "rows"], SlashAction::InsertTable { rows: 2, cols: 2 }),
    item("figma", "Figma", &["embed", "design"], SlashAction::InsertEmbed(BlockKind::EmbedFigma)),
    item("miro", "Miro", &["embed", "board", "whiteboard"], SlashAction::InsertEmbed(BlockKind::EmbedMiro)),
    item("loom", "Loom", &["embed", "video"], SlashAction::InsertEmbed(BlockKind::EmbedLoom)),
    item("bookmark", "Web bookmark", &["embed", "link", "url"], SlashAction::InsertEmbed(BlockKind::EmbedBookmark)),
    item("google-drive", "Google Drive", &["embed", "docs", "sheets"], SlashAction::InsertEmbed(BlockKind::EmbedGoogleDrive)),
    item("trello", "Trello", &["embed", "kanban"], SlashAction::InsertEmbed(BlockKind::EmbedTrello)),
];

pub fn slash_items() -> Vec<SlashItem> {
    ITEMS.to_vec()
}

/// Items whose label or keywords contain `query`, case-insensitively. Label matches
/// sort first.
pub fn filter_slash_items(query: &str) -> Vec<SlashItem> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return slash_items();
    }
    let mut by_label = Vec::new();
    let mut by_keyword = Vec::new();
    for item in slash_items() {
        if item.label.to_lowercase().contains(&query) || item.id.contains(&query) {
            by_label.push(item);
        } else if item.keywords.iter().any(|k| k.to_lowercase().contains(&query)) {
            by_keyword.push(item);
        }
    }
    by_label.extend(by_keyword);
    by_label
}

/// The text typed after the last `/` before the caret, if the menu is open.
pub fn slash_query(state: &EditorState) -> Option<String> {
    let before = text_before_cursor(state);
    let slash = before.rfind('/')?;
    let query = &before[slash + 1..];
    (!query.contains(char::is_whitespace)).then(|| query.to_string())
}

/// Removes the `/query` trigger and performs the item's action on the focused block.
pub fn apply_slash_item(state: &EditorState, item: &SlashItem) -> EditorState {
    let state = strip_trigger(state);
    let Some(block) = current_block(&state) else {
        return state;
    };
    let key = block.key().clone();

    match item.action {
        SlashAction::TurnInto(kind) => {
            let next = ops::set_block_type(&state, &key, kind);
            match kind {
                BlockKind::CheckList => {
                    ops::set_block_data(&next, &key, &DataPatch::set("checked", Value::Bool(false)))
                }
                BlockKind::ToggleList => {
                    ops::set_block_data(&next, &key, &DataPatch::set("state", Value::Bool(true)))
                }
                _ => next,
            }
        }
        SlashAction::InsertDivider(kind) => {
            let (next, placed) = place_block(&state, kind, BlockData::new());
            text_block_after(&next, &placed)
        }
        SlashAction::InsertTable { rows, cols } => {
            let (next, placed) = place_block(&state, BlockKind::Table, table_data(rows, cols));
            text_block_after(&next, &placed)
        }
        SlashAction::InsertEmbed(kind) => {
            let (next, placed) = place_block(&state, kind, BlockData::new());
            next.with_selection(Selection::caret(placed, 0))
        }
    }
}

fn strip_trigger(state: &EditorState) -> EditorState {
    let Some(query) = slash_query(state) else {
        return state.clone();
    };
    let focus = state.selection().focus.clone();
    let start = focus.offset.saturating_sub(query.chars().count() + 1);
    let range = Selection::range(Point::new(focus.key.clone(), start), focus);
    ops::remove_range(state, &range)
}

/// Reuses the focused block when it is an empty text line; otherwise inserts after it.
fn place_block(state: &EditorState, kind: BlockKind, data: BlockData) -> (EditorState, BlockKey) {
    let Some(block) = current_block(state) else {
        return (state.clone(), state.selection().focus.key.clone());
    };
    let key = block.key().clone();
    if block.kind() == BlockKind::Text && block.is_empty() {
        let next = ops::set_block_type(state, &key, kind);
        let patch = DataPatch {
            set: data,
            remove: Vec::new(),
        };
        return (ops::set_block_data(&next, &key, &patch), key);
    }
    let depth = block.depth();
    let next = ops::insert_empty_block_after(state, &key, NewBlock::new(kind, depth).data(data));
    let placed = next.selection().focus.key.clone();
    (next, placed)
}
