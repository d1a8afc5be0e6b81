use serde_json::Value;

use crate::config::EditorConfig;
use crate::core::{Block, BlockData, BlockKey, BlockKind, DataPatch, EditorState};
use crate::keys::{BlockCommand, Key, KeyPress};
use crate::ops;
use crate::plugin::BlockPlugin;
use crate::selection::CursorContext;

use super::{handle_atomic_command, plain, text_block_after};

/// Table cells live in `data.rows` as an array of string arrays.
pub struct TablePlugin;

impl BlockPlugin for TablePlugin {
    fn id(&self) -> &'static str {
        "table"
    }

    fn kinds(&self) -> &'static [BlockKind] {
        &[BlockKind::Table]
    }

    fn style_class(&self, _block: &Block) -> &'static str {
        "block-table"
    }

    fn key_binding(
        &self,
        press: &KeyPress,
        cx: &CursorContext<'_>,
        _config: &EditorConfig,
    ) -> Option<BlockCommand> {
        if plain(press, Key::Enter) {
            return Some(BlockCommand::InsertBlockAfterTable);
        }
        if plain(press, Key::Backspace) && cx.at_start() {
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
        match command {
            BlockCommand::InsertBlockAfterTable => {
                let key = state.selection().focus.key.clone();
                Some(text_block_after(state, &key))
            }
            _ => handle_atomic_command(command, state),
        }
    }
}

/// Data for an empty `rows` x `cols` table.
pub fn table_data(rows: usize, cols: usize) -> BlockData {
    let row = Value::Array(vec![Value::String(String::new()); cols]);
    let mut data = BlockData::new();
    data.insert("rows".to_string(), Value::Array(vec![row; rows]));
    data
}

/// Cell text by row. Non-string cells read as empty.
pub fn table_rows(block: &Block) -> Vec<Vec<String>> {
    let Some(Value::Array(rows)) = block.data().get("rows") else {
        return Vec::new();
    };
    rows.iter()
        .map(|row| match row {
            Value::Array(cells) => cells
                .iter()
                .map(|cell| cell.as_str().unwrap_or_default().to_string())
                .collect(),
            _ => Vec::new(),
        })
        .collect()
}

/// Writes one cell, growing the grid when needed.
pub fn set_table_cell(
    state: &EditorState,
    key: &BlockKey,
    row: usize,
    col: usize,
    text: &str,
) -> Option<EditorState> {
    let block = state.content().block(key)?;
    if block.kind() != BlockKind::Table {
        return None;
    }
    let mut rows = table_rows(block);
    let width = rows.iter().map(Vec::len).max().unwrap_or(0).max(col + 1);
    if rows.len() <= row {
        rows.resize(row + 1, Vec::new());
    }
    for cells in &mut rows {
        cells.resize(width, String::new());
    }
    rows[row][col] = text.to_string();

    let value = Value::Array(
        rows.into_iter()
            .map(|cells| Value::Array(cells.into_iter().map(Value::String).collect()))
            .collect(),
    );
    Some(ops::set_block_data(state, key, &DataPatch::set("rows", value)))
}
