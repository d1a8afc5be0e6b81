use std::ops::Range;

use crate::core::{
    Block, BlockData, BlockKey, BlockKind, CharacterMeta, ChangeKind, ContentModel, DataPatch,
    EditorState, InlineStyle, Selection, char_len,
};
use crate::entity::{Entity, EntityKey, EntityMutability};

/// A block to be created by [`insert_empty_block_after`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewBlock {
    pub kind: BlockKind,
    pub depth: usize,
    pub text: String,
    pub data: BlockData,
}

impl NewBlock {
    pub fn new(kind: BlockKind, depth: usize) -> Self {
        Self {
            kind,
            depth,
            text: String::new(),
            data: BlockData::new(),
        }
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn data(mut self, data: BlockData) -> Self {
        self.data = data;
        self
    }
}

/// Inserts `text` at the selection, replacing a non-collapsed range first.
///
/// Inserted characters take the inline styles of the character before the caret and
/// continue a mutable entity only when the caret sits inside it.
pub fn insert_text(state: &EditorState, text: &str) -> EditorState {
    let state = if state.selection().is_collapsed() {
        state.clone()
    } else {
        remove_range(state, &state.selection().clone())
    };
    if text.is_empty() {
        return state;
    }

    let content = state.content();
    let focus = state.selection().focus.clone();
    let ix = content.expect_index(&focus.key);
    let block = block_at(content, ix);

    let offset = focus.offset.min(block.len());
    let styles = offset
        .checked_sub(1)
        .map(|prev| block.styles_at(prev))
        .unwrap_or_default();
    let entity = match (
        offset.checked_sub(1).and_then(|prev| block.entity_at(prev)),
        block.entity_at(offset),
    ) {
        (Some(left), Some(right)) if left == right => content
            .entity(left)
            .filter(|e| e.mutability == EntityMutability::Mutable)
            .map(|_| left),
        _ => None,
    };

    let meta = CharacterMeta { styles, entity };
    let inserted = vec![meta; char_len(text)];
    let next_block = block.splice(offset..offset, text, &inserted);

    let mut next = content.clone();
    next.replace_block(ix, next_block);
    let caret = Selection::caret(focus.key, offset + inserted.len());
    state.push_with_selection(next, caret, ChangeKind::InsertCharacters)
}

/// Removes the characters covered by `range`. Across blocks the first block keeps its
/// prefix and adopts the suffix of the last block; blocks in between are dropped.
pub fn remove_range(state: &EditorState, range: &Selection) -> EditorState {
    if range.is_collapsed() {
        return state.clone();
    }
    let content = state.content();
    let (start, end) = range.ordered(content);
    let start_ix = content.expect_index(&start.key);
    let end_ix = content.expect_index(&end.key);

    let mut next = content.clone();
    if start_ix == end_ix {
        let block = block_at(content, start_ix);
        next.replace_block(start_ix, block.splice(start.offset..end.offset, "", &[]));
    } else {
        let first = block_at(content, start_ix);
        let last = block_at(content, end_ix);
        let (tail, tail_chars) = last.slice(end.offset..last.len());
        next.replace_block(
            start_ix,
            first.splice(start.offset..first.len(), &tail, &tail_chars),
        );
        for ix in (start_ix + 1..=end_ix).rev() {
            next.remove_block_at(ix);
        }
        next.prune_entities();
    }

    let caret = Selection::collapsed(start);
    state.push_with_selection(next, caret, ChangeKind::RemoveRange)
}

pub fn backspace_character(state: &EditorState) -> EditorState {
    let focus = state.selection().focus.clone();
    if focus.offset == 0 {
        return state.clone();
    }
    let content = state.content();
    let ix = content.expect_index(&focus.key);
    let block = block_at(content, ix);
    let mut next = content.clone();
    next.replace_block(ix, block.splice(focus.offset - 1..focus.offset, "", &[]));
    let caret = Selection::caret(focus.key, focus.offset - 1);
    state.push_with_selection(next, caret, ChangeKind::BackspaceCharacter)
}

/// Cuts the active block at `selection` into two siblings.
///
/// The second block gets a fresh key. It keeps kind, depth and data unless
/// `kind_override` is given, in which case it starts with empty data.
pub fn split_block(
    state: &EditorState,
    selection: &Selection,
    kind_override: Option<BlockKind>,
) -> EditorState {
    let state = if selection.is_collapsed() {
        state.with_selection(selection.clone())
    } else {
        remove_range(state, selection)
    };

    let content = state.content();
    let focus = state.selection().focus.clone();
    let ix = content.expect_index(&focus.key);
    let block = block_at(content, ix);

    let (head, head_chars) = block.slice(0..focus.offset);
    let (tail, tail_chars) = block.slice(focus.offset..block.len());

    let mut next = content.clone();
    let new_key = next.generate_key();
    let (kind, data) = match kind_override {
        Some(kind) => (kind, BlockData::new()),
        None => (block.kind(), block.data().clone()),
    };
    let tail_block = Block::new(new_key.clone(), kind, "")
        .with_depth(block.depth())
        .with_data(data)
        .with_characters(tail, tail_chars);

    next.replace_block(ix, block.clone().with_characters(head, head_chars));
    next.insert_block(ix + 1, tail_block);

    state.push_with_selection(next, Selection::caret(new_key, 0), ChangeKind::SplitBlock)
}

pub fn set_block_type(state: &EditorState, key: &BlockKey, kind: BlockKind) -> EditorState {
    let content = state.content();
    let ix = content.expect_index(key);
    let block = block_at(content, ix);
    let mut next = content.clone();
    next.replace_block(ix, block.clone().with_kind(kind));
    state.push(next, ChangeKind::ChangeBlockType)
}

pub fn set_block_depth(state: &EditorState, key: &BlockKey, depth: usize) -> EditorState {
    let content = state.content();
    let ix = content.expect_index(key);
    let block = block_at(content, ix);
    let mut next = content.clone();
    next.replace_block(ix, block.clone().with_depth(depth));
    state.push(next, ChangeKind::AdjustDepth)
}

pub fn set_block_data(state: &EditorState, key: &BlockKey, patch: &DataPatch) -> EditorState {
    let content = state.content();
    let ix = content.expect_index(key);
    let block = block_at(content, ix);
    let mut data = block.data().clone();
    patch.apply_to(&mut data);
    let mut next = content.clone();
    next.replace_block(ix, block.clone().with_data(data));
    state.push(next, ChangeKind::ChangeBlockData)
}

/// Joins the block with the one before it. The previous block survives with its own
/// kind and depth; the caret lands at the join point. A no-op on the first block.
pub fn merge_with_previous(state: &EditorState, key: &BlockKey) -> EditorState {
    let content = state.content();
    let ix = content.expect_index(key);
    if ix == 0 {
        return state.clone();
    }
    let previous = block_at(content, ix - 1);
    let current = block_at(content, ix);
    let join = previous.len();

    let mut next = content.clone();
    next.replace_block(
        ix - 1,
        previous.splice(join..join, current.text(), current.characters()),
    );
    next.remove_block_at(ix);

    let caret = Selection::caret(previous.key().clone(), join);
    state.push_with_selection(next, caret, ChangeKind::MergeBlocks)
}

pub fn create_entity(state: &EditorState, entity: Entity) -> (EditorState, EntityKey) {
    let mut next = state.content().clone();
    let key = next.entities_mut().add(entity);
    (state.amend(next), key)
}

/// Points every character in `range` at `entity` (or clears the reference with `None`).
///
/// Characters held by an immutable entity (atomic and confirmed embed blocks) keep it.
/// Entities no longer referenced afterwards are dropped from the table.
pub fn apply_entity(
    state: &EditorState,
    range: &Selection,
    entity: Option<EntityKey>,
) -> EditorState {
    let content = state.content();
    if let Some(key) = entity {
        assert!(
            content.entities().contains(key),
            "apply_entity: unknown entity key `{key}`"
        );
    }

    let locked = |meta: &CharacterMeta| {
        meta.entity
            .and_then(|key| content.entity(key))
            .is_some_and(|e| e.mutability == EntityMutability::Immutable)
    };
    let mut next = map_range(content, range, |meta| {
        if locked(&meta) { meta } else { meta.with_entity(entity) }
    });
    next.prune_entities();
    let change = if entity.is_some() {
        ChangeKind::ApplyEntity
    } else {
        ChangeKind::RemoveEntity
    };
    state.push(next, change)
}

pub fn remove_entity(state: &EditorState, range: &Selection) -> EditorState {
    apply_entity(state, range, None)
}

/// Clears every reference to `key` and drops the entity.
pub fn remove_entity_everywhere(state: &EditorState, key: EntityKey) -> EditorState {
    let content = state.content();
    let mut next = content.clone();
    for (ix, block) in content.blocks().enumerate() {
        if !block.characters().iter().any(|c| c.entity == Some(key)) {
            continue;
        }
        let characters = block
            .characters()
            .iter()
            .map(|c| {
                if c.entity == Some(key) {
                    c.with_entity(None)
                } else {
                    *c
                }
            })
            .collect();
        next.replace_block(
            ix,
            block.clone().with_characters(block.text().to_string(), characters),
        );
    }
    next.entities_mut().remove(key);
    state.push(next, ChangeKind::RemoveEntity)
}

/// Patches an entity's data on a cloned table; earlier snapshots keep the old payload.
pub fn merge_entity_data(state: &EditorState, key: EntityKey, patch: &DataPatch) -> EditorState {
    let mut next = state.content().clone();
    let found = next.entities_mut().merge_data(key, patch);
    assert!(found, "merge_entity_data: unknown entity key `{key}`");
    state.push(next, ChangeKind::ChangeEntityData)
}

/// Inserts a fresh block directly after `key` and puts the caret at its start.
pub fn insert_empty_block_after(
    state: &EditorState,
    key: &BlockKey,
    block: NewBlock,
) -> EditorState {
    let content = state.content();
    let ix = content.expect_index(key);
    let mut next = content.clone();
    let new_key = next.generate_key();
    next.insert_block(
        ix + 1,
        Block::new(new_key.clone(), block.kind, block.text)
            .with_depth(block.depth)
            .with_data(block.data),
    );
    state.push_with_selection(next, Selection::caret(new_key, 0), ChangeKind::InsertFragment)
}

/// Inserts a fresh block directly before `key`, leaving the selection where it was.
pub fn insert_empty_block_before(
    state: &EditorState,
    key: &BlockKey,
    block: NewBlock,
) -> EditorState {
    let content = state.content();
    let ix = content.expect_index(key);
    let mut next = content.clone();
    let new_key = next.generate_key();
    next.insert_block(
        ix,
        Block::new(new_key, block.kind, block.text)
            .with_depth(block.depth)
            .with_data(block.data),
    );
    state.push(next, ChangeKind::InsertFragment)
}

pub fn move_block(state: &EditorState, active_key: &BlockKey, before_key: &BlockKey) -> EditorState {
    let content = state.content();
    let from = content.expect_index(active_key);
    content.expect_index(before_key);
    if active_key == before_key {
        return state.clone();
    }

    let mut next = content.clone();
    let moved = next.remove_block_at(from);
    let anchor = next.expect_index(before_key);
    next.insert_block(anchor + 1, (*moved).clone());
    state.push(next, ChangeKind::MoveBlock)
}

/// Removes a block and any entity only it referenced.
pub fn remove_block(state: &EditorState, key: &BlockKey) -> EditorState {
    let content = state.content();
    let ix = content.expect_index(key);
    let mut next = content.clone();
    next.remove_block_at(ix);
    next.prune_entities();

    let selection = if state.selection().focus.key == *key {
        match ix.checked_sub(1).and_then(|ix| next.block_at(ix)) {
            Some(prev) => Selection::caret(prev.key().clone(), prev.len()),
            None => match next.first_block() {
                Some(first) => Selection::caret(first.key().clone(), 0),
                None => state.selection().clone(),
            },
        }
    } else {
        state.selection().clone()
    };
    state.push_with_selection(next, selection, ChangeKind::RemoveBlock)
}

/// Adds `style` to every selected character, or removes it when all already carry it.
pub fn toggle_inline_style(
    state: &EditorState,
    range: &Selection,
    style: InlineStyle,
) -> EditorState {
    if range.is_collapsed() {
        return state.clone();
    }
    let content = state.content();
    let all_set = range_characters(content, range).all(|meta| meta.styles.contains(style));
    let next = map_range(content, range, |meta| CharacterMeta {
        styles: meta.styles.with(style, !all_set),
        ..meta
    });
    state.push(next, ChangeKind::ChangeInlineStyle)
}

/// Inserts an atomic block referencing `entity` after `after`, followed by an empty text
/// block that receives the caret.
pub fn insert_atomic_block(state: &EditorState, after: &BlockKey, entity: EntityKey) -> EditorState {
    let content = state.content();
    let ix = content.expect_index(after);
    assert!(
        content.entities().contains(entity),
        "insert_atomic_block: unknown entity key `{entity}`"
    );
    let depth = block_at(content, ix).depth();

    let mut next = content.clone();
    let atomic_key = next.generate_key();
    let text_key = next.generate_key();
    let atomic = Block::new(atomic_key, BlockKind::Atomic, "").with_depth(depth).with_characters(
        " ".to_string(),
        vec![CharacterMeta::default().with_entity(Some(entity))],
    );
    next.insert_block(ix + 1, atomic);
    next.insert_block(
        ix + 2,
        Block::new(text_key.clone(), BlockKind::Text, "").with_depth(depth),
    );
    state.push_with_selection(next, Selection::caret(text_key, 0), ChangeKind::InsertFragment)
}

pub fn shared_entity(content: &ContentModel, range: &Selection) -> Option<EntityKey> {
    let mut iter = range_characters(content, range);
    let first = iter.next()?.entity?;
    iter.all(|meta| meta.entity == Some(first)).then_some(first)
}

pub fn block_ranges(content: &ContentModel, range: &Selection) -> Vec<(usize, Range<usize>)> {
    let (start, end) = range.ordered(content);
    let start_ix = content.expect_index(&start.key);
    let end_ix = content.expect_index(&end.key);
    (start_ix..=end_ix)
        .map(|ix| {
            let len = block_at(content, ix).len();
            let from = if ix == start_ix { start.offset.min(len) } else { 0 };
            let to = if ix == end_ix { end.offset.min(len) } else { len };
            (ix, from..to.max(from))
        })
        .collect()
}

fn range_characters<'a>(
    content: &'a ContentModel,
    range: &Selection,
) -> impl Iterator<Item = CharacterMeta> + 'a {
    block_ranges(content, range)
        .into_iter()
        .flat_map(move |(ix, r)| block_at(content, ix).characters()[r].to_vec())
}

fn map_range(
    content: &ContentModel,
    range: &Selection,
    f: impl Fn(CharacterMeta) -> CharacterMeta,
) -> ContentModel {
    let mut next = content.clone();
    for (ix, r) in block_ranges(content, range) {
        if r.is_empty() {
            continue;
        }
        let block = block_at(content, ix);
        let characters = block
            .characters()
            .iter()
            .enumerate()
            .map(|(i, c)| if r.contains(&i) { f(*c) } else { *c })
            .collect();
        next.replace_block(
            ix,
            block.clone().with_characters(block.text().to_string(), characters),
        );
    }
    next
}

fn block_at(content: &ContentModel, ix: usize) -> &Block {
    match content.block_at(ix) {
        Some(block) => block,
        None => panic!("block index {ix} out of bounds ({} blocks)", content.len()),
    }
}
