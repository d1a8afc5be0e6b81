use docblocks_core::{
    BlockKey, BlockKind, EditorHandle, EditorResult, EditorState, StateUpdate, move_block,
};
use docblocks_reorder::{Ordered, plan_move};
use serde::{Deserialize, Serialize};

/// Pointer release over a block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DragEnd {
    pub active: BlockKey,
    pub over: BlockKey,
    /// Pointer offset from the vertical midpoint of `over`; negative is the upper half.
    pub delta_y: f32,
}

struct Slot<'a> {
    key: &'a BlockKey,
}

impl<'a> Ordered for Slot<'a> {
    type Id = BlockKey;

    fn id(&self) -> &BlockKey {
        self.key
    }

    fn set_order(&mut self, _order: usize) {}
}

/// The block `drag.active` should follow after the drop, or `None` when nothing moves.
///
/// The title never moves, and nothing lands above it: a drop before the title is
/// treated as a drop right after it.
pub fn drop_target(state: &EditorState, drag: &DragEnd) -> Option<BlockKey> {
    let content = state.content();
    let active = content.block(&drag.active)?;
    if active.kind() == BlockKind::Title || drag.active == drag.over {
        return None;
    }

    let slots: Vec<Slot<'_>> = content.blocks().map(|b| Slot { key: b.key() }).collect();
    let plan = plan_move(&slots, &drag.active, &drag.over, drag.delta_y)?;
    if plan.from == plan.to {
        return None;
    }

    let mut order: Vec<&BlockKey> = slots.iter().map(|s| s.key).collect();
    let moved = order.remove(plan.from);
    order.insert(plan.to, moved);

    let before = match plan.to.checked_sub(1) {
        Some(ix) => order[ix],
        None => order.get(1).copied()?,
    };
    if content.index_of(before)? + 1 == plan.from {
        return None;
    }
    Some(before.clone())
}

/// Applies a drop to `state`. Unknown keys and no-op drops return the state unchanged.
pub fn reorder_blocks(state: &EditorState, drag: &DragEnd) -> EditorState {
    match drop_target(state, drag) {
        Some(before) => {
            tracing::debug!(active = %drag.active, after = %before, "moving block");
            move_block(state, &drag.active, &before)
        }
        None => state.clone(),
    }
}

/// Commits a drop through the host surface, against whatever state is current.
pub fn drop_block(handle: &EditorHandle, drag: &DragEnd) -> EditorResult<()> {
    let drag = drag.clone();
    handle.set_editor_state(StateUpdate::update(move |state| {
        reorder_blocks(state, &drag)
    }))
}
