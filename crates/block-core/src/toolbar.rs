use crate::core::{EditorState, InlineStyle, Point, Selection};
use crate::entity::{Entity, EntityKind};
use crate::ops;

/// Toggles an inline marker over the current selection.
pub fn toggle_style(state: &EditorState, style: InlineStyle) -> EditorState {
    let selection = state.selection().clone();
    ops::toggle_inline_style(state, &selection, style)
}

/// Whether every selected character carries `style`.
pub fn style_active(state: &EditorState, style: InlineStyle) -> bool {
    let selection = state.selection();
    if selection.is_collapsed() {
        return false;
    }
    ops::block_ranges(state.content(), selection)
        .into_iter()
        .all(|(ix, range)| {
            state
                .content()
                .block_at(ix)
                .is_some_and(|b| b.characters()[range].iter().all(|c| c.styles.contains(style)))
        })
}

/// Links the selected text to `url`. Collapsed selections are left alone.
pub fn set_link(state: &EditorState, url: &str, target: &str) -> EditorState {
    let selection = state.selection().clone();
    if selection.is_collapsed() {
        return state.clone();
    }
    let (next, key) = ops::create_entity(state, Entity::link(url, target));
    ops::apply_entity(&next, &selection, Some(key))
}

/// Removes links from the selection, leaving other entities in place.
pub fn unset_link(state: &EditorState) -> EditorState {
    let selection = state.selection().clone();
    if selection.is_collapsed() {
        return state.clone();
    }
    let content = state.content();
    let mut next = state.clone();
    for (ix, range) in ops::block_ranges(content, &selection) {
        let Some(block) = content.block_at(ix) else {
            continue;
        };
        let mut start = None;
        for offset in range.clone().chain(std::iter::once(range.end)) {
            let is_link = offset < range.end
                && block
                    .entity_at(offset)
                    .and_then(|key| content.entity(key))
                    .is_some_and(|e| e.kind == EntityKind::Link);
            match (is_link, start) {
                (true, None) => start = Some(offset),
                (false, Some(s)) => {
                    let run = Selection::range(
                        Point::new(block.key().clone(), s),
                        Point::new(block.key().clone(), offset),
                    );
                    next = ops::remove_entity(&next, &run);
                    start = None;
                }
                _ => {}
            }
        }
    }
    next.with_selection(selection)
}

/// The link URL under the selection focus, if any.
pub fn link_at_selection(state: &EditorState) -> Option<String> {
    let focus = &state.selection().focus;
    let block = state.content().block(&focus.key)?;
    let key = block.entity_at(focus.offset.saturating_sub(1))?;
    let entity = state.content().entity(key)?;
    (entity.kind == EntityKind::Link)
        .then(|| entity.data_str("url").map(str::to_string))
        .flatten()
}
