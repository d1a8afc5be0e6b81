use crate::config::EditorConfig;
use crate::core::{BlockKey, BlockKind, EditorState};
use crate::ops;
use crate::plugin::BlockPlugin;

/// Clamps depths so every block sits at most one level below its predecessor and
/// within the configured maximum.
pub struct DepthPlugin;

impl BlockPlugin for DepthPlugin {
    fn id(&self) -> &'static str {
        "depth"
    }

    fn kinds(&self) -> &'static [BlockKind] {
        &[]
    }

    fn on_change(&self, state: &EditorState, config: &EditorConfig) -> Option<EditorState> {
        let mut fixes: Vec<(BlockKey, usize)> = Vec::new();
        let mut previous: Option<usize> = None;
        for block in state.content().blocks() {
            let limit = match previous {
                None => 0,
                Some(depth) => (depth + 1).min(config.max_depth),
            };
            let depth = block.depth().min(limit);
            if depth != block.depth() {
                fixes.push((block.key().clone(), depth));
            }
            previous = Some(depth);
        }
        if fixes.is_empty() {
            return None;
        }

        tracing::debug!(blocks = fixes.len(), "clamping block depths");
        let mut next = state.clone();
        for (key, depth) in fixes {
            next = ops::set_block_depth(&next, &key, depth);
        }
        Some(next)
    }

    fn on_change_priority(&self) -> i32 {
        -50
    }
}
