//! Renderer wrappers. Each takes a renderer and returns one with the same signature,
//! so stacks compose in any order.

use std::rc::Rc;

use docblocks_core::{Block, BlockKind, comment_threads};

use crate::renderer::{RenderContext, Renderer};
use crate::view::{CommentOverlay, DragHandle};

/// Adds the comment overlay when the block carries comment threads.
pub fn with_comments(inner: Renderer) -> Renderer {
    Rc::new(move |cx: &RenderContext<'_>, block: &Block| {
        let mut view = inner(cx, block);
        let threads = comment_threads(cx.state.content(), block.key());
        if !threads.is_empty() {
            view.comments = Some(CommentOverlay::from_threads(&threads));
        }
        view
    })
}

/// Adds the drag affordance. The title never gets one.
pub fn with_drag_handle(inner: Renderer) -> Renderer {
    Rc::new(move |cx: &RenderContext<'_>, block: &Block| {
        let mut view = inner(cx, block);
        if block.kind() != BlockKind::Title {
            view.drag_handle = Some(DragHandle {
                key: block.key().clone(),
                enabled: !cx.readonly,
            });
        }
        view
    })
}

/// Hands the wrapped renderer a `readonly` context when rendering inside a preview.
pub fn with_static_readonly(inner: Renderer) -> Renderer {
    Rc::new(move |cx: &RenderContext<'_>, block: &Block| {
        if !cx.preview {
            return inner(cx, block);
        }
        let forced = RenderContext {
            readonly: true,
            ..*cx
        };
        inner(&forced, block)
    })
}

/// Adds the plugin's style class plus a depth class for nested blocks.
pub fn with_text_style(inner: Renderer) -> Renderer {
    Rc::new(move |cx: &RenderContext<'_>, block: &Block| {
        let mut view = inner(cx, block);
        if let Some(class) = cx.registry.style_class(block, cx.state.content()) {
            view.classes
                .extend(class.split_whitespace().map(str::to_string));
        }
        if block.depth() > 0 {
            view.classes.push(format!("block-depth-{}", block.depth()));
        }
        view
    })
}

