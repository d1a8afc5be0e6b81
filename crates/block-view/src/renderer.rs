use std::collections::HashMap;
use std::rc::Rc;

use docblocks_core::plugins::{numbered_list_index, table_rows};
use docblocks_core::{Block, BlockKind, EditorResult, EditorState, EntityKind, PluginRegistry};

use crate::decorators::{with_comments, with_drag_handle, with_static_readonly, with_text_style};
use crate::view::{BlockBody, BlockView, ListMarker, TextRun};

/// Everything a renderer may look at besides the block itself.
#[derive(Clone, Copy)]
pub struct RenderContext<'a> {
    pub state: &'a EditorState,
    pub registry: &'a PluginRegistry,
    /// Ambient: the document is shown inside a read-only preview.
    pub preview: bool,
    /// Prop seen by renderers. Set by [`with_static_readonly`] under a preview.
    pub readonly: bool,
}

impl<'a> RenderContext<'a> {
    pub fn new(state: &'a EditorState, registry: &'a PluginRegistry) -> Self {
        Self {
            state,
            registry,
            preview: false,
            readonly: false,
        }
    }

    pub fn preview(mut self, preview: bool) -> Self {
        self.preview = preview;
        self
    }
}

pub type Renderer = Rc<dyn Fn(&RenderContext<'_>, &Block) -> BlockView>;

/// Wraps a renderer, returning one with the same signature.
pub type Decorator = fn(Renderer) -> Renderer;

/// Applies `decorators` left to right: the first one listed wraps the base renderer
/// directly, the last one listed is outermost.
pub fn compose(base: Renderer, decorators: &[Decorator]) -> Renderer {
    decorators
        .iter()
        .fold(base, |renderer, decorate| decorate(renderer))
}

const TITLE_DECORATORS: &[Decorator] = &[with_text_style];
const TEXT_DECORATORS: &[Decorator] = &[with_text_style, with_comments, with_drag_handle];
const BLOCK_DECORATORS: &[Decorator] = &[with_text_style, with_drag_handle];

/// Groups of block kinds that share a decorator stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockFamily {
    Title,
    Text,
    List,
    Toggle,
    Table,
    Divider,
    Embed,
    Atomic,
}

impl BlockFamily {
    pub const ALL: [BlockFamily; 8] = [
        BlockFamily::Title,
        BlockFamily::Text,
        BlockFamily::List,
        BlockFamily::Toggle,
        BlockFamily::Table,
        BlockFamily::Divider,
        BlockFamily::Embed,
        BlockFamily::Atomic,
    ];

    pub fn of(kind: BlockKind) -> Self {
        match kind {
            BlockKind::Title => BlockFamily::Title,
            BlockKind::ToggleList => BlockFamily::Toggle,
            BlockKind::Table => BlockFamily::Table,
            BlockKind::Atomic => BlockFamily::Atomic,
            kind if kind.is_list() => BlockFamily::List,
            kind if kind.is_divider() => BlockFamily::Divider,
            kind if kind.is_embed() => BlockFamily::Embed,
            _ => BlockFamily::Text,
        }
    }

    /// Decorators applied to every block of the family, in application order.
    pub fn decorators(self) -> &'static [Decorator] {
        match self {
            BlockFamily::Title => TITLE_DECORATORS,
            BlockFamily::Text | BlockFamily::List | BlockFamily::Toggle => TEXT_DECORATORS,
            BlockFamily::Table
            | BlockFamily::Divider
            | BlockFamily::Embed
            | BlockFamily::Atomic => BLOCK_DECORATORS,
        }
    }
}

/// Composed renderer per block family.
pub struct ViewRegistry {
    renderers: HashMap<BlockFamily, Renderer>,
}

impl ViewRegistry {
    pub fn standard() -> Self {
        Self::build(|family| family.decorators().to_vec())
    }

    /// Same stacks as [`ViewRegistry::standard`] with [`with_static_readonly`]
    /// outermost, for embedded read-only previews.
    pub fn preview() -> Self {
        Self::build(|family| {
            let mut decorators = family.decorators().to_vec();
            decorators.push(with_static_readonly);
            decorators
        })
    }

    fn build(stack: impl Fn(BlockFamily) -> Vec<Decorator>) -> Self {
        let renderers = BlockFamily::ALL
            .into_iter()
            .map(|family| (family, compose(base_renderer(), &stack(family))))
            .collect();
        Self { renderers }
    }

    /// Replaces the decorator stack of one family.
    pub fn set_decorators(&mut self, family: BlockFamily, decorators: &[Decorator]) {
        self.renderers
            .insert(family, compose(base_renderer(), decorators));
    }

    pub fn render_block(&self, cx: &RenderContext<'_>, block: &Block) -> BlockView {
        match self.renderers.get(&BlockFamily::of(block.kind())) {
            Some(renderer) => renderer(cx, block),
            None => base_renderer()(cx, block),
        }
    }

    /// Renders every visible block in document order.
    ///
    /// Children of a collapsed toggle are skipped. Fails when a block has no plugin.
    pub fn render_document(&self, cx: &RenderContext<'_>) -> EditorResult<Vec<BlockView>> {
        let content = cx.state.content();
        let mut views = Vec::with_capacity(content.len());
        let mut collapsed_at: Option<usize> = None;

        for block in content.blocks() {
            cx.registry.resolve_or_err(block, content)?;

            if let Some(depth) = collapsed_at {
                if block.depth() > depth {
                    continue;
                }
                collapsed_at = None;
            }
            if block.kind() == BlockKind::ToggleList && !block.data_bool("state") {
                collapsed_at = Some(block.depth());
            }
            views.push(self.render_block(cx, block));
        }

        tracing::trace!(blocks = content.len(), visible = views.len(), "rendered document");
        Ok(views)
    }
}

/// Turns a block into its undecorated view.
pub fn base_renderer() -> Renderer {
    Rc::new(|cx: &RenderContext<'_>, block: &Block| BlockView {
        key: block.key().clone(),
        kind: block.kind(),
        depth: block.depth(),
        classes: Vec::new(),
        body: block_body(cx, block),
        marker: list_marker(cx, block),
        readonly: cx.readonly || !block.is_editable(),
        comments: None,
        drag_handle: None,
    })
}

fn block_body(cx: &RenderContext<'_>, block: &Block) -> BlockBody {
    let content = cx.state.content();
    let kind = block.kind();
    if kind == BlockKind::Table {
        return BlockBody::Table {
            rows: table_rows(block),
        };
    }
    if kind.is_divider() {
        return BlockBody::Divider {
            dashed: kind == BlockKind::DashDivider,
        };
    }
    if kind.is_embed() {
        let live = block.data_bool("isShow");
        let url = block
            .block_entity()
            .and_then(|key| content.entity(key))
            .and_then(|entity| entity.data_str("url"))
            .filter(|_| live)
            .unwrap_or(block.text())
            .to_string();
        return BlockBody::Embed {
            url,
            live,
            error: block.data_str("error").map(str::to_string),
        };
    }
    if kind == BlockKind::Atomic {
        let entity = block.block_entity().and_then(|key| content.entity(key));
        return BlockBody::Atomic {
            kind: entity.map(|e| e.kind),
            data: entity.map(|e| e.data.clone()).unwrap_or_default(),
        };
    }
    BlockBody::Text {
        runs: text_runs(cx, block),
    }
}

/// Splits the text wherever styles or entity change.
fn text_runs(cx: &RenderContext<'_>, block: &Block) -> Vec<TextRun> {
    let content = cx.state.content();
    let mut runs: Vec<TextRun> = Vec::new();
    let mut current = None;

    for (ch, meta) in block.text().chars().zip(block.characters()) {
        if current != Some(*meta) {
            let entity = meta.entity.and_then(|key| content.entity(key).map(|e| (key, e)));
            runs.push(TextRun {
                text: String::new(),
                styles: meta.styles,
                link: entity
                    .filter(|(_, e)| e.kind == EntityKind::Link)
                    .and_then(|(_, e)| e.data_str("url"))
                    .map(str::to_string),
                comment: entity
                    .filter(|(_, e)| e.kind == EntityKind::Comment)
                    .map(|(key, _)| key),
            });
            current = Some(*meta);
        }
        if let Some(run) = runs.last_mut() {
            run.text.push(ch);
        }
    }
    runs
}

fn list_marker(cx: &RenderContext<'_>, block: &Block) -> Option<ListMarker> {
    match block.kind() {
        BlockKind::BulletList => Some(ListMarker::Bullet),
        BlockKind::NumberedList => numbered_list_index(cx.state.content(), block.key())
            .map(|index| ListMarker::Number { index }),
        BlockKind::CheckList => Some(ListMarker::Check {
            checked: block.data_bool("checked"),
        }),
        BlockKind::ToggleList => Some(ListMarker::Toggle {
            open: block.data_bool("state"),
        }),
        _ => None,
    }
}
