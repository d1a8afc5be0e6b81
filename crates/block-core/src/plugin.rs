use std::collections::HashMap;

use crate::config::EditorConfig;
use crate::core::{Block, BlockKind, ChangeKind, ContentModel, EditorState};
use crate::error::{EditorError, EditorResult, RegistryError};
use crate::keys::{BlockCommand, KeyPress};
use crate::plugins;
use crate::selection::CursorContext;

/// Capabilities a block type registers: render match, style class, key binding,
/// command handling and an optional on-change hook.
pub trait BlockPlugin: Send + Sync {
    fn id(&self) -> &'static str;

    /// Kinds this plugin renders. Hook-only plugins return an empty slice.
    fn kinds(&self) -> &'static [BlockKind];

    fn matches(&self, block: &Block, _content: &ContentModel) -> bool {
        self.kinds().contains(&block.kind())
    }

    fn style_class(&self, _block: &Block) -> &'static str {
        ""
    }

    fn key_binding(
        &self,
        _press: &KeyPress,
        _cx: &CursorContext<'_>,
        _config: &EditorConfig,
    ) -> Option<BlockCommand> {
        None
    }

    fn handle_command(
        &self,
        _command: BlockCommand,
        _state: &EditorState,
        _config: &EditorConfig,
    ) -> Option<EditorState> {
        None
    }

    /// Runs after every transition. Returning `Some` replaces the state and schedules
    /// another pass over all hooks.
    fn on_change(&self, _state: &EditorState, _config: &EditorConfig) -> Option<EditorState> {
        None
    }

    /// Lower runs first.
    fn on_change_priority(&self) -> i32 {
        0
    }
}

pub struct TransformOutcome {
    pub state: EditorState,
    /// The key press is fully handled; skip key bindings and default handling.
    pub consumed: bool,
}

/// Rewrites the state before a key press reaches the block's key binding.
pub trait InputTransform: Send + Sync {
    fn id(&self) -> &'static str;
    fn transform(
        &self,
        press: &KeyPress,
        state: &EditorState,
        config: &EditorConfig,
    ) -> Option<TransformOutcome>;
}

/// Notified after hooks settle, for the change kinds it cares about.
pub trait ChangeObserver {
    fn id(&self) -> &'static str;
    fn observes(&self, change: ChangeKind) -> bool;
    fn observe(&mut self, prev: &EditorState, next: &EditorState);
}

#[derive(Default)]
pub struct PluginRegistry {
    plugins: Vec<Box<dyn BlockPlugin>>,
    by_id: HashMap<&'static str, usize>,
    transforms: Vec<Box<dyn InputTransform>>,
    hook_order: Vec<usize>,
}

impl PluginRegistry {
    pub fn new(
        plugins: impl IntoIterator<Item = Box<dyn BlockPlugin>>,
        transforms: impl IntoIterator<Item = Box<dyn InputTransform>>,
    ) -> Result<Self, RegistryError> {
        let mut registry = Self::default();
        for plugin in plugins {
            registry.register_plugin(plugin)?;
        }
        for transform in transforms {
            registry.register_transform(transform)?;
        }
        Ok(registry)
    }

    pub fn standard() -> Self {
        Self::new(plugins::standard_plugins(), plugins::standard_transforms())
            .expect("standard registry must be valid")
    }

    pub fn register_plugin(&mut self, plugin: Box<dyn BlockPlugin>) -> Result<(), RegistryError> {
        let id = plugin.id();
        if self.by_id.contains_key(id) {
            return Err(RegistryError::DuplicatePlugin(id));
        }
        self.by_id.insert(id, self.plugins.len());
        self.plugins.push(plugin);

        let mut order: Vec<usize> = (0..self.plugins.len()).collect();
        order.sort_by_key(|ix| self.plugins[*ix].on_change_priority());
        self.hook_order = order;
        Ok(())
    }

    pub fn register_transform(
        &mut self,
        transform: Box<dyn InputTransform>,
    ) -> Result<(), RegistryError> {
        if self.transforms.iter().any(|t| t.id() == transform.id()) {
            return Err(RegistryError::DuplicateTransform(transform.id()));
        }
        self.transforms.push(transform);
        Ok(())
    }

    pub fn plugins(&self) -> impl Iterator<Item = &dyn BlockPlugin> + '_ {
        self.plugins.iter().map(|p| p.as_ref())
    }

    pub fn plugin(&self, id: &str) -> Option<&dyn BlockPlugin> {
        self.by_id.get(id).map(|ix| self.plugins[*ix].as_ref())
    }

    pub fn transforms(&self) -> &[Box<dyn InputTransform>] {
        &self.transforms
    }

    /// The plugin that renders and handles keys for `block`. First match wins.
    pub fn resolve(&self, block: &Block, content: &ContentModel) -> Option<&dyn BlockPlugin> {
        self.plugins
            .iter()
            .map(|p| p.as_ref())
            .find(|p| p.matches(block, content))
    }

    pub fn resolve_or_err(
        &self,
        block: &Block,
        content: &ContentModel,
    ) -> EditorResult<&dyn BlockPlugin> {
        self.resolve(block, content)
            .ok_or_else(|| EditorError::MissingPlugin {
                key: block.key().clone(),
                kind: block.kind(),
            })
    }

    pub fn style_class(&self, block: &Block, content: &ContentModel) -> Option<&'static str> {
        self.resolve(block, content).map(|p| p.style_class(block))
    }

    /// Runs on-change hooks in priority order until none of them changes the state.
    ///
    /// The result keeps the change tag of `state`.
    pub fn run_on_change(
        &self,
        state: &EditorState,
        config: &EditorConfig,
    ) -> EditorResult<EditorState> {
        let tag = state.last_change();
        let mut current = state.clone();
        for _ in 0..config.max_normalize_iterations {
            let mut changed = false;
            for ix in &self.hook_order {
                let plugin = &self.plugins[*ix];
                match plugin.on_change(&current, config) {
                    Some(next) if next.content() != current.content() => {
                        tracing::debug!(plugin = plugin.id(), "on-change fix-up");
                        current = next;
                        changed = true;
                    }
                    _ => {}
                }
            }
            if !changed {
                return Ok(current.retag(tag));
            }
        }
        Err(EditorError::NormalizeDidNotConverge {
            iterations: config.max_normalize_iterations,
        })
    }
}
