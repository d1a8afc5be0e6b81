use crate::config::EditorConfig;
use crate::core::{BlockKind, ChangeKind, EditorState, Point, Selection};
use crate::error::{EditorError, EditorResult};
use crate::keys::{BlockCommand, Key, KeyPress};
use crate::ops;
use crate::plugin::{ChangeObserver, PluginRegistry};
use crate::selection::cursor_context;

/// Routes key presses through transforms, block key bindings and default editing,
/// then runs on-change hooks and notifies observers.
///
/// The editor holds no document; every call takes the current state and returns the
/// next one.
pub struct Editor {
    registry: PluginRegistry,
    config: EditorConfig,
    observers: Vec<Box<dyn ChangeObserver>>,
}

impl Editor {
    pub fn new(registry: PluginRegistry, config: EditorConfig) -> Self {
        Self {
            registry,
            config: config.with_defaults(),
            observers: Vec::new(),
        }
    }

    pub fn standard() -> Self {
        Self::new(PluginRegistry::standard(), EditorConfig::default())
    }

    pub fn with_config(config: EditorConfig) -> Self {
        Self::new(PluginRegistry::standard(), config)
    }

    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn add_observer(&mut self, observer: Box<dyn ChangeObserver>) {
        self.observers.push(observer);
    }

    /// Runs the on-change hooks without a triggering transition, e.g. after loading.
    pub fn normalize(&self, state: &EditorState) -> EditorResult<EditorState> {
        self.registry.run_on_change(state, &self.config)
    }

    /// Finalizes a transition: hooks first (title fix-up before anything else), then
    /// the observers interested in its change kind.
    pub fn commit(&mut self, prev: &EditorState, next: EditorState) -> EditorResult<EditorState> {
        if next == *prev {
            return Ok(next);
        }
        let next = self.registry.run_on_change(&next, &self.config)?;
        if let Some(change) = next.last_change() {
            for observer in &mut self.observers {
                if observer.observes(change) {
                    observer.observe(prev, &next);
                }
            }
        }
        Ok(next)
    }

    pub fn apply(
        &mut self,
        state: &EditorState,
        f: impl FnOnce(&EditorState) -> EditorState,
    ) -> EditorResult<EditorState> {
        let next = f(state);
        self.commit(state, next)
    }

    /// The command the focused block binds to `press`, with the plugin id.
    pub fn resolve_command(
        &self,
        state: &EditorState,
        press: &KeyPress,
    ) -> EditorResult<Option<(BlockCommand, &'static str)>> {
        let Some(cx) = cursor_context(state) else {
            return Ok(None);
        };
        let plugin = self.registry.resolve_or_err(cx.block, cx.content)?;
        Ok(plugin
            .key_binding(press, &cx, &self.config)
            .map(|command| (command, plugin.id())))
    }

    pub fn run_command(
        &mut self,
        state: &EditorState,
        command: BlockCommand,
    ) -> EditorResult<EditorState> {
        let next = self.dispatch(state, command)?;
        self.commit(state, next)
    }

    fn dispatch(&self, state: &EditorState, command: BlockCommand) -> EditorResult<EditorState> {
        let Some(cx) = cursor_context(state) else {
            return Ok(state.clone());
        };
        let plugin = self.registry.resolve_or_err(cx.block, cx.content)?;
        tracing::debug!(command = command.as_str(), plugin = plugin.id(), block = %cx.block.key(), "dispatch");
        plugin
            .handle_command(command, state, &self.config)
            .ok_or(EditorError::CommandNotHandled {
                command,
                plugin: plugin.id(),
            })
    }

    pub fn handle_key(&mut self, state: &EditorState, press: &KeyPress) -> EditorResult<EditorState> {
        if cursor_context(state).is_none() {
            return self.normalize(state);
        }

        let mut current = state.clone();
        let mut consumed = false;
        for transform in self.registry.transforms() {
            let Some(outcome) = transform.transform(press, &current, &self.config) else {
                continue;
            };
            tracing::trace!(transform = transform.id(), consumed = outcome.consumed, "input transform");
            current = outcome.state;
            if outcome.consumed {
                consumed = true;
                break;
            }
        }
        if consumed {
            return self.commit(state, current);
        }

        let next = match self.resolve_command(&current, press)? {
            Some((command, _)) => self.dispatch(&current, command)?,
            None => default_key(&current, press),
        };
        self.commit(state, next)
    }

    /// Inserts text at the selection if the focused block accepts typing.
    pub fn insert_text(&mut self, state: &EditorState, text: &str) -> EditorResult<EditorState> {
        let editable = cursor_context(state).is_some_and(|cx| cx.block.is_editable());
        if !editable {
            return Ok(state.clone());
        }
        let next = ops::insert_text(state, text);
        self.commit(state, next)
    }
}

fn default_key(state: &EditorState, press: &KeyPress) -> EditorState {
    let Some(cx) = cursor_context(state) else {
        return state.clone();
    };
    let editable = cx.block.is_editable();
    let selection = state.selection().clone();

    if let Some(ch) = press.printable() {
        if !editable {
            return state.clone();
        }
        return ops::insert_text(state, ch.encode_utf8(&mut [0; 4]));
    }

    match press.key {
        Key::Backspace if !cx.collapsed => ops::remove_range(state, &selection),
        Key::Backspace if cx.offset > 0 => {
            if editable {
                ops::backspace_character(state)
            } else {
                state.clone()
            }
        }
        Key::Backspace => match cx.previous {
            Some(previous) if !previous.is_editable() => ops::remove_block(state, previous.key()),
            Some(_) if editable => ops::merge_with_previous(state, cx.block.key()),
            _ => state.clone(),
        },
        Key::Delete if !cx.collapsed => ops::remove_range(state, &selection),
        Key::Delete if cx.offset < cx.block.len() => {
            let key = cx.block.key().clone();
            let range = Selection::range(
                Point::new(key.clone(), cx.offset),
                Point::new(key, cx.offset + 1),
            );
            ops::remove_range(state, &range)
        }
        Key::Delete => match cx.next {
            Some(next) if next.is_editable() && editable && next.kind() != BlockKind::Title => {
                ops::merge_with_previous(state, next.key())
            }
            _ => state.clone(),
        },
        Key::Enter if press.modifiers.shift && editable => ops::insert_text(state, "\n"),
        Key::Enter if editable => ops::split_block(state, &selection, None),
        _ => state.clone(),
    }
}

/// Reports the document title whenever a transition changes it.
pub struct DocumentTitleObserver {
    last: Option<String>,
    on_title: Box<dyn FnMut(&str)>,
}

impl DocumentTitleObserver {
    pub fn new(on_title: impl FnMut(&str) + 'static) -> Self {
        Self {
            last: None,
            on_title: Box::new(on_title),
        }
    }
}

impl ChangeObserver for DocumentTitleObserver {
    fn id(&self) -> &'static str {
        "document_title"
    }

    fn observes(&self, change: ChangeKind) -> bool {
        change.touches_text()
    }

    fn observe(&mut self, _prev: &EditorState, next: &EditorState) {
        let title = next
            .content()
            .first_block()
            .map(|b| b.text().to_string())
            .unwrap_or_default();
        if self.last.as_deref() == Some(title.as_str()) {
            return;
        }
        tracing::debug!(title = %title, "document title changed");
        (self.on_title)(&title);
        self.last = Some(title);
    }
}
