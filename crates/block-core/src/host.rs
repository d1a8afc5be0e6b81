use std::cell::RefCell;
use std::rc::Rc;

use serde_json::Value;

use crate::core::{BlockData, BlockKey, EditorState};
use crate::editor::Editor;
use crate::entity::{Entity, EntityKey, EntityKind, EntityMutability};
use crate::error::EditorResult;
use crate::keys::{BlockCommand, KeyPress};
use crate::ops;
use crate::services::{
    CollaboratorError, DocumentService, TaskBoardService, UploadFile, UploadOptions, UploadService,
};

pub enum StateUpdate {
    Replace(EditorState),
    Update(Box<dyn FnOnce(&EditorState) -> EditorState>),
}

impl StateUpdate {
    pub fn update(f: impl FnOnce(&EditorState) -> EditorState + 'static) -> Self {
        StateUpdate::Update(Box::new(f))
    }
}

struct HandleInner {
    editor: RefCell<Editor>,
    state: RefCell<EditorState>,
    inline_error: RefCell<Option<String>>,
}

/// The host editing surface as seen by plugins, decorators and async completions.
///
/// Cloning shares the same surface. Readers always get the latest committed state.
#[derive(Clone)]
pub struct EditorHandle {
    inner: Rc<HandleInner>,
}

impl EditorHandle {
    pub fn new(editor: Editor, state: EditorState) -> EditorResult<Self> {
        let state = editor.normalize(&state)?;
        Ok(Self {
            inner: Rc::new(HandleInner {
                editor: RefCell::new(editor),
                state: RefCell::new(state),
                inline_error: RefCell::new(None),
            }),
        })
    }

    pub fn get_editor_state(&self) -> EditorState {
        self.inner.state.borrow().clone()
    }

    pub fn set_editor_state(&self, update: StateUpdate) -> EditorResult<()> {
        let prev = self.get_editor_state();
        let next = match update {
            StateUpdate::Replace(next) => next,
            StateUpdate::Update(f) => f(&prev),
        };
        let committed = self.inner.editor.borrow_mut().commit(&prev, next)?;
        *self.inner.state.borrow_mut() = committed;
        Ok(())
    }

    pub fn handle_key(&self, press: &KeyPress) -> EditorResult<()> {
        let prev = self.get_editor_state();
        let next = self.inner.editor.borrow_mut().handle_key(&prev, press)?;
        *self.inner.state.borrow_mut() = next;
        Ok(())
    }

    pub fn run_command(&self, command: BlockCommand) -> EditorResult<()> {
        let prev = self.get_editor_state();
        let next = self.inner.editor.borrow_mut().run_command(&prev, command)?;
        *self.inner.state.borrow_mut() = next;
        Ok(())
    }

    pub fn insert_text(&self, text: &str) -> EditorResult<()> {
        let prev = self.get_editor_state();
        let next = self.inner.editor.borrow_mut().insert_text(&prev, text)?;
        *self.inner.state.borrow_mut() = next;
        Ok(())
    }

    /// The message of the last collaborator failure, if it was not cleared.
    pub fn inline_error(&self) -> Option<String> {
        self.inner.inline_error.borrow().clone()
    }

    pub fn clear_inline_error(&self) {
        self.inner.inline_error.borrow_mut().take();
    }

    fn report(&self, err: &CollaboratorError) {
        tracing::warn!(error = %err, "collaborator failed");
        *self.inner.inline_error.borrow_mut() = Some(err.to_string());
    }

    /// Re-reads the current state and inserts an atomic block after `anchor`, unless
    /// the anchor disappeared while the collaborator was running.
    fn insert_atomic_after(
        &self,
        anchor: &BlockKey,
        entity: Entity,
    ) -> EditorResult<Option<EntityKey>> {
        let current = self.get_editor_state();
        if current.content().block(anchor).is_none() {
            tracing::warn!(block = %anchor, "anchor block gone, dropping async result");
            return Ok(None);
        }
        let (with_entity, key) = ops::create_entity(&current, entity);
        let next = ops::insert_atomic_block(&with_entity, anchor, key);
        self.set_editor_state(StateUpdate::Replace(next))?;
        Ok(Some(key))
    }
}

fn string_data(pairs: &[(&str, &str)]) -> BlockData {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
        .collect()
}

/// Uploads `file` and inserts the matching image, video or file block after `anchor`.
///
/// Failures leave the document unchanged and surface as the handle's inline error.
pub async fn insert_uploaded_media<S: UploadService>(
    handle: &EditorHandle,
    service: &S,
    anchor: &BlockKey,
    file: UploadFile,
    workspace_id: &str,
    options: UploadOptions,
) -> EditorResult<Option<EntityKey>> {
    let uploaded = match service.upload_image(&file, workspace_id, &options).await {
        Ok(uploaded) => uploaded,
        Err(err) => {
            handle.report(&err);
            return Ok(None);
        }
    };
    let data = string_data(&[
        ("src", uploaded.presigned_object_url.as_str()),
        ("name", file.name.as_str()),
        ("mimeType", file.mime_type.as_str()),
    ]);
    let entity = Entity::new(file.media_kind(), EntityMutability::Immutable, data);
    handle.insert_atomic_after(anchor, entity)
}

pub async fn insert_task_board<S: TaskBoardService>(
    handle: &EditorHandle,
    service: &S,
    anchor: &BlockKey,
    unit_id: &str,
) -> EditorResult<Option<EntityKey>> {
    let board_id = match service.create_task_board(unit_id).await {
        Ok(board_id) => board_id,
        Err(err) => {
            handle.report(&err);
            return Ok(None);
        }
    };
    let data = string_data(&[("boardId", board_id.as_str()), ("unitId", unit_id)]);
    let entity = Entity::new(EntityKind::TaskBoard, EntityMutability::Immutable, data);
    handle.insert_atomic_after(anchor, entity)
}

/// Creates a sub-document under `parent_id` and links it from a block after `anchor`.
pub async fn create_sub_document<S: DocumentService>(
    handle: &EditorHandle,
    service: &S,
    anchor: &BlockKey,
    parent_id: &str,
    id: &str,
) -> EditorResult<Option<EntityKey>> {
    let unit = match service.create_document(parent_id, id).await {
        Ok(unit) => unit,
        Err(err) => {
            handle.report(&err);
            return Ok(None);
        }
    };
    let data = string_data(&[("unitId", unit.id.as_str()), ("title", unit.title.as_str())]);
    let entity = Entity::new(EntityKind::Document, EntityMutability::Immutable, data);
    handle.insert_atomic_after(anchor, entity)
}
