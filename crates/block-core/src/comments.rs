use crate::core::{BlockKey, ContentModel, DataPatch, EditorState, Selection};
use crate::entity::{Comment, CommentReply, Entity, EntityKey, EntityKind, comments_value};
use crate::ops::{apply_entity, create_entity, merge_entity_data, remove_entity_everywhere, shared_entity};

#[derive(Debug, Clone, PartialEq)]
pub struct CommentThread {
    pub entity_key: EntityKey,
    pub comments: Vec<Comment>,
}

impl CommentThread {
    pub fn message_count(&self) -> usize {
        self.comments.iter().map(|c| 1 + c.replies.len()).sum()
    }
}

/// Attaches `comment` to `range`.
///
/// When the whole range already carries one comment entity the comment is appended to
/// its list; otherwise a new entity is created and applied. Collapsed ranges are
/// ignored, as are ranges covering nothing but atomic content.
pub fn add_comment(
    state: &EditorState,
    range: &Selection,
    comment: Comment,
) -> Option<(EditorState, EntityKey)> {
    if range.is_collapsed() {
        return None;
    }

    let existing = shared_entity(state.content(), range).filter(|key| {
        state
            .content()
            .entity(*key)
            .is_some_and(|e| e.kind == EntityKind::Comment)
    });

    if let Some(key) = existing {
        let next = update_comments(state, key, |comments| comments.push(comment));
        return Some((next, key));
    }

    let (with_entity, key) = create_entity(state, Entity::comment_thread(&[comment]));
    let next = apply_entity(&with_entity, range, Some(key));
    if !next.content().entities().contains(key) {
        tracing::debug!("comment range holds only immutable entities");
        return None;
    }
    tracing::debug!(entity = %key, "comment thread created");
    Some((next, key))
}

/// Appends a reply to `comment_id`. Returns `None` if the thread or comment is gone.
pub fn reply_to_comment(
    state: &EditorState,
    key: EntityKey,
    comment_id: &str,
    reply: CommentReply,
) -> Option<EditorState> {
    let comments = thread_comments(state.content(), key)?;
    comments.iter().find(|c| c.id == comment_id)?;
    Some(update_comments(state, key, |comments| {
        if let Some(comment) = comments.iter_mut().find(|c| c.id == comment_id) {
            comment.replies.push(reply);
        }
    }))
}

/// Deletes one comment. Deleting the last comment removes the entity and every
/// character reference to it.
pub fn delete_comment(state: &EditorState, key: EntityKey, comment_id: &str) -> Option<EditorState> {
    let comments = thread_comments(state.content(), key)?;
    comments.iter().find(|c| c.id == comment_id)?;

    if comments.len() == 1 {
        tracing::debug!(entity = %key, "last comment deleted, dropping thread");
        return Some(remove_entity_everywhere(state, key));
    }
    Some(update_comments(state, key, |comments| {
        comments.retain(|c| c.id != comment_id)
    }))
}

pub fn delete_reply(
    state: &EditorState,
    key: EntityKey,
    comment_id: &str,
    reply_id: &str,
) -> Option<EditorState> {
    let comments = thread_comments(state.content(), key)?;
    let comment = comments.iter().find(|c| c.id == comment_id)?;
    comment.replies.iter().find(|r| r.id == reply_id)?;
    Some(update_comments(state, key, |comments| {
        if let Some(comment) = comments.iter_mut().find(|c| c.id == comment_id) {
            comment.replies.retain(|r| r.id != reply_id);
        }
    }))
}

/// Comment threads touching a block, in order of first appearance.
pub fn comment_threads(content: &ContentModel, block_key: &BlockKey) -> Vec<CommentThread> {
    let Some(block) = content.block(block_key) else {
        return Vec::new();
    };
    let mut seen: Vec<EntityKey> = Vec::new();
    for key in block.characters().iter().filter_map(|meta| meta.entity) {
        if !seen.contains(&key) {
            seen.push(key);
        }
    }
    seen.into_iter()
        .filter_map(|key| {
            let comments = thread_comments(content, key)?;
            Some(CommentThread {
                entity_key: key,
                comments,
            })
        })
        .collect()
}

pub fn comment_count(content: &ContentModel) -> usize {
    content
        .entities()
        .iter()
        .filter(|(_, entity)| entity.kind == EntityKind::Comment)
        .map(|(_, entity)| entity.comments().len())
        .sum()
}

pub fn block_comment_count(content: &ContentModel, block_key: &BlockKey) -> usize {
    comment_threads(content, block_key)
        .iter()
        .map(|t| t.comments.len())
        .sum()
}

fn thread_comments(content: &ContentModel, key: EntityKey) -> Option<Vec<Comment>> {
    let entity = content.entity(key)?;
    (entity.kind == EntityKind::Comment).then(|| entity.comments())
}

fn update_comments(
    state: &EditorState,
    key: EntityKey,
    f: impl FnOnce(&mut Vec<Comment>),
) -> EditorState {
    let mut comments = thread_comments(state.content(), key).unwrap_or_default();
    f(&mut comments);
    merge_entity_data(
        state,
        key,
        &DataPatch::set("comments", comments_value(&comments)),
    )
}
