use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::EditorConfig;
use crate::core::{EditorState, Point, Selection};
use crate::entity::Entity;
use crate::keys::{Key, KeyPress};
use crate::ops;
use crate::plugin::{InputTransform, TransformOutcome};
use crate::selection::{current_block, word_before_cursor};

static URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(https?://[^\s/$.?#][^\s]*|www\.[^\s/$.?#][^\s]*\.[a-zA-Z]{2,}[^\s]*)$").unwrap()
});

pub fn looks_like_url(word: &str) -> bool {
    URL_RE.is_match(word)
}

/// Turns the word before the caret into a link when Space or Enter ends a URL.
/// The key press itself continues on to normal handling.
pub struct LinkifyOnBoundary;

impl InputTransform for LinkifyOnBoundary {
    fn id(&self) -> &'static str {
        "linkify.on_boundary"
    }

    fn transform(
        &self,
        press: &KeyPress,
        state: &EditorState,
        config: &EditorConfig,
    ) -> Option<TransformOutcome> {
        if !config.linkify || !matches!(press.key, Key::Space | Key::Enter) {
            return None;
        }
        if press.modifiers.command() || !state.selection().is_collapsed() {
            return None;
        }
        let block = current_block(state)?;
        if !block.kind().is_text_family() {
            return None;
        }

        let (start, word) = word_before_cursor(state)?;
        if !looks_like_url(&word) {
            return None;
        }
        let end = state.selection().focus.offset;
        if (start..end).any(|ix| block.entity_at(ix).is_some()) {
            return None;
        }

        let url = if word.starts_with("www.") {
            format!("https://{word}")
        } else {
            word
        };
        tracing::debug!(block = %block.key(), url = %url, "linkify");

        let key = block.key().clone();
        let (next, entity) = ops::create_entity(state, Entity::link(url, &config.link_target));
        let range = Selection::range(Point::new(key.clone(), start), Point::new(key.clone(), end));
        let next = ops::apply_entity(&next, &range, Some(entity));
        Some(TransformOutcome {
            state: next.with_selection(Selection::caret(key, end)),
            consumed: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::looks_like_url;

    #[test]
    fn url_pattern() {
        assert!(looks_like_url("https://example.com"));
        assert!(looks_like_url("http://example.com/a?b=c"));
        assert!(looks_like_url("www.example.org"));
        assert!(!looks_like_url("example"));
        assert!(!looks_like_url("www.nope"));
        assert!(!looks_like_url("ftp://example.com"));
    }
}
