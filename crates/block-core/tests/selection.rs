use docblocks_core::*;

fn content() -> ContentModel {
    ContentModel::new(vec![
        Block::new("t", BlockKind::Title, "Doc"),
        Block::new("a", BlockKind::ToggleList, "open it"),
        Block::new("b", BlockKind::Text, "inside 😀 here").with_depth(1),
    ])
}

fn at(key: &str, offset: usize) -> EditorState {
    EditorState::new(content(), Selection::caret(key.into(), offset))
}

#[test]
fn text_around_the_caret() {
    let state = at("a", 4);
    assert_eq!(current_block(&state).unwrap().key().as_str(), "a");
    assert_eq!(text_before_cursor(&state), "open");
    assert_eq!(text_after_cursor(&state), " it");
    assert_eq!(word_before_cursor(&state), Some((0, "open".to_string())));

    let after_space = at("a", 5);
    assert_eq!(word_before_cursor(&after_space), None);

    let late = at("a", 7);
    assert_eq!(word_before_cursor(&late), Some((5, "it".to_string())));
}

#[test]
fn cursor_context_describes_the_neighbourhood() {
    let state = at("a", 0);
    let cx = cursor_context(&state).unwrap();
    assert_eq!(cx.index, 1);
    assert!(cx.at_start());
    assert!(!cx.at_end());
    assert!(cx.has_children());
    assert_eq!(cx.previous.unwrap().key().as_str(), "t");
    assert_eq!(cx.next.unwrap().key().as_str(), "b");

    let end = at("b", 13);
    let cx = cursor_context(&end).unwrap();
    assert!(cx.at_end());
    assert!(!cx.has_children());
    assert!(cx.next.is_none());

    let range = state.with_selection(Selection::range(
        Point::new("a".into(), 0),
        Point::new("a".into(), 4),
    ));
    let cx = cursor_context(&range).unwrap();
    assert!(!cx.collapsed);
    assert!(!cx.at_start());
}

#[test]
fn native_selections_use_utf16_offsets() {
    let content = content();
    // "inside " is 7 units, the emoji is 2 more.
    let resolved = resolve_native_selection(&content, &NativeSelection::caret("b", 9)).unwrap();
    assert_eq!(resolved, Selection::caret("b".into(), 8));

    let past_end = resolve_native_selection(&content, &NativeSelection::caret("b", 99)).unwrap();
    assert_eq!(past_end, Selection::caret("b".into(), 13));

    assert_eq!(char_to_utf16_offset("inside 😀 here", 8), 9);
}

#[test]
fn native_selections_must_point_at_known_blocks() {
    assert_eq!(
        resolve_native_selection(&content(), &NativeSelection::caret("zz", 0)),
        Err(SelectionError::UnknownBlock("zz".to_string()))
    );
    assert_eq!(
        resolve_native_selection(&ContentModel::new(Vec::new()), &NativeSelection::caret("a", 0)),
        Err(SelectionError::EmptyDocument)
    );
}
