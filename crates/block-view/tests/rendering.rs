use std::rc::Rc;

use chrono::{TimeZone, Utc};
use docblocks_core::plugins::TitlePlugin;
use docblocks_core::*;
use docblocks_view::*;
use serde_json::{Value, json};

fn state_of(blocks: Vec<Block>) -> EditorState {
    EditorState::create(ContentModel::new(blocks))
}

fn span(key: &str, from: usize, to: usize) -> Selection {
    Selection::range(Point::new(key.into(), from), Point::new(key.into(), to))
}

fn view_of(views: &[BlockView], key: &str) -> BlockView {
    views
        .iter()
        .find(|v| v.key.as_str() == key)
        .cloned()
        .unwrap()
}

fn render(state: &EditorState) -> Vec<BlockView> {
    let registry = PluginRegistry::standard();
    let cx = RenderContext::new(state, &registry);
    ViewRegistry::standard().render_document(&cx).unwrap()
}

fn tag_first(inner: Renderer) -> Renderer {
    Rc::new(move |cx: &RenderContext<'_>, block: &Block| {
        let mut view = inner(cx, block);
        view.classes.push("first".to_string());
        view
    })
}

fn tag_second(inner: Renderer) -> Renderer {
    Rc::new(move |cx: &RenderContext<'_>, block: &Block| {
        let mut view = inner(cx, block);
        view.classes.push("second".to_string());
        view
    })
}

fn note_readonly(inner: Renderer) -> Renderer {
    Rc::new(move |cx: &RenderContext<'_>, block: &Block| {
        let mut view = inner(cx, block);
        if cx.readonly {
            view.classes.push("saw-readonly".to_string());
        }
        view
    })
}

#[test]
fn decorators_apply_left_to_right() {
    let state = state_of(vec![
        Block::new("t", BlockKind::Title, "Doc"),
        Block::new("a", BlockKind::Text, "hello"),
    ]);
    let registry = PluginRegistry::standard();
    let cx = RenderContext::new(&state, &registry);
    let block = state.content().block(&"a".into()).unwrap();

    let renderer = compose(base_renderer(), &[tag_first, tag_second]);
    assert_eq!(renderer(&cx, block).classes, vec!["first", "second"]);

    let renderer = compose(base_renderer(), &[tag_second, tag_first]);
    assert_eq!(renderer(&cx, block).classes, vec!["second", "first"]);
}

#[test]
fn comment_decorator_is_transparent_without_comments() {
    let state = state_of(vec![
        Block::new("t", BlockKind::Title, "Doc"),
        Block::new("a", BlockKind::Text, "hello"),
    ]);
    let registry = PluginRegistry::standard();
    let cx = RenderContext::new(&state, &registry);
    let block = state.content().block(&"a".into()).unwrap();

    let base = base_renderer();
    let decorated = compose(base_renderer(), &[with_comments]);
    assert_eq!(decorated(&cx, block), base(&cx, block));
}

#[test]
fn comment_overlay_counts_comments_and_replies() {
    let state = state_of(vec![
        Block::new("t", BlockKind::Title, "Doc"),
        Block::new("a", BlockKind::Text, "hello world"),
    ]);
    let at = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
    let (state, thread) =
        add_comment(&state, &span("a", 0, 5), Comment::new("c1", "ana", "typo?", at)).unwrap();
    let reply = CommentReply {
        id: "r1".to_string(),
        author: "bo".to_string(),
        message: "fixed".to_string(),
        created_at: at,
    };
    let state = reply_to_comment(&state, thread, "c1", reply).unwrap();

    let view = view_of(&render(&state), "a");
    let overlay = view.comments.unwrap();
    assert_eq!(overlay.threads, vec![thread]);
    assert_eq!(overlay.comments, 1);
    assert_eq!(overlay.replies, 1);
    assert_eq!(overlay.message_count(), 2);

    let BlockBody::Text { runs } = view.body else {
        panic!("expected a text body");
    };
    assert_eq!(runs[0].text, "hello");
    assert_eq!(runs[0].comment, Some(thread));
    assert_eq!(runs[1].comment, None);
}

#[test]
fn standard_stacks_per_family() {
    let state = state_of(vec![
        Block::new("t", BlockKind::Title, "Doc"),
        Block::new("a", BlockKind::Text, "plain"),
        Block::new("b", BlockKind::BulletList, "nested").with_depth(1),
        Block::new("c", BlockKind::CheckList, "done").with_data_entry("checked", Value::Bool(true)),
        Block::new("d", BlockKind::DashDivider, ""),
    ]);
    let views = render(&state);

    let title = view_of(&views, "t");
    assert_eq!(title.classes, vec!["block-title"]);
    assert!(title.drag_handle.is_none());

    let text = view_of(&views, "a");
    assert_eq!(text.classes, vec!["block-text"]);
    assert_eq!(
        text.drag_handle,
        Some(DragHandle {
            key: "a".into(),
            enabled: true,
        })
    );
    assert!(!text.readonly);

    let bullet = view_of(&views, "b");
    assert_eq!(bullet.classes, vec!["block-bullet-list", "block-depth-1"]);
    assert_eq!(bullet.marker, Some(ListMarker::Bullet));

    let check = view_of(&views, "c");
    assert!(check.has_class("block-checked"));
    assert_eq!(check.marker, Some(ListMarker::Check { checked: true }));

    let divider = view_of(&views, "d");
    assert_eq!(divider.body, BlockBody::Divider { dashed: true });
    assert!(divider.drag_handle.is_some());
}

#[test]
fn preview_forces_readonly() {
    let state = state_of(vec![
        Block::new("t", BlockKind::Title, "Doc"),
        Block::new("a", BlockKind::Text, "hello"),
    ]);
    let registry = PluginRegistry::standard();

    let cx = RenderContext::new(&state, &registry).preview(true);
    let plain = ViewRegistry::standard().render_document(&cx).unwrap();
    assert!(!view_of(&plain, "a").readonly);

    let preview = ViewRegistry::preview().render_document(&cx).unwrap();
    assert!(preview.iter().all(|v| v.readonly));
    let text = view_of(&preview, "a");
    assert_eq!(text.drag_handle.map(|h| h.enabled), Some(false));

    let editable = RenderContext::new(&state, &registry);
    let views = ViewRegistry::preview().render_document(&editable).unwrap();
    assert!(!view_of(&views, "a").readonly);
}

#[test]
fn wrapped_renderers_see_the_readonly_prop() {
    let state = state_of(vec![
        Block::new("t", BlockKind::Title, "Doc"),
        Block::new("a", BlockKind::Text, "hello"),
    ]);
    let registry = PluginRegistry::standard();
    let block = state.content().block(&"a".into()).unwrap();
    let renderer = compose(
        base_renderer(),
        &[note_readonly, with_drag_handle, with_static_readonly],
    );

    let preview = RenderContext::new(&state, &registry).preview(true);
    let view = renderer(&preview, block);
    assert_eq!(view.classes, vec!["saw-readonly"]);
    assert!(view.readonly);
    assert_eq!(view.drag_handle.map(|h| h.enabled), Some(false));

    let editing = RenderContext::new(&state, &registry);
    let view = renderer(&editing, block);
    assert!(view.classes.is_empty());
    assert!(!view.readonly);
    assert_eq!(view.drag_handle.map(|h| h.enabled), Some(true));

    // Outside the static wrapper nothing is forced.
    let unwrapped = compose(base_renderer(), &[with_static_readonly, note_readonly]);
    assert!(unwrapped(&preview, block).classes.is_empty());
}

#[test]
fn families_can_be_restacked() {
    let state = state_of(vec![
        Block::new("t", BlockKind::Title, "Doc"),
        Block::new("a", BlockKind::Text, "hello"),
    ]);
    let mut views = ViewRegistry::standard();
    views.set_decorators(BlockFamily::Text, &[tag_first]);

    let registry = PluginRegistry::standard();
    let cx = RenderContext::new(&state, &registry);
    let rendered = views.render_document(&cx).unwrap();
    let text = view_of(&rendered, "a");
    assert_eq!(text.classes, vec!["first"]);
    assert!(text.drag_handle.is_none());
    assert_eq!(view_of(&rendered, "t").classes, vec!["block-title"]);
}

#[test]
fn collapsed_toggles_hide_their_children() {
    let blocks = |open: bool| {
        vec![
            Block::new("t", BlockKind::Title, "Doc"),
            Block::new("p", BlockKind::ToggleList, "Parent").with_data_entry("state", Value::Bool(open)),
            Block::new("a", BlockKind::Text, "a").with_depth(1),
            Block::new("b", BlockKind::Text, "b").with_depth(2),
            Block::new("z", BlockKind::Text, "after"),
        ]
    };
    let keys = |views: Vec<BlockView>| {
        views
            .into_iter()
            .map(|v| v.key.as_str().to_string())
            .collect::<Vec<_>>()
    };

    let collapsed = render(&state_of(blocks(false)));
    assert_eq!(view_of(&collapsed, "p").marker, Some(ListMarker::Toggle { open: false }));
    assert_eq!(keys(collapsed), vec!["t", "p", "z"]);

    let open = render(&state_of(blocks(true)));
    assert_eq!(keys(open), vec!["t", "p", "a", "b", "z"]);
}

#[test]
fn numbered_items_show_their_position() {
    let state = state_of(vec![
        Block::new("t", BlockKind::Title, "Doc"),
        Block::new("n1", BlockKind::NumberedList, "one"),
        Block::new("n2", BlockKind::NumberedList, "two"),
        Block::new("p", BlockKind::Text, "break"),
        Block::new("n3", BlockKind::NumberedList, "again"),
    ]);
    let views = render(&state);
    let index = |key: &str| view_of(&views, key).marker;
    assert_eq!(index("n1"), Some(ListMarker::Number { index: 1 }));
    assert_eq!(index("n2"), Some(ListMarker::Number { index: 2 }));
    assert_eq!(index("n3"), Some(ListMarker::Number { index: 1 }));
}

#[test]
fn text_runs_split_on_style_and_entity() {
    let state = state_of(vec![
        Block::new("t", BlockKind::Title, "Doc"),
        Block::new("a", BlockKind::Text, "hello world"),
    ]);
    let state = toggle_inline_style(&state, &span("a", 0, 5), InlineStyle::Bold);
    let (state, link) = create_entity(&state, Entity::link("https://example.com", "_blank"));
    let state = apply_entity(&state, &span("a", 6, 11), Some(link));

    let view = view_of(&render(&state), "a");
    assert_eq!(view.plain_text(), "hello world");
    let BlockBody::Text { runs } = view.body else {
        panic!("expected a text body");
    };
    let texts: Vec<&str> = runs.iter().map(|r| r.text.as_str()).collect();
    assert_eq!(texts, vec!["hello", " ", "world"]);
    assert!(runs[0].styles.bold);
    assert!(!runs[1].styles.bold);
    assert_eq!(runs[2].link.as_deref(), Some("https://example.com"));
}

#[test]
fn embeds_show_input_until_confirmed() {
    let url = "https://www.figma.com/file/abc123/Design";
    let state = EditorState::new(
        ContentModel::new(vec![
            Block::new("t", BlockKind::Title, "Doc"),
            Block::new("e", BlockKind::EmbedFigma, url),
        ]),
        Selection::caret("e".into(), 0),
    );

    let draft = view_of(&render(&state), "e");
    assert_eq!(
        draft.body,
        BlockBody::Embed {
            url: url.to_string(),
            live: false,
            error: None,
        }
    );
    assert!(!draft.readonly);

    let mut editor = Editor::standard();
    let confirmed = editor
        .handle_key(&state, &KeyPress::parse("enter").unwrap())
        .unwrap();
    let live = view_of(&render(&confirmed), "e");
    assert_eq!(
        live.body,
        BlockBody::Embed {
            url: url.to_string(),
            live: true,
            error: None,
        }
    );
    assert!(live.readonly);
}

#[test]
fn tables_render_their_rows() {
    let mut editor = Editor::standard();
    let state = EditorState::new(
        ContentModel::new(vec![
            Block::new("t", BlockKind::Title, "Doc"),
            Block::new("a", BlockKind::Text, "/tab"),
        ]),
        Selection::caret("a".into(), 4),
    );
    let item = slash_items().into_iter().find(|i| i.id == "table").unwrap();
    let state = editor.commit(&state, apply_slash_item(&state, &item)).unwrap();

    let view = view_of(&render(&state), "a");
    let BlockBody::Table { rows } = view.body else {
        panic!("expected a table body");
    };
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r.len() == 2));
}

#[test]
fn blocks_without_a_plugin_fail_to_render() {
    let state = state_of(vec![
        Block::new("t", BlockKind::Title, "Doc"),
        Block::new("a", BlockKind::Text, "orphan"),
    ]);
    let registry = PluginRegistry::new(
        vec![Box::new(TitlePlugin) as Box<dyn BlockPlugin>],
        Vec::<Box<dyn InputTransform>>::new(),
    )
    .unwrap();
    let cx = RenderContext::new(&state, &registry);

    let result = ViewRegistry::standard().render_document(&cx);
    assert!(matches!(
        result,
        Err(EditorError::MissingPlugin {
            kind: BlockKind::Text,
            ..
        })
    ));
}

#[test]
fn views_serialize_for_hosts() {
    let state = state_of(vec![
        Block::new("t", BlockKind::Title, "Doc"),
        Block::new("c", BlockKind::CheckList, "ship").with_data_entry("checked", Value::Bool(false)),
    ]);
    let view = view_of(&render(&state), "c");
    let value = serde_json::to_value(&view).unwrap();

    assert_eq!(value["kind"], json!("check-list"));
    assert_eq!(value["body"]["type"], json!("text"));
    assert_eq!(value["body"]["runs"][0]["text"], json!("ship"));
    assert_eq!(value["marker"], json!({"type": "check", "checked": false}));
    assert!(value.get("comments").is_none());
}
