use docblocks_core::plugins::{embed_url_is_valid, looks_like_url};
use docblocks_core::*;

fn press(spec: &str) -> KeyPress {
    KeyPress::parse(spec).unwrap()
}

fn state_at(blocks: Vec<Block>, key: &str, offset: usize) -> EditorState {
    EditorState::new(ContentModel::new(blocks), Selection::caret(key.into(), offset))
}

fn kinds(state: &EditorState) -> Vec<BlockKind> {
    state.content().blocks().map(|b| b.kind()).collect()
}

const FIGMA_URL: &str = "https://www.figma.com/file/abc123/Design";

#[test]
fn enter_confirms_a_valid_embed() {
    let mut editor = Editor::standard();
    let state = state_at(
        vec![
            Block::new("t", BlockKind::Title, "Doc"),
            Block::new("e", BlockKind::EmbedFigma, FIGMA_URL),
        ],
        "e",
        FIGMA_URL.len(),
    );

    let next = editor.handle_key(&state, &press("enter")).unwrap();
    assert_eq!(
        kinds(&next),
        vec![BlockKind::Title, BlockKind::EmbedFigma, BlockKind::Text]
    );
    let embed = next.content().block(&"e".into()).unwrap();
    assert!(embed.data_bool("isShow"));
    assert!(embed.data_bool("isDisable"));
    assert!(!embed.is_editable());

    let key = embed.block_entity().unwrap();
    let entity = next.content().entity(key).unwrap();
    assert_eq!(entity.kind, EntityKind::Embed);
    assert_eq!(entity.mutability, EntityMutability::Immutable);
    assert_eq!(entity.data_str("url"), Some(FIGMA_URL));
    assert_eq!(entity.data_str("provider"), Some("embed-figma"));

    let text_key = next.content().block_at(2).unwrap().key().clone();
    assert_eq!(next.selection(), &Selection::caret(text_key, 0));
}

#[test]
fn confirmed_embed_behaves_like_an_atomic_block() {
    let mut editor = Editor::standard();
    let state = state_at(
        vec![
            Block::new("t", BlockKind::Title, "Doc"),
            Block::new("e", BlockKind::EmbedFigma, FIGMA_URL),
        ],
        "e",
        0,
    );
    let confirmed = editor.handle_key(&state, &press("enter")).unwrap();
    let on_embed = confirmed.with_selection(Selection::caret("e".into(), 0));

    let typed = editor.handle_key(&on_embed, &press("x")).unwrap();
    assert_eq!(typed.content(), on_embed.content());

    let removed = editor.handle_key(&on_embed, &press("backspace")).unwrap();
    assert_eq!(kinds(&removed), vec![BlockKind::Title, BlockKind::Text]);
    assert!(removed.content().entities().is_empty());
}

#[test]
fn invalid_embed_url_sets_an_inline_error() {
    let mut editor = Editor::standard();
    let state = state_at(
        vec![
            Block::new("t", BlockKind::Title, "Doc"),
            Block::new("e", BlockKind::EmbedTrello, "not a link"),
        ],
        "e",
        10,
    );
    let next = editor.handle_key(&state, &press("enter")).unwrap();

    assert_eq!(kinds(&next), vec![BlockKind::Title, BlockKind::EmbedTrello]);
    let embed = next.content().block(&"e".into()).unwrap();
    assert_eq!(embed.data_str("error"), Some("Not a valid Trello link"));
    assert!(!embed.data_bool("isDisable"));
    assert!(embed.is_editable());
    assert!(next.content().entities().is_empty());
}

#[test]
fn enter_on_an_empty_embed_resets_it() {
    let mut editor = Editor::standard();
    let state = state_at(
        vec![
            Block::new("t", BlockKind::Title, "Doc"),
            Block::new("e", BlockKind::EmbedLoom, ""),
        ],
        "e",
        0,
    );
    let next = editor.handle_key(&state, &press("enter")).unwrap();
    assert_eq!(kinds(&next), vec![BlockKind::Title, BlockKind::Text]);
}

#[test]
fn embed_patterns_per_provider() {
    assert!(embed_url_is_valid(BlockKind::EmbedFigma, FIGMA_URL));
    assert!(embed_url_is_valid(
        BlockKind::EmbedMiro,
        "https://miro.com/app/board/uXjVO=/"
    ));
    assert!(embed_url_is_valid(
        BlockKind::EmbedLoom,
        "https://www.loom.com/share/0123abcd"
    ));
    assert!(embed_url_is_valid(
        BlockKind::EmbedGoogleDrive,
        "https://docs.google.com/document/d/1/edit"
    ));
    assert!(embed_url_is_valid(BlockKind::EmbedBookmark, "https://example.com/post"));
    assert!(!embed_url_is_valid(BlockKind::EmbedMiro, FIGMA_URL));
    assert!(!embed_url_is_valid(BlockKind::Text, FIGMA_URL));
}

#[test]
fn space_after_a_url_links_it() {
    let mut editor = Editor::standard();
    let text = "see https://example.com";
    let state = state_at(
        vec![
            Block::new("t", BlockKind::Title, "Doc"),
            Block::new("a", BlockKind::Text, text),
        ],
        "a",
        text.len(),
    );
    let next = editor.handle_key(&state, &press("space")).unwrap();

    let block = next.content().block(&"a".into()).unwrap();
    assert_eq!(block.text(), "see https://example.com ");
    let link = block.entity_at(4).unwrap();
    assert!((4..23).all(|ix| block.entity_at(ix) == Some(link)));
    assert_eq!(block.entity_at(3), None);
    assert_eq!(block.entity_at(23), None);

    let entity = next.content().entity(link).unwrap();
    assert_eq!(entity.kind, EntityKind::Link);
    assert_eq!(entity.data_str("url"), Some("https://example.com"));
    assert_eq!(entity.data_str("target"), Some("_blank"));
}

#[test]
fn enter_after_a_www_url_links_it_and_splits() {
    let config = EditorConfig {
        link_target: "_self".to_string(),
        ..EditorConfig::default()
    };
    let mut editor = Editor::with_config(config);
    let state = state_at(
        vec![
            Block::new("t", BlockKind::Title, "Doc"),
            Block::new("a", BlockKind::Text, "www.example.org"),
        ],
        "a",
        15,
    );
    let next = editor.handle_key(&state, &press("enter")).unwrap();

    assert_eq!(next.content().len(), 3);
    let block = next.content().block(&"a".into()).unwrap();
    let link = next.content().entity(block.entity_at(0).unwrap()).unwrap();
    assert_eq!(link.data_str("url"), Some("https://www.example.org"));
    assert_eq!(link.data_str("target"), Some("_self"));
}

#[test]
fn linkify_can_be_switched_off() {
    let config = EditorConfig {
        linkify: false,
        ..EditorConfig::default()
    };
    let mut editor = Editor::with_config(config);
    let state = state_at(
        vec![
            Block::new("t", BlockKind::Title, "Doc"),
            Block::new("a", BlockKind::Text, "https://example.com"),
        ],
        "a",
        19,
    );
    let next = editor.handle_key(&state, &press("space")).unwrap();
    assert!(next.content().entities().is_empty());
    assert!(looks_like_url("https://example.com"));
}

#[test]
fn markdown_shortcuts_convert_text_blocks() {
    let cases = [
        ("-", BlockKind::BulletList),
        ("*", BlockKind::BulletList),
        ("1.", BlockKind::NumberedList),
        ("[]", BlockKind::CheckList),
        (">", BlockKind::ToggleList),
        ("#", BlockKind::HeadingOne),
        ("##", BlockKind::HeadingTwo),
        ("###", BlockKind::HeadingThree),
    ];
    for (marker, kind) in cases {
        let mut editor = Editor::standard();
        let state = state_at(
            vec![
                Block::new("t", BlockKind::Title, "Doc"),
                Block::new("a", BlockKind::Text, marker),
            ],
            "a",
            marker.len(),
        );
        let next = editor.handle_key(&state, &press("space")).unwrap();
        let block = next.content().block(&"a".into()).unwrap();
        assert_eq!(block.kind(), kind, "marker {marker:?}");
        assert_eq!(block.text(), "", "marker {marker:?}");
    }
}

#[test]
fn shortcut_data_defaults() {
    let mut editor = Editor::standard();
    let todo = state_at(
        vec![
            Block::new("t", BlockKind::Title, "Doc"),
            Block::new("a", BlockKind::Text, "[]"),
        ],
        "a",
        2,
    );
    let next = editor.handle_key(&todo, &press("space")).unwrap();
    let block = next.content().block(&"a".into()).unwrap();
    assert_eq!(block.data().get("checked"), Some(&serde_json::Value::Bool(false)));

    let toggle = state_at(
        vec![
            Block::new("t", BlockKind::Title, "Doc"),
            Block::new("a", BlockKind::Text, ">"),
        ],
        "a",
        1,
    );
    let next = editor.handle_key(&toggle, &press("space")).unwrap();
    assert!(next.content().block(&"a".into()).unwrap().data_bool("state"));
}

#[test]
fn divider_shortcut_needs_the_whole_line() {
    let mut editor = Editor::standard();
    let state = state_at(
        vec![
            Block::new("t", BlockKind::Title, "Doc"),
            Block::new("a", BlockKind::Text, "---"),
        ],
        "a",
        3,
    );
    let next = editor.handle_key(&state, &press("space")).unwrap();
    assert_eq!(
        kinds(&next),
        vec![BlockKind::Title, BlockKind::SolidDivider, BlockKind::Text]
    );
    let text_key = next.content().block_at(2).unwrap().key().clone();
    assert_eq!(next.selection(), &Selection::caret(text_key, 0));

    let with_tail = state_at(
        vec![
            Block::new("t", BlockKind::Title, "Doc"),
            Block::new("a", BlockKind::Text, "---tail"),
        ],
        "a",
        3,
    );
    let next = editor.handle_key(&with_tail, &press("space")).unwrap();
    assert_eq!(kinds(&next), vec![BlockKind::Title, BlockKind::Text]);
    assert_eq!(next.content().block_at(1).unwrap().text(), "--- tail");
}

#[test]
fn shortcuts_do_not_fire_outside_text_blocks() {
    let mut editor = Editor::standard();
    let title = state_at(vec![Block::new("t", BlockKind::Title, "-")], "t", 1);
    let next = editor.handle_key(&title, &press("space")).unwrap();
    assert_eq!(kinds(&next), vec![BlockKind::Title]);
    assert_eq!(next.content().block_at(0).unwrap().text(), "- ");

    let config = EditorConfig {
        autoformat: false,
        ..EditorConfig::default()
    };
    let mut plain = Editor::with_config(config);
    let state = state_at(
        vec![
            Block::new("t", BlockKind::Title, "Doc"),
            Block::new("a", BlockKind::Text, "-"),
        ],
        "a",
        1,
    );
    let next = plain.handle_key(&state, &press("space")).unwrap();
    assert_eq!(next.content().block_at(1).unwrap().kind(), BlockKind::Text);
}
