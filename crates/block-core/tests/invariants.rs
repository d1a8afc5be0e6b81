use docblocks_core::*;
use proptest::prelude::*;

const KEYS: [&str; 17] = [
    "a",
    "b",
    "space",
    "enter",
    "shift-enter",
    "ctrl-enter",
    "tab",
    "shift-tab",
    "backspace",
    "delete",
    "-",
    "#",
    "1",
    ".",
    "[",
    "]",
    ">",
];

#[derive(Debug, Clone)]
enum Action {
    Key(&'static str),
    MoveCaret { block: usize, offset: usize },
}

fn arb_action() -> impl Strategy<Value = Action> {
    prop_oneof![
        4 => prop::sample::select(KEYS.to_vec()).prop_map(Action::Key),
        1 => (0..16usize, 0..16usize)
            .prop_map(|(block, offset)| Action::MoveCaret { block, offset }),
    ]
}

fn assert_structure(state: &EditorState, max_depth: usize) {
    let content = state.content();
    let first = content.first_block().unwrap();
    assert_eq!(first.kind(), BlockKind::Title);
    assert_eq!(first.depth(), 0);
    assert_eq!(
        content
            .blocks()
            .filter(|b| b.kind() == BlockKind::Title)
            .count(),
        1
    );

    let mut previous = 0;
    for block in content.blocks().skip(1) {
        assert!(
            block.depth() <= previous + 1,
            "block {} jumps from depth {previous} to {}",
            block.key(),
            block.depth()
        );
        assert!(block.depth() <= max_depth);
        assert_eq!(block.text().chars().count(), block.characters().len());
        previous = block.depth();
    }

    for key in content.blocks().flat_map(|b| b.characters().iter().filter_map(|c| c.entity)) {
        assert!(content.entities().contains(key));
    }
}

proptest! {
    #[test]
    fn key_sequences_keep_document_structure(
        actions in prop::collection::vec(arb_action(), 0..80)
    ) {
        let mut editor = Editor::standard();
        let max_depth = editor.config().max_depth;
        let mut state = editor
            .normalize(&EditorState::create(ContentModel::empty()))
            .unwrap();

        for action in actions {
            state = match action {
                Action::Key(spec) => {
                    let press = KeyPress::parse(spec).unwrap();
                    editor.handle_key(&state, &press).unwrap()
                }
                Action::MoveCaret { block, offset } => {
                    let content = state.content();
                    let target = content.block_at(block % content.len()).unwrap();
                    let offset = offset % (target.len() + 1);
                    state.with_selection(Selection::caret(target.key().clone(), offset))
                }
            };
            assert_structure(&state, max_depth);
        }
    }

    #[test]
    fn edited_documents_survive_a_json_round_trip(
        actions in prop::collection::vec(prop::sample::select(KEYS.to_vec()), 0..40)
    ) {
        let mut editor = Editor::standard();
        let mut state = editor
            .normalize(&EditorState::create(ContentModel::empty()))
            .unwrap();
        for spec in actions {
            let press = KeyPress::parse(spec).unwrap();
            state = editor.handle_key(&state, &press).unwrap();
        }

        let json = DocumentValue::from_content(state.content())
            .to_json_pretty()
            .unwrap();
        let restored = DocumentValue::from_json_str(&json)
            .unwrap()
            .into_content()
            .unwrap();
        prop_assert_eq!(&restored, state.content());
        let again = DocumentValue::from_content(&restored).to_json_pretty().unwrap();
        prop_assert_eq!(again, json);
    }
}
