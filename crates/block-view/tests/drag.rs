use docblocks_core::*;
use docblocks_reorder::move_unit;
use docblocks_view::*;
use proptest::prelude::*;

const KEYS: [&str; 5] = ["t", "A", "B", "C", "D"];

fn state() -> EditorState {
    EditorState::create(ContentModel::new(vec![
        Block::new("t", BlockKind::Title, "Doc"),
        Block::new("A", BlockKind::Text, "a"),
        Block::new("B", BlockKind::Text, "b"),
        Block::new("C", BlockKind::Text, "c"),
        Block::new("D", BlockKind::Text, "d"),
    ]))
}

fn drag(active: &str, over: &str, delta_y: f32) -> DragEnd {
    DragEnd {
        active: active.into(),
        over: over.into(),
        delta_y,
    }
}

fn order(state: &EditorState) -> Vec<String> {
    state
        .content()
        .blocks()
        .map(|b| b.key().as_str().to_string())
        .collect()
}

#[test]
fn upper_half_drops_before_the_target() {
    let next = reorder_blocks(&state(), &drag("A", "C", -1.0));
    assert_eq!(order(&next), vec!["t", "B", "A", "C", "D"]);
    assert_eq!(next.last_change(), Some(ChangeKind::MoveBlock));

    let next = reorder_blocks(&state(), &drag("D", "A", -3.0));
    assert_eq!(order(&next), vec!["t", "D", "A", "B", "C"]);
}

#[test]
fn lower_half_drops_after_the_target() {
    let next = reorder_blocks(&state(), &drag("A", "C", 1.0));
    assert_eq!(order(&next), vec!["t", "B", "C", "A", "D"]);

    let next = reorder_blocks(&state(), &drag("D", "B", 0.0));
    assert_eq!(order(&next), vec!["t", "A", "B", "D", "C"]);
}

#[test]
fn the_title_stays_first() {
    let start = state();
    assert_eq!(drop_target(&start, &drag("t", "C", 1.0)), None);
    assert_eq!(reorder_blocks(&start, &drag("t", "C", 1.0)), start);

    let next = reorder_blocks(&start, &drag("C", "t", -5.0));
    assert_eq!(order(&next), vec!["t", "C", "A", "B", "D"]);

    assert_eq!(drop_target(&start, &drag("A", "t", -5.0)), None);
}

#[test]
fn no_op_drops_keep_the_state() {
    let start = state();
    assert_eq!(reorder_blocks(&start, &drag("B", "B", -1.0)), start);
    assert_eq!(reorder_blocks(&start, &drag("B", "A", 2.0)), start);
    assert_eq!(reorder_blocks(&start, &drag("B", "C", -2.0)), start);
    assert_eq!(reorder_blocks(&start, &drag("B", "gone", 1.0)), start);
    assert_eq!(reorder_blocks(&start, &drag("gone", "B", 1.0)), start);
}

#[test]
fn drops_commit_through_the_handle() {
    let handle = EditorHandle::new(Editor::standard(), state()).unwrap();
    drop_block(&handle, &drag("B", "D", 4.0)).unwrap();
    assert_eq!(
        order(&handle.get_editor_state()),
        vec!["t", "A", "C", "D", "B"]
    );
}

#[test]
fn navigation_units_follow_the_same_rule() {
    let units: Vec<Unit> = ["A", "B", "C", "D"]
        .iter()
        .enumerate()
        .map(|(order, id)| Unit {
            id: id.to_string(),
            parent_id: Some("root".to_string()),
            title: id.to_lowercase(),
            order,
        })
        .collect();

    let moved = move_unit(units, &"A".to_string(), &"C".to_string(), -1.0);
    let ids: Vec<&str> = moved.iter().map(|u| u.id.as_str()).collect();
    assert_eq!(ids, vec!["B", "A", "C", "D"]);
    assert!(moved.iter().enumerate().all(|(ix, u)| u.order == ix));
}

proptest! {
    #[test]
    fn drops_permute_blocks_and_keep_the_title(
        active in 0..KEYS.len(),
        over in 0..KEYS.len(),
        delta in -20.0f32..20.0,
    ) {
        let start = state();
        let next = reorder_blocks(&start, &drag(KEYS[active], KEYS[over], delta));
        let mut keys = order(&next);

        prop_assert_eq!(keys[0].as_str(), "t");
        if active != 0 && active != over {
            let ix = keys.iter().position(|k| k == KEYS[active]).unwrap();
            let target = keys.iter().position(|k| k == KEYS[over]).unwrap();
            if over != 0 {
                if delta < 0.0 {
                    prop_assert_eq!(ix + 1, target);
                } else {
                    prop_assert_eq!(ix, target + 1);
                }
            }
        }
        keys.sort();
        let mut expected: Vec<String> = KEYS.iter().map(|k| k.to_string()).collect();
        expected.sort();
        prop_assert_eq!(keys, expected);
    }
}
