//! Pointer-driven reordering of flat sibling lists with a dense `order` field.
//!
//! Shared by the block editor (dragging blocks) and workspace navigation (dragging
//! units between siblings). The drop rule is the same everywhere: a negative vertical
//! delta drops before the target, anything else drops after it.

use serde::{Deserialize, Serialize};

/// Something that can be reordered in a list of siblings.
pub trait Ordered {
    type Id: PartialEq;

    fn id(&self) -> &Self::Id;
    fn set_order(&mut self, order: usize);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropSide {
    Before,
    After,
}

impl DropSide {
    /// `delta` is the pointer offset from the target's vertical midpoint; negative
    /// means the upper half.
    pub fn from_delta(delta: f32) -> Self {
        if delta < 0.0 { DropSide::Before } else { DropSide::After }
    }
}

/// A resolved move, in indices of the list before the move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reorder {
    pub from: usize,
    pub to: usize,
}

/// Destination index for moving `from` next to `target` on `side`.
pub fn reorder_index(from: usize, target: usize, side: DropSide, len: usize) -> usize {
    let gap = match side {
        DropSide::Before => target,
        DropSide::After => target.saturating_add(1),
    };
    let mut to = gap;
    if to > from {
        to = to.saturating_sub(1);
    }
    to.min(len.saturating_sub(1))
}

/// Resolves dropping `active` onto `over`. `None` when either id is missing.
pub fn plan_move<T: Ordered>(units: &[T], active: &T::Id, over: &T::Id, delta: f32) -> Option<Reorder> {
    let from = units.iter().position(|u| u.id() == active)?;
    let target = units.iter().position(|u| u.id() == over)?;
    let to = reorder_index(from, target, DropSide::from_delta(delta), units.len());
    Some(Reorder { from, to })
}

/// Moves `active` before or after `over` and reassigns dense zero-based orders.
///
/// Unknown ids leave the list untouched apart from reindexing.
pub fn move_unit<T: Ordered>(mut units: Vec<T>, active: &T::Id, over: &T::Id, delta: f32) -> Vec<T> {
    if let Some(Reorder { from, to }) = plan_move(&units, active, over, delta) {
        if from != to {
            let unit = units.remove(from);
            units.insert(to, unit);
        }
    }
    reindex(&mut units);
    units
}

/// Drops a unit coming from outside the list (e.g. another parent) next to `over`.
/// Falls back to appending when `over` is not in the list.
pub fn insert_unit<T: Ordered>(mut units: Vec<T>, unit: T, over: &T::Id, delta: f32) -> Vec<T> {
    let ix = match units.iter().position(|u| u.id() == over) {
        Some(target) => match DropSide::from_delta(delta) {
            DropSide::Before => target,
            DropSide::After => target + 1,
        },
        None => units.len(),
    };
    units.insert(ix, unit);
    reindex(&mut units);
    units
}

pub fn reindex<T: Ordered>(units: &mut [T]) {
    for (order, unit) in units.iter_mut().enumerate() {
        unit.set_order(order);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        id: &'static str,
        order: usize,
    }

    impl Ordered for Item {
        type Id = &'static str;

        fn id(&self) -> &Self::Id {
            &self.id
        }

        fn set_order(&mut self, order: usize) {
            self.order = order;
        }
    }

    fn items(ids: &[&'static str]) -> Vec<Item> {
        ids.iter()
            .enumerate()
            .map(|(order, id)| Item { id: *id, order: order * 10 })
            .collect()
    }

    fn ids(items: &[Item]) -> Vec<&'static str> {
        items.iter().map(|i| i.id).collect()
    }

    fn orders(items: &[Item]) -> Vec<usize> {
        items.iter().map(|i| i.order).collect()
    }

    #[test]
    fn drop_in_upper_half_lands_before_target() {
        let moved = move_unit(items(&["A", "B", "C", "D"]), &"A", &"C", -4.0);
        assert_eq!(ids(&moved), vec!["B", "A", "C", "D"]);
        assert_eq!(orders(&moved), vec![0, 1, 2, 3]);
    }

    #[test]
    fn drop_in_lower_half_lands_after_target() {
        let moved = move_unit(items(&["A", "B", "C", "D"]), &"A", &"C", 0.0);
        assert_eq!(ids(&moved), vec!["B", "C", "A", "D"]);

        let moved = move_unit(items(&["A", "B", "C", "D"]), &"A", &"C", 12.5);
        assert_eq!(ids(&moved), vec!["B", "C", "A", "D"]);
    }

    #[test]
    fn moving_up() {
        let moved = move_unit(items(&["A", "B", "C", "D"]), &"D", &"B", -1.0);
        assert_eq!(ids(&moved), vec!["A", "D", "B", "C"]);

        let moved = move_unit(items(&["A", "B", "C", "D"]), &"D", &"A", 1.0);
        assert_eq!(ids(&moved), vec!["A", "D", "B", "C"]);
    }

    #[test]
    fn dropping_on_self_or_neighbouring_gap_is_a_noop() {
        for (over, delta) in [("B", -1.0), ("B", 1.0), ("A", 1.0), ("C", -1.0)] {
            let moved = move_unit(items(&["A", "B", "C"]), &"B", &over, delta);
            assert_eq!(ids(&moved), vec!["A", "B", "C"], "over {over} delta {delta}");
            assert_eq!(orders(&moved), vec![0, 1, 2]);
        }
    }

    #[test]
    fn unknown_ids_only_reindex() {
        let moved = move_unit(items(&["A", "B"]), &"Z", &"A", -1.0);
        assert_eq!(ids(&moved), vec!["A", "B"]);
        assert_eq!(orders(&moved), vec![0, 1]);
    }

    #[test]
    fn inserting_an_outside_unit() {
        let a = Item { id: "A", order: 99 };
        let moved = insert_unit(items(&["B", "C", "D"]), a.clone(), &"C", -1.0);
        assert_eq!(ids(&moved), vec!["B", "A", "C", "D"]);
        assert_eq!(orders(&moved), vec![0, 1, 2, 3]);

        let moved = insert_unit(items(&["B", "C", "D"]), a.clone(), &"C", 1.0);
        assert_eq!(ids(&moved), vec!["B", "C", "A", "D"]);

        let moved = insert_unit(items(&["B"]), a, &"missing", -1.0);
        assert_eq!(ids(&moved), vec!["B", "A"]);
    }

    #[test]
    fn reorder_index_clamps_to_last_slot() {
        assert_eq!(reorder_index(0, 3, DropSide::After, 4), 3);
        assert_eq!(reorder_index(3, 0, DropSide::Before, 4), 0);
        assert_eq!(reorder_index(1, 1, DropSide::After, 4), 1);
    }
}
