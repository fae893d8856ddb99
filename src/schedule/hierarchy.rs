//! Outline-level list to owned forest, and back.

use crate::model::Task;

/// Outline level used for tree placement. Non-positive levels become roots.
pub fn effective_level(raw: i32) -> i32 {
    if raw >= 1 {
        raw
    } else {
        1
    }
}

/// Parent index of every entry, resolved with a single stack pass.
///
/// The stack holds `(index, level)` of ancestor candidates; entries with a
/// level at or above the current one are popped before attaching.
fn parent_indices(tasks: &[Task]) -> Vec<Option<usize>> {
    let mut stack: Vec<(usize, i32)> = Vec::new();
    let mut parents = Vec::with_capacity(tasks.len());

    for (i, task) in tasks.iter().enumerate() {
        let level = effective_level(task.outline_level);
        while stack.last().is_some_and(|&(_, top)| top >= level) {
            stack.pop();
        }
        parents.push(stack.last().map(|&(idx, _)| idx));
        stack.push((i, level));
    }

    parents
}

/// Build an ordered forest from a flat list in depth-first pre-order.
///
/// Gaps in outline levels attach to the nearest shallower ancestor. Any
/// children already present on the inputs are discarded; the list is the
/// only source of structure.
pub fn build_tree(tasks: Vec<Task>) -> Vec<Task> {
    let parents = parent_indices(&tasks);

    let mut slots: Vec<Option<Task>> = tasks
        .into_iter()
        .map(|mut t| {
            t.children = Vec::new();
            Some(t)
        })
        .collect();

    // A child always sits after its parent, so walking backwards finishes
    // every subtree before its root is moved. Children arrive reversed.
    let mut roots = Vec::new();
    for i in (0..slots.len()).rev() {
        let Some(mut node) = slots[i].take() else {
            continue;
        };
        node.children.reverse();
        match parents[i] {
            Some(p) => {
                if let Some(parent) = slots[p].as_mut() {
                    parent.children.push(node);
                }
            }
            None => roots.push(node),
        }
    }
    roots.reverse();

    tracing::debug!(roots = roots.len(), "Built task tree");
    roots
}

/// Flatten a forest back into pre-order with children detached.
pub fn flatten(forest: &[Task]) -> Vec<Task> {
    fn walk(nodes: &[Task], out: &mut Vec<Task>) {
        for node in nodes {
            out.push(node.detached());
            walk(&node.children, out);
        }
    }

    let mut out = Vec::new();
    walk(forest, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TaskId;
    use chrono::NaiveDate;

    fn task(id: u32, level: i32) -> Task {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        Task::new(TaskId(id), format!("T{id}"), start, start).with_level(level)
    }

    fn ids(nodes: &[Task]) -> Vec<u32> {
        nodes.iter().map(|t| t.id.0).collect()
    }

    #[test]
    fn builds_nested_forest() {
        let flat = vec![
            task(1, 1),
            task(2, 2),
            task(3, 3),
            task(4, 2),
            task(5, 1),
            task(6, 2),
        ];
        let forest = build_tree(flat);

        assert_eq!(ids(&forest), vec![1, 5]);
        assert_eq!(ids(&forest[0].children), vec![2, 4]);
        assert_eq!(ids(&forest[0].children[0].children), vec![3]);
        assert_eq!(ids(&forest[1].children), vec![6]);
    }

    #[test]
    fn level_gap_attaches_to_nearest_ancestor() {
        let forest = build_tree(vec![task(1, 1), task(2, 3), task(3, 2)]);
        assert_eq!(ids(&forest), vec![1]);
        assert_eq!(ids(&forest[0].children), vec![2, 3]);
    }

    #[test]
    fn non_positive_levels_become_roots() {
        let forest = build_tree(vec![task(1, 1), task(2, 0), task(3, -4), task(4, 2)]);
        assert_eq!(ids(&forest), vec![1, 2, 3]);
        assert_eq!(ids(&forest[2].children), vec![4]);
    }

    #[test]
    fn leading_deep_task_is_a_root() {
        let forest = build_tree(vec![task(1, 3), task(2, 1)]);
        assert_eq!(ids(&forest), vec![1, 2]);
    }

    #[test]
    fn flatten_reproduces_input_order() {
        let flat = vec![
            task(10, 1),
            task(11, 2),
            task(12, 4),
            task(13, 3),
            task(14, 2),
            task(15, 1),
            task(16, 1),
            task(17, 2),
        ];
        let forest = build_tree(flat.clone());
        assert_eq!(flatten(&forest), flat);
    }

    /// Every level sequence of length `len` over `-1..=3`.
    fn level_sequences(len: u32) -> impl Iterator<Item = Vec<i32>> {
        (0..5u32.pow(len)).map(move |mut code| {
            (0..len)
                .map(|_| {
                    let level = (code % 5) as i32 - 1;
                    code /= 5;
                    level
                })
                .collect()
        })
    }

    fn count(nodes: &[Task]) -> usize {
        nodes.iter().map(|n| 1 + count(&n.children)).sum()
    }

    fn levels_deepen_by_parent(nodes: &[Task], parent: Option<i32>) -> bool {
        nodes.iter().all(|n| {
            let level = effective_level(n.outline_level);
            parent.map_or(true, |p| level > p)
                && levels_deepen_by_parent(&n.children, Some(level))
        })
    }

    #[test]
    fn every_short_outline_round_trips() {
        for len in 0..=5 {
            for levels in level_sequences(len) {
                let flat: Vec<Task> = levels
                    .iter()
                    .enumerate()
                    .map(|(i, &level)| task(i as u32, level))
                    .collect();
                let forest = build_tree(flat.clone());

                assert_eq!(count(&forest), flat.len(), "levels {levels:?}");
                assert!(levels_deepen_by_parent(&forest, None), "levels {levels:?}");
                assert_eq!(flatten(&forest), flat, "levels {levels:?}");
            }
        }
    }

    #[test]
    fn empty_input_gives_empty_forest() {
        assert!(build_tree(Vec::new()).is_empty());
        assert!(flatten(&[]).is_empty());
    }
}
