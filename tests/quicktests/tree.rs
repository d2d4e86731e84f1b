use arena_bst::{Error, Tree};
use quickcheck_macros::quickcheck;

use std::collections::{BTreeMap, HashSet};

use crate::Op;

/// Applies a set of operations to a tree and a counting map.
/// This way we can ensure that after a random smattering of inserts
/// and deletes we have the same multiset of values in both.
fn do_ops<T>(ops: &[Op<T>], bst: &mut Tree<T>, counts: &mut BTreeMap<T, usize>)
where
    T: Ord + Clone + std::fmt::Debug,
{
    for op in ops {
        match op {
            Op::Insert(v) => {
                bst.insert(v.clone());
                *counts.entry(v.clone()).or_insert(0) += 1;
            }
            Op::Remove(v) => {
                let expected = match counts.get_mut(v) {
                    Some(count) => {
                        *count -= 1;
                        if *count == 0 {
                            counts.remove(v);
                        }
                        Some(v.clone())
                    }
                    None => None,
                };
                assert_eq!(bst.delete(v), expected);
            }
        }
    }
}

/// Checks ordering and parent links using only the public API.
fn is_well_formed<T: Ord>(tree: &Tree<T>) -> bool {
    let Some(root) = tree.root() else {
        return tree.len() == 0;
    };
    if root.parent().is_some() {
        return false;
    }

    let mut stack = vec![root];
    let mut count = 0;
    while let Some(node) = stack.pop() {
        count += 1;
        for child in node.left().into_iter().chain(node.right()) {
            if child.parent() != Some(node) {
                return false;
            }
            stack.push(child);
        }
    }

    let sorted = tree.walk().zip(tree.walk().skip(1)).all(|(a, b)| a <= b);
    sorted && count == tree.len()
}

#[quickcheck]
fn fuzz_multiple_operations_i8(ops: Vec<Op<i8>>) -> bool {
    let mut tree = Tree::new();
    let mut counts = BTreeMap::new();

    do_ops(&ops, &mut tree, &mut counts);

    let expected = counts
        .iter()
        .flat_map(|(value, count)| std::iter::repeat(value).take(*count));
    is_well_formed(&tree) && tree.walk().eq(expected)
}

#[quickcheck]
fn walk_is_sorted_input(xs: Vec<i8>) -> bool {
    let tree: Tree<_> = xs.iter().copied().collect();
    let mut sorted = xs;
    sorted.sort_unstable();

    tree.walk().copied().eq(sorted)
}

#[quickcheck]
fn min_and_max(xs: Vec<i8>) -> bool {
    let tree: Tree<_> = xs.iter().copied().collect();

    tree.min() == xs.iter().min() && tree.max() == xs.iter().max()
}

#[quickcheck]
fn contains(xs: Vec<i8>) -> bool {
    let tree: Tree<_> = xs.iter().copied().collect();

    xs.iter()
        .all(|x| tree.find(x).map(|id| tree[id]) == Some(*x))
}

#[quickcheck]
fn contains_not(xs: Vec<i8>, nots: Vec<i8>) -> bool {
    let tree: Tree<_> = xs.iter().copied().collect();
    let added: HashSet<_> = xs.into_iter().collect();
    let nots: HashSet<_> = nots.into_iter().collect();
    let mut nots = nots.difference(&added);

    nots.all(|x| tree.find(x).is_none() && tree.successor(x) == Err(Error::NotFound))
}

#[quickcheck]
fn successor_by_value(xs: Vec<i8>) -> bool {
    let tree: Tree<_> = xs.iter().copied().collect();
    let mut sorted = xs.clone();
    sorted.sort_unstable();
    sorted.dedup();

    // Whatever equal node `find` lands on, its successor holds either the same value or the next
    // distinct one.
    xs.iter().all(|x| {
        let next = tree.successor(x).expect("inserted value is found").map(|id| tree[id]);
        let pos = sorted.binary_search(x).expect("value is in sorted input");
        match next {
            Some(next) => next == *x || Some(&next) == sorted.get(pos + 1),
            None => pos + 1 == sorted.len(),
        }
    })
}

#[quickcheck]
fn with_deletions(xs: Vec<i8>, deletes: Vec<i8>) -> bool {
    let mut tree: Tree<_> = xs.iter().copied().collect();
    for delete in &deletes {
        // We may have inserted the same value multiple times - delete each one.
        while tree.delete(delete).is_some() {}
    }

    let mut still_present = xs;
    still_present.retain(|x| !deletes.contains(x));
    still_present.sort_unstable();

    is_well_formed(&tree)
        && deletes.iter().all(|x| tree.find(x).is_none())
        && tree.walk().copied().eq(still_present)
}

#[quickcheck]
fn deleting_absent_value_changes_nothing(xs: Vec<i8>, absent: i8) -> bool {
    if xs.contains(&absent) {
        return true;
    }
    let mut tree: Tree<_> = xs.iter().copied().collect();
    let before: Vec<_> = tree.walk().copied().collect();

    tree.delete(&absent).is_none() && tree.walk().copied().eq(before)
}
