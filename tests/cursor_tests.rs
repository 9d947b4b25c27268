//! Splitting, buffers and nodes across crate boundaries.

use proptest::prelude::*;

use sluice::core::error::{Error, MAX_ARRAY_SIZE};
use sluice::core::flags::Characteristics;
use sluice::cursor::cursor::{drain, split_fully};
use sluice::cursor::{ArrayCursor, BoxCursor, ConcatCursor, Cursor, IterCursor};
use sluice::mem::{Node, SpineBuffer};
use sluice::Pipeline;

fn concat_pieces(pieces: Vec<BoxCursor<u32>>) -> Vec<u32> {
    let mut out = Vec::new();
    for mut p in pieces {
        out.extend(drain(&mut *p));
    }
    out
}

fn cursors(items: &[u32]) -> Vec<BoxCursor<u32>> {
    let half = items.len() / 2;
    let spine: SpineBuffer<u32> = items.iter().copied().collect();
    let node = Node::concat(
        Node::from(items[..half].to_vec()),
        Node::from(items[half..].iter().copied().collect::<SpineBuffer<u32>>()),
    );
    vec![
        Box::new(ArrayCursor::new(items.to_vec())),
        Box::new(IterCursor::with_batching(items.to_vec().into_iter(), 3, 17)),
        Box::new(spine.into_cursor()),
        Box::new(node.into_cursor()),
        Box::new(ConcatCursor::new(
            Box::new(ArrayCursor::new(items[..half].to_vec())),
            Box::new(ArrayCursor::new(items[half..].to_vec())),
        )),
    ]
}

proptest! {
    #[test]
    fn splitting_conserves_elements_and_order(
        items in prop::collection::vec(any::<u32>(), 1..400),
        depth in 0usize..12,
    ) {
        for cursor in cursors(&items) {
            let sized = cursor.has_characteristics(Characteristics::SIZED);
            let pieces = split_fully(cursor, depth);
            if sized {
                let total: u64 = pieces.iter().map(|p| p.estimate_size()).sum();
                prop_assert_eq!(total, items.len() as u64);
            }
            prop_assert_eq!(concat_pieces(pieces), items.clone());
        }
    }

    #[test]
    fn spine_round_trips(items in prop::collection::vec(any::<i64>(), 0..2_000)) {
        let mut spine = SpineBuffer::new();
        for &x in &items {
            spine.push(x);
        }
        prop_assert_eq!(spine.len(), items.len() as u64);
        for (i, x) in items.iter().enumerate() {
            prop_assert_eq!(spine.get(i as u64).unwrap(), x);
        }
        let mut dest = vec![0i64; items.len() + 3];
        spine.copy_into(&mut dest, 3).unwrap();
        prop_assert_eq!(&dest[3..], &items[..]);
        prop_assert_eq!(spine.into_vec().unwrap(), items);
    }
}

#[test]
fn node_concat_is_associative() {
    let a = || Node::from(vec![1, 2]);
    let b = || Node::from((3..=5).collect::<SpineBuffer<i32>>());
    let c = || Node::from(vec![6]);
    let left = Node::concat(Node::concat(a(), b()), c());
    let right = Node::concat(a(), Node::concat(b(), c()));
    assert_eq!(left.count(), right.count());
    assert_eq!(left.into_vec().unwrap(), right.into_vec().unwrap());
    assert!(Node::concat(Node::<i32>::Empty, a()).is_leaf());
}

#[test]
fn truncate_spans_children() {
    let node = Node::concat(Node::from(vec![0, 1, 2, 3]), Node::from(vec![4, 5, 6]));
    assert_eq!(node.truncate(2, 6).unwrap().into_vec().unwrap(), vec![2, 3, 4, 5]);
    let node = Node::from(vec![1, 2]);
    assert!(matches!(node.truncate(1, 5), Err(Error::IllegalArgument(_))));
}

/// Reports a size no array can hold.
struct Huge;

impl Cursor<u8> for Huge {
    fn try_advance(&mut self, _action: &mut dyn FnMut(u8)) -> bool {
        false
    }

    fn try_split(&mut self) -> Option<BoxCursor<u8>> {
        None
    }

    fn estimate_size(&self) -> u64 {
        MAX_ARRAY_SIZE + 1
    }

    fn characteristics(&self) -> Characteristics {
        Characteristics::SIZED | Characteristics::ORDERED
    }
}

#[test]
fn oversized_materialization_fails_before_allocating() {
    let err = Pipeline::from_cursor(Box::new(Huge)).to_vec().unwrap_err();
    assert_eq!(
        err,
        Error::SizeExceeded {
            requested: MAX_ARRAY_SIZE + 1,
            max: MAX_ARRAY_SIZE
        }
    );
    let err = Pipeline::from_cursor(Box::new(Huge))
        .parallel()
        .map(|b| b.wrapping_add(1))
        .to_node()
        .unwrap_err();
    assert!(matches!(err, Error::SizeExceeded { .. }));
}

#[test]
fn spine_reads_back_across_chunk_growth() {
    let n = 1_000u64;
    let spine: SpineBuffer<u64> = (0..n).collect();
    assert!(spine.chunk_count() >= 4);
    for i in 0..n {
        assert_eq!(*spine.get(i).unwrap(), i);
    }
    assert!(matches!(spine.get(n), Err(Error::IndexOutOfBounds { index, len }) if index == n && len == n));
    let pieces = split_fully(Box::new(spine.into_cursor()), 8);
    let total: u64 = pieces.iter().map(|p| p.estimate_size()).sum();
    assert_eq!(total, n);
}
