//! Result nodes: immutable, possibly tree-shaped containers of materialized
//! elements.
//!
//! Parallel evaluation builds one leaf per task and joins sibling results
//! with [`Node::concat`], so a result mirrors the shape of the task tree until
//! someone flattens it. A node's count is fixed at construction.

use sluice_core::error::{Error, Result};

use sluice_cursor::{ArrayCursor, BoxCursor, Characteristics, Cursor};

use crate::spine::SpineBuffer;

pub enum Node<T> {
    Empty,
    Array(Vec<T>),
    Chunked(SpineBuffer<T>),
    Concat {
        left: Box<Node<T>>,
        right: Box<Node<T>>,
        count: u64,
    },
}

impl<T> Node<T> {
    pub fn count(&self) -> u64 {
        match self {
            Node::Empty => 0,
            Node::Array(v) => v.len() as u64,
            Node::Chunked(s) => s.len(),
            Node::Concat { count, .. } => *count,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    pub fn child_count(&self) -> usize {
        match self {
            Node::Concat { .. } => 2,
            _ => 0,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.child_count() == 0
    }

    /// Join two results in encounter order. Empty sides are dropped instead
    /// of producing a degenerate inner node.
    pub fn concat(left: Node<T>, right: Node<T>) -> Node<T> {
        if left.is_empty() {
            return right;
        }
        if right.is_empty() {
            return left;
        }
        let count = left.count() + right.count();
        Node::Concat {
            left: Box::new(left),
            right: Box::new(right),
            count,
        }
    }

    /// Visit every element in encounter order.
    pub fn for_each(&self, f: &mut dyn FnMut(&T)) {
        match self {
            Node::Empty => {}
            Node::Array(v) => v.iter().for_each(f),
            Node::Chunked(s) => s.iter().for_each(f),
            Node::Concat { left, right, .. } => {
                left.for_each(f);
                right.for_each(f);
            }
        }
    }

    pub fn into_vec(self) -> Result<Vec<T>> {
        let len = Error::check_array_size(self.count())?;
        match self {
            Node::Empty => Ok(Vec::new()),
            Node::Array(v) => Ok(v),
            Node::Chunked(s) => s.into_vec(),
            concat => {
                let mut out = Vec::with_capacity(len);
                concat.drain_into(&mut out);
                Ok(out)
            }
        }
    }

    fn drain_into(self, out: &mut Vec<T>) {
        match self {
            Node::Empty => {}
            Node::Array(v) => out.extend(v),
            Node::Chunked(s) => out.extend(s),
            Node::Concat { left, right, .. } => {
                left.drain_into(out);
                right.drain_into(out);
            }
        }
    }

    /// Collapse into a single flat array leaf.
    pub fn flatten(self) -> Result<Node<T>> {
        match self {
            Node::Empty | Node::Array(_) => Ok(self),
            other => Ok(Node::Array(other.into_vec()?)),
        }
    }

    /// Elements `[from, to)` of this node.
    pub fn truncate(self, from: u64, to: u64) -> Result<Node<T>> {
        let count = self.count();
        if from > to || to > count {
            return Err(Error::IllegalArgument(format!(
                "range {from}..{to} is not within 0..{count}"
            )));
        }
        if from == 0 && to == count {
            return Ok(self);
        }
        if from == to {
            return Ok(Node::Empty);
        }
        match self {
            Node::Empty => Ok(Node::Empty),
            Node::Array(mut v) => {
                v.truncate(to as usize);
                v.drain(..from as usize);
                Ok(Node::Array(v))
            }
            Node::Chunked(s) => Node::Array(s.into_vec()?).truncate(from, to),
            Node::Concat { left, right, .. } => {
                let split = left.count();
                if to <= split {
                    left.truncate(from, to)
                } else if from >= split {
                    right.truncate(from - split, to - split)
                } else {
                    Ok(Node::concat(
                        left.truncate(from, split)?,
                        right.truncate(0, to - split)?,
                    ))
                }
            }
        }
    }
}

impl<T: Clone> Node<T> {
    /// Copy every element into `dest` starting at `offset`.
    pub fn copy_into(&self, dest: &mut [T], offset: usize) -> Result<()> {
        let end = (offset as u64).saturating_add(self.count());
        if end > dest.len() as u64 {
            return Err(Error::IndexOutOfBounds {
                index: end.saturating_sub(1),
                len: dest.len() as u64,
            });
        }
        match self {
            Node::Empty => {}
            Node::Array(v) => dest[offset..offset + v.len()].clone_from_slice(v),
            Node::Chunked(s) => s.copy_into(dest, offset)?,
            Node::Concat { left, right, .. } => {
                left.copy_into(dest, offset)?;
                right.copy_into(dest, offset + left.count() as usize)?;
            }
        }
        Ok(())
    }
}

impl<T: Send + 'static> Node<T> {
    pub fn into_cursor(self) -> NodeCursor<T> {
        NodeCursor {
            stack: vec![self],
            leaf: None,
        }
    }

    fn into_leaf_cursor(self) -> Option<BoxCursor<T>> {
        match self {
            Node::Array(v) => Some(Box::new(ArrayCursor::new(v))),
            Node::Chunked(s) => Some(Box::new(s.into_cursor())),
            Node::Empty | Node::Concat { .. } => None,
        }
    }
}

impl<T> Default for Node<T> {
    fn default() -> Self {
        Node::Empty
    }
}

impl<T> From<Vec<T>> for Node<T> {
    fn from(v: Vec<T>) -> Self {
        if v.is_empty() {
            Node::Empty
        } else {
            Node::Array(v)
        }
    }
}

impl<T> From<SpineBuffer<T>> for Node<T> {
    fn from(s: SpineBuffer<T>) -> Self {
        if s.is_empty() {
            Node::Empty
        } else {
            Node::Chunked(s)
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Node<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Node::Empty => f.write_str("Empty"),
            Node::Array(v) => f.debug_tuple("Array").field(v).finish(),
            Node::Chunked(s) => f.debug_tuple("Chunked").field(&s.len()).finish(),
            Node::Concat { left, right, count } => f
                .debug_struct("Concat")
                .field("count", count)
                .field("left", left)
                .field("right", right)
                .finish(),
        }
    }
}

/// Cursor over a node tree.
///
/// Pending subtrees sit on a stack with the next one in encounter order on
/// top; the leaf currently being traversed has its own cursor. Splitting
/// prefers handing out whole subtrees and only splits inside a leaf once a
/// single leaf remains.
pub struct NodeCursor<T> {
    stack: Vec<Node<T>>,
    leaf: Option<BoxCursor<T>>,
}

impl<T: Send + 'static> NodeCursor<T> {
    /// Pop subtrees until a non-empty leaf is on top; descend concats left first.
    fn next_leaf(&mut self) -> bool {
        while let Some(node) = self.stack.pop() {
            match node {
                Node::Empty => {}
                Node::Concat { left, right, .. } => {
                    self.stack.push(*right);
                    self.stack.push(*left);
                }
                leaf => {
                    self.leaf = leaf.into_leaf_cursor();
                    return true;
                }
            }
        }
        false
    }
}

impl<T: Send + 'static> Cursor<T> for NodeCursor<T> {
    fn try_advance(&mut self, action: &mut dyn FnMut(T)) -> bool {
        loop {
            if let Some(leaf) = self.leaf.as_mut() {
                if leaf.try_advance(action) {
                    return true;
                }
                self.leaf = None;
            }
            if !self.next_leaf() {
                return false;
            }
        }
    }

    fn for_each_remaining(&mut self, action: &mut dyn FnMut(T)) {
        loop {
            if let Some(mut leaf) = self.leaf.take() {
                leaf.for_each_remaining(action);
            }
            if !self.next_leaf() {
                return;
            }
        }
    }

    fn try_split(&mut self) -> Option<BoxCursor<T>> {
        if self.leaf.is_some() {
            if !self.stack.is_empty() {
                return self.leaf.take();
            }
            return self.leaf.as_mut().and_then(|l| l.try_split());
        }
        match self.stack.len() {
            0 => None,
            1 => match self.stack.pop()? {
                Node::Empty => None,
                Node::Concat { left, right, .. } => {
                    self.stack.push(*right);
                    Some(Box::new(left.into_cursor()))
                }
                leaf => {
                    self.leaf = leaf.into_leaf_cursor();
                    self.leaf.as_mut().and_then(|l| l.try_split())
                }
            },
            _ => {
                let top = self.stack.pop()?;
                Some(Box::new(top.into_cursor()))
            }
        }
    }

    fn estimate_size(&self) -> u64 {
        let pending: u64 = self.stack.iter().map(Node::count).sum();
        pending + self.leaf.as_ref().map_or(0, |l| l.estimate_size())
    }

    fn characteristics(&self) -> Characteristics {
        Characteristics::SIZED | Characteristics::SUBSIZED | Characteristics::ORDERED
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sluice_cursor::cursor::{drain, split_fully};

    fn leaves(n: usize, per_leaf: usize) -> Vec<Node<usize>> {
        (0..n)
            .map(|i| Node::from((i * per_leaf..(i + 1) * per_leaf).collect::<Vec<_>>()))
            .collect()
    }

    fn collect_ref(node: &Node<usize>) -> Vec<usize> {
        let mut out = Vec::new();
        node.for_each(&mut |v| out.push(*v));
        out
    }

    #[test]
    fn concat_drops_empty_sides() {
        let n = Node::concat(Node::Empty, Node::from(vec![1, 2]));
        assert!(n.is_leaf());
        assert_eq!(n.count(), 2);
    }

    #[test]
    fn concat_is_associative_in_content() {
        let mk = || leaves(3, 4);
        let [a, b, c]: [Node<usize>; 3] = mk().try_into().unwrap();
        let left_first = Node::concat(Node::concat(a, b), c);
        let [a, b, c]: [Node<usize>; 3] = mk().try_into().unwrap();
        let right_first = Node::concat(a, Node::concat(b, c));
        assert_eq!(collect_ref(&left_first), collect_ref(&right_first));
        assert_eq!(left_first.count(), 12);
        assert_eq!(
            left_first.into_vec().unwrap(),
            right_first.into_vec().unwrap()
        );
    }

    #[test]
    fn flatten_yields_single_array_leaf() {
        let node = leaves(4, 3)
            .into_iter()
            .fold(Node::Empty, |acc, n| Node::concat(acc, n));
        let flat = node.flatten().unwrap();
        assert!(matches!(flat, Node::Array(_)));
        assert_eq!(collect_ref(&flat), (0..12).collect::<Vec<_>>());
    }

    #[test]
    fn copy_into_walks_tree_in_order() {
        let chunked: SpineBuffer<usize> = (6..40).collect();
        let node = Node::concat(Node::from(vec![0, 1, 2, 3, 4, 5]), Node::from(chunked));
        let mut dest = vec![0; 42];
        node.copy_into(&mut dest, 2).unwrap();
        assert_eq!(dest[2..].to_vec(), (0..40).collect::<Vec<_>>());
    }

    #[test]
    fn truncate_across_children() {
        let node = leaves(3, 5)
            .into_iter()
            .fold(Node::Empty, |acc, n| Node::concat(acc, n));
        let mid = node.truncate(3, 12).unwrap();
        assert_eq!(mid.count(), 9);
        assert_eq!(mid.into_vec().unwrap(), (3..12).collect::<Vec<_>>());
    }

    #[test]
    fn truncate_rejects_bad_range() {
        let node = Node::from(vec![1, 2, 3]);
        assert!(matches!(
            node.truncate(2, 5),
            Err(Error::IllegalArgument(_))
        ));
    }

    #[test]
    fn cursor_traverses_in_order() {
        let node = leaves(5, 7)
            .into_iter()
            .fold(Node::Empty, |acc, n| Node::concat(acc, n));
        let mut c = node.into_cursor();
        assert_eq!(c.estimate_size(), 35);
        assert_eq!(drain(&mut c), (0..35).collect::<Vec<_>>());
    }

    #[test]
    fn cursor_splits_conserve_elements() {
        let node = leaves(6, 9)
            .into_iter()
            .fold(Node::Empty, |acc, n| Node::concat(acc, n));
        let pieces = split_fully(Box::new(node.into_cursor()), 16);
        assert!(pieces.len() > 6);
        let joined: Vec<usize> = pieces.into_iter().flat_map(|mut p| drain(p.as_mut())).collect();
        assert_eq!(joined, (0..54).collect::<Vec<_>>());
    }

    #[test]
    fn split_after_partial_traversal_hands_out_current_leaf() {
        let node = Node::concat(Node::from(vec![1, 2, 3]), Node::from(vec![4, 5]));
        let mut c = node.into_cursor();
        let mut first = Vec::new();
        assert!(c.try_advance(&mut |v| first.push(v)));
        let mut prefix = c.try_split().unwrap();
        assert_eq!(drain(prefix.as_mut()), vec![2, 3]);
        assert_eq!(drain(&mut c), vec![4, 5]);
        assert_eq!(first, vec![1]);
    }
}
