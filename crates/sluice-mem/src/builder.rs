//! Sink that materializes one traversal pass into a [`Node`].

use sluice_core::error::{Error, Result};
use sluice_core::sink::Sink;

use crate::node::Node;
use crate::spine::SpineBuffer;

enum Buffer<T> {
    Idle,
    /// `begin` announced an exact size; the vector is allocated up front.
    Exact { items: Vec<T>, expected: usize },
    Spine(SpineBuffer<T>),
    /// The pass already failed; further elements are dropped.
    Failed,
}

/// Builds a node from one `begin` / `accept`* / `end` pass.
///
/// Protocol errors cannot be returned from the sink methods, so they are
/// recorded and reported by [`NodeBuilder::build`].
pub struct NodeBuilder<T> {
    buffer: Buffer<T>,
    building: bool,
    error: Option<Error>,
}

impl<T> NodeBuilder<T> {
    pub fn new() -> Self {
        Self {
            buffer: Buffer::Idle,
            building: false,
            error: None,
        }
    }

    fn fail(&mut self, err: Error) {
        if self.error.is_none() {
            self.error = Some(err);
        }
        self.buffer = Buffer::Failed;
    }

    /// Take the finished node and reset the builder for another pass.
    pub fn build(&mut self) -> Result<Node<T>> {
        if self.building {
            return Err(Error::IllegalState(
                "node build requested before end of traversal".into(),
            ));
        }
        let buffer = std::mem::replace(&mut self.buffer, Buffer::Idle);
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        Ok(match buffer {
            Buffer::Idle | Buffer::Failed => Node::Empty,
            Buffer::Exact { items, .. } => Node::from(items),
            Buffer::Spine(spine) => Node::from(spine),
        })
    }
}

impl<T> Default for NodeBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send> Sink<T> for NodeBuilder<T> {
    fn begin(&mut self, size: Option<u64>) {
        if self.building {
            self.fail(Error::IllegalState("begin called twice".into()));
            return;
        }
        self.building = true;
        self.error = None;
        self.buffer = match size {
            Some(n) => match Error::check_array_size(n) {
                Ok(expected) => Buffer::Exact {
                    items: Vec::with_capacity(expected),
                    expected,
                },
                Err(err) => {
                    self.fail(err);
                    return;
                }
            },
            None => Buffer::Spine(SpineBuffer::new()),
        };
    }

    fn accept(&mut self, value: T) {
        debug_assert!(self.building, "accept outside begin/end");
        match &mut self.buffer {
            Buffer::Exact { items, expected } => {
                if items.len() == *expected {
                    let expected = *expected;
                    self.fail(Error::IllegalState(format!(
                        "more than the announced {expected} elements were pushed"
                    )));
                } else {
                    items.push(value);
                }
            }
            Buffer::Spine(spine) => spine.push(value),
            Buffer::Idle | Buffer::Failed => {}
        }
    }

    fn end(&mut self) {
        if let Buffer::Exact { items, expected } = &self.buffer {
            if items.len() < *expected {
                let (got, expected) = (items.len(), *expected);
                self.fail(Error::IllegalState(format!(
                    "end after {got} of the announced {expected} elements"
                )));
            }
        }
        self.building = false;
    }
}
