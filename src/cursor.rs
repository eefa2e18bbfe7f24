//! Pull-based chunk cursors
//!
//! A cursor keeps the root-to-leaf path as an explicit stack, so it can
//! resume after every chunk and skip whole subtrees by their cached length
//! without visiting their leaves.

use crate::text::Text;
use crate::units::{byte_offset, utf16_len};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Forward,
    Backward,
}

/// Stack frame: a value on the current path and the position among its
/// children. Forward frames count up from 0, backward frames count down
/// from the child count.
struct Frame<'a> {
    text: &'a Text,
    index: usize,
}

impl<'a> Frame<'a> {
    fn start(text: &'a Text, direction: Direction) -> Self {
        let index = match (direction, text.children()) {
            (Direction::Backward, Some(children)) => children.len(),
            _ => 0,
        };
        Self { text, index }
    }
}

/// Depth-first walk over every chunk of a text
pub struct RawCursor<'a> {
    stack: Vec<Frame<'a>>,
    direction: Direction,
}

impl<'a> RawCursor<'a> {
    pub(crate) fn new(text: &'a Text, direction: Direction) -> Self {
        let mut stack = Vec::with_capacity(8);
        stack.push(Frame::start(text, direction));
        Self { stack, direction }
    }

    #[inline]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Skip `skip` units, then return the next non-empty chunk. Walking
    /// backward, "next" means the chunk ending where the cursor stands.
    /// Returns `None` once the text is exhausted.
    pub fn next_chunk(&mut self, mut skip: usize) -> Option<&'a str> {
        loop {
            let frame = self.stack.last_mut()?;
            let text = frame.text;
            match text {
                Text::Leaf(leaf) => {
                    self.stack.pop();
                    let len = leaf.len();
                    if len > skip {
                        return Some(match self.direction {
                            Direction::Forward => leaf.slice_str(skip, len),
                            Direction::Backward => leaf.slice_str(0, len - skip),
                        });
                    }
                    skip -= len;
                }
                Text::Node(node) => {
                    let children = node.children();
                    let next = match self.direction {
                        Direction::Forward if frame.index < children.len() => {
                            frame.index += 1;
                            Some(&children[frame.index - 1])
                        }
                        Direction::Backward if frame.index > 0 => {
                            frame.index -= 1;
                            Some(&children[frame.index])
                        }
                        _ => None,
                    };
                    let Some(child) = next else {
                        self.stack.pop();
                        continue;
                    };
                    if skip >= child.len() {
                        skip -= child.len();
                    } else {
                        self.stack.push(Frame::start(child, self.direction));
                    }
                }
            }
        }
    }
}

impl<'a> Iterator for RawCursor<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        self.next_chunk(0)
    }
}

impl std::iter::FusedIterator for RawCursor<'_> {}

/// Cursor restricted to a range: skips to the start once, then trims
/// chunks to the remaining budget
pub struct RangeCursor<'a> {
    cursor: RawCursor<'a>,
    skip: usize,
    limit: usize,
}

impl<'a> RangeCursor<'a> {
    pub(crate) fn new(text: &'a Text, from: usize, to: usize) -> Self {
        if from > to {
            Self {
                cursor: RawCursor::new(text, Direction::Backward),
                skip: text.len() - from,
                limit: from - to,
            }
        } else {
            Self {
                cursor: RawCursor::new(text, Direction::Forward),
                skip: from,
                limit: to - from,
            }
        }
    }

    #[inline]
    pub fn direction(&self) -> Direction {
        self.cursor.direction()
    }

    /// Units left to produce
    #[inline]
    pub fn remaining(&self) -> usize {
        self.limit
    }

    pub fn next_chunk(&mut self) -> Option<&'a str> {
        if self.limit == 0 {
            return None;
        }
        let chunk = self.cursor.next_chunk(std::mem::take(&mut self.skip))?;
        let units = utf16_len(chunk);
        if units <= self.limit {
            self.limit -= units;
            return Some(chunk);
        }

        let trimmed = match self.cursor.direction() {
            Direction::Forward => &chunk[..byte_offset(chunk, self.limit)],
            Direction::Backward => &chunk[byte_offset(chunk, units - self.limit)..],
        };
        self.limit = 0;
        (!trimmed.is_empty()).then_some(trimmed)
    }
}

impl<'a> Iterator for RangeCursor<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        self.next_chunk()
    }
}

impl std::iter::FusedIterator for RangeCursor<'_> {}
