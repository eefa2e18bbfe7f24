//! Leaf splitting and rebalancing construction

use crate::text::{Text, BASE_LEAF, MAX_LEAF, TARGET_BRANCH_SHIFT};
use crate::units::{split_offset, utf16_len};

/// Cut `text` into leaves of roughly [`BASE_LEAF`] units and append them to
/// `target`. The final piece holds whatever is left, under [`MAX_LEAF`].
/// Cuts that would land inside a surrogate pair move past it.
pub(crate) fn split_leaves(text: &str, target: &mut Vec<Text>) {
    let mut rest = text;
    while !rest.is_empty() {
        if rest.len() < MAX_LEAF
            || (split_offset(rest, MAX_LEAF) == rest.len() && utf16_len(rest) < MAX_LEAF)
        {
            target.push(Text::leaf(rest.to_string()));
            return;
        }
        let end = split_offset(rest, BASE_LEAF);
        target.push(Text::leaf(rest[..end].to_string()));
        rest = &rest[end..];
    }
}

/// Turn a flat fragment list into a single value with branching near
/// `2^TARGET_BRANCH_SHIFT`. Fragments already of a useful size are kept
/// as-is so shared subtrees stay shared.
pub(crate) fn from_children(len: usize, children: Vec<Text>) -> Text {
    let mut builder = Rebalance::new(len);
    for child in children {
        builder.add(child);
    }
    builder.finish()
}

struct Rebalance {
    chunk_len: usize,
    max_len: usize,
    min_len: usize,
    chunked: Vec<Text>,
    current: Vec<Text>,
    current_len: usize,
}

impl Rebalance {
    fn new(len: usize) -> Self {
        let chunk_len = len >> TARGET_BRANCH_SHIFT;
        Self {
            chunk_len,
            max_len: chunk_len << 1,
            min_len: chunk_len >> 1,
            chunked: Vec::with_capacity(1 << (TARGET_BRANCH_SHIFT + 1)),
            current: Vec::new(),
            current_len: 0,
        }
    }

    fn add(&mut self, child: Text) {
        let child_len = child.len();
        if child_len == 0 {
            return;
        }

        // Oversized nodes get flattened so their children can be redistributed
        if let Text::Node(node) = &child {
            if child_len > self.max_len {
                for grandchild in node.children() {
                    self.add(grandchild.clone());
                }
                return;
            }
        }

        if child_len > self.min_len && (self.current_len > self.min_len || self.current_len == 0) {
            self.flush();
            self.chunked.push(child);
            return;
        }

        // Adjacent small leaves merge instead of becoming separate children
        let merged = match (&child, self.current.last()) {
            (Text::Leaf(leaf), Some(Text::Leaf(last))) if leaf.len() + last.len() <= BASE_LEAF => {
                let mut merged = String::with_capacity(last.as_str().len() + leaf.as_str().len());
                merged.push_str(last.as_str());
                merged.push_str(leaf.as_str());
                Some(merged)
            }
            _ => None,
        };
        if let Some(merged) = merged {
            self.current_len += child_len;
            if let Some(slot) = self.current.last_mut() {
                *slot = Text::leaf(merged);
            }
            return;
        }

        if self.current_len + child_len > self.chunk_len {
            self.flush();
        }
        self.current_len += child_len;
        self.current.push(child);
    }

    fn flush(&mut self) {
        if self.current_len == 0 {
            return;
        }
        let mut chunk = std::mem::take(&mut self.current);
        let len = std::mem::replace(&mut self.current_len, 0);
        let text = if chunk.len() == 1 {
            chunk.swap_remove(0)
        } else {
            from_children(len, chunk)
        };
        self.chunked.push(text);
    }

    fn finish(mut self) -> Text {
        self.flush();
        match self.chunked.len() {
            0 => Text::empty(),
            1 => self.chunked.swap_remove(0),
            _ => Text::node(self.chunked),
        }
    }
}
