//! Persistent rope: leaves hold bounded chunks, nodes hold shared children

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::build::{from_children, split_leaves};
use crate::compare::eq_content;
use crate::cursor::{Direction, RangeCursor, RawCursor};
use crate::error::{Result, TextError};
use crate::units::{byte_offset, count_line_breaks, is_boundary, utf16_len};

/// Maximum size of a leaf, in UTF-16 units
pub const MAX_LEAF: usize = 512;

/// Size leaves are cut to when splitting long input
pub const BASE_LEAF: usize = MAX_LEAF >> 1;

/// Desired branching factor, as a power of two (3 means 8 children)
pub const TARGET_BRANCH_SHIFT: u32 = 3;

// === Core Types ===

/// Immutable text value. Cloning is O(1); edits return new values that
/// share every subtree the edit did not touch.
#[derive(Clone)]
pub enum Text {
    Leaf(Arc<TextLeaf>),
    Node(Arc<TextNode>),
}

/// A contiguous chunk of at most [`MAX_LEAF`] units
#[derive(Debug)]
pub struct TextLeaf {
    text: String,
    len: usize,
    line_breaks: usize,
}

/// Ordered children with cached totals
#[derive(Debug)]
pub struct TextNode {
    children: Vec<Text>,
    len: usize,
    line_breaks: usize,
}

impl TextLeaf {
    fn new(text: String) -> Self {
        Self {
            len: utf16_len(&text),
            line_breaks: count_line_breaks(&text),
            text,
        }
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn line_breaks(&self) -> usize {
        self.line_breaks
    }

    /// Byte offset of a unit offset within this chunk
    #[inline]
    pub(crate) fn byte_at(&self, units: usize) -> usize {
        if self.text.len() == self.len {
            // All ASCII: units and bytes coincide
            units
        } else {
            byte_offset(&self.text, units)
        }
    }

    #[inline]
    pub(crate) fn slice_str(&self, from: usize, to: usize) -> &str {
        &self.text[self.byte_at(from)..self.byte_at(to)]
    }
}

impl TextNode {
    #[inline]
    pub fn children(&self) -> &[Text] {
        &self.children
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn line_breaks(&self) -> usize {
        self.line_breaks
    }

    fn replace(&self, from: usize, to: usize, insert: &str) -> Text {
        let removed = to - from;
        let inserted = utf16_len(insert);
        let new_len = self.len - removed + inserted;

        // Small documents never need tree structure
        if new_len <= BASE_LEAF {
            let mut text = String::with_capacity(insert.len() + new_len);
            write_children(&self.children, 0, from, &mut text);
            text.push_str(insert);
            write_children(&self.children, to, self.len, &mut text);
            return Text::leaf(text);
        }

        // Fast path: only one child changes and it keeps a reasonable size
        let mut pos = 0;
        for (i, child) in self.children.iter().enumerate() {
            if pos > from {
                break;
            }
            let end = pos + child.len();
            if to <= end {
                if fits_in_place(child.len(), removed, inserted, new_len) {
                    let mut children = self.children.clone();
                    children[i] = child.replace_range(from - pos, to - pos, insert);
                    return Text::node(children);
                }
                break;
            }
            pos = end;
        }

        tracing::trace!(from, to, inserted, new_len, "rebuilding node for replace");

        let mut parts = Vec::with_capacity(self.children.len() + inserted / BASE_LEAF + 2);
        let mut spliced = false;
        let mut pos = 0;
        for child in &self.children {
            let end = pos + child.len();
            if end <= from {
                parts.push(child.clone());
            } else {
                if pos < from {
                    child.decompose_start(from - pos, &mut parts);
                }
                if !spliced {
                    split_leaves(insert, &mut parts);
                    spliced = true;
                }
                if pos >= to {
                    parts.push(child.clone());
                } else if end > to {
                    child.decompose_end(to - pos, &mut parts);
                }
            }
            pos = end;
        }
        if !spliced {
            split_leaves(insert, &mut parts);
        }

        from_children(new_len, parts)
    }
}

/// Whether a child of length `child_len` may absorb the edit without the
/// parent being rebuilt
fn fits_in_place(child_len: usize, removed: usize, inserted: usize, new_len: usize) -> bool {
    if inserted > removed {
        let grown = child_len + (inserted - removed);
        grown < (new_len >> (TARGET_BRANCH_SHIFT - 1)).max(MAX_LEAF)
    } else {
        let shrunk = child_len - (removed - inserted);
        shrunk > new_len >> TARGET_BRANCH_SHIFT
    }
}

fn write_children(children: &[Text], from: usize, to: usize, out: &mut String) {
    let mut pos = 0;
    for child in children {
        if pos >= to {
            break;
        }
        let end = pos + child.len();
        if from < end {
            child.write_slice(from.saturating_sub(pos), (to - pos).min(child.len()), out);
        }
        pos = end;
    }
}

// === Text Implementation ===

impl Text {
    /// The empty document
    pub fn empty() -> Self {
        Text::leaf(String::new())
    }

    /// Build a text from raw content
    pub fn of(text: &str) -> Self {
        Self::from_string(text.to_string())
    }

    fn from_string(text: String) -> Self {
        let len = utf16_len(&text);
        if len < MAX_LEAF {
            return Text::leaf(text);
        }

        tracing::debug!(len, "building multi-leaf text");
        let mut leaves = Vec::with_capacity(len / BASE_LEAF + 1);
        split_leaves(&text, &mut leaves);
        from_children(len, leaves)
    }

    pub(crate) fn leaf(text: String) -> Self {
        Text::Leaf(Arc::new(TextLeaf::new(text)))
    }

    /// Wrap children in a node, caching their totals
    pub(crate) fn node(children: Vec<Text>) -> Self {
        let len = children.iter().map(Text::len).sum();
        let line_breaks = children.iter().map(Text::line_breaks).sum();
        Text::Node(Arc::new(TextNode {
            children,
            len,
            line_breaks,
        }))
    }

    /// Length in UTF-16 units
    #[inline]
    pub fn len(&self) -> usize {
        match self {
            Text::Leaf(leaf) => leaf.len,
            Text::Node(node) => node.len,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of `\n` line breaks
    #[inline]
    pub fn line_breaks(&self) -> usize {
        match self {
            Text::Leaf(leaf) => leaf.line_breaks,
            Text::Node(node) => node.line_breaks,
        }
    }

    /// Number of lines, always at least one
    #[inline]
    pub fn lines(&self) -> usize {
        self.line_breaks() + 1
    }

    /// Child values, or `None` for a leaf
    #[inline]
    pub fn children(&self) -> Option<&[Text]> {
        match self {
            Text::Leaf(_) => None,
            Text::Node(node) => Some(&node.children),
        }
    }

    /// Whether both values are the same allocation
    #[inline]
    pub fn ptr_eq(&self, other: &Text) -> bool {
        match (self, other) {
            (Text::Leaf(a), Text::Leaf(b)) => Arc::ptr_eq(a, b),
            (Text::Node(a), Text::Node(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Content between `from` and `to`.
    ///
    /// Requires `from <= to <= len()` with both on character boundaries;
    /// see [`Text::try_slice`] for the checked variant.
    pub fn slice(&self, from: usize, to: usize) -> String {
        debug_assert!(from <= to && to <= self.len(), "slice {from}..{to} out of range");
        let mut out = String::with_capacity(to - from);
        self.write_slice(from, to, &mut out);
        out
    }

    fn write_slice(&self, from: usize, to: usize, out: &mut String) {
        match self {
            Text::Leaf(leaf) => out.push_str(leaf.slice_str(from, to)),
            Text::Node(node) => write_children(&node.children, from, to, out),
        }
    }

    /// Replace `from..to` with `insert`, returning the new value.
    ///
    /// Same range contract as [`Text::slice`]. `self` is left untouched.
    pub fn replace(&self, from: usize, to: usize, insert: &str) -> Text {
        debug_assert!(from <= to && to <= self.len(), "replace {from}..{to} out of range");
        let result = self.replace_range(from, to, insert);
        debug_assert!(
            result.validate(),
            "text structure invalid after replacing {from}..{to}"
        );
        result
    }

    fn replace_range(&self, from: usize, to: usize, insert: &str) -> Text {
        if from == to && insert.is_empty() {
            return self.clone();
        }
        match self {
            Text::Leaf(leaf) => {
                let (start, end) = (leaf.byte_at(from), leaf.byte_at(to));
                let mut text = String::with_capacity(leaf.text.len() - (end - start) + insert.len());
                text.push_str(&leaf.text[..start]);
                text.push_str(insert);
                text.push_str(&leaf.text[end..]);
                Text::from_string(text)
            }
            Text::Node(node) => node.replace(from, to, insert),
        }
    }

    /// Append the fragments covering `0..to` onto `target`
    pub(crate) fn decompose_start(&self, to: usize, target: &mut Vec<Text>) {
        match self {
            Text::Leaf(leaf) if to >= leaf.len => target.push(self.clone()),
            Text::Leaf(leaf) => target.push(Text::leaf(leaf.slice_str(0, to).to_string())),
            Text::Node(node) => {
                let mut pos = 0;
                for child in &node.children {
                    let end = pos + child.len();
                    if end <= to {
                        target.push(child.clone());
                    } else {
                        if pos < to {
                            child.decompose_start(to - pos, target);
                        }
                        break;
                    }
                    pos = end;
                }
            }
        }
    }

    /// Append the fragments covering `from..len()` onto `target`
    pub(crate) fn decompose_end(&self, from: usize, target: &mut Vec<Text>) {
        match self {
            Text::Leaf(_) if from == 0 => target.push(self.clone()),
            Text::Leaf(leaf) => target.push(Text::leaf(leaf.slice_str(from, leaf.len).to_string())),
            Text::Node(node) => {
                let mut pos = 0;
                for child in &node.children {
                    let end = pos + child.len();
                    if pos >= from {
                        target.push(child.clone());
                    } else if end > from {
                        child.decompose_end(from - pos, target);
                    }
                    pos = end;
                }
            }
        }
    }

    // === Iteration ===

    /// Cursor over every chunk in the given direction
    pub fn iter(&self, direction: Direction) -> RawCursor<'_> {
        RawCursor::new(self, direction)
    }

    /// Forward chunks of the whole text
    pub fn chunks(&self) -> RawCursor<'_> {
        RawCursor::new(self, Direction::Forward)
    }

    /// Cursor over `from..to`; iterates backward when `from > to`
    pub fn iter_range(&self, from: usize, to: usize) -> RangeCursor<'_> {
        RangeCursor::new(self, from, to)
    }

    // === Checked access ===

    /// Whether `pos` is within the text and not inside a surrogate pair
    pub fn is_char_boundary(&self, mut pos: usize) -> bool {
        if pos > self.len() {
            return false;
        }
        let mut text = self;
        loop {
            match text {
                Text::Leaf(leaf) => return is_boundary(&leaf.text, pos),
                Text::Node(node) => {
                    let mut next = None;
                    for child in &node.children {
                        if pos < child.len() {
                            next = Some(child);
                            break;
                        }
                        pos -= child.len();
                    }
                    match next {
                        Some(child) => text = child,
                        None => return true,
                    }
                }
            }
        }
    }

    /// Verify `from..to` is a valid range for [`Text::slice`] and [`Text::replace`]
    pub fn check_range(&self, from: usize, to: usize) -> Result<()> {
        if from > to {
            return Err(TextError::InvertedRange { from, to });
        }
        if to > self.len() {
            return Err(TextError::OutOfBounds {
                from,
                to,
                len: self.len(),
            });
        }
        for pos in [from, to] {
            if !self.is_char_boundary(pos) {
                return Err(TextError::SplitsSurrogatePair { pos });
            }
        }
        Ok(())
    }

    pub fn try_slice(&self, from: usize, to: usize) -> Result<String> {
        self.check_range(from, to)?;
        Ok(self.slice(from, to))
    }

    pub fn try_replace(&self, from: usize, to: usize, insert: &str) -> Result<Text> {
        self.check_range(from, to)?;
        Ok(self.replace(from, to, insert))
    }

    // === Validation ===

    /// Check structural invariants, logging the first violation found
    pub fn validate(&self) -> bool {
        match self {
            Text::Leaf(leaf) => {
                if leaf.len > MAX_LEAF {
                    tracing::error!(len = leaf.len, max = MAX_LEAF, "leaf exceeds MAX_LEAF");
                    return false;
                }
                let (len, line_breaks) = (utf16_len(&leaf.text), count_line_breaks(&leaf.text));
                if leaf.len != len || leaf.line_breaks != line_breaks {
                    tracing::error!(
                        stored_len = leaf.len,
                        stored_breaks = leaf.line_breaks,
                        len,
                        line_breaks,
                        "leaf sums mismatch"
                    );
                    return false;
                }
                true
            }
            Text::Node(node) => {
                if node.children.is_empty() {
                    tracing::error!("node has no children");
                    return false;
                }
                if let Some(empty) = node.children.iter().position(Text::is_empty) {
                    tracing::error!(child = empty, "node holds an empty child");
                    return false;
                }
                if !node.children.iter().all(Text::validate) {
                    return false;
                }
                let len: usize = node.children.iter().map(Text::len).sum();
                let line_breaks: usize = node.children.iter().map(Text::line_breaks).sum();
                if node.len != len || node.line_breaks != line_breaks {
                    tracing::error!(
                        stored_len = node.len,
                        stored_breaks = node.line_breaks,
                        len,
                        line_breaks,
                        "node sums mismatch"
                    );
                    return false;
                }
                true
            }
        }
    }

    /// Height of the tree; a leaf has depth 1
    pub fn depth(&self) -> usize {
        match self {
            Text::Leaf(_) => 1,
            Text::Node(node) => 1 + node.children.iter().map(Text::depth).max().unwrap_or(0),
        }
    }
}

// === Trait Implementations ===

impl PartialEq for Text {
    fn eq(&self, other: &Text) -> bool {
        match (self, other) {
            _ if self.ptr_eq(other) => true,
            (Text::Leaf(a), Text::Leaf(b)) => a.text == b.text,
            _ => eq_content(self, other),
        }
    }
}

impl Eq for Text {}

impl Default for Text {
    fn default() -> Self {
        Text::empty()
    }
}

impl From<&str> for Text {
    fn from(text: &str) -> Self {
        Text::of(text)
    }
}

impl From<String> for Text {
    fn from(text: String) -> Self {
        Text::from_string(text)
    }
}

impl FromStr for Text {
    type Err = std::convert::Infallible;

    fn from_str(text: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Text::of(text))
    }
}

impl fmt::Display for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for chunk in self.chunks() {
            f.write_str(chunk)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Text::Leaf(leaf) => f.debug_tuple("Leaf").field(&leaf.text).finish(),
            Text::Node(node) => f
                .debug_struct("Node")
                .field("len", &node.len)
                .field("line_breaks", &node.line_breaks)
                .field("children", &node.children)
                .finish(),
        }
    }
}

impl<'a> IntoIterator for &'a Text {
    type Item = &'a str;
    type IntoIter = RawCursor<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.chunks()
    }
}
