//! Line lookup using cached line-break counts

use memchr::memchr_iter;

use crate::text::Text;
use crate::units::{count_line_breaks, utf16_len};

/// A line's extent in UTF-16 units, line break excluded. Lines are 0-based.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Line {
    pub number: usize,
    pub from: usize,
    pub to: usize,
}

impl Line {
    #[inline]
    pub fn len(&self) -> usize {
        self.to - self.from
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.from == self.to
    }

    /// Content of this line in `text`
    pub fn text(&self, text: &Text) -> String {
        text.slice(self.from, self.to)
    }
}

impl Text {
    /// The line with index `number`, or `None` past the last line
    pub fn line(&self, number: usize) -> Option<Line> {
        if number >= self.lines() {
            return None;
        }
        let from = if number == 0 {
            0
        } else {
            self.after_break(number)?
        };
        let to = if number == self.line_breaks() {
            self.len()
        } else {
            self.after_break(number + 1)? - 1
        };
        Some(Line { number, from, to })
    }

    /// The line containing `pos`. A position right after a line break
    /// belongs to the following line.
    pub fn line_at(&self, pos: usize) -> Line {
        let number = self.breaks_before(pos);
        self.line(number).unwrap_or(Line {
            number,
            from: pos,
            to: pos,
        })
    }

    /// Position just past the `nth` line break (1-based)
    fn after_break(&self, mut nth: usize) -> Option<usize> {
        debug_assert!(nth >= 1);
        let mut text = self;
        let mut offset = 0;
        loop {
            match text {
                Text::Leaf(leaf) => {
                    let content = leaf.as_str();
                    let byte = memchr_iter(b'\n', content.as_bytes()).nth(nth - 1)?;
                    return Some(offset + utf16_len(&content[..byte]) + 1);
                }
                Text::Node(node) => {
                    let mut next = None;
                    for child in node.children() {
                        if child.line_breaks() >= nth {
                            next = Some(child);
                            break;
                        }
                        nth -= child.line_breaks();
                        offset += child.len();
                    }
                    text = next?;
                }
            }
        }
    }

    /// Number of line breaks in `0..pos`
    fn breaks_before(&self, mut pos: usize) -> usize {
        let mut text = self;
        let mut count = 0;
        loop {
            match text {
                Text::Leaf(leaf) => {
                    let content = leaf.as_str();
                    return count + count_line_breaks(&content[..leaf.byte_at(pos)]);
                }
                Text::Node(node) => {
                    let mut next = None;
                    for child in node.children() {
                        if pos < child.len() {
                            next = Some(child);
                            break;
                        }
                        pos -= child.len();
                        count += child.line_breaks();
                    }
                    match next {
                        Some(child) => text = child,
                        None => return count,
                    }
                }
            }
        }
    }
}
