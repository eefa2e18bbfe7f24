//! Persistent rope for editable text documents
//!
//! A [`Text`] is immutable: [`Text::replace`] returns a new value that shares
//! every subtree the edit did not touch, so older values stay valid for undo
//! histories and concurrent readers. Lengths and positions are counted in
//! UTF-16 code units; lines are delimited by `\n`.

mod build;
mod compare;
pub mod cursor;
mod doc;
mod error;
mod line;
mod text;
mod units;

pub use cursor::{Direction, RangeCursor, RawCursor};
pub use doc::{Doc, Edit, FLUSH_THRESHOLD};
pub use error::{Result, TextError};
pub use line::Line;
pub use text::{Text, TextLeaf, TextNode, BASE_LEAF, MAX_LEAF, TARGET_BRANCH_SHIFT};
pub use units::utf16_len;
