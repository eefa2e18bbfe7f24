//! Shared document handle: readers get immutable snapshots, writers buffer edits

use std::ops::Range;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;
use crossbeam::queue::SegQueue;
use parking_lot::Mutex;

use crate::text::Text;

/// Auto-flush pending edits after this many operations
pub const FLUSH_THRESHOLD: usize = 16;

/// Edit operations, in UTF-16 units of the text they are applied to
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Edit {
    Insert { pos: usize, text: String },
    Delete { range: Range<usize> },
    Replace { range: Range<usize>, text: String },
}

impl Edit {
    fn range(&self) -> Range<usize> {
        match self {
            Edit::Insert { pos, .. } => *pos..*pos,
            Edit::Delete { range } | Edit::Replace { range, .. } => range.clone(),
        }
    }

    fn text(&self) -> &str {
        match self {
            Edit::Insert { text, .. } | Edit::Replace { text, .. } => text.as_str(),
            Edit::Delete { .. } => "",
        }
    }
}

/// The document. Every published [`Text`] stays valid for whoever still
/// holds it, so readers never block writers.
pub struct Doc {
    /// Current immutable snapshot for readers (lock-free)
    snapshot: ArcSwap<Text>,
    /// Buffered edits waiting to be applied
    pending: SegQueue<Edit>,
    /// Approximate count of pending edits for auto-flush
    pending_count: AtomicUsize,
    /// Bumped once per published snapshot
    version: AtomicU64,
    /// Held while draining and publishing so batches land in queue order
    writer: Mutex<()>,
}

impl Doc {
    pub fn new() -> Self {
        Self::with_text(Text::empty())
    }

    pub fn with_text(text: Text) -> Self {
        Self {
            snapshot: ArcSwap::from_pointee(text),
            pending: SegQueue::new(),
            pending_count: AtomicUsize::new(0),
            version: AtomicU64::new(0),
            writer: Mutex::new(()),
        }
    }

    /// Current snapshot
    pub fn read(&self) -> Arc<Text> {
        self.snapshot.load_full()
    }

    /// Queue an edit; applied on the next [`Doc::flush`]
    pub fn edit(&self, edit: Edit) {
        self.pending.push(edit);
        let count = self.pending_count.fetch_add(1, Ordering::Relaxed) + 1;

        if count >= FLUSH_THRESHOLD {
            self.flush();
        }
    }

    /// Apply buffered edits in order and publish the result. Edits that do
    /// not fit the text they land on are skipped.
    pub fn flush(&self) {
        let _writer = self.writer.lock();

        let mut edits = Vec::new();
        while let Some(edit) = self.pending.pop() {
            edits.push(edit);
        }

        if edits.is_empty() {
            return;
        }

        self.pending_count.store(0, Ordering::Relaxed);

        let current = self.snapshot.load_full();
        let next = apply_edits(&current, &edits);
        if next.ptr_eq(&current) {
            return;
        }
        self.snapshot.store(Arc::new(next));
        self.version.fetch_add(1, Ordering::Relaxed);
    }

    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Relaxed)
    }

    /// Publish an arbitrary text, such as one restored by an undo history
    pub fn set(&self, text: Arc<Text>) {
        let _writer = self.writer.lock();
        self.snapshot.store(text);
        self.version.fetch_add(1, Ordering::Relaxed);
    }
}

impl Default for Doc {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for Doc {
    fn from(text: &str) -> Self {
        Self::with_text(Text::of(text))
    }
}

fn apply_edits(text: &Text, edits: &[Edit]) -> Text {
    let mut text = text.clone();
    for edit in edits {
        let range = edit.range();
        match text.try_replace(range.start, range.end, edit.text()) {
            Ok(next) => text = next,
            Err(err) => tracing::warn!(%err, ?edit, "skipping edit"),
        }
    }
    text
}
