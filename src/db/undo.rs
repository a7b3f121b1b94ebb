//! Undo log
//!
//! Copy-on-write rollback support for one object index. Each open
//! session pushes a frame recording reversible deltas: ids created,
//! pre-images of the first modification, and pre-images of removals.
//!
//! - `commit` squashes the frame into its parent (or discards it at the
//!   top level), so an enclosing session can still roll everything back.
//! - `undo` replays the frame in reverse - created ids are erased,
//!   removed objects reinserted, modified objects restored - and
//!   restores the instance-allocation watermark so rolled-back creations
//!   do not burn ids.
//!
//! Only mutated records are snapshotted, never whole indices. Sessions
//! nest; rolling back an inner session never disturbs ancestor frames.

use std::collections::{BTreeMap, BTreeSet};

/// Reversible deltas recorded by one session, for one index
#[derive(Debug)]
struct UndoFrame<T> {
    created: BTreeSet<u64>,
    /// Pre-images of objects modified in this frame (first write wins)
    modified: BTreeMap<u64, T>,
    /// Pre-images of objects removed in this frame
    removed: BTreeMap<u64, T>,
    /// Instance watermark when the frame opened
    next_instance_before: u64,
}

impl<T> UndoFrame<T> {
    fn new(next_instance_before: u64) -> Self {
        Self {
            created: BTreeSet::new(),
            modified: BTreeMap::new(),
            removed: BTreeMap::new(),
            next_instance_before,
        }
    }
}

/// Stack of undo frames, one per open session
#[derive(Debug)]
pub(crate) struct UndoLog<T> {
    frames: Vec<UndoFrame<T>>,
}

impl<T: Clone> UndoLog<T> {
    pub fn new() -> Self {
        Self { frames: Vec::new() }
    }

    /// True when at least one session is open; deltas are only recorded
    /// while this holds.
    pub fn enabled(&self) -> bool {
        !self.frames.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn begin(&mut self, next_instance: u64) {
        self.frames.push(UndoFrame::new(next_instance));
    }

    pub fn note_created(&mut self, id: u64) {
        if let Some(frame) = self.frames.last_mut() {
            frame.created.insert(id);
        }
    }

    /// Record the pre-image of a modification. Objects created or
    /// already snapshotted in this frame need no further recording.
    pub fn note_modified(&mut self, id: u64, pre_image: &T) {
        if let Some(frame) = self.frames.last_mut() {
            if !frame.created.contains(&id) && !frame.modified.contains_key(&id) {
                frame.modified.insert(id, pre_image.clone());
            }
        }
    }

    /// Record a removal. `current` is the object's value at removal
    /// time; if the frame holds an earlier pre-image that one wins.
    pub fn note_removed(&mut self, id: u64, current: T) {
        if let Some(frame) = self.frames.last_mut() {
            if frame.created.remove(&id) {
                // Created and removed inside the same frame: net no-op.
                return;
            }
            let pre_image = frame.modified.remove(&id).unwrap_or(current);
            frame.removed.insert(id, pre_image);
        }
    }

    /// Squash the innermost frame into its parent, or discard it at the
    /// top level. The parent keeps the older pre-images.
    pub fn commit(&mut self) {
        let Some(child) = self.frames.pop() else {
            return;
        };
        let Some(parent) = self.frames.last_mut() else {
            return;
        };

        parent.created.extend(child.created);

        for (id, pre) in child.modified {
            if !parent.created.contains(&id) {
                parent.modified.entry(id).or_insert(pre);
            }
        }

        for (id, pre) in child.removed {
            if parent.created.remove(&id) {
                // Created in the parent, removed in the child: net no-op.
                continue;
            }
            let pre = parent.modified.remove(&id).unwrap_or(pre);
            parent.removed.insert(id, pre);
        }
    }

    /// Replay the innermost frame in reverse against `objects`.
    ///
    /// Returns the restored instance watermark, or `None` when no
    /// session was open.
    pub fn undo(&mut self, objects: &mut BTreeMap<u64, T>) -> Option<u64> {
        let frame = self.frames.pop()?;

        for id in &frame.created {
            objects.remove(id);
        }
        for (id, pre) in frame.modified {
            objects.insert(id, pre);
        }
        for (id, pre) in frame.removed {
            objects.insert(id, pre);
        }

        Some(frame.next_instance_before)
    }
}
