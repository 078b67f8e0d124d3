use std::collections::HashMap;

use crate::types::{FileStatus, OverallProgress};

/// Latest unflushed status per filename, kept in first-seen order.
///
/// A second update for a filename replaces the first (last write wins, no merge)
/// but keeps its original position.
#[derive(Debug, Default)]
pub struct PendingUpdates {
    order: Vec<String>,
    latest: HashMap<String, FileStatus>,
}

impl PendingUpdates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert(&mut self, status: FileStatus) {
        match self.latest.get_mut(&status.filename) {
            Some(slot) => *slot = status,
            None => {
                self.order.push(status.filename.clone());
                self.latest.insert(status.filename.clone(), status);
            }
        }
    }

    pub fn get(&self, filename: &str) -> Option<&FileStatus> {
        self.latest.get(filename)
    }

    /// Buffered updates in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = &FileStatus> {
        self.order.iter().filter_map(move |k| self.latest.get(k))
    }

    /// Take everything in first-seen order, leaving the buffer empty.
    pub fn drain(&mut self) -> Vec<FileStatus> {
        let mut latest = std::mem::take(&mut self.latest);
        std::mem::take(&mut self.order)
            .into_iter()
            .filter_map(|name| latest.remove(&name))
            .collect()
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.latest.clear();
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Buffered filenames in first-seen order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|k| k.as_str())
    }
}

/// Single-value slot for the overall progress snapshot; newest wins.
#[derive(Debug, Default)]
pub struct SnapshotSlot(Option<OverallProgress>);

impl SnapshotSlot {
    pub fn put(&mut self, snapshot: OverallProgress) {
        self.0 = Some(snapshot);
    }

    pub fn take(&mut self) -> Option<OverallProgress> {
        self.0.take()
    }

    pub fn peek(&self) -> Option<&OverallProgress> {
        self.0.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    pub fn clear(&mut self) {
        self.0 = None;
    }
}
