use super::Persist;
use playsync_model::PlaylistEntry;
use serde::{Deserialize, Serialize};
use std::ops::{Deref, DerefMut};

/// Ordered collection of sync targets, keyed by playlist name.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SyncList(Vec<PlaylistEntry>);

impl Persist for SyncList {}

impl SyncList {
    pub fn new(entries: Vec<PlaylistEntry>) -> Self {
        Self(entries)
    }

    pub fn add(&mut self, entries: impl IntoIterator<Item = PlaylistEntry>) {
        self.0.extend(entries);
    }

    /// Replaces the entry with the same name, or appends a new one.
    pub fn upsert(&mut self, entry: PlaylistEntry) {
        match self.0.iter_mut().find(|existing| existing.name == entry.name) {
            Some(existing) => *existing = entry,
            None => self.0.push(entry),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<PlaylistEntry> {
        let idx = self.0.iter().position(|entry| entry.name == name)?;
        Some(self.0.remove(idx))
    }

    pub fn replace(&mut self, entries: Vec<PlaylistEntry>) {
        self.0 = entries;
    }

    pub fn get(&self, name: &str) -> Option<&PlaylistEntry> {
        self.0.iter().find(|entry| entry.name == name)
    }
}

impl Deref for SyncList {
    type Target = Vec<PlaylistEntry>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for SyncList {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}
