//! Artifacts fetched during a session, by the repository they came from

use super::key::CheckKey;
use crate::fetch::ArtifactHandle;
use dashmap::DashMap;

/// Found artifacts, so a cached Found can hand back the same bytes
#[derive(Debug, Default)]
pub struct ArtifactStore {
    handles: DashMap<CheckKey, ArtifactHandle>,
}

impl ArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &CheckKey) -> Option<ArtifactHandle> {
        self.handles.get(key).map(|h| h.value().clone())
    }

    pub fn insert(&self, key: CheckKey, handle: ArtifactHandle) {
        self.handles.insert(key, handle);
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}
