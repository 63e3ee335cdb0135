//! Speaker registry - maps audio source (track) ids to participant identities.
//!
//! The session notifier registers tracks as they are published, possibly while
//! utterances are being arbitrated on another task. A lookup that races a
//! registration may come back empty; attribution is best-effort.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Shared source-id → identity map. Clones share the same table.
#[derive(Debug, Clone, Default)]
pub struct SpeakerRegistry {
    tracks: Arc<RwLock<HashMap<String, String>>>,
}

impl SpeakerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record (or overwrite) the identity behind `source_id`.
    ///
    /// Returns `true` when the mapping was added or changed.
    pub fn register_track(&self, source_id: impl Into<String>, identity: impl Into<String>) -> bool {
        let source_id = source_id.into();
        let identity = identity.into();

        let mut tracks = self.tracks.write().unwrap_or_else(PoisonError::into_inner);
        let changed = tracks.get(&source_id) != Some(&identity);
        if changed {
            tracing::debug!(source_id = %source_id, identity = %identity, "Track registered");
            tracks.insert(source_id, identity);
        }
        changed
    }

    /// Identity behind `source_id`, if one was registered.
    pub fn resolve(&self, source_id: &str) -> Option<String> {
        self.tracks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(source_id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.tracks.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_source_resolves_to_none() {
        let registry = SpeakerRegistry::new();
        assert!(registry.resolve("TR_missing").is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn register_is_an_idempotent_upsert() {
        let registry = SpeakerRegistry::new();
        assert!(registry.register_track("TR_1", "alice"));
        assert!(!registry.register_track("TR_1", "alice"));
        assert_eq!(registry.resolve("TR_1").as_deref(), Some("alice"));

        assert!(registry.register_track("TR_1", "bob"));
        assert_eq!(registry.resolve("TR_1").as_deref(), Some("bob"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn clones_share_the_table() {
        let registry = SpeakerRegistry::new();
        let notifier = registry.clone();
        assert!(notifier.register_track("TR_2", "carol"));
        assert_eq!(registry.resolve("TR_2").as_deref(), Some("carol"));
    }

    #[test]
    fn concurrent_registration_is_visible_after_join() {
        let registry = SpeakerRegistry::new();
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let registry = registry.clone();
                std::thread::spawn(move || {
                    assert!(registry.register_track(format!("TR_{i}"), format!("user-{i}")));
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(registry.len(), 8);
        assert_eq!(registry.resolve("TR_5").as_deref(), Some("user-5"));
    }
}
