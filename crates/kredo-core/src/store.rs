//! Credit profile storage.
//!
//! The store is a seam: the in-memory implementation below backs the CLI
//! and tests, while a service embedding the engine can provide its own.
//! Unknown users resolve to a deterministic synthetic profile rather than
//! an error, so demo flows never dead-end on a missing bureau record.

use std::collections::BTreeMap;

use parking_lot::RwLock;
use tracing::debug;

use crate::error::InputError;
use crate::profile::{dummy_profile, CreditProfile, ProfileUpdate};

/// Read/write access to credit profiles keyed by user id.
pub trait ProfileStore: Send + Sync {
    /// Look up a stored profile without side effects.
    fn get(&self, user_id: &str) -> Option<CreditProfile>;

    /// Fetch a profile, seeding and persisting a synthetic one when the
    /// user is unknown. Always succeeds.
    fn resolve(&self, user_id: &str) -> CreditProfile;

    /// Merge an update onto the user's profile (resolving it first) and
    /// persist the result.
    fn upsert(&self, user_id: &str, update: &ProfileUpdate) -> Result<CreditProfile, InputError>;
}

/// Process-local store backed by a `BTreeMap` behind a read/write lock.
#[derive(Debug, Default)]
pub struct MemoryProfileStore {
    profiles: RwLock<BTreeMap<String, CreditProfile>>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored profiles. Used by tests and status output.
    pub fn len(&self) -> usize {
        self.profiles.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.read().is_empty()
    }
}

impl ProfileStore for MemoryProfileStore {
    fn get(&self, user_id: &str) -> Option<CreditProfile> {
        self.profiles.read().get(user_id).cloned()
    }

    fn resolve(&self, user_id: &str) -> CreditProfile {
        if let Some(profile) = self.get(user_id) {
            return profile;
        }
        let seeded = dummy_profile(user_id);
        debug!(user_id, "seeded synthetic credit profile");
        self.profiles
            .write()
            .entry(user_id.to_string())
            .or_insert(seeded)
            .clone()
    }

    fn upsert(&self, user_id: &str, update: &ProfileUpdate) -> Result<CreditProfile, InputError> {
        update.validate()?;
        let base = self.resolve(user_id);
        let merged = update.apply(&base);
        self.profiles
            .write()
            .insert(user_id.to_string(), merged.clone());
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_seeds_and_persists() {
        let store = MemoryProfileStore::new();
        assert!(store.get("U1").is_none());

        let first = store.resolve("U1");
        let second = store.resolve("U1");
        assert_eq!(first, second);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn seeding_is_per_user() {
        let store = MemoryProfileStore::new();
        store.resolve("U1");
        store.resolve("U2");
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn upsert_merges_onto_resolved_base() {
        let store = MemoryProfileStore::new();
        let update = ProfileUpdate {
            revolving_utilization: Some(0.05),
            ..ProfileUpdate::default()
        };
        let merged = store.upsert("U1", &update).unwrap();
        assert_eq!(merged.revolving_utilization, 0.05);
        // The merge persisted.
        assert_eq!(store.get("U1"), Some(merged));
    }

    #[test]
    fn invalid_update_leaves_store_untouched() {
        let store = MemoryProfileStore::new();
        let update = ProfileUpdate {
            revolving_utilization: Some(1.5),
            ..ProfileUpdate::default()
        };
        assert!(store.upsert("U1", &update).is_err());
        assert!(store.get("U1").is_none());
    }
}
