//! Secrets cache shared by every profile refreshed in a cycle.
//!
//! The cache holds two sets keyed by [`SecretLocator`]:
//!
//! - **loaded**: secrets already resolved from the store. A loaded locator is
//!   never requested again until it is explicitly invalidated.
//! - **pending**: locators requested by some profile but not resolved yet,
//!   including ones whose last resolution attempt failed.
//!
//! Entries move from pending to loaded during a resolution pass
//! ([`SecretsResolver::load`](super::SecretsResolver::load)); nothing is removed
//! from the loaded set except through [`SecretsCache::invalidate`] and
//! [`SecretsCache::clear`].
//!
//! The cache is owned by the agent and lent to each refresh by `&mut`, so a
//! profile refresh has exclusive access for its whole run.

use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use super::loaded::LoadedSecret;
use super::reference::{SecretLocator, SecretReference};

#[derive(Debug, Default)]
pub struct SecretsCache {
    loaded: HashMap<SecretLocator, LoadedSecret>,
    pending: BTreeMap<SecretLocator, SecretReference>,
}

impl SecretsCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register references to be resolved by the next resolution pass.
    ///
    /// References whose locator is already loaded or already pending are
    /// skipped, so registering the same reference twice has no effect.
    /// Returns the number of locators newly added to the pending set.
    pub fn update_secret_defs_to_load<'a, I>(&mut self, references: I) -> usize
    where
        I: IntoIterator<Item = &'a SecretReference>,
    {
        let mut added = 0;
        for reference in references {
            if self.loaded.contains_key(&reference.locator)
                || self.pending.contains_key(&reference.locator)
            {
                continue;
            }
            debug!(locator = %reference.locator, name = %reference.name, "Queueing secret for resolution");
            self.pending.insert(reference.locator.clone(), reference.clone());
            added += 1;
        }
        added
    }

    /// Get a resolved secret by locator.
    pub fn get(&self, locator: &SecretLocator) -> Option<&LoadedSecret> {
        self.loaded.get(locator)
    }

    pub fn contains(&self, locator: &SecretLocator) -> bool {
        self.loaded.contains_key(locator)
    }

    pub fn is_pending(&self, locator: &SecretLocator) -> bool {
        self.pending.contains_key(locator)
    }

    /// References still waiting for resolution, in locator order.
    pub fn pending(&self) -> impl Iterator<Item = &SecretReference> {
        self.pending.values()
    }

    /// Record a successful resolution, moving the locator from pending to loaded.
    pub fn insert(&mut self, secret: LoadedSecret) {
        self.pending.remove(&secret.locator);
        debug!(locator = %secret.locator, "Caching resolved secret");
        self.loaded.insert(secret.locator.clone(), secret);
    }

    /// Drop a resolved secret so the next request for it goes back to the store.
    pub fn invalidate(&mut self, locator: &SecretLocator) -> Option<LoadedSecret> {
        debug!(locator = %locator, "Invalidating cached secret");
        self.loaded.remove(locator)
    }

    /// Clear both the loaded and pending sets.
    pub fn clear(&mut self) {
        debug!(loaded = self.loaded.len(), pending = self.pending.len(), "Clearing secrets cache");
        self.loaded.clear();
        self.pending.clear();
    }

    /// Number of resolved secrets.
    pub fn len(&self) -> usize {
        self.loaded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loaded.is_empty()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}
