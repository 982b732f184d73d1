//! In-memory set of ad IDs already ingested
//!
//! Seeded once per session from the durable store and only ever grows. It is
//! never written back: persistence happens through the ad write path, so a
//! restart rebuilds it from whatever was actually committed.

use crate::ad::AdId;
use crate::storage::AdStore;
use crate::HarvestError;
use std::collections::HashSet;

/// Known ad IDs for one crawl session
#[derive(Debug, Default, Clone)]
pub struct DuplicateStore {
    known: HashSet<AdId>,
}

impl DuplicateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads every persisted ad ID
    ///
    /// A failure here is fatal to the session: without the seed, new and
    /// known ads cannot be told apart.
    pub fn seed<S: AdStore + ?Sized>(store: &S) -> Result<Self, HarvestError> {
        let known = store.load_known_ids().map_err(HarvestError::Seed)?;
        Ok(Self { known })
    }

    pub fn contains(&self, id: &AdId) -> bool {
        self.known.contains(id)
    }

    /// Marks an ID as known
    pub fn add(&mut self, id: AdId) {
        self.known.insert(id);
    }

    /// Claims an ID for fetching
    ///
    /// Returns `true` if the ID was new and is now registered, `false` if it
    /// was already known. Check and insert happen as one step.
    pub fn reserve(&mut self, id: &AdId) -> bool {
        if self.known.contains(id) {
            return false;
        }
        self.known.insert(id.clone())
    }

    pub fn len(&self) -> usize {
        self.known.len()
    }

    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }
}

impl From<HashSet<AdId>> for DuplicateStore {
    fn from(known: HashSet<AdId>) -> Self {
        Self { known }
    }
}

impl FromIterator<AdId> for DuplicateStore {
    fn from_iter<I: IntoIterator<Item = AdId>>(iter: I) -> Self {
        Self {
            known: iter.into_iter().collect(),
        }
    }
}
