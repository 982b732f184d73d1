//! Write buffer for extracted ads
//!
//! Records accumulate here and reach the store as one transactional,
//! insert-or-ignore batch.

use crate::ad::AdRecord;
use crate::storage::AdStore;
use crate::HarvestError;

/// Default number of buffered records that triggers a flush
pub const DEFAULT_BATCH_SIZE: usize = 20;

/// Pending ad records not yet committed
#[derive(Debug)]
pub struct WriteBuffer {
    records: Vec<AdRecord>,
    threshold: usize,
}

impl Default for WriteBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_BATCH_SIZE)
    }
}

impl WriteBuffer {
    pub fn new(threshold: usize) -> Self {
        let threshold = threshold.max(1);
        Self {
            records: Vec::with_capacity(threshold),
            threshold,
        }
    }

    /// Buffers a record, flushing the batch once the threshold is reached
    ///
    /// # Returns
    ///
    /// Rows inserted by the automatic flush, or 0 if none happened
    pub fn append<S: AdStore + ?Sized>(
        &mut self,
        record: AdRecord,
        store: &mut S,
    ) -> Result<usize, HarvestError> {
        self.records.push(record);
        if self.records.len() >= self.threshold {
            return self.flush(store);
        }
        Ok(0)
    }

    /// Commits every buffered record as one batch
    ///
    /// Records are only dropped from the buffer once the batch commits; on
    /// failure the transaction is rolled back and the records stay buffered.
    pub fn flush<S: AdStore + ?Sized>(&mut self, store: &mut S) -> Result<usize, HarvestError> {
        if self.records.is_empty() {
            return Ok(0);
        }

        let inserted = store
            .insert_ads(&self.records)
            .map_err(HarvestError::Flush)?;

        tracing::info!(
            "Flushed batch of {} ads ({} new rows)",
            self.records.len(),
            inserted
        );
        self.records.clear();
        Ok(inserted)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
