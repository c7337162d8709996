use crate::{Batch, L2Transaction};

/// Bounds the encoded size of the transactions selected for a batch.
#[derive(Debug, Clone, Copy)]
pub struct BatchSizeLimiter {
    remaining: usize,
}

impl BatchSizeLimiter {
    /// Returns a limiter accepting at most `max_size` bytes of encoded transactions.
    pub const fn new(max_size: usize) -> Self {
        Self { remaining: max_size }
    }

    /// Accepts the transaction if it still fits, accounting for its size.
    pub fn accept_transaction(&mut self, tx: &L2Transaction) -> bool {
        let size = tx.size();
        if size > self.remaining {
            return false;
        }
        self.remaining -= size;
        true
    }
}

/// Decides which batches fit into a rollup.
pub trait RollupLimiter {
    /// Accepts the batch if it still fits into the rollup.
    fn accept_batch(&mut self, batch: &Batch) -> bool;
}

/// A [`RollupLimiter`] bounding the encoded size of the rollup batches.
#[derive(Debug, Clone, Copy)]
pub struct RollupSizeLimiter {
    remaining: usize,
}

impl RollupSizeLimiter {
    /// Returns a limiter accepting at most `max_size` bytes of encoded batches.
    pub const fn new(max_size: usize) -> Self {
        Self { remaining: max_size }
    }
}

impl RollupLimiter for RollupSizeLimiter {
    fn accept_batch(&mut self, batch: &Batch) -> bool {
        let size = batch.size();
        if size > self.remaining {
            return false;
        }
        self.remaining -= size;
        true
    }
}

/// A [`RollupLimiter`] that accepts every batch.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnboundedRollupLimiter;

impl RollupLimiter for UnboundedRollupLimiter {
    fn accept_batch(&mut self, _batch: &Batch) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rollup_size_limiter() {
        let batch = Batch::default();
        let mut limiter = RollupSizeLimiter::new(batch.size() * 2);
        assert!(limiter.accept_batch(&batch));
        assert!(limiter.accept_batch(&batch));
        assert!(!limiter.accept_batch(&batch));
    }
}
