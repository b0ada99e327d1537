//! Snowflake ID Generator
//!
//! Twitter-style unique ID generation. IDs from one generator are strictly
//! increasing, which the presence layer relies on as a monotonic sequence.
//!
//! ```text
//! 63                        22            12            0
//! +--------------------------+-------------+-------------+
//! |  ms since epoch (41 bit) | worker (10) | seq (12)    |
//! +--------------------------+-------------+-------------+
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Discord epoch (2015-01-01T00:00:00.000Z)
pub const DEFAULT_EPOCH: u64 = 1420070400000;

const WORKER_BITS: u64 = 10;
const SEQUENCE_BITS: u64 = 12;
const SEQUENCE_MASK: u64 = (1 << SEQUENCE_BITS) - 1;
const WORKER_MASK: u64 = (1 << WORKER_BITS) - 1;

/// Snowflake ID generator
pub struct SnowflakeGenerator {
    worker_id: u64,
    epoch: u64,
    /// Packed `(timestamp_ms << SEQUENCE_BITS) | sequence` of the last ID.
    state: AtomicU64,
}

impl SnowflakeGenerator {
    /// Create a new snowflake generator using the default epoch
    pub fn new(worker_id: u16) -> Self {
        Self::with_epoch(worker_id, DEFAULT_EPOCH)
    }

    /// Create a generator with a custom epoch (milliseconds since UNIX epoch)
    pub fn with_epoch(worker_id: u16, epoch: u64) -> Self {
        Self {
            worker_id: worker_id as u64 & WORKER_MASK,
            epoch,
            state: AtomicU64::new(0),
        }
    }

    /// Generate a new snowflake ID
    ///
    /// When the sequence for the current millisecond is exhausted, or the wall
    /// clock steps backwards, the generator borrows the next millisecond so
    /// IDs never repeat or decrease.
    pub fn generate(&self) -> i64 {
        let now = self.current_timestamp();
        let mut current = self.state.load(Ordering::Acquire);

        loop {
            let last_ts = current >> SEQUENCE_BITS;
            let last_seq = current & SEQUENCE_MASK;

            let (ts, seq) = if now > last_ts {
                (now, 0)
            } else if last_seq < SEQUENCE_MASK {
                (last_ts, last_seq + 1)
            } else {
                (last_ts + 1, 0)
            };

            let next = (ts << SEQUENCE_BITS) | seq;
            match self
                .state
                .compare_exchange_weak(current, next, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => return self.compose(ts, seq),
                Err(observed) => current = observed,
            }
        }
    }

    fn compose(&self, timestamp: u64, sequence: u64) -> i64 {
        let elapsed = timestamp.saturating_sub(self.epoch);
        ((elapsed << (WORKER_BITS + SEQUENCE_BITS)) | (self.worker_id << SEQUENCE_BITS) | sequence)
            as i64
    }

    /// Get current timestamp in milliseconds
    fn current_timestamp(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default()
    }
}
