//! Unique id generation for checkpoints and session instances
//!
//! Ids only need to be unique within the process for the lifetime of a run:
//! a sequence counter guarantees that, a random nonce keeps ids from
//! colliding across worker processes appending to the same log.

use rand::Rng;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Generates process-unique string ids
#[derive(Debug, Default, Clone, Copy)]
pub struct IdGenerator;

impl IdGenerator {
    /// Create a new id generator
    pub fn new() -> Self {
        Self
    }

    /// Produce a new unique id
    pub fn get_id(&self) -> String {
        let seq = NEXT_SEQ.fetch_add(1, Ordering::Relaxed);
        let nonce: u32 = rand::thread_rng().gen();
        format!("{seq:x}-{nonce:08x}")
    }

    /// Produce a new unique id with a prefix (e.g. `inst` for instance ids)
    pub fn get_id_with_prefix(&self, prefix: &str) -> String {
        format!("{prefix}-{}", self.get_id())
    }
}
