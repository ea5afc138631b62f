//! Start/end pairing for named measurement steps
//!
//! The cache accumulates checkpoints for the lifetime of one test and
//! resolves each end against the oldest unconsumed start with the same
//! `(instance, name)` key. That FIFO-by-reuse rule lets a test reuse a step
//! name sequentially (each pair resolves independently, in call order) while
//! concurrently running instances never cross-pair, since the key includes
//! the instance id.
//!
//! State machine per start: open (recorded) -> consumed (matched to an end)
//! -> flushed (written to the durable log). An end with no matching start
//! stays unresolved forever and is dropped at flush time.

use std::collections::{HashMap, VecDeque};
use std::path::Path;

use crate::checkpoint::{Checkpoint, StepKind};
use crate::id::IdGenerator;
use crate::record::StepRecord;
use crate::store::LogStore;

/// One recorded start and, once matched, its end
#[derive(Debug, Clone)]
struct StepSlot {
    start: Checkpoint,
    end: Option<Checkpoint>,
}

/// In-memory cache of open and matched checkpoints for one test
#[derive(Debug, Default)]
pub struct PairingCache {
    ids: IdGenerator,
    /// Every start in arrival order; flush emits records in this order
    slots: Vec<StepSlot>,
    /// Indices into `slots` of still-open starts, FIFO per (instance, name)
    open: HashMap<(String, String), VecDeque<usize>>,
    /// Ends that never found a start; kept only so flush can report a count
    orphan_ends: Vec<Checkpoint>,
}

impl PairingCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a start checkpoint for `step_name` under `instance_id`.
    /// Allocates the pair id. Never fails and never blocks.
    pub fn sample_start(&mut self, step_name: &str, instance_id: &str) {
        let id = self.ids.get_id();
        let checkpoint = Checkpoint::capture(StepKind::Start, id, step_name, instance_id);
        let index = self.slots.len();
        self.slots.push(StepSlot {
            start: checkpoint,
            end: None,
        });
        self.open
            .entry((instance_id.to_string(), step_name.to_string()))
            .or_default()
            .push_back(index);
    }

    /// Record an end checkpoint. Consumes the oldest open start with the
    /// same `(instance, name)`; with no open start the end becomes an
    /// orphan that will never produce a record.
    pub fn sample_end(&mut self, step_name: &str, instance_id: &str) {
        let key = (instance_id.to_string(), step_name.to_string());
        match self.open.get_mut(&key).and_then(VecDeque::pop_front) {
            Some(index) => {
                let id = self.slots[index].start.id.clone();
                let checkpoint = Checkpoint::capture(StepKind::End, id, step_name, instance_id);
                self.slots[index].end = Some(checkpoint);
            }
            None => {
                let checkpoint =
                    Checkpoint::capture(StepKind::End, String::new(), step_name, instance_id);
                tracing::debug!(
                    step = step_name,
                    instance = instance_id,
                    "end checkpoint without a matching start"
                );
                self.orphan_ends.push(checkpoint);
            }
        }
    }

    /// Duration in milliseconds of the first already-consumed pair named
    /// `step_name`, 0.0 if no pair with that name has resolved yet.
    /// In-memory only: flushed data is not consulted.
    pub fn get_sample_time(&self, step_name: &str) -> f64 {
        self.slots
            .iter()
            .find(|slot| slot.start.name == step_name && slot.end.is_some())
            .and_then(|slot| {
                slot.end
                    .as_ref()
                    .map(|end| (end.timestamp_ms - slot.start.timestamp_ms) as f64)
            })
            .unwrap_or(0.0)
    }

    /// Number of starts still waiting for an end
    pub fn open_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.end.is_none()).count()
    }

    /// Convert every matched pair into a durable record, append each as one
    /// JSON line, then clear all in-memory state.
    ///
    /// Records are emitted in start-arrival order. A failed append loses
    /// that one record and processing continues; unmatched starts and
    /// orphan ends are dropped without a record. Calling flush again with
    /// no new samples writes nothing.
    pub fn flush(
        &mut self,
        store: &LogStore,
        log_path: &Path,
        execution_context: &str,
        test_passed: bool,
    ) {
        for slot in &self.slots {
            let Some(end) = &slot.end else { continue };
            let record = StepRecord::from_pair(&slot.start, end, execution_context, test_passed);
            match serde_json::to_string(&record) {
                Ok(line) => {
                    if let Err(err) = store.append_line(log_path, &line) {
                        tracing::warn!(step = record.name.as_str(), %err, "dropping record, append failed");
                    }
                }
                Err(err) => {
                    tracing::warn!(step = record.name.as_str(), %err, "dropping record, serialization failed");
                }
            }
        }

        if !self.orphan_ends.is_empty() {
            tracing::debug!(
                count = self.orphan_ends.len(),
                "dropping unmatched end checkpoints"
            );
        }

        self.slots.clear();
        self.open.clear();
        self.orphan_ends.clear();
    }
}
