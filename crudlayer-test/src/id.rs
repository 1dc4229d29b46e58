use std::sync::atomic::{AtomicI64, Ordering};
use uuid::Uuid;

/// Produces ids for entities created in tests.
pub trait IdGenerator<I>: Send + Sync {
    /// The id the store would assign next.
    fn next(&self) -> I;

    /// An id that no test entity is expected to have.
    fn random(&self) -> I;
}

/// Random v4 UUIDs, so `next` and `random` are the same.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIdGenerator;

impl IdGenerator<Uuid> for UuidIdGenerator {
    fn next(&self) -> Uuid {
        self.random()
    }

    fn random(&self) -> Uuid {
        Uuid::new_v4()
    }
}

/// Increasing `i64` ids starting after `start`.
#[derive(Debug)]
pub struct SequentialIdGenerator {
    last: AtomicI64,
}

impl SequentialIdGenerator {
    #[must_use]
    pub fn new(start: i64) -> Self {
        Self {
            last: AtomicI64::new(start),
        }
    }
}

impl IdGenerator<i64> for SequentialIdGenerator {
    fn next(&self) -> i64 {
        self.last.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn random(&self) -> i64 {
        rand::random()
    }
}
