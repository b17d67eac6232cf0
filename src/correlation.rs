use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Identifier tying together the log events of one dispatched call. Never
/// part of the envelope contract.
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationId(pub u64);

impl Display for CorrelationId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Issues strictly increasing, gap-free correlation ids, one per dispatch.
#[derive(Debug, Default)]
pub struct CorrelationCounter {
    next: AtomicU64,
}

impl CorrelationCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self) -> CorrelationId {
        CorrelationId(self.next.fetch_add(1, Ordering::Relaxed) + 1)
    }
}
