use std::sync::Arc;
use std::time::SystemTime;

use crate::domain::ports::Clock;
use crate::use_cases::{PduCounters, RunMode};

// Shared state for the status API handlers.
#[derive(Clone)]
pub struct AppState {
    // Counters written by the active loop, read by /stats.
    pub counters: Arc<PduCounters>,
    pub mode: RunMode,
}

// Wall-clock adapter for PDU timestamps.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}
