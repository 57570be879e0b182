// Use-case level inputs/outputs for the simulator and the listener.

use crate::domain::PduKind;
use std::time::Duration;

/// Identity and pacing of one simulation run.
#[derive(Debug, Clone)]
pub struct SimulationSettings {
    pub protocol_version: u8,
    pub exercise_id: u8,
    pub site_id: u16,
    pub application_id: u16,
    pub entity_count: usize,
    /// EntityState sends per entity per second; must be positive.
    pub target_rate: f64,
    pub tick_interval: Duration,
    /// `None` runs until shutdown.
    pub duration: Option<Duration>,
    /// Fixed seed for reproducible runs; entropy otherwise.
    pub rng_seed: Option<u64>,
}

/// Totals reported when the send loop stops.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub pdus_sent: u64,
    pub sent_by_kind: [u64; PduKind::COUNT],
    pub send_failures: u64,
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn sent(&self, kind: PduKind) -> u64 {
        self.sent_by_kind[kind.index()]
    }
}

/// Totals reported when the listener stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListenSummary {
    pub datagrams: u64,
    pub decoded: u64,
    pub malformed: u64,
    pub unsupported: u64,
    pub sink_failures: u64,
}

/// Which loop the process runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Simulate,
    Listen,
}

impl RunMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            RunMode::Simulate => "simulate",
            RunMode::Listen => "listen",
        }
    }
}
