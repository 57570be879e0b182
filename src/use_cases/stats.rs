// Traffic counters shared between the send/receive loops and the status API.

use crate::domain::PduKind;
use std::array;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug)]
pub struct PduCounters {
    sent: [AtomicU64; PduKind::COUNT],
    received: [AtomicU64; PduKind::COUNT],
    // Indexed by raw pduType.
    unsupported: [AtomicU64; 256],
    malformed: AtomicU64,
    send_failures: AtomicU64,
    sink_failures: AtomicU64,
    ticks: AtomicU64,
}

impl Default for PduCounters {
    fn default() -> Self {
        Self {
            sent: array::from_fn(|_| AtomicU64::new(0)),
            received: array::from_fn(|_| AtomicU64::new(0)),
            unsupported: array::from_fn(|_| AtomicU64::new(0)),
            malformed: AtomicU64::new(0),
            send_failures: AtomicU64::new(0),
            sink_failures: AtomicU64::new(0),
            ticks: AtomicU64::new(0),
        }
    }
}

impl PduCounters {
    pub fn record_sent(&self, kind: PduKind) {
        self.sent[kind.index()].fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_received(&self, kind: PduKind) {
        self.received[kind.index()].fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_unsupported(&self, pdu_type: u8) {
        self.unsupported[usize::from(pdu_type)].fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_malformed(&self) {
        self.malformed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_send_failure(&self) {
        self.send_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_sink_failure(&self) {
        self.sink_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_tick(&self) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy. Fields are read one by one, so a snapshot taken
    /// mid-tick may be slightly inconsistent across fields.
    pub fn snapshot(&self) -> StatsSnapshot {
        let per_kind = |slots: &[AtomicU64; PduKind::COUNT]| -> Vec<(PduKind, u64)> {
            PduKind::ALL
                .iter()
                .map(|kind| (*kind, slots[kind.index()].load(Ordering::Relaxed)))
                .collect()
        };

        StatsSnapshot {
            ticks: self.ticks.load(Ordering::Relaxed),
            sent: per_kind(&self.sent),
            received: per_kind(&self.received),
            unsupported: self
                .unsupported
                .iter()
                .enumerate()
                .filter_map(|(code, slot)| {
                    let count = slot.load(Ordering::Relaxed);
                    (count > 0).then_some((code as u8, count))
                })
                .collect(),
            malformed: self.malformed.load(Ordering::Relaxed),
            send_failures: self.send_failures.load(Ordering::Relaxed),
            sink_failures: self.sink_failures.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub ticks: u64,
    pub sent: Vec<(PduKind, u64)>,
    pub received: Vec<(PduKind, u64)>,
    /// Raw pduType codes seen without a decoder, with counts.
    pub unsupported: Vec<(u8, u64)>,
    pub malformed: u64,
    pub send_failures: u64,
    pub sink_failures: u64,
}

impl StatsSnapshot {
    pub fn total_sent(&self) -> u64 {
        self.sent.iter().map(|(_, n)| n).sum()
    }

    pub fn total_received(&self) -> u64 {
        self.received.iter().map(|(_, n)| n).sum()
    }

    pub fn received_of(&self, kind: PduKind) -> u64 {
        self.received
            .iter()
            .find(|(k, _)| *k == kind)
            .map_or(0, |(_, n)| *n)
    }
}
