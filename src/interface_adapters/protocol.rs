// JSON DTOs for the status API.

use crate::use_cases::{RunMode, StatsSnapshot};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Counter snapshot keyed by PDU kind name. Unknown types are keyed by their
/// raw pduType code.
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub mode: &'static str,
    pub ticks: u64,
    pub sent: BTreeMap<&'static str, u64>,
    pub received: BTreeMap<&'static str, u64>,
    pub unsupported: BTreeMap<String, u64>,
    pub malformed: u64,
    pub send_failures: u64,
    pub sink_failures: u64,
}

impl StatsResponse {
    pub fn from_snapshot(mode: RunMode, snapshot: StatsSnapshot) -> Self {
        Self {
            mode: mode.as_str(),
            ticks: snapshot.ticks,
            sent: snapshot
                .sent
                .iter()
                .map(|(kind, n)| (kind.name(), *n))
                .collect(),
            received: snapshot
                .received
                .iter()
                .map(|(kind, n)| (kind.name(), *n))
                .collect(),
            unsupported: snapshot
                .unsupported
                .iter()
                .map(|(code, n)| (code.to_string(), *n))
                .collect(),
            malformed: snapshot.malformed,
            send_failures: snapshot.send_failures,
            sink_failures: snapshot.sink_failures,
        }
    }
}
