// Use cases layer: the simulation tick, the send/receive loops and traffic counters.

pub mod factory;
pub mod listener;
pub mod runner;
pub mod scheduler;
pub mod simulation;
pub mod spawn;
pub mod stats;
#[cfg(test)]
pub(crate) mod test_support;
pub mod types;

pub use listener::{DatagramOutcome, handle_datagram, run_listener};
pub use runner::{LoopSettings, run_simulation};
pub use simulation::Simulation;
pub use stats::{PduCounters, StatsSnapshot};
pub use types::{ListenSummary, RunMode, RunSummary, SimulationSettings};
