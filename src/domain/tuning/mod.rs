// Simulation tuning, kept apart from runtime configuration (ports, rates, tick length).

pub mod events;
pub mod spawn;
