use std::net::SocketAddr;
use std::{env, time::Duration};
use tracing::warn;

use crate::use_cases::{RunMode, SimulationSettings};

// Runtime settings read from the environment (not event tuning).

pub fn mode() -> RunMode {
    match env::var("DIS_MODE").as_deref() {
        Ok("listen") => RunMode::Listen,
        Ok("simulate") | Err(_) => RunMode::Simulate,
        Ok(other) => {
            warn!(value = other, "unknown DIS_MODE; using simulate");
            RunMode::Simulate
        }
    }
}

pub fn destination() -> SocketAddr {
    parse_or("DIS_DESTINATION", SocketAddr::from(([127, 0, 0, 1], 3000)))
}

pub fn listen_port() -> u16 {
    parse_or("DIS_LISTEN_PORT", 3000)
}

pub fn status_port() -> u16 {
    parse_or("DIS_STATUS_PORT", 3001)
}

pub fn protocol_version() -> u8 {
    match parse_or("DIS_PROTOCOL_VERSION", 7u8) {
        v @ (6 | 7) => v,
        other => {
            warn!(value = other, "unsupported DIS_PROTOCOL_VERSION; using 7");
            7
        }
    }
}

pub fn exercise_id() -> u8 {
    parse_or("DIS_EXERCISE_ID", 1)
}

pub fn site_id() -> u16 {
    parse_or("DIS_SITE_ID", 18)
}

pub fn application_id() -> u16 {
    parse_or("DIS_APPLICATION_ID", 23)
}

pub fn entity_count() -> usize {
    parse_or("DIS_ENTITY_COUNT", 5)
}

// EntityState sends per entity per second.
pub fn target_rate() -> f64 {
    let rate = parse_or("DIS_TARGET_RATE", 1.0f64);
    if rate.is_finite() && rate > 0.0 {
        rate
    } else {
        warn!(value = rate, "DIS_TARGET_RATE must be positive; using 1.0");
        1.0
    }
}

pub fn tick_interval() -> Duration {
    let millis = parse_or("DIS_TICK_MS", 50u64).max(1);
    Duration::from_millis(millis)
}

// Zero means run until Ctrl-C.
pub fn run_duration() -> Option<Duration> {
    match parse_or("DIS_DURATION_SECS", 0u64) {
        0 => None,
        secs => Some(Duration::from_secs(secs)),
    }
}

pub fn rng_seed() -> Option<u64> {
    optional("DIS_RNG_SEED")
}

pub fn database_url() -> Option<String> {
    env::var("DATABASE_URL").ok().filter(|v| !v.trim().is_empty())
}

pub fn simulation_settings() -> SimulationSettings {
    SimulationSettings {
        protocol_version: protocol_version(),
        exercise_id: exercise_id(),
        site_id: site_id(),
        application_id: application_id(),
        entity_count: entity_count(),
        target_rate: target_rate(),
        tick_interval: tick_interval(),
        duration: run_duration(),
        rng_seed: rng_seed(),
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    optional(key).unwrap_or(default)
}

// Unset is silent; an unparsable value is logged and ignored.
fn optional<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = env::var(key).ok()?;
    raw.trim().parse().ok().or_else(|| {
        warn!(key, value = %raw, "invalid value; using default");
        None
    })
}
