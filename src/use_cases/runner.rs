// Async send loop: ticks the simulation and pushes each PDU out as one datagram.

use super::simulation::Simulation;
use super::stats::PduCounters;
use super::types::RunSummary;
use crate::domain::ClockFault;
use crate::domain::codec;
use crate::domain::ports::{Clock, Transport};
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{Instrument, debug, info, info_span, warn};

/// Loop pacing. `duration` of `None` runs until `shutdown` is notified.
#[derive(Debug, Clone, Copy)]
pub struct LoopSettings {
    pub tick_interval: Duration,
    pub duration: Option<Duration>,
}

/// Runs until the duration elapses or `shutdown` fires. Send failures are
/// logged and counted, never retried. Only a clock fault ends the run early.
pub async fn run_simulation<R: Rng + Send>(
    sim: &mut Simulation<R>,
    transport: &dyn Transport,
    clock: &dyn Clock,
    counters: &PduCounters,
    settings: LoopSettings,
    shutdown: Arc<Notify>,
) -> Result<RunSummary, ClockFault> {
    let span = info_span!("run", entities = sim.roster().len());
    async move {
        let mut summary = RunSummary::default();
        let started = Instant::now();
        let mut last_tick = started;

        let mut interval = tokio::time::interval(settings.tick_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            tick_ms = settings.tick_interval.as_millis() as u64,
            duration_secs = settings.duration.map(|d| d.as_secs_f64()),
            "simulation started"
        );

        loop {
            tokio::select! {
                biased;
                _ = shutdown.notified() => {
                    info!("shutdown requested");
                    break;
                }
                _ = interval.tick() => {}
            }

            let now = Instant::now();
            if let Some(limit) = settings.duration {
                if now.duration_since(started) >= limit {
                    debug!("run duration elapsed");
                    break;
                }
            }
            let dt = now.duration_since(last_tick).as_secs_f64();
            last_tick = now;

            let timestamp = clock.timestamp().inspect_err(|e| {
                tracing::error!(error = %e, "clock fault; stopping simulation");
            })?;

            let pdus = sim.tick(dt, timestamp);
            summary.ticks += 1;
            counters.record_tick();

            for pdu in pdus {
                let kind = pdu.kind();
                let bytes = codec::encode(&pdu);
                match transport.send(&bytes).await {
                    Ok(_) => {
                        summary.pdus_sent += 1;
                        summary.sent_by_kind[kind.index()] += 1;
                        counters.record_sent(kind);
                    }
                    Err(e) => {
                        warn!(error = %e, pdu = kind.name(), "send failed");
                        summary.send_failures += 1;
                        counters.record_send_failure();
                    }
                }
            }
        }

        summary.elapsed = started.elapsed();
        info!(
            ticks = summary.ticks,
            pdus_sent = summary.pdus_sent,
            send_failures = summary.send_failures,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "simulation stopped"
        );
        Ok(summary)
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::geodetic::Wgs84;
    use crate::domain::tuning::events::EventTuning;
    use crate::domain::tuning::spawn::SpawnTuning;
    use crate::domain::PduKind;
    use crate::use_cases::test_support::{FixedClock, RecordingTransport};
    use crate::use_cases::types::SimulationSettings;
    use std::time::UNIX_EPOCH;

    fn simulation(entity_count: usize) -> Simulation<rand::rngs::StdRng> {
        Simulation::from_settings(
            &SimulationSettings {
                protocol_version: 7,
                exercise_id: 1,
                site_id: 18,
                application_id: 23,
                entity_count,
                target_rate: 10.0,
                tick_interval: Duration::from_millis(10),
                duration: None,
                rng_seed: Some(11),
            },
            &SpawnTuning::default(),
            EventTuning::default(),
            &Wgs84,
        )
    }

    fn loop_for(duration: Duration) -> LoopSettings {
        LoopSettings {
            tick_interval: Duration::from_millis(10),
            duration: Some(duration),
        }
    }

    #[tokio::test]
    async fn when_duration_elapses_then_loop_stops_and_reports_sends() {
        let mut sim = simulation(3);
        let transport = RecordingTransport::default();
        let counters = PduCounters::default();

        let summary = run_simulation(
            &mut sim,
            &transport,
            &FixedClock::at_epoch_seconds(1_700_000_000),
            &counters,
            loop_for(Duration::from_millis(200)),
            Arc::new(Notify::new()),
        )
        .await
        .expect("clock is valid");

        assert!(summary.ticks > 0);
        assert!(summary.sent(PduKind::EntityState) >= 3);
        assert_eq!(summary.pdus_sent as usize, transport.sent().len());
        assert_eq!(counters.snapshot().total_sent(), summary.pdus_sent);
        assert_eq!(summary.send_failures, 0);
    }

    #[tokio::test]
    async fn when_shutdown_is_notified_then_loop_stops_early() {
        let mut sim = simulation(2);
        let transport = RecordingTransport::default();
        let shutdown = Arc::new(Notify::new());
        shutdown.notify_one();

        let summary = run_simulation(
            &mut sim,
            &transport,
            &FixedClock::at_epoch_seconds(1_700_000_000),
            &PduCounters::default(),
            LoopSettings {
                tick_interval: Duration::from_millis(10),
                duration: None,
            },
            shutdown,
        )
        .await
        .expect("clock is valid");

        assert_eq!(summary.ticks, 0);
        assert!(transport.sent().is_empty());
    }

    #[tokio::test]
    async fn when_send_fails_then_failure_is_counted_and_loop_continues() {
        let mut sim = simulation(2);
        let transport = RecordingTransport::failing();
        let counters = PduCounters::default();

        let summary = run_simulation(
            &mut sim,
            &transport,
            &FixedClock::at_epoch_seconds(1_700_000_000),
            &counters,
            loop_for(Duration::from_millis(100)),
            Arc::new(Notify::new()),
        )
        .await
        .expect("clock is valid");

        assert_eq!(summary.pdus_sent, 0);
        assert!(summary.send_failures >= 2);
        assert!(summary.ticks > 1);
        assert_eq!(counters.snapshot().send_failures, summary.send_failures);
    }

    #[tokio::test]
    async fn when_clock_is_before_epoch_then_run_fails_with_clock_fault() {
        let mut sim = simulation(1);
        let clock = FixedClock(UNIX_EPOCH - Duration::from_secs(5));

        let result = run_simulation(
            &mut sim,
            &RecordingTransport::default(),
            &clock,
            &PduCounters::default(),
            loop_for(Duration::from_secs(1)),
            Arc::new(Notify::new()),
        )
        .await;

        assert!(matches!(result, Err(ClockFault::BeforeEpoch { .. })));
    }

    #[tokio::test]
    async fn every_datagram_decodes_with_the_clock_timestamp() {
        let mut sim = simulation(2);
        let transport = RecordingTransport::default();

        run_simulation(
            &mut sim,
            &transport,
            &FixedClock::at_epoch_seconds(1_700_000_000),
            &PduCounters::default(),
            loop_for(Duration::from_millis(100)),
            Arc::new(Notify::new()),
        )
        .await
        .expect("clock is valid");

        for datagram in transport.sent() {
            let pdu = codec::decode(&datagram).expect("sent bytes decode");
            assert_eq!(pdu.header.timestamp, 1_700_000_000 | 0x8000_0000);
        }
    }
}
