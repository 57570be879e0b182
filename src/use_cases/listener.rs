//! Passive receive loop.
//!
//! Every datagram is decoded on its own. Decoded PDUs are counted and handed
//! to the optional sink; malformed and unsupported traffic is counted and
//! dropped. Nothing a peer sends can stop the loop; only `shutdown` does.

use super::stats::PduCounters;
use super::types::ListenSummary;
use crate::domain::codec;
use crate::domain::ports::{PduSink, Transport};
use crate::domain::timestamp;
use crate::domain::{DecodeError, PduKind};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Notify;
use tracing::{Instrument, debug, info, info_span, warn};

/// Large enough for any PDU this crate decodes, well under the UDP limit.
pub const RECV_BUFFER_LEN: usize = 8192;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatagramOutcome {
    Decoded { kind: PduKind, sink_failed: bool },
    Malformed,
    Unsupported(u8),
}

/// Decodes one datagram, updates counters and forwards to the sink.
/// A sink failure is logged and counted; the PDU still counts as decoded.
pub async fn handle_datagram(
    bytes: &[u8],
    from: SocketAddr,
    counters: &PduCounters,
    sink: Option<&dyn PduSink>,
) -> DatagramOutcome {
    match codec::decode(bytes) {
        Ok(pdu) => {
            let kind = pdu.kind();
            counters.record_received(kind);
            if !timestamp::is_absolute(pdu.header.timestamp) {
                debug!(%from, pdu = kind.name(), raw = pdu.header.timestamp, "relative timestamp");
            }
            debug!(
                %from,
                pdu = kind.name(),
                exercise = pdu.header.exercise_id,
                length = pdu.header.length,
                "pdu received"
            );

            let mut sink_failed = false;
            if let Some(sink) = sink {
                if let Err(e) = sink.record(&pdu).await {
                    warn!(error = %e, pdu = kind.name(), "failed to record pdu");
                    counters.record_sink_failure();
                    sink_failed = true;
                }
            }
            DatagramOutcome::Decoded { kind, sink_failed }
        }
        Err(DecodeError::UnsupportedPduType { header }) => {
            counters.record_unsupported(header.pdu_type);
            debug!(
                %from,
                pdu_type = header.pdu_type,
                family = header.protocol_family,
                version = header.protocol_version,
                length = header.length,
                "unsupported pdu type"
            );
            DatagramOutcome::Unsupported(header.pdu_type)
        }
        Err(e @ DecodeError::MalformedPdu { .. }) => {
            counters.record_malformed();
            warn!(%from, error = %e, bytes = bytes.len(), "malformed datagram");
            DatagramOutcome::Malformed
        }
    }
}

/// Receives until `shutdown` fires. Receive errors are logged and skipped.
pub async fn run_listener(
    transport: &dyn Transport,
    counters: &PduCounters,
    sink: Option<&dyn PduSink>,
    shutdown: Arc<Notify>,
) -> ListenSummary {
    let span = info_span!("listen", sink = sink.is_some());
    async move {
        let mut summary = ListenSummary::default();
        let mut buf = vec![0u8; RECV_BUFFER_LEN];
        info!("listener started");

        loop {
            let received = tokio::select! {
                biased;
                _ = shutdown.notified() => {
                    info!("shutdown requested");
                    break;
                }
                received = transport.recv(&mut buf) => received,
            };

            let (n, from) = match received {
                Ok(r) => r,
                Err(e) => {
                    warn!(error = %e, "receive failed");
                    continue;
                }
            };

            summary.datagrams += 1;
            match handle_datagram(&buf[..n], from, counters, sink).await {
                DatagramOutcome::Decoded { sink_failed, .. } => {
                    summary.decoded += 1;
                    summary.sink_failures += u64::from(sink_failed);
                }
                DatagramOutcome::Malformed => summary.malformed += 1,
                DatagramOutcome::Unsupported(_) => summary.unsupported += 1,
            }
        }

        info!(
            datagrams = summary.datagrams,
            decoded = summary.decoded,
            malformed = summary.malformed,
            unsupported = summary.unsupported,
            sink_failures = summary.sink_failures,
            "listener stopped"
        );
        summary
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pdu::{CollisionPdu, EventIdentifier, Vector3Float};
    use crate::domain::state::EntityIdentifier;
    use crate::domain::{AbsoluteTimestamp, Pdu, PduBody};
    use crate::use_cases::test_support::{RecordingSink, RecordingTransport};
    use std::time::Duration;

    fn from() -> SocketAddr {
        SocketAddr::from(([127, 0, 0, 1], 40000))
    }

    fn collision_bytes(timestamp: AbsoluteTimestamp) -> Vec<u8> {
        codec::encode(&Pdu::new(
            7,
            1,
            timestamp,
            PduBody::Collision(CollisionPdu {
                issuing_id: EntityIdentifier::new(18, 23, 88),
                colliding_id: EntityIdentifier::new(19, 24, 200),
                event_id: EventIdentifier::default(),
                collision_type: 0,
                velocity: Vector3Float::ZERO,
                mass: 0.0,
                location: Vector3Float::ZERO,
            }),
        ))
    }

    fn unsupported_bytes() -> Vec<u8> {
        let mut bytes = vec![7, 1, 255, 0];
        bytes.extend_from_slice(&0x8000_0001u32.to_be_bytes());
        bytes.extend_from_slice(&12u16.to_be_bytes());
        bytes.extend_from_slice(&[0, 0]);
        bytes
    }

    #[tokio::test]
    async fn when_datagram_decodes_then_it_is_counted_and_recorded() {
        let counters = PduCounters::default();
        let sink = RecordingSink::default();
        let bytes = collision_bytes(AbsoluteTimestamp::from_epoch_seconds(1_700_000_000));

        let outcome = handle_datagram(&bytes, from(), &counters, Some(&sink)).await;

        assert_eq!(
            outcome,
            DatagramOutcome::Decoded {
                kind: PduKind::Collision,
                sink_failed: false
            }
        );
        assert_eq!(counters.snapshot().received_of(PduKind::Collision), 1);
        assert_eq!(sink.records().len(), 1);
    }

    #[tokio::test]
    async fn when_datagram_is_truncated_then_it_is_counted_malformed() {
        let counters = PduCounters::default();
        let bytes = collision_bytes(AbsoluteTimestamp::from_epoch_seconds(1));

        let outcome = handle_datagram(&bytes[..20], from(), &counters, None).await;

        assert_eq!(outcome, DatagramOutcome::Malformed);
        assert_eq!(counters.snapshot().malformed, 1);
        assert_eq!(counters.snapshot().total_received(), 0);
    }

    #[tokio::test]
    async fn when_type_is_unknown_then_raw_type_is_counted() {
        let counters = PduCounters::default();

        let outcome = handle_datagram(&unsupported_bytes(), from(), &counters, None).await;

        assert_eq!(outcome, DatagramOutcome::Unsupported(255));
        assert_eq!(counters.snapshot().unsupported, vec![(255, 1)]);
    }

    #[tokio::test]
    async fn when_sink_fails_then_pdu_still_counts_as_decoded() {
        let counters = PduCounters::default();
        let sink = RecordingSink::failing();
        let bytes = collision_bytes(AbsoluteTimestamp::from_epoch_seconds(1_700_000_000));

        let outcome = handle_datagram(&bytes, from(), &counters, Some(&sink)).await;

        assert_eq!(
            outcome,
            DatagramOutcome::Decoded {
                kind: PduKind::Collision,
                sink_failed: true
            }
        );
        assert_eq!(counters.snapshot().sink_failures, 1);
    }

    #[tokio::test]
    async fn when_timestamp_is_relative_then_pdu_is_still_accepted() {
        let counters = PduCounters::default();
        let mut bytes = collision_bytes(AbsoluteTimestamp::from_epoch_seconds(5));
        bytes[4] &= 0x7F;

        let outcome = handle_datagram(&bytes, from(), &counters, None).await;

        assert!(matches!(outcome, DatagramOutcome::Decoded { .. }));
    }

    #[tokio::test]
    async fn listener_drains_mixed_traffic_until_shutdown() {
        let good = collision_bytes(AbsoluteTimestamp::from_epoch_seconds(1_700_000_000));
        let transport = RecordingTransport::with_inbound(vec![
            good.clone(),
            vec![0xFF; 5],
            unsupported_bytes(),
            good,
        ]);
        let counters = PduCounters::default();
        let sink = RecordingSink::default();
        let shutdown = Arc::new(Notify::new());

        let stopper = {
            let shutdown = shutdown.clone();
            let transport = transport.clone();
            tokio::spawn(async move {
                while transport.pending_inbound() > 0 {
                    tokio::time::sleep(Duration::from_millis(5)).await;
                }
                tokio::time::sleep(Duration::from_millis(20)).await;
                shutdown.notify_one();
            })
        };

        let summary = run_listener(&transport, &counters, Some(&sink), shutdown).await;
        stopper.await.expect("stopper task");

        assert_eq!(
            summary,
            ListenSummary {
                datagrams: 4,
                decoded: 2,
                malformed: 1,
                unsupported: 1,
                sink_failures: 0,
            }
        );
        assert_eq!(sink.records().len(), 2);
    }
}
