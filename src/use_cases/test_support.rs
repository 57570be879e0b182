use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;

use crate::domain::ports::{Clock, PduSink, Transport};
use crate::domain::{Pdu, SinkError, TransportFailure};

// Shared fixed time source for deterministic use-case tests.
pub(crate) struct FixedClock(pub(crate) SystemTime);

impl FixedClock {
    pub(crate) fn at_epoch_seconds(seconds: u64) -> Self {
        Self(UNIX_EPOCH + Duration::from_secs(seconds))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> SystemTime {
        self.0
    }
}

// In-memory transport: records sends and replays queued inbound datagrams.
// `recv` parks forever once the queue is drained.
#[derive(Clone, Default)]
pub(crate) struct RecordingTransport {
    sent: Arc<Mutex<Vec<Vec<u8>>>>,
    inbound: Arc<Mutex<VecDeque<Vec<u8>>>>,
    fail_sends: bool,
}

impl RecordingTransport {
    pub(crate) fn failing() -> Self {
        Self {
            fail_sends: true,
            ..Self::default()
        }
    }

    pub(crate) fn with_inbound(datagrams: Vec<Vec<u8>>) -> Self {
        Self {
            inbound: Arc::new(Mutex::new(datagrams.into())),
            ..Self::default()
        }
    }

    pub(crate) fn sent(&self) -> Vec<Vec<u8>> {
        self.sent.lock().expect("sent mutex poisoned").clone()
    }

    pub(crate) fn pending_inbound(&self) -> usize {
        self.inbound.lock().expect("inbound mutex poisoned").len()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, bytes: &[u8]) -> Result<usize, TransportFailure> {
        if self.fail_sends {
            return Err(TransportFailure(std::io::Error::other("send failed")));
        }
        self.sent
            .lock()
            .expect("sent mutex poisoned")
            .push(bytes.to_vec());
        Ok(bytes.len())
    }

    async fn recv(&self, buf: &mut [u8]) -> Result<(usize, SocketAddr), TransportFailure> {
        let next = self
            .inbound
            .lock()
            .expect("inbound mutex poisoned")
            .pop_front();
        let Some(datagram) = next else {
            return std::future::pending().await;
        };

        let n = datagram.len().min(buf.len());
        buf[..n].copy_from_slice(&datagram[..n]);
        Ok((n, SocketAddr::from(([127, 0, 0, 1], 3000))))
    }
}

// Sink that keeps every PDU it is handed, or rejects them all.
#[derive(Clone, Default)]
pub(crate) struct RecordingSink {
    records: Arc<Mutex<Vec<Pdu>>>,
    fail: bool,
}

impl RecordingSink {
    pub(crate) fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub(crate) fn records(&self) -> Vec<Pdu> {
        self.records.lock().expect("records mutex poisoned").clone()
    }
}

#[async_trait]
impl PduSink for RecordingSink {
    async fn record(&self, pdu: &Pdu) -> Result<(), SinkError> {
        if self.fail {
            return Err(SinkError::Storage("insert failed".to_string()));
        }
        self.records
            .lock()
            .expect("records mutex poisoned")
            .push(pdu.clone());
        Ok(())
    }
}
