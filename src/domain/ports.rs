use async_trait::async_trait;
use std::net::SocketAddr;
use std::time::SystemTime;

use crate::domain::errors::{ClockFault, SinkError, TransportFailure};
use crate::domain::geodetic::{EcefPose, GeodeticPose};
use crate::domain::pdu::Pdu;
use crate::domain::timestamp::AbsoluteTimestamp;

// Port for moving raw datagrams. One PDU per datagram, no retries.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, bytes: &[u8]) -> Result<usize, TransportFailure>;
    async fn recv(&self, buf: &mut [u8]) -> Result<(usize, SocketAddr), TransportFailure>;
}

// Port for storing decoded PDUs keyed by entity identifier and timestamp.
#[async_trait]
pub trait PduSink: Send + Sync {
    async fn record(&self, pdu: &Pdu) -> Result<(), SinkError>;
}

// Port for retrieving the current wall-clock time.
pub trait Clock: Send + Sync {
    fn now(&self) -> SystemTime;

    fn timestamp(&self) -> Result<AbsoluteTimestamp, ClockFault> {
        AbsoluteTimestamp::from_system_time(self.now())
    }
}

// Port for lat/lon/alt plus attitude to ECEF position and DIS Euler angles.
pub trait GeodeticConverter: Send + Sync {
    fn to_ecef(&self, pose: &GeodeticPose) -> EcefPose;
}
