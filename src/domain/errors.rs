// Domain-level error taxonomy for decoding, transport, clock and storage.

use crate::domain::pdu::PduHeader;
use std::time::Duration;
use thiserror::Error;

/// Decode-time failures. The offending datagram is dropped; nothing is fatal.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    /// Too few bytes for the declared type, or a corrupt length/count field.
    #[error("malformed pdu ({context}): need {needed} bytes, have {available}")]
    MalformedPdu {
        context: &'static str,
        needed: usize,
        available: usize,
    },
    /// Header decoded fine but the type has no decoder here.
    #[error("unsupported pdu type {} (exercise {}, {} bytes)", header.pdu_type, header.exercise_id, header.length)]
    UnsupportedPduType { header: PduHeader },
}

/// Send/receive error from the underlying socket. Logged; never retried.
#[derive(Debug, Error)]
#[error("transport failure: {0}")]
pub struct TransportFailure(#[from] pub std::io::Error);

/// Wall clock unusable for absolute timestamps. Fatal at startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClockFault {
    #[error("system clock reads {behind:?} before the unix epoch")]
    BeforeEpoch { behind: Duration },
}

/// Persistence sink failure; the caller logs it and moves on.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("storage failure: {0}")]
    Storage(String),
}
