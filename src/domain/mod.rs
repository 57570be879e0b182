// Domain layer: DIS wire types, the entity model and simulation rules.

pub mod codec;
pub mod errors;
pub mod geodetic;
pub mod pdu;
pub mod ports;
pub mod state;
pub mod systems;
pub mod timestamp;
pub mod tuning;

pub use errors::{ClockFault, DecodeError, SinkError, TransportFailure};
pub use pdu::{Pdu, PduBody, PduHeader, PduKind};
pub use state::{EntityIdentifier, EntityState, EntityType, Marking, Vec3};
pub use timestamp::AbsoluteTimestamp;
