// Interface adapters: UDP transport, PostgreSQL sink and the status API.

pub mod http;
pub mod net;
pub mod persistence;
pub mod protocol;
pub mod routes;
pub mod state;
