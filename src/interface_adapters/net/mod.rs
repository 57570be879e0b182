// Network adapters: UDP datagram transport for DIS traffic.

pub mod udp;

pub use udp::UdpTransport;
