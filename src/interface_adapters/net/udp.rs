use async_trait::async_trait;
use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use tokio::net::UdpSocket;
use tracing::debug;

use crate::domain::TransportFailure;
use crate::domain::ports::Transport;

/// Tokio UDP socket behind the `Transport` port. A sender carries a fixed
/// destination; a listener has none and only receives.
#[derive(Debug)]
pub struct UdpTransport {
    socket: UdpSocket,
    destination: Option<SocketAddr>,
}

impl UdpTransport {
    /// Binds an ephemeral local port for sending to `destination`.
    /// Broadcast destinations get `SO_BROADCAST`.
    pub async fn bind_sender(destination: SocketAddr) -> io::Result<Self> {
        let local = match destination {
            SocketAddr::V4(_) => SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0),
            SocketAddr::V6(_) => SocketAddr::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), 0),
        };
        let socket = UdpSocket::bind(local).await?;
        if is_broadcast(destination.ip()) {
            socket.set_broadcast(true)?;
            debug!(%destination, "broadcast enabled");
        }
        Ok(Self {
            socket,
            destination: Some(destination),
        })
    }

    pub async fn bind_listener(address: SocketAddr) -> io::Result<Self> {
        let socket = UdpSocket::bind(address).await?;
        Ok(Self {
            socket,
            destination: None,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    pub fn destination(&self) -> Option<SocketAddr> {
        self.destination
    }
}

// Limited broadcast, or a directed broadcast guessed from the last octet.
fn is_broadcast(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => v4.is_broadcast() || v4.octets()[3] == 255,
        IpAddr::V6(_) => false,
    }
}

#[async_trait]
impl Transport for UdpTransport {
    async fn send(&self, bytes: &[u8]) -> Result<usize, TransportFailure> {
        let Some(destination) = self.destination else {
            return Err(TransportFailure(io::Error::new(
                io::ErrorKind::NotConnected,
                "transport has no destination",
            )));
        };
        Ok(self.socket.send_to(bytes, destination).await?)
    }

    async fn recv(&self, buf: &mut [u8]) -> Result<(usize, SocketAddr), TransportFailure> {
        Ok(self.socket.recv_from(buf).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broadcast_detection_covers_limited_and_directed_addresses() {
        assert!(is_broadcast(IpAddr::V4(Ipv4Addr::BROADCAST)));
        assert!(is_broadcast(IpAddr::V4(Ipv4Addr::new(192, 168, 1, 255))));
        assert!(!is_broadcast(IpAddr::V4(Ipv4Addr::LOCALHOST)));
        assert!(!is_broadcast(IpAddr::V6(Ipv6Addr::LOCALHOST)));
    }

    #[tokio::test]
    async fn when_sender_targets_listener_then_datagram_arrives_intact() {
        let listener = UdpTransport::bind_listener(SocketAddr::from(([127, 0, 0, 1], 0)))
            .await
            .expect("listener binds");
        let target = listener.local_addr().expect("listener address");
        let sender = UdpTransport::bind_sender(target).await.expect("sender binds");

        let sent = sender.send(&[7, 1, 1, 1]).await.expect("send succeeds");
        let mut buf = [0u8; 16];
        let (n, _) = listener.recv(&mut buf).await.expect("recv succeeds");

        assert_eq!(sent, 4);
        assert_eq!(&buf[..n], &[7, 1, 1, 1]);
    }

    #[tokio::test]
    async fn when_listener_sends_then_not_connected_is_reported() {
        let listener = UdpTransport::bind_listener(SocketAddr::from(([127, 0, 0, 1], 0)))
            .await
            .expect("listener binds");

        let err = listener.send(&[1]).await.expect_err("no destination");

        assert_eq!(err.0.kind(), io::ErrorKind::NotConnected);
    }
}
