//! Datagram delivery to the OSC server.

use std::io;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};

use tracing::{debug, trace};

use nplay_config::OscTarget;

use crate::error::TransportError;

/// Fire-and-forget datagram sink.
pub trait Transmitter {
    fn send(&mut self, datagram: &[u8]) -> Result<(), TransportError>;
}

impl<T: Transmitter + ?Sized> Transmitter for Box<T> {
    fn send(&mut self, datagram: &[u8]) -> Result<(), TransportError> {
        (**self).send(datagram)
    }
}

/// Sends each datagram with one `send_to` on an unconnected UDP socket.
#[derive(Debug)]
pub struct UdpTransmitter {
    socket: UdpSocket,
    target: SocketAddr,
}

impl UdpTransmitter {
    /// Resolves `target` once and binds an ephemeral local socket of the same family.
    pub fn connect(target: &OscTarget) -> io::Result<Self> {
        let addr = (target.host.as_str(), target.port)
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("OSC server {target} did not resolve to an address"),
                )
            })?;
        let local: SocketAddr = if addr.is_ipv4() {
            ([0, 0, 0, 0], 0).into()
        } else {
            ([0u16; 8], 0).into()
        };
        let socket = UdpSocket::bind(local)?;
        debug!(%addr, local = ?socket.local_addr().ok(), "OSC transmitter ready");
        Ok(UdpTransmitter {
            socket,
            target: addr,
        })
    }

    pub fn target(&self) -> SocketAddr {
        self.target
    }
}

impl Transmitter for UdpTransmitter {
    fn send(&mut self, datagram: &[u8]) -> Result<(), TransportError> {
        trace!(target_addr = %self.target, bytes = %hex::encode(datagram), "OSC datagram");
        self.socket
            .send_to(datagram, self.target)
            .map(|_| ())
            .map_err(|source| TransportError {
                target: self.target,
                len: datagram.len(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn delivers_to_loopback() {
        let receiver = UdpSocket::bind("127.0.0.1:0").unwrap();
        receiver
            .set_read_timeout(Some(Duration::from_secs(2)))
            .unwrap();
        let port = receiver.local_addr().unwrap().port();

        let mut tx = UdpTransmitter::connect(&OscTarget {
            host: "127.0.0.1".into(),
            port,
        })
        .unwrap();
        tx.send(b"/ping\0\0\0,\0\0\0").unwrap();

        let mut buf = [0u8; 64];
        let (n, _) = receiver.recv_from(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"/ping\0\0\0,\0\0\0");
    }

    #[test]
    fn unresolvable_host() {
        let err = UdpTransmitter::connect(&OscTarget {
            host: "nplay.invalid".into(),
            port: 9,
        });
        assert!(err.is_err());
    }
}
