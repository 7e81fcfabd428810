use crate::messages::{Message, MAX_MESSAGE_SIZE};
use crate::network::{handle_connection, Conn, Received};
use async_std::channel::TrySendError;
use async_std::net::TcpStream;
use log::{info, warn};
use std::net::SocketAddr;

/// One seated player: framed message channels plus the peer address
/// for logging.
///
/// dropping this struct closes the underlying connection
pub struct PeerSession {
    conn: Conn<Message, Message>,
    peer_addr: SocketAddr,
}

impl PeerSession {
    pub fn new(tcp: TcpStream, peer_addr: SocketAddr) -> Self {
        PeerSession {
            conn: handle_connection(tcp, MAX_MESSAGE_SIZE),
            peer_addr,
        }
    }

    /// Queue a message without blocking, returning whether it was
    /// accepted. A slow peer whose queue has filled loses the message.
    pub fn try_send(&self, msg: Message) -> bool {
        match self.conn.sender().try_send(msg) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                warn!("outbound queue full for peer {}", self.peer_addr);
                false
            }
            Err(TrySendError::Closed(_)) => false,
        }
    }

    /// Non-blocking poll for the next decoded message. Frame errors
    /// are logged and skipped.
    pub fn try_receive(&self) -> Option<Message> {
        loop {
            match self.conn.try_receive()? {
                Received::Response(msg) => return Some(msg),
                Received::Error(e) => {
                    warn!("connection error ({:?}) of peer {}", e, self.peer_addr);
                }
            }
        }
    }

    pub fn is_connected(&self) -> bool {
        self.conn.is_connected()
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }
}

impl Drop for PeerSession {
    fn drop(&mut self) {
        info!("session with peer {} closed", self.peer_addr);
    }
}
