use crate::game::Side;
use crate::game::Side::{Red, White};
use crate::messages::Message;
use crate::server::session::PeerSession;
use log::info;

/// Seat bookkeeping for the two players.
///
/// A seat holds at most one session for its side; a session refused a
/// seat is handed back to the caller. Disconnected sessions stay seated
/// until `reap_disconnected` sweeps them out.
pub struct Dispatcher {
    // seats mark whether a player is in the match
    seats: (Option<PeerSession>, Option<PeerSession>),
}

impl Dispatcher {
    pub fn new() -> Self {
        Dispatcher {
            seats: (None, None),
        }
    }

    /// Seat a session on the given side. The session is returned if the
    /// seat is taken or the side is not a player side.
    pub fn assign(&mut self, side: Side, session: PeerSession) -> Result<(), PeerSession> {
        match self.seat_mut(side) {
            Some(seat) if seat.is_none() => {
                info!("{:?} seat taken by peer {}", side, session.peer_addr());
                seat.replace(session);
                Ok(())
            }
            _ => Err(session),
        }
    }

    /// sweep out sessions whose connection has died, freeing their seats
    pub fn reap_disconnected(&mut self) {
        for side in [Red, White] {
            let seat = match self.seat_mut(side) {
                Some(seat) => seat,
                None => continue,
            };
            let dead = seat.as_ref().map_or(false, |s| !s.is_connected());
            if dead {
                if let Some(session) = seat.take() {
                    info!("reaping disconnected {:?} peer {}", side, session.peer_addr());
                }
            }
        }
    }

    /// queue a message for one seat, false if the seat is empty or the
    /// session refused it
    pub fn send_to(&self, side: Side, msg: Message) -> bool {
        self.session(side)
            .map_or(false, |session| session.try_send(msg))
    }

    /// queue a message for both seated players
    pub fn broadcast(&self, msg: Message) {
        self.send_to(Red, msg.clone());
        self.send_to(White, msg);
    }

    pub fn try_receive(&self, side: Side) -> Option<Message> {
        self.session(side)?.try_receive()
    }

    pub fn is_connected(&self, side: Side) -> bool {
        self.session(side).map_or(false, |s| s.is_connected())
    }

    pub fn session_full(&self) -> bool {
        matches!(self.seats, (Some(_), Some(_)))
    }

    fn session(&self, side: Side) -> Option<&PeerSession> {
        match side {
            Red => self.seats.0.as_ref(),
            White => self.seats.1.as_ref(),
            _ => None,
        }
    }

    fn seat_mut(&mut self, side: Side) -> Option<&mut Option<PeerSession>> {
        match side {
            Red => Some(&mut self.seats.0),
            White => Some(&mut self.seats.1),
            _ => None,
        }
    }
}

#[cfg(test)]
mod test_dispatcher {
    use super::*;
    use crate::game::Side::Unknown;
    use crate::messages::MAX_MESSAGE_SIZE;
    use crate::network::{handle_connection, Conn};
    use async_std::net::{TcpListener, TcpStream};
    use async_std::task;
    use futures::executor::block_on;
    use futures::StreamExt;
    use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
    use std::time::Duration;

    fn test_address(port: u16) -> SocketAddr {
        SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::new(127, 0, 0, 1), port))
    }

    fn accept_two(port: u16) -> task::JoinHandle<(PeerSession, PeerSession)> {
        task::spawn(async move {
            let listener = TcpListener::bind(test_address(port)).await.unwrap();
            let (tcp1, addr1) = listener.accept().await.unwrap();
            let (tcp2, addr2) = listener.accept().await.unwrap();
            (PeerSession::new(tcp1, addr1), PeerSession::new(tcp2, addr2))
        })
    }

    #[test]
    fn test_seat_fills_once() {
        let sessions_future = accept_two(3673);

        block_on(async move {
            task::sleep(Duration::from_millis(100)).await;
            let tcp1 = TcpStream::connect(test_address(3673)).await.unwrap();
            let client1: Conn<Message, Message> = handle_connection(tcp1, MAX_MESSAGE_SIZE);
            let tcp2 = TcpStream::connect(test_address(3673)).await.unwrap();
            let mut client2: Conn<Message, Message> = handle_connection(tcp2, MAX_MESSAGE_SIZE);
            let (s1, s2) = sessions_future.await;

            let mut seats = Dispatcher::new();
            assert!(seats.assign(Red, s1).is_ok());
            assert!(!seats.session_full());
            // the occupied seat refuses the newcomer
            let refused = seats.assign(Red, s2);
            assert!(refused.is_err());
            // non-player sides never seat anyone
            let s2 = refused.unwrap_err();
            let refused = seats.assign(Unknown, s2);
            assert!(refused.is_err());
            drop(refused);

            // the refused session closes its connection when dropped
            assert!(client2.next().await.is_none());
            assert!(client1.is_connected());
            assert!(seats.is_connected(Red));
            assert!(!seats.is_connected(White));
            // targeted sends reach only occupied seats
            assert!(seats.send_to(Red, Message::join(Red)));
            assert!(!seats.send_to(White, Message::join(White)));
        });
    }

    #[test]
    fn test_reap_frees_seat() {
        let sessions_future = accept_two(3674);

        block_on(async move {
            task::sleep(Duration::from_millis(100)).await;
            let tcp1 = TcpStream::connect(test_address(3674)).await.unwrap();
            let client1: Conn<Message, Message> = handle_connection(tcp1, MAX_MESSAGE_SIZE);
            let tcp2 = TcpStream::connect(test_address(3674)).await.unwrap();
            let client2: Conn<Message, Message> = handle_connection(tcp2, MAX_MESSAGE_SIZE);
            let (s1, s2) = sessions_future.await;

            let mut seats = Dispatcher::new();
            assert!(seats.assign(Red, s1).is_ok());
            drop(client1);
            task::sleep(Duration::from_millis(200)).await;
            assert!(!seats.is_connected(Red));

            seats.reap_disconnected();
            // the freed seat accepts a new session
            assert!(seats.assign(Red, s2).is_ok());
            assert!(seats.is_connected(Red));
            drop(client2);
        });
    }
}
