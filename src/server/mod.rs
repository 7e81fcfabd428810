mod dispatcher;
mod game_loop;
mod session;

use crate::game::Side::{Red, Unknown, White};
use crate::messages::Message;
use anyhow::Result;
use async_std::net::TcpListener;
use async_std::sync::Mutex;
pub use dispatcher::Dispatcher;
use game_loop::run_game_loop;
use log::info;
pub use session::PeerSession;
use std::net::SocketAddrV4;
use std::sync::Arc;

/// Run the match server: spawn the game loop, then accept connections
/// and seat them until both sides are filled. Connections beyond the
/// two seats are told `Unknown` and dropped. The listener runs until
/// the process ends; a decided match does not close the sockets.
pub async fn start_server(addrs: SocketAddrV4) -> Result<()> {
    let seats = Arc::new(Mutex::new(Dispatcher::new()));
    run_game_loop(seats.clone());
    let listener = TcpListener::bind(addrs).await?;
    info!("listening on {}", addrs);
    while let Ok((stream, socket)) = listener.accept().await {
        info!("new connection from {}", socket);
        let session = PeerSession::new(stream, socket);
        let mut seats_guard = seats.lock().await;
        seats_guard.reap_disconnected();
        seat_newcomer(&mut seats_guard, session);
    }
    Ok(())
}

/// Seat a fresh connection: Red first, then White, else turn it away
/// with an `Unknown` assignment and drop it.
fn seat_newcomer(seats: &mut Dispatcher, session: PeerSession) {
    let session = match seats.assign(Red, session) {
        Ok(()) => {
            seats.send_to(Red, Message::join(Red));
            announce_if_full(seats);
            return;
        }
        Err(session) => session,
    };
    match seats.assign(White, session) {
        Ok(()) => {
            seats.send_to(White, Message::join(White));
            announce_if_full(seats);
        }
        Err(session) => {
            info!(
                "both seats taken, turning away peer {}",
                session.peer_addr()
            );
            session.try_send(Message::join(Unknown));
        }
    }
}

/// once both seats are filled, each player learns the other is present
fn announce_if_full(seats: &Dispatcher) {
    if seats.session_full() {
        seats.send_to(Red, Message::player_connected(White));
        seats.send_to(White, Message::player_connected(Red));
    }
}
