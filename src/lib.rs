pub mod game;
pub mod messages;
pub(crate) mod network;
pub mod server;

pub use game::*;
pub use messages::{Event, GameOutcome, Message, MAX_MESSAGE_SIZE, PROTOCOL_VERSION};
pub use network::{handle_connection, Conn, ConnectionError, Received};
pub use server::{start_server, Dispatcher, PeerSession};
