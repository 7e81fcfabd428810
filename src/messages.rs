//! Wire messages exchanged between the server and its two players.
//! The same envelope travels in both directions: clients send `Move`
//! and `Resign` claims, the server sends seat assignments, confirmed
//! moves, and the final verdict.
use crate::game::{Move, Side};
use anyhow::Error;
use bincode::config::Configuration;
use bincode::{config, Decode, Encode};
use bincode::{decode_from_slice, encode_to_vec};

/// protocol revision stamped on every outgoing message
pub const PROTOCOL_VERSION: u8 = 1;

/// upper bound on one encoded message, in bytes
pub const MAX_MESSAGE_SIZE: u32 = 1024;

const BIN_CONFIG: Configuration = config::standard().with_variable_int_encoding();

#[derive(Clone, PartialEq, Debug, Encode, Decode)]
pub struct Message {
    pub version: u8,
    pub event: Event,
}

#[derive(Clone, PartialEq, Debug, Encode, Decode)]
pub enum Event {
    /// seat assignment on connect; `Unknown` turns a surplus player away
    Join(Side),
    /// the other seat has been filled
    PlayerConnected(Side),
    /// a move claim from a client, or a confirmed move from the server
    /// with the true mover
    Move(Side, Move),
    /// the sending player gives up
    Resign(Side),
    /// terminal verdict, sent to both players
    GameOutcome(GameOutcome),
}

#[derive(Clone, PartialEq, Eq, Copy, Debug, Encode, Decode)]
pub enum GameOutcome {
    Unknown,
    RedResigned,
    WhiteResigned,
    RedWins,
    WhiteWins,
    Draw,
}

impl Message {
    pub fn join(side: Side) -> Message {
        Message::with_event(Event::Join(side))
    }

    pub fn player_connected(side: Side) -> Message {
        Message::with_event(Event::PlayerConnected(side))
    }

    pub fn game_move(side: Side, mv: Move) -> Message {
        Message::with_event(Event::Move(side, mv))
    }

    pub fn resign(side: Side) -> Message {
        Message::with_event(Event::Resign(side))
    }

    pub fn outcome(outcome: GameOutcome) -> Message {
        Message::with_event(Event::GameOutcome(outcome))
    }

    fn with_event(event: Event) -> Message {
        Message {
            version: PROTOCOL_VERSION,
            event,
        }
    }
}

impl Into<Vec<u8>> for Message {
    fn into(self) -> Vec<u8> {
        encode_to_vec(self, BIN_CONFIG).unwrap()
    }
}

impl TryFrom<Vec<u8>> for Message {
    type Error = Error;

    fn try_from(value: Vec<u8>) -> std::result::Result<Self, Self::Error> {
        match decode_from_slice(&value, BIN_CONFIG) {
            Ok((msg, _)) => Ok(msg),
            Err(_) => Err(Error::msg("message decode error".to_string())),
        }
    }
}
