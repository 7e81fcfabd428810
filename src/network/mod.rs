//! Network Infrastructure
//!
//! This module turns a raw TCP stream into framed,
//! checksummed message channels.
pub(crate) mod connection;
pub(crate) mod utility;
pub use connection::{handle_connection, Conn, ConnectionError, Received};
