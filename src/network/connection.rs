//! A wrapper to convert TCP connection into channel `Sender` and `Receiver`.
//!
//! ## feature:
//!
//! - Automatic disconnection handling: user may be guaranteed that
//!   on `send` error, `next` will eventually receive `None`.
//!
//! Messages travel as `[SIZE, PAYLOAD, CHECKSUM]` frames. A frame whose
//! checksum or payload decode fails is delivered as `Received::Error`,
//! and reading continues with the next frame, whose boundary is still
//! known. A size field beyond the configured limit leaves no way to
//! resynchronize, so it closes the connection.
//!
//! When remote connection closed the `write` side, `next()` will eventually
//! return `None`. However, the `Sender` may still be used to send messages
//! indefinitely.
//!
//! Any tcp write failure will result in connection close,
//! for both write and read.
//!
//! Dropping the `Conn` struct will close both sides of the connection.
use crate::network::utility;
use async_std::channel::{bounded, Receiver, Sender};
use async_std::io::BufReader;
use async_std::net::TcpStream;
use async_std::prelude::Stream;
use async_std::task;
use crc32fast::hash as checksum;
use futures::{AsyncWriteExt, StreamExt};
use std::fmt::{Debug, Formatter};
use std::io::ErrorKind;
use std::net::Shutdown;
use std::pin::Pin;
use std::task::{Context, Poll};

const NET_CHANNEL_SIZE: usize = 20;

/// Connection portal, returned by `handle_connection`.
///
/// The first type parameter is the type of messages sent,
/// the second type parameter is the type of responses received.
///
/// dropping this struct will close the connection
pub struct Conn<Msg, Rsp> {
    sender: Sender<Msg>,
    receiver: Receiver<Received<Rsp>>,
}

impl<Msg, Rsp> Conn<Msg, Rsp> {
    pub fn sender(&self) -> &Sender<Msg> {
        &self.sender
    }

    /// non-blocking poll of the inbound queue
    pub fn try_receive(&self) -> Option<Received<Rsp>> {
        self.receiver.try_recv().ok()
    }

    /// false once either pump task has shut down its channel;
    /// queued messages may still be drained afterwards
    pub fn is_connected(&self) -> bool {
        !self.sender.is_closed() && !self.receiver.is_closed()
    }
}

impl<Msg, Rsp> Stream for Conn<Msg, Rsp> {
    type Item = Received<Rsp>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_next_unpin(cx)
    }
}

/// wrapper of responses received
pub enum Received<T> {
    /// normal message received
    Response(T),
    /// socket error
    Error(ConnectionError),
}

#[derive(Clone, Debug)]
pub enum ConnectionError {
    /// Attempting to send or receive over-sized data payload
    MaxDataLengthExceeded,
    /// checksum incorrect
    DataCorrupted,
    /// `TryFrom<Vec<u8>>` returned error
    DecodeError,
}

pub fn handle_connection<Msg, Rsp>(tcp: TcpStream, max_data_size: u32) -> Conn<Msg, Rsp>
where
    Msg: Send + 'static + Into<Vec<u8>>,
    Rsp: Send + 'static + TryFrom<Vec<u8>>,
{
    let (msg_sender, msg_receiver) = bounded(NET_CHANNEL_SIZE);
    let (rsp_sender, rsp_receiver) = bounded(NET_CHANNEL_SIZE);
    send_messages(&tcp, msg_receiver, max_data_size);
    retrieve_messages::<Rsp>(&tcp, rsp_sender, max_data_size);
    Conn {
        sender: msg_sender,
        receiver: rsp_receiver,
    }
}

/// This function takes the ownership of the only instance of `Sender<Rsp>`.
///
/// Dropping the receiver of responses closes the *read* side of the
/// connection.
fn retrieve_messages<Rsp>(tcp: &TcpStream, rsp_sender: Sender<Received<Rsp>>, max_data_size: u32)
where
    Rsp: Send + 'static + TryFrom<Vec<u8>>,
{
    let tcp = tcp.clone();
    let inner = tcp.clone();
    task::spawn(async move {
        let mut reader = BufReader::new(inner);
        loop {
            match read_frame::<Rsp>(&mut reader, max_data_size).await {
                Ok(Some(rsp)) => {
                    // if receiver got dropped, allow sender to send
                    if rsp_sender.send(rsp).await.is_err() {
                        let _ = tcp.shutdown(Shutdown::Read);
                        break;
                    }
                }
                // no more message to read
                Ok(None) => {
                    // allow sender to send
                    let _ = tcp.shutdown(Shutdown::Read);
                    break;
                }
                // frame boundary lost
                Err(e) => {
                    let _ = rsp_sender.send(Received::Error(e)).await;
                    let _ = tcp.shutdown(Shutdown::Both);
                    break;
                }
            }
        }
    });
}

/// This function takes the ownership of `Receiver<Msg>`.
///
/// ## Closing Connection:
/// Drop all instances of `Sender<Msg>`, and this function will close the
/// connection after draining queued messages.
///
/// ## Error Handling:
/// An over-sized outgoing message is dropped without writing a partial
/// frame, and the connection stays open. On write error, this function
/// closes *both* sides of the connection, and drops `Receiver<Msg>`.
fn send_messages<Msg>(tcp: &TcpStream, mut msg_receiver: Receiver<Msg>, max_data_size: u32)
where
    Msg: Send + 'static + Into<Vec<u8>>,
{
    let mut tcp = tcp.clone();
    task::spawn(async move {
        while let Some(msg) = msg_receiver.next().await {
            let write_result = write_msg(&mut tcp, msg, max_data_size).await;
            if let Err(e) = write_result {
                match e.kind() {
                    ErrorKind::InvalidData => {}
                    _ => {
                        let _ = tcp.shutdown(Shutdown::Both);
                        return;
                    }
                }
            }
        }
        let _ = tcp.shutdown(Shutdown::Both);
    });
}

/// `Ok(Some)` if a frame was read. A frame failing its checksum or its
/// payload decode comes back as `Ok(Some(Received::Error))`, and the
/// next read picks up at the following frame.
/// `Ok(None)` if no more data to read.
///
/// `Err()` only for `MaxDataLengthExceeded`: with the announced size
/// untrusted there is no way to locate the next frame.
async fn read_frame<Rsp>(
    reader: &mut BufReader<TcpStream>,
    max_data_size: u32,
) -> std::result::Result<Option<Received<Rsp>>, ConnectionError>
where
    Rsp: TryFrom<Vec<u8>> + 'static,
{
    let size = match utility::read_be_u32(reader).await {
        None => return Ok(None),
        Some(s) => s,
    };
    if size > max_data_size {
        Err(ConnectionError::MaxDataLengthExceeded)?
    }
    let pay_load = match utility::read_n_bytes(reader, size).await {
        None => return Ok(None),
        Some(s) => s,
    };
    let check_sum = match utility::read_be_u32(reader).await {
        None => return Ok(None),
        Some(s) => s,
    };
    if checksum(&pay_load) != check_sum {
        return Ok(Some(Received::Error(ConnectionError::DataCorrupted)));
    }
    match Rsp::try_from(pay_load) {
        Ok(rsp) => Ok(Some(Received::Response(rsp))),
        Err(_) => Ok(Some(Received::Error(ConnectionError::DecodeError))),
    }
}

/// Attempt to write one message frame to TcpStream.
///
/// If payload too large, return `InvalidData` without writing.
async fn write_msg<Msg>(tcp: &mut TcpStream, msg: Msg, max_data_size: u32) -> std::io::Result<()>
where
    Msg: Into<Vec<u8>>,
{
    let bytes = frame_payload(&msg.into(), max_data_size)?;
    tcp.write_all(&bytes).await
}

/// Write data bytes and checksum.
///
/// structure: `[SIZE, PAYLOAD, CHECKSUM]`
#[inline]
fn frame_payload(payload: &[u8], max_data_len: u32) -> std::io::Result<Vec<u8>> {
    let size = payload.len();
    if size > max_data_len as usize {
        Err(std::io::Error::from(std::io::ErrorKind::InvalidData))?
    }
    // payload size + payload + checksum
    let mut dat = Vec::with_capacity(4 + size + 4);
    dat.extend((size as u32).to_be_bytes());
    dat.extend(payload);
    dat.extend(checksum(payload).to_be_bytes());
    Ok(dat)
}

impl<T> Debug for Received<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Received::Response(_) => f.write_str("Received::Response"),
            Received::Error(e) => write!(f, "Received::Error({:?})", e),
        }
    }
}
