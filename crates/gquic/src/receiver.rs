//! Datagram sources and the receiver that decodes their packets.

use std::{io, net::SocketAddr};

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::Stream;
use gquic_proto::packet::{DecodeError, PacketDecoder, QuicPacket};
use tokio::net::UdpSocket;

/// The size of the buffer into which datagrams are received.
///
/// This is the largest packet permitted by gQUIC; longer datagrams are truncated to this
/// length by the socket.
pub const MAX_DATAGRAM_SIZE: usize = 1452;

/// A transport that delivers datagrams, each containing a single packet.
#[async_trait]
pub trait DatagramSource: Send + Sync {
    /// Receives the next datagram, along with the address of its sender.
    async fn recv_datagram(&self) -> io::Result<(Bytes, SocketAddr)>;
}

#[async_trait]
impl DatagramSource for UdpSocket {
    async fn recv_datagram(&self) -> io::Result<(Bytes, SocketAddr)> {
        let mut buffer = BytesMut::zeroed(MAX_DATAGRAM_SIZE);
        let (length, sender) = self.recv_from(&mut buffer).await?;
        buffer.truncate(length);

        Ok((buffer.freeze(), sender))
    }
}

/// Error returned when attempting to receive a packet.
#[derive(Debug, thiserror::Error)]
pub enum ReceiveError {
    /// An IO error raised from the OS or from the datagram source.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// The datagram was received but its public header could not be decoded.
    #[error("failed to decode packet from {sender}")]
    Decode {
        /// The address from which the datagram was received.
        sender: SocketAddr,
        /// The reason decoding failed.
        #[source]
        error: DecodeError,
    },
}

/// Receives datagrams from a [`DatagramSource`] and decodes them into [`QuicPacket`]s.
#[derive(Debug)]
pub struct PacketReceiver<S> {
    source: S,
    decoder: PacketDecoder,
}

impl<S: DatagramSource> PacketReceiver<S> {
    /// Creates a new receiver decoding the datagrams from `source` with `decoder`.
    pub fn new(source: S, decoder: PacketDecoder) -> Self {
        Self { source, decoder }
    }

    /// The decoder applied to each received datagram.
    pub fn decoder(&self) -> &PacketDecoder {
        &self.decoder
    }

    /// A reference to the underlying datagram source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Receives and decodes a single datagram.
    ///
    /// Errors from the source and from decoding are returned as-is, no datagram is retried.
    pub async fn recv(&self) -> Result<(QuicPacket, SocketAddr), ReceiveError> {
        let (datagram, sender) = self.source.recv_datagram().await?;

        let packet = self
            .decoder
            .decode(datagram)
            .map_err(|error| ReceiveError::Decode { sender, error })?;

        Ok((packet, sender))
    }

    /// Receives datagrams until one decodes successfully.
    ///
    /// Datagrams with an invalid public header are logged and dropped. Errors from the source
    /// are returned.
    pub async fn recv_valid(&self) -> io::Result<(QuicPacket, SocketAddr)> {
        loop {
            match self.recv().await {
                Ok(result) => return Ok(result),
                Err(ReceiveError::Io(err)) => return Err(err),
                Err(ReceiveError::Decode { sender, error }) => {
                    tracing::debug!(%sender, ?error, "dropping datagram with invalid header");
                }
            }
        }
    }

    /// Converts the receiver into a never-ending stream of received packets.
    pub fn into_stream(
        self,
    ) -> impl Stream<Item = Result<(QuicPacket, SocketAddr), ReceiveError>> {
        futures::stream::unfold(self, |receiver| async move {
            let result = receiver.recv().await;
            Some((result, receiver))
        })
    }
}
