//! Representation of the gQUIC public header and its wire format.
//!
//! This module contains the decoded public header of a packet, the codecs for the fields it
//! is composed of, and the errors encountered while decoding it. Received datagrams are
//! handled by [`PacketDecoder`], which splits them into a [`PublicHeader`] and the opaque
//! payload following it.

mod error;
pub use error::{DecodeError, HeaderField, InvalidHeaderKind};

mod flags;
pub use flags::PublicFlags;

mod packet_number;
pub use packet_number::{
    decode_packet_number,
    PacketNumber,
    PacketNumberLength,
    TruncatedPacketNumber,
};

mod public_header;
pub use public_header::{ConnectionId, DecodeContext, DiversificationNonce, PublicHeader, Role};

mod decoder;
pub use decoder::{PacketDecoder, QuicPacket};
