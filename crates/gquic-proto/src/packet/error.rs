use std::fmt::Display;

/// Errors raised when failing to decode a [`PublicHeader`][super::PublicHeader] or
/// its constituents.
#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone, Copy)]
pub enum DecodeError {
    /// The header is structurally invalid.
    #[error("invalid packet header: {0}")]
    InvalidPacketHeader(InvalidHeaderKind),
    /// The version list of a version negotiation packet is not a whole number of tags.
    #[error(
        "invalid version negotiation packet: versions should be indicated 4 bytes each, \
        but {remaining} bytes remain"
    )]
    InvalidVersionNegotiationPacket {
        /// The number of bytes that were available for the version list.
        remaining: usize,
    },
    /// The datagram ended before the field was complete.
    #[error("the provided bytes did not include the full {0}")]
    TruncatedInput(HeaderField),
}

impl From<InvalidHeaderKind> for DecodeError {
    fn from(value: InvalidHeaderKind) -> Self {
        Self::InvalidPacketHeader(value)
    }
}

/// The reason a public header was found to be invalid.
#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone, Copy)]
pub enum InvalidHeaderKind {
    /// A connection ID was present but zero.
    #[error("connection id cannot be zero")]
    ZeroConnectionId,
    /// The packet number length is not one of 1, 2, 4, or 6 bytes.
    #[error("invalid packet number size: {0} bytes")]
    InvalidPacketNumberSize(usize),
    /// The packet-number-length bits of the flag byte do not map to a length.
    #[error("packet number length bits {0:#04x} are not recognised")]
    UnmappedPacketNumberLength(u8),
}

/// The fields of the public header, in wire order.
#[allow(missing_docs)]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum HeaderField {
    Flags,
    ConnectionId,
    VersionTag,
    DiversificationNonce,
    PacketNumber,
}

impl Display for HeaderField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let description = match self {
            HeaderField::Flags => "flag byte",
            HeaderField::ConnectionId => "connection id",
            HeaderField::VersionTag => "version tag",
            HeaderField::DiversificationNonce => "diversification nonce",
            HeaderField::PacketNumber => "packet number",
        };

        f.write_str(description)
    }
}
