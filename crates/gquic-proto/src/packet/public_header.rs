use std::num::NonZeroU64;

use bytes::Buf;
use serde::Deserialize;

use super::{
    DecodeError,
    HeaderField,
    InvalidHeaderKind,
    PacketNumberLength,
    PublicFlags,
    TruncatedPacketNumber,
};
use crate::{
    version::{SupportedVersions, VersionNumber},
    wire_encoding::{WireDecode, WireDecodeWithContext},
};

/// The role of the endpoint that is decoding a packet.
///
/// The layout of the public header depends on whether the packet was received by a client or
/// a server: a version-flagged packet is read as a single version tag when decoding as a client
/// and as a version negotiation list when decoding as a server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[allow(missing_docs)]
    Client,
    #[allow(missing_docs)]
    Server,
}

impl Role {
    /// Returns true for [`Role::Server`].
    #[inline]
    pub const fn is_server(&self) -> bool {
        matches!(self, Role::Server)
    }
}

/// Information required to decode a [`PublicHeader`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct DecodeContext {
    /// The role of the decoding endpoint.
    pub role: Role,
    /// The versions reported as supported when decoding a version negotiation packet.
    ///
    /// Defaults to [`SupportedVersions::DEFAULT`].
    #[serde(default)]
    pub supported_versions: SupportedVersions,
}

impl DecodeContext {
    /// Creates a context for the given role with the default supported versions.
    pub const fn new(role: Role) -> Self {
        Self {
            role,
            supported_versions: SupportedVersions::DEFAULT,
        }
    }

    /// Replaces the set of supported versions.
    pub const fn with_supported_versions(self, supported_versions: SupportedVersions) -> Self {
        Self {
            supported_versions,
            ..self
        }
    }
}

impl From<Role> for DecodeContext {
    fn from(value: Role) -> Self {
        Self::new(value)
    }
}

/// The 64-bit identifier of a gQUIC connection.
///
/// A connection ID of zero is invalid, which is enforced by the representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(NonZeroU64);

impl ConnectionId {
    /// The length of an encoded connection ID in bytes.
    pub const LENGTH: usize = 8;

    /// Creates a new connection ID, if the value is non-zero.
    pub const fn new(value: u64) -> Option<Self> {
        match NonZeroU64::new(value) {
            Some(value) => Some(Self(value)),
            None => None,
        }
    }

    /// Get the value of the connection ID.
    #[inline]
    pub const fn get(&self) -> u64 {
        self.0.get()
    }
}

impl<T: Buf> WireDecode<T> for ConnectionId {
    type Error = DecodeError;

    fn decode(data: &mut T) -> Result<Self, Self::Error> {
        if data.remaining() < Self::LENGTH {
            return Err(DecodeError::TruncatedInput(HeaderField::ConnectionId));
        }

        Self::new(data.get_u64_le()).ok_or(InvalidHeaderKind::ZeroConnectionId.into())
    }
}

/// A nonce sent by the server to diversify the initial encryption keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DiversificationNonce([u8; NONCE_LENGTH]);

const NONCE_LENGTH: usize = 32;

impl DiversificationNonce {
    /// The length of a diversification nonce in bytes.
    pub const LENGTH: usize = NONCE_LENGTH;

    /// Creates a nonce from its bytes.
    pub const fn new(bytes: [u8; NONCE_LENGTH]) -> Self {
        Self(bytes)
    }

    /// The bytes of the nonce.
    pub const fn as_bytes(&self) -> &[u8; NONCE_LENGTH] {
        &self.0
    }
}

impl<T: Buf> WireDecode<T> for DiversificationNonce {
    type Error = DecodeError;

    fn decode(data: &mut T) -> Result<Self, Self::Error> {
        if data.remaining() < Self::LENGTH {
            return Err(DecodeError::TruncatedInput(HeaderField::DiversificationNonce));
        }

        let mut nonce = [0u8; NONCE_LENGTH];
        data.copy_to_slice(&mut nonce);

        Ok(Self(nonce))
    }
}

/// The unencrypted public header of a gQUIC packet.
///
/// Which of the optional fields are present is determined by the [`PublicFlags`] and the
/// [`Role`] of the decoding endpoint:
///
/// - the connection ID is present unless it was truncated,
/// - a client decoding a version-flagged packet reads a single version,
/// - a server decoding a version-flagged packet reads the list of versions supported by the
///   peer, which extends to the end of the datagram,
/// - public reset packets carry neither version information nor a packet number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicHeader {
    /// The flag byte that selected the fields of this header.
    pub flags: PublicFlags,

    /// The connection ID, if it was not truncated.
    pub connection_id: Option<ConnectionId>,

    /// The version tag of a version-flagged packet, decoded by a client.
    pub client_version: Option<VersionNumber>,

    /// The versions listed in a version negotiation packet, decoded by a server.
    ///
    /// Entries are in wire order and may repeat. Versions absent from the supported set of
    /// the [`DecodeContext`] are replaced by [`VersionNumber::UNSUPPORTED`].
    pub server_supported_versions: Vec<VersionNumber>,

    /// The diversification nonce, when flagged.
    pub diversification_nonce: Option<DiversificationNonce>,

    /// The low-order bytes of the packet number, when the packet carries one.
    pub packet_number: Option<TruncatedPacketNumber>,
}

impl PublicHeader {
    /// Returns true if the version flag is set.
    pub fn version_flag(&self) -> bool {
        self.flags.has_version()
    }

    /// Returns true if this is a public reset packet.
    pub fn reset_flag(&self) -> bool {
        self.flags.has_reset()
    }

    /// Returns true if the connection ID was omitted from the wire.
    pub fn truncated_connection_id(&self) -> bool {
        !self.flags.has_connection_id()
    }

    /// The length of the packet number field, if the packet carries one.
    pub fn packet_number_length(&self) -> Option<PacketNumberLength> {
        self.packet_number.map(|number| number.length())
    }

    /// Returns true if the header was decoded as a version negotiation packet.
    pub fn is_version_negotiation(&self, role: Role) -> bool {
        role.is_server() && self.version_flag() && !self.reset_flag()
    }

    /// Returns true if a packet with the given flags, decoded in the given role, carries a
    /// packet number.
    ///
    /// Public reset packets never carry one. Neither do version-flagged packets, nor any
    /// packet decoded by a server.
    pub const fn has_packet_number(flags: PublicFlags, role: Role) -> bool {
        !(flags.has_reset() || role.is_server() || flags.has_version())
    }
}

impl<T: Buf> WireDecodeWithContext<T> for PublicHeader {
    type Error = DecodeError;
    type Context = DecodeContext;

    fn decode_with_context(data: &mut T, context: Self::Context) -> Result<Self, Self::Error> {
        if !data.has_remaining() {
            return Err(DecodeError::TruncatedInput(HeaderField::Flags));
        }
        let flags = PublicFlags::new(data.get_u8());

        let packet_number_length = if Self::has_packet_number(flags, context.role) {
            Some(PacketNumberLength::from_flags(flags)?)
        } else {
            None
        };

        let connection_id = if flags.has_connection_id() {
            Some(ConnectionId::decode(data)?)
        } else {
            None
        };

        let mut client_version = None;
        let mut server_supported_versions = Vec::new();
        if flags.has_version() && !flags.has_reset() {
            match context.role {
                Role::Client => client_version = Some(decode_version(data)?),
                Role::Server => {
                    server_supported_versions =
                        decode_version_list(data, &context.supported_versions)?
                }
            }
        }

        let diversification_nonce = if flags.has_diversification_nonce() {
            Some(DiversificationNonce::decode(data)?)
        } else {
            None
        };

        let packet_number = packet_number_length
            .map(|length| TruncatedPacketNumber::decode_with_context(data, length))
            .transpose()?;

        Ok(Self {
            flags,
            connection_id,
            client_version,
            server_supported_versions,
            diversification_nonce,
            packet_number,
        })
    }
}

fn decode_version<T: Buf>(data: &mut T) -> Result<VersionNumber, DecodeError> {
    if data.remaining() < VersionNumber::TAG_LENGTH {
        return Err(DecodeError::TruncatedInput(HeaderField::VersionTag));
    }
    Ok(VersionNumber::from_tag(data.get_u32_le()))
}

/// Decodes the version tags that make up the remainder of a version negotiation packet.
fn decode_version_list<T: Buf>(
    data: &mut T,
    supported: &SupportedVersions,
) -> Result<Vec<VersionNumber>, DecodeError> {
    let remaining = data.remaining();
    if remaining % VersionNumber::TAG_LENGTH != 0 {
        return Err(DecodeError::InvalidVersionNegotiationPacket { remaining });
    }

    let mut versions = Vec::with_capacity(remaining / VersionNumber::TAG_LENGTH);
    while data.has_remaining() {
        let version = VersionNumber::from_tag(data.get_u32_le());
        if supported.contains(version) {
            versions.push(version);
        } else {
            versions.push(VersionNumber::UNSUPPORTED);
        }
    }

    Ok(versions)
}
