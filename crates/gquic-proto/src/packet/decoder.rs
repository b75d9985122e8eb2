use bytes::{Buf, Bytes};

use super::{DecodeContext, DecodeError, PublicHeader, Role};
use crate::wire_encoding::WireDecodeWithContext;

/// A gQUIC packet split into its public header and the opaque payload that follows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuicPacket {
    /// The decoded public header.
    pub header: PublicHeader,
    /// The number of bytes occupied by the public header, i.e., the offset of the payload.
    pub header_length: usize,
    /// The remainder of the packet, left untouched.
    pub payload: Bytes,
}

impl<T: Buf> WireDecodeWithContext<T> for QuicPacket {
    type Error = DecodeError;
    type Context = DecodeContext;

    fn decode_with_context(data: &mut T, context: Self::Context) -> Result<Self, Self::Error> {
        let initial_remaining = data.remaining();
        let header = PublicHeader::decode_with_context(data, context)?;
        let header_length = initial_remaining - data.remaining();

        // If we were already parsing a Bytes, then this is just an Arc increment, otherwise
        // the payload is copied.
        let payload = data.copy_to_bytes(data.remaining());

        Ok(Self {
            header,
            header_length,
            payload,
        })
    }
}

/// Decodes received datagrams into [`QuicPacket`]s.
///
/// Each call is independent of all others, so a single decoder may be shared between tasks
/// and threads, and used for any number of datagrams.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketDecoder {
    context: DecodeContext,
}

impl PacketDecoder {
    /// Creates a decoder for an endpoint in the given role, using the default supported
    /// versions.
    pub const fn new(role: Role) -> Self {
        Self::with_context(DecodeContext::new(role))
    }

    /// Creates a decoder with the provided context.
    pub const fn with_context(context: DecodeContext) -> Self {
        Self { context }
    }

    /// The context passed to each decode.
    pub const fn context(&self) -> &DecodeContext {
        &self.context
    }

    /// Decodes the datagram into a packet.
    ///
    /// The payload of the returned packet shares the datagram's memory. No packet is returned
    /// if any part of the public header fails to decode.
    pub fn decode(&self, mut datagram: Bytes) -> Result<QuicPacket, DecodeError> {
        let packet = QuicPacket::decode_with_context(&mut datagram, self.context)?;

        tracing::trace!(
            role = ?self.context.role,
            flags = packet.header.flags.get(),
            connection_id = ?packet.header.connection_id,
            header_length = packet.header_length,
            payload_length = packet.payload.len(),
            "decoded public header"
        );

        Ok(packet)
    }

    /// Decodes the datagram into a packet, copying the payload out of the slice.
    pub fn decode_slice(&self, datagram: &[u8]) -> Result<QuicPacket, DecodeError> {
        self.decode(Bytes::copy_from_slice(datagram))
    }
}

#[cfg(test)]
mod tests {
    use rand::{Rng, SeedableRng};
    use rand_xorshift::XorShiftRng;

    use super::*;
    use crate::{
        packet::{ConnectionId, HeaderField, InvalidHeaderKind, PacketNumberLength},
        version::{SupportedVersions, VersionNumber},
    };

    const DATA_PACKET: [u8; 14] = [
        0x18, 0xef, 0xbe, 0xad, 0xde, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, b'a', b'b', b'c',
    ];

    #[test]
    fn splits_header_and_payload() -> test_utils::Result {
        let datagram = Bytes::from_static(&DATA_PACKET);
        let decoder = PacketDecoder::new(Role::Client);

        let packet = decoder.decode(datagram.clone())?;

        assert_eq!(packet.header.connection_id, ConnectionId::new(0xdead_beef));
        assert_eq!(
            packet.header.packet_number_length(),
            Some(PacketNumberLength::Two)
        );
        assert_eq!(
            packet.header.packet_number.map(|number| number.value().get()),
            Some(1)
        );
        assert_eq!(packet.header_length, 11);
        assert_eq!(packet.payload, Bytes::from_static(b"abc"));
        assert_eq!(datagram, Bytes::from_static(&DATA_PACKET));

        Ok(())
    }

    #[test]
    fn decode_slice_matches_decode() -> test_utils::Result {
        let decoder = PacketDecoder::new(Role::Client);

        assert_eq!(
            decoder.decode_slice(&DATA_PACKET)?,
            decoder.decode(Bytes::from_static(&DATA_PACKET))?
        );

        Ok(())
    }

    #[test]
    fn role_changes_layout() -> test_utils::Result {
        let server = PacketDecoder::new(Role::Server).decode_slice(&DATA_PACKET)?;

        assert_eq!(server.header.packet_number, None);
        assert_eq!(server.header_length, 9);
        assert_eq!(server.payload.as_ref(), &DATA_PACKET[9..]);

        Ok(())
    }

    #[test]
    fn version_negotiation_consumes_datagram() -> test_utils::Result {
        let datagram = [&[0x01u8][..], &b"Q035"[..], &b"Q038"[..]].concat();
        let decoder = PacketDecoder::with_context(
            DecodeContext::new(Role::Server)
                .with_supported_versions(SupportedVersions::new([VersionNumber::Q038])?),
        );

        let packet = decoder.decode_slice(&datagram)?;

        assert_eq!(
            packet.header.server_supported_versions,
            [VersionNumber::UNSUPPORTED, VersionNumber::Q038]
        );
        assert_eq!(packet.header_length, datagram.len());
        assert!(packet.payload.is_empty());

        Ok(())
    }

    #[test]
    fn errors_are_surfaced() {
        let decoder = PacketDecoder::new(Role::Client);

        assert_eq!(
            decoder.decode_slice(&[0x08, 0, 0, 0, 0, 0, 0, 0, 0, 0x01]),
            Err(DecodeError::InvalidPacketHeader(
                InvalidHeaderKind::ZeroConnectionId
            ))
        );
        assert_eq!(
            decoder.decode_slice(&DATA_PACKET[..10]),
            Err(DecodeError::TruncatedInput(HeaderField::PacketNumber))
        );
    }

    #[test]
    fn random_datagrams_never_panic() {
        let mut rng = XorShiftRng::seed_from_u64(47);

        for role in [Role::Client, Role::Server] {
            let decoder = PacketDecoder::new(role);

            for _ in 0..4096 {
                let length = rng.gen_range(0..64);
                let mut datagram = vec![0u8; length];
                rng.fill(datagram.as_mut_slice());

                if let Ok(packet) = decoder.decode_slice(&datagram) {
                    assert_eq!(packet.header_length + packet.payload.len(), length);
                    assert_eq!(
                        packet.header.connection_id.is_some(),
                        !packet.header.truncated_connection_id()
                    );
                    assert!(
                        packet.header.client_version.is_none()
                            || packet.header.server_supported_versions.is_empty()
                    );
                }
            }
        }
    }

    #[test]
    fn decoder_is_shareable() {
        fn assert_send_sync<T: Send + Sync + Copy>() {}
        assert_send_sync::<PacketDecoder>();
    }
}
