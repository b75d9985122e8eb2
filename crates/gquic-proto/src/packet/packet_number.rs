use bytes::{Buf, BufMut};

use super::{DecodeError, HeaderField, InvalidHeaderKind, PublicFlags};
use crate::wire_encoding::{self, InadequateBufferSize, WireDecodeWithContext, WireEncode};

wire_encoding::bounded_uint! {
    /// The low-order 48 bits of a packet number, as carried in the public header.
    pub struct PacketNumber(u64 : 48);
}

/// The number of bytes used to encode the packet number in the public header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PacketNumberLength {
    #[allow(missing_docs)]
    One = 1,
    #[allow(missing_docs)]
    Two = 2,
    #[allow(missing_docs)]
    Four = 4,
    #[allow(missing_docs)]
    Six = 6,
}

impl PacketNumberLength {
    /// The number of bytes occupied on the wire.
    #[inline]
    pub const fn byte_count(&self) -> usize {
        *self as usize
    }

    /// The largest packet number that can be encoded with this length.
    pub const fn max_value(&self) -> u64 {
        (1u64 << (8 * self.byte_count())) - 1
    }

    /// Decodes the length from the packet-number-length bits of the flag byte.
    pub fn from_flags(flags: PublicFlags) -> Result<Self, DecodeError> {
        match flags.packet_number_length_bits() {
            0x30 => Ok(Self::Six),
            0x20 => Ok(Self::Four),
            0x10 => Ok(Self::Two),
            0x00 => Ok(Self::One),
            other => Err(InvalidHeaderKind::UnmappedPacketNumberLength(other).into()),
        }
    }

    /// The bits of the flag byte that encode this length.
    pub const fn flag_bits(&self) -> u8 {
        match self {
            Self::One => 0x00,
            Self::Two => 0x10,
            Self::Four => 0x20,
            Self::Six => 0x30,
        }
    }
}

impl TryFrom<usize> for PacketNumberLength {
    type Error = DecodeError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            4 => Ok(Self::Four),
            6 => Ok(Self::Six),
            other => Err(InvalidHeaderKind::InvalidPacketNumberSize(other).into()),
        }
    }
}

/// A packet number along with the length it occupies in the public header.
///
/// Only the low-order bytes of the full packet number are sent, so the value is always
/// at most [`PacketNumberLength::max_value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TruncatedPacketNumber {
    length: PacketNumberLength,
    value: PacketNumber,
}

impl TruncatedPacketNumber {
    /// Creates a new instance if the value fits within the length.
    pub const fn new(value: u64, length: PacketNumberLength) -> Option<Self> {
        if value > length.max_value() {
            return None;
        }
        match PacketNumber::new(value) {
            Some(value) => Some(Self { length, value }),
            None => None,
        }
    }

    /// The length of the packet number on the wire.
    pub const fn length(&self) -> PacketNumberLength {
        self.length
    }

    /// The packet number, zero-extended from its wire length.
    pub const fn value(&self) -> PacketNumber {
        self.value
    }
}

impl<T: Buf> WireDecodeWithContext<T> for TruncatedPacketNumber {
    type Error = DecodeError;
    type Context = PacketNumberLength;

    fn decode_with_context(data: &mut T, length: Self::Context) -> Result<Self, Self::Error> {
        if data.remaining() < length.byte_count() {
            return Err(DecodeError::TruncatedInput(HeaderField::PacketNumber));
        }

        // Byte 0 is the least significant, the remaining high-order bytes are zero.
        let value = PacketNumber(data.get_uint_le(length.byte_count()));

        Ok(Self { length, value })
    }
}

impl WireEncode for TruncatedPacketNumber {
    type Error = InadequateBufferSize;

    fn encode_to<T: BufMut>(&self, buffer: &mut T) -> Result<(), Self::Error> {
        if buffer.remaining_mut() < self.length.byte_count() {
            return Err(InadequateBufferSize);
        }
        buffer.put_uint_le(self.value.get(), self.length.byte_count());

        Ok(())
    }
}

/// Decodes a little-endian packet number of exactly `length` bytes.
///
/// The buffer is advanced by exactly `length` bytes on success. Lengths other than 1, 2, 4,
/// and 6 are rejected without consuming any data.
pub fn decode_packet_number<T: Buf>(
    data: &mut T,
    length: usize,
) -> Result<PacketNumber, DecodeError> {
    let length = PacketNumberLength::try_from(length)?;
    TruncatedPacketNumber::decode_with_context(data, length).map(|number| number.value)
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use rand::{Rng, SeedableRng};
    use rand_xorshift::XorShiftRng;
    use test_utils::param_test;

    use super::*;

    const ALL_LENGTHS: [PacketNumberLength; 4] = [
        PacketNumberLength::One,
        PacketNumberLength::Two,
        PacketNumberLength::Four,
        PacketNumberLength::Six,
    ];

    fn reference_value(bytes: &[u8]) -> u64 {
        let mut padded = [0u8; 8];
        padded[..bytes.len()].copy_from_slice(bytes);
        u64::from_le_bytes(padded)
    }

    mod decode {
        use super::*;

        param_test! {
            consumes_exact_length: [
                one: (1, 0x01),
                two: (2, 0x0201),
                four: (4, 0x0403_0201),
                six: (6, 0x0605_0403_0201),
            ]
        }
        fn consumes_exact_length(length: usize, expected: u64) {
            let data = [1u8, 2, 3, 4, 5, 6, 7, 8];
            let mut buffer = data.as_slice();

            let number = decode_packet_number(&mut buffer, length).expect("must decode");

            assert_eq!(number.get(), expected);
            assert_eq!(buffer.len(), data.len() - length);
        }

        param_test! {
            rejects_invalid_size: [
                zero: (0),
                three: (3),
                five: (5),
                eight: (8),
                huge: (usize::MAX),
            ]
        }
        fn rejects_invalid_size(length: usize) {
            let data = [0xffu8; 16];
            let mut buffer = data.as_slice();

            assert_eq!(
                decode_packet_number(&mut buffer, length),
                Err(DecodeError::InvalidPacketHeader(
                    InvalidHeaderKind::InvalidPacketNumberSize(length)
                ))
            );
            assert_eq!(buffer.len(), data.len());
        }

        #[test]
        fn truncated() {
            for length in ALL_LENGTHS {
                let data = vec![0xaau8; length.byte_count() - 1];

                assert_eq!(
                    TruncatedPacketNumber::decode_with_context(&mut data.as_slice(), length),
                    Err(DecodeError::TruncatedInput(HeaderField::PacketNumber))
                );
            }
        }

        #[test]
        fn all_ones_is_max_value() {
            for length in ALL_LENGTHS {
                let data = vec![0xffu8; length.byte_count()];
                let number =
                    TruncatedPacketNumber::decode_with_context(&mut data.as_slice(), length)
                        .expect("must decode");

                assert_eq!(number.value().get(), length.max_value());
                assert_eq!(number.length(), length);
            }
        }

        #[test]
        fn matches_reference_little_endian() {
            let mut rng = XorShiftRng::seed_from_u64(38);

            for length in ALL_LENGTHS {
                for _ in 0..256 {
                    let mut data = [0u8; 6];
                    rng.fill(&mut data[..length.byte_count()]);
                    let field = &data[..length.byte_count()];

                    let mut buffer = Bytes::copy_from_slice(field);
                    let number = decode_packet_number(&mut buffer, length.byte_count())
                        .expect("must decode");

                    assert_eq!(number.get(), reference_value(field));
                }
            }
        }
    }

    mod encode {
        use super::*;

        #[test]
        fn writes_little_endian() -> test_utils::Result {
            let number = TruncatedPacketNumber::new(0x0102_0304, PacketNumberLength::Four)
                .ok_or("value must fit")?;

            assert_eq!(number.encode_to_bytes().as_ref(), [4, 3, 2, 1]);

            Ok(())
        }

        #[test]
        fn value_must_fit_length() {
            assert!(TruncatedPacketNumber::new(0xff, PacketNumberLength::One).is_some());
            assert!(TruncatedPacketNumber::new(0x100, PacketNumberLength::One).is_none());
            assert!(
                TruncatedPacketNumber::new(PacketNumber::MAX.get(), PacketNumberLength::Six)
                    .is_some()
            );
            assert!(TruncatedPacketNumber::new(1 << 48, PacketNumberLength::Six).is_none());
        }

        #[test]
        fn inadequate_buffer_size() {
            let number = TruncatedPacketNumber::new(7, PacketNumberLength::Six).expect("fits");
            let mut buffer = [0u8; 5];

            assert_eq!(
                number.encode_to(&mut buffer.as_mut_slice()),
                Err(InadequateBufferSize)
            );
        }
    }

    mod length {
        use super::*;

        param_test! {
            from_flags: [
                one: (0x00, PacketNumberLength::One),
                two: (0x10, PacketNumberLength::Two),
                four: (0x20, PacketNumberLength::Four),
                six: (0x30, PacketNumberLength::Six),
                other_bits_ignored: (0xcf, PacketNumberLength::One),
            ]
        }
        fn from_flags(flags: u8, expected: PacketNumberLength) {
            assert_eq!(
                PacketNumberLength::from_flags(PublicFlags::new(flags)),
                Ok(expected)
            );
            assert_eq!(
                PacketNumberLength::from_flags(PublicFlags::new(expected.flag_bits())),
                Ok(expected)
            );
        }

        #[test]
        fn max_values() {
            assert_eq!(PacketNumberLength::One.max_value(), 0xff);
            assert_eq!(PacketNumberLength::Two.max_value(), 0xffff);
            assert_eq!(PacketNumberLength::Four.max_value(), 0xffff_ffff);
            assert_eq!(PacketNumberLength::Six.max_value(), PacketNumber::MAX.get());
        }
    }
}
