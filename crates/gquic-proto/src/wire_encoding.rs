//! Traits and helpers shared by the wire codecs of this crate.

use bytes::{BufMut, Bytes, BytesMut};

/// A trait for types decodable from a wire format, without any additional information.
pub trait WireDecode<T>: Sized {
    /// The error type returned on a failed decode.
    type Error;

    /// Decodes an object from the provided data, such as a [`bytes::Buf`].
    ///
    /// The buffer is advanced by as many bytes as necessary to decode the object.
    /// Bytes are consumed regardless of whether or not decoding fails.
    fn decode(data: &mut T) -> Result<Self, Self::Error>;
}

/// A trait for types decodable from a wire format, *with* additional information.
///
/// In contrast to [`WireDecode`], this trait allows the implementing type to specify
/// additional data that should be passed to the decode calls, by means of the
/// associated type [`Self::Context`].
pub trait WireDecodeWithContext<T>: Sized {
    /// The error type returned on a failed decode.
    type Error;
    /// Data that should be provided to calls to decode.
    type Context;

    /// Decodes an object from the provided data, such as a [`bytes::Buf`], with additional context.
    ///
    /// Callers must provide the required contextual information, as specified by [`Self::Context`],
    /// to decode the object. For a public header this is the role of the decoding endpoint,
    /// whereas a packet number requires the length signalled in the flag byte.
    ///
    /// The buffer is advanced by as many bytes as necessary to decode the object.
    /// Bytes are consumed regardless of whether or not decoding fails.
    fn decode_with_context(data: &mut T, context: Self::Context) -> Result<Self, Self::Error>;
}

/// A trait for types encodable to a wire format.
pub trait WireEncode {
    /// The error type returned on a failed encode.
    type Error: std::fmt::Debug;

    /// Encodes the object to the end of the provided buffer.
    fn encode_to<T: BufMut>(&self, buffer: &mut T) -> Result<(), Self::Error>;

    /// Encodes the object to a newly allocated [`Bytes`].
    ///
    /// # Panics
    ///
    /// Panics if [`Self::encode_to`] fails for a reason other than a lack of buffer space.
    fn encode_to_bytes(&self) -> Bytes {
        let mut buffer = BytesMut::new();
        self.encode_to(&mut buffer)
            .expect("only fails on invalid values, BytesMut grows as needed");
        buffer.freeze()
    }
}

/// Raised if the buffer does not have sufficient capacity for encoding a value.
#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone, Copy, Default)]
#[error("the provided buffer did not have sufficient size")]
pub struct InadequateBufferSize;

macro_rules! bounded_uint {
    (
        $(#[$outer:meta])*
        pub struct $name:ident($type:ty : $bits:literal);
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Hash)]
        pub struct $name($type);

        impl $name {
            /// The number of bits useable for an instance of this type.
            pub const BITS: u32 = $bits;

            /// The maximum possible value for an instance of this type.
            pub const MAX: Self = Self((1 << $bits) - 1);

            /// Create a new instance if the value is at most `Self::MAX.value()`.
            pub const fn new(value: $type) -> Option<Self> {
                if value <= Self::MAX.0 {
                    Some(Self(value))
                } else {
                    None
                }
            }

            /// Get the value of this instance as its underlying type.
            #[inline]
            pub const fn get(&self) -> $type {
                self.0
            }
        }
    };
}
pub(crate) use bounded_uint;
