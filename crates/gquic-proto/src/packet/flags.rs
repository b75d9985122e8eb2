/// The public flag byte that starts every gQUIC packet.
///
/// Each bit selects whether a field of the public header is present:
///
/// | Bit    | Meaning                                                      |
/// |--------|--------------------------------------------------------------|
/// | `0x01` | a version tag (client) or version list (server) follows      |
/// | `0x02` | the packet is a public reset                                 |
/// | `0x04` | a diversification nonce follows                              |
/// | `0x08` | an 8-byte connection ID follows; absent means truncated      |
/// | `0x30` | the length of the packet number                              |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PublicFlags(u8);

impl PublicFlags {
    /// Flag indicating the presence of version information.
    pub const VERSION: u8 = 0x01;
    /// Flag indicating a public reset packet.
    pub const RESET: u8 = 0x02;
    /// Flag indicating the presence of a diversification nonce.
    pub const DIVERSIFICATION_NONCE: u8 = 0x04;
    /// Flag indicating the presence of a connection ID.
    pub const CONNECTION_ID: u8 = 0x08;
    /// Mask of the two bits that encode the packet number length.
    pub const PACKET_NUMBER_LENGTH: u8 = 0x30;

    /// Creates flags from the raw flag byte.
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// Get the raw flag byte.
    #[inline]
    pub const fn get(&self) -> u8 {
        self.0
    }

    /// Returns true if the version flag is set.
    pub const fn has_version(&self) -> bool {
        self.0 & Self::VERSION != 0
    }

    /// Returns true if the reset flag is set.
    pub const fn has_reset(&self) -> bool {
        self.0 & Self::RESET != 0
    }

    /// Returns true if the diversification nonce flag is set.
    pub const fn has_diversification_nonce(&self) -> bool {
        self.0 & Self::DIVERSIFICATION_NONCE != 0
    }

    /// Returns true if the connection ID is present on the wire.
    ///
    /// Note that the header models the inverse of this as a truncated connection ID.
    pub const fn has_connection_id(&self) -> bool {
        self.0 & Self::CONNECTION_ID != 0
    }

    /// The packet number length bits, still in their position in the flag byte.
    pub const fn packet_number_length_bits(&self) -> u8 {
        self.0 & Self::PACKET_NUMBER_LENGTH
    }
}

impl From<u8> for PublicFlags {
    fn from(value: u8) -> Self {
        Self(value)
    }
}

impl From<PublicFlags> for u8 {
    fn from(value: PublicFlags) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_flags() {
        let flags = PublicFlags::new(0);

        assert!(!flags.has_version());
        assert!(!flags.has_reset());
        assert!(!flags.has_diversification_nonce());
        assert!(!flags.has_connection_id());
        assert_eq!(flags.packet_number_length_bits(), 0);
    }

    #[test]
    fn all_flags() {
        let flags = PublicFlags::new(0x3f);

        assert!(flags.has_version());
        assert!(flags.has_reset());
        assert!(flags.has_diversification_nonce());
        assert!(flags.has_connection_id());
        assert_eq!(flags.packet_number_length_bits(), 0x30);
    }

    #[test]
    fn ignores_unassigned_bits() {
        let flags = PublicFlags::new(0xc8);

        assert!(flags.has_connection_id());
        assert!(!flags.has_version());
        assert_eq!(flags.packet_number_length_bits(), 0);
        assert_eq!(u8::from(flags), 0xc8);
    }
}
