//! gQUIC version numbers and their encoding as version tags.
//!
//! On the wire a version is carried as a 4-byte tag consisting of the ASCII character `'Q'`
//! followed by three ASCII decimal digits, e.g. `Q038` for version 38. The tag is read as a
//! little-endian `u32`, so byte 0 of the wire (`'Q'`) is the least significant byte of the tag.

use std::{fmt::Display, str::FromStr};

use bytes::BufMut;
use serde::Deserialize;

use crate::wire_encoding::{InadequateBufferSize, WireEncode};

/// Errors raised when converting or parsing version numbers.
#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone, Copy)]
pub enum VersionError {
    /// Only numbers with at most three decimal digits have a version tag.
    #[error("version number {0} cannot be represented as a version tag")]
    OutOfRange(i32),
    /// The textual form of a version must be `'Q'` followed by three decimal digits.
    #[error("invalid version tag syntax")]
    InvalidTagSyntax,
    /// The buffer is too small to hold the encoded tag.
    #[error(transparent)]
    Buffer(#[from] InadequateBufferSize),
}

/// A gQUIC version number, such as 38 for the tag `Q038`.
///
/// Numbers decoded from the wire are not validated, so an instance may hold a value that has no
/// valid tag representation. See [`VersionNumber::from_tag`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(try_from = "String")]
pub struct VersionNumber(i32);

impl VersionNumber {
    /// Version 35, tag `Q035`.
    pub const Q035: Self = Self(35);
    /// Version 36, tag `Q036`.
    pub const Q036: Self = Self(36);
    /// Version 37, tag `Q037`.
    pub const Q037: Self = Self(37);
    /// Version 38, tag `Q038`.
    pub const Q038: Self = Self(38);

    /// Marks a version advertised by a server that is not supported locally.
    ///
    /// It is never a member of a [`SupportedVersions`] set.
    pub const UNSUPPORTED: Self = Self(-1);

    /// The largest version number that has a tag representation.
    pub const MAX_TAGGED: i32 = 999;

    /// The length of an encoded version tag in bytes.
    pub const TAG_LENGTH: usize = 4;

    const TAG_PREFIX: u8 = b'Q';

    /// Creates a version number from the provided integer.
    pub const fn new(number: i32) -> Self {
        Self(number)
    }

    /// Returns the version as an integer.
    #[inline]
    pub const fn get(&self) -> i32 {
        self.0
    }

    /// Converts a version tag read from the wire into a version number.
    ///
    /// The three digit bytes are each offset by ASCII `'0'` and recombined as
    /// `hundreds * 100 + tens * 10 + units`. The leading byte is *not* checked to be `'Q'`,
    /// and non-digit bytes are not rejected; callers wanting strict tags should check
    /// [`VersionNumber::has_tag_prefix`] and [`VersionNumber::is_tagged`].
    pub const fn from_tag(tag: u32) -> Self {
        let [_, hundreds, tens, units] = tag.to_le_bytes();
        let zero = b'0' as i32;

        Self((hundreds as i32 - zero) * 100 + (tens as i32 - zero) * 10 + (units as i32 - zero))
    }

    /// Returns true if the leading byte of the tag is `'Q'`.
    pub const fn has_tag_prefix(tag: u32) -> bool {
        tag.to_le_bytes()[0] == Self::TAG_PREFIX
    }

    /// Returns true if the number lies in `[0, 999]` and thus has a version tag.
    pub const fn is_tagged(&self) -> bool {
        self.0 >= 0 && self.0 <= Self::MAX_TAGGED
    }

    /// Converts the version number into its version tag.
    ///
    /// Returns an error if the number does not consist of at most three decimal digits.
    pub fn to_tag(&self) -> Result<u32, VersionError> {
        if !self.is_tagged() {
            return Err(VersionError::OutOfRange(self.0));
        }

        let digit = |value: i32| b'0' + (value % 10) as u8;
        Ok(u32::from_le_bytes([
            Self::TAG_PREFIX,
            digit(self.0 / 100),
            digit(self.0 / 10),
            digit(self.0),
        ]))
    }

    /// Returns true if the version is in [`SupportedVersions::DEFAULT`].
    pub fn is_supported(&self) -> bool {
        SupportedVersions::DEFAULT.contains(*self)
    }
}

/// Returns true if `number` is one of the versions supported by default (35 to 38).
pub fn is_supported_version(number: i32) -> bool {
    VersionNumber(number).is_supported()
}

impl From<VersionNumber> for i32 {
    fn from(value: VersionNumber) -> Self {
        value.0
    }
}

impl Display for VersionNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Self::UNSUPPORTED => f.write_str("unsupported"),
            version if version.is_tagged() => write!(f, "Q{:03}", version.0),
            version => write!(f, "invalid({})", version.0),
        }
    }
}

impl FromStr for VersionNumber {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix(char::from(Self::TAG_PREFIX))
            .ok_or(VersionError::InvalidTagSyntax)?;

        if digits.len() != 3 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(VersionError::InvalidTagSyntax);
        }

        digits
            .parse()
            .map(Self)
            .map_err(|_| VersionError::InvalidTagSyntax)
    }
}

impl TryFrom<String> for VersionNumber {
    type Error = VersionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl WireEncode for VersionNumber {
    type Error = VersionError;

    fn encode_to<T: BufMut>(&self, buffer: &mut T) -> Result<(), Self::Error> {
        let tag = self.to_tag()?;
        if buffer.remaining_mut() < Self::TAG_LENGTH {
            return Err(InadequateBufferSize.into());
        }
        buffer.put_u32_le(tag);

        Ok(())
    }
}

/// An immutable set of version numbers accepted during version negotiation.
///
/// Only numbers with a tag representation can be members. The set is `Copy` so that it can be
/// handed to every decode call without synchronisation.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "Vec<VersionNumber>")]
pub struct SupportedVersions {
    bits: [u64; SUPPORTED_WORDS],
}

const SUPPORTED_WORDS: usize = (VersionNumber::MAX_TAGGED as usize + 1).div_ceil(64);

impl SupportedVersions {
    /// The set containing no versions.
    pub const EMPTY: Self = Self {
        bits: [0; SUPPORTED_WORDS],
    };

    /// The versions supported by this implementation: 35, 36, 37, and 38.
    pub const DEFAULT: Self = Self::EMPTY
        .with_number(35)
        .with_number(36)
        .with_number(37)
        .with_number(38);

    const fn with_number(mut self, number: usize) -> Self {
        self.bits[number / 64] |= 1u64 << (number % 64);
        self
    }

    /// Creates a set from the provided versions.
    ///
    /// Returns an error if any of the versions has no tag representation.
    pub fn new<I>(versions: I) -> Result<Self, VersionError>
    where
        I: IntoIterator<Item = VersionNumber>,
    {
        versions.into_iter().try_fold(Self::EMPTY, |set, version| {
            if version.is_tagged() {
                Ok(set.with_number(version.0 as usize))
            } else {
                Err(VersionError::OutOfRange(version.0))
            }
        })
    }

    /// Returns true if the version is a member of the set.
    pub const fn contains(&self, version: VersionNumber) -> bool {
        if !version.is_tagged() {
            return false;
        }
        let number = version.0 as usize;
        self.bits[number / 64] & (1u64 << (number % 64)) != 0
    }

    /// Returns true if the set has no members.
    pub fn is_empty(&self) -> bool {
        self.bits.iter().all(|word| *word == 0)
    }

    /// Iterates over the members of the set in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = VersionNumber> + '_ {
        (0..=VersionNumber::MAX_TAGGED)
            .map(VersionNumber)
            .filter(move |version| self.contains(*version))
    }
}

impl Default for SupportedVersions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl std::fmt::Debug for SupportedVersions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl TryFrom<Vec<VersionNumber>> for SupportedVersions {
    type Error = VersionError;

    fn try_from(value: Vec<VersionNumber>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
