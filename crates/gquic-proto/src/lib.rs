//! Types, conversion functions, and parsing for the public header of gQUIC packets.
//!
//! The entry point for received datagrams is [`packet::PacketDecoder`], which decodes the
//! unencrypted public header of a single packet and hands back the remaining payload.

pub mod packet;
pub mod version;
pub mod wire_encoding;
