//! Receiving gQUIC packets from datagram transports.
//!
//! The [`receiver::PacketReceiver`] pulls datagrams from a [`receiver::DatagramSource`], such
//! as a [`tokio::net::UdpSocket`], and decodes the public header of each with the
//! [`gquic_proto::packet::PacketDecoder`].

pub mod receiver;
