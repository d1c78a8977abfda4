//! Framing, validation and field extraction for telemetry packets.
//!
//! A packet on the wire is a 4-byte [`PacketHeader`] (type, RSSI and a
//! little-endian payload length), `length` bytes of opaque Wi-Fi data, a
//! little-endian `u32` timestamp and a trailing XOR checksum byte covering
//! everything before it. The framing is length-prefixed: there is no sync
//! byte and no resynchronisation, so a corrupted length field misaligns the
//! reads that follow it.
//!
//! [`PacketReader`] turns a [`ByteSource`](crate::source::ByteSource) into
//! [`ValidatedPacket`]s, [`decode`] and [`decode_packet`] extract a
//! [`Record`], and [`encode_record`] / [`PacketWriter`] produce frames.

pub mod errors;
pub mod frame;
pub mod reader;
pub mod record;
pub mod writer;

pub use errors::{DecodeError, EncodeError, FrameError};
pub use frame::{PacketHeader, ValidatedPacket, xor_checksum};
pub use reader::{FrameStats, PacketReader};
pub use record::{Record, decode, decode_packet};
pub use writer::{PacketWriter, encode_record};

/// Length of the packet header in bytes.
pub const HEADER_LEN: usize = 4;
/// Length of the trailing timestamp field in bytes.
pub const TIMESTAMP_LEN: usize = 4;
/// Length of the checksum trailer in bytes.
pub const CHECKSUM_LEN: usize = 1;
/// Largest Wi-Fi payload a header can describe.
pub const MAX_WIFI_DATA: usize = u16::MAX as usize;
