//! Error types for packet framing, decoding and encoding.

use std::io;

use thiserror::Error;

/// Reasons a single read cycle produced no packet.
///
/// Every variant is recoverable: the reader keeps no state between cycles, so
/// the next call starts a fresh header read at the current stream position.
#[derive(Debug, Error)]
pub enum FrameError {
    /// Fewer than four header bytes arrived before the timeout or end of stream.
    #[error("short header read: received {received} of 4 bytes")]
    ShortHeaderRead {
        /// Bytes actually received.
        received: usize,
    },
    /// The body, timestamp and checksum did not arrive in full.
    #[error("short body read: received {received} of {expected} bytes")]
    ShortBodyRead {
        /// Bytes announced by the header (`length + 5`).
        expected: usize,
        /// Bytes actually received.
        received: usize,
    },
    /// The trailing checksum byte does not match the XOR of the frame.
    #[error("checksum mismatch: frame carries {expected:#04x}, computed {computed:#04x}")]
    ChecksumMismatch {
        /// Checksum byte carried by the frame.
        expected: u8,
        /// Checksum computed over the received bytes.
        computed: u8,
    },
    /// The byte source reported a hard I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl FrameError {
    /// Returns `true` when the cycle simply saw no traffic (an idle timeout).
    #[must_use]
    pub const fn is_idle(&self) -> bool { matches!(self, Self::ShortHeaderRead { received: 0 }) }
}

/// Errors raised when extracting fields from validated packet bytes.
///
/// The reader only ever hands out correctly sized packets, so seeing one of
/// these on its output means that invariant was broken.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// The buffer ends before every field the header announces.
    #[error("buffer too short: need {needed} bytes, have {available}")]
    ShortBuffer {
        /// Bytes required to decode the packet.
        needed: usize,
        /// Bytes available in the buffer.
        available: usize,
    },
    /// The buffer carries bytes beyond the timestamp.
    #[error("size mismatch: expected {expected} bytes, got {actual}")]
    SizeMismatch {
        /// Size implied by the header.
        expected: usize,
        /// Size of the buffer.
        actual: usize,
    },
}

/// Errors raised when building a record or serialising it to a frame.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EncodeError {
    /// The Wi-Fi payload does not fit the 16-bit length field.
    #[error("payload too large: {0} bytes exceeds 65535")]
    PayloadTooLarge(usize),
    /// The record's `length` disagrees with its payload.
    #[error("length field {declared} does not match payload of {actual} bytes")]
    LengthMismatch {
        /// Value of the `length` field.
        declared: u16,
        /// Actual payload size.
        actual: usize,
    },
}
