//! Length-prefixed packet reader.
//!
//! [`PacketReader`] pulls one frame per call from a [`ByteSource`]: four
//! header bytes, then `length + 5` bytes of data, timestamp and checksum. A
//! short read or a checksum mismatch abandons the cycle; nothing is carried
//! over, so the next call starts a fresh header read wherever the stream
//! currently is.

use tracing::{debug, warn};

use super::{
    HEADER_LEN,
    errors::FrameError,
    frame::{PacketHeader, ValidatedPacket, xor_checksum},
};
use crate::source::ByteSource;

/// Running counters for the cycles a reader has completed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FrameStats {
    /// Packets that passed validation.
    pub accepted: u64,
    /// Cycles that ended with fewer than four header bytes.
    pub short_headers: u64,
    /// Cycles that ended during the body.
    pub short_bodies: u64,
    /// Frames rejected by the checksum.
    pub checksum_mismatches: u64,
    /// Cycles aborted by a transport error.
    pub io_errors: u64,
}

impl FrameStats {
    /// Number of cycles that produced no packet.
    #[must_use]
    pub const fn rejected(&self) -> u64 {
        self.short_headers + self.short_bodies + self.checksum_mismatches + self.io_errors
    }

    fn count(&mut self, outcome: &Result<ValidatedPacket, FrameError>) {
        match outcome {
            Ok(_) => self.accepted += 1,
            Err(FrameError::ShortHeaderRead { .. }) => self.short_headers += 1,
            Err(FrameError::ShortBodyRead { .. }) => self.short_bodies += 1,
            Err(FrameError::ChecksumMismatch { .. }) => self.checksum_mismatches += 1,
            Err(FrameError::Io(_)) => self.io_errors += 1,
        }
    }
}

/// Reader that frames and validates packets from a byte source.
#[derive(Debug)]
pub struct PacketReader<S> {
    source: S,
    stats: FrameStats,
}

impl<S: ByteSource> PacketReader<S> {
    /// Create a reader over `source`.
    #[must_use]
    pub const fn new(source: S) -> Self {
        Self {
            source,
            stats: FrameStats {
                accepted: 0,
                short_headers: 0,
                short_bodies: 0,
                checksum_mismatches: 0,
                io_errors: 0,
            },
        }
    }

    /// Read and validate the next packet, reporting why a cycle failed.
    ///
    /// # Errors
    /// Returns a [`FrameError`] describing the short read, checksum mismatch
    /// or transport failure that ended the cycle. None of them leave state
    /// behind; the caller may simply call again.
    pub fn try_next_packet(&mut self) -> Result<ValidatedPacket, FrameError> {
        let outcome = self.read_cycle();
        self.stats.count(&outcome);
        outcome
    }

    /// Read the next packet, or `None` if this cycle produced none.
    ///
    /// The failure reason is logged: idle timeouts at `debug`, everything
    /// else at `warn`.
    pub fn next_packet(&mut self) -> Option<ValidatedPacket> {
        match self.try_next_packet() {
            Ok(packet) => Some(packet),
            Err(err) if err.is_idle() => {
                debug!("no packet this cycle: source idle");
                None
            }
            Err(err) => {
                warn!(error = %err, "dropping frame");
                None
            }
        }
    }

    /// Returns `true` once the underlying source reported end of stream.
    #[must_use]
    pub fn source_exhausted(&self) -> bool { self.source.at_end() }

    /// Counters for every cycle run so far.
    #[must_use]
    pub const fn stats(&self) -> FrameStats { self.stats }

    /// Consume the reader and return the byte source.
    #[must_use]
    pub fn into_inner(self) -> S { self.source }

    fn read_cycle(&mut self) -> Result<ValidatedPacket, FrameError> {
        let mut frame = self.source.read_up_to(HEADER_LEN)?;
        let header_bytes: [u8; HEADER_LEN] = frame
            .as_slice()
            .try_into()
            .map_err(|_| FrameError::ShortHeaderRead {
                received: frame.len(),
            })?;
        let header = PacketHeader::from_bytes(&header_bytes);

        let expected = header.body_len();
        let body = self.source.read_up_to(expected)?;
        if body.len() != expected {
            return Err(FrameError::ShortBodyRead {
                expected,
                received: body.len(),
            });
        }
        frame.extend_from_slice(&body);

        let Some(received) = frame.pop() else {
            return Err(FrameError::ShortBodyRead {
                expected,
                received: 0,
            });
        };
        let computed = xor_checksum(&frame);
        if computed != received {
            return Err(FrameError::ChecksumMismatch {
                expected: received,
                computed,
            });
        }
        Ok(ValidatedPacket::new(header, frame))
    }
}
