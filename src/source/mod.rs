//! Byte sources feeding the packet reader.
//!
//! A [`ByteSource`] models a transport with blocking-read-with-timeout
//! semantics: asking for `n` bytes returns at most `n`, and fewer on timeout or
//! end of stream. Short reads are not errors; they are the only signal the
//! reader uses to abandon a cycle.

pub mod device;

use std::io::{self, Read};

pub use device::{DeviceConfig, DeviceError, DeviceSource};

/// A blocking byte transport with a bounded read timeout.
pub trait ByteSource {
    /// Read up to `n` bytes, blocking no longer than the source's timeout.
    ///
    /// Returns fewer than `n` bytes when the timeout elapses or the stream
    /// ends first.
    ///
    /// # Errors
    /// Returns an error only for hard transport failures; timeouts and end of
    /// stream are reported as short reads.
    fn read_up_to(&mut self, n: usize) -> io::Result<Vec<u8>>;

    /// Returns `true` once the source has reported end of stream.
    ///
    /// Transports that never end (a serial line) keep the default.
    fn at_end(&self) -> bool { false }
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn read_up_to(&mut self, n: usize) -> io::Result<Vec<u8>> { (**self).read_up_to(n) }

    fn at_end(&self) -> bool { (**self).at_end() }
}

/// Adapts any [`std::io::Read`] into a [`ByteSource`].
///
/// A zero-length read marks end of stream. `TimedOut` and `WouldBlock`
/// errors (as raised by readers with a configured timeout) end the current
/// request with whatever was gathered so far. `Interrupted` is retried.
#[derive(Debug)]
pub struct ReadSource<R> {
    reader: R,
    exhausted: bool,
}

impl<R: Read> ReadSource<R> {
    /// Wrap `reader`.
    #[must_use]
    pub const fn new(reader: R) -> Self {
        Self {
            reader,
            exhausted: false,
        }
    }

    /// Consume the adapter and return the inner reader.
    #[must_use]
    pub fn into_inner(self) -> R { self.reader }
}

impl<R: Read> ByteSource for ReadSource<R> {
    fn read_up_to(&mut self, n: usize) -> io::Result<Vec<u8>> {
        let mut buf = vec![0u8; n];
        let mut filled = 0;
        while let Some(rest) = buf.get_mut(filled..).filter(|rest| !rest.is_empty()) {
            match self.reader.read(rest) {
                Ok(0) => {
                    self.exhausted = true;
                    break;
                }
                Ok(read) => filled += read,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err)
                    if matches!(
                        err.kind(),
                        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock
                    ) =>
                {
                    break;
                }
                Err(err) => return Err(err),
            }
        }
        buf.truncate(filled);
        Ok(buf)
    }

    fn at_end(&self) -> bool { self.exhausted }
}
