//! Device-backed byte source with a bounded per-read timeout.
//!
//! [`DeviceSource`] opens a serial device, FIFO or capture file (or wraps
//! stdin) and serves [`ByteSource`] reads from it. Each read runs on a
//! private current-thread Tokio runtime under a deadline, so the caller
//! blocks for at most the configured timeout and receives whatever arrived
//! in that window.
//!
//! Line settings (baud rate, parity, raw mode) are applied outside the
//! process, for example with `stty`; the configured baud rate is recorded
//! and logged so the two can be checked against each other.

use std::{
    fmt,
    io,
    path::{Path, PathBuf},
    time::Duration,
};

use thiserror::Error;
use tokio::{
    fs::OpenOptions,
    io::{AsyncRead, AsyncReadExt},
    runtime::{Builder, Runtime},
    time::{Instant, sleep, timeout_at},
};
use tracing::{debug, info};

use super::ByteSource;

/// Delay before polling a character device again after an empty read.
const IDLE_POLL: Duration = Duration::from_millis(10);

/// Errors raised while configuring or opening a device.
#[derive(Debug, Error)]
pub enum DeviceError {
    /// The device path is empty.
    #[error("device path cannot be empty")]
    EmptyPort,
    /// The read timeout is zero, which would make every read a short read.
    #[error("read timeout must be greater than zero")]
    ZeroTimeout,
    /// The device could not be opened.
    #[error("failed to open {port}: {source}")]
    Open {
        /// Path that failed to open.
        port: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The I/O runtime backing the device could not be started.
    #[error("failed to start I/O runtime: {0}")]
    Runtime(#[source] io::Error),
}

/// Explicit transport configuration passed to [`DeviceSource::open`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceConfig {
    port: PathBuf,
    baud_rate: u32,
    timeout: Duration,
}

impl DeviceConfig {
    /// Create a configuration from validated values.
    ///
    /// # Errors
    /// Returns [`DeviceError::EmptyPort`] for a blank path and
    /// [`DeviceError::ZeroTimeout`] for a zero timeout.
    pub fn new(
        port: impl Into<PathBuf>,
        baud_rate: u32,
        timeout: Duration,
    ) -> Result<Self, DeviceError> {
        let port = port.into();
        if port.as_os_str().is_empty() {
            return Err(DeviceError::EmptyPort);
        }
        if timeout.is_zero() {
            return Err(DeviceError::ZeroTimeout);
        }
        Ok(Self {
            port,
            baud_rate,
            timeout,
        })
    }

    /// Return the device path.
    #[must_use]
    pub fn port(&self) -> &Path { &self.port }

    /// Return the configured line speed.
    #[must_use]
    pub const fn baud_rate(&self) -> u32 { self.baud_rate }

    /// Return the per-read timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration { self.timeout }
}

/// Blocking, timeout-bounded reader over a device, file or stdin.
///
/// Reads that outlive their deadline keep running on the runtime's blocking
/// pool and hand their bytes to the next read. Dropping the source shuts the
/// runtime down without waiting for them, so an idle line never delays exit.
pub struct DeviceSource {
    runtime: Option<Runtime>,
    reader: Box<dyn AsyncRead + Unpin + Send>,
    config: DeviceConfig,
    follow: bool,
    exhausted: bool,
}

impl fmt::Debug for DeviceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceSource")
            .field("config", &self.config)
            .field("follow", &self.follow)
            .field("exhausted", &self.exhausted)
            .finish_non_exhaustive()
    }
}

fn start_runtime() -> Result<Runtime, DeviceError> {
    Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(DeviceError::Runtime)
}

impl DeviceSource {
    /// Open the device described by `config` for reading.
    ///
    /// Character devices are followed: an empty read means "no data yet"
    /// rather than end of stream.
    ///
    /// # Errors
    /// Returns [`DeviceError::Runtime`] if the runtime cannot start and
    /// [`DeviceError::Open`] if the device cannot be opened.
    pub fn open(config: DeviceConfig) -> Result<Self, DeviceError> {
        let runtime = start_runtime()?;
        let open_err = |source| DeviceError::Open {
            port: config.port.clone(),
            source,
        };
        let (file, follow) = runtime
            .block_on(async {
                let file = OpenOptions::new().read(true).open(&config.port).await?;
                let metadata = file.metadata().await?;
                Ok::<_, io::Error>((file, is_char_device(&metadata)))
            })
            .map_err(open_err)?;
        info!(
            port = %config.port.display(),
            baud_rate = config.baud_rate,
            timeout_ms = u64::try_from(config.timeout.as_millis()).unwrap_or(u64::MAX),
            follow,
            "opened telemetry device"
        );
        Ok(Self {
            runtime: Some(runtime),
            reader: Box::new(file),
            config,
            follow,
            exhausted: false,
        })
    }

    /// Serve reads from the process's standard input under the deadline in
    /// `config`. The port path is only used in diagnostics.
    ///
    /// # Errors
    /// Returns [`DeviceError::Runtime`] if the runtime cannot start.
    pub fn stdin(config: DeviceConfig) -> Result<Self, DeviceError> {
        let runtime = start_runtime()?;
        info!(
            timeout_ms = u64::try_from(config.timeout.as_millis()).unwrap_or(u64::MAX),
            "reading packets from stdin"
        );
        Ok(Self {
            runtime: Some(runtime),
            reader: Box::new(tokio::io::stdin()),
            config,
            follow: false,
            exhausted: false,
        })
    }

    /// Return the configuration the device was opened with.
    #[must_use]
    pub const fn config(&self) -> &DeviceConfig { &self.config }
}

impl ByteSource for DeviceSource {
    fn read_up_to(&mut self, n: usize) -> io::Result<Vec<u8>> {
        let runtime = self
            .runtime
            .as_ref()
            .ok_or_else(|| io::Error::other("device runtime already stopped"))?;
        let mut buf = vec![0u8; n];
        let deadline = Instant::now() + self.config.timeout;
        let fill = fill_until(&mut self.reader, &mut buf, deadline, self.follow);
        let outcome = runtime.block_on(fill)?;
        if outcome.eof {
            debug!(port = %self.config.port.display(), "device reached end of stream");
            self.exhausted = true;
        }
        buf.truncate(outcome.filled);
        Ok(buf)
    }

    fn at_end(&self) -> bool { self.exhausted }
}

impl Drop for DeviceSource {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

#[cfg(unix)]
fn is_char_device(metadata: &std::fs::Metadata) -> bool {
    use std::os::unix::fs::FileTypeExt;
    metadata.file_type().is_char_device()
}

#[cfg(not(unix))]
fn is_char_device(_metadata: &std::fs::Metadata) -> bool { false }

/// Result of one deadline-bounded fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FillOutcome {
    filled: usize,
    eof: bool,
}

/// Read into `buf` until it is full, the deadline passes or the stream ends.
///
/// With `follow` set, an empty read is treated as "no data yet" and polled
/// again until the deadline.
async fn fill_until<R: AsyncRead + Unpin>(
    reader: &mut R,
    buf: &mut [u8],
    deadline: Instant,
    follow: bool,
) -> io::Result<FillOutcome> {
    let mut filled = 0;
    while let Some(rest) = buf.get_mut(filled..).filter(|rest| !rest.is_empty()) {
        match timeout_at(deadline, reader.read(rest)).await {
            Err(_elapsed) => break,
            Ok(Ok(0)) if follow => {
                if Instant::now() + IDLE_POLL >= deadline {
                    break;
                }
                sleep(IDLE_POLL).await;
            }
            Ok(Ok(0)) => return Ok(FillOutcome { filled, eof: true }),
            Ok(Ok(read)) => filled += read,
            Ok(Err(err)) if err.kind() == io::ErrorKind::Interrupted => {}
            Ok(Err(err)) => return Err(err),
        }
    }
    Ok(FillOutcome { filled, eof: false })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use rstest::rstest;
    use tempfile::NamedTempFile;
    use tokio::io::{AsyncWriteExt, duplex};

    use super::*;

    #[rstest]
    #[case("", Duration::from_secs(1), DeviceError::EmptyPort)]
    #[case("/dev/serial0", Duration::ZERO, DeviceError::ZeroTimeout)]
    fn rejects_invalid_config(
        #[case] port: &str,
        #[case] timeout: Duration,
        #[case] expected: DeviceError,
    ) {
        let err = DeviceConfig::new(port, 9600, timeout).expect_err("config must be rejected");
        assert_eq!(err.to_string(), expected.to_string());
    }

    #[rstest]
    #[tokio::test]
    async fn fill_stops_at_deadline_with_partial_bytes() {
        let (mut tx, mut rx) = duplex(64);
        tx.write_all(&[1, 2]).await.expect("write");
        let mut buf = [0u8; 4];
        let deadline = Instant::now() + Duration::from_millis(50);
        let outcome = fill_until(&mut rx, &mut buf, deadline, false)
            .await
            .expect("fill");
        assert_eq!(outcome, FillOutcome { filled: 2, eof: false });
        assert_eq!(buf.get(..2), Some(&[1, 2][..]));
    }

    #[rstest]
    #[tokio::test]
    async fn fill_reports_end_of_stream() {
        let (mut tx, mut rx) = duplex(64);
        tx.write_all(&[7]).await.expect("write");
        drop(tx);
        let mut buf = [0u8; 4];
        let deadline = Instant::now() + Duration::from_secs(5);
        let outcome = fill_until(&mut rx, &mut buf, deadline, false)
            .await
            .expect("fill");
        assert_eq!(outcome, FillOutcome { filled: 1, eof: true });
    }

    #[rstest]
    #[tokio::test]
    async fn followed_source_polls_past_empty_reads() {
        let (tx, mut rx) = duplex(64);
        drop(tx);
        let mut buf = [0u8; 1];
        let deadline = Instant::now() + Duration::from_millis(40);
        let outcome = fill_until(&mut rx, &mut buf, deadline, true)
            .await
            .expect("fill");
        assert_eq!(outcome, FillOutcome { filled: 0, eof: false });
    }

    #[rstest]
    fn reads_capture_file_until_exhausted() {
        let mut capture = NamedTempFile::new().expect("tempfile");
        capture.write_all(&[1, 2, 3, 4, 5]).expect("write");
        capture.flush().expect("flush");
        let config =
            DeviceConfig::new(capture.path(), 9600, Duration::from_millis(200)).expect("config");
        let mut source = DeviceSource::open(config).expect("open");

        assert_eq!(source.read_up_to(4).expect("read"), vec![1, 2, 3, 4]);
        assert!(!source.at_end());
        assert_eq!(source.read_up_to(4).expect("read"), vec![5]);
        assert!(source.at_end());
        assert_eq!(source.config().baud_rate(), 9600);
    }

    #[rstest]
    fn stdin_reads_and_close_are_bounded_by_the_timeout() {
        let config = DeviceConfig::new("-", 9600, Duration::from_millis(50)).expect("config");
        let mut source = DeviceSource::stdin(config).expect("stdin source");
        let started = std::time::Instant::now();
        let bytes = source.read_up_to(4).expect("read");
        drop(source);
        assert!(bytes.len() <= 4);
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[rstest]
    fn missing_device_fails_to_open() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = DeviceConfig::new(dir.path().join("absent"), 9600, Duration::from_secs(1))
            .expect("config");
        let err = DeviceSource::open(config).expect_err("open must fail");
        assert!(matches!(err, DeviceError::Open { .. }));
    }
}
