use std::ffi::CString;
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Write};
use std::os::unix::ffi::OsStrExt;
use std::os::unix::fs::{FileTypeExt, OpenOptionsExt};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::error::{Result, TransportError};

/// Default permission mode for created FIFOs.
///
/// Permissive by convention: the responder process typically runs under a
/// different principal than the initiator.
pub const DEFAULT_FIFO_MODE: u32 = 0o666;

/// Rendezvous behavior for opening the write side of a FIFO.
///
/// Opening a FIFO for writing fails with `ENXIO` until a reader has
/// attached, so [`FifoWriter::open`] polls until a deadline. The deadline
/// and the poll cadence are both configurable.
#[derive(Debug, Clone)]
pub struct RendezvousConfig {
    /// Maximum time to wait for a reader to attach.
    pub timeout: Duration,
    /// Interval between open attempts while waiting.
    pub poll_interval: Duration,
}

impl Default for RendezvousConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            poll_interval: Duration::from_millis(10),
        }
    }
}

/// Ensure a FIFO exists at `path`, creating it with `mode` if absent.
///
/// An already-existing FIFO is tolerated — the peer may have created it
/// first. An existing path of any other file type is rejected rather than
/// clobbered.
pub fn create_fifo(path: impl AsRef<Path>, mode: u32) -> Result<()> {
    let path = path.as_ref();
    let c_path =
        CString::new(path.as_os_str().as_bytes()).map_err(|_| TransportError::Create {
            path: path.to_path_buf(),
            source: std::io::Error::new(ErrorKind::InvalidInput, "path contains NUL byte"),
        })?;

    // SAFETY: `c_path` is a valid NUL-terminated string for the duration of
    // the call.
    let rc = unsafe { libc::mkfifo(c_path.as_ptr(), mode as libc::mode_t) };
    if rc == 0 {
        debug!(?path, mode = format_args!("{mode:o}"), "created fifo");
        return Ok(());
    }

    let err = std::io::Error::last_os_error();
    if err.kind() == ErrorKind::AlreadyExists {
        let metadata = std::fs::metadata(path).map_err(|e| TransportError::Create {
            path: path.to_path_buf(),
            source: e,
        })?;
        if metadata.file_type().is_fifo() {
            debug!(?path, "fifo already exists, reusing");
            return Ok(());
        }
        return Err(TransportError::NotAFifo {
            path: path.to_path_buf(),
        });
    }

    Err(TransportError::Create {
        path: path.to_path_buf(),
        source: err,
    })
}

/// Write end of a named FIFO.
pub struct FifoWriter {
    file: File,
    path: PathBuf,
}

impl FifoWriter {
    /// Open `path` for writing, waiting for a reader to attach.
    ///
    /// This is the one deliberate synchronization point of the transport: it
    /// acts as a rendezvous barrier between initiator and responder startup.
    /// Returns [`TransportError::Rendezvous`] if no reader attaches within
    /// the configured timeout.
    pub fn open(path: impl AsRef<Path>, rendezvous: &RendezvousConfig) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let started = Instant::now();
        loop {
            match OpenOptions::new()
                .write(true)
                .custom_flags(libc::O_NONBLOCK)
                .open(&path)
            {
                Ok(file) => {
                    info!(?path, "fifo open for writing");
                    return Ok(Self { file, path });
                }
                // ENXIO: no process has the FIFO open for reading yet.
                Err(err) if err.raw_os_error() == Some(libc::ENXIO) => {
                    let waited = started.elapsed();
                    if waited >= rendezvous.timeout {
                        return Err(TransportError::Rendezvous { path, waited });
                    }
                    std::thread::sleep(rendezvous.poll_interval);
                }
                Err(err) => return Err(TransportError::Open { path, source: err }),
            }
        }
    }

    /// The path this endpoint was opened at.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Write for FifoWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.file.flush()
    }
}

impl std::fmt::Debug for FifoWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FifoWriter")
            .field("path", &self.path())
            .finish()
    }
}

/// Read end of a named FIFO, opened non-blocking.
///
/// Reads never suspend the caller: with no data buffered they fail with
/// `WouldBlock`, and with no writer attached they return zero bytes. Both
/// mean "try again later" to the polling loop above this layer.
pub struct FifoReader {
    file: File,
    path: PathBuf,
}

impl FifoReader {
    /// Open `path` for reading, non-blocking, without retry.
    ///
    /// By protocol convention the responder attaches to this side before the
    /// initiator reaches setup, so a failure here is fatal and surfaced
    /// immediately rather than retried.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .custom_flags(libc::O_NONBLOCK)
            .open(&path)
            .map_err(|err| TransportError::Open {
                path: path.clone(),
                source: err,
            })?;
        info!(?path, "fifo open for reading");
        Ok(Self { file, path })
    }

    /// The path this endpoint was opened at.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Read for FifoReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.file.read(buf)
    }
}

impl std::fmt::Debug for FifoReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FifoReader")
            .field("path", &self.path())
            .finish()
    }
}
