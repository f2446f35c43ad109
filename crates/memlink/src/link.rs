use std::io::{ErrorKind, Read, Write};
use std::path::PathBuf;

use bytes::BytesMut;
use memlink_transport::{
    create_fifo, FifoReader, FifoWriter, RendezvousConfig, DEFAULT_FIFO_MODE,
};
use memlink_wire::{decode_response, encode_request, Request, Response, RESPONSE_LEN};
use tracing::{debug, info, warn};

use crate::error::{LinkError, Result};

/// Configuration for establishing a [`MemoryLink`].
#[derive(Debug, Clone)]
pub struct LinkConfig {
    /// Path of the request FIFO (initiator to responder).
    pub request_path: PathBuf,
    /// Path of the response FIFO (responder to initiator).
    pub response_path: PathBuf,
    /// Permission mode for FIFOs created during setup.
    pub mode: u32,
    /// Rendezvous behavior while waiting for the responder to attach.
    pub rendezvous: RendezvousConfig,
}

impl LinkConfig {
    pub fn new(request_path: impl Into<PathBuf>, response_path: impl Into<PathBuf>) -> Self {
        Self {
            request_path: request_path.into(),
            response_path: response_path.into(),
            mode: DEFAULT_FIFO_MODE,
            rendezvous: RendezvousConfig::default(),
        }
    }
}

/// The initiator's end of the link.
///
/// Owns both FIFO endpoints for the session lifetime. All operations take
/// `&mut self`; the link has no internal locking and is meant to be driven
/// from a single simulation loop.
pub struct MemoryLink {
    writer: Option<FifoWriter>,
    reader: Option<FifoReader>,
    pending: BytesMut,
    scratch: BytesMut,
}

impl MemoryLink {
    /// Establish the link.
    ///
    /// Ensures both FIFOs exist (an already-present FIFO is fine, the
    /// responder may have created it first), then opens the request side
    /// for writing — blocking until the responder's reader attaches or the
    /// configured rendezvous timeout expires — and the response side for
    /// non-blocking reading. On success both endpoints are usable.
    pub fn connect(config: &LinkConfig) -> Result<Self> {
        create_fifo(&config.request_path, config.mode)?;
        create_fifo(&config.response_path, config.mode)?;

        let writer = FifoWriter::open(&config.request_path, &config.rendezvous)?;
        let reader = FifoReader::open(&config.response_path)?;

        info!(
            request = ?config.request_path,
            response = ?config.response_path,
            "link established"
        );

        Ok(Self {
            writer: Some(writer),
            reader: Some(reader),
            pending: BytesMut::with_capacity(RESPONSE_LEN * 4),
            scratch: BytesMut::new(),
        })
    }

    /// Send one request record.
    ///
    /// The record is written in full before returning: short writes are
    /// resumed rather than surfaced, since a partial record would corrupt
    /// framing for every record after it. A zero-byte write means the
    /// responder detached and is reported as [`LinkError::Disconnected`].
    pub fn send(&mut self, request: &Request) -> Result<()> {
        let writer = self.writer.as_mut().ok_or(LinkError::Closed)?;

        self.scratch.clear();
        encode_request(request, &mut self.scratch);

        let mut offset = 0usize;
        while offset < self.scratch.len() {
            match writer.write(&self.scratch[offset..]) {
                Ok(0) => return Err(LinkError::Disconnected),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(LinkError::Io(err)),
            }
        }

        debug!(
            addr = format_args!("{:016x}", request.addr),
            cmd = %request.cmd,
            cycle = request.cycle,
            "request sent"
        );
        Ok(())
    }

    /// Poll for one response record without blocking.
    ///
    /// Returns `Ok(None)` when no complete record is available yet — the
    /// caller's loop is expected to poll. Bytes of a partially-arrived
    /// record stay buffered until the rest shows up; each returned response
    /// consumes exactly its own record, so content from an earlier record
    /// can never leak into a later one.
    pub fn try_recv(&mut self) -> Result<Option<Response>> {
        let reader = self.reader.as_mut().ok_or(LinkError::Closed)?;

        let mut chunk = [0u8; RESPONSE_LEN];
        loop {
            if let Some(response) = decode_response(&mut self.pending)? {
                debug!(
                    addr = format_args!("{:016x}", response.addr),
                    cycle = response.cycle,
                    "response received"
                );
                return Ok(Some(response));
            }

            match reader.read(&mut chunk) {
                // Zero bytes from a non-blocking FIFO read means no writer
                // is attached yet; treat it like "no data".
                Ok(0) => return Ok(None),
                Ok(n) => self.pending.extend_from_slice(&chunk[..n]),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => return Ok(None),
                Err(err) => return Err(LinkError::Io(err)),
            }
        }
    }

    /// Poll for one response and render it as text.
    ///
    /// The returned string is complete and self-contained per record.
    pub fn try_recv_text(&mut self) -> Result<Option<String>> {
        Ok(self.try_recv()?.map(|response| response.to_text()))
    }

    /// Whether the link is still open.
    pub fn is_open(&self) -> bool {
        self.writer.is_some()
    }

    /// Shut the link down.
    ///
    /// Sends the termination record through the ordinary send path, then
    /// releases both endpoints. Failures while sending the sentinel are
    /// logged and swallowed: shutdown must not fail the caller's own
    /// teardown. Idempotent; subsequent [`send`](Self::send) and
    /// [`try_recv`](Self::try_recv) calls return [`LinkError::Closed`].
    pub fn close(&mut self) {
        if self.writer.is_some() {
            if let Err(err) = self.send(&Request::end()) {
                warn!(%err, "failed to send termination record");
            }
            info!("link closed");
        }
        self.writer = None;
        self.reader = None;
        self.pending.clear();
    }
}

impl Drop for MemoryLink {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for MemoryLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryLink")
            .field("open", &self.is_open())
            .field("pending_bytes", &self.pending.len())
            .finish()
    }
}
