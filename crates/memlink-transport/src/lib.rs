//! Named-FIFO endpoints for the memlink transport.
//!
//! Provides the two unidirectional byte-stream endpoints the link is built
//! on: a write-only endpoint for requests and a read-only endpoint for
//! responses, both addressed by filesystem paths.
//!
//! This is the lowest layer of memlink. Everything else builds on top of
//! the [`FifoWriter`] and [`FifoReader`] types provided here.

pub mod error;

#[cfg(unix)]
pub mod fifo;

pub use error::{Result, TransportError};

#[cfg(unix)]
pub use fifo::{create_fifo, FifoReader, FifoWriter, RendezvousConfig, DEFAULT_FIFO_MODE};
