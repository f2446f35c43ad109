//! Point-to-point FIFO link between a CPU timing model and a memory
//! timing simulator.
//!
//! memlink carries fixed-width text records over two named FIFOs: the
//! initiator (the CPU model) writes request records to one and polls
//! response records from the other. Matching requests to responses, if
//! needed, is the caller's responsibility; the link only guarantees that
//! responses arrive in the order the responder wrote them.
//!
//! # Crate Structure
//!
//! - [`transport`] — Named-FIFO endpoints (create, rendezvous open, non-blocking reads)
//! - [`wire`] — Fixed-width record codec shared with the responder
//! - [`link`] — The [`MemoryLink`] session type tying both together

pub mod error;
pub mod link;

/// Re-export transport types.
pub mod transport {
    pub use memlink_transport::*;
}

/// Re-export wire types.
pub mod wire {
    pub use memlink_wire::*;
}

pub use error::{LinkError, Result};
pub use link::{LinkConfig, MemoryLink};
