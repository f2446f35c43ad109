//! Fixed-width text records for the memlink simulator protocol.
//!
//! The wire convention is a private ABI shared with the memory-timing
//! responder: every record is a constant-width text block, with no length
//! prefix and no checksum.
//!
//! - Request record (41 bytes): `<16-hex-digit address> <READ|WRITE|END> <decimal cycle>`,
//!   NUL-padded to the fixed width.
//! - Response record (35 bytes): `<16-hex-digit address> <decimal cycle>`,
//!   NUL-padded to the fixed width.
//!
//! Field widths and separators must match the responder's expectations
//! byte-for-byte; this crate is the only place they are spelled out.

pub mod codec;
pub mod error;
pub mod record;

pub use codec::{
    decode_request, decode_response, encode_request, encode_response, ADDR_HEX_WIDTH, END_ADDR,
    REQUEST_LEN, RESPONSE_LEN,
};
pub use error::{Result, WireError};
pub use record::{MemCommand, Request, Response};
