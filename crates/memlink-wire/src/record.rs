use std::fmt;

use crate::codec::END_ADDR;
use crate::error::{Result, WireError};

/// A memory access command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemCommand {
    Read,
    Write,
    /// Session-terminating sentinel; not a real memory access.
    End,
}

impl MemCommand {
    /// Wire token, including the separator spaces on both sides.
    ///
    /// The separators are part of the token so that the concatenated record
    /// matches the responder's fixed-width parser exactly.
    pub fn token(self) -> &'static str {
        match self {
            MemCommand::Read => " READ ",
            MemCommand::Write => " WRITE ",
            MemCommand::End => " END ",
        }
    }

    /// Parse a bare (already-trimmed) command token.
    pub fn from_token(token: &str) -> Result<Self> {
        match token {
            "READ" => Ok(MemCommand::Read),
            "WRITE" => Ok(MemCommand::Write),
            "END" => Ok(MemCommand::End),
            other => Err(WireError::UnknownCommand {
                token: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for MemCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token().trim())
    }
}

/// A request record: one memory access issued by the initiator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Request {
    /// Physical address, rendered as 16 hex digits on the wire.
    pub addr: u64,
    pub cmd: MemCommand,
    /// Simulation cycle at which the access was issued.
    pub cycle: u64,
}

impl Request {
    /// A read access.
    pub fn read(addr: u64, cycle: u64) -> Self {
        Self {
            addr,
            cmd: MemCommand::Read,
            cycle,
        }
    }

    /// A write access.
    pub fn write(addr: u64, cycle: u64) -> Self {
        Self {
            addr,
            cmd: MemCommand::Write,
            cycle,
        }
    }

    /// The termination record: all-ones address, `END` token, cycle 0.
    pub fn end() -> Self {
        Self {
            addr: END_ADDR,
            cmd: MemCommand::End,
            cycle: 0,
        }
    }

    /// Whether this record is the termination sentinel.
    pub fn is_end(&self) -> bool {
        self.cmd == MemCommand::End
    }
}

/// A response record: one completed access reported by the responder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Response {
    /// Address echoed back by the responder.
    pub addr: u64,
    /// Simulation cycle at which the access completed.
    pub cycle: u64,
}

impl Response {
    pub fn new(addr: u64, cycle: u64) -> Self {
        Self { addr, cycle }
    }

    /// Render as the canonical `<address> <cycle>` text, without padding.
    ///
    /// Each call produces a complete, self-contained string; nothing is
    /// carried over from earlier records.
    pub fn to_text(&self) -> String {
        format!("{:016x} {}", self.addr, self.cycle)
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x} {}", self.addr, self.cycle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end_record_uses_sentinel_address() {
        let end = Request::end();
        assert_eq!(end.addr, 0xffff_ffff_ffff_ffff);
        assert_eq!(end.cycle, 0);
        assert!(end.is_end());
        assert!(!Request::read(0x1000, 5).is_end());
    }

    #[test]
    fn command_tokens_carry_separators() {
        assert_eq!(MemCommand::Read.token(), " READ ");
        assert_eq!(MemCommand::Write.token(), " WRITE ");
        assert_eq!(MemCommand::End.token(), " END ");
    }

    #[test]
    fn command_token_parsing() {
        assert_eq!(MemCommand::from_token("READ").unwrap(), MemCommand::Read);
        assert_eq!(MemCommand::from_token("WRITE").unwrap(), MemCommand::Write);
        assert_eq!(MemCommand::from_token("END").unwrap(), MemCommand::End);
        assert!(matches!(
            MemCommand::from_token("FLUSH"),
            Err(WireError::UnknownCommand { .. })
        ));
    }

    #[test]
    fn response_text_is_self_contained() {
        let resp = Response::new(0x83000000, 100);
        assert_eq!(resp.to_text(), "0000000083000000 100");
        // Rendering twice must not accumulate.
        assert_eq!(resp.to_text(), "0000000083000000 100");
    }
}
