use bytes::{BufMut, BytesMut};

use crate::error::{Result, WireError};
use crate::record::{MemCommand, Request, Response};

/// Fixed width of a request record on the wire.
pub const REQUEST_LEN: usize = 41;

/// Fixed width of a response record on the wire.
pub const RESPONSE_LEN: usize = 35;

/// Width of the hex-rendered address field.
pub const ADDR_HEX_WIDTH: usize = 16;

/// All-ones sentinel address carried by the termination record.
pub const END_ADDR: u64 = u64::MAX;

/// Encode a request into exactly [`REQUEST_LEN`] bytes.
///
/// The text is NUL-padded to the fixed width; only the hex address is
/// zero-padded, the cycle field is plain decimal. The responder reads
/// fixed-size blocks, so the total width must never vary.
pub fn encode_request(request: &Request, dst: &mut BytesMut) {
    let text = format!(
        "{:016x}{}{}",
        request.addr,
        request.cmd.token(),
        request.cycle
    );
    put_fixed(&text, REQUEST_LEN, dst);
}

/// Encode a response into exactly [`RESPONSE_LEN`] bytes.
pub fn encode_response(response: &Response, dst: &mut BytesMut) {
    let text = format!("{:016x} {}", response.addr, response.cycle);
    put_fixed(&text, RESPONSE_LEN, dst);
}

fn put_fixed(text: &str, width: usize, dst: &mut BytesMut) {
    dst.reserve(width);
    let bytes = text.as_bytes();
    if bytes.len() >= width {
        dst.put_slice(&bytes[..width]);
    } else {
        dst.put_slice(bytes);
        dst.put_bytes(0, width - bytes.len());
    }
}

/// Decode one request record from a buffer.
///
/// Returns `Ok(None)` if the buffer holds fewer than [`REQUEST_LEN`] bytes.
/// On success, consumes exactly one record from the buffer.
pub fn decode_request(src: &mut BytesMut) -> Result<Option<Request>> {
    if src.len() < REQUEST_LEN {
        return Ok(None); // Need more data
    }
    let record = src.split_to(REQUEST_LEN);
    parse_request(&record).map(Some)
}

/// Decode one response record from a buffer.
///
/// Returns `Ok(None)` if the buffer holds fewer than [`RESPONSE_LEN`] bytes.
/// On success, consumes exactly one record from the buffer, so trailing
/// bytes of a previous record can never bleed into the next one.
pub fn decode_response(src: &mut BytesMut) -> Result<Option<Response>> {
    if src.len() < RESPONSE_LEN {
        return Ok(None); // Need more data
    }
    let record = src.split_to(RESPONSE_LEN);
    parse_response(&record).map(Some)
}

fn parse_request(record: &[u8]) -> Result<Request> {
    let text = record_text(record)?;
    let mut fields = text.split_whitespace();

    let addr = parse_addr(fields.next().ok_or(WireError::MissingField { field: "address" })?)?;
    let cmd_field = fields.next().ok_or(WireError::MissingField { field: "command" })?;
    let cmd = MemCommand::from_token(cmd_field)?;
    let cycle = parse_cycle(fields.next().ok_or(WireError::MissingField { field: "cycle" })?)?;

    Ok(Request { addr, cmd, cycle })
}

fn parse_response(record: &[u8]) -> Result<Response> {
    let text = record_text(record)?;
    let mut fields = text.split_whitespace();

    let addr = parse_addr(fields.next().ok_or(WireError::MissingField { field: "address" })?)?;
    let cycle = parse_cycle(fields.next().ok_or(WireError::MissingField { field: "cycle" })?)?;

    Ok(Response { addr, cycle })
}

fn record_text(record: &[u8]) -> Result<&str> {
    // Records are NUL-padded to their fixed width; only the text prefix
    // carries fields.
    let end = record
        .iter()
        .position(|&b| b == 0)
        .unwrap_or(record.len());
    Ok(std::str::from_utf8(&record[..end])?)
}

fn parse_addr(field: &str) -> Result<u64> {
    if field.len() != ADDR_HEX_WIDTH {
        return Err(WireError::BadAddress {
            field: field.to_string(),
        });
    }
    u64::from_str_radix(field, 16).map_err(|_| WireError::BadAddress {
        field: field.to_string(),
    })
}

fn parse_cycle(field: &str) -> Result<u64> {
    field.parse::<u64>().map_err(|_| WireError::BadCycle {
        field: field.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_wire_layout_matches_responder_abi() {
        let mut buf = BytesMut::new();
        encode_request(&Request::read(0x83000000, 100), &mut buf);

        assert_eq!(buf.len(), REQUEST_LEN);
        assert!(buf.starts_with(b"0000000083000000 READ 100"));
        // Everything past the text is NUL padding.
        assert!(buf[b"0000000083000000 READ 100".len()..]
            .iter()
            .all(|&b| b == 0));
    }

    #[test]
    fn write_request_layout() {
        let mut buf = BytesMut::new();
        encode_request(&Request::write(0x82000000, 160), &mut buf);

        assert_eq!(buf.len(), REQUEST_LEN);
        assert!(buf.starts_with(b"0000000082000000 WRITE 160"));
    }

    #[test]
    fn end_record_layout() {
        let mut buf = BytesMut::new();
        encode_request(&Request::end(), &mut buf);

        assert_eq!(buf.len(), REQUEST_LEN);
        assert!(buf.starts_with(b"ffffffffffffffff END 0"));
    }

    #[test]
    fn request_width_is_constant_for_large_fields() {
        let mut buf = BytesMut::new();
        encode_request(&Request::write(u64::MAX - 1, u64::MAX), &mut buf);
        assert_eq!(buf.len(), REQUEST_LEN);
    }

    #[test]
    fn request_roundtrip() {
        let mut buf = BytesMut::new();
        let request = Request::read(0x83000000, 100);
        encode_request(&request, &mut buf);

        let decoded = decode_request(&mut buf).unwrap().unwrap();
        assert_eq!(decoded, request);
        assert!(buf.is_empty());
    }

    #[test]
    fn response_roundtrip() {
        let mut buf = BytesMut::new();
        let response = Response::new(0x83000000, 100);
        encode_response(&response, &mut buf);

        assert_eq!(buf.len(), RESPONSE_LEN);
        let decoded = decode_response(&mut buf).unwrap().unwrap();
        assert_eq!(decoded, response);
        assert!(buf.is_empty());
    }

    #[test]
    fn decode_incomplete_record() {
        let mut buf = BytesMut::from(&b"0000000083000000 READ"[..]);
        assert!(decode_request(&mut buf).unwrap().is_none());
        // The partial bytes stay buffered for the next poll.
        assert_eq!(buf.len(), 21);
    }

    #[test]
    fn back_to_back_responses_decode_independently() {
        let mut buf = BytesMut::new();
        encode_response(&Response::new(0x83000000, 100), &mut buf);
        encode_response(&Response::new(0x82000000, 160), &mut buf);

        let first = decode_response(&mut buf).unwrap().unwrap();
        let second = decode_response(&mut buf).unwrap().unwrap();

        assert_eq!(first.to_text(), "0000000083000000 100");
        assert_eq!(second.to_text(), "0000000082000000 160");
        assert!(buf.is_empty());
    }

    #[test]
    fn decode_unknown_command() {
        let mut buf = BytesMut::new();
        put_fixed("0000000083000000 FLUSH 100", REQUEST_LEN, &mut buf);

        let err = decode_request(&mut buf).unwrap_err();
        assert!(matches!(err, WireError::UnknownCommand { .. }));
    }

    #[test]
    fn decode_bad_address() {
        let mut buf = BytesMut::new();
        put_fixed("zzzz000083000000 READ 100", REQUEST_LEN, &mut buf);

        let err = decode_request(&mut buf).unwrap_err();
        assert!(matches!(err, WireError::BadAddress { .. }));
    }

    #[test]
    fn decode_short_address_rejected() {
        let mut buf = BytesMut::new();
        put_fixed("83000000 READ 100", REQUEST_LEN, &mut buf);

        let err = decode_request(&mut buf).unwrap_err();
        assert!(matches!(err, WireError::BadAddress { .. }));
    }

    #[test]
    fn decode_bad_cycle() {
        let mut buf = BytesMut::new();
        put_fixed("0000000083000000 READ ten", REQUEST_LEN, &mut buf);

        let err = decode_request(&mut buf).unwrap_err();
        assert!(matches!(err, WireError::BadCycle { .. }));
    }

    #[test]
    fn decode_all_padding_record() {
        let mut buf = BytesMut::new();
        buf.put_bytes(0, REQUEST_LEN);

        let err = decode_request(&mut buf).unwrap_err();
        assert!(matches!(err, WireError::MissingField { field: "address" }));
    }

    #[test]
    fn end_record_roundtrip() {
        let mut buf = BytesMut::new();
        encode_request(&Request::end(), &mut buf);

        let decoded = decode_request(&mut buf).unwrap().unwrap();
        assert!(decoded.is_end());
        assert_eq!(decoded.addr, END_ADDR);
        assert_eq!(decoded.cycle, 0);
    }
}
