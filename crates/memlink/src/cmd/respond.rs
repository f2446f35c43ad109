use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Write};

use bytes::BytesMut;
use memlink::transport::{create_fifo, DEFAULT_FIFO_MODE};
use memlink::wire::{decode_request, encode_response, Response, REQUEST_LEN};
use tracing::{debug, info};

use crate::cmd::RespondArgs;
use crate::exit::{io_error, transport_error, CliError, CliResult, DATA_INVALID, SUCCESS};

pub fn run(args: RespondArgs) -> CliResult<i32> {
    create_fifo(&args.request_path, DEFAULT_FIFO_MODE)
        .map_err(|err| transport_error("create request fifo failed", err))?;
    create_fifo(&args.response_path, DEFAULT_FIFO_MODE)
        .map_err(|err| transport_error("create response fifo failed", err))?;

    // Blocking opens, in protocol order: the request read side attaches
    // first so the initiator's rendezvous open can complete, then the
    // response write side waits for the initiator's reader.
    let mut requests = File::open(&args.request_path)
        .map_err(|err| io_error("open request fifo failed", err))?;
    let mut responses = OpenOptions::new()
        .write(true)
        .open(&args.response_path)
        .map_err(|err| io_error("open response fifo failed", err))?;

    info!(
        request = ?args.request_path,
        response = ?args.response_path,
        latency = args.latency,
        "responder attached"
    );

    let mut pending = BytesMut::with_capacity(REQUEST_LEN * 4);
    let mut block = [0u8; REQUEST_LEN];
    let mut answered = 0usize;

    loop {
        match requests.read(&mut block) {
            Ok(0) => {
                info!(answered, "initiator detached");
                return Ok(SUCCESS);
            }
            Ok(n) => pending.extend_from_slice(&block[..n]),
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(io_error("read request failed", err)),
        }

        while let Some(request) = decode_request(&mut pending)
            .map_err(|err| CliError::new(DATA_INVALID, format!("bad request record: {err}")))?
        {
            if request.is_end() {
                info!(answered, "END record received, shutting down");
                return Ok(SUCCESS);
            }

            let response = Response::new(request.addr, echo_cycle(request.cycle, args.latency));
            let mut out = BytesMut::new();
            encode_response(&response, &mut out);
            responses
                .write_all(&out)
                .map_err(|err| io_error("write response failed", err))?;
            debug!(
                addr = format_args!("{:016x}", response.addr),
                cycle = response.cycle,
                "response sent"
            );

            answered += 1;
            if let Some(count) = args.count {
                if answered >= count {
                    info!(answered, "request count reached");
                    return Ok(SUCCESS);
                }
            }
        }
    }
}

/// Returned cycle for an echoed request.
///
/// The decoder accepts any `u64` cycle, so the sum saturates rather than
/// wrapping on hostile or corrupt records.
fn echo_cycle(issued: u64, latency: u64) -> u64 {
    issued.saturating_add(latency)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn echo_cycle_adds_latency() {
        assert_eq!(echo_cycle(100, 40), 140);
        assert_eq!(echo_cycle(100, 0), 100);
    }

    #[test]
    fn echo_cycle_saturates_instead_of_wrapping() {
        assert_eq!(echo_cycle(u64::MAX, 1), u64::MAX);
        assert_eq!(echo_cycle(u64::MAX - 10, 100), u64::MAX);
    }
}
