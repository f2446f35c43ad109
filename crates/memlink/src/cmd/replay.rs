use std::fs;
use std::time::{Duration, Instant};

use memlink::transport::RendezvousConfig;
use memlink::wire::{MemCommand, Request};
use memlink::{LinkConfig, MemoryLink};
use tracing::info;

use crate::cmd::ReplayArgs;
use crate::exit::{io_error, link_error, CliError, CliResult, SUCCESS, TIMEOUT, USAGE};

pub fn run(args: ReplayArgs) -> CliResult<i32> {
    let rendezvous_timeout = parse_duration(&args.rendezvous_timeout)?;
    let response_timeout = parse_duration(&args.response_timeout)?;

    let trace = fs::read_to_string(&args.trace)
        .map_err(|err| io_error(&format!("failed reading {}", args.trace.display()), err))?;
    let requests = parse_trace(&trace)?;
    if requests.is_empty() {
        return Err(CliError::new(USAGE, "trace contains no requests"));
    }

    let mut config = LinkConfig::new(&args.request_path, &args.response_path);
    config.rendezvous = RendezvousConfig {
        timeout: rendezvous_timeout,
        ..RendezvousConfig::default()
    };

    let mut link =
        MemoryLink::connect(&config).map_err(|err| link_error("connect failed", err))?;

    for request in &requests {
        link.send(request)
            .map_err(|err| link_error("send failed", err))?;
        let text = wait_for_response(&mut link, response_timeout)?;
        println!("{text}");
    }

    info!(requests = requests.len(), "trace replay complete");
    link.close();
    Ok(SUCCESS)
}

fn wait_for_response(link: &mut MemoryLink, timeout: Duration) -> CliResult<String> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(text) = link
            .try_recv_text()
            .map_err(|err| link_error("receive failed", err))?
        {
            return Ok(text);
        }
        if Instant::now() >= deadline {
            return Err(CliError::new(
                TIMEOUT,
                format!("no response within {timeout:?}"),
            ));
        }
        std::thread::sleep(Duration::from_millis(1));
    }
}

fn parse_trace(input: &str) -> CliResult<Vec<Request>> {
    let mut requests = Vec::new();
    for (lineno, line) in input.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let request = parse_trace_line(line)
            .map_err(|msg| CliError::new(USAGE, format!("trace line {}: {msg}", lineno + 1)))?;
        requests.push(request);
    }
    Ok(requests)
}

fn parse_trace_line(line: &str) -> Result<Request, String> {
    let mut fields = line.split_whitespace();
    let addr_field = fields.next().ok_or("missing address field")?;
    let cmd_field = fields.next().ok_or("missing command field")?;
    let cycle_field = fields.next().ok_or("missing cycle field")?;

    let addr = u64::from_str_radix(addr_field, 16)
        .map_err(|_| format!("bad address {addr_field:?}"))?;
    let cmd = MemCommand::from_token(cmd_field).map_err(|err| err.to_string())?;
    let cycle = cycle_field
        .parse::<u64>()
        .map_err(|_| format!("bad cycle {cycle_field:?}"))?;

    Ok(Request { addr, cmd, cycle })
}

fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    let split = input
        .find(|c: char| c.is_ascii_alphabetic())
        .ok_or_else(|| bad_duration(input))?;
    let (value, unit) = input.split_at(split);
    let value: u64 = value.parse().map_err(|_| bad_duration(input))?;
    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        "s" => Ok(Duration::from_secs(value)),
        _ => Err(bad_duration(input)),
    }
}

fn bad_duration(input: &str) -> CliError {
    CliError::new(
        USAGE,
        format!("bad duration {input:?} (expected e.g. 5s, 500ms)"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_lab_trace_lines() {
        let trace = "0000000083000000 READ 100\n0000000082000000 WRITE 160\n";
        let requests = parse_trace(trace).unwrap();

        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0], Request::read(0x83000000, 100));
        assert_eq!(requests[1], Request::write(0x82000000, 160));
    }

    #[test]
    fn skips_blank_and_comment_lines() {
        let trace = "# warmup\n\n0000000083000000 READ 100\n";
        let requests = parse_trace(trace).unwrap();
        assert_eq!(requests.len(), 1);
    }

    #[test]
    fn rejects_bad_command_with_line_number() {
        let trace = "0000000083000000 READ 100\n0000000083000000 FLUSH 200\n";
        let err = parse_trace(trace).unwrap_err();
        assert_eq!(err.code, USAGE);
        assert!(err.message.contains("line 2"), "{}", err.message);
    }

    #[test]
    fn duration_parsing() {
        assert_eq!(parse_duration("5s").unwrap(), Duration::from_secs(5));
        assert_eq!(parse_duration("500ms").unwrap(), Duration::from_millis(500));
        assert!(parse_duration("5m").is_err());
        assert!(parse_duration("fast").is_err());
    }
}
